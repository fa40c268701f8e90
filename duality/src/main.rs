//! Headless duality dice table.
//!
//! Reads player actions and `#` commands from stdin and prints the game
//! master's replies. Suitable for scripted play and automated agents:
//!
//! ```bash
//! cargo run -p duality -- --name "Vex" --class rogue --ancestry elf --traits 1,0,2,1,-1,0
//! ```

mod headless;

use clap::Parser;
use duality_core::gm::ChatNarrator;
use duality_core::{HeadlessConfig, NarratorConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "duality",
    about = "Play a duality dice table against an AI game master",
    version
)]
struct Args {
    /// Character name
    #[arg(long, default_value = "Adventurer")]
    name: String,

    /// Class id (guardian, ranger, rogue, seraph, sorcerer, warrior)
    #[arg(long, default_value = "warrior")]
    class: String,

    /// Ancestry id
    #[arg(long, default_value = "human")]
    ancestry: String,

    /// Agility, strength, finesse, instinct, presence, knowledge; must sum to 3
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    traits: Option<Vec<i32>>,

    /// Override the model from DUALITY_MODEL
    #[arg(long)]
    model: Option<String>,

    /// Narrator timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

impl Args {
    fn narrator_config(&self) -> Result<NarratorConfig, Box<dyn std::error::Error>> {
        let mut config = NarratorConfig::from_env()?;
        if let Some(model) = &self.model {
            config = config.with_model(model.as_str());
        }
        if let Some(secs) = self.timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    fn headless_config(&self, narrator: NarratorConfig) -> HeadlessConfig {
        let mut config = HeadlessConfig::quick_start(self.name.as_str())
            .with_class(self.class.as_str())
            .with_ancestry(self.ancestry.as_str())
            .with_narrator(narrator);
        if let Some(traits) = &self.traits {
            config = config.with_traits(traits.clone());
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays a clean protocol stream.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "duality=info,duality_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let narrator_config = match args.narrator_config() {
        Ok(config) => config,
        Err(e) => {
            println!("[ERROR] {e}");
            std::process::exit(1);
        }
    };

    let narrator = match ChatNarrator::from_env(narrator_config.clone()) {
        Ok(narrator) => Arc::new(narrator),
        Err(e) => {
            println!("[ERROR] {e}");
            eprintln!("Set DEEPSEEK_API_KEY in a .env file or the environment.");
            std::process::exit(1);
        }
    };

    tracing::info!(model = %narrator.config().model, "Starting headless table");
    let config = args.headless_config(narrator_config);
    headless::run_headless(config, narrator).await?;
    Ok(())
}
