//! Line protocol over stdin/stdout.
//!
//! - Plain lines are player actions sent to the game master
//! - Lines starting with `#` are commands (roll, scene, save, load, status, quit)
//! - Every reply line starts with a tag such as `[GM]` or `[ERROR]`

use duality_core::dice::{Advantage, DEFAULT_DIFFICULTY};
use duality_core::gm::Narrator;
use duality_core::headless::{HeadlessConfig, HeadlessError, HeadlessGame};
use duality_core::SceneType;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

const HELP: &str = "\
  #quit                          - Exit the game
  #status                        - Show the table
  #roll <trait> [difficulty] [adv|dis] - Roll a trait check
  #scene <type> [description]    - Start exploration, social, action or rest
  #save <path>                   - Save the session
  #load <path>                   - Load a saved session
  #help                          - Show this help
  (anything else is sent as a player action)";

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Quit,
    Status,
    Help,
    Roll {
        trait_name: String,
        difficulty: i32,
        advantage: Advantage,
    },
    Scene {
        scene_type: SceneType,
        description: Option<String>,
    },
    Save(String),
    Load(String),
}

/// Parse a `#` command line (without the leading `#`).
fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let name = parts.next().unwrap_or_default().to_lowercase();
    match name.as_str() {
        "quit" | "exit" => Ok(Command::Quit),
        "status" => Ok(Command::Status),
        "help" => Ok(Command::Help),
        "roll" => {
            let trait_name = parts
                .next()
                .ok_or("Usage: #roll <trait> [difficulty] [adv|dis]")?
                .to_string();
            let mut difficulty = DEFAULT_DIFFICULTY;
            let (mut adv, mut dis) = (false, false);
            for arg in parts {
                match arg.to_lowercase().as_str() {
                    "adv" | "advantage" => adv = true,
                    "dis" | "disadvantage" => dis = true,
                    other => {
                        difficulty = other
                            .parse()
                            .map_err(|_| format!("Invalid difficulty: {other}"))?;
                    }
                }
            }
            Ok(Command::Roll {
                trait_name,
                difficulty,
                advantage: Advantage::from_flags(adv, dis),
            })
        }
        "scene" => {
            let scene_type = parts
                .next()
                .ok_or("Usage: #scene <type> [description]")?
                .parse::<SceneType>()?;
            let rest = parts.collect::<Vec<_>>().join(" ");
            Ok(Command::Scene {
                scene_type,
                description: (!rest.is_empty()).then_some(rest),
            })
        }
        "save" => parts
            .next()
            .map(|p| Command::Save(p.to_string()))
            .ok_or_else(|| "Usage: #save <path>".to_string()),
        "load" => parts
            .next()
            .map(|p| Command::Load(p.to_string()))
            .ok_or_else(|| "Usage: #load <path>".to_string()),
        _ => Err("Unknown command. Type #help for help.".to_string()),
    }
}

/// Player-facing wording for a failed command. The raw error goes to the log.
fn friendly(error: &HeadlessError) -> String {
    tracing::debug!(%error, "Command failed");
    match error {
        HeadlessError::Session(e) => e.user_message(),
        HeadlessError::Builder(e) => format!("Your hero couldn't be created: {e}."),
        HeadlessError::Persist(_) => {
            "The saved game couldn't be read or written. Check the path and try again.".to_string()
        }
        HeadlessError::EmptySave => "That save has no heroes in it to play.".to_string(),
    }
}

fn print_status(status: &duality_core::session::SessionStatus) {
    for line in status.to_string().lines() {
        println!("[STATUS] {line}");
    }
}

/// Run the game until `#quit` or end of input.
pub async fn run_headless(
    config: HeadlessConfig,
    narrator: Arc<dyn Narrator>,
) -> Result<(), HeadlessError> {
    let narrator_config = config.narrator.clone();
    let mut game = HeadlessGame::new(config, narrator.clone()).await?;

    println!("=== Duality Headless Mode ===");
    print_status(&game.status().await?);
    println!();
    println!("Commands:");
    println!("{HELP}");
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Error reading input: {e}");
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('#') {
            let command = match parse_command(command) {
                Ok(command) => command,
                Err(e) => {
                    println!("[ERROR] {e}");
                    continue;
                }
            };
            match command {
                Command::Quit => {
                    println!("Goodbye!");
                    break;
                }
                Command::Help => {
                    println!("[HELP]");
                    println!("{HELP}");
                }
                Command::Status => match game.status().await {
                    Ok(status) => print_status(&status),
                    Err(e) => println!("[ERROR] {}", friendly(&e)),
                },
                Command::Roll {
                    trait_name,
                    difficulty,
                    advantage,
                } => match game.roll(&trait_name, difficulty, advantage).await {
                    Ok(report) => {
                        println!("[ROLL] {}", report.check.summary);
                        println!(
                            "[ROLL] {} | Hope {} | Fear {}",
                            report.check.outcome(),
                            report.hope_pool,
                            report.fear_pool
                        );
                    }
                    Err(e) => println!("[ERROR] {}", friendly(&e)),
                },
                Command::Scene {
                    scene_type,
                    description,
                } => match game.new_scene(scene_type, description.as_deref()).await {
                    Ok(text) => println!("[GM] {text}"),
                    Err(e) => println!("[ERROR] {}", friendly(&e)),
                },
                Command::Save(path) => match game.save(&path).await {
                    Ok(metadata) => println!(
                        "[SAVED] {} ({} events) saved to {path}",
                        metadata.name, metadata.events
                    ),
                    Err(e) => println!("[ERROR] {}", friendly(&e)),
                },
                Command::Load(path) => {
                    match HeadlessGame::load(&path, narrator.clone(), narrator_config.clone()).await {
                        Ok(loaded) => {
                            game = loaded;
                            println!("[LOADED] Game loaded from {path}");
                            match game.status().await {
                                Ok(status) => print_status(&status),
                                Err(e) => println!("[ERROR] {}", friendly(&e)),
                            }
                        }
                        Err(e) => println!("[ERROR] {}", friendly(&e)),
                    }
                }
            }
            stdout.flush().ok();
            continue;
        }

        print!("[PROCESSING]");
        stdout.flush().ok();

        let result = game.send(line).await;
        print!("\r            \r");
        stdout.flush().ok();

        match result {
            Ok(response) => {
                for para in response.text.split("\n\n") {
                    println!("[GM] {}", para.trim());
                }
                for effect in &response.effects {
                    println!("[EFFECT] {}", effect.description());
                }
                for request in &response.roll_requests {
                    println!("[ROLL?] {request}");
                }
                println!("[STATUS] Hope {} | Fear {}", response.hope_pool, response.fear_pool);
            }
            Err(e) => println!("[ERROR] {}", friendly(&e)),
        }
        stdout.flush().ok();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roll() {
        assert_eq!(
            parse_command("roll agility").unwrap(),
            Command::Roll {
                trait_name: "agility".to_string(),
                difficulty: DEFAULT_DIFFICULTY,
                advantage: Advantage::Normal,
            }
        );
        assert_eq!(
            parse_command("roll Finesse 14 adv").unwrap(),
            Command::Roll {
                trait_name: "Finesse".to_string(),
                difficulty: 14,
                advantage: Advantage::Advantage,
            }
        );
        assert_eq!(
            parse_command("roll instinct dis adv").unwrap(),
            Command::Roll {
                trait_name: "instinct".to_string(),
                difficulty: DEFAULT_DIFFICULTY,
                advantage: Advantage::Normal,
            }
        );
        assert!(parse_command("roll").is_err());
        assert!(parse_command("roll agility hard").is_err());
    }

    #[test]
    fn test_parse_scene() {
        assert_eq!(
            parse_command("scene action Bandits on the road").unwrap(),
            Command::Scene {
                scene_type: SceneType::Action,
                description: Some("Bandits on the road".to_string()),
            }
        );
        assert_eq!(
            parse_command("scene rest").unwrap(),
            Command::Scene {
                scene_type: SceneType::Rest,
                description: None,
            }
        );
        assert!(parse_command("scene dance").is_err());
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_command("quit").unwrap(), Command::Quit);
        assert_eq!(parse_command("EXIT").unwrap(), Command::Quit);
        assert_eq!(parse_command("save run.json").unwrap(), Command::Save("run.json".to_string()));
        assert!(parse_command("load").is_err());
        assert!(parse_command("dance").is_err());
    }

    #[test]
    fn test_friendly_errors_hide_internals() {
        use duality_core::{SessionError, SessionState};

        let paused = HeadlessError::Session(SessionError::InvalidState {
            action: "take an action",
            state: SessionState::Paused,
        });
        assert_eq!(
            friendly(&paused),
            "The table is paused right now, so that will have to wait."
        );
        assert!(!friendly(&paused).contains("Cannot"));
        assert_eq!(
            friendly(&HeadlessError::EmptySave),
            "That save has no heroes in it to play."
        );
    }
}
