//! Headless game interface for programmatic use.
//!
//! Runs a single-player table without a chat front-end. It's designed for:
//! - Automated testing with scripted or real narration
//! - Coding agents playing the game
//! - Script-driven sessions from a terminal
//!
//! # Example
//!
//! ```ignore
//! use duality_core::headless::{HeadlessConfig, HeadlessGame};
//! use duality_core::gm::ChatNarrator;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let narrator = Arc::new(ChatNarrator::from_env(Default::default())?);
//!     let mut game = HeadlessGame::new(HeadlessConfig::quick_start("Vex"), narrator).await?;
//!
//!     let response = game.send("I look around the market").await?;
//!     println!("{}", response.text);
//!
//!     game.save("table.json").await?;
//!     Ok(())
//! }
//! ```

use crate::character::{Character, PlayerId};
use crate::character_builder::{BuilderError, CharacterBuilder};
use crate::config::NarratorConfig;
use crate::content::ContentCatalog;
use crate::dice::{Advantage, DiceRoller};
use crate::gm::{GameMaster, GmResponse, Narrator};
use crate::manager::{SessionManager, SharedSession};
use crate::persist::{PersistError, SavedSession, SessionMetadata};
use crate::scene::SceneType;
use crate::session::{GameSession, RollReport, SessionError, SessionId, SessionStatus};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HeadlessError {
    #[error("Character creation failed: {0}")]
    Builder(#[from] BuilderError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Save error: {0}")]
    Persist(#[from] PersistError),

    #[error("Saved session has no players")]
    EmptySave,
}

/// Configuration for a headless game.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    pub name: String,
    pub class: String,
    pub ancestry: String,
    /// Agility, strength, finesse, instinct, presence, knowledge.
    pub traits: Vec<i32>,
    pub player_id: String,
    pub table_name: String,
    /// Replaces the default opening exploration scene.
    pub opening_scene: Option<String>,
    pub narrator: NarratorConfig,
}

impl HeadlessConfig {
    /// Human warrior with a strength-forward trait spread.
    pub fn quick_start(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class: "warrior".to_string(),
            ancestry: "human".to_string(),
            traits: vec![1, 2, 0, 1, 0, -1],
            player_id: "player".to_string(),
            table_name: "Headless Table".to_string(),
            opening_scene: None,
            narrator: NarratorConfig::default(),
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = class.into();
        self
    }

    pub fn with_ancestry(mut self, ancestry: impl Into<String>) -> Self {
        self.ancestry = ancestry.into();
        self
    }

    pub fn with_traits(mut self, traits: Vec<i32>) -> Self {
        self.traits = traits;
        self
    }

    pub fn with_table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = name.into();
        self
    }

    pub fn with_opening_scene(mut self, description: impl Into<String>) -> Self {
        self.opening_scene = Some(description.into());
        self
    }

    pub fn with_narrator(mut self, narrator: NarratorConfig) -> Self {
        self.narrator = narrator;
        self
    }

    fn build_character(&self, catalog: &ContentCatalog) -> Result<Character, BuilderError> {
        CharacterBuilder::new()
            .name(&self.name)
            .player(self.player_id.as_str())
            .class(&self.class)
            .ancestry(&self.ancestry)
            .trait_values(&self.traits)
            .build(catalog)
    }
}

/// An entry in the game transcript.
#[derive(Debug, Clone)]
pub struct TranscriptEntry {
    pub player_input: String,
    pub gm_response: String,
    pub turn: usize,
}

/// A single-player table that can be driven programmatically.
pub struct HeadlessGame {
    gm: GameMaster,
    session_id: SessionId,
    player: PlayerId,
    transcript: Vec<TranscriptEntry>,
}

impl HeadlessGame {
    /// Build the character, seat it and start the session.
    pub async fn new(config: HeadlessConfig, narrator: Arc<dyn Narrator>) -> Result<Self, HeadlessError> {
        let character = config.build_character(&ContentCatalog::default())?;
        let player = PlayerId::new(config.player_id.as_str());

        let mut session = GameSession::new("headless-gm", config.table_name.as_str());
        session.add_player(player.clone(), character)?;
        session.start()?;
        if let Some(opening) = &config.opening_scene {
            let participants = session.player_ids();
            session.start_scene(SceneType::Exploration, opening.as_str(), participants);
        }

        Ok(Self::from_session(session, player, narrator, config.narrator).await)
    }

    async fn from_session(
        session: GameSession,
        player: PlayerId,
        narrator: Arc<dyn Narrator>,
        config: NarratorConfig,
    ) -> Self {
        let manager = Arc::new(SessionManager::new());
        let session_id = manager.insert(session).await;
        let gm = GameMaster::new(manager, narrator).with_config(config);
        Self {
            gm,
            session_id,
            player,
            transcript: Vec::new(),
        }
    }

    /// Resume a saved session, playing as its first seated player.
    pub async fn load(
        path: impl AsRef<Path>,
        narrator: Arc<dyn Narrator>,
        config: NarratorConfig,
    ) -> Result<Self, HeadlessError> {
        let session = SavedSession::load_json(path).await?.into_session();
        let player = session
            .player_ids()
            .into_iter()
            .next()
            .ok_or(HeadlessError::EmptySave)?;
        Ok(Self::from_session(session, player, narrator, config).await)
    }

    async fn shared(&self) -> Result<SharedSession, HeadlessError> {
        Ok(self.gm.sessions().require(&self.session_id).await?)
    }

    /// Send player input to the game master.
    pub async fn send(&mut self, input: &str) -> Result<GmResponse, HeadlessError> {
        let response = self
            .gm
            .process_player_action(&self.session_id, &self.player, input)
            .await?;
        self.transcript.push(TranscriptEntry {
            player_input: input.to_string(),
            gm_response: response.text.clone(),
            turn: self.transcript.len() + 1,
        });
        Ok(response)
    }

    /// Roll a trait check for the player's character.
    pub async fn roll(
        &self,
        trait_name: &str,
        difficulty: i32,
        advantage: Advantage,
    ) -> Result<RollReport, HeadlessError> {
        let shared = self.shared().await?;
        let mut session = shared.lock().await;
        Ok(session.make_character_roll(&self.player, trait_name, difficulty, advantage)?)
    }

    /// Start a scene. Without a description the game master narrates one.
    pub async fn new_scene(
        &self,
        scene_type: SceneType,
        description: Option<&str>,
    ) -> Result<String, HeadlessError> {
        match description {
            Some(text) => {
                let shared = self.shared().await?;
                let mut session = shared.lock().await;
                let participants = session.player_ids();
                session.start_scene(scene_type, text, participants);
                Ok(text.to_string())
            }
            None => Ok(self
                .gm
                .start_new_scene(&self.session_id, scene_type, "", Vec::new())
                .await?),
        }
    }

    pub async fn status(&self) -> Result<SessionStatus, HeadlessError> {
        let shared = self.shared().await?;
        let session = shared.lock().await;
        Ok(session.status())
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> Result<SessionMetadata, HeadlessError> {
        let shared = self.shared().await?;
        let session = shared.lock().await;
        Ok(SavedSession::save_session(&session, path).await?)
    }

    /// Replace the dice, e.g. with scripted ones for tests.
    pub async fn set_dice(&self, dice: impl DiceRoller + 'static) -> Result<(), HeadlessError> {
        let shared = self.shared().await?;
        shared.lock().await.set_dice(dice);
        Ok(())
    }

    pub fn player(&self) -> &PlayerId {
        &self.player
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn last_response(&self) -> Option<&str> {
        self.transcript.last().map(|e| e.gm_response.as_str())
    }
}
