//! GameSession - one table of players, their characters and the shared
//! Hope/Fear economy.
//!
//! Every state change made through this type is recorded in the session's
//! [`EventLog`]. Mutations are synchronous; callers that share a session
//! between tasks wrap it in a mutex (see [`crate::manager`]).

use crate::character::{Character, CharacterError, DamageReport, HealReport, PlayerId, TraitCheck};
use crate::dice::{Advantage, DiceRoller, Outcome, RandomDice};
use crate::event::{EventKind, EventLog, GameEvent};
use crate::gm::NarrationHistory;
use crate::scene::{SceneState, SceneType};
use crate::traits::{Trait, TraitError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

pub const DEFAULT_MAX_PLAYERS: usize = 6;

/// Number of events returned by [`GameSession::recent_events`] callers that
/// have no preference.
pub const DEFAULT_RECENT_EVENTS: usize = 10;

/// Broad category of a [`SessionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input; nothing changed.
    Validation,
    /// The session cannot do that right now; nothing changed.
    State,
    /// An unknown session or player id.
    NotFound,
}

/// Errors from session operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Trait(#[from] TraitError),

    #[error(transparent)]
    Character(#[from] CharacterError),

    #[error("Session is full ({max} players)")]
    SessionFull { max: usize },

    #[error("Player {0} has already joined")]
    AlreadyJoined(PlayerId),

    #[error("Cannot {action} while the session is {state}")]
    InvalidState {
        action: &'static str,
        state: SessionState,
    },

    #[error("Cannot start a session with no players")]
    NoPlayers,

    #[error("Not enough {pool}: requested {requested}, available {available}")]
    InsufficientPool {
        pool: &'static str,
        requested: u32,
        available: u32,
    },

    #[error("Character not found for player {0}")]
    PlayerNotFound(PlayerId),

    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::Trait(_) | SessionError::Character(_) => ErrorKind::Validation,
            SessionError::SessionFull { .. }
            | SessionError::AlreadyJoined(_)
            | SessionError::InvalidState { .. }
            | SessionError::NoPlayers
            | SessionError::InsufficientPool { .. } => ErrorKind::State,
            SessionError::PlayerNotFound(_) | SessionError::SessionNotFound(_) => {
                ErrorKind::NotFound
            }
        }
    }

    /// A line fit to show a player, worded by [`ErrorKind`].
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::Validation => format!("That can't be done as asked: {self}."),
            ErrorKind::State => match self {
                SessionError::InvalidState { state, .. } => {
                    format!("The table is {state} right now, so that will have to wait.")
                }
                SessionError::InsufficientPool { pool, .. } => {
                    format!("There isn't enough {pool} in the pool for that.")
                }
                _ => "The table isn't ready for that just now.".to_string(),
            },
            ErrorKind::NotFound => {
                "That hero or table can't be found. Check the name and try again.".to_string()
            }
        }
    }
}

/// Unique identifier for sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Short form used in default session names.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Waiting,
    Active,
    Paused,
    Completed,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Waiting => "waiting",
            SessionState::Active => "active",
            SessionState::Paused => "paused",
            SessionState::Completed => "completed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-session table settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    pub auto_save: bool,
    pub public_rolls: bool,
    pub allow_spectators: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            auto_save: true,
            public_rolls: true,
            allow_spectators: false,
        }
    }
}

/// A seated player and their character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seat {
    pub player_id: PlayerId,
    pub character: Character,
}

/// An entry in the rolling story summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryEntry {
    pub text: String,
    pub player: Option<PlayerId>,
    pub timestamp: DateTime<Utc>,
}

/// Outcome of [`GameSession::make_character_roll`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollReport {
    pub player_id: PlayerId,
    pub character: String,
    pub check: TraitCheck,
    pub hope_pool: u32,
    pub fear_pool: u32,
}

fn default_dice() -> Box<dyn DiceRoller> {
    Box::new(RandomDice::new())
}

/// A single game session.
#[derive(Debug, Serialize, Deserialize)]
pub struct GameSession {
    pub id: SessionId,
    pub name: String,
    pub gm_id: PlayerId,
    state: SessionState,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub last_activity: DateTime<Utc>,
    max_players: usize,
    seats: Vec<Seat>,
    current_scene: Option<SceneState>,
    hope_pool: u32,
    fear_pool: u32,
    events: EventLog,
    story_log: Vec<StoryEntry>,
    #[serde(default)]
    narration: NarrationHistory,
    pub settings: SessionSettings,
    #[serde(skip, default = "default_dice")]
    dice: Box<dyn DiceRoller>,
}

impl GameSession {
    /// Create a session in the waiting state.
    pub fn new(gm_id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        let id = SessionId::new();
        let name = name.into();
        let name = if name.trim().is_empty() {
            format!("Session {}", id.short())
        } else {
            name
        };
        let now = Utc::now();
        Self {
            id,
            name,
            gm_id: gm_id.into(),
            state: SessionState::Waiting,
            created_at: now,
            started_at: None,
            completed_at: None,
            last_activity: now,
            max_players: DEFAULT_MAX_PLAYERS,
            seats: Vec::new(),
            current_scene: None,
            hope_pool: 0,
            fear_pool: 0,
            events: EventLog::new(),
            story_log: Vec::new(),
            narration: NarrationHistory::new(),
            settings: SessionSettings::default(),
            dice: default_dice(),
        }
    }

    pub fn with_max_players(mut self, max_players: usize) -> Self {
        self.max_players = max_players;
        self
    }

    pub fn with_settings(mut self, settings: SessionSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Replace the dice used for every roll in this session.
    pub fn with_dice(mut self, dice: impl DiceRoller + 'static) -> Self {
        self.dice = Box::new(dice);
        self
    }

    pub fn set_dice(&mut self, dice: impl DiceRoller + 'static) {
        self.dice = Box::new(dice);
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn max_players(&self) -> usize {
        self.max_players
    }

    pub fn player_count(&self) -> usize {
        self.seats.len()
    }

    pub fn hope_pool(&self) -> u32 {
        self.hope_pool
    }

    pub fn fear_pool(&self) -> u32 {
        self.fear_pool
    }

    pub fn current_scene(&self) -> Option<&SceneState> {
        self.current_scene.as_ref()
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn story_log(&self) -> &[StoryEntry] {
        &self.story_log
    }

    /// Exchanges between players and the narrator at this table.
    pub fn narration(&self) -> &NarrationHistory {
        &self.narration
    }

    pub fn narration_mut(&mut self) -> &mut NarrationHistory {
        &mut self.narration
    }

    /// Seats in join order.
    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.seats.iter().map(|s| s.player_id.clone()).collect()
    }

    pub fn character(&self, player: &PlayerId) -> Option<&Character> {
        self.seats
            .iter()
            .find(|s| &s.player_id == player)
            .map(|s| &s.character)
    }

    pub fn character_mut(&mut self, player: &PlayerId) -> Option<&mut Character> {
        self.seats
            .iter_mut()
            .find(|s| &s.player_id == player)
            .map(|s| &mut s.character)
    }

    fn seated(&mut self, player: &PlayerId) -> Result<&mut Character, SessionError> {
        self.character_mut(player)
            .ok_or_else(|| SessionError::PlayerNotFound(player.clone()))
    }

    /// The most recent events, oldest first.
    pub fn recent_events(&self, limit: usize) -> &[GameEvent] {
        self.events.recent(limit)
    }

    fn log(
        &mut self,
        kind: EventKind,
        player: Option<PlayerId>,
        description: impl Into<String>,
        details: serde_json::Value,
    ) {
        let event = self.events.push(kind, player, description, details);
        tracing::debug!(
            session = %self.id,
            sequence = event.sequence,
            kind = %event.kind,
            "{}",
            event.description
        );
        self.last_activity = event.timestamp;
    }

    // ========================================================================
    // Players
    // ========================================================================

    /// Seat a player. The character is re-owned by `player_id`.
    pub fn add_player(
        &mut self,
        player_id: impl Into<PlayerId>,
        mut character: Character,
    ) -> Result<(), SessionError> {
        let player_id = player_id.into();
        if self.state == SessionState::Completed {
            return Err(SessionError::InvalidState {
                action: "add a player",
                state: self.state,
            });
        }
        if self.seats.len() >= self.max_players {
            return Err(SessionError::SessionFull {
                max: self.max_players,
            });
        }
        if self.character(&player_id).is_some() {
            return Err(SessionError::AlreadyJoined(player_id));
        }

        character.player_id = player_id.clone();
        let description = format!("{} joined the game", character.name);
        let details = json!({"character": character.name, "class": character.class_id()});
        self.seats.push(Seat {
            player_id: player_id.clone(),
            character,
        });
        self.log(EventKind::PlayerJoined, Some(player_id), description, details);
        Ok(())
    }

    /// Remove a player and return their character.
    pub fn remove_player(&mut self, player_id: &PlayerId) -> Result<Character, SessionError> {
        let index = self
            .seats
            .iter()
            .position(|s| &s.player_id == player_id)
            .ok_or_else(|| SessionError::PlayerNotFound(player_id.clone()))?;
        let seat = self.seats.remove(index);
        if let Some(scene) = self.current_scene.as_mut() {
            scene.remove_participant(player_id);
        }
        self.log(
            EventKind::PlayerLeft,
            Some(player_id.clone()),
            format!("{} left the game", seat.character.name),
            json!({"character": seat.character.name}),
        );
        Ok(seat.character)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Move from waiting to active and open an exploration scene with
    /// everyone seated.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Waiting {
            return Err(SessionError::InvalidState {
                action: "start",
                state: self.state,
            });
        }
        if self.seats.is_empty() {
            return Err(SessionError::NoPlayers);
        }

        self.state = SessionState::Active;
        self.started_at = Some(Utc::now());
        let participants = self.player_ids();
        self.start_scene(SceneType::Exploration, "The adventure begins", participants);
        self.log(
            EventKind::SessionStarted,
            None,
            "The session has begun!",
            json!({"players": self.seats.len()}),
        );
        tracing::info!(session = %self.id, name = %self.name, "Session started");
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Active {
            return Err(SessionError::InvalidState {
                action: "pause",
                state: self.state,
            });
        }
        self.state = SessionState::Paused;
        self.log(EventKind::SessionPaused, None, "The session is paused", json!({}));
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Paused {
            return Err(SessionError::InvalidState {
                action: "resume",
                state: self.state,
            });
        }
        self.state = SessionState::Active;
        self.log(EventKind::SessionResumed, None, "The session resumes", json!({}));
        Ok(())
    }

    /// Close the session for good.
    pub fn complete(&mut self) -> Result<(), SessionError> {
        if self.state == SessionState::Completed {
            return Err(SessionError::InvalidState {
                action: "complete",
                state: self.state,
            });
        }
        self.state = SessionState::Completed;
        self.completed_at = Some(Utc::now());
        self.current_scene = None;
        self.log(EventKind::SessionCompleted, None, "The session has ended", json!({}));
        tracing::info!(session = %self.id, "Session completed");
        Ok(())
    }

    // ========================================================================
    // Scenes
    // ========================================================================

    /// Replace the current scene.
    pub fn start_scene(
        &mut self,
        scene_type: SceneType,
        description: impl Into<String>,
        participants: Vec<PlayerId>,
    ) {
        let scene = SceneState::new(scene_type, description, participants);
        let description = format!("Scene started: {}", scene.description);
        let details = json!({
            "type": scene.scene_type,
            "participants": scene.participants,
            "round": scene.round,
        });
        let first_turn = scene.current_turn.clone();
        self.current_scene = Some(scene);
        self.log(EventKind::SceneStarted, None, description, details);
        if let Some(player) = first_turn {
            self.log_turn(player);
        }
    }

    /// Clear the current scene. Nothing happens when there is none.
    pub fn end_scene(&mut self) {
        if let Some(scene) = self.current_scene.take() {
            self.log(
                EventKind::SceneEnded,
                None,
                format!("Scene ended: {}", scene.description),
                json!({"type": scene.scene_type, "rounds": scene.round}),
            );
        }
    }

    /// Pass the turn in an action scene, returning whose turn it is now.
    pub fn advance_turn(&mut self) -> Option<PlayerId> {
        let next = self.current_scene.as_mut()?.advance_turn()?.clone();
        self.log_turn(next.clone());
        Some(next)
    }

    fn log_turn(&mut self, player: PlayerId) {
        let name = self
            .character(&player)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| player.to_string());
        let round = self.current_scene.as_ref().map(|s| s.round).unwrap_or(0);
        self.log(
            EventKind::TurnStarted,
            Some(player),
            format!("{name}'s turn"),
            json!({"round": round}),
        );
    }

    // ========================================================================
    // Rolls, damage and healing
    // ========================================================================

    /// Roll a trait check for a seated character and feed the outcome into
    /// the shared pools.
    pub fn make_character_roll(
        &mut self,
        player_id: &PlayerId,
        trait_name: &str,
        difficulty: i32,
        advantage: Advantage,
    ) -> Result<RollReport, SessionError> {
        if self.character(player_id).is_none() {
            return Err(SessionError::PlayerNotFound(player_id.clone()));
        }
        let trait_used: Trait = trait_name.parse()?;

        let index = self
            .seats
            .iter()
            .position(|s| &s.player_id == player_id)
            .ok_or_else(|| SessionError::PlayerNotFound(player_id.clone()))?;
        let character = &mut self.seats[index].character;
        let check = character.make_trait_check(self.dice.as_mut(), trait_used, difficulty, advantage);
        let name = character.name.clone();

        match check.outcome() {
            Outcome::SuccessWithHope => self.hope_pool += 1,
            Outcome::SuccessWithFear => self.fear_pool += 1,
            Outcome::CriticalSuccess => {}
        }

        let details = event_details(&check);
        self.log(
            EventKind::DiceRoll,
            Some(player_id.clone()),
            check.summary.clone(),
            details,
        );

        Ok(RollReport {
            player_id: player_id.clone(),
            character: name,
            check,
            hope_pool: self.hope_pool,
            fear_pool: self.fear_pool,
        })
    }

    /// Damage a seated character. Dropping to zero logs a separate
    /// `character_dying` event; the character stays alive until
    /// [`GameSession::record_death`] resolves it.
    pub fn deal_damage(
        &mut self,
        player_id: &PlayerId,
        amount: u32,
        source: &str,
    ) -> Result<DamageReport, SessionError> {
        let character = self.seated(player_id)?;
        let report = character.take_damage(amount)?;
        let name = character.name.clone();

        let mut description = format!("{name} takes {} damage", report.hits_taken);
        if report.damage_blocked > 0 {
            description.push_str(&format!(" ({} blocked)", report.damage_blocked));
        }
        if !source.is_empty() {
            description.push_str(&format!(" from {source}"));
        }
        let mut details = event_details(&report);
        if let Some(map) = details.as_object_mut() {
            map.insert("source".to_string(), json!(source));
        }
        self.log(EventKind::DamageDealt, Some(player_id.clone()), description, details);

        if report.is_dying {
            self.log(
                EventKind::CharacterDying,
                Some(player_id.clone()),
                format!("{name} is dying!"),
                json!({"source": source}),
            );
            tracing::info!(session = %self.id, character = %name, "Character reached 0 hit points");
        }
        Ok(report)
    }

    pub fn heal(
        &mut self,
        player_id: &PlayerId,
        amount: u32,
        source: &str,
    ) -> Result<HealReport, SessionError> {
        let character = self.seated(player_id)?;
        let report = character.heal(amount);
        let mut description = format!("{} recovers {} hit points", character.name, report.healed);
        if !source.is_empty() {
            description.push_str(&format!(" from {source}"));
        }
        let mut details = event_details(&report);
        if let Some(map) = details.as_object_mut() {
            map.insert("source".to_string(), json!(source));
        }
        self.log(EventKind::Healing, Some(player_id.clone()), description, details);
        Ok(report)
    }

    /// Resolve a dying character as dead.
    pub fn record_death(&mut self, player_id: &PlayerId) -> Result<(), SessionError> {
        let character = self.seated(player_id)?;
        if !character.alive {
            return Ok(());
        }
        character.alive = false;
        let name = character.name.clone();
        if let Some(scene) = self.current_scene.as_mut() {
            scene.remove_participant(player_id);
        }
        self.log(
            EventKind::CharacterDied,
            Some(player_id.clone()),
            format!("{name} has died"),
            json!({}),
        );
        Ok(())
    }

    // ========================================================================
    // Hope and Fear
    // ========================================================================

    /// Add to the shared pools directly, e.g. from GM fiat.
    pub fn gain_hope(&mut self, amount: u32) {
        self.hope_pool = self.hope_pool.saturating_add(amount);
    }

    pub fn gain_fear(&mut self, amount: u32) {
        self.fear_pool = self.fear_pool.saturating_add(amount);
    }

    pub fn spend_hope(&mut self, amount: u32) -> Result<u32, SessionError> {
        if self.hope_pool < amount {
            return Err(SessionError::InsufficientPool {
                pool: "Hope",
                requested: amount,
                available: self.hope_pool,
            });
        }
        self.hope_pool -= amount;
        self.log(
            EventKind::HopeSpent,
            None,
            format!("{amount} Hope spent"),
            json!({"amount": amount, "remaining": self.hope_pool}),
        );
        Ok(self.hope_pool)
    }

    pub fn spend_fear(&mut self, amount: u32) -> Result<u32, SessionError> {
        if self.fear_pool < amount {
            return Err(SessionError::InsufficientPool {
                pool: "Fear",
                requested: amount,
                available: self.fear_pool,
            });
        }
        self.fear_pool -= amount;
        self.log(
            EventKind::FearSpent,
            None,
            format!("The GM spends {amount} Fear"),
            json!({"amount": amount, "remaining": self.fear_pool}),
        );
        Ok(self.fear_pool)
    }

    // ========================================================================
    // Story
    // ========================================================================

    pub fn record_story(&mut self, text: impl Into<String>, player: Option<PlayerId>) {
        let text = text.into();
        self.story_log.push(StoryEntry {
            text: text.clone(),
            player: player.clone(),
            timestamp: Utc::now(),
        });
        self.log(EventKind::Story, player, text, json!({}));
    }

    // ========================================================================
    // Status
    // ========================================================================

    pub fn status(&self) -> SessionStatus {
        let characters = self
            .seats
            .iter()
            .map(|seat| {
                let c = &seat.character;
                CharacterStatus {
                    player_id: seat.player_id.clone(),
                    name: c.name.clone(),
                    class: c.class_name().to_string(),
                    hp: c.hit_points.to_string(),
                    hope: format!("{}/{}", c.hope, c.max_hope),
                    is_alive: c.alive,
                    is_current_turn: self
                        .current_scene
                        .as_ref()
                        .is_some_and(|s| s.is_turn_of(&seat.player_id)),
                }
            })
            .collect();

        SessionStatus {
            session_id: self.id,
            name: self.name.clone(),
            state: self.state,
            gm_id: self.gm_id.clone(),
            players_count: self.seats.len(),
            max_players: self.max_players,
            hope_pool: self.hope_pool,
            fear_pool: self.fear_pool,
            current_scene: self.current_scene.as_ref().map(|s| SceneStatus {
                scene_type: s.scene_type,
                description: s.description.clone(),
                round: s.round,
                current_turn: s.current_turn.clone(),
            }),
            characters,
            uptime_secs: (Utc::now() - self.created_at).num_seconds().max(0) as u64,
        }
    }
}

/// Read-only snapshot of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub session_id: SessionId,
    pub name: String,
    pub state: SessionState,
    pub gm_id: PlayerId,
    pub players_count: usize,
    pub max_players: usize,
    pub hope_pool: u32,
    pub fear_pool: u32,
    pub current_scene: Option<SceneStatus>,
    pub characters: Vec<CharacterStatus>,
    pub uptime_secs: u64,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} [{}] players {}/{} | Hope {} | Fear {}",
            self.name, self.state, self.players_count, self.max_players, self.hope_pool, self.fear_pool
        )?;
        if let Some(scene) = &self.current_scene {
            write!(f, "Scene: {} - {}", scene.scene_type, scene.description)?;
            if scene.scene_type == SceneType::Action {
                write!(f, " (round {})", scene.round)?;
            }
            writeln!(f)?;
        }
        for c in &self.characters {
            writeln!(
                f,
                "{}{} ({}) HP {} Hope {}{}",
                if c.is_current_turn { "> " } else { "  " },
                c.name,
                c.class,
                c.hp,
                c.hope,
                if c.is_alive { "" } else { " [dead]" }
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneStatus {
    #[serde(rename = "type")]
    pub scene_type: SceneType,
    pub description: String,
    pub round: u32,
    pub current_turn: Option<PlayerId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterStatus {
    pub player_id: PlayerId,
    pub name: String,
    pub class: String,
    pub hp: String,
    pub hope: String,
    pub is_alive: bool,
    pub is_current_turn: bool,
}

/// Structured details for an event. A value that cannot be serialized is
/// logged and recorded as an empty object.
fn event_details<T: Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or_else(|error| {
        tracing::warn!(%error, "Event details could not be serialized");
        json!({})
    })
}
