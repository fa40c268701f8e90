//! The session event log.

use crate::character::PlayerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    PlayerJoined,
    PlayerLeft,
    SessionStarted,
    SessionPaused,
    SessionResumed,
    SessionCompleted,
    SceneStarted,
    SceneEnded,
    TurnStarted,
    DiceRoll,
    DamageDealt,
    CharacterDying,
    CharacterDied,
    Healing,
    Story,
    HopeSpent,
    FearSpent,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::PlayerJoined => "player_joined",
            EventKind::PlayerLeft => "player_left",
            EventKind::SessionStarted => "session_started",
            EventKind::SessionPaused => "session_paused",
            EventKind::SessionResumed => "session_resumed",
            EventKind::SessionCompleted => "session_completed",
            EventKind::SceneStarted => "scene_started",
            EventKind::SceneEnded => "scene_ended",
            EventKind::TurnStarted => "turn_started",
            EventKind::DiceRoll => "dice_roll",
            EventKind::DamageDealt => "damage_dealt",
            EventKind::CharacterDying => "character_dying",
            EventKind::CharacterDied => "character_died",
            EventKind::Healing => "healing",
            EventKind::Story => "story",
            EventKind::HopeSpent => "hope_spent",
            EventKind::FearSpent => "fear_spent",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single logged event. Never changed once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    pub id: Uuid,
    /// Position in the session log, starting at 0.
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub kind: EventKind,
    pub player: Option<PlayerId>,
    pub description: String,
    pub details: serde_json::Value,
}

/// Append-only event storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<GameEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event and return a reference to it.
    pub fn push(
        &mut self,
        kind: EventKind,
        player: Option<PlayerId>,
        description: impl Into<String>,
        details: serde_json::Value,
    ) -> &GameEvent {
        let event = GameEvent {
            id: Uuid::new_v4(),
            sequence: self.events.len() as u64,
            timestamp: Utc::now(),
            kind,
            player,
            description: description.into(),
            details,
        };
        self.events.push(event);
        &self.events[self.events.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &GameEvent> {
        self.events.iter()
    }

    pub fn last(&self) -> Option<&GameEvent> {
        self.events.last()
    }

    /// The most recent `limit` events, oldest first.
    pub fn recent(&self, limit: usize) -> &[GameEvent] {
        let start = self.events.len().saturating_sub(limit);
        &self.events[start..]
    }

    pub fn of_kind(&self, kind: EventKind) -> impl Iterator<Item = &GameEvent> {
        self.events.iter().filter(move |e| e.kind == kind)
    }
}
