//! Scenes and turn order.

use crate::character::PlayerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneType {
    Exploration,
    Social,
    Action,
    Rest,
}

impl SceneType {
    pub fn name(&self) -> &'static str {
        match self {
            SceneType::Exploration => "Exploration",
            SceneType::Social => "Social",
            SceneType::Action => "Action",
            SceneType::Rest => "Rest",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            SceneType::Exploration => "exploration",
            SceneType::Social => "social",
            SceneType::Action => "action",
            SceneType::Rest => "rest",
        }
    }

    pub fn all() -> [SceneType; 4] {
        [
            SceneType::Exploration,
            SceneType::Social,
            SceneType::Action,
            SceneType::Rest,
        ]
    }
}

impl fmt::Display for SceneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for SceneType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        SceneType::all()
            .into_iter()
            .find(|t| t.key() == key)
            .ok_or_else(|| format!("Unknown scene type: {}", s.trim()))
    }
}

/// The current narrative beat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneState {
    pub scene_type: SceneType,
    pub description: String,
    pub participants: Vec<PlayerId>,
    /// 1 and up for action scenes, 0 otherwise.
    pub round: u32,
    /// Only set in action scenes, always one of `participants`.
    pub current_turn: Option<PlayerId>,
    pub started_at: DateTime<Utc>,
}

impl SceneState {
    pub fn new(scene_type: SceneType, description: impl Into<String>, participants: Vec<PlayerId>) -> Self {
        let (round, current_turn) = match scene_type {
            SceneType::Action => (1, participants.first().cloned()),
            _ => (0, None),
        };
        Self {
            scene_type,
            description: description.into(),
            participants,
            round,
            current_turn,
            started_at: Utc::now(),
        }
    }

    pub fn is_action(&self) -> bool {
        self.scene_type == SceneType::Action
    }

    pub fn is_turn_of(&self, player: &PlayerId) -> bool {
        self.current_turn.as_ref() == Some(player)
    }

    /// Pass the turn to the next participant.
    ///
    /// Does nothing outside action scenes or with no participants. A current
    /// turn that no longer names a participant counts as the first slot.
    /// Returns the new current participant.
    pub fn advance_turn(&mut self) -> Option<&PlayerId> {
        if !self.is_action() || self.participants.is_empty() {
            return None;
        }

        let index = self
            .current_turn
            .as_ref()
            .and_then(|current| self.participants.iter().position(|p| p == current))
            .unwrap_or(0);

        let next = index + 1;
        let next = if next >= self.participants.len() {
            self.round += 1;
            0
        } else {
            next
        };

        self.current_turn = Some(self.participants[next].clone());
        self.current_turn.as_ref()
    }

    /// Drop a participant, keeping the current turn valid.
    pub fn remove_participant(&mut self, player: &PlayerId) {
        let Some(index) = self.participants.iter().position(|p| p == player) else {
            return;
        };
        self.participants.remove(index);
        if self.current_turn.as_ref() == Some(player) {
            self.current_turn = if self.participants.is_empty() {
                None
            } else {
                Some(self.participants[index % self.participants.len()].clone())
            };
        }
    }

    pub fn summary(&self) -> String {
        format!("{}: {}", self.scene_type, self.description)
    }
}
