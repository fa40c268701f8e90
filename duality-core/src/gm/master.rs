//! The game master: one player action from prose in to prose out.
//!
//! The session lock is held for the whole exchange, narrator call included,
//! so actions at one table run one at a time while other tables proceed.
//! Narrator failures and timeouts never reach the caller as errors. They
//! produce a fallback line and leave the session untouched.
//!
//! Narration history lives on the session, so it goes wherever the session
//! goes: into saves, and out of memory when the manager drops the session.

use super::context::{ContextBuilder, NarrationHistory};
use super::effects::{apply_effects, Effect, EffectParser, RollRequest};
use super::narrator::{NarrationRequest, Narrator, NarratorError};
use crate::character::PlayerId;
use crate::config::NarratorConfig;
use crate::manager::SessionManager;
use crate::scene::SceneType;
use crate::session::{GameSession, SessionError, SessionId, SessionState};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const SYSTEM_PROMPT: &str = include_str!("prompts/system.txt");

/// Lines shown when the narrator cannot answer.
pub const FALLBACK_RESPONSES: [&str; 4] = [
    "Something mysterious is happening... (the GM is briefly unavailable)",
    "Your action unfolds in an intriguing way... (hold on, the GM is thinking)",
    "The world around you holds its breath... (technical difficulties)",
    "Fate ponders your deed... (the GM will be right back)",
];

/// Scene description used when the narrator cannot provide one.
pub const SCENE_FALLBACK: &str = "A new place opens up before you, waiting to be explored...";

const SCENE_TEMPERATURE: f32 = 0.8;
const SCENE_MAX_TOKENS: usize = 300;

/// Result of one player action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GmResponse {
    pub text: String,
    /// Effects that were applied to the session, roll requests included.
    pub effects: Vec<Effect>,
    pub roll_requests: Vec<RollRequest>,
    /// The narrator failed and `text` is a canned line.
    pub fallback: bool,
    pub hope_pool: u32,
    pub fear_pool: u32,
}

fn fallback_line() -> &'static str {
    FALLBACK_RESPONSES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(FALLBACK_RESPONSES[0])
}

pub struct GameMaster {
    sessions: Arc<SessionManager>,
    narrator: Arc<dyn Narrator>,
    config: NarratorConfig,
    context: ContextBuilder,
    parser: EffectParser,
}

impl GameMaster {
    pub fn new(sessions: Arc<SessionManager>, narrator: Arc<dyn Narrator>) -> Self {
        Self {
            sessions,
            narrator,
            config: NarratorConfig::default(),
            context: ContextBuilder::default(),
            parser: EffectParser::default(),
        }
    }

    pub fn with_config(mut self, config: NarratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_context_builder(mut self, context: ContextBuilder) -> Self {
        self.context = context;
        self
    }

    pub fn with_parser(mut self, parser: EffectParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    pub fn config(&self) -> &NarratorConfig {
        &self.config
    }

    fn system_prompt(&self) -> &str {
        self.config
            .custom_system_prompt
            .as_deref()
            .unwrap_or(SYSTEM_PROMPT)
    }

    async fn call_narrator(&self, request: NarrationRequest) -> Result<String, NarratorError> {
        match tokio::time::timeout(self.config.timeout, self.narrator.narrate(request)).await {
            Ok(result) => result,
            Err(_) => Err(NarratorError::Timeout),
        }
    }

    /// Run one player action through the narrator and apply what it says.
    ///
    /// Errors only for session problems: unknown session, a session that is
    /// not active, or a player without a seat.
    pub async fn process_player_action(
        &self,
        session_id: &SessionId,
        player_id: &PlayerId,
        action: &str,
    ) -> Result<GmResponse, SessionError> {
        let shared = self.sessions.require(session_id).await?;
        let mut session = shared.lock().await;

        if session.state() != SessionState::Active {
            return Err(SessionError::InvalidState {
                action: "take an action",
                state: session.state(),
            });
        }
        if session.character(player_id).is_none() {
            return Err(SessionError::PlayerNotFound(player_id.clone()));
        }

        let context = self.context.build(&session, player_id, action);
        let request = NarrationRequest::new(self.system_prompt(), context.player_action.clone())
            .with_context(context.render())
            .with_history(session.narration().attached());

        let text = match self.call_narrator(request).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    session = %session_id,
                    narrator = self.narrator.name(),
                    error = %e,
                    "Narrator failed, using fallback"
                );
                return Ok(GmResponse {
                    text: fallback_line().to_string(),
                    effects: Vec::new(),
                    roll_requests: Vec::new(),
                    fallback: true,
                    hope_pool: session.hope_pool(),
                    fear_pool: session.fear_pool(),
                });
            }
        };

        let parsed = self.parser.parse(&text, session.fear_pool());
        let effects = apply_effects(&mut session, player_id, &parsed);
        let roll_requests = effects
            .iter()
            .filter_map(Effect::as_roll_request)
            .cloned()
            .collect();

        session
            .narration_mut()
            .record(context.player_action, text.as_str());

        tracing::info!(
            session = %session_id,
            player = %player_id,
            effects = effects.len(),
            "Narrated player action"
        );

        Ok(GmResponse {
            text,
            effects,
            roll_requests,
            fallback: false,
            hope_pool: session.hope_pool(),
            fear_pool: session.fear_pool(),
        })
    }

    /// Open a new scene with a narrated description.
    ///
    /// An empty `participants` list seats everyone at the table. The scene
    /// starts even when the narrator fails, using [`SCENE_FALLBACK`].
    pub async fn start_new_scene(
        &self,
        session_id: &SessionId,
        scene_type: SceneType,
        location: &str,
        participants: Vec<PlayerId>,
    ) -> Result<String, SessionError> {
        let shared = self.sessions.require(session_id).await?;
        let mut session = shared.lock().await;

        if session.state() == SessionState::Completed {
            return Err(SessionError::InvalidState {
                action: "start a scene",
                state: session.state(),
            });
        }

        let participants = if participants.is_empty() {
            session.player_ids()
        } else {
            participants
        };

        let prompt = scene_prompt(&session, scene_type, location);
        let request = NarrationRequest::new(self.system_prompt(), prompt)
            .with_temperature(SCENE_TEMPERATURE)
            .with_max_tokens(SCENE_MAX_TOKENS);

        let description = match self.call_narrator(request).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(session = %session_id, error = %e, "Scene narration failed, using fallback");
                SCENE_FALLBACK.to_string()
            }
        };

        session.start_scene(scene_type, description.as_str(), participants);
        Ok(description)
    }

    /// Forget the narration history of a session.
    pub async fn clear_history(&self, session_id: &SessionId) {
        if let Some(shared) = self.sessions.get(session_id).await {
            shared.lock().await.narration_mut().clear();
        }
    }

    /// Snapshot of a session's narration history; empty for unknown sessions.
    pub async fn history(&self, session_id: &SessionId) -> NarrationHistory {
        match self.sessions.get(session_id).await {
            Some(shared) => shared.lock().await.narration().clone(),
            None => NarrationHistory::default(),
        }
    }
}

fn scene_prompt(session: &GameSession, scene_type: SceneType, location: &str) -> String {
    let location = if location.trim().is_empty() {
        "at the GM's discretion"
    } else {
        location.trim()
    };
    let party: Vec<String> = session
        .seats()
        .iter()
        .map(|s| format!("- {} ({})", s.character.name, s.character.class_name()))
        .collect();

    format!(
        "Describe a new scene for a Daggerheart game.\n\n\
         Scene type: {scene_type}\n\
         Location: {location}\n\n\
         Characters in the party:\n{}\n\n\
         Write an atmospheric description of the scene in 2-3 sentences. \
         Include details of the surroundings and hooks the characters can act on.",
        party.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_comes_from_pool() {
        for _ in 0..20 {
            assert!(FALLBACK_RESPONSES.contains(&fallback_line()));
        }
    }

    #[test]
    fn test_system_prompt_mentions_roll_grammar() {
        assert!(SYSTEM_PROMPT.contains("against difficulty"));
    }

    #[test]
    fn test_scene_prompt_lists_party() {
        let mut session = GameSession::new("gm", "Scene");
        session
            .add_player("a", crate::character::Character::new("Aria", "a"))
            .unwrap();
        let prompt = scene_prompt(&session, SceneType::Rest, "");
        assert!(prompt.contains("Scene type: Rest"));
        assert!(prompt.contains("Location: at the GM's discretion"));
        assert!(prompt.contains("- Aria (Unknown)"));
    }
}
