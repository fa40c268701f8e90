//! Narrative context for the narrator.
//!
//! Each request carries a fresh snapshot of the table built from the session,
//! plus a short slice of the per-session narration history. The history is a
//! sliding window kept apart from the event log.

use crate::character::PlayerId;
use crate::session::GameSession;
use serde::{Deserialize, Serialize};

/// Event descriptions included in each context.
pub const RECENT_EVENT_LIMIT: usize = 5;

/// Story entries joined into the summary.
pub const STORY_ENTRY_LIMIT: usize = 3;

/// Maximum number of stored history entries (player and narrator lines).
const MAX_HISTORY_ENTRIES: usize = 20;

/// Exchanges attached to each request.
pub const ATTACHED_PAIRS: usize = 3;

pub const NO_SCENE: &str = "No active scene";
pub const STORY_START: &str = "Beginning of the adventure";

/// Who spoke a history line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Player,
    Narrator,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub speaker: Speaker,
    pub content: String,
}

/// Bounded narration history for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrationHistory {
    entries: Vec<HistoryEntry>,
}

impl NarrationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store one exchange, dropping the oldest lines past the limit.
    pub fn record(&mut self, action: impl Into<String>, reply: impl Into<String>) {
        self.entries.push(HistoryEntry {
            speaker: Speaker::Player,
            content: action.into(),
        });
        self.entries.push(HistoryEntry {
            speaker: Speaker::Narrator,
            content: reply.into(),
        });
        self.trim_history();
    }

    /// The lines attached to the next request, oldest first.
    pub fn attached(&self) -> &[HistoryEntry] {
        let start = self.entries.len().saturating_sub(ATTACHED_PAIRS * 2);
        &self.entries[start..]
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn trim_history(&mut self) {
        if self.entries.len() > MAX_HISTORY_ENTRIES {
            let excess = self.entries.len() - MAX_HISTORY_ENTRIES;
            self.entries.drain(..excess);
        }
    }
}

/// One line of the party roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantSummary {
    pub name: String,
    pub class: String,
    pub hp: String,
    pub is_acting: bool,
}

/// Snapshot of the table for a single narrator request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeContext {
    pub scene: String,
    pub participants: Vec<ParticipantSummary>,
    pub recent_events: Vec<String>,
    pub story_summary: String,
    pub hope_pool: u32,
    pub fear_pool: u32,
    /// The action as `"Name: text"`.
    pub player_action: String,
}

impl NarrativeContext {
    /// The situation message sent ahead of the history.
    pub fn render(&self) -> String {
        let mut out = String::from("CURRENT SITUATION\n\n");
        out.push_str(&format!("Scene: {}\n\n", self.scene));

        out.push_str("Characters in play:\n");
        for p in &self.participants {
            out.push_str(&format!("- {} ({}) - {} hit points", p.name, p.class, p.hp));
            if p.is_acting {
                out.push_str(" [acting]");
            }
            out.push('\n');
        }

        out.push_str(&format!(
            "\nPools:\n- Hope: {}\n- Fear: {}\n\n",
            self.hope_pool, self.fear_pool
        ));
        out.push_str(&format!("Story so far: {}\n", self.story_summary));

        if !self.recent_events.is_empty() {
            out.push_str("\nRecent events:\n");
            for event in &self.recent_events {
                out.push_str(&format!("* {event}\n"));
            }
        }

        out.push_str("\nWhat happens next?");
        out
    }
}

/// Assembles [`NarrativeContext`] values from a session.
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    event_limit: usize,
    story_limit: usize,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self {
            event_limit: RECENT_EVENT_LIMIT,
            story_limit: STORY_ENTRY_LIMIT,
        }
    }
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_event_limit(mut self, limit: usize) -> Self {
        self.event_limit = limit;
        self
    }

    pub fn with_story_limit(mut self, limit: usize) -> Self {
        self.story_limit = limit;
        self
    }

    pub fn build(&self, session: &GameSession, player_id: &PlayerId, action: &str) -> NarrativeContext {
        let scene = session
            .current_scene()
            .map(|s| s.summary())
            .unwrap_or_else(|| NO_SCENE.to_string());

        let participants = session
            .seats()
            .iter()
            .map(|seat| ParticipantSummary {
                name: seat.character.name.clone(),
                class: seat.character.class_name().to_string(),
                hp: seat.character.hit_points.to_string(),
                is_acting: &seat.player_id == player_id,
            })
            .collect();

        let recent_events = session
            .recent_events(self.event_limit)
            .iter()
            .map(|e| e.description.clone())
            .collect();

        let story = session.story_log();
        let story_summary = if story.is_empty() || self.story_limit == 0 {
            STORY_START.to_string()
        } else {
            let start = story.len().saturating_sub(self.story_limit);
            story[start..]
                .iter()
                .map(|e| e.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        };

        let actor = session
            .character(player_id)
            .map(|c| c.name.as_str())
            .unwrap_or("Player");

        NarrativeContext {
            scene,
            participants,
            recent_events,
            story_summary,
            hope_pool: session.hope_pool(),
            fear_pool: session.fear_pool(),
            player_action: format!("{actor}: {action}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::Character;
    use crate::scene::SceneType;

    fn table() -> GameSession {
        let mut session = GameSession::new("gm", "Table");
        session.add_player("a", Character::new("Aria", "a")).unwrap();
        session.add_player("b", Character::new("Bram", "b")).unwrap();
        session
    }

    #[test]
    fn test_history_is_bounded() {
        let mut history = NarrationHistory::new();
        for i in 0..15 {
            history.record(format!("action {i}"), format!("reply {i}"));
        }
        assert_eq!(history.len(), 20);
        assert_eq!(history.entries()[0].content, "action 5");

        let attached = history.attached();
        assert_eq!(attached.len(), 6);
        assert_eq!(attached[0].content, "action 12");
        assert_eq!(attached[0].speaker, Speaker::Player);
        assert_eq!(attached[5].content, "reply 14");
    }

    #[test]
    fn test_short_history_attaches_everything() {
        let mut history = NarrationHistory::new();
        history.record("hello", "greetings");
        assert_eq!(history.attached().len(), 2);
    }

    #[test]
    fn test_context_without_scene_or_story() {
        let session = table();
        let ctx = ContextBuilder::new().build(&session, &PlayerId::new("a"), "I look around");
        assert_eq!(ctx.scene, NO_SCENE);
        assert_eq!(ctx.story_summary, STORY_START);
        assert_eq!(ctx.player_action, "Aria: I look around");
        assert_eq!(ctx.participants.len(), 2);
        assert!(ctx.participants[0].is_acting);
        assert!(!ctx.participants[1].is_acting);
        assert_eq!(ctx.participants[0].hp, "6/6");
        assert_eq!(ctx.participants[0].class, "Unknown");
    }

    #[test]
    fn test_context_uses_latest_story_and_events() {
        let mut session = table();
        session.start().unwrap();
        session.start_scene(SceneType::Social, "A crowded tavern", session.player_ids());
        for line in ["One.", "Two.", "Three.", "Four."] {
            session.record_story(line, None);
        }

        let ctx = ContextBuilder::new().build(&session, &PlayerId::new("b"), "I order ale");
        assert_eq!(ctx.scene, "Social: A crowded tavern");
        assert_eq!(ctx.story_summary, "Two. Three. Four.");
        assert_eq!(ctx.recent_events.len(), 5);
        assert_eq!(ctx.recent_events.last().map(String::as_str), Some("Four."));
        assert_eq!(ctx.player_action, "Bram: I order ale");
    }

    #[test]
    fn test_unknown_actor_is_named_player() {
        let session = table();
        let ctx = ContextBuilder::new().build(&session, &PlayerId::new("ghost"), "boo");
        assert_eq!(ctx.player_action, "Player: boo");
        assert!(ctx.participants.iter().all(|p| !p.is_acting));
    }

    #[test]
    fn test_render_lists_roster_and_pools() {
        let mut session = table();
        session.gain_fear(2);
        let ctx = ContextBuilder::new().build(&session, &PlayerId::new("a"), "wait");
        let text = ctx.render();
        assert!(text.contains("Scene: No active scene"));
        assert!(text.contains("- Aria (Unknown) - 6/6 hit points [acting]"));
        assert!(text.contains("- Fear: 2"));
        assert!(text.contains("Story so far: Beginning of the adventure"));
    }
}
