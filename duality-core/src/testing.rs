//! Testing utilities for the duality engine.
//!
//! This module provides tools for deterministic tests:
//! - `ScriptedDice` for exact roll outcomes
//! - `MockNarrator` for narration without API calls
//! - `TestHarness` for scripted table scenarios
//! - Assertion helpers for verifying session state

use crate::character::{Character, PlayerId};
use crate::character_builder::CharacterBuilder;
use crate::content::ContentCatalog;
use crate::dice::DiceRoller;
use crate::gm::{GameMaster, GmResponse, NarrationRequest, Narrator, NarratorError};
use crate::manager::SessionManager;
use crate::session::{GameSession, SessionError, SessionId};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

// ============================================================================
// Dice
// ============================================================================

/// Dice that return a fixed sequence, cycling when exhausted.
///
/// Values are clamped into the die's range, and an empty script always
/// rolls 1.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    values: Vec<u32>,
    next: usize,
}

impl ScriptedDice {
    pub fn new(values: impl IntoIterator<Item = u32>) -> Self {
        Self {
            values: values.into_iter().collect(),
            next: 0,
        }
    }

    /// Number of dice rolled so far.
    pub fn rolled(&self) -> usize {
        self.next
    }
}

impl DiceRoller for ScriptedDice {
    fn roll_die(&mut self, sides: u32) -> u32 {
        let value = if self.values.is_empty() {
            1
        } else {
            self.values[self.next % self.values.len()]
        };
        self.next += 1;
        value.clamp(1, sides.max(1))
    }
}

// ============================================================================
// Narrator
// ============================================================================

/// A scripted narrator reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Fail(String),
    /// Wait before answering, for timeout tests.
    Delayed(Duration, String),
}

impl MockReply {
    pub fn text(text: impl Into<String>) -> Self {
        MockReply::Text(text.into())
    }
}

/// A narrator that returns scripted replies in order and records every
/// request it receives.
#[derive(Debug, Default)]
pub struct MockNarrator {
    replies: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<NarrationRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockNarrator {
    pub fn new(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn queue(&self, reply: MockReply) {
        lock(&self.replies).push_back(reply);
    }

    pub fn queue_text(&self, text: impl Into<String>) {
        self.queue(MockReply::text(text));
    }

    pub fn requests(&self) -> Vec<NarrationRequest> {
        lock(&self.requests).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }
}

#[async_trait]
impl Narrator for MockNarrator {
    async fn narrate(&self, request: NarrationRequest) -> Result<String, NarratorError> {
        lock(&self.requests).push(request);
        let reply = lock(&self.replies).pop_front();
        match reply {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Fail(message)) => Err(NarratorError::Unavailable(message)),
            Some(MockReply::Delayed(delay, text)) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
            None => Ok("The GM has no more scripted responses.".to_string()),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ============================================================================
// Harness
// ============================================================================

/// Player id seated by [`TestHarness::new`].
pub const TEST_PLAYER: &str = "player-1";

/// A rogue (hp 4, threshold 2) with valid traits, built from the default
/// catalog.
pub fn sample_character(name: &str, player: &str) -> Character {
    let built = CharacterBuilder::new()
        .name(name)
        .player(player)
        .class("rogue")
        .ancestry("human")
        .trait_values(&[1, 0, 2, 1, -1, 0])
        .build(&ContentCatalog::default());
    match built {
        Ok(character) => character,
        Err(e) => panic!("sample character should build: {e}"),
    }
}

/// A started session with a mock narrator and game master.
pub struct TestHarness {
    pub narrator: Arc<MockNarrator>,
    pub gm: GameMaster,
    pub session_id: SessionId,
}

impl TestHarness {
    /// One seated rogue named "Test Hero", session started.
    pub async fn new() -> Self {
        Self::with_characters(vec![(
            PlayerId::new(TEST_PLAYER),
            sample_character("Test Hero", TEST_PLAYER),
        )])
        .await
    }

    pub async fn with_characters(characters: Vec<(PlayerId, Character)>) -> Self {
        let manager = Arc::new(SessionManager::new());
        let narrator = Arc::new(MockNarrator::default());
        let mut session = GameSession::new("gm", "Test Table");
        for (player, character) in characters {
            if let Err(e) = session.add_player(player, character) {
                panic!("harness player should join: {e}");
            }
        }
        if let Err(e) = session.start() {
            panic!("harness session should start: {e}");
        }
        let session_id = manager.insert(session).await;
        let gm = GameMaster::new(manager, narrator.clone());
        Self {
            narrator,
            gm,
            session_id,
        }
    }

    /// Queue a narrator reply.
    pub fn expect_narrative(&self, text: impl Into<String>) -> &Self {
        self.narrator.queue_text(text);
        self
    }

    /// Queue a narrator failure.
    pub fn expect_failure(&self) -> &Self {
        self.narrator.queue(MockReply::Fail("scripted failure".to_string()));
        self
    }

    pub async fn act(&self, player: &str, text: &str) -> Result<GmResponse, SessionError> {
        self.gm
            .process_player_action(&self.session_id, &PlayerId::new(player), text)
            .await
    }

    /// Run a closure against the locked session.
    pub async fn with_session<R>(&self, f: impl FnOnce(&mut GameSession) -> R) -> R {
        let shared = match self.gm.sessions().get(&self.session_id).await {
            Some(shared) => shared,
            None => panic!("harness session is missing"),
        };
        let mut session = shared.lock().await;
        f(&mut session)
    }

    pub async fn hp(&self, player: &str) -> Option<(u32, u32)> {
        self.with_session(|s| {
            s.character(&PlayerId::new(player))
                .map(|c| (c.hit_points.current, c.hit_points.maximum))
        })
        .await
    }

    /// `(hope, fear)`.
    pub async fn pools(&self) -> (u32, u32) {
        self.with_session(|s| (s.hope_pool(), s.fear_pool())).await
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert a seated player's hit points.
#[track_caller]
pub fn assert_hp(session: &GameSession, player: &str, current: u32, max: u32) {
    let Some(character) = session.character(&PlayerId::new(player)) else {
        panic!("Expected player '{player}' to be seated");
    };
    let hp = character.hit_points;
    assert_eq!(
        (hp.current, hp.maximum),
        (current, max),
        "Expected HP {current}/{max}, got {}/{}",
        hp.current,
        hp.maximum
    );
}

/// Assert the shared Hope and Fear pools.
#[track_caller]
pub fn assert_pools(session: &GameSession, hope: u32, fear: u32) {
    assert_eq!(
        (session.hope_pool(), session.fear_pool()),
        (hope, fear),
        "Expected Hope {hope} / Fear {fear}, got Hope {} / Fear {}",
        session.hope_pool(),
        session.fear_pool()
    );
}

/// Assert the event log holds exactly these kinds, in order.
#[track_caller]
pub fn assert_event_kinds(session: &GameSession, expected: &[crate::event::EventKind]) {
    let kinds: Vec<_> = session.events().iter().map(|e| e.kind).collect();
    assert_eq!(kinds, expected, "Unexpected event log");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gm::FALLBACK_RESPONSES;

    #[test]
    fn test_scripted_dice_cycles_and_clamps() {
        let mut dice = ScriptedDice::new([3, 20]);
        assert_eq!(dice.roll_die(12), 3);
        assert_eq!(dice.roll_die(12), 12);
        assert_eq!(dice.roll_die(12), 3);
        assert_eq!(dice.rolled(), 3);

        let mut empty = ScriptedDice::default();
        assert_eq!(empty.roll_die(6), 1);
    }

    #[test]
    fn test_sample_character() {
        let hero = sample_character("Vex", "p");
        assert_eq!(hero.class_id(), Some("rogue"));
        assert_eq!(hero.damage_threshold, 2);
        assert_eq!(hero.hit_points.maximum, 4);
    }

    #[tokio::test]
    async fn test_mock_narrator_basic() {
        let harness = TestHarness::new().await;
        harness.expect_narrative("You stand in a dusty tavern.");

        let response = harness.act(TEST_PLAYER, "I look around").await.unwrap();
        assert_eq!(response.text, "You stand in a dusty tavern.");
        assert!(!response.fallback);
        assert!(response.effects.is_empty());
        assert_eq!(harness.narrator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_multiple_responses() {
        let harness = TestHarness::new().await;
        harness
            .expect_narrative("Response 1")
            .expect_narrative("Response 2");

        assert_eq!(harness.act(TEST_PLAYER, "first").await.unwrap().text, "Response 1");
        assert_eq!(harness.act(TEST_PLAYER, "second").await.unwrap().text, "Response 2");
        assert!(harness
            .act(TEST_PLAYER, "third")
            .await
            .unwrap()
            .text
            .contains("no more scripted"));
    }

    #[tokio::test]
    async fn test_failure_gives_fallback() {
        let harness = TestHarness::new().await;
        harness.expect_failure();
        let response = harness.act(TEST_PLAYER, "I wait").await.unwrap();
        assert!(response.fallback);
        assert!(FALLBACK_RESPONSES.contains(&response.text.as_str()));
    }

    #[tokio::test]
    async fn test_assertion_helpers() {
        let harness = TestHarness::new().await;
        harness
            .with_session(|s| {
                assert_hp(s, TEST_PLAYER, 4, 4);
                assert_pools(s, 0, 0);
            })
            .await;
    }
}
