//! End-to-end session flow without a narrator.
//!
//! Covers character creation, the session lifecycle, rolls feeding the
//! shared pools, threshold damage with the dying transition, and turn order.

use duality_core::dice::{Advantage, Outcome};
use duality_core::event::EventKind;
use duality_core::scene::SceneType;
use duality_core::session::{ErrorKind, SessionState};
use duality_core::testing::{assert_hp, assert_pools, sample_character, ScriptedDice};
use duality_core::traits::{TraitError, TraitSet};
use duality_core::{
    BuilderError, CharacterBuilder, ContentCatalog, GameSession, PlayerId, SessionError,
};

fn player() -> PlayerId {
    PlayerId::new("alice")
}

// =============================================================================
// CHARACTER CREATION
// =============================================================================

#[test]
fn test_trait_sum_must_be_three() {
    assert!(TraitSet::new(1, 2, 0, 1, 0, -1).is_ok());
    assert_eq!(
        TraitSet::new(1, 1, 1, 1, 1, 1),
        Err(TraitError::InvalidTotal(6))
    );
}

#[test]
fn test_builder_rejects_bad_traits() {
    let result = CharacterBuilder::new()
        .name("Vex")
        .player("alice")
        .class("rogue")
        .ancestry("elf")
        .trait_values(&[1, 1, 1, 1, 1, 1])
        .build(&ContentCatalog::default());
    assert!(matches!(result, Err(BuilderError::InvalidTraits(_))));
}

// =============================================================================
// FULL SCENARIO
// =============================================================================

#[test]
fn test_end_to_end_scenario() {
    let mut session = GameSession::new("gm", "Crossroads").with_dice(ScriptedDice::new([9, 4]));
    assert_eq!(session.state(), SessionState::Waiting);

    // Rogue: 4 hit points, threshold 2.
    session
        .add_player("alice", sample_character("Vex", "alice"))
        .unwrap();
    assert_eq!(session.character(&player()).unwrap().traits().total(), 4);

    session.start().unwrap();
    assert_eq!(session.state(), SessionState::Active);
    let scene = session.current_scene().unwrap();
    assert_eq!(scene.scene_type, SceneType::Exploration);
    assert_eq!(scene.participants, vec![player()]);

    // Roll: exactly one pool grows and one roll event is appended.
    let events_before = session.events().len();
    let report = session
        .make_character_roll(&player(), "strength", 12, Advantage::Normal)
        .unwrap();
    assert_eq!(report.check.outcome(), Outcome::SuccessWithHope);
    assert_pools(&session, 1, 0);
    assert_eq!(session.events().len(), events_before + 1);
    assert_eq!(session.events().last().unwrap().kind, EventKind::DiceRoll);

    // Damage 10 against threshold 2 costs three hit points.
    let report = session.deal_damage(&player(), 10, "trap").unwrap();
    assert_eq!(report.hits_taken, 3);
    assert_eq!(report.new_hp, report.old_hp - 3);
    assert_hp(&session, "alice", 1, 4);
    assert!(!report.is_dying);
    assert_eq!(session.events().of_kind(EventKind::CharacterDying).count(), 0);

    // The next hit reaches zero: damage and dying are separate events.
    let report = session.deal_damage(&player(), 10, "trap").unwrap();
    assert_eq!(report.new_hp, 0);
    assert!(report.is_dying);
    let kinds: Vec<_> = session.events().iter().rev().take(2).map(|e| e.kind).collect();
    assert_eq!(kinds, vec![EventKind::CharacterDying, EventKind::DamageDealt]);
    assert!(session.character(&player()).unwrap().alive);

    session.record_death(&player()).unwrap();
    assert!(!session.character(&player()).unwrap().alive);
    assert_eq!(session.events().last().unwrap().kind, EventKind::CharacterDied);
}

#[test]
fn test_roll_with_fear_feeds_gm() {
    let mut session = GameSession::new("gm", "Fear").with_dice(ScriptedDice::new([2, 11]));
    session
        .add_player("alice", sample_character("Vex", "alice"))
        .unwrap();
    session.start().unwrap();

    let report = session
        .make_character_roll(&player(), "Finesse", 12, Advantage::Normal)
        .unwrap();
    assert_eq!(report.check.outcome(), Outcome::SuccessWithFear);
    assert!(report.check.success());
    assert_pools(&session, 0, 1);
}

#[test]
fn test_roll_errors() {
    let mut session = GameSession::new("gm", "Errors");
    session
        .add_player("alice", sample_character("Vex", "alice"))
        .unwrap();

    let err = session
        .make_character_roll(&player(), "luck", 12, Advantage::Normal)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = session
        .make_character_roll(&PlayerId::new("bob"), "agility", 12, Advantage::Normal)
        .unwrap_err();
    assert_eq!(err, SessionError::PlayerNotFound(PlayerId::new("bob")));
    assert_eq!(session.events().of_kind(EventKind::DiceRoll).count(), 0);
}

// =============================================================================
// POOLS
// =============================================================================

#[test]
fn test_pools_never_go_negative() {
    let mut session = GameSession::new("gm", "Pools");
    session.gain_hope(2);
    session.gain_fear(1);

    for amount in [1, 5, 1, 1, 0, 3] {
        let before = session.hope_pool();
        match session.spend_hope(amount) {
            Ok(remaining) => assert_eq!(remaining, before - amount),
            Err(e) => {
                assert!(matches!(e, SessionError::InsufficientPool { .. }));
                assert_eq!(session.hope_pool(), before);
            }
        }
    }
    assert_eq!(session.hope_pool(), 0);

    assert!(session.spend_fear(2).is_err());
    assert_eq!(session.fear_pool(), 1);
    assert_eq!(session.spend_fear(1), Ok(0));
}

// =============================================================================
// SCENES AND TURNS
// =============================================================================

#[test]
fn test_action_scene_turn_wrap() {
    let mut session = GameSession::new("gm", "Turns");
    for (id, name) in [("a", "Aria"), ("b", "Bram"), ("c", "Cass")] {
        session.add_player(id, sample_character(name, id)).unwrap();
    }
    session.start().unwrap();
    session.start_scene(SceneType::Action, "Ambush on the bridge", session.player_ids());

    let scene = session.current_scene().unwrap();
    assert_eq!(scene.current_turn, Some(PlayerId::new("a")));
    assert_eq!(scene.round, 1);

    session.advance_turn();
    session.advance_turn();
    assert_eq!(session.advance_turn(), Some(PlayerId::new("a")));
    assert_eq!(session.current_scene().unwrap().round, 2);
    assert_eq!(session.events().of_kind(EventKind::TurnStarted).count(), 4);
}

#[test]
fn test_lifecycle_transitions() {
    let mut session = GameSession::new("gm", "Lifecycle");
    assert_eq!(session.start(), Err(SessionError::NoPlayers));

    session
        .add_player("alice", sample_character("Vex", "alice"))
        .unwrap();
    session.start().unwrap();
    assert_eq!(session.start().unwrap_err().kind(), ErrorKind::State);

    session.pause().unwrap();
    assert_eq!(session.state(), SessionState::Paused);
    session.resume().unwrap();
    session.complete().unwrap();
    assert!(session.current_scene().is_none());

    let err = session
        .add_player("bob", sample_character("Bo", "bob"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::State);
}
