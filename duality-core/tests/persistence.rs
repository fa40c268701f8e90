//! Save and load round trips through the filesystem.

use duality_core::dice::Advantage;
use duality_core::event::EventKind;
use duality_core::persist::{
    character_save_path, list_saves, session_save_path, SavedCharacter, SAVE_VERSION,
};
use duality_core::scene::SceneType;
use duality_core::testing::{sample_character, ScriptedDice};
use duality_core::{
    CharacterBuilder, ContentCatalog, GameSession, PersistError, PlayerId, SavedSession,
    SessionState,
};
use tempfile::TempDir;

fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

#[tokio::test]
async fn test_character_round_trip() {
    let dir = temp_dir();
    let mut hero = CharacterBuilder::new()
        .name("Sir Reginald")
        .player("alice")
        .class("guardian")
        .ancestry("dwarf")
        .trait_values(&[0, 2, -1, 1, 1, 0])
        .backstory("Sworn to the mountain hold")
        .build(&ContentCatalog::default())
        .unwrap();
    hero.take_damage(7).unwrap();
    hero.gain_hope(2);

    let path = character_save_path(dir.path(), &hero.name);
    let saved = SavedCharacter::new(hero.clone());
    assert!(saved.metadata.has_backstory);
    saved.save_json(&path).await.unwrap();

    let loaded = SavedCharacter::load_json(&path).await.unwrap().character;
    assert_eq!(loaded.name, hero.name);
    assert_eq!(loaded.class_id(), Some("guardian"));
    assert_eq!(loaded.ancestry_id(), Some("dwarf"));
    assert_eq!(loaded.base_traits(), hero.base_traits());
    assert_eq!(loaded.traits(), hero.traits());
    assert_eq!(loaded.hit_points, hero.hit_points);
    assert_eq!(loaded.hope, hero.hope);
    assert_eq!(loaded.equipment, hero.equipment);
    assert_eq!(loaded.domain_cards, hero.domain_cards);
    assert_eq!(loaded.backstory, "Sworn to the mountain hold");
}

#[tokio::test]
async fn test_session_round_trip() {
    let dir = temp_dir();
    let mut session = GameSession::new("gm", "Crossroads").with_dice(ScriptedDice::new([9, 4, 2, 11]));
    session
        .add_player("alice", sample_character("Vex", "alice"))
        .unwrap();
    session
        .add_player("bob", sample_character("Bram", "bob"))
        .unwrap();
    session.start().unwrap();
    session
        .make_character_roll(&PlayerId::new("alice"), "finesse", 12, Advantage::Normal)
        .unwrap();
    session
        .make_character_roll(&PlayerId::new("bob"), "agility", 12, Advantage::Normal)
        .unwrap();
    session.deal_damage(&PlayerId::new("bob"), 3, "goblin").unwrap();
    session.start_scene(SceneType::Action, "Goblins at the ford", session.player_ids());
    session.record_story("The party reached the ford", None);
    session
        .narration_mut()
        .record("Vex: I wade in", "The water is cold.");

    let path = session_save_path(dir.path(), &session.name);
    let metadata = SavedSession::save_session(&session, &path).await.unwrap();
    assert_eq!(metadata.players, vec!["Vex".to_string(), "Bram".to_string()]);
    assert_eq!(metadata.events, session.events().len());

    let loaded = SavedSession::load_json(&path).await.unwrap();
    assert_eq!(loaded.version, SAVE_VERSION);
    let loaded = loaded.into_session();

    assert_eq!(loaded.id, session.id);
    assert_eq!(loaded.state(), SessionState::Active);
    assert_eq!(loaded.player_ids(), session.player_ids());
    assert_eq!((loaded.hope_pool(), loaded.fear_pool()), (1, 1));
    assert_eq!(
        loaded.character(&PlayerId::new("bob")).unwrap().hit_points.current,
        3
    );
    assert_eq!(loaded.events().len(), session.events().len());
    assert_eq!(loaded.events().of_kind(EventKind::DiceRoll).count(), 2);
    assert_eq!(loaded.story_log().len(), 1);
    assert_eq!(loaded.narration(), session.narration());

    let scene = loaded.current_scene().unwrap();
    assert_eq!(scene.scene_type, SceneType::Action);
    assert_eq!(scene.current_turn, Some(PlayerId::new("alice")));
}

#[tokio::test]
async fn test_loaded_session_keeps_playing() {
    let dir = temp_dir();
    let path = dir.path().join("table.json");
    let mut session = GameSession::new("gm", "Resume");
    session
        .add_player("alice", sample_character("Vex", "alice"))
        .unwrap();
    session.start().unwrap();
    SavedSession::save_session(&session, &path).await.unwrap();

    let mut loaded = SavedSession::load_json(&path).await.unwrap().into_session();
    let events_before = loaded.events().len();
    loaded
        .make_character_roll(&PlayerId::new("alice"), "instinct", 10, Advantage::Normal)
        .unwrap();
    assert_eq!(loaded.events().len(), events_before + 1);
    let sequences: Vec<u64> = loaded.events().iter().map(|e| e.sequence).collect();
    assert!(sequences.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn test_peek_and_list() {
    let dir = temp_dir();
    for name in ["Alpha", "Beta"] {
        let mut session = GameSession::new("gm", name);
        session
            .add_player("alice", sample_character("Vex", "alice"))
            .unwrap();
        SavedSession::save_session(&session, session_save_path(dir.path(), name))
            .await
            .unwrap();
    }

    let metadata = SavedSession::peek_metadata(session_save_path(dir.path(), "Alpha"))
        .await
        .unwrap();
    assert_eq!(metadata.name, "Alpha");
    assert_eq!(metadata.state, SessionState::Waiting);
    assert_eq!(metadata.players, vec!["Vex".to_string()]);

    let mut names: Vec<String> = list_saves(dir.path())
        .await
        .unwrap()
        .into_iter()
        .map(|info| info.metadata.name)
        .collect();
    names.sort();
    assert_eq!(names, vec!["Alpha", "Beta"]);
}

#[tokio::test]
async fn test_load_errors() {
    let dir = temp_dir();
    let missing = SavedSession::load_json(dir.path().join("missing.json")).await;
    assert!(matches!(missing, Err(PersistError::Io(_))));

    let garbage = dir.path().join("garbage.json");
    tokio::fs::write(&garbage, "not json at all").await.unwrap();
    assert!(matches!(
        SavedSession::load_json(&garbage).await,
        Err(PersistError::Json(_))
    ));
}
