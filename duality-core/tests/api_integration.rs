//! Integration tests that call the real chat completion API.
//!
//! These tests require DEEPSEEK_API_KEY to be set (via .env file or environment).
//! Run with: `cargo test -p duality-core --test api_integration -- --ignored`

use duality_core::gm::{ChatNarrator, NarrationRequest, Narrator};
use duality_core::headless::{HeadlessConfig, HeadlessGame};
use duality_core::NarratorConfig;
use std::sync::Arc;

fn setup() {
    let _ = dotenvy::dotenv();
}

fn has_api_key() -> bool {
    std::env::var(chat::API_KEY_VAR).is_ok()
}

#[tokio::test]
#[ignore] // Run with: cargo test -p duality-core --test api_integration -- --ignored
async fn test_narrator_answers() {
    setup();
    if !has_api_key() {
        eprintln!("Skipping test: {} not set", chat::API_KEY_VAR);
        return;
    }

    let narrator = ChatNarrator::from_env(NarratorConfig::default().with_max_tokens(200))
        .expect("Failed to create narrator");
    let reply = narrator
        .narrate(NarrationRequest::new(
            "You are a terse fantasy narrator.",
            "Describe a tavern door in one sentence.",
        ))
        .await
        .expect("Narrator should respond");
    assert!(!reply.trim().is_empty());
}

#[tokio::test]
#[ignore]
async fn test_headless_turn() {
    setup();
    if !has_api_key() {
        eprintln!("Skipping test: {} not set", chat::API_KEY_VAR);
        return;
    }

    let narrator =
        Arc::new(ChatNarrator::from_env(NarratorConfig::default()).expect("Failed to create narrator"));
    let mut game = HeadlessGame::new(HeadlessConfig::quick_start("Thorin"), narrator)
        .await
        .expect("Game should start");

    let response = game
        .send("I push open the tavern door and look for the innkeeper")
        .await
        .expect("Turn should complete");
    assert!(!response.text.is_empty());
    assert!(!response.fallback, "Narrator fell back: {}", response.text);
    assert!(response.hope_pool + response.fear_pool <= 1);
}
