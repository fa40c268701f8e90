//! Session and character persistence.
//!
//! Saves are pretty-printed JSON with a format version and a small metadata
//! block that can be read without deserializing the whole file. Dice are not
//! saved; a loaded session rolls with fresh random dice.

use crate::character::Character;
use crate::session::{GameSession, SessionId, SessionState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid save format")]
    InvalidFormat,

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Current session save version.
pub const SAVE_VERSION: u32 = 1;

/// Current character save version.
pub const CHARACTER_SAVE_VERSION: u32 = 1;

/// Summary of a session save, readable via [`SavedSession::peek_metadata`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub session_id: SessionId,
    pub name: String,
    pub state: SessionState,
    pub players: Vec<String>,
    pub events: usize,
    pub saved_at: DateTime<Utc>,
}

impl SessionMetadata {
    fn capture(session: &GameSession, saved_at: DateTime<Utc>) -> Self {
        Self {
            session_id: session.id,
            name: session.name.clone(),
            state: session.state(),
            players: session.seats().iter().map(|s| s.character.name.clone()).collect(),
            events: session.events().len(),
            saved_at,
        }
    }
}

/// A loaded session save.
#[derive(Debug, Serialize, Deserialize)]
pub struct SavedSession {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub metadata: SessionMetadata,
    pub session: GameSession,
}

/// Borrowed form with the same layout as [`SavedSession`], so a live session
/// can be written without giving it up.
#[derive(Serialize)]
struct SessionSaveRef<'a> {
    version: u32,
    saved_at: DateTime<Utc>,
    metadata: &'a SessionMetadata,
    session: &'a GameSession,
}

impl SavedSession {
    pub fn new(session: GameSession) -> Self {
        let saved_at = Utc::now();
        Self {
            version: SAVE_VERSION,
            saved_at,
            metadata: SessionMetadata::capture(&session, saved_at),
            session,
        }
    }

    pub fn into_session(self) -> GameSession {
        self.session
    }

    /// Write a session to `path` without taking ownership of it.
    pub async fn save_session(
        session: &GameSession,
        path: impl AsRef<Path>,
    ) -> Result<SessionMetadata, PersistError> {
        let saved_at = Utc::now();
        let metadata = SessionMetadata::capture(session, saved_at);
        let content = serde_json::to_string_pretty(&SessionSaveRef {
            version: SAVE_VERSION,
            saved_at,
            metadata: &metadata,
            session,
        })?;
        fs::write(path, content).await?;
        Ok(metadata)
    }

    pub async fn save_json(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).await?;
        Ok(())
    }

    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let content = fs::read_to_string(path).await?;
        let value: serde_json::Value = serde_json::from_str(&content)?;
        check_version(&value, SAVE_VERSION)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Read just the metadata block.
    pub async fn peek_metadata(path: impl AsRef<Path>) -> Result<SessionMetadata, PersistError> {
        let content = fs::read_to_string(path).await?;

        #[derive(Deserialize)]
        struct Partial {
            version: u32,
            metadata: SessionMetadata,
        }

        let partial: Partial = serde_json::from_str(&content)?;
        if partial.version != SAVE_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: SAVE_VERSION,
                found: partial.version,
            });
        }
        Ok(partial.metadata)
    }
}

fn check_version(value: &serde_json::Value, expected: u32) -> Result<(), PersistError> {
    let found = value
        .get("version")
        .and_then(|v| v.as_u64())
        .ok_or(PersistError::InvalidFormat)?;
    let found = u32::try_from(found).map_err(|_| PersistError::InvalidFormat)?;
    if found != expected {
        return Err(PersistError::VersionMismatch { expected, found });
    }
    Ok(())
}

/// A session save found on disk.
#[derive(Debug, Clone)]
pub struct SaveInfo {
    pub path: PathBuf,
    pub metadata: SessionMetadata,
}

/// List session saves in a directory, newest first. Files that are not
/// session saves are skipped.
pub async fn list_saves(dir: impl AsRef<Path>) -> Result<Vec<SaveInfo>, PersistError> {
    let mut saves = Vec::new();
    let mut entries = fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            if let Ok(metadata) = SavedSession::peek_metadata(&path).await {
                saves.push(SaveInfo { path, metadata });
            }
        }
    }

    saves.sort_by(|a, b| b.metadata.saved_at.cmp(&a.metadata.saved_at));
    Ok(saves)
}

/// Default file name for a session save.
pub fn session_save_path(dir: impl AsRef<Path>, name: &str) -> PathBuf {
    dir.as_ref().join(format!("{}.json", sanitize(name)))
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

// ============================================================================
// Characters
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterMetadata {
    pub name: String,
    pub class: String,
    pub ancestry: String,
    pub level: u32,
    pub has_backstory: bool,
}

/// A character saved on its own, e.g. to carry between sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedCharacter {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub character: Character,
    pub metadata: CharacterMetadata,
}

impl SavedCharacter {
    pub fn new(character: Character) -> Self {
        let sheet = character.sheet();
        let metadata = CharacterMetadata {
            name: sheet.name,
            class: sheet.class,
            ancestry: sheet.ancestry,
            level: sheet.level,
            has_backstory: !character.backstory.trim().is_empty(),
        };
        Self {
            version: CHARACTER_SAVE_VERSION,
            saved_at: Utc::now(),
            character,
            metadata,
        }
    }

    pub async fn save_json(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).await?;
        Ok(())
    }

    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let content = fs::read_to_string(path).await?;
        let value: serde_json::Value = serde_json::from_str(&content)?;
        check_version(&value, CHARACTER_SAVE_VERSION)?;
        Ok(serde_json::from_value(value)?)
    }
}

pub fn character_save_path(dir: impl AsRef<Path>, name: &str) -> PathBuf {
    dir.as_ref().join(format!("{}.json", sanitize(name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_paths_are_sanitized() {
        let path = session_save_path("/saves", "Bob's Table!");
        assert!(path.to_string_lossy().ends_with("Bob_s_Table_.json"));
        let path = character_save_path("/saves", "Sir Reginald");
        assert!(path.to_string_lossy().ends_with("Sir_Reginald.json"));
    }

    #[test]
    fn test_saved_session_metadata() {
        let mut session = GameSession::new("gm", "Crossroads");
        session.add_player("a", Character::new("Aria", "a")).unwrap();
        let saved = SavedSession::new(session);
        assert_eq!(saved.version, SAVE_VERSION);
        assert_eq!(saved.metadata.name, "Crossroads");
        assert_eq!(saved.metadata.players, vec!["Aria".to_string()]);
        assert_eq!(saved.metadata.events, 1);
    }

    #[tokio::test]
    async fn test_version_mismatch() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("old.json");
        let mut value = serde_json::to_value(SavedSession::new(GameSession::new("gm", "Old"))).unwrap();
        value["version"] = serde_json::json!(99);
        std::fs::write(&path, value.to_string()).unwrap();

        let err = SavedSession::load_json(&path).await.unwrap_err();
        assert!(matches!(
            err,
            PersistError::VersionMismatch {
                expected: 1,
                found: 99
            }
        ));
    }

    #[tokio::test]
    async fn test_missing_version_is_invalid() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("junk.json");
        std::fs::write(&path, "{\"hello\": 1}").unwrap();
        let err = SavedCharacter::load_json(&path).await.unwrap_err();
        assert!(matches!(err, PersistError::InvalidFormat));
    }

    #[tokio::test]
    async fn test_oversized_version_is_invalid() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("huge.json");
        let mut value = serde_json::to_value(SavedSession::new(GameSession::new("gm", "Huge"))).unwrap();
        value["version"] = serde_json::json!(u64::from(u32::MAX) + 2);
        std::fs::write(&path, value.to_string()).unwrap();

        let err = SavedSession::load_json(&path).await.unwrap_err();
        assert!(matches!(err, PersistError::InvalidFormat));
    }

    #[tokio::test]
    async fn test_list_saves_skips_other_files() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        for name in ["One", "Two"] {
            let session = GameSession::new("gm", name);
            SavedSession::save_session(&session, session_save_path(dir.path(), name))
                .await
                .expect("Save should succeed");
        }
        std::fs::write(dir.path().join("notes.txt"), "not a save").unwrap();
        std::fs::write(dir.path().join("other.json"), "{}").unwrap();

        let saves = list_saves(dir.path()).await.expect("List should succeed");
        let mut names: Vec<_> = saves.iter().map(|s| s.metadata.name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["One", "Two"]);
    }
}
