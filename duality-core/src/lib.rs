//! Tabletop session engine built around duality dice, with an AI game master.
//!
//! This crate provides:
//! - Duality dice resolution (Hope and Fear d12s) and trait checks
//! - Characters with bounded traits and threshold damage
//! - Sessions with scenes, turn order, shared Hope/Fear pools and an event log
//! - Narrative context assembly and effect parsing for an external narrator
//! - Session persistence
//!
//! # Quick Start
//!
//! ```ignore
//! use duality_core::{CharacterBuilder, ContentCatalog, GameSession};
//!
//! let hero = CharacterBuilder::new()
//!     .name("Vex")
//!     .player("alice")
//!     .class("rogue")
//!     .ancestry("elf")
//!     .trait_values(&[1, 0, 2, 1, -1, 0])
//!     .build(&ContentCatalog::default())?;
//!
//! let mut session = GameSession::new("gm", "Crossroads");
//! session.add_player("alice", hero)?;
//! session.start()?;
//!
//! let report = session.make_character_roll(&"alice".into(), "finesse", 12, Default::default())?;
//! println!("{}", report.check.summary);
//! ```

pub mod character;
pub mod character_builder;
pub mod config;
pub mod content;
pub mod damage;
pub mod dice;
pub mod event;
pub mod gm;
pub mod headless;
pub mod manager;
pub mod persist;
pub mod scene;
pub mod session;
pub mod testing;
pub mod traits;

// Primary public API
pub use character::{Character, CharacterError, PlayerId};
pub use character_builder::{BuilderError, CharacterBuilder, CreationRequest};
pub use config::{EngineConfig, NarratorConfig};
pub use content::ContentCatalog;
pub use dice::{Advantage, DiceRoller, Outcome, RandomDice};
pub use event::{EventKind, GameEvent};
pub use gm::{ChatNarrator, Effect, GameMaster, GmResponse, Narrator};
pub use headless::{HeadlessConfig, HeadlessGame};
pub use manager::SessionManager;
pub use persist::{PersistError, SavedSession};
pub use scene::{SceneState, SceneType};
pub use session::{GameSession, SessionError, SessionId, SessionState};
pub use testing::{MockNarrator, ScriptedDice, TestHarness};
pub use traits::{Trait, TraitSet};
