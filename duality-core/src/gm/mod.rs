//! The narrating game master.
//!
//! Builds context for an external narrator, parses structured effects out of
//! its replies and feeds them back into the session.

pub mod context;
pub mod effects;
mod master;
mod narrator;

pub use context::{
    ContextBuilder, HistoryEntry, NarrationHistory, NarrativeContext, ParticipantSummary, Speaker,
};
pub use effects::{apply_effects, Effect, EffectParser, RollRequest};
pub use master::{GameMaster, GmResponse, FALLBACK_RESPONSES, SCENE_FALLBACK};
pub use narrator::{ChatNarrator, NarrationRequest, Narrator, NarratorError};
