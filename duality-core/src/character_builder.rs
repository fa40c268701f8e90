//! Character creation from a front-end payload.
//!
//! A creation request names a class, an ancestry and six trait values. The
//! builder checks each piece against a [`ContentCatalog`] and produces a
//! character with its starting kit.

use crate::character::{Character, CharacterError, PlayerId};
use crate::content::ContentCatalog;
use crate::traits::{TraitError, TraitSet};
use serde::{Deserialize, Serialize};

/// Error from character building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuilderError {
    MissingName,
    MissingPlayer,
    MissingClass,
    MissingAncestry,
    MissingTraits,
    UnknownClass(String),
    UnknownAncestry(String),
    InvalidTraits(TraitError),
    Rejected(CharacterError),
}

impl std::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuilderError::MissingName => write!(f, "Character name is required"),
            BuilderError::MissingPlayer => write!(f, "Owning player is required"),
            BuilderError::MissingClass => write!(f, "Class selection is required"),
            BuilderError::MissingAncestry => write!(f, "Ancestry selection is required"),
            BuilderError::MissingTraits => write!(f, "Trait values are required"),
            BuilderError::UnknownClass(id) => write!(f, "Unknown class: {id}"),
            BuilderError::UnknownAncestry(id) => write!(f, "Unknown ancestry: {id}"),
            BuilderError::InvalidTraits(e) => write!(f, "Invalid traits: {e}"),
            BuilderError::Rejected(e) => write!(f, "Character rejected: {e}"),
        }
    }
}

impl std::error::Error for BuilderError {}

impl From<CharacterError> for BuilderError {
    fn from(e: CharacterError) -> Self {
        match e {
            CharacterError::UnknownClass(id) => BuilderError::UnknownClass(id),
            CharacterError::UnknownAncestry(id) => BuilderError::UnknownAncestry(id),
            CharacterError::Traits(t) => BuilderError::InvalidTraits(t),
            other => BuilderError::Rejected(other),
        }
    }
}

/// The shape of a character-creation request from a chat front-end or the
/// browser builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreationRequest {
    pub name: String,
    pub player_id: String,
    pub class: String,
    pub ancestry: String,
    /// Agility, strength, finesse, instinct, presence, knowledge.
    pub traits: Vec<i32>,
    #[serde(default)]
    pub backstory: String,
}

/// Builder for new characters.
#[derive(Debug, Clone)]
pub struct CharacterBuilder {
    name: Option<String>,
    player: Option<PlayerId>,
    class: Option<String>,
    ancestry: Option<String>,
    traits: Option<Result<TraitSet, TraitError>>,
    backstory: String,
    starting_kit: bool,
}

impl Default for CharacterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CharacterBuilder {
    pub fn new() -> Self {
        Self {
            name: None,
            player: None,
            class: None,
            ancestry: None,
            traits: None,
            backstory: String::new(),
            starting_kit: true,
        }
    }

    /// Start from a creation request.
    pub fn from_request(request: &CreationRequest) -> Self {
        Self::new()
            .name(&request.name)
            .player(request.player_id.as_str())
            .class(&request.class)
            .ancestry(&request.ancestry)
            .trait_values(&request.traits)
            .backstory(&request.backstory)
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn player(mut self, player: impl Into<PlayerId>) -> Self {
        self.player = Some(player.into());
        self
    }

    pub fn class(mut self, class_id: impl Into<String>) -> Self {
        self.class = Some(class_id.into());
        self
    }

    pub fn ancestry(mut self, ancestry_id: impl Into<String>) -> Self {
        self.ancestry = Some(ancestry_id.into());
        self
    }

    pub fn traits(mut self, traits: TraitSet) -> Self {
        self.traits = Some(Ok(traits));
        self
    }

    /// Traits as six raw integers in payload order.
    pub fn trait_values(mut self, values: &[i32]) -> Self {
        self.traits = Some(TraitSet::from_values(values));
        self
    }

    pub fn backstory(mut self, backstory: impl Into<String>) -> Self {
        self.backstory = backstory.into();
        self
    }

    /// Skip the class equipment and domain cards.
    pub fn without_starting_kit(mut self) -> Self {
        self.starting_kit = false;
        self
    }

    pub fn build(self, catalog: &ContentCatalog) -> Result<Character, BuilderError> {
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or(BuilderError::MissingName)?;
        let player = self.player.ok_or(BuilderError::MissingPlayer)?;
        let class = self.class.ok_or(BuilderError::MissingClass)?;
        let ancestry = self.ancestry.ok_or(BuilderError::MissingAncestry)?;
        let traits = self
            .traits
            .ok_or(BuilderError::MissingTraits)?
            .map_err(BuilderError::InvalidTraits)?;

        let mut character = Character::new(name.trim(), player);
        character.set_traits(traits)?;
        character.set_class(catalog, &class)?;
        character.set_ancestry(catalog, &ancestry)?;
        character.backstory = self.backstory;
        if self.starting_kit {
            character.grant_starting_kit(catalog);
        }

        tracing::debug!(
            name = %character.name,
            class = %character.class_name(),
            "Built character"
        );
        Ok(character)
    }
}
