//! Player characters.

use crate::content::{AncestryData, ClassData, ContentCatalog, DomainCard, Item};
use crate::damage::{self, DamageError};
use crate::dice::{resolve_trait_check, Advantage, CheckResult, DiceRoller, Outcome};
use crate::traits::{Trait, TraitError, TraitSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

pub const DEFAULT_HIT_POINTS: u32 = 6;
pub const DEFAULT_EVASION: i32 = 10;
pub const DEFAULT_THRESHOLD: i32 = 1;
pub const STARTING_HOPE: u32 = 2;
pub const MAX_HOPE: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CharacterError {
    #[error("Unknown class: {0}")]
    UnknownClass(String),
    #[error("Unknown ancestry: {0}")]
    UnknownAncestry(String),
    #[error(transparent)]
    Traits(#[from] TraitError),
    #[error(transparent)]
    Damage(#[from] DamageError),
}

/// Unique identifier for characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the person controlling a character, as handed to us by the
/// chat front-end.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PlayerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitPoints {
    pub current: u32,
    pub maximum: u32,
}

impl HitPoints {
    pub fn new(maximum: u32) -> Self {
        Self {
            current: maximum,
            maximum,
        }
    }

    /// Heal up to the maximum, returning the amount actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let old = self.current;
        self.current = self.current.saturating_add(amount).min(self.maximum);
        self.current - old
    }

    pub fn is_unconscious(&self) -> bool {
        self.current == 0
    }
}

impl fmt::Display for HitPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.current, self.maximum)
    }
}

/// Outcome of [`Character::take_damage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageReport {
    pub damage: u32,
    pub old_hp: u32,
    pub new_hp: u32,
    pub hits_taken: u8,
    pub damage_blocked: u32,
    pub is_unconscious: bool,
    /// Hit points crossed from positive to zero on this call.
    pub is_dying: bool,
}

/// Outcome of [`Character::heal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealReport {
    pub requested: u32,
    pub healed: u32,
    pub old_hp: u32,
    pub new_hp: u32,
}

/// Outcome of [`Character::make_trait_check`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitCheck {
    #[serde(rename = "trait")]
    pub trait_used: Trait,
    pub check: CheckResult,
    pub hope_gained: bool,
    pub summary: String,
}

impl TraitCheck {
    pub fn outcome(&self) -> Outcome {
        self.check.roll.outcome
    }

    pub fn success(&self) -> bool {
        self.check.success
    }
}

/// A player character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub player_id: PlayerId,
    pub class: Option<ClassData>,
    pub ancestry: Option<AncestryData>,
    /// Traits as assigned, before ancestry bonuses.
    base_traits: TraitSet,
    /// Traits used for rolls.
    traits: TraitSet,
    pub hit_points: HitPoints,
    pub evasion: i32,
    pub damage_threshold: i32,
    pub hope: u32,
    pub max_hope: u32,
    pub fear_tokens: u32,
    pub level: u32,
    pub experience: u32,
    pub equipment: Vec<Item>,
    pub domain_cards: Vec<DomainCard>,
    pub inventory: Vec<String>,
    pub backstory: String,
    pub alive: bool,
    pub conditions: Vec<String>,
}

impl Character {
    pub fn new(name: impl Into<String>, player_id: impl Into<PlayerId>) -> Self {
        Self {
            id: CharacterId::new(),
            name: name.into(),
            player_id: player_id.into(),
            class: None,
            ancestry: None,
            base_traits: TraitSet::default(),
            traits: TraitSet::default(),
            hit_points: HitPoints::new(DEFAULT_HIT_POINTS),
            evasion: DEFAULT_EVASION,
            damage_threshold: DEFAULT_THRESHOLD,
            hope: STARTING_HOPE,
            max_hope: MAX_HOPE,
            fear_tokens: 0,
            level: 1,
            experience: 0,
            equipment: Vec::new(),
            domain_cards: Vec::new(),
            inventory: Vec::new(),
            backstory: String::new(),
            alive: true,
            conditions: Vec::new(),
        }
    }

    pub fn class_id(&self) -> Option<&str> {
        self.class.as_ref().map(|c| c.id.as_str())
    }

    pub fn class_name(&self) -> &str {
        self.class.as_ref().map(|c| c.name.as_str()).unwrap_or("Unknown")
    }

    pub fn ancestry_id(&self) -> Option<&str> {
        self.ancestry.as_ref().map(|a| a.id.as_str())
    }

    /// Traits used for rolls, ancestry bonuses included.
    pub fn traits(&self) -> &TraitSet {
        &self.traits
    }

    pub fn base_traits(&self) -> &TraitSet {
        &self.base_traits
    }

    pub fn trait_value(&self, t: Trait) -> i8 {
        self.traits.get(t)
    }

    // ========================================================================
    // Creation
    // ========================================================================

    /// Assign a class and reset combat stats from it.
    pub fn set_class(&mut self, catalog: &ContentCatalog, class_id: &str) -> Result<(), CharacterError> {
        let class = catalog
            .class(class_id)
            .ok_or_else(|| CharacterError::UnknownClass(class_id.to_string()))?
            .clone();
        self.hit_points = HitPoints::new(class.hit_points);
        self.evasion = class.evasion;
        self.damage_threshold = class.damage_threshold;
        self.class = Some(class);
        Ok(())
    }

    /// Assign an ancestry, replacing any earlier ancestry bonus.
    pub fn set_ancestry(
        &mut self,
        catalog: &ContentCatalog,
        ancestry_id: &str,
    ) -> Result<(), CharacterError> {
        let ancestry = catalog
            .ancestry(ancestry_id)
            .ok_or_else(|| CharacterError::UnknownAncestry(ancestry_id.to_string()))?
            .clone();
        self.ancestry = Some(ancestry);
        self.refresh_traits();
        Ok(())
    }

    /// Replace the base traits. The whole set is validated before anything
    /// changes.
    pub fn set_traits(&mut self, traits: TraitSet) -> Result<(), CharacterError> {
        traits.validate()?;
        self.base_traits = traits;
        self.refresh_traits();
        Ok(())
    }

    fn refresh_traits(&mut self) {
        self.traits = match &self.ancestry {
            Some(ancestry) => self.base_traits.with_bonuses(&ancestry.trait_bonuses),
            None => self.base_traits,
        };
    }

    /// Equip the class kit and the first card of each of its first two
    /// domains that have cards.
    pub fn grant_starting_kit(&mut self, catalog: &ContentCatalog) {
        let Some(class_id) = self.class_id().map(str::to_string) else {
            return;
        };
        self.equipment
            .extend(catalog.starting_equipment(&class_id).iter().cloned());
        self.domain_cards.extend(catalog.starting_cards(&class_id));
    }

    // ========================================================================
    // Hope
    // ========================================================================

    /// Gain Hope up to the maximum, returning the amount gained.
    pub fn gain_hope(&mut self, amount: u32) -> u32 {
        let old = self.hope;
        self.hope = self.hope.saturating_add(amount).min(self.max_hope);
        self.hope - old
    }

    /// Spend Hope. Fails without change if there is not enough.
    pub fn spend_hope(&mut self, amount: u32) -> bool {
        if self.hope < amount {
            return false;
        }
        self.hope -= amount;
        true
    }

    // ========================================================================
    // Damage and healing
    // ========================================================================

    pub fn take_damage(&mut self, amount: u32) -> Result<DamageReport, CharacterError> {
        let old_hp = self.hit_points.current;
        let (new_hp, hits_taken) = damage::apply_damage(old_hp, amount, self.damage_threshold)?;
        self.hit_points.current = new_hp;

        let hits = hits_taken as u32;
        Ok(DamageReport {
            damage: amount,
            old_hp,
            new_hp,
            hits_taken,
            damage_blocked: if hits < amount { amount - hits } else { 0 },
            is_unconscious: new_hp == 0,
            is_dying: old_hp > 0 && new_hp == 0,
        })
    }

    pub fn heal(&mut self, amount: u32) -> HealReport {
        let old_hp = self.hit_points.current;
        let healed = self.hit_points.heal(amount);
        HealReport {
            requested: amount,
            healed,
            old_hp,
            new_hp: self.hit_points.current,
        }
    }

    // ========================================================================
    // Rolls
    // ========================================================================

    /// Roll duality dice plus a trait against a difficulty. Rolling with Hope
    /// gives the character one Hope.
    pub fn make_trait_check<D: DiceRoller + ?Sized>(
        &mut self,
        dice: &mut D,
        trait_used: Trait,
        difficulty: i32,
        advantage: Advantage,
    ) -> TraitCheck {
        let modifier = self.trait_value(trait_used) as i32;
        let check = resolve_trait_check(dice, modifier, difficulty, advantage);

        let hope_gained = check.roll.outcome == Outcome::SuccessWithHope && self.gain_hope(1) > 0;

        let summary = format!(
            "{} rolls {}: {} {:+} = {} vs {} ({}, {})",
            self.name,
            trait_used.name(),
            check.roll.dice_display(),
            modifier,
            check.final_total(),
            difficulty,
            if check.success { "success" } else { "failure" },
            check.roll.outcome,
        );

        TraitCheck {
            trait_used,
            check,
            hope_gained,
            summary,
        }
    }

    pub fn sheet(&self) -> CharacterSheet {
        CharacterSheet {
            name: self.name.clone(),
            player_id: self.player_id.clone(),
            class: self.class_name().to_string(),
            ancestry: self
                .ancestry
                .as_ref()
                .map(|a| a.name.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            level: self.level,
            traits: self.traits,
            hp: self.hit_points.to_string(),
            hope: format!("{}/{}", self.hope, self.max_hope),
            evasion: self.evasion,
            damage_threshold: self.damage_threshold,
            equipment: self.equipment.iter().map(|i| i.name.clone()).collect(),
            domain_cards: self.domain_cards.iter().map(|c| c.name.clone()).collect(),
            alive: self.alive,
            conditions: self.conditions.clone(),
        }
    }
}

/// Flat, display-ready view of a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterSheet {
    pub name: String,
    pub player_id: PlayerId,
    pub class: String,
    pub ancestry: String,
    pub level: u32,
    pub traits: TraitSet,
    pub hp: String,
    pub hope: String,
    pub evasion: i32,
    pub damage_threshold: i32,
    pub equipment: Vec<String>,
    pub domain_cards: Vec<String>,
    pub alive: bool,
    pub conditions: Vec<String>,
}
