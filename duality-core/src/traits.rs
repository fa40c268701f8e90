//! Character traits.
//!
//! Six signed modifiers added to duality rolls. A freshly created character
//! distributes them so they sum to exactly [`TRAIT_TOTAL`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const TRAIT_MIN: i8 = -3;
pub const TRAIT_MAX: i8 = 3;

/// Required sum of all six traits at creation.
pub const TRAIT_TOTAL: i32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraitError {
    #[error("Unknown trait: {0}")]
    UnknownTrait(String),
    #[error("Traits must sum to 3, got {0}")]
    InvalidTotal(i32),
    #[error("{name} must be between -3 and 3, got {value}")]
    OutOfRange { name: &'static str, value: i32 },
    #[error("Expected 6 trait values, got {0}")]
    WrongCount(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trait {
    Agility,
    Strength,
    Finesse,
    Instinct,
    Presence,
    Knowledge,
}

impl Trait {
    pub fn name(&self) -> &'static str {
        match self {
            Trait::Agility => "Agility",
            Trait::Strength => "Strength",
            Trait::Finesse => "Finesse",
            Trait::Instinct => "Instinct",
            Trait::Presence => "Presence",
            Trait::Knowledge => "Knowledge",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Trait::Agility => "agility",
            Trait::Strength => "strength",
            Trait::Finesse => "finesse",
            Trait::Instinct => "instinct",
            Trait::Presence => "presence",
            Trait::Knowledge => "knowledge",
        }
    }

    /// All traits in creation-payload order.
    pub fn all() -> [Trait; 6] {
        [
            Trait::Agility,
            Trait::Strength,
            Trait::Finesse,
            Trait::Instinct,
            Trait::Presence,
            Trait::Knowledge,
        ]
    }
}

impl fmt::Display for Trait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Trait {
    type Err = TraitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        Trait::all()
            .into_iter()
            .find(|t| t.key() == key)
            .ok_or_else(|| TraitError::UnknownTrait(s.trim().to_string()))
    }
}

/// The six trait values of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TraitSet {
    pub agility: i8,
    pub strength: i8,
    pub finesse: i8,
    pub instinct: i8,
    pub presence: i8,
    pub knowledge: i8,
}

impl TraitSet {
    /// Build a validated set in [`Trait::all`] order.
    pub fn new(
        agility: i8,
        strength: i8,
        finesse: i8,
        instinct: i8,
        presence: i8,
        knowledge: i8,
    ) -> Result<Self, TraitError> {
        let set = Self {
            agility,
            strength,
            finesse,
            instinct,
            presence,
            knowledge,
        };
        set.validate()?;
        Ok(set)
    }

    /// Build a validated set from a slice of exactly six values.
    pub fn from_values(values: &[i32]) -> Result<Self, TraitError> {
        let [a, s, f, i, p, k] = <[i32; 6]>::try_from(values)
            .map_err(|_| TraitError::WrongCount(values.len()))?;
        let mut set = TraitSet::default();
        for (t, value) in Trait::all().into_iter().zip([a, s, f, i, p, k]) {
            if !(TRAIT_MIN as i32..=TRAIT_MAX as i32).contains(&value) {
                return Err(TraitError::OutOfRange {
                    name: t.name(),
                    value,
                });
            }
            set.set(t, value as i8);
        }
        set.validate()?;
        Ok(set)
    }

    pub fn get(&self, t: Trait) -> i8 {
        match t {
            Trait::Agility => self.agility,
            Trait::Strength => self.strength,
            Trait::Finesse => self.finesse,
            Trait::Instinct => self.instinct,
            Trait::Presence => self.presence,
            Trait::Knowledge => self.knowledge,
        }
    }

    pub fn set(&mut self, t: Trait, value: i8) {
        match t {
            Trait::Agility => self.agility = value,
            Trait::Strength => self.strength = value,
            Trait::Finesse => self.finesse = value,
            Trait::Instinct => self.instinct = value,
            Trait::Presence => self.presence = value,
            Trait::Knowledge => self.knowledge = value,
        }
    }

    pub fn total(&self) -> i32 {
        Trait::all().iter().map(|t| self.get(*t) as i32).sum()
    }

    /// Check the creation invariants: each value in range and the sum exact.
    pub fn validate(&self) -> Result<(), TraitError> {
        for t in Trait::all() {
            let value = self.get(t) as i32;
            if !(TRAIT_MIN as i32..=TRAIT_MAX as i32).contains(&value) {
                return Err(TraitError::OutOfRange {
                    name: t.name(),
                    value,
                });
            }
        }
        match self.total() {
            TRAIT_TOTAL => Ok(()),
            other => Err(TraitError::InvalidTotal(other)),
        }
    }

    /// Add bonuses and clamp every trait back into range.
    ///
    /// The result may no longer sum to the creation total.
    pub fn with_bonuses(&self, bonuses: &[(Trait, i8)]) -> TraitSet {
        let mut out = *self;
        for (t, bonus) in bonuses {
            let value = (out.get(*t) as i32 + *bonus as i32).clamp(TRAIT_MIN as i32, TRAIT_MAX as i32);
            out.set(*t, value as i8);
        }
        out
    }

    pub fn values(&self) -> [i8; 6] {
        Trait::all().map(|t| self.get(t))
    }
}

impl fmt::Display for TraitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = Trait::all()
            .iter()
            .map(|t| format!("{} {:+}", t.name(), self.get(*t)))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_distribution() {
        let set = TraitSet::from_values(&[1, 2, 0, 1, 0, -1]).unwrap();
        assert_eq!(set.total(), 3);
        assert_eq!(set.get(Trait::Strength), 2);
    }

    #[test]
    fn test_wrong_sum_rejected() {
        assert_eq!(
            TraitSet::from_values(&[1, 1, 1, 1, 1, 1]),
            Err(TraitError::InvalidTotal(6))
        );
        assert_eq!(
            TraitSet::new(0, 0, 0, 0, 0, 0),
            Err(TraitError::InvalidTotal(0))
        );
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(matches!(
            TraitSet::from_values(&[4, -1, 0, 0, 0, 0]),
            Err(TraitError::OutOfRange { name: "Agility", value: 4 })
        ));
        assert!(matches!(
            TraitSet::from_values(&[100, -97, 0, 0, 0, 0]),
            Err(TraitError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_wrong_count() {
        assert_eq!(
            TraitSet::from_values(&[1, 2]),
            Err(TraitError::WrongCount(2))
        );
    }

    #[test]
    fn test_bonus_clamps() {
        let set = TraitSet::new(3, 0, 0, 0, 0, 0).unwrap();
        let boosted = set.with_bonuses(&[(Trait::Agility, 2), (Trait::Strength, 1)]);
        assert_eq!(boosted.agility, 3);
        assert_eq!(boosted.strength, 1);
    }

    #[test]
    fn test_trait_parsing() {
        assert_eq!("STRENGTH".parse::<Trait>(), Ok(Trait::Strength));
        assert_eq!(" finesse ".parse::<Trait>(), Ok(Trait::Finesse));
        assert_eq!(
            "charisma".parse::<Trait>(),
            Err(TraitError::UnknownTrait("charisma".to_string()))
        );
    }
}
