//! Duality dice.
//!
//! Every action roll throws a Hope d12 and a Fear d12 together. The sum plus
//! an optional d6 from advantage or disadvantage is checked against a
//! difficulty, while the comparison between the two dice decides which side
//! of the table gains momentum.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sides on each duality die.
pub const DUALITY_DIE: u32 = 12;

/// Sides on the advantage/disadvantage die.
pub const ADVANTAGE_DIE: u32 = 6;

/// Difficulty used when the caller does not name one.
pub const DEFAULT_DIFFICULTY: i32 = 12;

/// Source of die results.
///
/// The session owns one of these so tests can script exact outcomes.
pub trait DiceRoller: Send + fmt::Debug {
    /// Roll a single die, returning a value in `1..=sides`.
    fn roll_die(&mut self, sides: u32) -> u32;
}

/// Dice backed by a seedable RNG.
#[derive(Debug, Clone)]
pub struct RandomDice {
    rng: StdRng,
}

impl RandomDice {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic dice for reproducible games.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomDice {
    fn default() -> Self {
        Self::new()
    }
}

impl DiceRoller for RandomDice {
    fn roll_die(&mut self, sides: u32) -> u32 {
        self.rng.gen_range(1..=sides.max(1))
    }
}

/// Advantage state for duality rolls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Advantage {
    #[default]
    Normal,
    Advantage,
    Disadvantage,
}

impl Advantage {
    /// Build from independent flags. Both set cancel out.
    pub fn from_flags(advantage: bool, disadvantage: bool) -> Advantage {
        match (advantage, disadvantage) {
            (true, false) => Advantage::Advantage,
            (false, true) => Advantage::Disadvantage,
            _ => Advantage::Normal,
        }
    }
}

/// Which side a duality roll favors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Both dice show the same face.
    CriticalSuccess,
    /// The Hope die is higher; the acting player gains Hope.
    SuccessWithHope,
    /// The Fear die is higher; the GM gains Fear.
    SuccessWithFear,
}

impl Outcome {
    pub fn classify(hope: u32, fear: u32) -> Outcome {
        use std::cmp::Ordering;
        match hope.cmp(&fear) {
            Ordering::Equal => Outcome::CriticalSuccess,
            Ordering::Greater => Outcome::SuccessWithHope,
            Ordering::Less => Outcome::SuccessWithFear,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::CriticalSuccess => "critical_success",
            Outcome::SuccessWithHope => "success_with_hope",
            Outcome::SuccessWithFear => "success_with_fear",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::CriticalSuccess => write!(f, "Critical success"),
            Outcome::SuccessWithHope => write!(f, "With Hope"),
            Outcome::SuccessWithFear => write!(f, "With Fear"),
        }
    }
}

/// A resolved pair of duality dice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DualityRoll {
    pub hope_die: u32,
    pub fear_die: u32,
    /// Signed d6 from advantage (+) or disadvantage (-), zero otherwise.
    pub bonus: i32,
    pub total: i32,
    pub outcome: Outcome,
}

impl DualityRoll {
    /// Assemble a roll from known faces.
    pub fn from_dice(hope_die: u32, fear_die: u32, bonus: i32) -> Self {
        Self {
            hope_die,
            fear_die,
            bonus,
            total: hope_die as i32 + fear_die as i32 + bonus,
            outcome: Outcome::classify(hope_die, fear_die),
        }
    }

    pub fn is_critical(&self) -> bool {
        self.outcome == Outcome::CriticalSuccess
    }

    /// Format the individual dice for display, e.g. `Hope 9 | Fear 4 +3`.
    pub fn dice_display(&self) -> String {
        let mut out = format!("Hope {} | Fear {}", self.hope_die, self.fear_die);
        if self.bonus > 0 {
            out.push_str(&format!(" +{}", self.bonus));
        } else if self.bonus < 0 {
            out.push_str(&format!(" {}", self.bonus));
        }
        out
    }
}

impl fmt::Display for DualityRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {} ({})", self.dice_display(), self.total, self.outcome)
    }
}

/// Roll the duality dice.
pub fn roll_duality<D: DiceRoller + ?Sized>(dice: &mut D, advantage: Advantage) -> DualityRoll {
    let hope_die = dice.roll_die(DUALITY_DIE);
    let fear_die = dice.roll_die(DUALITY_DIE);
    let bonus = match advantage {
        Advantage::Normal => 0,
        Advantage::Advantage => dice.roll_die(ADVANTAGE_DIE) as i32,
        Advantage::Disadvantage => -(dice.roll_die(ADVANTAGE_DIE) as i32),
    };
    DualityRoll::from_dice(hope_die, fear_die, bonus)
}

/// A duality roll checked against a difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub roll: DualityRoll,
    pub modifier: i32,
    pub difficulty: i32,
    pub success: bool,
}

impl CheckResult {
    pub fn final_total(&self) -> i32 {
        self.roll.total + self.modifier
    }
}

/// Roll with a trait modifier against a difficulty.
///
/// Success compares the numeric total only; the outcome class is reported
/// alongside and never changes whether the check passed.
pub fn resolve_trait_check<D: DiceRoller + ?Sized>(
    dice: &mut D,
    trait_value: i32,
    difficulty: i32,
    advantage: Advantage,
) -> CheckResult {
    let roll = roll_duality(dice, advantage);
    CheckResult {
        roll,
        modifier: trait_value,
        difficulty,
        success: roll.total + trait_value >= difficulty,
    }
}
