//! Structured effects pulled out of narrator prose.
//!
//! The grammar is deliberately small. Anything the patterns miss stays plain
//! narration and never touches game state.

use crate::character::PlayerId;
use crate::session::GameSession;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Source recorded on damage the narrator hands out.
pub const DEFAULT_DAMAGE_SOURCE: &str = "game event";

static ROLL_AGAINST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\broll\s+(\w+)\s+against\s+difficulty\s+(\d+)").expect("valid regex")
});

static MAKE_CHECK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bmake\s+an?\s+(\w+)\s+check\s*\((\d+)\)").expect("valid regex")
});

static CHECK_COLON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\w+)\s+check:\s*(\d+)").expect("valid regex"));

static FEAR_SPEND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:spend|use)\s+(\d+)\s+fear\b").expect("valid regex")
});

static DAMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:takes|deals)\s+(\d+)\s+damage\b").expect("valid regex")
});

/// A roll the narrator asked the player to make.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollRequest {
    /// Lower-cased as written; not guaranteed to name a real trait.
    pub trait_name: String,
    pub difficulty: i32,
}

impl fmt::Display for RollRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Roll {} against difficulty {}", self.trait_name, self.difficulty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    RequestRoll(RollRequest),
    SpendFear { amount: u32 },
    Damage { amount: u32, source: String },
}

impl Effect {
    pub fn description(&self) -> String {
        match self {
            Effect::RequestRoll(request) => format!("{} check requested", request.trait_name),
            Effect::SpendFear { amount } => format!("The GM spends {amount} Fear"),
            Effect::Damage { amount, .. } => format!("Damage: {amount}"),
        }
    }

    pub fn as_roll_request(&self) -> Option<&RollRequest> {
        match self {
            Effect::RequestRoll(request) => Some(request),
            _ => None,
        }
    }
}

/// Extracts [`Effect`]s from free-form text.
#[derive(Debug, Clone)]
pub struct EffectParser {
    damage_source: String,
}

impl Default for EffectParser {
    fn default() -> Self {
        Self {
            damage_source: DEFAULT_DAMAGE_SOURCE.to_string(),
        }
    }
}

impl EffectParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_damage_source(mut self, source: impl Into<String>) -> Self {
        self.damage_source = source.into();
        self
    }

    /// Parse every effect in `text`.
    ///
    /// Fear spends are checked against `fear_pool` in order of appearance.
    /// A spend the remaining pool cannot cover is dropped, never clamped.
    /// Results are grouped as roll requests, then Fear spends, then damage.
    pub fn parse(&self, text: &str, fear_pool: u32) -> Vec<Effect> {
        let mut effects = Vec::new();

        for re in [&*ROLL_AGAINST_RE, &*MAKE_CHECK_RE, &*CHECK_COLON_RE] {
            for caps in re.captures_iter(text) {
                let Ok(difficulty) = caps[2].parse::<i32>() else {
                    continue;
                };
                effects.push(Effect::RequestRoll(RollRequest {
                    trait_name: caps[1].to_lowercase(),
                    difficulty,
                }));
            }
        }

        // Each spend is checked against what earlier spends in this reply left.
        let mut remaining = fear_pool;
        for caps in FEAR_SPEND_RE.captures_iter(text) {
            let Ok(amount) = caps[1].parse::<u32>() else {
                continue;
            };
            if amount == 0 {
                continue;
            }
            if amount > remaining {
                tracing::debug!(amount, remaining, "Dropping unaffordable Fear spend");
                continue;
            }
            remaining -= amount;
            effects.push(Effect::SpendFear { amount });
        }

        for caps in DAMAGE_RE.captures_iter(text) {
            let Ok(amount) = caps[1].parse::<u32>() else {
                continue;
            };
            if amount == 0 {
                continue;
            }
            effects.push(Effect::Damage {
                amount,
                source: self.damage_source.clone(),
            });
        }

        effects
    }
}

/// Apply parsed effects to a session once each, on behalf of the acting
/// player. Returns the effects that changed state or were reported.
///
/// Roll requests are passed through untouched. A failing effect is logged and
/// skipped; the rest still apply.
pub fn apply_effects(session: &mut GameSession, player_id: &PlayerId, effects: &[Effect]) -> Vec<Effect> {
    let mut applied = Vec::with_capacity(effects.len());
    for effect in effects {
        let result = match effect {
            Effect::RequestRoll(_) => Ok(()),
            Effect::SpendFear { amount } => session.spend_fear(*amount).map(|_| ()),
            Effect::Damage { amount, source } => {
                session.deal_damage(player_id, *amount, source).map(|_| ())
            }
        };
        match result {
            Ok(()) => {
                tracing::debug!(session = %session.id, effect = %effect.description(), "Applied effect");
                applied.push(effect.clone());
            }
            Err(e) => {
                tracing::warn!(session = %session.id, effect = %effect.description(), error = %e, "Skipped effect");
            }
        }
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::Character;
    use crate::event::EventKind;

    fn roll(trait_name: &str, difficulty: i32) -> Effect {
        Effect::RequestRoll(RollRequest {
            trait_name: trait_name.to_string(),
            difficulty,
        })
    }

    #[test]
    fn test_roll_request_forms() {
        let parser = EffectParser::new();
        assert_eq!(
            parser.parse("The bridge sways. Roll Agility against difficulty 12.", 0),
            vec![roll("agility", 12)]
        );
        assert_eq!(
            parser.parse("Make a Knowledge check (14) to recall the sigil.", 0),
            vec![roll("knowledge", 14)]
        );
        assert_eq!(
            parser.parse("Presence check: 10", 0),
            vec![roll("presence", 10)]
        );
    }

    #[test]
    fn test_plain_prose_has_no_effects() {
        let parser = EffectParser::new();
        assert!(parser
            .parse("The wind howls through the ruined keep. What do you do?", 5)
            .is_empty());
    }

    #[test]
    fn test_fear_requires_pool() {
        let parser = EffectParser::new();
        assert_eq!(
            parser.parse("I spend 2 Fear to summon reinforcements.", 3),
            vec![Effect::SpendFear { amount: 2 }]
        );
        assert!(parser.parse("I spend 2 Fear to summon reinforcements.", 1).is_empty());
        assert_eq!(
            parser.parse("I use 1 fear.", 1),
            vec![Effect::SpendFear { amount: 1 }]
        );
    }

    #[test]
    fn test_fear_budget_is_shared_across_matches() {
        let parser = EffectParser::new();
        let effects = parser.parse("I spend 2 Fear. Then I spend 2 Fear again. I use 1 Fear.", 3);
        assert_eq!(
            effects,
            vec![Effect::SpendFear { amount: 2 }, Effect::SpendFear { amount: 1 }]
        );
    }

    #[test]
    fn test_damage_forms_and_source() {
        let parser = EffectParser::new();
        assert_eq!(
            parser.parse("Aria takes 4 damage from the falling stones.", 0),
            vec![Effect::Damage {
                amount: 4,
                source: "game event".to_string()
            }]
        );

        let parser = EffectParser::new().with_damage_source("ogre");
        assert_eq!(
            parser.parse("The ogre deals 7 damage.", 0),
            vec![Effect::Damage {
                amount: 7,
                source: "ogre".to_string()
            }]
        );
    }

    #[test]
    fn test_multiple_effects_in_one_reply() {
        let parser = EffectParser::new();
        let text = "The trap springs and Bram takes 3 damage! I spend 1 Fear to seal the door. \
                    Roll Finesse against difficulty 13 to slip through.";
        assert_eq!(
            parser.parse(text, 2),
            vec![
                roll("finesse", 13),
                Effect::SpendFear { amount: 1 },
                Effect::Damage {
                    amount: 3,
                    source: "game event".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_apply_effects() {
        let mut session = GameSession::new("gm", "Effects");
        session.add_player("a", Character::new("Aria", "a")).unwrap();
        session.gain_fear(2);
        let player = PlayerId::new("a");

        let effects = vec![
            roll("agility", 12),
            Effect::SpendFear { amount: 2 },
            Effect::Damage {
                amount: 2,
                source: "game event".to_string(),
            },
        ];
        let applied = apply_effects(&mut session, &player, &effects);
        assert_eq!(applied, effects);
        assert_eq!(session.fear_pool(), 0);
        assert_eq!(session.character(&player).unwrap().hit_points.current, 4);
        assert_eq!(session.events().of_kind(EventKind::FearSpent).count(), 1);
        assert_eq!(session.events().of_kind(EventKind::DamageDealt).count(), 1);
    }

    #[test]
    fn test_apply_skips_failures() {
        let mut session = GameSession::new("gm", "Effects");
        let effects = vec![
            Effect::SpendFear { amount: 1 },
            Effect::Damage {
                amount: 3,
                source: "game event".to_string(),
            },
        ];
        let applied = apply_effects(&mut session, &PlayerId::new("nobody"), &effects);
        assert!(applied.is_empty());
        assert!(session.events().is_empty());
    }
}
