//! Classes, ancestries, starting equipment and domain cards.
//!
//! The catalog is a plain value owned by whoever builds characters, so tests
//! and alternate rule sets can supply their own tables.

use crate::traits::Trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A character class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassData {
    pub id: String,
    pub name: String,
    pub description: String,
    pub evasion: i32,
    pub hit_points: u32,
    pub damage_threshold: i32,
    pub domains: Vec<String>,
    pub special_abilities: Vec<String>,
}

/// A character ancestry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AncestryData {
    pub id: String,
    pub name: String,
    pub description: String,
    pub trait_bonuses: Vec<(Trait, i8)>,
    pub special_features: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Weapon,
    Armor,
    Tool,
}

/// A piece of equipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub kind: ItemKind,
    pub damage: Option<String>,
    pub armor_value: Option<u32>,
    pub durability: Option<u32>,
    pub max_durability: Option<u32>,
    pub description: String,
}

impl Item {
    pub fn weapon(name: &str, damage: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ItemKind::Weapon,
            damage: Some(damage.to_string()),
            armor_value: None,
            durability: None,
            max_durability: None,
            description: description.to_string(),
        }
    }

    pub fn armor(name: &str, armor_value: u32, durability: u32) -> Self {
        Self {
            name: name.to_string(),
            kind: ItemKind::Armor,
            damage: None,
            armor_value: Some(armor_value),
            durability: Some(durability),
            max_durability: Some(durability),
            description: String::new(),
        }
    }

    pub fn tool(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ItemKind::Tool,
            damage: None,
            armor_value: None,
            durability: None,
            max_durability: None,
            description: description.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    Ability,
    Spell,
}

/// An ability or spell drawn from a domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainCard {
    pub name: String,
    pub domain: String,
    pub kind: CardKind,
    pub level: u32,
    pub description: String,
    pub mechanics: serde_json::Value,
}

impl DomainCard {
    fn new(
        name: &str,
        domain: &str,
        kind: CardKind,
        description: &str,
        mechanics: serde_json::Value,
    ) -> Self {
        Self {
            name: name.to_string(),
            domain: domain.to_string(),
            kind,
            level: 1,
            description: description.to_string(),
            mechanics,
        }
    }
}

/// Lookup tables for character creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentCatalog {
    classes: BTreeMap<String, ClassData>,
    ancestries: BTreeMap<String, AncestryData>,
    starting_equipment: BTreeMap<String, Vec<Item>>,
    domain_cards: BTreeMap<String, Vec<DomainCard>>,
}

impl ContentCatalog {
    /// A catalog with no content at all.
    pub fn empty() -> Self {
        Self {
            classes: BTreeMap::new(),
            ancestries: BTreeMap::new(),
            starting_equipment: BTreeMap::new(),
            domain_cards: BTreeMap::new(),
        }
    }

    /// Class by case-insensitive id.
    pub fn class(&self, id: &str) -> Option<&ClassData> {
        self.classes.get(&id.trim().to_lowercase())
    }

    /// Ancestry by case-insensitive id.
    pub fn ancestry(&self, id: &str) -> Option<&AncestryData> {
        self.ancestries.get(&id.trim().to_lowercase())
    }

    pub fn starting_equipment(&self, class_id: &str) -> &[Item] {
        self.starting_equipment
            .get(&class_id.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn domain_cards(&self, domain: &str) -> &[DomainCard] {
        self.domain_cards
            .get(&domain.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// One card from each of the class's first two domains that have any.
    pub fn starting_cards(&self, class_id: &str) -> Vec<DomainCard> {
        let Some(class) = self.class(class_id) else {
            return Vec::new();
        };
        class
            .domains
            .iter()
            .take(2)
            .filter_map(|domain| self.domain_cards(domain).first().cloned())
            .collect()
    }

    pub fn class_ids(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    pub fn ancestry_ids(&self) -> impl Iterator<Item = &str> {
        self.ancestries.keys().map(String::as_str)
    }

    pub fn with_class(mut self, class: ClassData) -> Self {
        self.classes.insert(class.id.to_lowercase(), class);
        self
    }

    pub fn with_ancestry(mut self, ancestry: AncestryData) -> Self {
        self.ancestries.insert(ancestry.id.to_lowercase(), ancestry);
        self
    }

    pub fn with_starting_equipment(mut self, class_id: &str, items: Vec<Item>) -> Self {
        self.starting_equipment.insert(class_id.to_lowercase(), items);
        self
    }

    pub fn with_domain_cards(mut self, domain: &str, cards: Vec<DomainCard>) -> Self {
        self.domain_cards.insert(domain.to_lowercase(), cards);
        self
    }
}

fn class(
    id: &str,
    name: &str,
    description: &str,
    (evasion, hit_points, damage_threshold): (i32, u32, i32),
    domains: [&str; 2],
    special_abilities: [&str; 2],
) -> ClassData {
    ClassData {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        evasion,
        hit_points,
        damage_threshold,
        domains: domains.iter().map(|d| d.to_string()).collect(),
        special_abilities: special_abilities.iter().map(|a| a.to_string()).collect(),
    }
}

fn ancestry(
    id: &str,
    name: &str,
    description: &str,
    trait_bonuses: Vec<(Trait, i8)>,
    special_features: [&str; 2],
) -> AncestryData {
    AncestryData {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        trait_bonuses,
        special_features: special_features.iter().map(|f| f.to_string()).collect(),
    }
}

impl Default for ContentCatalog {
    fn default() -> Self {
        use serde_json::json;

        ContentCatalog::empty()
            // ================================================================
            // Classes
            // ================================================================
            .with_class(class(
                "guardian",
                "Guardian",
                "You run into danger to protect your party",
                (12, 6, 3),
                ["Valor", "Blade"],
                ["Armor Mastery", "Guardian's Resolve"],
            ))
            .with_class(class(
                "ranger",
                "Ranger",
                "Your keen eyes and graceful haste make you indispensable",
                (14, 5, 2),
                ["Bow", "Wild"],
                ["Hunter's Mark", "Wild Sense"],
            ))
            .with_class(class(
                "rogue",
                "Rogue",
                "You fight with your blade as well as your wit",
                (15, 4, 2),
                ["Blade", "Midnight"],
                ["Sneak Attack", "Quick Reflexes"],
            ))
            .with_class(class(
                "seraph",
                "Seraph",
                "You've taken a vow to a god who helps you channel sacred power",
                (11, 5, 2),
                ["Grace", "Splendor"],
                ["Divine Magic", "Healing Touch"],
            ))
            .with_class(class(
                "sorcerer",
                "Sorcerer",
                "You were born with innate magical power",
                (10, 4, 1),
                ["Arcana", "Elemental"],
                ["Volatile Magic", "Arcane Sense"],
            ))
            .with_class(class(
                "warrior",
                "Warrior",
                "You run into battle without hesitation",
                (13, 6, 3),
                ["Blade", "Bone"],
                ["Battle Fury", "Weapon Mastery"],
            ))
            // ================================================================
            // Ancestries
            // ================================================================
            .with_ancestry(ancestry(
                "human",
                "Human",
                "Versatile and ambitious",
                vec![(Trait::Presence, 1)],
                ["Versatility", "Determination"],
            ))
            .with_ancestry(ancestry(
                "elf",
                "Elf",
                "Graceful and magical",
                vec![(Trait::Finesse, 1), (Trait::Knowledge, 1)],
                ["Keen Senses", "Magic Affinity"],
            ))
            .with_ancestry(ancestry(
                "dwarf",
                "Dwarf",
                "Hardy and resilient",
                vec![(Trait::Strength, 1), (Trait::Instinct, 1)],
                ["Stone Sense", "Crafting Expertise"],
            ))
            .with_ancestry(ancestry(
                "orc",
                "Orc",
                "Strong and fierce",
                vec![(Trait::Strength, 2)],
                ["Fierce", "Intimidating Presence"],
            ))
            // ================================================================
            // Starting equipment
            // ================================================================
            .with_starting_equipment(
                "guardian",
                vec![
                    Item::armor("Shield", 2, 5),
                    Item::weapon("Sword", "2d6+1", "A dependable guardian's blade"),
                ],
            )
            .with_starting_equipment(
                "ranger",
                vec![
                    Item::weapon("Bow", "2d6", "A ranged weapon"),
                    Item::tool("Quiver", "30 arrows"),
                ],
            )
            .with_starting_equipment(
                "rogue",
                vec![
                    Item::weapon("Dagger", "1d6+2", "Quick and precise"),
                    Item::tool("Thieves' Tools", "For picking locks"),
                ],
            )
            .with_starting_equipment(
                "seraph",
                vec![
                    Item::tool("Holy Symbol", "Focus for divine magic"),
                    Item::tool("Healing Kit", "Basic first aid"),
                ],
            )
            .with_starting_equipment(
                "sorcerer",
                vec![
                    Item::tool("Spellbook", "Holds the spells you have learned"),
                    Item::tool("Focus Crystal", "Amplifies magic"),
                ],
            )
            .with_starting_equipment(
                "warrior",
                vec![
                    Item::weapon("Battle Axe", "2d6+2", "A heavy two-handed weapon"),
                    Item::armor("Leather Armor", 1, 3),
                ],
            )
            // ================================================================
            // Domain cards
            // ================================================================
            .with_domain_cards(
                "blade",
                vec![
                    DomainCard::new(
                        "Strike",
                        "Blade",
                        CardKind::Ability,
                        "A basic melee attack",
                        json!({"action_type": "attack", "range": "melee", "damage": "weapon"}),
                    ),
                    DomainCard::new(
                        "Parry",
                        "Blade",
                        CardKind::Ability,
                        "Deflect an incoming attack",
                        json!({"action_type": "reaction", "effect": "reduce_damage"}),
                    ),
                ],
            )
            .with_domain_cards(
                "arcana",
                vec![
                    DomainCard::new(
                        "Magic Missile",
                        "Arcana",
                        CardKind::Spell,
                        "Unerring magical projectile",
                        json!({"action_type": "attack", "range": "far", "damage": "1d6+knowledge", "auto_hit": true}),
                    ),
                    DomainCard::new(
                        "Detect Magic",
                        "Arcana",
                        CardKind::Spell,
                        "Sense magical auras",
                        json!({"action_type": "utility", "range": "close", "duration": "scene"}),
                    ),
                ],
            )
            .with_domain_cards(
                "grace",
                vec![
                    DomainCard::new(
                        "Healing Word",
                        "Grace",
                        CardKind::Spell,
                        "Restore hit points with divine magic",
                        json!({"action_type": "utility", "range": "close", "healing": "1d6+presence"}),
                    ),
                    DomainCard::new(
                        "Bless",
                        "Grace",
                        CardKind::Spell,
                        "Grant divine favor",
                        json!({"action_type": "utility", "range": "close", "effect": "advantage_next_roll"}),
                    ),
                ],
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_classes() {
        let catalog = ContentCatalog::default();
        assert_eq!(catalog.class_ids().count(), 6);
        let guardian = catalog.class("Guardian").unwrap();
        assert_eq!(guardian.evasion, 12);
        assert_eq!(guardian.hit_points, 6);
        assert_eq!(guardian.damage_threshold, 3);
        assert!(catalog.class("bard").is_none());
    }

    #[test]
    fn test_default_ancestries() {
        let catalog = ContentCatalog::default();
        let orc = catalog.ancestry("orc").unwrap();
        assert_eq!(orc.trait_bonuses, vec![(Trait::Strength, 2)]);
        assert!(catalog.ancestry("goblin").is_none());
    }

    #[test]
    fn test_starting_cards_skip_empty_domains() {
        let catalog = ContentCatalog::default();
        // Valor has no cards, Blade does.
        let guardian: Vec<_> = catalog
            .starting_cards("guardian")
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(guardian, vec!["Strike"]);

        let sorcerer = catalog.starting_cards("sorcerer");
        assert_eq!(sorcerer.len(), 1);
        assert_eq!(sorcerer[0].name, "Magic Missile");

        assert!(catalog.starting_cards("ranger").is_empty());
    }

    #[test]
    fn test_custom_catalog() {
        let catalog = ContentCatalog::empty().with_class(class(
            "knight",
            "Knight",
            "Sworn to a banner",
            (11, 7, 3),
            ["Valor", "Blade"],
            ["Charge", "Oath"],
        ));
        assert!(catalog.class("KNIGHT").is_some());
        assert!(catalog.class("guardian").is_none());
        assert!(catalog.starting_equipment("knight").is_empty());
    }
}
