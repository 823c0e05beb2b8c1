//! Consumable item catalog and the effects items grant.
//!
//! The catalog is static configuration: the engine reads it but never
//! mutates it. Item ids here are the ones achievement rewards refer to.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Default cap for a single inventory stack.
pub const DEFAULT_MAX_STACK: u32 = 99;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKey {
    /// Doubles points while active.
    DoublePoints,
    /// Triples the points of the next completion, then is consumed.
    NextTriple,
    /// Doubles the points of the next completion, then is consumed.
    Lucky,
    /// Adds its value to every multiplier step while active.
    GlobalMultBoost,
    /// Absorbs the next failure penalty.
    StreakShield,
    /// Absorbs the next failure and grants a regular step instead.
    GoldenShield,
    /// Replaces the failure penalty with its value while active.
    ReducedPenalty,
    /// Instant: raise a habit multiplier.
    MultRecovery,
    /// Instant: raise a habit's base and current multiplier.
    PermBaseMult,
    /// Instant: mark yesterday completed for a habit.
    RetroactiveComplete,
}

impl EffectKey {
    /// Factor applied to completion points while the effect is active.
    pub fn point_factor(self) -> Option<f64> {
        match self {
            EffectKey::DoublePoints => Some(2.0),
            EffectKey::NextTriple => Some(3.0),
            EffectKey::Lucky => Some(2.0),
            _ => None,
        }
    }

    /// Consumed by the first completion that it applies to.
    pub fn is_one_shot(self) -> bool {
        matches!(self, EffectKey::NextTriple | EffectKey::Lucky)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectCategory {
    /// Active for `duration_days` after use.
    Timed,
    /// Active until consumed.
    Passive,
    /// Applied to a target habit on use.
    Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub rarity: Rarity,
    pub category: EffectCategory,
    pub effect: EffectKey,
    pub value: f64,
    pub duration_days: u32,
    pub max_stack: u32,
}

impl Item {
    /// Instant items need a habit to act on.
    pub fn needs_target(&self) -> bool {
        self.category == EffectCategory::Instant
    }
}

pub const ITEMS: &[Item] = &[
    Item {
        id: "shield_of_streak",
        name: "Shield of Streak",
        description: "Fail one day without losing the multiplier.",
        icon: "🛡️",
        rarity: Rarity::Rare,
        category: EffectCategory::Passive,
        effect: EffectKey::StreakShield,
        value: 0.0,
        duration_days: 0,
        max_stack: DEFAULT_MAX_STACK,
    },
    Item {
        id: "golden_shield",
        name: "Golden Shield",
        description: "Turns your next failure into a multiplier gain.",
        icon: "🔰",
        rarity: Rarity::Legendary,
        category: EffectCategory::Passive,
        effect: EffectKey::GoldenShield,
        value: 0.0,
        duration_days: 0,
        max_stack: 3,
    },
    Item {
        id: "double_elixir",
        name: "Double Elixir",
        description: "Double points on every completion for 3 days.",
        icon: "⚗️",
        rarity: Rarity::Epic,
        category: EffectCategory::Timed,
        effect: EffectKey::DoublePoints,
        value: 2.0,
        duration_days: 3,
        max_stack: DEFAULT_MAX_STACK,
    },
    Item {
        id: "boost_potion",
        name: "Boost Potion",
        description: "+0.2 extra multiplier growth on every completion for 3 days.",
        icon: "🧪",
        rarity: Rarity::Rare,
        category: EffectCategory::Timed,
        effect: EffectKey::GlobalMultBoost,
        value: 0.2,
        duration_days: 3,
        max_stack: DEFAULT_MAX_STACK,
    },
    Item {
        id: "amulet_constancy",
        name: "Amulet of Constancy",
        description: "Failure penalty drops from 0.4 to 0.2 for 7 days.",
        icon: "📿",
        rarity: Rarity::Epic,
        category: EffectCategory::Timed,
        effect: EffectKey::ReducedPenalty,
        value: 0.2,
        duration_days: 7,
        max_stack: DEFAULT_MAX_STACK,
    },
    Item {
        id: "triple_scroll",
        name: "Triple Scroll",
        description: "Your next completion gives triple points.",
        icon: "📜",
        rarity: Rarity::Epic,
        category: EffectCategory::Passive,
        effect: EffectKey::NextTriple,
        value: 3.0,
        duration_days: 0,
        max_stack: DEFAULT_MAX_STACK,
    },
    Item {
        id: "lucky_coin",
        name: "Lucky Coin",
        description: "Your next completion gives double points.",
        icon: "🪙",
        rarity: Rarity::Uncommon,
        category: EffectCategory::Passive,
        effect: EffectKey::Lucky,
        value: 2.0,
        duration_days: 0,
        max_stack: DEFAULT_MAX_STACK,
    },
    Item {
        id: "recovery_potion",
        name: "Recovery Potion",
        description: "Instantly adds +0.4 to the chosen habit's multiplier.",
        icon: "🍶",
        rarity: Rarity::Uncommon,
        category: EffectCategory::Instant,
        effect: EffectKey::MultRecovery,
        value: 0.4,
        duration_days: 0,
        max_stack: DEFAULT_MAX_STACK,
    },
    Item {
        id: "multiplier_gem",
        name: "Multiplier Gem",
        description: "Permanently raises the chosen habit's base multiplier by 0.5.",
        icon: "💎",
        rarity: Rarity::Legendary,
        category: EffectCategory::Instant,
        effect: EffectKey::PermBaseMult,
        value: 0.5,
        duration_days: 0,
        max_stack: 5,
    },
    Item {
        id: "time_crystal",
        name: "Time Crystal",
        description: "Marks yesterday as completed for the chosen habit.",
        icon: "🔮",
        rarity: Rarity::Epic,
        category: EffectCategory::Instant,
        effect: EffectKey::RetroactiveComplete,
        value: 0.0,
        duration_days: 0,
        max_stack: DEFAULT_MAX_STACK,
    },
];

pub fn find_item(id: &str) -> Option<&'static Item> {
    ITEMS.iter().find(|item| item.id == id)
}

/// An effect granted by a used item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub key: EffectKey,
    #[serde(default)]
    pub value: f64,
    /// `None` for passive effects that last until consumed.
    #[serde(default)]
    pub expires_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub item_name: String,
}

impl ActiveEffect {
    /// Active up to and including `expires_at`.
    pub fn is_active_at(&self, now: NaiveDateTime) -> bool {
        self.expires_at.map_or(true, |expires| now <= expires)
    }
}

/// The one query every consumer uses to read currently active effects.
pub fn active_effects_at(effects: &[ActiveEffect], now: NaiveDateTime) -> Vec<&ActiveEffect> {
    effects.iter().filter(|e| e.is_active_at(now)).collect()
}

/// Drop expired entries in place. Returns how many were removed.
pub fn purge_expired(effects: &mut Vec<ActiveEffect>, now: NaiveDateTime) -> usize {
    let before = effects.len();
    effects.retain(|e| e.is_active_at(now));
    before - effects.len()
}
