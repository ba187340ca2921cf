//! Attribute keys, stat deltas, and the numeric composition rules.
//!
//! A resolved attribute is always computed the same way:
//!
//! ```text
//! resolved = clamp((base + Σ flat) × (1 + Σ percent), bounds)
//! ```
//!
//! Flat deltas apply before percentage deltas, and percentage deltas from
//! different sources sum additively before the single multiplication. This
//! order is a load-bearing convention: ability balance and every numeric
//! test expectation in the simulator depend on it.

mod stats;

pub use stats::{BaseStats, StatMap};

/// Resolvable attribute of a target.
///
/// Each attribute pairs a flat delta stat with an optional percentage delta
/// stat. Probability-like attributes (crit rate, effect hit) only take flat
/// deltas since they are already expressed as fractions.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Attribute {
    Hp,
    Atk,
    Def,
    Spd,
    CritRate,
    CritDmg,
    EffectHitRate,
    EffectRes,
}

impl Attribute {
    /// The stat carrying flat deltas for this attribute.
    pub fn flat_stat(self) -> Stat {
        match self {
            Attribute::Hp => Stat::HpFlat,
            Attribute::Atk => Stat::AtkFlat,
            Attribute::Def => Stat::DefFlat,
            Attribute::Spd => Stat::SpdFlat,
            Attribute::CritRate => Stat::CritRate,
            Attribute::CritDmg => Stat::CritDmg,
            Attribute::EffectHitRate => Stat::EffectHitRate,
            Attribute::EffectRes => Stat::EffectRes,
        }
    }

    /// The stat carrying percentage deltas for this attribute, if any.
    pub fn percent_stat(self) -> Option<Stat> {
        match self {
            Attribute::Hp => Some(Stat::HpPercent),
            Attribute::Atk => Some(Stat::AtkPercent),
            Attribute::Def => Some(Stat::DefPercent),
            Attribute::Spd => Some(Stat::SpdPercent),
            _ => None,
        }
    }

    /// Clamping bounds applied after composition.
    pub fn bounds(self) -> AttributeBounds {
        match self {
            Attribute::CritRate | Attribute::EffectHitRate | Attribute::EffectRes => {
                AttributeBounds::FRACTION
            }
            _ => AttributeBounds::NON_NEGATIVE,
        }
    }
}

/// Delta key carried by modifier stat maps.
///
/// Flat and percentage contributions to the same attribute are distinct
/// stats so a single modifier can carry both (e.g. `+200 ATK, +10% ATK`).
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Stat {
    HpFlat,
    HpPercent,
    AtkFlat,
    AtkPercent,
    DefFlat,
    DefPercent,
    SpdFlat,
    SpdPercent,
    CritRate,
    CritDmg,
    EffectHitRate,
    EffectRes,
    /// Percentage delta to maximum energy, consulted when computing
    /// percent-based energy gains.
    MaxEnergyPercent,
}

/// Bounds applied to a resolved attribute value.
///
/// Different attributes need different ranges: resource-like stats must not
/// go below zero, probability-like stats stay within `[0, 1]`.
#[derive(Clone, Copy, Debug)]
pub struct AttributeBounds {
    pub min: f64,
    pub max: f64,
}

impl AttributeBounds {
    /// Resource and combat stats: never below zero, no upper cap.
    pub const NON_NEGATIVE: Self = Self {
        min: 0.0,
        max: f64::INFINITY,
    };

    /// Probability-like stats clamped to `[0, 1]`.
    pub const FRACTION: Self = Self { min: 0.0, max: 1.0 };
}

/// Fold a base value with summed deltas in the canonical order.
///
/// This is the single place the flat-then-percent rule lives. Callers sum
/// flat and percent contributions in modifier-application order and pass
/// the totals here.
pub fn compose(base: f64, flat_sum: f64, percent_sum: f64, bounds: AttributeBounds) -> f64 {
    ((base + flat_sum) * (1.0 + percent_sum)).clamp(bounds.min, bounds.max)
}
