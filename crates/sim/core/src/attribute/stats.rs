//! Stat maps and base stat blocks.

use std::collections::BTreeMap;

use super::{Attribute, Stat};

/// Ordered mapping of stat key to numeric delta.
///
/// Carried by modifier instances; a `BTreeMap` keeps iteration order stable
/// so logging and serialization are reproducible run-to-run.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatMap {
    deltas: BTreeMap<Stat, f64>,
}

impl StatMap {
    /// Creates an empty stat map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion: `StatMap::new().with(Stat::AtkPercent, 0.20)`.
    pub fn with(mut self, stat: Stat, delta: f64) -> Self {
        self.set(stat, delta);
        self
    }

    /// Sets the delta for a stat, overwriting any previous value.
    pub fn set(&mut self, stat: Stat, delta: f64) {
        self.deltas.insert(stat, delta);
    }

    /// Delta for a stat, zero when absent.
    pub fn amount(&self, stat: Stat) -> f64 {
        self.deltas.get(&stat).copied().unwrap_or(0.0)
    }

    /// Iterates deltas in stable key order.
    pub fn iter(&self) -> impl Iterator<Item = (Stat, f64)> + '_ {
        self.deltas.iter().map(|(s, d)| (*s, *d))
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }
}

/// Base stat block of a target.
///
/// Stored once at battle setup; resolved attributes layer modifier deltas on
/// top of these values without ever mutating them.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BaseStats {
    pub hp: f64,
    pub atk: f64,
    pub def: f64,
    pub spd: f64,
    pub crit_rate: f64,
    pub crit_dmg: f64,
    pub effect_hit_rate: f64,
    pub effect_res: f64,
}

impl BaseStats {
    /// Convenience constructor for the common four stats; crit and effect
    /// stats start at zero and can be set directly.
    pub fn new(hp: f64, atk: f64, def: f64, spd: f64) -> Self {
        Self {
            hp,
            atk,
            def,
            spd,
            ..Self::default()
        }
    }

    /// Base value for a resolvable attribute.
    pub fn value(&self, attribute: Attribute) -> f64 {
        match attribute {
            Attribute::Hp => self.hp,
            Attribute::Atk => self.atk,
            Attribute::Def => self.def,
            Attribute::Spd => self.spd,
            Attribute::CritRate => self.crit_rate,
            Attribute::CritDmg => self.crit_dmg,
            Attribute::EffectHitRate => self.effect_hit_rate,
            Attribute::EffectRes => self.effect_res,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_map_amount_defaults_to_zero() {
        let map = StatMap::new().with(Stat::AtkFlat, 200.0);
        assert_eq!(map.amount(Stat::AtkFlat), 200.0);
        assert_eq!(map.amount(Stat::AtkPercent), 0.0);
    }

    #[test]
    fn base_stats_lookup() {
        let base = BaseStats::new(2000.0, 1000.0, 500.0, 100.0);
        assert_eq!(base.value(Attribute::Atk), 1000.0);
        assert_eq!(base.value(Attribute::CritRate), 0.0);
    }
}
