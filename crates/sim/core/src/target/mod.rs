//! Per-target mutable state and the battle roster.
//!
//! The registry owns every target's state for one simulation instance.
//! Identifiers are allocated monotonically and never reused; enumeration
//! order is insertion order, which abilities rely on for deterministic
//! multi-target effects.

use crate::attribute::BaseStats;
use crate::key::{CharacterKey, TargetId};
use crate::modifier::ModifierStore;

/// Whether a target sits on the character or enemy side of the battle.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TargetKind {
    Character,
    Enemy,
}

/// Stored energy meter for a target.
///
/// Current energy is stored directly rather than derived; every write
/// saturates into `[0, max]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnergyMeter {
    current: f64,
    pub max: f64,
}

impl EnergyMeter {
    pub fn new(current: f64, max: f64) -> Self {
        Self {
            current: current.clamp(0.0, max),
            max,
        }
    }

    /// Empty meter with the given capacity.
    pub fn empty(max: f64) -> Self {
        Self::new(0.0, max)
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    /// Adds a (possibly negative) amount, saturating at the given effective
    /// maximum. Returns the applied delta after saturation.
    ///
    /// The effective maximum is passed in rather than read from `self.max`
    /// because percent-based max-energy modifiers change it.
    pub fn add(&mut self, amount: f64, effective_max: f64) -> f64 {
        let before = self.current;
        self.current = (self.current + amount).clamp(0.0, effective_max);
        self.current - before
    }
}

/// Mutable state of one character or enemy.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TargetState {
    pub id: TargetId,
    pub kind: TargetKind,
    /// Template key for characters spawned from the character registry.
    pub template: Option<CharacterKey>,
    pub base: BaseStats,
    pub energy: EnergyMeter,
    pub modifiers: ModifierStore,
    /// Count of effects this target has had dispelled from it, tracked for
    /// abilities that count how many effects they have cleared.
    pub dispel_count: u32,
}

impl TargetState {
    pub fn new(id: TargetId, kind: TargetKind, base: BaseStats, max_energy: f64) -> Self {
        Self {
            id,
            kind,
            template: None,
            base,
            energy: EnergyMeter::empty(max_energy),
            modifiers: ModifierStore::new(),
            dispel_count: 0,
        }
    }
}

/// Roster of all targets in one simulation instance.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TargetRegistry {
    targets: Vec<TargetState>,
    /// Monotonic id allocator; never reused within a simulation.
    next_id: u32,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next identifier without inserting a target.
    pub(crate) fn allocate_id(&mut self) -> TargetId {
        let id = TargetId(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn insert(&mut self, state: TargetState) {
        self.targets.push(state);
    }

    pub fn get(&self, id: TargetId) -> Option<&TargetState> {
        self.targets.iter().find(|t| t.id == id)
    }

    pub fn get_mut(&mut self, id: TargetId) -> Option<&mut TargetState> {
        self.targets.iter_mut().find(|t| t.id == id)
    }

    pub fn contains(&self, id: TargetId) -> bool {
        self.get(id).is_some()
    }

    /// All targets in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &TargetState> {
        self.targets.iter()
    }

    /// Character-side target ids in insertion order.
    pub fn characters(&self) -> Vec<TargetId> {
        self.ids_of(TargetKind::Character)
    }

    /// Enemy-side target ids in insertion order.
    pub fn enemies(&self) -> Vec<TargetId> {
        self.ids_of(TargetKind::Enemy)
    }

    fn ids_of(&self, kind: TargetKind) -> Vec<TargetId> {
        self.targets
            .iter()
            .filter(|t| t.kind == kind)
            .map(|t| t.id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn energy_meter_saturates_both_bounds() {
        let mut meter = EnergyMeter::empty(140.0);
        assert_eq!(meter.add(200.0, 140.0), 140.0);
        assert_eq!(meter.current(), 140.0);

        assert_eq!(meter.add(-500.0, 140.0), -140.0);
        assert_eq!(meter.current(), 0.0);
    }

    #[test]
    fn energy_meter_reports_applied_delta() {
        let mut meter = EnergyMeter::new(120.0, 140.0);
        // Only 20 of the requested 28 fits.
        assert_eq!(meter.add(28.0, 140.0), 20.0);
    }

    #[test]
    fn ids_allocate_monotonically_and_enumerate_in_insertion_order() {
        let mut registry = TargetRegistry::new();
        for kind in [TargetKind::Character, TargetKind::Enemy, TargetKind::Character] {
            let id = registry.allocate_id();
            registry.insert(TargetState::new(id, kind, BaseStats::default(), 100.0));
        }

        assert_eq!(registry.characters(), vec![TargetId(0), TargetId(2)]);
        assert_eq!(registry.enemies(), vec![TargetId(1)]);
    }
}
