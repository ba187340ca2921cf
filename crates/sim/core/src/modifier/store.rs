//! Per-target collection of active modifier instances.
//!
//! The store owns stacking and duration logic. Instances are kept in
//! application order, which defines both the resolver's fold order and the
//! oldest-first order used by dispel.

use crate::attribute::{Stat, StatMap};
use crate::key::{ModifierKey, TargetId};

use super::{Duration, ModifierConfig, ModifierEffect, ModifierFlags, Stacking, StatusClass};

/// An active status effect attached to a target.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ModifierInstance {
    pub key: ModifierKey,
    /// Target that applied this instance.
    pub source: TargetId,
    /// Target the instance is attached to.
    pub owner: TargetId,
    pub remaining: Duration,
    pub stacks: u32,
    /// Per-stack stat deltas; contribution scales with `stacks`.
    pub stats: StatMap,
    /// Monotonic application counter, breaks ties among duration updates.
    pub generation: u64,
    // Snapshotted from the config at apply time so dispel and status queries
    // never need a registry lookup mid-simulation.
    status: StatusClass,
    flags: ModifierFlags,
}

impl ModifierInstance {
    /// Builds a fresh instance from a registered template.
    pub(crate) fn from_config(
        key: ModifierKey,
        source: TargetId,
        owner: TargetId,
        config: &ModifierConfig,
        stats: StatMap,
        duration: Option<Duration>,
        generation: u64,
    ) -> Self {
        Self {
            key,
            source,
            owner,
            remaining: duration.unwrap_or(config.duration),
            stacks: 1,
            stats,
            generation,
            status: config.status,
            flags: config.flags,
        }
    }

    pub fn status(&self) -> StatusClass {
        self.status
    }

    pub fn flags(&self) -> ModifierFlags {
        self.flags
    }

    /// True if this instance can be removed by dispel: a buff that is not
    /// flagged undispellable.
    pub fn dispellable(&self) -> bool {
        self.status == StatusClass::Buff && !self.flags.contains(ModifierFlags::UNDISPELLABLE)
    }

    /// Total contribution of this instance to a stat, scaled by stack count.
    pub fn contribution(&self, stat: Stat) -> f64 {
        self.stats.amount(stat) * f64::from(self.stacks)
    }

    /// Listener-facing snapshot of this instance.
    pub fn effect(&self) -> ModifierEffect {
        ModifierEffect {
            key: self.key,
            owner: self.owner,
            source: self.source,
            stacks: self.stacks,
        }
    }
}

/// Result of applying a modifier instance to a store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// No instance of this key existed; the new one was added.
    Added,
    /// Replace policy: the existing instance was overwritten.
    Replaced,
    /// Stack policy: count after the application (capped at the maximum).
    Stacked { stacks: u32 },
    /// Extend policy: remaining duration after the application.
    Extended { remaining: Duration },
    /// Ignore policy: an unexpired instance exists, application was a no-op.
    Ignored,
}

impl ApplyOutcome {
    /// True unless the application was dropped by the Ignore policy.
    pub fn applied(self) -> bool {
        !matches!(self, ApplyOutcome::Ignored)
    }
}

/// Transition function for re-application against an existing instance.
///
/// Kept as a single match so each policy's semantics are visible in one
/// place and testable without a store.
fn transition(
    policy: Stacking,
    existing: &mut ModifierInstance,
    incoming: ModifierInstance,
    default_duration: Duration,
) -> ApplyOutcome {
    match policy {
        Stacking::Replace => {
            existing.remaining = incoming.remaining;
            existing.stats = incoming.stats;
            existing.source = incoming.source;
            existing.generation = incoming.generation;
            ApplyOutcome::Replaced
        }
        Stacking::Ignore => ApplyOutcome::Ignored,
        Stacking::Stack { max } => {
            existing.stacks = (existing.stacks + 1).min(max);
            existing.remaining = default_duration;
            existing.generation = incoming.generation;
            ApplyOutcome::Stacked {
                stacks: existing.stacks,
            }
        }
        Stacking::Extend { cap } => {
            if let (Duration::Turns(current), Some(added)) =
                (existing.remaining, incoming.remaining.turns())
            {
                existing.remaining = Duration::Turns((current + added).min(cap));
            }
            existing.generation = incoming.generation;
            ApplyOutcome::Extended {
                remaining: existing.remaining,
            }
        }
    }
}

/// Active modifier instances for a single target, in application order.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ModifierStore {
    instances: Vec<ModifierInstance>,
}

impl ModifierStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies an instance, resolving against any existing instance of the
    /// same key per the config's stacking policy.
    pub fn apply(&mut self, incoming: ModifierInstance, config: &ModifierConfig) -> ApplyOutcome {
        match self.instances.iter_mut().find(|i| i.key == incoming.key) {
            Some(existing) => transition(config.stacking, existing, incoming, config.duration),
            None => {
                self.instances.push(incoming);
                ApplyOutcome::Added
            }
        }
    }

    /// Removes the instance with the given key, if present.
    pub fn remove(&mut self, key: ModifierKey) -> Option<ModifierInstance> {
        let index = self.instances.iter().position(|i| i.key == key)?;
        Some(self.instances.remove(index))
    }

    /// Removes up to `count` dispellable buffs, oldest-applied first.
    ///
    /// Returns the removed instances in removal order.
    pub fn dispel(&mut self, count: u32) -> Vec<ModifierInstance> {
        let mut removed = Vec::new();
        let mut budget = count;
        let mut index = 0;
        while index < self.instances.len() && budget > 0 {
            if self.instances[index].dispellable() {
                removed.push(self.instances.remove(index));
                budget -= 1;
            } else {
                index += 1;
            }
        }
        removed
    }

    /// Advances one turn tick: decrements every non-permanent duration and
    /// drains instances whose duration reached zero, in application order.
    pub fn tick(&mut self) -> Vec<ModifierInstance> {
        let mut expired = Vec::new();
        let mut index = 0;
        while index < self.instances.len() {
            if self.instances[index].remaining.tick() {
                expired.push(self.instances.remove(index));
            } else {
                index += 1;
            }
        }
        expired
    }

    pub fn get(&self, key: ModifierKey) -> Option<&ModifierInstance> {
        self.instances.iter().find(|i| i.key == key)
    }

    pub fn contains(&self, key: ModifierKey) -> bool {
        self.get(key).is_some()
    }

    /// Iterates active instances in application order.
    pub fn iter(&self) -> impl Iterator<Item = &ModifierInstance> {
        self.instances.iter()
    }

    /// Sum of all active contributions to a stat, folded in application
    /// order.
    pub fn delta_sum(&self, stat: Stat) -> f64 {
        self.instances.iter().map(|i| i.contribution(stat)).sum()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::Stat;

    const KEY: ModifierKey = ModifierKey("test-buff");
    const SRC: TargetId = TargetId(1);
    const OWNER: TargetId = TargetId(2);

    fn instance(config: &ModifierConfig, stats: StatMap, generation: u64) -> ModifierInstance {
        ModifierInstance::from_config(KEY, SRC, OWNER, config, stats, None, generation)
    }

    fn buff(stacking: Stacking, turns: u32) -> ModifierConfig {
        ModifierConfig::new(stacking, Duration::Turns(turns), StatusClass::Buff)
    }

    #[test]
    fn replace_overwrites_deltas_and_duration() {
        let config = buff(Stacking::Replace, 2);
        let mut store = ModifierStore::new();

        let first = instance(&config, StatMap::new().with(Stat::AtkPercent, 0.10), 0);
        assert_eq!(store.apply(first, &config), ApplyOutcome::Added);

        // Burn one tick so the replacement's duration reset is observable.
        assert!(store.tick().is_empty());

        let second = instance(&config, StatMap::new().with(Stat::AtkPercent, 0.25), 1);
        assert_eq!(store.apply(second, &config), ApplyOutcome::Replaced);

        assert_eq!(store.len(), 1);
        let active = store.get(KEY).unwrap();
        assert_eq!(active.remaining, Duration::Turns(2));
        assert_eq!(active.contribution(Stat::AtkPercent), 0.25);
    }

    #[test]
    fn stack_count_caps_at_declared_maximum() {
        let config = buff(Stacking::Stack { max: 3 }, 2);
        let mut store = ModifierStore::new();

        for generation in 0..5 {
            let inc = instance(
                &config,
                StatMap::new().with(Stat::AtkFlat, 50.0),
                generation,
            );
            store.apply(inc, &config);
        }

        let active = store.get(KEY).unwrap();
        assert_eq!(active.stacks, 3);
        // Contribution scales with stack count: 3 × 50
        assert_eq!(store.delta_sum(Stat::AtkFlat), 150.0);
    }

    #[test]
    fn stack_reapplication_resets_duration() {
        let config = buff(Stacking::Stack { max: 3 }, 2);
        let mut store = ModifierStore::new();

        store.apply(instance(&config, StatMap::new(), 0), &config);
        store.tick();
        store.apply(instance(&config, StatMap::new(), 1), &config);

        assert_eq!(store.get(KEY).unwrap().remaining, Duration::Turns(2));
    }

    #[test]
    fn extend_caps_duration_and_keeps_stacks() {
        let config = buff(Stacking::Extend { cap: 5 }, 3);
        let mut store = ModifierStore::new();

        store.apply(instance(&config, StatMap::new(), 0), &config);
        let outcome = store.apply(instance(&config, StatMap::new(), 1), &config);

        // 3 + 3 capped at 5
        assert_eq!(
            outcome,
            ApplyOutcome::Extended {
                remaining: Duration::Turns(5)
            }
        );
        assert_eq!(store.get(KEY).unwrap().stacks, 1);
    }

    #[test]
    fn ignore_policy_is_a_noop_while_active() {
        let config = buff(Stacking::Ignore, 2);
        let mut store = ModifierStore::new();

        let first = instance(&config, StatMap::new().with(Stat::AtkFlat, 100.0), 0);
        store.apply(first, &config);
        let second = instance(&config, StatMap::new().with(Stat::AtkFlat, 999.0), 1);
        let outcome = store.apply(second, &config);

        assert_eq!(outcome, ApplyOutcome::Ignored);
        assert!(!outcome.applied());
        assert_eq!(store.delta_sum(Stat::AtkFlat), 100.0);
    }

    #[test]
    fn duration_expires_after_declared_ticks() {
        let config = buff(Stacking::Replace, 2);
        let mut store = ModifierStore::new();
        store.apply(
            instance(&config, StatMap::new().with(Stat::AtkPercent, 0.20), 0),
            &config,
        );

        assert!(store.tick().is_empty());
        let expired = store.tick();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].key, KEY);

        // Contribution is gone immediately after the second tick.
        assert_eq!(store.delta_sum(Stat::AtkPercent), 0.0);
        assert!(store.is_empty());
    }

    #[test]
    fn permanent_instances_survive_ticks() {
        let config = ModifierConfig::new(Stacking::Replace, Duration::Permanent, StatusClass::Buff);
        let mut store = ModifierStore::new();
        store.apply(instance(&config, StatMap::new(), 0), &config);

        for _ in 0..10 {
            assert!(store.tick().is_empty());
        }
        assert!(store.contains(KEY));
    }

    #[test]
    fn dispel_removes_oldest_dispellable_buffs_first() {
        let buff_config = buff(Stacking::Replace, 3);
        let sealed_config = buff(Stacking::Replace, 3)
            .with_flags(ModifierFlags::UNDISPELLABLE);
        let mut store = ModifierStore::new();

        let keys = [
            ModifierKey("buff-a"),
            ModifierKey("buff-b"),
            ModifierKey("buff-c"),
        ];
        for (generation, key) in keys.iter().enumerate() {
            let inst = ModifierInstance::from_config(
                *key,
                SRC,
                OWNER,
                &buff_config,
                StatMap::new(),
                None,
                generation as u64,
            );
            store.apply(inst, &buff_config);
        }
        // Undispellable buff applied in between is skipped over.
        let sealed = ModifierInstance::from_config(
            ModifierKey("sealed"),
            SRC,
            OWNER,
            &sealed_config,
            StatMap::new(),
            None,
            99,
        );
        store.apply(sealed, &sealed_config);

        let removed = store.dispel(2);
        let removed_keys: Vec<_> = removed.iter().map(|i| i.key).collect();
        assert_eq!(removed_keys, vec![ModifierKey("buff-a"), ModifierKey("buff-b")]);

        assert!(store.contains(ModifierKey("buff-c")));
        assert!(store.contains(ModifierKey("sealed")));
    }

    #[test]
    fn dispel_skips_debuffs() {
        let debuff = ModifierConfig::new(Stacking::Replace, Duration::Turns(3), StatusClass::Debuff);
        let mut store = ModifierStore::new();
        store.apply(instance(&debuff, StatMap::new(), 0), &debuff);

        assert!(store.dispel(5).is_empty());
        assert!(store.contains(KEY));
    }
}
