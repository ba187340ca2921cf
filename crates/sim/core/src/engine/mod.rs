//! The engine facade: the single integration surface for ability code and
//! the external battle driver.
//!
//! All mutation flows through this type so invariants (energy saturation,
//! stacking bounds, removal notifications) are enforced in one place instead
//! of letting callers touch target state directly. The external driver
//! sequences a battle as:
//!
//! ```text
//! battle_start()
//! loop {
//!     begin_turn()
//!     action_start(actor, targets) / ability calls / action_end(...)
//!     end_turn()            // modifier turn contributions + duration tick
//! }
//! ```
//!
//! Everything runs synchronously on the calling thread. Determinism: for a
//! fixed turn sequence and seed, two runs produce bit-identical attribute
//! trajectories. Parallelism happens across engine instances, which share
//! nothing but the sealed [`SimRegistry`].

mod errors;

pub use errors::EngineError;

use std::sync::Arc;

use crate::attribute::{self, Attribute, Stat, StatMap};
use crate::event::{Event, EventBus, EventHandler, EventKind};
use crate::key::{CharacterKey, ModifierKey, Reason, TargetId};
use crate::modifier::{
    ApplyOutcome, Duration, ModifierFlags, ModifierHook, ModifierInstance,
};
use crate::registry::SimRegistry;
use crate::rng::SimRng;
use crate::target::{TargetKind, TargetRegistry, TargetState};

/// Request to change a target's stored energy.
///
/// For [`Engine::modify_energy_fixed`], `amount` is a flat energy delta; for
/// [`Engine::modify_energy_percent`], it is a fraction of the target's
/// resolved maximum energy.
#[derive(Clone, Debug)]
pub struct EnergyRequest {
    pub reason: Reason,
    pub target: TargetId,
    pub source: TargetId,
    pub amount: f64,
}

/// Request to attach a registered modifier to a target.
#[derive(Clone, Debug, Default)]
pub struct ModifierSpec {
    /// Per-stack stat deltas carried by this application.
    pub stats: StatMap,
    /// Overrides the config's default duration when set.
    pub duration: Option<Duration>,
}

impl ModifierSpec {
    pub fn with_stats(stats: StatMap) -> Self {
        Self {
            stats,
            duration: None,
        }
    }
}

/// Read-only snapshot of a target's resolved attributes for the driver.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AttributeSnapshot {
    pub hp: f64,
    pub atk: f64,
    pub def: f64,
    pub spd: f64,
    pub crit_rate: f64,
    pub crit_dmg: f64,
    pub energy: f64,
    pub max_energy: f64,
}

/// One simulation instance: roster, event bus, modifier state, and the
/// seeded random stream.
pub struct Engine {
    registry: Arc<SimRegistry>,
    targets: TargetRegistry,
    events: EventBus,
    rng: SimRng,
    turn: u32,
    /// Monotonic counter stamped onto each modifier application.
    generation: u64,
}

impl Engine {
    /// Creates an engine against a sealed registry with a caller-supplied
    /// seed. Dropping the engine is the cancellation contract.
    pub fn new(registry: Arc<SimRegistry>, seed: u64) -> Self {
        Self {
            registry,
            targets: TargetRegistry::new(),
            events: EventBus::new(),
            rng: SimRng::with_seed(seed),
            turn: 0,
            generation: 0,
        }
    }

    // ========================================================================
    // Battle setup
    // ========================================================================

    /// Spawns a character from a registered template and runs its spawn
    /// hook (where the character module subscribes its ability listeners).
    pub fn spawn_character(&mut self, key: CharacterKey) -> Result<TargetId, EngineError> {
        let registry = Arc::clone(&self.registry);
        let config = registry
            .character(key)
            .ok_or(EngineError::UnknownCharacter { key })?;

        let id = self.targets.allocate_id();
        let mut state = TargetState::new(
            id,
            TargetKind::Character,
            config.base.clone(),
            config.max_energy,
        );
        state.template = Some(key);
        self.targets.insert(state);
        tracing::debug!(target_id = %id, character = %key, "spawn character");

        if let Some(hook) = config.on_spawn.clone() {
            (*hook)(self, id);
        }
        Ok(id)
    }

    /// Spawns an enemy with an explicit stat block.
    pub fn spawn_enemy(&mut self, base: crate::attribute::BaseStats, max_energy: f64) -> TargetId {
        let id = self.targets.allocate_id();
        self.targets
            .insert(TargetState::new(id, TargetKind::Enemy, base, max_energy));
        tracing::debug!(target_id = %id, "spawn enemy");
        id
    }

    // ========================================================================
    // Event subscription and dispatch
    // ========================================================================

    /// Registers a handler; dispatch order is subscription order per kind.
    pub fn subscribe(&mut self, kind: EventKind, owner: TargetId, handler: EventHandler) {
        self.events.subscribe(kind, owner, handler);
    }

    /// Drops all subscriptions owned by `owner` starting with the next
    /// publish.
    pub fn unsubscribe_owner(&mut self, owner: TargetId) {
        self.events.unsubscribe_owner(owner);
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Invokes all subscribers for the event's kind synchronously, in
    /// registration order, against a snapshot of the dispatch list.
    /// Re-entrant publishing from a subscriber is permitted.
    pub fn publish(&mut self, event: Event) {
        let handlers = self.events.snapshot(event.kind);
        tracing::trace!(kind = %event.kind, actor = %event.actor, turn = event.turn, "dispatch");
        for handler in handlers {
            (*handler)(self, &event);
        }
    }

    // ========================================================================
    // Turn advance (driver surface)
    // ========================================================================

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn battle_start(&mut self) {
        self.publish(Event::new(EventKind::BattleStart, TargetId::SYSTEM, self.turn));
    }

    /// Advances to the next turn and fires `TurnStart`.
    pub fn begin_turn(&mut self) {
        self.turn += 1;
        self.publish(Event::new(EventKind::TurnStart, TargetId::SYSTEM, self.turn));
    }

    /// Closes the turn: fires each active modifier's turn listener, then
    /// decrements durations, removing and announcing expired instances, and
    /// finally fires `TurnEnd`.
    ///
    /// Targets are visited in insertion order and instances in application
    /// order, so expiry notifications are reproducible run-to-run. An
    /// instance whose duration reaches zero here is gone before any
    /// subsequent dispatch can observe it.
    pub fn end_turn(&mut self) {
        let ids: Vec<TargetId> = self.targets.iter().map(|t| t.id).collect();
        for id in ids {
            self.run_turn_listeners(id);

            let Some(state) = self.targets.get_mut(id) else {
                continue;
            };
            let expired = state.modifiers.tick();
            for instance in expired {
                self.notify_removed(instance, Reason::EXPIRY);
            }
        }
        self.publish(Event::new(EventKind::TurnEnd, TargetId::SYSTEM, self.turn));
    }

    /// Fires `ActionStart` for an action by `actor` against `targets`.
    pub fn action_start(
        &mut self,
        actor: TargetId,
        targets: Vec<TargetId>,
    ) -> Result<(), EngineError> {
        self.require_target(actor)?;
        let event =
            Event::new(EventKind::ActionStart, actor, self.turn).with_targets(targets);
        self.publish(event);
        Ok(())
    }

    /// Fires `ActionEnd` for an action by `actor` against `targets`.
    pub fn action_end(
        &mut self,
        actor: TargetId,
        targets: Vec<TargetId>,
    ) -> Result<(), EngineError> {
        self.require_target(actor)?;
        let event = Event::new(EventKind::ActionEnd, actor, self.turn).with_targets(targets);
        self.publish(event);
        Ok(())
    }

    // ========================================================================
    // Target enumeration and reads
    // ========================================================================

    /// Character-side targets in insertion order.
    pub fn characters(&self) -> Vec<TargetId> {
        self.targets.characters()
    }

    /// Enemy-side targets in insertion order.
    pub fn enemies(&self) -> Vec<TargetId> {
        self.targets.enemies()
    }

    pub fn target(&self, id: TargetId) -> Result<&TargetState, EngineError> {
        self.targets.get(id).ok_or(EngineError::UnknownTarget { id })
    }

    /// Resolves an effective attribute: base value, plus all flat deltas in
    /// application order, times one plus the summed percentage deltas,
    /// clamped to the attribute's bounds.
    ///
    /// Pure with respect to the current modifier state: identical inputs
    /// always yield identical values.
    pub fn resolve(&self, id: TargetId, attribute: Attribute) -> Result<f64, EngineError> {
        let state = self.target(id)?;
        let flat = state.modifiers.delta_sum(attribute.flat_stat());
        let percent = attribute
            .percent_stat()
            .map_or(0.0, |stat| state.modifiers.delta_sum(stat));
        Ok(attribute::compose(
            state.base.value(attribute),
            flat,
            percent,
            attribute.bounds(),
        ))
    }

    /// Stored current energy, clamped to the resolved maximum.
    pub fn current_energy(&self, id: TargetId) -> Result<f64, EngineError> {
        let max = self.max_energy(id)?;
        Ok(self.target(id)?.energy.current().min(max))
    }

    /// Maximum energy after percent-based max-energy modifiers.
    pub fn max_energy(&self, id: TargetId) -> Result<f64, EngineError> {
        let state = self.target(id)?;
        let percent = state.modifiers.delta_sum(Stat::MaxEnergyPercent);
        Ok(attribute::compose(
            state.energy.max,
            0.0,
            percent,
            attribute::AttributeBounds::NON_NEGATIVE,
        ))
    }

    /// Resolved attribute snapshot for the driver.
    pub fn snapshot(&self, id: TargetId) -> Result<AttributeSnapshot, EngineError> {
        Ok(AttributeSnapshot {
            hp: self.resolve(id, Attribute::Hp)?,
            atk: self.resolve(id, Attribute::Atk)?,
            def: self.resolve(id, Attribute::Def)?,
            spd: self.resolve(id, Attribute::Spd)?,
            crit_rate: self.resolve(id, Attribute::CritRate)?,
            crit_dmg: self.resolve(id, Attribute::CritDmg)?,
            energy: self.current_energy(id)?,
            max_energy: self.max_energy(id)?,
        })
    }

    /// The seeded random stream for ability rolls.
    pub fn rng(&mut self) -> &mut SimRng {
        &mut self.rng
    }

    // ========================================================================
    // Energy mutation
    // ========================================================================

    /// Adds a flat energy amount, saturating into `[0, max]`. Returns the
    /// delta actually applied after saturation and fires `EnergyChanged`.
    pub fn modify_energy_fixed(&mut self, request: EnergyRequest) -> Result<f64, EngineError> {
        let max = self.max_energy(request.target)?;
        let state = self
            .targets
            .get_mut(request.target)
            .ok_or(EngineError::UnknownTarget { id: request.target })?;
        let applied = state.energy.add(request.amount, max);
        tracing::debug!(
            reason = %request.reason,
            target = %request.target,
            source = %request.source,
            requested = request.amount,
            applied,
            "modify energy"
        );
        let event = Event::new(EventKind::EnergyChanged, request.target, self.turn);
        self.publish(event);
        Ok(applied)
    }

    /// Adds `amount × resolved max energy`, e.g. `0.20` grants 20% of the
    /// target's maximum. Same saturation and notification as the fixed path.
    pub fn modify_energy_percent(&mut self, request: EnergyRequest) -> Result<f64, EngineError> {
        let max = self.max_energy(request.target)?;
        self.modify_energy_fixed(EnergyRequest {
            amount: request.amount * max,
            ..request
        })
    }

    // ========================================================================
    // Modifier mutation
    // ========================================================================

    /// Applies a registered modifier to `owner`, resolving stacking per the
    /// template's policy.
    ///
    /// On any outcome except `Ignored`: the template's add listener runs,
    /// then `ModifierAdded` is published; with `TICK_IMMEDIATELY` the turn
    /// listener also fires synchronously before this call returns.
    pub fn add_modifier(
        &mut self,
        owner: TargetId,
        key: ModifierKey,
        source: TargetId,
        spec: ModifierSpec,
        reason: Reason,
    ) -> Result<ApplyOutcome, EngineError> {
        let registry = Arc::clone(&self.registry);
        let config = registry
            .modifier(key)
            .ok_or(EngineError::UnregisteredModifier { key })?;

        self.generation += 1;
        let instance = ModifierInstance::from_config(
            key,
            source,
            owner,
            config,
            spec.stats,
            spec.duration,
            self.generation,
        );

        let state = self
            .targets
            .get_mut(owner)
            .ok_or(EngineError::UnknownTarget { id: owner })?;
        let outcome = state.modifiers.apply(instance, config);
        tracing::debug!(
            reason = %reason,
            target = %owner,
            source = %source,
            modifier = %key,
            ?outcome,
            "apply modifier"
        );

        if outcome.applied() {
            let effect = self
                .target(owner)?
                .modifiers
                .get(key)
                .map(ModifierInstance::effect);
            if let (Some(hook), Some(effect)) = (config.listeners.on_add.clone(), effect.as_ref()) {
                (*hook)(self, effect);
            }
            let event =
                Event::new(EventKind::ModifierAdded, owner, self.turn).with_modifier(key);
            self.publish(event);

            if config.flags.contains(ModifierFlags::TICK_IMMEDIATELY) {
                if let (Some(hook), Some(effect)) =
                    (config.listeners.on_turn.clone(), effect.as_ref())
                {
                    (*hook)(self, effect);
                }
            }
        }
        Ok(outcome)
    }

    /// Explicitly removes a modifier. Returns false if no instance of the
    /// key was active. Fires the remove listener and `ModifierRemoved`.
    pub fn remove_modifier(
        &mut self,
        owner: TargetId,
        key: ModifierKey,
        reason: Reason,
    ) -> Result<bool, EngineError> {
        let state = self
            .targets
            .get_mut(owner)
            .ok_or(EngineError::UnknownTarget { id: owner })?;
        match state.modifiers.remove(key) {
            Some(instance) => {
                self.notify_removed(instance, reason);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Removes up to `count` dispellable buffs from `owner`, oldest-applied
    /// first, incrementing the target's dispel counter per removal. Returns
    /// the number removed.
    pub fn dispel(&mut self, owner: TargetId, count: u32) -> Result<u32, EngineError> {
        let state = self
            .targets
            .get_mut(owner)
            .ok_or(EngineError::UnknownTarget { id: owner })?;
        let removed = state.modifiers.dispel(count);
        let n = removed.len() as u32;
        state.dispel_count += n;
        for instance in removed {
            self.notify_removed(instance, Reason::DISPEL);
        }
        Ok(n)
    }

    /// How many effects have been dispelled from `owner` so far.
    pub fn dispel_count(&self, owner: TargetId) -> Result<u32, EngineError> {
        Ok(self.target(owner)?.dispel_count)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn require_target(&self, id: TargetId) -> Result<(), EngineError> {
        if self.targets.contains(id) {
            Ok(())
        } else {
            Err(EngineError::UnknownTarget { id })
        }
    }

    /// Fires the turn listener of every active instance on `id`, in
    /// application order.
    fn run_turn_listeners(&mut self, id: TargetId) {
        let registry = Arc::clone(&self.registry);
        let hooks: Vec<(ModifierHook, crate::modifier::ModifierEffect)> = {
            let Some(state) = self.targets.get(id) else {
                return;
            };
            state
                .modifiers
                .iter()
                .filter_map(|instance| {
                    registry
                        .modifier(instance.key)
                        .and_then(|c| c.listeners.on_turn.clone())
                        .map(|hook| (hook, instance.effect()))
                })
                .collect()
        };
        for (hook, effect) in hooks {
            (*hook)(self, &effect);
        }
    }

    /// Runs the remove listener and publishes `ModifierRemoved` for an
    /// instance that left the store (expiry, dispel, or explicit removal).
    fn notify_removed(&mut self, instance: ModifierInstance, reason: Reason) {
        tracing::debug!(
            reason = %reason,
            target = %instance.owner,
            modifier = %instance.key,
            "remove modifier"
        );
        let registry = Arc::clone(&self.registry);
        let hook = registry
            .modifier(instance.key)
            .and_then(|c| c.listeners.on_remove.clone());
        let effect = instance.effect();
        if let Some(hook) = hook {
            (*hook)(self, &effect);
        }
        let event = Event::new(EventKind::ModifierRemoved, instance.owner, self.turn)
            .with_modifier(instance.key);
        self.publish(event);
    }
}
