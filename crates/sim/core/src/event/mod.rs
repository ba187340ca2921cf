//! Typed pub/sub register for battle lifecycle events.
//!
//! Abilities subscribe handlers to named lifecycle points; the engine
//! publishes synchronously in registration order. Dispatch iterates a
//! point-in-time snapshot of the handler list, so a handler that
//! (un)subscribes mid-dispatch changes the next publish, never the current
//! one. Side effects of earlier handlers are visible to later handlers in
//! the same dispatch.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::engine::Engine;
use crate::key::{ModifierKey, TargetId};

/// Named lifecycle point abilities can subscribe to.
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
pub enum EventKind {
    BattleStart,
    TurnStart,
    TurnEnd,
    ActionStart,
    ActionEnd,
    ModifierAdded,
    ModifierRemoved,
    EnergyChanged,
}

/// Immutable payload passed to every subscriber of a dispatch.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Event {
    pub kind: EventKind,
    /// Acting target for action events; owner for modifier and energy
    /// events; [`TargetId::SYSTEM`] for engine-driven dispatches.
    pub actor: TargetId,
    /// Targets of the current action, empty when not applicable.
    pub targets: Vec<TargetId>,
    /// Turn number at dispatch time.
    pub turn: u32,
    /// Modifier involved, for `ModifierAdded`/`ModifierRemoved`.
    pub modifier: Option<ModifierKey>,
}

impl Event {
    pub(crate) fn new(kind: EventKind, actor: TargetId, turn: u32) -> Self {
        Self {
            kind,
            actor,
            targets: Vec::new(),
            turn,
            modifier: None,
        }
    }

    pub(crate) fn with_targets(mut self, targets: Vec<TargetId>) -> Self {
        self.targets = targets;
        self
    }

    pub(crate) fn with_modifier(mut self, key: ModifierKey) -> Self {
        self.modifier = Some(key);
        self
    }
}

/// Subscriber callback. Runs to completion on the simulation thread before
/// the next subscriber is invoked; re-entrant publishing is permitted.
pub type EventHandler = Arc<dyn Fn(&mut Engine, &Event) + Send + Sync>;

/// A registered (kind, handler, owner) triple.
#[derive(Clone)]
struct Subscription {
    owner: TargetId,
    handler: EventHandler,
}

/// Per-kind ordered lists of subscriptions.
///
/// Registration order is preserved per kind and defines dispatch order,
/// which abilities may rely on for multi-ability interactions.
#[derive(Default)]
pub struct EventBus {
    subscriptions: BTreeMap<EventKind, Vec<Subscription>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for an event kind on behalf of `owner`.
    ///
    /// The subscription persists for the owning target's lifetime (i.e. the
    /// battle) unless removed via [`EventBus::unsubscribe_owner`].
    pub fn subscribe(&mut self, kind: EventKind, owner: TargetId, handler: EventHandler) {
        self.subscriptions
            .entry(kind)
            .or_default()
            .push(Subscription { owner, handler });
    }

    /// Drops every subscription owned by `owner`, across all kinds.
    ///
    /// Takes effect from the next publish; an in-flight dispatch keeps its
    /// snapshot.
    pub fn unsubscribe_owner(&mut self, owner: TargetId) {
        for subs in self.subscriptions.values_mut() {
            subs.retain(|s| s.owner != owner);
        }
    }

    /// Point-in-time snapshot of the dispatch list for a kind.
    pub(crate) fn snapshot(&self, kind: EventKind) -> Vec<EventHandler> {
        self.subscriptions
            .get(&kind)
            .map(|subs| subs.iter().map(|s| s.handler.clone()).collect())
            .unwrap_or_default()
    }

    /// Number of active subscriptions for a kind.
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscriptions.get(&kind).map_or(0, Vec::len)
    }
}
