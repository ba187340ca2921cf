//! Deterministic turn-based combat engine core.
//!
//! `sim-core` defines the event-driven modifier and attribute resolution
//! engine shared by analytical battle tooling. Ability and character modules
//! register templates into [`registry::SimRegistry`] at startup, then every
//! battle runs against its own [`engine::Engine`] instance; all state
//! mutation flows through that facade, and supporting crates depend on the
//! types re-exported here.
pub mod attribute;
pub mod engine;
pub mod event;
pub mod key;
pub mod modifier;
pub mod registry;
pub mod rng;
pub mod target;

pub use attribute::{Attribute, AttributeBounds, BaseStats, Stat, StatMap};
pub use engine::{AttributeSnapshot, Engine, EngineError, EnergyRequest, ModifierSpec};
pub use event::{Event, EventBus, EventHandler, EventKind};
pub use key::{CharacterKey, ModifierKey, Reason, TargetId};
pub use modifier::{
    ApplyOutcome, Duration, ModifierConfig, ModifierEffect, ModifierFlags, ModifierHook,
    ModifierInstance, ModifierListeners, ModifierStore, Stacking, StatusClass,
};
pub use registry::{
    CharacterConfig, Element, Path, RegistryError, SimRegistry, SkillInfo, SkillSlot, SpawnHook,
    TargetSide,
};
pub use rng::SimRng;
pub use target::{EnergyMeter, TargetKind, TargetRegistry, TargetState};
