//! Modifier templates: stacking policies, durations, and behavior flags.
//!
//! A modifier is registered once at process start as a [`ModifierConfig`]
//! keyed by [`ModifierKey`], then applied to targets as instances. The
//! config is the immutable template; per-target lifecycle state lives in
//! [`store::ModifierStore`].

mod store;

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;

use crate::engine::Engine;
use crate::key::{ModifierKey, TargetId};

pub use store::{ApplyOutcome, ModifierInstance, ModifierStore};

/// Conflict-resolution rule applied when a modifier is (re)applied while an
/// instance of the same key is already active on the target.
///
/// Each policy is a small, independently testable transition function; the
/// state machine is `{absent, active(stacks, duration)}` with transitions
/// `{apply, tick, dispel, expire}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stacking {
    /// New application overwrites the existing instance's remaining duration,
    /// stat deltas, and source.
    Replace,

    /// New application is a no-op while an unexpired instance exists.
    Ignore,

    /// Stack count increments up to `max`; duration resets to the config
    /// default; stat contribution scales with stack count.
    Stack { max: u32 },

    /// Remaining duration increases by the new application's duration,
    /// capped at `cap` turns, without touching stack count.
    Extend { cap: u32 },
}

/// Remaining or default lifetime of a modifier, counted in turn ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Duration {
    /// Expires after the given number of ticks.
    Turns(u32),

    /// Never expires on its own; removed only by dispel or explicit removal.
    Permanent,
}

impl Duration {
    pub fn is_permanent(self) -> bool {
        matches!(self, Duration::Permanent)
    }

    /// Remaining turns, `None` for permanent modifiers.
    pub fn turns(self) -> Option<u32> {
        match self {
            Duration::Turns(n) => Some(n),
            Duration::Permanent => None,
        }
    }

    /// Decrements one qualifying tick. Returns true once the duration has
    /// reached zero and the instance must be removed.
    fn tick(&mut self) -> bool {
        match self {
            Duration::Turns(n) => {
                *n = n.saturating_sub(1);
                *n == 0
            }
            Duration::Permanent => false,
        }
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Duration::Turns(n) => write!(f, "{n}t"),
            Duration::Permanent => f.write_str("permanent"),
        }
    }
}

/// Status classification used by dispel and by abilities that key off
/// whether an effect is beneficial.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum StatusClass {
    #[default]
    Neutral,
    Buff,
    Debuff,
}

bitflags! {
    /// Behavior flags declared on a modifier template.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct ModifierFlags: u8 {
        /// Fire the template's turn listener synchronously at application
        /// time instead of waiting for the next duration tick.
        const TICK_IMMEDIATELY = 1 << 0;

        /// Exclude this modifier from dispel even when classified as a buff.
        const UNDISPELLABLE = 1 << 1;
    }
}

/// Snapshot of an active instance handed to modifier listeners.
#[derive(Clone, Debug)]
pub struct ModifierEffect {
    pub key: ModifierKey,
    pub owner: TargetId,
    pub source: TargetId,
    pub stacks: u32,
}

/// Listener invoked for modifier lifecycle points. Runs synchronously on the
/// simulation thread with full facade access.
pub type ModifierHook = Arc<dyn Fn(&mut Engine, &ModifierEffect) + Send + Sync>;

/// Optional lifecycle listeners attached to a modifier template.
#[derive(Clone, Default)]
pub struct ModifierListeners {
    /// Invoked after the instance is added or re-applied.
    pub on_add: Option<ModifierHook>,

    /// Invoked on each qualifying turn tick while active (and at apply time
    /// when `TICK_IMMEDIATELY` is set).
    pub on_turn: Option<ModifierHook>,

    /// Invoked after the instance is removed (expiry, dispel, or explicit).
    pub on_remove: Option<ModifierHook>,
}

impl fmt::Debug for ModifierListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModifierListeners")
            .field("on_add", &self.on_add.is_some())
            .field("on_turn", &self.on_turn.is_some())
            .field("on_remove", &self.on_remove.is_some())
            .finish()
    }
}

/// Immutable template for a modifier, registered once at process start.
#[derive(Clone, Debug)]
pub struct ModifierConfig {
    pub stacking: Stacking,
    pub duration: Duration,
    pub status: StatusClass,
    pub flags: ModifierFlags,
    pub listeners: ModifierListeners,
}

impl ModifierConfig {
    /// Template with the given stacking policy and duration, no listeners.
    pub fn new(stacking: Stacking, duration: Duration, status: StatusClass) -> Self {
        Self {
            stacking,
            duration,
            status,
            flags: ModifierFlags::empty(),
            listeners: ModifierListeners::default(),
        }
    }

    pub fn with_flags(mut self, flags: ModifierFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_listeners(mut self, listeners: ModifierListeners) -> Self {
        self.listeners = listeners;
        self
    }

    /// Checks declared parameters for consistency. Called at registration;
    /// a failure here is a startup-fatal configuration error.
    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        match self.stacking {
            Stacking::Stack { max: 0 } => Err("stack policy requires max >= 1"),
            Stacking::Extend { cap: 0 } => Err("extend policy requires cap >= 1"),
            Stacking::Extend { cap } => match self.duration {
                Duration::Turns(n) if n > cap => Err("default duration exceeds extend cap"),
                Duration::Permanent => Err("extend policy requires a finite default duration"),
                _ => Ok(()),
            },
            _ => Ok(()),
        }
    }
}
