//! Identity keys shared across the engine.
//!
//! Targets are identified by a monotonically allocated [`TargetId`] that is
//! never reused within a simulation. Modifiers and mutation causes are
//! identified by static string keys so ability modules can declare them as
//! constants at registration time.

use std::fmt;

/// Unique identifier for any target (character or enemy) in the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetId(pub u32);

impl TargetId {
    /// Reserved identifier for engine-driven mutations (turn ticks, expiry
    /// removals) that are not initiated by any in-battle target.
    pub const SYSTEM: Self = Self(u32::MAX);

    /// Returns true if this id represents the engine itself.
    #[inline]
    pub const fn is_system(self) -> bool {
        self.0 == Self::SYSTEM.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Registration key for a modifier template.
///
/// Ability modules declare these as constants (e.g. `"willow-ult"`) and use
/// the same key for registration and application.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ModifierKey(pub &'static str);

impl fmt::Display for ModifierKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Registration key for a character template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CharacterKey(pub &'static str);

impl fmt::Display for CharacterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Cause tag attached to every mutation for explanation and debugging.
///
/// Reasons are metadata only: they are logged alongside the mutation and
/// never affect attribute resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Reason(pub &'static str);

impl Reason {
    /// Engine-internal cause for duration expiry removals.
    pub const EXPIRY: Self = Self("expiry");

    /// Engine-internal cause for dispel removals.
    pub const DISPEL: Self = Self("dispel");
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}
