//! Sample character and ability content for the combat engine.
//!
//! Each character module registers its templates (character config plus the
//! modifiers its kit applies) into a [`SimRegistry`] during initialization,
//! and implements its abilities purely against the engine facade. This crate
//! doubles as the integration surface the engine's end-to-end tests run
//! against.

pub mod bram;
pub mod willow;

use sim_core::{RegistryError, SimRegistry};

/// Registers every character and modifier template this crate provides.
///
/// Must complete before any battle begins; duplicate keys abort startup.
pub fn register_all(registry: &mut SimRegistry) -> Result<(), RegistryError> {
    willow::register(registry)?;
    bram::register(registry)?;
    Ok(())
}
