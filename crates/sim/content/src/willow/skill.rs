//! Willow's skill: strips buffs from one enemy.

use sim_core::{Engine, EngineError, TargetId};

const SKILL_DISPEL_COUNT: u32 = 2;

/// Removes up to two dispellable buffs from `target`, oldest first.
/// Returns how many were removed.
pub fn cast_skill(
    engine: &mut Engine,
    _caster: TargetId,
    target: TargetId,
) -> Result<u32, EngineError> {
    engine.dispel(target, SKILL_DISPEL_COUNT)
}
