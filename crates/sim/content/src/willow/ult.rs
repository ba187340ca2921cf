//! Willow's ultimate: roster-wide energy grant plus an ATK buff.
//!
//! Every ally except Willow herself gains 20% of their maximum energy
//! (saturating at the cap) and a two-turn +20% ATK buff.

use sim_core::{
    Duration, Engine, EngineError, EnergyRequest, ModifierConfig, ModifierKey, ModifierSpec,
    Reason, RegistryError, SimRegistry, Stacking, Stat, StatMap, StatusClass, TargetId,
};

pub const ULT_BUFF: ModifierKey = ModifierKey("willow-ult");
const ULT: Reason = Reason("willow-ult");

const ULT_ENERGY_RATIO: f64 = 0.20;
const ULT_ATK_BONUS: f64 = 0.20;
const ULT_TURNS: u32 = 2;

pub(super) fn register(registry: &mut SimRegistry) -> Result<(), RegistryError> {
    registry.register_modifier(
        ULT_BUFF,
        ModifierConfig::new(
            Stacking::Replace,
            Duration::Turns(ULT_TURNS),
            StatusClass::Buff,
        ),
    )
}

/// Casts the ultimate from `caster`, energizing and buffing every other
/// character in roster order.
pub fn cast_ult(engine: &mut Engine, caster: TargetId) -> Result<(), EngineError> {
    for target in engine.characters() {
        if target == caster {
            continue;
        }
        engine.modify_energy_percent(EnergyRequest {
            reason: ULT,
            target,
            source: caster,
            amount: ULT_ENERGY_RATIO,
        })?;
        engine.add_modifier(
            target,
            ULT_BUFF,
            caster,
            ModifierSpec::with_stats(StatMap::new().with(Stat::AtkPercent, ULT_ATK_BONUS)),
            ULT,
        )?;
    }
    Ok(())
}
