//! Willow, a five-star wind healer on the path of abundance.
//!
//! Kit summary:
//! - **Talent**: each time Willow acts, she gains a stack of Vigor
//!   (+4% ATK per stack, up to 3, permanent for the battle).
//! - **Skill**: strips up to two buffs from one enemy.
//! - **Ult**: energizes and emboldens the rest of the roster; see [`ult`].

mod skill;
mod ult;

pub use skill::cast_skill;
pub use ult::{ULT_BUFF, cast_ult};

use std::sync::Arc;

use sim_core::{
    Attribute, BaseStats, CharacterConfig, CharacterKey, Duration, Element, Engine, EngineError,
    EventKind, ModifierConfig, ModifierKey, ModifierSpec, Path, Reason, RegistryError, SimRegistry,
    SkillInfo, SkillSlot, Stacking, Stat, StatMap, StatusClass, TargetId, TargetSide,
};

pub const WILLOW: CharacterKey = CharacterKey("willow");

const VIGOR: ModifierKey = ModifierKey("willow-vigor");
const TALENT: Reason = Reason("willow-talent");

const VIGOR_ATK_PER_STACK: f64 = 0.04;
const VIGOR_MAX_STACKS: u32 = 3;

/// Registers Willow's character template and kit modifiers.
pub fn register(registry: &mut SimRegistry) -> Result<(), RegistryError> {
    registry.register_modifier(
        VIGOR,
        ModifierConfig::new(
            Stacking::Stack {
                max: VIGOR_MAX_STACKS,
            },
            Duration::Permanent,
            StatusClass::Buff,
        ),
    )?;
    ult::register(registry)?;

    registry.register_character(
        WILLOW,
        CharacterConfig {
            rarity: 5,
            element: Element::Wind,
            path: Path::Abundance,
            max_energy: 140.0,
            base: BaseStats::new(1358.0, 602.0, 509.0, 98.0),
            skills: SkillInfo {
                attack: SkillSlot::new(1, TargetSide::Enemies),
                skill: SkillSlot::new(-1, TargetSide::Enemies),
                ult: SkillSlot::new(0, TargetSide::Allies),
            },
            on_spawn: Some(Arc::new(on_spawn)),
        },
    )
}

/// Subscribes the talent listener for a freshly spawned Willow.
fn on_spawn(engine: &mut Engine, id: TargetId) {
    engine.subscribe(
        EventKind::ActionStart,
        id,
        Arc::new(move |engine, event| {
            if event.actor == id {
                let _ = gain_vigor(engine, id);
            }
        }),
    );
}

/// Talent: one Vigor stack per action Willow takes.
fn gain_vigor(engine: &mut Engine, id: TargetId) -> Result<(), EngineError> {
    engine.add_modifier(
        id,
        VIGOR,
        id,
        ModifierSpec::with_stats(StatMap::new().with(Stat::AtkPercent, VIGOR_ATK_PER_STACK)),
        TALENT,
    )?;
    tracing::trace!(atk = engine.resolve(id, Attribute::Atk)?, "vigor stack");
    Ok(())
}
