//! Bram, a four-star physical vanguard with no battle listeners.
//!
//! Exists so multi-ally scenarios have a plain template to spawn alongside
//! characters with reactive kits.

use sim_core::{
    BaseStats, CharacterConfig, CharacterKey, Element, Path, RegistryError, SimRegistry, SkillInfo,
    SkillSlot, TargetSide,
};

pub const BRAM: CharacterKey = CharacterKey("bram");

pub fn register(registry: &mut SimRegistry) -> Result<(), RegistryError> {
    registry.register_character(
        BRAM,
        CharacterConfig {
            rarity: 4,
            element: Element::Physical,
            path: Path::Destruction,
            max_energy: 120.0,
            base: BaseStats::new(1203.0, 1000.0, 461.0, 102.0),
            skills: SkillInfo {
                attack: SkillSlot::new(1, TargetSide::Enemies),
                skill: SkillSlot::new(-1, TargetSide::Enemies),
                ult: SkillSlot::new(0, TargetSide::Enemies),
            },
            on_spawn: None,
        },
    )
}
