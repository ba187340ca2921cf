//! Startup-time registration catalogs for modifiers and character templates.
//!
//! Both catalogs are write-once/read-many: ability and character modules
//! populate them during an initialization phase, then the sealed registry is
//! shared (via `Arc`) by every concurrently running engine instance.
//! Registering a duplicate key is a configuration error that must abort
//! startup; the registry is read-only during simulation.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::attribute::BaseStats;
use crate::engine::Engine;
use crate::key::{CharacterKey, ModifierKey, TargetId};
use crate::modifier::ModifierConfig;

/// Configuration errors, fatal at process startup.
#[derive(Clone, Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("modifier '{key}' registered twice")]
    DuplicateModifier { key: ModifierKey },

    #[error("character '{key}' registered twice")]
    DuplicateCharacter { key: CharacterKey },

    #[error("modifier '{key}' has an inconsistent config: {reason}")]
    InvalidModifier {
        key: ModifierKey,
        reason: &'static str,
    },
}

/// Combat element of a character.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Element {
    Physical,
    Fire,
    Ice,
    Lightning,
    Wind,
    Quantum,
    Imaginary,
}

/// Combat role archetype of a character.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Path {
    Destruction,
    Hunt,
    Erudition,
    Harmony,
    Nihility,
    Preservation,
    Abundance,
}

/// Which side an action targets.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TargetSide {
    Allies,
    Enemies,
    SelfOnly,
}

/// Targeting metadata for one action slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillSlot {
    /// Skill-point delta when the slot is used (positive generates,
    /// negative consumes).
    pub sp_delta: i32,
    pub target_side: TargetSide,
}

impl SkillSlot {
    pub const fn new(sp_delta: i32, target_side: TargetSide) -> Self {
        Self {
            sp_delta,
            target_side,
        }
    }
}

/// Per-action targeting metadata of a character template.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillInfo {
    pub attack: SkillSlot,
    pub skill: SkillSlot,
    pub ult: SkillSlot,
}

/// Constructor hook invoked when a character is spawned into a battle.
///
/// This is where a character module subscribes its ability listeners for
/// the new target.
pub type SpawnHook = Arc<dyn Fn(&mut Engine, TargetId) + Send + Sync>;

/// Immutable character template registered at process start.
#[derive(Clone)]
pub struct CharacterConfig {
    pub rarity: u8,
    pub element: Element,
    pub path: Path,
    pub max_energy: f64,
    pub base: BaseStats,
    pub skills: SkillInfo,
    /// Invoked after the target exists in the roster.
    pub on_spawn: Option<SpawnHook>,
}

impl fmt::Debug for CharacterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CharacterConfig")
            .field("rarity", &self.rarity)
            .field("element", &self.element)
            .field("path", &self.path)
            .field("max_energy", &self.max_energy)
            .field("skills", &self.skills)
            .field("on_spawn", &self.on_spawn.is_some())
            .finish()
    }
}

/// Process-wide catalogs, mutated only during initialization.
#[derive(Debug, Default)]
pub struct SimRegistry {
    modifiers: BTreeMap<ModifierKey, ModifierConfig>,
    characters: BTreeMap<CharacterKey, CharacterConfig>,
}

impl SimRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a modifier template. Duplicate keys and inconsistent
    /// configs are startup-fatal.
    pub fn register_modifier(
        &mut self,
        key: ModifierKey,
        config: ModifierConfig,
    ) -> Result<(), RegistryError> {
        config
            .validate()
            .map_err(|reason| RegistryError::InvalidModifier { key, reason })?;
        if self.modifiers.contains_key(&key) {
            return Err(RegistryError::DuplicateModifier { key });
        }
        self.modifiers.insert(key, config);
        Ok(())
    }

    /// Registers a character template. Duplicate keys are startup-fatal.
    pub fn register_character(
        &mut self,
        key: CharacterKey,
        config: CharacterConfig,
    ) -> Result<(), RegistryError> {
        if self.characters.contains_key(&key) {
            return Err(RegistryError::DuplicateCharacter { key });
        }
        self.characters.insert(key, config);
        Ok(())
    }

    pub fn modifier(&self, key: ModifierKey) -> Option<&ModifierConfig> {
        self.modifiers.get(&key)
    }

    pub fn character(&self, key: CharacterKey) -> Option<&CharacterConfig> {
        self.characters.get(&key)
    }

    /// Seals the catalog for sharing across engine instances. Once inside
    /// the `Arc` no further registration is possible.
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifier::{Duration, Stacking, StatusClass};

    #[test]
    fn duplicate_modifier_registration_fails() {
        let mut registry = SimRegistry::new();
        let key = ModifierKey("dup");
        let config = ModifierConfig::new(Stacking::Replace, Duration::Turns(2), StatusClass::Buff);

        registry.register_modifier(key, config.clone()).unwrap();
        let err = registry.register_modifier(key, config).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateModifier { .. }));
    }

    #[test]
    fn invalid_modifier_config_fails_registration() {
        let mut registry = SimRegistry::new();
        let config = ModifierConfig::new(
            Stacking::Stack { max: 0 },
            Duration::Turns(2),
            StatusClass::Buff,
        );
        let err = registry
            .register_modifier(ModifierKey("bad"), config)
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidModifier { .. }));
    }
}
