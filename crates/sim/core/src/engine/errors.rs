//! Error types surfaced by the engine facade.

use crate::key::{CharacterKey, ModifierKey, TargetId};

/// Runtime invariant violations, surfaced to the caller of the violating
/// operation.
///
/// These are programming errors in ability code (never bounds conditions,
/// which saturate instead). The engine reports them rather than silently
/// no-op-ing, since a silent failure would corrupt later attribute
/// computations undetectably. Each variant names the offending key so the
/// analytical tooling sees an attributed failure, not a generic crash.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("no target {id} exists in this battle")]
    UnknownTarget { id: TargetId },

    #[error("modifier '{key}' was never registered")]
    UnregisteredModifier { key: ModifierKey },

    #[error("character '{key}' was never registered")]
    UnknownCharacter { key: CharacterKey },
}
