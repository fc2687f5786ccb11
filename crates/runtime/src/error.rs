//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from content loading, logging setup and the combat
//! components so callers can bubble them up with consistent context.
use thiserror::Error;

use combat_core::{
    CombatError, ComboError, DataError, EntityId, ErrorSeverity, StatsError,
};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("unknown character {0}")]
    UnknownCharacter(EntityId),

    #[error("unknown archetype '{0}'")]
    UnknownArchetype(String),

    #[error("character {character} has no {component} component")]
    MissingComponent {
        character: EntityId,
        component: &'static str,
    },

    #[error("failed to load combat content: {0:#}")]
    Content(anyhow::Error),

    #[error("failed to initialize logging: {0}")]
    Logging(String),

    #[error(transparent)]
    Combo(#[from] ComboError),

    #[error(transparent)]
    Stats(#[from] StatsError),

    #[error(transparent)]
    Data(#[from] DataError),
}

impl CombatError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            RuntimeError::UnknownCharacter(_)
            | RuntimeError::UnknownArchetype(_)
            | RuntimeError::MissingComponent { .. } => ErrorSeverity::Validation,
            RuntimeError::Content(_) => ErrorSeverity::Fatal,
            RuntimeError::Logging(_) => ErrorSeverity::Internal,
            RuntimeError::Combo(err) => err.severity(),
            RuntimeError::Stats(err) => err.severity(),
            RuntimeError::Data(err) => err.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            RuntimeError::UnknownCharacter(_) => "RUNTIME_UNKNOWN_CHARACTER",
            RuntimeError::UnknownArchetype(_) => "RUNTIME_UNKNOWN_ARCHETYPE",
            RuntimeError::MissingComponent { .. } => "RUNTIME_MISSING_COMPONENT",
            RuntimeError::Content(_) => "RUNTIME_CONTENT",
            RuntimeError::Logging(_) => "RUNTIME_LOGGING",
            RuntimeError::Combo(err) => err.error_code(),
            RuntimeError::Stats(err) => err.error_code(),
            RuntimeError::Data(err) => err.error_code(),
        }
    }
}
