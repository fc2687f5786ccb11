//! Error classification shared by the combat components.
//!
//! Each component owns its error enum (`DataError` for table lookups,
//! `StatsError`, `ComboError`). They all report a severity so callers can tell
//! a refused action apart from missing designer data: the first is routine and
//! logged at `debug`, the second ends the current operation and is logged at
//! `error`. Neither ever tears down the owning character.

/// How a combat failure should be handled.
///
/// - `Recoverable`: the action was refused (short on stamina, level not held)
/// - `Validation`: a call that should not have been made (double initialize)
/// - `Internal`: state the components should never reach
/// - `Fatal`: a table, row or montage the data never provided
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Refused by a resource or state gate. Nothing changed.
    Recoverable,
    /// Rejected call, e.g. initializing a component twice.
    Validation,
    Internal,
    /// Missing content. The triggering operation is abandoned.
    Fatal,
}

impl ErrorSeverity {
    /// Lowercase name, used as a log field.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Routine outcome that callers handle by dropping the action.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Failure a designer or developer needs to see.
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Implemented by every combat error enum.
pub trait CombatError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Stable code logged next to the message, e.g. `COMBO_BUSY`.
    ///
    /// Falls back to the type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
