//! Error types for registration, rule syntax and chain execution.
//!
//! Failed validation is *not* an error: it is reported through
//! [`ValidationReport`](crate::ValidationReport). The types here cover
//! configuration mistakes (bad names, bad delimiters, unknown procedures)
//! and procedures that cannot make sense of their arguments.

use crate::registry::Namespace;

/// Why a procedure could not be registered.
///
/// Registration failures are non-fatal: the registry logs a warning and
/// keeps its previous state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    /// The empty name can never be referenced from a rule string.
    #[error("procedure name must not be empty")]
    EmptyName,

    /// The name contains a delimiter token, so a rule string would split it.
    #[error("procedure name '{name}' contains the reserved token '{token}'")]
    ReservedToken {
        /// The rejected name.
        name: String,
        /// The delimiter found inside it.
        token: String,
    },

    /// The name ends in part of a delimiter, so the token that follows it
    /// in a rule string would match too early.
    #[error("procedure name '{name}' runs into the following '{token}' token")]
    SplicedToken {
        /// The rejected name.
        name: String,
        /// The delimiter it would merge with.
        token: String,
    },
}

/// Raised by a procedure that cannot handle its arguments or input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProcedureError {
    /// A positional argument was not supplied.
    #[error("missing argument '{name}' at position {index}")]
    MissingArgument {
        /// Position in the step's argument list.
        index: usize,
        /// Human name of the argument.
        name: &'static str,
    },

    /// An argument was supplied but could not be interpreted.
    #[error("argument '{name}' is invalid: {reason}")]
    InvalidArgument {
        /// Human name of the argument.
        name: &'static str,
        /// What went wrong.
        reason: String,
    },

    /// The input value has a kind the procedure does not accept.
    #[error("cannot {operation} a value of type {actual}")]
    UnsupportedValue {
        /// What the procedure tried to do.
        operation: &'static str,
        /// Type name of the offending value.
        actual: &'static str,
    },

    /// Free-form failure from a user procedure.
    #[error("{0}")]
    Custom(String),
}

impl ProcedureError {
    /// Creates a free-form procedure error.
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }

    /// Creates an [`InvalidArgument`](Self::InvalidArgument) error.
    pub fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }
}

/// Errors that abort a whole chain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    /// A step names a filter that is not registered.
    #[error("unknown filter procedure '{name}' at step {position}")]
    UnknownFilter {
        /// The unresolved name.
        name: String,
        /// Zero-based step index.
        position: usize,
    },

    /// A step names a validator that is not registered.
    #[error("unknown validator procedure '{name}' at step {position}")]
    UnknownValidator {
        /// The unresolved name.
        name: String,
        /// Zero-based step index.
        position: usize,
    },

    /// A procedure returned an error.
    #[error("procedure '{name}' failed at step {position}: {source}")]
    Procedure {
        /// The procedure's registered name.
        name: String,
        /// Zero-based step index.
        position: usize,
        /// The procedure's own error.
        #[source]
        source: ProcedureError,
    },
}

impl ChainError {
    /// Builds the unknown-procedure error matching `namespace`.
    pub(crate) fn unknown(namespace: Namespace, name: &str, position: usize) -> Self {
        let name = name.to_owned();
        match namespace {
            Namespace::Filter => Self::UnknownFilter { name, position },
            Namespace::Validator => Self::UnknownValidator { name, position },
        }
    }

    /// Returns true for [`UnknownFilter`](Self::UnknownFilter) and
    /// [`UnknownValidator`](Self::UnknownValidator).
    #[must_use]
    pub fn is_unknown_procedure(&self) -> bool {
        matches!(
            self,
            Self::UnknownFilter { .. } | Self::UnknownValidator { .. }
        )
    }

    /// Name of the step that caused the error.
    #[must_use]
    pub fn procedure_name(&self) -> &str {
        match self {
            Self::UnknownFilter { name, .. }
            | Self::UnknownValidator { name, .. }
            | Self::Procedure { name, .. } => name,
        }
    }
}

/// A rejected delimiter configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    /// One of the tokens is empty.
    #[error("the {which} token must not be empty")]
    EmptyToken {
        /// Which token: `chain`, `args` or `glue`.
        which: &'static str,
    },

    /// One token occurs inside another, which makes splitting ambiguous.
    #[error("token '{inner}' occurs inside token '{outer}'")]
    OverlappingTokens {
        /// The shorter token.
        inner: String,
        /// The token containing it.
        outer: String,
    },
}
