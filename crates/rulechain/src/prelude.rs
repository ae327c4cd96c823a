//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use nebula_rulechain::prelude::*;
//! ```

pub use crate::builder::{BufferKind, RuleBuilder};
pub use crate::chain::{RuleChain, RuleStep};
pub use crate::engine::{ChainOutcome, RuleEngine, ValidationReport};
pub use crate::error::{ChainError, ProcedureError, RegistrationError};
pub use crate::procedure::{
    Filter, Procedure, ProcedureBundle, Validator, Verdict, filter_fn, validator_fn,
};
pub use crate::registry::{Namespace, ProcedureRegistry};
pub use crate::syntax::Syntax;

#[cfg(feature = "builtins")]
pub use crate::builtins::{CoreValidators, StringFilters};
