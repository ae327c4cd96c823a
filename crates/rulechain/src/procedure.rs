//! Procedure traits: filters, validators and bundles of both.
//!
//! A procedure receives the input value plus the step's string arguments.
//! Arguments are never coerced by the engine; each procedure parses what it
//! needs and reports malformed arguments as a [`ProcedureError`].
//!
//! Closures become procedures through [`filter_fn`] and [`validator_fn`]:
//!
//! ```
//! use nebula_rulechain::procedure::{filter_fn, validator_fn, Verdict};
//! use serde_json::Value;
//!
//! let shout = filter_fn(|value, _args| match value {
//!     Value::String(s) => Ok(Value::String(s.to_uppercase())),
//!     other => Ok(other),
//! });
//! let not_null = validator_fn(|value, _args| {
//!     Ok(if value.is_null() { Verdict::fail("must not be null") } else { Verdict::Pass })
//! });
//! # let _ = (shout, not_null);
//! ```

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::ProcedureError;
use crate::registry::Namespace;

// ============================================================================
// VERDICT
// ============================================================================

/// Message reported by a failure that carries none of its own.
pub const DEFAULT_FAILURE_MESSAGE: &str = "is invalid";

/// Outcome of a single validator step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The value satisfies the rule.
    Pass,
    /// The value violates the rule; carries the messages to report.
    Fail(Vec<String>),
    /// Stop checking this value; remaining steps are not run.
    Skip,
}

impl Verdict {
    /// A failure with one message.
    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail(vec![message.into()])
    }

    /// A failure with several messages.
    pub fn fail_many<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Fail(messages.into_iter().map(Into::into).collect())
    }

    /// Passes when `ok`, otherwise fails with `message`.
    pub fn check(ok: bool, message: impl Into<String>) -> Self {
        if ok { Self::Pass } else { Self::fail(message) }
    }

    /// Whether this is [`Verdict::Pass`].
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

impl From<bool> for Verdict {
    /// `true` passes; `false` fails with [`DEFAULT_FAILURE_MESSAGE`].
    fn from(ok: bool) -> Self {
        Self::check(ok, DEFAULT_FAILURE_MESSAGE)
    }
}

// ============================================================================
// TRAITS
// ============================================================================

/// A procedure that transforms a value.
pub trait Filter: Send + Sync {
    /// Returns the transformed value.
    fn apply(&self, value: Value, args: &[String]) -> Result<Value, ProcedureError>;
}

/// A procedure that checks a value.
pub trait Validator: Send + Sync {
    /// Returns the verdict for `value`.
    fn check(&self, value: &Value, args: &[String]) -> Result<Verdict, ProcedureError>;
}

impl<T: Filter + ?Sized> Filter for Arc<T> {
    fn apply(&self, value: Value, args: &[String]) -> Result<Value, ProcedureError> {
        (**self).apply(value, args)
    }
}

impl<T: Validator + ?Sized> Validator for Arc<T> {
    fn check(&self, value: &Value, args: &[String]) -> Result<Verdict, ProcedureError> {
        (**self).check(value, args)
    }
}

// ============================================================================
// CLOSURE ADAPTERS
// ============================================================================

/// A [`Filter`] backed by a closure. Built with [`filter_fn`].
#[derive(Clone)]
pub struct FilterFn<F>(F);

/// Wraps a closure as a [`Filter`].
pub fn filter_fn<F>(f: F) -> FilterFn<F>
where
    F: Fn(Value, &[String]) -> Result<Value, ProcedureError> + Send + Sync,
{
    FilterFn(f)
}

impl<F> Filter for FilterFn<F>
where
    F: Fn(Value, &[String]) -> Result<Value, ProcedureError> + Send + Sync,
{
    fn apply(&self, value: Value, args: &[String]) -> Result<Value, ProcedureError> {
        (self.0)(value, args)
    }
}

impl<F> fmt::Debug for FilterFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FilterFn")
    }
}

/// A [`Validator`] backed by a closure. Built with [`validator_fn`].
#[derive(Clone)]
pub struct ValidatorFn<F>(F);

/// Wraps a closure as a [`Validator`].
pub fn validator_fn<F>(f: F) -> ValidatorFn<F>
where
    F: Fn(&Value, &[String]) -> Result<Verdict, ProcedureError> + Send + Sync,
{
    ValidatorFn(f)
}

impl<F> Validator for ValidatorFn<F>
where
    F: Fn(&Value, &[String]) -> Result<Verdict, ProcedureError> + Send + Sync,
{
    fn check(&self, value: &Value, args: &[String]) -> Result<Verdict, ProcedureError> {
        (self.0)(value, args)
    }
}

impl<F> fmt::Debug for ValidatorFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValidatorFn")
    }
}

// ============================================================================
// PROCEDURE
// ============================================================================

/// A registrable procedure, tagged with the namespace it lives in.
#[derive(Clone)]
pub enum Procedure {
    /// Lives in the filter namespace.
    Filter(Arc<dyn Filter>),
    /// Lives in the validator namespace.
    Validator(Arc<dyn Validator>),
}

impl Procedure {
    /// Wraps a filter.
    pub fn filter(filter: impl Filter + 'static) -> Self {
        Self::Filter(Arc::new(filter))
    }

    /// Wraps a validator.
    pub fn validator(validator: impl Validator + 'static) -> Self {
        Self::Validator(Arc::new(validator))
    }

    /// The namespace this procedure registers into.
    pub fn namespace(&self) -> Namespace {
        match self {
            Self::Filter(_) => Namespace::Filter,
            Self::Validator(_) => Namespace::Validator,
        }
    }
}

impl fmt::Debug for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Procedure").field(&self.namespace()).finish()
    }
}

// ============================================================================
// BUNDLES
// ============================================================================

/// A fixed, explicit set of named procedures registered together.
///
/// ```
/// use nebula_rulechain::procedure::{validator_fn, Procedure, ProcedureBundle, Verdict};
///
/// struct Checks;
///
/// impl ProcedureBundle for Checks {
///     fn procedures(&self) -> Vec<(&'static str, Procedure)> {
///         vec![(
///             "not_null",
///             Procedure::validator(validator_fn(|v, _| {
///                 Ok(Verdict::check(!v.is_null(), "required"))
///             })),
///         )]
///     }
/// }
/// ```
pub trait ProcedureBundle {
    /// Every procedure in the bundle with the name it registers under.
    fn procedures(&self) -> Vec<(&'static str, Procedure)>;
}
