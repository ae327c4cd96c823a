//! Chain execution.
//!
//! The engine parses a rule string, resolves every step against the
//! registry and runs it with either filter or validator semantics:
//!
//! - **Filters** thread the value through each step, left to right.
//! - **Validators** all see the original value. Failures are collected by
//!   procedure name; a [`Verdict::Skip`] ends the chain early without
//!   marking the value invalid.
//!
//! A step whose name is not registered aborts the call with
//! [`ChainError::UnknownFilter`] / [`ChainError::UnknownValidator`]. Steps
//! after it never run, but steps before it already have.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::builder::RuleBuilder;
use crate::chain::RuleChain;
use crate::error::ChainError;
use crate::procedure::Verdict;
use crate::registry::{Namespace, ProcedureRegistry};
use crate::syntax::Syntax;

// ============================================================================
// VALIDATION REPORT
// ============================================================================

/// How a validator chain ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ChainOutcome {
    /// Every step ran.
    Exhausted,
    /// The validator at `step` returned [`Verdict::Skip`].
    Skipped {
        /// Zero-based index of the skipping step.
        step: usize,
    },
}

/// Result of running a validator chain.
///
/// Messages are keyed by procedure name in order of first failure; a later
/// failing step with the same name replaces the earlier messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    valid: bool,
    messages: IndexMap<String, Vec<String>>,
    outcome: ChainOutcome,
}

impl ValidationReport {
    fn new() -> Self {
        Self {
            valid: true,
            messages: IndexMap::new(),
            outcome: ChainOutcome::Exhausted,
        }
    }

    /// True iff no step failed.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Failure messages by procedure name.
    pub fn messages(&self) -> &IndexMap<String, Vec<String>> {
        &self.messages
    }

    /// Messages recorded for `procedure`, if it failed.
    pub fn messages_for(&self, procedure: &str) -> Option<&[String]> {
        self.messages.get(procedure).map(Vec::as_slice)
    }

    /// How the chain ended.
    pub fn outcome(&self) -> ChainOutcome {
        self.outcome
    }

    /// Whether a validator cut the chain short.
    pub fn was_skipped(&self) -> bool {
        matches!(self.outcome, ChainOutcome::Skipped { .. })
    }

    /// Consumes the report and returns the messages.
    pub fn into_messages(self) -> IndexMap<String, Vec<String>> {
        self.messages
    }

    fn record_failure(&mut self, procedure: &str, messages: Vec<String>) {
        self.valid = false;
        self.messages.insert(procedure.to_owned(), messages);
    }
}

// ============================================================================
// ENGINE
// ============================================================================

/// Parses and runs rule strings against a shared [`ProcedureRegistry`].
///
/// ```
/// use std::sync::Arc;
/// use nebula_rulechain::procedure::{filter_fn, validator_fn, Verdict};
/// use nebula_rulechain::{ProcedureRegistry, RuleEngine};
/// use serde_json::json;
///
/// let registry = Arc::new(ProcedureRegistry::new());
/// registry
///     .add_filter("double", filter_fn(|v, _| Ok(json!(v.as_i64().unwrap_or(0) * 2))))
///     .unwrap();
/// registry
///     .add_validator("positive", validator_fn(|v, _| {
///         Ok(Verdict::check(v.as_i64().is_some_and(|n| n > 0), "must be positive"))
///     }))
///     .unwrap();
///
/// let engine = RuleEngine::new(registry);
/// assert_eq!(engine.filter_input(json!(21), "double").unwrap(), json!(42));
///
/// let report = engine.validate_input(&json!(-1), "positive").unwrap();
/// assert!(!report.is_valid());
/// assert_eq!(report.messages_for("positive").unwrap(), ["must be positive"]);
/// ```
#[derive(Debug, Clone)]
pub struct RuleEngine {
    registry: Arc<ProcedureRegistry>,
    syntax: Syntax,
}

impl RuleEngine {
    /// Creates an engine that parses with the registry's syntax.
    pub fn new(registry: Arc<ProcedureRegistry>) -> Self {
        let syntax = registry.syntax().clone();
        Self { registry, syntax }
    }

    /// The registry procedures are resolved against.
    pub fn registry(&self) -> &Arc<ProcedureRegistry> {
        &self.registry
    }

    /// The syntax rule strings are parsed with.
    pub fn syntax(&self) -> &Syntax {
        &self.syntax
    }

    /// A fresh builder that serializes with this engine's syntax.
    pub fn builder(&self) -> RuleBuilder {
        RuleBuilder::with_syntax(self.syntax.clone())
    }

    /// Parses `rule` with this engine's syntax.
    pub fn parse(&self, rule: &str) -> RuleChain {
        RuleChain::parse(rule, &self.syntax)
    }

    /// Parses `rule` and runs it as a filter chain.
    pub fn filter_input(&self, value: Value, rule: &str) -> Result<Value, ChainError> {
        self.apply_filters(value, &self.parse(rule))
    }

    /// Parses `rule` and runs it as a validator chain.
    pub fn validate_input(
        &self,
        value: &Value,
        rule: &str,
    ) -> Result<ValidationReport, ChainError> {
        self.validate(value, &self.parse(rule))
    }

    /// Threads `value` through every filter of `chain`.
    ///
    /// A blank chain returns `value` unchanged.
    pub fn apply_filters(&self, value: Value, chain: &RuleChain) -> Result<Value, ChainError> {
        if chain.is_blank() {
            tracing::trace!("blank filter chain, value passed through");
            return Ok(value);
        }

        let mut current = value;
        for (position, step) in chain.iter().enumerate() {
            let filter = self
                .registry
                .filter(step.name())
                .ok_or_else(|| ChainError::unknown(Namespace::Filter, step.name(), position))?;

            tracing::trace!(step = position, name = step.name(), "applying filter");
            current = filter
                .apply(current, step.args())
                .map_err(|source| ChainError::Procedure {
                    name: step.name().to_owned(),
                    position,
                    source,
                })?;
        }
        Ok(current)
    }

    /// Runs every validator of `chain` against `value`.
    ///
    /// A blank chain is vacuously valid.
    pub fn validate(
        &self,
        value: &Value,
        chain: &RuleChain,
    ) -> Result<ValidationReport, ChainError> {
        let mut report = ValidationReport::new();
        if chain.is_blank() {
            tracing::trace!("blank validator chain, value accepted");
            return Ok(report);
        }

        for (position, step) in chain.iter().enumerate() {
            let validator = self
                .registry
                .validator(step.name())
                .ok_or_else(|| ChainError::unknown(Namespace::Validator, step.name(), position))?;

            tracing::trace!(step = position, name = step.name(), "running validator");
            let verdict = validator
                .check(value, step.args())
                .map_err(|source| ChainError::Procedure {
                    name: step.name().to_owned(),
                    position,
                    source,
                })?;

            match verdict {
                Verdict::Pass => {}
                Verdict::Fail(messages) => {
                    tracing::debug!(step = position, name = step.name(), "validator failed");
                    report.record_failure(step.name(), messages);
                }
                Verdict::Skip => {
                    tracing::debug!(
                        step = position,
                        name = step.name(),
                        "validator skipped remaining steps"
                    );
                    report.outcome = ChainOutcome::Skipped { step: position };
                    break;
                }
            }
        }
        Ok(report)
    }

    /// Parses `rule` and checks that every step resolves in `namespace`,
    /// without invoking anything.
    pub fn check_rule(&self, namespace: Namespace, rule: &str) -> Result<RuleChain, ChainError> {
        let chain = self.parse(rule);
        if chain.is_blank() {
            return Ok(chain);
        }
        if let Some((position, step)) = chain
            .iter()
            .enumerate()
            .find(|(_, step)| !self.registry.has(namespace, step.name()))
        {
            return Err(ChainError::unknown(namespace, step.name(), position));
        }
        Ok(chain)
    }
}
