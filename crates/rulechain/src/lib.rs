//! # nebula-rulechain
//!
//! A small rule-chain engine: named **filter** and **validator** procedures,
//! composed into ordered chains and stored as compact rule strings.
//!
//! ```text
//! trim->lowercase                  filter chain
//! optional->is_int->between::1,,10 validator chain
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use nebula_rulechain::prelude::*;
//! use serde_json::json;
//!
//! let engine = RuleEngine::new(Arc::new(ProcedureRegistry::with_builtins()));
//!
//! let mut builder = engine.builder();
//! let filter = builder.filter("trim").filter("to_int").create_filter();
//! let rule = builder
//!     .condition("optional")
//!     .condition("is_int")
//!     .condition_with("between", ["1", "10"])
//!     .create_rule();
//!
//! let value = engine.filter_input(json!(" 7 "), &filter).unwrap();
//! assert_eq!(value, json!(7));
//! assert!(engine.validate_input(&value, &rule).unwrap().is_valid());
//!
//! let report = engine.validate_input(&json!(42), &rule).unwrap();
//! assert_eq!(report.messages_for("between").unwrap(), ["must be between 1 and 10"]);
//! ```
//!
//! ## Pieces
//!
//! - [`ProcedureRegistry`] — named filters and validators, shared via `Arc`.
//! - [`RuleBuilder`] — fluent construction of rule strings.
//! - [`RuleChain`] — the parsed form of a rule string.
//! - [`RuleEngine`] — runs chains, producing a value or a [`ValidationReport`].
//! - [`Syntax`] — the `->` / `::` / `,,` delimiters, configurable.

pub mod builder;
#[cfg(feature = "builtins")]
pub mod builtins;
pub mod chain;
pub mod engine;
pub mod error;
pub mod prelude;
pub mod procedure;
pub mod registry;
pub mod syntax;

pub use builder::{BufferKind, RuleBuilder};
pub use chain::{RuleChain, RuleStep};
pub use engine::{ChainOutcome, RuleEngine, ValidationReport};
pub use error::{ChainError, ProcedureError, RegistrationError, SyntaxError};
pub use procedure::{Filter, Procedure, ProcedureBundle, Validator, Verdict};
pub use registry::{Namespace, ProcedureRegistry};
pub use syntax::Syntax;
