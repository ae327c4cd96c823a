//! Stock filters and validators.
//!
//! Two bundles, registered together by
//! [`ProcedureRegistry::with_builtins`](crate::ProcedureRegistry::with_builtins):
//!
//! - [`StringFilters`]: `trim` `lowercase` `uppercase` `to_int` `to_float`
//!   `default` `replace`
//! - [`CoreValidators`]: `required` `optional` `is_int` `is_numeric`
//!   `min_len` `max_len` `between` `matches` `one_of` `email`

pub mod filters;
pub mod validators;

use serde_json::Value;

use crate::error::ProcedureError;
use crate::procedure::{Procedure, ProcedureBundle, filter_fn, validator_fn};

/// String and number conversion filters.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringFilters;

impl ProcedureBundle for StringFilters {
    fn procedures(&self) -> Vec<(&'static str, Procedure)> {
        vec![
            ("trim", Procedure::filter(filter_fn(filters::trim))),
            ("lowercase", Procedure::filter(filter_fn(filters::lowercase))),
            ("uppercase", Procedure::filter(filter_fn(filters::uppercase))),
            ("to_int", Procedure::filter(filter_fn(filters::to_int))),
            ("to_float", Procedure::filter(filter_fn(filters::to_float))),
            ("default", Procedure::filter(filter_fn(filters::default))),
            ("replace", Procedure::filter(filter_fn(filters::replace))),
        ]
    }
}

/// Presence, type, length, range and format validators.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoreValidators;

impl ProcedureBundle for CoreValidators {
    fn procedures(&self) -> Vec<(&'static str, Procedure)> {
        vec![
            ("required", Procedure::validator(validator_fn(validators::required))),
            ("optional", Procedure::validator(validator_fn(validators::optional))),
            ("is_int", Procedure::validator(validator_fn(validators::is_int))),
            ("is_numeric", Procedure::validator(validator_fn(validators::is_numeric))),
            ("min_len", Procedure::validator(validator_fn(validators::min_len))),
            ("max_len", Procedure::validator(validator_fn(validators::max_len))),
            ("between", Procedure::validator(validator_fn(validators::between))),
            ("matches", Procedure::validator(validator_fn(validators::matches))),
            ("one_of", Procedure::validator(validator_fn(validators::one_of))),
            ("email", Procedure::validator(validator_fn(validators::email))),
        ]
    }
}

/// JSON type name used in error messages.
pub(crate) fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Whether `value` counts as "not supplied": null, `""`, `[]` or `{}`.
pub(crate) fn is_blank_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Positional argument `index`, or [`ProcedureError::MissingArgument`].
pub(crate) fn get_arg<'a>(
    args: &'a [String],
    index: usize,
    name: &'static str,
) -> Result<&'a str, ProcedureError> {
    args.get(index)
        .map(String::as_str)
        .ok_or(ProcedureError::MissingArgument { index, name })
}

/// Positional argument `index` parsed as a non-negative integer.
pub(crate) fn get_usize_arg(
    args: &[String],
    index: usize,
    name: &'static str,
) -> Result<usize, ProcedureError> {
    let raw = get_arg(args, index, name)?;
    raw.trim().parse().map_err(|_| {
        ProcedureError::invalid_argument(
            name,
            format!("expected a non-negative integer, got '{raw}'"),
        )
    })
}

/// Positional argument `index` parsed as a number.
pub(crate) fn get_number_arg(
    args: &[String],
    index: usize,
    name: &'static str,
) -> Result<f64, ProcedureError> {
    let raw = get_arg(args, index, name)?;
    raw.trim().parse().map_err(|_| {
        ProcedureError::invalid_argument(name, format!("expected a number, got '{raw}'"))
    })
}

/// Reads a number out of a JSON number or a numeric string.
pub(crate) fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}
