//! Builtin filters.
//!
//! String filters leave non-string values untouched so they can sit at the
//! front of any chain.

use serde_json::{Number, Value};

use super::{get_arg, is_blank_value, numeric_value, value_type_name};
use crate::error::ProcedureError;

/// Strips leading and trailing whitespace.
pub fn trim(value: Value, _args: &[String]) -> Result<Value, ProcedureError> {
    Ok(map_string(value, |s| s.trim().to_owned()))
}

/// Lowercases a string.
pub fn lowercase(value: Value, _args: &[String]) -> Result<Value, ProcedureError> {
    Ok(map_string(value, |s| s.to_lowercase()))
}

/// Uppercases a string.
pub fn uppercase(value: Value, _args: &[String]) -> Result<Value, ProcedureError> {
    Ok(map_string(value, |s| s.to_uppercase()))
}

/// Converts a number or numeric string to an integer, truncating fractions.
pub fn to_int(value: Value, _args: &[String]) -> Result<Value, ProcedureError> {
    if let Value::Number(n) = &value
        && (n.is_i64() || n.is_u64())
    {
        return Ok(value);
    }
    if let Value::String(s) = &value
        && let Ok(i) = s.trim().parse::<i64>()
    {
        return Ok(Value::from(i));
    }
    match numeric_value(&value) {
        Some(f) if (i64::MIN as f64..=i64::MAX as f64).contains(&f) => {
            Ok(Value::from(f.trunc() as i64))
        }
        _ => Err(ProcedureError::UnsupportedValue {
            operation: "convert to integer",
            actual: value_type_name(&value),
        }),
    }
}

/// Converts a number or numeric string to a float.
pub fn to_float(value: Value, _args: &[String]) -> Result<Value, ProcedureError> {
    numeric_value(&value)
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| ProcedureError::UnsupportedValue {
            operation: "convert to float",
            actual: value_type_name(&value),
        })
}

/// `default::<fallback>`: replaces a blank value with the string `fallback`.
pub fn default(value: Value, args: &[String]) -> Result<Value, ProcedureError> {
    let fallback = get_arg(args, 0, "fallback")?;
    if is_blank_value(&value) {
        Ok(Value::String(fallback.to_owned()))
    } else {
        Ok(value)
    }
}

/// `replace::<from>,,<to>`: replaces every occurrence of `from` with `to`.
pub fn replace(value: Value, args: &[String]) -> Result<Value, ProcedureError> {
    let from = get_arg(args, 0, "from")?;
    // A missing `to` means deletion: "replace::-" strips dashes.
    let to = args.get(1).map_or("", String::as_str);
    if from.is_empty() {
        return Err(ProcedureError::invalid_argument("from", "must not be empty"));
    }
    Ok(map_string(value, |s| s.replace(from, to)))
}

fn map_string(value: Value, f: impl FnOnce(&str) -> String) -> Value {
    match value {
        Value::String(s) => Value::String(f(&s)),
        other => other,
    }
}
