//! Builtin validators.

use std::collections::HashMap;
use std::sync::LazyLock;

use parking_lot::Mutex;
use regex::Regex;
use serde_json::Value;

use super::{
    get_arg, get_number_arg, get_usize_arg, is_blank_value, numeric_value, value_type_name,
};
use crate::error::ProcedureError;
use crate::procedure::Verdict;

/// Maximum accepted length of a `matches` pattern.
const MAX_PATTERN_LEN: usize = 1000;

/// Number of compiled `matches` patterns kept; one entry is evicted per miss beyond it.
const MAX_PATTERN_CACHE_SIZE: usize = 100;

static PATTERN_CACHE: LazyLock<Mutex<HashMap<String, Regex>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Labels may not start or end with `-`; at least one dot in the domain.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@",
        r"[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?",
        r"(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$",
    ))
    .expect("email pattern is valid")
});

/// Fails on null, `""`, `[]` and `{}`.
pub fn required(value: &Value, _args: &[String]) -> Result<Verdict, ProcedureError> {
    Ok(Verdict::check(!is_blank_value(value), "is required"))
}

/// Skips the rest of the chain when the value was not supplied.
pub fn optional(value: &Value, _args: &[String]) -> Result<Verdict, ProcedureError> {
    Ok(if is_blank_value(value) {
        Verdict::Skip
    } else {
        Verdict::Pass
    })
}

/// Integer numbers and strings holding one.
pub fn is_int(value: &Value, _args: &[String]) -> Result<Verdict, ProcedureError> {
    let ok = match value {
        Value::Number(n) => n.is_i64() || n.is_u64(),
        Value::String(s) => s.trim().parse::<i64>().is_ok(),
        _ => false,
    };
    Ok(Verdict::check(ok, "must be an integer"))
}

/// Any finite number, or a string holding one.
pub fn is_numeric(value: &Value, _args: &[String]) -> Result<Verdict, ProcedureError> {
    Ok(Verdict::check(numeric_value(value).is_some(), "must be numeric"))
}

/// `min_len::<n>`: at least `n` characters (strings) or items (arrays).
pub fn min_len(value: &Value, args: &[String]) -> Result<Verdict, ProcedureError> {
    let min = get_usize_arg(args, 0, "min")?;
    Ok(match measure(value) {
        Some((len, unit)) => {
            Verdict::check(len >= min, format!("must be at least {min} {unit} long"))
        }
        None => unmeasurable(value),
    })
}

/// `max_len::<n>`: at most `n` characters (strings) or items (arrays).
pub fn max_len(value: &Value, args: &[String]) -> Result<Verdict, ProcedureError> {
    let max = get_usize_arg(args, 0, "max")?;
    Ok(match measure(value) {
        Some((len, unit)) => {
            Verdict::check(len <= max, format!("must be at most {max} {unit} long"))
        }
        None => unmeasurable(value),
    })
}

/// `between::<lo>,,<hi>`: a number in the inclusive range.
pub fn between(value: &Value, args: &[String]) -> Result<Verdict, ProcedureError> {
    let lo = get_number_arg(args, 0, "lo")?;
    let hi = get_number_arg(args, 1, "hi")?;
    if lo > hi {
        return Err(ProcedureError::invalid_argument(
            "lo",
            format!("lower bound {lo} exceeds upper bound {hi}"),
        ));
    }
    let ok = numeric_value(value).is_some_and(|n| (lo..=hi).contains(&n));
    Ok(Verdict::check(ok, format!("must be between {lo} and {hi}")))
}

/// `matches::<regex>`: a string matching the pattern.
pub fn matches(value: &Value, args: &[String]) -> Result<Verdict, ProcedureError> {
    let pattern = get_arg(args, 0, "pattern")?;
    let Value::String(s) = value else {
        return Ok(Verdict::fail("has an invalid format"));
    };
    let re = cached_pattern(pattern)?;
    Ok(Verdict::check(re.is_match(s), "has an invalid format"))
}

/// `one_of::<a>,,<b>,,...`: a string equal to one of the arguments.
pub fn one_of(value: &Value, args: &[String]) -> Result<Verdict, ProcedureError> {
    get_arg(args, 0, "choices")?;
    let ok = value
        .as_str()
        .is_some_and(|s| args.iter().any(|choice| choice == s));
    Ok(Verdict::check(ok, format!("must be one of: {}", args.join(", "))))
}

/// A string shaped like `local@domain.tld`.
pub fn email(value: &Value, _args: &[String]) -> Result<Verdict, ProcedureError> {
    let ok = value.as_str().is_some_and(|s| EMAIL_REGEX.is_match(s));
    Ok(Verdict::check(ok, "must be a valid email address"))
}

fn measure(value: &Value) -> Option<(usize, &'static str)> {
    match value {
        Value::String(s) => Some((s.chars().count(), "characters")),
        Value::Array(items) => Some((items.len(), "items")),
        _ => None,
    }
}

fn unmeasurable(value: &Value) -> Verdict {
    Verdict::fail(format!(
        "cannot measure the length of a {}",
        value_type_name(value)
    ))
}

/// Compiles `pattern` or takes it from the cache.
///
/// Returns an owned `Regex` (an `Arc` clone) so matching happens after the
/// cache lock is released.
fn cached_pattern(pattern: &str) -> Result<Regex, ProcedureError> {
    if pattern.len() > MAX_PATTERN_LEN {
        return Err(ProcedureError::invalid_argument(
            "pattern",
            format!("longer than {MAX_PATTERN_LEN} bytes"),
        ));
    }

    let mut cache = PATTERN_CACHE.lock();
    if let Some(re) = cache.get(pattern) {
        return Ok(re.clone());
    }

    let re = Regex::new(pattern)
        .map_err(|e| ProcedureError::invalid_argument("pattern", e.to_string()))?;
    if cache.len() >= MAX_PATTERN_CACHE_SIZE
        && let Some(key) = cache.keys().next().cloned()
    {
        cache.remove(&key);
    }
    cache.insert(pattern.to_owned(), re.clone());
    drop(cache);
    Ok(re)
}
