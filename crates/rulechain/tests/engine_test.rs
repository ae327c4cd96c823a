//! Integration tests for chain execution through the public API.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use nebula_rulechain::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn int_filter(f: fn(i64) -> i64) -> impl Filter + 'static {
    filter_fn(move |value: Value, _: &[String]| {
        let n = value
            .as_i64()
            .ok_or_else(|| ProcedureError::custom("expected an integer"))?;
        Ok(json!(f(n)))
    })
}

fn arithmetic_engine() -> RuleEngine {
    let registry = ProcedureRegistry::new();
    registry.add_filter("double", int_filter(|n| n * 2)).unwrap();
    registry.add_filter("incr", int_filter(|n| n + 1)).unwrap();
    RuleEngine::new(Arc::new(registry))
}

/// Validator that counts its invocations and returns a fixed verdict.
fn counting(counter: &Arc<AtomicUsize>, verdict: Verdict) -> impl Validator + 'static {
    let counter = Arc::clone(counter);
    validator_fn(move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(verdict.clone())
    })
}

// ============================================================================
// FILTER MODE
// ============================================================================

#[test]
fn filters_thread_value_in_order() {
    let engine = arithmetic_engine();
    assert_eq!(engine.filter_input(json!(3), "double->incr").unwrap(), json!(7));
    assert_eq!(engine.filter_input(json!(3), "incr->double").unwrap(), json!(8));
}

#[test]
fn empty_rule_returns_input_without_invoking_anything() {
    let calls = Arc::new(AtomicUsize::new(0));
    let registry = ProcedureRegistry::new();
    let counter = Arc::clone(&calls);
    registry
        .add_filter(
            "count",
            filter_fn(move |v, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(v)
            }),
        )
        .unwrap();
    let engine = RuleEngine::new(Arc::new(registry));

    assert_eq!(engine.filter_input(json!("v"), "").unwrap(), json!("v"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn unknown_filter_is_an_error() {
    let err = arithmetic_engine()
        .filter_input(json!(1), "doesNotExist")
        .unwrap_err();
    assert_eq!(
        err,
        ChainError::UnknownFilter {
            name: "doesNotExist".into(),
            position: 0
        }
    );
    assert_eq!(
        err.to_string(),
        "unknown filter procedure 'doesNotExist' at step 0"
    );
}

#[test]
fn unknown_filter_mid_chain_names_the_step() {
    let err = arithmetic_engine()
        .filter_input(json!(1), "incr->nope->double")
        .unwrap_err();
    assert_eq!(err.procedure_name(), "nope");
    assert!(err.is_unknown_procedure());
}

#[test]
fn filter_error_aborts_chain() {
    let err = arithmetic_engine()
        .filter_input(json!("x"), "incr")
        .unwrap_err();
    assert_eq!(
        err,
        ChainError::Procedure {
            name: "incr".into(),
            position: 0,
            source: ProcedureError::custom("expected an integer"),
        }
    );
}

#[test]
fn validators_do_not_resolve_as_filters() {
    let registry = ProcedureRegistry::new();
    registry
        .add_validator("only_validator", validator_fn(|_, _| Ok(Verdict::Pass)))
        .unwrap();
    let engine = RuleEngine::new(Arc::new(registry));

    let err = engine.filter_input(json!(1), "only_validator").unwrap_err();
    assert!(matches!(err, ChainError::UnknownFilter { .. }));
}

// ============================================================================
// VALIDATOR MODE
// ============================================================================

fn messages_engine() -> RuleEngine {
    let registry = ProcedureRegistry::new();
    registry
        .add_validator(
            "is_int",
            validator_fn(|v, _| {
                let ok = v.as_str().is_some_and(|s| s.parse::<i64>().is_ok());
                Ok(Verdict::check(ok, "must be int"))
            }),
        )
        .unwrap();
    registry
        .add_validator(
            "min_len",
            validator_fn(|v, args| {
                let min: usize = args[0]
                    .parse()
                    .map_err(|_| ProcedureError::invalid_argument("min", "not a number"))?;
                let len = v.as_str().map_or(0, |s| s.chars().count());
                Ok(Verdict::check(len >= min, "too short"))
            }),
        )
        .unwrap();
    RuleEngine::new(Arc::new(registry))
}

#[test]
fn failures_are_aggregated_by_name() {
    let report = messages_engine()
        .validate_input(&json!("ab"), "is_int->min_len::3")
        .unwrap();

    assert!(!report.is_valid());
    assert_eq!(report.outcome(), ChainOutcome::Exhausted);

    let messages: Vec<(&str, Vec<String>)> = report
        .messages()
        .iter()
        .map(|(k, v)| (k.as_str(), v.clone()))
        .collect();
    assert_eq!(
        messages,
        vec![
            ("is_int", vec!["must be int".to_owned()]),
            ("min_len", vec!["too short".to_owned()]),
        ]
    );
}

#[test]
fn passing_value_has_no_messages() {
    let report = messages_engine()
        .validate_input(&json!("1234"), "is_int->min_len::3")
        .unwrap();
    assert!(report.is_valid());
    assert!(report.into_messages().is_empty());
}

#[test]
fn skip_short_circuits_remaining_steps() {
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));
    let third = Arc::new(AtomicUsize::new(0));

    let registry = ProcedureRegistry::new();
    registry.add_validator("skip", counting(&first, Verdict::Skip)).unwrap();
    registry
        .add_validator("fail", counting(&second, Verdict::fail("never seen")))
        .unwrap();
    registry.add_validator("pass", counting(&third, Verdict::Pass)).unwrap();
    let engine = RuleEngine::new(Arc::new(registry));

    let report = engine.validate_input(&json!(null), "skip->fail->pass").unwrap();

    assert!(report.is_valid());
    assert!(report.messages().is_empty());
    assert_eq!(report.outcome(), ChainOutcome::Skipped { step: 0 });
    assert_eq!(first.load(Ordering::SeqCst), 1);
    assert_eq!(second.load(Ordering::SeqCst), 0);
    assert_eq!(third.load(Ordering::SeqCst), 0);
}

#[test]
fn unknown_validator_aborts_validation() {
    let err = messages_engine()
        .validate_input(&json!("ab"), "doesNotExist")
        .unwrap_err();
    assert_eq!(
        err,
        ChainError::UnknownValidator {
            name: "doesNotExist".into(),
            position: 0
        }
    );
}

#[test]
fn unknown_validator_after_failure_still_aborts() {
    let err = messages_engine()
        .validate_input(&json!("ab"), "is_int->doesNotExist")
        .unwrap_err();
    assert!(matches!(err, ChainError::UnknownValidator { position: 1, .. }));
}

#[test]
fn validator_error_aborts_validation() {
    let err = messages_engine()
        .validate_input(&json!("abcd"), "is_int->min_len::many")
        .unwrap_err();
    assert_eq!(
        err,
        ChainError::Procedure {
            name: "min_len".into(),
            position: 1,
            source: ProcedureError::invalid_argument("min", "not a number"),
        }
    );
    assert!(!err.is_unknown_procedure());
}

#[test]
fn skip_before_unknown_validator_is_not_an_error() {
    let registry = ProcedureRegistry::new();
    registry
        .add_validator("skip", validator_fn(|_, _| Ok(Verdict::Skip)))
        .unwrap();
    let engine = RuleEngine::new(Arc::new(registry));

    let report = engine
        .validate_input(&json!(null), "skip->doesNotExist")
        .unwrap();
    assert!(report.is_valid());
    assert_eq!(report.outcome(), ChainOutcome::Skipped { step: 0 });

    // Eager resolution still reports it.
    assert!(engine.check_rule(Namespace::Validator, "skip->doesNotExist").is_err());
}

#[test]
fn bool_verdict_reports_default_message() {
    let registry = ProcedureRegistry::new();
    registry
        .add_validator("truthy", validator_fn(|v, _| Ok(Verdict::from(*v == json!(true)))))
        .unwrap();
    let engine = RuleEngine::new(Arc::new(registry));

    let report = engine.validate_input(&json!(false), "truthy").unwrap();
    assert_eq!(report.messages_for("truthy").unwrap(), ["is invalid"]);
}

#[test]
fn every_validator_sees_the_original_value() {
    let registry = ProcedureRegistry::new();
    registry
        .add_validator(
            "is_seven",
            validator_fn(|v, _| Ok(Verdict::check(*v == json!(7), "not seven"))),
        )
        .unwrap();
    let engine = RuleEngine::new(Arc::new(registry));

    let report = engine.validate_input(&json!(7), "is_seven->is_seven").unwrap();
    assert!(report.is_valid());
}

// ============================================================================
// CUSTOM SYNTAX
// ============================================================================

#[test]
fn custom_syntax_registry_drives_the_engine() {
    let syntax = Syntax::new("|", "=", ";").unwrap();
    let registry = ProcedureRegistry::with_syntax(syntax.clone());
    registry.add_filter("double", int_filter(|n| n * 2)).unwrap();
    registry
        .add_validator(
            "between",
            validator_fn(|v, args| {
                let n = v.as_i64().unwrap_or_default();
                let lo: i64 = args[0].parse().unwrap();
                let hi: i64 = args[1].parse().unwrap();
                Ok(Verdict::check((lo..=hi).contains(&n), "out of range"))
            }),
        )
        .unwrap();
    // "->" is plain text under this syntax.
    registry.add_filter("a->b", filter_fn(|v, _| Ok(v))).unwrap();
    let engine = RuleEngine::new(Arc::new(registry));
    assert_eq!(engine.syntax(), &syntax);

    let mut builder = engine.builder();
    builder.filter("double").filter("a->b").filter("double");
    builder.condition_with("between", ["1", "9"]);
    let filter_rule = builder.create_filter();
    let validator_rule = builder.create_rule();
    assert_eq!(filter_rule, "double|a->b|double");
    assert_eq!(validator_rule, "between=1;9");

    assert_eq!(engine.filter_input(json!(2), &filter_rule).unwrap(), json!(8));
    assert!(engine.validate_input(&json!(5), &validator_rule).unwrap().is_valid());
    assert_eq!(
        engine
            .validate_input(&json!(12), &validator_rule)
            .unwrap()
            .messages_for("between")
            .unwrap(),
        ["out of range"]
    );

    // Default-syntax rules no longer split.
    let err = engine.filter_input(json!(2), "double->double").unwrap_err();
    assert_eq!(err.procedure_name(), "double->double");
}

// ============================================================================
// BUNDLES
// ============================================================================

struct FirstChecks;
struct SecondChecks;

impl ProcedureBundle for FirstChecks {
    fn procedures(&self) -> Vec<(&'static str, Procedure)> {
        vec![(
            "check",
            Procedure::validator(validator_fn(|_, _| Ok(Verdict::fail("first")))),
        )]
    }
}

impl ProcedureBundle for SecondChecks {
    fn procedures(&self) -> Vec<(&'static str, Procedure)> {
        vec![(
            "check",
            Procedure::validator(validator_fn(|_, _| Ok(Verdict::fail("second")))),
        )]
    }
}

#[test]
fn later_bundle_overwrites_same_name() {
    let registry = Arc::new(ProcedureRegistry::new());
    assert_eq!(registry.register_bundle(&FirstChecks), 1);
    assert_eq!(registry.register_bundle(&SecondChecks), 1);

    let engine = RuleEngine::new(Arc::clone(&registry));
    let report = engine.validate_input(&json!(null), "check").unwrap();
    assert_eq!(report.messages_for("check").unwrap(), ["second"]);
    assert_eq!(registry.names(Namespace::Validator), ["check"]);
}

// ============================================================================
// SHARED REGISTRY
// ============================================================================

#[test]
fn registry_shared_across_threads() {
    let registry = Arc::new(ProcedureRegistry::with_builtins());
    let engine = RuleEngine::new(Arc::clone(&registry));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let engine = engine.clone();
            std::thread::spawn(move || {
                engine
                    .validate_input(&json!(i.to_string()), "required->is_int")
                    .unwrap()
                    .is_valid()
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}

#[test]
fn procedures_registered_later_are_visible() {
    let registry = Arc::new(ProcedureRegistry::new());
    let engine = RuleEngine::new(Arc::clone(&registry));
    assert!(engine.filter_input(json!(1), "late").is_err());

    registry.add_filter("late", filter_fn(|_, _| Ok(json!("here")))).unwrap();
    assert_eq!(engine.filter_input(json!(1), "late").unwrap(), json!("here"));
}
