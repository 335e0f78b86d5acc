use super::basic_engine;
use crate::{ConfigError, Engine, ErrorMode, ExpectError, Value};

fn with_mode(mode: ErrorMode) -> Engine {
    let mut engine = basic_engine();
    engine
        .add_assertion(&["number".into()], &["to be divisible by four"], move |a, subject, _| {
            a.error_mode = mode;
            a.expect(subject, "to be even", &[])?;
            let n = subject.as_number().unwrap_or(f64::NAN);
            if n % 4.0 != 0.0 {
                return a.fail("", &[]);
            }
            Ok(())
        })
        .unwrap();
    engine
}

#[test]
fn test_nested_mode_indents_inner_message() {
    let engine = with_mode(ErrorMode::Nested);
    let err = engine
        .expect(&Value::from(3), "to be divisible by four", &[])
        .unwrap_err();
    insta::assert_snapshot!(err.to_string(), @r###"
    expected 3 to be divisible by four
      expected 3 to be even
    "###);
}

#[test]
fn test_bubble_mode_keeps_inner_message() {
    let engine = with_mode(ErrorMode::Bubble);
    let err = engine
        .expect(&Value::from(3), "to be divisible by four", &[])
        .unwrap_err();
    assert_eq!(err.to_string(), "expected 3 to be even");
}

#[test]
fn test_default_mode_keeps_outer_message() {
    let engine = with_mode(ErrorMode::Default);
    let err = engine
        .expect(&Value::from(3), "to be divisible by four", &[])
        .unwrap_err();
    assert_eq!(err.to_string(), "expected 3 to be divisible by four");
}

#[test]
fn test_explicit_fail_is_composed() {
    // 6 is even, so the failure comes from the handler's own `fail`.
    let engine = with_mode(ErrorMode::Nested);
    let err = engine
        .expect(&Value::from(6), "to be divisible by four", &[])
        .unwrap_err();
    insta::assert_snapshot!(err.to_string(), @r###"
    expected 6 to be divisible by four
      explicit failure
    "###);
    engine
        .expect(&Value::from(8), "to be divisible by four", &[])
        .unwrap();
}

#[test]
fn test_each_frame_wraps_once() {
    let mut engine = with_mode(ErrorMode::Nested);
    engine
        .add_assertion(&["number".into()], &["to be a multiple of eight"], |a, subject, _| {
            a.error_mode = ErrorMode::Nested;
            a.expect(subject, "to be divisible by four", &[])
        })
        .unwrap();

    let err = engine
        .expect(&Value::from(3), "to be a multiple of eight", &[])
        .unwrap_err();
    insta::assert_snapshot!(err.to_string(), @r###"
    expected 3 to be a multiple of eight
      expected 3 to be divisible by four
        expected 3 to be even
    "###);
}

#[test]
fn test_nested_name_follows_outer_flags() {
    let mut engine = basic_engine();
    engine
        .add_assertion(&[], &["[not] to be truthy"], |a, subject, _| {
            a.error_mode = ErrorMode::Bubble;
            a.expect(subject, "[not] to be ok", &[])
        })
        .unwrap();
    engine
        .add_assertion(&[], &["[not] to be falsy"], |a, subject, _| {
            a.error_mode = ErrorMode::Bubble;
            a.expect(subject, "[!not] to be ok", &[])
        })
        .unwrap();

    engine.expect(&Value::from(true), "to be truthy", &[]).unwrap();
    engine.expect(&Value::Null, "not to be truthy", &[]).unwrap();
    engine.expect(&Value::Null, "to be falsy", &[]).unwrap();
    engine.expect(&Value::from(1), "not to be falsy", &[]).unwrap();

    let err = engine
        .expect(&Value::from(true), "not to be truthy", &[])
        .unwrap_err();
    assert_eq!(err.to_string(), "expected true not to be ok");
}

#[test]
fn test_unknown_nested_assertion_passes_through() {
    let mut engine = basic_engine();
    engine
        .add_assertion(&[], &["to delegate"], |a, subject, _| {
            a.error_mode = ErrorMode::Nested;
            a.expect(subject, "to frobnicate", &[])
        })
        .unwrap();

    let err = engine.expect(&Value::Null, "to delegate", &[]).unwrap_err();
    assert!(!err.is_failure());
    assert!(matches!(err, ExpectError::UnknownAssertion(ref unknown) if unknown.name == "to frobnicate"));
}

#[test]
fn test_configuration_errors_pass_through() {
    let mut engine = basic_engine();
    engine
        .add_assertion(&[], &["to misbehave"], |a, _, _| {
            a.set_error_mode("loud")?;
            Ok(())
        })
        .unwrap();

    let err = engine.expect(&Value::Null, "to misbehave", &[]).unwrap_err();
    assert!(matches!(
        err,
        ExpectError::Config(ConfigError::UnknownErrorMode(ref mode)) if mode == "loud"
    ));
}

#[test]
fn test_circular_error_is_not_composed() {
    let mut engine = basic_engine();
    engine
        .add_assertion(&[], &["to loop"], |a, _, _| {
            a.fail_error(ExpectError::CircularStructure)
        })
        .unwrap();

    let err = engine.expect(&Value::Null, "to loop", &[]).unwrap_err();
    assert!(matches!(err, ExpectError::CircularStructure));
}

#[test]
fn test_outer_frames_see_finalized_failures() {
    let mut engine = basic_engine();
    engine
        .add_assertion(&[], &["to inspect the failure"], |a, subject, _| {
            a.error_mode = ErrorMode::Bubble;
            let err = a.expect(subject, "to be ok", &[]).unwrap_err();
            let failure = err.as_failure().unwrap();
            assert!(failure.is_finalized());
            assert_eq!(failure.message(), "expected null to be ok");
            Ok(())
        })
        .unwrap();

    engine
        .expect(&Value::Null, "to inspect the failure", &[])
        .unwrap();
}
