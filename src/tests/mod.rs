//! Scenario tests over a small engine with a handful of types.

mod nesting;

use crate::{Diff, Engine, ExpectResult, Pen, Style, TypeSpec, Value};

fn inspect_items(output: &mut Pen, items: Vec<Pen>, open: &str, close: &str) {
    output.text(open);
    let empty = items.is_empty();
    for (idx, item) in items.iter().enumerate() {
        output.text(if idx == 0 { " " } else { ", " });
        output.append(item);
    }
    if !empty {
        output.sp();
    }
    output.text(close);
}

/// Engine with number, integer, string, array and object types plus a few
/// assertions.
pub(crate) fn basic_engine() -> Engine {
    let mut engine = Engine::new();
    add_basic_types(&mut engine).unwrap();
    add_basic_assertions(&mut engine).unwrap();
    engine
}

fn add_basic_types(engine: &mut Engine) -> ExpectResult<()> {
    engine.add_type(TypeSpec::new("number").identify(|v| matches!(v, Value::Number(_))))?;

    engine.add_type(
        TypeSpec::new("integer")
            .base("number")
            .identify(|v| matches!(v, Value::Number(n) if n.fract() == 0.0)),
    )?;

    engine.add_type(
        TypeSpec::new("string")
            .identify(|v| matches!(v, Value::String(_)))
            .inspect(|output, value, _| {
                output.styled(Style::Strings, format!("'{}'", value));
            })
            .diff(|actual, expected, mut output, _| {
                output
                    .styled(Style::Removed, format!("-{}", actual.as_str()?))
                    .nl()
                    .styled(Style::Added, format!("+{}", expected.as_str()?));
                Some(Diff::new(output))
            }),
    )?;

    engine.add_type(
        TypeSpec::new("array")
            .identify(|v| matches!(v, Value::Array(_)))
            .equal(|a, b, comparator| {
                let (Some(a), Some(b)) = (a.as_array(), b.as_array()) else {
                    return Ok(false);
                };
                if a.len() != b.len() {
                    return Ok(false);
                }
                for (x, y) in a.iter().zip(b.iter()) {
                    if !comparator.equal(x, y)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            })
            .inspect(|output, value, inspector| {
                let items = value
                    .as_array()
                    .map(|items| items.iter().map(|item| inspector.inspect(item)).collect())
                    .unwrap_or_default();
                inspect_items(output, items, "[", "]");
            }),
    )?;

    engine.add_type(
        TypeSpec::new("object")
            .identify(|v| matches!(v, Value::Object(_)))
            .equal(|a, b, comparator| {
                let (Some(a), Some(b)) = (a.as_object(), b.as_object()) else {
                    return Ok(false);
                };
                if a.len() != b.len() {
                    return Ok(false);
                }
                for (key, x) in a.iter() {
                    match b.get(key) {
                        Some(y) if comparator.equal(x, y)? => {}
                        _ => return Ok(false),
                    }
                }
                Ok(true)
            })
            .inspect(|output, value, inspector| {
                let entries = value
                    .as_object()
                    .map(|entries| {
                        entries
                            .iter()
                            .map(|(key, item)| {
                                let mut entry = Pen::new();
                                entry.styled(Style::Key, key).text(": ");
                                entry.append(&inspector.inspect(item));
                                entry
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                inspect_items(output, entries, "{", "}");
            }),
    )?;

    Ok(())
}

fn add_basic_assertions(engine: &mut Engine) -> ExpectResult<()> {
    engine.add_assertion(&[], &["[not] to be"], |a, subject, args| {
        if subject.strict_eq(&args[0]) == a.flag("not") {
            return a.fail("", &[]);
        }
        Ok(())
    })?;

    engine.add_assertion(&[], &["[not] to equal"], |a, subject, args| {
        let equal = a.equal(subject, &args[0])?;
        if equal == a.flag("not") {
            if a.flag("not") {
                return a.fail("", &[]);
            }
            let failure = a
                .engine()
                .failure("", &[])
                .with_values(subject.clone(), args[0].clone());
            return a.fail_error(failure);
        }
        Ok(())
    })?;

    engine.add_assertion(&[], &["[not] to be ok"], |a, subject, _| {
        let ok = !matches!(
            subject,
            Value::Undefined | Value::Null | Value::Bool(false)
        );
        if ok == a.flag("not") {
            return a.fail("", &[]);
        }
        Ok(())
    })?;

    engine.add_assertion(&["number".into()], &["to be (even|odd)"], |a, subject, _| {
        let remainder = subject.as_number().unwrap_or(f64::NAN) % 2.0;
        let want_even = a.name() == "to be even";
        if (remainder == 0.0) != want_even {
            return a.fail("", &[]);
        }
        Ok(())
    })?;

    engine.add_assertion(&["number".into()], &["to be positive"], |a, subject, _| {
        if subject.as_number().map_or(true, |n| n <= 0.0) {
            return a.fail("", &[]);
        }
        Ok(())
    })?;

    engine.add_assertion(&["integer".into()], &["to be whole"], |_, _, _| Ok(()))?;

    engine.add_assertion(
        &["string".into(), "array".into()],
        &["to be empty"],
        |a, subject, _| {
            let empty = match subject {
                Value::String(s) => s.is_empty(),
                other => other.as_array().map_or(false, |items| items.is_empty()),
            };
            if !empty {
                return a.fail("", &[]);
            }
            Ok(())
        },
    )?;

    Ok(())
}

#[test]
fn test_basic_engine_types() {
    let engine = basic_engine();
    let names: Vec<_> = engine.types().iter().map(|t| t.name().to_string()).collect();
    assert_eq!(names, ["object", "array", "string", "integer", "number", "any"]);
}

#[test]
fn test_passing_assertions() {
    let engine = basic_engine();
    engine.expect(&Value::from(2), "to be even", &[]).unwrap();
    engine.expect(&Value::from(3), "to be odd", &[]).unwrap();
    engine.expect(&Value::from("a"), "to be", &[Value::from("a")]).unwrap();
    engine.expect(&Value::from("a"), "not to be", &[Value::from("b")]).unwrap();
    engine
        .expect(
            &Value::from(vec![1, 2]),
            "to equal",
            &[Value::from(vec![1, 2])],
        )
        .unwrap();
    engine.expect(&Value::Null, "not to be ok", &[]).unwrap();
    engine.expect(&Value::from(""), "to be empty", &[]).unwrap();
}

#[test]
fn test_failing_assertion_uses_standard_message() {
    let engine = basic_engine();
    let err = engine.expect(&Value::from(3), "to be even", &[]).unwrap_err();
    assert!(err.is_failure());
    assert_eq!(err.to_string(), "expected 3 to be even");
}
