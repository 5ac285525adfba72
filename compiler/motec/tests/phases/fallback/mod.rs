//! Fallback phase tests over `RespondViaMissing`.

use mote_eval::{CallMode, EvalErrorKind, Value};
use pretty_assertions::assert_eq;

use crate::common::{call, error_kind, new, sym, world};

#[test]
fn respond_to_consults_predicate() {
    let (mut interp, world) = world();
    let object = new(&mut interp, &world, world.respond_via_missing);
    let cases = [
        ("handled_publicly", false, true),
        ("handled_privately", false, false),
        ("handled_privately", true, true),
        ("not_handled", false, false),
        ("not_handled", true, false),
    ];
    for (name, include_all, answer) in cases {
        let target = sym(&interp, name);
        let got = call(
            &mut interp,
            &object,
            "respond_to?",
            vec![target, Value::Bool(include_all)],
        )
        .unwrap();
        assert_eq!(got, Value::Bool(answer), "{name} include_all={include_all}");
    }
}

#[test]
fn real_methods_answer_without_predicate() {
    let (mut interp, world) = world();
    let object = new(&mut interp, &world, world.respond_via_missing);
    // The predicate would raise for this name.
    let target = sym(&interp, "inspect");
    let got = call(&mut interp, &object, "respond_to?", vec![target]).unwrap();
    assert_eq!(got, Value::Bool(true));
}

#[test]
fn fallback_receives_name_and_args() {
    let (mut interp, world) = world();
    let object = new(&mut interp, &world, world.respond_via_missing);
    let got = call(
        &mut interp,
        &object,
        "handled_publicly",
        vec![Value::int(1), Value::int(2)],
    )
    .unwrap();
    assert_eq!(got.as_str(), Some("Done handled_publicly([1, 2])"));
}

#[test]
fn private_fallback_needs_private_reach() {
    let (mut interp, world) = world();
    let object = new(&mut interp, &world, world.respond_via_missing);

    let kind = error_kind(call(&mut interp, &object, "handled_privately", vec![]));
    assert_eq!(
        kind,
        EvalErrorKind::FallbackMismatch {
            method: "handled_privately".to_string(),
            predicate: false,
        }
    );

    let name = interp.intern("handled_privately");
    let sent = interp.call(&object, name, CallMode::Send, vec![], None).unwrap();
    assert_eq!(sent.as_str(), Some("Done handled_privately([])"));
}

#[test]
fn denied_name_handled_anyway_is_mismatch() {
    let (mut interp, world) = world();
    let object = new(&mut interp, &world, world.respond_via_missing);
    let kind = error_kind(call(&mut interp, &object, "not_handled", vec![]));
    assert_eq!(
        kind,
        EvalErrorKind::FallbackMismatch {
            method: "not_handled".to_string(),
            predicate: false,
        }
    );
}

#[test]
fn predicate_error_propagates() {
    let (mut interp, world) = world();
    let object = new(&mut interp, &world, world.respond_via_missing);
    let kind = error_kind(call(&mut interp, &object, "mystery", vec![]));
    assert_eq!(
        kind,
        EvalErrorKind::Custom {
            message: "Typo in method name".to_string()
        }
    );
}

#[test]
fn receivers_without_fallback_get_no_method() {
    let (mut interp, world) = world();
    let object = new(&mut interp, &world, world.visibility.parent);
    let kind = error_kind(call(&mut interp, &object, "handled_publicly", vec![]));
    assert!(matches!(kind, EvalErrorKind::NoMethod { .. }));
}
