//! Call-site visibility over the `A`, `PrivateSup` and `VisibilityChange`
//! fixtures.

use mote_eval::{CallMode, EvalErrorKind, Interpreter, Value, Visibility};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::common::{call, error_kind, new, sym, world};

#[test]
fn public_method_from_anywhere() {
    let (mut interp, world) = world();
    let a = new(&mut interp, &world, world.visibility.a);
    let got = call(&mut interp, &a, "pub_method", vec![]).unwrap();
    assert_eq!(got, sym(&interp, "public_method"));
}

#[test]
fn private_method_rejects_explicit_receiver() {
    let (mut interp, world) = world();
    let a = new(&mut interp, &world, world.visibility.a);
    let kind = error_kind(call(&mut interp, &a, "private_method", vec![]));
    assert_eq!(
        kind,
        EvalErrorKind::VisibilityViolation {
            method: "private_method".to_string(),
            visibility: Visibility::Private,
            receiver: "#<KernelSpecs::A>".to_string(),
        }
    );
}

#[test]
fn protected_method_rejects_unrelated_caller() {
    let (mut interp, world) = world();
    let a = new(&mut interp, &world, world.visibility.a);
    let kind = error_kind(call(&mut interp, &a, "protected_method", vec![]));
    assert!(matches!(
        kind,
        EvalErrorKind::VisibilityViolation {
            visibility: Visibility::Protected,
            ..
        }
    ));
}

#[test]
fn send_bypasses_and_public_send_enforces() {
    let (mut interp, world) = world();
    let a = new(&mut interp, &world, world.visibility.a);
    for name in ["private_method", "protected_method"] {
        let target = sym(&interp, name);
        let got = call(&mut interp, &a, "send", vec![target.clone()]).unwrap();
        assert_eq!(got, target);
        let kind = error_kind(call(&mut interp, &a, "public_send", vec![target]));
        assert!(matches!(kind, EvalErrorKind::VisibilityViolation { .. }), "{name}");
    }
}

#[test]
fn subclass_redefinition_is_public() {
    let (mut interp, world) = world();
    let sub = new(&mut interp, &world, world.visibility.public_sub);
    assert_eq!(call(&mut interp, &sub, "public_in_sub", vec![]).unwrap(), Value::Nil);

    let sup = new(&mut interp, &world, world.visibility.private_sup);
    let kind = error_kind(call(&mut interp, &sup, "public_in_sub", vec![]));
    assert!(matches!(kind, EvalErrorKind::VisibilityViolation { .. }));
}

#[test]
fn define_method_in_public_section() {
    let (mut interp, world) = world();
    let a = new(&mut interp, &world, world.visibility.a);
    let got = call(&mut interp, &a, "defined_method", vec![]).unwrap();
    assert_eq!(got, sym(&interp, "defined"));
}

#[test]
fn metaclass_private_new() {
    let (mut interp, world) = world();
    let class = world.visibility.visibility_change;
    let kind = error_kind(world.instantiate(&mut interp, class, vec![]));
    assert!(matches!(
        kind,
        EvalErrorKind::VisibilityViolation {
            visibility: Visibility::Private,
            ..
        }
    ));

    let new = sym(&interp, "new");
    let made = call(&mut interp, &Value::Class(class), "send", vec![new]).unwrap();
    assert!(interp.model().is_instance_of(&made, class));
}

#[test]
fn private_class_method_needs_implicit_receiver() {
    let (mut interp, world) = world();
    let methods = Value::Class(world.visibility.methods);
    let kind = error_kind(call(&mut interp, &methods, "shichi", vec![]));
    assert!(matches!(kind, EvalErrorKind::VisibilityViolation { .. }));

    // `def self.shi` inside a private section stays public.
    assert_eq!(call(&mut interp, &methods, "shi", vec![]).unwrap(), Value::Nil);
}

fn private_fixture(interp: &mut Interpreter, name: &str) -> Value {
    let class = interp
        .with_class("Generated", None, |b| {
            b.private().def(name, |_, _| Ok(Value::int(1)));
            Ok(())
        })
        .unwrap();
    interp
        .call_named(&Value::Class(class), "new", CallMode::Explicit, vec![], None)
        .unwrap()
}

proptest! {
    #[test]
    fn private_names_reject_explicit_calls(name in "[a-z][a-z_]{0,8}") {
        let mut interp = Interpreter::new();
        let object = private_fixture(&mut interp, &name);
        let explicit = interp.call_named(&object, &name, CallMode::Explicit, vec![], None);
        let is_violation = matches!(
            error_kind(explicit),
            EvalErrorKind::VisibilityViolation { .. }
        );
        prop_assert!(is_violation);

        let sent = interp.call_named(&object, &name, CallMode::Send, vec![], None);
        prop_assert_eq!(sent.ok(), Some(Value::int(1)));
    }
}
