//! Bindings captured by the `Binding` and `EvalSpecs` fixtures.

use mote_eval::{Binding, EvalErrorKind, Interpreter, Value};
use pretty_assertions::assert_eq;

use crate::common::{call, error_kind, sym, symbols, world};

/// `KernelSpecs::Binding.new(1).get_binding`, with its holder.
fn captured(interp: &mut Interpreter, world: &motec::World) -> (Value, Value) {
    let holder = world
        .instantiate(interp, world.closures.binding, vec![Value::int(1)])
        .unwrap();
    let binding = call(interp, &holder, "get_binding", vec![]).unwrap();
    (holder, binding)
}

fn as_binding(value: &Value) -> Binding {
    value.as_binding().cloned().unwrap()
}

#[test]
fn binding_sees_locals_defined_after_capture() {
    let (mut interp, world) = world();
    let (_, binding) = captured(&mut interp, &world);
    let locals = call(&mut interp, &binding, "local_variables", vec![]).unwrap();
    assert_eq!(locals, symbols(&interp, &["a", "b"]));

    let b = sym(&interp, "b");
    let got = call(&mut interp, &binding, "local_variable_get", vec![b]).unwrap();
    assert_eq!(got, Value::Bool(true));
}

#[test]
fn binding_receiver_is_capturing_self() {
    let (mut interp, world) = world();
    let (holder, binding) = captured(&mut interp, &world);
    let receiver = call(&mut interp, &binding, "receiver", vec![]).unwrap();
    assert_eq!(receiver, holder);
}

#[test]
fn evaluation_runs_as_receiver() {
    let (mut interp, world) = world();
    let (_, binding) = captured(&mut interp, &world);
    let binding = as_binding(&binding);

    let secret = interp
        .invoke_closure(&binding, |interp| {
            let me = interp.current_self();
            let ivar = sym(interp, "@secret");
            call(interp, &me, "instance_variable_get", vec![ivar])
        })
        .unwrap();
    assert_eq!(secret, Value::int(2));

    // Implicit calls reach the receiver's methods.
    let squared = interp
        .invoke_closure(&binding, |interp| interp.call_self("square", vec![Value::int(3)], None))
        .unwrap();
    assert_eq!(squared, Value::int(9));
}

#[test]
fn writes_through_binding_are_shared() {
    let (mut interp, world) = world();
    let (_, binding) = captured(&mut interp, &world);
    let captured = as_binding(&binding);

    interp
        .invoke_closure(&captured, |interp| {
            interp.set_var("a", Value::int(10));
            interp.define_var("c", Value::int(3));
            Ok(Value::Nil)
        })
        .unwrap();

    let a = sym(&interp, "a");
    let got = call(&mut interp, &binding, "local_variable_get", vec![a]).unwrap();
    assert_eq!(got, Value::int(10));
    let c = sym(&interp, "c");
    let defined = call(&mut interp, &binding, "local_variable_defined?", vec![c]).unwrap();
    assert_eq!(defined, Value::Bool(true));
}

#[test]
fn top_level_capture_sees_later_assignment() {
    let mut interp = Interpreter::new();
    interp.define_var("x", Value::int(1));
    let binding = interp.capture_binding();
    interp.set_var("x", Value::int(2));
    let read = interp
        .invoke_closure(&binding, |interp| interp.lookup_var("x"))
        .unwrap();
    assert_eq!(read, Value::int(2));
}

#[test]
fn missing_local_is_undefined_variable() {
    let (mut interp, world) = world();
    let (_, binding) = captured(&mut interp, &world);
    let nope = sym(&interp, "nope");
    let kind = error_kind(call(&mut interp, &binding, "local_variable_get", vec![nope]));
    assert_eq!(
        kind,
        EvalErrorKind::UndefinedVariable {
            name: "nope".to_string()
        }
    );
}

#[test]
fn foreign_tag_keeps_caller_locals() {
    let (mut interp, world) = world();
    let eval_specs = Value::Class(world.closures.eval_specs);
    let got = call(&mut interp, &eval_specs, "call_eval", vec![]).unwrap();
    assert_eq!(got.as_str(), Some(motec::fixtures::FIXTURE_FILE));
}

#[test]
fn source_location_reports_capture_site() {
    let (mut interp, world) = world();
    let (_, binding) = captured(&mut interp, &world);
    let location = call(&mut interp, &binding, "source_location", vec![]).unwrap();
    let parts = location.as_array().unwrap();
    assert_eq!(parts.len(), 2);
}
