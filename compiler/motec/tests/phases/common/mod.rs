//! Shared helpers for phase tests.

use mote_eval::{
    CallMode, ClassId, Closure, ControlAction, EvalErrorKind, EvalResult, Interpreter, Value,
};
use motec::{install, World};

/// Fresh interpreter with the fixture world installed.
pub fn world() -> (Interpreter, World) {
    let mut interp = Interpreter::new();
    let world = install(&mut interp).unwrap();
    (interp, world)
}

pub fn sym(interp: &Interpreter, name: &str) -> Value {
    Value::symbol(interp.intern(name))
}

/// `receiver.name(*args)` from top level.
pub fn call(interp: &mut Interpreter, receiver: &Value, name: &str, args: Vec<Value>) -> EvalResult {
    interp.call_named(receiver, name, CallMode::Explicit, args, None)
}

/// `receiver.name(*args) { block }` from top level.
pub fn call_with_block(
    interp: &mut Interpreter,
    receiver: &Value,
    name: &str,
    args: Vec<Value>,
    block: &Closure,
) -> EvalResult {
    interp.call_named(receiver, name, CallMode::Explicit, args, Some(block.clone()))
}

pub fn new(interp: &mut Interpreter, world: &World, class: ClassId) -> Value {
    world.instantiate(interp, class, vec![]).unwrap()
}

/// Kind of the error `result` failed with.
pub fn error_kind(result: EvalResult) -> EvalErrorKind {
    match result {
        Err(ControlAction::Error(e)) => e.kind,
        other => panic!("expected an error, got {other:?}"),
    }
}

pub fn symbols(interp: &Interpreter, names: &[&str]) -> Value {
    Value::array(names.iter().map(|n| sym(interp, n)).collect())
}
