//! Non-local return over the `Lambda` fixture and dead home frames.

use mote_eval::{EvalErrorKind, Value};
use pretty_assertions::assert_eq;

use crate::common::{call, error_kind, new, sym, world};

#[test]
fn proc_return_crosses_lambda() {
    let (mut interp, world) = world();
    let lambda = new(&mut interp, &world, world.closures.lambda);
    let via = sym(&interp, "lambda");
    let got = call(&mut interp, &lambda, "outer", vec![via]).unwrap();
    assert_eq!(got, sym(&interp, "good"));
    assert_eq!(interp.call_stack().depth(), 0);
}

#[test]
fn proc_return_crosses_proc() {
    let (mut interp, world) = world();
    let lambda = new(&mut interp, &world, world.closures.lambda);
    let via = sym(&interp, "proc");
    let got = call(&mut interp, &lambda, "outer", vec![via]).unwrap();
    assert_eq!(got, sym(&interp, "good"));
}

#[test]
fn return_into_finished_method_is_fatal() {
    let (mut interp, world) = world();
    let holder = world
        .instantiate(&mut interp, world.closures.binding, vec![Value::int(1)])
        .unwrap();
    let binding = call(&mut interp, &holder, "get_binding", vec![]).unwrap();
    let binding = binding.as_binding().cloned().unwrap();

    let result = interp.invoke_closure(&binding, |interp| interp.return_value(Value::Nil));
    let err = match result {
        Err(mote_eval::ControlAction::Error(e)) => e,
        other => panic!("expected an error, got {other:?}"),
    };
    assert!(matches!(err.kind, EvalErrorKind::DeadClosureJump { .. }));
    assert!(err.is_fatal());
    assert_eq!(interp.call_stack().depth(), 0);
}

#[test]
fn escaped_block_after_home_returned() {
    let (mut interp, world) = world();
    let class = interp
        .with_class("Escaper", None, |b| {
            b.def("make", |interp, _| {
                let inner = new_escape(interp);
                interp.call_self("mp_like", vec![inner], None)
            });
            b.def("mp_like", |_, inv| Ok(inv.arg(0)));
            Ok(())
        })
        .unwrap();
    let escaper = new(&mut interp, &world, class);
    let escaped = call(&mut interp, &escaper, "make", vec![]).unwrap();
    let kind = error_kind(call(&mut interp, &escaped, "call", vec![]));
    assert!(matches!(kind, EvalErrorKind::DeadClosureJump { .. }));
}

fn new_escape(interp: &mut mote_eval::Interpreter) -> Value {
    Value::proc(interp.make_proc(&[], |interp, _| interp.return_value(Value::int(1))))
}
