//! Block context phase tests over the `BlockGiven` family and `EvalTest`.

use mote_eval::{EvalErrorKind, Value};
use motec::fixtures::BlockQuery;
use pretty_assertions::assert_eq;

use crate::common::{call, call_with_block, error_kind, sym, world};

#[test]
fn accept_block_sees_caller_block() {
    let (mut interp, world) = world();
    let block = interp.make_proc(&[], |_, _| Ok(Value::Nil));
    for query in BlockQuery::ALL {
        let module = Value::Class(world.blocks.module(query));
        for method in ["accept_block", "accept_block_as_argument"] {
            let with = call_with_block(&mut interp, &module, method, vec![], &block).unwrap();
            assert_eq!(with, Value::Bool(true), "{query:?} {method}");
            let without = call(&mut interp, &module, method, vec![]).unwrap();
            assert_eq!(without, Value::Bool(false), "{query:?} {method}");
        }
    }
}

#[test]
fn define_method_body_never_sees_caller_block() {
    let (mut interp, world) = world();
    let block = interp.make_proc(&[], |_, _| Ok(Value::Nil));
    for query in BlockQuery::ALL {
        let module = Value::Class(world.blocks.module(query));
        let got = call_with_block(&mut interp, &module, "defined_block", vec![], &block).unwrap();
        assert_eq!(got, Value::Bool(false), "{query:?}");
    }
}

#[test]
fn block_does_not_leak_into_nested_call() {
    let (mut interp, world) = world();
    let module = world.blocks.module(BlockQuery::Direct);
    let class = interp
        .with_class("Forwarder", None, move |b| {
            b.def("forward", move |interp, _| {
                let target = Value::Class(module);
                interp.call_named(&target, "accept_block", mote_eval::CallMode::Explicit, vec![], None)
            });
            Ok(())
        })
        .unwrap();
    let forwarder = world.instantiate(&mut interp, class, vec![]).unwrap();
    let block = interp.make_proc(&[], |_, _| Ok(Value::Nil));
    let got = call_with_block(&mut interp, &forwarder, "forward", vec![], &block).unwrap();
    assert_eq!(got, Value::Bool(false));
}

#[test]
fn yield_reaches_block() {
    let (mut interp, world) = world();
    let eval_test = Value::Class(world.closures.eval_test);
    let block = interp.make_proc(&[], |_, _| Ok(Value::int(5)));
    for method in ["call_yield", "eval_yield_with_binding"] {
        let got = call_with_block(&mut interp, &eval_test, method, vec![], &block).unwrap();
        assert_eq!(got, Value::int(5), "{method}");
    }
}

#[test]
fn yield_without_block_fails() {
    let (mut interp, world) = world();
    let eval_test = Value::Class(world.closures.eval_test);
    for method in ["call_yield", "eval_yield_with_binding"] {
        let kind = error_kind(call(&mut interp, &eval_test, method, vec![]));
        assert_eq!(kind, EvalErrorKind::NoBlockGiven, "{method}");
    }
}

#[test]
fn top_level_has_no_block() {
    let (mut interp, _) = world();
    let main = interp.main_object();
    let query = sym(&interp, "block_given?");
    let got = call(&mut interp, &main, "send", vec![query]).unwrap();
    assert_eq!(got, Value::Bool(false));
}
