use super::*;
use crate::closure::ClosureKind;
use crate::errors::EvalErrorKind;
use crate::method_table::{TableOwner, Visibility};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

fn error_kind(result: EvalResult) -> EvalErrorKind {
    match result {
        Err(ControlAction::Error(e)) => e.kind,
        other => panic!("expected an error, got {other:?}"),
    }
}

fn new_object(interp: &mut Interpreter, class: ClassId) -> Value {
    interp
        .call_named(&Value::Class(class), "new", CallMode::Explicit, vec![], None)
        .unwrap()
}

fn send0(interp: &mut Interpreter, receiver: &Value, name: &str) -> EvalResult {
    interp.call_named(receiver, name, CallMode::Explicit, vec![], None)
}

fn sym(interp: &Interpreter, s: &str) -> Value {
    Value::symbol(interp.intern(s))
}

// Non-local return

#[test]
fn test_proc_return_leaves_home_method() {
    let mut interp = Interpreter::new();
    let class = interp
        .with_class("Runner", None, |b| {
            b.def("run", |interp, _| {
                let early = interp.make_proc(&[], |interp, _| interp.return_value(Value::int(10)));
                interp.call_closure(&early, vec![], None)?;
                Ok(Value::int(99))
            });
            Ok(())
        })
        .unwrap();
    let obj = new_object(&mut interp, class);
    assert_eq!(send0(&mut interp, &obj, "run").unwrap(), Value::int(10));
    assert_eq!(interp.call_stack().depth(), 0);
}

#[test]
fn test_lambda_return_leaves_only_the_lambda() {
    let mut interp = Interpreter::new();
    let class = interp
        .with_class("Runner", None, |b| {
            b.def("run", |interp, _| {
                let inner = interp.make_lambda(&[], |interp, _| interp.return_value(Value::int(1)));
                let got = interp.call_closure(&inner, vec![], None)?;
                Ok(Value::array(vec![got, Value::int(2)]))
            });
            Ok(())
        })
        .unwrap();
    let obj = new_object(&mut interp, class);
    assert_eq!(
        send0(&mut interp, &obj, "run").unwrap(),
        Value::array(vec![Value::int(1), Value::int(2)])
    );
}

#[test]
fn test_proc_return_crosses_lambda_and_builtin_frames() {
    let mut interp = Interpreter::new();
    let class = interp
        .with_class("Courier", None, |b| {
            b.def("run", |interp, _| {
                let good = sym(interp, "good");
                let escape = interp.make_proc(&[], move |interp, _| interp.return_value(good.clone()));
                let relay = interp.make_lambda(&["inner"], |interp, _| {
                    let inner = interp.lookup_var("inner")?;
                    interp.call_named(&inner, "call", CallMode::Explicit, vec![], None)?;
                    Ok(sym(interp, "bad"))
                });
                interp.call_named(
                    &Value::proc(relay),
                    "call",
                    CallMode::Explicit,
                    vec![Value::proc(escape)],
                    None,
                )?;
                Ok(sym(interp, "worse"))
            });
            Ok(())
        })
        .unwrap();
    let obj = new_object(&mut interp, class);
    let good = sym(&interp, "good");
    assert_eq!(send0(&mut interp, &obj, "run").unwrap(), good);
}

#[test]
fn test_return_to_finished_frame_is_dead_closure_jump() {
    let mut interp = Interpreter::new();
    let class = interp
        .with_class("Factory", None, |b| {
            b.def("make", |interp, _| {
                let escape = interp.make_proc(&[], |interp, _| interp.return_value(Value::int(1)));
                Ok(Value::proc(escape))
            });
            Ok(())
        })
        .unwrap();
    let obj = new_object(&mut interp, class);
    let escape = send0(&mut interp, &obj, "make").unwrap();
    let result = send0(&mut interp, &escape, "call");
    let err = match result {
        Err(ControlAction::Error(e)) => e,
        other => panic!("expected error, got {other:?}"),
    };
    assert!(matches!(err.kind, EvalErrorKind::DeadClosureJump { .. }));
    assert!(err.is_fatal());
}

#[test]
fn test_return_at_top_level_ends_run() {
    let mut interp = Interpreter::new();
    let got = interp.eval_top_level(|interp| {
        interp.return_value(Value::int(5))?;
        Ok(Value::int(0))
    });
    assert_eq!(got.unwrap(), Value::int(5));
}

#[test]
fn test_next_leaves_block_only() {
    let mut interp = Interpreter::new();
    let skip_two = interp.make_proc(&["n"], |interp, inv| {
        if inv.arg(0) == Value::int(2) {
            return interp.next_value(Value::int(20));
        }
        Ok(inv.arg(0))
    });
    let results: Vec<Value> = (1..=3)
        .map(|n| interp.call_closure(&skip_two, vec![Value::int(n)], None).unwrap())
        .collect();
    assert_eq!(results, vec![Value::int(1), Value::int(20), Value::int(3)]);
}

#[test]
fn test_next_in_method_does_not_leave_calling_block() {
    let mut interp = Interpreter::new();
    let class = interp
        .with_class("Skipper", None, |b| {
            b.def("skip", |interp, _| interp.next_value(Value::int(1)));
            Ok(())
        })
        .unwrap();
    let obj = new_object(&mut interp, class);
    let block = interp.make_proc(&[], move |interp, _| {
        assert!(send0(interp, &obj, "skip").is_err());
        Ok(Value::int(2))
    });
    assert_eq!(interp.call_closure(&block, vec![], None).unwrap(), Value::int(2));

    let fresh = new_object(&mut interp, class);
    let direct = send0(&mut interp, &fresh, "skip");
    assert_eq!(
        error_kind(direct),
        EvalErrorKind::Custom {
            message: "next used outside of a block".to_string()
        }
    );
}

#[test]
fn test_ensure_runs_while_unwinding() {
    let mut interp = Interpreter::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let class = interp
        .with_class("Guarded", None, move |b| {
            b.def("run", move |interp, _| {
                let escape = interp.make_proc(&[], |interp, _| interp.return_value(Value::int(3)));
                let sink = Rc::clone(&sink);
                interp.ensure(
                    |interp| {
                        interp.call_closure(&escape, vec![], None)?;
                        Ok(Value::int(0))
                    },
                    move |_| {
                        sink.borrow_mut().push("cleanup");
                        Ok(())
                    },
                )
            });
            Ok(())
        })
        .unwrap();
    let obj = new_object(&mut interp, class);
    assert_eq!(send0(&mut interp, &obj, "run").unwrap(), Value::int(3));
    assert_eq!(*log.borrow(), vec!["cleanup"]);
}

// Closures and bindings

#[test]
fn test_closure_mutates_captured_variable() {
    let mut interp = Interpreter::new();
    interp.define_var("total", Value::int(1));
    let add = interp.make_proc(&["n"], |interp, inv| {
        let total = interp.lookup_var("total")?.as_int().unwrap_or(0);
        let n = inv.arg(0).as_int().unwrap_or(0);
        interp.set_var("total", Value::int(total + n));
        Ok(Value::Nil)
    });
    interp.call_closure(&add, vec![Value::int(4)], None).unwrap();
    interp.call_closure(&add, vec![Value::int(5)], None).unwrap();
    assert_eq!(interp.lookup_var("total").unwrap(), Value::int(10));
}

#[test]
fn test_block_params_are_local_to_the_call() {
    let mut interp = Interpreter::new();
    let echo = interp.make_proc(&["param"], |_, inv| Ok(inv.arg(0)));
    interp.call_closure(&echo, vec![Value::int(1)], None).unwrap();
    assert!(interp.lookup_var("param").is_err());
}

#[test]
fn test_proc_arity_is_lenient_lambda_is_strict() {
    let mut interp = Interpreter::new();
    let pair = |interp: &mut Interpreter, _: Invocation| -> EvalResult {
        let a = interp.lookup_var("a")?;
        let b = interp.lookup_var("b")?;
        Ok(Value::array(vec![a, b]))
    };
    let lenient = interp.make_proc(&["a", "b"], pair);
    let strict = interp.make_lambda(&["a", "b"], pair);

    let short = interp.call_closure(&lenient, vec![Value::int(1)], None).unwrap();
    assert_eq!(short, Value::array(vec![Value::int(1), Value::Nil]));
    let long = interp
        .call_closure(&lenient, vec![Value::int(1), Value::int(2), Value::int(3)], None)
        .unwrap();
    assert_eq!(long, Value::array(vec![Value::int(1), Value::int(2)]));
    let splat = interp
        .call_closure(&lenient, vec![Value::array(vec![Value::int(7), Value::int(8)])], None)
        .unwrap();
    assert_eq!(splat, Value::array(vec![Value::int(7), Value::int(8)]));

    let kind = error_kind(interp.call_closure(&strict, vec![Value::int(1)], None));
    assert_eq!(
        kind,
        EvalErrorKind::ArityMismatch {
            name: "block".to_string(),
            expected: 2,
            got: 1,
        }
    );
}

#[test]
fn test_binding_shares_scope_with_capturer() {
    let mut interp = Interpreter::new();
    interp.define_var("x", Value::int(1));
    let binding = interp.capture_binding();
    interp
        .invoke_closure(&binding, |interp| {
            interp.set_var("x", Value::int(2));
            Ok(Value::Nil)
        })
        .unwrap();
    assert_eq!(interp.lookup_var("x").unwrap(), Value::int(2));

    interp.set_var("x", Value::int(3));
    let x = interp.intern("x");
    assert_eq!(binding.local_variable_get(x), Some(Value::int(3)));
}

#[test]
fn test_kernel_binding_captures_caller() {
    let mut interp = Interpreter::new();
    let class = interp
        .with_class("Capturer", None, |b| {
            b.def("capture", |interp, _| {
                interp.define_var("secret", Value::int(42));
                interp.call_self("binding", vec![], None)
            });
            Ok(())
        })
        .unwrap();
    let obj = new_object(&mut interp, class);
    let binding = send0(&mut interp, &obj, "capture").unwrap();

    let secret = sym(&interp, "secret");
    let got = interp
        .call_named(&binding, "local_variable_get", CallMode::Explicit, vec![secret.clone()], None)
        .unwrap();
    assert_eq!(got, Value::int(42));
    assert_eq!(send0(&mut interp, &binding, "receiver").unwrap(), obj);

    interp
        .call_named(
            &binding,
            "local_variable_set",
            CallMode::Explicit,
            vec![secret.clone(), Value::int(7)],
            None,
        )
        .unwrap();
    let defined = interp
        .call_named(&binding, "local_variable_defined?", CallMode::Explicit, vec![secret], None)
        .unwrap();
    assert_eq!(defined, Value::Bool(true));
    let again = binding.as_binding().unwrap().local_variable_get(interp.intern("secret"));
    assert_eq!(again, Some(Value::int(7)));
}

#[test]
fn test_binding_eval_runs_as_receiver() {
    let mut interp = Interpreter::new();
    let class = interp.define_class("Host", None).unwrap();
    let obj = new_object(&mut interp, class);
    let binding = crate::closure::Binding::new(
        interp.env.current_scope(),
        obj.clone(),
        crate::block_context::FrameId::TOP_LEVEL,
        None,
        mote_ir::SourceTag::UNKNOWN,
    );
    let seen = interp
        .invoke_closure(&binding, |interp| Ok(interp.current_self()))
        .unwrap();
    assert_eq!(seen, obj);
}

#[test]
fn test_binding_return_after_method_finished_is_dead() {
    let mut interp = Interpreter::new();
    let class = interp
        .with_class("Leaker", None, |b| {
            b.def("leak", |interp, _| Ok(Value::binding(interp.capture_binding())));
            Ok(())
        })
        .unwrap();
    let obj = new_object(&mut interp, class);
    let leaked = send0(&mut interp, &obj, "leak").unwrap();
    let binding = leaked.as_binding().unwrap().clone();
    let result = interp.invoke_closure(&binding, |interp| interp.return_value(Value::Nil));
    assert!(matches!(
        error_kind(result),
        EvalErrorKind::DeadClosureJump { .. }
    ));
}

// Blocks

fn block_probe(interp: &mut Interpreter) -> ClassId {
    interp
        .with_class("Probe", None, |b| {
            b.def("given", |interp, _| Ok(Value::bool(interp.block_given())));
            b.def("given_via_kernel", |interp, _| {
                let kernel = Value::Class(interp.model().core().kernel);
                interp.call_named(&kernel, "block_given?", CallMode::Explicit, vec![], None)
            });
            b.def("given_via_send", |interp, _| {
                let me = interp.current_self();
                let query = sym(interp, "block_given?");
                interp.call_named(&me, "send", CallMode::Explicit, vec![query], None)
            });
            b.def("nested", |interp, _| interp.call_self("given", vec![], None));
            b.def("twice", |interp, _| {
                let first = interp.yield_block(vec![Value::int(1)])?;
                let second = interp.yield_block(vec![Value::int(2)])?;
                Ok(Value::array(vec![first, second]))
            });
            b.def("keep", |interp, _| {
                Ok(Value::proc(interp.make_proc(&[], |interp, _| {
                    Ok(Value::bool(interp.block_given()))
                })))
            });
            Ok(())
        })
        .unwrap()
}

#[test]
fn test_block_given_per_frame() {
    let mut interp = Interpreter::new();
    let class = block_probe(&mut interp);
    let obj = new_object(&mut interp, class);
    let block = interp.make_proc(&[], |_, _| Ok(Value::Nil));

    for method in ["given", "given_via_kernel", "given_via_send"] {
        let with = interp
            .call_named(&obj, method, CallMode::Explicit, vec![], Some(block.clone()))
            .unwrap();
        assert_eq!(with, Value::Bool(true), "{method} with block");
        let without = send0(&mut interp, &obj, method).unwrap();
        assert_eq!(without, Value::Bool(false), "{method} without block");
    }

    let nested = interp
        .call_named(&obj, "nested", CallMode::Explicit, vec![], Some(block))
        .unwrap();
    assert_eq!(nested, Value::Bool(false));
}

#[test]
fn test_closure_reports_home_block() {
    let mut interp = Interpreter::new();
    let class = block_probe(&mut interp);
    let obj = new_object(&mut interp, class);
    let block = interp.make_proc(&[], |_, _| Ok(Value::Nil));
    let kept = interp
        .call_named(&obj, "keep", CallMode::Explicit, vec![], Some(block))
        .unwrap();
    assert_eq!(send0(&mut interp, &kept, "call").unwrap(), Value::Bool(true));
}

#[test]
fn test_yield_passes_arguments() {
    let mut interp = Interpreter::new();
    let class = block_probe(&mut interp);
    let obj = new_object(&mut interp, class);
    let double = interp.make_proc(&["n"], |_, inv| {
        Ok(Value::int(inv.arg(0).as_int().unwrap_or(0) * 2))
    });
    let got = interp
        .call_named(&obj, "twice", CallMode::Explicit, vec![], Some(double))
        .unwrap();
    assert_eq!(got, Value::array(vec![Value::int(2), Value::int(4)]));

    let kind = error_kind(send0(&mut interp, &obj, "twice"));
    assert_eq!(kind, EvalErrorKind::NoBlockGiven);
}

#[test]
fn test_kernel_lambda_and_proc() {
    let mut interp = Interpreter::new();
    let main = interp.main_object();
    let block = interp.make_proc(&[], |_, _| Ok(Value::Nil));

    let lambda = interp
        .call_named(&main, "lambda", CallMode::Implicit, vec![], Some(block.clone()))
        .unwrap();
    assert_eq!(send0(&mut interp, &lambda, "lambda?").unwrap(), Value::Bool(true));
    let plain = interp
        .call_named(&main, "proc", CallMode::Implicit, vec![], Some(block))
        .unwrap();
    assert_eq!(send0(&mut interp, &plain, "lambda?").unwrap(), Value::Bool(false));

    let missing = interp.call_named(&main, "lambda", CallMode::Implicit, vec![], None);
    assert!(matches!(error_kind(missing), EvalErrorKind::Custom { .. }));

    // Kernel functions are private on instances: an explicit call is only
    // allowed when the receiver is self.
    let on_self = interp.call_named(&main, "lambda", CallMode::Explicit, vec![], None);
    assert!(matches!(error_kind(on_self), EvalErrorKind::Custom { .. }));
    let object = interp.model().core().object;
    let other = new_object(&mut interp, object);
    let explicit = interp.call_named(&other, "lambda", CallMode::Explicit, vec![], None);
    assert!(matches!(
        error_kind(explicit),
        EvalErrorKind::VisibilityViolation { .. }
    ));
}

// Class bodies

#[test]
fn test_define_method_body_is_a_method_closure() {
    let mut interp = Interpreter::new();
    interp.define_var("base", Value::int(10));
    let class = interp
        .with_class("Adder", None, |b| {
            b.define_method("add", &["n"], |interp, inv| {
                let base = interp.lookup_var("base")?.as_int().unwrap_or(0);
                let n = inv.arg(0).as_int().unwrap_or(0);
                Ok(Value::int(base + n))
            });
            b.define_method("block_seen", &[], |interp, _| Ok(Value::bool(interp.block_given())));
            b.define_method("me", &[], |interp, _| Ok(interp.current_self()));
            Ok(())
        })
        .unwrap();
    let obj = new_object(&mut interp, class);
    let sum = interp
        .call_named(&obj, "add", CallMode::Explicit, vec![Value::int(5)], None)
        .unwrap();
    assert_eq!(sum, Value::int(15));
    assert_eq!(send0(&mut interp, &obj, "me").unwrap(), obj);

    let block = interp.make_proc(&[], |_, _| Ok(Value::Nil));
    let seen = interp
        .call_named(&obj, "block_seen", CallMode::Explicit, vec![], Some(block))
        .unwrap();
    assert_eq!(seen, Value::Bool(false));

    let kind = error_kind(send0(&mut interp, &obj, "add"));
    assert_eq!(
        kind,
        EvalErrorKind::ArityMismatch {
            name: "add".to_string(),
            expected: 1,
            got: 0,
        }
    );
}

#[test]
fn test_module_define_method_from_block() {
    let mut interp = Interpreter::new();
    let class = interp.define_class("Open", None).unwrap();
    let body = interp.make_proc(&[], |_, _| Ok(Value::int(3)));
    let name = sym(&interp, "dynamic");
    interp
        .call_named(&Value::Class(class), "define_method", CallMode::Explicit, vec![name], Some(body))
        .unwrap();
    let obj = new_object(&mut interp, class);
    assert_eq!(send0(&mut interp, &obj, "dynamic").unwrap(), Value::int(3));
}

#[test]
fn test_sections_and_singleton_definitions() {
    let mut interp = Interpreter::new();
    let class = interp
        .with_class("Sections", None, |b| {
            b.private();
            b.def("hidden", |_, _| Ok(Value::Nil));
            b.def_singleton("loud", |_, _| Ok(Value::Nil));
            b.meta(|m| {
                m.def("meta_open", |_, _| Ok(Value::Nil));
                m.private().def("meta_hidden", |_, _| Ok(Value::Nil));
                Ok(())
            })?;
            b.public().def("initialize", |_, _| Ok(Value::Nil));
            Ok(())
        })
        .unwrap();
    let model = interp.model();
    let vis = |owner: TableOwner, name: &str| {
        model
            .defined_entries(owner)
            .and_then(|t| t.get(interp.intern(name)))
            .map(|e| e.visibility)
    };
    let module = TableOwner::Module(class);
    let meta = TableOwner::Meta(class);
    assert_eq!(vis(module, "hidden"), Some(Visibility::Private));
    assert_eq!(vis(module, "initialize"), Some(Visibility::Private));
    assert_eq!(vis(meta, "loud"), Some(Visibility::Public));
    assert_eq!(vis(meta, "meta_open"), Some(Visibility::Public));
    assert_eq!(vis(meta, "meta_hidden"), Some(Visibility::Private));
}

#[test]
fn test_private_new_on_metaclass() {
    let mut interp = Interpreter::new();
    let class = interp
        .with_class("Singleton", None, |b| {
            b.meta(|m| {
                m.set_visibility(Visibility::Private, &["new"])?;
                Ok(())
            })?;
            b.def_singleton("instance", |interp, inv| {
                interp.call_named(&inv.receiver, "new", CallMode::Implicit, vec![], None)
            });
            Ok(())
        })
        .unwrap();
    let receiver = Value::Class(class);
    let direct = send0(&mut interp, &receiver, "new");
    assert!(matches!(
        error_kind(direct),
        EvalErrorKind::VisibilityViolation { .. }
    ));
    let made = send0(&mut interp, &receiver, "instance").unwrap();
    assert!(interp.model().is_instance_of(&made, class));
}

#[test]
fn test_visibility_directive_needs_names() {
    let mut interp = Interpreter::new();
    let class = interp
        .with_class("Directed", None, |b| {
            b.def("shown", |_, _| Ok(Value::int(1)));
            Ok(())
        })
        .unwrap();
    let receiver = Value::Class(class);
    for directive in ["public", "protected", "private"] {
        let bare = interp.call_named(&receiver, directive, CallMode::Send, vec![], None);
        assert!(matches!(error_kind(bare), EvalErrorKind::Custom { .. }), "{directive}");
    }

    let shown = sym(&interp, "shown");
    interp
        .call_named(&receiver, "private", CallMode::Send, vec![shown], None)
        .unwrap();
    let obj = new_object(&mut interp, class);
    assert!(matches!(
        error_kind(send0(&mut interp, &obj, "shown")),
        EvalErrorKind::VisibilityViolation { .. }
    ));
}

#[test]
fn test_attr_accessor_and_initialize() {
    let mut interp = Interpreter::new();
    let class = interp
        .with_class("Point", None, |b| {
            b.attr_accessor(&["x"]);
            b.def("initialize", |interp, inv| {
                interp.call_named(&inv.receiver, "x=", CallMode::Explicit, vec![inv.arg(0)], None)?;
                Ok(Value::Nil)
            });
            Ok(())
        })
        .unwrap();
    let point = interp
        .call_named(&Value::Class(class), "new", CallMode::Explicit, vec![Value::int(4)], None)
        .unwrap();
    assert_eq!(send0(&mut interp, &point, "x").unwrap(), Value::int(4));
    let ivar = sym(&interp, "@x");
    let raw = interp
        .call_named(&point, "instance_variable_get", CallMode::Explicit, vec![ivar], None)
        .unwrap();
    assert_eq!(raw, Value::int(4));

    let kind = error_kind(send0(&mut interp, &point, "initialize"));
    assert!(matches!(kind, EvalErrorKind::VisibilityViolation { .. }));
}

// Copies

#[test]
fn test_dup_and_clone_run_copy_hooks() {
    let mut interp = Interpreter::new();
    let class = interp
        .with_class("Doc", None, |b| {
            b.def("initialize_copy", |interp, inv| {
                let ivar = interp.intern("@copied_from");
                interp.model_mut().ivar_set(&inv.receiver, ivar, inv.arg(0))?;
                Ok(Value::Nil)
            });
            Ok(())
        })
        .unwrap();
    let original = new_object(&mut interp, class);
    let owner = interp.model().singleton_owner(&original).unwrap();
    let stamp = interp.intern("stamp");
    interp.model_mut().define_method(
        owner,
        stamp,
        Visibility::Public,
        crate::method_table::MethodBody::Native {
            func: crate::method_table::native_fn(|_, _| Ok(Value::int(1))),
            primitive: false,
        },
    );

    let dup = send0(&mut interp, &original, "dup").unwrap();
    let clone = send0(&mut interp, &original, "clone").unwrap();
    let ivar = interp.intern("@copied_from");
    for copy in [&dup, &clone] {
        assert!(!copy.is_identical(&original));
        assert!(interp.model().ivar_get(copy, ivar).is_identical(&original));
    }
    assert!(matches!(
        error_kind(send0(&mut interp, &dup, "stamp")),
        EvalErrorKind::NoMethod { .. }
    ));
    assert_eq!(send0(&mut interp, &clone, "stamp").unwrap(), Value::int(1));
}

#[test]
fn test_dup_of_immediate_is_itself() {
    let mut interp = Interpreter::new();
    assert_eq!(send0(&mut interp, &Value::int(3), "dup").unwrap(), Value::int(3));
}

// Built-ins

#[test]
fn test_reflection_builtins() {
    let mut interp = Interpreter::new();
    let module = interp.define_module("Tagged");
    let class = interp
        .with_class("Thing", None, |b| {
            b.include(module)?;
            Ok(())
        })
        .unwrap();
    let obj = new_object(&mut interp, class);
    let module_value = Value::Class(module);

    let is_a = interp
        .call_named(&obj, "is_a?", CallMode::Explicit, vec![module_value.clone()], None)
        .unwrap();
    assert_eq!(is_a, Value::Bool(true));
    let instance_of = interp
        .call_named(&obj, "instance_of?", CallMode::Explicit, vec![module_value.clone()], None)
        .unwrap();
    assert_eq!(instance_of, Value::Bool(false));
    assert_eq!(send0(&mut interp, &obj, "class").unwrap(), Value::Class(class));

    let included = interp
        .call_named(&Value::Class(class), "include?", CallMode::Explicit, vec![module_value], None)
        .unwrap();
    assert_eq!(included, Value::Bool(true));

    let ancestors = send0(&mut interp, &Value::Class(class), "ancestors").unwrap();
    let names: Vec<String> = ancestors
        .as_array()
        .unwrap()
        .iter()
        .map(|v| interp.inspect(v))
        .collect();
    assert_eq!(names, vec!["Thing", "Tagged", "Object", "Kernel", "BasicObject"]);
}

#[test]
fn test_object_id_is_stable_and_distinct() {
    let mut interp = Interpreter::new();
    let class = interp.define_class("Ided", None).unwrap();
    let a = new_object(&mut interp, class);
    let b = new_object(&mut interp, class);
    let a1 = send0(&mut interp, &a, "object_id").unwrap();
    let a2 = send0(&mut interp, &a, "object_id").unwrap();
    let b1 = send0(&mut interp, &b, "object_id").unwrap();
    assert_eq!(a1, a2);
    assert_ne!(a1, b1);
}

#[test]
fn test_depth_limit_reports_stack_overflow() {
    let mut interp = Interpreter::builder().max_call_depth(Some(16)).build();
    let class = interp
        .with_class("Diver", None, |b| {
            b.def("dive", |interp, _| interp.call_self("dive", vec![], None));
            Ok(())
        })
        .unwrap();
    let obj = new_object(&mut interp, class);
    let kind = error_kind(send0(&mut interp, &obj, "dive"));
    assert_eq!(kind, EvalErrorKind::StackOverflow { depth: 16 });
    assert_eq!(interp.call_stack().depth(), 0);
}

#[test]
fn test_with_kind_changes_only_kind() {
    let interp = Interpreter::new();
    let block = interp.make_proc(&["a"], |_, _| Ok(Value::Nil));
    let lambda = block.with_kind(ClosureKind::Lambda);
    assert!(lambda.is_lambda());
    assert_eq!(lambda.params(), block.params());
    assert!(!block.is_lambda());
}
