//! Built-in methods of the core classes.
//!
//! Every built-in runs in a primitive frame, so `block_given?`, `binding`
//! and protected/private checks made from inside one answer for the caller.

use std::rc::Rc;

use mote_ir::Name;

use crate::closure::{Binding, Closure, ClosureKind};
use crate::errors::{
    arity_mismatch, custom, no_method, type_mismatch, undefined_variable, ControlAction, EvalError,
    EvalResult,
};
use crate::method_table::{native_fn, MethodBody, TableOwner, Visibility};
use crate::object_model::{ClassId, ClassKind, ObjectModel};
use crate::value::Value;

use super::{CallMode, Interpreter, Invocation};

pub(super) fn register(interp: &mut Interpreter) {
    let core = *interp.model.core();
    register_basic_object(interp, core.basic_object);
    register_kernel(interp, core.kernel);
    register_module(interp, core.module);
    register_class(interp, core.class);
    register_proc(interp, core.proc_);
    register_binding(interp, core.binding);
}

fn define(
    interp: &mut Interpreter,
    owner: TableOwner,
    name: &str,
    visibility: Visibility,
    f: impl Fn(&mut Interpreter, Invocation) -> EvalResult + 'static,
) {
    let name = interp.intern(name);
    interp.model.define_method(
        owner,
        name,
        visibility,
        MethodBody::Native {
            func: native_fn(f),
            primitive: true,
        },
    );
}

/// Private instance method that is also public on the module object, so
/// both `lambda { }` and `Kernel.lambda { }` work.
fn module_function(
    interp: &mut Interpreter,
    module: ClassId,
    name: &str,
    f: impl Fn(&mut Interpreter, Invocation) -> EvalResult + 'static,
) {
    let func = native_fn(f);
    let name = interp.intern(name);
    interp.model.define_method(
        TableOwner::Module(module),
        name,
        Visibility::Private,
        MethodBody::Native {
            func: Rc::clone(&func),
            primitive: true,
        },
    );
    interp.model.define_method(
        TableOwner::Meta(module),
        name,
        Visibility::Public,
        MethodBody::Native {
            func,
            primitive: true,
        },
    );
}

fn symbols(names: Vec<Name>) -> Value {
    Value::array(names.into_iter().map(Value::symbol).collect())
}

// BasicObject

fn register_basic_object(interp: &mut Interpreter, class: ClassId) {
    let owner = TableOwner::Module(class);
    define(interp, owner, "initialize", Visibility::Private, |_, _| Ok(Value::Nil));
    define(interp, owner, "method_missing", Visibility::Private, |interp, inv| {
        let name = interp.expect_name(&inv.arg(0))?;
        let err = no_method(interp.name_str(name), &interp.inspect(&inv.receiver));
        Err(interp.fail(err))
    });
    define(interp, owner, "respond_to_missing?", Visibility::Private, |_, _| {
        Ok(Value::Bool(false))
    });
    define(interp, owner, "__send__", Visibility::Public, |interp, inv| {
        send(interp, inv, CallMode::Send)
    });
    define(interp, owner, "equal?", Visibility::Public, |_, inv| {
        Ok(Value::bool(inv.receiver.is_identical(&inv.arg(0))))
    });
    define(interp, owner, "==", Visibility::Public, |_, inv| {
        Ok(Value::bool(inv.receiver == inv.arg(0)))
    });
    define(interp, owner, "!", Visibility::Public, |_, inv| {
        Ok(Value::bool(!inv.receiver.is_truthy()))
    });
}

fn send(interp: &mut Interpreter, inv: Invocation, mode: CallMode) -> EvalResult {
    let Invocation {
        receiver,
        mut args,
        block,
    } = inv;
    if args.is_empty() {
        let label = if mode == CallMode::PublicSend { "public_send" } else { "send" };
        return Err(interp.fail(arity_mismatch(label, 1, 0)));
    }
    let name = interp.expect_name(&args.remove(0))?;
    interp.call(&receiver, name, mode, args, block)
}

// Kernel

fn register_kernel(interp: &mut Interpreter, kernel: ClassId) {
    let owner = TableOwner::Module(kernel);
    let public = Visibility::Public;

    define(interp, owner, "send", public, |interp, inv| send(interp, inv, CallMode::Send));
    define(interp, owner, "public_send", public, |interp, inv| {
        send(interp, inv, CallMode::PublicSend)
    });
    define(interp, owner, "respond_to?", public, |interp, inv| {
        inv.expect_arity_range(interp, "respond_to?", 1, 2)?;
        let name = interp.expect_name(&inv.arg(0))?;
        let include_all = inv.arg(1).is_truthy();
        Ok(Value::bool(interp.respond_to(&inv.receiver, name, include_all)?))
    });
    define(interp, owner, "class", public, |interp, inv| {
        Ok(Value::Class(interp.model.class_of(&inv.receiver)))
    });
    for name in ["is_a?", "kind_of?"] {
        define(interp, owner, name, public, |interp, inv| {
            let module = interp.expect_class(&inv.arg(0))?;
            Ok(Value::bool(interp.model.is_kind_of(&inv.receiver, module)))
        });
    }
    define(interp, owner, "instance_of?", public, |interp, inv| {
        let class = interp.expect_class(&inv.arg(0))?;
        Ok(Value::bool(interp.model.is_instance_of(&inv.receiver, class)))
    });
    define(interp, owner, "instance_variable_get", public, |interp, inv| {
        let name = interp.expect_name(&inv.arg(0))?;
        Ok(interp.model.ivar_get(&inv.receiver, name))
    });
    define(interp, owner, "instance_variable_set", public, |interp, inv| {
        inv.expect_arity(interp, "instance_variable_set", 2)?;
        let name = interp.expect_name(&inv.arg(0))?;
        let value = inv.arg(1);
        interp
            .model
            .ivar_set(&inv.receiver, name, value.clone())
            .map_err(|e| interp.fail(e))?;
        Ok(value)
    });
    define(interp, owner, "extend", public, |interp, inv| {
        for module in inv.args.iter().rev() {
            let module = interp.expect_class(module)?;
            interp
                .model
                .extend_object(&inv.receiver, module)
                .map_err(|e| interp.fail(e))?;
        }
        Ok(inv.receiver)
    });
    define(interp, owner, "define_singleton_method", public, |interp, inv| {
        let name = interp.expect_name(&inv.arg(0))?;
        let Some(block) = inv.block else {
            return Err(interp.fail(custom("tried to create Proc object without a block")));
        };
        let owner = interp
            .model
            .singleton_owner(&inv.receiver)
            .map_err(|e| interp.fail(e))?;
        let body = MethodBody::Closure(block.with_kind(ClosureKind::Method));
        interp
            .model
            .define_method(owner, name, Visibility::Public, body);
        Ok(Value::symbol(name))
    });
    define(interp, owner, "singleton_methods", public, |interp, inv| {
        Ok(symbols(interp.model.singleton_methods(&inv.receiver)))
    });
    define(interp, owner, "dup", public, |interp, inv| copy(interp, inv, false));
    define(interp, owner, "clone", public, |interp, inv| copy(interp, inv, true));
    define(interp, owner, "object_id", public, |interp, inv| object_id(interp, &inv.receiver));
    for name in ["inspect", "to_s"] {
        define(interp, owner, name, public, |interp, inv| {
            Ok(Value::string(interp.inspect(&inv.receiver)))
        });
    }

    let private = Visibility::Private;
    define(interp, owner, "initialize_copy", private, |_, _| Ok(Value::Nil));
    define(interp, owner, "initialize_dup", private, |interp, inv| {
        let hook = interp.names.initialize_copy;
        interp.call(&inv.receiver, hook, CallMode::Send, inv.args, None)
    });
    define(interp, owner, "initialize_clone", private, |interp, inv| {
        let hook = interp.names.initialize_copy;
        interp.call(&inv.receiver, hook, CallMode::Send, inv.args, None)
    });

    module_function(interp, kernel, "block_given?", |interp, _| {
        Ok(Value::bool(interp.block_given()))
    });
    module_function(interp, kernel, "binding", |interp, _| {
        Ok(Value::binding(interp.capture_binding()))
    });
    module_function(interp, kernel, "proc", |interp, inv| match inv.block {
        Some(block) => Ok(Value::proc(block)),
        None => Err(interp.fail(custom("tried to create Proc object without a block"))),
    });
    module_function(interp, kernel, "lambda", |interp, inv| match inv.block {
        Some(block) => Ok(Value::proc(block.with_kind(ClosureKind::Lambda))),
        None => Err(interp.fail(custom("tried to create Proc object without a block"))),
    });
}

/// `dup` / `clone`: copy, then run the copy's initialization hook with the
/// original as argument.
fn copy(interp: &mut Interpreter, inv: Invocation, with_singleton: bool) -> EvalResult {
    // Immediates and shared values copy as themselves.
    let Some(source) = inv.receiver.as_object() else {
        return Ok(inv.receiver);
    };
    let copy = Value::Object(interp.model.copy_object(source, with_singleton));
    let hook = if with_singleton {
        interp.names.initialize_clone
    } else {
        interp.names.initialize_dup
    };
    interp.call(&copy, hook, CallMode::Send, vec![inv.receiver], None)?;
    Ok(copy)
}

/// Stable per-object integer. Immediates use fixed encodings so they never
/// collide with allocated objects.
fn object_id(interp: &Interpreter, value: &Value) -> EvalResult {
    let id = match value {
        Value::Bool(false) => 0,
        Value::Nil => 8,
        Value::Bool(true) => 20,
        Value::Int(n) => n.wrapping_mul(2).wrapping_add(1),
        Value::Object(id) => 16 * i64::from(id.raw()) + 32,
        Value::Class(id) => 16 * i64::from(id.raw()) + 40,
        other => return Err(interp.fail(type_mismatch("object", other.type_name()))),
    };
    Ok(Value::int(id))
}

// Module

fn register_module(interp: &mut Interpreter, module: ClassId) {
    let owner = TableOwner::Module(module);
    let public = Visibility::Public;

    for name in ["name", "to_s", "inspect"] {
        define(interp, owner, name, public, |interp, inv| {
            let class = interp.expect_class(&inv.receiver)?;
            Ok(Value::string(interp.model.class_name(class)))
        });
    }
    define(interp, owner, "ancestors", public, |interp, inv| {
        let class = interp.expect_class(&inv.receiver)?;
        let ancestors = interp.model.ancestors(class).iter().copied().map(Value::Class);
        Ok(Value::array(ancestors.collect()))
    });
    define(interp, owner, "include?", public, |interp, inv| {
        let class = interp.expect_class(&inv.receiver)?;
        let module = interp.expect_class(&inv.arg(0))?;
        let included = module != class
            && interp.model.node(module).kind() == ClassKind::Module
            && interp.model.inherits(class, module);
        Ok(Value::bool(included))
    });
    define(interp, owner, "include", public, |interp, inv| {
        let class = interp.expect_class(&inv.receiver)?;
        for module in inv.args.iter().rev() {
            let module = interp.expect_class(module)?;
            interp
                .model
                .include_module(class, module)
                .map_err(|e| interp.fail(e))?;
        }
        Ok(inv.receiver)
    });
    define(interp, owner, "===", public, |interp, inv| {
        let class = interp.expect_class(&inv.receiver)?;
        Ok(Value::bool(interp.model.is_kind_of(&inv.arg(0), class)))
    });
    define(interp, owner, "instance_methods", public, |interp, inv| {
        let class = interp.expect_class(&inv.receiver)?;
        let inherited = inv.args.first().map_or(true, Value::is_truthy);
        Ok(symbols(interp.model.instance_methods(class, inherited)))
    });

    let defined_queries: [(&str, fn(Visibility) -> bool); 4] = [
        ("method_defined?", |v| v != Visibility::Private),
        ("public_method_defined?", |v| v == Visibility::Public),
        ("protected_method_defined?", |v| v == Visibility::Protected),
        ("private_method_defined?", |v| v == Visibility::Private),
    ];
    for (label, accepts) in defined_queries {
        define(interp, owner, label, public, move |interp, inv| {
            let class = interp.expect_class(&inv.receiver)?;
            let name = interp.expect_name(&inv.arg(0))?;
            let visible = interp.model.method_visibility(class, name).is_some_and(accepts);
            Ok(Value::bool(visible))
        });
    }

    define(interp, owner, "define_method", public, |interp, inv| {
        let class = interp.expect_class(&inv.receiver)?;
        let name = interp.expect_name(&inv.arg(0))?;
        let body = match (inv.block, inv.args.get(1)) {
            (Some(block), _) => block,
            (None, Some(Value::Proc(closure))) => closure.clone(),
            _ => return Err(interp.fail(custom("tried to create Proc object without a block"))),
        };
        let body = MethodBody::Closure(body.with_kind(ClosureKind::Method));
        interp
            .model
            .define_method(TableOwner::Module(class), name, Visibility::Public, body);
        Ok(Value::symbol(name))
    });
    define(interp, owner, "alias_method", public, |interp, inv| {
        inv.expect_arity(interp, "alias_method", 2)?;
        let class = interp.expect_class(&inv.receiver)?;
        let new = interp.expect_name(&inv.arg(0))?;
        let old = interp.expect_name(&inv.arg(1))?;
        interp
            .model
            .alias_method(TableOwner::Module(class), new, old)
            .map_err(|e| interp.fail(e))?;
        Ok(Value::symbol(new))
    });
    define(interp, owner, "undef_method", public, |interp, inv| {
        for_each_name(interp, &inv, |model, class, name| {
            model.undefine_method(TableOwner::Module(class), name)
        })
    });
    define(interp, owner, "remove_method", public, |interp, inv| {
        for_each_name(interp, &inv, |model, class, name| {
            model.remove_method(TableOwner::Module(class), name)
        })
    });

    let directives = [
        ("public", Visibility::Public, false),
        ("protected", Visibility::Protected, false),
        ("private", Visibility::Private, false),
        ("public_class_method", Visibility::Public, true),
        ("private_class_method", Visibility::Private, true),
    ];
    for (label, visibility, meta) in directives {
        define(interp, owner, label, Visibility::Private, move |interp, inv| {
            if inv.args.is_empty() && !meta {
                return Err(interp.fail(custom(format!(
                    "`{label}` without arguments only applies inside a class body section"
                ))));
            }
            for_each_name(interp, &inv, |model, class, name| {
                let table = if meta {
                    TableOwner::Meta(class)
                } else {
                    TableOwner::Module(class)
                };
                model.set_visibility(table, name, visibility)
            })
        });
    }
}

/// Apply `op` to the receiver class and each symbol argument. Returns the
/// receiver.
fn for_each_name(
    interp: &mut Interpreter,
    inv: &Invocation,
    op: impl Fn(&mut ObjectModel, ClassId, Name) -> Result<(), EvalError>,
) -> EvalResult {
    let class = interp.expect_class(&inv.receiver)?;
    for arg in &inv.args {
        let name = interp.expect_name(arg)?;
        op(&mut interp.model, class, name).map_err(|e| interp.fail(e))?;
    }
    Ok(inv.receiver.clone())
}

// Class

fn register_class(interp: &mut Interpreter, class: ClassId) {
    let owner = TableOwner::Module(class);
    define(interp, owner, "new", Visibility::Public, |interp, inv| {
        let class = interp.expect_class(&inv.receiver)?;
        let object = interp.model.allocate(class).map_err(|e| interp.fail(e))?;
        let initialize = interp.names.initialize;
        interp.call(&object, initialize, CallMode::Send, inv.args, inv.block)?;
        Ok(object)
    });
    define(interp, owner, "allocate", Visibility::Public, |interp, inv| {
        let class = interp.expect_class(&inv.receiver)?;
        interp.model.allocate(class).map_err(|e| interp.fail(e))
    });
    define(interp, owner, "superclass", Visibility::Public, |interp, inv| {
        let class = interp.expect_class(&inv.receiver)?;
        Ok(interp
            .model
            .superclass(class)
            .map_or(Value::Nil, Value::Class))
    });
}

// Proc

fn register_proc(interp: &mut Interpreter, class: ClassId) {
    let owner = TableOwner::Module(class);
    let public = Visibility::Public;

    for name in ["call", "yield", "()", "[]"] {
        define(interp, owner, name, public, |interp, inv| {
            let closure = expect_proc(interp, &inv.receiver)?;
            interp.call_closure(&closure, inv.args, inv.block)
        });
    }
    define(interp, owner, "lambda?", public, |interp, inv| {
        Ok(Value::bool(expect_proc(interp, &inv.receiver)?.is_lambda()))
    });
    define(interp, owner, "arity", public, |interp, inv| {
        let params = expect_proc(interp, &inv.receiver)?.params().len();
        Ok(Value::int(i64::try_from(params).unwrap_or(i64::MAX)))
    });
    define(interp, owner, "binding", public, |interp, inv| {
        let closure = expect_proc(interp, &inv.receiver)?;
        Ok(Value::binding(closure.binding().clone()))
    });
    define(interp, owner, "to_proc", public, |_, inv| Ok(inv.receiver));
}

fn expect_proc(
    interp: &Interpreter,
    value: &Value,
) -> Result<Closure, ControlAction> {
    value
        .as_proc()
        .cloned()
        .ok_or_else(|| interp.fail(type_mismatch("Proc", value.type_name())))
}

// Binding

fn register_binding(interp: &mut Interpreter, class: ClassId) {
    let owner = TableOwner::Module(class);
    let public = Visibility::Public;

    define(interp, owner, "local_variable_get", public, |interp, inv| {
        let binding = expect_binding(interp, &inv.receiver)?;
        let name = interp.expect_name(&inv.arg(0))?;
        binding
            .local_variable_get(name)
            .ok_or_else(|| interp.fail(undefined_variable(interp.name_str(name))))
    });
    define(interp, owner, "local_variable_set", public, |interp, inv| {
        inv.expect_arity(interp, "local_variable_set", 2)?;
        let binding = expect_binding(interp, &inv.receiver)?;
        let name = interp.expect_name(&inv.arg(0))?;
        let value = inv.arg(1);
        binding.local_variable_set(name, value.clone());
        Ok(value)
    });
    define(interp, owner, "local_variable_defined?", public, |interp, inv| {
        let binding = expect_binding(interp, &inv.receiver)?;
        let name = interp.expect_name(&inv.arg(0))?;
        Ok(Value::bool(binding.local_variable_defined(name)))
    });
    define(interp, owner, "local_variables", public, |interp, inv| {
        let binding = expect_binding(interp, &inv.receiver)?;
        Ok(symbols(binding.local_variables()))
    });
    define(interp, owner, "receiver", public, |interp, inv| {
        Ok(expect_binding(interp, &inv.receiver)?.receiver().clone())
    });
    define(interp, owner, "source_location", public, |interp, inv| {
        let tag = expect_binding(interp, &inv.receiver)?.tag();
        Ok(Value::array(vec![
            Value::string(interp.name_str(tag.file)),
            Value::int(i64::from(tag.line)),
        ]))
    });
}

fn expect_binding(
    interp: &Interpreter,
    value: &Value,
) -> Result<Binding, ControlAction> {
    value
        .as_binding()
        .cloned()
        .ok_or_else(|| interp.fail(type_mismatch("Binding", value.type_name())))
}
