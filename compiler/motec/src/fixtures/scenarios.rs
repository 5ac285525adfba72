//! Named end-to-end runs over the fixture world, shown by `mote demo`.

use mote_eval::{CallMode, Closure, ControlAction, EvalError, EvalResult, Interpreter, Value};

use super::{BlockQuery, World};

/// One named run against a freshly installed world.
pub struct Scenario {
    pub name: &'static str,
    pub summary: &'static str,
    body: fn(&mut Interpreter, &World) -> EvalResult,
}

impl Scenario {
    /// Run at top level. Failures the scenario expects are part of its
    /// value; anything else is returned as the error.
    pub fn run(&self, interp: &mut Interpreter, world: &World) -> Result<Value, EvalError> {
        tracing::debug!(scenario = self.name, "running scenario");
        interp.eval_top_level(|interp| (self.body)(interp, world))
    }
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Every scenario, in presentation order.
pub fn scenarios() -> &'static [Scenario] {
    SCENARIOS
}

static SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "return-through-lambda",
        summary: "a proc's return crosses a lambda frame to its home method",
        body: return_through_lambda,
    },
    Scenario {
        name: "return-through-proc",
        summary: "a proc's return crosses another proc frame to its home method",
        body: return_through_proc,
    },
    Scenario {
        name: "private-explicit",
        summary: "a private method called with an explicit receiver",
        body: private_explicit,
    },
    Scenario {
        name: "send-bypass",
        summary: "send reaches protected and private methods, public_send does not",
        body: send_bypass,
    },
    Scenario {
        name: "alias",
        summary: "an alias in a subclass resolves to the superclass body",
        body: alias,
    },
    Scenario {
        name: "undef-chain",
        summary: "undef_method hides names below the undefining class only",
        body: undef_chain,
    },
    Scenario {
        name: "private-new",
        summary: "a metaclass-private `new`",
        body: private_new,
    },
    Scenario {
        name: "method-tables",
        summary: "singleton and instance method listings for every section",
        body: method_tables,
    },
    Scenario {
        name: "kind-of",
        summary: "kind_of? through included and extended modules",
        body: kind_of,
    },
    Scenario {
        name: "respond-via-missing",
        summary: "respond_to? answered by respond_to_missing?",
        body: respond_via_missing,
    },
    Scenario {
        name: "method-missing",
        summary: "method_missing receives the name and arguments",
        body: method_missing,
    },
    Scenario {
        name: "block-given",
        summary: "block_given? direct, through Kernel, and through send",
        body: block_given,
    },
    Scenario {
        name: "binding-locals",
        summary: "a binding sees locals defined after its capture",
        body: binding_locals,
    },
    Scenario {
        name: "eval-yield",
        summary: "yield inside binding evaluation reaches the method's block",
        body: eval_yield,
    },
    Scenario {
        name: "eval-location",
        summary: "evaluation under a foreign source tag keeps the caller's locals",
        body: eval_location,
    },
    Scenario {
        name: "copy-hooks",
        summary: "dup and clone run initialize_dup, initialize_clone and initialize_copy",
        body: copy_hooks,
    },
];

// Helpers

fn sym(interp: &Interpreter, name: &str) -> Value {
    Value::symbol(interp.intern(name))
}

fn call(interp: &mut Interpreter, receiver: &Value, name: &str, args: Vec<Value>) -> EvalResult {
    interp.call_named(receiver, name, CallMode::Explicit, args, None)
}

fn with_block(
    interp: &mut Interpreter,
    receiver: &Value,
    name: &str,
    block: &Closure,
) -> EvalResult {
    interp.call_named(receiver, name, CallMode::Explicit, vec![], Some(block.clone()))
}

/// Turn an error into its message so expected failures read as values.
fn rescued(result: EvalResult) -> EvalResult {
    match result {
        Err(ControlAction::Error(e)) => Ok(Value::string(e.to_string())),
        other => other,
    }
}

// Scenarios

fn return_through(interp: &mut Interpreter, world: &World, via: &str) -> EvalResult {
    let lambda = world.instantiate(interp, world.closures.lambda, vec![])?;
    let via = sym(interp, via);
    call(interp, &lambda, "outer", vec![via])
}

fn return_through_lambda(interp: &mut Interpreter, world: &World) -> EvalResult {
    return_through(interp, world, "lambda")
}

fn return_through_proc(interp: &mut Interpreter, world: &World) -> EvalResult {
    return_through(interp, world, "proc")
}

fn private_explicit(interp: &mut Interpreter, world: &World) -> EvalResult {
    let a = world.instantiate(interp, world.visibility.a, vec![])?;
    rescued(call(interp, &a, "private_method", vec![]))
}

fn send_bypass(interp: &mut Interpreter, world: &World) -> EvalResult {
    let a = world.instantiate(interp, world.visibility.a, vec![])?;
    let protected = sym(interp, "protected_method");
    let private = sym(interp, "private_method");
    let via_send = call(interp, &a, "send", vec![protected])?;
    let via_send_private = call(interp, &a, "send", vec![private.clone()])?;
    let via_public_send = rescued(call(interp, &a, "public_send", vec![private]))?;
    Ok(Value::array(vec![via_send, via_send_private, via_public_send]))
}

fn alias(interp: &mut Interpreter, world: &World) -> EvalResult {
    let b = world.instantiate(interp, world.visibility.b, vec![])?;
    call(interp, &b, "aliased_pub_method", vec![])
}

fn undef_chain(interp: &mut Interpreter, world: &World) -> EvalResult {
    let mut rows = Vec::new();
    for class in [
        world.visibility.parent,
        world.visibility.child,
        world.visibility.grandchild,
    ] {
        let object = world.instantiate(interp, class, vec![])?;
        let mut row = Vec::new();
        for name in ["parent_method", "another_parent_method", "parent_mixin_method"] {
            let name = sym(interp, name);
            row.push(call(interp, &object, "respond_to?", vec![name])?);
        }
        rows.push(Value::array(row));
    }
    Ok(Value::array(rows))
}

fn private_new(interp: &mut Interpreter, world: &World) -> EvalResult {
    rescued(world.instantiate(interp, world.visibility.visibility_change, vec![]))
}

fn method_tables(interp: &mut Interpreter, world: &World) -> EvalResult {
    let methods = Value::Class(world.visibility.methods);
    let singleton = call(interp, &methods, "singleton_methods", vec![])?;
    let instance = call(interp, &methods, "instance_methods", vec![Value::Bool(false)])?;
    Ok(Value::array(vec![singleton, instance]))
}

fn kind_of(interp: &mut Interpreter, world: &World) -> EvalResult {
    let specs = world.kind_of;
    let kinda = world.instantiate(interp, specs.kinda_class, vec![])?;
    let mut answers = Vec::new();
    for (query, module) in [
        ("kind_of?", specs.my_extension_module),
        ("is_a?", specs.ancestor_module),
        ("kind_of?", specs.some_other_module),
        ("instance_of?", specs.ancestor_class),
        ("instance_of?", specs.kinda_class),
    ] {
        answers.push(call(interp, &kinda, query, vec![Value::Class(module)])?);
    }
    Ok(Value::array(answers))
}

fn respond_via_missing(interp: &mut Interpreter, world: &World) -> EvalResult {
    let object = world.instantiate(interp, world.respond_via_missing, vec![])?;
    let mut answers = Vec::new();
    for (name, include_all) in [
        ("handled_publicly", false),
        ("handled_privately", false),
        ("handled_privately", true),
        ("not_handled", false),
    ] {
        let name = sym(interp, name);
        answers.push(call(
            interp,
            &object,
            "respond_to?",
            vec![name, Value::Bool(include_all)],
        )?);
    }
    Ok(Value::array(answers))
}

fn method_missing(interp: &mut Interpreter, world: &World) -> EvalResult {
    let object = world.instantiate(interp, world.respond_via_missing, vec![])?;
    call(interp, &object, "handled_publicly", vec![Value::int(1), Value::int(2)])
}

fn block_given(interp: &mut Interpreter, world: &World) -> EvalResult {
    let block = interp.make_proc(&[], |_, _| Ok(Value::Nil));
    let mut rows = Vec::new();
    for query in BlockQuery::ALL {
        let module = Value::Class(world.blocks.module(query));
        let with = with_block(interp, &module, "accept_block", &block)?;
        let without = call(interp, &module, "accept_block", vec![])?;
        let defined = with_block(interp, &module, "defined_block", &block)?;
        rows.push(Value::array(vec![with, without, defined]));
    }
    Ok(Value::array(rows))
}

fn binding_locals(interp: &mut Interpreter, world: &World) -> EvalResult {
    let holder = world.instantiate(interp, world.closures.binding, vec![Value::int(1)])?;
    let binding = call(interp, &holder, "get_binding", vec![])?;
    let locals = call(interp, &binding, "local_variables", vec![])?;
    let Some(captured) = binding.as_binding().cloned() else {
        return Ok(locals);
    };
    let secret = interp.invoke_closure(&captured, |interp| {
        let me = interp.current_self();
        let ivar = sym(interp, "@secret");
        call(interp, &me, "instance_variable_get", vec![ivar])
    })?;
    Ok(Value::array(vec![locals, secret]))
}

fn eval_yield(interp: &mut Interpreter, world: &World) -> EvalResult {
    let class = Value::Class(world.closures.eval_test);
    let block = interp.make_proc(&[], |interp, _| Ok(sym(interp, "yielded")));
    with_block(interp, &class, "eval_yield_with_binding", &block)
}

fn eval_location(interp: &mut Interpreter, world: &World) -> EvalResult {
    let class = Value::Class(world.closures.eval_specs);
    call(interp, &class, "call_eval", vec![])
}

fn copy_hooks(interp: &mut Interpreter, world: &World) -> EvalResult {
    let specs = world.copies;
    world.scratch.clear();

    let pair = vec![Value::int(1), Value::int(2)];
    let original = world.instantiate(interp, specs.duplicate, pair)?;
    let copy = call(interp, &original, "dup", vec![])?;
    let copy_id = call(interp, &copy, "object_id", vec![])?;
    let recorded_copy = world.scratch.last() == Some(copy_id);
    let one = call(interp, &copy, "one", vec![])?;

    let cloneable = world.instantiate(interp, specs.clone, vec![])?;
    call(interp, &cloneable, "clone", vec![])?;
    let cloneable_id = call(interp, &cloneable, "object_id", vec![])?;
    let recorded_clone = world.scratch.last() == Some(cloneable_id);

    let dupable = world.instantiate(interp, specs.dup, vec![])?;
    call(interp, &dupable, "dup", vec![])?;
    let dupable_id = call(interp, &dupable, "object_id", vec![])?;
    let recorded_dup = world.scratch.last() == Some(dupable_id);

    Ok(Value::array(vec![
        Value::Bool(recorded_copy),
        one,
        Value::Bool(recorded_clone),
        Value::Bool(recorded_dup),
    ]))
}
