//! Binding, non-local return and block-query fixtures.

use mote_eval::errors::{custom, type_mismatch};
use mote_eval::{CallMode, ClassId, ControlAction, EvalResult, Interpreter, Value};
use mote_ir::SourceTag;

use super::{get_ivar, set_ivar, FIXTURE_FILE};

#[derive(Clone, Copy, Debug)]
pub struct ClosureSpecs {
    /// `get_binding` captures its frame, then keeps defining locals.
    pub binding: ClassId,
    /// `eval("yield", binding)` and plain `yield`.
    pub eval_test: ClassId,
    /// `call_eval` evaluates under a foreign source tag.
    pub eval_specs: ClassId,
    /// `outer(:lambda)` / `outer(:proc)` return `:good` through a nested call.
    pub lambda: ClassId,
}

pub(super) fn closures(interp: &mut Interpreter) -> Result<ClosureSpecs, ControlAction> {
    let binding = interp.with_class("KernelSpecs::Binding", None, |b| {
        b.def("initialize", |interp, inv| {
            set_ivar(interp, &inv.receiver, "@secret", inv.arg(0))?;
            Ok(Value::Nil)
        });
        b.def("square", |interp, inv| {
            let n = inv.arg(0);
            let Some(raw) = n.as_int() else {
                return Err(interp.fail(type_mismatch("integer", n.type_name())));
            };
            raw.checked_mul(raw)
                .map(Value::int)
                .ok_or_else(|| interp.fail(custom("integer overflow in square")))
        });
        b.def("get_binding", |interp, inv| {
            interp.define_var("a", Value::Bool(true));
            let bind = interp.call_self("binding", vec![], None)?;
            set_ivar(interp, &inv.receiver, "@bind", bind.clone())?;

            interp.define_var("b", Value::Bool(true));
            let secret = get_ivar(interp, &inv.receiver, "@secret").as_int().unwrap_or(0);
            set_ivar(interp, &inv.receiver, "@secret", Value::int(secret + 1))?;

            Ok(bind)
        });
        Ok(())
    })?;

    let eval_test = interp.with_class("KernelSpecs::EvalTest", None, |b| {
        b.def_singleton("eval_yield_with_binding", |interp, _| {
            let binding = interp.capture_binding();
            interp.invoke_closure(&binding, |interp| interp.yield_block(vec![]))
        });
        b.def_singleton("call_yield", |interp, _| interp.yield_block(vec![]));
        Ok(())
    })?;

    let eval_specs = interp.with_class("EvalSpecs", None, |b| {
        b.def_singleton("call_eval", |interp, _| {
            interp.set_location(FIXTURE_FILE, 1);
            let file = Value::string(interp.name_str(interp.location().file));
            interp.define_var("f", file);
            let binding = interp.capture_binding();
            let tag = SourceTag::new(interp.intern("(eval)"), 1);
            interp.invoke_closure_at(&binding, tag, |_| Ok(Value::Bool(true)))?;
            interp.lookup_var("f")
        });
        Ok(())
    })?;

    let lambda = interp.with_class("KernelSpecs::Lambda", None, |b| {
        b.def("outer", |interp, inv| interp.call_self("inner", vec![inv.arg(0)], None));
        b.def("mp", |_, inv| Ok(inv.block.map_or(Value::Nil, Value::proc)));
        b.def("inner", |interp, inv| {
            let escape = interp.make_proc(&[], |interp, _| {
                let good = Value::symbol(interp.intern("good"));
                interp.return_value(good)
            });
            let b = interp.call_self("mp", vec![], Some(escape))?;

            let relay = interp.make_proc(&["x"], |interp, _| {
                let x = interp.lookup_var("x")?;
                interp.call_named(&x, "call", CallMode::Explicit, vec![], None)
            });
            let pr = interp.call_self("send", vec![inv.arg(0)], Some(relay))?;

            interp.call_named(&pr, "call", CallMode::Explicit, vec![b], None)?;

            // Not reached: calling `b` already returned from this method.
            Ok(Value::symbol(interp.intern("bad")))
        });
        Ok(())
    })?;

    Ok(ClosureSpecs {
        binding,
        eval_test,
        eval_specs,
        lambda,
    })
}

/// How a fixture asks whether its frame received a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockQuery {
    /// `block_given?`
    Direct,
    /// `Kernel.block_given?`
    Kernel,
    /// `self.send(:block_given?)`
    Send,
}

impl BlockQuery {
    pub const ALL: [BlockQuery; 3] = [BlockQuery::Direct, BlockQuery::Kernel, BlockQuery::Send];

    fn ask(self, interp: &mut Interpreter) -> EvalResult {
        match self {
            BlockQuery::Direct => Ok(Value::bool(interp.block_given())),
            BlockQuery::Kernel => {
                let kernel = Value::Class(interp.model().core().kernel);
                interp.call_named(&kernel, "block_given?", CallMode::Explicit, vec![], None)
            }
            BlockQuery::Send => {
                let me = interp.current_self();
                let query = Value::symbol(interp.intern("block_given?"));
                interp.call_named(&me, "send", CallMode::Explicit, vec![query], None)
            }
        }
    }
}

/// `BlockGiven`, `KernelBlockGiven` and `SelfBlockGiven`, in
/// [`BlockQuery::ALL`] order.
#[derive(Clone, Copy, Debug)]
pub struct BlockSpecs {
    pub modules: [ClassId; 3],
}

impl BlockSpecs {
    pub fn module(&self, query: BlockQuery) -> ClassId {
        match query {
            BlockQuery::Direct => self.modules[0],
            BlockQuery::Kernel => self.modules[1],
            BlockQuery::Send => self.modules[2],
        }
    }
}

pub(super) fn blocks(interp: &mut Interpreter) -> Result<BlockSpecs, ControlAction> {
    let direct = block_given_module(interp, "KernelSpecs::BlockGiven", BlockQuery::Direct)?;
    let kernel = block_given_module(interp, "KernelSpecs::KernelBlockGiven", BlockQuery::Kernel)?;
    let send = block_given_module(interp, "KernelSpecs::SelfBlockGiven", BlockQuery::Send)?;
    Ok(BlockSpecs {
        modules: [direct, kernel, send],
    })
}

/// `accept_block` and `accept_block_as_argument` are plain singleton
/// methods; `defined_block` is a `define_method` body on the metaclass and
/// so never sees the caller's block.
fn block_given_module(
    interp: &mut Interpreter,
    name: &str,
    query: BlockQuery,
) -> Result<ClassId, ControlAction> {
    interp.with_module(name, |b| {
        b.def_singleton("accept_block", move |interp, _| query.ask(interp))
            .def_singleton("accept_block_as_argument", move |interp, _| query.ask(interp));
        b.meta(|m| {
            m.define_method("defined_block", &[], move |interp, _| query.ask(interp));
            Ok(())
        })?;
        Ok(())
    })
}
