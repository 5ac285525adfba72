//! The fixture world.
//!
//! A fixed set of classes and modules under `KernelSpecs`, defined through
//! the embedding API the way a host program would: sections, directives,
//! `define_method` bodies, bindings and blocks. The integration suite and
//! `mote demo` both run against a freshly installed world.

mod closures;
mod copies;
mod dispatch;
mod scenarios;

use std::cell::RefCell;
use std::rc::Rc;

use mote_eval::{CallMode, ClassId, ControlAction, EvalResult, Interpreter, Invocation, Value};

pub use closures::{BlockQuery, BlockSpecs, ClosureSpecs};
pub use copies::CopySpecs;
pub use dispatch::{KindOfSpecs, VisibilitySpecs};
pub use scenarios::{scenarios, Scenario};

/// File name fixtures report as their source location.
pub const FIXTURE_FILE: &str = "kernel/fixtures/classes.rb";

/// Values recorded by fixture hooks, in call order.
#[derive(Clone, Debug, Default)]
pub struct ScratchPad {
    entries: Rc<RefCell<Vec<Value>>>,
}

impl ScratchPad {
    pub fn record(&self, value: Value) {
        self.entries.borrow_mut().push(value);
    }

    pub fn recorded(&self) -> Vec<Value> {
        self.entries.borrow().clone()
    }

    /// Most recent entry.
    pub fn last(&self) -> Option<Value> {
        self.entries.borrow().last().cloned()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

/// Every fixture class and module, plus the shared scratch pad.
#[derive(Clone, Debug)]
pub struct World {
    pub kernel_specs: ClassId,
    pub kind_of: KindOfSpecs,
    pub visibility: VisibilitySpecs,
    pub respond_via_missing: ClassId,
    pub closures: ClosureSpecs,
    pub blocks: BlockSpecs,
    pub copies: CopySpecs,
    pub scratch: ScratchPad,
}

impl World {
    /// `class.new(*args)`.
    pub fn instantiate(
        &self,
        interp: &mut Interpreter,
        class: ClassId,
        args: Vec<Value>,
    ) -> EvalResult {
        interp.call_named(&Value::Class(class), "new", CallMode::Explicit, args, None)
    }
}

/// Define the fixture world in `interp`.
pub fn install(interp: &mut Interpreter) -> Result<World, ControlAction> {
    let kernel_specs = interp.define_module("KernelSpecs");
    let scratch = ScratchPad::default();
    let world = World {
        kernel_specs,
        kind_of: dispatch::kind_of(interp)?,
        visibility: dispatch::visibility(interp)?,
        respond_via_missing: dispatch::respond_via_missing(interp)?,
        closures: closures::closures(interp)?,
        blocks: closures::blocks(interp)?,
        copies: copies::copies(interp, &scratch)?,
        scratch,
    };
    tracing::debug!(classes = interp.model().class_count(), "fixture world installed");
    Ok(world)
}

// Helpers shared by fixture bodies

fn nothing(_: &mut Interpreter, _: Invocation) -> EvalResult {
    Ok(Value::Nil)
}

/// Body answering the symbol `name`.
fn returns(name: &'static str) -> impl Fn(&mut Interpreter, Invocation) -> EvalResult + 'static {
    move |interp, _| Ok(Value::symbol(interp.intern(name)))
}

fn get_ivar(interp: &Interpreter, receiver: &Value, name: &str) -> Value {
    interp.model().ivar_get(receiver, interp.intern(name))
}

fn set_ivar(
    interp: &mut Interpreter,
    receiver: &Value,
    name: &str,
    value: Value,
) -> Result<(), ControlAction> {
    let name = interp.intern(name);
    interp
        .model_mut()
        .ivar_set(receiver, name, value)
        .map_err(|e| interp.fail(e))
}

fn object_id(interp: &mut Interpreter, value: &Value) -> EvalResult {
    interp.call_named(value, "object_id", CallMode::Explicit, vec![], None)
}
