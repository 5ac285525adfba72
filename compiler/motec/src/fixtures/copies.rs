//! `dup` / `clone` hook fixtures.

use mote_eval::{CallMode, ClassId, ControlAction, Interpreter, Value};

use super::{object_id, set_ivar, ScratchPad};

#[derive(Clone, Copy, Debug)]
pub struct CopySpecs {
    /// `repr` answers the receiver's class name.
    pub duplicate_m: ClassId,
    /// Records the copy's `object_id` from `initialize_copy`.
    pub duplicate: ClassId,
    /// Records the original's `object_id` from `initialize_clone`.
    pub clone: ClassId,
    /// Records the original's `object_id` from `initialize_dup`.
    pub dup: ClassId,
    /// `@greeting = "hello"`.
    pub instance_variable: ClassId,
}

pub(super) fn copies(
    interp: &mut Interpreter,
    scratch: &ScratchPad,
) -> Result<CopySpecs, ControlAction> {
    let duplicate_m = interp.with_module("KernelSpecs::DuplicateM", |b| {
        b.def("repr", |interp, inv| {
            let class = interp.call_named(&inv.receiver, "class", CallMode::Explicit, vec![], None)?;
            interp.call_named(&class, "name", CallMode::Explicit, vec![], None)
        });
        Ok(())
    })?;

    let duplicate = interp.with_class("KernelSpecs::Duplicate", None, |b| {
        b.attr_accessor(&["one", "two"]);
        b.def("initialize", |interp, inv| {
            inv.expect_arity(interp, "initialize", 2)?;
            set_ivar(interp, &inv.receiver, "@one", inv.arg(0))?;
            set_ivar(interp, &inv.receiver, "@two", inv.arg(1))?;
            Ok(Value::Nil)
        });
        let pad = scratch.clone();
        b.def("initialize_copy", move |interp, inv| {
            pad.record(object_id(interp, &inv.receiver)?);
            Ok(Value::Nil)
        });
        Ok(())
    })?;

    let clone = interp.with_class("KernelSpecs::Clone", None, |b| {
        let pad = scratch.clone();
        b.def("initialize_clone", move |interp, inv| {
            pad.record(object_id(interp, &inv.arg(0))?);
            Ok(Value::Nil)
        });
        Ok(())
    })?;

    let dup = interp.with_class("KernelSpecs::Dup", None, |b| {
        let pad = scratch.clone();
        b.def("initialize_dup", move |interp, inv| {
            pad.record(object_id(interp, &inv.arg(0))?);
            Ok(Value::Nil)
        });
        Ok(())
    })?;

    let instance_variable = interp.with_class("KernelSpecs::InstanceVariable", None, |b| {
        b.def("initialize", |interp, inv| {
            set_ivar(interp, &inv.receiver, "@greeting", Value::string("hello"))?;
            Ok(Value::Nil)
        });
        Ok(())
    })?;

    Ok(CopySpecs {
        duplicate_m,
        duplicate,
        clone,
        dup,
        instance_variable,
    })
}
