//! Ancestry, visibility and fallback fixtures.

use mote_eval::errors::custom;
use mote_eval::{
    CallMode, ClassId, ControlAction, EvalResult, Interpreter, Invocation, Value, Visibility,
};

use super::{nothing, returns};

/// Receivers for `kind_of?`, `is_a?` and `instance_of?`.
#[derive(Clone, Copy, Debug)]
pub struct KindOfSpecs {
    pub some_other_module: ClassId,
    pub ancestor_module: ClassId,
    pub my_module: ClassId,
    pub my_extension_module: ClassId,
    /// `< String`, includes `AncestorModule`.
    pub ancestor_class: ClassId,
    /// `< AncestorClass`, includes `MyModule`.
    pub instance_class: ClassId,
    /// Like `InstanceClass`, and every instance extends `MyExtensionModule`.
    pub kinda_class: ClassId,
}

pub(super) fn kind_of(interp: &mut Interpreter) -> Result<KindOfSpecs, ControlAction> {
    let some_other_module = interp.define_module("KernelSpecs::SomeOtherModule");
    let ancestor_module = interp.define_module("KernelSpecs::AncestorModule");
    let my_module = interp.define_module("KernelSpecs::MyModule");
    let my_extension_module = interp.define_module("KernelSpecs::MyExtensionModule");
    let string = interp.model().core().string;

    let ancestor_class = interp.with_class("KernelSpecs::AncestorClass", Some(string), |b| {
        b.include(ancestor_module)?;
        Ok(())
    })?;
    let instance_class =
        interp.with_class("KernelSpecs::InstanceClass", Some(ancestor_class), |b| {
            b.include(my_module)?;
            Ok(())
        })?;
    let kinda_class = interp.with_class("KernelSpecs::KindaClass", Some(ancestor_class), |b| {
        b.include(my_module)?;
        b.def("initialize", move |interp, inv| {
            let module = Value::Class(my_extension_module);
            interp.call_named(&inv.receiver, "extend", CallMode::Explicit, vec![module], None)?;
            Ok(Value::Nil)
        });
        Ok(())
    })?;

    Ok(KindOfSpecs {
        some_other_module,
        ancestor_module,
        my_module,
        my_extension_module,
        ancestor_class,
        instance_class,
        kinda_class,
    })
}

/// Section, directive and undef fixtures.
#[derive(Clone, Copy, Debug)]
pub struct VisibilitySpecs {
    /// Every combination of section and `def` / `def self.` / `class << self`.
    pub methods: ClassId,
    /// `peekaboo` public, `nopeeking` protected, `shoo` private.
    pub metaclass_methods: ClassId,
    pub private_sup: ClassId,
    pub public_sub: ClassId,
    pub a: ClassId,
    /// `< A`, aliases `pub_method`.
    pub b: ClassId,
    /// `new` is private on the metaclass.
    pub visibility_change: ClassId,
    pub parent_mixin: ClassId,
    pub parent: ClassId,
    /// Undefines `parent_method`.
    pub child: ClassId,
    /// Undefines `parent_mixin_method`.
    pub grandchild: ClassId,
}

pub(super) fn visibility(interp: &mut Interpreter) -> Result<VisibilitySpecs, ControlAction> {
    let metaclass_methods = interp.with_module("KernelSpecs::Methods::MetaclassMethods", |b| {
        b.def("peekaboo", nothing)
            .protected()
            .def("nopeeking", nothing)
            .private()
            .def("shoo", nothing);
        Ok(())
    })?;

    let methods = interp.with_class("KernelSpecs::Methods", None, |b| {
        b.def_singleton("ichi", nothing).def("ni", nothing);
        b.meta(|m| {
            m.def("san", nothing);
            Ok(())
        })?;

        b.private().def_singleton("shi", nothing).def("juu_shi", nothing);
        b.meta(|m| {
            m.def("roku", nothing).private().def("shichi", nothing);
            Ok(())
        })?;

        b.protected().def_singleton("hachi", nothing).def("ku", nothing);
        b.meta(|m| {
            m.def("juu", nothing).protected().def("juu_ichi", nothing);
            Ok(())
        })?;

        b.public().def_singleton("juu_ni", nothing).def("juu_san", nothing);
        Ok(())
    })?;

    let private_sup = interp.with_class("KernelSpecs::PrivateSup", None, |b| {
        b.def("public_in_sub", nothing)
            .set_visibility(Visibility::Private, &["public_in_sub"])?;
        Ok(())
    })?;
    let public_sub = interp.with_class("KernelSpecs::PublicSub", Some(private_sup), |b| {
        b.def("public_in_sub", nothing);
        Ok(())
    })?;

    let a = interp.with_class("KernelSpecs::A", None, |b| {
        b.def("pub_method", returns("public_method"))
            .def("undefed_method", returns("undefed_method"))
            .undef_method("undefed_method")?;
        b.protected().def("protected_method", returns("protected_method"));
        b.private().def("private_method", returns("private_method"));
        b.public().define_method("defined_method", &[], returns("defined"));
        Ok(())
    })?;
    let b = interp.with_class("KernelSpecs::B", Some(a), |b| {
        b.alias_method("aliased_pub_method", "pub_method")?;
        Ok(())
    })?;

    let visibility_change = interp.with_class("KernelSpecs::VisibilityChange", None, |b| {
        b.meta(|m| {
            m.set_visibility(Visibility::Private, &["new"])?;
            Ok(())
        })?;
        Ok(())
    })?;

    let parent_mixin = interp.with_module("KernelSpecs::ParentMixin", |b| {
        b.def("parent_mixin_method", nothing);
        Ok(())
    })?;
    let parent = interp.with_class("KernelSpecs::Parent", None, |b| {
        b.include(parent_mixin)?
            .def("parent_method", nothing)
            .def("another_parent_method", nothing)
            .def_singleton("parent_class_method", returns("foo"));
        Ok(())
    })?;
    let child = interp.with_class("KernelSpecs::Child", Some(parent), |b| {
        b.undef_method("parent_method")?;
        Ok(())
    })?;
    let grandchild = interp.with_class("KernelSpecs::Grandchild", Some(child), |b| {
        b.undef_method("parent_mixin_method")?;
        Ok(())
    })?;

    Ok(VisibilitySpecs {
        methods,
        metaclass_methods,
        private_sup,
        public_sub,
        a,
        b,
        visibility_change,
        parent_mixin,
        parent,
        child,
        grandchild,
    })
}

/// `RespondViaMissing`: a predicate that knows three names and a fallback
/// that answers `"Done name([args])"` for anything.
pub(super) fn respond_via_missing(interp: &mut Interpreter) -> Result<ClassId, ControlAction> {
    interp.with_class("KernelSpecs::RespondViaMissing", None, |b| {
        b.def("respond_to_missing?", |interp, inv| {
            let method = interp.expect_name(&inv.arg(0))?;
            match interp.name_str(method) {
                "handled_publicly" => Ok(Value::Bool(true)),
                "handled_privately" => Ok(Value::bool(inv.arg(1).is_truthy())),
                "not_handled" => Ok(Value::Bool(false)),
                _ => Err(interp.fail(custom("Typo in method name"))),
            }
        });
        b.def("method_missing", method_missing_reply);
        Ok(())
    })
}

fn method_missing_reply(interp: &mut Interpreter, inv: Invocation) -> EvalResult {
    let Some((first, rest)) = inv.args.split_first() else {
        return Ok(Value::Nil);
    };
    let method = interp.expect_name(first)?;
    let args = interp.inspect(&Value::array(rest.to_vec()));
    Ok(Value::string(format!("Done {}({args})", interp.name_str(method))))
}
