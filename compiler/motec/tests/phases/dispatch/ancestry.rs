//! Lookup order, kind-of queries and undef chains.

use mote_eval::{EvalErrorKind, Value};
use pretty_assertions::assert_eq;

use crate::common::{call, error_kind, new, sym, world};

#[test]
fn instance_class_ancestors() {
    let (mut interp, world) = world();
    let class = Value::Class(world.kind_of.instance_class);
    let ancestors = call(&mut interp, &class, "ancestors", vec![]).unwrap();
    let names: Vec<String> = ancestors
        .as_array()
        .unwrap()
        .iter()
        .map(|v| interp.inspect(v))
        .collect();
    assert_eq!(
        names,
        vec![
            "KernelSpecs::InstanceClass",
            "KernelSpecs::MyModule",
            "KernelSpecs::AncestorClass",
            "KernelSpecs::AncestorModule",
            "String",
            "Object",
            "Kernel",
            "BasicObject",
        ]
    );
}

#[test]
fn kind_of_through_modules() {
    let (mut interp, world) = world();
    let specs = world.kind_of;
    let object = new(&mut interp, &world, specs.instance_class);
    let ask = |interp: &mut mote_eval::Interpreter, query: &str, module| {
        call(interp, &object, query, vec![Value::Class(module)]).unwrap()
    };
    assert_eq!(ask(&mut interp, "kind_of?", specs.ancestor_module), Value::Bool(true));
    assert_eq!(ask(&mut interp, "is_a?", specs.my_module), Value::Bool(true));
    assert_eq!(ask(&mut interp, "kind_of?", specs.ancestor_class), Value::Bool(true));
    assert_eq!(ask(&mut interp, "is_a?", specs.some_other_module), Value::Bool(false));
    assert_eq!(ask(&mut interp, "instance_of?", specs.ancestor_class), Value::Bool(false));
    assert_eq!(ask(&mut interp, "instance_of?", specs.instance_class), Value::Bool(true));
}

#[test]
fn extension_is_per_object() {
    let (mut interp, world) = world();
    let specs = world.kind_of;
    let extended = new(&mut interp, &world, specs.kinda_class);
    let plain = new(&mut interp, &world, specs.instance_class);
    let module = Value::Class(specs.my_extension_module);
    assert_eq!(
        call(&mut interp, &extended, "kind_of?", vec![module.clone()]).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(
        call(&mut interp, &plain, "kind_of?", vec![module]).unwrap(),
        Value::Bool(false)
    );
}

#[test]
fn undef_hides_for_descendants_only() {
    let (mut interp, world) = world();
    let specs = world.visibility;
    let names = ["parent_method", "another_parent_method", "parent_mixin_method"];
    let expected = [
        (specs.parent, [true, true, true]),
        (specs.child, [false, true, true]),
        (specs.grandchild, [false, true, false]),
    ];
    for (class, answers) in expected {
        let object = new(&mut interp, &world, class);
        for (name, answer) in names.iter().zip(answers) {
            let target = sym(&interp, name);
            let got = call(&mut interp, &object, "respond_to?", vec![target]).unwrap();
            assert_eq!(got, Value::Bool(answer), "{name}");
        }
    }
}

#[test]
fn undefined_name_is_no_method() {
    let (mut interp, world) = world();
    let child = new(&mut interp, &world, world.visibility.child);
    let kind = error_kind(call(&mut interp, &child, "parent_method", vec![]));
    assert_eq!(
        kind,
        EvalErrorKind::NoMethod {
            method: "parent_method".to_string(),
            receiver: "#<KernelSpecs::Child>".to_string(),
        }
    );

    let a = new(&mut interp, &world, world.visibility.a);
    let kind = error_kind(call(&mut interp, &a, "undefed_method", vec![]));
    assert!(matches!(kind, EvalErrorKind::NoMethod { .. }));
}

#[test]
fn send_does_not_bypass_undef() {
    let (mut interp, world) = world();
    let child = new(&mut interp, &world, world.visibility.child);
    let target = sym(&interp, "parent_method");
    let kind = error_kind(call(&mut interp, &child, "send", vec![target]));
    assert!(matches!(kind, EvalErrorKind::NoMethod { .. }));
}

#[test]
fn alias_resolves_superclass_body() {
    let (mut interp, world) = world();
    let b = new(&mut interp, &world, world.visibility.b);
    let got = call(&mut interp, &b, "aliased_pub_method", vec![]).unwrap();
    assert_eq!(got, sym(&interp, "public_method"));
}

#[test]
fn class_methods_are_inherited() {
    let (mut interp, world) = world();
    for class in [world.visibility.parent, world.visibility.child] {
        let got = call(&mut interp, &Value::Class(class), "parent_class_method", vec![]).unwrap();
        assert_eq!(got, sym(&interp, "foo"));
    }
}
