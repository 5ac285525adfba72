//! Method listings over the `Methods` fixture, which defines one method for
//! every combination of section and definition form.

use mote_eval::{Interpreter, TableOwner, Value, Visibility};
use pretty_assertions::assert_eq;

use crate::common::{call, new, sym, symbols, world};

/// Visibility of `owner`'s own entry for `name`.
fn own_visibility(interp: &Interpreter, owner: TableOwner, name: &str) -> Option<Visibility> {
    interp
        .model()
        .defined_entries(owner)
        .and_then(|table| table.get(interp.intern(name)))
        .map(|entry| entry.visibility)
}

#[test]
fn singleton_methods_skip_private() {
    let (mut interp, world) = world();
    let methods = Value::Class(world.visibility.methods);
    let got = call(&mut interp, &methods, "singleton_methods", vec![]).unwrap();
    let expected = symbols(
        &interp,
        &["ichi", "san", "shi", "roku", "hachi", "juu", "juu_ichi", "juu_ni"],
    );
    assert_eq!(got, expected);
}

#[test]
fn own_instance_methods_skip_private() {
    let (mut interp, world) = world();
    let methods = Value::Class(world.visibility.methods);
    let got = call(&mut interp, &methods, "instance_methods", vec![Value::Bool(false)]).unwrap();
    assert_eq!(got, symbols(&interp, &["ni", "ku", "juu_san"]));
}

#[test]
fn sections_set_instance_visibility() {
    let (interp, world) = world();
    let owner = TableOwner::Module(world.visibility.methods);
    let expected = [
        ("ni", Visibility::Public),
        ("juu_shi", Visibility::Private),
        ("ku", Visibility::Protected),
        ("juu_san", Visibility::Public),
    ];
    for (name, visibility) in expected {
        assert_eq!(own_visibility(&interp, owner, name), Some(visibility), "{name}");
    }
}

#[test]
fn metaclass_sections_are_independent() {
    let (interp, world) = world();
    let owner = TableOwner::Meta(world.visibility.methods);
    let expected = [
        ("ichi", Visibility::Public),
        ("shi", Visibility::Public),
        ("roku", Visibility::Public),
        ("shichi", Visibility::Private),
        ("hachi", Visibility::Public),
        ("juu", Visibility::Public),
        ("juu_ichi", Visibility::Protected),
        ("juu_ni", Visibility::Public),
    ];
    for (name, visibility) in expected {
        assert_eq!(own_visibility(&interp, owner, name), Some(visibility), "{name}");
    }
}

#[test]
fn defined_queries_by_visibility() {
    let (mut interp, world) = world();
    let methods = Value::Class(world.visibility.methods);
    let cases = [
        ("private_method_defined?", "juu_shi", true),
        ("private_method_defined?", "ni", false),
        ("protected_method_defined?", "ku", true),
        ("public_method_defined?", "juu_san", true),
        ("method_defined?", "juu_shi", false),
    ];
    for (query, name, answer) in cases {
        let target = sym(&interp, name);
        let got = call(&mut interp, &methods, query, vec![target]).unwrap();
        assert_eq!(got, Value::Bool(answer), "{query} {name}");
    }
}

#[test]
fn extended_object_lists_module_methods() {
    let (mut interp, world) = world();
    let object = new(&mut interp, &world, world.visibility.a);
    let module = Value::Class(world.visibility.metaclass_methods);
    call(&mut interp, &object, "extend", vec![module]).unwrap();
    let got = call(&mut interp, &object, "singleton_methods", vec![]).unwrap();
    assert_eq!(got, symbols(&interp, &["peekaboo", "nopeeking"]));
}
