//! Class hierarchy, objects and method lookup paths.
//!
//! # Lookup Path
//!
//! For an ordinary object the path is:
//! 1. its singleton table, if it has one
//! 2. modules extended into it, most recent first
//! 3. the linearized ancestors of its class (class, included modules in
//!    reverse inclusion order, then the superclass's ancestors)
//!
//! For a class object the path is the *metaclass chain*: the class's meta
//! table and the modules extended into it, repeated for every superclass,
//! followed by the ancestors of the built-in `Class` (or `Module`).
//!
//! The first entry found wins. An undefined marker found first means
//! "not found", even if an ancestor further on defines the name.

mod body;

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};

use mote_ir::{Name, SharedInterner};

use crate::errors::{
    cannot_define_singleton, custom, type_mismatch, undefined_method_name, EvalError,
};
use crate::interpreter::Interpreter;
use crate::method_table::{
    native_fn, MethodBody, MethodEntry, MethodTable, TableOwner, Visibility,
};
use crate::value::Value;

pub use body::ClassBody;

/// Index of a class or module.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u32);

impl ClassId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        ClassId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of an allocated object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u32);

impl ObjectId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        ObjectId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    /// Cannot be instantiated or subclassed; can be included and extended.
    Module,
}

/// A class or module.
#[derive(Clone, Debug)]
pub struct ClassNode {
    name: Name,
    kind: ClassKind,
    superclass: Option<ClassId>,
    /// Most recently included first.
    includes: Vec<ClassId>,
    /// Modules extended into the class object, most recent first.
    meta_extends: Vec<ClassId>,
    methods: MethodTable,
    meta: MethodTable,
    /// Cached linearization, starting with this node.
    ancestors: Vec<ClassId>,
}

impl ClassNode {
    pub fn name(&self) -> Name {
        self.name
    }

    pub fn kind(&self) -> ClassKind {
        self.kind
    }

    pub fn superclass(&self) -> Option<ClassId> {
        self.superclass
    }

    pub fn includes(&self) -> &[ClassId] {
        &self.includes
    }

    pub fn methods(&self) -> &MethodTable {
        &self.methods
    }

    pub fn meta_methods(&self) -> &MethodTable {
        &self.meta
    }

    pub fn ancestors(&self) -> &[ClassId] {
        &self.ancestors
    }
}

/// Per-object table overriding class-derived resolution.
#[derive(Clone, Debug, Default)]
pub struct SingletonTable {
    methods: MethodTable,
    /// Modules extended into the object, most recent first.
    extends: Vec<ClassId>,
}

#[derive(Clone, Debug)]
struct ObjectData {
    class: ClassId,
    singleton: Option<SingletonTable>,
    ivars: FxHashMap<Name, Value>,
}

/// Built-in classes created at bootstrap.
#[derive(Clone, Copy, Debug)]
pub struct CoreClasses {
    pub basic_object: ClassId,
    pub kernel: ClassId,
    pub object: ClassId,
    pub module: ClassId,
    pub class: ClassId,
    pub nil: ClassId,
    pub true_: ClassId,
    pub false_: ClassId,
    pub integer: ClassId,
    pub string: ClassId,
    pub symbol: ClassId,
    pub array: ClassId,
    pub proc_: ClassId,
    pub binding: ClassId,
}

/// The class hierarchy and every allocated object.
pub struct ObjectModel {
    classes: Vec<ClassNode>,
    objects: Vec<ObjectData>,
    core: CoreClasses,
    main: ObjectId,
    interner: SharedInterner,
}

impl ObjectModel {
    /// Bootstrap the core hierarchy. Method bodies for the core classes are
    /// registered separately by the interpreter.
    pub fn new(interner: SharedInterner) -> Self {
        let mut model = ObjectModel {
            classes: Vec::new(),
            objects: Vec::new(),
            core: CoreClasses {
                basic_object: ClassId(0),
                kernel: ClassId(0),
                object: ClassId(0),
                module: ClassId(0),
                class: ClassId(0),
                nil: ClassId(0),
                true_: ClassId(0),
                false_: ClassId(0),
                integer: ClassId(0),
                string: ClassId(0),
                symbol: ClassId(0),
                array: ClassId(0),
                proc_: ClassId(0),
                binding: ClassId(0),
            },
            main: ObjectId(0),
            interner,
        };

        let basic_object = model.push_node("BasicObject", ClassKind::Class, None);
        let kernel = model.push_node("Kernel", ClassKind::Module, None);
        let object = model.push_node("Object", ClassKind::Class, Some(basic_object));
        model.classes[object.index()].includes.push(kernel);
        model.refresh_ancestors(object);
        let module = model.push_node("Module", ClassKind::Class, Some(object));
        let class = model.push_node("Class", ClassKind::Class, Some(module));

        model.core = CoreClasses {
            basic_object,
            kernel,
            object,
            module,
            class,
            nil: model.push_node("NilClass", ClassKind::Class, Some(object)),
            true_: model.push_node("TrueClass", ClassKind::Class, Some(object)),
            false_: model.push_node("FalseClass", ClassKind::Class, Some(object)),
            integer: model.push_node("Integer", ClassKind::Class, Some(object)),
            string: model.push_node("String", ClassKind::Class, Some(object)),
            symbol: model.push_node("Symbol", ClassKind::Class, Some(object)),
            array: model.push_node("Array", ClassKind::Class, Some(object)),
            proc_: model.push_node("Proc", ClassKind::Class, Some(object)),
            binding: model.push_node("Binding", ClassKind::Class, Some(object)),
        };
        model.main = model.allocate_object(object);
        model
    }

    fn push_node(&mut self, name: &str, kind: ClassKind, superclass: Option<ClassId>) -> ClassId {
        let id = ClassId(u32::try_from(self.classes.len()).unwrap_or(u32::MAX));
        self.classes.push(ClassNode {
            name: self.interner.intern(name),
            kind,
            superclass,
            includes: Vec::new(),
            meta_extends: Vec::new(),
            methods: MethodTable::new(),
            meta: MethodTable::new(),
            ancestors: Vec::new(),
        });
        self.classes[id.index()].ancestors = self.linearize(id);
        id
    }

    // Definitions

    /// Define a class. `superclass` defaults to `Object`.
    pub fn define_class(
        &mut self,
        name: &str,
        superclass: Option<ClassId>,
    ) -> Result<ClassId, EvalError> {
        let superclass = superclass.unwrap_or(self.core.object);
        if self.node(superclass).kind == ClassKind::Module {
            return Err(type_mismatch("class", "module"));
        }
        let id = self.push_node(name, ClassKind::Class, Some(superclass));
        tracing::debug!(class = name, "defined class");
        Ok(id)
    }

    pub fn define_module(&mut self, name: &str) -> ClassId {
        let id = self.push_node(name, ClassKind::Module, None);
        tracing::debug!(module = name, "defined module");
        id
    }

    /// Insert or overwrite `name` in `owner`'s table.
    pub fn define_method(
        &mut self,
        owner: TableOwner,
        name: Name,
        visibility: Visibility,
        body: MethodBody,
    ) {
        tracing::debug!(
            owner = %self.owner_name(owner),
            method = self.interner.lookup(name),
            %visibility,
            "define method"
        );
        self.table_mut(owner).insert(MethodEntry {
            name,
            visibility,
            owner,
            body,
        });
    }

    /// Insert an undefined marker. The name must currently resolve from
    /// `owner`'s point of view.
    pub fn undefine_method(&mut self, owner: TableOwner, name: Name) -> Result<(), EvalError> {
        if self.resolve_in(owner, name).is_none() {
            return Err(self.undefined_name(owner, name));
        }
        tracing::debug!(
            owner = %self.owner_name(owner),
            method = self.interner.lookup(name),
            "undef method"
        );
        self.table_mut(owner)
            .insert(MethodEntry::undefined(name, owner));
        Ok(())
    }

    /// Delete `owner`'s own entry so an inherited one shows through.
    pub fn remove_method(&mut self, owner: TableOwner, name: Name) -> Result<(), EvalError> {
        let removed = self.table_mut(owner).remove(name);
        if removed.is_none() {
            return Err(self.undefined_name(owner, name));
        }
        tracing::debug!(
            owner = %self.owner_name(owner),
            method = self.interner.lookup(name),
            "remove method"
        );
        Ok(())
    }

    /// `private :name` and friends. An inherited entry is copied into
    /// `owner`'s table carrying the new visibility.
    pub fn set_visibility(
        &mut self,
        owner: TableOwner,
        name: Name,
        visibility: Visibility,
    ) -> Result<(), EvalError> {
        tracing::debug!(
            owner = %self.owner_name(owner),
            method = self.interner.lookup(name),
            %visibility,
            "set visibility"
        );
        if self.table_mut(owner).set_visibility(name, visibility) {
            return Ok(());
        }
        match self.resolve_in(owner, name) {
            Some(inherited) => {
                let copy = inherited.rehomed(name, owner, visibility);
                self.table_mut(owner).insert(copy);
                Ok(())
            }
            None => Err(self.undefined_name(owner, name)),
        }
    }

    /// Copy the entry resolved for `old` under `new`, keeping its visibility.
    pub fn alias_method(
        &mut self,
        owner: TableOwner,
        new: Name,
        old: Name,
    ) -> Result<(), EvalError> {
        let Some(entry) = self.resolve_in(owner, old) else {
            return Err(self.undefined_name(owner, old));
        };
        tracing::debug!(
            owner = %self.owner_name(owner),
            new = self.interner.lookup(new),
            old = self.interner.lookup(old),
            "alias method"
        );
        let copy = entry.rehomed(new, owner, entry.visibility);
        self.table_mut(owner).insert(copy);
        Ok(())
    }

    /// Include `module` into `target`. Including twice is a no-op.
    pub fn include_module(&mut self, target: ClassId, module: ClassId) -> Result<(), EvalError> {
        if self.node(module).kind != ClassKind::Module {
            return Err(type_mismatch("module", "class"));
        }
        if self.node(module).ancestors.contains(&target) {
            return Err(custom("cyclic include detected"));
        }
        if self.node(target).includes.contains(&module) {
            return Ok(());
        }
        tracing::debug!(
            target = self.interner.lookup(self.node(target).name),
            module = self.interner.lookup(self.node(module).name),
            "include module"
        );
        self.classes[target.index()].includes.insert(0, module);
        self.refresh_ancestors(target);
        Ok(())
    }

    /// Extend a single object (or class object) with `module`.
    pub fn extend_object(&mut self, receiver: &Value, module: ClassId) -> Result<(), EvalError> {
        if self.node(module).kind != ClassKind::Module {
            return Err(type_mismatch("module", "class"));
        }
        tracing::debug!(
            receiver = %self.describe(receiver),
            module = self.interner.lookup(self.node(module).name),
            "extend object"
        );
        let extends = match receiver {
            Value::Object(id) => {
                &mut self.objects[id.index()]
                    .singleton
                    .get_or_insert_with(SingletonTable::default)
                    .extends
            }
            Value::Class(id) => &mut self.classes[id.index()].meta_extends,
            other => return Err(cannot_define_singleton(&self.describe(other))),
        };
        if !extends.contains(&module) {
            extends.insert(0, module);
        }
        Ok(())
    }

    /// Table receiving `def obj.x` definitions for `receiver`.
    pub fn singleton_owner(&self, receiver: &Value) -> Result<TableOwner, EvalError> {
        match receiver {
            Value::Object(id) => Ok(TableOwner::Singleton(*id)),
            Value::Class(id) => Ok(TableOwner::Meta(*id)),
            other => Err(cannot_define_singleton(&self.describe(other))),
        }
    }

    /// `attr_reader :attr`: `attr` returns `@attr`.
    pub fn attr_reader(&mut self, owner: TableOwner, attr: &str, visibility: Visibility) {
        let ivar = self.interner.intern(&format!("@{attr}"));
        let name = self.interner.intern(attr);
        let func = native_fn(move |interp, inv| {
            inv.expect_arity(interp, attr_label(interp, name), 0)?;
            Ok(interp.model().ivar_get(&inv.receiver, ivar))
        });
        self.define_method(owner, name, visibility, MethodBody::Native { func, primitive: false });
    }

    /// `attr_writer :attr`: `attr=(value)` stores `@attr`.
    pub fn attr_writer(&mut self, owner: TableOwner, attr: &str, visibility: Visibility) {
        let ivar = self.interner.intern(&format!("@{attr}"));
        let name = self.interner.intern(&format!("{attr}="));
        let func = native_fn(move |interp, inv| {
            inv.expect_arity(interp, attr_label(interp, name), 1)?;
            let value = inv.arg(0);
            interp
                .model_mut()
                .ivar_set(&inv.receiver, ivar, value.clone())?;
            Ok(value)
        });
        self.define_method(owner, name, visibility, MethodBody::Native { func, primitive: false });
    }

    // Linearization

    /// Compute `id`'s ancestors from the cached lists of its superclass and
    /// included modules. A module already inherited from the superclass is
    /// not repeated.
    fn linearize(&self, id: ClassId) -> Vec<ClassId> {
        let node = self.node(id);
        let inherited: &[ClassId] = match node.superclass {
            Some(sup) => &self.node(sup).ancestors,
            None => &[],
        };
        let mut out = vec![id];
        for &module in &node.includes {
            for &a in &self.node(module).ancestors {
                if !out.contains(&a) && !inherited.contains(&a) {
                    out.push(a);
                }
            }
        }
        out.extend_from_slice(inherited);
        out
    }

    /// Recompute the ancestors of `changed` and of every node whose
    /// linearization passes through it.
    fn refresh_ancestors(&mut self, changed: ClassId) {
        let affected: Vec<ClassId> = (0..self.classes.len())
            .map(|i| ClassId(u32::try_from(i).unwrap_or(u32::MAX)))
            .filter(|&id| id == changed || self.node(id).ancestors.contains(&changed))
            .collect();

        // Dependencies can appear in any id order; iterate to a fixpoint.
        for _ in 0..=affected.len() {
            let mut changed_any = false;
            for &id in &affected {
                let fresh = self.linearize(id);
                if fresh != self.node(id).ancestors {
                    self.classes[id.index()].ancestors = fresh;
                    changed_any = true;
                }
            }
            if !changed_any {
                break;
            }
        }
    }

    // Lookup

    /// Full lookup path for `receiver`.
    pub fn lookup_path(&self, receiver: &Value) -> Vec<TableOwner> {
        let mut path = self.singleton_path(receiver);
        path.extend(self.class_path(receiver));
        path
    }

    /// Per-receiver part of the path: singleton table and extended modules
    /// for objects, the metaclass chain for class objects.
    pub fn singleton_path(&self, receiver: &Value) -> Vec<TableOwner> {
        let mut path = Vec::new();
        match receiver {
            Value::Object(id) => {
                if let Some(singleton) = &self.objects[id.index()].singleton {
                    path.push(TableOwner::Singleton(*id));
                    self.push_module_ancestors(&mut path, &singleton.extends);
                }
            }
            Value::Class(id) => {
                let mut current = Some(*id);
                while let Some(k) = current {
                    let node = self.node(k);
                    path.push(TableOwner::Meta(k));
                    self.push_module_ancestors(&mut path, &node.meta_extends);
                    current = node.superclass;
                }
            }
            _ => {}
        }
        path
    }

    /// Class-derived part of the path.
    pub fn class_path(&self, receiver: &Value) -> Vec<TableOwner> {
        self.node(self.class_of(receiver))
            .ancestors
            .iter()
            .map(|&c| TableOwner::Module(c))
            .collect()
    }

    fn push_module_ancestors(&self, path: &mut Vec<TableOwner>, modules: &[ClassId]) {
        for &m in modules {
            for &a in &self.node(m).ancestors {
                let owner = TableOwner::Module(a);
                if !path.contains(&owner) {
                    path.push(owner);
                }
            }
        }
    }

    /// First entry for `name` along `path`, undefined markers included.
    pub fn search<'p>(
        &self,
        path: impl IntoIterator<Item = &'p TableOwner>,
        name: Name,
    ) -> Option<&MethodEntry> {
        path.into_iter()
            .filter_map(|owner| self.defined_entries(*owner))
            .find_map(|table| table.get(name))
    }

    /// Resolve `name` for `receiver`. `None` when not found or undefined.
    pub fn resolve(&self, receiver: &Value, name: Name) -> Option<MethodEntry> {
        let path = self.lookup_path(receiver);
        self.search(&path, name)
            .filter(|e| !e.is_undefined())
            .cloned()
    }

    /// Continue resolution after `after` on `receiver`'s path (`super`).
    pub fn resolve_after(
        &self,
        receiver: &Value,
        name: Name,
        after: TableOwner,
    ) -> Option<MethodEntry> {
        let path = self.lookup_path(receiver);
        let start = path.iter().position(|o| *o == after)? + 1;
        self.search(&path[start..], name)
            .filter(|e| !e.is_undefined())
            .cloned()
    }

    /// Resolve from the point of view of a table, as `undef_method`,
    /// `private :x` and `alias_method` do.
    pub fn resolve_in(&self, owner: TableOwner, name: Name) -> Option<MethodEntry> {
        let path = match owner {
            TableOwner::Module(c) => self.class_path_of(c),
            TableOwner::Meta(c) => self.lookup_path(&Value::Class(c)),
            TableOwner::Singleton(o) => self.lookup_path(&Value::Object(o)),
        };
        self.search(&path, name)
            .filter(|e| !e.is_undefined())
            .cloned()
    }

    fn class_path_of(&self, class: ClassId) -> Vec<TableOwner> {
        self.node(class)
            .ancestors
            .iter()
            .map(|&c| TableOwner::Module(c))
            .collect()
    }

    /// A table's own entries. `None` for an object with no singleton table.
    pub fn defined_entries(&self, owner: TableOwner) -> Option<&MethodTable> {
        match owner {
            TableOwner::Module(c) => Some(&self.node(c).methods),
            TableOwner::Meta(c) => Some(&self.node(c).meta),
            TableOwner::Singleton(o) => self.objects[o.index()]
                .singleton
                .as_ref()
                .map(|s| &s.methods),
        }
    }

    fn table_mut(&mut self, owner: TableOwner) -> &mut MethodTable {
        match owner {
            TableOwner::Module(c) => &mut self.classes[c.index()].methods,
            TableOwner::Meta(c) => &mut self.classes[c.index()].meta,
            TableOwner::Singleton(o) => {
                &mut self.objects[o.index()]
                    .singleton
                    .get_or_insert_with(SingletonTable::default)
                    .methods
            }
        }
    }

    // Queries

    pub fn core(&self) -> &CoreClasses {
        &self.core
    }

    pub fn main_object(&self) -> Value {
        Value::Object(self.main)
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    pub fn node(&self, id: ClassId) -> &ClassNode {
        &self.classes[id.index()]
    }

    /// Find a class or module by its full name.
    pub fn class_named(&self, name: &str) -> Option<ClassId> {
        let name = self.interner.intern(name);
        self.classes
            .iter()
            .position(|c| c.name == name)
            .and_then(|i| u32::try_from(i).ok())
            .map(ClassId)
    }

    /// Number of classes and modules, built-ins included.
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn class_of(&self, value: &Value) -> ClassId {
        match value {
            Value::Nil => self.core.nil,
            Value::Bool(true) => self.core.true_,
            Value::Bool(false) => self.core.false_,
            Value::Int(_) => self.core.integer,
            Value::Str(_) => self.core.string,
            Value::Symbol(_) => self.core.symbol,
            Value::Array(_) => self.core.array,
            Value::Proc(_) => self.core.proc_,
            Value::Binding(_) => self.core.binding,
            Value::Object(id) => self.objects[id.index()].class,
            Value::Class(id) => match self.node(*id).kind {
                ClassKind::Class => self.core.class,
                ClassKind::Module => self.core.module,
            },
        }
    }

    pub fn superclass(&self, class: ClassId) -> Option<ClassId> {
        self.node(class).superclass
    }

    pub fn ancestors(&self, class: ClassId) -> &[ClassId] {
        &self.node(class).ancestors
    }

    /// `is_a?` / `kind_of?`.
    pub fn is_kind_of(&self, value: &Value, module: ClassId) -> bool {
        self.lookup_path(value)
            .contains(&TableOwner::Module(module))
    }

    /// `instance_of?`.
    pub fn is_instance_of(&self, value: &Value, class: ClassId) -> bool {
        self.class_of(value) == class
    }

    /// Whether `class` is `ancestor` or inherits from it.
    pub fn inherits(&self, class: ClassId, ancestor: ClassId) -> bool {
        self.node(class).ancestors.contains(&ancestor)
    }

    /// Visibility of the instance method `name` as seen from `class`.
    pub fn method_visibility(&self, class: ClassId, name: Name) -> Option<Visibility> {
        self.resolve_in(TableOwner::Module(class), name)
            .map(|e| e.visibility)
    }

    /// `instance_methods(inherited)`: public and protected names.
    pub fn instance_methods(&self, class: ClassId, inherited: bool) -> Vec<Name> {
        if !inherited {
            return self
                .node(class)
                .methods
                .names_where(|v| v != Visibility::Private);
        }
        let path = self.class_path_of(class);
        self.collect_visible_names(&path)
    }

    /// Public and protected singleton methods, including extended modules
    /// and, for class objects, inherited class methods.
    pub fn singleton_methods(&self, value: &Value) -> Vec<Name> {
        let path = self.singleton_path(value);
        self.collect_visible_names(&path)
    }

    fn collect_visible_names(&self, path: &[TableOwner]) -> Vec<Name> {
        let mut seen = FxHashSet::default();
        let mut names = Vec::new();
        for table in path.iter().filter_map(|o| self.defined_entries(*o)) {
            for entry in table.iter() {
                if seen.insert(entry.name)
                    && !entry.is_undefined()
                    && entry.visibility != Visibility::Private
                {
                    names.push(entry.name);
                }
            }
        }
        names
    }

    // Objects

    fn allocate_object(&mut self, class: ClassId) -> ObjectId {
        let id = ObjectId(u32::try_from(self.objects.len()).unwrap_or(u32::MAX));
        self.objects.push(ObjectData {
            class,
            singleton: None,
            ivars: FxHashMap::default(),
        });
        id
    }

    /// Allocate an uninitialized instance of `class`.
    pub fn allocate(&mut self, class: ClassId) -> Result<Value, EvalError> {
        if self.node(class).kind == ClassKind::Module {
            return Err(type_mismatch("class", "module"));
        }
        Ok(Value::Object(self.allocate_object(class)))
    }

    /// Copy of `source` with the same instance variables. `with_singleton`
    /// also copies the singleton table (`clone`).
    pub fn copy_object(&mut self, source: ObjectId, with_singleton: bool) -> ObjectId {
        let id = ObjectId(u32::try_from(self.objects.len()).unwrap_or(u32::MAX));
        let mut data = self.objects[source.index()].clone();
        data.singleton = if with_singleton {
            data.singleton.map(|singleton| {
                let mut methods = MethodTable::new();
                for entry in singleton.methods.iter() {
                    methods.insert(entry.rehomed(
                        entry.name,
                        TableOwner::Singleton(id),
                        entry.visibility,
                    ));
                }
                SingletonTable {
                    methods,
                    extends: singleton.extends,
                }
            })
        } else {
            None
        };
        self.objects.push(data);
        id
    }

    /// Instance variable, or `nil` when unset.
    pub fn ivar_get(&self, receiver: &Value, name: Name) -> Value {
        match receiver {
            Value::Object(id) => self.objects[id.index()]
                .ivars
                .get(&name)
                .cloned()
                .unwrap_or(Value::Nil),
            _ => Value::Nil,
        }
    }

    pub fn ivar_set(&mut self, receiver: &Value, name: Name, value: Value) -> Result<(), EvalError> {
        match receiver {
            Value::Object(id) => {
                self.objects[id.index()].ivars.insert(name, value);
                Ok(())
            }
            other => Err(custom(format!(
                "can't modify instance variables of {}",
                self.describe(other)
            ))),
        }
    }

    // Display

    /// Short human-readable form used in error messages and demo output.
    pub fn describe(&self, value: &Value) -> String {
        match value {
            Value::Nil => "nil".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(n) => n.to_string(),
            Value::Str(s) => format!("{:?}", s.as_str()),
            Value::Symbol(name) => format!(":{}", self.interner.lookup(*name)),
            Value::Array(items) => {
                let parts: Vec<String> = items.iter().map(|v| self.describe(v)).collect();
                format!("[{}]", parts.join(", "))
            }
            Value::Object(id) if *id == self.main => "main".to_string(),
            Value::Object(id) => {
                format!("#<{}>", self.class_name(self.objects[id.index()].class))
            }
            Value::Class(id) => self.class_name(*id).to_string(),
            Value::Proc(closure) if closure.is_lambda() => "#<Proc (lambda)>".to_string(),
            Value::Proc(_) => "#<Proc>".to_string(),
            Value::Binding(_) => "#<Binding>".to_string(),
        }
    }

    pub fn class_name(&self, class: ClassId) -> &str {
        self.interner.lookup(self.node(class).name)
    }

    pub fn owner_name(&self, owner: TableOwner) -> String {
        match owner {
            TableOwner::Module(c) => self.class_name(c).to_string(),
            TableOwner::Meta(c) => format!("#<Class:{}>", self.class_name(c)),
            TableOwner::Singleton(o) => {
                format!("#<Class:{}>", self.describe(&Value::Object(o)))
            }
        }
    }

    #[cold]
    fn undefined_name(&self, owner: TableOwner, name: Name) -> EvalError {
        undefined_method_name(self.interner.lookup(name), &self.owner_name(owner))
    }
}

fn attr_label(interp: &Interpreter, name: Name) -> &'static str {
    mote_ir::StringInterner::lookup(interp.interner(), name)
}

impl fmt::Debug for ObjectModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectModel")
            .field("classes", &self.classes.len())
            .field("objects", &self.objects.len())
            .finish_non_exhaustive()
    }
}
