//! Method entries and the per-owner tables that hold them.
//!
//! A table keeps entries in definition order. Redefining a name overwrites
//! the entry in place, so a later `def` or visibility directive replaces the
//! earlier one without moving it.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use mote_ir::Name;

use crate::closure::Closure;
use crate::errors::EvalResult;
use crate::interpreter::{Interpreter, Invocation};
use crate::object_model::{ClassId, ObjectId};

/// Method visibility.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        })
    }
}

/// The table an entry was defined in.
///
/// Doubles as the table reference returned by lookup paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TableOwner {
    /// Instance methods of a class or module.
    Module(ClassId),
    /// Methods on the class object itself (`def self.x`, `class << self`).
    Meta(ClassId),
    /// Methods on a single object.
    Singleton(ObjectId),
}

/// Native method or closure body.
pub type NativeFn = Rc<dyn Fn(&mut Interpreter, Invocation) -> EvalResult>;

/// Box a Rust callable as a `NativeFn`.
#[inline]
pub fn native_fn(f: impl Fn(&mut Interpreter, Invocation) -> EvalResult + 'static) -> NativeFn {
    Rc::new(f)
}

/// What runs when an entry is invoked.
#[derive(Clone)]
pub enum MethodBody {
    /// Rust callable. `primitive` bodies run in frames that are invisible to
    /// `block_given?` and binding capture.
    Native { func: NativeFn, primitive: bool },
    /// Body defined with `define_method`.
    Closure(Closure),
    /// `undef_method` marker: stops lookup with "not found".
    Undefined,
}

impl fmt::Debug for MethodBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodBody::Native { primitive, .. } => {
                f.debug_struct("Native").field("primitive", primitive).finish()
            }
            MethodBody::Closure(closure) => f.debug_tuple("Closure").field(closure).finish(),
            MethodBody::Undefined => f.write_str("Undefined"),
        }
    }
}

/// A named, invokable method.
#[derive(Clone, Debug)]
pub struct MethodEntry {
    pub name: Name,
    pub visibility: Visibility,
    pub owner: TableOwner,
    pub body: MethodBody,
}

impl MethodEntry {
    pub fn native(
        name: Name,
        visibility: Visibility,
        owner: TableOwner,
        func: impl Fn(&mut Interpreter, Invocation) -> EvalResult + 'static,
    ) -> Self {
        MethodEntry {
            name,
            visibility,
            owner,
            body: MethodBody::Native {
                func: Rc::new(func),
                primitive: false,
            },
        }
    }

    /// Undefined marker for `name`.
    pub fn undefined(name: Name, owner: TableOwner) -> Self {
        MethodEntry {
            name,
            visibility: Visibility::Public,
            owner,
            body: MethodBody::Undefined,
        }
    }

    #[inline]
    pub fn is_undefined(&self) -> bool {
        matches!(self.body, MethodBody::Undefined)
    }

    #[inline]
    pub fn is_primitive(&self) -> bool {
        matches!(self.body, MethodBody::Native { primitive: true, .. })
    }

    /// Copy of this entry re-homed into another table.
    #[must_use]
    pub fn rehomed(&self, name: Name, owner: TableOwner, visibility: Visibility) -> Self {
        MethodEntry {
            name,
            visibility,
            owner,
            body: self.body.clone(),
        }
    }
}

/// Name-keyed method table in definition order.
#[derive(Clone, Debug, Default)]
pub struct MethodTable {
    entries: Vec<MethodEntry>,
    index: FxHashMap<Name, usize>,
}

impl MethodTable {
    pub fn new() -> Self {
        MethodTable::default()
    }

    #[inline]
    pub fn get(&self, name: Name) -> Option<&MethodEntry> {
        self.index.get(&name).map(|&i| &self.entries[i])
    }

    #[inline]
    pub fn contains(&self, name: Name) -> bool {
        self.index.contains_key(&name)
    }

    /// Insert, or overwrite in place when the name is already present.
    pub fn insert(&mut self, entry: MethodEntry) {
        if let Some(&i) = self.index.get(&entry.name) {
            self.entries[i] = entry;
        } else {
            self.index.insert(entry.name, self.entries.len());
            self.entries.push(entry);
        }
    }

    /// Remove the entry for `name`, keeping the order of the rest.
    pub fn remove(&mut self, name: Name) -> Option<MethodEntry> {
        let i = self.index.remove(&name)?;
        let removed = self.entries.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Some(removed)
    }

    /// Overwrite the visibility of an owned entry. Returns false when the
    /// table has no live entry for `name`.
    pub fn set_visibility(&mut self, name: Name, visibility: Visibility) -> bool {
        match self.index.get(&name) {
            Some(&i) if !self.entries[i].is_undefined() => {
                self.entries[i].visibility = visibility;
                true
            }
            _ => false,
        }
    }

    /// Entries in definition order, undefined markers included.
    pub fn iter(&self) -> impl Iterator<Item = &MethodEntry> {
        self.entries.iter()
    }

    /// Names of live entries whose visibility passes `filter`.
    pub fn names_where(&self, filter: impl Fn(Visibility) -> bool) -> Vec<Name> {
        self.entries
            .iter()
            .filter(|e| !e.is_undefined() && filter(e.visibility))
            .map(|e| e.name)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
