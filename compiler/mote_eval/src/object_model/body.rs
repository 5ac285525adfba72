//! Class-body definition cursor.
//!
//! `ClassBody` plays the role of the text between `class X` and `end`: it
//! tracks the current default-visibility section so that `private` followed
//! by `def` gives a private method, while `def self.x` stays public no matter
//! which section it appears in. `meta()` opens a `class << self` body with its
//! own default, starting at public.

use mote_ir::Name;

use crate::closure::ClosureKind;
use crate::errors::{EvalError, EvalResult};
use crate::interpreter::{Interpreter, Invocation};
use crate::method_table::{native_fn, MethodBody, TableOwner, Visibility};

use super::ClassId;

/// Names that are private whatever section they are defined in.
const ALWAYS_PRIVATE: &[&str] = &[
    "initialize",
    "initialize_copy",
    "initialize_dup",
    "initialize_clone",
    "respond_to_missing?",
];

/// Open class body.
pub struct ClassBody<'i> {
    interp: &'i mut Interpreter,
    class: ClassId,
    section: Visibility,
    /// `class << self` body.
    meta: bool,
}

impl<'i> ClassBody<'i> {
    pub(crate) fn new(interp: &'i mut Interpreter, class: ClassId, meta: bool) -> Self {
        ClassBody {
            interp,
            class,
            section: Visibility::Public,
            meta,
        }
    }

    pub fn class(&self) -> ClassId {
        self.class
    }

    pub fn interpreter(&mut self) -> &mut Interpreter {
        self.interp
    }

    /// Table that `def` writes to.
    fn owner(&self) -> TableOwner {
        if self.meta {
            TableOwner::Meta(self.class)
        } else {
            TableOwner::Module(self.class)
        }
    }

    fn def_visibility(&self, name: &str) -> Visibility {
        if !self.meta && ALWAYS_PRIVATE.contains(&name) {
            Visibility::Private
        } else {
            self.section
        }
    }

    // Sections

    pub fn public(&mut self) -> &mut Self {
        self.section = Visibility::Public;
        self
    }

    pub fn private(&mut self) -> &mut Self {
        self.section = Visibility::Private;
        self
    }

    pub fn protected(&mut self) -> &mut Self {
        self.section = Visibility::Protected;
        self
    }

    pub fn section(&self) -> Visibility {
        self.section
    }

    // Definitions

    /// `def name ... end` in the current section.
    pub fn def(
        &mut self,
        name: &str,
        body: impl Fn(&mut Interpreter, Invocation) -> EvalResult + 'static,
    ) -> &mut Self {
        let visibility = self.def_visibility(name);
        let owner = self.owner();
        let name = self.interp.intern(name);
        self.interp.model_mut().define_method(
            owner,
            name,
            visibility,
            MethodBody::Native {
                func: native_fn(body),
                primitive: false,
            },
        );
        self
    }

    /// `def self.name ... end`: always public, always on the class object.
    pub fn def_singleton(
        &mut self,
        name: &str,
        body: impl Fn(&mut Interpreter, Invocation) -> EvalResult + 'static,
    ) -> &mut Self {
        let name = self.interp.intern(name);
        self.interp.model_mut().define_method(
            TableOwner::Meta(self.class),
            name,
            Visibility::Public,
            MethodBody::Native {
                func: native_fn(body),
                primitive: false,
            },
        );
        self
    }

    /// `define_method(:name) { |params| ... }`. The body closes over the
    /// frame that is current when the class body runs.
    pub fn define_method(
        &mut self,
        name: &str,
        params: &[&str],
        body: impl Fn(&mut Interpreter, Invocation) -> EvalResult + 'static,
    ) -> &mut Self {
        let visibility = self.def_visibility(name);
        let owner = self.owner();
        let closure = self
            .interp
            .make_closure(params, native_fn(body), ClosureKind::Method);
        let name = self.interp.intern(name);
        self.interp.model_mut().define_method(
            owner,
            name,
            visibility,
            MethodBody::Closure(closure),
        );
        self
    }

    /// `class << self ... end`.
    pub fn meta(
        &mut self,
        f: impl FnOnce(&mut ClassBody<'_>) -> Result<(), EvalError>,
    ) -> Result<&mut Self, EvalError> {
        let mut inner = ClassBody::new(self.interp, self.class, true);
        f(&mut inner)?;
        Ok(self)
    }

    // Directives

    /// `private :a, :b` (or `public` / `protected`).
    pub fn set_visibility(
        &mut self,
        visibility: Visibility,
        names: &[&str],
    ) -> Result<&mut Self, EvalError> {
        let owner = self.owner();
        for name in names {
            let name = self.interp.intern(name);
            self.interp
                .model_mut()
                .set_visibility(owner, name, visibility)?;
        }
        Ok(self)
    }

    pub fn undef_method(&mut self, name: &str) -> Result<&mut Self, EvalError> {
        let owner = self.owner();
        let name = self.interp.intern(name);
        self.interp.model_mut().undefine_method(owner, name)?;
        Ok(self)
    }

    pub fn remove_method(&mut self, name: &str) -> Result<&mut Self, EvalError> {
        let owner = self.owner();
        let name = self.interp.intern(name);
        self.interp.model_mut().remove_method(owner, name)?;
        Ok(self)
    }

    /// `alias new old`.
    pub fn alias_method(&mut self, new: &str, old: &str) -> Result<&mut Self, EvalError> {
        let owner = self.owner();
        let new = self.interp.intern(new);
        let old = self.interp.intern(old);
        self.interp.model_mut().alias_method(owner, new, old)?;
        Ok(self)
    }

    pub fn include(&mut self, module: ClassId) -> Result<&mut Self, EvalError> {
        let class = self.class;
        self.interp.model_mut().include_module(class, module)?;
        Ok(self)
    }

    /// `extend M` inside a class body: extends the class object.
    pub fn extend(&mut self, module: ClassId) -> Result<&mut Self, EvalError> {
        let receiver = crate::value::Value::Class(self.class);
        self.interp
            .model_mut()
            .extend_object(&receiver, module)?;
        Ok(self)
    }

    pub fn attr_reader(&mut self, names: &[&str]) -> &mut Self {
        let (owner, visibility) = (self.owner(), self.section);
        for name in names {
            self.interp.model_mut().attr_reader(owner, name, visibility);
        }
        self
    }

    pub fn attr_writer(&mut self, names: &[&str]) -> &mut Self {
        let (owner, visibility) = (self.owner(), self.section);
        for name in names {
            self.interp.model_mut().attr_writer(owner, name, visibility);
        }
        self
    }

    pub fn attr_accessor(&mut self, names: &[&str]) -> &mut Self {
        self.attr_reader(names).attr_writer(names)
    }

    /// Interned name, for bodies that build symbols.
    pub fn name(&self, s: &str) -> Name {
        self.interp.intern(s)
    }
}
