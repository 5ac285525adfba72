//! Method resolution chain.
//!
//! # Resolution Order
//!
//! 1. `SingletonResolver` (priority 0): the receiver's singleton table and
//!    extended modules, or the metaclass chain for a class object
//! 2. `ClassChainResolver` (priority 1): the linearized ancestors of the
//!    receiver's class
//!
//! The `MethodDispatcher` tries resolvers in priority order. The first one
//! that finds an entry *or* an undefined marker decides the outcome; an
//! undefined marker hides every later resolver.

mod class_chain;
mod singleton;

pub use class_chain::ClassChainResolver;
pub use singleton::SingletonResolver;

use mote_ir::Name;

use crate::method_table::{MethodEntry, TableOwner};
use crate::object_model::ObjectModel;
use crate::value::Value;

/// Result of method resolution.
#[derive(Clone, Debug)]
pub enum MethodResolution {
    /// A live entry.
    Found(MethodEntry),
    /// An undefined marker was reached first.
    Undefined,
    /// Nothing on this resolver's part of the path.
    NotFound,
}

impl MethodResolution {
    /// Search `path` on `model` and classify the first hit.
    fn search(model: &ObjectModel, path: &[TableOwner], name: Name) -> Self {
        match model.search(path, name) {
            Some(entry) if entry.is_undefined() => MethodResolution::Undefined,
            Some(entry) => MethodResolution::Found(entry.clone()),
            None => MethodResolution::NotFound,
        }
    }

    #[inline]
    pub fn is_found(&self) -> bool {
        matches!(self, MethodResolution::Found(_))
    }
}

/// One stage of the resolution chain.
pub trait MethodResolver {
    fn resolve(&self, model: &ObjectModel, receiver: &Value, name: Name) -> MethodResolution;

    /// Lower runs first.
    fn priority(&self) -> u8;

    fn name(&self) -> &'static str;
}

/// Enum dispatch over the concrete resolvers.
#[derive(Clone, Debug)]
pub enum MethodResolverKind {
    Singleton(SingletonResolver),
    ClassChain(ClassChainResolver),
}

impl MethodResolverKind {
    pub fn resolve(&self, model: &ObjectModel, receiver: &Value, name: Name) -> MethodResolution {
        match self {
            MethodResolverKind::Singleton(r) => r.resolve(model, receiver, name),
            MethodResolverKind::ClassChain(r) => r.resolve(model, receiver, name),
        }
    }

    pub fn priority(&self) -> u8 {
        match self {
            MethodResolverKind::Singleton(r) => r.priority(),
            MethodResolverKind::ClassChain(r) => r.priority(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MethodResolverKind::Singleton(r) => r.name(),
            MethodResolverKind::ClassChain(r) => r.name(),
        }
    }
}

/// Chains resolvers in priority order.
#[derive(Clone, Debug)]
pub struct MethodDispatcher {
    resolvers: Vec<MethodResolverKind>,
}

impl MethodDispatcher {
    pub fn new(mut resolvers: Vec<MethodResolverKind>) -> Self {
        resolvers.sort_by_key(MethodResolverKind::priority);
        MethodDispatcher { resolvers }
    }

    /// Singleton stage before class chain.
    pub fn standard() -> Self {
        Self::new(vec![
            MethodResolverKind::ClassChain(ClassChainResolver),
            MethodResolverKind::Singleton(SingletonResolver),
        ])
    }

    pub fn resolve(&self, model: &ObjectModel, receiver: &Value, name: Name) -> MethodResolution {
        for resolver in &self.resolvers {
            match resolver.resolve(model, receiver, name) {
                MethodResolution::NotFound => {}
                decided => {
                    tracing::trace!(resolver = resolver.name(), found = decided.is_found(), "resolved");
                    return decided;
                }
            }
        }
        MethodResolution::NotFound
    }

    pub fn resolver_names(&self) -> Vec<&'static str> {
        self.resolvers.iter().map(MethodResolverKind::name).collect()
    }
}
