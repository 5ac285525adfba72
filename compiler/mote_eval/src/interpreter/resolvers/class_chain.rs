//! Class-derived stage: the receiver's class and its ancestors.

use mote_ir::Name;

use crate::object_model::ObjectModel;
use crate::value::Value;

use super::{MethodResolution, MethodResolver};

/// Priority 1.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClassChainResolver;

impl MethodResolver for ClassChainResolver {
    fn resolve(&self, model: &ObjectModel, receiver: &Value, name: Name) -> MethodResolution {
        let path = model.class_path(receiver);
        MethodResolution::search(model, &path, name)
    }

    fn priority(&self) -> u8 {
        1
    }

    fn name(&self) -> &'static str {
        "ClassChainResolver"
    }
}
