//! Per-receiver stage: singleton table, extended modules, metaclass chain.

use mote_ir::Name;

use crate::object_model::ObjectModel;
use crate::value::Value;

use super::{MethodResolution, MethodResolver};

/// Priority 0. Finds nothing for receivers without a singleton table.
#[derive(Clone, Copy, Debug, Default)]
pub struct SingletonResolver;

impl MethodResolver for SingletonResolver {
    fn resolve(&self, model: &ObjectModel, receiver: &Value, name: Name) -> MethodResolution {
        let path = model.singleton_path(receiver);
        if path.is_empty() {
            return MethodResolution::NotFound;
        }
        MethodResolution::search(model, &path, name)
    }

    fn priority(&self) -> u8 {
        0
    }

    fn name(&self) -> &'static str {
        "SingletonResolver"
    }
}
