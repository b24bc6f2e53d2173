//! Deep merge of YAML mappings
//!
//! Nested mappings merge key by key. Every other value (scalars, sequences,
//! or a mapping meeting a non-mapping) is replaced outright by the overlay.

use serde_yaml_ng::{Mapping, Value};

/// Merge `overlay` into `base` in place.
pub fn deep_merge(base: &mut Mapping, overlay: &Mapping) {
    for (key, value) in overlay {
        if let (Some(Value::Mapping(existing)), Value::Mapping(incoming)) =
            (base.get_mut(key), value)
        {
            deep_merge(existing, incoming);
            continue;
        }
        base.insert(key.clone(), value.clone());
    }
}

/// Merge `overlay` onto a copy of `base`.
pub fn merged(base: &Mapping, overlay: &Mapping) -> Mapping {
    let mut result = base.clone();
    deep_merge(&mut result, overlay);
    result
}
