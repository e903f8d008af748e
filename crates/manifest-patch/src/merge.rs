//! Deep merge of a partial document into a full one.
//!
//! Mappings merge key by key, sequences merge position by position (extra
//! patch elements are appended), and anything else in the patch replaces
//! what the source had.

use serde_json::{Map, Value};

/// Merge `patch` into a copy of `source`.
///
/// ```
/// use manifest_patch::deep_merge;
/// use serde_json::json;
///
/// let live = json!({"metadata": {"name": "app", "labels": {"tier": "web"}}});
/// let desired = json!({"metadata": {"labels": {"team": "core"}}});
/// assert_eq!(
///     deep_merge(&live, &desired),
///     json!({"metadata": {"name": "app", "labels": {"tier": "web", "team": "core"}}})
/// );
/// ```
pub fn deep_merge(source: &Value, patch: &Value) -> Value {
    let mut result = source.clone();
    merge_into(&mut result, patch);
    result
}

/// Merge `patch` into `target` in place.
pub fn merge_into(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => merge_maps(target, patch),
        (Value::Array(target), Value::Array(patch)) => merge_lists(target, patch),
        (target, patch) => *target = patch.clone(),
    }
}

fn merge_maps(target: &mut Map<String, Value>, patch: &Map<String, Value>) {
    for (key, value) in patch {
        match target.get_mut(key) {
            Some(existing) => merge_into(existing, value),
            None => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

fn merge_lists(target: &mut Vec<Value>, patch: &[Value]) {
    for (idx, value) in patch.iter().enumerate() {
        match target.get_mut(idx) {
            Some(existing) => merge_into(existing, value),
            None => target.push(value.clone()),
        }
    }
}
