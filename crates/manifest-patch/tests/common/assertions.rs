#![allow(dead_code)]

use serde_json::Value;

use super::fixtures::Check;

/// Compare literal RFC 6901 pointers into `doc` against expected values.
pub fn compare_checks(doc: &Value, checks: &[Check]) -> Result<(), String> {
    for check in checks {
        match doc.pointer(&check.path) {
            Some(actual) if *actual == check.value => {}
            Some(actual) => {
                return Err(format!(
                    "{}: expected {}, got {}",
                    check.path, check.value, actual
                ))
            }
            None => return Err(format!("{}: missing, expected {}", check.path, check.value)),
        }
    }
    Ok(())
}

/// Replay an emitted RFC 6902 patch with plain pointer semantics.
///
/// Supports the four operations the engine emits and treats a trailing `-`
/// as append.
pub fn replay(doc: &mut Value, patch: &Value) -> Result<(), String> {
    let ops = patch.as_array().ok_or("patch must be an array")?;
    for op in ops {
        let name = op["op"].as_str().ok_or("missing op")?;
        let path = op["path"].as_str().ok_or("missing path")?;
        match name {
            "add" => pointer_add(doc, path, op["value"].clone())?,
            "replace" => {
                let slot = doc.pointer_mut(path).ok_or_else(|| format!("replace: {path} missing"))?;
                *slot = op["value"].clone();
            }
            "remove" => pointer_remove(doc, path)?,
            "test" => {
                let actual = doc.pointer(path).ok_or_else(|| format!("test: {path} missing"))?;
                if *actual != op["value"] {
                    return Err(format!("test: {path} is {actual}"));
                }
            }
            other => return Err(format!("unexpected op {other}")),
        }
    }
    Ok(())
}

fn split_parent(path: &str) -> Result<(&str, String), String> {
    let idx = path.rfind('/').ok_or_else(|| format!("bad pointer {path}"))?;
    let last = path[idx + 1..].replace("~1", "/").replace("~0", "~");
    Ok((&path[..idx], last))
}

fn pointer_add(doc: &mut Value, path: &str, value: Value) -> Result<(), String> {
    if path.is_empty() {
        *doc = value;
        return Ok(());
    }
    let (parent, last) = split_parent(path)?;
    match doc.pointer_mut(parent) {
        Some(Value::Object(map)) => {
            map.insert(last, value);
            Ok(())
        }
        Some(Value::Array(arr)) if last == "-" => {
            arr.push(value);
            Ok(())
        }
        Some(Value::Array(arr)) => {
            let idx: usize = last.parse().map_err(|_| format!("bad index {last}"))?;
            if idx > arr.len() {
                return Err(format!("add: index {idx} out of range"));
            }
            arr.insert(idx, value);
            Ok(())
        }
        _ => Err(format!("add: parent of {path} missing")),
    }
}

fn pointer_remove(doc: &mut Value, path: &str) -> Result<(), String> {
    let (parent, last) = split_parent(path)?;
    match doc.pointer_mut(parent) {
        Some(Value::Object(map)) => map
            .shift_remove(&last)
            .map(|_| ())
            .ok_or_else(|| format!("remove: {path} missing")),
        Some(Value::Array(arr)) => {
            let idx: usize = last.parse().map_err(|_| format!("bad index {last}"))?;
            if idx >= arr.len() {
                return Err(format!("remove: {path} missing"));
            }
            arr.remove(idx);
            Ok(())
        }
        _ => Err(format!("remove: parent of {path} missing")),
    }
}
