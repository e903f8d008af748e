//! JSON codec for patch scripts.
//!
//! Decodes operation descriptors from `serde_json::Value` and encodes
//! concretized operations back into RFC 6902 objects.

use manifest_patch_path::{format_concrete_path, parse_path};
use serde_json::{json, Map, Value};

use crate::types::{
    AddOp, ConcreteOp, CopyOp, MoveOp, Op, Path, PatchError, RemoveOp, ReplaceOp, TestOp, TestState,
};

// ── Field helpers ─────────────────────────────────────────────────────────

fn decode_path(v: &Value, field: &str) -> Result<Path, PatchError> {
    let s = v
        .as_str()
        .ok_or_else(|| PatchError::InvalidOp(format!("'{field}' must be a string")))?;
    Ok(parse_path(s))
}

fn decode_states(v: &Value) -> Result<Vec<TestState>, PatchError> {
    match v {
        Value::String(s) => Ok(vec![TestState::from_str(s)?]),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .ok_or_else(|| PatchError::InvalidOp("'state' entries must be strings".into()))
                    .and_then(TestState::from_str)
            })
            .collect(),
        _ => Err(PatchError::InvalidOp(
            "'state' must be a string or a list of strings".into(),
        )),
    }
}

fn required_value(obj: &Map<String, Value>, op: &str) -> Result<Value, PatchError> {
    obj.get("value")
        .cloned()
        .ok_or_else(|| PatchError::InvalidOp(format!("{op} requires 'value'")))
}

fn required_from(obj: &Map<String, Value>, op: &str) -> Result<Path, PatchError> {
    let from = obj
        .get("from")
        .ok_or_else(|| PatchError::InvalidOp(format!("{op} requires 'from'")))?;
    decode_path(from, "from")
}

// ── Deserialization ───────────────────────────────────────────────────────

/// Deserialize a `serde_json::Value` into an `Op`.
///
/// `path` may be omitted; the runner fills it in for operations nested
/// under a guard and rejects it anywhere else.
pub fn from_json(v: &Value) -> Result<Op, PatchError> {
    let obj = v
        .as_object()
        .ok_or_else(|| PatchError::InvalidOp("operation must be an object".into()))?;
    let op_str = obj
        .get("op")
        .and_then(|v| v.as_str())
        .ok_or_else(|| PatchError::InvalidOp("missing 'op' field".into()))?;

    let path = obj.get("path").map(|p| decode_path(p, "path")).transpose()?;

    match op_str {
        "add" => {
            let value = required_value(obj, "add")?;
            let replace = match obj.get("replace") {
                None => true,
                Some(Value::Bool(b)) => *b,
                Some(_) => return Err(PatchError::InvalidOp("'replace' must be a boolean".into())),
            };
            Ok(Op::Add(AddOp { path, value, replace }))
        }
        "remove" => Ok(Op::Remove(RemoveOp { path })),
        "replace" => {
            let value = required_value(obj, "replace")?;
            Ok(Op::Replace(ReplaceOp { path, value }))
        }
        "test" => {
            let value = obj.get("value").cloned();
            let state = obj.get("state").map(decode_states).transpose()?.unwrap_or_default();
            let operations = obj.get("operations").map(from_json_patch).transpose()?;
            Ok(Op::Test(TestOp {
                path,
                value,
                state,
                operations,
            }))
        }
        "copy" => {
            let from = required_from(obj, "copy")?;
            Ok(Op::Copy(CopyOp { from, path }))
        }
        "move" => {
            let from = required_from(obj, "move")?;
            Ok(Op::Move(MoveOp { from, path }))
        }
        other => Err(PatchError::InvalidOp(format!("unknown op: {other}"))),
    }
}

/// Deserialize a JSON array into a list of operations.
pub fn from_json_patch(v: &Value) -> Result<Vec<Op>, PatchError> {
    let arr = v
        .as_array()
        .ok_or_else(|| PatchError::InvalidOp("patch must be an array".into()))?;
    arr.iter().map(from_json).collect()
}

// ── Serialization ─────────────────────────────────────────────────────────

/// Serialize a `ConcreteOp` into an RFC 6902 operation object.
pub fn to_json(op: &ConcreteOp) -> Value {
    match op {
        ConcreteOp::Add { path, value } => json!({
            "op": "add",
            "path": format_concrete_path(path),
            "value": value
        }),
        ConcreteOp::Remove { path } => json!({
            "op": "remove",
            "path": format_concrete_path(path)
        }),
        ConcreteOp::Replace { path, value } => json!({
            "op": "replace",
            "path": format_concrete_path(path),
            "value": value
        }),
        ConcreteOp::Test { path, value } => json!({
            "op": "test",
            "path": format_concrete_path(path),
            "value": value
        }),
    }
}

/// Serialize a list of concretized operations to a JSON array.
pub fn to_json_patch(ops: &[ConcreteOp]) -> Value {
    Value::Array(ops.iter().map(to_json).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use manifest_patch_path::{Segment, Step};

    #[test]
    fn decode_add_defaults_replace() {
        let op = from_json(&json!({"op": "add", "path": "/a", "value": 1})).unwrap();
        assert_eq!(
            op,
            Op::Add(AddOp {
                path: Some(vec![Segment::Key("a".into())]),
                value: json!(1),
                replace: true,
            })
        );
    }

    #[test]
    fn decode_add_replace_false() {
        let op = from_json(&json!({"op": "add", "path": "/a", "value": 1, "replace": false})).unwrap();
        assert!(matches!(op, Op::Add(AddOp { replace: false, .. })));
        assert!(from_json(&json!({"op": "add", "path": "/a", "value": 1, "replace": "no"})).is_err());
    }

    #[test]
    fn decode_state_string_or_list() {
        let single = from_json(&json!({"op": "test", "path": "/a", "state": "absent"})).unwrap();
        let list = from_json(&json!({"op": "test", "path": "/a", "state": ["unequal", "absent"]})).unwrap();
        match (single, list) {
            (Op::Test(single), Op::Test(list)) => {
                assert_eq!(single.state, vec![TestState::Absent]);
                assert_eq!(list.state, vec![TestState::Unequal, TestState::Absent]);
            }
            other => panic!("expected tests, got {other:?}"),
        }
        assert!(from_json(&json!({"op": "test", "path": "/a", "state": "gone"})).is_err());
        assert!(from_json(&json!({"op": "test", "path": "/a", "state": [1]})).is_err());
    }

    #[test]
    fn decode_guard_with_pathless_nested_ops() {
        let op = from_json(&json!({
            "op": "test",
            "path": "/spec/env/[?name='A']/value",
            "state": "present",
            "operations": [{"op": "add", "value": "replaced"}]
        }))
        .unwrap();
        assert!(op.is_guard());
        match op {
            Op::Test(TestOp { operations: Some(nested), .. }) => {
                assert_eq!(nested.len(), 1);
                assert_eq!(nested[0].path(), None);
            }
            other => panic!("expected guard, got {other:?}"),
        }
    }

    #[test]
    fn decode_copy_and_move_require_from() {
        assert!(from_json(&json!({"op": "copy", "path": "/a"})).is_err());
        assert!(from_json(&json!({"op": "move", "path": "/a", "from": 3})).is_err());
        let op = from_json(&json!({"op": "move", "path": "/a", "from": "/b"})).unwrap();
        assert_eq!(op.op_name(), "move");
    }

    #[test]
    fn decode_rejects_malformed() {
        assert!(from_json(&json!("add")).is_err());
        assert!(from_json(&json!({"path": "/a"})).is_err());
        assert!(from_json(&json!({"op": "inc", "path": "/a"})).is_err());
        assert!(from_json(&json!({"op": "replace", "path": "/a"})).is_err());
        assert!(from_json(&json!({"op": "remove", "path": 5})).is_err());
        assert!(from_json_patch(&json!({"op": "remove", "path": "/a"})).is_err());
    }

    #[test]
    fn encode_append_path() {
        let op = ConcreteOp::Add {
            path: vec![Step::Key("spec".into()), Step::Key("env".into()), Step::Append],
            value: json!({"name": "C"}),
        };
        assert_eq!(
            to_json(&op),
            json!({"op": "add", "path": "/spec/env/-", "value": {"name": "C"}})
        );
    }

    #[test]
    fn encode_patch() {
        let ops = vec![
            ConcreteOp::Remove { path: vec![Step::Key("a~b".into()), Step::Index(0)] },
            ConcreteOp::Test { path: vec![], value: json!(null) },
        ];
        assert_eq!(
            to_json_patch(&ops),
            json!([
                {"op": "remove", "path": "/a~0b/0"},
                {"op": "test", "path": "", "value": null}
            ])
        );
    }
}
