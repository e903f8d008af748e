//! Path resolution against a document.

use serde_json::Value;
use tracing::trace;

use crate::types::{ConcretePath, Segment, Step};

/// Outcome of walking a path against a document.
///
/// Resolution stops at the first segment that cannot be followed. Everything
/// before it is reported concretized in `matched`; it and everything after it
/// is reported verbatim in `unmatched`.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<'a> {
    /// The resolved value. `None` if resolution stopped early.
    pub value: Option<&'a Value>,
    /// The container that holds, or was expected to hold, the next element.
    /// `None` only for the root path.
    pub context: Option<&'a Value>,
    /// On success the concrete key or index used against `context`, on a
    /// miss the raw segment that failed. `None` only for the root path.
    pub key: Option<Segment>,
    /// Resolved prefix, concretized.
    pub matched: ConcretePath,
    /// Unresolved suffix, starting at the failing segment.
    pub unmatched: Vec<Segment>,
}

impl Resolution<'_> {
    /// True when every segment resolved.
    pub fn is_resolved(&self) -> bool {
        self.unmatched.is_empty()
    }
}

/// Walk `path` against `doc`.
///
/// A type mismatch between container and segment (a key against a sequence,
/// an index or query against a mapping, anything against a scalar) is
/// reported the same way as a missing key.
///
/// # Example
///
/// ```
/// use manifest_patch_path::{parse_path, resolve, Segment, Step};
/// use serde_json::json;
///
/// let doc = json!({"env": [{"name": "A", "value": "1"}, {"name": "B", "value": "2"}]});
///
/// let found = resolve(&doc, &parse_path("/env/[?name='B']/value"));
/// assert_eq!(found.value, Some(&json!("2")));
/// assert_eq!(found.matched, vec![Step::Key("env".into()), Step::Index(1), Step::Key("value".into())]);
///
/// let missing = resolve(&doc, &parse_path("/env/[?name='C']/value"));
/// assert!(!missing.is_resolved());
/// assert_eq!(missing.matched, vec![Step::Key("env".into())]);
/// assert_eq!(missing.unmatched.len(), 2);
/// ```
pub fn resolve<'a>(doc: &'a Value, path: &[Segment]) -> Resolution<'a> {
    let mut current = doc;
    let mut context = None;
    let mut key = None;
    let mut matched = Vec::with_capacity(path.len());

    for (i, segment) in path.iter().enumerate() {
        match descend(current, segment) {
            Some((step, next)) => {
                context = Some(current);
                key = Some(step.to_segment());
                matched.push(step);
                current = next;
            }
            None => {
                trace!(segment = %segment, depth = i, "path resolution stopped");
                return Resolution {
                    value: None,
                    context: Some(current),
                    key: Some(segment.clone()),
                    matched,
                    unmatched: path[i..].to_vec(),
                };
            }
        }
    }

    Resolution {
        value: Some(current),
        context,
        key,
        matched,
        unmatched: Vec::new(),
    }
}

fn descend<'a>(current: &'a Value, segment: &Segment) -> Option<(Step, &'a Value)> {
    match (current, segment) {
        (Value::Object(map), Segment::Key(key)) => {
            map.get(key).map(|next| (Step::Key(key.clone()), next))
        }
        (Value::Array(arr), Segment::Index(idx)) => arr.get(*idx).map(|next| (Step::Index(*idx), next)),
        (Value::Array(arr), Segment::Query { field, value }) => arr
            .iter()
            .position(|item| query_matches(item, field, value))
            .map(|idx| (Step::Index(idx), &arr[idx])),
        _ => None,
    }
}

/// True if `item` is a mapping whose `field` entry equals `literal`.
pub fn query_matches(item: &Value, field: &str, literal: &str) -> bool {
    item.as_object()
        .and_then(|map| map.get(field))
        .is_some_and(|candidate| literal_matches(candidate, literal))
}

/// Compare a scalar against a textual query literal.
///
/// Strings compare verbatim, booleans by their `true`/`false` spelling,
/// numbers by canonical rendering or numeric value. Null and containers
/// never match.
pub fn literal_matches(candidate: &Value, literal: &str) -> bool {
    match candidate {
        Value::String(s) => s == literal,
        Value::Bool(b) => literal == if *b { "true" } else { "false" },
        Value::Number(n) => {
            n.to_string() == literal
                || match (n.as_f64(), literal.parse::<f64>()) {
                    (Some(a), Ok(b)) => a == b,
                    _ => false,
                }
        }
        Value::Null | Value::Array(_) | Value::Object(_) => false,
    }
}
