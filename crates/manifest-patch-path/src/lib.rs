//! Path addressing for manifest patches.
//!
//! Paths look like JSON Pointers (RFC 6901) with one extension: a segment
//! written `[?field='value']` selects the first element of a sequence that is
//! a mapping whose `field` equals `value`. This is how list entries with a
//! stable name (containers, environment variables, ports) are addressed when
//! their position is not stable.
//!
//! # Example
//!
//! ```
//! use manifest_patch_path::{format_concrete_path, get, parse_path, resolve};
//! use serde_json::json;
//!
//! let doc = json!({"spec": {"containers": [{"name": "app", "image": "nginx"}]}});
//!
//! let res = resolve(&doc, &parse_path("/spec/containers/[?name='app']/image"));
//! assert_eq!(res.value, Some(&json!("nginx")));
//! assert_eq!(format_concrete_path(&res.matched), "/spec/containers/0/image");
//!
//! // A concretized path replays with plain key and index lookups.
//! assert_eq!(get(&doc, &res.matched), Some(&json!("nginx")));
//! ```

use serde_json::Value;

pub mod types;
pub use types::{ConcretePath, Path, Segment, Step};

pub mod parse;
pub use parse::{is_integer, parse_path, parse_segment};

pub mod resolve;
pub use resolve::{literal_matches, query_matches, resolve, Resolution};

/// Unescapes a path key.
///
/// Per RFC 6901, `~1` is replaced with `/` and `~0` is replaced with `~`.
///
/// ```
/// use manifest_patch_path::unescape_component;
///
/// assert_eq!(unescape_component("a~0b"), "a~b");
/// assert_eq!(unescape_component("c~1d"), "c/d");
/// ```
pub fn unescape_component(component: &str) -> String {
    if !component.contains('~') {
        return component.to_string();
    }
    // ~1 before ~0, otherwise "~01" would decode to "/"
    component.replace("~1", "/").replace("~0", "~")
}

/// Escapes a path key.
///
/// ```
/// use manifest_patch_path::escape_component;
///
/// assert_eq!(escape_component("a~b"), "a~0b");
/// assert_eq!(escape_component("c/d"), "c~1d");
/// ```
pub fn escape_component(component: &str) -> String {
    if !component.contains('/') && !component.contains('~') {
        return component.to_string();
    }
    component.replace('~', "~0").replace('/', "~1")
}

/// Format a parsed path back into its textual form.
///
/// Query segments are written verbatim, so the result is only a plain JSON
/// Pointer when the path has no queries.
pub fn format_path(path: &[Segment]) -> String {
    let mut out = String::new();
    for segment in path {
        out.push('/');
        out.push_str(&segment.to_string());
    }
    out
}

/// Format a concretized path as a JSON Pointer.
///
/// Returns an empty string for the root path.
///
/// ```
/// use manifest_patch_path::{format_concrete_path, Step};
///
/// assert_eq!(format_concrete_path(&[]), "");
/// assert_eq!(
///     format_concrete_path(&[Step::Key("env".into()), Step::Append]),
///     "/env/-"
/// );
/// ```
pub fn format_concrete_path(path: &[Step]) -> String {
    let mut out = String::new();
    for step in path {
        out.push('/');
        out.push_str(&step.to_string());
    }
    out
}

/// Get a value by concretized path.
///
/// Returns `None` if the path doesn't exist. [`Step::Append`] never
/// resolves.
pub fn get<'a>(val: &'a Value, path: &[Step]) -> Option<&'a Value> {
    let mut current = val;
    for step in path {
        current = match (current, step) {
            (Value::Object(map), Step::Key(key)) => map.get(key)?,
            (Value::Array(arr), Step::Index(idx)) => arr.get(*idx)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Get a mutable reference to a value by concretized path.
pub fn get_mut<'a>(val: &'a mut Value, path: &[Step]) -> Option<&'a mut Value> {
    let mut current = val;
    for step in path {
        current = match (current, step) {
            (Value::Object(map), Step::Key(key)) => map.get_mut(key)?,
            (Value::Array(arr), Step::Index(idx)) => arr.get_mut(*idx)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Check if `parent` is a strict prefix of `child`.
pub fn is_child(parent: &[Step], child: &[Step]) -> bool {
    parent.len() < child.len() && child.starts_with(parent)
}
