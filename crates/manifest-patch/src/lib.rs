//! Patch engine for configuration documents.
//!
//! Applies JSON Patch style operations (`add`, `remove`, `replace`, `test`,
//! `copy`, `move`) to a `serde_json::Value`, addressing list entries either
//! by position or by a field-equality query such as `[?name='app']`. Every
//! run also yields the operations actually performed, rewritten with plain
//! keys and indices, so the same change can be replayed as an RFC 6902
//! patch elsewhere.
//!
//! Differences from RFC 6902:
//!
//! - `add` on an existing value overwrites it (reported as `replace`) and
//!   is a no-op when the value is already equal; `replace: false` turns the
//!   overwrite into an error.
//! - `add` to a missing list entry appends a new entry built from the query
//!   field and the rest of the path.
//! - `remove` of something absent is a no-op.
//! - `test` checks `present`/`absent`/`equal`/`unequal` states, and with
//!   nested `operations` acts as a guard instead of an assertion.
//!
//! # Example
//!
//! ```
//! use manifest_patch::{from_json_patch, run, to_json_patch};
//! use serde_json::json;
//!
//! let mut doc = json!({"spec": {"env": [{"name": "A", "value": "1"}]}});
//! let ops = from_json_patch(&json!([
//!     {"op": "add", "path": "/spec/env/[?name='A']/value", "value": "2"},
//!     {"op": "add", "path": "/spec/env/[?name='B']/value", "value": "3"}
//! ]))
//! .unwrap();
//!
//! let emitted = run(&mut doc, &ops).unwrap();
//! assert_eq!(
//!     to_json_patch(&emitted),
//!     json!([
//!         {"op": "replace", "path": "/spec/env/0/value", "value": "2"},
//!         {"op": "add", "path": "/spec/env/-", "value": {"name": "B", "value": "3"}}
//!     ])
//! );
//! ```

pub mod types;
pub mod apply;
pub mod predicate;
pub mod runner;
pub mod codec;
pub mod merge;

pub use types::{
    AddOp, ConcreteOp, CopyOp, MoveOp, Op, Outcome, PatchError, PatchOptions, RemoveOp, ReplaceOp,
    TestOp, TestState,
};
pub use apply::{apply_add, apply_copy, apply_move, apply_remove, apply_replace};
pub use predicate::{apply_test, evaluate_test, required_states, TestEvaluation};
pub use runner::{apply_op, apply_patch, run};
pub use codec::json::{from_json, from_json_patch, to_json, to_json_patch};
pub use merge::{deep_merge, merge_into};

pub use manifest_patch_path as path;
