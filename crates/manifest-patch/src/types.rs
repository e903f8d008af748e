//! Core types for the patch engine: operation descriptors, concretized
//! operations, handler outcomes and errors.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

pub use manifest_patch_path::{ConcretePath, Path, Segment, Step};

// ── Error ─────────────────────────────────────────────────────────────────

/// Failure of a patch operation.
///
/// Any of these aborts the rest of a patch script.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PatchError {
    #[error("NOT_FOUND: {path} does not exist")]
    NotFound { path: String },
    #[error("EXISTS: {path} already has a value and replace is disabled")]
    Exists { path: String },
    #[error("UNCONSTRUCTIBLE: cannot create {segment} in {path}")]
    Unconstructible { path: String, segment: String },
    #[error("TEST: {path} is {actual}, expected {expected}")]
    Test {
        path: String,
        actual: String,
        expected: String,
    },
    #[error("INVALID_TARGET: {0}")]
    InvalidTarget(String),
    #[error("INVALID_OP: {0}")]
    InvalidOp(String),
}

// ── Test states ───────────────────────────────────────────────────────────

/// An observable outcome of a `test` operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestState {
    Present,
    Absent,
    Equal,
    Unequal,
}

impl TestState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestState::Present => "present",
            TestState::Absent => "absent",
            TestState::Equal => "equal",
            TestState::Unequal => "unequal",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, PatchError> {
        match s {
            "present" => Ok(TestState::Present),
            "absent" => Ok(TestState::Absent),
            "equal" => Ok(TestState::Equal),
            "unequal" => Ok(TestState::Unequal),
            other => Err(PatchError::InvalidOp(format!("unknown test state: {other}"))),
        }
    }
}

impl fmt::Display for TestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render a set of states as `a|b`.
pub(crate) fn join_states(states: &[TestState]) -> String {
    states.iter().map(TestState::as_str).collect::<Vec<_>>().join("|")
}

// ── Operation descriptors ─────────────────────────────────────────────────

/// `add`: overwrite an existing value, or construct a missing one.
#[derive(Debug, Clone, PartialEq)]
pub struct AddOp {
    pub path: Option<Path>,
    pub value: Value,
    /// When false, an existing value at `path` is an error.
    pub replace: bool,
}

/// `remove`: delete a value if it exists.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoveOp {
    pub path: Option<Path>,
}

/// `replace`: overwrite a value that must exist.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaceOp {
    pub path: Option<Path>,
    pub value: Value,
}

/// `test`: assert on presence and equality, or guard nested operations.
#[derive(Debug, Clone, PartialEq)]
pub struct TestOp {
    pub path: Option<Path>,
    pub value: Option<Value>,
    /// Required outcomes. Empty means the default: `equal` when `value` is
    /// set, `present` otherwise.
    pub state: Vec<TestState>,
    /// Guarded operations, run only when the test is satisfied.
    pub operations: Option<Vec<Op>>,
}

/// `copy`: duplicate the value at `from` into `path`.
#[derive(Debug, Clone, PartialEq)]
pub struct CopyOp {
    pub from: Path,
    pub path: Option<Path>,
}

/// `move`: copy, then remove the source.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveOp {
    pub from: Path,
    pub path: Option<Path>,
}

/// A patch operation descriptor.
///
/// `path` is optional only so that operations nested under a guard can
/// inherit the guard's path; every handler requires one.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Add(AddOp),
    Remove(RemoveOp),
    Replace(ReplaceOp),
    Test(TestOp),
    Copy(CopyOp),
    Move(MoveOp),
}

impl Op {
    /// Returns the operation name string.
    pub fn op_name(&self) -> &'static str {
        match self {
            Op::Add(_) => "add",
            Op::Remove(_) => "remove",
            Op::Replace(_) => "replace",
            Op::Test(_) => "test",
            Op::Copy(_) => "copy",
            Op::Move(_) => "move",
        }
    }

    /// Returns the target path of the operation, if set.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Op::Add(op) => op.path.as_ref(),
            Op::Remove(op) => op.path.as_ref(),
            Op::Replace(op) => op.path.as_ref(),
            Op::Test(op) => op.path.as_ref(),
            Op::Copy(op) => op.path.as_ref(),
            Op::Move(op) => op.path.as_ref(),
        }
    }

    fn path_slot(&mut self) -> &mut Option<Path> {
        match self {
            Op::Add(op) => &mut op.path,
            Op::Remove(op) => &mut op.path,
            Op::Replace(op) => &mut op.path,
            Op::Test(op) => &mut op.path,
            Op::Copy(op) => &mut op.path,
            Op::Move(op) => &mut op.path,
        }
    }

    /// Fill in `path` from `parent` when the operation has none.
    pub fn inherit_path(&mut self, parent: Option<&Path>) {
        let slot = self.path_slot();
        if slot.is_none() {
            *slot = parent.cloned();
        }
    }

    /// True for a `test` carrying nested operations.
    pub fn is_guard(&self) -> bool {
        matches!(self, Op::Test(TestOp { operations: Some(_), .. }))
    }
}

// ── Concretized operations ────────────────────────────────────────────────

/// An operation as actually performed, addressed by literal keys and
/// indices only. A list of these replays against another copy of the
/// original document as a plain RFC 6902 patch.
#[derive(Debug, Clone, PartialEq)]
pub enum ConcreteOp {
    Add { path: ConcretePath, value: Value },
    Remove { path: ConcretePath },
    Replace { path: ConcretePath, value: Value },
    Test { path: ConcretePath, value: Value },
}

impl ConcreteOp {
    pub fn op_name(&self) -> &'static str {
        match self {
            ConcreteOp::Add { .. } => "add",
            ConcreteOp::Remove { .. } => "remove",
            ConcreteOp::Replace { .. } => "replace",
            ConcreteOp::Test { .. } => "test",
        }
    }

    pub fn path(&self) -> &ConcretePath {
        match self {
            ConcreteOp::Add { path, .. } => path,
            ConcreteOp::Remove { path } => path,
            ConcreteOp::Replace { path, .. } => path,
            ConcreteOp::Test { path, .. } => path,
        }
    }

    /// True for an `add` whose path ends in the `-` marker.
    pub fn is_append(&self) -> bool {
        matches!(self, ConcreteOp::Add { path, .. } if path.last() == Some(&Step::Append))
    }
}

// ── Handler outcome ───────────────────────────────────────────────────────

/// What a handler did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Nothing needed to change.
    Noop,
    Op(ConcreteOp),
    /// Several operations, in replay order (`move`).
    Ops(Vec<ConcreteOp>),
}

impl Outcome {
    pub fn is_noop(&self) -> bool {
        matches!(self, Outcome::Noop)
    }

    /// Flatten into a list of concretized operations.
    pub fn into_ops(self) -> Vec<ConcreteOp> {
        match self {
            Outcome::Noop => Vec::new(),
            Outcome::Op(op) => vec![op],
            Outcome::Ops(ops) => ops,
        }
    }
}

// ── Options ───────────────────────────────────────────────────────────────

/// Options for `apply_patch`.
#[derive(Debug, Clone, Default)]
pub struct PatchOptions {
    /// If true, patch the document in place; a failure leaves the
    /// operations before it applied.
    /// If false, patch a clone and write it back only when every operation
    /// succeeded.
    pub mutate: bool,
}
