//! Patch script execution.
//!
//! A script is a fold over its operations: each one sees the document as
//! the previous ones left it, and the first failure ends the script.

use std::borrow::Cow;

use manifest_patch_path::format_path;
use serde_json::Value;
use tracing::debug;

use crate::apply::{apply_add, apply_copy, apply_move, apply_remove, apply_replace};
use crate::predicate::{apply_test, evaluate_test};
use crate::types::{ConcreteOp, Op, Outcome, PatchError, PatchOptions, TestOp};

/// Apply a single operation as a standalone handler call.
///
/// A guard `test` is treated as a plain assertion here; its nested
/// operations only run through [`run`].
pub fn apply_op(doc: &mut Value, op: &Op) -> Result<Outcome, PatchError> {
    match op {
        Op::Add(op) => apply_add(doc, op),
        Op::Remove(op) => apply_remove(doc, op),
        Op::Replace(op) => apply_replace(doc, op),
        Op::Test(op) => apply_test(doc, op),
        Op::Copy(op) => apply_copy(doc, op),
        Op::Move(op) => apply_move(doc, op),
    }
}

/// Run a patch script against `doc` in place.
///
/// Returns the concretized operations actually performed, flattened and in
/// order. On failure the operations before the failing one stay applied.
pub fn run(doc: &mut Value, ops: &[Op]) -> Result<Vec<ConcreteOp>, PatchError> {
    let mut emitted = Vec::new();
    run_into(doc, ops, &mut emitted)?;
    Ok(emitted)
}

fn run_into(doc: &mut Value, ops: &[Op], emitted: &mut Vec<ConcreteOp>) -> Result<(), PatchError> {
    for op in ops {
        debug!(
            op = op.op_name(),
            path = %op.path().map(|p| format_path(p)).unwrap_or_default(),
            "applying patch operation"
        );
        match op {
            Op::Test(guard @ TestOp { operations: Some(nested), .. }) => {
                run_guard(doc, guard, nested, emitted)?;
            }
            other => {
                let ops = apply_op(doc, other)?.into_ops();
                for concrete in &ops {
                    debug!(op = concrete.op_name(), path = ?concrete.path(), "emitted");
                }
                emitted.extend(ops);
            }
        }
    }
    Ok(())
}

fn run_guard(
    doc: &mut Value,
    guard: &TestOp,
    nested: &[Op],
    emitted: &mut Vec<ConcreteOp>,
) -> Result<(), PatchError> {
    let evaluation = evaluate_test(doc, guard)?;
    if !evaluation.satisfied {
        debug!(
            actual = ?evaluation.actual,
            required = ?evaluation.required,
            "guard not satisfied, skipping {} operations",
            nested.len()
        );
        return Ok(());
    }
    for child in nested {
        let child = match child.path() {
            Some(_) => Cow::Borrowed(child),
            None => {
                let mut owned = child.clone();
                owned.inherit_path(guard.path.as_ref());
                Cow::Owned(owned)
            }
        };
        run_into(doc, std::slice::from_ref(child.as_ref()), emitted)?;
    }
    Ok(())
}

/// Run a patch script with options.
///
/// With `mutate: false` the script runs against a clone that replaces
/// `doc` only if every operation succeeded, so a failure leaves `doc`
/// untouched. With `mutate: true` it runs in place like [`run`].
pub fn apply_patch(
    doc: &mut Value,
    ops: &[Op],
    options: &PatchOptions,
) -> Result<Vec<ConcreteOp>, PatchError> {
    if options.mutate {
        return run(doc, ops);
    }
    let mut working = doc.clone();
    let emitted = run(&mut working, ops)?;
    *doc = working;
    Ok(emitted)
}
