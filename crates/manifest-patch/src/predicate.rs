//! The `test` operation: presence and equality assertions.
//!
//! A test observes a set of outcomes at its path: `absent`, or `present`
//! plus `equal`/`unequal` when a value was supplied. It is satisfied when
//! the observed set shares at least one state with the required set.

use manifest_patch_path::{format_path, resolve};
use serde_json::Value;

use crate::apply::required_path;
use crate::types::{join_states, ConcreteOp, Outcome, PatchError, TestOp, TestState};

/// Result of evaluating a test without acting on it.
#[derive(Debug, Clone, PartialEq)]
pub struct TestEvaluation {
    pub satisfied: bool,
    /// Observed outcomes.
    pub actual: Vec<TestState>,
    /// Required outcomes, after defaulting.
    pub required: Vec<TestState>,
    /// The concretized test, when the target was present.
    pub concrete: Option<ConcreteOp>,
}

/// Required outcomes of `op`, defaulting to `equal` when a value is given and
/// `present` otherwise.
pub fn required_states(op: &TestOp) -> Vec<TestState> {
    if !op.state.is_empty() {
        return op.state.clone();
    }
    match op.value {
        Some(_) => vec![TestState::Equal],
        None => vec![TestState::Present],
    }
}

/// Evaluate a test against `doc`. Never fails on an unsatisfied test.
pub fn evaluate_test(doc: &Value, op: &TestOp) -> Result<TestEvaluation, PatchError> {
    let path = required_path(&op.path, "test")?;
    let res = resolve(doc, path);

    let (actual, concrete) = match res.value {
        Some(found) if res.is_resolved() => {
            let mut actual = vec![TestState::Present];
            if let Some(expected) = &op.value {
                actual.push(if found == expected {
                    TestState::Equal
                } else {
                    TestState::Unequal
                });
            }
            let concrete = ConcreteOp::Test {
                path: res.matched.clone(),
                value: found.clone(),
            };
            (actual, Some(concrete))
        }
        _ => (vec![TestState::Absent], None),
    };

    let required = required_states(op);
    let satisfied = actual.iter().any(|state| required.contains(state));
    Ok(TestEvaluation {
        satisfied,
        actual,
        required,
        concrete: if satisfied { concrete } else { None },
    })
}

/// Apply `test` as a hard assertion.
///
/// A satisfied test on a present value emits the concretized test; one
/// satisfied by absence emits nothing.
pub fn apply_test(doc: &Value, op: &TestOp) -> Result<Outcome, PatchError> {
    let evaluation = evaluate_test(doc, op)?;
    if !evaluation.satisfied {
        return Err(PatchError::Test {
            path: op.path.as_deref().map(format_path).unwrap_or_default(),
            actual: join_states(&evaluation.actual),
            expected: join_states(&evaluation.required),
        });
    }
    Ok(match evaluation.concrete {
        Some(concrete) => Outcome::Op(concrete),
        None => Outcome::Noop,
    })
}
