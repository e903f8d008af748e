//! Mutating operation handlers: add, remove, replace, copy, move.
//!
//! Every handler resolves fully before it touches the document, then
//! re-walks the concretized path mutably. A failed operation leaves the
//! document as it was.

use manifest_patch_path::{format_concrete_path, format_path, get_mut, is_child, resolve};
use serde_json::{Map, Value};
use tracing::debug;

use crate::types::{
    AddOp, ConcreteOp, ConcretePath, CopyOp, MoveOp, Outcome, Path, PatchError, RemoveOp,
    ReplaceOp, Segment, Step,
};

// ── Placement ─────────────────────────────────────────────────────────────

/// How a query seed combines with the placed value when the query is the
/// last segment of the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeedMode {
    /// The value replaces the seed entirely.
    Discard,
    /// The seed fields are written over the value, if it is a mapping.
    Merge,
}

/// A mutation planned from a resolution, applied after the borrow of the
/// document ends.
enum Placement {
    Overwrite { at: ConcretePath, value: Value },
    Append { seq: ConcretePath, element: Value },
    Insert { map: ConcretePath, key: String, subtree: Value },
}

pub(crate) fn required_path<'a>(path: &'a Option<Path>, op: &str) -> Result<&'a Path, PatchError> {
    path.as_ref()
        .ok_or_else(|| PatchError::InvalidOp(format!("{op} requires 'path'")))
}

fn container_mut<'a>(doc: &'a mut Value, at: &[Step]) -> Result<&'a mut Value, PatchError> {
    get_mut(doc, at).ok_or_else(|| PatchError::InvalidTarget(format_concrete_path(at)))
}

/// Build the value for a missing element: `seed` extended along the
/// remaining `Key` segments with `value` at the end.
///
/// With no remaining segments the result is `value` itself. Returns the
/// offending segment if the sub-path has anything other than keys.
fn build_subtree(
    mut seed: Map<String, Value>,
    rest: &[Segment],
    value: Value,
) -> Result<Value, Segment> {
    let Some((first, tail)) = rest.split_first() else {
        return Ok(value);
    };
    let key = match first {
        Segment::Key(key) => key.clone(),
        other => return Err(other.clone()),
    };
    let child = build_subtree(Map::new(), tail, value)?;
    seed.insert(key, child);
    Ok(Value::Object(seed))
}

/// An index miss or the `-` marker: a new element goes at the end.
fn appends(segment: &Segment) -> bool {
    match segment {
        Segment::Index(_) => true,
        Segment::Key(key) => key == "-",
        Segment::Query { .. } => false,
    }
}

fn merge_seed(seed: Map<String, Value>, value: Value) -> Value {
    match value {
        Value::Object(mut map) => {
            for (k, v) in seed {
                map.insert(k, v);
            }
            Value::Object(map)
        }
        other => other,
    }
}

fn plan(
    doc: &Value,
    path: &[Segment],
    value: Value,
    overwrite: bool,
    seed_mode: SeedMode,
) -> Result<Option<Placement>, PatchError> {
    let res = resolve(doc, path);

    if res.is_resolved() {
        if !overwrite {
            return Err(PatchError::Exists {
                path: format_concrete_path(&res.matched),
            });
        }
        if res.value == Some(&value) {
            return Ok(None);
        }
        return Ok(Some(Placement::Overwrite { at: res.matched, value }));
    }

    let unconstructible = |segment: &Segment| PatchError::Unconstructible {
        path: format_path(path),
        segment: segment.to_string(),
    };
    let (first, rest) = match res.unmatched.split_first() {
        Some(split) => split,
        None => return Err(PatchError::InvalidTarget(format_path(path))),
    };

    match (res.context, first) {
        (Some(Value::Array(_)), Segment::Query { field, value: literal }) => {
            let mut seed = Map::new();
            seed.insert(field.clone(), Value::String(literal.clone()));
            let element = if rest.is_empty() && seed_mode == SeedMode::Merge {
                merge_seed(seed, value)
            } else {
                build_subtree(seed, rest, value).map_err(|s| unconstructible(&s))?
            };
            Ok(Some(Placement::Append { seq: res.matched.clone(), element }))
        }
        // The position named by the index is not honoured; new elements always
        // go to the end of the sequence.
        (Some(Value::Array(_)), segment) if appends(segment) => {
            let element = build_subtree(Map::new(), rest, value).map_err(|s| unconstructible(&s))?;
            Ok(Some(Placement::Append { seq: res.matched.clone(), element }))
        }
        (Some(Value::Object(_)), Segment::Key(key)) => {
            let subtree = build_subtree(Map::new(), rest, value).map_err(|s| unconstructible(&s))?;
            Ok(Some(Placement::Insert {
                map: res.matched.clone(),
                key: key.clone(),
                subtree,
            }))
        }
        _ => Err(unconstructible(first)),
    }
}

/// Put `value` at `path`, overwriting or constructing as needed.
fn place(
    doc: &mut Value,
    path: &[Segment],
    value: Value,
    overwrite: bool,
    seed_mode: SeedMode,
) -> Result<Outcome, PatchError> {
    let placement = match plan(doc, path, value, overwrite, seed_mode)? {
        Some(placement) => placement,
        None => {
            debug!(path = %format_path(path), "value already in place");
            return Ok(Outcome::Noop);
        }
    };

    match placement {
        Placement::Overwrite { at, value } => {
            *container_mut(doc, &at)? = value.clone();
            Ok(Outcome::Op(ConcreteOp::Replace { path: at, value }))
        }
        Placement::Append { seq, element } => {
            match container_mut(doc, &seq)? {
                Value::Array(arr) => arr.push(element.clone()),
                _ => return Err(PatchError::InvalidTarget(format_concrete_path(&seq))),
            }
            let mut path = seq;
            path.push(Step::Append);
            Ok(Outcome::Op(ConcreteOp::Add { path, value: element }))
        }
        Placement::Insert { map, key, subtree } => {
            match container_mut(doc, &map)? {
                Value::Object(obj) => {
                    obj.insert(key.clone(), subtree.clone());
                }
                _ => return Err(PatchError::InvalidTarget(format_concrete_path(&map))),
            }
            let mut path = map;
            path.push(Step::Key(key));
            Ok(Outcome::Op(ConcreteOp::Add { path, value: subtree }))
        }
    }
}

fn remove_at(doc: &mut Value, path: &[Segment]) -> Result<Outcome, PatchError> {
    let target = {
        let res = resolve(doc, path);
        if !res.is_resolved() {
            debug!(path = %format_path(path), "nothing to remove");
            return Ok(Outcome::Noop);
        }
        res.matched
    };
    let (last, parent) = target
        .split_last()
        .ok_or_else(|| PatchError::InvalidTarget("cannot remove the document root".into()))?;

    match (container_mut(doc, parent)?, last) {
        (Value::Object(map), Step::Key(key)) => {
            map.shift_remove(key);
        }
        (Value::Array(arr), Step::Index(idx)) if *idx < arr.len() => {
            arr.remove(*idx);
        }
        _ => return Err(PatchError::InvalidTarget(format_concrete_path(&target))),
    }
    Ok(Outcome::Op(ConcreteOp::Remove { path: target }))
}

fn lookup(doc: &Value, path: &[Segment]) -> Result<Value, PatchError> {
    let res = resolve(doc, path);
    match res.value {
        Some(value) => Ok(value.clone()),
        None => Err(PatchError::NotFound { path: format_path(path) }),
    }
}

// ── Individual operation handlers ─────────────────────────────────────────

/// Apply `add`.
///
/// An existing target is overwritten (emitted as `replace`) unless
/// `replace` is false; an equal value is a no-op. A missing sequence element
/// addressed by query or index is constructed and appended (emitted as an
/// `add` to `-`); a missing mapping key is constructed and inserted.
pub fn apply_add(doc: &mut Value, op: &AddOp) -> Result<Outcome, PatchError> {
    let path = required_path(&op.path, "add")?;
    place(doc, path, op.value.clone(), op.replace, SeedMode::Discard)
}

/// Apply `remove`. Removing an absent value is a no-op.
pub fn apply_remove(doc: &mut Value, op: &RemoveOp) -> Result<Outcome, PatchError> {
    let path = required_path(&op.path, "remove")?;
    remove_at(doc, path)
}

/// Apply `replace`. The target must exist.
pub fn apply_replace(doc: &mut Value, op: &ReplaceOp) -> Result<Outcome, PatchError> {
    let path = required_path(&op.path, "replace")?;
    let at = {
        let res = resolve(doc, path);
        if !res.is_resolved() {
            return Err(PatchError::NotFound { path: format_path(path) });
        }
        res.matched
    };
    *container_mut(doc, &at)? = op.value.clone();
    Ok(Outcome::Op(ConcreteOp::Replace {
        path: at,
        value: op.value.clone(),
    }))
}

/// Apply `copy`, lowered to `add` of a deep copy of the `from` value.
///
/// When the target is a missing query match, the query field overrides the
/// same field of the copied mapping.
pub fn apply_copy(doc: &mut Value, op: &CopyOp) -> Result<Outcome, PatchError> {
    let path = required_path(&op.path, "copy")?;
    let value = lookup(doc, &op.from)?;
    place(doc, path, value, true, SeedMode::Merge)
}

/// Apply `move`: copy, then remove the source.
///
/// Reported as `[remove, add]` (or `[remove, replace]`) whenever removing
/// first leaves the target's concrete path unchanged. When the removal would
/// shift or contain the target, the operations are reported in execution
/// order instead.
pub fn apply_move(doc: &mut Value, op: &MoveOp) -> Result<Outcome, PatchError> {
    let path = required_path(&op.path, "move")?;
    if op.from.is_empty() {
        return Err(PatchError::InvalidTarget("cannot move the document root".into()));
    }
    let value = lookup(doc, &op.from)?;
    let copied = place(doc, path, value, true, SeedMode::Merge)?;
    let removed = remove_at(doc, &op.from)?;

    let remove_first = match (&copied, &removed) {
        (Outcome::Op(placed), Outcome::Op(ConcreteOp::Remove { path: from })) => {
            removal_keeps_path(from, placed.path())
        }
        _ => false,
    };

    let mut ops = Vec::with_capacity(2);
    if remove_first {
        ops.extend(removed.into_ops());
        ops.extend(copied.into_ops());
    } else {
        ops.extend(copied.into_ops());
        ops.extend(removed.into_ops());
    }
    Ok(Outcome::Ops(ops))
}

/// True if removing `removed` leaves the concrete path `target` pointing at
/// the same place.
fn removal_keeps_path(removed: &[Step], target: &[Step]) -> bool {
    if removed.is_empty()
        || removed == target
        || is_child(removed, target)
        || is_child(target, removed)
    {
        return false;
    }
    match removed.split_last() {
        Some((Step::Index(idx), parent)) if target.starts_with(parent) => {
            match target.get(parent.len()) {
                Some(Step::Index(other)) => other < idx,
                _ => true,
            }
        }
        _ => true,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
