//! Type definitions for manifest patch paths.

use std::fmt;

use crate::escape_component;

/// One step of a parsed path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Mapping lookup by key.
    Key(String),
    /// Sequence lookup by position.
    Index(usize),
    /// Sequence lookup of the first mapping element whose `field` equals `value`.
    ///
    /// Written `[?field='value']`.
    Query { field: String, value: String },
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(&escape_component(key)),
            Segment::Index(idx) => write!(f, "{idx}"),
            Segment::Query { field, value } => write!(f, "[?{field}='{value}']"),
        }
    }
}

/// One step of a concretized path: a literal key or index, never a query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    Key(String),
    Index(usize),
    /// The `-` marker addressing the end of a sequence.
    Append,
}

impl Step {
    /// The segment that addresses the same position.
    pub fn to_segment(&self) -> Segment {
        match self {
            Step::Key(key) => Segment::Key(key.clone()),
            Step::Index(idx) => Segment::Index(*idx),
            Step::Append => Segment::Key("-".to_string()),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Key(key) => f.write_str(&escape_component(key)),
            Step::Index(idx) => write!(f, "{idx}"),
            Step::Append => f.write_str("-"),
        }
    }
}

/// A parsed path, possibly containing query segments.
pub type Path = Vec<Segment>;

/// A path made only of literal keys and indices.
pub type ConcretePath = Vec<Step>;
