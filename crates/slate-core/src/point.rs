//! Points: a path to a text leaf plus an offset into its text.

use std::cmp::Ordering;

use slate_path::Path;

/// A location inside a text leaf.
///
/// `offset` counts UTF-16 code units and is valid when
/// `0 <= offset <= text.len()` for the leaf at `path`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Point {
    pub path: Path,
    pub offset: usize,
}

impl Point {
    pub fn new(path: Path, offset: usize) -> Self {
        Self { path, offset }
    }

    /// Compare two points in document order.
    ///
    /// Paths are compared first. Offsets only matter when the paths are
    /// equal; a point in an ancestor compares equal to one below it.
    pub fn compare(&self, another: &Point) -> Ordering {
        match slate_path::compare(&self.path, &another.path) {
            Ordering::Equal => self.offset.cmp(&another.offset),
            other => other,
        }
    }

    pub fn is_before(&self, another: &Point) -> bool {
        self.compare(another) == Ordering::Less
    }

    pub fn is_after(&self, another: &Point) -> bool {
        self.compare(another) == Ordering::Greater
    }
}

/// Tie-break direction for a point or path sitting exactly on a boundary
/// that an operation turns into two candidate locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affinity {
    Forward,
    Backward,
}

impl Affinity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Affinity::Forward => "forward",
            Affinity::Backward => "backward",
        }
    }
}
