//! Type definitions for document paths.

/// A single step in a path: the index of a child inside its parent.
pub type PathStep = usize;

/// A path from the document root to a node.
///
/// The empty path addresses the root itself. Paths are plain values: two
/// equal paths denote the same location no matter where they came from.
pub type Path = Vec<PathStep>;

/// Which neighbour a sibling lookup was asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Previous => "previous",
            Direction::Next => "next",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
