//! Paths for addressing nodes in a slate document tree.
//!
//! A path is a list of child indexes leading from the document root to a
//! node. This crate implements the pure arithmetic over paths: ordering,
//! ancestry, sibling navigation and a compact string form. It knows nothing
//! about nodes or operations; those live in `slate-core`.
//!
//! # Example
//!
//! ```
//! use slate_path::{compare, is_ancestor, next, parent};
//! use std::cmp::Ordering;
//!
//! let path = vec![0, 2, 1];
//! assert_eq!(parent(&path).unwrap(), vec![0, 2]);
//! assert_eq!(next(&path).unwrap(), vec![0, 2, 2]);
//! assert!(is_ancestor(&[0, 2], &path));
//!
//! // An ancestor and its descendant compare as equal.
//! assert_eq!(compare(&[0, 2], &path), Ordering::Equal);
//! ```

use std::cmp::Ordering;
use thiserror::Error;

pub mod types;
pub use types::{Direction, Path, PathStep};

pub mod validate;
pub use validate::{path_to_json, validate_path, ValidationError};

// ── Ordering ──────────────────────────────────────────────────────────────

/// Compare two paths in document order.
///
/// Only the shared length is compared, so a path and any of its ancestors
/// or descendants compare as [`Ordering::Equal`]. Use `==` to test for the
/// exact same location.
///
/// # Example
///
/// ```
/// use slate_path::compare;
/// use std::cmp::Ordering;
///
/// assert_eq!(compare(&[0, 1], &[0, 2]), Ordering::Less);
/// assert_eq!(compare(&[1], &[0, 5]), Ordering::Greater);
/// assert_eq!(compare(&[0], &[0, 5]), Ordering::Equal);
/// ```
pub fn compare(path: &[usize], another: &[usize]) -> Ordering {
    let min = path.len().min(another.len());
    for i in 0..min {
        match path[i].cmp(&another[i]) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// Check if `path` comes after `another` in document order.
pub fn is_after(path: &[usize], another: &[usize]) -> bool {
    compare(path, another) == Ordering::Greater
}

/// Check if `path` comes before `another` in document order.
pub fn is_before(path: &[usize], another: &[usize]) -> bool {
    compare(path, another) == Ordering::Less
}

/// Split a non-empty path into its parent prefix and last step.
fn split_last(path: &[usize]) -> Option<(&[usize], usize)> {
    let (last, head) = path.split_last()?;
    Some((head, *last))
}

/// Check if `path` ends before `another` at `path`'s own depth.
///
/// True when both share `path`'s parent and `another`'s step at that
/// depth is greater than `path`'s last step. `another` may be deeper.
pub fn ends_before(path: &[usize], another: &[usize]) -> bool {
    let Some((head, last)) = split_last(path) else {
        return false;
    };
    another.len() > head.len() && another[..head.len()] == *head && last < another[head.len()]
}

/// Check if `path` ends after `another` at `path`'s own depth.
pub fn ends_after(path: &[usize], another: &[usize]) -> bool {
    let Some((head, last)) = split_last(path) else {
        return false;
    };
    another.len() > head.len() && another[..head.len()] == *head && last > another[head.len()]
}

/// Check if `path` ends at the same step as `another` at `path`'s depth.
pub fn ends_at(path: &[usize], another: &[usize]) -> bool {
    let Some((head, last)) = split_last(path) else {
        return false;
    };
    another.len() > head.len() && another[..head.len()] == *head && last == another[head.len()]
}

// ── Relationships ─────────────────────────────────────────────────────────

/// Check if the path points at the document root.
pub fn is_root(path: &[usize]) -> bool {
    path.is_empty()
}

/// Check if `path` is a strict ancestor of `another`.
///
/// # Example
///
/// ```
/// use slate_path::is_ancestor;
///
/// assert!(is_ancestor(&[], &[0]));
/// assert!(is_ancestor(&[0], &[0, 1, 2]));
/// assert!(!is_ancestor(&[0, 1], &[0, 1]));
/// assert!(!is_ancestor(&[1], &[0, 1]));
/// ```
pub fn is_ancestor(path: &[usize], another: &[usize]) -> bool {
    path.len() < another.len() && compare(path, another) == Ordering::Equal
}

/// Check if `path` is a strict descendant of `another`.
pub fn is_descendant(path: &[usize], another: &[usize]) -> bool {
    path.len() > another.len() && compare(path, another) == Ordering::Equal
}

/// Check if `path` is an ancestor of, or equal to, `another`.
pub fn is_common(path: &[usize], another: &[usize]) -> bool {
    path.len() <= another.len() && compare(path, another) == Ordering::Equal
}

/// Check if `path` is the direct parent of `another`.
pub fn is_parent(path: &[usize], another: &[usize]) -> bool {
    path.len() + 1 == another.len() && compare(path, another) == Ordering::Equal
}

/// Check if `path` is a direct child of `another`.
pub fn is_child(path: &[usize], another: &[usize]) -> bool {
    path.len() == another.len() + 1 && compare(path, another) == Ordering::Equal
}

/// Check if two distinct paths share the same parent.
///
/// # Example
///
/// ```
/// use slate_path::is_sibling;
///
/// assert!(is_sibling(&[0, 1], &[0, 3]));
/// assert!(!is_sibling(&[0, 1], &[0, 1]));
/// assert!(!is_sibling(&[0, 1], &[1, 1]));
/// assert!(!is_sibling(&[], &[]));
/// ```
pub fn is_sibling(path: &[usize], another: &[usize]) -> bool {
    if path.len() != another.len() {
        return false;
    }
    match (split_last(path), split_last(another)) {
        (Some((a_head, a_last)), Some((b_head, b_last))) => a_last != b_last && a_head == b_head,
        _ => false,
    }
}

/// Check if the node at `path` has a previous sibling.
pub fn has_previous(path: &[usize]) -> bool {
    path.last().is_some_and(|&last| last > 0)
}

// ── Derived paths ─────────────────────────────────────────────────────────

/// Get the longest prefix shared by both paths.
///
/// # Example
///
/// ```
/// use slate_path::common;
///
/// assert_eq!(common(&[0, 1, 2], &[0, 1, 5, 3]), vec![0, 1]);
/// assert_eq!(common(&[1], &[0]), Vec::<usize>::new());
/// ```
pub fn common(path: &[usize], another: &[usize]) -> Path {
    path.iter()
        .zip(another.iter())
        .take_while(|(a, b)| a == b)
        .map(|(a, _)| *a)
        .collect()
}

/// Get every ancestor path of `path`, root first.
///
/// Pass `reverse = true` to get the nearest ancestor first.
///
/// # Example
///
/// ```
/// use slate_path::ancestors;
///
/// assert_eq!(ancestors(&[0, 1, 2], false), vec![vec![], vec![0], vec![0, 1]]);
/// assert_eq!(ancestors(&[0, 1], true), vec![vec![0], vec![]]);
/// ```
pub fn ancestors(path: &[usize], reverse: bool) -> Vec<Path> {
    let mut paths: Vec<Path> = (0..path.len()).map(|i| path[..i].to_vec()).collect();
    if reverse {
        paths.reverse();
    }
    paths
}

/// Get every level of `path`: its ancestors followed by the path itself.
///
/// # Example
///
/// ```
/// use slate_path::levels;
///
/// assert_eq!(levels(&[0, 1], false), vec![vec![], vec![0], vec![0, 1]]);
/// assert_eq!(levels(&[], false), vec![Vec::<usize>::new()]);
/// ```
pub fn levels(path: &[usize], reverse: bool) -> Vec<Path> {
    let mut paths: Vec<Path> = (0..=path.len()).map(|i| path[..i].to_vec()).collect();
    if reverse {
        paths.reverse();
    }
    paths
}

/// Get the parent of a path.
///
/// # Errors
///
/// Returns [`PathError::NoParent`] for the root path.
///
/// # Example
///
/// ```
/// use slate_path::parent;
///
/// assert_eq!(parent(&[0, 3]).unwrap(), vec![0]);
/// assert!(parent(&[]).is_err());
/// ```
pub fn parent(path: &[usize]) -> Result<Path, PathError> {
    match split_last(path) {
        Some((head, _)) => Ok(head.to_vec()),
        None => Err(PathError::NoParent),
    }
}

/// Get the path of the next sibling.
///
/// # Errors
///
/// Returns [`PathError::NoSuchSibling`] for the root path.
pub fn next(path: &[usize]) -> Result<Path, PathError> {
    match split_last(path) {
        Some((head, last)) => {
            let mut out = head.to_vec();
            out.push(last + 1);
            Ok(out)
        }
        None => Err(PathError::NoSuchSibling {
            path: Vec::new(),
            direction: Direction::Next,
        }),
    }
}

/// Get the path of the previous sibling.
///
/// # Errors
///
/// Returns [`PathError::NoSuchSibling`] for the root path and for a path
/// whose last step is `0`.
///
/// # Example
///
/// ```
/// use slate_path::previous;
///
/// assert_eq!(previous(&[1, 2]).unwrap(), vec![1, 1]);
/// assert!(previous(&[1, 0]).is_err());
/// ```
pub fn previous(path: &[usize]) -> Result<Path, PathError> {
    match split_last(path) {
        Some((head, last)) if last > 0 => {
            let mut out = head.to_vec();
            out.push(last - 1);
            Ok(out)
        }
        _ => Err(PathError::NoSuchSibling {
            path: path.to_vec(),
            direction: Direction::Previous,
        }),
    }
}

/// Get `path` relative to one of its ancestors (or itself).
///
/// # Errors
///
/// Returns [`PathError::NotAncestor`] when `ancestor` is neither equal to
/// nor an ancestor of `path`.
pub fn relative(path: &[usize], ancestor: &[usize]) -> Result<Path, PathError> {
    if !is_common(ancestor, path) {
        return Err(PathError::NotAncestor {
            path: path.to_vec(),
            ancestor: ancestor.to_vec(),
        });
    }
    Ok(path[ancestor.len()..].to_vec())
}

// ── String form ───────────────────────────────────────────────────────────

/// Format a path as comma-separated steps.
///
/// Returns an empty string for the root path. Equal paths always produce
/// equal strings, so the result can serve as a hash key.
///
/// # Example
///
/// ```
/// use slate_path::format_path;
///
/// assert_eq!(format_path(&[]), "");
/// assert_eq!(format_path(&[0, 12, 3]), "0,12,3");
/// ```
pub fn format_path(path: &[usize]) -> String {
    let mut out = String::with_capacity(path.len() * 2);
    for (i, step) in path.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&step.to_string());
    }
    out
}

/// Parse the comma-separated form produced by [`format_path`].
///
/// # Errors
///
/// Returns [`ValidationError::InvalidPathString`] if any step is not a
/// non-negative integer.
pub fn parse_path(s: &str) -> Result<Path, ValidationError> {
    if s.is_empty() {
        return Ok(Vec::new());
    }
    s.split(',')
        .map(|step| {
            step.parse::<usize>()
                .map_err(|_| ValidationError::InvalidPathString(s.to_string()))
        })
        .collect()
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("cannot get the parent of the root path")]
    NoParent,
    #[error("cannot get the {direction} sibling of path [{}]", format_path(path))]
    NoSuchSibling { path: Path, direction: Direction },
    #[error("path [{}] is not inside [{}]", format_path(path), format_path(ancestor))]
    NotAncestor { path: Path, ancestor: Path },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare() {
        assert_eq!(compare(&[0], &[0]), Ordering::Equal);
        assert_eq!(compare(&[0], &[1]), Ordering::Less);
        assert_eq!(compare(&[1], &[0]), Ordering::Greater);
        assert_eq!(compare(&[0, 1], &[0]), Ordering::Equal);
        assert_eq!(compare(&[], &[3, 4]), Ordering::Equal);
        assert_eq!(compare(&[0, 9], &[1, 0]), Ordering::Less);
    }

    #[test]
    fn test_before_after() {
        assert!(is_before(&[0, 1], &[0, 2]));
        assert!(!is_before(&[0], &[0, 2]));
        assert!(is_after(&[1], &[0, 2]));
        assert!(!is_after(&[0, 2], &[0, 2]));
    }

    #[test]
    fn test_ends_before() {
        assert!(ends_before(&[0, 1], &[0, 2]));
        assert!(ends_before(&[0, 1], &[0, 2, 5]));
        assert!(!ends_before(&[0, 1], &[0, 1]));
        assert!(!ends_before(&[0, 1], &[1, 2]));
        assert!(!ends_before(&[0, 1], &[0]));
        assert!(!ends_before(&[], &[0]));
    }

    #[test]
    fn test_ends_after_and_at() {
        assert!(ends_after(&[0, 3], &[0, 2, 7]));
        assert!(!ends_after(&[0, 1], &[0, 2]));
        assert!(ends_at(&[0, 2], &[0, 2, 7]));
        assert!(!ends_at(&[0, 2], &[0, 3]));
    }

    #[test]
    fn test_ancestry() {
        assert!(is_ancestor(&[0], &[0, 1]));
        assert!(!is_ancestor(&[0, 1], &[0]));
        assert!(is_descendant(&[0, 1], &[0]));
        assert!(is_common(&[0], &[0]));
        assert!(is_common(&[0], &[0, 4]));
        assert!(!is_common(&[0, 4], &[0]));
        assert!(is_parent(&[0], &[0, 4]));
        assert!(!is_parent(&[0], &[0, 4, 1]));
        assert!(is_child(&[0, 4], &[0]));
    }

    #[test]
    fn test_has_previous() {
        assert!(has_previous(&[0, 1]));
        assert!(!has_previous(&[1, 0]));
        assert!(!has_previous(&[]));
    }

    #[test]
    fn test_siblings() {
        assert_eq!(next(&[0, 1]).unwrap(), vec![0, 2]);
        assert_eq!(previous(&[0, 1]).unwrap(), vec![0, 0]);
        assert_eq!(
            next(&[]),
            Err(PathError::NoSuchSibling { path: vec![], direction: Direction::Next })
        );
        assert_eq!(
            previous(&[3, 0]),
            Err(PathError::NoSuchSibling { path: vec![3, 0], direction: Direction::Previous })
        );
    }

    #[test]
    fn test_parent() {
        assert_eq!(parent(&[0, 1]).unwrap(), vec![0]);
        assert_eq!(parent(&[4]).unwrap(), Vec::<usize>::new());
        assert_eq!(parent(&[]), Err(PathError::NoParent));
    }

    #[test]
    fn test_relative() {
        assert_eq!(relative(&[0, 1, 2], &[0]).unwrap(), vec![1, 2]);
        assert_eq!(relative(&[0, 1], &[0, 1]).unwrap(), Vec::<usize>::new());
        assert!(matches!(relative(&[0, 1], &[1]), Err(PathError::NotAncestor { .. })));
    }

    #[test]
    fn test_levels_and_ancestors() {
        assert_eq!(levels(&[1, 2], true), vec![vec![1, 2], vec![1], vec![]]);
        assert!(ancestors(&[], false).is_empty());
    }

    #[test]
    fn test_error_messages() {
        let err = previous(&[2, 0]).unwrap_err();
        assert_eq!(err.to_string(), "cannot get the previous sibling of path [2,0]");
        let err = relative(&[0], &[1, 2]).unwrap_err();
        assert_eq!(err.to_string(), "path [0] is not inside [1,2]");
    }

    #[test]
    fn test_roundtrip() {
        let paths: Vec<Path> = vec![vec![], vec![0], vec![10, 0, 3]];
        for path in paths {
            let formatted = format_path(&path);
            assert_eq!(
                parse_path(&formatted).unwrap(),
                path,
                "Failed roundtrip for: {:?}",
                formatted
            );
        }
        assert!(parse_path("0,,1").is_err());
        assert!(parse_path("a").is_err());
    }
}
