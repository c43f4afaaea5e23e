//! Coordinate rebasing.
//!
//! Given a path, point or range and an operation that has already been
//! applied, compute the coordinate that denotes the same logical place
//! afterwards. `None` means the place no longer exists (it was inside a
//! removed subtree, or sat on an ambiguous boundary with no affinity to
//! resolve it). That is an expected outcome, not an error.
//!
//! Rebasing reads only the operation, never the tree, so it can run before
//! or after the tree itself is mutated.

use slate_path::{ends_before, is_ancestor, is_sibling, Path};

use crate::operation::Operation;
use crate::point::{Affinity, Point};
use crate::range::{Range, RangeAffinity};
use crate::utf16::utf16_len;

// ── Paths ─────────────────────────────────────────────────────────────────

/// Rebase `path` through `op`.
///
/// `affinity` only matters for a path equal to a `split_node` path: with
/// `Forward` it follows the new right-hand node, with `Backward` it stays,
/// and with `None` the path is dropped.
///
/// # Example
///
/// ```
/// use slate_core::{transform_path, Affinity, Node, Operation};
///
/// let op = Operation::InsertNode { path: vec![1], node: Node::text("") };
/// assert_eq!(transform_path(&[1, 4], &op, Some(Affinity::Forward)), Some(vec![2, 4]));
/// assert_eq!(transform_path(&[0, 4], &op, Some(Affinity::Forward)), Some(vec![0, 4]));
/// ```
pub fn transform_path(path: &[usize], op: &Operation, affinity: Option<Affinity>) -> Option<Path> {
    let mut p = path.to_vec();
    if p.is_empty() {
        return Some(p);
    }
    match op {
        Operation::InsertNode { path: op_path, .. } => {
            if *op_path == p || ends_before(op_path, &p) || is_ancestor(op_path, &p) {
                p[op_path.len() - 1] += 1;
            }
        }
        Operation::RemoveNode { path: op_path, .. } => {
            if *op_path == p || is_ancestor(op_path, &p) {
                return None;
            }
            if ends_before(op_path, &p) {
                p[op_path.len() - 1] -= 1;
            }
        }
        Operation::MergeNode {
            path: op_path,
            position,
            ..
        } => {
            let depth = op_path.len();
            if depth == 0 {
                return Some(p);
            }
            if *op_path == p || ends_before(op_path, &p) {
                p[depth - 1] = p[depth - 1].saturating_sub(1);
            } else if is_ancestor(op_path, &p) {
                p[depth - 1] = p[depth - 1].saturating_sub(1);
                p[depth] += position;
            }
        }
        Operation::SplitNode {
            path: op_path,
            position,
            ..
        } => {
            let depth = op_path.len();
            if depth == 0 {
                return Some(p);
            }
            if *op_path == p {
                match affinity {
                    Some(Affinity::Forward) => p[depth - 1] += 1,
                    Some(Affinity::Backward) => {}
                    None => return None,
                }
            } else if ends_before(op_path, &p) {
                p[depth - 1] += 1;
            } else if is_ancestor(op_path, &p) && p[depth] >= *position {
                p[depth - 1] += 1;
                p[depth] -= position;
            }
        }
        Operation::MoveNode {
            path: src,
            new_path: dst,
        } => return Some(transform_moved(p, src, dst)),
        Operation::InsertText { .. }
        | Operation::RemoveText { .. }
        | Operation::SetNode { .. }
        | Operation::SetSelection { .. } => {}
    }
    Some(p)
}

/// How a path relates to a `move_node` source and destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MoveCase {
    /// Source and destination are the same; nothing moves.
    Noop,
    /// The path is the moved node or inside it.
    InsideSource,
    /// Source and destination are siblings and the path is at or inside
    /// the destination slot.
    SiblingDestination,
    /// The path is at, inside, or after the destination slot.
    AtOrAfterDestination,
    /// The path comes after the source among its siblings.
    AfterSource,
    Unrelated,
}

fn classify_move(p: &[usize], src: &[usize], dst: &[usize]) -> MoveCase {
    let at_or_inside = |base: &[usize]| base == p || is_ancestor(base, p);
    if src == dst {
        MoveCase::Noop
    } else if at_or_inside(src) {
        MoveCase::InsideSource
    } else if is_sibling(src, dst) && at_or_inside(dst) {
        MoveCase::SiblingDestination
    } else if ends_before(dst, p) || at_or_inside(dst) {
        MoveCase::AtOrAfterDestination
    } else if ends_before(src, p) {
        MoveCase::AfterSource
    } else {
        MoveCase::Unrelated
    }
}

fn transform_moved(mut p: Path, src: &[usize], dst: &[usize]) -> Path {
    if src.is_empty() || dst.is_empty() {
        return p;
    }
    let src_depth = src.len() - 1;
    let dst_depth = dst.len() - 1;
    match classify_move(&p, src, dst) {
        MoveCase::Noop | MoveCase::Unrelated => p,
        MoveCase::InsideSource => {
            // Removing the source shifts a later destination sibling back.
            let mut moved = dst.to_vec();
            if ends_before(src, dst) && src.len() < dst.len() {
                moved[src_depth] -= 1;
            }
            moved.extend_from_slice(&p[src.len()..]);
            moved
        }
        MoveCase::SiblingDestination => {
            if ends_before(src, &p) {
                p[src_depth] -= 1;
            } else {
                p[src_depth] += 1;
            }
            p
        }
        MoveCase::AtOrAfterDestination => {
            if ends_before(src, &p) {
                p[src_depth] -= 1;
            }
            p[dst_depth] += 1;
            p
        }
        MoveCase::AfterSource => {
            p[src_depth] -= 1;
            p
        }
    }
}

// ── Points ────────────────────────────────────────────────────────────────

/// Rebase `point` through `op`.
///
/// Besides moving the path, text edits shift the offset of points in the
/// edited leaf that sit at or after the edit, and merges and splits carry
/// the offset across the join. A point exactly at an `insert_text` offset
/// moves only with `Forward` affinity; a point exactly at a `split_node`
/// position follows the new node with `Forward`, stays with `Backward`
/// and is dropped with `None`.
pub fn transform_point(point: &Point, op: &Operation, affinity: Option<Affinity>) -> Option<Point> {
    let Point { path, offset } = point;
    let mut offset = *offset;
    let path = match op {
        Operation::InsertNode { .. } | Operation::MoveNode { .. } => {
            transform_path(path, op, affinity)?
        }
        Operation::InsertText {
            path: op_path,
            offset: op_offset,
            text,
        } => {
            let forward = affinity == Some(Affinity::Forward);
            if op_path == path && (*op_offset < offset || (*op_offset == offset && forward)) {
                offset += utf16_len(text);
            }
            path.clone()
        }
        Operation::RemoveText {
            path: op_path,
            offset: op_offset,
            text,
        } => {
            if op_path == path && *op_offset <= offset {
                offset -= (offset - op_offset).min(utf16_len(text));
            }
            path.clone()
        }
        Operation::MergeNode {
            path: op_path,
            position,
            ..
        } => {
            if op_path == path {
                offset += position;
            }
            transform_path(path, op, affinity)?
        }
        Operation::RemoveNode { path: op_path, .. } => {
            if op_path == path || is_ancestor(op_path, path) {
                return None;
            }
            transform_path(path, op, affinity)?
        }
        Operation::SplitNode {
            path: op_path,
            position,
            ..
        } => {
            if op_path == path {
                if *position == offset && affinity.is_none() {
                    return None;
                }
                let forward = affinity == Some(Affinity::Forward);
                if *position < offset || (*position == offset && forward) {
                    offset -= position;
                    transform_path(path, op, Some(Affinity::Forward))?
                } else {
                    path.clone()
                }
            } else {
                transform_path(path, op, affinity)?
            }
        }
        Operation::SetNode { .. } | Operation::SetSelection { .. } => path.clone(),
    };
    Some(Point { path, offset })
}

// ── Ranges ────────────────────────────────────────────────────────────────

/// Rebase both points of `range` through `op`.
///
/// The range policy is turned into one affinity per point (see
/// [`RangeAffinity`]); the range is dropped if either point is.
pub fn transform_range(
    range: &Range,
    op: &Operation,
    affinity: Option<RangeAffinity>,
) -> Option<Range> {
    let (anchor_affinity, focus_affinity) = range.point_affinities(affinity);
    let anchor = transform_point(&range.anchor, op, anchor_affinity)?;
    let focus = transform_point(&range.focus, op, focus_affinity)?;
    Some(Range {
        anchor,
        focus,
        properties: range.properties.clone(),
    })
}
