//! Dirty-path bookkeeping and the built-in normalization rules.
//!
//! Every applied operation marks the paths it may have broken as dirty
//! ([`dirty_paths`]). Already-dirty paths are rebased through the same
//! operation so they keep pointing at the nodes they were recorded for.
//! The drain itself lives on [`Editor::normalize`](crate::Editor::normalize);
//! the per-node repair used by [`CoreSchema`](crate::CoreSchema) is
//! [`normalize_core`].

use indexmap::IndexSet;
use slate_path::{ancestors, levels, next, previous, Path};

use crate::editor::Editor;
use crate::error::EditorError;
use crate::node::{iter::nodes, Node, NodeRef, NodesOptions, Properties};
use crate::operation::Operation;
use crate::point::Affinity;
use crate::transform::transform_path;

// ── Dirty paths ───────────────────────────────────────────────────────────

/// Paths waiting to be normalized.
///
/// A path appears at most once and keeps the position of its first
/// insertion; [`pop`](Self::pop) takes the most recently added one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirtyPaths {
    paths: IndexSet<Path>,
}

impl DirtyPaths {
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn contains(&self, path: &[usize]) -> bool {
        self.paths.contains(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter()
    }

    pub(crate) fn insert(&mut self, path: Path) -> bool {
        self.paths.insert(path)
    }

    pub(crate) fn pop(&mut self) -> Option<Path> {
        self.paths.pop()
    }

    pub(crate) fn clear(&mut self) {
        self.paths.clear();
    }

    /// Rebase the pending paths through `op`, then add the paths `op`
    /// itself dirtied.
    pub(crate) fn record(&mut self, op: &Operation) {
        if op.can_transform_path() {
            self.paths = self
                .paths
                .iter()
                .filter_map(|p| transform_path(p, op, Some(Affinity::Forward)))
                .collect();
        }
        for path in dirty_paths(op) {
            self.insert(path);
        }
    }
}

impl FromIterator<Path> for DirtyPaths {
    fn from_iter<I: IntoIterator<Item = Path>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().collect(),
        }
    }
}

/// The paths an operation may leave in need of normalization, in the
/// coordinates of the tree after the operation.
///
/// # Example
///
/// ```
/// use slate_core::{dirty_paths, Operation};
///
/// let op = Operation::InsertText { path: vec![0, 1], offset: 0, text: "x".into() };
/// assert_eq!(dirty_paths(&op), vec![vec![], vec![0], vec![0, 1]]);
/// ```
pub fn dirty_paths(op: &Operation) -> Vec<Path> {
    match op {
        Operation::InsertText { path, .. }
        | Operation::RemoveText { path, .. }
        | Operation::SetNode { path, .. } => levels(path, false),
        Operation::InsertNode { path, node } => {
            let mut paths = levels(path, false);
            if node.is_element() {
                let inside = nodes(node.as_ref(), NodesOptions::default())
                    .map(|(_, p)| [path.as_slice(), p.as_slice()].concat());
                paths.extend(inside);
            }
            paths
        }
        Operation::MergeNode { path, .. } => {
            let mut paths = ancestors(path, false);
            paths.extend(previous(path).ok());
            paths
        }
        Operation::MoveNode { path, new_path } => {
            if path == new_path {
                return Vec::new();
            }
            let rebase = |paths: Vec<Path>| -> Vec<Path> {
                paths
                    .iter()
                    .filter_map(|p| transform_path(p, op, Some(Affinity::Forward)))
                    .collect()
            };
            let mut paths = rebase(ancestors(path, false));
            let new_ancestors = rebase(ancestors(new_path, false));
            let mut resting = new_ancestors.last().cloned().unwrap_or_default();
            resting.extend(new_path.last());
            paths.extend(new_ancestors);
            paths.push(resting);
            paths
        }
        Operation::RemoveNode { path, .. } => ancestors(path, false),
        Operation::SplitNode { path, .. } => {
            let mut paths = levels(path, false);
            paths.extend(next(path).ok());
            paths
        }
        Operation::SetSelection { .. } => Vec::new(),
    }
}

// ── Built-in rules ────────────────────────────────────────────────────────

/// One repair found while scanning a node's children.
enum Fix {
    Remove(usize, Node),
    InsertEmptyText(usize),
    Merge {
        index: usize,
        position: usize,
        properties: Properties,
    },
}

fn child_path(path: &[usize], index: usize) -> Path {
    let mut p = path.to_vec();
    p.push(index);
    p
}

/// Apply the built-in structural rules to the node at `path`.
///
/// - Text leaves are left alone.
/// - An element with no children gets an empty text child. An empty root
///   stays empty: the root only holds blocks, so a text leaf inserted there
///   would be removed again by the next pass.
/// - A container holds either blocks or inlines and text, never both. The
///   root always holds blocks; an element holds inlines when it is inline
///   itself or its first child is text or inline. Children of the wrong
///   kind are removed.
/// - Every inline element has a text leaf on each side.
/// - Adjacent text leaves with equal marks are merged, and an empty leaf
///   next to another leaf is removed.
///
/// Each repair is applied as an operation through `editor`, so it marks
/// more paths dirty and the drain comes back to this node if needed.
pub fn normalize_core(editor: &mut Editor, path: &[usize]) -> Result<(), EditorError> {
    let (count, should_have_inlines) = {
        let node = editor.node(path)?;
        let Some(children) = node.children() else {
            return Ok(());
        };
        let should_have_inlines = match node {
            NodeRef::Element(element) => {
                editor.is_inline(element)
                    || match children.first() {
                        Some(Node::Text(_)) => true,
                        Some(Node::Element(first)) => editor.is_inline(first),
                        None => false,
                    }
            }
            _ => false,
        };
        (children.len(), should_have_inlines)
    };
    if count == 0 {
        if !path.is_empty() {
            editor.apply(Operation::InsertNode {
                path: child_path(path, 0),
                node: Node::text(""),
            })?;
        }
        return Ok(());
    }

    let mut n = 0;
    for i in 0..count {
        let fix = {
            let Some(children) = editor.node(path)?.children() else {
                return Ok(());
            };
            let Some(child) = children.get(n) else {
                break;
            };
            let prev = n.checked_sub(1).and_then(|p| children.get(p));
            let is_last = i == count - 1;
            let is_inline_or_text = match child {
                Node::Text(_) => true,
                Node::Element(e) => editor.is_inline(e),
            };
            if is_inline_or_text != should_have_inlines {
                Some(Fix::Remove(n, child.clone()))
            } else {
                match (child, prev) {
                    (Node::Element(e), prev) if editor.is_inline(e) => match prev {
                        Some(Node::Text(_)) if is_last => Some(Fix::InsertEmptyText(n + 1)),
                        Some(Node::Text(_)) => None,
                        _ => Some(Fix::InsertEmptyText(n)),
                    },
                    (Node::Text(t), Some(Node::Text(p))) => {
                        if t.equals(p, true) {
                            Some(Fix::Merge {
                                index: n,
                                position: p.len(),
                                properties: t.properties.clone(),
                            })
                        } else if p.is_empty() {
                            Some(Fix::Remove(n - 1, Node::Text(p.clone())))
                        } else if t.is_empty() {
                            Some(Fix::Remove(n, child.clone()))
                        } else {
                            None
                        }
                    }
                    _ => None,
                }
            }
        };
        match fix {
            // The next child slid into the current slot.
            Some(Fix::Remove(index, node)) => {
                editor.apply(Operation::RemoveNode {
                    path: child_path(path, index),
                    node,
                })?;
            }
            Some(Fix::Merge {
                index,
                position,
                properties,
            }) => {
                editor.apply(Operation::MergeNode {
                    path: child_path(path, index),
                    position,
                    properties,
                })?;
            }
            // Skip over both the new leaf and the inline.
            Some(Fix::InsertEmptyText(index)) => {
                editor.apply(Operation::InsertNode {
                    path: child_path(path, index),
                    node: Node::text(""),
                })?;
                n += 2;
            }
            None => n += 1,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Text;

    #[test]
    fn test_dirty_paths_insert_node_includes_descendants() {
        let op = Operation::InsertNode {
            path: vec![1],
            node: Node::element(vec![Node::text("a"), Node::element(vec![Node::text("b")])]),
        };
        assert_eq!(
            dirty_paths(&op),
            vec![vec![], vec![1], vec![1], vec![1, 0], vec![1, 1], vec![1, 1, 0]]
        );
    }

    #[test]
    fn test_dirty_paths_move() {
        let op = Operation::MoveNode {
            path: vec![0, 1],
            new_path: vec![2, 0],
        };
        assert_eq!(dirty_paths(&op), vec![vec![], vec![0], vec![], vec![2], vec![2, 0]]);
        let noop = Operation::MoveNode {
            path: vec![1],
            new_path: vec![1],
        };
        assert!(dirty_paths(&noop).is_empty());
    }

    #[test]
    fn test_dirty_paths_merge_split_remove() {
        let merge = Operation::MergeNode {
            path: vec![0, 2],
            position: 1,
            properties: Properties::new(),
        };
        assert_eq!(dirty_paths(&merge), vec![vec![], vec![0], vec![0, 1]]);
        let split = Operation::SplitNode {
            path: vec![0, 2],
            position: 1,
            properties: Properties::new(),
        };
        assert_eq!(dirty_paths(&split), vec![vec![], vec![0], vec![0, 2], vec![0, 3]]);
        let remove = Operation::RemoveNode {
            path: vec![3],
            node: Node::Text(Text::new("x")),
        };
        assert_eq!(dirty_paths(&remove), vec![Vec::<usize>::new()]);
    }

    #[test]
    fn test_record_dedups_and_rebases() {
        let mut dirty = DirtyPaths::default();
        dirty.record(&Operation::InsertText {
            path: vec![1, 0],
            offset: 0,
            text: "x".into(),
        });
        assert_eq!(dirty.len(), 3);
        dirty.record(&Operation::InsertNode {
            path: vec![0],
            node: Node::text(""),
        });
        let paths: Vec<&Path> = dirty.iter().collect();
        assert_eq!(paths, vec![&vec![], &vec![2], &vec![2, 0], &vec![0]]);
        assert_eq!(dirty.pop(), Some(vec![0]));
    }

    #[test]
    fn test_record_drops_removed() {
        let mut dirty: DirtyPaths = vec![vec![0, 0], vec![1]].into_iter().collect();
        dirty.record(&Operation::RemoveNode {
            path: vec![0],
            node: Node::element(vec![]),
        });
        assert!(!dirty.contains(&[0, 0]));
        assert!(dirty.contains(&[0]));
        assert!(dirty.contains(&[]));
    }
}
