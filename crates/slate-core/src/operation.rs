//! The nine atomic, invertible edit operations.
//!
//! Every change to a document is expressed as a sequence of
//! [`Operation`]s. Each operation carries exactly the data needed both to
//! apply it and to build its [`inverse`](Operation::inverse), which is all
//! an undo history needs.

use slate_path::Path;

use crate::error::EditorError;
use crate::node::{Node, Properties};
use crate::point::{Affinity, Point};
use crate::transform::transform_path;

/// A partial selection used by `set_selection`.
///
/// Unset endpoints are left untouched. A `null` value in `properties`
/// deletes that extra selection property.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectionPatch {
    pub anchor: Option<Point>,
    pub focus: Option<Point>,
    pub properties: Properties,
}

impl SelectionPatch {
    /// A patch setting both endpoints.
    pub fn range(anchor: Point, focus: Point) -> Self {
        Self {
            anchor: Some(anchor),
            focus: Some(focus),
            properties: Properties::new(),
        }
    }
}

impl From<crate::range::Range> for SelectionPatch {
    fn from(r: crate::range::Range) -> Self {
        Self {
            anchor: Some(r.anchor),
            focus: Some(r.focus),
            properties: r.properties,
        }
    }
}

/// An atomic edit.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    InsertNode {
        path: Path,
        node: Node,
    },
    RemoveNode {
        path: Path,
        node: Node,
    },
    InsertText {
        path: Path,
        offset: usize,
        text: String,
    },
    RemoveText {
        path: Path,
        offset: usize,
        text: String,
    },
    /// Fold the node at `path` into its previous sibling. `position` is the
    /// length (text units or child count) of that sibling before the merge.
    MergeNode {
        path: Path,
        position: usize,
        properties: Properties,
    },
    /// Split the node at `path` at `position`; `properties` go to the new
    /// right-hand sibling.
    SplitNode {
        path: Path,
        position: usize,
        properties: Properties,
    },
    MoveNode {
        path: Path,
        new_path: Path,
    },
    SetNode {
        path: Path,
        properties: Properties,
        new_properties: Properties,
    },
    SetSelection {
        properties: Option<SelectionPatch>,
        new_properties: Option<SelectionPatch>,
    },
}

impl Operation {
    /// The wire name of the operation kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::InsertNode { .. } => "insert_node",
            Operation::RemoveNode { .. } => "remove_node",
            Operation::InsertText { .. } => "insert_text",
            Operation::RemoveText { .. } => "remove_text",
            Operation::MergeNode { .. } => "merge_node",
            Operation::SplitNode { .. } => "split_node",
            Operation::MoveNode { .. } => "move_node",
            Operation::SetNode { .. } => "set_node",
            Operation::SetSelection { .. } => "set_selection",
        }
    }

    /// The path the operation targets, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Operation::InsertNode { path, .. }
            | Operation::RemoveNode { path, .. }
            | Operation::InsertText { path, .. }
            | Operation::RemoveText { path, .. }
            | Operation::MergeNode { path, .. }
            | Operation::SplitNode { path, .. }
            | Operation::MoveNode { path, .. }
            | Operation::SetNode { path, .. } => Some(path),
            Operation::SetSelection { .. } => None,
        }
    }

    pub fn is_node_operation(&self) -> bool {
        matches!(
            self,
            Operation::InsertNode { .. }
                | Operation::RemoveNode { .. }
                | Operation::MergeNode { .. }
                | Operation::SplitNode { .. }
                | Operation::MoveNode { .. }
                | Operation::SetNode { .. }
        )
    }

    pub fn is_text_operation(&self) -> bool {
        matches!(self, Operation::InsertText { .. } | Operation::RemoveText { .. })
    }

    pub fn is_selection_operation(&self) -> bool {
        matches!(self, Operation::SetSelection { .. })
    }

    /// Check if the operation can change the path of some node.
    pub fn can_transform_path(&self) -> bool {
        matches!(
            self,
            Operation::InsertNode { .. }
                | Operation::RemoveNode { .. }
                | Operation::MergeNode { .. }
                | Operation::SplitNode { .. }
                | Operation::MoveNode { .. }
        )
    }

    /// Build the operation that exactly undoes this one.
    ///
    /// # Errors
    ///
    /// Fails only for malformed operations whose paths cannot have a
    /// previous or next sibling (a merge at index 0, a split of the root).
    pub fn inverse(&self) -> Result<Operation, EditorError> {
        let inverse = match self.clone() {
            Operation::InsertNode { path, node } => Operation::RemoveNode { path, node },
            Operation::RemoveNode { path, node } => Operation::InsertNode { path, node },
            Operation::InsertText { path, offset, text } => {
                Operation::RemoveText { path, offset, text }
            }
            Operation::RemoveText { path, offset, text } => {
                Operation::InsertText { path, offset, text }
            }
            Operation::MergeNode {
                path,
                position,
                properties,
            } => Operation::SplitNode {
                path: slate_path::previous(&path)?,
                position,
                properties,
            },
            Operation::SplitNode {
                path,
                position,
                properties,
            } => Operation::MergeNode {
                path: slate_path::next(&path)?,
                position,
                properties,
            },
            Operation::MoveNode { path, new_path } => {
                if path == new_path {
                    return Ok(self.clone());
                }
                if slate_path::is_sibling(&path, &new_path) {
                    Operation::MoveNode {
                        path: new_path,
                        new_path: path,
                    }
                } else {
                    // Where the node ended up, and where the slot right
                    // after its old position went.
                    let inverse_path = transform_path(&path, self, Some(Affinity::Forward))
                        .ok_or_else(|| EditorError::NotFound { path: path.clone() })?;
                    let next = slate_path::next(&path)?;
                    let inverse_new_path = transform_path(&next, self, Some(Affinity::Forward))
                        .ok_or(EditorError::NotFound { path: next })?;
                    Operation::MoveNode {
                        path: inverse_path,
                        new_path: inverse_new_path,
                    }
                }
            }
            Operation::SetNode {
                path,
                properties,
                new_properties,
            } => Operation::SetNode {
                path,
                properties: new_properties,
                new_properties: properties,
            },
            Operation::SetSelection {
                properties,
                new_properties,
            } => Operation::SetSelection {
                properties: new_properties,
                new_properties: properties,
            },
        };
        Ok(inverse)
    }
}
