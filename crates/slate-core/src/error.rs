//! Error type shared by every fallible editor operation.

use slate_path::{format_path, Path, PathError, ValidationError};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EditorError {
    // ── Structural errors ─────────────────────────────────────────────────
    #[error("cannot find a node at path [{}]", format_path(path))]
    NotFound { path: Path },
    #[error("node at path [{}] is not a text leaf", format_path(path))]
    NotText { path: Path },
    #[error("node at path [{}] is a text leaf and cannot hold children", format_path(path))]
    NotAncestor { path: Path },
    #[error(
        "cannot insert a node at path [{}] because the destination is past the end of its parent",
        format_path(path)
    )]
    InsertPastEnd { path: Path },
    #[error(
        "cannot merge the node at path [{}] into a previous sibling of a different kind",
        format_path(path)
    )]
    MergeMismatch { path: Path },
    #[error(
        "cannot move path [{}] to new path [{}] because the destination is inside itself",
        format_path(path),
        format_path(new_path)
    )]
    MoveIntoSelf { path: Path, new_path: Path },
    #[error("cannot apply a {kind} operation to the root node")]
    RootPath { kind: &'static str },
    #[error("cannot set the {0:?} property of nodes")]
    ForbiddenProperty(String),
    #[error(
        "cannot apply an incomplete set_selection operation when there is no current selection"
    )]
    IncompleteSelection,
    #[error("cannot remove the {0:?} selection property")]
    SelectionEndpointRemoved(String),
    #[error("offset {offset} is out of range for the text at path [{}]", format_path(path))]
    OffsetOutOfRange { path: Path, offset: usize },

    // ── Normalization ─────────────────────────────────────────────────────
    #[error("could not completely normalize the editor after {iterations} iterations")]
    NormalizeDivergence { iterations: usize },

    // ── Codec ─────────────────────────────────────────────────────────────
    #[error("invalid node: {0}")]
    InvalidNode(String),
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    #[error(transparent)]
    InvalidPath(#[from] ValidationError),

    #[error(transparent)]
    Path(#[from] PathError),
    #[error("editor is poisoned by an earlier failed operation")]
    Poisoned,
}
