//! Live references: paths, points and ranges that follow the document.
//!
//! A ref is registered with an [`Editor`] when it is acquired and is
//! rebased through every operation the editor applies afterwards. When its
//! target is deleted the ref is dropped from the registry and reads back as
//! `None`. The handle types ([`PathRef`], [`PointRef`], [`RangeRef`]) only
//! hold an id, so they never borrow the editor between operations.
//!
//! ```
//! use slate_core::{Editor, Node, Operation};
//!
//! let mut editor = Editor::new(vec![
//!     Node::element(vec![Node::text("a")]),
//!     Node::element(vec![Node::text("b")]),
//! ]);
//! let second = editor.path_ref(vec![1]);
//! editor
//!     .apply(Operation::RemoveNode { path: vec![0], node: Node::element(vec![Node::text("a")]) })
//!     .unwrap();
//! assert_eq!(second.current(&editor), Some(vec![0]));
//! assert_eq!(second.unref(&mut editor), Some(vec![0]));
//! ```

use indexmap::IndexMap;
use slate_path::{format_path, Path};
use tracing::debug;

use crate::editor::Editor;
use crate::operation::Operation;
use crate::point::{Affinity, Point};
use crate::range::{Range, RangeAffinity};
use crate::transform::{transform_path, transform_point, transform_range};

/// Identifier of a registered ref.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RefId(u64);

#[derive(Debug, Clone, PartialEq)]
enum Tracked {
    Path {
        current: Path,
        affinity: Option<Affinity>,
    },
    Point {
        current: Point,
        affinity: Option<Affinity>,
    },
    Range {
        current: Range,
        affinity: Option<RangeAffinity>,
    },
}

impl Tracked {
    fn kind(&self) -> &'static str {
        match self {
            Tracked::Path { .. } => "path",
            Tracked::Point { .. } => "point",
            Tracked::Range { .. } => "range",
        }
    }

    /// Rebase through `op`; `false` once the target no longer exists.
    fn transform(&mut self, op: &Operation) -> bool {
        match self {
            Tracked::Path { current, affinity } => match transform_path(current, op, *affinity) {
                Some(p) => *current = p,
                None => return false,
            },
            Tracked::Point { current, affinity } => match transform_point(current, op, *affinity) {
                Some(p) => *current = p,
                None => return false,
            },
            Tracked::Range { current, affinity } => match transform_range(current, op, *affinity) {
                Some(r) => *current = r,
                None => return false,
            },
        }
        true
    }
}

/// Every live ref of one editor, in acquisition order.
#[derive(Debug, Default)]
pub(crate) struct RefRegistry {
    next_id: u64,
    live: IndexMap<RefId, Tracked>,
}

impl RefRegistry {
    fn register(&mut self, tracked: Tracked) -> RefId {
        let id = RefId(self.next_id);
        self.next_id += 1;
        self.live.insert(id, tracked);
        id
    }

    fn get(&self, id: RefId) -> Option<&Tracked> {
        self.live.get(&id)
    }

    fn release(&mut self, id: RefId) -> Option<Tracked> {
        self.live.shift_remove(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.live.len()
    }

    /// Rebase every live ref through `op`, dropping those whose target is
    /// gone.
    pub(crate) fn transform(&mut self, op: &Operation) {
        self.live.retain(|id, tracked| {
            let alive = tracked.transform(op);
            if !alive {
                debug!(
                    ref_id = id.0,
                    kind = tracked.kind(),
                    op = op.kind(),
                    path = %op.path().map(|p| format_path(p)).unwrap_or_default(),
                    "ref invalidated"
                );
            }
            alive
        });
    }
}

// ── Handles ───────────────────────────────────────────────────────────────

/// A path that follows the node it points at.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct PathRef {
    id: RefId,
}

impl PathRef {
    pub(crate) fn acquire(editor: &mut Editor, path: Path, affinity: Option<Affinity>) -> Self {
        let id = editor.refs.register(Tracked::Path {
            current: path,
            affinity,
        });
        Self { id }
    }

    pub fn id(&self) -> RefId {
        self.id
    }

    /// The current path, or `None` once the node was removed.
    pub fn current(&self, editor: &Editor) -> Option<Path> {
        match editor.refs.get(self.id)? {
            Tracked::Path { current, .. } => Some(current.clone()),
            _ => None,
        }
    }

    /// Stop tracking and return the final path.
    pub fn unref(self, editor: &mut Editor) -> Option<Path> {
        match editor.refs.release(self.id)? {
            Tracked::Path { current, .. } => Some(current),
            _ => None,
        }
    }
}

/// A point that follows the text it points into.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct PointRef {
    id: RefId,
}

impl PointRef {
    pub(crate) fn acquire(editor: &mut Editor, point: Point, affinity: Option<Affinity>) -> Self {
        let id = editor.refs.register(Tracked::Point {
            current: point,
            affinity,
        });
        Self { id }
    }

    pub fn id(&self) -> RefId {
        self.id
    }

    pub fn current(&self, editor: &Editor) -> Option<Point> {
        match editor.refs.get(self.id)? {
            Tracked::Point { current, .. } => Some(current.clone()),
            _ => None,
        }
    }

    pub fn unref(self, editor: &mut Editor) -> Option<Point> {
        match editor.refs.release(self.id)? {
            Tracked::Point { current, .. } => Some(current),
            _ => None,
        }
    }
}

/// A range whose two points follow the document.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct RangeRef {
    id: RefId,
}

impl RangeRef {
    pub(crate) fn acquire(
        editor: &mut Editor,
        range: Range,
        affinity: Option<RangeAffinity>,
    ) -> Self {
        let id = editor.refs.register(Tracked::Range {
            current: range,
            affinity,
        });
        Self { id }
    }

    pub fn id(&self) -> RefId {
        self.id
    }

    pub fn current(&self, editor: &Editor) -> Option<Range> {
        match editor.refs.get(self.id)? {
            Tracked::Range { current, .. } => Some(current.clone()),
            _ => None,
        }
    }

    pub fn unref(self, editor: &mut Editor) -> Option<Range> {
        match editor.refs.release(self.id)? {
            Tracked::Range { current, .. } => Some(current),
            _ => None,
        }
    }
}
