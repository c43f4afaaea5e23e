//! The editor: one document, its selection, and the machinery that keeps
//! everything consistent as operations are applied.
//!
//! [`Editor::apply`] is the only way to change the document. Each call
//!
//! 1. applies the operation to the tree and selection,
//! 2. rebases every live ref,
//! 3. rebases the pending dirty paths and adds the ones the operation
//!    dirtied,
//! 4. records the operation in the log of the current burst, and
//! 5. normalizes, unless normalization is suspended.
//!
//! An editor is single-writer: `apply` takes `&mut self`, so one editor is
//! never mutated from two places at once. Put it behind a lock or keep it
//! on one thread to share it.
//!
//! ```
//! use slate_core::{Editor, Node, Operation};
//!
//! let mut editor = Editor::new(vec![Node::element(vec![Node::text("he")])]);
//! editor
//!     .apply(Operation::InsertText { path: vec![0, 0], offset: 2, text: "llo".into() })
//!     .unwrap();
//! assert_eq!(editor.string(&[]).unwrap(), "hello");
//!
//! let change = editor.flush().unwrap();
//! assert_eq!(change.operations.len(), 1);
//! assert!(editor.flush().is_none());
//! ```

use std::fmt;
use std::sync::Arc;

use slate_path::{format_path, Path};
use tracing::{debug, trace};

use crate::apply::apply_operation;
use crate::error::EditorError;
use crate::node::{self, iter, Element, Node, NodeRef, Nodes, NodesOptions, Properties, Text};
use crate::normalize::DirtyPaths;
use crate::operation::Operation;
use crate::point::{Affinity, Point};
use crate::range::{Range, RangeAffinity};
use crate::refs::{PathRef, PointRef, RangeRef, RefRegistry};
use crate::schema::{CoreSchema, NormalizeContext, Schema};

// ── Options ───────────────────────────────────────────────────────────────

/// Editor-wide settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorOptions {
    /// A drain fails once it pops more than this many paths per path that
    /// was dirty when it started.
    pub iteration_factor: usize,
    /// Keep applied operations in the log until the next flush.
    pub record_operations: bool,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            iteration_factor: 42,
            record_operations: true,
        }
    }
}

impl EditorOptions {
    pub fn with_iteration_factor(mut self, factor: usize) -> Self {
        self.iteration_factor = factor;
        self
    }

    pub fn with_record_operations(mut self, record: bool) -> Self {
        self.record_operations = record;
        self
    }
}

/// Options for an explicit [`Editor::normalize`] call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizeOptions {
    /// Mark every node in the document dirty first.
    pub force: bool,
    /// The operation that triggered the drain, passed on to the schema.
    pub operation: Option<Operation>,
}

impl NormalizeOptions {
    pub fn force() -> Self {
        Self {
            force: true,
            operation: None,
        }
    }
}

/// Everything applied during one burst, delivered by [`Editor::flush`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Change {
    pub operations: Vec<Operation>,
}

type Listener = Box<dyn FnMut(&Change) + Send>;

// ── Editor ────────────────────────────────────────────────────────────────

pub struct Editor {
    children: Vec<Node>,
    selection: Option<Range>,
    marks: Option<Properties>,
    operations: Vec<Operation>,
    dirty: DirtyPaths,
    normalizing: bool,
    flushing: bool,
    poisoned: bool,
    pub(crate) refs: RefRegistry,
    schema: Arc<dyn Schema>,
    listeners: Vec<Listener>,
    options: EditorOptions,
}

impl Editor {
    /// Create an editor over a document with the built-in schema.
    ///
    /// The document is taken as is; call
    /// [`normalize`](Self::normalize) with [`NormalizeOptions::force`] to
    /// repair it up front.
    pub fn new(children: Vec<Node>) -> Self {
        Self {
            children,
            selection: None,
            marks: None,
            operations: Vec::new(),
            dirty: DirtyPaths::default(),
            normalizing: true,
            flushing: false,
            poisoned: false,
            refs: RefRegistry::default(),
            schema: Arc::new(CoreSchema),
            listeners: Vec::new(),
            options: EditorOptions::default(),
        }
    }

    pub fn with_schema(mut self, schema: impl Schema + 'static) -> Self {
        self.schema = Arc::new(schema);
        self
    }

    pub fn with_options(mut self, options: EditorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_selection(mut self, selection: Option<Range>) -> Self {
        self.selection = selection;
        self
    }

    // ── State ─────────────────────────────────────────────────────────────

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Consume the editor and hand back the document.
    ///
    /// ```
    /// use slate_core::{Editor, Node, Operation};
    ///
    /// let mut editor = Editor::new(vec![Node::element(vec![Node::text("a")])]);
    /// editor
    ///     .apply(Operation::InsertText {
    ///         path: vec![0, 0],
    ///         offset: 1,
    ///         text: "b".into(),
    ///     })
    ///     .unwrap();
    /// assert_eq!(editor.into_children(), vec![Node::element(vec![Node::text("ab")])]);
    /// ```
    pub fn into_children(self) -> Vec<Node> {
        self.children
    }

    pub fn selection(&self) -> Option<&Range> {
        self.selection.as_ref()
    }

    /// Marks to apply to the next inserted text. Cleared on every
    /// `set_selection`.
    pub fn marks(&self) -> Option<&Properties> {
        self.marks.as_ref()
    }

    pub fn set_marks(&mut self, marks: Option<Properties>) {
        self.marks = marks;
    }

    /// Operations applied since the last flush.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn dirty_paths(&self) -> &DirtyPaths {
        &self.dirty
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn is_normalizing(&self) -> bool {
        self.normalizing
    }

    pub fn is_flushing(&self) -> bool {
        self.flushing
    }

    /// Check if a failed drain left the document in an unknown state.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Number of live refs.
    pub fn ref_count(&self) -> usize {
        self.refs.len()
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn root(&self) -> NodeRef<'_> {
        NodeRef::Editor(&self.children)
    }

    pub fn node(&self, path: &[usize]) -> Result<NodeRef<'_>, EditorError> {
        node::get(self.root(), path)
    }

    pub fn has(&self, path: &[usize]) -> bool {
        node::has(self.root(), path)
    }

    pub fn leaf(&self, path: &[usize]) -> Result<&Text, EditorError> {
        node::leaf(self.root(), path)
    }

    /// Concatenated text of the node at `path`.
    pub fn string(&self, path: &[usize]) -> Result<String, EditorError> {
        Ok(node::string(self.node(path)?))
    }

    pub fn nodes<'a>(&'a self, options: NodesOptions<'a>) -> Nodes<'a> {
        iter::nodes(self.root(), options)
    }

    pub fn is_inline(&self, element: &Element) -> bool {
        self.schema.is_inline(element)
    }

    pub fn is_void(&self, element: &Element) -> bool {
        self.schema.is_void(element)
    }

    // ── Applying ──────────────────────────────────────────────────────────

    /// Apply one operation and normalize.
    ///
    /// # Errors
    ///
    /// A structural error leaves the editor unchanged. An error raised
    /// while normalizing poisons the editor; every later call then fails
    /// with [`EditorError::Poisoned`].
    pub fn apply(&mut self, op: Operation) -> Result<(), EditorError> {
        if self.poisoned {
            return Err(EditorError::Poisoned);
        }
        debug!(
            op = op.kind(),
            path = %op.path().map(|p| format_path(p)).unwrap_or_default(),
            "apply"
        );
        apply_operation(&mut self.children, &mut self.selection, &op)?;
        self.refs.transform(&op);
        self.dirty.record(&op);
        if op.is_selection_operation() {
            self.marks = None;
        }
        if self.options.record_operations {
            self.operations.push(op.clone());
        }
        self.flushing = true;
        self.normalize(NormalizeOptions {
            force: false,
            operation: Some(op),
        })
    }

    // ── Normalization ─────────────────────────────────────────────────────

    /// Drain the dirty paths through the schema until none are left.
    ///
    /// Does nothing while normalization is suspended.
    pub fn normalize(&mut self, options: NormalizeOptions) -> Result<(), EditorError> {
        if self.poisoned {
            return Err(EditorError::Poisoned);
        }
        if !self.normalizing {
            return Ok(());
        }
        if options.force {
            self.dirty = self
                .nodes(NodesOptions::default())
                .map(|(_, path)| path)
                .collect();
        }
        if self.dirty.is_empty() {
            return Ok(());
        }
        self.normalizing = false;
        let result = self.drain(options.operation.as_ref());
        self.normalizing = true;
        if result.is_err() {
            self.poisoned = true;
        }
        result
    }

    fn drain(&mut self, operation: Option<&Operation>) -> Result<(), EditorError> {
        let schema = Arc::clone(&self.schema);
        debug!(dirty = self.dirty.len(), "normalize start");

        // Empty containers first: other rules expect children to exist.
        let snapshot: Vec<Path> = self.dirty.iter().cloned().collect();
        for path in snapshot {
            let empty = self
                .node(&path)
                .ok()
                .and_then(|node| node.children())
                .is_some_and(|children| children.is_empty());
            if empty {
                schema.normalize_node(self, &path, operation)?;
            }
        }

        let initial_dirty = self.dirty.len();
        let mut iteration = 0;
        while !self.dirty.is_empty() {
            let ctx = NormalizeContext {
                dirty_count: self.dirty.len(),
                iteration,
                initial_dirty,
                iteration_factor: self.options.iteration_factor,
                operation,
            };
            if !schema.should_normalize(&ctx)? {
                debug!(remaining = self.dirty.len(), "normalize stopped by schema");
                break;
            }
            let Some(path) = self.dirty.pop() else {
                break;
            };
            if self.has(&path) {
                trace!(path = %format_path(&path), "normalize node");
                schema.normalize_node(self, &path, operation)?;
            }
            iteration += 1;
        }
        debug!(iterations = iteration, "normalize end");
        Ok(())
    }

    /// Run `f` with normalization suspended, then normalize once.
    ///
    /// Calls nest: only the outermost one drains. If `f` fails the flag is
    /// restored and the error returned without normalizing.
    pub fn without_normalizing<R>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<R, EditorError>,
    ) -> Result<R, EditorError> {
        let was_normalizing = self.normalizing;
        self.normalizing = false;
        let result = f(self);
        self.normalizing = was_normalizing;
        let value = result?;
        self.normalize(NormalizeOptions::default())?;
        Ok(value)
    }

    /// Forget every pending dirty path without normalizing.
    pub fn clear_dirty_paths(&mut self) {
        self.dirty.clear();
    }

    // ── Change notification ───────────────────────────────────────────────

    /// Register a listener called on every flush.
    pub fn on_change(&mut self, listener: impl FnMut(&Change) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// End the current burst of operations.
    ///
    /// If anything was applied since the last flush, every listener gets
    /// one [`Change`] holding the logged operations, the log is cleared and
    /// the change is returned.
    pub fn flush(&mut self) -> Option<Change> {
        if !self.flushing {
            return None;
        }
        self.flushing = false;
        let change = Change {
            operations: std::mem::take(&mut self.operations),
        };
        debug!(operations = change.operations.len(), "flush");
        for listener in &mut self.listeners {
            listener(&change);
        }
        Some(change)
    }

    /// Run `f` as one burst and flush afterwards, whether or not it failed.
    pub fn batch<R>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<R, EditorError>,
    ) -> Result<R, EditorError> {
        let result = f(self);
        self.flush();
        result
    }

    // ── Refs ──────────────────────────────────────────────────────────────

    /// Track `path` with forward affinity.
    pub fn path_ref(&mut self, path: Path) -> PathRef {
        self.path_ref_with_affinity(path, Some(Affinity::Forward))
    }

    pub fn path_ref_with_affinity(&mut self, path: Path, affinity: Option<Affinity>) -> PathRef {
        PathRef::acquire(self, path, affinity)
    }

    /// Track `point` with forward affinity.
    pub fn point_ref(&mut self, point: Point) -> PointRef {
        self.point_ref_with_affinity(point, Some(Affinity::Forward))
    }

    pub fn point_ref_with_affinity(
        &mut self,
        point: Point,
        affinity: Option<Affinity>,
    ) -> PointRef {
        PointRef::acquire(self, point, affinity)
    }

    /// Track `range` with inward affinity.
    pub fn range_ref(&mut self, range: Range) -> RangeRef {
        self.range_ref_with_affinity(range, Some(RangeAffinity::Inward))
    }

    pub fn range_ref_with_affinity(
        &mut self,
        range: Range,
        affinity: Option<RangeAffinity>,
    ) -> RangeRef {
        RangeRef::acquire(self, range, affinity)
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("children", &self.children)
            .field("selection", &self.selection)
            .field("marks", &self.marks)
            .field("operations", &self.operations)
            .field("dirty", &self.dirty)
            .field("normalizing", &self.normalizing)
            .field("flushing", &self.flushing)
            .field("poisoned", &self.poisoned)
            .field("refs", &self.refs.len())
            .field("listeners", &self.listeners.len())
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn paragraph(text: &str) -> Node {
        Node::element(vec![Node::text(text)])
    }

    fn insert_text(path: &[usize], offset: usize, text: &str) -> Operation {
        Operation::InsertText {
            path: path.to_vec(),
            offset,
            text: text.into(),
        }
    }

    #[test]
    fn test_apply_logs_and_flushes_once() {
        let mut editor = Editor::new(vec![paragraph("a")]);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        editor.on_change(move |change| sink.lock().unwrap().push(change.operations.len()));
        editor.apply(insert_text(&[0, 0], 1, "b")).unwrap();
        editor.apply(insert_text(&[0, 0], 2, "c")).unwrap();
        assert!(editor.is_flushing());
        assert_eq!(editor.operations().len(), 2);
        editor.flush();
        assert!(editor.flush().is_none());
        assert_eq!(*seen.lock().unwrap(), vec![2]);
        assert!(editor.operations().is_empty());
    }

    #[test]
    fn test_record_operations_off() {
        let options = EditorOptions::default().with_record_operations(false);
        let mut editor = Editor::new(vec![paragraph("a")]).with_options(options);
        editor.apply(insert_text(&[0, 0], 1, "b")).unwrap();
        assert!(editor.operations().is_empty());
        assert_eq!(editor.flush(), Some(Change::default()));
    }

    #[test]
    fn test_structural_error_leaves_editor_usable() {
        let mut editor = Editor::new(vec![paragraph("a")]);
        let err = editor.apply(insert_text(&[0, 0], 5, "x")).unwrap_err();
        assert!(matches!(err, EditorError::OffsetOutOfRange { .. }));
        assert!(!editor.is_poisoned());
        assert!(!editor.is_flushing());
        editor.apply(insert_text(&[0, 0], 1, "x")).unwrap();
        assert_eq!(editor.string(&[]).unwrap(), "ax");
    }

    #[test]
    fn test_set_selection_clears_marks() {
        let mut editor = Editor::new(vec![paragraph("a")]);
        let mut marks = Properties::new();
        marks.insert("bold".into(), true.into());
        editor.set_marks(Some(marks));
        editor
            .apply(Operation::SetSelection {
                properties: None,
                new_properties: Some(Range::collapsed(Point::new(vec![0, 0], 0)).into()),
            })
            .unwrap();
        assert!(editor.marks().is_none());
        assert!(editor.selection().is_some());
    }

    #[test]
    fn test_without_normalizing_nests() {
        let mut editor = Editor::new(vec![paragraph("a")]);
        editor
            .without_normalizing(|ed| {
                ed.apply(Operation::InsertNode {
                    path: vec![1],
                    node: Node::element(vec![]),
                })?;
                ed.without_normalizing(|inner| {
                    assert!(!inner.is_normalizing());
                    Ok(())
                })?;
                // Still empty: the inner call must not drain.
                assert_eq!(ed.node(&[1])?.children().map(<[Node]>::len), Some(0));
                Ok(())
            })
            .unwrap();
        assert!(editor.is_normalizing());
        assert_eq!(editor.children()[1], paragraph(""));
    }

    #[test]
    fn test_without_normalizing_error_restores_flag() {
        let mut editor = Editor::new(vec![paragraph("a")]);
        let result: Result<(), _> =
            editor.without_normalizing(|ed| ed.apply(insert_text(&[9], 0, "x")));
        assert!(result.is_err());
        assert!(editor.is_normalizing());
    }

    #[test]
    fn test_batch_flushes_on_error() {
        let mut editor = Editor::new(vec![paragraph("a")]);
        let result = editor.batch(|ed| {
            ed.apply(insert_text(&[0, 0], 1, "b"))?;
            ed.apply(insert_text(&[7, 0], 0, "c"))
        });
        assert!(result.is_err());
        assert!(!editor.is_flushing());
        assert!(editor.operations().is_empty());
    }

    #[test]
    fn test_force_normalize_repairs_initial_document() {
        let mut editor = Editor::new(vec![Node::element(vec![]), Node::text("loose")]);
        editor.normalize(NormalizeOptions::force()).unwrap();
        assert_eq!(editor.children(), &[paragraph("")]);
        assert!(editor.dirty_paths().is_empty());
    }
}
