//! Pluggable per-node behaviour.
//!
//! A [`Schema`] answers which elements are inline or void, repairs a single
//! dirty node during normalization, and decides whether a drain may keep
//! going. Every method has a default body implementing the built-in rules,
//! so a custom schema only overrides what it changes.
//!
//! Schemas compose as a decorator chain: a layer owns the schema it wraps,
//! overrides some methods and forwards the rest to the inner layer.
//! [`CoreSchema`] is the innermost layer and [`ElementTypes`] is a ready-made
//! decorator that classifies elements by their `type` property.
//!
//! ```
//! use slate_core::{Editor, EditorError, Element, Node, NormalizeOptions, Operation, Schema};
//!
//! /// Drops every element marked `"banned": true`.
//! struct Censor<S>(S);
//!
//! impl<S: Schema> Schema for Censor<S> {
//!     fn is_inline(&self, element: &Element) -> bool {
//!         self.0.is_inline(element)
//!     }
//!
//!     fn normalize_node(
//!         &self,
//!         editor: &mut Editor,
//!         path: &[usize],
//!         operation: Option<&Operation>,
//!     ) -> Result<(), EditorError> {
//!         let banned = editor
//!             .node(path)?
//!             .as_element()
//!             .filter(|e| e.properties.get("banned").is_some())
//!             .cloned();
//!         if let Some(element) = banned {
//!             let node = Node::Element(element);
//!             return editor.apply(Operation::RemoveNode { path: path.to_vec(), node });
//!         }
//!         self.0.normalize_node(editor, path, operation)
//!     }
//! }
//!
//! let banned = Element::new(vec![Node::text("spam")]).with_property("banned", true);
//! let mut editor = Editor::new(vec![Node::element(vec![Node::text("ham")]), banned.into()])
//!     .with_schema(Censor(slate_core::CoreSchema));
//! editor.normalize(NormalizeOptions::force()).unwrap();
//! assert_eq!(editor.children(), &[Node::element(vec![Node::text("ham")])]);
//! ```

use std::sync::Arc;

use tracing::warn;

use crate::editor::Editor;
use crate::error::EditorError;
use crate::node::Element;
use crate::normalize::normalize_core;
use crate::operation::Operation;

/// What a schema sees when asked whether a drain may continue.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeContext<'a> {
    /// Dirty paths still pending.
    pub dirty_count: usize,
    /// Paths popped so far in this drain.
    pub iteration: usize,
    /// Dirty paths pending when the drain loop started.
    pub initial_dirty: usize,
    /// Budget multiplier from [`EditorOptions`](crate::EditorOptions).
    pub iteration_factor: usize,
    /// The operation that triggered the drain, if any.
    pub operation: Option<&'a Operation>,
}

impl NormalizeContext<'_> {
    /// Maximum number of iterations before the drain is considered stuck.
    pub fn max_iterations(&self) -> usize {
        self.initial_dirty.saturating_mul(self.iteration_factor)
    }
}

pub trait Schema: Send + Sync {
    /// Check if an element flows inline with text.
    fn is_inline(&self, _element: &Element) -> bool {
        false
    }

    /// Check if an element's content is opaque to text traversal.
    fn is_void(&self, _element: &Element) -> bool {
        false
    }

    /// Repair the node at `path`, issuing operations through `editor`.
    ///
    /// The default applies the built-in structural rules.
    fn normalize_node(
        &self,
        editor: &mut Editor,
        path: &[usize],
        _operation: Option<&Operation>,
    ) -> Result<(), EditorError> {
        normalize_core(editor, path)
    }

    /// Decide whether the drain may pop another dirty path.
    ///
    /// Returning `Ok(false)` stops the drain and leaves the remaining paths
    /// dirty. The default fails once the iteration count exceeds the budget.
    fn should_normalize(&self, ctx: &NormalizeContext<'_>) -> Result<bool, EditorError> {
        let max = ctx.max_iterations();
        if ctx.iteration > max {
            warn!(
                iterations = max,
                dirty = ctx.dirty_count,
                "normalization did not converge"
            );
            return Err(EditorError::NormalizeDivergence { iterations: max });
        }
        Ok(true)
    }
}

/// The built-in rules, with nothing inline and nothing void.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoreSchema;

impl Schema for CoreSchema {}

impl<S: Schema + ?Sized> Schema for Box<S> {
    fn is_inline(&self, element: &Element) -> bool {
        (**self).is_inline(element)
    }

    fn is_void(&self, element: &Element) -> bool {
        (**self).is_void(element)
    }

    fn normalize_node(
        &self,
        editor: &mut Editor,
        path: &[usize],
        operation: Option<&Operation>,
    ) -> Result<(), EditorError> {
        (**self).normalize_node(editor, path, operation)
    }

    fn should_normalize(&self, ctx: &NormalizeContext<'_>) -> Result<bool, EditorError> {
        (**self).should_normalize(ctx)
    }
}

impl<S: Schema + ?Sized> Schema for Arc<S> {
    fn is_inline(&self, element: &Element) -> bool {
        (**self).is_inline(element)
    }

    fn is_void(&self, element: &Element) -> bool {
        (**self).is_void(element)
    }

    fn normalize_node(
        &self,
        editor: &mut Editor,
        path: &[usize],
        operation: Option<&Operation>,
    ) -> Result<(), EditorError> {
        (**self).normalize_node(editor, path, operation)
    }

    fn should_normalize(&self, ctx: &NormalizeContext<'_>) -> Result<bool, EditorError> {
        (**self).should_normalize(ctx)
    }
}

// ── ElementTypes ──────────────────────────────────────────────────────────

/// Decorator marking elements inline or void by their `type` property.
///
/// ```
/// use slate_core::{Element, ElementTypes, Schema};
///
/// let schema = ElementTypes::new().inline("link").void("image");
/// assert!(schema.is_inline(&Element::new(vec![]).with_property("type", "link")));
/// assert!(!schema.is_inline(&Element::new(vec![]).with_property("type", "paragraph")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ElementTypes<S = CoreSchema> {
    inner: S,
    inline: Vec<String>,
    void: Vec<String>,
}

impl ElementTypes<CoreSchema> {
    pub fn new() -> Self {
        Self::wrap(CoreSchema)
    }
}

impl<S: Schema> ElementTypes<S> {
    pub fn wrap(inner: S) -> Self {
        Self {
            inner,
            inline: Vec::new(),
            void: Vec::new(),
        }
    }

    pub fn inline(mut self, element_type: impl Into<String>) -> Self {
        self.inline.push(element_type.into());
        self
    }

    pub fn void(mut self, element_type: impl Into<String>) -> Self {
        self.void.push(element_type.into());
        self
    }

    fn type_in(element: &Element, types: &[String]) -> bool {
        element
            .properties
            .get("type")
            .and_then(|t| t.as_str())
            .is_some_and(|t| types.iter().any(|known| known == t))
    }
}

impl<S: Schema> Schema for ElementTypes<S> {
    fn is_inline(&self, element: &Element) -> bool {
        Self::type_in(element, &self.inline) || self.inner.is_inline(element)
    }

    fn is_void(&self, element: &Element) -> bool {
        Self::type_in(element, &self.void) || self.inner.is_void(element)
    }

    fn normalize_node(
        &self,
        editor: &mut Editor,
        path: &[usize],
        operation: Option<&Operation>,
    ) -> Result<(), EditorError> {
        self.inner.normalize_node(editor, path, operation)
    }

    fn should_normalize(&self, ctx: &NormalizeContext<'_>) -> Result<bool, EditorError> {
        self.inner.should_normalize(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(iteration: usize, initial_dirty: usize) -> NormalizeContext<'static> {
        NormalizeContext {
            dirty_count: 1,
            iteration,
            initial_dirty,
            iteration_factor: 42,
            operation: None,
        }
    }

    #[test]
    fn test_default_budget() {
        let schema = CoreSchema;
        assert!(schema.should_normalize(&ctx(84, 2)).unwrap());
        assert_eq!(
            schema.should_normalize(&ctx(85, 2)).unwrap_err(),
            EditorError::NormalizeDivergence { iterations: 84 }
        );
    }

    #[test]
    fn test_element_types_chain() {
        let schema = ElementTypes::wrap(ElementTypes::new().void("image")).inline("link");
        let link = Element::new(vec![]).with_property("type", "link");
        let image = Element::new(vec![]).with_property("type", "image");
        assert!(schema.is_inline(&link));
        assert!(!schema.is_void(&link));
        assert!(schema.is_void(&image));
        assert!(!schema.is_inline(&image));
    }

    #[test]
    fn test_boxed_schema_forwards() {
        let schema: Box<dyn Schema> = Box::new(ElementTypes::new().inline("mention"));
        assert!(schema.is_inline(&Element::new(vec![]).with_property("type", "mention")));
    }
}
