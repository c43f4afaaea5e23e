//! Tree document editing engine.
//!
//! A document is a tree of [`Element`]s and [`Text`] leaves addressed by
//! integer [`Path`]s. It only changes through nine invertible
//! [`Operation`]s, applied by an [`Editor`] which keeps the selection,
//! every live ref and the set of dirty paths consistent, then normalizes
//! the document back into shape through a pluggable [`Schema`].
//!
//! # Example
//!
//! ```
//! use slate_core::{
//!     transform_range, Editor, Node, Operation, Point, Properties, Range, RangeAffinity,
//! };
//!
//! let mut editor = Editor::new(vec![Node::element(vec![Node::text("hello")])]);
//! let mut bold = Properties::new();
//! bold.insert("bold".into(), true.into());
//! // The new leaf gets different marks, so normalization keeps the two
//! // leaves apart.
//! let split = Operation::SplitNode {
//!     path: vec![0, 0],
//!     position: 2,
//!     properties: bold,
//! };
//!
//! // A caret at the split point stays collapsed when rebased inward.
//! let caret = Range::collapsed(Point::new(vec![0, 0], 2));
//! let rebased = transform_range(&caret, &split, Some(RangeAffinity::Inward)).unwrap();
//! assert!(rebased.is_collapsed());
//!
//! editor.apply(split.clone()).unwrap();
//! assert_eq!(editor.leaf(&[0, 1]).unwrap().text, "llo");
//!
//! // Undo with the inverse.
//! editor.apply(split.inverse().unwrap()).unwrap();
//! assert_eq!(editor.children(), &[Node::element(vec![Node::text("hello")])]);
//! ```

pub mod apply;
pub mod codec;
pub mod editor;
pub mod error;
pub mod node;
pub mod normalize;
pub mod operation;
pub mod point;
pub mod range;
pub mod refs;
pub mod schema;
pub mod transform;
pub mod utf16;

pub use apply::apply_operation;
pub use editor::{Change, Editor, EditorOptions, NormalizeOptions};
pub use error::EditorError;
pub use node::{Element, Node, NodeRef, Nodes, NodesOptions, Properties, Text};
pub use normalize::{dirty_paths, normalize_core, DirtyPaths};
pub use operation::{Operation, SelectionPatch};
pub use point::{Affinity, Point};
pub use range::{Edge, Range, RangeAffinity, Target};
pub use refs::{PathRef, PointRef, RangeRef, RefId};
pub use schema::{CoreSchema, ElementTypes, NormalizeContext, Schema};
pub use transform::{transform_path, transform_point, transform_range};

pub use slate_path::{Path, PathError, ValidationError};
