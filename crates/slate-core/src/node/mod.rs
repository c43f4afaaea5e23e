//! Document nodes and path-based tree queries.
//!
//! A document is a tree: the editor root holds a list of [`Node`]s, each of
//! which is either an [`Element`] (with children) or a [`Text`] leaf. Nodes
//! carry arbitrary user-defined properties in a JSON property bag.
//!
//! There are no parent pointers. Every node is located by its [`Path`]
//! from the root, and every query here walks `children[index]` from a
//! [`NodeRef`] downwards.

pub mod iter;

pub use iter::{Nodes, NodesOptions};

use serde_json::{Map, Value};
use slate_path::Path;

use crate::error::EditorError;
use crate::utf16::utf16_len;

/// User-defined properties attached to a node or selection.
pub type Properties = Map<String, Value>;

// ── Node types ────────────────────────────────────────────────────────────

/// A node that holds children, plus arbitrary properties.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub children: Vec<Node>,
    pub properties: Properties,
}

impl Element {
    pub fn new(children: Vec<Node>) -> Self {
        Self {
            children,
            properties: Properties::new(),
        }
    }

    /// Add a property, builder style.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// A leaf holding a string, plus arbitrary mark properties.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Text {
    pub text: String,
    pub properties: Properties,
}

impl Text {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            properties: Properties::new(),
        }
    }

    /// Add a mark property, builder style.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Length of the text in UTF-16 code units.
    pub fn len(&self) -> usize {
        utf16_len(&self.text)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Check if two leaves are equal.
    ///
    /// With `loose` set, only the mark properties are compared and the
    /// text itself is ignored; this is how adjacent leaves are found to be
    /// mergeable.
    pub fn equals(&self, another: &Text, loose: bool) -> bool {
        (loose || self.text == another.text) && self.properties == another.properties
    }
}

/// A descendant of the document root.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(Text),
}

impl Node {
    /// Shorthand for a text leaf without marks.
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(Text::new(text))
    }

    /// Shorthand for an element without properties.
    pub fn element(children: Vec<Node>) -> Self {
        Node::Element(Element::new(children))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element(_))
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Node::Text(t) => Some(t),
            Node::Element(_) => None,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        }
    }

    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Node::Element(e) => Some(&e.children),
            Node::Text(_) => None,
        }
    }

    pub fn properties(&self) -> &Properties {
        match self {
            Node::Element(e) => &e.properties,
            Node::Text(t) => &t.properties,
        }
    }

    pub fn properties_mut(&mut self) -> &mut Properties {
        match self {
            Node::Element(e) => &mut e.properties,
            Node::Text(t) => &mut t.properties,
        }
    }

    pub fn as_ref(&self) -> NodeRef<'_> {
        match self {
            Node::Element(e) => NodeRef::Element(e),
            Node::Text(t) => NodeRef::Text(t),
        }
    }
}

impl From<Element> for Node {
    fn from(e: Element) -> Self {
        Node::Element(e)
    }
}

impl From<Text> for Node {
    fn from(t: Text) -> Self {
        Node::Text(t)
    }
}

/// Borrowed view of any node in a document, including the root.
///
/// The root is viewed through its list of children, so a `NodeRef` can be
/// built from an editor or from any detached list of nodes.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Editor(&'a [Node]),
    Element(&'a Element),
    Text(&'a Text),
}

impl<'a> NodeRef<'a> {
    pub fn children(self) -> Option<&'a [Node]> {
        match self {
            NodeRef::Editor(children) => Some(children),
            NodeRef::Element(e) => Some(&e.children),
            NodeRef::Text(_) => None,
        }
    }

    pub fn as_text(self) -> Option<&'a Text> {
        match self {
            NodeRef::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_element(self) -> Option<&'a Element> {
        match self {
            NodeRef::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_editor(self) -> bool {
        matches!(self, NodeRef::Editor(_))
    }

    pub fn is_element(self) -> bool {
        matches!(self, NodeRef::Element(_))
    }

    pub fn is_text(self) -> bool {
        matches!(self, NodeRef::Text(_))
    }

    /// Clone the referenced node. The root has no `Node` form.
    pub fn to_node(self) -> Option<Node> {
        match self {
            NodeRef::Editor(_) => None,
            NodeRef::Element(e) => Some(Node::Element(e.clone())),
            NodeRef::Text(t) => Some(Node::Text(t.clone())),
        }
    }
}

// ── Queries ───────────────────────────────────────────────────────────────

/// Get the child of `node` at `index`.
pub fn child<'a>(node: NodeRef<'a>, index: usize) -> Option<NodeRef<'a>> {
    node.children()?.get(index).map(Node::as_ref)
}

/// Get the node at `path` below `root`.
///
/// # Errors
///
/// Returns [`EditorError::NotFound`] if an index is out of range or the
/// walk tries to descend into a text leaf.
pub fn get<'a>(root: NodeRef<'a>, path: &[usize]) -> Result<NodeRef<'a>, EditorError> {
    let mut node = root;
    for &index in path {
        node = child(node, index).ok_or_else(|| EditorError::NotFound { path: path.to_vec() })?;
    }
    Ok(node)
}

/// Check if a node exists at `path` below `root`.
pub fn has(root: NodeRef<'_>, path: &[usize]) -> bool {
    get(root, path).is_ok()
}

/// Get the parent of the node at `path`.
pub fn parent<'a>(root: NodeRef<'a>, path: &[usize]) -> Result<NodeRef<'a>, EditorError> {
    let parent_path = slate_path::parent(path)?;
    ancestor(root, &parent_path)
}

/// Get the node at `path`, which must be able to hold children.
pub fn ancestor<'a>(root: NodeRef<'a>, path: &[usize]) -> Result<NodeRef<'a>, EditorError> {
    match get(root, path)? {
        NodeRef::Text(_) => Err(EditorError::NotAncestor { path: path.to_vec() }),
        node => Ok(node),
    }
}

/// Get the text leaf at `path`.
pub fn leaf<'a>(root: NodeRef<'a>, path: &[usize]) -> Result<&'a Text, EditorError> {
    get(root, path)?
        .as_text()
        .ok_or_else(|| EditorError::NotText { path: path.to_vec() })
}

/// Get the first leaf-most descendant at or below `path`.
pub fn first<'a>(root: NodeRef<'a>, path: &[usize]) -> Result<(NodeRef<'a>, Path), EditorError> {
    descend(root, path, |children| (!children.is_empty()).then_some(0))
}

/// Get the last leaf-most descendant at or below `path`.
pub fn last<'a>(root: NodeRef<'a>, path: &[usize]) -> Result<(NodeRef<'a>, Path), EditorError> {
    descend(root, path, |children| children.len().checked_sub(1))
}

fn descend<'a>(
    root: NodeRef<'a>,
    path: &[usize],
    pick: impl Fn(&[Node]) -> Option<usize>,
) -> Result<(NodeRef<'a>, Path), EditorError> {
    let mut node = get(root, path)?;
    let mut p = path.to_vec();
    while let Some(children) = node.children() {
        let Some(index) = pick(children).filter(|&i| i < children.len()) else {
            break;
        };
        node = children[index].as_ref();
        p.push(index);
    }
    Ok((node, p))
}

/// Concatenate the text of every leaf below `node`.
pub fn string(node: NodeRef<'_>) -> String {
    match node {
        NodeRef::Text(t) => t.text.clone(),
        other => other
            .children()
            .unwrap_or_default()
            .iter()
            .map(|n| string(n.as_ref()))
            .collect(),
    }
}

/// Iterate over every text leaf below `root`, in document order.
pub fn texts<'a>(root: NodeRef<'a>) -> impl Iterator<Item = (&'a Text, Path)> + 'a {
    iter::nodes(root, NodesOptions::default())
        .filter_map(|(node, path)| Some((node.as_text()?, path)))
}

/// Iterate over every element below `root`, in document order.
pub fn elements<'a>(root: NodeRef<'a>) -> impl Iterator<Item = (&'a Element, Path)> + 'a {
    iter::nodes(root, NodesOptions::default())
        .filter_map(|(node, path)| Some((node.as_element()?, path)))
}

/// Iterate over every descendant of `root` (the root itself excluded).
pub fn descendants<'a>(root: NodeRef<'a>) -> impl Iterator<Item = (NodeRef<'a>, Path)> + 'a {
    iter::nodes(root, NodesOptions::default()).filter(|(_, path)| !path.is_empty())
}

/// Get every ancestor of the node at `path`, root first.
pub fn ancestors<'a>(
    root: NodeRef<'a>,
    path: &[usize],
) -> Result<Vec<(NodeRef<'a>, Path)>, EditorError> {
    slate_path::ancestors(path, false)
        .into_iter()
        .map(|p| Ok((ancestor(root, &p)?, p)))
        .collect()
}

// ── Mutable access (used while applying operations) ──────────────────────

/// Get the child list of the node at `path`, where `[]` is the root.
pub(crate) fn children_mut<'a>(
    root: &'a mut Vec<Node>,
    path: &[usize],
) -> Result<&'a mut Vec<Node>, EditorError> {
    let mut children = root;
    for (depth, &index) in path.iter().enumerate() {
        children = match children.get_mut(index) {
            Some(Node::Element(e)) => &mut e.children,
            Some(Node::Text(_)) => {
                return Err(EditorError::NotAncestor { path: path[..=depth].to_vec() });
            }
            None => return Err(EditorError::NotFound { path: path[..=depth].to_vec() }),
        };
    }
    Ok(children)
}

/// Get the descendant at a non-root `path`.
pub(crate) fn node_mut<'a>(
    root: &'a mut Vec<Node>,
    path: &[usize],
) -> Result<&'a mut Node, EditorError> {
    let (&index, parent_path) = path
        .split_last()
        .ok_or_else(|| EditorError::NotFound { path: Vec::new() })?;
    children_mut(root, parent_path)?
        .get_mut(index)
        .ok_or_else(|| EditorError::NotFound { path: path.to_vec() })
}
