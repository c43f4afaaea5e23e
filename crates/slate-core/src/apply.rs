//! Applying operations to a tree and its selection.
//!
//! [`apply_operation`] is the single mutation entry point under the editor.
//! Every precondition is checked before the tree is touched, so a failing
//! operation leaves both the tree and the selection as they were.

use std::cmp::Ordering;

use slate_path::{common, has_previous};

use crate::error::EditorError;
use crate::node::{children_mut, node_mut, texts, Element, Node, NodeRef, Properties, Text};
use crate::operation::{Operation, SelectionPatch};
use crate::point::{Affinity, Point};
use crate::range::{Edge, Range};
use crate::transform::{transform_path, transform_point};
use crate::utf16::{byte_index, utf16_len};

// ── Helpers ───────────────────────────────────────────────────────────────

/// Split a node path into its parent path and index, rejecting the root.
fn split_path<'p>(
    path: &'p [usize],
    kind: &'static str,
) -> Result<(&'p [usize], usize), EditorError> {
    let (&index, parent) = path.split_last().ok_or(EditorError::RootPath { kind })?;
    Ok((parent, index))
}

fn text_mut<'a>(children: &'a mut Vec<Node>, path: &[usize]) -> Result<&'a mut Text, EditorError> {
    match node_mut(children, path)? {
        Node::Text(t) => Ok(t),
        Node::Element(_) => Err(EditorError::NotText { path: path.to_vec() }),
    }
}

fn byte_offset(text: &str, path: &[usize], offset: usize) -> Result<usize, EditorError> {
    byte_index(text, offset).ok_or_else(|| EditorError::OffsetOutOfRange {
        path: path.to_vec(),
        offset,
    })
}

// ── Individual operation applicators ─────────────────────────────────────

fn apply_insert_node(
    children: &mut Vec<Node>,
    path: &[usize],
    node: &Node,
) -> Result<(), EditorError> {
    let (parent, index) = split_path(path, "insert_node")?;
    let siblings = children_mut(children, parent)?;
    if index > siblings.len() {
        return Err(EditorError::InsertPastEnd { path: path.to_vec() });
    }
    siblings.insert(index, node.clone());
    Ok(())
}

fn apply_remove_node(children: &mut Vec<Node>, path: &[usize]) -> Result<Node, EditorError> {
    let (parent, index) = split_path(path, "remove_node")?;
    let siblings = children_mut(children, parent)?;
    if index >= siblings.len() {
        return Err(EditorError::NotFound { path: path.to_vec() });
    }
    Ok(siblings.remove(index))
}

fn apply_insert_text(
    children: &mut Vec<Node>,
    path: &[usize],
    offset: usize,
    text: &str,
) -> Result<(), EditorError> {
    let leaf = text_mut(children, path)?;
    let at = byte_offset(&leaf.text, path, offset)?;
    leaf.text.insert_str(at, text);
    Ok(())
}

fn apply_remove_text(
    children: &mut Vec<Node>,
    path: &[usize],
    offset: usize,
    text: &str,
) -> Result<(), EditorError> {
    let leaf = text_mut(children, path)?;
    let start = byte_offset(&leaf.text, path, offset)?;
    let end = byte_offset(&leaf.text, path, offset + utf16_len(text))?;
    leaf.text.replace_range(start..end, "");
    Ok(())
}

fn apply_merge_node(children: &mut Vec<Node>, path: &[usize]) -> Result<(), EditorError> {
    let (parent, index) = split_path(path, "merge_node")?;
    let prev_index = slate_path::previous(path)?[parent.len()];
    let siblings = children_mut(children, parent)?;
    let kinds = (
        siblings.get(prev_index).map(Node::is_text),
        siblings.get(index).map(Node::is_text),
    );
    match kinds {
        (Some(prev), Some(this)) if prev == this => {}
        (Some(_), Some(_)) => return Err(EditorError::MergeMismatch { path: path.to_vec() }),
        _ => return Err(EditorError::NotFound { path: path.to_vec() }),
    }
    let node = siblings.remove(index);
    match (&mut siblings[prev_index], node) {
        (Node::Text(prev), Node::Text(t)) => prev.text.push_str(&t.text),
        (Node::Element(prev), Node::Element(e)) => prev.children.extend(e.children),
        _ => return Err(EditorError::MergeMismatch { path: path.to_vec() }),
    }
    Ok(())
}

fn apply_split_node(
    children: &mut Vec<Node>,
    path: &[usize],
    position: usize,
    properties: &Properties,
) -> Result<(), EditorError> {
    let (parent, index) = split_path(path, "split_node")?;
    let siblings = children_mut(children, parent)?;
    let node = siblings
        .get_mut(index)
        .ok_or_else(|| EditorError::NotFound { path: path.to_vec() })?;
    let out_of_range = || EditorError::OffsetOutOfRange {
        path: path.to_vec(),
        offset: position,
    };
    let right = match node {
        Node::Text(t) => {
            let at = byte_index(&t.text, position).ok_or_else(out_of_range)?;
            Node::Text(Text {
                text: t.text.split_off(at),
                properties: properties.clone(),
            })
        }
        Node::Element(e) => {
            if position > e.children.len() {
                return Err(out_of_range());
            }
            Node::Element(Element {
                children: e.children.split_off(position),
                properties: properties.clone(),
            })
        }
    };
    siblings.insert(index + 1, right);
    Ok(())
}

fn apply_move_node(
    children: &mut Vec<Node>,
    op: &Operation,
    path: &[usize],
    new_path: &[usize],
) -> Result<(), EditorError> {
    if slate_path::is_ancestor(path, new_path) {
        return Err(EditorError::MoveIntoSelf {
            path: path.to_vec(),
            new_path: new_path.to_vec(),
        });
    }
    split_path(new_path, "move_node")?;
    let (src_parent, src_index) = split_path(path, "move_node")?;
    // Where `new_path` points once the node has been taken out.
    let true_path = transform_path(path, op, Some(Affinity::Forward))
        .ok_or_else(|| EditorError::NotFound { path: path.to_vec() })?;
    let (dst_parent, dst_index) = split_path(&true_path, "move_node")?;

    let node = apply_remove_node(children, path)?;
    let err = match children_mut(children, dst_parent) {
        Ok(siblings) if dst_index <= siblings.len() => {
            siblings.insert(dst_index, node);
            return Ok(());
        }
        Ok(_) => EditorError::InsertPastEnd { path: new_path.to_vec() },
        Err(err) => err,
    };
    children_mut(children, src_parent)?.insert(src_index, node);
    Err(err)
}

fn apply_set_node(
    children: &mut Vec<Node>,
    path: &[usize],
    properties: &Properties,
    new_properties: &Properties,
) -> Result<(), EditorError> {
    split_path(path, "set_node")?;
    if let Some(key) = new_properties.keys().find(|k| *k == "children" || *k == "text") {
        return Err(EditorError::ForbiddenProperty(key.clone()));
    }
    let props = node_mut(children, path)?.properties_mut();
    for (key, value) in new_properties {
        if value.is_null() {
            props.remove(key);
        } else {
            props.insert(key.clone(), value.clone());
        }
    }
    for key in properties.keys() {
        if !new_properties.contains_key(key) {
            props.remove(key);
        }
    }
    Ok(())
}

fn patch_range(range: &mut Range, patch: &SelectionPatch) {
    if let Some(anchor) = &patch.anchor {
        range.anchor = anchor.clone();
    }
    if let Some(focus) = &patch.focus {
        range.focus = focus.clone();
    }
    for (key, value) in &patch.properties {
        if value.is_null() {
            range.properties.remove(key);
        } else {
            range.properties.insert(key.clone(), value.clone());
        }
    }
}

fn apply_set_selection(
    selection: &mut Option<Range>,
    patch: Option<&SelectionPatch>,
) -> Result<(), EditorError> {
    let Some(patch) = patch else {
        *selection = None;
        return Ok(());
    };
    let endpoint = patch
        .properties
        .iter()
        .find(|(k, _)| *k == "anchor" || *k == "focus");
    if let Some((key, value)) = endpoint {
        return Err(if value.is_null() {
            EditorError::SelectionEndpointRemoved(key.clone())
        } else {
            EditorError::InvalidOperation(format!(
                "the {key} point must be set through its own field"
            ))
        });
    }
    match selection {
        Some(range) => patch_range(range, patch),
        None => {
            let (Some(anchor), Some(focus)) = (&patch.anchor, &patch.focus) else {
                return Err(EditorError::IncompleteSelection);
            };
            let mut range = Range::new(anchor.clone(), focus.clone());
            patch_range(&mut range, patch);
            *selection = Some(range);
        }
    }
    Ok(())
}

// ── Selection maintenance ─────────────────────────────────────────────────

/// Find the text leaf nearest to a removed path in the updated tree.
///
/// The leaf before the removal point wins, unless the leaf after it sits
/// closer in the tree (a longer common prefix with the removed path) or
/// took the removed node's place as a first child.
fn nearest_text(children: &[Node], removed: &[usize]) -> Option<Point> {
    let mut prev = None;
    let mut next = None;
    for (text, path) in texts(NodeRef::Editor(children)) {
        if slate_path::compare(&path, removed) == Ordering::Less {
            prev = Some((text, path));
        } else {
            next = Some(path);
            break;
        }
    }
    let prefer_next = match (&prev, &next) {
        (Some((_, prev_path)), Some(next_path)) => {
            if next_path == removed {
                !has_previous(next_path)
            } else {
                common(prev_path, removed).len() < common(next_path, removed).len()
            }
        }
        _ => false,
    };
    match (prev, next) {
        (Some((text, path)), _) if !prefer_next => Some(Point::new(path, text.len())),
        (_, Some(path)) => Some(Point::new(path, 0)),
        _ => None,
    }
}

/// Rebase the selection through an applied operation.
///
/// An endpoint that no longer exists is moved to the nearest remaining
/// text leaf; with no leaf left the selection is cleared.
fn rebase_selection(children: &[Node], selection: &mut Option<Range>, op: &Operation) {
    let Some(range) = selection.as_mut() else {
        return;
    };
    let mut lost = false;
    for edge in [Edge::Anchor, Edge::Focus] {
        let point = range.point_mut(edge);
        let rebased = transform_point(point, op, Some(Affinity::Forward))
            .or_else(|| op.path().and_then(|removed| nearest_text(children, removed)));
        match rebased {
            Some(p) => *point = p,
            None => lost = true,
        }
    }
    if lost {
        *selection = None;
    }
}

// ── Public API ────────────────────────────────────────────────────────────

/// Apply one operation to a tree (given as the root's children) and its
/// selection.
///
/// Empty `insert_text` / `remove_text` operations are no-ops. On error
/// nothing has been modified.
///
/// # Example
///
/// ```
/// use slate_core::{apply_operation, Node, Operation};
///
/// let mut children = vec![Node::element(vec![Node::text("he")])];
/// let mut selection = None;
/// let op = Operation::InsertText { path: vec![0, 0], offset: 2, text: "llo".into() };
/// apply_operation(&mut children, &mut selection, &op).unwrap();
/// assert_eq!(children[0].children().unwrap()[0], Node::text("hello"));
/// ```
pub fn apply_operation(
    children: &mut Vec<Node>,
    selection: &mut Option<Range>,
    op: &Operation,
) -> Result<(), EditorError> {
    match op {
        Operation::InsertNode { path, node } => apply_insert_node(children, path, node)?,
        Operation::RemoveNode { path, .. } => {
            apply_remove_node(children, path)?;
        }
        Operation::InsertText { path, offset, text } => {
            if text.is_empty() {
                return Ok(());
            }
            apply_insert_text(children, path, *offset, text)?;
        }
        Operation::RemoveText { path, offset, text } => {
            if text.is_empty() {
                return Ok(());
            }
            apply_remove_text(children, path, *offset, text)?;
        }
        Operation::MergeNode { path, .. } => apply_merge_node(children, path)?,
        Operation::SplitNode {
            path,
            position,
            properties,
        } => apply_split_node(children, path, *position, properties)?,
        Operation::MoveNode { path, new_path } => apply_move_node(children, op, path, new_path)?,
        Operation::SetNode {
            path,
            properties,
            new_properties,
        } => apply_set_node(children, path, properties, new_properties)?,
        Operation::SetSelection { new_properties, .. } => {
            return apply_set_selection(selection, new_properties.as_ref());
        }
    }
    rebase_selection(children, selection, op);
    Ok(())
}
