//! JSON codec for nodes, points, ranges and operations.
//!
//! Nodes carry no type tag: an element is an object with a `children`
//! array, a text leaf is an object with a `text` string, and every other
//! key is a user property. Operations are objects with a `type` field
//! naming the kind plus exactly that kind's fields (`newPath` and
//! `newProperties` in camel case).
//!
//! ```
//! use serde_json::json;
//! use slate_core::codec::json::{from_json, to_json};
//!
//! let value = json!({"type": "insert_text", "path": [0, 0], "offset": 2, "text": "llo"});
//! let op = from_json(&value).unwrap();
//! assert_eq!(to_json(&op), value);
//! ```

use serde_json::{json, Map, Value};
use slate_path::{path_to_json, validate_path, Path};

use crate::error::EditorError;
use crate::node::{Element, Node, Properties, Text};
use crate::operation::{Operation, SelectionPatch};
use crate::point::Point;
use crate::range::Range;

// ── Helpers ───────────────────────────────────────────────────────────────

fn invalid_op(msg: impl Into<String>) -> EditorError {
    EditorError::InvalidOperation(msg.into())
}

fn as_object<'a>(v: &'a Value, what: &str) -> Result<&'a Map<String, Value>, EditorError> {
    v.as_object().ok_or_else(|| invalid_op(format!("{what} must be an object")))
}

fn field<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<&'a Value, EditorError> {
    obj.get(key).ok_or_else(|| invalid_op(format!("missing '{key}' field")))
}

fn decode_path(obj: &Map<String, Value>, key: &str) -> Result<Path, EditorError> {
    Ok(validate_path(field(obj, key)?)?)
}

fn decode_usize(obj: &Map<String, Value>, key: &str) -> Result<usize, EditorError> {
    field(obj, key)?
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| invalid_op(format!("'{key}' must be a non-negative integer")))
}

fn decode_string(obj: &Map<String, Value>, key: &str) -> Result<String, EditorError> {
    field(obj, key)?
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| invalid_op(format!("'{key}' must be a string")))
}

fn decode_properties(obj: &Map<String, Value>, key: &str) -> Result<Properties, EditorError> {
    Ok(as_object(field(obj, key)?, key)?.clone())
}

// ── Nodes ─────────────────────────────────────────────────────────────────

/// Serialize a node; user properties come first.
pub fn node_to_json(node: &Node) -> Value {
    match node {
        Node::Element(e) => {
            let mut m = e.properties.clone();
            m.insert("children".into(), nodes_to_json(&e.children));
            Value::Object(m)
        }
        Node::Text(t) => {
            let mut m = t.properties.clone();
            m.insert("text".into(), Value::String(t.text.clone()));
            Value::Object(m)
        }
    }
}

pub fn nodes_to_json(nodes: &[Node]) -> Value {
    Value::Array(nodes.iter().map(node_to_json).collect())
}

/// Deserialize a node, telling elements and leaves apart by their keys.
pub fn node_from_json(v: &Value) -> Result<Node, EditorError> {
    let obj = v
        .as_object()
        .ok_or_else(|| EditorError::InvalidNode("node must be an object".into()))?;
    let mut properties = obj.clone();
    let children = properties.remove("children");
    let text = properties.remove("text");
    match (children, text) {
        (Some(Value::Array(children)), None) => Ok(Node::Element(Element {
            children: children.iter().map(node_from_json).collect::<Result<_, _>>()?,
            properties,
        })),
        (None, Some(Value::String(text))) => Ok(Node::Text(Text { text, properties })),
        (Some(_), Some(_)) => Err(EditorError::InvalidNode(
            "node has both 'children' and 'text'".into(),
        )),
        (None, None) => Err(EditorError::InvalidNode("node needs 'children' or 'text'".into())),
        (Some(_), None) => Err(EditorError::InvalidNode("'children' must be an array".into())),
        (None, Some(_)) => Err(EditorError::InvalidNode("'text' must be a string".into())),
    }
}

pub fn nodes_from_json(v: &Value) -> Result<Vec<Node>, EditorError> {
    v.as_array()
        .ok_or_else(|| EditorError::InvalidNode("children must be an array".into()))?
        .iter()
        .map(node_from_json)
        .collect()
}

// ── Points and ranges ─────────────────────────────────────────────────────

pub fn point_to_json(point: &Point) -> Value {
    json!({ "path": path_to_json(&point.path), "offset": point.offset })
}

pub fn point_from_json(v: &Value) -> Result<Point, EditorError> {
    let obj = as_object(v, "point")?;
    Ok(Point::new(decode_path(obj, "path")?, decode_usize(obj, "offset")?))
}

pub fn range_to_json(range: &Range) -> Value {
    let mut m = Map::new();
    m.insert("anchor".into(), point_to_json(&range.anchor));
    m.insert("focus".into(), point_to_json(&range.focus));
    for (key, value) in &range.properties {
        m.insert(key.clone(), value.clone());
    }
    Value::Object(m)
}

pub fn range_from_json(v: &Value) -> Result<Range, EditorError> {
    let obj = as_object(v, "range")?;
    let mut properties = obj.clone();
    properties.remove("anchor");
    properties.remove("focus");
    Ok(Range {
        anchor: point_from_json(field(obj, "anchor")?)?,
        focus: point_from_json(field(obj, "focus")?)?,
        properties,
    })
}

fn selection_to_json(patch: &Option<SelectionPatch>) -> Value {
    let Some(patch) = patch else {
        return Value::Null;
    };
    let mut m = Map::new();
    if let Some(anchor) = &patch.anchor {
        m.insert("anchor".into(), point_to_json(anchor));
    }
    if let Some(focus) = &patch.focus {
        m.insert("focus".into(), point_to_json(focus));
    }
    for (key, value) in &patch.properties {
        m.insert(key.clone(), value.clone());
    }
    Value::Object(m)
}

/// A `null` endpoint is kept as a property so that applying the patch
/// reports it.
fn selection_from_json(v: &Value) -> Result<Option<SelectionPatch>, EditorError> {
    if v.is_null() {
        return Ok(None);
    }
    let mut patch = SelectionPatch::default();
    for (key, value) in as_object(v, "selection properties")? {
        match (key.as_str(), value) {
            ("anchor", Value::Null) | ("focus", Value::Null) => {
                patch.properties.insert(key.clone(), Value::Null);
            }
            ("anchor", point) => patch.anchor = Some(point_from_json(point)?),
            ("focus", point) => patch.focus = Some(point_from_json(point)?),
            _ => {
                patch.properties.insert(key.clone(), value.clone());
            }
        }
    }
    Ok(Some(patch))
}

// ── Operations ────────────────────────────────────────────────────────────

/// Serialize an operation.
pub fn to_json(op: &Operation) -> Value {
    match op {
        Operation::InsertNode { path, node } => json!({
            "type": "insert_node",
            "path": path_to_json(path),
            "node": node_to_json(node)
        }),
        Operation::RemoveNode { path, node } => json!({
            "type": "remove_node",
            "path": path_to_json(path),
            "node": node_to_json(node)
        }),
        Operation::InsertText { path, offset, text } => json!({
            "type": "insert_text",
            "path": path_to_json(path),
            "offset": offset,
            "text": text
        }),
        Operation::RemoveText { path, offset, text } => json!({
            "type": "remove_text",
            "path": path_to_json(path),
            "offset": offset,
            "text": text
        }),
        Operation::MergeNode {
            path,
            position,
            properties,
        } => json!({
            "type": "merge_node",
            "path": path_to_json(path),
            "position": position,
            "properties": properties
        }),
        Operation::SplitNode {
            path,
            position,
            properties,
        } => json!({
            "type": "split_node",
            "path": path_to_json(path),
            "position": position,
            "properties": properties
        }),
        Operation::MoveNode { path, new_path } => json!({
            "type": "move_node",
            "path": path_to_json(path),
            "newPath": path_to_json(new_path)
        }),
        Operation::SetNode {
            path,
            properties,
            new_properties,
        } => json!({
            "type": "set_node",
            "path": path_to_json(path),
            "properties": properties,
            "newProperties": new_properties
        }),
        Operation::SetSelection {
            properties,
            new_properties,
        } => json!({
            "type": "set_selection",
            "properties": selection_to_json(properties),
            "newProperties": selection_to_json(new_properties)
        }),
    }
}

/// Deserialize an operation.
pub fn from_json(v: &Value) -> Result<Operation, EditorError> {
    let obj = as_object(v, "operation")?;
    let kind = field(obj, "type")?
        .as_str()
        .ok_or_else(|| invalid_op("'type' must be a string"))?;
    let op = match kind {
        "insert_node" => Operation::InsertNode {
            path: decode_path(obj, "path")?,
            node: node_from_json(field(obj, "node")?)?,
        },
        "remove_node" => Operation::RemoveNode {
            path: decode_path(obj, "path")?,
            node: node_from_json(field(obj, "node")?)?,
        },
        "insert_text" => Operation::InsertText {
            path: decode_path(obj, "path")?,
            offset: decode_usize(obj, "offset")?,
            text: decode_string(obj, "text")?,
        },
        "remove_text" => Operation::RemoveText {
            path: decode_path(obj, "path")?,
            offset: decode_usize(obj, "offset")?,
            text: decode_string(obj, "text")?,
        },
        "merge_node" => Operation::MergeNode {
            path: decode_path(obj, "path")?,
            position: decode_usize(obj, "position")?,
            properties: decode_properties(obj, "properties")?,
        },
        "split_node" => Operation::SplitNode {
            path: decode_path(obj, "path")?,
            position: decode_usize(obj, "position")?,
            properties: decode_properties(obj, "properties")?,
        },
        "move_node" => Operation::MoveNode {
            path: decode_path(obj, "path")?,
            new_path: decode_path(obj, "newPath")?,
        },
        "set_node" => Operation::SetNode {
            path: decode_path(obj, "path")?,
            properties: decode_properties(obj, "properties")?,
            new_properties: decode_properties(obj, "newProperties")?,
        },
        "set_selection" => Operation::SetSelection {
            properties: selection_from_json(obj.get("properties").unwrap_or(&Value::Null))?,
            new_properties: selection_from_json(obj.get("newProperties").unwrap_or(&Value::Null))?,
        },
        other => return Err(invalid_op(format!("unknown operation type: {other}"))),
    };
    Ok(op)
}

/// Serialize a list of operations.
pub fn to_json_operations(ops: &[Operation]) -> Value {
    Value::Array(ops.iter().map(to_json).collect())
}

/// Deserialize a list of operations.
pub fn from_json_operations(v: &Value) -> Result<Vec<Operation>, EditorError> {
    v.as_array()
        .ok_or_else(|| invalid_op("operations must be an array"))?
        .iter()
        .map(from_json)
        .collect()
}
