//! Codecs for documents and operations.
//!
//! Only the JSON form exists: nodes, points, ranges and operations as
//! `serde_json::Value`s in the interchange shape used by history and
//! transport layers.

pub mod json;
