use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use slate_core::codec::json::from_json;
use slate_core::{Affinity, Operation};

pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransformFixtures {
    #[serde(default)]
    pub path: Vec<PathCase>,
    #[serde(default)]
    pub point: Vec<PointCase>,
}

/// One `transform_path` expectation. A missing `expected` means the path
/// is dropped.
#[derive(Debug, Clone, Deserialize)]
pub struct PathCase {
    pub name: String,
    pub op: String,
    pub path: Vec<usize>,
    #[serde(default)]
    pub affinity: Option<String>,
    #[serde(default)]
    pub expected: Option<Vec<usize>>,
}

/// One `transform_point` expectation. A missing `expected_path` means the
/// point is dropped.
#[derive(Debug, Clone, Deserialize)]
pub struct PointCase {
    pub name: String,
    pub op: String,
    pub path: Vec<usize>,
    pub offset: usize,
    #[serde(default)]
    pub affinity: Option<String>,
    #[serde(default)]
    pub expected_path: Option<Vec<usize>>,
    #[serde(default)]
    pub expected_offset: Option<usize>,
}

pub fn load_transform_fixtures() -> TransformFixtures {
    let path = fixtures_dir().join("transform_cases.toml");
    let data =
        fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {:?}: {e}", path));
    toml::from_str(&data).unwrap_or_else(|e| panic!("failed to parse {:?}: {e}", path))
}

pub fn decode_op(name: &str, raw: &str) -> Operation {
    let value: Value =
        serde_json::from_str(raw).unwrap_or_else(|e| panic!("{name}: bad op json: {e}"));
    from_json(&value).unwrap_or_else(|e| panic!("{name}: cannot decode op: {e}"))
}

pub fn decode_affinity(name: &str, raw: Option<&str>) -> Option<Affinity> {
    match raw {
        None => None,
        Some("forward") => Some(Affinity::Forward),
        Some("backward") => Some(Affinity::Backward),
        Some(other) => panic!("{name}: unknown affinity {other:?}"),
    }
}
