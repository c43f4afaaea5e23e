mod common;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::json;
use slate_core::{
    normalize_core, Editor, EditorError, EditorOptions, ElementTypes, NormalizeContext,
    NormalizeOptions, Operation, Path, Properties, Schema,
};

use common::docs::{block, bold, init_tracing, link, paragraph, text};

/// Records every path handed to it, then applies the built-in rules.
#[derive(Default, Clone)]
struct Recording {
    calls: Arc<Mutex<Vec<Path>>>,
}

impl Recording {
    fn calls(&self) -> Vec<Path> {
        self.calls.lock().unwrap().clone()
    }
}

impl Schema for Recording {
    fn normalize_node(
        &self,
        editor: &mut Editor,
        path: &[usize],
        _operation: Option<&Operation>,
    ) -> Result<(), EditorError> {
        self.calls.lock().unwrap().push(path.to_vec());
        normalize_core(editor, path)
    }
}

/// Touches every node it is asked about, so the drain never runs dry.
#[derive(Default)]
struct Restless {
    counter: AtomicU64,
}

impl Schema for Restless {
    fn normalize_node(
        &self,
        editor: &mut Editor,
        path: &[usize],
        _operation: Option<&Operation>,
    ) -> Result<(), EditorError> {
        if path.is_empty() {
            return Ok(());
        }
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        let mut new_properties = Properties::new();
        new_properties.insert("touched".into(), json!(n));
        editor.apply(Operation::SetNode {
            path: path.to_vec(),
            properties: Properties::new(),
            new_properties,
        })
    }
}

/// Never lets the drain run.
struct Paused;

impl Schema for Paused {
    fn should_normalize(&self, _ctx: &NormalizeContext<'_>) -> Result<bool, EditorError> {
        Ok(false)
    }
}

fn split_plain(path: &[usize], position: usize) -> Operation {
    Operation::SplitNode {
        path: path.to_vec(),
        position,
        properties: Properties::new(),
    }
}

#[test]
fn empty_elements_are_repaired_before_other_rules() {
    init_tracing();
    let schema = Recording::default();
    let mut editor = Editor::new(vec![paragraph("a")]).with_schema(schema.clone());
    editor
        .apply(Operation::InsertNode {
            path: vec![1],
            node: block(vec![]),
        })
        .unwrap();

    assert_eq!(editor.children(), &[paragraph("a"), paragraph("")]);
    // The empty element is visited first, then the drain pops the most
    // recently dirtied path each time.
    assert_eq!(schema.calls(), vec![vec![1], vec![1, 0], vec![1], vec![]]);
    assert!(editor.dirty_paths().is_empty());
}

#[test]
fn empty_root_stays_empty() {
    let mut editor = Editor::new(Vec::new());
    editor.normalize(NormalizeOptions::force()).unwrap();
    assert!(editor.children().is_empty());
    assert!(editor.operations().is_empty());
}

#[test]
fn runaway_schema_fails_with_divergence_and_poisons() {
    init_tracing();
    let mut editor = Editor::new(vec![paragraph("a")])
        .with_schema(Restless::default())
        .with_options(EditorOptions::default().with_iteration_factor(2));

    let err = editor
        .apply(Operation::InsertText {
            path: vec![0, 0],
            offset: 1,
            text: "b".into(),
        })
        .unwrap_err();
    // Three paths were dirty when the drain started.
    assert_eq!(err, EditorError::NormalizeDivergence { iterations: 6 });
    assert_eq!(
        err.to_string(),
        "could not completely normalize the editor after 6 iterations"
    );
    assert!(editor.is_poisoned());

    let again = editor.apply(Operation::InsertText {
        path: vec![0, 0],
        offset: 0,
        text: "c".into(),
    });
    assert_eq!(again, Err(EditorError::Poisoned));
    assert_eq!(editor.normalize(NormalizeOptions::force()), Err(EditorError::Poisoned));
}

#[test]
fn force_normalize_repairs_then_is_idempotent() {
    let mut editor = Editor::new(vec![block(vec![text("a"), text("b")]), block(vec![])]);
    editor.normalize(NormalizeOptions::force()).unwrap();
    assert_eq!(editor.children(), &[paragraph("ab"), paragraph("")]);
    let kinds: Vec<&str> = editor.operations().iter().map(Operation::kind).collect();
    assert_eq!(kinds, vec!["insert_node", "merge_node"]);

    editor.flush();
    editor.normalize(NormalizeOptions::force()).unwrap();
    assert!(editor.operations().is_empty());
    assert!(editor.flush().is_none());
}

#[test]
fn normalized_document_needs_no_operations() {
    let doc = vec![paragraph("one"), block(vec![text("x"), bold("y"), text("z")])];
    let mut editor = Editor::new(doc.clone());
    editor.normalize(NormalizeOptions::force()).unwrap();
    assert_eq!(editor.children(), doc.as_slice());
    assert!(editor.operations().is_empty());
}

#[test]
fn without_normalizing_defers_the_drain() {
    let mut editor = Editor::new(vec![paragraph("ab")]);
    editor
        .without_normalizing(|editor| {
            editor.apply(split_plain(&[0, 0], 1))?;
            // Two equal leaves side by side stay until the closure ends.
            assert_eq!(editor.children(), &[block(vec![text("a"), text("b")])]);
            assert!(editor.dirty_paths().contains(&[0, 1]));
            assert!(!editor.is_normalizing());
            Ok(())
        })
        .unwrap();
    assert!(editor.is_normalizing());
    assert_eq!(editor.children(), &[paragraph("ab")]);
    let kinds: Vec<&str> = editor.operations().iter().map(Operation::kind).collect();
    assert_eq!(kinds, vec!["split_node", "merge_node"]);
}

#[test]
fn inline_elements_get_surrounding_text() {
    let mut editor =
        Editor::new(vec![block(vec![link("x")])]).with_schema(ElementTypes::new().inline("link"));
    editor.normalize(NormalizeOptions::force()).unwrap();
    assert_eq!(editor.children(), &[block(vec![text(""), link("x"), text("")])]);
}

#[test]
fn mixed_children_keep_the_first_kind() {
    let mut editor = Editor::new(vec![block(vec![text("a"), paragraph("b")])]);
    editor.normalize(NormalizeOptions::force()).unwrap();
    assert_eq!(editor.children(), &[paragraph("a")]);

    // The root only holds blocks.
    let mut editor = Editor::new(vec![text("stray"), paragraph("a")]);
    editor.normalize(NormalizeOptions::force()).unwrap();
    assert_eq!(editor.children(), &[paragraph("a")]);
}

#[test]
fn empty_leaf_next_to_marked_leaf_is_removed() {
    let mut editor = Editor::new(vec![block(vec![text(""), bold("b")])]);
    editor.normalize(NormalizeOptions::force()).unwrap();
    assert_eq!(editor.children(), &[block(vec![bold("b")])]);
}

#[test]
fn schema_can_stop_the_drain() {
    let mut editor = Editor::new(vec![paragraph("ab")]).with_schema(Paused);
    editor.apply(split_plain(&[0, 0], 1)).unwrap();
    assert_eq!(editor.children(), &[block(vec![text("a"), text("b")])]);
    assert_eq!(editor.dirty_paths().len(), 4);
    assert!(!editor.is_poisoned());

    editor.clear_dirty_paths();
    assert!(editor.dirty_paths().is_empty());
}
