use slate_core::{Element, Node, Point, Range, Text};
use tracing_subscriber::EnvFilter;

/// Route editor logs to the test writer; set `RUST_LOG=slate_core=trace`
/// to see every drain step.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn text(s: &str) -> Node {
    Node::text(s)
}

pub fn bold(s: &str) -> Node {
    Node::Text(Text::new(s).with_property("bold", true))
}

pub fn paragraph(s: &str) -> Node {
    Node::element(vec![Node::text(s)])
}

pub fn block(children: Vec<Node>) -> Node {
    Node::element(children)
}

pub fn typed(kind: &str, children: Vec<Node>) -> Node {
    Node::Element(Element::new(children).with_property("type", kind))
}

pub fn link(s: &str) -> Node {
    typed("link", vec![Node::text(s)])
}

pub fn point(path: &[usize], offset: usize) -> Point {
    Point::new(path.to_vec(), offset)
}

pub fn caret(path: &[usize], offset: usize) -> Range {
    Range::collapsed(point(path, offset))
}

pub fn range(anchor: (&[usize], usize), focus: (&[usize], usize)) -> Range {
    Range::new(point(anchor.0, anchor.1), point(focus.0, focus.1))
}

/// Two paragraphs and a quote holding two more:
///
/// ```text
/// [0]     "one"
/// [1]     "two"
/// [2]     quote
/// [2,0]     "three"
/// [2,1]     "four"
/// ```
pub fn sample_document() -> Vec<Node> {
    vec![
        paragraph("one"),
        paragraph("two"),
        typed("quote", vec![paragraph("three"), paragraph("four")]),
    ]
}
