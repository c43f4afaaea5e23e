//! Pre-order traversal over a document tree.
//!
//! [`nodes`] walks a tree depth-first, yielding each node before its
//! children. The walk can run in reverse, start at an arbitrary path, stop
//! after an arbitrary path, and skip the inside of subtrees for which the
//! `pass` predicate returns true (void elements stay atomic this way).
//!
//! The iterator keeps only the current path as state, so a walk can be
//! restarted anywhere by passing that path as `from`.

use slate_path::{is_after, is_ancestor, is_before, Path};

use super::{get, has, NodeRef};

/// Predicate deciding whether to skip the inside of a subtree.
pub type PassFn<'a> = Box<dyn Fn(NodeRef<'_>, &[usize]) -> bool + 'a>;

/// Options for [`nodes`].
#[derive(Default)]
pub struct NodesOptions<'a> {
    /// Path to start descending towards. Its ancestors are still yielded.
    /// A step past the end of its parent is clamped to the last child.
    pub from: Path,
    /// Stop once the walk moves past this path in walk order.
    pub to: Option<Path>,
    /// Walk right to left instead of left to right.
    pub reverse: bool,
    /// When it returns true for a node, its children are not visited.
    pub pass: Option<PassFn<'a>>,
}

impl<'a> NodesOptions<'a> {
    pub fn from(mut self, path: Path) -> Self {
        self.from = path;
        self
    }

    pub fn to(mut self, path: Path) -> Self {
        self.to = Some(path);
        self
    }

    pub fn reverse(mut self) -> Self {
        self.reverse = true;
        self
    }

    pub fn pass(mut self, pass: impl Fn(NodeRef<'_>, &[usize]) -> bool + 'a) -> Self {
        self.pass = Some(Box::new(pass));
        self
    }
}

impl std::fmt::Debug for NodesOptions<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodesOptions")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("reverse", &self.reverse)
            .field("pass", &self.pass.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    /// Not yielded yet.
    Fresh,
    /// Yielded, children not entered yet.
    Yielded,
    /// Re-entered from a child on the way back up.
    Visited,
}

/// Iterator returned by [`nodes`].
pub struct Nodes<'a> {
    root: NodeRef<'a>,
    path: Option<Path>,
    visit: Visit,
    options: NodesOptions<'a>,
}

/// Walk every node under `root` (the root included) in pre-order.
pub fn nodes<'a>(root: NodeRef<'a>, options: NodesOptions<'a>) -> Nodes<'a> {
    Nodes {
        root,
        path: Some(Vec::new()),
        visit: Visit::Fresh,
        options,
    }
}

impl<'a> Nodes<'a> {
    fn advance(&mut self, node: NodeRef<'a>) {
        let Some(mut path) = self.path.take() else {
            return;
        };
        let reverse = self.options.reverse;

        if self.visit == Visit::Yielded {
            let skip = self.options.pass.as_ref().is_some_and(|pass| pass(node, &path));
            if let Some(children) = node.children().filter(|c| !c.is_empty() && !skip) {
                let mut index = if reverse { children.len() - 1 } else { 0 };
                if is_ancestor(&path, &self.options.from) {
                    index = self.options.from[path.len()].min(children.len() - 1);
                }
                path.push(index);
                self.path = Some(path);
                self.visit = Visit::Fresh;
                return;
            }
        }

        let Some(&last) = path.last() else {
            // Back at the root with nowhere to go.
            return;
        };
        let depth = path.len() - 1;

        if !reverse {
            path[depth] = last + 1;
            if has(self.root, &path) {
                self.path = Some(path);
                self.visit = Visit::Fresh;
                return;
            }
        } else if last != 0 {
            path[depth] = last - 1;
            self.path = Some(path);
            self.visit = Visit::Fresh;
            return;
        }

        path.truncate(depth);
        self.path = Some(path);
        self.visit = Visit::Visited;
    }
}

impl<'a> Iterator for Nodes<'a> {
    type Item = (NodeRef<'a>, Path);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let path = self.path.as_ref()?;
            if let Some(to) = &self.options.to {
                let past = if self.options.reverse {
                    is_before(path, to)
                } else {
                    is_after(path, to)
                };
                if past {
                    self.path = None;
                    return None;
                }
            }
            let Ok(node) = get(self.root, path) else {
                self.path = None;
                return None;
            };
            if self.visit == Visit::Fresh {
                self.visit = Visit::Yielded;
                return Some((node, path.clone()));
            }
            self.advance(node);
        }
    }
}
