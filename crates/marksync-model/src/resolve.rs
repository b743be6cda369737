use crate::error::ModelError;
use crate::mark::MarkSet;
use crate::node::Node;

#[derive(Debug, Clone, Copy)]
struct PathStep<'a> {
    node: &'a Node,
    index: usize,
    /// Absolute position where the child at `index` starts
    offset: usize,
}

/// A position resolved against a document, with the chain of ancestors
/// leading to it.
///
/// Depth 0 is the node the position was resolved in (usually the document);
/// `depth()` is the innermost non-text node containing the position.
#[derive(Debug, Clone)]
pub struct ResolvedPos<'a> {
    pos: usize,
    path: Vec<PathStep<'a>>,
    parent_offset: usize,
}

impl<'a> ResolvedPos<'a> {
    pub fn resolve(doc: &'a Node, pos: usize) -> Result<Self, ModelError> {
        if pos > doc.content_size() {
            return Err(ModelError::PositionOutOfRange {
                pos,
                size: doc.content_size(),
            });
        }
        let mut path = Vec::new();
        let mut start = 0;
        let mut parent_offset = pos;
        let mut node = doc;
        loop {
            let (index, offset) = node.content().find_index(parent_offset)?;
            let rem = parent_offset - offset;
            path.push(PathStep {
                node,
                index,
                offset: start + offset,
            });
            if rem == 0 {
                break;
            }
            let child = node.child(index);
            if child.is_text() {
                break;
            }
            node = child;
            parent_offset = rem - 1;
            start += offset + 1;
        }
        Ok(Self {
            pos,
            path,
            parent_offset,
        })
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn depth(&self) -> usize {
        self.path.len() - 1
    }

    /// Offset of the position inside its parent's content
    pub fn parent_offset(&self) -> usize {
        self.parent_offset
    }

    /// The innermost non-text node containing the position
    pub fn parent(&self) -> &'a Node {
        self.node(self.depth())
    }

    /// Ancestor node at `depth`
    pub fn node(&self, depth: usize) -> &'a Node {
        self.path[depth].node
    }

    /// Index into the ancestor at `depth`
    pub fn index(&self, depth: usize) -> usize {
        self.path[depth].index
    }

    /// Index pointing after the position in the ancestor at `depth`
    pub fn index_after(&self, depth: usize) -> usize {
        self.index(depth) + usize::from(!(depth == self.depth() && self.text_offset() == 0))
    }

    /// Absolute position where the content of the ancestor at `depth` starts
    pub fn start(&self, depth: usize) -> usize {
        if depth == 0 {
            0
        } else {
            self.path[depth - 1].offset + 1
        }
    }

    /// Absolute position where the content of the ancestor at `depth` ends
    pub fn end(&self, depth: usize) -> usize {
        self.start(depth) + self.node(depth).content_size()
    }

    /// Absolute position right before the ancestor at `depth` (depth >= 1)
    pub fn before(&self, depth: usize) -> usize {
        debug_assert!(depth > 0, "there is no position before the root");
        self.path[depth - 1].offset
    }

    /// Absolute position right after the ancestor at `depth` (depth >= 1)
    pub fn after(&self, depth: usize) -> usize {
        self.before(depth) + self.node(depth).node_size()
    }

    /// Offset of the position into the text node it points into, or 0 when
    /// it sits between nodes
    pub fn text_offset(&self) -> usize {
        self.pos - self.path[self.depth()].offset
    }

    /// The node (or part of a text node) right after the position
    pub fn node_after(&self) -> Option<Node> {
        let parent = self.parent();
        let index = self.index(self.depth());
        let child = parent.maybe_child(index)?;
        let offset = self.text_offset();
        Some(if offset > 0 {
            child.cut(offset, child.node_size())
        } else {
            child.clone()
        })
    }

    /// The node (or part of a text node) right before the position
    pub fn node_before(&self) -> Option<Node> {
        let parent = self.parent();
        let index = self.index(self.depth());
        let offset = self.text_offset();
        if offset > 0 {
            return Some(parent.child(index).cut(0, offset));
        }
        if index == 0 {
            None
        } else {
            Some(parent.child(index - 1).clone())
        }
    }

    /// Marks that apply at this position: inside a text node its marks,
    /// otherwise the marks of the node before, falling back to the node after
    pub fn marks(&self) -> MarkSet {
        self.marks_preferring(false)
    }

    /// Like `marks`, but prefer the node after the position. Used to read
    /// the formatting of content that starts here (e.g. content about to be
    /// deleted).
    pub fn marks_after(&self) -> MarkSet {
        self.marks_preferring(true)
    }

    fn marks_preferring(&self, after: bool) -> MarkSet {
        let parent = self.parent();
        let index = self.index(self.depth());
        if parent.content_size() == 0 {
            return MarkSet::empty();
        }
        if self.text_offset() > 0 {
            return parent.child(index).marks().clone();
        }
        let before = index.checked_sub(1).and_then(|i| parent.maybe_child(i));
        let next = parent.maybe_child(index);
        let (main, other) = if after {
            (next, before)
        } else {
            (before, next)
        };
        main.or(other)
            .map(|node| node.marks().clone())
            .unwrap_or_default()
    }

    /// Depth of the deepest ancestor that also contains `pos`
    pub fn shared_depth(&self, pos: usize) -> usize {
        (1..=self.depth())
            .rev()
            .find(|&depth| self.start(depth) <= pos && self.end(depth) >= pos)
            .unwrap_or(0)
    }
}
