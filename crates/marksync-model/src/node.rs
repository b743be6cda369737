use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ModelError;
use crate::mark::{Attrs, Mark, MarkSet};
use crate::replace::{self, Slice};
use crate::resolve::ResolvedPos;

/// Type name used for all text nodes
pub const TEXT_NODE: &str = "text";

/// Structural role of a node type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// The root document node
    Doc,
    /// A block holding other blocks (e.g. blockquote)
    Container,
    /// A block holding inline text (e.g. paragraph, heading)
    Textblock,
    /// An inline run of characters sharing one mark set
    Text,
}

/// A node in the document tree.
///
/// Nodes are treated as immutable values: every edit builds new nodes and
/// leaves the old tree intact, so older documents stay valid for history and
/// for position resolution inside transactions.
///
/// ## Positions
///
/// Positions are integer offsets counted in tokens: each character of text is
/// one token, and entering or leaving a non-text node is one token each. A
/// paragraph holding "ab" therefore has `node_size() == 4`, and the first
/// paragraph of a document starts its content at position 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    kind: NodeKind,
    type_name: String,
    attrs: Attrs,
    content: Fragment,
    text: String,
    marks: MarkSet,
    size: usize,
}

impl Node {
    /// Create an element node. Content is not validated here; see
    /// `Schema::node` for the checked constructor.
    pub fn element(
        kind: NodeKind,
        type_name: impl Into<String>,
        attrs: Attrs,
        content: Fragment,
    ) -> Self {
        let size = content.size() + 2;
        Self {
            kind,
            type_name: type_name.into(),
            attrs,
            content,
            text: String::new(),
            marks: MarkSet::empty(),
            size,
        }
    }

    /// Create a text node
    pub fn text(text: impl Into<String>, marks: MarkSet) -> Self {
        let text = text.into();
        let size = text.chars().count();
        Self {
            kind: NodeKind::Text,
            type_name: TEXT_NODE.to_string(),
            attrs: Attrs::new(),
            content: Fragment::empty(),
            text,
            marks,
            size,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    /// Look up an attribute, treating `null` as absent
    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attrs.get(key).filter(|value| !value.is_null())
    }

    pub fn content(&self) -> &Fragment {
        &self.content
    }

    pub fn marks(&self) -> &MarkSet {
        &self.marks
    }

    /// Text of a text node, `None` for elements
    pub fn text_str(&self) -> Option<&str> {
        self.is_text().then_some(self.text.as_str())
    }

    pub fn is_text(&self) -> bool {
        self.kind == NodeKind::Text
    }

    pub fn is_textblock(&self) -> bool {
        self.kind == NodeKind::Textblock
    }

    pub fn is_block(&self) -> bool {
        matches!(self.kind, NodeKind::Textblock | NodeKind::Container)
    }

    /// Size of the node in position tokens
    pub fn node_size(&self) -> usize {
        self.size
    }

    pub fn content_size(&self) -> usize {
        self.content.size()
    }

    pub fn child_count(&self) -> usize {
        self.content.child_count()
    }

    pub fn child(&self, index: usize) -> &Node {
        self.content.child(index)
    }

    pub fn maybe_child(&self, index: usize) -> Option<&Node> {
        self.content.maybe_child(index)
    }

    /// Concatenated text of all descendants
    pub fn text_content(&self) -> String {
        if self.is_text() {
            return self.text.clone();
        }
        self.content.iter().map(Node::text_content).collect()
    }

    /// Same type, attributes and marks
    pub fn same_markup(&self, other: &Node) -> bool {
        self.type_name == other.type_name && self.attrs == other.attrs && self.marks == other.marks
    }

    /// Copy of this node with different content
    pub fn copy(&self, content: Fragment) -> Node {
        let mut node = Node::element(self.kind, self.type_name.clone(), self.attrs.clone(), content);
        node.marks = self.marks.clone();
        node
    }

    /// Copy of this node with different attributes
    pub fn with_attrs(&self, attrs: Attrs) -> Node {
        let mut node = self.clone();
        node.attrs = attrs;
        node
    }

    /// Copy of this node with a different mark set
    pub fn with_marks(&self, marks: MarkSet) -> Node {
        let mut node = self.clone();
        node.marks = marks;
        node
    }

    /// Copy of a text node with different text
    pub fn with_text(&self, text: impl Into<String>) -> Node {
        Node::text(text, self.marks.clone())
    }

    /// Cut out the part of this node between two offsets. For text nodes
    /// the offsets count characters, otherwise they are content positions.
    pub fn cut(&self, from: usize, to: usize) -> Node {
        if self.is_text() {
            if from == 0 && to == self.size {
                return self.clone();
            }
            return self.with_text(char_slice(&self.text, from, to));
        }
        if from == 0 && to == self.content_size() {
            return self.clone();
        }
        self.copy(self.content.cut(from, to))
    }

    /// Resolve a position inside this node's content
    pub fn resolve(&self, pos: usize) -> Result<ResolvedPos<'_>, ModelError> {
        ResolvedPos::resolve(self, pos)
    }

    /// The node directly after `pos`, if `pos` sits right before one
    pub fn node_at(&self, pos: usize) -> Option<&Node> {
        let mut node = self;
        let mut pos = pos;
        loop {
            let (index, offset) = node.content.find_index(pos).ok()?;
            let child = node.maybe_child(index)?;
            if offset == pos || child.is_text() {
                return Some(child);
            }
            pos -= offset + 1;
            node = child;
        }
    }

    /// Cut the content between two positions into a slice
    pub fn slice(&self, from: usize, to: usize) -> Result<Slice, ModelError> {
        if from == to {
            return Ok(Slice::empty());
        }
        let rfrom = self.resolve(from)?;
        let rto = self.resolve(to)?;
        let depth = rfrom.shared_depth(to);
        let start = rfrom.start(depth);
        let node = rfrom.node(depth);
        let content = node.content.cut(from - start, to - start);
        Ok(Slice::new(content, rfrom.depth() - depth, rto.depth() - depth))
    }

    /// Replace the range `from..to` with a slice, returning the new tree
    pub fn replace(&self, from: usize, to: usize, slice: &Slice) -> Result<Node, ModelError> {
        let rfrom = self.resolve(from)?;
        let rto = self.resolve(to)?;
        replace::replace(&rfrom, &rto, slice)
    }

    /// Visit all descendants overlapping `from..to`. The callback receives
    /// the node, its absolute position, and its parent; returning `false`
    /// skips the node's children.
    pub fn nodes_between<F>(&self, from: usize, to: usize, mut f: F)
    where
        F: FnMut(&Node, usize, &Node) -> bool,
    {
        self.content.nodes_between(from, to, 0, self, &mut f);
    }

    /// Visit every descendant
    pub fn descendants<F>(&self, f: F)
    where
        F: FnMut(&Node, usize, &Node) -> bool,
    {
        self.nodes_between(0, self.content_size(), f);
    }

    /// True when every text node inside a textblock within `from..to`
    /// already carries `mark`
    pub fn range_has_mark(&self, from: usize, to: usize, mark: &Mark) -> bool {
        let mut all = true;
        let mut any_text = false;
        self.nodes_between(from, to, |node, _, parent| {
            if node.is_text() && parent.is_textblock() {
                any_text = true;
                all &= node.marks.contains(mark);
            }
            true
        });
        any_text && all
    }

    /// True when any text node within `from..to` carries a mark named `name`
    pub fn range_has_mark_named(&self, from: usize, to: usize, name: &str) -> bool {
        let mut found = false;
        self.nodes_between(from, to, |node, _, _| {
            found |= node.is_text() && node.marks.has_named(name);
            !found
        });
        found
    }
}

/// An ordered sequence of sibling nodes with a cached size
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fragment {
    nodes: Vec<Node>,
    size: usize,
}

impl Fragment {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a fragment, merging adjacent text nodes that share marks and
    /// dropping empty text nodes
    pub fn from_vec(nodes: Vec<Node>) -> Self {
        let mut merged: Vec<Node> = Vec::with_capacity(nodes.len());
        for node in nodes {
            if node.is_text() && node.text.is_empty() {
                continue;
            }
            if let Some(last) = merged.last_mut()
                && node.is_text()
                && last.is_text()
                && last.marks == node.marks
            {
                let joined = format!("{}{}", last.text, node.text);
                *last = last.with_text(joined);
                continue;
            }
            merged.push(node);
        }
        let size = merged.iter().map(Node::node_size).sum();
        Self {
            nodes: merged,
            size,
        }
    }

    pub fn from_node(node: Node) -> Self {
        Self::from_vec(vec![node])
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn child_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn child(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    pub fn maybe_child(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn first_child(&self) -> Option<&Node> {
        self.nodes.first()
    }

    pub fn last_child(&self) -> Option<&Node> {
        self.nodes.last()
    }

    /// Concatenate two fragments, joining text at the seam if possible
    pub fn append(&self, other: &Fragment) -> Fragment {
        let mut nodes = self.nodes.clone();
        nodes.extend(other.nodes.iter().cloned());
        Fragment::from_vec(nodes)
    }

    /// Fragment with the child at `index` replaced
    pub fn replace_child(&self, index: usize, node: Node) -> Fragment {
        let mut nodes = self.nodes.clone();
        nodes[index] = node;
        Fragment::from_vec(nodes)
    }

    /// Cut out the sub-fragment between two content positions
    pub fn cut(&self, from: usize, to: usize) -> Fragment {
        if from == 0 && to == self.size {
            return self.clone();
        }
        let mut result = Vec::new();
        if to > from {
            let mut pos = 0;
            for child in &self.nodes {
                if pos >= to {
                    break;
                }
                let end = pos + child.node_size();
                if end > from {
                    let piece = if pos < from || end > to {
                        if child.is_text() {
                            child.cut(from.saturating_sub(pos), child.node_size().min(to - pos))
                        } else {
                            child.cut(
                                from.saturating_sub(pos + 1),
                                child.content_size().min(to.saturating_sub(pos + 1)),
                            )
                        }
                    } else {
                        child.clone()
                    };
                    result.push(piece);
                }
                pos = end;
            }
        }
        Fragment::from_vec(result)
    }

    /// Find the child containing `pos`, returning its index and start offset.
    /// A position on a boundary between children maps to the later child.
    pub fn find_index(&self, pos: usize) -> Result<(usize, usize), ModelError> {
        if pos == 0 {
            return Ok((0, 0));
        }
        if pos == self.size {
            return Ok((self.nodes.len(), pos));
        }
        if pos > self.size {
            return Err(ModelError::PositionOutOfRange {
                pos,
                size: self.size,
            });
        }
        let mut cur = 0;
        for (index, child) in self.nodes.iter().enumerate() {
            let end = cur + child.node_size();
            if end >= pos {
                if end == pos {
                    return Ok((index + 1, end));
                }
                return Ok((index, cur));
            }
            cur = end;
        }
        Err(ModelError::PositionOutOfRange {
            pos,
            size: self.size,
        })
    }

    pub(crate) fn nodes_between(
        &self,
        from: usize,
        to: usize,
        node_start: usize,
        parent: &Node,
        f: &mut dyn FnMut(&Node, usize, &Node) -> bool,
    ) {
        let mut pos = 0;
        for child in &self.nodes {
            if pos >= to {
                break;
            }
            let end = pos + child.node_size();
            if end > from && f(child, node_start + pos, parent) && child.content_size() > 0 {
                let start = pos + 1;
                child.content.nodes_between(
                    from.saturating_sub(start),
                    child.content_size().min(to.saturating_sub(start)),
                    node_start + start,
                    child,
                    f,
                );
            }
            pos = end;
        }
    }
}

/// Slice a string by character offsets
pub(crate) fn char_slice(text: &str, from: usize, to: usize) -> String {
    text.chars().skip(from).take(to.saturating_sub(from)).collect()
}
