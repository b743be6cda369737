//! Structural replacement of a range of a document with a slice.
//!
//! A [`Slice`] is a fragment that may be "open" on either side: an open
//! start of 1 means the first node of the slice is cut in the middle and its
//! content should be joined onto whatever sits before the replaced range.
//! Splitting a paragraph is expressed as replacing an empty range with two
//! empty paragraphs open on both sides.

use crate::error::ModelError;
use crate::node::{Fragment, Node, NodeKind};
use crate::resolve::ResolvedPos;

/// A piece of document content with open depths at each side
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Slice {
    content: Fragment,
    open_start: usize,
    open_end: usize,
}

impl Slice {
    pub fn new(content: Fragment, open_start: usize, open_end: usize) -> Self {
        Self {
            content,
            open_start,
            open_end,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn content(&self) -> &Fragment {
        &self.content
    }

    pub fn open_start(&self) -> usize {
        self.open_start
    }

    pub fn open_end(&self) -> usize {
        self.open_end
    }

    /// Number of position tokens the slice adds when inserted
    pub fn size(&self) -> usize {
        self.content
            .size()
            .saturating_sub(self.open_start + self.open_end)
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }
}

pub(crate) fn replace(
    from: &ResolvedPos<'_>,
    to: &ResolvedPos<'_>,
    slice: &Slice,
) -> Result<Node, ModelError> {
    if slice.open_start > from.depth() {
        return Err(ModelError::Replace(
            "Inserted content deeper than insertion position".to_string(),
        ));
    }
    if from.depth() + slice.open_end != to.depth() + slice.open_start {
        return Err(ModelError::Replace("Inconsistent open depths".to_string()));
    }
    replace_outer(from, to, slice, 0)
}

fn replace_outer(
    from: &ResolvedPos<'_>,
    to: &ResolvedPos<'_>,
    slice: &Slice,
    depth: usize,
) -> Result<Node, ModelError> {
    let index = from.index(depth);
    let node = from.node(depth);
    if index == to.index(depth) && depth < from.depth() - slice.open_start {
        let inner = replace_outer(from, to, slice, depth + 1)?;
        return Ok(node.copy(node.content().replace_child(index, inner)));
    }
    if slice.content.size() == 0 {
        return close(node, replace_two_way(from, to, depth)?);
    }
    if slice.open_start == 0 && slice.open_end == 0 && from.depth() == depth && to.depth() == depth
    {
        let parent = from.parent();
        let content = parent.content();
        let joined = content
            .cut(0, from.parent_offset())
            .append(&slice.content)
            .append(&content.cut(to.parent_offset(), content.size()));
        return close(parent, joined);
    }

    // Wrap the slice in copies of the ancestors it is open into, so both of
    // its ends can be resolved like positions in a document.
    let extra = from.depth() - slice.open_start;
    let mut wrapped = from.node(extra).copy(slice.content.clone());
    for d in (0..extra).rev() {
        wrapped = from.node(d).copy(Fragment::from_node(wrapped));
    }
    let start = wrapped.resolve(slice.open_start + extra)?;
    let end = wrapped.resolve(wrapped.content_size() - slice.open_end - extra)?;
    close(node, replace_three_way(from, &start, &end, to, depth)?)
}

fn check_join(main: &Node, sub: &Node) -> Result<(), ModelError> {
    let compatible =
        main.type_name() == sub.type_name() || (main.is_textblock() && sub.is_textblock());
    if compatible {
        Ok(())
    } else {
        Err(ModelError::Replace(format!(
            "Cannot join {} onto {}",
            sub.type_name(),
            main.type_name()
        )))
    }
}

fn joinable<'n>(
    before: &ResolvedPos<'n>,
    after: &ResolvedPos<'_>,
    depth: usize,
) -> Result<&'n Node, ModelError> {
    let node = before.node(depth);
    check_join(node, after.node(depth))?;
    Ok(node)
}

fn add_range(
    start: Option<&ResolvedPos<'_>>,
    end: Option<&ResolvedPos<'_>>,
    depth: usize,
    target: &mut Vec<Node>,
) {
    let node = match (start, end) {
        (_, Some(end)) => end.node(depth),
        (Some(start), None) => start.node(depth),
        (None, None) => return,
    };
    let mut start_index = 0;
    let end_index = end.map_or(node.child_count(), |end| end.index(depth));
    if let Some(start) = start {
        start_index = start.index(depth);
        if start.depth() > depth {
            start_index += 1;
        } else if start.text_offset() > 0 {
            target.extend(start.node_after());
            start_index += 1;
        }
    }
    for i in start_index..end_index {
        target.push(node.child(i).clone());
    }
    if let Some(end) = end
        && end.depth() == depth
        && end.text_offset() > 0
    {
        target.extend(end.node_before());
    }
}

/// Validate `content` for `node` and build the node around it
fn close(node: &Node, content: Fragment) -> Result<Node, ModelError> {
    check_content(node, &content)?;
    Ok(node.copy(content))
}

pub(crate) fn check_content(node: &Node, content: &Fragment) -> Result<(), ModelError> {
    let invalid = |reason: &str| ModelError::InvalidContent {
        node: node.type_name().to_string(),
        reason: reason.to_string(),
    };
    match node.kind() {
        NodeKind::Textblock => {
            if content.iter().any(|child| !child.is_text()) {
                return Err(invalid("only text is allowed"));
            }
        }
        NodeKind::Doc | NodeKind::Container => {
            if content.child_count() == 0 {
                return Err(invalid("at least one block is required"));
            }
            if content.iter().any(Node::is_text) {
                return Err(invalid("text must be wrapped in a textblock"));
            }
        }
        NodeKind::Text => return Err(invalid("text nodes have no content")),
    }
    Ok(())
}

fn replace_three_way(
    from: &ResolvedPos<'_>,
    start: &ResolvedPos<'_>,
    end: &ResolvedPos<'_>,
    to: &ResolvedPos<'_>,
    depth: usize,
) -> Result<Fragment, ModelError> {
    let open_start = if from.depth() > depth {
        Some(joinable(from, start, depth + 1)?)
    } else {
        None
    };
    let open_end = if to.depth() > depth {
        Some(joinable(end, to, depth + 1)?)
    } else {
        None
    };

    let mut content = Vec::new();
    add_range(None, Some(from), depth, &mut content);
    match (open_start, open_end) {
        (Some(open_start), Some(open_end)) if start.index(depth) == end.index(depth) => {
            check_join(open_start, open_end)?;
            let inner = replace_three_way(from, start, end, to, depth + 1)?;
            content.push(close(open_start, inner)?);
        }
        (open_start, open_end) => {
            if let Some(open_start) = open_start {
                content.push(close(open_start, replace_two_way(from, start, depth + 1)?)?);
            }
            add_range(Some(start), Some(end), depth, &mut content);
            if let Some(open_end) = open_end {
                content.push(close(open_end, replace_two_way(end, to, depth + 1)?)?);
            }
        }
    }
    add_range(Some(to), None, depth, &mut content);
    Ok(Fragment::from_vec(content))
}

fn replace_two_way(
    from: &ResolvedPos<'_>,
    to: &ResolvedPos<'_>,
    depth: usize,
) -> Result<Fragment, ModelError> {
    let mut content = Vec::new();
    add_range(None, Some(from), depth, &mut content);
    if from.depth() > depth {
        let node = joinable(from, to, depth + 1)?;
        content.push(close(node, replace_two_way(from, to, depth + 1)?)?);
    }
    add_range(Some(to), None, depth, &mut content);
    Ok(Fragment::from_vec(content))
}
