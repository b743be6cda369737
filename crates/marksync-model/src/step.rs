use crate::error::ModelError;
use crate::map::{MapRange, StepMap};
use crate::mark::{Attrs, Mark, MarkSet};
use crate::node::{Fragment, Node};
use crate::replace::Slice;

/// An atomic document change
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Replace `from..to` with a slice
    Replace { from: usize, to: usize, slice: Slice },
    /// Add a mark to all inline content in `from..to`, replacing marks of the
    /// same name
    AddMark { from: usize, to: usize, mark: Mark },
    /// Remove marks called `name` from inline content in `from..to`
    RemoveMark { from: usize, to: usize, name: String },
    /// Replace the attributes of the node starting at `pos`, leaving its
    /// content untouched
    SetAttrs { pos: usize, attrs: Attrs },
}

impl Step {
    /// Apply the step, producing the new document
    pub fn apply(&self, doc: &Node) -> Result<Node, ModelError> {
        match self {
            Step::Replace { from, to, slice } => doc.replace(*from, *to, slice),
            Step::AddMark { from, to, mark } => {
                map_inline(doc, *from, *to, |marks| marks.add(mark.clone()))
            }
            Step::RemoveMark { from, to, name } => {
                map_inline(doc, *from, *to, |marks| marks.remove(name))
            }
            Step::SetAttrs { pos, attrs } => {
                let node = doc
                    .node_at(*pos)
                    .filter(|node| !node.is_text())
                    .ok_or(ModelError::NoNodeAt(*pos))?;
                let updated = node.with_attrs(attrs.clone()).copy(Fragment::empty());
                doc.replace(*pos, *pos + 1, &Slice::new(Fragment::from_node(updated), 0, 1))
            }
        }
    }

    /// How the step moves positions. Mark and attribute steps keep every
    /// position in place.
    pub fn map(&self) -> StepMap {
        match self {
            Step::Replace { from, to, slice } => StepMap::new(vec![MapRange {
                start: *from,
                old_size: to - from,
                new_size: slice.size(),
            }]),
            Step::AddMark { .. } | Step::RemoveMark { .. } | Step::SetAttrs { .. } => {
                StepMap::identity()
            }
        }
    }

    /// The inserted slice of a replace step
    pub fn slice(&self) -> Option<&Slice> {
        match self {
            Step::Replace { slice, .. } => Some(slice),
            _ => None,
        }
    }
}

fn map_inline<F>(doc: &Node, from: usize, to: usize, f: F) -> Result<Node, ModelError>
where
    F: Fn(&MarkSet) -> MarkSet,
{
    let old = doc.slice(from, to)?;
    let rfrom = doc.resolve(from)?;
    let parent = rfrom.node(rfrom.shared_depth(to));
    let content = map_fragment(old.content(), parent, &f);
    doc.replace(
        from,
        to,
        &Slice::new(content, old.open_start(), old.open_end()),
    )
}

fn map_fragment(fragment: &Fragment, parent: &Node, f: &dyn Fn(&MarkSet) -> MarkSet) -> Fragment {
    Fragment::from_vec(
        fragment
            .iter()
            .map(|child| {
                let child = if child.content_size() > 0 {
                    child.copy(map_fragment(child.content(), child, f))
                } else {
                    child.clone()
                };
                if child.is_text() && parent.is_textblock() {
                    child.with_marks(f(child.marks()))
                } else {
                    child
                }
            })
            .collect(),
    )
}
