use crate::map::{Assoc, StepMap};
use crate::node::Node;

/// A text selection between an anchor (where it started) and a head (where
/// it ends and the cursor is drawn). Both ends always sit inside textblocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    anchor: usize,
    head: usize,
}

impl Selection {
    /// Build a selection, snapping both ends into the nearest textblock
    pub fn text(doc: &Node, anchor: usize, head: usize) -> Self {
        Self {
            anchor: nearest_cursor(doc, anchor),
            head: nearest_cursor(doc, head),
        }
    }

    /// A collapsed selection at the valid cursor position nearest to `pos`
    pub fn near(doc: &Node, pos: usize) -> Self {
        let pos = nearest_cursor(doc, pos);
        Self {
            anchor: pos,
            head: pos,
        }
    }

    pub fn at_start(doc: &Node) -> Self {
        Self::near(doc, 0)
    }

    pub fn at_end(doc: &Node) -> Self {
        Self::near(doc, doc.content_size())
    }

    /// Everything from the start of the first textblock to the end of the last
    pub fn all(doc: &Node) -> Self {
        Self {
            anchor: nearest_cursor(doc, 0),
            head: nearest_cursor(doc, doc.content_size()),
        }
    }

    pub fn anchor(&self) -> usize {
        self.anchor
    }

    pub fn head(&self) -> usize {
        self.head
    }

    pub fn from(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn to(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    /// Map the selection through a step into the document the step produced
    pub fn map(&self, doc: &Node, map: &StepMap) -> Self {
        Self::text(
            doc,
            map.map(self.anchor, Assoc::After),
            map.map(self.head, Assoc::After),
        )
    }
}

/// Clamp `pos` into the content range of the closest textblock. On a tie the
/// later block wins, so a position between two blocks moves forward.
fn nearest_cursor(doc: &Node, pos: usize) -> usize {
    let pos = pos.min(doc.content_size());
    if doc
        .resolve(pos)
        .is_ok_and(|rpos| rpos.parent().is_textblock())
    {
        return pos;
    }
    let mut best: Option<(usize, usize)> = None;
    doc.descendants(|node, start, _| {
        if !node.is_textblock() {
            return true;
        }
        let from = start + 1;
        let candidate = pos.clamp(from, from + node.content_size());
        let distance = candidate.abs_diff(pos);
        if best.is_none_or(|(best_distance, _)| distance <= best_distance) {
            best = Some((distance, candidate));
        }
        false
    });
    best.map_or(pos, |(_, candidate)| candidate)
}
