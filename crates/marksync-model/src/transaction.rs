use serde_json::Value;

use crate::error::ModelError;
use crate::map::{Assoc, Mapping, StepMap};
use crate::mark::{Attrs, Mark, MarkSet};
use crate::node::{Fragment, Node};
use crate::replace::Slice;
use crate::selection::Selection;
use crate::state::EditorState;
use crate::step::Step;

/// Flags describing how a transaction should be treated once applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionMeta {
    /// Record the transaction in undo history
    pub add_to_history: bool,
    /// Ask the view to scroll the selection into view
    pub scroll_into_view: bool,
    /// Produced by an append hook rather than by the user
    pub appended: bool,
}

impl Default for TransactionMeta {
    fn default() -> Self {
        Self {
            add_to_history: true,
            scroll_into_view: false,
            appended: false,
        }
    }
}

/// A batch of steps applied to a document, together with the selection and
/// stored marks they lead to.
///
/// The document before every step is kept so that positions from any stage
/// of the transaction can be resolved against the tree they refer to.
#[derive(Debug, Clone)]
pub struct Transaction {
    doc: Node,
    docs: Vec<Node>,
    steps: Vec<Step>,
    maps: Vec<StepMap>,
    selection: Selection,
    selection_set: bool,
    stored_marks: Option<MarkSet>,
    stored_marks_set: bool,
    meta: TransactionMeta,
}

impl Transaction {
    pub fn new(state: &EditorState) -> Self {
        Self {
            doc: state.doc().clone(),
            docs: Vec::new(),
            steps: Vec::new(),
            maps: Vec::new(),
            selection: state.selection(),
            selection_set: false,
            stored_marks: state.stored_marks().cloned(),
            stored_marks_set: false,
            meta: TransactionMeta::default(),
        }
    }

    /// Current document, after all steps so far
    pub fn doc(&self) -> &Node {
        &self.doc
    }

    /// Document the transaction started from
    pub fn before(&self) -> &Node {
        self.docs.first().unwrap_or(&self.doc)
    }

    /// Documents before each step
    pub fn docs(&self) -> &[Node] {
        &self.docs
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn maps(&self) -> &[StepMap] {
        &self.maps
    }

    pub fn mapping(&self) -> Mapping {
        Mapping::new(self.maps.clone())
    }

    pub fn doc_changed(&self) -> bool {
        !self.steps.is_empty()
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn selection_set(&self) -> bool {
        self.selection_set
    }

    pub fn stored_marks(&self) -> Option<&MarkSet> {
        self.stored_marks.as_ref()
    }

    pub fn stored_marks_set(&self) -> bool {
        self.stored_marks_set
    }

    pub fn meta(&self) -> TransactionMeta {
        self.meta
    }

    /// Apply a step. The selection is mapped through it and stored marks are
    /// dropped, since they only apply to the document they were set for.
    pub fn step(&mut self, step: Step) -> Result<&mut Self, ModelError> {
        let doc = step.apply(&self.doc)?;
        let map = step.map();
        self.selection = self.selection.map(&doc, &map);
        self.docs.push(std::mem::replace(&mut self.doc, doc));
        self.steps.push(step);
        self.maps.push(map);
        self.stored_marks = None;
        self.stored_marks_set = false;
        Ok(self)
    }

    /// Replace `from..to` with a slice. Does nothing when both are empty.
    pub fn replace(&mut self, from: usize, to: usize, slice: Slice) -> Result<&mut Self, ModelError> {
        if from == to && slice.is_empty() {
            return Ok(self);
        }
        self.step(Step::Replace { from, to, slice })
    }

    pub fn delete(&mut self, from: usize, to: usize) -> Result<&mut Self, ModelError> {
        self.replace(from, to, Slice::empty())
    }

    /// Delete the selected content, if any
    pub fn delete_selection(&mut self) -> Result<&mut Self, ModelError> {
        let selection = self.selection;
        if selection.is_empty() {
            return Ok(self);
        }
        self.delete(selection.from(), selection.to())
    }

    /// Replace the selection with a slice and collapse the cursor after it
    pub fn replace_selection(&mut self, slice: Slice) -> Result<&mut Self, ModelError> {
        let selection = self.selection;
        self.replace(selection.from(), selection.to(), slice)?;
        let end = self.mapping().map(selection.to(), Assoc::After);
        let cursor = Selection::near(&self.doc, end);
        self.set_selection(cursor);
        Ok(self)
    }

    /// Type `text` over the current selection. The text carries the stored
    /// marks when set, otherwise the marks at the insertion point.
    pub fn insert_text(&mut self, text: &str) -> Result<&mut Self, ModelError> {
        let selection = self.selection;
        if text.is_empty() {
            return self.delete_selection();
        }
        self.insert_text_at(text, selection.from(), selection.to())?;
        if !self.selection.is_empty() {
            let cursor = Selection::near(&self.doc, self.selection.to());
            self.set_selection(cursor);
        }
        Ok(self)
    }

    /// Insert `text` in place of `from..to`
    pub fn insert_text_at(
        &mut self,
        text: &str,
        from: usize,
        to: usize,
    ) -> Result<&mut Self, ModelError> {
        let marks = match &self.stored_marks {
            Some(marks) => marks.clone(),
            None => {
                let rpos = self.doc.resolve(from)?;
                if from == to {
                    rpos.marks()
                } else {
                    rpos.marks_after()
                }
            }
        };
        let slice = Slice::new(Fragment::from_node(Node::text(text, marks)), 0, 0);
        self.replace(from, to, slice)
    }

    /// Split the textblock around `pos`. The block after the split copies
    /// `type_after` (type and attributes) when given, otherwise the split
    /// block.
    pub fn split(&mut self, pos: usize, type_after: Option<&Node>) -> Result<&mut Self, ModelError> {
        let rpos = self.doc.resolve(pos)?;
        if rpos.depth() == 0 || !rpos.parent().is_textblock() {
            return Err(ModelError::CannotSplit(pos));
        }
        let parent = rpos.parent();
        let before = parent.copy(Fragment::empty());
        let after = type_after.unwrap_or(parent).copy(Fragment::empty());
        let content = Fragment::from_vec(vec![before, after]);
        self.step(Step::Replace {
            from: pos,
            to: pos,
            slice: Slice::new(content, 1, 1),
        })
    }

    /// Add `mark` to the inline content in `from..to` unless it is already
    /// there everywhere
    pub fn add_mark(&mut self, from: usize, to: usize, mark: Mark) -> Result<&mut Self, ModelError> {
        if from >= to || self.doc.range_has_mark(from, to, &mark) {
            return Ok(self);
        }
        self.step(Step::AddMark { from, to, mark })
    }

    /// Remove marks named `name` from `from..to`
    pub fn remove_mark(&mut self, from: usize, to: usize, name: &str) -> Result<&mut Self, ModelError> {
        if from >= to || !self.doc.range_has_mark_named(from, to, name) {
            return Ok(self);
        }
        self.step(Step::RemoveMark {
            from,
            to,
            name: name.to_string(),
        })
    }

    /// Replace all attributes of the node at `pos` without touching content
    pub fn set_node_attrs(&mut self, pos: usize, attrs: Attrs) -> Result<&mut Self, ModelError> {
        self.step(Step::SetAttrs { pos, attrs })
    }

    /// Set a single attribute of the node at `pos`. `Value::Null` unsets it.
    pub fn set_node_attr(
        &mut self,
        pos: usize,
        key: &str,
        value: Value,
    ) -> Result<&mut Self, ModelError> {
        let node = self
            .doc
            .node_at(pos)
            .filter(|node| !node.is_text())
            .ok_or(ModelError::NoNodeAt(pos))?;
        let mut attrs = node.attrs().clone();
        attrs.insert(key.to_string(), value);
        self.set_node_attrs(pos, attrs)
    }

    /// Replace the whole document content, e.g. to restore a history entry
    pub fn replace_content(&mut self, content: Fragment) -> Result<&mut Self, ModelError> {
        let size = self.doc.content_size();
        self.replace(0, size, Slice::new(content, 0, 0))
    }

    pub fn set_stored_marks(&mut self, marks: Option<MarkSet>) -> &mut Self {
        self.stored_marks = marks;
        self.stored_marks_set = true;
        self
    }

    /// Replace the selection. Stored marks are dropped, as after a step.
    pub fn set_selection(&mut self, selection: Selection) -> &mut Self {
        self.selection = selection;
        self.selection_set = true;
        self.stored_marks = None;
        self.stored_marks_set = false;
        self
    }

    pub fn scroll_into_view(&mut self) -> &mut Self {
        self.meta.scroll_into_view = true;
        self
    }

    pub fn set_add_to_history(&mut self, add: bool) -> &mut Self {
        self.meta.add_to_history = add;
        self
    }

    pub fn set_appended(&mut self, appended: bool) -> &mut Self {
        self.meta.appended = appended;
        self
    }
}
