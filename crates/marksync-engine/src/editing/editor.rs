use std::sync::Arc;

use log::{debug, trace};
use marksync_model::{EditorState, MarkSet, Node, Schema, Selection, Transaction};
use serde_json::Value;

use super::commands::{Cmd, compile_command};
use super::format::{self, TextFormat};
use super::history::{History, HistoryEntry};
use crate::config::EditorConfig;
use crate::error::EngineError;
use crate::schema::font_size_mark;
use crate::sync::emptiness::is_empty_textblock;
use crate::sync::marks::remembered_marks;
use crate::sync::preserve::PreserveMarks;

/// An editor snapshot: document state, undo history and a revision number.
///
/// Snapshots are immutable. Every operation that changes something returns
/// a new snapshot with `revision + 1`; operations that turn out to be no-ops
/// return an identical snapshot, revision included, so a view can skip the
/// re-render with [`TextEditor::is_newer_than`].
///
/// ```rust
/// # use std::sync::Arc;
/// # use marksync_engine::{Cmd, EditorConfig, TextEditor, TextFormat, editor_schema};
/// let schema = Arc::new(editor_schema().unwrap());
/// let editor = TextEditor::empty(schema, EditorConfig::default()).unwrap();
///
/// let editor = editor.set_format(TextFormat { font_size: 18 }).unwrap();
/// let editor = editor
///     .execute(&Cmd::InsertText { text: "A".to_string() })
///     .unwrap();
///
/// assert_eq!(editor.get_format().unwrap().font_size, 18);
/// assert_eq!(editor.revision(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct TextEditor {
    schema: Arc<Schema>,
    config: EditorConfig,
    state: EditorState,
    history: History,
    revision: u64,
}

impl TextEditor {
    /// Start a session on `doc` with the cursor at its start.
    ///
    /// The stored marks are seeded so the first typed character is
    /// formatted: from the remembered marks of an empty block under the
    /// cursor, or with the default font size when the document has no text.
    pub fn create(
        schema: Arc<Schema>,
        config: EditorConfig,
        doc: Node,
    ) -> Result<Self, EngineError> {
        let state = EditorState::create(doc, None);
        let rpos = state.doc().resolve(state.selection().head())?;
        let remembered = is_empty_textblock(&rpos)
            .then(|| remembered_marks(&schema, rpos.parent()))
            .flatten()
            .filter(|marks| !marks.is_empty());
        let stored = match remembered {
            Some(marks) => Some(marks),
            None if state.doc().text_content().is_empty() => Some(MarkSet::from_marks([
                font_size_mark(&schema, config.default_font_size)?,
            ])),
            None => None,
        };
        let state = state.with_stored_marks(stored);

        Ok(Self {
            history: History::new(config.history_depth),
            schema,
            config,
            state,
            revision: 0,
        })
    }

    /// A session on a document holding one empty paragraph
    pub fn empty(schema: Arc<Schema>, config: EditorConfig) -> Result<Self, EngineError> {
        let doc = schema.empty_doc();
        Self::create(schema, config, doc)
    }

    /// A session on a document serialized as JSON
    pub fn from_json(schema: Arc<Schema>, config: EditorConfig, json: &str) -> anyhow::Result<Self> {
        let doc = schema.node_from_str(json)?;
        Ok(Self::create(schema, config, doc)?)
    }

    /// Apply a transaction built on [`TextEditor::state`], running the
    /// remembered-marks append pass.
    pub fn apply_transaction(&self, tr: Transaction) -> Result<Self, EngineError> {
        let meta = tr.meta();
        let record = tr.doc_changed() && meta.add_to_history && !meta.appended;
        let before = HistoryEntry {
            doc: self.state.doc().clone(),
            selection: self.state.selection(),
        };

        let hook = PreserveMarks::new(self.schema.clone());
        let applied = self.state.apply_transaction(tr, &[&hook])?;
        trace!(
            "revision {} applied with {} appended transaction(s)",
            self.revision + 1,
            applied.transactions.len() - 1
        );

        let mut history = self.history.clone();
        if record {
            history.record(before);
        }
        Ok(Self {
            schema: self.schema.clone(),
            config: self.config.clone(),
            state: applied.state,
            history,
            revision: self.revision + 1,
        })
    }

    /// Run an editing command. A command that does not apply leaves the
    /// snapshot unchanged.
    pub fn execute(&self, cmd: &Cmd) -> Result<Self, EngineError> {
        match compile_command(&self.schema, &self.state, cmd)? {
            Some(tr) => self.apply_transaction(tr),
            None => {
                debug!("command {cmd:?} does not apply");
                Ok(self.clone())
            }
        }
    }

    pub fn get_format(&self) -> Result<TextFormat, EngineError> {
        format::get_format(&self.schema, &self.state, self.config.default_font_size)
    }

    pub fn format_for_range(&self, from: usize, to: usize) -> Result<Option<TextFormat>, EngineError> {
        format::format_for_range(
            &self.schema,
            &self.state,
            from,
            to,
            self.config.default_font_size,
        )
    }

    /// Apply `format` to the selection. Same snapshot when nothing changes.
    pub fn set_format(&self, format: TextFormat) -> Result<Self, EngineError> {
        match format::set_format(
            &self.schema,
            &self.state,
            format,
            self.config.default_font_size,
        )? {
            Some(tr) => self.apply_transaction(tr),
            None => Ok(self.clone()),
        }
    }

    pub fn undo(&self) -> Result<Self, EngineError> {
        let mut history = self.history.clone();
        match history.pop_undo(self.current_entry()) {
            Some(entry) => self.restore(&entry, history),
            None => Ok(self.clone()),
        }
    }

    pub fn redo(&self) -> Result<Self, EngineError> {
        let mut history = self.history.clone();
        match history.pop_redo(self.current_entry()) {
            Some(entry) => self.restore(&entry, history),
            None => Ok(self.clone()),
        }
    }

    fn current_entry(&self) -> HistoryEntry {
        HistoryEntry {
            doc: self.state.doc().clone(),
            selection: self.state.selection(),
        }
    }

    /// Bring back a recorded document in one history-exempt transaction
    fn restore(&self, entry: &HistoryEntry, history: History) -> Result<Self, EngineError> {
        let mut tr = self.state.tr();
        tr.replace_content(entry.doc.content().clone())?;
        tr.set_selection(Selection::text(tr.doc(), entry.selection.anchor(), entry.selection.head()));
        tr.set_add_to_history(false);
        let mut next = self.apply_transaction(tr)?;
        next.history = history;
        Ok(next)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// True when this snapshot should replace `other` in a view
    pub fn is_newer_than(&self, other: &TextEditor) -> bool {
        self.revision > other.revision
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn doc(&self) -> &Node {
        self.state.doc()
    }

    pub fn selection(&self) -> Selection {
        self.state.selection()
    }

    pub fn stored_marks(&self) -> Option<&MarkSet> {
        self.state.stored_marks()
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Sizes to offer in a font-size picker
    pub fn font_sizes(&self) -> &[u32] {
        &self.config.font_sizes
    }

    pub fn to_json(&self) -> Result<Value, EngineError> {
        Ok(self.state.doc().to_json_value()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{editor_schema, font_size_of};
    use pretty_assertions::assert_eq;

    fn editor() -> TextEditor {
        TextEditor::empty(Arc::new(editor_schema().unwrap()), EditorConfig::default()).unwrap()
    }

    fn insert(editor: &TextEditor, text: &str) -> TextEditor {
        editor
            .execute(&Cmd::InsertText {
                text: text.to_string(),
            })
            .unwrap()
    }

    #[test]
    fn test_empty_document_seeds_default_size() {
        let editor = editor();

        assert_eq!(editor.revision(), 0);
        assert_eq!(editor.stored_marks().and_then(font_size_of), Some(14));
        assert_eq!(editor.get_format().unwrap(), TextFormat { font_size: 14 });
    }

    #[test]
    fn test_document_with_text_seeds_nothing() {
        let schema = Arc::new(editor_schema().unwrap());
        let json = r#"{"type":"doc","content":[{"type":"paragraph","content":[{"type":"text","text":"hi"}]}]}"#;

        let editor = TextEditor::from_json(schema, EditorConfig::default(), json).unwrap();

        assert_eq!(editor.stored_marks(), None);
        assert_eq!(editor.selection().head(), 1);
    }

    #[test]
    fn test_revision_counts_applied_transactions() {
        let first = editor();
        let second = insert(&first, "a");
        let third = insert(&second, "b");

        assert_eq!(third.revision(), 2);
        assert!(third.is_newer_than(&second));
        assert!(!first.is_newer_than(&second));
        assert_eq!(third.doc().text_content(), "ab");
    }

    #[test]
    fn test_inapplicable_command_keeps_revision() {
        let editor = editor();

        let next = editor.execute(&Cmd::DeleteBackward).unwrap();

        assert_eq!(next.revision(), editor.revision());
        assert!(!next.is_newer_than(&editor));
    }

    #[test]
    fn test_undo_redo() {
        let editor = insert(&insert(&editor(), "a"), "b");

        let undone = editor.undo().unwrap();
        assert_eq!(undone.doc().text_content(), "a");
        assert_eq!(undone.selection().head(), 2);
        assert!(undone.can_redo());

        let redone = undone.redo().unwrap();
        assert_eq!(redone.doc().text_content(), "ab");
        assert!(!redone.can_redo());
        assert!(redone.revision() > undone.revision());
    }

    #[test]
    fn test_undo_without_history_is_noop() {
        let editor = editor();

        let next = editor.undo().unwrap();

        assert_eq!(next.revision(), 0);
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_selection_changes_are_not_recorded() {
        let editor = insert(&editor(), "ab");

        let moved = editor.execute(&Cmd::Select { anchor: 1, head: 1 }).unwrap();

        assert!(moved.can_undo());
        assert_eq!(moved.undo().unwrap().doc().text_content(), "");
    }
}
