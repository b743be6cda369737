use log::debug;
use marksync_model::{EditorState, Schema, Transaction};
use serde_json::Value;

use crate::error::EngineError;
use crate::schema::REMEMBERED_MARKS;
use crate::sync::marks::flatten;

/// Split the textblock at the selection (Enter), carrying the active marks
/// into the new block.
///
/// The marks are the stored marks, or the marks before the cursor unless it
/// sits at the very start of its block. Splitting inside content leaves
/// them as stored marks for the text that follows; splitting at the end
/// creates an empty block, which remembers them in its attribute instead.
///
/// Returns `None` when the selection is not inside a textblock.
pub fn split_paragraph(
    schema: &Schema,
    state: &EditorState,
) -> Result<Option<Transaction>, EngineError> {
    let selection = state.selection();
    let doc = state.doc();
    let from = doc.resolve(selection.from())?;
    let to = doc.resolve(selection.to())?;
    if !from.parent().is_textblock() || !to.parent().is_textblock() {
        return Ok(None);
    }

    let at_end = to.parent_offset() == to.parent().content_size();
    let marks = match state.stored_marks() {
        Some(marks) => marks.clone(),
        None if to.parent_offset() > 0 => from.marks(),
        None => Default::default(),
    };

    let mut tr = state.tr();
    if !selection.is_empty() {
        tr.delete_selection()?;
    }
    let pos = tr.selection().from();
    let type_after = at_end.then(|| schema.empty_textblock());
    tr.split(pos, type_after.as_ref())?;

    if !marks.is_empty() {
        if at_end {
            debug!("seeding new block at {} with {} mark(s)", pos + 1, marks.len());
            tr.set_node_attr(pos + 1, REMEMBERED_MARKS, Value::Object(flatten(&marks)))?;
        } else {
            tr.set_stored_marks(Some(marks));
        }
    }
    tr.scroll_into_view();
    Ok(Some(tr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{editor_schema, font_size_mark, font_size_of};
    use crate::sync::marks::remembered_marks;
    use marksync_model::{Attrs, Fragment, MarkSet, Node, Selection};
    use pretty_assertions::assert_eq;

    fn doc(schema: &Schema, text: &str, marks: MarkSet) -> Node {
        let content = if text.is_empty() {
            Fragment::empty()
        } else {
            Fragment::from_node(schema.text(text, marks))
        };
        let paragraph = schema.node("paragraph", Attrs::new(), content).unwrap();
        schema
            .node("doc", Attrs::new(), Fragment::from_node(paragraph))
            .unwrap()
    }

    fn size(schema: &Schema, value: u32) -> MarkSet {
        MarkSet::from_marks([font_size_mark(schema, value).unwrap()])
    }

    #[test]
    fn test_split_at_end_seeds_new_block() {
        let schema = editor_schema().unwrap();
        let d = doc(&schema, "ab", size(&schema, 18));
        let state = EditorState::create(d.clone(), Some(Selection::near(&d, 3)));

        let tr = split_paragraph(&schema, &state).unwrap().unwrap();

        assert_eq!(tr.doc().child_count(), 2);
        assert_eq!(remembered_marks(&schema, tr.doc().child(0)), None);
        assert_eq!(
            remembered_marks(&schema, tr.doc().child(1)),
            Some(size(&schema, 18))
        );
        assert_eq!(tr.selection().head(), 5);
        assert!(tr.meta().scroll_into_view);
    }

    #[test]
    fn test_split_inside_content_stores_marks() {
        let schema = editor_schema().unwrap();
        let d = doc(&schema, "ab", MarkSet::empty());
        let state = EditorState::create(d.clone(), Some(Selection::near(&d, 2)))
            .with_stored_marks(Some(size(&schema, 24)));

        let tr = split_paragraph(&schema, &state).unwrap().unwrap();

        assert_eq!(tr.doc().child(1).text_content(), "b");
        assert_eq!(remembered_marks(&schema, tr.doc().child(1)), None);
        assert_eq!(tr.stored_marks().and_then(font_size_of), Some(24));
    }

    #[test]
    fn test_split_at_block_start_carries_nothing() {
        let schema = editor_schema().unwrap();
        let d = doc(&schema, "ab", size(&schema, 18));
        let state = EditorState::create(d.clone(), Some(Selection::near(&d, 1)));

        let tr = split_paragraph(&schema, &state).unwrap().unwrap();

        assert_eq!(tr.doc().child(0).content_size(), 0);
        assert_eq!(tr.doc().child(1).text_content(), "ab");
        assert_eq!(tr.stored_marks(), None);
    }

    #[test]
    fn test_split_empty_block_keeps_its_marks() {
        let schema = editor_schema().unwrap();
        let d = doc(&schema, "", MarkSet::empty());
        let state = EditorState::create(d.clone(), Some(Selection::near(&d, 1)))
            .with_stored_marks(Some(size(&schema, 18)));

        let tr = split_paragraph(&schema, &state).unwrap().unwrap();

        assert_eq!(tr.doc().child_count(), 2);
        assert_eq!(
            remembered_marks(&schema, tr.doc().child(1)),
            Some(size(&schema, 18))
        );
    }

    #[test]
    fn test_split_replaces_selection() {
        let schema = editor_schema().unwrap();
        let d = doc(&schema, "abcd", MarkSet::empty());
        let state = EditorState::create(d.clone(), Some(Selection::text(&d, 2, 4)));

        let tr = split_paragraph(&schema, &state).unwrap().unwrap();

        assert_eq!(tr.doc().child(0).text_content(), "a");
        assert_eq!(tr.doc().child(1).text_content(), "d");
    }
}
