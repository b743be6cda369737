use marksync_model::Transaction;

/// Best-effort guess whether `tr` is a paste: its first step inserts more
/// than a single token, some of it text. Typing inserts one character per
/// transaction, so anything larger most likely came from the clipboard.
pub fn looks_like_paste(tr: &Transaction) -> bool {
    let Some(slice) = tr.steps().first().and_then(|step| step.slice()) else {
        return false;
    };
    slice.size() > 1 && slice.content().iter().any(|node| !node.text_content().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::editor_schema;
    use marksync_model::{Attrs, EditorState, Fragment, MarkSet, Slice};

    fn state() -> EditorState {
        let schema = editor_schema().unwrap();
        let paragraph = schema
            .node(
                "paragraph",
                Attrs::new(),
                Fragment::from_node(schema.text("abc", MarkSet::empty())),
            )
            .unwrap();
        let doc = schema
            .node("doc", Attrs::new(), Fragment::from_node(paragraph))
            .unwrap();
        EditorState::create(doc, None)
    }

    #[test]
    fn test_typing_is_not_paste() {
        let mut tr = state().tr();
        tr.insert_text("x").unwrap();

        assert!(!looks_like_paste(&tr));
    }

    #[test]
    fn test_multi_character_insert_is_paste() {
        let mut tr = state().tr();
        tr.insert_text("pasted").unwrap();

        assert!(looks_like_paste(&tr));
    }

    #[test]
    fn test_structural_insert_without_text_is_not_paste() {
        let schema = editor_schema().unwrap();
        let mut tr = state().tr();
        let blocks = Fragment::from_vec(vec![schema.empty_textblock(), schema.empty_textblock()]);
        // After the paragraph, at document level
        tr.replace(5, 5, Slice::new(blocks, 0, 0)).unwrap();

        assert_eq!(tr.doc().child_count(), 3);
        assert!(!looks_like_paste(&tr));
    }

    #[test]
    fn test_no_steps_is_not_paste() {
        assert!(!looks_like_paste(&state().tr()));
    }
}
