use std::sync::Arc;

use marksync_engine::sync::append_transaction;
use marksync_engine::{
    Cmd, EditorConfig, REMEMBERED_MARKS, TextEditor, TextFormat, editor_schema, font_size_of,
};
use marksync_model::{Fragment, MarkSet, Slice};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn editor_from(doc: serde_json::Value) -> TextEditor {
    init_logging();
    let schema = Arc::new(editor_schema().unwrap());
    TextEditor::from_json(schema, EditorConfig::default(), &doc.to_string()).unwrap()
}

fn run(editor: &TextEditor, cmd: Cmd) -> TextEditor {
    editor.execute(&cmd).unwrap()
}

fn type_text(editor: &TextEditor, text: &str) -> TextEditor {
    run(
        editor,
        Cmd::InsertText {
            text: text.to_string(),
        },
    )
}

fn select(editor: &TextEditor, pos: usize) -> TextEditor {
    run(
        editor,
        Cmd::Select {
            anchor: pos,
            head: pos,
        },
    )
}

fn sized_paragraph(text: &str, size: u32) -> serde_json::Value {
    json!({
        "type": "paragraph",
        "content": [{
            "type": "text",
            "text": text,
            "marks": [{"type": "font_size", "attrs": {"value": size}}]
        }]
    })
}

fn remembered(editor: &TextEditor, block: usize) -> Option<serde_json::Value> {
    editor.doc().child(block).attr(REMEMBERED_MARKS).cloned()
}

#[test]
fn emptying_a_block_preserves_its_marks() {
    let editor = editor_from(json!({"type": "doc", "content": [sized_paragraph("A", 18)]}));
    let editor = select(&editor, 2);

    let editor = run(&editor, Cmd::DeleteBackward);

    assert_eq!(editor.doc().child(0).content_size(), 0);
    assert_eq!(
        editor.to_json().unwrap()["content"][0]["attrs"],
        json!({"remembered-marks": {"font_size": {"value": 18}}})
    );
    assert_eq!(editor.get_format().unwrap().font_size, 18);
}

#[test]
fn filling_a_block_clears_remembered_marks() {
    let editor = editor_from(json!({
        "type": "doc",
        "content": [{
            "type": "paragraph",
            "attrs": {"remembered-marks": {"font_size": {"value": 24}}}
        }]
    }));

    let editor = type_text(&editor, "x");

    assert_eq!(remembered(&editor, 0), None);
    let text = editor.doc().child(0).child(0);
    assert_eq!(text.text_str(), Some("x"));
    assert_eq!(font_size_of(text.marks()), Some(24));
}

#[test]
fn pasting_into_a_remembered_block_clears_it() {
    let editor = editor_from(json!({
        "type": "doc",
        "content": [{
            "type": "paragraph",
            "attrs": {"remembered-marks": {"font_size": {"value": 24}}}
        }]
    }));
    let schema = editor.schema().clone();
    let slice = Slice::new(
        Fragment::from_node(schema.text("pasted", MarkSet::empty())),
        0,
        0,
    );

    let editor = run(&editor, Cmd::Paste { slice });

    assert_eq!(editor.doc().text_content(), "pasted");
    assert_eq!(remembered(&editor, 0), None);
}

#[test]
fn consistent_document_needs_no_follow_up() {
    let editor = editor_from(json!({"type": "doc", "content": [sized_paragraph("A", 18)]}));
    let editor = select(&editor, 2);
    let schema = editor.schema();
    let state = editor.state();
    let mut delete = state.tr();
    delete.delete(1, 2).unwrap();
    let deleted = state.apply(&delete);

    let follow_up = append_transaction(schema, &[delete.clone()], state, &deleted).unwrap();
    let settled = deleted.apply(&follow_up);
    assert_eq!(
        settled.doc().child(0).attr(REMEMBERED_MARKS),
        Some(&json!({"font_size": {"value": 18}}))
    );

    // Running the pass again over its own output changes nothing
    assert!(append_transaction(schema, &[follow_up.clone()], &deleted, &settled).is_none());
    assert!(append_transaction(schema, &[delete, follow_up], state, &settled).is_none());
}

#[test]
fn split_at_end_gives_new_block_the_stored_marks() {
    let editor = editor_from(json!({
        "type": "doc",
        "content": [{"type": "paragraph", "content": [{"type": "text", "text": "ab"}]}]
    }));
    let editor = select(&editor, 3);
    let editor = editor.set_format(TextFormat { font_size: 24 }).unwrap();

    let editor = run(&editor, Cmd::SplitBlock);

    assert_eq!(editor.doc().child_count(), 2);
    assert_eq!(remembered(&editor, 0), None);
    assert_eq!(
        remembered(&editor, 1),
        Some(json!({"font_size": {"value": 24}}))
    );
    assert_eq!(editor.get_format().unwrap().font_size, 24);
}

#[test]
fn split_inside_content_stores_marks_without_attribute() {
    let editor = editor_from(json!({"type": "doc", "content": [sized_paragraph("ab", 18)]}));
    let editor = select(&editor, 2);

    let editor = run(&editor, Cmd::SplitBlock);

    assert_eq!(editor.doc().child(1).text_content(), "b");
    assert_eq!(remembered(&editor, 0), None);
    assert_eq!(remembered(&editor, 1), None);
    assert_eq!(editor.stored_marks().and_then(font_size_of), Some(18));
}

#[test]
fn unknown_remembered_marks_are_dropped() {
    let editor = editor_from(json!({
        "type": "doc",
        "content": [{
            "type": "paragraph",
            "attrs": {"remembered-marks": {"blink": {}, "font_size": {"value": 28}}}
        }]
    }));

    assert_eq!(editor.stored_marks().map(MarkSet::len), Some(1));
    assert_eq!(editor.get_format().unwrap().font_size, 28);
}

#[rstest]
#[case::cursor_in_sized_text(2, 18)]
#[case::cursor_in_plain_text(5, 14)]
fn setting_active_format_keeps_revision(#[case] cursor: usize, #[case] size: u32) {
    let editor = editor_from(json!({
        "type": "doc",
        "content": [
            sized_paragraph("ab", 18),
            {"type": "paragraph", "content": [{"type": "text", "text": "cd"}]}
        ]
    }));
    let editor = select(&editor, cursor);

    let next = editor.set_format(TextFormat { font_size: size }).unwrap();

    assert_eq!(next.revision(), editor.revision());
    assert!(!next.is_newer_than(&editor));
}

#[test]
fn format_survives_deleting_and_splitting() {
    let editor = editor_from(json!({"type": "doc", "content": [{"type": "paragraph"}]}));
    assert_eq!(editor.revision(), 0);

    // Empty block, pick a size, type
    let editor = editor.set_format(TextFormat { font_size: 18 }).unwrap();
    let editor = type_text(&editor, "A");
    assert_eq!(remembered(&editor, 0), None);
    assert_eq!(
        font_size_of(editor.doc().child(0).child(0).marks()),
        Some(18)
    );

    // Delete it again: the block remembers the size
    let editor = run(&editor, Cmd::DeleteBackward);
    assert_eq!(
        remembered(&editor, 0),
        Some(json!({"font_size": {"value": 18}}))
    );

    // Enter: both blocks remember it
    let editor = run(&editor, Cmd::SplitBlock);
    assert_eq!(editor.revision(), 4);
    assert_eq!(editor.get_format().unwrap().font_size, 18);
    insta::assert_json_snapshot!(editor.to_json().unwrap(), @r#"
    {
      "content": [
        {
          "attrs": {
            "remembered-marks": {
              "font_size": {
                "value": 18
              }
            }
          },
          "type": "paragraph"
        },
        {
          "attrs": {
            "remembered-marks": {
              "font_size": {
                "value": 18
              }
            }
          },
          "type": "paragraph"
        }
      ],
      "type": "doc"
    }
    "#);

    // Typing in the new block uses the size and clears its attribute
    let editor = type_text(&editor, "B");
    assert_eq!(remembered(&editor, 1), None);
    assert_eq!(
        font_size_of(editor.doc().child(1).child(0).marks()),
        Some(18)
    );
    assert_eq!(
        remembered(&editor, 0),
        Some(json!({"font_size": {"value": 18}}))
    );
}

#[test]
fn undo_restores_text_and_redo_replays_it() {
    let editor = editor_from(json!({"type": "doc", "content": [{"type": "paragraph"}]}));
    let typed = type_text(&type_text(&editor, "a"), "b");

    let undone = typed.undo().unwrap().undo().unwrap();
    assert_eq!(undone.doc().text_content(), "");
    assert!(!undone.can_undo());

    let redone = undone.redo().unwrap();
    assert_eq!(redone.doc().text_content(), "a");
    assert!(redone.is_newer_than(&undone));
}
