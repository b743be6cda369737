use log::debug;
use marksync_model::{EditorState, MarkSet, Schema, Transaction};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EngineError;
use crate::schema::{REMEMBERED_MARKS, font_size_mark, font_size_of};
use crate::sync::emptiness::is_empty_textblock;
use crate::sync::marks::{flatten, remembered_marks};

/// The formatting the host's toolbar shows and edits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextFormat {
    pub font_size: u32,
}

/// Marks the next typed character would get: the stored marks, else the
/// remembered marks of an empty block under the cursor, else the marks at
/// the selection head
pub fn active_marks(schema: &Schema, state: &EditorState) -> Result<MarkSet, EngineError> {
    if let Some(marks) = state.stored_marks() {
        return Ok(marks.clone());
    }
    let rpos = state.doc().resolve(state.selection().head())?;
    if is_empty_textblock(&rpos)
        && let Some(marks) = remembered_marks(schema, rpos.parent())
    {
        return Ok(marks);
    }
    Ok(rpos.marks())
}

pub fn get_format(
    schema: &Schema,
    state: &EditorState,
    default_font_size: u32,
) -> Result<TextFormat, EngineError> {
    let marks = active_marks(schema, state)?;
    Ok(TextFormat {
        font_size: font_size_of(&marks).unwrap_or(default_font_size),
    })
}

/// Format of `from..to`. A collapsed range reads like [`get_format`] at
/// that position; a real range gives `None` when its start and end disagree.
pub fn format_for_range(
    schema: &Schema,
    state: &EditorState,
    from: usize,
    to: usize,
    default_font_size: u32,
) -> Result<Option<TextFormat>, EngineError> {
    let doc = state.doc();
    let format = |marks: &MarkSet| TextFormat {
        font_size: font_size_of(marks).unwrap_or(default_font_size),
    };
    if from == to {
        if state.selection().is_empty() && state.selection().head() == from {
            return get_format(schema, state, default_font_size).map(Some);
        }
        return Ok(Some(format(&doc.resolve(from)?.marks())));
    }
    let (from, to) = (from.min(to), from.max(to));
    let start = format(&doc.resolve(from)?.marks_after());
    let end = format(&doc.resolve(to)?.marks());
    Ok((start == end).then_some(start))
}

/// Apply `format` to the selection.
///
/// A collapsed selection only changes the stored marks (and the remembered
/// marks of the empty block it sits in, if any). A range gets the font-size
/// mark on all of its text, and empty blocks inside it remember the new
/// size. `None` when the format is already in effect.
pub fn set_format(
    schema: &Schema,
    state: &EditorState,
    format: TextFormat,
    default_font_size: u32,
) -> Result<Option<Transaction>, EngineError> {
    if format.font_size == 0 {
        return Err(EngineError::InvalidFontSize(format.font_size));
    }
    let mark = font_size_mark(schema, format.font_size)?;
    let selection = state.selection();
    let mut tr = state.tr();

    if selection.is_empty() {
        if get_format(schema, state, default_font_size)? == format {
            return Ok(None);
        }
        let marks = active_marks(schema, state)?.add(mark);
        let rpos = state.doc().resolve(selection.head())?;
        if is_empty_textblock(&rpos)
            && remembered_marks(schema, rpos.parent()).is_some_and(|current| current != marks)
        {
            let pos = rpos.before(rpos.depth());
            tr.set_node_attr(pos, REMEMBERED_MARKS, Value::Object(flatten(&marks)))?;
        }
        debug!("stored font size set to {}", format.font_size);
        tr.set_stored_marks(Some(marks));
        return Ok(Some(tr));
    }

    let (from, to) = (selection.from(), selection.to());
    tr.add_mark(from, to, mark.clone())?;

    let mut empty_blocks = Vec::new();
    state.doc().nodes_between(from, to, |node, pos, _| {
        if node.is_textblock() && node.content_size() == 0 {
            let marks = remembered_marks(schema, node).unwrap_or_default();
            let updated = marks.add(mark.clone());
            if updated != marks {
                empty_blocks.push((pos, updated));
            }
        }
        !node.is_textblock()
    });
    for (pos, marks) in empty_blocks {
        tr.set_node_attr(pos, REMEMBERED_MARKS, Value::Object(flatten(&marks)))?;
    }

    if !tr.doc_changed() {
        return Ok(None);
    }
    debug!("font size {} applied to {from}..{to}", format.font_size);
    tr.scroll_into_view();
    Ok(Some(tr))
}
