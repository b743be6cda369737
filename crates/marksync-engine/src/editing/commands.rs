use marksync_model::{EditorState, Schema, Selection, Slice, Transaction};

use super::split::split_paragraph;
use crate::error::EngineError;

/// Edits a host can ask for, each compiled into a [`Transaction`] on the
/// current state
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    /// Type text over the selection
    InsertText {
        text: String,
    },
    DeleteSelection,
    /// Backspace: delete the character before the cursor, or join with the
    /// previous block at a block start
    DeleteBackward,
    /// Delete: the mirror image of `DeleteBackward`
    DeleteForward,
    /// Enter
    SplitBlock,
    /// Replace the selection with clipboard content
    Paste {
        slice: Slice,
    },
    Select {
        anchor: usize,
        head: usize,
    },
}

/// Compile a command into a transaction. `None` means the command does not
/// apply here, e.g. backspace at the very start of the document.
pub fn compile_command(
    schema: &Schema,
    state: &EditorState,
    cmd: &Cmd,
) -> Result<Option<Transaction>, EngineError> {
    let mut tr = state.tr();
    match cmd {
        Cmd::InsertText { text } => {
            tr.insert_text(text)?.scroll_into_view();
        }
        Cmd::DeleteSelection => {
            if state.selection().is_empty() {
                return Ok(None);
            }
            tr.delete_selection()?.scroll_into_view();
        }
        Cmd::DeleteBackward => {
            if !state.selection().is_empty() {
                tr.delete_selection()?;
            } else {
                let Some((from, to)) = backward_range(state)? else {
                    return Ok(None);
                };
                tr.delete(from, to)?;
            }
            tr.scroll_into_view();
        }
        Cmd::DeleteForward => {
            if !state.selection().is_empty() {
                tr.delete_selection()?;
            } else {
                let Some((from, to)) = forward_range(state)? else {
                    return Ok(None);
                };
                tr.delete(from, to)?;
            }
            tr.scroll_into_view();
        }
        Cmd::SplitBlock => return split_paragraph(schema, state),
        Cmd::Paste { slice } => {
            tr.replace_selection(slice.clone())?.scroll_into_view();
        }
        Cmd::Select { anchor, head } => {
            tr.set_selection(Selection::text(state.doc(), *anchor, *head));
        }
    }
    Ok(Some(tr))
}

/// Range removed by backspace at a collapsed cursor
fn backward_range(state: &EditorState) -> Result<Option<(usize, usize)>, EngineError> {
    let head = state.selection().head();
    let rpos = state.doc().resolve(head)?;
    let depth = rpos.depth();
    if depth == 0 || !rpos.parent().is_textblock() {
        return Ok(None);
    }
    if rpos.parent_offset() > 0 {
        return Ok(Some((head - 1, head)));
    }
    // Join with the previous block when it is a textblock too
    let index = rpos.index(depth - 1);
    let previous = index
        .checked_sub(1)
        .and_then(|i| rpos.node(depth - 1).maybe_child(i));
    Ok(previous
        .filter(|node| node.is_textblock())
        .map(|_| (head - 2, head)))
}

/// Range removed by forward delete at a collapsed cursor
fn forward_range(state: &EditorState) -> Result<Option<(usize, usize)>, EngineError> {
    let head = state.selection().head();
    let rpos = state.doc().resolve(head)?;
    let depth = rpos.depth();
    if depth == 0 || !rpos.parent().is_textblock() {
        return Ok(None);
    }
    if rpos.parent_offset() < rpos.parent().content_size() {
        return Ok(Some((head, head + 1)));
    }
    let next = rpos.node(depth - 1).maybe_child(rpos.index(depth - 1) + 1);
    Ok(next
        .filter(|node| node.is_textblock())
        .map(|_| (head, head + 2)))
}
