use log::{debug, trace, warn};
use marksync_model::{EditorState, MarkSet, ModelError, Schema, Transaction};
use serde_json::Value;

use super::emptiness::is_empty_textblock;
use super::marks::{remembered_marks, same_set, unflatten};
use super::tracker::WatchedPosition;
use crate::schema::REMEMBERED_MARKS;

/// Build the follow-up transaction that brings remembered-marks attributes
/// and stored marks in line with `new_state`, or `None` when everything is
/// already consistent.
///
/// For each watched position the block right after it gets its attribute
/// written (non-empty marks, block empty and without the attribute) or
/// cleared (no marks, block filled and still carrying the attribute). When
/// the cursor sits in an empty block with remembered marks and the session
/// has no stored marks, those marks become the stored marks.
pub fn reconcile(
    schema: &Schema,
    watched: &[WatchedPosition],
    new_state: &EditorState,
) -> Option<Transaction> {
    let selection = new_state.selection();
    let head = selection.head();
    let cursor_block = new_state.doc().resolve(head).ok().filter(|rpos| {
        selection.is_empty() && is_empty_textblock(rpos)
    });
    let in_empty = cursor_block.is_some();
    let mut store: Option<MarkSet> = cursor_block
        .and_then(|rpos| remembered_marks(schema, rpos.parent()))
        .filter(|marks| !marks.is_empty());

    let session = new_state.stored_marks();
    let needs_store = session.is_none() && store.is_some();
    if watched.is_empty() && !needs_store {
        return None;
    }

    let mut tr = new_state.tr();
    for watched in watched {
        match write_watched(schema, &mut tr, watched, in_empty, head) {
            Ok(Some(marks)) => store = Some(marks),
            Ok(None) => {}
            Err(err) => warn!("skipping remembered marks at {}: {err}", watched.pos),
        }
    }

    // Attribute steps drop stored marks; put back what the session should
    // have: the user's explicit choice, else the remembered marks.
    let wanted = match session {
        Some(marks) => Some(marks.clone()),
        None => store,
    };
    if let Some(marks) = wanted
        && tr.stored_marks().is_none_or(|current| !same_set(current, &marks))
        && (tr.doc_changed() || session.is_none())
    {
        debug!("setting stored marks to {} mark(s)", marks.len());
        tr.set_stored_marks(Some(marks));
    }

    if !tr.doc_changed() && !tr.stored_marks_set() {
        return None;
    }
    tr.set_add_to_history(false);
    Some(tr)
}

/// Write or clear the attribute for one watched position. Returns the
/// marks to store when the written block holds the cursor.
fn write_watched(
    schema: &Schema,
    tr: &mut Transaction,
    watched: &WatchedPosition,
    in_empty: bool,
    head: usize,
) -> Result<Option<MarkSet>, ModelError> {
    let rpos = tr.doc().resolve(watched.pos + 1)?;
    let depth = rpos.depth();
    if depth == 0 || rpos.before(depth) != watched.pos {
        trace!("no block starts at {}", watched.pos);
        return Ok(None);
    }
    let empty = is_empty_textblock(&rpos);
    let has_attr = rpos.parent().attr(REMEMBERED_MARKS).is_some();

    match &watched.marks {
        Some(flat) if !flat.is_empty() && empty && !has_attr => {
            debug!("remembering marks on empty block at {}", watched.pos);
            let marks = (in_empty && watched.pos + 1 == head).then(|| unflatten(schema, flat));
            tr.set_node_attr(watched.pos, REMEMBERED_MARKS, Value::Object(flat.clone()))?;
            Ok(marks)
        }
        None if !empty && has_attr => {
            debug!("clearing remembered marks on filled block at {}", watched.pos);
            tr.set_node_attr(watched.pos, REMEMBERED_MARKS, Value::Null)?;
            Ok(None)
        }
        _ => Ok(None),
    }
}
