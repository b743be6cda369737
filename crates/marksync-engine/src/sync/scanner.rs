use log::{trace, warn};
use marksync_model::{
    Assoc, ChangedRange, EditorState, MarkSet, ModelError, Node, ResolvedPos, Schema, StepMap,
    Transaction,
};

use super::emptiness::is_empty_textblock;
use super::marks::{flatten, remembered_marks};
use super::tracker::{PositionTracker, WatchedPosition};

/// Walk every step of `transactions` and record each textblock that went
/// from non-empty to empty (with the marks to remember) or from empty to
/// non-empty (to be cleared).
///
/// Positions recorded for earlier steps are carried through the maps of
/// later steps, so the result is expressed in the coordinates of the last
/// document.
pub fn scan(
    schema: &Schema,
    transactions: &[Transaction],
    old_state: &EditorState,
) -> Vec<WatchedPosition> {
    let mut tracker = PositionTracker::new();
    for tr in transactions {
        for (i, map) in tr.maps().iter().enumerate() {
            tracker.advance(map);

            let old_doc = &tr.docs()[i];
            let new_doc = tr.docs().get(i + 1).unwrap_or(tr.doc());
            for range in map.ranges() {
                if let Err(err) = scan_range(
                    schema,
                    &range,
                    map,
                    old_doc,
                    new_doc,
                    old_state,
                    &mut tracker,
                ) {
                    warn!(
                        "skipping changed range {}..{}: {err}",
                        range.new_start, range.new_end
                    );
                }
            }
        }
    }
    tracker.into_watched()
}

fn scan_range(
    schema: &Schema,
    range: &ChangedRange,
    map: &StepMap,
    old_doc: &Node,
    new_doc: &Node,
    old_state: &EditorState,
    tracker: &mut PositionTracker,
) -> Result<(), ModelError> {
    let new_start = new_doc.resolve(range.new_start)?;
    record_transition(
        schema,
        &old_doc.resolve(range.old_start)?,
        &new_start,
        map,
        old_state,
        tracker,
    );
    // The change runs past the block it started in: its end may have
    // emptied or filled another block
    if range.new_end > new_start.end(new_start.depth()) {
        record_transition(
            schema,
            &old_doc.resolve(range.old_end)?,
            &new_doc.resolve(range.new_end)?,
            map,
            old_state,
            tracker,
        );
    }
    Ok(())
}

fn record_transition(
    schema: &Schema,
    old: &ResolvedPos<'_>,
    new: &ResolvedPos<'_>,
    map: &StepMap,
    old_state: &EditorState,
    tracker: &mut PositionTracker,
) {
    let was_empty = is_empty_textblock(old);
    let is_empty = is_empty_textblock(new);
    if !was_empty && is_empty {
        let marks = marks_at_deletion(schema, old, old_state);
        let pos = new.before(new.depth());
        trace!("block at {pos} became empty, remembering {} mark(s)", marks.len());
        tracker.watch(pos, Some(flatten(&marks)));
    } else if was_empty && !is_empty {
        // The old block position is in the coordinates before this step
        let result = map.map_result(old.before(old.depth()), Assoc::After);
        if result.deleted {
            trace!("filled block at {} was replaced", old.before(old.depth()));
            return;
        }
        trace!("block at {} is no longer empty", result.pos);
        tracker.watch(result.pos, None);
    }
}

/// Marks in effect where content was removed: a remembered-marks attribute
/// left on the old block, then the marks of the removed content, then the
/// stored marks the session had before the edit.
fn marks_at_deletion(schema: &Schema, old: &ResolvedPos<'_>, old_state: &EditorState) -> MarkSet {
    if let Some(marks) = remembered_marks(schema, old.parent()).filter(|m| !m.is_empty()) {
        return marks;
    }
    let marks = old.marks_after();
    if !marks.is_empty() {
        return marks;
    }
    old_state.stored_marks().cloned().unwrap_or_default()
}
