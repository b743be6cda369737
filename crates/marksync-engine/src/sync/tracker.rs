use log::trace;
use marksync_model::{Assoc, StepMap};

use super::marks::FlatMarks;

/// A block position whose remembered marks need attention, and the marks to
/// write there (`None` to clear them)
#[derive(Debug, Clone, PartialEq)]
pub struct WatchedPosition {
    pub pos: usize,
    pub marks: Option<FlatMarks>,
}

/// Carries watched positions forward through the step maps of a batch of
/// edits, in the order the edits happened.
#[derive(Debug, Clone, Default)]
pub struct PositionTracker {
    watched: Vec<WatchedPosition>,
}

impl PositionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start watching `pos`, expressed in the coordinates of the latest
    /// document
    pub fn watch(&mut self, pos: usize, marks: Option<FlatMarks>) {
        self.watched.push(WatchedPosition { pos, marks });
    }

    /// Map every watched position through `map`. Entries whose surrounding
    /// content was deleted are dropped.
    pub fn advance(&mut self, map: &StepMap) {
        if map.is_identity() {
            return;
        }
        self.watched.retain_mut(|watched| {
            let result = map.map_result(watched.pos, Assoc::After);
            if result.deleted {
                trace!("dropping watched position {}", watched.pos);
                return false;
            }
            watched.pos = result.pos;
            true
        });
    }

    pub fn watched(&self) -> &[WatchedPosition] {
        &self.watched
    }

    pub fn into_watched(self) -> Vec<WatchedPosition> {
        self.watched
    }

    pub fn is_empty(&self) -> bool {
        self.watched.is_empty()
    }
}
