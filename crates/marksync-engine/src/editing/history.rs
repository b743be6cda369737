use std::sync::Arc;

use marksync_model::{Node, Selection};

/// Document and selection as they were before a recorded edit
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub doc: Node,
    pub selection: Selection,
}

/// Bounded undo/redo stacks. Entries are shared between editor snapshots,
/// so cloning a history is cheap.
#[derive(Debug, Clone)]
pub struct History {
    done: Vec<Arc<HistoryEntry>>,
    undone: Vec<Arc<HistoryEntry>>,
    depth: usize,
}

impl History {
    pub fn new(depth: usize) -> Self {
        Self {
            done: Vec::new(),
            undone: Vec::new(),
            depth: depth.max(1),
        }
    }

    /// Record the state before a user edit. Clears the redo stack.
    pub fn record(&mut self, entry: HistoryEntry) {
        self.done.push(Arc::new(entry));
        if self.done.len() > self.depth {
            let excess = self.done.len() - self.depth;
            self.done.drain(..excess);
        }
        self.undone.clear();
    }

    /// Take the latest entry to undo. `current` is what redo should bring
    /// back.
    pub fn pop_undo(&mut self, current: HistoryEntry) -> Option<Arc<HistoryEntry>> {
        let entry = self.done.pop()?;
        self.undone.push(Arc::new(current));
        Some(entry)
    }

    /// Take the latest undone entry. `current` becomes undoable again.
    pub fn pop_redo(&mut self, current: HistoryEntry) -> Option<Arc<HistoryEntry>> {
        let entry = self.undone.pop()?;
        self.done.push(Arc::new(current));
        Some(entry)
    }

    pub fn can_undo(&self) -> bool {
        !self.done.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}
