use log::{debug, trace};

use crate::error::ModelError;
use crate::mark::MarkSet;
use crate::node::Node;
use crate::selection::Selection;
use crate::transaction::Transaction;

/// Upper bound on append rounds before the loop is considered runaway
const MAX_APPEND_ROUNDS: usize = 64;

/// A hook invoked after each transaction that may append a follow-up.
///
/// `transactions` holds only the transactions this hook has not seen yet;
/// `old_state` is the state before the first of them.
pub trait AppendHook {
    fn append_transaction(
        &self,
        transactions: &[Transaction],
        old_state: &EditorState,
        new_state: &EditorState,
    ) -> Option<Transaction>;
}

/// Result of applying a transaction with append hooks
#[derive(Debug, Clone)]
pub struct AppliedTransaction {
    pub state: EditorState,
    /// The root transaction followed by every appended one, in order
    pub transactions: Vec<Transaction>,
}

/// An immutable snapshot of the document, selection and stored marks
#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    doc: Node,
    selection: Selection,
    stored_marks: Option<MarkSet>,
}

impl EditorState {
    /// Create a state. Without an explicit selection the cursor is placed at
    /// the start of the document.
    pub fn create(doc: Node, selection: Option<Selection>) -> Self {
        let selection = selection.unwrap_or_else(|| Selection::at_start(&doc));
        Self {
            doc,
            selection,
            stored_marks: None,
        }
    }

    /// Same state with different stored marks
    pub fn with_stored_marks(mut self, stored_marks: Option<MarkSet>) -> Self {
        self.stored_marks = stored_marks;
        self
    }

    pub fn doc(&self) -> &Node {
        &self.doc
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn stored_marks(&self) -> Option<&MarkSet> {
        self.stored_marks.as_ref()
    }

    /// Start a transaction on this state
    pub fn tr(&self) -> Transaction {
        Transaction::new(self)
    }

    /// Apply a single transaction, without running any hooks. Stored marks
    /// only survive while the selection is collapsed.
    pub fn apply(&self, tr: &Transaction) -> EditorState {
        let selection = tr.selection();
        let stored_marks = if selection.is_empty() {
            tr.stored_marks().cloned()
        } else {
            None
        };
        EditorState {
            doc: tr.doc().clone(),
            selection,
            stored_marks,
        }
    }

    /// Apply `root`, then ask every hook for follow-up transactions until
    /// none of them produces one.
    ///
    /// Each hook receives the transactions it has not seen yet together with
    /// the state it last saw. A hook is never shown a transaction it appended
    /// itself, but every other hook is.
    pub fn apply_transaction(
        &self,
        root: Transaction,
        hooks: &[&dyn AppendHook],
    ) -> Result<AppliedTransaction, ModelError> {
        let mut new_state = self.apply(&root);
        let mut transactions = vec![root];
        // Per hook: the state it last saw and how many transactions it has seen
        let mut seen: Option<Vec<(EditorState, usize)>> = None;

        for round in 0.. {
            if round >= MAX_APPEND_ROUNDS {
                return Err(ModelError::AppendLoop(round));
            }
            let mut have_new = false;
            for (i, hook) in hooks.iter().enumerate() {
                let (old_state, n) = match &seen {
                    Some(seen) => (seen[i].0.clone(), seen[i].1),
                    None => (self.clone(), 0),
                };
                let appended = if n < transactions.len() {
                    hook.append_transaction(&transactions[n..], &old_state, &new_state)
                } else {
                    None
                };
                if let Some(mut tr) = appended {
                    trace!("hook {i} appended a transaction with {} steps", tr.steps().len());
                    tr.set_appended(true);
                    if seen.is_none() {
                        seen = Some(
                            (0..hooks.len())
                                .map(|j| {
                                    if j < i {
                                        (new_state.clone(), transactions.len())
                                    } else {
                                        (self.clone(), 0)
                                    }
                                })
                                .collect(),
                        );
                    }
                    new_state = new_state.apply(&tr);
                    transactions.push(tr);
                    have_new = true;
                }
                if let Some(seen) = seen.as_mut() {
                    seen[i] = (new_state.clone(), transactions.len());
                }
            }
            if !have_new {
                debug!(
                    "transaction settled after {} round(s), {} appended",
                    round + 1,
                    transactions.len() - 1
                );
                break;
            }
        }

        Ok(AppliedTransaction {
            state: new_state,
            transactions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mark::{Attrs, Mark};
    use crate::node::{Fragment, NodeKind};
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    fn sample() -> EditorState {
        let p = Node::element(
            NodeKind::Textblock,
            "paragraph",
            Attrs::new(),
            Fragment::from_node(Node::text("ab", MarkSet::empty())),
        );
        let doc = Node::element(NodeKind::Doc, "doc", Attrs::new(), Fragment::from_node(p));
        EditorState::create(doc, None)
    }

    /// Appends one transaction inserting "!" at the end, once
    struct Exclaim {
        calls: Cell<usize>,
    }

    impl AppendHook for Exclaim {
        fn append_transaction(
            &self,
            transactions: &[Transaction],
            _old_state: &EditorState,
            new_state: &EditorState,
        ) -> Option<Transaction> {
            self.calls.set(self.calls.get() + 1);
            if new_state.doc().text_content().ends_with('!') {
                return None;
            }
            assert!(transactions.iter().all(Transaction::doc_changed));
            let mut tr = new_state.tr();
            let end = new_state.doc().content_size() - 1;
            tr.insert_text_at("!", end, end).ok()?;
            Some(tr)
        }
    }

    /// Always appends; two of these keep feeding each other
    struct Runaway;

    impl AppendHook for Runaway {
        fn append_transaction(
            &self,
            _transactions: &[Transaction],
            _old_state: &EditorState,
            new_state: &EditorState,
        ) -> Option<Transaction> {
            let mut tr = new_state.tr();
            tr.insert_text_at("x", 1, 1).ok()?;
            Some(tr)
        }
    }

    #[test]
    fn test_create_places_cursor_at_start() {
        let state = sample();
        assert_eq!(state.selection(), Selection::near(state.doc(), 1));
        assert_eq!(state.stored_marks(), None);
    }

    #[test]
    fn test_apply_keeps_stored_marks_on_collapsed_selection() {
        let state = sample();
        let marks = MarkSet::from_marks([Mark::new("strong", Attrs::new())]);
        let mut tr = state.tr();
        tr.set_stored_marks(Some(marks.clone()));

        assert_eq!(state.apply(&tr).stored_marks(), Some(&marks));

        let mut tr = state.tr();
        tr.set_selection(Selection::text(state.doc(), 1, 3));
        tr.set_stored_marks(Some(marks));
        assert_eq!(state.apply(&tr).stored_marks(), None);
    }

    #[test]
    fn test_append_loop_runs_until_settled() {
        let state = sample();
        let hook = Exclaim {
            calls: Cell::new(0),
        };
        let mut tr = state.tr();
        tr.insert_text("c").unwrap();

        let applied = state.apply_transaction(tr, &[&hook]).unwrap();

        assert_eq!(applied.state.doc().text_content(), "cab!");
        assert_eq!(applied.transactions.len(), 2);
        assert!(applied.transactions[1].meta().appended);
        assert!(!applied.transactions[0].meta().appended);
        // A hook is not shown the transaction it appended itself
        assert_eq!(hook.calls.get(), 1);
    }

    #[test]
    fn test_append_loop_guard() {
        let state = sample();
        let result = state.apply_transaction(state.tr(), &[&Runaway, &Runaway]);

        assert_eq!(
            result.err(),
            Some(ModelError::AppendLoop(MAX_APPEND_ROUNDS))
        );
    }
}
