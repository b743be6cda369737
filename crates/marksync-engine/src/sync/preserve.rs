use std::sync::Arc;

use log::debug;
use marksync_model::{AppendHook, EditorState, Schema, Transaction};

use super::reconciler::reconcile;
use super::scanner::scan;
use crate::editing::paste::looks_like_paste;

/// The append pass: scan what the transactions emptied or filled, then
/// reconcile remembered-marks attributes and stored marks with the new
/// state.
pub fn append_transaction(
    schema: &Schema,
    transactions: &[Transaction],
    old_state: &EditorState,
    new_state: &EditorState,
) -> Option<Transaction> {
    if transactions.first().is_some_and(looks_like_paste) {
        debug!("append pass after paste");
    }
    let watched = scan(schema, transactions, old_state);
    reconcile(schema, &watched, new_state)
}

/// Installs [`append_transaction`] in [`EditorState::apply_transaction`]
#[derive(Debug, Clone)]
pub struct PreserveMarks {
    schema: Arc<Schema>,
}

impl PreserveMarks {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self { schema }
    }
}

impl AppendHook for PreserveMarks {
    fn append_transaction(
        &self,
        transactions: &[Transaction],
        old_state: &EditorState,
        new_state: &EditorState,
    ) -> Option<Transaction> {
        append_transaction(&self.schema, transactions, old_state, new_state)
    }
}
