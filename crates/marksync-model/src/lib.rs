//! # marksync-model
//!
//! A small rich-text document model: a schema-checked tree of nodes,
//! resolved positions, structural replacement, steps with position maps, and
//! transactions applied to an immutable editor state.
//!
//! ## Positions
//!
//! Every location in a document is an integer counted in tokens. A character
//! of text is one token, and entering or leaving a non-text node is one token
//! each:
//!
//! ```text
//!   0   1 2 3    4   5    6
//!   <p> a b </p> <p> </p>
//! ```
//!
//! Position 3 is the end of the first paragraph's content, 5 is the inside of
//! the empty second paragraph. [`Node::resolve`] turns a position into a
//! [`ResolvedPos`] that knows every ancestor, the offset inside the parent,
//! and the marks in effect there.
//!
//! ## Editing
//!
//! Documents are never mutated. A [`Transaction`] applies [`Step`]s one after
//! another, keeping the document before each step and the [`StepMap`] that
//! describes how positions moved:
//!
//! - [`Step::Replace`] replaces a range with a [`Slice`], which may be open at
//!   either side. Splitting and joining blocks are both replaces.
//! - [`Step::AddMark`] / [`Step::RemoveMark`] change inline marks.
//! - [`Step::SetAttrs`] changes a node's attributes without touching its
//!   content. Its map is the identity.
//!
//! ## Append hooks
//!
//! [`EditorState::apply_transaction`] applies a transaction and then gives
//! every [`AppendHook`] a chance to react with a follow-up transaction,
//! repeating until no hook has anything left to add.

pub mod error;
pub mod json;
pub mod map;
pub mod mark;
pub mod node;
pub mod replace;
pub mod resolve;
pub mod schema;
pub mod selection;
pub mod state;
pub mod step;
pub mod transaction;

pub use error::ModelError;
pub use json::{MarkJson, NodeJson};
pub use map::{Assoc, ChangedRange, MapRange, MapResult, Mapping, StepMap};
pub use mark::{Attrs, Mark, MarkSet};
pub use node::{Fragment, Node, NodeKind, TEXT_NODE};
pub use replace::Slice;
pub use resolve::ResolvedPos;
pub use schema::{MarkSpec, NodeSpec, Schema, SchemaBuilder};
pub use selection::Selection;
pub use state::{AppendHook, AppliedTransaction, EditorState};
pub use step::Step;
pub use transaction::{Transaction, TransactionMeta};
