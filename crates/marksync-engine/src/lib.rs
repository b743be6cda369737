//! # marksync-engine
//!
//! Formatting consistency for a rich-text editor built on `marksync-model`.
//!
//! Marks live on text, so a block that loses its last character also loses
//! its formatting. This crate keeps it: an append pass ([`sync`]) records
//! the marks of emptied blocks in a `remembered-marks` attribute and turns
//! them back into stored marks when the cursor returns, paragraph splits
//! carry the active marks into the new block, and the format API
//! ([`TextFormat`]) reads and applies font sizes through the same rules.
//!
//! [`TextEditor`] ties it together as an immutable, revisioned snapshot.

pub mod config;
pub mod editing;
pub mod error;
pub mod schema;
pub mod sync;

pub use config::EditorConfig;
pub use editing::{Cmd, TextEditor, TextFormat};
pub use error::EngineError;
pub use schema::{FONT_SIZE, REMEMBERED_MARKS, editor_schema, font_size_mark, font_size_of};
pub use sync::PreserveMarks;
