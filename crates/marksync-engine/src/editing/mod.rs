/*!
 * # Editing Session
 *
 * The host-facing side of the engine: an immutable [`TextEditor`] snapshot
 * that edits go through, and the commands and format operations it offers.
 *
 * ## Architecture Overview
 *
 * ### 1. Snapshots with Revisions
 * - Every change produces a new `TextEditor` with `revision + 1`
 * - No-op operations return the same snapshot, revision unchanged
 * - A view keeps the newest snapshot it has seen and drops older ones
 *   (`is_newer_than`)
 *
 * ### 2. Command-Based Editing
 * - Host input is expressed as **Commands** (`Cmd` enum) compiled into
 *   transactions on the current state
 * - Enter is special-cased (`split`): the active marks are carried into the
 *   new block, as stored marks or as the new block's remembered marks
 *
 * ### 3. Append Pass on Every Transaction
 * - Each transaction is applied with the `PreserveMarks` hook installed, so
 *   remembered marks and stored marks are consistent in every snapshot
 *
 * ### 4. Format API
 * - `get_format` / `format_for_range` read the font size in effect
 * - `set_format` changes stored marks for a cursor, marks for a range
 *
 * ### 5. History
 * - Only user transactions that changed the document are recorded; append
 *   pass follow-ups never are
 * - Undo and redo restore a recorded document in a single transaction
 *
 * ## Module Structure
 *
 * - **`editor`**: `TextEditor` snapshot type
 * - **`commands`**: `Cmd` enum and its compilation to transactions
 * - **`split`**: paragraph split with mark seeding
 * - **`format`**: `TextFormat` query and apply
 * - **`history`**: bounded undo/redo stacks
 * - **`paste`**: best-effort paste detection
 */

pub mod commands;
pub mod editor;
pub mod format;
pub mod history;
pub mod paste;
pub mod split;

pub use commands::{Cmd, compile_command};
pub use editor::TextEditor;
pub use format::{TextFormat, active_marks, format_for_range, get_format, set_format};
pub use history::{History, HistoryEntry};
pub use paste::looks_like_paste;
pub use split::split_paragraph;
