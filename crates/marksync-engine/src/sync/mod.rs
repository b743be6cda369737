/*!
 * # Remembered Marks
 *
 * Keeps formatting alive on blocks that have no text to carry it.
 *
 * When a textblock loses its last character its marks would normally be
 * gone: marks live on text nodes. The append pass records them in the
 * block's `remembered-marks` attribute instead, and clears the attribute as
 * soon as the block gets content again. A cursor placed in such a block
 * picks the marks up as stored marks, so the next typed character looks
 * like the text that was deleted.
 *
 * ## Pipeline
 *
 * Every transaction applied through [`PreserveMarks`] goes through:
 *
 * 1. **Scan** (`scanner`): for each changed range of each step, compare the
 *    blocks at the range boundaries before and after the step and record
 *    non-empty -> empty and empty -> non-empty transitions.
 * 2. **Track** (`tracker`): recorded positions are carried through the maps
 *    of later steps; a position whose block was deleted is dropped.
 * 3. **Reconcile** (`reconciler`): write or clear the attribute where the
 *    final document disagrees, and sync the stored marks with the block
 *    under the cursor. A consistent document yields no transaction, which
 *    is what ends the state's append loop.
 *
 * The attribute is a plain JSON object (`marks`): mark name to mark
 * attributes, e.g. `{"font_size": {"value": 18}}`.
 */

pub mod emptiness;
pub mod marks;
pub mod preserve;
pub mod reconciler;
pub mod scanner;
pub mod tracker;

pub use emptiness::is_empty_textblock;
pub use marks::{FlatMarks, flatten, remembered_marks, same_set, unflatten};
pub use preserve::{PreserveMarks, append_transaction};
pub use reconciler::reconcile;
pub use scanner::scan;
pub use tracker::{PositionTracker, WatchedPosition};
