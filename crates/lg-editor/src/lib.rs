//! Editing on top of an LG generator: selection with undo/redo, hit
//! testing and drag-and-drop between containers.

pub mod commands;
pub mod dragdrop;
pub mod hit;
pub mod select;

pub use commands::{CommandStack, SavedRect, Snapshot, snapshot};
pub use dragdrop::DragDrop;
pub use hit::{drop_candidates, hit_test, hit_test_rect};
pub use select::{EditCommand, MenuItem, Selection};
