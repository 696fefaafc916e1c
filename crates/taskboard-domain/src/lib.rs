pub mod api;
pub mod board_state;
pub mod checklist;
pub mod commands;
pub mod drag;
pub mod snapshot;
pub mod status;
pub mod task;

pub use board_state::{BoardColumns, BoardState, TaskLocation};
pub use checklist::ChecklistItem;
pub use drag::{DragController, DragIntent, DragOutcome, DropTarget};
pub use snapshot::BoardSnapshot;
pub use status::{ColumnId, StatusName};
pub use task::{parse_due_date, Task, TaskDraft, TaskId};
