use taskboard_domain::{BoardState, ColumnId, TaskId};

/// Selection within a list that may shrink underneath it.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    selected_index: Option<usize>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<usize> {
        self.selected_index
    }

    pub fn set(&mut self, index: Option<usize>) {
        self.selected_index = index;
    }

    pub fn next(&mut self, max_count: usize) {
        if max_count == 0 {
            return;
        }
        self.selected_index = Some(match self.selected_index {
            Some(idx) => (idx + 1).min(max_count - 1),
            None => 0,
        });
    }

    pub fn prev(&mut self) {
        self.selected_index = Some(match self.selected_index {
            Some(idx) => idx.saturating_sub(1),
            None => 0,
        });
    }

    /// Keep the selection inside `0..len`, dropping it for an empty list.
    pub fn clamp(&mut self, len: usize) {
        self.selected_index = match (self.selected_index, len) {
            (_, 0) => None,
            (Some(idx), len) => Some(idx.min(len - 1)),
            (None, _) => Some(0),
        };
    }
}

/// Which column has focus and which row is selected in each column.
#[derive(Debug, Clone)]
pub struct BoardCursor {
    column: ColumnId,
    rows: [SelectionState; 3],
}

impl Default for BoardCursor {
    fn default() -> Self {
        Self {
            column: ColumnId::ToDo,
            rows: Default::default(),
        }
    }
}

impl BoardCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(&self) -> ColumnId {
        self.column
    }

    pub fn row(&self, column: ColumnId) -> Option<usize> {
        self.rows[column.index()].get()
    }

    pub fn focus_column(&mut self, column: ColumnId) {
        self.column = column;
    }

    pub fn next_column(&mut self) {
        self.column = self.column.next();
    }

    pub fn prev_column(&mut self) {
        self.column = self.column.prev();
    }

    pub fn down(&mut self, board: &BoardState) {
        let len = board.column(self.column).len();
        self.rows[self.column.index()].next(len);
    }

    pub fn up(&mut self) {
        self.rows[self.column.index()].prev();
    }

    pub fn selected_task<'a>(&self, board: &'a BoardState) -> Option<&'a TaskId> {
        let row = self.row(self.column)?;
        board.column(self.column).get(row).map(|t| &t.id)
    }

    /// Put the cursor on `task_id` if it is visible.
    pub fn follow(&mut self, board: &BoardState, task_id: &TaskId) {
        for column in ColumnId::ALL {
            if let Some(row) = board.column(column).iter().position(|t| &t.id == task_id) {
                self.column = column;
                self.rows[column.index()].set(Some(row));
                return;
            }
        }
    }

    /// Re-clamp every column after the board changed.
    pub fn sync(&mut self, board: &BoardState) {
        for column in ColumnId::ALL {
            self.rows[column.index()].clamp(board.column(column).len());
        }
    }
}
