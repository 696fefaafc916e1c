use crate::input::InputState;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use taskboard_core::TaskboardResult;
use taskboard_domain::{parse_due_date, Task, TaskDraft};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAction {
    None,
    Cancel,
    Confirm,
}

/// Route a key to a text field. `multiline` fields take Alt+Enter as a line
/// break; plain Enter always confirms.
pub fn handle_dialog_input(input: &mut InputState, key: KeyEvent, multiline: bool) -> DialogAction {
    match key.code {
        KeyCode::Esc => DialogAction::Cancel,
        KeyCode::Enter if multiline && key.modifiers.contains(KeyModifiers::ALT) => {
            input.insert_char('\n');
            DialogAction::None
        }
        KeyCode::Enter => DialogAction::Confirm,
        KeyCode::Char(c) => {
            input.insert_char(c);
            DialogAction::None
        }
        KeyCode::Backspace => {
            input.backspace();
            DialogAction::None
        }
        KeyCode::Delete => {
            input.delete();
            DialogAction::None
        }
        KeyCode::Left => {
            input.move_left();
            DialogAction::None
        }
        KeyCode::Right => {
            input.move_right();
            DialogAction::None
        }
        KeyCode::Home => {
            input.move_home();
            DialogAction::None
        }
        KeyCode::End => {
            input.move_end();
            DialogAction::None
        }
        _ => DialogAction::None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    DueDate,
}

impl FormField {
    fn next(self) -> Self {
        match self {
            FormField::Title => FormField::Description,
            FormField::Description => FormField::DueDate,
            FormField::DueDate => FormField::Title,
        }
    }
}

/// Create/edit form for a task.
#[derive(Debug, Clone)]
pub struct TaskForm {
    pub title: InputState,
    pub description: InputState,
    pub due_date: InputState,
    pub focus: FormField,
    pub error: Option<String>,
}

impl TaskForm {
    pub fn empty() -> Self {
        Self {
            title: InputState::new(),
            description: InputState::new(),
            due_date: InputState::new(),
            focus: FormField::Title,
            error: None,
        }
    }

    pub fn from_task(task: &Task) -> Self {
        Self {
            title: InputState::with_text(task.title.clone()),
            description: InputState::with_text(task.description.clone().unwrap_or_default()),
            due_date: InputState::with_text(
                task.due_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
            ),
            focus: FormField::Title,
            error: None,
        }
    }

    fn focused_input(&mut self) -> &mut InputState {
        match self.focus {
            FormField::Title => &mut self.title,
            FormField::Description => &mut self.description,
            FormField::DueDate => &mut self.due_date,
        }
    }

    /// Tab cycles fields; everything else goes to the focused field.
    pub fn handle_key(&mut self, key: KeyEvent) -> DialogAction {
        if key.code == KeyCode::Tab {
            self.focus = self.focus.next();
            return DialogAction::None;
        }
        let multiline = self.focus == FormField::Description;
        handle_dialog_input(self.focused_input(), key, multiline)
    }

    /// Build a validated draft from the fields.
    pub fn to_draft(&self) -> TaskboardResult<TaskDraft> {
        let due_date = if self.due_date.is_empty() {
            None
        } else {
            Some(parse_due_date(self.due_date.as_str())?)
        };
        TaskDraft {
            title: self.title.as_str().to_string(),
            description: Some(self.description.as_str().to_string()),
            due_date,
        }
        .validate()
    }
}
