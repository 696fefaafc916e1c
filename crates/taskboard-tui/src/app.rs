use crate::dialog::{DialogAction, TaskForm};
use crate::events::{Event, EventHandler};
use crate::selection::{BoardCursor, SelectionState};
use crate::ui;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io;
use std::sync::Arc;
use taskboard_core::{LogLevel, TaskboardError};
use taskboard_domain::{
    checklist, BoardColumns, DragController, DropTarget, Task, TaskId, TaskLocation,
};
use taskboard_sync::{dispatch, Intent, Reconciler, Resolution, SyncRequest, TaskGateway};
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppMode {
    Normal,
    Dragging,
    CreateTask,
    EditTask(TaskId),
    ConfirmDelete(TaskId),
    Checklist(TaskId),
    Canceled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

pub struct App {
    pub should_quit: bool,
    pub mode: AppMode,
    pub reconciler: Reconciler,
    pub cursor: BoardCursor,
    pub drag: DragController,
    pub drag_target: Option<DropTarget>,
    pub canceled_selection: SelectionState,
    pub checklist_selection: SelectionState,
    pub form: Option<TaskForm>,
    pub status: Option<StatusMessage>,
    pub user_label: Option<String>,
    /// Fetched while a drag was in progress; loaded once it ends
    held_refresh: Option<(BoardColumns, Vec<Task>)>,
    gateway: Arc<dyn TaskGateway>,
    events: mpsc::UnboundedSender<Event>,
}

impl App {
    /// `user_label` is the signed-in user; `None` starts unauthenticated.
    pub fn new(
        gateway: Arc<dyn TaskGateway>,
        user_label: Option<String>,
        events: mpsc::UnboundedSender<Event>,
    ) -> Self {
        Self {
            should_quit: false,
            mode: AppMode::Normal,
            reconciler: Reconciler::new(user_label.is_some()),
            cursor: BoardCursor::new(),
            drag: DragController::new(),
            drag_target: None,
            canceled_selection: SelectionState::new(),
            checklist_selection: SelectionState::new(),
            form: None,
            status: None,
            user_label,
            held_refresh: None,
            gateway,
            events,
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    fn set_error(&mut self, err: &TaskboardError) {
        self.status = Some(StatusMessage {
            text: err.to_string(),
            is_error: true,
        });
    }

    fn set_info(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: false,
        });
    }

    pub fn selected_task(&self) -> Option<&Task> {
        let id = self.cursor.selected_task(self.reconciler.board())?;
        self.reconciler.board().find(id)
    }

    pub fn selected_canceled(&self) -> Option<&Task> {
        let index = self.canceled_selection.get()?;
        self.reconciler.board().canceled().get(index)
    }

    /// Fetch the board in the background. Without a user the board stays
    /// empty and nothing is sent.
    pub fn refresh(&mut self) {
        if !self.reconciler.is_authenticated() {
            let loaded = self
                .reconciler
                .load_board(BoardColumns::new())
                .and_then(|_| self.reconciler.load_canceled(Vec::new()));
            if let Err(err) = loaded {
                self.set_error(&err);
            } else {
                self.set_info("Not signed in");
            }
            return;
        }
        let gateway = Arc::clone(&self.gateway);
        let tx = self.events.clone();
        tokio::spawn(async move {
            let result = async {
                let columns = gateway.fetch_board().await?;
                let canceled = gateway.fetch_canceled().await?;
                Ok((columns, canceled))
            }
            .await;
            let _ = tx.send(Event::Refreshed(result));
        });
    }

    fn spawn_request(&self, request: SyncRequest) {
        let gateway = Arc::clone(&self.gateway);
        let tx = self.events.clone();
        tokio::spawn(async move {
            let result = dispatch(gateway.as_ref(), request.operation).await;
            let _ = tx.send(Event::Synced {
                token: request.token,
                result,
            });
        });
    }

    fn submit(&mut self, intent: Intent) {
        match self.reconciler.begin(intent) {
            Ok(Some(request)) => self.spawn_request(request),
            Ok(None) => {}
            Err(err) => self.set_error(&err),
        }
        self.cursor.sync(self.reconciler.board());
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key_event(key),
            Event::Tick => {}
            Event::Synced { token, result } => {
                let resolution = self.reconciler.complete(token, result);
                match resolution {
                    Resolution::RolledBack { .. } | Resolution::Discarded { .. } => {
                        if let Some(entry) = self.reconciler.log().latest() {
                            self.status = Some(StatusMessage {
                                text: entry.message.clone(),
                                is_error: entry.level == LogLevel::Warn,
                            });
                        }
                    }
                    Resolution::Committed | Resolution::Unknown => {}
                }
                self.cursor.sync(self.reconciler.board());
            }
            Event::Refreshed(Ok(fetched)) if self.mode == AppMode::Dragging => {
                self.held_refresh = Some(fetched);
            }
            Event::Refreshed(Ok((columns, canceled))) => self.load_fetched(columns, canceled),
            Event::Refreshed(Err(err)) => {
                tracing::warn!("Refresh failed: {}", err);
                self.set_error(&err);
            }
        }
    }

    fn load_fetched(&mut self, columns: BoardColumns, canceled: Vec<Task>) {
        let loaded = self
            .reconciler
            .load_board(columns)
            .and_then(|_| self.reconciler.load_canceled(canceled));
        if let Err(err) = loaded {
            self.set_error(&err);
        }
        self.cursor.sync(self.reconciler.board());
        self.canceled_selection
            .clamp(self.reconciler.board().canceled().len());
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit();
            return;
        }

        match self.mode.clone() {
            AppMode::Normal => self.handle_normal_key(key),
            AppMode::Dragging => self.handle_drag_key(key),
            AppMode::CreateTask | AppMode::EditTask(_) => self.handle_form_key(key),
            AppMode::ConfirmDelete(task_id) => {
                match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') => {
                        self.submit(Intent::Delete { task_id });
                    }
                    _ => self.set_info("Delete aborted"),
                }
                self.mode = AppMode::Normal;
            }
            AppMode::Checklist(task_id) => self.handle_checklist_key(key, task_id),
            AppMode::Canceled => self.handle_canceled_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        let board = self.reconciler.board();
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => self.quit(),
            KeyCode::Char('h') | KeyCode::Left => self.cursor.prev_column(),
            KeyCode::Char('l') | KeyCode::Right => self.cursor.next_column(),
            KeyCode::Char('j') | KeyCode::Down => self.cursor.down(board),
            KeyCode::Char('k') | KeyCode::Up => self.cursor.up(),
            KeyCode::Char('H') | KeyCode::Char('L') => {
                let Some(task_id) = self.cursor.selected_task(board).cloned() else {
                    return;
                };
                let to = if key.code == KeyCode::Char('H') {
                    self.cursor.column().prev()
                } else {
                    self.cursor.column().next()
                };
                self.submit(Intent::ChangeStatus {
                    task_id: task_id.clone(),
                    to,
                });
                self.cursor.follow(self.reconciler.board(), &task_id);
            }
            KeyCode::Char('n') => {
                self.form = Some(TaskForm::empty());
                self.mode = AppMode::CreateTask;
            }
            KeyCode::Char('e') => {
                if let Some(task) = self.selected_task() {
                    let form = TaskForm::from_task(task);
                    let task_id = task.id.clone();
                    self.form = Some(form);
                    self.mode = AppMode::EditTask(task_id);
                }
            }
            KeyCode::Char('c') => {
                if let Some(task_id) = self.cursor.selected_task(board).cloned() {
                    self.submit(Intent::Cancel { task_id });
                }
            }
            KeyCode::Char('d') => {
                if let Some(task_id) = self.cursor.selected_task(board).cloned() {
                    self.mode = AppMode::ConfirmDelete(task_id);
                }
            }
            KeyCode::Char('x') => {
                let Some(task) = self.selected_task() else {
                    return;
                };
                let has_items = task
                    .description
                    .as_deref()
                    .map(|d| !checklist::parse(d).is_empty())
                    .unwrap_or(false);
                if has_items {
                    let task_id = task.id.clone();
                    self.checklist_selection.set(Some(0));
                    self.mode = AppMode::Checklist(task_id);
                } else {
                    self.set_info("Task has no checklist");
                }
            }
            KeyCode::Char(' ') => self.start_drag(),
            KeyCode::Char('v') => {
                self.canceled_selection
                    .clamp(self.reconciler.board().canceled().len());
                self.mode = AppMode::Canceled;
            }
            KeyCode::Char('r') => self.refresh(),
            _ => {}
        }
    }

    fn start_drag(&mut self) {
        let Some(task_id) = self.cursor.selected_task(self.reconciler.board()).cloned() else {
            return;
        };
        match self.drag.start(self.reconciler.board(), &task_id) {
            Ok(()) => {
                self.drag_target = None;
                self.mode = AppMode::Dragging;
            }
            Err(err) => self.set_error(&err),
        }
    }

    /// Target that moves the dragged task one step in the direction of `key`.
    fn drag_step_target(&self, key: KeyCode) -> Option<DropTarget> {
        let task_id = self.drag.active_task()?;
        let Some(TaskLocation::Column { column, index }) = self.reconciler.board().locate(task_id)
        else {
            return None;
        };
        let tasks = self.reconciler.board().column(column);
        match key {
            KeyCode::Char('h') | KeyCode::Left if column.prev() != column => {
                Some(DropTarget::Column(column.prev()))
            }
            KeyCode::Char('l') | KeyCode::Right if column.next() != column => {
                Some(DropTarget::Column(column.next()))
            }
            KeyCode::Char('j') | KeyCode::Down => tasks
                .get(index + 1)
                .map(|t| DropTarget::Task(t.id.clone())),
            KeyCode::Char('k') | KeyCode::Up => index
                .checked_sub(1)
                .and_then(|i| tasks.get(i))
                .map(|t| DropTarget::Task(t.id.clone())),
            _ => None,
        }
    }

    fn handle_drag_key(&mut self, key: KeyEvent) {
        let Some(task_id) = self.drag.active_task().cloned() else {
            self.mode = AppMode::Normal;
            return;
        };
        match key.code {
            KeyCode::Esc => {
                let drag = &mut self.drag;
                if let Err(err) = self.reconciler.preview(|board| drag.cancel(board)) {
                    self.set_error(&err);
                }
                self.drag_target = None;
                self.mode = AppMode::Normal;
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                let target = self
                    .drag_target
                    .take()
                    .unwrap_or_else(|| DropTarget::Task(task_id.clone()));
                let drag = &mut self.drag;
                let released = self
                    .reconciler
                    .preview(|board| drag.release(board, Some(&target)));
                self.mode = AppMode::Normal;
                match released {
                    Ok(Some(outcome)) => match self.reconciler.commit_drag(outcome) {
                        Ok(Some(request)) => self.spawn_request(request),
                        Ok(None) => {}
                        Err(err) => self.set_error(&err),
                    },
                    Ok(None) => {}
                    Err(err) => self.set_error(&err),
                }
            }
            code => {
                let Some(target) = self.drag_step_target(code) else {
                    return;
                };
                let drag = &mut self.drag;
                match self.reconciler.preview(|board| drag.nudge(board, &target)) {
                    Ok(_) => self.drag_target = Some(target),
                    Err(err) => self.set_error(&err),
                }
            }
        }
        if self.mode != AppMode::Dragging {
            if let Some((columns, canceled)) = self.held_refresh.take() {
                self.load_fetched(columns, canceled);
            }
        }
        self.cursor.follow(self.reconciler.board(), &task_id);
        self.cursor.sync(self.reconciler.board());
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let Some(form) = self.form.as_mut() else {
            self.mode = AppMode::Normal;
            return;
        };
        match form.handle_key(key) {
            DialogAction::None => {}
            DialogAction::Cancel => {
                self.form = None;
                self.mode = AppMode::Normal;
            }
            DialogAction::Confirm => match form.to_draft() {
                Ok(draft) => {
                    let intent = match &self.mode {
                        AppMode::EditTask(task_id) => Intent::Edit {
                            task_id: task_id.clone(),
                            draft,
                        },
                        _ => Intent::Create(draft),
                    };
                    self.form = None;
                    self.mode = AppMode::Normal;
                    self.submit(intent);
                }
                Err(err) => form.error = Some(err.to_string()),
            },
        }
    }

    fn handle_checklist_key(&mut self, key: KeyEvent, task_id: TaskId) {
        let count = self
            .reconciler
            .board()
            .find(&task_id)
            .and_then(|t| t.description.as_deref())
            .map(|d| checklist::parse(d).len())
            .unwrap_or(0);
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('x') => self.mode = AppMode::Normal,
            KeyCode::Char('j') | KeyCode::Down => self.checklist_selection.next(count),
            KeyCode::Char('k') | KeyCode::Up => self.checklist_selection.prev(),
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(index) = self.checklist_selection.get() {
                    self.submit(Intent::ToggleChecklistItem { task_id, index });
                }
            }
            _ => {}
        }
    }

    fn handle_canceled_key(&mut self, key: KeyEvent) {
        let count = self.reconciler.board().canceled().len();
        match key.code {
            KeyCode::Esc | KeyCode::Char('v') | KeyCode::Char('q') => self.mode = AppMode::Normal,
            KeyCode::Char('j') | KeyCode::Down => self.canceled_selection.next(count),
            KeyCode::Char('k') | KeyCode::Up => self.canceled_selection.prev(),
            KeyCode::Char('r') | KeyCode::Enter => {
                if let Some(task_id) = self.selected_canceled().map(|t| t.id.clone()) {
                    self.submit(Intent::Resume { task_id });
                    self.canceled_selection
                        .clamp(self.reconciler.board().canceled().len());
                }
            }
            _ => {}
        }
    }
}

/// Run the board in the terminal until the user quits.
pub async fn run(gateway: Arc<dyn TaskGateway>, user_label: Option<String>) -> anyhow::Result<()> {
    let mut terminal = setup_terminal()?;
    let mut events = EventHandler::new();
    let mut app = App::new(gateway, user_label, events.sender());
    app.refresh();

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&app, frame))?;
            match events.next().await {
                Some(event) => app.handle_event(event),
                None => break,
            }
        }
        Ok::<(), io::Error>(())
    }
    .await;

    events.stop();
    restore_terminal(&mut terminal)?;
    result?;
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>, io::Error> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<(), io::Error> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

