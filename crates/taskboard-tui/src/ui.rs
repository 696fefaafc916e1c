use crate::app::{App, AppMode};
use crate::components::*;
use crate::dialog::{FormField, TaskForm};
use crate::input::InputState;
use crate::theme::*;
use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use taskboard_domain::{checklist, ColumnId, Task, TaskId};

pub fn render(app: &App, frame: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(frame.area());

    render_board(app, frame, chunks[0]);
    render_footer(app, frame, chunks[1]);

    match &app.mode {
        AppMode::CreateTask => render_form_popup(app, frame, "New Task"),
        AppMode::EditTask(_) => render_form_popup(app, frame, "Edit Task"),
        AppMode::ConfirmDelete(task_id) => render_confirm_delete(app, frame, task_id),
        AppMode::Checklist(task_id) => render_checklist_popup(app, frame, task_id),
        AppMode::Canceled => render_canceled_popup(app, frame),
        AppMode::Normal | AppMode::Dragging => {}
    }
}

fn render_board(app: &App, frame: &mut Frame, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    for column in ColumnId::ALL {
        render_column(app, frame, columns[column.index()], column);
    }
}

fn render_column(app: &App, frame: &mut Frame, area: Rect, column: ColumnId) {
    let board = app.reconciler.board();
    let tasks = board.column(column);
    let focused = app.cursor.column() == column;
    let selected_row = app.cursor.row(column);
    let dragged = app.drag.active_task();

    let border_style = if focused {
        focused_border()
    } else {
        unfocused_border()
    };
    let block = Block::default()
        .title(format!("{} ({})", column, tasks.len()))
        .borders(Borders::ALL)
        .border_style(border_style);

    let mut lines = Vec::new();
    if tasks.is_empty() {
        lines.push(Line::from(Span::styled("  no tasks", label_text())));
    }
    for (row, task) in tasks.iter().enumerate() {
        let is_selected = focused && selected_row == Some(row);
        let is_dragged = dragged == Some(&task.id);
        let mut line = task_line(app, task, column);
        if is_dragged {
            line = line.style(dragged_item());
        } else if is_selected {
            line = line.style(selected_item(true));
        }
        lines.push(line);
    }

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}

fn task_line(app: &App, task: &Task, column: ColumnId) -> Line<'static> {
    let title_style = if app.reconciler.has_pending(&task.id) || task.id.is_temporary() {
        pending_text()
    } else if column == ColumnId::Done {
        done_text()
    } else {
        normal_text()
    };

    let mut spans = vec![Span::styled(task.title.clone(), title_style)];

    if let Some(due) = task.due_date {
        let overdue = column != ColumnId::Done && due < Local::now().date_naive();
        let style = if overdue { overdue_text() } else { label_text() };
        spans.push(Span::styled(format!("  {}", due.format("%Y-%m-%d")), style));
    }

    if let Some((done, total)) = task.description.as_deref().and_then(checklist::progress) {
        spans.push(Span::styled(format!("  [{}/{}]", done, total), label_text()));
    }

    Line::from(spans)
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let help_text = match app.mode {
        AppMode::Dragging => "h/l: column | j/k: position | ENTER: drop | ESC: cancel",
        AppMode::CreateTask | AppMode::EditTask(_) => {
            "TAB: next field | ALT+ENTER: newline | ENTER: save | ESC: cancel"
        }
        AppMode::ConfirmDelete(_) => "y: delete | any other key: keep",
        AppMode::Checklist(_) => "j/k: navigate | SPACE: toggle | ESC: close",
        AppMode::Canceled => "j/k: navigate | r: resume | ESC: close",
        AppMode::Normal => {
            "q: quit | n: new | e: edit | SPACE: drag | H/L: move | c: cancel | d: delete | x: checklist | v: canceled | r: refresh"
        }
    };

    let mut spans = Vec::new();
    if let Some(user) = &app.user_label {
        spans.push(Span::styled(format!("[{}] ", user), bold_highlight()));
    }
    match &app.status {
        Some(status) => {
            let style = if status.is_error {
                error_text()
            } else {
                info_text()
            };
            spans.push(Span::styled(status.text.clone(), style));
            spans.push(Span::styled("  |  ", label_text()));
            spans.push(Span::styled(help_text, label_text()));
        }
        None => spans.push(Span::styled(help_text, label_text())),
    }

    let footer = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}

fn field_block(label: &str, focused: bool) -> Block<'_> {
    Block::default()
        .title(label)
        .borders(Borders::ALL)
        .border_style(if focused {
            focused_border()
        } else {
            unfocused_border()
        })
}

fn render_field(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    input: &InputState,
    focused: bool,
) {
    let block = field_block(label, focused);
    let inner = block.inner(area);
    let paragraph = Paragraph::new(input.as_str())
        .style(normal_text())
        .block(block);
    frame.render_widget(paragraph, area);

    if focused {
        let (row, col) = input.cursor_row_col();
        frame.set_cursor_position((inner.x + col as u16, inner.y + row as u16));
    }
}

fn render_form_popup(app: &App, frame: &mut Frame, title: &str) {
    let Some(form) = app.form.as_ref() else {
        return;
    };
    let inner = render_popup_with_block(frame, title, 60, 60);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(4),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(inner);

    render_form_fields(form, frame, &chunks);

    if let Some(error) = &form.error {
        frame.render_widget(
            Paragraph::new(error.as_str()).style(error_text()),
            chunks[3],
        );
    }
}

fn render_form_fields(form: &TaskForm, frame: &mut Frame, chunks: &[Rect]) {
    render_field(
        frame,
        chunks[0],
        "Title",
        &form.title,
        form.focus == FormField::Title,
    );
    render_field(
        frame,
        chunks[1],
        "Description",
        &form.description,
        form.focus == FormField::Description,
    );
    render_field(
        frame,
        chunks[2],
        "Due date (YYYY-MM-DD)",
        &form.due_date,
        form.focus == FormField::DueDate,
    );
}

fn render_confirm_delete(app: &App, frame: &mut Frame, task_id: &TaskId) {
    let title = app
        .reconciler
        .board()
        .find(task_id)
        .map(|t| t.title.clone())
        .unwrap_or_else(|| task_id.to_string());
    let inner = render_popup_with_block(frame, "Delete Task", 50, 20);
    let text = vec![
        Line::from(vec![
            Span::styled("Delete ", normal_text()),
            Span::styled(title, highlight_text()),
            Span::styled(" permanently?", normal_text()),
        ]),
        Line::from(""),
        Line::from(Span::styled("y: delete | any other key: keep", label_text())),
    ];
    frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), inner);
}

fn render_checklist_popup(app: &App, frame: &mut Frame, task_id: &TaskId) {
    let Some(task) = app.reconciler.board().find(task_id) else {
        return;
    };
    let items = task
        .description
        .as_deref()
        .map(checklist::parse)
        .unwrap_or_default();
    let inner = render_popup_with_block(frame, &task.title, 50, 50);
    let selected = app.checklist_selection.get();

    let lines: Vec<Line> = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let mark = if item.checked { "[x]" } else { "[ ]" };
            let style = if item.checked {
                done_text()
            } else {
                normal_text()
            };
            let line = Line::from(Span::styled(format!("{} {}", mark, item.text), style));
            if selected == Some(i) {
                line.style(selected_item(true))
            } else {
                line
            }
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_canceled_popup(app: &App, frame: &mut Frame) {
    let canceled = app.reconciler.board().canceled();
    let area = centered_rect(60, 60, frame.area());
    frame.render_widget(Clear, area);
    let block = Block::default()
        .title(format!("Canceled ({})", canceled.len()))
        .borders(Borders::ALL)
        .border_style(canceled_view_border())
        .style(popup_bg());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if canceled.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled("No canceled tasks", label_text())),
            inner,
        );
        return;
    }

    let selected = app.canceled_selection.get();
    let lines: Vec<Line> = canceled
        .iter()
        .enumerate()
        .map(|(i, task)| {
            let line = Line::from(Span::styled(task.title.clone(), normal_text()));
            if selected == Some(i) {
                line.style(selected_item(true))
            } else {
                line
            }
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}
