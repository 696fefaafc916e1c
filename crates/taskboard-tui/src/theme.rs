use ratatui::style::{Color, Modifier, Style};

pub const FOCUSED_BORDER: Color = Color::Cyan;
pub const UNFOCUSED_BORDER: Color = Color::White;
pub const SELECTED_BG: Color = Color::Blue;
pub const DRAG_BG: Color = Color::Magenta;

pub const NORMAL_TEXT: Color = Color::White;
pub const LABEL_TEXT: Color = Color::DarkGray;
pub const HIGHLIGHT_TEXT: Color = Color::Yellow;
pub const DONE_TEXT: Color = Color::DarkGray;
pub const PENDING_TEXT: Color = Color::LightCyan;
pub const OVERDUE_TEXT: Color = Color::Red;

pub const POPUP_BG: Color = Color::Black;
pub const ERROR_COLOR: Color = Color::Red;
pub const INFO_COLOR: Color = Color::Green;

pub fn focused_border() -> Style {
    Style::default().fg(FOCUSED_BORDER)
}

pub fn unfocused_border() -> Style {
    Style::default().fg(UNFOCUSED_BORDER)
}

pub fn canceled_view_border() -> Style {
    Style::default().fg(Color::Yellow)
}

pub fn selected_item(focused: bool) -> Style {
    if focused {
        Style::default().bg(SELECTED_BG)
    } else {
        Style::default()
    }
}

pub fn dragged_item() -> Style {
    Style::default()
        .bg(DRAG_BG)
        .add_modifier(Modifier::BOLD)
}

pub fn normal_text() -> Style {
    Style::default().fg(NORMAL_TEXT)
}

pub fn label_text() -> Style {
    Style::default().fg(LABEL_TEXT)
}

pub fn highlight_text() -> Style {
    Style::default().fg(HIGHLIGHT_TEXT)
}

pub fn done_text() -> Style {
    Style::default().fg(DONE_TEXT)
}

pub fn pending_text() -> Style {
    Style::default().fg(PENDING_TEXT)
}

pub fn overdue_text() -> Style {
    Style::default().fg(OVERDUE_TEXT)
}

pub fn error_text() -> Style {
    Style::default().fg(ERROR_COLOR)
}

pub fn info_text() -> Style {
    Style::default().fg(INFO_COLOR)
}

pub fn bold_highlight() -> Style {
    Style::default()
        .fg(HIGHLIGHT_TEXT)
        .add_modifier(Modifier::BOLD)
}

pub fn popup_bg() -> Style {
    Style::default().bg(POPUP_BG)
}
