use ratatui::style::{Color, Modifier, Style};

pub const BORDER: Color = Color::Cyan;
pub const SELECTED_BG: Color = Color::Blue;
pub const HEAD_BRANCH: Color = Color::Green;
pub const LABEL_TEXT: Color = Color::DarkGray;
pub const HIGHLIGHT_TEXT: Color = Color::Yellow;
pub const ERROR_TEXT: Color = Color::Red;
pub const POPUP_BG: Color = Color::Black;

pub fn border() -> Style {
    Style::default().fg(BORDER)
}

pub fn selected_item() -> Style {
    Style::default().bg(SELECTED_BG)
}

pub fn head_branch() -> Style {
    Style::default()
        .fg(HEAD_BRANCH)
        .add_modifier(Modifier::BOLD)
}

pub fn label_text() -> Style {
    Style::default().fg(LABEL_TEXT)
}

pub fn highlight_text() -> Style {
    Style::default().fg(HIGHLIGHT_TEXT)
}

pub fn error_text() -> Style {
    Style::default().fg(ERROR_TEXT)
}

pub fn popup_bg() -> Style {
    Style::default().bg(POPUP_BG)
}
