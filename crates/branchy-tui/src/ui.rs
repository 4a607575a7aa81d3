use crate::app::{App, AppMode};
use crate::theme::*;
use branchy_core::ActivityLevel;
use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

pub fn render(app: &App, frame: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(4)])
        .split(frame.area());

    render_branches(app, frame, chunks[0]);
    render_footer(app, frame, chunks[1]);

    match &app.mode {
        AppMode::Normal => {}
        AppMode::CreateBranch => render_input_popup(app, frame, "Create Branch", "Branch name:"),
        AppMode::RenameBranch { from } => {
            let label = format!("New name for '{}':", from);
            render_input_popup(app, frame, "Rename Branch", &label)
        }
        AppMode::ConfirmDelete { name, force } => render_confirm_popup(frame, name, *force),
    }
}

/// Commit age the way `git log --date=relative` phrases it, coarsened
pub fn relative_date(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - date).num_seconds();
    let (count, unit) = match seconds {
        s if s < 60 => return "just now".to_string(),
        s if s < 3_600 => (s / 60, "minute"),
        s if s < 86_400 => (s / 3_600, "hour"),
        s if s < 30 * 86_400 => (s / 86_400, "day"),
        s if s < 365 * 86_400 => (s / (30 * 86_400), "month"),
        s => (s / (365 * 86_400), "year"),
    };
    let plural = if count == 1 { "" } else { "s" };
    format!("{} {}{} ago", count, unit, plural)
}

fn render_branches(app: &App, frame: &mut Frame, area: Rect) {
    let now = Utc::now();
    let branches = app.branches();
    let items: Vec<ListItem> = branches
        .iter()
        .map(|branch| {
            let (marker, name_style) = if branch.is_head {
                ("* ", head_branch())
            } else {
                ("  ", ratatui::style::Style::default())
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{}{:<32}", marker, branch.name), name_style),
                Span::styled(
                    format!("{} ", branch.last_commit.short_id()),
                    highlight_text(),
                ),
                Span::raw(branch.last_commit.message.clone()),
                Span::styled(
                    format!(
                        "  {}, {}",
                        branch.last_commit.author.name,
                        relative_date(branch.last_commit.date, now)
                    ),
                    label_text(),
                ),
            ]))
        })
        .collect();

    let title = format!(" {} ({} branches) ", app.repo_label, branches.len());
    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(border()),
        )
        .highlight_style(selected_item());

    let mut state = ListState::default();
    state.select(app.selection.get());
    frame.render_stateful_widget(list, area, &mut state);
}

fn queue_status(app: &App) -> Line<'static> {
    let queue = app.project.queue();
    let mut spans = Vec::new();

    if queue.is_paused() {
        spans.push(Span::styled("PAUSED", highlight_text()));
    } else if queue.is_running() {
        spans.push(Span::styled("RUNNING", head_branch()));
    } else {
        spans.push(Span::styled("IDLE", label_text()));
    }
    if let Some(item) = queue.current_item() {
        spans.push(Span::raw(format!(" {}", item.description())));
    }
    let pending = queue.pending_count();
    if pending > 0 {
        spans.push(Span::styled(format!("  ({} queued)", pending), label_text()));
    }
    if let Some(entry) = app.activity.latest() {
        let style = match entry.level {
            ActivityLevel::Info => label_text(),
            ActivityLevel::Error => error_text(),
        };
        spans.push(Span::styled(format!("  | {}", entry.message), style));
    }
    Line::from(spans)
}

fn help_line(mode: &AppMode) -> &'static str {
    match mode {
        AppMode::Normal => {
            "j/k: move | Enter: checkout | n: new | r: rename | d/D: delete | R: refresh | p: pause | x: cancel queued | q: quit"
        }
        AppMode::CreateBranch | AppMode::RenameBranch { .. } => "Enter: confirm | Esc: cancel",
        AppMode::ConfirmDelete { .. } => "y: delete | n: keep",
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let footer = Paragraph::new(vec![
        queue_status(app),
        Line::from(Span::styled(help_line(&app.mode), label_text())),
    ])
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn render_input_popup(app: &App, frame: &mut Frame, title: &str, label: &str) {
    let area = centered_rect(60, 30, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border())
        .style(popup_bg());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(inner);

    frame.render_widget(Paragraph::new(label).style(highlight_text()), chunks[0]);
    frame.render_widget(
        Paragraph::new(app.input.as_str()).block(Block::default().borders(Borders::ALL)),
        chunks[1],
    );

    let cursor_x = chunks[1].x + app.input.cursor_pos() as u16 + 1;
    frame.set_cursor_position((cursor_x, chunks[1].y + 1));
}

fn render_confirm_popup(frame: &mut Frame, name: &str, force: bool) {
    let area = centered_rect(50, 20, frame.area());
    frame.render_widget(Clear, area);

    let question = if force {
        format!("Force delete branch '{}'? Unmerged commits will be lost.", name)
    } else {
        format!("Delete branch '{}'?", name)
    };
    let popup = Paragraph::new(vec![
        Line::from(question),
        Line::from(Span::styled("y: delete | n: keep", label_text())),
    ])
    .block(
        Block::default()
            .title("Delete Branch")
            .borders(Borders::ALL)
            .border_style(error_text())
            .style(popup_bg()),
    );
    frame.render_widget(popup, area);
}
