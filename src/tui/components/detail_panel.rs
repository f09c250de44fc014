//! Detail pane for the selected friend
//!
//! Lists every time the friend sent currency during the current event,
//! in the order ingestion met them (newest first).

use super::formatters::{format_local, format_number};
use crate::ledger::PlayerLogEntry;
use crate::tui::app::App;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};

pub const NEVER_SENT: &str = "Player did not send you any currency yet.";

/// Body lines for one friend's record
pub fn detail_lines(record: &PlayerLogEntry) -> Vec<String> {
    if record.frequency.is_empty() {
        return vec![NEVER_SENT.to_string()];
    }
    let mut lines = vec![
        format!("Total received: {}", format_number(record.total)),
        String::new(),
    ];
    lines.extend(record.frequency.iter().map(|ts| format_local(*ts)));
    lines
}

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;

    let (title, lines) = match app.selected_friend() {
        Some(row) => {
            let record = app.logs.player(row.friend.player_id);
            (
                format!(" {} ", row.friend.name),
                detail_lines(&record),
            )
        }
        None => (" Details ".to_string(), vec!["No friends yet.".to_string()]),
    };

    let text: Vec<Line> = lines
        .into_iter()
        .map(|l| Line::from(Span::styled(l, Style::default().fg(theme.foreground))))
        .collect();

    let paragraph = Paragraph::new(text).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border))
            .title(title),
    );
    f.render_widget(paragraph, area);
}
