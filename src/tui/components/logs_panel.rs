//! Logs panel
//!
//! Shows the tail of the in-memory log buffer, newest at the bottom.

use crate::logging::LogEntry;
use crate::tui::app::App;
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, BorderType, Borders, List, ListItem},
    Frame,
};

pub fn format_log_entry(entry: &LogEntry) -> String {
    format!(
        "{} {:5} {}",
        entry.timestamp.format("%H:%M:%S"),
        entry.level.as_str(),
        entry.message
    )
}

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let visible = area.height.saturating_sub(2) as usize;

    let items: Vec<ListItem> = app
        .log_buffer
        .tail(visible)
        .iter()
        .map(|entry| ListItem::new(format_log_entry(entry)).style(theme.level(&entry.level)))
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border))
            .title(" Logs "),
    );
    f.render_widget(list, area);
}
