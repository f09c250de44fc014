// Categories panel: currency per drop type, largest first

use super::formatters::format_number;
use crate::ledger::LogAggregates;
use crate::tui::app::App;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, BorderType, Borders, Row, Table},
    Frame,
};

/// Categories sorted by amount, then name
pub fn sorted_drops(logs: &LogAggregates) -> Vec<(&str, i64)> {
    let mut drops: Vec<(&str, i64)> = logs
        .drop_type_logs
        .iter()
        .map(|(k, v)| (k.as_str(), *v))
        .collect();
    drops.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    drops
}

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;

    let mut rows: Vec<Row> = sorted_drops(&app.logs)
        .into_iter()
        .map(|(kind, value)| {
            Row::new(vec![kind.to_string(), format_number(value)])
                .style(Style::default().fg(theme.foreground))
        })
        .collect();
    rows.push(
        Row::new(vec![
            "total".to_string(),
            format_number(app.logs.total_received()),
        ])
        .style(
            Style::default()
                .fg(theme.highlight)
                .add_modifier(Modifier::BOLD),
        ),
    );

    let table = Table::new(rows, [Constraint::Min(10), Constraint::Length(10)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border))
            .title(" Categories "),
    );
    f.render_widget(table, area);
}
