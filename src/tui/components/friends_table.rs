//! Friends table
//!
//! One row per friend, soonest-ready first. The middle column reads "send"
//! when the friend can receive now and the remaining cooldown otherwise.

use super::formatters::{format_number, truncate_to_width};
use crate::session::format_remaining;
use crate::tui::app::{App, FriendRow};
use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    widgets::{Block, BorderType, Borders, Cell, Row, Table, TableState},
    Frame,
};

/// Columns kept for everything except the name
const FIXED_COLUMNS: u16 = 10 + 10 + 4;

/// Text of the cooldown cell
pub fn cooldown_label(row: &FriendRow, sending: bool) -> String {
    if sending {
        "sending…".to_string()
    } else if row.remaining == 0 {
        "send".to_string()
    } else {
        format_remaining(row.remaining)
    }
}

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let name_width = area.width.saturating_sub(FIXED_COLUMNS + 2) as usize;

    let header = Row::new(vec!["Name", "Send", "Total"])
        .style(Style::default().fg(theme.muted))
        .bottom_margin(1);

    let rows: Vec<Row> = app
        .rows
        .iter()
        .map(|row| {
            let sending = app.sending.contains(&row.friend.player_id);
            let status_style = if row.remaining == 0 && !sending {
                Style::default().fg(theme.ready)
            } else {
                Style::default().fg(theme.waiting)
            };
            let total = app.logs.player(row.friend.player_id).total;

            Row::new(vec![
                Cell::from(truncate_to_width(&row.friend.name, name_width)),
                Cell::from(cooldown_label(row, sending)).style(status_style),
                Cell::from(format_number(total)),
            ])
            .style(Style::default().fg(theme.foreground))
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(8),
            Constraint::Length(10),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .row_highlight_style(theme.selected_row())
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border))
            .title(" Friends "),
    );

    let mut state = TableState::default();
    if !app.rows.is_empty() {
        state.select(Some(app.selected));
    }
    f.render_stateful_widget(table, area, &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::testing::friend;

    #[test]
    fn test_cooldown_label() {
        let ready = FriendRow {
            friend: friend(1, "Ann"),
            remaining: 0,
        };
        let waiting = FriendRow {
            friend: friend(2, "Bob"),
            remaining: 3 * 3600 + 5 * 60,
        };

        assert_eq!(cooldown_label(&ready, false), "send");
        assert_eq!(cooldown_label(&ready, true), "sending…");
        assert_eq!(cooldown_label(&waiting, false), "3h5m");
    }
}
