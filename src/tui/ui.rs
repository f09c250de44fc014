// UI rendering
//
// Layout, top to bottom:
// - Title bar (1 line)
// - Main area: friends table | detail pane over categories
// - Logs (6 lines)
// - Status bar (1 line)

use super::app::App;
use super::components::{
    detail_panel, drops_panel, friends_table, logs_panel, status_bar, title_bar,
};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

/// Main render function, called on every frame
pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(8),
            Constraint::Length(6),
            Constraint::Length(1),
        ])
        .split(f.area());

    title_bar::render(f, chunks[0], app);

    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);
    friends_table::render(f, main[0], app);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(8)])
        .split(main[1]);
    detail_panel::render(f, side[0], app);
    drops_panel::render(f, side[1], app);

    logs_panel::render(f, chunks[2], app);
    status_bar::render(f, chunks[3], app);

    if let Some(toast) = &app.toast {
        toast.render(f, f.area(), &app.theme);
    }
}
