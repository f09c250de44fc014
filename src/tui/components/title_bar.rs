// Title bar: app name, active event and sync indicator

use crate::config::VERSION;
use crate::tui::app::App;
use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;

    let mut spans = vec![
        Span::styled(" twbf ", theme.title()),
        Span::styled(format!("v{} ", VERSION), Style::default().fg(theme.muted)),
        Span::styled("│ ", Style::default().fg(theme.border)),
        Span::styled(
            format!("Event: {}", app.session.event_key()),
            Style::default().fg(theme.foreground),
        ),
    ];

    if app.session.has_new_activity() && !app.syncing {
        spans.push(Span::styled(
            "  ● new currency (r to refresh)",
            Style::default().fg(theme.ready),
        ));
    }

    if app.syncing {
        spans.push(Span::styled(
            "  ⟳ syncing logs",
            Style::default().fg(theme.waiting),
        ));
    }

    let title = Paragraph::new(Line::from(spans)).alignment(Alignment::Left);
    f.render_widget(title, area);
}
