// Status bar: roster counts and key hints

use crate::tui::app::App;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let sep = Span::styled(" │ ", Style::default().fg(theme.border));

    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", app.session.event_key()),
            Style::default().fg(theme.highlight),
        ),
        sep.clone(),
        Span::styled(
            format!("Friends: {}", app.session.friend_count()),
            Style::default().fg(theme.foreground),
        ),
        sep.clone(),
        Span::styled(
            format!("Ready: {}", app.session.ready_count()),
            Style::default().fg(theme.ready),
        ),
        sep,
        Span::styled(
            "↑↓ select  s send  r refresh  f force  q quit",
            Style::default().fg(theme.muted),
        ),
    ]);

    f.render_widget(Paragraph::new(line), area);
}
