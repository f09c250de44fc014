// Colors for the panel
//
// A single dark palette; the panel is small enough that one theme that
// reads well on common terminals is all it needs.

use ratatui::style::{Color, Modifier, Style};
use tracing::Level;

#[derive(Debug, Clone)]
pub struct Theme {
    pub foreground: Color,
    pub muted: Color,
    pub border: Color,
    pub highlight: Color,
    pub ready: Color,
    pub waiting: Color,
    pub error: Color,
    pub background: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            foreground: Color::Rgb(220, 223, 228),
            muted: Color::Rgb(120, 126, 138),
            border: Color::Rgb(92, 99, 112),
            highlight: Color::Rgb(229, 192, 123),
            ready: Color::Rgb(152, 195, 121),
            waiting: Color::Rgb(97, 175, 239),
            error: Color::Rgb(224, 108, 117),
            background: Color::Rgb(40, 44, 52),
        }
    }
}

impl Theme {
    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.highlight)
            .add_modifier(Modifier::BOLD)
    }

    pub fn selected_row(&self) -> Style {
        Style::default()
            .bg(self.border)
            .fg(self.foreground)
            .add_modifier(Modifier::BOLD)
    }

    pub fn level(&self, level: &Level) -> Style {
        let color = match *level {
            Level::ERROR => self.error,
            Level::WARN => self.highlight,
            Level::INFO => self.ready,
            _ => self.muted,
        };
        Style::default().fg(color)
    }
}
