//! Theme and style definitions.

use ratatui::style::{Color, Modifier, Style};

/// Theme configuration for the NewsBot terminal client.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Primary accent color (focused borders, selection)
    pub accent: Color,
    /// Error color (failed requests)
    pub error: Color,
    /// Muted color (timestamps, placeholders, secondary info)
    pub muted: Color,
    /// User message color
    pub user: Color,
    /// Assistant message color
    pub assistant: Color,
    /// Marker for answers grounded in news context
    pub context: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Yellow,
            error: Color::Red,
            muted: Color::DarkGray,
            user: Color::Cyan,
            assistant: Color::Green,
            context: Color::Magenta,
        }
    }
}

impl Theme {
    /// Style for focused/active borders.
    pub fn focused_border(&self) -> Style {
        Style::default().fg(self.accent)
    }

    /// Style for unfocused borders.
    pub fn unfocused_border(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn bold(&self) -> Style {
        Style::default().add_modifier(Modifier::BOLD)
    }

    pub fn user_style(&self) -> Style {
        Style::default().fg(self.user)
    }

    pub fn assistant_style(&self) -> Style {
        Style::default().fg(self.assistant)
    }

    pub fn context_style(&self) -> Style {
        Style::default()
            .fg(self.context)
            .add_modifier(Modifier::ITALIC)
    }

    /// Highlighted row in a list.
    pub fn selected_style(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::REVERSED)
    }
}
