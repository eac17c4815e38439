//! Chat widget for displaying the conversation transcript.

use chrono::{DateTime, Utc};
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::theme::Theme;
use crate::utils::{format_clock, wrap_text_indented};

/// Marker shown under answers grounded in retrieved news.
pub const CONTEXT_MARKER: &str = "Contextualized answer";

/// Typing indicator shown while a reply is outstanding.
pub const TYPING_TEXT: &str = "NewsBot is typing...";

/// Role of a chat message participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

/// A single chat message.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Answer grounded in retrieved news.
    pub contextualized: bool,
    /// Inline failure entry.
    pub failed: bool,
    /// Transient placeholder (loading).
    pub placeholder: bool,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp,
            contextualized: false,
            failed: false,
            placeholder: false,
        }
    }
}

/// Transcript view with an optional typing indicator.
#[derive(Debug, Clone)]
pub struct ChatWidget<'a> {
    /// Messages to display.
    messages: &'a [ChatMessage],
    /// Show the typing indicator after the last message.
    typing: bool,
    /// Scroll offset (usize::MAX = auto-scroll to bottom).
    scroll: usize,
    focused: bool,
    title: Option<String>,
    theme: Theme,
}

impl<'a> ChatWidget<'a> {
    pub fn new(messages: &'a [ChatMessage]) -> Self {
        Self {
            messages,
            typing: false,
            scroll: usize::MAX,
            focused: false,
            title: None,
            theme: Theme::default(),
        }
    }

    /// Show the typing indicator.
    pub fn typing(mut self, typing: bool) -> Self {
        self.typing = typing;
        self
    }

    /// Set the scroll offset.
    pub fn scroll(mut self, offset: usize) -> Self {
        self.scroll = offset;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// All transcript lines for a text area `width` columns wide.
    pub fn lines(&self, width: usize) -> Vec<Line<'static>> {
        let mut all_lines: Vec<Line<'static>> = Vec::new();

        for msg in self.messages {
            let (label, style) = match msg.role {
                ChatRole::User => ("You", self.theme.user_style()),
                ChatRole::Assistant => ("NewsBot", self.theme.assistant_style()),
            };

            all_lines.push(Line::from(vec![
                Span::styled(label, style.add_modifier(Modifier::BOLD)),
                Span::styled(
                    format!(" {}", format_clock(msg.timestamp)),
                    self.theme.muted_style(),
                ),
            ]));

            let body_style = if msg.failed {
                self.theme.error_style()
            } else if msg.placeholder {
                self.theme.muted_style().add_modifier(Modifier::ITALIC)
            } else {
                Default::default()
            };
            for wrapped_line in wrap_text_indented(&msg.content, width, "  ") {
                all_lines.push(Line::from(Span::styled(wrapped_line, body_style)));
            }

            if msg.contextualized {
                all_lines.push(Line::from(Span::styled(
                    format!("  {}", CONTEXT_MARKER),
                    self.theme.context_style(),
                )));
            }

            all_lines.push(Line::from(""));
        }

        if self.typing {
            all_lines.push(Line::from(Span::styled(
                TYPING_TEXT,
                self.theme.muted_style().add_modifier(Modifier::ITALIC),
            )));
        }

        all_lines
    }

    /// Render the widget.
    pub fn render(self, frame: &mut Frame, area: Rect) {
        let border_style = if self.focused {
            self.theme.focused_border()
        } else {
            self.theme.unfocused_border()
        };

        let visible_height = area.height.saturating_sub(2) as usize;
        let text_width = area.width.saturating_sub(2) as usize;

        let all_lines = self.lines(text_width);
        let total_lines = all_lines.len();

        let max_scroll = total_lines.saturating_sub(visible_height);
        let scroll_offset = if self.scroll == usize::MAX {
            max_scroll
        } else {
            self.scroll.min(max_scroll)
        };

        let lines: Vec<Line> = all_lines
            .into_iter()
            .skip(scroll_offset)
            .take(visible_height)
            .collect();

        let title = self.title.unwrap_or_else(|| " NewsBot ".to_string());

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(title),
        );

        frame.render_widget(paragraph, area);
    }
}
