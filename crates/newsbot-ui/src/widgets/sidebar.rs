//! History sidebar listing past conversations.

use chrono::{DateTime, Utc};
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};
use ratatui::Frame;

use crate::theme::Theme;
use crate::utils::{format_relative_time, truncate};

/// One row of the sidebar.
#[derive(Debug, Clone)]
pub struct SidebarEntry {
    pub title: String,
    pub preview: String,
    pub timestamp: DateTime<Utc>,
    /// Entry of the conversation currently shown.
    pub active: bool,
}

/// List of conversation summaries, most recent first.
#[derive(Debug, Clone)]
pub struct SidebarWidget<'a> {
    entries: &'a [SidebarEntry],
    /// Highlighted row.
    selected: Option<usize>,
    focused: bool,
    /// Reference time for "5m ago" labels.
    now: DateTime<Utc>,
    theme: Theme,
}

impl<'a> SidebarWidget<'a> {
    pub fn new(entries: &'a [SidebarEntry], now: DateTime<Utc>) -> Self {
        Self {
            entries,
            selected: None,
            focused: false,
            now,
            theme: Theme::default(),
        }
    }

    pub fn selected(mut self, selected: Option<usize>) -> Self {
        self.selected = selected;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Lines of one entry: title, then age and preview.
    pub fn entry_lines(&self, entry: &SidebarEntry, width: usize) -> Vec<Line<'static>> {
        let (marker, title_style) = if entry.active {
            ("* ", self.theme.bold().fg(self.theme.accent))
        } else {
            ("  ", self.theme.bold())
        };
        let age = format_relative_time(entry.timestamp, self.now);
        let preview_width = width.saturating_sub(age.chars().count() + 5);

        vec![
            Line::from(vec![
                Span::raw(marker),
                Span::styled(truncate(&entry.title, width.saturating_sub(2)), title_style),
            ]),
            Line::from(vec![
                Span::styled(format!("  {}", age), self.theme.muted_style()),
                Span::styled(
                    format!(" - {}", truncate(&entry.preview, preview_width)),
                    self.theme.muted_style(),
                ),
            ]),
        ]
    }

    /// Render the widget.
    pub fn render(self, frame: &mut Frame, area: Rect) {
        let border_style = if self.focused {
            self.theme.focused_border()
        } else {
            self.theme.unfocused_border()
        };
        let text_width = area.width.saturating_sub(2) as usize;
        let title = format!(" History ({}) ", self.entries.len());
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title);

        if self.entries.is_empty() {
            let empty = List::new(vec![ListItem::new(Line::from(Span::styled(
                "  No conversations yet",
                self.theme.muted_style(),
            )))])
            .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let items: Vec<ListItem> = self
            .entries
            .iter()
            .map(|entry| ListItem::new(self.entry_lines(entry, text_width)))
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(self.theme.selected_style());

        let mut state = ListState::default();
        if self.focused {
            state.select(self.selected);
        }
        frame.render_stateful_widget(list, area, &mut state);
    }
}
