//! Main render function for the TUI.

use chrono::Utc;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use newsbot_ui::{truncate, ChatWidget, SidebarWidget, Theme};

use crate::state::{Focus, UiState};

/// Width of the history sidebar.
const SIDEBAR_WIDTH: u16 = 34;

/// Render the entire UI.
pub fn render(frame: &mut Frame, state: &UiState) {
    let area = frame.area();

    // Main layout: header, body, input, footer
    let [header_area, body_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    let [sidebar_area, chat_area] =
        Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Fill(1)])
            .areas(body_area);

    render_header(frame, header_area, state);
    render_sidebar(frame, sidebar_area, state);
    render_chat(frame, chat_area, state);
    render_input(frame, input_area, state);
    render_footer(frame, footer_area, state);
}

fn render_header(frame: &mut Frame, area: Rect, state: &UiState) {
    let session = state
        .conversation
        .as_ref()
        .map(|c| c.session_id.to_string())
        .unwrap_or_default();

    let header = Line::from(vec![
        Span::styled(
            " RAG NewsBot ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            truncate(&session, area.width.saturating_sub(14) as usize),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(header), area);
}

fn render_sidebar(frame: &mut Frame, area: Rect, state: &UiState) {
    let entries = state.sidebar_entries();
    SidebarWidget::new(&entries, Utc::now())
        .selected(Some(state.selected_history))
        .focused(state.focus == Focus::Sidebar)
        .render(frame, area);
}

fn render_chat(frame: &mut Frame, area: Rect, state: &UiState) {
    let messages = state.chat_messages();
    ChatWidget::new(&messages)
        .typing(state.is_pending())
        .render(frame, area);
}

fn render_input(frame: &mut Frame, area: Rect, state: &UiState) {
    let theme = Theme::default();
    let focused = state.focus == Focus::Input;
    let border_style = if focused {
        theme.focused_border()
    } else {
        theme.unfocused_border()
    };

    let (text, style) = if state.input.is_empty() && !state.can_submit() {
        ("Please wait...", theme.muted_style())
    } else if state.input.is_empty() {
        ("Ask about recent news...", theme.muted_style())
    } else {
        (state.input.as_str(), Style::default())
    };

    let input = Paragraph::new(Span::styled(text, style)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Message "),
    );
    frame.render_widget(input, area);

    if focused {
        let offset = u16::try_from(state.input_cursor).unwrap_or(u16::MAX);
        let x = area
            .x
            .saturating_add(1)
            .saturating_add(offset)
            .min(area.right().saturating_sub(2));
        frame.set_cursor_position(Position::new(x, area.y + 1));
    }
}

fn render_footer(frame: &mut Frame, area: Rect, state: &UiState) {
    let status = state.status_message.as_deref().unwrap_or("Ready");

    let help = " Enter: send | Ctrl+R: new chat | Tab: history | Esc: quit ";

    let footer = Line::from(vec![
        Span::styled(status, Style::default().fg(Color::Green)),
        Span::raw(" |"),
        Span::styled(help, Style::default().fg(Color::DarkGray)),
    ]);

    frame.render_widget(Paragraph::new(footer), area);
}
