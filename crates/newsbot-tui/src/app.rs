//! Application state and main event loop.

use std::time::Duration;

use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::DefaultTerminal;
use tokio::sync::mpsc;
use tracing::debug;

use crate::event::{BackendCommand, UiEvent};
use crate::state::{Focus, UiState};
use crate::ui;

/// Main application with UI state and channel handles.
pub struct App {
    /// Current UI state snapshot for rendering.
    state: UiState,

    /// Receiver for events from the backend.
    ui_rx: mpsc::Receiver<UiEvent>,

    /// Sender for commands to the backend.
    cmd_tx: mpsc::Sender<BackendCommand>,
}

impl App {
    /// Create a new application instance with channel handles.
    pub fn new(ui_rx: mpsc::Receiver<UiEvent>, cmd_tx: mpsc::Sender<BackendCommand>) -> Self {
        Self {
            state: UiState {
                status_message: Some("Connecting...".to_string()),
                ..UiState::default()
            },
            ui_rx,
            cmd_tx,
        }
    }

    /// Run the main event loop.
    ///
    /// This runs on the main thread and handles:
    /// - Drawing the UI
    /// - Processing keyboard input
    /// - Receiving snapshots from the backend
    pub fn run(&mut self, mut terminal: DefaultTerminal) -> std::io::Result<()> {
        loop {
            terminal.draw(|frame| ui::render(frame, &self.state))?;

            // Poll terminal events (non-blocking with short timeout)
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press && self.handle_key(key) {
                        break; // quit requested
                    }
                }
            }

            // Process backend events (non-blocking)
            while let Ok(event) = self.ui_rx.try_recv() {
                self.apply_event(event);
            }
        }

        // Send quit command to backend
        let _ = self.cmd_tx.blocking_send(BackendCommand::Quit);

        Ok(())
    }

    /// Apply an event from the backend to the UI state.
    fn apply_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Snapshot(snapshot) => {
                self.state.status_message = Some(if snapshot.hydrating {
                    "Loading history...".to_string()
                } else if snapshot.pending {
                    "Waiting for reply...".to_string()
                } else {
                    format!("Session {}", snapshot.session_id)
                });
                self.state.apply_snapshot(snapshot);
            }
        }
    }

    fn send(&self, command: BackendCommand) {
        debug!(command = ?command, "Sending command to backend");
        let _ = self.cmd_tx.blocking_send(command);
    }

    /// Handle a key press.
    ///
    /// Returns true if the app should quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return true,
            KeyCode::Char('c') if ctrl => return true,
            KeyCode::Char('r') if ctrl => {
                self.send(BackendCommand::Reset);
                return false;
            }
            KeyCode::Tab => {
                self.state.toggle_focus();
                return false;
            }
            _ => {}
        }

        match self.state.focus {
            Focus::Input => self.handle_input_key(key.code),
            Focus::Sidebar => self.handle_sidebar_key(key.code),
        }
        false
    }

    fn handle_input_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter => {
                if let Some(text) = self.state.take_input() {
                    self.send(BackendCommand::Submit(text));
                }
            }
            KeyCode::Char(c) => self.state.insert_char(c),
            KeyCode::Backspace => self.state.backspace(),
            KeyCode::Delete => self.state.delete(),
            KeyCode::Left => self.state.cursor_left(),
            KeyCode::Right => self.state.cursor_right(),
            _ => {}
        }
    }

    fn handle_sidebar_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up | KeyCode::Char('k') => self.state.select_prev_history(),
            KeyCode::Down | KeyCode::Char('j') => self.state.select_next_history(),
            KeyCode::Enter => {
                if let Some(id) = self.state.selected_history_id() {
                    self.send(BackendCommand::SelectHistory(id));
                    self.state.focus = Focus::Input;
                }
            }
            _ => {}
        }
    }
}
