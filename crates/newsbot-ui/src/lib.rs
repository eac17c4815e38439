//! Terminal widgets for the NewsBot client.
//!
//! The crate is organized into:
//! - `widgets` - ratatui widgets for the transcript and the history sidebar
//! - `theme` - Colors and styles
//! - `utils` - Text wrapping, truncation and time formatting
//!
//! Widgets are data-agnostic: callers map their domain types onto
//! [`ChatMessage`] and [`SidebarEntry`].

pub mod theme;
pub mod utils;
pub mod widgets;

pub use theme::Theme;
pub use utils::{format_clock, format_relative_time, truncate, wrap_text, wrap_text_indented};
pub use widgets::chat::{ChatMessage, ChatRole, ChatWidget, CONTEXT_MARKER, TYPING_TEXT};
pub use widgets::sidebar::{SidebarEntry, SidebarWidget};
