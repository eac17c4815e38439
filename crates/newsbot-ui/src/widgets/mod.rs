//! Ratatui widgets.

pub mod chat;
pub mod sidebar;
