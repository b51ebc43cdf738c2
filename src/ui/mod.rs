//! UI rendering module for mangaterm
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components.

pub mod details;
pub mod help_overlay;
pub mod home;
pub mod reader;

pub use details::render as render_details;
pub use help_overlay::render as render_help_overlay;
pub use home::render as render_home;
pub use reader::render as render_reader;

use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
};

use crate::app::App;

/// Bottom status line: loading indicator, last error, or key hints
pub(crate) fn status_line(app: &App, hints: &'static str) -> Line<'static> {
    if app.is_busy() {
        return Line::from(Span::styled("Loading...", Style::default().fg(Color::Cyan)));
    }
    if let Some(message) = &app.status_message {
        return Line::from(Span::styled(message.clone(), Style::default().fg(Color::Red)));
    }
    Line::from(Span::styled(hints, Style::default().fg(Color::DarkGray)))
}
