//! Chapter reader rendering
//!
//! A terminal cannot show the page images, so the reader lists the page URLs
//! in reading order together with the chapter navigation state.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::status_line;
use crate::app::App;
use crate::reader::ReaderPage;

const HINTS: &str = "← prev  → next  ↑↓ scroll  Esc back  ? help  q quit";

/// Renders the reader for the loaded chapter
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(3),    // Pages
            Constraint::Length(1), // Status line
        ])
        .split(area);

    match &app.reader {
        Some(page) => {
            render_header(frame, page, chunks[0]);
            render_pages(frame, page, app.reader_scroll, chunks[1]);
        }
        None => {
            frame.render_widget(
                Paragraph::new("Loading chapter...")
                    .style(Style::default().fg(Color::Cyan))
                    .alignment(Alignment::Center),
                chunks[1],
            );
        }
    }

    frame.render_widget(Paragraph::new(status_line(app, HINTS)), chunks[2]);
}

fn nav_span(label: &'static str, enabled: bool) -> Span<'static> {
    if enabled {
        Span::styled(label, Style::default().fg(Color::Yellow))
    } else {
        Span::styled(label, Style::default().fg(Color::DarkGray))
    }
}

fn render_header(frame: &mut Frame, page: &ReaderPage, area: Rect) {
    let position = match page.nav.current_index() {
        Some(index) => format!("  ({}/{})", index + 1, page.nav.chapters().len()),
        None => String::new(),
    };

    let line = Line::from(vec![
        nav_span("← prev", page.nav.previous().is_some()),
        Span::raw("   "),
        Span::styled(
            page.title(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(position, Style::default().fg(Color::Gray)),
        Span::raw("   "),
        nav_span("next →", page.nav.next().is_some()),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(
        Paragraph::new(line).alignment(Alignment::Center).block(block),
        area,
    );
}

fn render_pages(frame: &mut Frame, page: &ReaderPage, scroll: u16, area: Rect) {
    let block = Block::default()
        .title(format!(" {} pages ", page.pages.len()))
        .borders(Borders::ALL);

    if page.pages.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "This chapter has no pages",
                Style::default().fg(Color::DarkGray),
            ))
            .block(block),
            area,
        );
        return;
    }

    let lines: Vec<Line> = page
        .pages
        .iter()
        .enumerate()
        .map(|(i, url)| {
            Line::from(vec![
                Span::styled(format!("{:>4}  ", i + 1), Style::default().fg(Color::Yellow)),
                Span::raw(url.clone()),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block).scroll((scroll, 0)), area);
}
