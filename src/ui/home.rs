//! Home screen rendering
//!
//! Shows the search box, the feed selector and the current manga list
//! (feed or search results) with the selected title highlighted.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::status_line;
use crate::app::App;
use crate::cli::Feed;
use crate::data::Manga;

const HINTS: &str = "↑↓ move  Enter open  / search  1-3 feed  r reload  ? help  q quit";

/// Badge text and color for a publication status
fn status_badge(status: Option<&str>) -> Option<(&'static str, Color)> {
    match status? {
        "ongoing" => Some(("ONGOING", Color::Green)),
        "completed" => Some(("COMPLETED", Color::Blue)),
        "hiatus" => Some(("HIATUS", Color::Yellow)),
        "cancelled" => Some(("CANCELLED", Color::Red)),
        _ => None,
    }
}

/// Renders the home screen
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search box
            Constraint::Min(3),    // Feeds + list
            Constraint::Length(1), // Status line
        ])
        .split(area);

    render_search_box(frame, app, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(18), Constraint::Min(20)])
        .split(chunks[1]);

    render_feeds(frame, app, body[0]);
    render_list(frame, app, body[1]);

    frame.render_widget(Paragraph::new(status_line(app, HINTS)), chunks[2]);
}

fn render_search_box(frame: &mut Frame, app: &App, area: Rect) {
    let border_color = if app.search_focused {
        Color::Yellow
    } else {
        Color::DarkGray
    };

    let content = if app.search_input.is_empty() && !app.search_focused {
        Span::styled("Search manga...", Style::default().fg(Color::DarkGray))
    } else if app.search_focused {
        Span::raw(format!("{}_", app.search_input))
    } else {
        Span::raw(app.search_input.clone())
    };

    let block = Block::default()
        .title(Span::styled(
            " mangaterm ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    frame.render_widget(Paragraph::new(Line::from(content)).block(block), area);
}

fn render_feeds(frame: &mut Frame, app: &App, area: Rect) {
    let feeds = [
        ("1", "Popular", Feed::Popular),
        ("2", "Latest", Feed::Latest),
        ("3", "Manhwa", Feed::Manhwa),
    ];

    let mut lines: Vec<Line> = feeds
        .iter()
        .map(|(key, label, feed)| {
            // A feed is only highlighted while its list is on screen
            let active = *feed == app.feed && app.active_search.is_none();
            let style = if active {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(vec![
                Span::styled(format!("{} ", key), Style::default().fg(Color::Yellow)),
                Span::styled(format!("{:<10}", label), style),
            ])
        })
        .collect();

    if let Some(refreshed) = app.last_refresh {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Updated {}", refreshed.format("%H:%M")),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let block = Block::default().title(" Feeds ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_list(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", app.list_heading()),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.manga_list.is_empty() {
        let message = if app.is_busy() {
            "Loading...".to_string()
        } else {
            app.empty_list_message()
        };
        frame.render_widget(
            Paragraph::new(Span::styled(message, Style::default().fg(Color::DarkGray))),
            inner,
        );
        return;
    }

    // Keep the selection in view
    let visible = inner.height.max(1) as usize;
    let offset = app.selected_index.saturating_sub(visible - 1);

    let lines: Vec<Line> = app
        .manga_list
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(i, manga)| list_line(manga, i == app.selected_index))
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn list_line(manga: &Manga, selected: bool) -> Line<'static> {
    let (cursor, title_style) = if selected {
        (
            "▸ ",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        ("  ", Style::default().fg(Color::White))
    };

    let mut spans = vec![
        Span::styled(cursor, title_style),
        Span::styled(manga.display_title(), title_style),
    ];
    if let Some((badge, color)) = status_badge(manga.attributes.status.as_deref()) {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(format!("[{}]", badge), Style::default().fg(color)));
    }
    Line::from(spans)
}
