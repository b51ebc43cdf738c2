//! Manga details screen rendering
//!
//! Shows the title, publication status, cover link, a truncated description
//! and the first chapters of the selected manga.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::status_line;
use crate::app::{App, DetailsView, DESCRIPTION_LIMIT};

const HINTS: &str = "↑↓ chapter  Enter read  r read first  Esc back  ? help  q quit";

/// Renders the details screen for the loaded manga
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1)])
        .split(area);

    match &app.details {
        Some(details) => render_details(frame, details, app.chapter_index, chunks[0]),
        None => {
            let block = Block::default().borders(Borders::ALL);
            frame.render_widget(
                Paragraph::new("Loading...")
                    .style(Style::default().fg(Color::Cyan))
                    .block(block),
                chunks[0],
            );
        }
    }

    frame.render_widget(Paragraph::new(status_line(app, HINTS)), chunks[1]);
}

fn render_details(frame: &mut Frame, details: &DetailsView, selected: usize, area: Rect) {
    let manga = &details.manga;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            format!(" {} ", manga.display_title()),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),      // Status + cover
            Constraint::Percentage(45), // Description
            Constraint::Min(3),         // Chapters
        ])
        .split(inner);

    let status = manga.attributes.status.as_deref().unwrap_or("unknown");
    let cover = manga
        .cover_url()
        .unwrap_or_else(|| "no cover available".to_string());
    let info = vec![
        Line::from(vec![
            Span::styled("Status: ", Style::default().fg(Color::Gray)),
            Span::styled(status.to_string(), Style::default().fg(Color::Yellow)),
        ]),
        Line::from(vec![
            Span::styled("Cover:  ", Style::default().fg(Color::Gray)),
            Span::styled(cover, Style::default().fg(Color::DarkGray)),
        ]),
    ];
    frame.render_widget(Paragraph::new(info), sections[0]);

    frame.render_widget(
        Paragraph::new(manga.description_en(DESCRIPTION_LIMIT))
            .style(Style::default().fg(Color::Gray))
            .wrap(Wrap { trim: true }),
        sections[1],
    );

    render_chapters(frame, details, selected, sections[2]);
}

fn render_chapters(frame: &mut Frame, details: &DetailsView, selected: usize, area: Rect) {
    let block = Block::default().title(" Chapters ").borders(Borders::TOP);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if details.chapters.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "No English chapters available",
                Style::default().fg(Color::DarkGray),
            )),
            inner,
        );
        return;
    }

    let visible = inner.height.max(1) as usize;
    let offset = selected.saturating_sub(visible - 1);

    let lines: Vec<Line> = details
        .chapters
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(i, chapter)| {
            let mut label = chapter.label();
            if let Some(title) = chapter.attributes.title.as_deref().filter(|t| !t.is_empty()) {
                label = format!("{}: {}", label, title);
            }
            if i == selected {
                Line::from(Span::styled(
                    format!("▸ {}", label),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(Span::styled(
                    format!("  {}", label),
                    Style::default().fg(Color::LightBlue),
                ))
            }
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}
