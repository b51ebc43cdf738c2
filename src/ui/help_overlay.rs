//! Key binding reference drawn over the current view

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Grouped key bindings: (group, [(keys, action)])
const BINDINGS: &[(&str, &[(&str, &str)])] = &[
    (
        "Browsing",
        &[
            ("↑/k ↓/j", "move selection"),
            ("Enter", "open manga or chapter"),
            ("/", "search (Enter submits now)"),
            ("1 2 3", "popular / latest / manhwa"),
            ("r", "reload list, or read first chapter"),
        ],
    ),
    (
        "Reading",
        &[
            ("←/h →/l", "previous / next chapter"),
            ("↑ ↓", "scroll pages"),
            ("g", "back to first page"),
        ],
    ),
    (
        "Anywhere",
        &[
            ("Esc", "go back"),
            ("?", "toggle this help"),
            ("q", "quit"),
        ],
    ),
];

const KEY_COLUMN: usize = 10;
const MAX_WIDTH: u16 = 52;

fn help_lines() -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (i, (group, bindings)) in BINDINGS.iter().enumerate() {
        if i > 0 {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            *group,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )));
        lines.extend(bindings.iter().map(|(keys, action)| {
            Line::from(vec![
                Span::styled(
                    format!(" {:<width$}", keys, width = KEY_COLUMN),
                    Style::default().fg(Color::Yellow),
                ),
                Span::raw(*action),
            ])
        }));
    }
    lines
}

/// Rect of at most `width` x `height` centered in `area`, shrunk to fit
fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Renders the help overlay on top of the current view
pub fn render(frame: &mut Frame) {
    let lines = help_lines();
    // Content plus the two border rows
    let height = u16::try_from(lines.len() + 2).unwrap_or(u16::MAX);
    let area = popup_area(frame.area(), MAX_WIDTH, height);

    let block = Block::default()
        .title(" Help ")
        .title_bottom(Line::from(" Esc or ? to close ").right_aligned())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
