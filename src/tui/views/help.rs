use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::tui::centered_rect;

const BINDINGS: &[(&str, &[(&str, &str)])] = &[
    (
        "Navigation",
        &[
            ("j/k, ↑/↓", "Move selection"),
            ("g/G", "Jump to first/last"),
            ("PgUp/PgDn", "Move by 10 events"),
        ],
    ),
    (
        "Report",
        &[("r", "Toggle report preview"), ("c", "Copy report to clipboard")],
    ),
    (
        "Filter",
        &[
            ("/", "Filter by title, repository or kind"),
            ("Enter", "Keep filter"),
            ("Esc", "Clear filter / close overlay"),
        ],
    ),
    ("General", &[("h, F1", "Toggle this help"), ("q", "Quit")]),
];

/// Key binding overlay.
pub fn draw_help_overlay(f: &mut Frame, area: Rect) {
    let help_area = centered_rect(70, 80, area);
    f.render_widget(Clear, help_area);

    let heading = Style::default().fg(Color::Green).add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::from(Span::styled(
            "ghreport - Help",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    for (section, keys) in BINDINGS {
        lines.push(Line::from(Span::styled(format!("{section}:"), heading)));
        lines.extend(keys.iter().map(|(key, action)| Line::from(format!("  {key:<12}{action}"))));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        "Press 'h' or 'Esc' to close this help",
        Style::default().fg(Color::Gray),
    )));

    let paragraph = Paragraph::new(lines)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, help_area);
}
