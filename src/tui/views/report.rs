use ratatui::layout::Rect;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::tui::centered_rect;

/// Modal preview of the rendered report text.
pub fn draw_report_overlay(f: &mut Frame, area: Rect, report: &str) {
    let report_area = centered_rect(80, 85, area);
    f.render_widget(Clear, report_area);

    let paragraph = Paragraph::new(report.to_string())
        .block(
            Block::default()
                .title("Report (c copy, r close)")
                .borders(Borders::ALL),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, report_area);
}
