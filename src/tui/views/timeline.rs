use chrono::FixedOffset;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};
use ratatui::Frame;

use super::super::state::TuiState;
use super::{header_cell, truncate};
use crate::model::{ActivityEvent, ActivityKind};
use crate::util::format_day;

fn kind_cell(kind: ActivityKind) -> Cell<'static> {
    let (label, color) = match kind {
        ActivityKind::IssueCreated => ("ISSUE", Color::Yellow),
        ActivityKind::PRCreated => ("PR", Color::Cyan),
        ActivityKind::PRMerged => ("MERGED", Color::Green),
        ActivityKind::IssueAssigned => ("ASSIGN", Color::Magenta),
        ActivityKind::CommitCreated => ("COMMIT", Color::Blue),
    };
    Cell::from(label).style(Style::default().fg(color).add_modifier(Modifier::BOLD))
}

pub fn draw_header(f: &mut Frame, area: Rect, scope: &str, range_label: &str, total: usize, shown: usize) {
    let line = Line::from(vec![
        Span::styled(scope.to_string(), Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(range_label.to_string(), Style::default().fg(Color::Green)),
        Span::raw(format!("  {shown}/{total} events")),
    ]);
    let header = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("ghreport"));
    f.render_widget(header, area);
}

/// Render the filtered timeline as a table with the selected row highlighted.
pub fn draw_timeline_view(
    f: &mut Frame,
    area: Rect,
    events: &[ActivityEvent],
    state: &TuiState,
    offset: &FixedOffset,
) {
    if state.filtered_indices.is_empty() {
        let message = if events.is_empty() {
            "No activity in range"
        } else {
            "No events match the filter"
        };
        let placeholder = Paragraph::new(message).block(Block::default().title("Timeline").borders(Borders::ALL));
        f.render_widget(placeholder, area);
        return;
    }

    let rows: Vec<Row> = state
        .filtered_indices
        .iter()
        .filter_map(|&i| events.get(i).map(|ev| (i, ev)))
        .map(|(i, ev)| {
            let is_selected = i == state.selected;
            let reference = format!("{}#{}", ev.repository.name, ev.identifier);
            let title_style = if is_selected {
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            Row::new(vec![
                kind_cell(ev.kind),
                Cell::from(format_day(ev.ordering_date(offset))).style(Style::default().fg(Color::Green)),
                Cell::from(truncate(&reference, 28)).style(Style::default().fg(Color::Cyan)),
                Cell::from(truncate(&ev.title, 80)).style(title_style),
            ])
        })
        .collect();

    let mut table_state = TableState::default();
    let pos_in_filtered = state
        .filtered_indices
        .iter()
        .position(|&i| i == state.selected)
        .unwrap_or(0);
    table_state.select(Some(pos_in_filtered));

    let table = Table::new(
        rows,
        [
            Constraint::Length(7),
            Constraint::Length(11),
            Constraint::Length(28),
            Constraint::Min(20),
        ],
    )
    .header(Row::new([
        header_cell("Kind", Color::Yellow),
        header_cell("Date", Color::Yellow),
        header_cell("Reference", Color::Yellow),
        header_cell("Title", Color::Yellow),
    ]))
    .highlight_style(Style::default().bg(Color::DarkGray))
    .highlight_symbol("► ")
    .block(Block::default().title("Timeline").borders(Borders::ALL));

    f.render_stateful_widget(table, area, &mut table_state);
}

pub fn draw_status_bar(f: &mut Frame, area: Rect, state: &TuiState) {
    let line = if state.search_mode {
        Line::from(vec![
            Span::styled("/", Style::default().fg(Color::Yellow)),
            Span::raw(state.search_query.clone()),
        ])
    } else if let Some((message, _)) = &state.status_message {
        Line::from(Span::styled(message.clone(), Style::default().fg(Color::Green)))
    } else {
        Line::from(Span::styled(
            "q quit  / filter  r report  c copy  h help",
            Style::default().fg(Color::Gray),
        ))
    };
    f.render_widget(Paragraph::new(line), area);
}
