use std::io;
use chrono::FixedOffset;
use crossterm::event::{poll, read, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use super::input::{apply_search_filter, move_selection, select_first, select_last};
use super::layout::main_chunks;
use super::state::TuiState;
use super::views::{draw_header, draw_help_overlay, draw_report_overlay, draw_status_bar, draw_timeline_view};
use crate::model::ActivityEvent;
use crate::util::copy_to_clipboard;

/// What the interactive view shows: the merged timeline and its rendered report.
pub struct TimelineView {
    pub scope: String,
    pub range_label: String,
    pub events: Vec<ActivityEvent>,
    pub report: String,
    pub offset: FixedOffset,
}

fn copy_report(view: &TimelineView, state: &mut TuiState) {
    match copy_to_clipboard(&view.report) {
        Ok(()) => state.set_status("Report copied to clipboard"),
        Err(err) => state.set_status(format!("Clipboard error: {err}")),
    }
}

pub fn run(view: TimelineView) -> io::Result<()> {
    enable_raw_mode()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    let mut state = TuiState::new(&view.events);
    terminal.clear()?;

    loop {
        state.expire_status();
        let draw_result = terminal.draw(|f| {
            let size = f.size();
            let (header, body, status) = main_chunks(size);

            draw_header(
                f,
                header,
                &view.scope,
                &view.range_label,
                view.events.len(),
                state.filtered_indices.len(),
            );
            draw_timeline_view(f, body, &view.events, &state, &view.offset);
            draw_status_bar(f, status, &state);

            if state.show_report {
                draw_report_overlay(f, size, &view.report);
            }
            if state.show_help {
                draw_help_overlay(f, size);
            }
        });

        if let Err(e) = draw_result {
            eprintln!("TUI draw error: {}", e);
        }

        if poll(std::time::Duration::from_millis(200))? {
            if let Event::Key(key_event) = read()? {
                if key_event.kind != KeyEventKind::Press {
                    continue;
                }
                if state.search_mode {
                    match key_event.code {
                        KeyCode::Esc => {
                            state.search_mode = false;
                            state.search_query.clear();
                            apply_search_filter(&view.events, &mut state);
                        }
                        KeyCode::Enter => {
                            state.search_mode = false;
                            apply_search_filter(&view.events, &mut state);
                        }
                        KeyCode::Backspace => {
                            state.search_query.pop();
                            apply_search_filter(&view.events, &mut state);
                        }
                        KeyCode::Char(c) => {
                            state.search_query.push(c);
                            apply_search_filter(&view.events, &mut state);
                        }
                        _ => {}
                    }
                } else {
                    match key_event.code {
                        KeyCode::Char('q') => break,
                        KeyCode::Char('h') | KeyCode::F(1) => state.show_help = !state.show_help,
                        KeyCode::Esc => {
                            if state.show_help || state.show_report {
                                state.show_help = false;
                                state.show_report = false;
                            } else if !state.search_query.is_empty() {
                                state.search_query.clear();
                                apply_search_filter(&view.events, &mut state);
                            }
                        }
                        KeyCode::Char('/') => {
                            state.search_mode = true;
                            state.search_query.clear();
                        }
                        KeyCode::Char('r') => state.show_report = !state.show_report,
                        KeyCode::Char('c') => copy_report(&view, &mut state),
                        KeyCode::Up | KeyCode::Char('k') => move_selection(&mut state, -1),
                        KeyCode::Down | KeyCode::Char('j') => move_selection(&mut state, 1),
                        KeyCode::Home | KeyCode::Char('g') => select_first(&mut state),
                        KeyCode::End | KeyCode::Char('G') => select_last(&mut state),
                        KeyCode::PageUp => move_selection(&mut state, -10),
                        KeyCode::PageDown => move_selection(&mut state, 10),
                        _ => {}
                    }
                }
            }
        }
    }

    terminal.clear()?;
    disable_raw_mode()?;
    Ok(())
}
