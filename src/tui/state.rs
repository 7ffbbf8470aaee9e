use crate::model::ActivityEvent;
use std::time::Instant;

pub struct TuiState {
    pub selected: usize,
    pub show_help: bool,
    pub show_report: bool,
    pub search_query: String,
    pub search_mode: bool,
    pub filtered_indices: Vec<usize>,
    pub status_message: Option<(String, Instant)>,
}

impl TuiState {
    pub fn new(events: &[ActivityEvent]) -> Self {
        Self {
            filtered_indices: (0..events.len()).collect(),
            ..Self::default()
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    /// Drops the status line once it has been visible for a few seconds.
    pub fn expire_status(&mut self) {
        if let Some((_, at)) = &self.status_message {
            if at.elapsed().as_secs() >= 3 {
                self.status_message = None;
            }
        }
    }
}

impl Default for TuiState {
    fn default() -> Self {
        Self {
            selected: 0,
            show_help: false,
            show_report: false,
            search_query: String::new(),
            search_mode: false,
            filtered_indices: Vec::new(),
            status_message: None,
        }
    }
}
