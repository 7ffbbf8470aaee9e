use super::TuiState;
use crate::model::ActivityEvent;

pub fn matches_query(ev: &ActivityEvent, query: &str) -> bool {
    ev.title.to_lowercase().contains(query)
        || ev.repository.full_name().to_lowercase().contains(query)
        || ev.kind.as_str().contains(query)
        || ev.identifier.to_lowercase().contains(query)
}

pub fn apply_search_filter(events: &[ActivityEvent], state: &mut TuiState) {
    if state.search_query.is_empty() {
        state.filtered_indices = (0..events.len()).collect();
    } else {
        let query = state.search_query.to_lowercase();
        state.filtered_indices = events
            .iter()
            .enumerate()
            .filter(|(_, ev)| matches_query(ev, &query))
            .map(|(i, _)| i)
            .collect();
    }

    ensure_selection_in_filtered(state);
}

pub fn ensure_selection_in_filtered(state: &mut TuiState) {
    if state.filtered_indices.is_empty() {
        return;
    }

    if !state.filtered_indices.contains(&state.selected) {
        state.selected = state.filtered_indices[0];
    }
}

/// Moves the selection by `delta` rows within the filtered list, clamped at both ends.
pub fn move_selection(state: &mut TuiState, delta: isize) {
    let Some(last) = state.filtered_indices.len().checked_sub(1) else {
        return;
    };
    let pos = state
        .filtered_indices
        .iter()
        .position(|&i| i == state.selected)
        .unwrap_or(0);
    let target = pos.saturating_add_signed(delta).min(last);
    state.selected = state.filtered_indices[target];
}

pub fn select_first(state: &mut TuiState) {
    if let Some(&first) = state.filtered_indices.first() {
        state.selected = first;
    }
}

pub fn select_last(state: &mut TuiState) {
    if let Some(&last) = state.filtered_indices.last() {
        state.selected = last;
    }
}
