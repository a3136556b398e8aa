use shared::Suggestion;

use crate::api::ApiError;
use crate::debounce::{Debouncer, TimerToken};

pub const DEBOUNCE_MS: u32 = 300;
/// Long enough for a click on a suggestion button to land before the panel
/// disappears.
pub const BLUR_DISMISS_MS: u32 = 200;
/// Counted in UTF-16 code units, the way the browser measures input length.
pub const MIN_QUERY_CHARS: usize = 3;

/// Suggestion state for one input field.
#[derive(Debug, Default)]
pub struct Autocomplete {
    debouncer: Debouncer,
    suggestions: Vec<Suggestion>,
}

impl Autocomplete {
    /// Restarts the debounce window.
    pub fn input_changed(&mut self) -> TimerToken {
        self.debouncer.schedule()
    }

    /// Returns the query to look up once the window elapsed, or `None` when the
    /// timer is stale or the query too short (which also clears the list).
    pub fn timer_fired(&mut self, token: TimerToken, text: &str) -> Option<String> {
        if !self.debouncer.fire(token) {
            return None;
        }
        let query = text.trim();
        if query.encode_utf16().count() < MIN_QUERY_CHARS {
            self.suggestions.clear();
            return None;
        }
        Some(query.to_string())
    }

    /// Applies a lookup result. Failures count as no suggestions; results of a
    /// superseded lookup are dropped.
    pub fn suggestions_fetched(&mut self, token: TimerToken, result: Result<Vec<Suggestion>, ApiError>) {
        if !self.debouncer.is_current(token) {
            log::debug!("dropping suggestions from a superseded lookup");
            return;
        }
        self.suggestions = result.unwrap_or_else(|err| {
            log::debug!("geocode lookup failed: {err}");
            Vec::new()
        });
    }

    /// Takes the chosen suggestion and closes the list.
    pub fn select(&mut self, index: usize) -> Option<Suggestion> {
        if index >= self.suggestions.len() {
            return None;
        }
        let chosen = self.suggestions.swap_remove(index);
        self.suggestions.clear();
        Some(chosen)
    }

    pub fn dismiss(&mut self) {
        self.suggestions.clear();
    }

    pub fn reset(&mut self) {
        self.debouncer.cancel();
        self.suggestions.clear();
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }
}
