//! Search state machine and its events.

use std::time::Duration;

use bevy::prelude::*;
use geodata::{Coordinates, GeoError, Place};

use crate::config::SearchConfig;

/// A query whose debounce window has expired and should be sent now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchDispatch {
    pub seq: u64,
    pub query: String,
}

#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub enum SearchCommand {
    /// The text field changed.
    Input(String),
    /// A dropdown row was clicked.
    SelectResult(usize),
    /// A click landed outside the search bar and its dropdown.
    ClickOutside,
    Clear,
}

/// Sent whenever a fresh result list (possibly empty) has been applied.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResultsUpdated {
    pub count: usize,
}

#[derive(Resource, Debug)]
pub struct SearchController {
    pub query: String,
    pub results: Vec<Place>,
    pub dropdown_open: bool,
    pub searching: bool,
    /// Last geocoder failure, for the debug panel. The search bar itself
    /// only ever says "No results found".
    pub last_error: Option<String>,
    deadline: Option<Duration>,
    issued: u64,
    pub debounce: Duration,
    pub result_limit: usize,
}

impl Default for SearchController {
    fn default() -> Self {
        Self::new(&SearchConfig::default())
    }
}

impl SearchController {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            query: String::new(),
            results: Vec::new(),
            dropdown_open: false,
            searching: false,
            last_error: None,
            deadline: None,
            issued: 0,
            debounce: config.debounce(),
            result_limit: config.result_limit,
        }
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Restart the debounce window for `text`. Blank text clears everything
    /// at once and never reaches the geocoder.
    pub fn input_changed(&mut self, text: impl Into<String>, now: Duration) {
        self.query = text.into();
        if self.query.trim().is_empty() {
            self.reset_results();
            return;
        }
        self.deadline = Some(now + self.debounce);
    }

    /// The query to send, once its window has passed. Issuing it makes any
    /// request still in flight stale.
    pub fn take_due(&mut self, now: Duration) -> Option<SearchDispatch> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }
        self.deadline = None;
        self.issued += 1;
        self.searching = true;
        Some(SearchDispatch {
            seq: self.issued,
            query: self.query.trim().to_string(),
        })
    }

    /// Store the answer to request `seq`. Returns false for a superseded
    /// request. Failures leave an empty list behind.
    pub fn apply_results(&mut self, seq: u64, result: Result<Vec<Place>, GeoError>) -> bool {
        if seq != self.issued {
            return false;
        }
        self.searching = false;
        self.dropdown_open = true;
        match result {
            Ok(mut places) => {
                places.truncate(self.result_limit);
                self.results = places;
                self.last_error = None;
            }
            Err(e) => {
                self.results.clear();
                self.last_error = Some(e.to_string());
            }
        }
        true
    }

    /// Put the chosen result's name in the field and return where it is.
    /// The dropdown stays open and no new search is scheduled.
    pub fn select_result(&mut self, index: usize) -> Option<Coordinates> {
        let place = self.results.get(index)?;
        let coordinates = place.coordinates;
        self.query = place.display_name.clone();
        self.deadline = None;
        Some(coordinates)
    }

    pub fn click_outside(&mut self) {
        self.dropdown_open = false;
    }

    pub fn clear(&mut self) {
        self.query.clear();
        self.reset_results();
    }

    fn reset_results(&mut self) {
        self.deadline = None;
        // Invalidate whatever is in flight.
        self.issued += 1;
        self.searching = false;
        self.results.clear();
        self.dropdown_open = false;
        self.last_error = None;
    }

    pub fn is_current(&self, seq: u64) -> bool {
        seq == self.issued
    }

    /// The dropdown has nothing to list for a finished, non-empty query.
    pub fn shows_no_results(&self) -> bool {
        self.dropdown_open && self.results.is_empty() && !self.query.is_empty() && !self.searching
    }
}
