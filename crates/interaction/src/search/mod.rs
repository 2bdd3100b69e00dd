//! Debounced place search.
//!
//! Keystrokes restart a debounce window; only the text present when the
//! window expires is sent to the geocoder. Results carry the sequence number
//! of the request that produced them, and anything older than the latest
//! request is dropped on arrival.

mod systems;
mod types;


pub use systems::{
    dispatch_due_search, frame_search_results, handle_search_commands, poll_search_tasks,
    sync_search_settings, PendingSearches, SEARCH_SERVICE,
};
pub use types::{SearchCommand, SearchController, SearchDispatch, SearchResultsUpdated};
