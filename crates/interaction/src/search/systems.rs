//! Systems bridging the search controller to the geocoder and the map.

use std::time::Duration;

use bevy::prelude::*;
use bevy::tasks::{block_on, IoTaskPool, Task};
use geodata::{BoundingBox, GeoError, Place};

use super::types::{SearchCommand, SearchController, SearchResultsUpdated};
use crate::activity::ActivityLog;
use crate::arbiter::{PointSelected, SelectionOrigin};
use crate::config::InteractionConfig;
use crate::lookup::GeoServices;
use crate::map_view::{MapFlight, MapView};

pub const SEARCH_SERVICE: &str = "search";

struct InFlightSearch {
    seq: u64,
    query: String,
    started: Duration,
    task: Task<Result<Vec<Place>, GeoError>>,
}

#[derive(Resource, Default)]
pub struct PendingSearches {
    tasks: Vec<InFlightSearch>,
}

impl PendingSearches {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

pub fn sync_search_settings(config: Res<InteractionConfig>, mut search: ResMut<SearchController>) {
    if config.is_changed() {
        search.debounce = config.search.debounce();
        search.result_limit = config.search.result_limit;
    }
}

pub fn handle_search_commands(
    mut commands: EventReader<SearchCommand>,
    time: Res<Time>,
    mut search: ResMut<SearchController>,
    mut selected: EventWriter<PointSelected>,
) {
    let now = time.elapsed();
    for command in commands.read() {
        match command {
            SearchCommand::Input(text) => search.input_changed(text.clone(), now),
            SearchCommand::SelectResult(index) => {
                if let Some(coordinates) = search.select_result(*index) {
                    selected.send(PointSelected {
                        coordinates,
                        origin: SelectionOrigin::SearchResult,
                    });
                }
            }
            SearchCommand::ClickOutside => search.click_outside(),
            SearchCommand::Clear => search.clear(),
        }
    }
}

/// Send the debounced query, biased to the area around the map center.
pub fn dispatch_due_search(
    time: Res<Time>,
    config: Res<InteractionConfig>,
    view: Res<MapView>,
    services: Res<GeoServices>,
    mut search: ResMut<SearchController>,
    mut pending: ResMut<PendingSearches>,
    mut activity: ResMut<ActivityLog>,
) {
    let now = time.elapsed();
    let Some(dispatch) = search.take_due(now) else {
        return;
    };
    let bias = BoundingBox::around(view.center, config.search.viewbox_half_extent_deg);
    let geocoder = services.geocoder.clone();
    let query = dispatch.query.clone();

    debug!("Searching for {:?} (#{})", dispatch.query, dispatch.seq);
    activity.request(now, SEARCH_SERVICE, format!("\"{}\"", dispatch.query));
    let task = IoTaskPool::get().spawn(async move { geocoder.search(&query, Some(bias)) });
    pending.tasks.push(InFlightSearch {
        seq: dispatch.seq,
        query: dispatch.query,
        started: now,
        task,
    });
}

pub fn poll_search_tasks(
    time: Res<Time>,
    mut pending: ResMut<PendingSearches>,
    mut search: ResMut<SearchController>,
    mut activity: ResMut<ActivityLog>,
    mut updated: EventWriter<SearchResultsUpdated>,
) {
    let now = time.elapsed();
    pending.tasks.retain_mut(|in_flight| {
        let Some(result) = block_on(futures_lite::future::poll_once(&mut in_flight.task)) else {
            return true;
        };
        let took = now.saturating_sub(in_flight.started);
        match &result {
            Ok(places) => activity.response(
                now,
                SEARCH_SERVICE,
                format!("{} results for \"{}\"", places.len(), in_flight.query),
                took,
            ),
            Err(e) => {
                warn!("Search for {:?} failed: {}", in_flight.query, e);
                activity.failure(now, SEARCH_SERVICE, e.to_string(), took);
            }
        }
        if search.apply_results(in_flight.seq, result) {
            updated.send(SearchResultsUpdated {
                count: search.results.len(),
            });
        } else {
            debug!("Dropped stale results for {:?}", in_flight.query);
        }
        false
    });
}

/// Several results: fit them all on screen. One result: fly to it.
pub fn frame_search_results(
    mut updated: EventReader<SearchResultsUpdated>,
    time: Res<Time>,
    config: Res<InteractionConfig>,
    search: Res<SearchController>,
    view: Res<MapView>,
    mut flight: ResMut<MapFlight>,
) {
    if updated.read().last().is_none() {
        return;
    }
    let now = time.elapsed();
    match search.results.as_slice() {
        [] => {}
        [only] => flight.fly_to(
            &view,
            only.coordinates,
            config.overlay.selection_zoom,
            now,
            config.map.flight(),
        ),
        many => {
            let Some(bbox) = BoundingBox::from_points(many.iter().map(|p| p.coordinates)) else {
                return;
            };
            let (center, zoom) =
                view.fit_bounds(&bbox, config.search.fit_padding_px, config.search.fit_max_zoom);
            flight.fly_to(&view, center, zoom, now, config.map.flight());
        }
    }
}
