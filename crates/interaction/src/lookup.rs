//! Resolves the feature behind a selected point on the IO task pool.
//!
//! Each [`PointSelected`] takes a ticket from the overlay controller and
//! spawns one task. When the task finishes it becomes a [`SelectionEvent`];
//! a collaborator that fails only makes the feature absent.

use std::sync::Arc;
use std::time::Duration;

use bevy::prelude::*;
use bevy::tasks::{block_on, IoTaskPool, Task};
use chrono::{DateTime, Utc};
use geodata::nearby::nearest;
use geodata::{
    BoundingBox, Coordinates, Feature, GeoError, Geocoder, NearbyFeatureSource, Place, UserId,
    WarningStore,
};

use crate::activity::ActivityLog;
use crate::arbiter::PointSelected;
use crate::config::InteractionConfig;
use crate::overlay::{OverlayController, SelectionTicket};
use crate::session::CurrentSession;

pub const LOOKUP_SERVICE: &str = "lookup";

/// The external collaborators, shared with background tasks.
#[derive(Resource, Clone)]
pub struct GeoServices {
    pub geocoder: Arc<dyn Geocoder>,
    pub nearby: Arc<dyn NearbyFeatureSource>,
    pub warnings: Arc<dyn WarningStore>,
}

impl GeoServices {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        nearby: Arc<dyn NearbyFeatureSource>,
        warnings: Arc<dyn WarningStore>,
    ) -> Self {
        Self {
            geocoder,
            nearby,
            warnings,
        }
    }

    /// Collaborators that answer every query with nothing.
    pub fn offline() -> Self {
        let offline = Arc::new(Offline);
        Self {
            geocoder: offline.clone(),
            nearby: offline.clone(),
            warnings: offline,
        }
    }
}

struct Offline;

impl Geocoder for Offline {
    fn search(&self, _text: &str, _bias: Option<BoundingBox>) -> Result<Vec<Place>, GeoError> {
        Ok(Vec::new())
    }

    fn reverse(&self, _at: Coordinates) -> Result<Option<Place>, GeoError> {
        Ok(None)
    }
}

impl NearbyFeatureSource for Offline {
    fn query_bounding_box(&self, _center: Coordinates, _half_extent_deg: f64) -> Vec<Feature> {
        Vec::new()
    }
}

impl WarningStore for Offline {
    fn warnings_near(
        &self,
        _owner: &UserId,
        _center: Coordinates,
        _half_extent_deg: f64,
        _now: DateTime<Utc>,
    ) -> Result<Vec<Feature>, GeoError> {
        Ok(Vec::new())
    }

    fn get(&self, _owner: &UserId, _id: &str) -> Result<Option<Feature>, GeoError> {
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// What each source found for one point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LookupOutcome {
    pub external: Option<Feature>,
    pub user: Option<Feature>,
}

impl LookupOutcome {
    /// The user's own warning takes precedence over map data.
    pub fn preferred(self) -> Option<Feature> {
        self.user.or(self.external)
    }
}

#[derive(Debug, Default)]
pub struct LookupReport {
    pub outcome: LookupOutcome,
    pub failures: Vec<String>,
}

/// Fill an address-less external feature from reverse geocoding.
fn fill_address(feature: &mut Feature, geocoder: &dyn Geocoder) -> Result<(), GeoError> {
    if feature.address.is_some() {
        return Ok(());
    }
    if let Some(place) = geocoder.reverse(feature.coordinates)? {
        feature.address = place
            .address
            .as_ref()
            .and_then(|a| a.summary())
            .or_else(|| Some(place.display_name).filter(|n| !n.is_empty()));
    }
    Ok(())
}

/// Query every collaborator for `at`. Blocking; runs inside a task.
pub fn resolve_point(
    services: &GeoServices,
    owner: Option<&UserId>,
    at: Coordinates,
    half_extent_deg: f64,
    now: DateTime<Utc>,
) -> LookupReport {
    let mut report = LookupReport::default();

    let mut external = nearest(at, services.nearby.query_bounding_box(at, half_extent_deg));
    if let Some(feature) = external.as_mut() {
        if let Err(e) = fill_address(feature, services.geocoder.as_ref()) {
            warn!("Reverse geocoding for {} failed: {}", feature.id, e);
            report.failures.push(format!("reverse geocode: {e}"));
        }
    }
    report.outcome.external = external;

    if let Some(owner) = owner {
        match services.warnings.warnings_near(owner, at, half_extent_deg, now) {
            Ok(found) => report.outcome.user = nearest(at, found),
            Err(e) => {
                warn!("Warning lookup failed: {}", e);
                report.failures.push(format!("warnings: {e}"));
            }
        }
    }
    report
}

// ---------------------------------------------------------------------------
// Bevy bridge
// ---------------------------------------------------------------------------

/// A resolved selection, ready for the overlay controller.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct SelectionEvent {
    pub ticket: SelectionTicket,
    pub coordinates: Coordinates,
    pub feature: Option<Feature>,
}

struct InFlightLookup {
    ticket: SelectionTicket,
    coordinates: Coordinates,
    started: Duration,
    task: Task<LookupReport>,
}

#[derive(Resource, Default)]
pub struct PendingLookups {
    tasks: Vec<InFlightLookup>,
}

impl PendingLookups {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[allow(clippy::too_many_arguments)]
pub fn spawn_feature_lookups(
    mut selected: EventReader<PointSelected>,
    time: Res<Time>,
    config: Res<InteractionConfig>,
    services: Res<GeoServices>,
    session: Res<CurrentSession>,
    mut overlay: ResMut<OverlayController>,
    mut activity: ResMut<ActivityLog>,
    mut pending: ResMut<PendingLookups>,
) {
    let pool = IoTaskPool::get();
    for event in selected.read() {
        let ticket = overlay.issue_ticket();
        let at = event.coordinates;
        let owner = session.uid().cloned();
        let half_extent = config.lookup.nearby_half_extent_deg;
        let services = services.clone();
        let now = Utc::now();

        activity.request(
            time.elapsed(),
            LOOKUP_SERVICE,
            format!("features near {} ({:?})", at.format_fixed(), event.origin),
        );
        let task = pool.spawn(async move { resolve_point(&services, owner.as_ref(), at, half_extent, now) });
        pending.tasks.push(InFlightLookup {
            ticket,
            coordinates: at,
            started: time.elapsed(),
            task,
        });
    }
}

pub fn poll_feature_lookups(
    time: Res<Time>,
    mut pending: ResMut<PendingLookups>,
    mut activity: ResMut<ActivityLog>,
    mut resolved: EventWriter<SelectionEvent>,
) {
    let now = time.elapsed();
    pending.tasks.retain_mut(|lookup| {
        let Some(report) = block_on(futures_lite::future::poll_once(&mut lookup.task)) else {
            return true;
        };
        let took = now.saturating_sub(lookup.started);
        for failure in &report.failures {
            activity.failure(now, LOOKUP_SERVICE, failure.clone(), took);
        }
        let feature = report.outcome.preferred();
        let found = match &feature {
            Some(f) => format!("{} {}", f.kind.label(), f.id),
            None => "nothing".to_string(),
        };
        activity.response(
            now,
            LOOKUP_SERVICE,
            format!("{} at {}", found, lookup.coordinates.format_fixed()),
            took,
        );
        resolved.send(SelectionEvent {
            ticket: lookup.ticket,
            coordinates: lookup.coordinates,
            feature,
        });
        false
    });
}
