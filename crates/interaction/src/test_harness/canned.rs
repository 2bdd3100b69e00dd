//! Canned collaborators for `TestMap`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use geodata::{
    BoundingBox, Coordinates, Feature, FeatureKind, FeatureSource, GeoError, Geocoder,
    NearbyFeatureSource, Place, Severity, UserId, WarningRecord, WarningStore,
};

/// An OSM-style point of interest.
pub fn poi(id: &str, name: &str, at: Coordinates) -> Feature {
    let mut tags = BTreeMap::new();
    tags.insert("amenity".to_string(), "restaurant".to_string());
    tags.insert("name".to_string(), name.to_string());
    Feature {
        id: id.into(),
        kind: FeatureKind::from_tags(&tags),
        name: Some(name.into()),
        address: Some("1 Test Street".into()),
        coordinates: at,
        tags,
        source: FeatureSource::External {
            version: 3,
            changeset: Some(42),
            last_editor: Some("mapper".into()),
        },
    }
}

pub fn warning(owner: &str, id: &str, at: Coordinates) -> WarningRecord {
    WarningRecord {
        id: id.into(),
        owner: UserId::new(owner),
        kind: FeatureKind::Construction,
        name: Some("Roadworks".into()),
        address: None,
        lat: at.lat,
        lng: at.lng,
        tags: BTreeMap::new(),
        severity: Severity::Medium,
        expires_at: None,
    }
}

/// Returns the configured features that fall inside the queried box.
#[derive(Default)]
pub struct CannedNearby {
    pub features: Vec<Feature>,
    pub calls: AtomicUsize,
}

impl CannedNearby {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            features,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl NearbyFeatureSource for CannedNearby {
    fn query_bounding_box(&self, center: Coordinates, half_extent_deg: f64) -> Vec<Feature> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let bbox = BoundingBox::around(center, half_extent_deg);
        self.features
            .iter()
            .filter(|f| bbox.contains(f.coordinates))
            .cloned()
            .collect()
    }
}

/// Answers every search with the same list and records the queries.
#[derive(Default)]
pub struct CannedGeocoder {
    pub results: Vec<Place>,
    queries: Mutex<Vec<String>>,
}

impl CannedGeocoder {
    pub fn new(results: Vec<Place>) -> Self {
        Self {
            results,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

impl Geocoder for CannedGeocoder {
    fn search(&self, text: &str, _bias: Option<BoundingBox>) -> Result<Vec<Place>, GeoError> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(text.to_string());
        }
        Ok(self.results.clone())
    }

    fn reverse(&self, _at: Coordinates) -> Result<Option<Place>, GeoError> {
        Ok(None)
    }
}

/// A warning store whose backing file has gone away.
pub struct BrokenStore;

impl WarningStore for BrokenStore {
    fn warnings_near(
        &self,
        _owner: &UserId,
        _center: Coordinates,
        _half_extent_deg: f64,
        _now: DateTime<Utc>,
    ) -> Result<Vec<Feature>, GeoError> {
        Err(GeoError::Io(std::io::Error::other("warnings file unreadable")))
    }

    fn get(&self, _owner: &UserId, _id: &str) -> Result<Option<Feature>, GeoError> {
        Err(GeoError::Io(std::io::Error::other("warnings file unreadable")))
    }
}
