//! Bounding-box queries against the OpenStreetMap API for nearby points of
//! interest.

use std::collections::BTreeMap;

use bevy::log::{debug, warn};
use serde::Deserialize;

use crate::coord::{BoundingBox, Coordinates};
use crate::error::GeoError;
use crate::feature::{has_interesting_tags, Feature, FeatureKind, FeatureSource};
use crate::http::HttpClient;

/// Map-data collaborator. Never fails: an unreachable service yields an
/// empty list.
pub trait NearbyFeatureSource: Send + Sync {
    fn query_bounding_box(&self, center: Coordinates, half_extent_deg: f64) -> Vec<Feature>;
}

/// The feature closest (planar) to `center`. Ties keep the earlier entry.
pub fn nearest(center: Coordinates, features: Vec<Feature>) -> Option<Feature> {
    features.into_iter().min_by(|a, b| {
        let da = a.coordinates.planar_distance(&center);
        let db = b.coordinates.planar_distance(&center);
        da.total_cmp(&db)
    })
}

// ---------------------------------------------------------------------------
// Wire format of /api/0.6/map.json
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct OsmMapResponse {
    #[serde(default)]
    elements: Vec<OsmElement>,
}

#[derive(Debug, Deserialize)]
struct OsmElement {
    #[serde(rename = "type")]
    kind: String,
    id: u64,
    lat: Option<f64>,
    lon: Option<f64>,
    #[serde(default)]
    version: Option<u32>,
    #[serde(default)]
    changeset: Option<u64>,
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

impl OsmElement {
    fn into_feature(self) -> Result<Feature, GeoError> {
        let (Some(lat), Some(lon)) = (self.lat, self.lon) else {
            return Err(GeoError::Malformed(format!("node {} has no position", self.id)));
        };
        let coordinates = Coordinates::checked(lat, lon)?;
        let address = self
            .tags
            .get("addr:full")
            .or_else(|| self.tags.get("addr:street"))
            .cloned();

        Ok(Feature {
            id: self.id.to_string(),
            kind: FeatureKind::from_tags(&self.tags),
            name: self.tags.get("name").cloned(),
            address,
            coordinates,
            source: FeatureSource::External {
                version: self.version.unwrap_or(1),
                changeset: self.changeset,
                last_editor: self.user,
            },
            tags: self.tags,
        })
    }
}

/// Decode a map.json body into interesting nodes. Ways, relations and bare
/// nodes are dropped; so is any node with an unusable position.
pub fn parse_map_response(body: &[u8]) -> Result<Vec<Feature>, GeoError> {
    let response: OsmMapResponse = serde_json::from_slice(body)?;
    let features = response
        .elements
        .into_iter()
        .filter(|e| e.kind == "node" && has_interesting_tags(&e.tags))
        .filter_map(|e| match e.into_feature() {
            Ok(f) => Some(f),
            Err(err) => {
                warn!("Skipping OSM element: {}", err);
                None
            }
        })
        .collect();
    Ok(features)
}

// ---------------------------------------------------------------------------
// OsmMapSource
// ---------------------------------------------------------------------------

pub struct OsmMapSource<C: HttpClient> {
    client: C,
    base_url: String,
}

impl<C: HttpClient> OsmMapSource<C> {
    /// `base_url` is the API root including its trailing slash, e.g.
    /// `https://api.openstreetmap.org/`.
    pub fn new(client: C, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self { client, base_url }
    }

    pub fn map_url(&self, bbox: &BoundingBox) -> String {
        format!("{}api/0.6/map.json?bbox={}", self.base_url, bbox.to_osm_bbox())
    }

    fn fetch(&self, bbox: &BoundingBox) -> Result<Vec<Feature>, GeoError> {
        let url = self.map_url(bbox);
        let response = self.client.get(&url)?;
        if response.status == 429 {
            return Err(GeoError::RateLimited);
        }
        if !response.is_success() {
            return Err(GeoError::Status {
                code: response.status,
                url,
            });
        }
        parse_map_response(&response.body)
    }
}

impl<C: HttpClient> NearbyFeatureSource for OsmMapSource<C> {
    fn query_bounding_box(&self, center: Coordinates, half_extent_deg: f64) -> Vec<Feature> {
        let bbox = BoundingBox::around(center, half_extent_deg);
        match self.fetch(&bbox) {
            Ok(features) => {
                debug!("OSM returned {} interesting nodes", features.len());
                features
            }
            Err(e) => {
                warn!("OSM nearby lookup failed: {}", e);
                Vec::new()
            }
        }
    }
}
