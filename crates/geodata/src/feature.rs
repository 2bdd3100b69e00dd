//! Points of interest and user-submitted warnings, modelled as one `Feature`
//! type whose provenance is a sum type.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coord::Coordinates;
use crate::identity::UserId;

/// Tag keys that make an OSM node worth showing as a point of interest.
pub const INTERESTING_TAG_KEYS: [&str; 10] = [
    "amenity",
    "shop",
    "tourism",
    "leisure",
    "office",
    "craft",
    "healthcare",
    "emergency",
    "public_transport",
    "highway",
];

/// True when any interesting key is present with a non-empty value.
pub fn has_interesting_tags(tags: &BTreeMap<String, String>) -> bool {
    INTERESTING_TAG_KEYS
        .iter()
        .any(|key| tags.get(*key).is_some_and(|v| !v.is_empty()))
}

// ---------------------------------------------------------------------------
// FeatureKind
// ---------------------------------------------------------------------------

/// Display category of a feature. Serialized with the OSM value strings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Restaurant,
    Hotel,
    Fuel,
    Pharmacy,
    Hospital,
    School,
    Bank,
    Atm,
    Parking,
    Toilets,
    Wifi,
    ChargingStation,
    TrafficSignals,
    SpeedCamera,
    Construction,
    Accident,
    RoadClosed,
    WeatherWarning,
    #[default]
    Other,
}

impl FeatureKind {
    /// Classify an OSM tag map. `amenity` wins over `highway`; anything
    /// unrecognised is `Other`.
    pub fn from_tags(tags: &BTreeMap<String, String>) -> Self {
        let amenity = tags.get("amenity").map(String::as_str);
        let kind = match amenity {
            Some("restaurant") => Some(Self::Restaurant),
            Some("hotel") => Some(Self::Hotel),
            Some("fuel") => Some(Self::Fuel),
            Some("pharmacy") => Some(Self::Pharmacy),
            Some("hospital") => Some(Self::Hospital),
            Some("school") => Some(Self::School),
            Some("bank") => Some(Self::Bank),
            Some("atm") => Some(Self::Atm),
            Some("parking") => Some(Self::Parking),
            Some("toilets") => Some(Self::Toilets),
            Some("wifi") => Some(Self::Wifi),
            Some("charging_station") => Some(Self::ChargingStation),
            _ => None,
        };
        if let Some(kind) = kind {
            return kind;
        }

        match tags.get("highway").map(String::as_str) {
            Some("traffic_signals") => return Self::TrafficSignals,
            Some("speed_camera") => return Self::SpeedCamera,
            Some("construction") => return Self::Construction,
            Some("accident") => return Self::Accident,
            Some("road_closed") => return Self::RoadClosed,
            _ => {}
        }

        if tags.get("weather").map(String::as_str) == Some("warning") {
            return Self::WeatherWarning;
        }
        Self::Other
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Restaurant => "Restaurant",
            Self::Hotel => "Hotel",
            Self::Fuel => "Gas Station",
            Self::Pharmacy => "Pharmacy",
            Self::Hospital => "Hospital",
            Self::School => "School",
            Self::Bank => "Bank",
            Self::Atm => "ATM",
            Self::Parking => "Parking",
            Self::Toilets => "Toilet",
            Self::Wifi => "WiFi",
            Self::ChargingStation => "Charging Station",
            Self::TrafficSignals => "Traffic Light",
            Self::SpeedCamera => "Speed Camera",
            Self::Construction => "Construction",
            Self::Accident => "Accident",
            Self::RoadClosed => "Road Closure",
            Self::WeatherWarning => "Weather Warning",
            Self::Other => "Other",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Restaurant => "🍽",
            Self::Hotel => "🏨",
            Self::Fuel => "⛽",
            Self::Pharmacy => "💊",
            Self::Hospital => "🏥",
            Self::School => "🏫",
            Self::Bank => "🏦",
            Self::Atm => "🏧",
            Self::Parking => "🅿",
            Self::Toilets => "🚻",
            Self::Wifi => "📶",
            Self::ChargingStation => "🔌",
            Self::TrafficSignals => "🚦",
            Self::SpeedCamera => "📷",
            Self::Construction => "🚧",
            Self::Accident => "⚠",
            Self::RoadClosed => "🚫",
            Self::WeatherWarning => "🌧",
            Self::Other => "📍",
        }
    }
}

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Severity of a user-submitted warning, least to most severe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

// ---------------------------------------------------------------------------
// Feature
// ---------------------------------------------------------------------------

/// Which collaborator produced a feature, with the fields only that
/// collaborator knows about.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FeatureSource {
    /// A node from the map-data service.
    External {
        version: u32,
        changeset: Option<u64>,
        last_editor: Option<String>,
    },
    /// A private warning from the user-submitted store.
    UserSubmitted {
        owner: UserId,
        severity: Severity,
        expires_at: Option<DateTime<Utc>>,
    },
}

/// Field-less view of [`FeatureSource`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Provenance {
    ExternalMapData,
    UserSubmitted,
}

/// Read-only snapshot of a point of interest or warning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: String,
    pub kind: FeatureKind,
    pub name: Option<String>,
    pub address: Option<String>,
    pub coordinates: Coordinates,
    pub tags: BTreeMap<String, String>,
    pub source: FeatureSource,
}

impl Feature {
    pub fn provenance(&self) -> Provenance {
        match self.source {
            FeatureSource::External { .. } => Provenance::ExternalMapData,
            FeatureSource::UserSubmitted { .. } => Provenance::UserSubmitted,
        }
    }

    /// Only user-submitted warnings expire. A warning whose expiry equals
    /// `now` counts as expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match &self.source {
            FeatureSource::UserSubmitted {
                expires_at: Some(at),
                ..
            } => *at <= now,
            _ => false,
        }
    }

    pub fn severity(&self) -> Option<Severity> {
        match &self.source {
            FeatureSource::UserSubmitted { severity, .. } => Some(*severity),
            FeatureSource::External { .. } => None,
        }
    }
}
