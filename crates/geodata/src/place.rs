//! Geocoding candidates: the wire shape and the parsed `Place`.

use bevy::log::warn;
use serde::{Deserialize, Serialize};

use crate::coord::Coordinates;
use crate::error::GeoError;

/// Address parts as returned with `addressdetails=1`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuredAddress {
    pub house_number: Option<String>,
    pub road: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postcode: Option<String>,
}

impl StructuredAddress {
    /// House number, road, city, state and country joined with `", "`.
    /// The postcode is left out. `None` when no part is present.
    pub fn summary(&self) -> Option<String> {
        let parts: Vec<&str> = [
            &self.house_number,
            &self.road,
            &self.city,
            &self.state,
            &self.country,
        ]
        .into_iter()
        .filter_map(|p| p.as_deref())
        .filter(|p| !p.is_empty())
        .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

/// One candidate location from the geocoding service.
#[derive(Clone, Debug, PartialEq)]
pub struct Place {
    pub id: String,
    pub display_name: String,
    pub coordinates: Coordinates,
    pub category: String,
    pub importance: f64,
    pub address: Option<StructuredAddress>,
}

/// The service's JSON shape. Coordinates usually arrive as strings but
/// numbers are accepted too.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawPlace {
    #[serde(default, deserialize_with = "string_or_number")]
    pub place_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub lat: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub lon: String,
    #[serde(rename = "type", default)]
    pub category: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub importance: f64,
    #[serde(default)]
    pub address: Option<StructuredAddress>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Missing, null or unparseable scores count as zero.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or_default(),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or_default(),
        _ => 0.0,
    })
}

impl TryFrom<RawPlace> for Place {
    type Error = GeoError;

    fn try_from(raw: RawPlace) -> Result<Self, Self::Error> {
        let lat: f64 = raw
            .lat
            .trim()
            .parse()
            .map_err(|_| GeoError::Malformed(format!("place {}: bad lat {:?}", raw.place_id, raw.lat)))?;
        let lng: f64 = raw
            .lon
            .trim()
            .parse()
            .map_err(|_| GeoError::Malformed(format!("place {}: bad lon {:?}", raw.place_id, raw.lon)))?;
        let coordinates = Coordinates::checked(lat, lng)
            .map_err(|e| GeoError::Malformed(format!("place {}: {e}", raw.place_id)))?;

        Ok(Place {
            id: raw.place_id,
            display_name: raw.display_name,
            coordinates,
            category: raw.category,
            importance: raw.importance,
            address: raw.address,
        })
    }
}

/// Convert a response list, dropping unusable entries and keeping the
/// service's order for the rest.
pub fn parse_places(raw: Vec<RawPlace>) -> Vec<Place> {
    raw.into_iter()
        .filter_map(|r| match Place::try_from(r) {
            Ok(place) => Some(place),
            Err(e) => {
                warn!("Skipping geocoding result: {}", e);
                None
            }
        })
        .collect()
}

/// Decode a response list entry by entry so one bad element only costs
/// itself.
pub fn parse_place_values(values: Vec<serde_json::Value>) -> Vec<Place> {
    let raw = values
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| match serde_json::from_value::<RawPlace>(value) {
            Ok(raw) => Some(raw),
            Err(e) => {
                warn!("Skipping geocoding result #{}: {}", i, e);
                None
            }
        })
        .collect();
    parse_places(raw)
}
