//! User-submitted warnings store (read side).
//!
//! Warnings are private: every query is scoped to the owner's id and an
//! expired warning is never returned. Creating and editing warnings is not
//! supported here.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use bevy::log::{debug, warn};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coord::{BoundingBox, Coordinates};
use crate::error::GeoError;
use crate::feature::{Feature, FeatureKind, FeatureSource, Severity};
use crate::identity::UserId;

pub trait WarningStore: Send + Sync {
    /// Live warnings owned by `owner` inside the box of `half_extent_deg`
    /// around `center`.
    fn warnings_near(
        &self,
        owner: &UserId,
        center: Coordinates,
        half_extent_deg: f64,
        now: DateTime<Utc>,
    ) -> Result<Vec<Feature>, GeoError>;

    /// One warning by id, if `owner` owns it.
    fn get(&self, owner: &UserId, id: &str) -> Result<Option<Feature>, GeoError>;
}

/// Persisted shape of a warning. Timestamps are RFC 3339.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WarningRecord {
    pub id: String,
    pub owner: UserId,
    #[serde(default)]
    pub kind: FeatureKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    pub severity: Severity,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl WarningRecord {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }

    pub fn to_feature(&self) -> Feature {
        Feature {
            id: self.id.clone(),
            kind: self.kind,
            name: self.name.clone(),
            address: self.address.clone(),
            coordinates: self.coordinates(),
            tags: self.tags.clone(),
            source: FeatureSource::UserSubmitted {
                owner: self.owner.clone(),
                severity: self.severity,
                expires_at: self.expires_at,
            },
        }
    }

    /// Rejects positions that are not real coordinates.
    pub fn validate(&self) -> Result<(), GeoError> {
        Coordinates::checked(self.lat, self.lng).map(|_| ())
    }

    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// Decode stored records one by one. Undecodable or out-of-range records
/// are logged and skipped.
pub fn decode_records(values: Vec<serde_json::Value>) -> Vec<WarningRecord> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| {
            let record = match serde_json::from_value::<WarningRecord>(value) {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping stored warning #{}: {}", i, e);
                    return None;
                }
            };
            match record.validate() {
                Ok(()) => Some(record),
                Err(e) => {
                    warn!("Skipping stored warning {}: {}", record.id, e);
                    None
                }
            }
        })
        .collect()
}

fn select_near(
    records: &[WarningRecord],
    owner: &UserId,
    center: Coordinates,
    half_extent_deg: f64,
    now: DateTime<Utc>,
) -> Vec<Feature> {
    let bbox = BoundingBox::around(center, half_extent_deg);
    records
        .iter()
        .filter(|r| &r.owner == owner && r.is_live(now) && bbox.contains(r.coordinates()))
        .map(WarningRecord::to_feature)
        .collect()
}

fn select_one(records: &[WarningRecord], owner: &UserId, id: &str) -> Option<Feature> {
    records
        .iter()
        .find(|r| r.id == id && &r.owner == owner)
        .map(WarningRecord::to_feature)
}

// ---------------------------------------------------------------------------
// JsonWarningStore
// ---------------------------------------------------------------------------

/// JSON array of [`WarningRecord`]s on disk, re-read on every query so
/// edits made by other tools show up without a restart.
pub struct JsonWarningStore {
    path: PathBuf,
}

impl JsonWarningStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<WarningRecord>, GeoError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No warnings file at {}", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        let values: Vec<serde_json::Value> = serde_json::from_slice(&bytes)?;
        Ok(decode_records(values))
    }
}

impl WarningStore for JsonWarningStore {
    fn warnings_near(
        &self,
        owner: &UserId,
        center: Coordinates,
        half_extent_deg: f64,
        now: DateTime<Utc>,
    ) -> Result<Vec<Feature>, GeoError> {
        let records = self.load()?;
        Ok(select_near(&records, owner, center, half_extent_deg, now))
    }

    fn get(&self, owner: &UserId, id: &str) -> Result<Option<Feature>, GeoError> {
        let records = self.load()?;
        Ok(select_one(&records, owner, id))
    }
}

// ---------------------------------------------------------------------------
// MemoryWarningStore
// ---------------------------------------------------------------------------

/// In-process store, used when no warnings file is configured.
#[derive(Default)]
pub struct MemoryWarningStore {
    records: Vec<WarningRecord>,
}

impl MemoryWarningStore {
    pub fn new(records: Vec<WarningRecord>) -> Self {
        Self { records }
    }
}

impl WarningStore for MemoryWarningStore {
    fn warnings_near(
        &self,
        owner: &UserId,
        center: Coordinates,
        half_extent_deg: f64,
        now: DateTime<Utc>,
    ) -> Result<Vec<Feature>, GeoError> {
        Ok(select_near(&self.records, owner, center, half_extent_deg, now))
    }

    fn get(&self, owner: &UserId, id: &str) -> Result<Option<Feature>, GeoError> {
        Ok(select_one(&self.records, owner, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    fn record(id: &str, owner: &str, lat: f64, expires_at: Option<DateTime<Utc>>) -> WarningRecord {
        WarningRecord {
            id: id.into(),
            owner: UserId::new(owner),
            kind: FeatureKind::Construction,
            name: Some(format!("Warning {id}")),
            address: None,
            lat,
            lng: 0.0,
            tags: BTreeMap::new(),
            severity: Severity::Medium,
            expires_at,
        }
    }

    fn sample_store() -> MemoryWarningStore {
        let expired = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap();
        MemoryWarningStore::new(vec![
            record("live", "alice", 0.0, Some(later)),
            record("forever", "alice", 0.0005, None),
            record("old", "alice", 0.0, Some(expired)),
            record("far", "alice", 1.0, None),
            record("bobs", "bob", 0.0, None),
        ])
    }

    #[test]
    fn test_near_is_owner_scoped_and_live() {
        let store = sample_store();
        let found = store
            .warnings_near(&UserId::new("alice"), Coordinates::new(0.0, 0.0), 0.001, now())
            .unwrap();
        let ids: Vec<&str> = found.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["live", "forever"]);
    }

    #[test]
    fn test_near_for_unknown_owner_is_empty() {
        let store = sample_store();
        let found = store
            .warnings_near(&UserId::new("mallory"), Coordinates::new(0.0, 0.0), 10.0, now())
            .unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_get_checks_owner() {
        let store = sample_store();
        assert!(store.get(&UserId::new("bob"), "bobs").unwrap().is_some());
        assert!(store.get(&UserId::new("alice"), "bobs").unwrap().is_none());
    }

    #[test]
    fn test_record_to_feature_is_user_submitted() {
        let f = record("x", "alice", 1.0, None).to_feature();
        assert!(matches!(
            f.source,
            FeatureSource::UserSubmitted {
                severity: Severity::Medium,
                ..
            }
        ));
        assert_eq!(f.coordinates, Coordinates::new(1.0, 0.0));
    }

    #[test]
    fn test_record_rfc3339_round_trip() {
        let json = r#"{"id":"w","owner":"alice","kind":"accident","lat":1.0,"lng":2.0,
                       "severity":"high","expires_at":"2025-03-02T10:00:00Z"}"#;
        let r: WarningRecord = serde_json::from_str(json).unwrap();
        assert_eq!(r.kind, FeatureKind::Accident);
        assert_eq!(r.expires_at, Some(Utc.with_ymd_and_hms(2025, 3, 2, 10, 0, 0).unwrap()));
        assert!(r.is_live(now()));
    }

    #[test]
    fn test_json_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonWarningStore::new(dir.path().join("absent.json"));
        let found = store
            .warnings_near(&UserId::new("alice"), Coordinates::new(0.0, 0.0), 1.0, now())
            .unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_json_store_rereads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warnings.json");
        let store = JsonWarningStore::new(&path);
        let alice = UserId::new("alice");

        std::fs::write(&path, serde_json::to_vec(&vec![record("a", "alice", 0.0, None)]).unwrap())
            .unwrap();
        assert!(store.get(&alice, "a").unwrap().is_some());

        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"[]").unwrap();
        drop(file);
        assert!(store.get(&alice, "a").unwrap().is_none());
    }

    #[test]
    fn test_json_store_corrupt_file_is_decode_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not an array").unwrap();
        let store = JsonWarningStore::new(file.path());
        assert!(matches!(
            store.get(&UserId::new("alice"), "x"),
            Err(GeoError::Decode(_))
        ));
    }

    #[test]
    fn test_json_store_skips_bad_record_keeps_rest() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"[
                {"id":"good","owner":"alice","kind":"accident","lat":0.0,"lng":0.0,"severity":"high"},
                {"id":"odd","owner":"alice","kind":"accident","lat":0.0,"lng":0.0,"severity":"extreme"},
                {"id":"off","owner":"alice","kind":"accident","lat":123.0,"lng":0.0,"severity":"low"}
            ]"#,
        )
        .unwrap();
        let store = JsonWarningStore::new(file.path());
        let found = store
            .warnings_near(&UserId::new("alice"), Coordinates::new(0.0, 0.0), 1.0, now())
            .unwrap();
        let ids: Vec<&str> = found.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["good"]);
        assert!(store.get(&UserId::new("alice"), "off").unwrap().is_none());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert!(record("ok", "alice", 45.0, None).validate().is_ok());
        assert!(matches!(
            record("bad", "alice", 91.0, None).validate(),
            Err(GeoError::InvalidCoordinates { .. })
        ));
    }
}
