//! Geographic domain types and the external services the map talks to.
//!
//! Everything that crosses a network or file boundary lives here behind a
//! trait (`Geocoder`, `NearbyFeatureSource`, `WarningStore`, `HttpClient`) so
//! the interaction layer can be driven by canned implementations in tests.

pub mod coord;
pub mod error;
pub mod feature;
pub mod geocoding;
pub mod http;
pub mod identity;
pub mod nearby;
pub mod place;
pub mod warnings;

pub use coord::{BoundingBox, Coordinates};
pub use error::GeoError;
pub use feature::{Feature, FeatureKind, FeatureSource, Provenance, Severity};
pub use geocoding::{Geocoder, LocationIqGeocoder};
pub use http::{HttpClient, HttpResponse, ReqwestClient};
pub use identity::{Preferences, UserId, UserProfile};
pub use nearby::{NearbyFeatureSource, OsmMapSource};
pub use place::{Place, StructuredAddress};
pub use warnings::{JsonWarningStore, MemoryWarningStore, WarningRecord, WarningStore};
