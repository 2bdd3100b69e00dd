//! Latitude/longitude value types and small geometric helpers.

use serde::{Deserialize, Serialize};

use crate::error::GeoError;

/// Mean earth radius in kilometres, used by [`Coordinates::haversine_km`].
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 position in degrees.
///
/// Equality is exact numeric comparison. Positions produced by the map
/// projection are already within range, so [`Coordinates::new`] does not
/// validate; use [`Coordinates::checked`] for values coming off the wire.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Build a position, rejecting non-finite or out-of-range values.
    pub fn checked(lat: f64, lng: f64) -> Result<Self, GeoError> {
        let in_range = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        if in_range {
            Ok(Self { lat, lng })
        } else {
            Err(GeoError::InvalidCoordinates { lat, lng })
        }
    }

    /// Euclidean distance on raw degrees. Good enough for tap slop at street
    /// scale; not a real ground distance.
    pub fn planar_distance(&self, other: &Coordinates) -> f64 {
        let dlat = self.lat - other.lat;
        let dlng = self.lng - other.lng;
        (dlat * dlat + dlng * dlng).sqrt()
    }

    /// Great-circle distance in kilometres.
    pub fn haversine_km(&self, other: &Coordinates) -> f64 {
        let dlat = (other.lat - self.lat).to_radians();
        let dlng = (other.lng - self.lng).to_radians();
        let a = (dlat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos() * other.lat.to_radians().cos() * (dlng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c
    }

    /// `"lat, lng"` with six decimals, the format shown in the overlay.
    pub fn format_fixed(&self) -> String {
        format!("{:.6}, {:.6}", self.lat, self.lng)
    }
}

// ---------------------------------------------------------------------------
// BoundingBox
// ---------------------------------------------------------------------------

/// Axis-aligned lat/lng rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    /// Square box of `half_extent` degrees on each side of `center`.
    pub fn around(center: Coordinates, half_extent: f64) -> Self {
        Self {
            south: center.lat - half_extent,
            west: center.lng - half_extent,
            north: center.lat + half_extent,
            east: center.lng + half_extent,
        }
    }

    /// Smallest box containing every point, or `None` for an empty iterator.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Coordinates>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = Self {
            south: first.lat,
            west: first.lng,
            north: first.lat,
            east: first.lng,
        };
        for p in iter {
            bbox.south = bbox.south.min(p.lat);
            bbox.north = bbox.north.max(p.lat);
            bbox.west = bbox.west.min(p.lng);
            bbox.east = bbox.east.max(p.lng);
        }
        Some(bbox)
    }

    pub fn contains(&self, p: Coordinates) -> bool {
        p.lat >= self.south && p.lat <= self.north && p.lng >= self.west && p.lng <= self.east
    }

    pub fn center(&self) -> Coordinates {
        Coordinates::new((self.south + self.north) / 2.0, (self.west + self.east) / 2.0)
    }

    /// `bbox` parameter of the OSM `map` call: `west,south,east,north`.
    pub fn to_osm_bbox(&self) -> String {
        format!("{},{},{},{}", self.west, self.south, self.east, self.north)
    }

    /// LocationIQ `viewbox`: south-west then north-east corner, longitude first.
    pub fn to_viewbox(&self) -> String {
        format!("{},{},{},{}", self.west, self.south, self.east, self.north)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planar_distance_small_offset() {
        let a = Coordinates::new(48.8566, 2.3522);
        let b = Coordinates::new(48.8566, 2.3523);
        let d = a.planar_distance(&b);
        assert!((d - 0.0001).abs() < 1e-9, "got {d}");
    }

    #[test]
    fn test_planar_distance_symmetric() {
        let a = Coordinates::new(10.0, 20.0);
        let b = Coordinates::new(13.0, 24.0);
        assert_eq!(a.planar_distance(&b), b.planar_distance(&a));
        assert!((a.planar_distance(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_haversine_paris_london() {
        let paris = Coordinates::new(48.8566, 2.3522);
        let london = Coordinates::new(51.5074, -0.1278);
        let km = paris.haversine_km(&london);
        assert!((km - 343.5).abs() < 2.0, "Paris-London should be ~343 km, got {km}");
    }

    #[test]
    fn test_format_fixed() {
        assert_eq!(Coordinates::new(10.0, 10.0).format_fixed(), "10.000000, 10.000000");
        assert_eq!(
            Coordinates::new(-33.8688, 151.2093).format_fixed(),
            "-33.868800, 151.209300"
        );
    }

    #[test]
    fn test_checked_rejects_out_of_range() {
        assert!(Coordinates::checked(90.0, 180.0).is_ok());
        assert!(matches!(
            Coordinates::checked(91.0, 0.0),
            Err(GeoError::InvalidCoordinates { .. })
        ));
        assert!(Coordinates::checked(0.0, -180.5).is_err());
        assert!(Coordinates::checked(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_bbox_around_and_contains() {
        let c = Coordinates::new(51.5, -0.12);
        let bbox = BoundingBox::around(c, 0.1);
        assert!(bbox.contains(c));
        assert!(bbox.contains(Coordinates::new(51.59, -0.03)));
        assert!(!bbox.contains(Coordinates::new(51.61, -0.12)));
        assert_eq!(bbox.center(), c);
    }

    #[test]
    fn test_bbox_query_param_order() {
        let bbox = BoundingBox {
            south: 1.0,
            west: 2.0,
            north: 3.0,
            east: 4.0,
        };
        assert_eq!(bbox.to_osm_bbox(), "2,1,4,3");
        assert_eq!(bbox.to_viewbox(), "2,1,4,3");
    }

    #[test]
    fn test_bbox_from_points() {
        assert!(BoundingBox::from_points(Vec::new()).is_none());
        let bbox = BoundingBox::from_points(vec![
            Coordinates::new(1.0, 5.0),
            Coordinates::new(-2.0, 7.0),
            Coordinates::new(0.5, 3.0),
        ])
        .unwrap();
        assert_eq!(bbox.south, -2.0);
        assert_eq!(bbox.north, 1.0);
        assert_eq!(bbox.west, 3.0);
        assert_eq!(bbox.east, 7.0);
    }
}
