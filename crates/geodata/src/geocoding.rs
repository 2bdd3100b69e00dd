//! Text search and reverse geocoding against a LocationIQ-compatible service.

use bevy::log::{debug, warn};
use reqwest::Url;

use crate::coord::{BoundingBox, Coordinates};
use crate::error::GeoError;
use crate::http::{redact_key, HttpClient, HttpResponse};
use crate::place::{parse_place_values, Place, RawPlace};

pub const DEFAULT_RESULT_LIMIT: usize = 10;

const SERVICE_NAME: &str = "LocationIQ";

/// Address-search collaborator.
pub trait Geocoder: Send + Sync {
    /// Ranked candidates for `text`, optionally restricted to `bias`. Order
    /// is the service's own.
    fn search(&self, text: &str, bias: Option<BoundingBox>) -> Result<Vec<Place>, GeoError>;

    /// The address at `at`, or `None` when the service has nothing there.
    fn reverse(&self, at: Coordinates) -> Result<Option<Place>, GeoError>;
}

pub struct LocationIqGeocoder<C: HttpClient> {
    client: C,
    base_url: String,
    api_key: Option<String>,
    limit: usize,
}

impl<C: HttpClient> LocationIqGeocoder<C> {
    pub fn new(client: C, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            limit: DEFAULT_RESULT_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    fn key(&self) -> Result<&str, GeoError> {
        self.api_key
            .as_deref()
            .ok_or(GeoError::MissingApiKey(SERVICE_NAME))
    }

    fn endpoint(&self, path: &str, params: &[(&str, String)]) -> Result<Url, GeoError> {
        let base = self.base_url.trim_end_matches('/');
        Url::parse_with_params(&format!("{base}{path}"), params)
            .map_err(|e| GeoError::Transport(format!("invalid geocoder URL {base}: {e}")))
    }

    pub fn search_url(&self, text: &str, bias: Option<BoundingBox>) -> Result<Url, GeoError> {
        let mut params = vec![
            ("key", self.key()?.to_string()),
            ("q", text.to_string()),
            ("format", "json".to_string()),
            ("limit", self.limit.to_string()),
            ("addressdetails", "1".to_string()),
        ];
        if let Some(bbox) = bias {
            params.push(("bounded", "1".to_string()));
            params.push(("viewbox", bbox.to_viewbox()));
        }
        self.endpoint("/v1/search.php", &params)
    }

    pub fn reverse_url(&self, at: Coordinates) -> Result<Url, GeoError> {
        let params = [
            ("key", self.key()?.to_string()),
            ("lat", at.lat.to_string()),
            ("lon", at.lng.to_string()),
            ("format", "json".to_string()),
        ];
        self.endpoint("/v1/reverse.php", &params)
    }
}

/// `Ok(None)` for 404, which the service uses for "Unable to geocode".
fn check_status(response: &HttpResponse, url: &Url) -> Result<Option<()>, GeoError> {
    match response.status {
        s if (200..300).contains(&s) => Ok(Some(())),
        404 => Ok(None),
        429 => Err(GeoError::RateLimited),
        code => Err(GeoError::Status {
            code,
            url: redact_key(url.as_str()),
        }),
    }
}

impl<C: HttpClient> Geocoder for LocationIqGeocoder<C> {
    fn search(&self, text: &str, bias: Option<BoundingBox>) -> Result<Vec<Place>, GeoError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }
        let url = self.search_url(text, bias)?;
        let response = self.client.get(url.as_str())?;
        if check_status(&response, &url)?.is_none() {
            debug!("No geocoding matches for {:?}", text);
            return Ok(Vec::new());
        }

        let values: Vec<serde_json::Value> = response.json()?;
        let mut places = parse_place_values(values);
        places.truncate(self.limit);
        Ok(places)
    }

    fn reverse(&self, at: Coordinates) -> Result<Option<Place>, GeoError> {
        let url = self.reverse_url(at)?;
        let response = self.client.get(url.as_str())?;
        if check_status(&response, &url)?.is_none() {
            return Ok(None);
        }

        let raw = match serde_json::from_slice::<RawPlace>(&response.body) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Discarding reverse geocoding result: {}", e);
                return Ok(None);
            }
        };
        match Place::try_from(raw) {
            Ok(place) => Ok(Some(place)),
            Err(e) => {
                warn!("Discarding reverse geocoding result: {}", e);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::CannedClient;

    const BASE: &str = "https://geo.example.test";

    fn geocoder(client: CannedClient) -> LocationIqGeocoder<CannedClient> {
        LocationIqGeocoder::new(client, BASE, Some("k123".into()))
    }

    fn place_json(id: &str, lat: &str) -> String {
        format!(
            r#"{{"place_id":"{id}","display_name":"Place {id}","lat":"{lat}","lon":"2.0","type":"city","importance":0.5}}"#
        )
    }

    #[test]
    fn test_search_url_shape() {
        let g = geocoder(CannedClient::default());
        let url = g.search_url("eiffel tower", None).unwrap();
        let s = url.as_str();
        assert!(s.starts_with("https://geo.example.test/v1/search.php?"), "got {s}");
        assert!(s.contains("key=k123"));
        assert!(s.contains("q=eiffel+tower"));
        assert!(s.contains("format=json"));
        assert!(s.contains("limit=10"));
        assert!(s.contains("addressdetails=1"));
        assert!(!s.contains("bounded"));
    }

    #[test]
    fn test_search_url_with_bias() {
        let g = geocoder(CannedClient::default());
        let bias = BoundingBox::around(Coordinates::new(1.0, 2.0), 0.5);
        let url = g.search_url("x", Some(bias)).unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("bounded".into(), "1".into())));
        assert!(pairs.contains(&("viewbox".into(), "1.5,0.5,2.5,1.5".into())));
    }

    #[test]
    fn test_search_preserves_order_and_truncates() {
        let body = format!(
            "[{},{},{}]",
            place_json("c", "3.0"),
            place_json("a", "1.0"),
            place_json("b", "2.0")
        );
        let g = geocoder(CannedClient::ok(200, &body)).with_limit(2);
        let places = g.search("anything", None).unwrap();
        let ids: Vec<&str> = places.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a"]);
    }

    #[test]
    fn test_search_skips_malformed_entry() {
        let body = format!("[{},{}]", place_json("bad", "north"), place_json("ok", "1.0"));
        let g = geocoder(CannedClient::ok(200, &body));
        let places = g.search("x", None).unwrap();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].id, "ok");
    }

    #[test]
    fn test_search_keeps_entries_around_numeric_lat() {
        let body = format!(
            r#"[{{"place_id":"n","display_name":"Numeric","lat":48.8,"lon":2.3,"type":"city","importance":0.4}},{}]"#,
            place_json("s", "1.0")
        );
        let g = geocoder(CannedClient::ok(200, &body));
        let ids: Vec<String> = g.search("x", None).unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["n", "s"]);
    }

    #[test]
    fn test_search_keeps_entries_around_null_importance() {
        let body = format!(
            r#"[{{"place_id":"z","display_name":"Zero","lat":"5.0","lon":"2.0","type":"city","importance":null}},{}]"#,
            place_json("s", "1.0")
        );
        let g = geocoder(CannedClient::ok(200, &body));
        let places = g.search("x", None).unwrap();
        assert_eq!(places.len(), 2);
        assert_eq!(places[0].importance, 0.0);
    }

    #[test]
    fn test_search_drops_undecodable_entry_only() {
        let body = format!(
            r#"[{{"place_id":"b","lat":"1","lon":"2","address":7}},{}]"#,
            place_json("s", "1.0")
        );
        let g = geocoder(CannedClient::ok(200, &body));
        let places = g.search("x", None).unwrap();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].id, "s");
    }

    #[test]
    fn test_search_404_is_empty() {
        let g = geocoder(CannedClient::ok(404, r#"{"error":"Unable to geocode"}"#));
        assert!(g.search("nowhere", None).unwrap().is_empty());
    }

    #[test]
    fn test_search_429_is_rate_limited() {
        let g = geocoder(CannedClient::ok(429, "{}"));
        assert!(matches!(g.search("x", None), Err(GeoError::RateLimited)));
    }

    #[test]
    fn test_search_500_is_status_without_key() {
        let g = geocoder(CannedClient::ok(500, ""));
        match g.search("x", None) {
            Err(GeoError::Status { code, url }) => {
                assert_eq!(code, 500);
                assert!(!url.contains("k123"), "key leaked: {url}");
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_key_makes_no_request() {
        let client = CannedClient::ok(200, "[]");
        let g = LocationIqGeocoder::new(client, BASE, None);
        assert!(matches!(g.search("x", None), Err(GeoError::MissingApiKey(_))));
        assert!(g.client.requested().is_empty());
    }

    #[test]
    fn test_blank_query_makes_no_request() {
        let g = geocoder(CannedClient::ok(200, "[]"));
        assert!(g.search("   ", None).unwrap().is_empty());
        assert!(g.client.requested().is_empty());
    }

    #[test]
    fn test_transport_error_propagates() {
        let g = geocoder(CannedClient::with(vec![Err(GeoError::Transport("reset".into()))]));
        assert!(matches!(g.search("x", None), Err(GeoError::Transport(_))));
    }

    #[test]
    fn test_reverse_parses_single_object() {
        let g = geocoder(CannedClient::ok(
            200,
            r#"{"place_id":"9","display_name":"1 Main St","lat":"10.0","lon":"10.0","address":{"house_number":"1","road":"Main St"}}"#,
        ));
        let place = g.reverse(Coordinates::new(10.0, 10.0)).unwrap().unwrap();
        assert_eq!(place.display_name, "1 Main St");
        let url = &g.client.requested()[0];
        assert!(url.contains("/v1/reverse.php?"));
        assert!(url.contains("lat=10"));
        assert!(url.contains("lon=10"));
    }

    #[test]
    fn test_reverse_404_is_none() {
        let g = geocoder(CannedClient::ok(404, r#"{"error":"Unable to geocode"}"#));
        assert_eq!(g.reverse(Coordinates::new(0.0, 0.0)).unwrap(), None);
    }
}
