// ---------------------------------------------------------------------------
// GeoError: failures talking to geocoding, map-data and warning services
// ---------------------------------------------------------------------------

use std::fmt;

/// Errors raised by the external collaborators.
///
/// The interaction layer never propagates these past its own boundary: a
/// failed lookup becomes "no feature", a failed search becomes "no results".
/// They exist so the failure can be logged and displayed with some detail.
#[derive(Debug)]
pub enum GeoError {
    /// Connection, TLS or timeout failure before a response arrived.
    Transport(String),
    /// The service answered with a non-success status.
    Status { code: u16, url: String },
    /// HTTP 429 from the service.
    RateLimited,
    /// The response body could not be decoded.
    Decode(String),
    /// A single entry in an otherwise valid response was unusable.
    Malformed(String),
    /// Latitude/longitude outside the WGS84 range.
    InvalidCoordinates { lat: f64, lng: f64 },
    /// A service that needs a key was called without one.
    MissingApiKey(&'static str),
    /// Local file access (warning store, config).
    Io(std::io::Error),
}

impl GeoError {
    /// Failures worth retrying later rather than reporting as bad data.
    pub fn is_transient(&self) -> bool {
        matches!(self, GeoError::Transport(_) | GeoError::RateLimited)
    }
}

impl fmt::Display for GeoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeoError::Transport(msg) => write!(f, "Transport error: {msg}"),
            GeoError::Status { code, url } => write!(f, "HTTP {code} from {url}"),
            GeoError::RateLimited => write!(f, "Rate limited by service"),
            GeoError::Decode(msg) => write!(f, "Decoding error: {msg}"),
            GeoError::Malformed(msg) => write!(f, "Malformed entry: {msg}"),
            GeoError::InvalidCoordinates { lat, lng } => {
                write!(f, "Invalid coordinates: {lat}, {lng}")
            }
            GeoError::MissingApiKey(service) => write!(f, "No API key configured for {service}"),
            GeoError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for GeoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GeoError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for GeoError {
    fn from(e: std::io::Error) -> Self {
        GeoError::Io(e)
    }
}

impl From<serde_json::Error> for GeoError {
    fn from(e: serde_json::Error) -> Self {
        GeoError::Decode(e.to_string())
    }
}

impl From<reqwest::Error> for GeoError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GeoError::Transport(format!("request timed out: {e}"))
        } else {
            GeoError::Transport(e.to_string())
        }
    }
}
