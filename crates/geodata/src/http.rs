//! HTTP transport seam shared by every network collaborator.

use std::time::Duration;

use bevy::log::debug;
use serde::de::DeserializeOwned;

use crate::error::GeoError;

/// Requests identify the app to OSM and LocationIQ, both of which ask for a
/// descriptive agent.
const USER_AGENT: &str = concat!("popi/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Status and body of a completed request.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, GeoError> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Blocking GET. Implementations return `Ok` for any response that arrived,
/// whatever its status; `Err` is reserved for transport failures.
pub trait HttpClient: Send + Sync {
    fn get(&self, url: &str) -> Result<HttpResponse, GeoError>;
}

/// `reqwest::blocking` client. Calls run on the IO task pool, never on the
/// frame thread.
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    pub fn new() -> Result<Self, GeoError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, GeoError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| GeoError::Transport(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> Result<HttpResponse, GeoError> {
        debug!("GET {}", redact_key(url));
        let response = self.client.get(url).send()?;
        let status = response.status().as_u16();
        let body = response.bytes()?.to_vec();
        debug!("{} bytes, HTTP {}", body.len(), status);
        Ok(HttpResponse { status, body })
    }
}

/// Strip the value of a `key=` query parameter before the URL is logged.
pub fn redact_key(url: &str) -> String {
    let Some(start) = url.find("key=").map(|i| i + "key=".len()) else {
        return url.to_string();
    };
    let end = url[start..].find('&').map_or(url.len(), |i| start + i);
    format!("{}***{}", &url[..start], &url[end..])
}

// ---------------------------------------------------------------------------
// Canned client for collaborator tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Replays queued responses in order and records every requested URL.
    #[derive(Default)]
    pub struct CannedClient {
        responses: Mutex<VecDeque<Result<HttpResponse, GeoError>>>,
        pub requests: Mutex<Vec<String>>,
    }

    impl CannedClient {
        pub fn with(responses: Vec<Result<HttpResponse, GeoError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn ok(status: u16, body: &str) -> Self {
            Self::with(vec![Ok(HttpResponse::new(status, body))])
        }

        pub fn requested(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl HttpClient for CannedClient {
        fn get(&self, url: &str) -> Result<HttpResponse, GeoError> {
            self.requests.lock().unwrap().push(url.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(GeoError::Transport("no canned response".into())))
        }
    }
}
