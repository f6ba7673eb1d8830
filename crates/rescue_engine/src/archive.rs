use std::time::Duration;

use rescue_logging::rescue_trace;
use serde::Deserialize;
use url::Url;

use crate::{LookupError, LookupFailureKind};

pub const DEFAULT_ENDPOINT: &str = "https://archive.org/wayback/available";

#[derive(Debug, Clone)]
pub struct LookupSettings {
    /// Availability endpoint; the target is passed as the `url` query parameter.
    pub endpoint: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[async_trait::async_trait]
pub trait ArchiveLookup: Send + Sync {
    /// Returns the closest snapshot URL for `url`, or `None` if nothing is archived.
    async fn closest_snapshot(&self, url: &str) -> Result<Option<String>, LookupError>;
}

#[derive(Debug, Default, Deserialize)]
struct Availability {
    #[serde(default)]
    archived_snapshots: ArchivedSnapshots,
}

#[derive(Debug, Default, Deserialize)]
struct ArchivedSnapshots {
    closest: Option<Snapshot>,
}

#[derive(Debug, Deserialize)]
struct Snapshot {
    url: String,
}

/// Extracts `archived_snapshots.closest.url` from an availability response body.
pub fn parse_availability(body: &[u8]) -> Result<Option<String>, LookupError> {
    let availability: Availability = serde_json::from_slice(body)
        .map_err(|err| LookupError::new(LookupFailureKind::InvalidResponse, err.to_string()))?;
    Ok(availability
        .archived_snapshots
        .closest
        .map(|snapshot| snapshot.url))
}

/// Availability lookups over HTTP. No retries: one request per call.
#[derive(Debug, Clone)]
pub struct ReqwestArchiveLookup {
    endpoint: Url,
    client: reqwest::Client,
}

impl ReqwestArchiveLookup {
    pub fn new(settings: LookupSettings) -> Result<Self, LookupError> {
        let endpoint = Url::parse(&settings.endpoint)
            .map_err(|err| LookupError::new(LookupFailureKind::InvalidUrl, err.to_string()))?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| LookupError::new(LookupFailureKind::Network, err.to_string()))?;
        Ok(Self { endpoint, client })
    }

    /// The request address for one target URL.
    pub fn request_url(&self, target: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("url", target);
        url
    }
}

#[async_trait::async_trait]
impl ArchiveLookup for ReqwestArchiveLookup {
    async fn closest_snapshot(&self, url: &str) -> Result<Option<String>, LookupError> {
        let request_url = self.request_url(url);
        rescue_trace!("Availability request {}", request_url);

        let response = self
            .client
            .get(request_url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::new(
                LookupFailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        parse_availability(&body)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> LookupError {
    if err.is_timeout() {
        return LookupError::new(LookupFailureKind::Timeout, err.to_string());
    }
    LookupError::new(LookupFailureKind::Network, err.to_string())
}
