//! Classification of page-load outcomes and the pending-error record.
//!
//! HTTP error responses are only recorded here; the failure is emitted once
//! the navigation for that tab completes. Network errors emit immediately.
//! Both paths consume the `(tab, url)` record, so overlapping signals for the
//! same navigation produce a single [`FailureEvent`].
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use url::Url;

use crate::{FailureCause, FailureEvent, TabId};

pub type FrameId = u64;

/// Frame id the host uses for the top-level document of a tab.
pub const TOP_LEVEL_FRAME: FrameId = 0;

pub const DEFAULT_SNAPSHOT_MARKER: &str = "web.archive.org/web/";

const RECOVERABLE_CLIENT_STATUSES: &[u16] = &[401, 403, 404, 408, 410, 423, 429, 451];
const RECOVERABLE_CDN_STATUSES: &[u16] = &[520, 521, 522, 523, 524, 525, 526, 527, 530, 598, 599];

const RECOVERABLE_NET_ERRORS: &[&str] = &[
    // DNS
    "net::ERR_NAME_NOT_RESOLVED",
    "net::ERR_NAME_RESOLUTION_FAILED",
    "net::ERR_DNS_TIMED_OUT",
    // Connection
    "net::ERR_CONNECTION_REFUSED",
    "net::ERR_CONNECTION_FAILED",
    "net::ERR_CONNECTION_TIMED_OUT",
    "net::ERR_CONNECTION_RESET",
    "net::ERR_CONNECTION_ABORTED",
    "net::ERR_CONNECTION_CLOSED",
    "net::ERR_SOCKET_NOT_CONNECTED",
    "net::ERR_TIMED_OUT",
    "net::ERR_ADDRESS_UNREACHABLE",
    "net::ERR_NETWORK_ACCESS_DENIED",
    // TLS
    "net::ERR_CERT_COMMON_NAME_INVALID",
    "net::ERR_CERT_DATE_INVALID",
    "net::ERR_CERT_AUTHORITY_INVALID",
    "net::ERR_CERT_INVALID",
    "net::ERR_SSL_PROTOCOL_ERROR",
    // Malformed or empty responses
    "net::ERR_EMPTY_RESPONSE",
    "net::ERR_CONTENT_LENGTH_MISMATCH",
    "net::ERR_RESPONSE_HEADERS_TOO_BIG",
    "net::ERR_INCOMPLETE_CHUNKED_ENCODING",
    "net::ERR_CONTENT_DECODING_FAILED",
    "net::ERR_INVALID_RESPONSE",
];

/// Returns true when an HTTP status should trigger a rescue.
pub fn is_recoverable_status(status: u16) -> bool {
    RECOVERABLE_CLIENT_STATUSES.contains(&status)
        || (500..=511).contains(&status)
        || RECOVERABLE_CDN_STATUSES.contains(&status)
}

/// Returns the allow-listed error name contained in `error`, if any.
///
/// Hosts report errors as free text (`"net::ERR_NAME_NOT_RESOLVED"`, sometimes
/// with extra context), so containment is checked rather than equality.
pub fn recoverable_net_error(error: &str) -> Option<&'static str> {
    RECOVERABLE_NET_ERRORS
        .iter()
        .copied()
        .find(|name| error.contains(name))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    MainFrame,
    SubFrame,
    Other,
}

/// A completed HTTP response as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseCompleted {
    pub tab_id: TabId,
    pub url: String,
    pub status: u16,
    pub resource: ResourceType,
}

/// A navigation that failed below HTTP (DNS, TLS, connection...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationError {
    pub tab_id: TabId,
    pub frame_id: FrameId,
    pub url: String,
    pub error: String,
}

/// Raw navigation signals, in the order the host delivers them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationSignal {
    ResponseCompleted(ResponseCompleted),
    NavigationError(NavigationError),
    /// The tab finished loading; its URL must be read back from the host.
    NavigationCompleted { tab_id: TabId, frame_id: FrameId },
}

impl NavigationSignal {
    pub fn tab_id(&self) -> TabId {
        match self {
            NavigationSignal::ResponseCompleted(response) => response.tab_id,
            NavigationSignal::NavigationError(error) => error.tab_id,
            NavigationSignal::NavigationCompleted { tab_id, .. } => *tab_id,
        }
    }

    /// True for signals that settle the top-level navigation of a tab.
    pub fn ends_navigation(&self) -> bool {
        match self {
            NavigationSignal::ResponseCompleted(_) => false,
            NavigationSignal::NavigationError(error) => error.frame_id == TOP_LEVEL_FRAME,
            NavigationSignal::NavigationCompleted { frame_id, .. } => *frame_id == TOP_LEVEL_FRAME,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectorSettings {
    /// Substring identifying archive snapshot URLs; such URLs are never rescued.
    pub snapshot_marker: String,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            snapshot_marker: DEFAULT_SNAPSHOT_MARKER.to_string(),
        }
    }
}

type PendingKey = (TabId, String);

/// Failure detector owning the pending-error record.
///
/// Safe to share between threads; every method takes `&self`.
#[derive(Debug, Default)]
pub struct FailureDetector {
    settings: DetectorSettings,
    pending: Mutex<HashMap<PendingKey, u16>>,
}

impl FailureDetector {
    pub fn new(settings: DetectorSettings) -> Self {
        Self {
            settings,
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_snapshot_url(&self, url: &str) -> bool {
        url.contains(&self.settings.snapshot_marker)
    }

    /// Records a recoverable top-level HTTP error. Returns whether it was recorded.
    pub fn record_response(&self, response: &ResponseCompleted) -> bool {
        if response.resource != ResourceType::MainFrame
            || !is_recoverable_status(response.status)
            || self.is_snapshot_url(&response.url)
        {
            return false;
        }
        self.lock_pending()
            .insert((response.tab_id, response.url.clone()), response.status);
        true
    }

    /// Emits an event for an allow-listed network error on a top-level frame.
    pub fn on_navigation_error(&self, error: &NavigationError) -> Option<FailureEvent> {
        if error.frame_id != TOP_LEVEL_FRAME || self.is_snapshot_url(&error.url) {
            return None;
        }
        let name = recoverable_net_error(&error.error)?;
        self.lock_pending()
            .remove(&(error.tab_id, error.url.clone()));
        Some(FailureEvent {
            url: error.url.clone(),
            tab_id: error.tab_id,
            cause: FailureCause::NetworkError(name.to_string()),
        })
    }

    /// Consumes the pending HTTP error for `tab_url`, emitting at most one event.
    ///
    /// A top-level completion settles the tab, so records for any other URL of
    /// that tab (e.g. earlier hops of a redirect chain) are dropped too.
    pub fn on_navigation_completed(
        &self,
        tab_id: TabId,
        frame_id: FrameId,
        tab_url: &str,
    ) -> Option<FailureEvent> {
        if frame_id != TOP_LEVEL_FRAME {
            return None;
        }
        let status = {
            let mut pending = self.lock_pending();
            let status = pending.remove(&(tab_id, tab_url.to_string()));
            pending.retain(|(tab, _), _| *tab != tab_id);
            status
        };
        if !is_web_url(tab_url) || self.is_snapshot_url(tab_url) {
            return None;
        }
        let status = status?;
        Some(FailureEvent {
            url: tab_url.to_string(),
            tab_id,
            cause: FailureCause::HttpStatus(status),
        })
    }

    /// Drops every pending record for a tab, e.g. when it is closed.
    pub fn forget_tab(&self, tab_id: TabId) {
        self.lock_pending().retain(|(tab, _), _| *tab != tab_id);
    }

    pub fn pending_len(&self) -> usize {
        self.lock_pending().len()
    }

    fn lock_pending(&self) -> MutexGuard<'_, HashMap<PendingKey, u16>> {
        // The map holds plain data, so a poisoned lock is still consistent.
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn is_web_url(url: &str) -> bool {
    Url::parse(url)
        .map(|parsed| matches!(parsed.scheme(), "http" | "https"))
        .unwrap_or(false)
}
