use std::fmt;

use rescue_core::{ControlRequest, FailureEvent, StatusUpdate, TabId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct LookupError {
    pub kind: LookupFailureKind,
    pub message: String,
}

impl LookupError {
    pub(crate) fn new(kind: LookupFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupFailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    InvalidResponse,
    Network,
}

impl fmt::Display for LookupFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupFailureKind::InvalidUrl => write!(f, "invalid url"),
            LookupFailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            LookupFailureKind::Timeout => write!(f, "timeout"),
            LookupFailureKind::InvalidResponse => write!(f, "invalid response"),
            LookupFailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Failures reported by the browser host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("tab {0} no longer exists")]
    TabClosed(TabId),
    #[error("status channel disconnected")]
    Disconnected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowOutcome {
    Redirected {
        variant: String,
        archived_url: String,
    },
    NotFound,
    Failed {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The detector accepted a failure and a rescue is starting.
    Detected(FailureEvent),
    /// A status update for the page shown in `tab_id`.
    Status { tab_id: TabId, update: StatusUpdate },
    /// The navigation of `tab_id` settled without a failure worth rescuing.
    Ignored { tab_id: TabId },
    /// The rescue for `tab_id` ended.
    Finished {
        tab_id: TabId,
        outcome: WorkflowOutcome,
    },
    /// A control request from the status page was carried out (or not).
    ControlHandled {
        tab_id: TabId,
        request: ControlRequest,
        result: Result<(), HostError>,
    },
}
