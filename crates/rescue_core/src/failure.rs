use std::fmt;

/// Browser tab identifier; one recovery session runs per tab.
pub type TabId = u64;

/// Why a navigation was considered failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    HttpStatus(u16),
    NetworkError(String),
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureCause::HttpStatus(code) => write!(f, "http status {code}"),
            FailureCause::NetworkError(name) => write!(f, "network error {name}"),
        }
    }
}

/// A recoverable navigation failure, emitted once by the detector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureEvent {
    pub url: String,
    pub tab_id: TabId,
    pub cause: FailureCause,
}
