//! Messages exchanged with the status UI and the status-page address format.
//!
//! The status page can be opened directly from a URL carrying its state as
//! query parameters (`state`, `url`, `variant`, `archive`, `error`, `count`),
//! which is how it paints before push messages arrive.
use thiserror::Error;
use url::Url;

use crate::SearchState;

pub const DEFAULT_STATUS_PAGE_BASE: &str = "wayback-rescue://status/wayback-search.html";

const TAG_SEARCHING: &str = "searching";
const TAG_VARIANTS: &str = "variants";
const TAG_FOUND: &str = "found";
const TAG_NOT_FOUND: &str = "not-found";
const TAG_ERROR: &str = "error";

const UNKNOWN_ERROR: &str = "Unknown error";

/// Push notification from the workflow to the status UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub original_url: Option<String>,
    pub state: SearchState,
}

impl StatusUpdate {
    pub fn new(original_url: impl Into<String>, state: SearchState) -> Self {
        Self {
            original_url: Some(original_url.into()),
            state,
        }
    }
}

/// Requests sent from the status UI back to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlRequest {
    /// Abandon the rescue and load `url` (the page that failed) again.
    ReturnToOriginal { url: String },
    CloseTab,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusPageError {
    #[error("invalid status page url: {0}")]
    InvalidUrl(String),
    #[error("status page url is missing the `{0}` parameter")]
    MissingParameter(&'static str),
    #[error("invalid variant count `{0}`")]
    InvalidCount(String),
}

/// Discriminant used in the `state` query parameter.
pub fn state_tag(state: &SearchState) -> &'static str {
    match state {
        SearchState::Searching => TAG_SEARCHING,
        SearchState::CheckingVariants { .. } => TAG_VARIANTS,
        SearchState::Found { .. } => TAG_FOUND,
        SearchState::NotFound => TAG_NOT_FOUND,
        SearchState::Error { .. } => TAG_ERROR,
    }
}

/// Builds the address of the status page showing `update`.
pub fn status_page_url(base: &str, update: &StatusUpdate) -> Result<String, StatusPageError> {
    let mut url = Url::parse(base).map_err(|err| StatusPageError::InvalidUrl(err.to_string()))?;
    {
        let mut query = url.query_pairs_mut();
        query.clear();
        query.append_pair("state", state_tag(&update.state));
        if let Some(original) = &update.original_url {
            query.append_pair("url", original);
        }
        match &update.state {
            SearchState::CheckingVariants { count } => {
                query.append_pair("count", &count.to_string());
            }
            SearchState::Found {
                variant,
                archived_url,
            } => {
                query.append_pair("variant", variant);
                query.append_pair("archive", archived_url);
            }
            SearchState::Error { message } => {
                query.append_pair("error", message);
            }
            SearchState::Searching | SearchState::NotFound => {}
        }
    }
    Ok(url.into())
}

/// Reads a status update back from a status-page address.
///
/// A missing or unknown `state` shows the searching view.
pub fn parse_status_page_url(address: &str) -> Result<StatusUpdate, StatusPageError> {
    let url = Url::parse(address).map_err(|err| StatusPageError::InvalidUrl(err.to_string()))?;

    let mut tag = None;
    let mut original_url = None;
    let mut variant = None;
    let mut archive = None;
    let mut error = None;
    let mut count = None;
    for (key, value) in url.query_pairs() {
        let value = value.into_owned();
        match key.as_ref() {
            "state" => tag = Some(value),
            "url" => original_url = Some(value),
            "variant" => variant = Some(value),
            "archive" => archive = Some(value),
            "error" => error = Some(value),
            "count" => count = Some(value),
            _ => {}
        }
    }
    let original_url = original_url.filter(|url| !url.is_empty());

    let state = match tag.as_deref() {
        Some(TAG_VARIANTS) => {
            let raw = count.ok_or(StatusPageError::MissingParameter("count"))?;
            let count = raw
                .parse()
                .map_err(|_| StatusPageError::InvalidCount(raw.clone()))?;
            SearchState::CheckingVariants { count }
        }
        Some(TAG_FOUND) => {
            let archived_url = archive.ok_or(StatusPageError::MissingParameter("archive"))?;
            let variant = variant
                .or_else(|| original_url.clone())
                .ok_or(StatusPageError::MissingParameter("variant"))?;
            SearchState::Found {
                variant,
                archived_url,
            }
        }
        Some(TAG_NOT_FOUND) => SearchState::NotFound,
        Some(TAG_ERROR) => SearchState::Error {
            message: error.unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
        },
        _ => SearchState::Searching,
    };

    Ok(StatusUpdate {
        original_url,
        state,
    })
}
