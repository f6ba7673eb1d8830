use crate::SearchState;

/// Progress never reaches this value before a rescue resolves.
pub const PROGRESS_CAP: u8 = 95;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    /// Abandon the rescue and go back to the page that failed.
    ReturnToOriginal,
    /// Close the tab; offered when the original URL is unknown.
    CloseTab,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusView {
    pub heading: String,
    pub detail: Vec<String>,
    /// Indeterminate progress in percent; `None` when no bar is shown.
    pub progress: Option<u8>,
    pub actions: Vec<UserAction>,
    pub dirty: bool,
}

pub(crate) fn heading_for(state: &SearchState) -> &'static str {
    match state {
        SearchState::Searching | SearchState::CheckingVariants { .. } => {
            "Looking for archived versions..."
        }
        SearchState::Found { .. } => "Archive found!",
        SearchState::NotFound => "No Archive Available",
        SearchState::Error { .. } => "Error Searching Archives",
    }
}

pub(crate) fn detail_for(state: &SearchState, original_url: Option<&str>) -> Vec<String> {
    let original = original_url.unwrap_or_default();
    match state {
        SearchState::Searching => vec![format!("Searching for archived versions of: {original}")],
        SearchState::CheckingVariants { count } => vec![
            format!("Searching for archived versions of: {original}"),
            format!("Checking {count} URL variants..."),
        ],
        SearchState::Found { variant, .. } => vec![
            format!("Found an archived version of: {variant}"),
            "Redirecting in a moment...".to_string(),
        ],
        SearchState::NotFound => vec![
            format!("No archived version was found for: {original}"),
            "The Wayback Machine has not saved any version of this page.".to_string(),
            "All URL variants (www/non-www, http/https) were checked.".to_string(),
        ],
        SearchState::Error { message } => vec![
            "An error occurred while searching for archived versions.".to_string(),
            format!("Error: {message}"),
        ],
    }
}
