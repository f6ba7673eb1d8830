use crate::view_model::{detail_for, heading_for, StatusView, UserAction, PROGRESS_CAP};
use crate::{SearchState, StatusUpdate};

/// State of one status page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPage {
    original_url: Option<String>,
    search: SearchState,
    progress: u8,
    auto_redirect: bool,
    redirect_scheduled: bool,
    dirty: bool,
}

impl Default for StatusPage {
    fn default() -> Self {
        Self {
            original_url: None,
            search: SearchState::Searching,
            progress: 0,
            auto_redirect: false,
            redirect_scheduled: false,
            dirty: false,
        }
    }
}

impl StatusPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A page that performs the redirect itself once a snapshot is found.
    pub fn with_auto_redirect() -> Self {
        Self {
            auto_redirect: true,
            ..Self::default()
        }
    }

    pub fn search_state(&self) -> &SearchState {
        &self.search
    }

    pub fn original_url(&self) -> Option<&str> {
        self.original_url.as_deref()
    }

    pub fn view(&self) -> StatusView {
        let progress = match self.search {
            SearchState::Searching
            | SearchState::CheckingVariants { .. }
            | SearchState::Found { .. } => Some(self.progress),
            SearchState::NotFound | SearchState::Error { .. } => None,
        };
        let actions = if self.is_persistent() {
            vec![self.close_action()]
        } else {
            Vec::new()
        };
        StatusView {
            heading: heading_for(&self.search).to_string(),
            detail: detail_for(&self.search, self.original_url.as_deref()),
            progress,
            actions,
            dirty: self.dirty,
        }
    }

    /// Returns whether a render is pending and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Persistent notices stay until the user closes them.
    pub(crate) fn is_persistent(&self) -> bool {
        matches!(self.search, SearchState::NotFound | SearchState::Error { .. })
    }

    fn close_action(&self) -> UserAction {
        if self.original_url.is_some() {
            UserAction::ReturnToOriginal
        } else {
            UserAction::CloseTab
        }
    }

    /// Applies a pushed update. Returns false for stale updates arriving
    /// after a terminal state.
    pub(crate) fn apply_update(&mut self, update: StatusUpdate) -> bool {
        if self.search.is_terminal() && !update.state.is_terminal() {
            return false;
        }
        if update.original_url.is_some() {
            self.original_url = update.original_url;
        }
        self.progress = match update.state {
            SearchState::Searching => 0,
            SearchState::Found { .. } => 100,
            _ => self.progress,
        };
        self.search = update.state;
        self.dirty = true;
        true
    }

    pub(crate) fn advance_progress(&mut self, advance: u8) {
        if !matches!(self.search, SearchState::CheckingVariants { .. }) {
            return;
        }
        let next = self.progress.saturating_add(advance).min(PROGRESS_CAP);
        if next != self.progress {
            self.progress = next;
            self.dirty = true;
        }
    }

    /// Claims the page-owned redirect; true only the first time.
    pub(crate) fn claim_redirect(&mut self) -> bool {
        if !self.auto_redirect || self.redirect_scheduled {
            return false;
        }
        self.redirect_scheduled = true;
        true
    }
}
