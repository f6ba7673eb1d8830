use thiserror::Error;

use crate::{FailureEvent, TabId};

/// What the status UI shows for a rescue session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchState {
    Searching,
    CheckingVariants { count: usize },
    Found { variant: String, archived_url: String },
    NotFound,
    Error { message: String },
}

impl SearchState {
    /// Terminal states are shown until the user acts (or the redirect happens).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SearchState::Found { .. } | SearchState::NotFound | SearchState::Error { .. }
        )
    }

    pub fn phase(&self) -> SessionPhase {
        match self {
            SearchState::Searching => SessionPhase::Searching,
            SearchState::CheckingVariants { .. } => SessionPhase::CheckingVariants,
            SearchState::Found { .. } => SessionPhase::Found,
            SearchState::NotFound => SessionPhase::NotFound,
            SearchState::Error { .. } => SessionPhase::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Searching,
    CheckingVariants,
    Found,
    NotFound,
    Error,
    Redirected,
}

impl SessionPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionPhase::Found
                | SessionPhase::NotFound
                | SessionPhase::Error
                | SessionPhase::Redirected
        )
    }

    fn can_enter(self, next: SessionPhase) -> bool {
        use SessionPhase::*;
        matches!(
            (self, next),
            (Idle, Searching)
                | (Searching, CheckingVariants)
                | (Searching, Error)
                | (CheckingVariants, Found)
                | (CheckingVariants, NotFound)
                | (CheckingVariants, Error)
                | (Found, Redirected)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("session for tab {tab_id} cannot move from {from:?} to {to:?}")]
    Invalid {
        tab_id: TabId,
        from: SessionPhase,
        to: SessionPhase,
    },
}

/// Per-tab rescue state machine.
///
/// `Idle -> Searching -> CheckingVariants -> {Found | NotFound | Error}`, with
/// `Found -> Redirected` as the only move out of a terminal state. `Error` is
/// also reachable straight from `Searching`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoverySession {
    tab_id: TabId,
    original_url: String,
    phase: SessionPhase,
    redirected_to: Option<String>,
}

impl RecoverySession {
    pub fn new(event: &FailureEvent) -> Self {
        Self {
            tab_id: event.tab_id,
            original_url: event.url.clone(),
            phase: SessionPhase::Idle,
            redirected_to: None,
        }
    }

    pub fn tab_id(&self) -> TabId {
        self.tab_id
    }

    pub fn original_url(&self) -> &str {
        &self.original_url
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn redirected_to(&self) -> Option<&str> {
        self.redirected_to.as_deref()
    }

    /// Moves to the phase of `state`, rejecting out-of-order transitions.
    pub fn advance(&mut self, state: &SearchState) -> Result<(), TransitionError> {
        self.enter(state.phase())
    }

    /// Records the single redirect allowed for a `Found` session.
    pub fn mark_redirected(&mut self, archived_url: &str) -> Result<(), TransitionError> {
        self.enter(SessionPhase::Redirected)?;
        self.redirected_to = Some(archived_url.to_string());
        Ok(())
    }

    fn enter(&mut self, next: SessionPhase) -> Result<(), TransitionError> {
        if !self.phase.can_enter(next) {
            return Err(TransitionError::Invalid {
                tab_id: self.tab_id,
                from: self.phase,
                to: next,
            });
        }
        self.phase = next;
        Ok(())
    }
}
