use std::sync::{mpsc, Arc};
use std::time::Duration;

use futures_util::future::join_all;
use rescue_core::{
    select_winner, url_variants, FailureEvent, LookupResult, RecoverySession, SearchState,
    StatusUpdate, TabId, TransitionError, Winner,
};
use rescue_logging::{rescue_debug, rescue_error, rescue_info, rescue_warn};
use thiserror::Error;

use crate::{ArchiveLookup, EngineEvent, HostError, WorkflowOutcome};

/// Cosmetic pacing of the status page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowTimings {
    /// Pause after showing "searching", before the lookups start.
    pub searching_delay: Duration,
    /// How long "found" is shown before the redirect.
    pub found_delay: Duration,
}

impl Default for WorkflowTimings {
    fn default() -> Self {
        Self {
            searching_delay: Duration::from_millis(500),
            found_delay: Duration::from_millis(2000),
        }
    }
}

impl WorkflowTimings {
    pub fn immediate() -> Self {
        Self {
            searching_delay: Duration::ZERO,
            found_delay: Duration::ZERO,
        }
    }
}

/// Receives status updates for the status page of a tab.
pub trait StatusSink: Send + Sync {
    fn publish(&self, tab_id: TabId, update: StatusUpdate) -> Result<(), HostError>;
}

pub struct ChannelStatusSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelStatusSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl StatusSink for ChannelStatusSink {
    fn publish(&self, tab_id: TabId, update: StatusUpdate) -> Result<(), HostError> {
        self.tx
            .send(EngineEvent::Status { tab_id, update })
            .map_err(|_| HostError::Disconnected)
    }
}

/// Tab control offered by the browser host.
#[async_trait::async_trait]
pub trait Navigator: Send + Sync {
    async fn navigate(&self, tab_id: TabId, url: &str) -> Result<(), HostError>;
    async fn close_tab(&self, tab_id: TabId) -> Result<(), HostError>;
}

/// Failures of the workflow itself, as opposed to individual lookups.
#[derive(Debug, Error)]
enum OrchestrationError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("could not update status page: {0}")]
    Status(#[from] HostError),
}

/// Drives one rescue: variants, concurrent lookups, winner, redirect.
pub struct RecoveryWorkflow {
    lookup: Arc<dyn ArchiveLookup>,
    navigator: Arc<dyn Navigator>,
    timings: WorkflowTimings,
}

impl RecoveryWorkflow {
    pub fn new(
        lookup: Arc<dyn ArchiveLookup>,
        navigator: Arc<dyn Navigator>,
        timings: WorkflowTimings,
    ) -> Self {
        Self {
            lookup,
            navigator,
            timings,
        }
    }

    pub async fn run(&self, event: &FailureEvent, sink: &dyn StatusSink) -> WorkflowOutcome {
        let mut session = RecoverySession::new(event);
        rescue_info!(
            "Rescue started tab={} cause={} url={}",
            event.tab_id,
            event.cause,
            event.url
        );

        match self.search(&mut session, sink).await {
            Ok(Some(winner)) => self.redirect(&mut session, sink, winner).await,
            Ok(None) => {
                rescue_info!(
                    "No archived version for any variant of {}",
                    session.original_url()
                );
                if let Err(err) = self.transition(&mut session, sink, SearchState::NotFound) {
                    rescue_error!("Could not show not-found notice: {}", err);
                }
                WorkflowOutcome::NotFound
            }
            Err(err) => self.fail(&mut session, sink, err.to_string()),
        }
    }

    /// Looks up every variant concurrently and returns results in input order.
    ///
    /// A failed lookup only marks its own variant as missing.
    pub async fn check_variants(&self, variants: &[String]) -> Vec<LookupResult> {
        join_all(variants.iter().map(|variant| self.check_variant(variant))).await
    }

    async fn check_variant(&self, variant: &str) -> LookupResult {
        match self.lookup.closest_snapshot(variant).await {
            Ok(Some(archived_url)) => {
                rescue_debug!("Snapshot for {}: {}", variant, archived_url);
                LookupResult::found(variant, archived_url)
            }
            Ok(None) => {
                rescue_debug!("No snapshot for {}", variant);
                LookupResult::missing(variant)
            }
            Err(err) => {
                rescue_warn!("Lookup failed for {}: {}", variant, err);
                LookupResult::missing(variant)
            }
        }
    }

    async fn search(
        &self,
        session: &mut RecoverySession,
        sink: &dyn StatusSink,
    ) -> Result<Option<Winner>, OrchestrationError> {
        self.transition(session, sink, SearchState::Searching)?;
        tokio::time::sleep(self.timings.searching_delay).await;

        let variants = url_variants(session.original_url());
        self.transition(
            session,
            sink,
            SearchState::CheckingVariants {
                count: variants.len(),
            },
        )?;
        rescue_info!("Checking {} URL variants in parallel", variants.len());

        let results = self.check_variants(&variants).await;
        Ok(select_winner(&results))
    }

    async fn redirect(
        &self,
        session: &mut RecoverySession,
        sink: &dyn StatusSink,
        winner: Winner,
    ) -> WorkflowOutcome {
        rescue_info!("Found archive for variant {}", winner.variant);
        let found = SearchState::Found {
            variant: winner.variant.clone(),
            archived_url: winner.archived_url.clone(),
        };
        if let Err(err) = self.transition(session, sink, found) {
            rescue_warn!("Could not show found notice: {}", err);
        }

        tokio::time::sleep(self.timings.found_delay).await;

        if let Err(err) = self
            .navigator
            .navigate(session.tab_id(), &winner.archived_url)
            .await
        {
            rescue_error!(
                "Redirect of tab {} to {} failed: {}",
                session.tab_id(),
                winner.archived_url,
                err
            );
            return WorkflowOutcome::Failed {
                message: format!("redirect failed: {err}"),
            };
        }
        if let Err(err) = session.mark_redirected(&winner.archived_url) {
            rescue_error!("{}", err);
        }
        rescue_info!("Redirected to archived version {}", winner.archived_url);

        WorkflowOutcome::Redirected {
            variant: winner.variant,
            archived_url: winner.archived_url,
        }
    }

    fn fail(
        &self,
        session: &mut RecoverySession,
        sink: &dyn StatusSink,
        message: String,
    ) -> WorkflowOutcome {
        rescue_error!(
            "Rescue of {} failed: {}",
            session.original_url(),
            message
        );
        let state = SearchState::Error {
            message: message.clone(),
        };
        if let Err(err) = self.transition(session, sink, state) {
            rescue_error!("Could not show error notice: {}", err);
        }
        WorkflowOutcome::Failed { message }
    }

    fn transition(
        &self,
        session: &mut RecoverySession,
        sink: &dyn StatusSink,
        state: SearchState,
    ) -> Result<(), OrchestrationError> {
        session.advance(&state)?;
        let update = StatusUpdate::new(session.original_url(), state);
        sink.publish(session.tab_id(), update)?;
        Ok(())
    }
}
