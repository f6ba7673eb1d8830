use std::sync::Arc;

use rescue_core::{DetectorSettings, FailureDetector, FailureEvent, NavigationSignal, TabId};
use rescue_logging::{rescue_debug, rescue_error, rescue_info};

use crate::HostError;

/// Read access to the host's tabs.
#[async_trait::async_trait]
pub trait TabQuery: Send + Sync {
    async fn tab_url(&self, tab_id: TabId) -> Result<String, HostError>;
}

/// Feeds host navigation signals into the failure detector.
pub struct NavigationMonitor {
    detector: FailureDetector,
    tabs: Arc<dyn TabQuery>,
}

impl NavigationMonitor {
    pub fn new(settings: DetectorSettings, tabs: Arc<dyn TabQuery>) -> Self {
        Self {
            detector: FailureDetector::new(settings),
            tabs,
        }
    }

    /// Returns the failure to rescue, if this signal completes one.
    ///
    /// Host errors while reading the tab are logged and the navigation is left alone.
    pub async fn observe(&self, signal: NavigationSignal) -> Option<FailureEvent> {
        match signal {
            NavigationSignal::ResponseCompleted(response) => {
                if self.detector.record_response(&response) {
                    rescue_info!(
                        "Error detected: {} for {} (tab {})",
                        response.status,
                        response.url,
                        response.tab_id
                    );
                }
                None
            }
            NavigationSignal::NavigationError(error) => {
                let event = self.detector.on_navigation_error(&error);
                match &event {
                    Some(event) => rescue_info!(
                        "Navigation error detected: {} for {}",
                        event.cause,
                        event.url
                    ),
                    None => rescue_debug!(
                        "Ignoring navigation error {} for {}",
                        error.error,
                        error.url
                    ),
                }
                event
            }
            NavigationSignal::NavigationCompleted { tab_id, frame_id } => {
                let tab_url = match self.tabs.tab_url(tab_id).await {
                    Ok(url) => url,
                    Err(err) => {
                        rescue_error!("Could not read url of tab {}: {}", tab_id, err);
                        return None;
                    }
                };
                self.detector
                    .on_navigation_completed(tab_id, frame_id, &tab_url)
            }
        }
    }

    pub fn forget_tab(&self, tab_id: TabId) {
        self.detector.forget_tab(tab_id);
    }
}
