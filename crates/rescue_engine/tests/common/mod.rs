#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use rescue_core::{StatusUpdate, TabId};
use rescue_engine::{
    ArchiveLookup, HostError, LookupError, Navigator, StatusSink, TabQuery,
};
use tokio::sync::Barrier;

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(rescue_logging::initialize_for_tests);
}

pub const ARCHIVED: &str = "https://web.archive.org/web/2020/https://www.example.com/missing";

/// Canned archive answers keyed by variant; unknown variants have no snapshot.
#[derive(Default)]
pub struct FakeLookup {
    answers: HashMap<String, Result<Option<String>, LookupError>>,
    delays: HashMap<String, Duration>,
    barrier: Option<Arc<Barrier>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(mut self, variant: &str, archived: &str) -> Self {
        self.answers
            .insert(variant.to_string(), Ok(Some(archived.to_string())));
        self
    }

    pub fn with_error(mut self, variant: &str, error: LookupError) -> Self {
        self.answers.insert(variant.to_string(), Err(error));
        self
    }

    pub fn with_delay(mut self, variant: &str, delay: Duration) -> Self {
        self.delays.insert(variant.to_string(), delay);
        self
    }

    /// Every lookup waits until `parties` lookups are in flight at once.
    pub fn with_barrier(mut self, parties: usize) -> Self {
        self.barrier = Some(Arc::new(Barrier::new(parties)));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ArchiveLookup for FakeLookup {
    async fn closest_snapshot(&self, url: &str) -> Result<Option<String>, LookupError> {
        self.calls.lock().unwrap().push(url.to_string());
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }
        self.answers.get(url).cloned().unwrap_or(Ok(None))
    }
}

/// Records navigations and serves tab URLs.
#[derive(Default)]
pub struct FakeHost {
    pub navigations: Mutex<Vec<(TabId, String)>>,
    pub closed: Mutex<Vec<TabId>>,
    pub tab_urls: Mutex<HashMap<TabId, String>>,
    pub fail_navigation: bool,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tab(self, tab_id: TabId, url: &str) -> Self {
        self.tab_urls.lock().unwrap().insert(tab_id, url.to_string());
        self
    }

    pub fn navigations(&self) -> Vec<(TabId, String)> {
        self.navigations.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Navigator for FakeHost {
    async fn navigate(&self, tab_id: TabId, url: &str) -> Result<(), HostError> {
        if self.fail_navigation {
            return Err(HostError::TabClosed(tab_id));
        }
        self.navigations
            .lock()
            .unwrap()
            .push((tab_id, url.to_string()));
        Ok(())
    }

    async fn close_tab(&self, tab_id: TabId) -> Result<(), HostError> {
        self.closed.lock().unwrap().push(tab_id);
        Ok(())
    }
}

#[async_trait::async_trait]
impl TabQuery for FakeHost {
    async fn tab_url(&self, tab_id: TabId) -> Result<String, HostError> {
        self.tab_urls
            .lock()
            .unwrap()
            .get(&tab_id)
            .cloned()
            .ok_or(HostError::TabClosed(tab_id))
    }
}

#[derive(Default)]
pub struct RecordingSink {
    updates: Mutex<Vec<StatusUpdate>>,
    pub fail: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn take(&self) -> Vec<StatusUpdate> {
        self.updates.lock().unwrap().drain(..).collect()
    }
}

impl StatusSink for RecordingSink {
    fn publish(&self, _tab_id: TabId, update: StatusUpdate) -> Result<(), HostError> {
        if self.fail {
            return Err(HostError::Disconnected);
        }
        self.updates.lock().unwrap().push(update);
        Ok(())
    }
}
