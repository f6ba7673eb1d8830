use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rescue_core::TabId;
use rescue_engine::{HostError, Navigator, TabQuery};
use rescue_logging::rescue_info;

/// Stand-in for a browser: tabs are plain URLs and navigation is printed.
#[derive(Debug, Default)]
pub struct TerminalHost {
    tabs: Mutex<HashMap<TabId, String>>,
}

impl TerminalHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_tab(&self, tab_id: TabId, url: &str) {
        self.lock_tabs().insert(tab_id, url.to_string());
    }

    pub fn current_url(&self, tab_id: TabId) -> Option<String> {
        self.lock_tabs().get(&tab_id).cloned()
    }

    fn lock_tabs(&self) -> MutexGuard<'_, HashMap<TabId, String>> {
        self.tabs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl Navigator for TerminalHost {
    async fn navigate(&self, tab_id: TabId, url: &str) -> Result<(), HostError> {
        let mut tabs = self.lock_tabs();
        let Some(current) = tabs.get_mut(&tab_id) else {
            return Err(HostError::TabClosed(tab_id));
        };
        rescue_info!("Tab {} navigating from {} to {}", tab_id, current, url);
        *current = url.to_string();
        println!("-> tab {tab_id}: {url}");
        Ok(())
    }

    async fn close_tab(&self, tab_id: TabId) -> Result<(), HostError> {
        if self.lock_tabs().remove(&tab_id).is_none() {
            return Err(HostError::TabClosed(tab_id));
        }
        println!("-> tab {tab_id} closed");
        Ok(())
    }
}

#[async_trait::async_trait]
impl TabQuery for TerminalHost {
    async fn tab_url(&self, tab_id: TabId) -> Result<String, HostError> {
        self.current_url(tab_id)
            .ok_or(HostError::TabClosed(tab_id))
    }
}
