#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send the tab to `url` (the original page, when abandoning a rescue).
    Navigate { url: String },
    /// Ask the controller to close the tab.
    CloseTab,
    /// Redirect to the snapshot after the found delay; only emitted by pages
    /// that own the redirect themselves.
    ScheduleRedirect { archived_url: String },
}
