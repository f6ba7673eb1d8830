//! Rescue engine: archive lookups, the recovery workflow and its runtime.
mod archive;
mod engine;
mod monitor;
mod types;
mod workflow;

pub use archive::{
    parse_availability, ArchiveLookup, LookupSettings, ReqwestArchiveLookup, DEFAULT_ENDPOINT,
};
pub use engine::{EngineError, EngineHandle, EngineSettings};
pub use monitor::{NavigationMonitor, TabQuery};
pub use types::{EngineEvent, HostError, LookupError, LookupFailureKind, WorkflowOutcome};
pub use workflow::{
    ChannelStatusSink, Navigator, RecoveryWorkflow, StatusSink, WorkflowTimings,
};
