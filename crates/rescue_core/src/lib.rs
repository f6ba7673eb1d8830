//! Rescue core: failure detection, URL variants, the per-tab rescue state
//! machine and the status UI, all free of IO.
mod detector;
mod effect;
mod failure;
mod lookup;
mod msg;
mod session;
mod state;
mod status;
mod update;
mod variants;
mod view_model;

pub use detector::{
    is_recoverable_status, recoverable_net_error, DetectorSettings, FailureDetector, FrameId,
    NavigationError, NavigationSignal, ResourceType, ResponseCompleted, DEFAULT_SNAPSHOT_MARKER,
    TOP_LEVEL_FRAME,
};
pub use effect::Effect;
pub use failure::{FailureCause, FailureEvent, TabId};
pub use lookup::{select_winner, LookupResult, Winner};
pub use msg::Msg;
pub use session::{RecoverySession, SearchState, SessionPhase, TransitionError};
pub use state::StatusPage;
pub use status::{
    parse_status_page_url, state_tag, status_page_url, ControlRequest, StatusPageError,
    StatusUpdate, DEFAULT_STATUS_PAGE_BASE,
};
pub use update::update;
pub use variants::{derived_variants, url_variants};
pub use view_model::{StatusView, UserAction, PROGRESS_CAP};
