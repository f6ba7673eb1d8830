#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Workflow pushed a new state for this page.
    StatusReceived(crate::StatusUpdate),
    /// Animation tick; `advance` is the (pseudo-random) progress step in percent.
    Tick { advance: u8 },
    /// User clicked the close button on a persistent notice.
    CloseClicked,
    /// Fallback for placeholder wiring.
    NoOp,
}
