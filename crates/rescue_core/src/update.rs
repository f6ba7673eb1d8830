use crate::{Effect, Msg, SearchState, StatusPage};

/// Pure update function: applies a message to the status page and returns any effects.
pub fn update(mut state: StatusPage, msg: Msg) -> (StatusPage, Vec<Effect>) {
    let effects = match msg {
        Msg::StatusReceived(status) => {
            if !state.apply_update(status) {
                return (state, Vec::new());
            }
            match state.search_state().clone() {
                SearchState::Found { archived_url, .. } if state.claim_redirect() => {
                    vec![Effect::ScheduleRedirect { archived_url }]
                }
                _ => Vec::new(),
            }
        }
        Msg::Tick { advance } => {
            state.advance_progress(advance);
            Vec::new()
        }
        Msg::CloseClicked => {
            if !state.is_persistent() {
                return (state, Vec::new());
            }
            match state.original_url() {
                Some(url) => vec![Effect::Navigate {
                    url: url.to_string(),
                }],
                None => vec![Effect::CloseTab],
            }
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
