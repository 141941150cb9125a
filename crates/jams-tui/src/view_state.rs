//! What the screen shows, as one owned value.
//!
//! # States
//! ```text
//!  Idle                 — waiting for a playlist link
//!  Loading              — one request in flight
//!  Success(response)    — recommendations received
//!  Error(message)       — input rejected or the request failed
//! ```
//!
//! ```text
//!  Idle    --Submitted-->  Loading  --Succeeded-->  Success
//!  Idle    --Rejected--->  Error    <--Failed-----  Loading
//!  Success --Submitted-->  Loading                  (regenerate)
//!  *       --Reset------>  Idle
//! ```
//!
//! `transition` is pure; the controller owns the value and the views only
//! read it.

use jams_proto::api::ApiResponse;

pub const EMPTY_URL_MESSAGE: &str = "Please enter a Spotify playlist URL";
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";
pub const UNREACHABLE_MESSAGE: &str =
    "Failed to connect to the server. Please make sure the backend is running and try again.";
pub const TIMEOUT_MESSAGE: &str = "The server took too long to respond. Please try again.";
pub const INVALID_RESPONSE_MESSAGE: &str =
    "Received an invalid response from the server. Please try again.";

#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestState {
    #[default]
    Idle,
    Loading,
    Success(ApiResponse),
    Error(String),
}

impl RequestState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Short label for the status bar.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "READY",
            Self::Loading => "LOADING",
            Self::Success(_) => "RESULTS",
            Self::Error(_) => "ERROR",
        }
    }
}

/// Inputs to the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    /// A request was issued.
    Submitted,
    /// Input failed validation before any request was made.
    Rejected(String),
    /// The in-flight request produced a conforming, successful envelope.
    Succeeded(ApiResponse),
    /// The in-flight request failed; the message is user-facing.
    Failed(String),
    /// Explicit user reset.
    Reset,
}

/// Next state for `event` applied to `state`.
///
/// Settlements (`Succeeded`, `Failed`) only apply while `Loading`; in any
/// other state they are dropped and the state is returned unchanged.
pub fn transition(state: RequestState, event: ViewEvent) -> RequestState {
    match (state, event) {
        (_, ViewEvent::Reset) => RequestState::Idle,
        (_, ViewEvent::Submitted) => RequestState::Loading,
        (_, ViewEvent::Rejected(message)) => RequestState::Error(message),
        (RequestState::Loading, ViewEvent::Succeeded(response)) => RequestState::Success(response),
        (RequestState::Loading, ViewEvent::Failed(message)) => RequestState::Error(message),
        (state, ViewEvent::Succeeded(_) | ViewEvent::Failed(_)) => state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok_response() -> ApiResponse {
        ApiResponse {
            success: true,
            playlist_details: None,
            recommendations: Some(Vec::new()),
            metadata: None,
            error: None,
        }
    }

    fn all_states() -> Vec<RequestState> {
        vec![
            RequestState::Idle,
            RequestState::Loading,
            RequestState::Success(ok_response()),
            RequestState::Error("boom".into()),
        ]
    }

    #[test]
    fn test_happy_path() {
        let s = transition(RequestState::Idle, ViewEvent::Submitted);
        assert_eq!(s, RequestState::Loading);
        let s = transition(s, ViewEvent::Succeeded(ok_response()));
        assert_eq!(s, RequestState::Success(ok_response()));
    }

    #[test]
    fn test_failure_and_rejection() {
        let s = transition(RequestState::Loading, ViewEvent::Failed("nope".into()));
        assert_eq!(s, RequestState::Error("nope".into()));

        let s = transition(RequestState::Idle, ViewEvent::Rejected(EMPTY_URL_MESSAGE.into()));
        assert_eq!(s, RequestState::Error(EMPTY_URL_MESSAGE.into()));
    }

    #[test]
    fn test_reset_from_every_state_is_idle_and_idempotent() {
        for state in all_states() {
            let once = transition(state, ViewEvent::Reset);
            assert_eq!(once, RequestState::Idle);
            let twice = transition(once.clone(), ViewEvent::Reset);
            assert_eq!(twice, once);
        }
    }

    #[test]
    fn test_settlement_outside_loading_is_dropped() {
        for state in [RequestState::Idle, RequestState::Error("x".into())] {
            let after = transition(state.clone(), ViewEvent::Succeeded(ok_response()));
            assert_eq!(after, state);
            let after = transition(state.clone(), ViewEvent::Failed("late".into()));
            assert_eq!(after, state);
        }
    }

    #[test]
    fn test_regenerate_from_success_goes_back_to_loading() {
        let s = transition(RequestState::Success(ok_response()), ViewEvent::Submitted);
        assert!(s.is_loading());
    }
}
