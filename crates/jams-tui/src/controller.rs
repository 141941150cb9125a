//! ViewStateController — single owner of the playlist URL and `RequestState`.
//!
//! All network interaction goes through here.  `submit()` never blocks: it
//! moves the state to `Loading`, spawns one request task and returns.  The
//! task reports back with a [`Settled`] message on the channel handed to
//! [`ViewStateController::new`]; the owner feeds it to
//! [`ViewStateController::on_settled`].
//!
//! Only one request may be in flight.  A submit while `Loading` is ignored.
//! Every accepted submit gets a fresh generation number and cancellation
//! token; `reset()` cancels the token and bumps the generation so a late
//! settlement from an abandoned request is dropped.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use jams_proto::api::{is_blank, ApiResponse};

use crate::client::{FetchError, ProxyClient};
use crate::view_state::{transition, RequestState, ViewEvent, EMPTY_URL_MESSAGE};

/// Outcome of one request task, tagged with the generation that issued it.
#[derive(Debug)]
pub struct Settled {
    pub generation: u64,
    pub result: Result<ApiResponse, FetchError>,
}

/// What a call to `submit()` or `regenerate()` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Request issued; the view should scroll to the top.
    Started { generation: u64 },
    /// Input was blank; state is now `Error` and nothing was sent.
    Rejected,
    /// A request is already in flight.
    Ignored,
    /// `regenerate()` with no stored URL.
    Skipped,
}

pub struct ViewStateController {
    state: RequestState,
    playlist_url: String,
    client: ProxyClient,
    settled_tx: mpsc::Sender<Settled>,
    generation: u64,
    in_flight: Option<CancellationToken>,
}

impl ViewStateController {
    pub fn new(client: ProxyClient, settled_tx: mpsc::Sender<Settled>) -> Self {
        Self {
            state: RequestState::Idle,
            playlist_url: String::new(),
            client,
            settled_tx,
            generation: 0,
            in_flight: None,
        }
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn playlist_url(&self) -> &str {
        &self.playlist_url
    }

    pub fn set_playlist_url(&mut self, value: impl Into<String>) {
        self.playlist_url = value.into();
    }

    fn apply(&mut self, event: ViewEvent) {
        let before = self.state.label();
        self.state = transition(std::mem::take(&mut self.state), event);
        debug!("view state {} → {}", before, self.state.label());
    }

    /// Validate the stored URL and start one request for it.
    pub fn submit(&mut self) -> SubmitOutcome {
        if self.state.is_loading() {
            debug!("submit ignored: request {} still in flight", self.generation);
            return SubmitOutcome::Ignored;
        }
        if is_blank(&self.playlist_url) {
            self.apply(ViewEvent::Rejected(EMPTY_URL_MESSAGE.to_string()));
            return SubmitOutcome::Rejected;
        }

        self.generation += 1;
        let generation = self.generation;
        let token = CancellationToken::new();
        self.in_flight = Some(token.clone());
        self.apply(ViewEvent::Submitted);

        info!("requesting recommendations for {}", self.playlist_url);

        let client = self.client.clone();
        let tx = self.settled_tx.clone();
        let url = self.playlist_url.clone();
        tokio::spawn(async move {
            let result = tokio::select! {
                _ = token.cancelled() => {
                    debug!("request {} cancelled", generation);
                    return;
                }
                result = client.recommend(&url) => result,
            };
            if tx.send(Settled { generation, result }).await.is_err() {
                debug!("settlement channel closed, dropping request {}", generation);
            }
        });

        SubmitOutcome::Started { generation }
    }

    /// Resubmit the stored URL.  No-op when it is blank.
    pub fn regenerate(&mut self) -> SubmitOutcome {
        if is_blank(&self.playlist_url) {
            return SubmitOutcome::Skipped;
        }
        self.submit()
    }

    /// Clear the URL, cancel any in-flight request and return to `Idle`.
    pub fn reset(&mut self) {
        if let Some(token) = self.in_flight.take() {
            token.cancel();
            self.generation += 1;
        }
        self.playlist_url.clear();
        self.apply(ViewEvent::Reset);
    }

    /// Fold a finished request into the state.  Returns `true` when the
    /// state changed; stale generations are dropped.
    pub fn on_settled(&mut self, settled: Settled) -> bool {
        if settled.generation != self.generation || !self.state.is_loading() {
            debug!(
                "dropping stale settlement {} (current {})",
                settled.generation, self.generation
            );
            return false;
        }
        self.in_flight = None;

        match settled.result {
            Ok(response) => {
                info!(
                    "received {} recommendations",
                    response.recommendations.as_ref().map_or(0, Vec::len)
                );
                self.apply(ViewEvent::Succeeded(response));
            }
            Err(e) => {
                warn!("recommendation request failed: {}", e);
                self.apply(ViewEvent::Failed(e.user_message()));
            }
        }
        true
    }
}

impl Drop for ViewStateController {
    fn drop(&mut self) {
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    // Nothing listens on port 9 locally; these tests never reach the network.
    fn controller() -> (ViewStateController, mpsc::Receiver<Settled>) {
        let client = ProxyClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let (tx, rx) = mpsc::channel(4);
        (ViewStateController::new(client, tx), rx)
    }

    #[tokio::test]
    async fn test_blank_input_is_rejected_locally() {
        let (mut c, mut rx) = controller();
        for input in ["", "   ", "\t\n"] {
            c.set_playlist_url(input);
            assert_eq!(c.submit(), SubmitOutcome::Rejected);
            assert_eq!(c.state(), &RequestState::Error(EMPTY_URL_MESSAGE.into()));
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_regenerate_without_url_is_noop() {
        let (mut c, mut rx) = controller();
        assert_eq!(c.regenerate(), SubmitOutcome::Skipped);
        assert_eq!(c.state(), &RequestState::Idle);

        for blank in ["   ", "\t\n"] {
            c.set_playlist_url(blank);
            assert_eq!(c.regenerate(), SubmitOutcome::Skipped);
            assert_eq!(c.state(), &RequestState::Idle);
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_reset_clears_url_and_state() {
        let (mut c, _rx) = controller();
        c.set_playlist_url("");
        c.submit();
        c.set_playlist_url("https://open.spotify.com/playlist/abc");
        c.reset();
        assert_eq!(c.state(), &RequestState::Idle);
        assert_eq!(c.playlist_url(), "");
        c.reset();
        assert_eq!(c.state(), &RequestState::Idle);
        assert_eq!(c.playlist_url(), "");
    }

    #[tokio::test]
    async fn test_stale_settlement_is_dropped() {
        let (mut c, _rx) = controller();
        c.set_playlist_url("https://open.spotify.com/playlist/abc");
        let SubmitOutcome::Started { generation } = c.submit() else {
            panic!("expected a started request");
        };
        c.reset();

        let changed = c.on_settled(Settled {
            generation,
            result: Err(FetchError::TimedOut),
        });
        assert!(!changed);
        assert_eq!(c.state(), &RequestState::Idle);
    }
}
