//! Mock backend plus a real proxy in front of it, both on ephemeral ports.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use tokio::net::TcpListener;

use jams_proxy::ProxyState;

pub const PLAYLIST: &str = "https://open.spotify.com/playlist/3XyDvjoxiae0oWpfJ4kga9";

#[derive(Clone)]
pub enum Reply {
    /// Status plus a raw JSON body.
    Json(StatusCode, String),
    /// Same as `Json`, after a pause.
    Delayed(Duration, StatusCode, String),
    /// Never answer within any sane deadline.
    Hang,
}

#[derive(Clone)]
struct MockState {
    reply: Reply,
    calls: Arc<AtomicUsize>,
    last_body: Arc<Mutex<Option<serde_json::Value>>>,
}

/// Mock upstream plus the proxy relaying to it.
pub struct Stack {
    pub proxy_url: String,
    /// The mock itself, for talking to it without the proxy.
    pub upstream_url: String,
    calls: Arc<AtomicUsize>,
    last_body: Arc<Mutex<Option<serde_json::Value>>>,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl Stack {
    pub async fn start(reply: Reply) -> Self {
        let calls = Arc::new(AtomicUsize::new(0));
        let last_body = Arc::new(Mutex::new(None));
        let state = MockState {
            reply,
            calls: calls.clone(),
            last_body: last_body.clone(),
        };
        let upstream = Router::new()
            .route("/api/recommendations", post(answer))
            .with_state(state);

        let upstream_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let upstream_url = format!("http://{}", upstream_listener.local_addr().unwrap());
        let upstream_handle = tokio::spawn(async move {
            let _ = axum::serve(upstream_listener, upstream).await;
        });

        let proxy_state = ProxyState::new(upstream_url.clone(), Duration::from_secs(10)).unwrap();
        let proxy_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let proxy_url = format!("http://{}", proxy_listener.local_addr().unwrap());
        let proxy_handle = tokio::spawn(async move {
            let _ = jams_proxy::serve(proxy_listener, proxy_state).await;
        });

        Self {
            proxy_url,
            upstream_url,
            calls,
            last_body,
            handles: vec![upstream_handle, proxy_handle],
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_body(&self) -> Option<serde_json::Value> {
        self.last_body.lock().unwrap().clone()
    }
}

impl Drop for Stack {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

async fn answer(State(state): State<MockState>, body: Bytes) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);
    *state.last_body.lock().unwrap() = serde_json::from_slice(&body).ok();

    let (status, body) = match state.reply {
        Reply::Json(status, body) => (status, body),
        Reply::Delayed(pause, status, body) => {
            tokio::time::sleep(pause).await;
            (status, body)
        }
        Reply::Hang => {
            tokio::time::sleep(Duration::from_secs(60)).await;
            return StatusCode::GATEWAY_TIMEOUT.into_response();
        }
    };
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

/// An address nothing listens on.
pub async fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

pub fn sample_success_body() -> String {
    r#"{"success":true,"playlist_details":{"name":"Late Night Drives","owner":"haider","total_tracks":42,"album_art":null},"recommendations":[{"id":"4uLU6hMCjMI75M1A2tKUQC","name":"Midnight City","artist":"M83","album":"Hurry Up, We're Dreaming","release_date":"2011-10-14","popularity":78,"duration_ms":243960,"duration_readable":"4:03","preview_url":null,"external_url":"https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC","uri":"spotify:track:4uLU6hMCjMI75M1A2tKUQC","album_art":"https://i.scdn.co/image/abc"},{"id":"0VjIjW4GlUZAMYd2vXMi3b","name":"Blinding Lights","artist":"The Weeknd","album":"After Hours","release_date":"2020-03-20","popularity":91,"duration_ms":200040,"duration_readable":"3:20","preview_url":"https://p.scdn.co/mp3-preview/xyz","external_url":"https://open.spotify.com/track/0VjIjW4GlUZAMYd2vXMi3b","uri":"spotify:track:0VjIjW4GlUZAMYd2vXMi3b","album_art":null}],"metadata":{"total_tracks_analyzed":42,"reddit_posts_found":17,"recommendations_requested":10,"recommendations_found":2},"error":null}"#
        .to_string()
}
