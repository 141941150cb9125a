//! Mock recommendation backend for relay tests.
//!
//! A real axum server bound to an ephemeral port that answers
//! `POST /api/recommendations` with a canned reply and counts how often it
//! was called.
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

/// What the mock answers with.
#[derive(Clone)]
pub enum Reply {
    /// Status plus a raw body, sent as `application/json`.
    Json(StatusCode, String),
    /// Status plus a plain-text body.
    Text(StatusCode, String),
    /// Never answer within any sane deadline.
    Hang,
}

#[derive(Clone)]
struct MockState {
    reply: Reply,
    calls: Arc<AtomicUsize>,
    last_body: Arc<Mutex<Option<serde_json::Value>>>,
}

pub struct MockUpstream {
    pub url: String,
    calls: Arc<AtomicUsize>,
    last_body: Arc<Mutex<Option<serde_json::Value>>>,
    handle: tokio::task::JoinHandle<()>,
}

impl MockUpstream {
    pub async fn start(reply: Reply) -> Self {
        let calls = Arc::new(AtomicUsize::new(0));
        let last_body = Arc::new(Mutex::new(None));
        let state = MockState {
            reply,
            calls: calls.clone(),
            last_body: last_body.clone(),
        };
        let app = Router::new()
            .route("/api/recommendations", post(answer))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            url,
            calls,
            last_body,
            handle,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_body(&self) -> Option<serde_json::Value> {
        self.last_body.lock().unwrap().clone()
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn answer(State(state): State<MockState>, body: Bytes) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);
    *state.last_body.lock().unwrap() = serde_json::from_slice(&body).ok();

    match state.reply {
        Reply::Json(status, body) => {
            (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
        }
        Reply::Text(status, body) => {
            (status, [(header::CONTENT_TYPE, "text/plain")], body).into_response()
        }
        Reply::Hang => {
            tokio::time::sleep(Duration::from_secs(60)).await;
            StatusCode::GATEWAY_TIMEOUT.into_response()
        }
    }
}

/// An address nothing listens on.
pub async fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// A well-formed successful envelope, as the upstream would send it.
pub fn sample_success_body() -> String {
    r#"{"success":true,"playlist_details":{"name":"Late Night Drives","owner":"haider","total_tracks":42,"album_art":null},"recommendations":[{"id":"4uLU6hMCjMI75M1A2tKUQC","name":"Midnight City","artist":"M83","album":"Hurry Up, We're Dreaming","release_date":"2011-10-14","popularity":78,"duration_ms":243960,"duration_readable":"4:03","preview_url":null,"external_url":"https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC","uri":"spotify:track:4uLU6hMCjMI75M1A2tKUQC","album_art":"https://i.scdn.co/image/abc"},{"id":"0VjIjW4GlUZAMYd2vXMi3b","name":"Blinding Lights","artist":"The Weeknd","album":"After Hours","release_date":"2020-03-20","popularity":91,"duration_ms":200040,"duration_readable":"3:20","preview_url":"https://p.scdn.co/mp3-preview/xyz","external_url":"https://open.spotify.com/track/0VjIjW4GlUZAMYd2vXMi3b","uri":"spotify:track:0VjIjW4GlUZAMYd2vXMi3b","album_art":null}],"metadata":{"total_tracks_analyzed":42,"reddit_posts_found":17,"recommendations_requested":10,"recommendations_found":2},"error":null}"#
        .to_string()
}
