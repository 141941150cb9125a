//! Terminal client for RedditJams playlist recommendations.

pub mod action;
pub mod app;
pub mod client;
pub mod component;
pub mod components;
pub mod controller;
pub mod theme;
pub mod view_state;
pub mod widgets;

pub use client::{FetchError, ProxyClient};
pub use controller::{Settled, SubmitOutcome, ViewStateController};
pub use view_state::{transition, RequestState, ViewEvent};
