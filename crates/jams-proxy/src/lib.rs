//! Recommendation relay: one validated upstream call per client request.

pub mod proxy;

pub use proxy::{relay, router, serve, start_server, ProxyError, ProxyState};
