//! Shared contract and configuration for the jams proxy and terminal client.

pub mod api;
pub mod config;
pub mod platform;
