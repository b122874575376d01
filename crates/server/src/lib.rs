//! # Loyalty Server
//!
//! HTTP service exposing loyalty program leaderboards, pass and program
//! reads, card images and the protocol operations.

/// Configuration.
pub mod config;

/// Card rendering.
pub mod render;

/// HTTP routes.
pub mod routes;

/// Shared state.
pub mod state;

pub use crate::{config::Config, routes::app, state::AppState};
