//! ticketbot HTTP server.
//!
//! This crate wires the fact store, the hosted ChatKit conversation proxy and
//! the session issuer into an Axum router.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{app, router};
pub use state::AppState;
