//! eventpass event server library.
//!
//! Attendee login, QR badges, booth redemptions with per-item quotas, and
//! admin tools for the roster and the redemption audit log. The binary in
//! `main.rs` wires configuration, tracing and Sentry around [`routes::router`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::router;
pub use state::AppState;
