//! # gatehouse-server
//!
//! HTTP server for the Gatehouse authentication service: configuration
//! loading, tracing setup, service wiring, and the axum router exposing
//! `POST /login`, `POST /register`, and `GET /health`.

pub mod config;
pub mod observability;
pub mod routes;
pub mod state;

pub use config::{ServerConfig, load_config};
pub use routes::router;
pub use state::build_state;
