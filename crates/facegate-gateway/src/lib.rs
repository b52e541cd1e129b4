//! # Facegate Gateway
//!
//! Authenticated HTTP gateway in front of the face recognition service.
//! The gateway verifies caller identity, rate limits face searches per
//! identity, stages uploads transiently on disk, and relays recognizer
//! responses with a stable error taxonomy.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod rate_limit;
pub mod routes;
pub mod server;
pub mod state;
pub mod upload;

pub use config::GatewayConfig;
pub use error::{ErrorCode, GatewayError};
pub use server::{run_server, run_server_with_shutdown};
pub use state::AppState;
