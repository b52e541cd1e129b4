//! # Facegate Recognizer Client
//!
//! A thin client SDK for the face recognition service that the Facegate
//! gateway fronts.
//!
//! ## Features
//!
//! - **Streaming uploads**: search images are streamed from disk, never
//!   buffered whole
//! - **Streaming downloads**: dataset images come back as byte streams
//! - **Per-call deadlines**: each operation carries its own timeout
//! - **Stable errors**: unreachable, timed-out and HTTP failures are
//!   distinguished so callers can map them to their own taxonomy
//!
//! ## Example
//!
//! ```rust,ignore
//! use facegate_recognizer::{RecognizerClient, UpstreamConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = RecognizerClient::new(UpstreamConfig::new("http://localhost:5000"))?;
//!
//!     let matches = client
//!         .search("probe.jpg".as_ref(), "probe.jpg", "image/jpeg", 50)
//!         .await?;
//!     for m in matches {
//!         println!("{} ({:.1}%)", m.filename, m.similarity);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod types;

pub use client::{ImageDownload, RecognizerClient};
pub use config::UpstreamConfig;
pub use error::{Result, UpstreamError};
pub use types::{normalize_matches, FaceMatch};
