//! HTTP request handlers

pub mod admin;
pub mod download;
pub mod health;
pub mod search;

pub use admin::*;
pub use download::*;
pub use health::*;
pub use search::*;
