//! Koi Cache - A pluggable key-value cache layer
//!
//! Opens named cache backends (file, memory, remote) through a single
//! facade and serves them over a small HTTP API.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::spawn_cleanup_task;
