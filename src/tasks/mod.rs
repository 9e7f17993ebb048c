//! Background Tasks Module
//!
//! Contains background tasks that run periodically while the service is up.
//!
//! # Tasks
//! - TTL Cleanup: Purges expired shared store entries at configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
