//! Snapshot-context rotation
//!
//! Keeps a bounded pool of index snapshot contexts alive and fresh so deep
//! pagination stays consistent without long-lived scroll cursors. A single
//! background task drives the rotation clock; readers only ever touch a short
//! round-robin critical section.

pub mod config;
pub mod manager;

pub use config::RotationConfig;
pub use manager::ContextRotation;

use crate::index::ContextToken;

/// Read-side seam for anything that hands out context tokens.
pub trait TokenSource: Send + Sync {
    /// One token from the active generation, round-robin, or `None` when the
    /// pool is empty. Never blocks.
    fn get(&self) -> Option<ContextToken>;
}
