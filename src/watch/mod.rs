// src/watch/mod.rs

//! File watching for `--watch`.
//!
//! Turns filesystem activity under a directory into at most one callback per
//! short interval. It knows nothing about process groups; the caller decides
//! what a change means (in practice, restarting the group).

pub mod path_utils;
pub mod watcher;

pub use watcher::{ChangeKind, POLL_INTERVAL, WatcherHandle, watch};
