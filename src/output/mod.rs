// src/output/mod.rs

//! Multiplexed, labelled terminal output for child processes.
//!
//! - [`prefixed_writer`] labels each line with the script's name.
//! - [`palette`] assigns a stable colour per runner index.
//! - [`OutputTarget`] decides where each runner's streams end up: the real
//!   terminal in production, in-memory buffers in tests.

pub mod palette;
pub mod prefixed_writer;

use std::io::{self, Write};

pub use prefixed_writer::PrefixedWriter;

use crate::types::StreamKind;

/// Sink factory for runner output.
///
/// Called once per stream each time a runner starts a child; `index` is the
/// runner's position in its group.
pub trait OutputTarget: Send + Sync {
    fn writer(&self, index: usize, stream: StreamKind) -> Box<dyn Write + Send>;
}

/// Writes to the supervisor's own stdout and stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct Terminal;

impl OutputTarget for Terminal {
    fn writer(&self, _index: usize, stream: StreamKind) -> Box<dyn Write + Send> {
        match stream {
            StreamKind::Stdout => Box::new(io::stdout()),
            StreamKind::Stderr => Box::new(io::stderr()),
        }
    }
}
