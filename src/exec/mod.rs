// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`runner`] owns one child process slot: command construction, spawn,
//!   labelled output pumping, exit reporting.
//! - [`group`] is the supervisor: it starts a set of runners together,
//!   detects when all of them have exited and restarts them as one unit.
//! - [`kill`] signals an arbitrary pid for `wyp kill`.

pub mod group;
pub mod kill;
pub mod runner;

pub use group::ProcessGroup;
pub use kill::kill_pid;
pub use runner::{ProcessRunner, RunnerStatus, build_command, resolve_shell};
