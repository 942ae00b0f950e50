//! # Sigstop Process
//!
//! Process discovery and job-control signalling over procfs.
//!
//! This crate provides:
//! - Process enumeration from a procfs root (`/proc` by default)
//! - Status record parsing (name and parent pid)
//! - Lazily resolved process handles with parent/child queries
//! - SIGSTOP / SIGCONT delivery, optionally propagated down the process tree
//!
//! Nothing here caches the process tree: every query re-reads live state,
//! and every signal failure is reported rather than raised.

pub mod check;
pub mod handle;
pub mod procfs;
pub mod signal;
pub mod status;
pub mod target;

// Re-export main types
pub use check::process_exists;
pub use handle::{ProcessHandle, ProcessInfo, Resolution, TreeEntry};
pub use procfs::{ProcessTable, DEFAULT_PROC_ROOT};
pub use signal::{KillSender, SignalReport, SignalSender};
pub use target::Target;
