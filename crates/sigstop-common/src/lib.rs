//! # Sigstop Common
//!
//! Common types shared across the sigstop crates.
//!
//! This crate provides the foundational abstractions the process crate and
//! the command-line tool build upon: the process error type and the small
//! domain types used to address processes and signals.

pub mod errors;
pub mod types;

// Re-export commonly used items
pub use errors::{ProcessError, ProcessResult};
pub use types::{ControlSignal, Pid};
