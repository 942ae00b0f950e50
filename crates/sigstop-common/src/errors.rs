//! Error types for sigstop.
//!
//! # Rust Learning Note
//!
//! Process control is best-effort: most failures (an entry that is not a
//! pid, a status file that vanished) are recovered where they happen and
//! never reach the caller. The variants below are the ones that do travel,
//! either inside a signal report or out of target and configuration parsing.
//!
//! ```rust
//! use sigstop_common::{ProcessError, ProcessResult};
//!
//! fn lookup(name: &str) -> ProcessResult<()> {
//!     Err(ProcessError::not_found(name))
//! }
//!
//! assert!(lookup("sshd").is_err());
//! ```

use thiserror::Error;

use crate::types::{ControlSignal, Pid};

/// Process-specific error types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    #[error("Process not found: {id}")]
    NotFound { id: String },

    #[error("Failed to send {signal} to process {pid}: {reason}")]
    SignalFailed {
        pid: Pid,
        signal: ControlSignal,
        reason: String,
    },

    #[error("Invalid process target '{input}': {reason}")]
    InvalidTarget { input: String, reason: String },

    #[error("Process configuration error: {id} - {reason}")]
    Configuration { id: String, reason: String },
}

impl ProcessError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn signal_failed(pid: Pid, signal: ControlSignal, reason: impl Into<String>) -> Self {
        Self::SignalFailed {
            pid,
            signal,
            reason: reason.into(),
        }
    }

    pub fn invalid_target(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTarget {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub fn configuration(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// The pid this error is about, when it concerns a single process.
    pub fn pid(&self) -> Option<Pid> {
        match self {
            Self::SignalFailed { pid, .. } => Some(*pid),
            _ => None,
        }
    }
}

/// Result type for process operations.
pub type ProcessResult<T> = std::result::Result<T, ProcessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_error_construction() {
        let error = ProcessError::not_found("sshd");
        assert!(matches!(error, ProcessError::NotFound { .. }));
        assert_eq!(format!("{}", error), "Process not found: sshd");

        let error = ProcessError::invalid_target("-3", "pid must be positive");
        assert!(format!("{}", error).contains("pid must be positive"));
    }

    #[test]
    fn test_signal_failed_message() {
        let error = ProcessError::signal_failed(Pid::from_raw(42), ControlSignal::Stop, "EPERM");
        assert_eq!(
            error.to_string(),
            "Failed to send SIGSTOP to process 42: EPERM"
        );
        assert_eq!(error.pid(), Some(Pid::from_raw(42)));
    }

    #[test]
    fn test_pid_only_for_signal_errors() {
        assert_eq!(ProcessError::not_found("x").pid(), None);
        assert_eq!(ProcessError::configuration("cfg", "bad").pid(), None);
    }
}
