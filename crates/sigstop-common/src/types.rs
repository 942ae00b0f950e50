//! Core domain types used throughout sigstop.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Process identifier as found in the process table.
///
/// Any `i32` can be held, including `0` (the parent of the kernel's root
/// tasks); only positive values address a signalable process.
///
/// # Example
/// ```
/// use sigstop_common::Pid;
///
/// let pid: Pid = "42".parse().unwrap();
/// assert_eq!(pid.as_raw(), 42);
/// assert!(pid.is_valid());
/// assert!(!Pid::from_raw(0).is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pid(i32);

impl Pid {
    /// Creates a Pid from a raw integer.
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Returns the raw integer value.
    pub const fn as_raw(self) -> i32 {
        self.0
    }

    /// Returns true if this pid can name a live process.
    pub const fn is_valid(self) -> bool {
        self.0 > 0
    }

    /// Pid of the calling process.
    pub fn current() -> Self {
        Self(std::process::id() as i32)
    }
}

impl FromStr for Pid {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i32>().map(Self)
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Control signal understood by the process crate.
///
/// Only the two job-control signals are modelled: stopping halts scheduling
/// of the target until it is continued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlSignal {
    /// SIGSTOP
    Stop,
    /// SIGCONT
    Continue,
}

impl ControlSignal {
    /// Returns the conventional signal name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlSignal::Stop => "SIGSTOP",
            ControlSignal::Continue => "SIGCONT",
        }
    }
}

impl fmt::Display for ControlSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pid_parse() {
        assert_eq!("150".parse::<Pid>().unwrap(), Pid::from_raw(150));
        assert_eq!(" 7\n".parse::<Pid>().unwrap(), Pid::from_raw(7));
        assert!("self".parse::<Pid>().is_err());
        assert!("".parse::<Pid>().is_err());
    }

    #[test]
    fn test_pid_validity() {
        assert!(Pid::from_raw(1).is_valid());
        assert!(!Pid::from_raw(0).is_valid());
        assert!(!Pid::from_raw(-1).is_valid());
        assert!(Pid::current().is_valid());
    }

    #[test]
    fn test_pid_serializes_as_integer() {
        let json = serde_json::to_string(&Pid::from_raw(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_control_signal_names() {
        assert_eq!(ControlSignal::Stop.as_str(), "SIGSTOP");
        assert_eq!(ControlSignal::Continue.to_string(), "SIGCONT");
    }
}
