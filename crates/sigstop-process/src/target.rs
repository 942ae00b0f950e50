//! User-facing process targets.

use std::fmt;
use std::str::FromStr;

use sigstop_common::{Pid, ProcessError};

/// A process as named on the command line: a pid, or an executable name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Pid(Pid),
    Name(String),
}

impl FromStr for Target {
    type Err = ProcessError;

    /// All-digit input is a pid; anything else is a name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ProcessError::invalid_target(s, "target cannot be empty"));
        }

        if s.bytes().all(|b| b.is_ascii_digit()) {
            let pid = s
                .parse::<Pid>()
                .map_err(|e| ProcessError::invalid_target(s, e.to_string()))?;
            if !pid.is_valid() {
                return Err(ProcessError::invalid_target(s, "pid must be positive"));
            }
            return Ok(Target::Pid(pid));
        }

        Ok(Target::Name(s.to_string()))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Pid(pid) => write!(f, "pid {}", pid),
            Target::Name(name) => write!(f, "'{}'", name),
        }
    }
}
