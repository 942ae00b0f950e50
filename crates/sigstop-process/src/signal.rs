//! Job-control signal delivery.
//!
//! Signals go through the [`SignalSender`] seam so the tree logic can be
//! exercised against a fake process table. [`KillSender`] is the real
//! implementation backed by `kill(2)`.

use sigstop_common::{ControlSignal, Pid, ProcessError, ProcessResult};
use tracing::{info, warn};

/// Delivers control signals to processes by pid.
pub trait SignalSender: Send + Sync {
    /// Send `signal` to `pid`.
    fn send(&self, pid: Pid, signal: ControlSignal) -> ProcessResult<()>;

    /// Check whether `pid` is alive without affecting it.
    fn probe(&self, pid: Pid) -> ProcessResult<bool>;
}

/// Signal sender backed by the operating system's `kill`.
#[derive(Debug, Clone, Copy, Default)]
pub struct KillSender;

impl SignalSender for KillSender {
    fn send(&self, pid: Pid, signal: ControlSignal) -> ProcessResult<()> {
        // kill(0) and kill(-n) address process groups; never go there.
        if !pid.is_valid() {
            return Err(ProcessError::signal_failed(pid, signal, "pid must be positive"));
        }

        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};

            let nix_signal = match signal {
                ControlSignal::Stop => Signal::SIGSTOP,
                ControlSignal::Continue => Signal::SIGCONT,
            };
            kill(nix::unistd::Pid::from_raw(pid.as_raw()), nix_signal)
                .map_err(|e| ProcessError::signal_failed(pid, signal, e.to_string()))
        }

        #[cfg(not(unix))]
        {
            Err(ProcessError::signal_failed(
                pid,
                signal,
                "job-control signals are not supported on this platform",
            ))
        }
    }

    fn probe(&self, pid: Pid) -> ProcessResult<bool> {
        crate::check::process_exists(pid)
    }
}

/// Outcome of one stop or resume, including any propagation to children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalReport {
    pub signal: ControlSignal,
    /// Pids the signal was delivered to, in delivery order.
    pub delivered: Vec<Pid>,
    /// Pids that were deliberately left alone.
    pub skipped: Vec<Pid>,
    /// One entry per failed delivery.
    pub failed: Vec<ProcessError>,
}

impl SignalReport {
    pub fn new(signal: ControlSignal) -> Self {
        Self {
            signal,
            delivered: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Record the result of one delivery attempt.
    pub fn record(&mut self, pid: Pid, result: ProcessResult<()>) {
        match result {
            Ok(()) => {
                info!("Sent {} to process {}", self.signal, pid);
                self.delivered.push(pid);
            }
            Err(e) => {
                warn!("{}", e);
                self.failed.push(e);
            }
        }
    }

    pub fn skip(&mut self, pid: Pid) {
        self.skipped.push(pid);
    }

    /// Fold another report for the same signal into this one.
    pub fn merge(&mut self, other: SignalReport) {
        self.delivered.extend(other.delivered);
        self.skipped.extend(other.skipped);
        self.failed.extend(other.failed);
    }

    /// True when no delivery failed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of processes a delivery was attempted for.
    pub fn attempted(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }
}
