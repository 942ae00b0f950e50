//! Process discovery over a procfs root.
//!
//! [`ProcessTable`] holds no process data. It only names where to look
//! (`/proc` by default) and how to signal, so every query below is a fresh
//! scan of live state. Processes may come and go between two calls, or
//! between enumeration and a per-process read; results are a best-effort
//! snapshot and vanished processes simply drop out.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sigstop_common::{ControlSignal, Pid, ProcessError, ProcessResult};
use tracing::{debug, warn};

use crate::handle::ProcessHandle;
use crate::signal::{KillSender, SignalSender};
use crate::status;
use crate::target::Target;

/// Default procfs mount point.
pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Access path to a process table: a procfs root plus a signal sender.
///
/// Cloning is cheap; handles carry a clone of the table they came from.
#[derive(Clone)]
pub struct ProcessTable {
    root: Arc<Path>,
    signals: Arc<dyn SignalSender>,
    protected: Arc<HashSet<Pid>>,
}

impl ProcessTable {
    /// The live system table: `/proc` signalled through `kill`.
    pub fn system() -> Self {
        Self::with_root(DEFAULT_PROC_ROOT)
    }

    /// A table rooted elsewhere (a container's procfs, or a test fixture),
    /// still signalled through `kill`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self::new(root, Arc::new(KillSender))
    }

    pub fn new(root: impl Into<PathBuf>, signals: Arc<dyn SignalSender>) -> Self {
        Self {
            root: Arc::from(root.into()),
            signals,
            protected: Arc::new(HashSet::new()),
        }
    }

    /// Never stop `pid`, even when it is part of a signalled subtree.
    ///
    /// Stopping the pid running the traversal would freeze it halfway.
    pub fn protect(mut self, pid: Pid) -> Self {
        Arc::make_mut(&mut self.protected).insert(pid);
        self
    }

    pub fn is_protected(&self, pid: Pid) -> bool {
        self.protected.contains(&pid)
    }

    /// Build a handle for `pid`. No lookup happens until an attribute is read.
    pub fn handle(&self, pid: Pid) -> ProcessHandle {
        ProcessHandle::new(pid, self.clone())
    }

    /// Enumerate every live process id.
    ///
    /// Entries whose names are not positive integers (`self`, `meminfo`,
    /// ...) are skipped. No ordering is guaranteed.
    pub fn all_pids(&self) -> Vec<Pid> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to read process table {}: {}", self.root.display(), e);
                return Vec::new();
            }
        };

        entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name();
                match name.to_str().map(str::parse::<Pid>) {
                    Some(Ok(pid)) if pid.is_valid() => Some(pid),
                    _ => {
                        debug!("Skipping non-process entry {:?}", name);
                        None
                    }
                }
            })
            .collect()
    }

    /// True if the table currently has an entry for `pid`.
    pub fn contains(&self, pid: Pid) -> bool {
        pid.is_valid() && self.root.join(pid.to_string()).is_dir()
    }

    fn status_path(&self, pid: Pid) -> PathBuf {
        self.root.join(pid.to_string()).join("status")
    }

    /// Read the status record of `pid` as lines.
    ///
    /// An invalid pid or an unreadable file yields an empty record; that is
    /// the "no data" answer, not an error.
    pub fn read_status(&self, pid: Pid) -> Vec<String> {
        if !pid.is_valid() {
            return Vec::new();
        }

        let path = self.status_path(pid);
        match fs::read(&path) {
            Ok(bytes) => status::split_record(&String::from_utf8_lossy(&bytes)),
            Err(e) => {
                debug!("Can't open {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }

    /// Processes whose parent pid is `pid`.
    pub fn children_of(&self, pid: Pid) -> Vec<ProcessHandle> {
        self.all_pids()
            .into_iter()
            .map(|candidate| self.handle(candidate))
            .filter_map(|mut candidate| {
                (candidate.parent_pid() == Some(pid)).then_some(candidate)
            })
            .collect()
    }

    /// Processes whose name is exactly `name`.
    pub fn by_name(&self, name: &str) -> Vec<ProcessHandle> {
        self.all_pids()
            .into_iter()
            .map(|candidate| self.handle(candidate))
            .filter_map(|mut candidate| (candidate.name() == Some(name)).then_some(candidate))
            .collect()
    }

    /// Resolve a user-supplied target into handles.
    ///
    /// A pid must currently exist; a name must match at least one process.
    pub fn resolve(&self, target: &Target) -> ProcessResult<Vec<ProcessHandle>> {
        match target {
            Target::Pid(pid) => {
                if self.contains(*pid) {
                    Ok(vec![self.handle(*pid)])
                } else {
                    Err(ProcessError::not_found(pid.to_string()))
                }
            }
            Target::Name(name) => {
                let matches = self.by_name(name);
                if matches.is_empty() {
                    Err(ProcessError::not_found(name.clone()))
                } else {
                    debug!("Name '{}' matched {} processes", name, matches.len());
                    Ok(matches)
                }
            }
        }
    }

    pub(crate) fn send(&self, pid: Pid, signal: ControlSignal) -> ProcessResult<()> {
        self.signals.send(pid, signal)
    }

    pub(crate) fn probe(&self, pid: Pid) -> ProcessResult<bool> {
        self.signals.probe(pid)
    }
}

impl fmt::Debug for ProcessTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessTable")
            .field("root", &self.root)
            .field("protected", &self.protected)
            .finish_non_exhaustive()
    }
}
