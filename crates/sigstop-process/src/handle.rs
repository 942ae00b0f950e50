//! Process handles.
//!
//! A [`ProcessHandle`] names one process by pid. It owns no OS resource and
//! may outlive the process it names; lookups on a dead pid just come back
//! empty. Name and parent pid are read from the status record on first use
//! and cached for the handle's lifetime. Children are never cached.

use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use sigstop_common::{ControlSignal, Pid, ProcessResult};
use tracing::{debug, warn};

use crate::procfs::ProcessTable;
use crate::signal::SignalReport;
use crate::status;

/// Lazily resolved attribute.
///
/// `Unresolved` covers both "not looked up yet" and "lookup found nothing";
/// either way the next access tries again. Once `Resolved`, the value is
/// never re-read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    Unresolved,
    Resolved(T),
}

impl<T> Resolution<T> {
    pub fn get(&self) -> Option<&T> {
        match self {
            Resolution::Resolved(value) => Some(value),
            Resolution::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    /// Resolve with `lookup` unless already resolved.
    fn resolve_with(&mut self, lookup: impl FnOnce() -> Option<T>) -> Option<&T> {
        if let Resolution::Unresolved = self {
            if let Some(value) = lookup() {
                *self = Resolution::Resolved(value);
            }
        }
        self.get()
    }
}

/// Display snapshot of a process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub pid: Pid,
    pub ppid: Option<Pid>,
    pub name: Option<String>,
    pub stopped: bool,
}

/// One node of a descendant walk.
#[derive(Debug, Clone)]
pub struct TreeEntry {
    /// 1 for direct children, 2 for grandchildren, ...
    pub depth: usize,
    pub handle: ProcessHandle,
}

/// Handle to a single process.
///
/// Equality and hashing consider the pid only.
#[derive(Debug, Clone)]
pub struct ProcessHandle {
    pid: Pid,
    name: Resolution<String>,
    parent: Resolution<Pid>,
    stopped: bool,
    table: ProcessTable,
}

impl ProcessHandle {
    pub(crate) fn new(pid: Pid, table: ProcessTable) -> Self {
        Self {
            pid,
            name: Resolution::Unresolved,
            parent: Resolution::Unresolved,
            stopped: false,
            table,
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Executable name, from the first status line.
    pub fn name(&mut self) -> Option<&str> {
        let (pid, table) = (self.pid, &self.table);
        self.name
            .resolve_with(|| status::parse_name(&table.read_status(pid)))
            .map(String::as_str)
    }

    /// Parent pid, from the seventh status line.
    pub fn parent_pid(&mut self) -> Option<Pid> {
        let (pid, table) = (self.pid, &self.table);
        self.parent
            .resolve_with(|| status::parse_parent_pid(&table.read_status(pid)))
            .copied()
    }

    /// Handle for the parent process, if the parent pid resolves to one.
    pub fn parent(&mut self) -> Option<ProcessHandle> {
        self.parent_pid()
            .filter(|ppid| ppid.is_valid())
            .map(|ppid| self.table.handle(ppid))
    }

    /// Current direct children. Re-scans the table on every call.
    pub fn children(&self) -> Vec<ProcessHandle> {
        self.table.children_of(self.pid)
    }

    /// Every descendant in pre-order, each reported once.
    ///
    /// Each entry comes after its parent and before its parent's next
    /// sibling, so the result prints as an indented tree. Siblings come in
    /// pid order. Children are re-queried per node, so processes spawned or
    /// reaped during the walk may or may not appear.
    pub fn descendants(&self) -> Vec<TreeEntry> {
        let mut seen = HashSet::from([self.pid]);
        let mut stack = Vec::new();
        push_children(&mut stack, 1, self.children());
        let mut entries = Vec::new();

        while let Some((depth, child)) = stack.pop() {
            if !seen.insert(child.pid) {
                continue;
            }
            push_children(&mut stack, depth + 1, child.children());
            entries.push(TreeEntry {
                depth,
                handle: child,
            });
        }
        entries
    }

    /// Whether this handle delivered a stop that was not followed by a
    /// delivered resume. Tracks what we sent, not what the kernel reports;
    /// a skipped or failed stop leaves the flag alone.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Whether the process is still alive.
    pub fn is_alive(&self) -> ProcessResult<bool> {
        self.table.probe(self.pid)
    }

    /// Suspend the process, and its whole subtree when `include_children`.
    pub fn stop(&mut self, include_children: bool) -> SignalReport {
        self.stop_with(include_children, &mut HashSet::new())
    }

    /// Resume the process, and its whole subtree when `include_children`.
    pub fn resume(&mut self, include_children: bool) -> SignalReport {
        self.resume_with(include_children, &mut HashSet::new())
    }

    /// Like [`stop`](Self::stop), but pids already in `visited` are left
    /// alone and every pid reached is added to it. Several roots sharing
    /// one set signal each process at most once.
    pub fn stop_with(
        &mut self,
        include_children: bool,
        visited: &mut HashSet<Pid>,
    ) -> SignalReport {
        let report = self.propagate(ControlSignal::Stop, include_children, visited);
        if report.delivered.contains(&self.pid) {
            self.stopped = true;
        }
        report
    }

    /// Like [`resume`](Self::resume), sharing `visited` across roots.
    pub fn resume_with(
        &mut self,
        include_children: bool,
        visited: &mut HashSet<Pid>,
    ) -> SignalReport {
        let report = self.propagate(ControlSignal::Continue, include_children, visited);
        if report.delivered.contains(&self.pid) {
            self.stopped = false;
        }
        report
    }

    pub fn info(&mut self) -> ProcessInfo {
        ProcessInfo {
            pid: self.pid,
            ppid: self.parent_pid(),
            name: self.name().map(str::to_string),
            stopped: self.stopped,
        }
    }

    fn propagate(
        &self,
        signal: ControlSignal,
        include_children: bool,
        visited: &mut HashSet<Pid>,
    ) -> SignalReport {
        let mut report = SignalReport::new(signal);
        self.signal_subtree(signal, include_children, visited, &mut report);
        debug!(
            "{} from {}: {} delivered, {} failed, {} skipped",
            signal,
            self.pid,
            report.delivered.len(),
            report.failed.len(),
            report.skipped.len()
        );
        report
    }

    // Pre-order: a parent is signalled before its children are listed.
    fn signal_subtree(
        &self,
        signal: ControlSignal,
        include_children: bool,
        visited: &mut HashSet<Pid>,
        report: &mut SignalReport,
    ) {
        if !visited.insert(self.pid) {
            return;
        }

        if signal == ControlSignal::Stop && self.table.is_protected(self.pid) {
            warn!("Not stopping protected process {}", self.pid);
            report.skip(self.pid);
        } else {
            report.record(self.pid, self.table.send(self.pid, signal));
        }

        if include_children {
            for child in self.children() {
                child.signal_subtree(signal, true, visited, report);
            }
        }
    }
}

fn push_children(
    stack: &mut Vec<(usize, ProcessHandle)>,
    depth: usize,
    mut children: Vec<ProcessHandle>,
) {
    children.sort_by_key(|child| child.pid);
    // Reversed so the lowest pid is popped first
    stack.extend(children.into_iter().rev().map(|child| (depth, child)));
}

impl PartialEq for ProcessHandle {
    fn eq(&self, other: &Self) -> bool {
        self.pid == other.pid
    }
}

impl Eq for ProcessHandle {}

impl Hash for ProcessHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pid.hash(state);
    }
}
