//! Command implementations, writing their output to any `Write`.

use std::collections::HashSet;
use std::io::Write;

use anyhow::{Context, Result};
use sigstop_common::{ControlSignal, Pid};
use sigstop_process::{ProcessHandle, ProcessInfo, ProcessTable, SignalReport, Target};
use tracing::info;

/// Stop or resume every process matching `target`.
///
/// Returns `Ok(false)` when any delivery failed; every matched process is
/// still attempted.
pub fn signal(
    table: &ProcessTable,
    target: &str,
    signal: ControlSignal,
    include_children: bool,
    out: &mut dyn Write,
) -> Result<bool> {
    let target: Target = target.parse()?;
    let handles = table
        .resolve(&target)
        .with_context(|| format!("No process matches {}", target))?;

    info!(
        "Sending {} to {} ({} match{}, children: {})",
        signal,
        target,
        handles.len(),
        if handles.len() == 1 { "" } else { "es" },
        include_children
    );

    // Name matches may nest; one visited set keeps each pid to one signal.
    let mut visited = HashSet::new();
    let mut report = SignalReport::new(signal);
    for mut handle in handles {
        let outcome = match signal {
            ControlSignal::Stop => handle.stop_with(include_children, &mut visited),
            ControlSignal::Continue => handle.resume_with(include_children, &mut visited),
        };
        report.merge(outcome);
    }

    write_report(&report, out)?;
    Ok(report.is_success())
}

fn write_report(report: &SignalReport, out: &mut dyn Write) -> Result<()> {
    for pid in &report.delivered {
        writeln!(out, "{} -> {}", report.signal, pid)?;
    }
    for pid in &report.skipped {
        writeln!(out, "{} skipped {} (protected)", report.signal, pid)?;
    }
    for error in &report.failed {
        writeln!(out, "error: {}", error)?;
    }
    Ok(())
}

/// List processes, optionally only those named `name`.
pub fn list(table: &ProcessTable, name: Option<&str>, json: bool, out: &mut dyn Write) -> Result<()> {
    let handles = match name {
        Some(name) => table.by_name(name),
        None => table.all_pids().into_iter().map(|pid| table.handle(pid)).collect(),
    };
    write_infos(handles, json, out)
}

/// List the direct children of `pid`.
pub fn children(table: &ProcessTable, pid: Pid, json: bool, out: &mut dyn Write) -> Result<()> {
    write_infos(table.handle(pid).children(), json, out)
}

/// Print every descendant of `pid`, indented by depth.
pub fn tree(table: &ProcessTable, pid: Pid, json: bool, out: &mut dyn Write) -> Result<()> {
    let mut root = table.handle(pid);
    let descendants = root.descendants();

    if json {
        #[derive(serde::Serialize)]
        struct Node {
            depth: usize,
            #[serde(flatten)]
            info: ProcessInfo,
        }

        let mut nodes = vec![Node {
            depth: 0,
            info: root.info(),
        }];
        nodes.extend(descendants.into_iter().map(|mut entry| Node {
            depth: entry.depth,
            info: entry.handle.info(),
        }));
        serde_json::to_writer_pretty(&mut *out, &nodes)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "{}", format_tree_line(0, &root.info()))?;
    for mut entry in descendants {
        writeln!(out, "{}", format_tree_line(entry.depth, &entry.handle.info()))?;
    }
    Ok(())
}

fn format_tree_line(depth: usize, info: &ProcessInfo) -> String {
    let mut line = format!(
        "{}{}  {}",
        "  ".repeat(depth),
        info.pid,
        info.name.as_deref().unwrap_or("?")
    );
    if info.stopped {
        line.push_str("  [stopped]");
    }
    line
}

fn write_infos(handles: Vec<ProcessHandle>, json: bool, out: &mut dyn Write) -> Result<()> {
    let mut infos: Vec<ProcessInfo> = handles.into_iter().map(|mut h| h.info()).collect();
    infos.sort_by_key(|info| info.pid);

    if json {
        serde_json::to_writer_pretty(&mut *out, &infos)?;
        writeln!(out)?;
    } else {
        for info in &infos {
            writeln!(out, "{}", format_info(info))?;
        }
    }
    Ok(())
}

fn format_info(info: &ProcessInfo) -> String {
    let ppid = info.ppid.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string());
    let name = info.name.as_deref().unwrap_or("?");
    let mut line = format!("{:>7} {:>7}  {}", info.pid, ppid, name);
    if info.stopped {
        line.push_str("  [stopped]");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use sigstop_common::ProcessResult;
    use sigstop_process::SignalSender;
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use tempfile::{tempdir, TempDir};

    fn write_process(root: &Path, pid: i32, name: &str, ppid: i32) {
        let dir = root.join(pid.to_string());
        fs::create_dir_all(&dir).unwrap();
        let status = format!("Name:\t{name}\nUmask:\t0022\nState:\tS\nTgid:\t{pid}\nNgid:\t0\nPid:\t{pid}\nPPid:\t{ppid}\n");
        fs::write(dir.join("status"), status).unwrap();
    }

    fn fixture() -> TempDir {
        let dir = tempdir().unwrap();
        write_process(dir.path(), 1, "init", 0);
        write_process(dir.path(), 100, "bash", 1);
        write_process(dir.path(), 150, "sleep", 100);
        dir
    }

    /// init(1) -> {bash(100), sshd(200)}, bash -> sleep(150)
    fn branching_fixture() -> TempDir {
        let dir = fixture();
        write_process(dir.path(), 200, "sshd", 1);
        dir
    }

    /// Records signals instead of sending them.
    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<Pid>>,
    }

    impl SignalSender for RecordingSender {
        fn send(&self, pid: Pid, _signal: ControlSignal) -> ProcessResult<()> {
            self.sent.lock().unwrap().push(pid);
            Ok(())
        }

        fn probe(&self, _pid: Pid) -> ProcessResult<bool> {
            Ok(true)
        }
    }

    fn output(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_list_is_sorted_by_pid() {
        let dir = fixture();
        let table = ProcessTable::with_root(dir.path());
        let text = output(|out| list(&table, None, false, out));

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("init"));
        assert!(lines[2].contains("sleep"));
    }

    #[test]
    fn test_list_by_name_json() {
        let dir = fixture();
        let table = ProcessTable::with_root(dir.path());
        let text = output(|out| list(&table, Some("bash"), true, out));

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
        assert_eq!(value[0]["pid"], 100);
        assert_eq!(value[0]["ppid"], 1);
    }

    #[test]
    fn test_tree_indents_descendants() {
        let dir = fixture();
        let table = ProcessTable::with_root(dir.path());
        let text = output(|out| tree(&table, Pid::from_raw(1), false, out));

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["1  init", "  100  bash", "    150  sleep"]);
    }

    #[test]
    fn test_tree_places_grandchild_under_its_parent() {
        let dir = branching_fixture();
        let table = ProcessTable::with_root(dir.path());
        let text = output(|out| tree(&table, Pid::from_raw(1), false, out));

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec!["1  init", "  100  bash", "    150  sleep", "  200  sshd"]
        );
    }

    #[test]
    fn test_nested_name_matches_are_signalled_once() {
        // sshd(10) -> sshd(11) -> bash(12)
        let dir = tempdir().unwrap();
        write_process(dir.path(), 10, "sshd", 1);
        write_process(dir.path(), 11, "sshd", 10);
        write_process(dir.path(), 12, "bash", 11);
        let sender = Arc::new(RecordingSender::default());
        let table = ProcessTable::new(dir.path(), sender.clone());

        let mut buf = Vec::new();
        assert!(signal(&table, "sshd", ControlSignal::Stop, true, &mut buf).unwrap());

        let mut sent: Vec<i32> = sender.sent.lock().unwrap().iter().map(|p| p.as_raw()).collect();
        assert_eq!(sent.len(), 3);
        sent.sort_unstable();
        assert_eq!(sent, vec![10, 11, 12]);
        assert_eq!(String::from_utf8(buf).unwrap().lines().count(), 3);
    }

    #[test]
    fn test_tree_json_has_depths() {
        let dir = fixture();
        let table = ProcessTable::with_root(dir.path());
        let text = output(|out| tree(&table, Pid::from_raw(100), true, out));

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["depth"], 0);
        assert_eq!(value[0]["name"], "bash");
        assert_eq!(value[1]["depth"], 1);
        assert_eq!(value[1]["pid"], 150);
    }

    #[test]
    fn test_children_of_leaf_is_empty() {
        let dir = fixture();
        let table = ProcessTable::with_root(dir.path());
        let text = output(|out| children(&table, Pid::from_raw(150), false, out));
        assert!(text.is_empty());
    }

    #[test]
    fn test_signal_unknown_target_fails() {
        let dir = fixture();
        let table = ProcessTable::with_root(dir.path());
        let mut buf = Vec::new();

        let err = signal(&table, "nginx", ControlSignal::Stop, false, &mut buf).unwrap_err();
        assert!(err.to_string().contains("No process matches"));
        assert!(signal(&table, "0", ControlSignal::Stop, false, &mut buf).is_err());
    }

    #[test]
    fn test_format_info() {
        let info = ProcessInfo {
            pid: Pid::from_raw(42),
            ppid: None,
            name: None,
            stopped: true,
        };
        let line = format_info(&info);
        assert!(line.contains("42"));
        assert!(line.contains('-'));
        assert!(line.contains('?'));
        assert!(line.ends_with("[stopped]"));
    }
}
