//! Status record parsing.
//!
//! A status record is the content of `/proc/<pid>/status` split into lines.
//! Each line is a `Label:\tvalue` pair and the two fields we need sit at
//! fixed positions: line 1 holds the name, line 7 the parent pid.
//!
//! Parsing is deliberately forgiving. Short or malformed records yield
//! `None`, since protected and exiting processes can expose partial data.

use sigstop_common::Pid;

/// Zero-based line index of the `Name` record.
pub const NAME_LINE: usize = 0;

/// Zero-based line index of the `PPid` record.
pub const PARENT_PID_LINE: usize = 6;

/// Split raw status text into its lines.
pub fn split_record(content: &str) -> Vec<String> {
    content.lines().map(str::to_string).collect()
}

/// Value field of a `Label:\tvalue` line, if it has one.
fn value_field(line: &str) -> Option<&str> {
    line.split('\t').nth(1)
}

/// Resolve the process name from a status record.
pub fn parse_name(record: &[String]) -> Option<String> {
    record
        .get(NAME_LINE)
        .and_then(|line| value_field(line))
        .map(str::to_string)
}

/// Resolve the parent pid from a status record.
pub fn parse_parent_pid(record: &[String]) -> Option<Pid> {
    record
        .get(PARENT_PID_LINE)
        .and_then(|line| value_field(line))
        .and_then(|value| value.parse::<Pid>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_seven_line_record_resolves_both_fields() {
        let lines = record(&["Name:\tbash", "...", "...", "...", "...", "...", "PPid:\t42"]);
        assert_eq!(parse_name(&lines).as_deref(), Some("bash"));
        assert_eq!(parse_parent_pid(&lines), Some(Pid::from_raw(42)));
    }

    #[test]
    fn test_short_record_leaves_parent_unresolved() {
        let lines = record(&["Name:\tbash", "Umask:\t0022", "State:\tS (sleeping)"]);
        assert_eq!(parse_name(&lines).as_deref(), Some("bash"));
        assert_eq!(parse_parent_pid(&lines), None);
    }

    #[test]
    fn test_missing_tab_fields() {
        let lines = record(&["Name bash", "", "", "", "", "", "PPid 42"]);
        assert_eq!(parse_name(&lines), None);
        assert_eq!(parse_parent_pid(&lines), None);
    }

    #[test]
    fn test_non_numeric_parent() {
        let lines = record(&["Name:\tx", "", "", "", "", "", "PPid:\tabc"]);
        assert_eq!(parse_parent_pid(&lines), None);
    }

    #[test]
    fn test_empty_name_is_still_a_name() {
        let lines = record(&["Name:\t"]);
        assert_eq!(parse_name(&lines).as_deref(), Some(""));
    }

    #[test]
    fn test_empty_record() {
        assert_eq!(parse_name(&[]), None);
        assert_eq!(parse_parent_pid(&[]), None);
    }

    #[test]
    fn test_real_kernel_layout() {
        let content = "Name:\tsshd\nUmask:\t0022\nState:\tS (sleeping)\nTgid:\t812\nNgid:\t0\nPid:\t812\nPPid:\t1\nTracerPid:\t0\n";
        let lines = split_record(content);
        assert_eq!(lines.len(), 8);
        assert_eq!(parse_name(&lines).as_deref(), Some("sshd"));
        assert_eq!(parse_parent_pid(&lines), Some(Pid::from_raw(1)));
    }
}
