//! Process existence checking.

use sigstop_common::{Pid, ProcessError, ProcessResult};

/// Check if a process with the given PID exists.
///
/// This is a non-destructive check. On Unix it uses `kill(pid, 0)`, which
/// sends no signal but reports whether the process could be signaled.
///
/// # Returns
///
/// * `Ok(true)` - Process exists (possibly owned by someone else)
/// * `Ok(false)` - Process does not exist
/// * `Err(_)` - Error occurred while checking
///
/// # Examples
///
/// ```rust,no_run
/// use sigstop_common::Pid;
/// use sigstop_process::process_exists;
///
/// if process_exists(Pid::from_raw(1234)).unwrap() {
///     println!("Process 1234 is running");
/// }
/// ```
pub fn process_exists(pid: Pid) -> ProcessResult<bool> {
    if !pid.is_valid() {
        return Ok(false);
    }

    #[cfg(unix)]
    {
        use nix::errno::Errno;
        use nix::sys::signal::kill;

        match kill(nix::unistd::Pid::from_raw(pid.as_raw()), None) {
            Ok(_) => Ok(true),
            Err(Errno::ESRCH) => Ok(false),
            // Exists, but we may not signal it
            Err(Errno::EPERM) => Ok(true),
            Err(e) => Err(ProcessError::configuration(
                pid.to_string(),
                format!("Failed to check process: {}", e),
            )),
        }
    }

    #[cfg(not(unix))]
    {
        Err(ProcessError::configuration(
            pid.to_string(),
            "process probing is not supported on this platform",
        ))
    }
}
