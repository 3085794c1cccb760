//! Child process lifecycle.
//!
//! Every harness child is held by a [`ProcessGuard`]; dropping the guard
//! kills and reaps the child, so a supervision path that bails early can
//! never leak an orphan.

use std::process::Child;

/// RAII guard around a spawned harness child.
///
/// If the guard is dropped before the child is waited on, the child is
/// killed and reaped.
pub struct ProcessGuard {
    child: Option<Child>,
    pid: u32,
}

impl ProcessGuard {
    /// Wrap a spawned child
    #[must_use]
    pub fn new(child: Child) -> Self {
        let pid = child.id();
        Self {
            child: Some(child),
            pid,
        }
    }

    /// Wait for the child and collect its output, consuming the guard.
    ///
    /// # Errors
    ///
    /// Returns an error if the child has already been consumed or the wait
    /// fails.
    pub fn wait_with_output(mut self) -> std::io::Result<std::process::Output> {
        self.child.take().map_or_else(
            || Err(std::io::Error::other("process already consumed")),
            Child::wait_with_output,
        )
    }

    /// Operating system process id of the child
    #[must_use]
    pub const fn pid(&self) -> u32 {
        self.pid
    }
}

impl Drop for ProcessGuard {
    fn drop(&mut self) {
        if let Some(ref mut child) = self.child {
            log::warn!("reaping abandoned child process {}", self.pid);
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::{Command, Stdio};

    #[test]
    fn test_guard_wait_with_output() {
        let child = Command::new("echo")
            .arg("hello")
            .stdout(Stdio::piped())
            .spawn()
            .expect("spawn");

        let guard = ProcessGuard::new(child);
        let output = guard.wait_with_output().expect("wait");
        assert!(output.status.success());
        assert!(String::from_utf8_lossy(&output.stdout).contains("hello"));
    }

    #[test]
    fn test_guard_pid_matches_child() {
        let child = Command::new("echo").arg("x").spawn().expect("spawn");
        let expected = child.id();
        let guard = ProcessGuard::new(child);
        assert_eq!(guard.pid(), expected);
        let _ = guard.wait_with_output();
    }

    #[test]
    fn test_guard_drop_kills_child() {
        let child = Command::new("sleep").arg("60").spawn().expect("spawn");
        let pid = child.id();
        let guard = ProcessGuard::new(child);
        drop(guard);

        #[cfg(unix)]
        {
            use std::path::Path;
            std::thread::sleep(std::time::Duration::from_millis(100));
            assert!(!Path::new(&format!("/proc/{pid}")).exists());
        }
    }
}
