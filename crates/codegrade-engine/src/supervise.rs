//! Supervised out-of-process execution.
//!
//! A monitor thread owns the child and blocks in `wait_with_output`; the
//! caller waits on a channel with the test's time budget as the deadline.
//! Completion wakes the caller immediately, and a deadline miss triggers a
//! SIGKILL followed by a reap, so no zombie survives either path.

use crate::error::Result;
use crate::process::ProcessGuard;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::io::Write;
use std::os::unix::process::ExitStatusExt;
use std::process::{Command, Output, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// Raw facts of one supervised run, before classification
#[derive(Debug, Clone)]
pub struct RunRecord {
    /// Captured stdout followed by stderr
    pub output: String,
    /// Exit code, when the child exited normally
    pub exit_code: Option<i32>,
    /// Terminating signal number, when the child was killed
    pub signal: Option<i32>,
    /// Whether the run exceeded its time budget
    pub timed_out: bool,
    /// Wall-clock duration of the run
    pub duration: Duration,
}

/// Run `cmd` with `payload` on its stdin, bounded by `budget`.
///
/// # Errors
///
/// Returns an IO error when the child cannot be spawned or its result cannot
/// be collected. A timeout is not an error; it is reported in the record.
pub fn run_supervised(mut cmd: Command, payload: &str, budget: Duration) -> Result<RunRecord> {
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let start = Instant::now();
    let mut child = cmd.spawn()?;
    let pid = child.id();

    if let Some(mut stdin) = child.stdin.take() {
        // A child that exits before reading produces EPIPE; its fate is
        // still captured by the wait below
        if let Err(err) = stdin.write_all(payload.as_bytes()) {
            if err.kind() != std::io::ErrorKind::BrokenPipe {
                return Err(err.into());
            }
        }
    }

    let guard = ProcessGuard::new(child);
    let (tx, rx) = mpsc::channel::<std::io::Result<Output>>();
    let monitor = thread::spawn(move || {
        let _ = tx.send(guard.wait_with_output());
    });

    let (output, timed_out) = match rx.recv_timeout(budget) {
        Ok(result) => (result?, false),
        Err(mpsc::RecvTimeoutError::Timeout) => {
            log::debug!("deadline exceeded, killing child {pid}");
            #[allow(clippy::cast_possible_wrap)]
            let _ = kill(Pid::from_raw(pid as i32), Signal::SIGKILL);
            let result = rx
                .recv()
                .map_err(|_| std::io::Error::other("monitor thread lost the child"))?;
            (result?, true)
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            return Err(std::io::Error::other("monitor thread lost the child").into());
        }
    };
    let _ = monitor.join();

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));

    Ok(RunRecord {
        output: text,
        exit_code: output.status.code(),
        signal: output.status.signal(),
        timed_out,
        duration: start.elapsed(),
    })
}
