//! External proof hooks.
//!
//! A hook is a whitespace-split command line that answers for one token:
//! it must exit 0 and print `1` (green) or `0` (not green) on stdout.
//! Anything else is an execution failure, reported under its own codes
//! so a broken hook is never mistaken for a red gate. The most
//! fundamental problem wins: spawn, then timeout, then exit status,
//! then output.

use serde_json::json;
use std::io::Read;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tollgate_kernel::witness::FailureKind;
use tollgate_kernel::{GateFailure, code};

/// Longest stdout a hook may produce. Hooks answer with one digit;
/// a hook past this bound blocks on write and runs into the timeout.
const MAX_HOOK_OUTPUT_BYTES: u64 = 4096;

/// Maximum time to wait for a killed hook to be reaped.
const REAP_TIMEOUT: Duration = Duration::from_secs(5);

/// Maximum time to wait for the stdout reader thread after the hook is
/// gone. A descendant process holding the pipe open must not block us.
const JOIN_TIMEOUT: Duration = Duration::from_secs(2);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

fn hook_failure(failure_code: &str, hook_ref: &str, message: String) -> GateFailure {
    GateFailure::new(
        failure_code,
        FailureKind::Execution,
        message,
        Some(json!({"hookRef": hook_ref})),
    )
}

/// Run one hook to completion and parse its answer.
pub fn run_hook(hook_ref: &str, timeout: Duration) -> Result<u8, GateFailure> {
    let mut parts = hook_ref.split_whitespace();
    let Some(program) = parts.next() else {
        return Err(hook_failure(
            code::HOOK_SPAWN_FAILED,
            hook_ref,
            "hook command is empty".to_string(),
        ));
    };
    let args: Vec<&str> = parts.collect();

    let mut child = match Command::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            return Err(hook_failure(
                code::HOOK_SPAWN_FAILED,
                hook_ref,
                format!("failed to spawn hook '{hook_ref}': {e}"),
            ));
        }
    };

    let Some(stdout) = child.stdout.take() else {
        let _ = bounded_reap(&mut child);
        return Err(hook_failure(
            code::HOOK_SPAWN_FAILED,
            hook_ref,
            format!("hook '{hook_ref}' has no stdout pipe"),
        ));
    };

    // The reader drains stdout concurrently so the hook can never block
    // on a full pipe before the exit-status poll sees it finish.
    let reader = std::thread::spawn(move || {
        let mut output = Vec::new();
        stdout
            .take(MAX_HOOK_OUTPUT_BYTES)
            .read_to_end(&mut output)
            .ok()
            .map(|_| output)
    });

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {}
            Err(e) => {
                let _ = child.kill();
                let _ = bounded_reap(&mut child);
                drop(child);
                join_reader_bounded(&reader);
                return Err(hook_failure(
                    code::HOOK_EXIT_UNEXPECTED,
                    hook_ref,
                    format!("hook '{hook_ref}' could not be awaited: {e}"),
                ));
            }
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = bounded_reap(&mut child);
            // The kill closes the hook's end of the pipe; only a
            // descendant still holding it can keep the reader alive,
            // and the join below is bounded for exactly that case.
            drop(child);
            join_reader_bounded(&reader);
            return Err(GateFailure::new(
                code::HOOK_TIMEOUT,
                FailureKind::Execution,
                format!(
                    "hook '{hook_ref}' did not finish within {}ms",
                    timeout.as_millis()
                ),
                Some(json!({
                    "hookRef": hook_ref,
                    "timeoutMs": timeout.as_millis() as u64,
                })),
            ));
        }
        std::thread::sleep(POLL_INTERVAL);
    };

    drop(child);
    let output = collect_reader_output(reader);

    if !status.success() {
        let (summary, exit_code) = match status.code() {
            Some(exit_code) => (format!("code {exit_code}"), Some(exit_code)),
            None => ("a signal".to_string(), None),
        };
        return Err(GateFailure::new(
            code::HOOK_EXIT_UNEXPECTED,
            FailureKind::Execution,
            format!("hook '{hook_ref}' exited with {summary}"),
            Some(json!({"hookRef": hook_ref, "exitCode": exit_code})),
        ));
    }

    let text = String::from_utf8_lossy(&output);
    match text.trim() {
        "0" => Ok(0),
        "1" => Ok(1),
        other => {
            let snippet: String = other.chars().take(80).collect();
            Err(GateFailure::new(
                code::HOOK_OUTPUT_UNPARSEABLE,
                FailureKind::Execution,
                format!("hook '{hook_ref}' must print 0 or 1 on stdout, got '{snippet}'"),
                Some(json!({"hookRef": hook_ref, "stdout": snippet})),
            ))
        }
    }
}

/// Reap a child within a bounded window: fast-path `try_wait`, then
/// kill and poll. `None` means the process could not be reaped.
fn bounded_reap(child: &mut std::process::Child) -> Option<std::process::ExitStatus> {
    match child.try_wait() {
        Ok(Some(status)) => return Some(status),
        Ok(None) => {}
        Err(_) => return None,
    }

    let _ = child.kill();
    let deadline = Instant::now() + REAP_TIMEOUT;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Some(status),
            Ok(None) => {}
            Err(_) => return None,
        }
        if Instant::now() >= deadline {
            return None;
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

fn join_reader_bounded(reader: &std::thread::JoinHandle<Option<Vec<u8>>>) {
    let deadline = Instant::now() + JOIN_TIMEOUT;
    while !reader.is_finished() {
        if Instant::now() >= deadline {
            return;
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

fn collect_reader_output(reader: std::thread::JoinHandle<Option<Vec<u8>>>) -> Vec<u8> {
    let deadline = Instant::now() + JOIN_TIMEOUT;
    loop {
        if reader.is_finished() {
            return reader.join().ok().flatten().unwrap_or_default();
        }
        if Instant::now() >= deadline {
            // A descendant is holding stdout open; whatever was written
            // is unreachable, and empty output fails parsing below.
            return Vec::new();
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}
