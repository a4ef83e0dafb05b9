//! Child process execution with a bounded wait
//!
//! Both pipes are drained on their own threads and forwarded over a channel,
//! so a chatty child cannot stall on a full pipe and a background grandchild
//! holding the pipes open cannot outlast the deadline. On unix the child leads
//! its own process group and the whole group is killed when time runs out.

use crate::models::run::CapturedOutput;
use std::io::{ErrorKind, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How long to keep collecting after leftover processes were killed
const KILL_GRACE: Duration = Duration::from_millis(200);

const CHUNK_SIZE: usize = 8 * 1024;

/// Why a child could not be run to completion
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} did not finish within {} seconds", .after.as_secs())]
    Timeout { program: String, after: Duration },

    #[error("failed to wait for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl ExecError {
    /// The executable could not be found at all
    pub fn is_not_found(&self) -> bool {
        matches!(self, ExecError::Spawn { source, .. } if source.kind() == ErrorKind::NotFound)
    }
}

/// Extension trait for `std::process::Child` to support timeouts
trait ChildExt {
    fn wait_until(&mut self, deadline: Instant) -> std::io::Result<Option<ExitStatus>>;
}

impl ChildExt for Child {
    fn wait_until(&mut self, deadline: Instant) -> std::io::Result<Option<ExitStatus>> {
        loop {
            match self.try_wait()? {
                Some(status) => return Ok(Some(status)),
                None => {
                    if Instant::now() >= deadline {
                        return Ok(None);
                    }
                    thread::sleep(POLL_INTERVAL);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

fn drain<R: Read + Send + 'static>(stream: Option<R>, kind: Stream, tx: Sender<(Stream, Vec<u8>)>) {
    let Some(mut stream) = stream else {
        return;
    };
    thread::spawn(move || {
        let mut buffer = [0u8; CHUNK_SIZE];
        loop {
            match stream.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => {
                    if tx.send((kind, buffer[..n].to_vec())).is_err() {
                        break;
                    }
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    log::debug!("reading child {:?} failed: {}", kind, e);
                    break;
                }
            }
        }
    });
}

/// Output gathered from the drain threads
#[derive(Default)]
struct Collected {
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl Collected {
    /// Collect until both pipes close (true) or the deadline passes (false)
    fn collect_until(&mut self, rx: &Receiver<(Stream, Vec<u8>)>, deadline: Instant) -> bool {
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match rx.recv_timeout(remaining) {
                Ok((Stream::Stdout, chunk)) => self.stdout.extend_from_slice(&chunk),
                Ok((Stream::Stderr, chunk)) => self.stderr.extend_from_slice(&chunk),
                Err(RecvTimeoutError::Disconnected) => return true,
                Err(RecvTimeoutError::Timeout) => return false,
            }
        }
    }

    fn into_output(self, exit_code: Option<i32>) -> CapturedOutput {
        CapturedOutput {
            stdout: String::from_utf8_lossy(&self.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&self.stderr).into_owned(),
            exit_code,
        }
    }
}

#[cfg(unix)]
fn isolate(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(not(unix))]
fn isolate(_command: &mut Command) {}

/// Kill every process in the group led by `pid`
#[cfg(unix)]
fn kill_group(pid: u32) {
    let Ok(pgid) = libc::pid_t::try_from(pid) else {
        return;
    };
    // A negative pid addresses the whole process group
    let result = unsafe { libc::kill(-pgid, libc::SIGKILL) };
    if result != 0 {
        log::debug!("killing process group {} failed: {}", pgid, std::io::Error::last_os_error());
    }
}

#[cfg(not(unix))]
fn kill_group(_pid: u32) {}

fn terminate(child: &mut Child) {
    kill_group(child.id());
    let _ = child.kill();
    let _ = child.wait();
}

fn program_name(command: &Command) -> String {
    command.get_program().to_string_lossy().into_owned()
}

/// Render a command line for logs
pub fn describe(command: &Command) -> String {
    std::iter::once(command.get_program())
        .chain(command.get_args())
        .map(|part| part.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run `command` to completion, killing it if it outlives `timeout`
///
/// The deadline covers both the child's exit and the end of its output. When
/// the child exits but a descendant keeps the pipes open past the deadline,
/// the descendants are killed and the output captured so far is returned.
pub fn run_with_timeout(mut command: Command, timeout: Duration) -> Result<CapturedOutput, ExecError> {
    let program = program_name(&command);
    log::debug!("running `{}` (timeout {}s)", describe(&command), timeout.as_secs());

    isolate(&mut command);
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| ExecError::Spawn {
            program: program.clone(),
            source,
        })?;

    let deadline = Instant::now() + timeout;
    let (tx, rx) = mpsc::channel();
    drain(child.stdout.take(), Stream::Stdout, tx.clone());
    drain(child.stderr.take(), Stream::Stderr, tx);

    let status = match child.wait_until(deadline) {
        Ok(Some(status)) => status,
        Ok(None) => {
            log::warn!("{} exceeded {}s, killing it", program, timeout.as_secs());
            terminate(&mut child);
            return Err(ExecError::Timeout { program, after: timeout });
        }
        Err(source) => {
            terminate(&mut child);
            return Err(ExecError::Wait { program, source });
        }
    };

    let mut collected = Collected::default();
    if !collected.collect_until(&rx, deadline) {
        log::warn!(
            "{} exited but its output was still open after {}s, killing leftover processes",
            program,
            timeout.as_secs()
        );
        kill_group(child.id());
        collected.collect_until(&rx, Instant::now() + KILL_GRACE);
    }

    Ok(collected.into_output(status.code()))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Command {
        let mut command = Command::new("sh");
        command.arg("-c").arg(script);
        command
    }

    #[test]
    fn test_captures_both_streams_and_exit_code() {
        let output = run_with_timeout(sh("echo out; echo err >&2; exit 3"), Duration::from_secs(5)).unwrap();

        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
        assert_eq!(output.exit_code, Some(3));
    }

    #[test]
    fn test_large_output_does_not_deadlock() {
        let output = run_with_timeout(
            sh("i=0; while [ $i -lt 20000 ]; do echo line-$i >&2; i=$((i+1)); done"),
            Duration::from_secs(20),
        )
        .unwrap();

        assert!(output.success());
        assert_eq!(output.stderr.lines().count(), 20000);
    }

    #[test]
    fn test_timeout_kills_child() {
        let start = Instant::now();
        let err = run_with_timeout(sh("sleep 10"), Duration::from_millis(200)).unwrap_err();

        assert!(matches!(err, ExecError::Timeout { .. }));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_background_grandchild_cannot_outlast_the_deadline() {
        let start = Instant::now();
        let output = run_with_timeout(sh("sleep 8 & echo started"), Duration::from_secs(1)).unwrap();

        assert!(start.elapsed() < Duration::from_secs(3));
        assert_eq!(output.stdout, "started\n");
        assert_eq!(output.exit_code, Some(0));
    }

    #[test]
    fn test_timeout_kills_the_process_group() {
        let start = Instant::now();
        let err = run_with_timeout(sh("sleep 8 & sleep 8"), Duration::from_millis(300)).unwrap_err();

        assert!(matches!(err, ExecError::Timeout { .. }));
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn test_missing_program_is_not_found() {
        let err = run_with_timeout(
            Command::new("leakscope-definitely-missing-program"),
            Duration::from_secs(1),
        )
        .unwrap_err();

        assert!(err.is_not_found());
    }

    #[test]
    fn test_describe() {
        let mut command = Command::new("gcc");
        command.args(["-g", "-o", "leak", "leak.c"]);
        assert_eq!(describe(&command), "gcc -g -o leak leak.c");
    }
}
