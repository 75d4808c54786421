// SPDX-License-Identifier: MIT

//! Spawns a task's shell command under the configured interpreter,
//! streaming output to the [`crate::sink::LogSink`] and enforcing the
//! task's timeout and cancellation handle.

use crate::sink::{LogSink, StreamKind, TailBuffer};
use cronmesh_core::{ExitStatus, SchedulerKey, SPAWN_FAILURE_EXIT_CODE};
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Grace period between the graceful-termination signal and a forceful
/// kill if the process is still alive.
pub const TERMINATION_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Lines of tail output retained per execution.
const TAIL_LINES: usize = 200;

pub struct RunOutcome {
    pub exit_status: ExitStatus,
    pub duration: Duration,
    pub output_tail: String,
}

/// Runs `command` under `shell` (e.g. `["/bin/sh", "-c"]`), returning once
/// the process exits, the cancellation token fires, or `timeout` (if
/// non-zero) elapses.
#[allow(clippy::too_many_arguments)]
pub async fn run(
    scheduler_key: &SchedulerKey,
    shell: &[String],
    command: &str,
    cwd: Option<&std::path::Path>,
    env: &[(String, String)],
    timeout: Duration,
    cancel: CancellationToken,
    sink: Arc<dyn LogSink>,
) -> RunOutcome {
    let start = Instant::now();
    let mut cmd = build_command(shell, command, cwd, env);

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(err) => {
            return RunOutcome {
                exit_status: ExitStatus::SpawnFailed(err.to_string()),
                duration: start.elapsed(),
                output_tail: String::new(),
            };
        }
    };

    let tail = Arc::new(parking_lot::Mutex::new(TailBuffer::new(TAIL_LINES)));
    spawn_stream_reader(child.stdout.take(), StreamKind::Stdout, scheduler_key.clone(), sink.clone(), tail.clone());
    spawn_stream_reader(child.stderr.take(), StreamKind::Stderr, scheduler_key.clone(), sink.clone(), tail.clone());

    let timeout_sleep = async {
        if timeout.is_zero() {
            std::future::pending::<()>().await;
        } else {
            tokio::time::sleep(timeout).await;
        }
    };

    let exit_status = tokio::select! {
        result = child.wait() => {
            match result {
                Ok(status) => status_from_exit(status),
                Err(err) => ExitStatus::SpawnFailed(err.to_string()),
            }
        }
        _ = timeout_sleep => {
            terminate(&mut child).await;
            ExitStatus::TimedOut
        }
        _ = cancel.cancelled() => {
            terminate(&mut child).await;
            ExitStatus::Cancelled
        }
    };

    RunOutcome { exit_status, duration: start.elapsed(), output_tail: tail.lock().render() }
}

fn build_command(
    shell: &[String],
    command: &str,
    cwd: Option<&std::path::Path>,
    env: &[(String, String)],
) -> Command {
    let (interpreter, leading_args) = shell.split_first().unwrap_or((&String::new(), &[]));
    let mut cmd = Command::new(interpreter);
    cmd.args(leading_args);
    cmd.arg(command);
    if let Some(cwd) = cwd {
        cmd.current_dir(cwd);
    }
    for (key, value) in env {
        cmd.env(key, value);
    }
    cmd.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped()).kill_on_drop(true);
    cmd
}

fn spawn_stream_reader(
    stream: Option<impl tokio::io::AsyncRead + Unpin + Send + 'static>,
    kind: StreamKind,
    scheduler_key: SchedulerKey,
    sink: Arc<dyn LogSink>,
    tail: Arc<parking_lot::Mutex<TailBuffer>>,
) {
    let Some(stream) = stream else { return };
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    tail.lock().push(line.clone());
                    sink.write_line(&scheduler_key, kind, &line).await;
                }
                Ok(None) => break,
                Err(err) => {
                    tracing::warn!(scheduler_key = %scheduler_key, error = %err, "failed reading task output");
                    break;
                }
            }
        }
    });
}

/// Graceful-then-forceful termination.
async fn terminate(child: &mut tokio::process::Child) {
    #[cfg(unix)]
    {
        if let Some(pid) = child.id() {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;
            let _ = kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
        }
    }
    #[cfg(not(unix))]
    {
        let _ = child.start_kill();
    }

    let already_exited = tokio::time::timeout(TERMINATION_GRACE_PERIOD, child.wait()).await.is_ok();
    if !already_exited {
        let _ = child.start_kill();
        let _ = child.wait().await;
    }
}

fn status_from_exit(status: std::process::ExitStatus) -> ExitStatus {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return ExitStatus::Signalled(signal);
        }
    }
    ExitStatus::Exited(status.code().unwrap_or(SPAWN_FAILURE_EXIT_CODE))
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
