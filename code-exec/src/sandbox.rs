//! Child process supervision: spawn, feed stdin, capture bounded output,
//! enforce the wall-clock deadline.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::sync::watch;
use tokio::time::{self, Duration, Instant};
use tracing::{debug, error, warn};

use crate::executor::ExecutionLimits;
use crate::languages::ResolvedCommand;
use crate::types::{Captured, ExecutionOutcome, ExitInfo, Phase, Termination};

/// How long output readers keep draining after the process is gone. A
/// descendant that escaped the process group can hold the pipes open forever.
const DRAIN_GRACE: Duration = Duration::from_millis(200);

const READ_CHUNK: usize = 8 * 1024;

/// Run one command to completion or until `deadline`, whichever comes first.
pub(crate) async fn run_process(
    command: &ResolvedCommand,
    cwd: &Path,
    input: Option<&str>,
    deadline: Instant,
    limits: ExecutionLimits,
    phase: Phase,
) -> ExecutionOutcome {
    debug!("Sandbox execute - Phase: {:?}", phase);
    debug!("Sandbox execute - Command: {}", command.display());
    debug!("Sandbox execute - Working dir: {:?}", cwd);

    let program = match resolve_program(&command.program) {
        Ok(program) => program,
        Err(diagnostic) => {
            return ExecutionOutcome::failed_to_start(phase, limits.timeout, diagnostic)
        }
    };

    let started = Instant::now();
    if started >= deadline {
        return ExecutionOutcome {
            phase,
            termination: Termination::TimedOut,
            exit: None,
            stdout: Captured::default(),
            stderr: Captured::default(),
            duration: Duration::ZERO,
            budget: limits.timeout,
        };
    }

    let mut cmd = Command::new(&program);
    cmd.args(&command.args)
        .current_dir(cwd)
        .stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // Own process group so a timeout can take down everything the program forked.
    #[cfg(unix)]
    cmd.process_group(0);

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            error!("Failed to spawn {:?}: {}", program, e);
            return ExecutionOutcome::failed_to_start(
                phase,
                limits.timeout,
                format!("Failed to start {}: {}", program.display(), e),
            );
        }
    };

    let stdin_task = match (child.stdin.take(), input) {
        (Some(mut stdin), Some(input)) => {
            let data = input.as_bytes().to_vec();
            Some(tokio::spawn(async move {
                if let Err(e) = stdin.write_all(&data).await {
                    // The program may exit without reading its input.
                    if e.kind() != std::io::ErrorKind::BrokenPipe {
                        warn!("Failed to write input: {}", e);
                    }
                }
                // Dropping `stdin` closes the pipe so the program sees EOF.
            }))
        }
        _ => None,
    };

    let (stop_tx, stop_rx) = watch::channel(false);
    let stdout_task = tokio::spawn(read_capped(
        child.stdout.take(),
        limits.max_output_bytes,
        stop_rx.clone(),
    ));
    let stderr_task = tokio::spawn(read_capped(
        child.stderr.take(),
        limits.max_output_bytes,
        stop_rx,
    ));

    // The group id is the child pid; read it now, tokio forgets it once the child is reaped.
    let pgid = child.id();
    let wait_result = time::timeout_at(deadline, child.wait()).await;
    let (termination, status) = match wait_result {
        Ok(Ok(status)) => {
            // Anything the program left running in its group dies with it.
            if let Some(pgid) = pgid {
                kill_process_group(pgid);
            }
            let termination = if status.success() {
                Termination::CompletedNormally
            } else {
                Termination::CompletedWithErrorExit
            };
            (termination, Some(status))
        }
        Ok(Err(e)) => {
            error!("Failed to wait for {:?}: {}", program, e);
            (Termination::CompletedWithErrorExit, terminate(&mut child).await)
        }
        Err(_) => {
            debug!("Deadline reached, killing {:?}", program);
            (Termination::TimedOut, terminate(&mut child).await)
        }
    };
    let duration = started.elapsed();

    let grace = tokio::spawn(async move {
        time::sleep(DRAIN_GRACE).await;
        let _ = stop_tx.send(true);
    });
    let stdout = stdout_task.await.unwrap_or_else(|e| {
        error!("stdout reader failed: {}", e);
        Captured::default()
    });
    let stderr = stderr_task.await.unwrap_or_else(|e| {
        error!("stderr reader failed: {}", e);
        Captured::default()
    });
    grace.abort();
    if let Some(task) = stdin_task {
        task.abort();
    }

    ExecutionOutcome {
        phase,
        termination,
        exit: status.map(exit_info),
        stdout,
        stderr,
        duration,
        budget: limits.timeout,
    }
}

/// Bare program names are looked up on `PATH`; anything with a path component is used as is.
fn resolve_program(program: &Path) -> Result<PathBuf, String> {
    if program.components().count() > 1 {
        return Ok(program.to_path_buf());
    }
    which::which(program).map_err(|_| format!("Command not found: {}", program.display()))
}

/// SIGKILL the whole process group, then reap the direct child.
async fn terminate(child: &mut Child) -> Option<ExitStatus> {
    if let Some(pid) = child.id() {
        kill_process_group(pid);
    }

    if let Err(e) = child.kill().await {
        debug!("Kill after group kill: {}", e);
    }
    child.wait().await.ok()
}

fn kill_process_group(pgid: u32) {
    #[cfg(unix)]
    {
        use nix::errno::Errno;
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        match killpg(Pid::from_raw(pgid as i32), Signal::SIGKILL) {
            Ok(()) | Err(Errno::ESRCH) => {}
            Err(e) => warn!("Failed to kill process group {}: {}", pgid, e),
        }
    }
    #[cfg(not(unix))]
    let _ = pgid;
}

/// Read a stream to EOF keeping at most `cap` bytes. Reading continues past the
/// cap so the program never blocks on a full pipe.
async fn read_capped<R>(reader: Option<R>, cap: usize, mut stop: watch::Receiver<bool>) -> Captured
where
    R: AsyncRead + Unpin,
{
    let mut captured = Captured::default();
    let Some(mut reader) = reader else {
        return captured;
    };

    let mut chunk = vec![0u8; READ_CHUNK];
    loop {
        let n = tokio::select! {
            result = reader.read(&mut chunk) => match result {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => {
                    debug!("Output stream closed with error: {}", e);
                    break;
                }
            },
            _ = stop.changed() => break,
        };

        let remaining = cap.saturating_sub(captured.bytes.len());
        if n > remaining {
            captured.truncated = true;
        }
        captured.bytes.extend_from_slice(&chunk[..n.min(remaining)]);
    }
    captured
}

fn exit_info(status: ExitStatus) -> ExitInfo {
    #[cfg(unix)]
    let signal = {
        use std::os::unix::process::ExitStatusExt;
        status.signal()
    };
    #[cfg(not(unix))]
    let signal = None;

    ExitInfo {
        code: status.code(),
        signal,
    }
}
