// ============================================================================
// dscl-core/src/external/executor.rs
// ============================================================================
//
// DSCL EXECUTOR: Subprocess Management for dscl Invocations
//
// This module runs a built DsclCommand as a child process and captures its
// output. Both pipes are drained on their own threads while the child runs,
// so a chatty stderr can never fill its pipe buffer and stall the child while
// we are blocked reading stdout (or the reverse).
//
// KEY COMPONENTS:
// - DsclRunner: Trait for anything that can execute a DsclCommand
// - SubprocessRunner: Concrete implementation using std::process
//
// ARCHITECTURE:
// The directory client is generic over DsclRunner, which lets tests swap in
// the scripted MockDsclRunner instead of spawning real processes.
//
// AI-ASSISTANT-INFO: dscl process management and execution abstraction

// ---- Internal crate imports ----
use super::command::DsclCommand;
use crate::error::{CoreError, CoreResult, ExitError};

// ---- Standard library imports ----
use std::io::{self, Read};
use std::process::{Child, Stdio};
use std::thread::{self, JoinHandle};

// ============================================================================
// EXECUTION ABSTRACTION
// ============================================================================

/// Trait representing something that can execute a dscl invocation.
pub trait DsclRunner {
    /// Runs the command to completion.
    ///
    /// Returns the captured standard output on a zero exit status. A
    /// non-zero exit becomes [`CoreError::Exit`] carrying the status and the
    /// captured standard error; standard output is discarded in that case.
    fn run(&self, cmd: &DsclCommand) -> CoreResult<Vec<u8>>;
}

impl<R: DsclRunner + ?Sized> DsclRunner for &R {
    fn run(&self, cmd: &DsclCommand) -> CoreResult<Vec<u8>> {
        (**self).run(cmd)
    }
}

// ============================================================================
// SUBPROCESS IMPLEMENTATION
// ============================================================================

/// Runs dscl as a real child process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubprocessRunner;

impl SubprocessRunner {
    pub fn new() -> Self {
        Self
    }
}

/// Reads a pipe to its end on a dedicated thread.
fn spawn_drain<P>(mut pipe: P, stream: &'static str) -> CoreResult<JoinHandle<io::Result<Vec<u8>>>>
where
    P: Read + Send + 'static,
{
    thread::Builder::new()
        .name(format!("dscl-{stream}"))
        .spawn(move || {
            let mut captured = Vec::new();
            pipe.read_to_end(&mut captured)?;
            Ok(captured)
        })
        .map_err(|e| CoreError::CommandStart(format!("{stream} drain thread"), e))
}

fn join_drain(handle: JoinHandle<io::Result<Vec<u8>>>) -> io::Result<Vec<u8>> {
    handle
        .join()
        .unwrap_or_else(|_| Err(io::Error::other("output drain thread panicked")))
}

/// Kills and waits on a child that will not be run to completion.
fn reap(child: &mut Child, program: &str) {
    if let Err(e) = child.kill() {
        log::warn!("Failed to kill {program}: {e}");
    }
    if let Err(e) = child.wait() {
        log::warn!("Failed to reap {program}: {e}");
    }
}

impl DsclRunner for SubprocessRunner {
    fn run(&self, cmd: &DsclCommand) -> CoreResult<Vec<u8>> {
        let program = cmd.program().display().to_string();
        log::debug!("Running: {cmd}");

        let mut child = cmd
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                log::error!("Failed to spawn {program}: {e}");
                CoreError::CommandStart(program.clone(), e)
            })?;

        let missing_pipe = |name: &str| {
            CoreError::CommandStart(
                program.clone(),
                io::Error::new(io::ErrorKind::BrokenPipe, format!("{name} pipe not captured")),
            )
        };
        let stdout = child.stdout.take().ok_or_else(|| missing_pipe("stdout"))?;
        let stderr = child.stderr.take().ok_or_else(|| missing_pipe("stderr"))?;

        let (stdout_handle, stderr_handle) = match spawn_drain(stdout, "stdout")
            .and_then(|out| Ok((out, spawn_drain(stderr, "stderr")?)))
        {
            Ok(handles) => handles,
            Err(e) => {
                // Killing the child closes its pipes, so a drain that did
                // start reaches EOF and exits on its own.
                reap(&mut child, &program);
                return Err(e);
            }
        };

        // Both drains finish at EOF, which the child signals by exiting or
        // closing its pipes. Only then is the exit status collected.
        let stdout_result = join_drain(stdout_handle);
        let stderr_result = join_drain(stderr_handle);

        let status = child.wait().map_err(|e| {
            log::error!("Failed waiting for {program}: {e}");
            CoreError::StreamRead(e)
        })?;

        let stdout_bytes = stdout_result.map_err(CoreError::StreamRead)?;
        let stderr_bytes = stderr_result.map_err(CoreError::StreamRead)?;

        if !status.success() {
            // A signal leaves no exit code; report it as 0.
            let code = status.code().unwrap_or(0);
            log::debug!(
                "{program} exited with status {code}: {}",
                String::from_utf8_lossy(&stderr_bytes).trim_end()
            );
            return Err(ExitError::new(code, stderr_bytes).into());
        }

        log::debug!("{program} succeeded with {} bytes of output", stdout_bytes.len());
        Ok(stdout_bytes)
    }
}
