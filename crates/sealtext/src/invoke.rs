//! Bounded subprocess invocation
//!
//! Spawns the external tool, feeds the request text to its stdin and
//! collects stdout/stderr while racing a timeout and a cancellation signal.
//! Whichever way the call ends, the child never outlives it: a timed-out or
//! cancelled child is killed and reaped, and children are spawned with
//! kill-on-drop so dropping the future also ends the process.

use std::ffi::OsString;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, Command};
use tokio::time::timeout;
use tracing::{debug, warn};

use sealtext_core::process;

use crate::error::{Result, SealError};
use crate::request::{InvocationRequest, InvocationResult};

/// Runs one resolved executable with a bounded wait
#[derive(Debug, Clone)]
pub struct Invoker {
    program: PathBuf,
    timeout: Duration,
}

enum Outcome {
    Finished(io::Result<InvocationResult>),
    TimedOut,
    Cancelled,
}

impl Invoker {
    /// Resolve `binary` and build an invoker for it
    ///
    /// A bare name is searched on PATH; anything with a path separator must
    /// point at an existing file.
    pub fn locate(binary: &str, timeout: Duration) -> Result<Self> {
        let program = locate_binary(binary)?;
        debug!("Resolved {} to {}", binary, program.display());
        Ok(Self { program, timeout })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run the tool with `args`, bounded only by the timeout
    pub async fn invoke(
        &self,
        args: &[OsString],
        request: &InvocationRequest,
    ) -> Result<InvocationResult> {
        self.invoke_until(args, request, std::future::pending::<()>())
            .await
    }

    /// Run the tool with `args` until it exits, the timeout elapses, or
    /// `cancel` resolves
    pub async fn invoke_until<C>(
        &self,
        args: &[OsString],
        request: &InvocationRequest,
        cancel: C,
    ) -> Result<InvocationResult>
    where
        C: Future<Output = ()>,
    {
        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Own process group, so a kill also reaches anything the tool forked
        #[cfg(unix)]
        cmd.process_group(0);

        if let Some(ref dir) = request.working_directory {
            if !dir.is_dir() {
                return Err(SealError::WorkingDirectoryNotFound(dir.clone()));
            }
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|e| match e.kind() {
            io::ErrorKind::NotFound if !self.program.exists() => SealError::BinaryNotFound {
                binary: self.program.display().to_string(),
            },
            _ => SealError::Io(e),
        })?;

        let pid = child.id();
        debug!(
            mode = request.mode.as_str(),
            pid = ?pid,
            "Spawned {}",
            self.program.display()
        );

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let exchange = async {
            let (fed, out, err, status) = tokio::join!(
                feed(stdin, request.input_text.as_bytes()),
                drain(stdout),
                drain(stderr),
                child.wait(),
            );
            fed?;
            let status = status?;

            Ok::<_, io::Error>(InvocationResult {
                exit_code: status.code().unwrap_or(-1),
                stdout: String::from_utf8_lossy(&out?).into_owned(),
                stderr: String::from_utf8_lossy(&err?).into_owned(),
            })
        };

        let outcome = tokio::select! {
            res = timeout(self.timeout, exchange) => match res {
                Ok(finished) => Outcome::Finished(finished),
                Err(_) => Outcome::TimedOut,
            },
            _ = cancel => Outcome::Cancelled,
        };

        match outcome {
            Outcome::Finished(result) => {
                let result = result?;
                debug!(exit_code = result.exit_code, "{} exited", self.program.display());
                Ok(result)
            }
            Outcome::TimedOut => {
                warn!("{} timed out after {:?}", self.program.display(), self.timeout);
                terminate(&mut child, pid).await;
                Err(SealError::Timeout {
                    after: self.timeout,
                })
            }
            Outcome::Cancelled => {
                debug!("Invocation cancelled");
                terminate(&mut child, pid).await;
                Err(SealError::Cancelled)
            }
        }
    }
}

/// Resolve an executable name or path
pub fn locate_binary(binary: &str) -> Result<PathBuf> {
    let not_found = || SealError::BinaryNotFound {
        binary: binary.to_string(),
    };

    if binary.trim().is_empty() {
        return Err(not_found());
    }

    if binary.contains(std::path::MAIN_SEPARATOR) || binary.contains('/') {
        let mut path = PathBuf::from(binary);
        if !path.is_file() {
            return Err(not_found());
        }
        // Pin relative paths to our cwd; the child may run somewhere else
        if path.is_relative() {
            path = std::env::current_dir()?.join(path);
        }
        return Ok(path);
    }

    which::which(binary).map_err(|_| not_found())
}

/// Write the payload and close stdin so the tool sees EOF
async fn feed(stdin: Option<ChildStdin>, input: &[u8]) -> io::Result<()> {
    let Some(mut stdin) = stdin else {
        return Ok(());
    };

    match stdin.write_all(input).await {
        // The tool may exit without reading all of its input
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

async fn drain<R: AsyncRead + Unpin>(reader: Option<R>) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut reader) = reader {
        reader.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

/// Kill the child's process group, then kill and reap the child itself
async fn terminate(child: &mut Child, pid: Option<u32>) {
    #[cfg(unix)]
    if let Some(pid) = pid {
        // SAFETY: killpg only sends a signal; the group id is our own child's pid
        if unsafe { libc::killpg(pid as libc::pid_t, libc::SIGKILL) } != 0 {
            debug!("killpg({}) failed: {}", pid, io::Error::last_os_error());
        }
    }

    if let Err(e) = child.kill().await {
        warn!("Failed to kill kubeseal: {}", e);
    }

    if let Some(pid) = pid {
        if process::is_alive(pid) {
            warn!("kubeseal (pid {}) is still running after kill", pid);
        }
    }
}
