use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, warn};

use crate::transport::ResolverTransport;
use crate::{wire, ExternalResolverError, ResolverRequest, ResolverResponse};

/// A resolver peer running as an owned child process.
///
/// The child speaks newline-delimited JSON on stdin/stdout. Its stderr is
/// drained by a dedicated task so a chatty peer can never wedge the
/// request/response stream through pipe backpressure.
pub struct ChildProcessTransport {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    stderr_drain: JoinHandle<()>,
    exited: Option<Option<i32>>,
}

impl ChildProcessTransport {
    /// Validates and spawns the resolver executable at `path`.
    ///
    /// Each stderr chunk the child writes is handed to `stderr_handler` as-is.
    pub async fn spawn(
        path: impl Into<PathBuf>,
        stderr_handler: impl FnMut(Vec<u8>) + Send + 'static,
    ) -> Result<Self, ExternalResolverError> {
        let path = path.into();
        validate_executable(&path)?;

        let mut command = Command::new(&path);
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = spawn_with_retry(&mut command, &path).await?;
        let stdin = child.stdin.take().ok_or(ExternalResolverError::MissingStdin)?;
        let stdout = child
            .stdout
            .take()
            .ok_or(ExternalResolverError::MissingStdout)?;
        let stderr = child
            .stderr
            .take()
            .ok_or(ExternalResolverError::MissingStderr)?;

        let stderr_drain = tokio::spawn(drain_stderr(stderr, stderr_handler));
        debug!(path = %path.display(), "spawned external resolver");

        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
            stderr_drain,
            exited: None,
        })
    }

    async fn reap_exit_code(&mut self) -> Option<i32> {
        match time::timeout(Duration::from_secs(1), self.child.wait()).await {
            Ok(Ok(status)) => status.code(),
            _ => None,
        }
    }
}

#[async_trait]
impl ResolverTransport for ChildProcessTransport {
    async fn send_and_wait(
        &mut self,
        request: Option<&ResolverRequest>,
    ) -> Result<ResolverResponse, ExternalResolverError> {
        if let Some(exit_code) = self.exited {
            return Err(ExternalResolverError::ProcessDidExit { exit_code });
        }

        if let Some(request) = request {
            let frame = wire::encode_frame(request)?;
            if let Err(error) = write_frame(&mut self.stdin, &frame).await {
                // An exited peer must surface as EOF on the read below, not
                // as a write error.
                if error.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(ExternalResolverError::StdinWrite(error));
                }
            }
        }

        let mut line = Vec::new();
        let read = self
            .stdout
            .read_until(b'\n', &mut line)
            .await
            .map_err(ExternalResolverError::StdoutRead)?;
        if read == 0 {
            let exit_code = self.reap_exit_code().await;
            self.exited = Some(exit_code);
            debug!(?exit_code, "external resolver closed its stdout");
            return Err(ExternalResolverError::ProcessDidExit { exit_code });
        }
        if line.last() == Some(&b'\n') {
            line.pop();
        }
        match wire::decode_frame(&line) {
            Ok(response) => Ok(response),
            Err(error) => {
                warn!(%error, "failed to decode resolver reply");
                Err(error)
            }
        }
    }
}

impl Drop for ChildProcessTransport {
    fn drop(&mut self) {
        // Terminate the child before cancelling the drain so the reader can
        // never outlive its pipe's writer.
        let _ = self.child.start_kill();
        self.stderr_drain.abort();
    }
}

fn validate_executable(path: &Path) -> Result<(), ExternalResolverError> {
    let metadata =
        std::fs::metadata(path).map_err(|_| ExternalResolverError::MissingResolver {
            path: path.to_path_buf(),
        })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if metadata.is_dir() || metadata.permissions().mode() & 0o111 == 0 {
            return Err(ExternalResolverError::ResolverNotExecutable {
                path: path.to_path_buf(),
            });
        }
    }
    #[cfg(not(unix))]
    {
        if metadata.is_dir() {
            return Err(ExternalResolverError::ResolverNotExecutable {
                path: path.to_path_buf(),
            });
        }
    }

    Ok(())
}

async fn spawn_with_retry(
    command: &mut Command,
    path: &Path,
) -> Result<Child, ExternalResolverError> {
    let mut backoff = Duration::from_millis(2);
    for attempt in 0..5 {
        match command.spawn() {
            Ok(child) => return Ok(child),
            Err(source) => {
                let is_busy = matches!(source.kind(), std::io::ErrorKind::ExecutableFileBusy)
                    || source.raw_os_error() == Some(26);
                if is_busy && attempt < 4 {
                    time::sleep(backoff).await;
                    backoff = std::cmp::min(backoff * 2, Duration::from_millis(50));
                    continue;
                }
                return Err(ExternalResolverError::Spawn {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }
    }

    unreachable!("the spawn loop returns before exhausting its attempts")
}

async fn write_frame(stdin: &mut ChildStdin, frame: &[u8]) -> std::io::Result<()> {
    stdin.write_all(frame).await?;
    stdin.flush().await
}

async fn drain_stderr(mut stderr: ChildStderr, mut handler: impl FnMut(Vec<u8>) + Send) {
    let mut chunk = [0u8; 4096];
    loop {
        match stderr.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => handler(chunk[..n].to_vec()),
        }
    }
}
