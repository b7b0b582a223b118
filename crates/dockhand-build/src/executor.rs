use crate::docker::{CommandOutput, DockerError};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc::UnboundedSender;

/// Abstraction over build-tool execution for testability.
///
/// Production code uses [`RealExecutor`], tests use mockall-generated mocks.
/// A non-zero exit is not an error at this layer; callers inspect
/// [`CommandOutput::code`].
#[allow(async_fn_in_trait)]
pub trait BuildExecutor: Send + Sync {
    /// Run the tool and capture its output.
    async fn exec(&self, args: &[String]) -> Result<CommandOutput, DockerError>;

    /// Run the tool, sending every stdout/stderr line to `lines` as it
    /// arrives while still capturing both streams.
    async fn exec_streaming(
        &self,
        args: &[String],
        lines: UnboundedSender<String>,
    ) -> Result<CommandOutput, DockerError>;
}

/// Executor spawning the real build tool.
#[derive(Debug, Clone)]
pub struct RealExecutor {
    program: String,
}

impl RealExecutor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, args: &[String]) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    fn spawn_error(&self, source: std::io::Error) -> DockerError {
        if source.kind() == std::io::ErrorKind::NotFound {
            DockerError::NotInstalled {
                program: self.program.clone(),
            }
        } else {
            DockerError::Spawn {
                program: self.program.clone(),
                source,
            }
        }
    }
}

impl Default for RealExecutor {
    fn default() -> Self {
        Self::new("docker")
    }
}

impl BuildExecutor for RealExecutor {
    async fn exec(&self, args: &[String]) -> Result<CommandOutput, DockerError> {
        tracing::debug!(program = %self.program, ?args, "exec");

        let output = self
            .command(args)
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    async fn exec_streaming(
        &self,
        args: &[String],
        lines: UnboundedSender<String>,
    ) -> Result<CommandOutput, DockerError> {
        tracing::debug!(program = %self.program, ?args, "exec (streaming)");

        let mut child = self
            .command(args)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let stdout = pump(child.stdout.take(), lines.clone());
        let stderr = pump(child.stderr.take(), lines);
        let (stdout, stderr, status) = tokio::join!(stdout, stderr, child.wait());

        let status = status.map_err(|e| DockerError::Io { source: e })?;
        Ok(CommandOutput {
            code: status.code(),
            stdout: stdout.map_err(|e| DockerError::Io { source: e })?,
            stderr: stderr.map_err(|e| DockerError::Io { source: e })?,
        })
    }
}

/// Forward `reader` line by line to `lines`, returning everything read.
async fn pump<R: AsyncRead + Unpin>(
    reader: Option<R>,
    lines: UnboundedSender<String>,
) -> std::io::Result<String> {
    let mut captured = String::new();
    let Some(reader) = reader else {
        return Ok(captured);
    };

    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']);
        captured.push_str(line);
        captured.push('\n');
        // A dropped receiver only means nobody is watching; keep draining.
        let _ = lines.send(line.to_owned());
    }
    Ok(captured)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn pump_splits_lines_and_strips_terminators() {
        let (mut writer, reader) = tokio::io::duplex(64);
        writer.write_all(b"step 1\r\nstep 2\nno newline").await.unwrap();
        drop(writer);

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let captured = pump(Some(reader), tx).await.unwrap();

        assert_eq!(captured, "step 1\nstep 2\nno newline\n");
        let mut seen = Vec::new();
        while let Some(line) = rx.recv().await {
            seen.push(line);
        }
        assert_eq!(seen, ["step 1", "step 2", "no newline"]);
    }

    #[tokio::test]
    async fn pump_survives_dropped_receiver() {
        let (mut writer, reader) = tokio::io::duplex(64);
        writer.write_all(b"a\nb\n").await.unwrap();
        drop(writer);

        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        drop(rx);
        assert_eq!(pump(Some(reader), tx).await.unwrap(), "a\nb\n");
    }

    #[tokio::test]
    async fn missing_program_is_not_installed() {
        let executor = RealExecutor::new("dockhand-definitely-not-a-real-program");
        let err = executor.exec(&["--version".to_owned()]).await.unwrap_err();
        assert!(matches!(err, DockerError::NotInstalled { .. }));
    }
}
