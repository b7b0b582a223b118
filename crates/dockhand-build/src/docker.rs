use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DockerError {
    #[error("{program} is not available. Please install it and ensure it's running.")]
    NotInstalled { program: String },

    #[error("Dockerfile not found at {path}")]
    RecipeMissing { path: PathBuf },

    #[error("failed to start {program}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("failed to read build output")]
    Io { source: std::io::Error },

    #[error("{program} build failed with exit code {code}")]
    Failed {
        program: String,
        code: i32,
        output: String,
    },

    #[error("{program} build was terminated by a signal")]
    Terminated { program: String },
}

/// Captured result of one build-tool invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// stderr when non-empty, otherwise stdout.
    pub fn diagnostics(&self) -> &str {
        if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        }
    }
}
