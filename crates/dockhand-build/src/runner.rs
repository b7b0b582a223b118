use crate::docker::{CommandOutput, DockerError};
use crate::executor::{BuildExecutor, RealExecutor};
use dockhand_core::{BuildConfig, RECIPE_FILE_NAME};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

/// Marker preceding the image digest in build-tool output.
const IMAGE_DIGEST_MARKER: &str = "writing image sha256:";

/// Outcome of a build.
///
/// A failed build never carries an image id; a successful one may still lack
/// one when the id could not be recovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildResult {
    pub success: bool,
    pub image_id: Option<String>,
    pub error: Option<String>,
}

impl BuildResult {
    pub fn ok(image_id: Option<String>) -> Self {
        Self {
            success: true,
            image_id,
            error: None,
        }
    }

    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            image_id: None,
            error: Some(error.into()),
        }
    }
}

impl From<DockerError> for BuildResult {
    fn from(e: DockerError) -> Self {
        match &e {
            DockerError::Failed { output, .. } if !output.trim().is_empty() => {
                Self::fail(format!("{e}\n{}", output.trim_end()))
            }
            _ => Self::fail(e.to_string()),
        }
    }
}

/// Builds an image from a recipe and a context directory.
pub struct BuildRunner<E: BuildExecutor = RealExecutor> {
    executor: E,
    context_path: PathBuf,
    recipe_path: PathBuf,
    program: String,
    platform: String,
}

impl BuildRunner<RealExecutor> {
    /// Runner for `context_path` using `<context>/Dockerfile` and the
    /// configured program and platform.
    pub fn new(context_path: impl Into<PathBuf>, config: &BuildConfig) -> Self {
        Self::with_executor(RealExecutor::new(config.program.clone()), context_path, config)
    }
}

impl<E: BuildExecutor> BuildRunner<E> {
    pub fn with_executor(executor: E, context_path: impl Into<PathBuf>, config: &BuildConfig) -> Self {
        let context_path = context_path.into();
        Self {
            executor,
            recipe_path: context_path.join(RECIPE_FILE_NAME),
            context_path,
            program: config.program.clone(),
            platform: config.platform.clone(),
        }
    }

    /// Build from a recipe other than `<context>/Dockerfile`.
    pub fn with_recipe(mut self, recipe_path: impl Into<PathBuf>) -> Self {
        self.recipe_path = recipe_path.into();
        self
    }

    pub fn context_path(&self) -> &Path {
        &self.context_path
    }

    pub fn recipe_path(&self) -> &Path {
        &self.recipe_path
    }

    /// Build and capture output. On failure the error carries the exit code
    /// followed by the tool's diagnostics.
    pub async fn build(&self, tag: Option<&str>) -> BuildResult {
        match self.try_build(tag, None::<fn(&str)>).await {
            Ok(image_id) => BuildResult::ok(image_id),
            Err(e) => e.into(),
        }
    }

    /// Build, handing each output line to `on_line` as it arrives.
    pub async fn build_streaming(&self, tag: Option<&str>, on_line: impl FnMut(&str)) -> BuildResult {
        match self.try_build(tag, Some(on_line)).await {
            Ok(image_id) => BuildResult::ok(image_id),
            // The lines have already been shown.
            Err(DockerError::Failed { program, code, .. }) => DockerError::Failed {
                program,
                code,
                output: String::new(),
            }
            .into(),
            Err(e) => e.into(),
        }
    }

    async fn try_build<F: FnMut(&str)>(
        &self,
        tag: Option<&str>,
        on_line: Option<F>,
    ) -> Result<Option<String>, DockerError> {
        self.ensure_available().await?;

        if !self.recipe_path.exists() {
            return Err(DockerError::RecipeMissing {
                path: self.recipe_path.clone(),
            });
        }

        let argv = self.build_args(tag);
        tracing::info!(
            program = %self.program,
            context = %self.context_path.display(),
            recipe = %self.recipe_path.display(),
            tag = tag.unwrap_or("-"),
            "building image"
        );

        let output = match on_line {
            Some(mut on_line) => {
                let (tx, mut rx) = mpsc::unbounded_channel::<String>();
                let drain = async {
                    while let Some(line) = rx.recv().await {
                        on_line(&line);
                    }
                };
                let (output, ()) = tokio::join!(self.executor.exec_streaming(&argv, tx), drain);
                output?
            }
            None => self.executor.exec(&argv).await?,
        };

        match output.code {
            Some(0) => {}
            Some(code) => {
                return Err(DockerError::Failed {
                    program: self.program.clone(),
                    code,
                    output: output.diagnostics().to_owned(),
                });
            }
            None => {
                return Err(DockerError::Terminated {
                    program: self.program.clone(),
                });
            }
        }

        Ok(self.image_id(&output, tag).await)
    }

    async fn ensure_available(&self) -> Result<(), DockerError> {
        let not_installed = || DockerError::NotInstalled {
            program: self.program.clone(),
        };
        match self.executor.exec(&args(["--version"])).await {
            Ok(out) if out.success() => {
                tracing::debug!(version = %out.stdout.trim(), "build tool available");
                Ok(())
            }
            Ok(out) => {
                tracing::debug!(code = ?out.code, "build tool version check failed");
                Err(not_installed())
            }
            Err(e) => {
                tracing::debug!(error = %e, "build tool version check failed");
                Err(not_installed())
            }
        }
    }

    fn build_args(&self, tag: Option<&str>) -> Vec<String> {
        let mut argv = args([
            "build",
            "--platform",
            &self.platform,
            "-f",
            &self.recipe_path.to_string_lossy(),
        ]);
        if let Some(tag) = tag {
            argv.extend(args(["-t", tag]));
        }
        argv.push(self.context_path.to_string_lossy().into_owned());
        argv
    }

    /// Ask the tool for the image behind `tag`, then fall back to scanning
    /// the build output.
    async fn image_id(&self, output: &CommandOutput, tag: Option<&str>) -> Option<String> {
        if let Some(tag) = tag {
            match self.executor.exec(&args(["images", "-q", tag])).await {
                Ok(out) if out.success() => {
                    if let Some(id) = out.stdout.lines().map(str::trim).find(|l| !l.is_empty()) {
                        return Some(id.to_owned());
                    }
                }
                Ok(out) => tracing::warn!(tag, code = ?out.code, "image query failed"),
                Err(e) => tracing::warn!(tag, error = %e, "image query failed"),
            }
        }

        image_id_from_output(&output.stdout).or_else(|| image_id_from_output(&output.stderr))
    }
}

/// Find the most recent `writing image sha256:<digest>` line and return
/// `sha256:<digest>`. The marker is matched case-insensitively.
pub fn image_id_from_output(output: &str) -> Option<String> {
    output.lines().rev().find_map(|line| {
        let at = line.to_ascii_lowercase().find(IMAGE_DIGEST_MARKER)?;
        let digest = line[at + IMAGE_DIGEST_MARKER.len()..].split_whitespace().next()?;
        Some(format!("sha256:{digest}"))
    })
}

fn args<const N: usize>(a: [&str; N]) -> Vec<String> {
    a.iter().map(|s| (*s).to_owned()).collect()
}
