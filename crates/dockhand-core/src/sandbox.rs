//! Path resolution confined to a project root.
//!
//! Every path the agent asks about is resolved against the sandbox root:
//! `.` and `..` are collapsed, symlinks met along the way are followed, and
//! the final location must sit under the root. Containment is checked per
//! path component, so a sibling such as `/a/bevil` is not mistaken for a
//! child of `/a/b`.

use std::path::{Component, Path, PathBuf};

/// A requested path resolved to a location outside the sandbox root.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("path outside project directory: {requested}")]
pub struct SandboxViolation {
    /// The path as requested by the caller
    pub requested: String,
    /// Where it actually resolved to
    pub resolved: PathBuf,
}

/// Resolves relative paths against a fixed, canonicalized root.
///
/// # Examples
///
/// ```
/// use dockhand_core::PathSandbox;
///
/// let tmp = tempfile::tempdir().unwrap();
/// let sandbox = PathSandbox::new(tmp.path()).unwrap();
///
/// assert!(sandbox.resolve("src/main.rs").is_ok());
/// assert!(sandbox.resolve("../outside").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct PathSandbox {
    root: PathBuf,
}

impl PathSandbox {
    /// Create a sandbox rooted at `root`.
    ///
    /// # Errors
    ///
    /// [`Error::ProjectDirResolve`](crate::Error::ProjectDirResolve) if the
    /// root cannot be canonicalized (typically because it does not exist).
    pub fn new(root: &Path) -> crate::Result<Self> {
        let root = dunce::canonicalize(root).map_err(|e| crate::Error::ProjectDirResolve {
            path: root.to_path_buf(),
            source: e,
        })?;
        Ok(Self { root })
    }

    /// The canonical root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `relative` against the root.
    ///
    /// The target does not need to exist. An absolute `relative` replaces the
    /// root entirely and is therefore only accepted if it already lies inside.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, SandboxViolation> {
        let resolved = normalize(&self.root.join(relative));
        if resolved.starts_with(&self.root) {
            Ok(resolved)
        } else {
            Err(SandboxViolation {
                requested: relative.to_owned(),
                resolved,
            })
        }
    }
}

/// Collapse `.`/`..` lexically, following symlinks for components that exist.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(name) => {
                out.push(name);
                let is_symlink = std::fs::symlink_metadata(&out)
                    .map(|m| m.file_type().is_symlink())
                    .unwrap_or(false);
                if is_symlink {
                    match dunce::canonicalize(&out) {
                        Ok(target) => out = target,
                        Err(e) => {
                            tracing::debug!(path = %out.display(), error = %e, "dangling symlink; keeping lexical path");
                        }
                    }
                }
            }
        }
    }
    out
}
