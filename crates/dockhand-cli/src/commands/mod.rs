mod analyze;
mod build;
mod generate;

use dockhand_core::Error;
use std::path::{Path, PathBuf};

/// Number of extensions listed by `analyze`.
pub(crate) const TOP_EXTENSIONS: usize = 10;

pub use analyze::analyze;
pub use build::build;
pub use generate::generate;

/// Canonical project directory, or the scanner's not-found / not-a-directory
/// error.
fn project_root(path: &Path) -> anyhow::Result<PathBuf> {
    if !path.exists() {
        return Err(Error::ProjectNotFound {
            path: path.to_path_buf(),
        }
        .into());
    }
    if !path.is_dir() {
        return Err(Error::NotADirectory {
            path: path.to_path_buf(),
        }
        .into());
    }
    let root = dunce::canonicalize(path).map_err(|e| Error::ProjectDirResolve {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(root)
}
