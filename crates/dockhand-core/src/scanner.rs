//! Project structure and configuration discovery.
//!
//! [`ProjectScanner::analyze`] walks the project depth-first, pruning ignored
//! directories before descending, and produces an immutable
//! [`ProjectContext`]: a sorted file listing, an extension histogram, and the
//! contents of well-known configuration files small enough to inline.

use crate::ignore::IgnoreMatcher;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Files whose content is captured when present at the project root.
pub const CONFIG_FILES: &[&str] = &[
    "package.json",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "requirements.txt",
    "pyproject.toml",
    "setup.py",
    "setup.cfg",
    "Pipfile",
    "Pipfile.lock",
    "go.mod",
    "go.sum",
    "Cargo.toml",
    "Cargo.lock",
    "pom.xml",
    "build.gradle",
    "build.gradle.kts",
    "Gemfile",
    "Gemfile.lock",
    "composer.json",
    "composer.lock",
    "Makefile",
    "CMakeLists.txt",
    "Dockerfile",
    ".dockerignore",
    ".gitignore",
    "tsconfig.json",
    "vite.config.js",
    "vite.config.ts",
    "webpack.config.js",
    "next.config.js",
    "nuxt.config.js",
    "angular.json",
];

/// Config files larger than this are left out of [`ProjectContext::config_files`].
pub const MAX_CONFIG_FILE_SIZE: u64 = 100_000;

/// Snapshot of a project taken by [`ProjectScanner::analyze`].
///
/// Every entry of `file_tree` existed under `root` and passed the ignore
/// rules at scan time. Maps are ordered so two scans of an unchanged tree
/// compare equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectContext {
    /// Canonical project root
    pub root: PathBuf,
    /// Root-relative file paths with `/` separators, lexicographically sorted
    pub file_tree: Vec<String>,
    /// Lowercase extension (with leading dot) → number of files
    pub extensions: BTreeMap<String, usize>,
    /// Config file name → content
    pub config_files: BTreeMap<String, String>,
}

impl ProjectContext {
    pub fn total_files(&self) -> usize {
        self.file_tree.len()
    }

    /// Extensions ordered by descending count, ties broken alphabetically.
    pub fn top_extensions(&self, limit: usize) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = self
            .extensions
            .iter()
            .map(|(ext, count)| (ext.as_str(), *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(limit);
        ranked
    }

    /// Plain-text digest of the project, suitable for priming a prompt.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "Project root: {}\nTotal files: {}\n",
            self.root.display(),
            self.total_files()
        );

        out.push_str("\nFile extensions:\n");
        for (ext, count) in self.top_extensions(10) {
            out.push_str(&format!("  {ext}: {count}\n"));
        }

        out.push_str("\nFiles:\n");
        for path in &self.file_tree {
            out.push_str(&format!("  {path}\n"));
        }

        for (name, content) in &self.config_files {
            out.push_str(&format!("\n--- {name} ---\n{}\n", content.trim_end()));
        }
        out
    }
}

/// Scans a project directory into a [`ProjectContext`].
pub struct ProjectScanner {
    root: PathBuf,
}

impl ProjectScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Walk the project and collect its context.
    ///
    /// Ignore rules are loaded fresh on every call. Unreadable directories,
    /// unreadable config files, and config files over
    /// [`MAX_CONFIG_FILE_SIZE`] are skipped rather than failing the scan.
    ///
    /// # Errors
    ///
    /// - [`Error::ProjectNotFound`](crate::Error::ProjectNotFound) if the root does not exist
    /// - [`Error::NotADirectory`](crate::Error::NotADirectory) if the root is not a directory
    pub fn analyze(&self) -> crate::Result<ProjectContext> {
        if !self.root.exists() {
            return Err(crate::Error::ProjectNotFound {
                path: self.root.clone(),
            });
        }
        if !self.root.is_dir() {
            return Err(crate::Error::NotADirectory {
                path: self.root.clone(),
            });
        }
        let root = dunce::canonicalize(&self.root).map_err(|e| crate::Error::ProjectDirResolve {
            path: self.root.clone(),
            source: e,
        })?;

        let matcher = IgnoreMatcher::load(&root);
        let (file_tree, extensions) = collect_file_tree(&root, &matcher);
        let config_files = read_config_files(&root, &file_tree);

        tracing::debug!(
            root = %root.display(),
            files = file_tree.len(),
            config_files = config_files.len(),
            "project scanned"
        );

        Ok(ProjectContext {
            root,
            file_tree,
            extensions,
            config_files,
        })
    }
}

fn collect_file_tree(
    root: &Path,
    matcher: &IgnoreMatcher,
) -> (Vec<String>, BTreeMap<String, usize>) {
    let mut file_tree = Vec::new();
    let mut extensions = BTreeMap::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if !entry.file_type().is_dir() {
                return true;
            }
            let keep = relative_path(root, entry.path()).is_some_and(|rel| !matcher.should_ignore(&rel));
            if !keep {
                tracing::debug!(path = %entry.path().display(), "pruned ignored directory");
            }
            keep
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        // Symlinked directories are listed by neither walk nor file tree.
        if entry.file_type().is_dir() || (entry.path_is_symlink() && entry.path().is_dir()) {
            continue;
        }
        let Some(rel) = relative_path(root, entry.path()) else {
            continue;
        };
        if matcher.should_ignore(&rel) {
            continue;
        }

        if let Some(ext) = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty())
        {
            *extensions
                .entry(format!(".{}", ext.to_lowercase()))
                .or_insert(0) += 1;
        }
        file_tree.push(rel);
    }

    file_tree.sort();
    (file_tree, extensions)
}

fn read_config_files(root: &Path, file_tree: &[String]) -> BTreeMap<String, String> {
    let mut contents = BTreeMap::new();

    for name in CONFIG_FILES {
        if file_tree.binary_search_by(|p| p.as_str().cmp(*name)).is_err() {
            continue;
        }
        let path = root.join(name);
        let size = match std::fs::metadata(&path) {
            Ok(meta) => meta.len(),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "skipping config file");
                continue;
            }
        };
        if size > MAX_CONFIG_FILE_SIZE {
            tracing::debug!(path = %path.display(), size, "config file too large; omitted");
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                contents.insert((*name).to_owned(), content);
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "skipping config file");
            }
        }
    }

    contents
}

/// Root-relative path with `/` separators, or `None` if not valid UTF-8.
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Option<Vec<&str>> = rel.components().map(|c| c.as_os_str().to_str()).collect();
    parts.map(|parts| parts.join("/"))
}
