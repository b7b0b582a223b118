//! Layered exclusion rules for project traversal.
//!
//! The rule set is the built-in patterns followed by every non-blank,
//! non-comment line of the project's `.gitignore` and `.dockerignore`.
//! Matching is existence-based: a path is excluded when *any* pattern
//! matches either the whole relative path or its final segment. There is
//! no precedence and no `!` negation; a leading `!` is kept literally and
//! in practice matches nothing.

use glob::Pattern;
use std::path::Path;

/// Patterns that are always excluded, whatever the project's ignore files say.
pub const BUILTIN_PATTERNS: &[&str] = &[
    ".git",
    ".git/*",
    "__pycache__",
    "__pycache__/*",
    "node_modules",
    "node_modules/*",
    ".venv",
    ".venv/*",
    "venv",
    "venv/*",
    ".env",
    "*.pyc",
    "*.pyo",
    ".DS_Store",
    "*.log",
    "dist",
    "dist/*",
    "build",
    "build/*",
    "target",
    "target/*",
];

/// Ignore files read from the project root, in load order.
pub const IGNORE_FILES: &[&str] = &[".gitignore", ".dockerignore"];

/// Decides, per relative path, whether it is excluded from a scan.
#[derive(Debug, Clone)]
pub struct IgnoreMatcher {
    rules: Vec<Rule>,
}

#[derive(Debug, Clone)]
struct Rule {
    source: String,
    pattern: Pattern,
}

impl IgnoreMatcher {
    /// Only the built-in patterns.
    pub fn builtin() -> Self {
        Self::from_patterns(BUILTIN_PATTERNS.iter().copied())
    }

    /// Built-in patterns plus those found in the ignore files at `root`.
    ///
    /// An ignore file that is missing, unreadable, or not valid UTF-8
    /// contributes nothing.
    pub fn load(root: &Path) -> Self {
        let mut patterns: Vec<String> = BUILTIN_PATTERNS.iter().map(|p| (*p).to_owned()).collect();

        for name in IGNORE_FILES {
            let path = root.join(name);
            if !path.is_file() {
                continue;
            }
            match std::fs::read_to_string(&path) {
                Ok(content) => patterns.extend(parse_ignore_file(&content)),
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "skipping unreadable ignore file");
                }
            }
        }

        Self::from_patterns(patterns)
    }

    /// Build a matcher from raw pattern strings.
    ///
    /// A trailing `/` (directory marker) and a leading `/` (root anchor) are
    /// stripped, since both forms are compared against root-relative paths.
    /// Patterns are read with fnmatch rules (`**` is `*`, an unclosed `[` is
    /// literal); any that still fail to compile are dropped.
    pub fn from_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rules = patterns
            .into_iter()
            .filter_map(|raw| {
                let raw = raw.as_ref();
                let trimmed = raw.trim_end_matches('/').trim_start_matches('/');
                if trimmed.is_empty() {
                    return None;
                }
                match Pattern::new(&fnmatch_to_glob(trimmed)) {
                    Ok(pattern) => Some(Rule {
                        source: raw.to_owned(),
                        pattern,
                    }),
                    Err(e) => {
                        tracing::debug!(pattern = raw, error = %e, "dropping invalid ignore pattern");
                        None
                    }
                }
            })
            .collect();
        Self { rules }
    }

    /// The active patterns, in load order, as written in their source.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.source.as_str())
    }

    /// Whether `relative_path` (with `/` separators) is excluded.
    pub fn should_ignore(&self, relative_path: &str) -> bool {
        let name = relative_path.rsplit('/').next().unwrap_or(relative_path);
        self.rules
            .iter()
            .any(|r| r.pattern.matches(relative_path) || r.pattern.matches(name))
    }
}

impl Default for IgnoreMatcher {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Rewrite an fnmatch-style pattern into one [`glob::Pattern`] accepts with
/// the same meaning.
///
/// - A run of `*` becomes a single `*`. Both match any text, `/` included.
/// - A `[` without a closing `]` is a literal `[`.
fn fnmatch_to_glob(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => {
                out.push('*');
                while chars.get(i + 1) == Some(&'*') {
                    i += 1;
                }
            }
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    out.extend(&chars[i..=end]);
                    i = end;
                }
                None => out.push_str("[[]"),
            },
            c => out.push(c),
        }
        i += 1;
    }
    out
}

/// Index of the `]` closing the class opened at `open`. A `]` right after
/// `[` or `[!` is a member, not the terminator.
fn class_end(chars: &[char], open: usize) -> Option<usize> {
    let mut j = open + 1;
    if chars.get(j) == Some(&'!') {
        j += 1;
    }
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    (j..chars.len()).find(|&k| chars[k] == ']')
}

/// Lines of an ignore file that carry a pattern.
fn parse_ignore_file(content: &str) -> impl Iterator<Item = String> + '_ {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_skips_blanks_and_comments() {
        let lines: Vec<String> = parse_ignore_file("# deps\n\n  node_modules  \n*.tmp\n   # indented\n").collect();
        assert_eq!(lines, vec!["node_modules", "*.tmp"]);
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let m = IgnoreMatcher::from_patterns(["coverage/"]);
        assert!(m.should_ignore("coverage"));
        assert!(m.should_ignore("web/coverage"));
    }

    #[test]
    fn double_star_reads_as_single_star() {
        assert_eq!(fnmatch_to_glob("foo**"), "foo*");
        assert_eq!(fnmatch_to_glob("a/**/b"), "a/*/b");

        let m = IgnoreMatcher::from_patterns(["foo**"]);
        assert_eq!(m.patterns().count(), 1);
        assert!(m.should_ignore("foobar"));
        assert!(m.should_ignore("src/foo.rs"));
        assert!(!m.should_ignore("bar"));
    }

    #[test]
    fn unclosed_bracket_is_literal() {
        assert_eq!(fnmatch_to_glob("data[1"), "data[[]1");

        let m = IgnoreMatcher::from_patterns(["[", "data[1", "*.tmp"]);
        assert_eq!(m.patterns().count(), 3);
        assert!(m.should_ignore("["));
        assert!(m.should_ignore("data[1"));
        assert!(!m.should_ignore("data1"));
        assert!(m.should_ignore("a.tmp"));
    }

    #[test]
    fn bracket_classes_are_kept() {
        assert_eq!(fnmatch_to_glob("*.py[co]"), "*.py[co]");
        assert_eq!(fnmatch_to_glob("[]x]"), "[]x]");
        assert_eq!(fnmatch_to_glob("[!a]b"), "[!a]b");

        let m = IgnoreMatcher::from_patterns(["*.py[co]"]);
        assert!(m.should_ignore("app.pyc"));
        assert!(!m.should_ignore("app.py"));
    }
}
