//! Filesystem-backed workspace.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::Pattern;
use walkdir::WalkDir;

use super::Workspace;

/// Expand one level of `{a,b,c}` brace sets into plain glob patterns.
///
/// `locales/**/*.{json,js}` becomes `locales/**/*.json` and
/// `locales/**/*.js`. A pattern without braces is returned as-is. Nested
/// brace sets are not supported.
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };
    let Some(close) = pattern[open..].find('}').map(|rel| open + rel) else {
        return vec![pattern.to_string()];
    };

    let prefix = &pattern[..open];
    let body = &pattern[open + 1..close];
    let suffix = &pattern[close + 1..];

    body.split(',')
        .flat_map(|alt| expand_braces(&format!("{}{}{}", prefix, alt.trim(), suffix)))
        .collect()
}

fn compile_patterns(pattern: &str) -> Result<Vec<Pattern>> {
    expand_braces(pattern)
        .iter()
        .map(|p| Pattern::new(p).with_context(|| format!("Invalid glob pattern: \"{}\"", p)))
        .collect()
}

/// Workspace rooted at a project directory.
///
/// Patterns match against paths relative to the root, with `/` separators.
/// Discovery walks the tree with sorted directory entries, so the order is
/// deterministic for a fixed file set.
pub struct FsWorkspace {
    root: PathBuf,
}

impl FsWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn relative_key(&self, path: &Path) -> String {
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        rel.to_string_lossy().replace('\\', "/")
    }
}

impl Workspace for FsWorkspace {
    fn find_files(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let patterns = compile_patterns(pattern)?;
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    log::debug!("cannot access path while discovering sources: {}", err);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let key = self.relative_key(entry.path());
            if patterns.iter().any(|p| p.matches(&key)) {
                files.push(entry.path().to_path_buf());
            }
        }

        Ok(files)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn matches(&self, pattern: &str, path: &Path) -> bool {
        let Ok(patterns) = compile_patterns(pattern) else {
            return false;
        };
        let key = self.relative_key(path);
        patterns.iter().any(|p| p.matches(&key))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use crate::host::Workspace;
    use crate::host::fs::*;

    #[test]
    fn test_expand_braces() {
        assert_eq!(expand_braces("locales/*.json"), vec!["locales/*.json"]);
        assert_eq!(
            expand_braces("locales/**/*.{json,js,ts}"),
            vec![
                "locales/**/*.json",
                "locales/**/*.js",
                "locales/**/*.ts"
            ]
        );
        assert_eq!(
            expand_braces("{a,b}/x.{c,d}"),
            vec!["a/x.c", "a/x.d", "b/x.c", "b/x.d"]
        );
    }

    #[test]
    fn test_expand_braces_unbalanced_is_literal() {
        assert_eq!(expand_braces("locales/{json"), vec!["locales/{json"]);
    }

    #[test]
    fn test_find_files_matches_brace_union() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("locales/nested")).unwrap();
        fs::write(dir.path().join("locales/en.json"), "{}").unwrap();
        fs::write(dir.path().join("locales/en.js"), "").unwrap();
        fs::write(dir.path().join("locales/en.yaml"), "").unwrap();
        fs::write(dir.path().join("locales/nested/extra.json"), "{}").unwrap();
        fs::write(dir.path().join("readme.json"), "{}").unwrap();

        let workspace = FsWorkspace::new(dir.path());
        let files = workspace.find_files("locales/**/*.{json,js}").unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| workspace.relative_key(p))
            .collect();

        assert!(names.contains(&"locales/en.json".to_string()));
        assert!(names.contains(&"locales/en.js".to_string()));
        assert!(names.contains(&"locales/nested/extra.json".to_string()));
        assert!(!names.contains(&"locales/en.yaml".to_string()));
        assert!(!names.contains(&"readme.json".to_string()));
    }

    #[test]
    fn test_find_files_order_is_deterministic() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("locales")).unwrap();
        fs::write(dir.path().join("locales/b.json"), "{}").unwrap();
        fs::write(dir.path().join("locales/a.json"), "{}").unwrap();

        let workspace = FsWorkspace::new(dir.path());
        let first = workspace.find_files("locales/*.json").unwrap();
        let second = workspace.find_files("locales/*.json").unwrap();

        assert_eq!(first, second);
        let names: Vec<String> = first.iter().map(|p| workspace.relative_key(p)).collect();
        assert_eq!(names, vec!["locales/a.json", "locales/b.json"]);
    }

    #[test]
    fn test_matches_saved_file() {
        let dir = tempdir().unwrap();
        let workspace = FsWorkspace::new(dir.path());

        assert!(workspace.matches("locales/**/*.{json,js,ts}", &dir.path().join("locales/en.json")));
        assert!(!workspace.matches("locales/**/*.{json,js,ts}", &dir.path().join("src/app.tsx")));
    }
}
