//! In-memory host implementations.
//!
//! [`MemoryWorkspace`] maps relative paths to file contents and is the
//! workspace of choice in tests. [`BufferEditor`] holds a single buffer and
//! records the painted annotation set; the CLI uses it to annotate one file,
//! tests use it to observe repaints.

use std::collections::BTreeMap;
use std::io;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use glob::Pattern;

use super::{BufferSnapshot, EditorHost, Workspace};
use crate::core::sync::Annotation;

/// Resolve `.` and `..` components lexically, without touching storage.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// A workspace whose files live in a sorted map.
///
/// Iteration order of the map provides the deterministic discovery order.
#[derive(Debug, Default)]
pub struct MemoryWorkspace {
    files: BTreeMap<PathBuf, String>,
}

impl MemoryWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files.insert(normalize(&path.into()), content.into());
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn remove(&mut self, path: &Path) {
        self.files.remove(&normalize(path));
    }

    fn compile(pattern: &str) -> Result<Vec<Pattern>> {
        super::fs::expand_braces(pattern)
            .iter()
            .map(|p| Pattern::new(p).with_context(|| format!("Invalid glob pattern: \"{}\"", p)))
            .collect()
    }
}

impl Workspace for MemoryWorkspace {
    fn find_files(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let patterns = Self::compile(pattern)?;
        Ok(self
            .files
            .keys()
            .filter(|path| {
                let key = path.to_string_lossy().replace('\\', "/");
                patterns.iter().any(|p| p.matches(&key))
            })
            .cloned()
            .collect())
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .get(&normalize(path))
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{:?}", path)))
    }

    fn matches(&self, pattern: &str, path: &Path) -> bool {
        let Ok(patterns) = Self::compile(pattern) else {
            return false;
        };
        let key = normalize(path).to_string_lossy().replace('\\', "/");
        patterns.iter().any(|p| p.matches(&key))
    }
}

/// An editor host with one buffer and a recorded annotation set.
#[derive(Debug, Default)]
pub struct BufferEditor {
    buffer: Option<BufferSnapshot>,
    annotations: Vec<Annotation>,
    paints: usize,
}

impl BufferEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            buffer: Some(BufferSnapshot::new(text)),
            ..Default::default()
        }
    }

    pub fn set_buffer(&mut self, text: impl Into<String>) {
        self.buffer = Some(BufferSnapshot::new(text));
    }

    pub fn clear_buffer(&mut self) {
        self.buffer = None;
    }

    /// The last painted annotation set.
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// How many times the annotation set has been replaced.
    pub fn paints(&self) -> usize {
        self.paints
    }
}

impl EditorHost for BufferEditor {
    fn active_buffer(&self) -> Option<BufferSnapshot> {
        self.buffer.clone()
    }

    fn replace_annotations(&mut self, annotations: Vec<Annotation>) {
        self.annotations = annotations;
        self.paints += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::host::Workspace;
    use crate::host::memory::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("locales/./en.json")), Path::new("locales/en.json"));
        assert_eq!(normalize(Path::new("locales/sub/../en.json")), Path::new("locales/en.json"));
    }

    #[test]
    fn test_find_files_sorted() {
        let workspace = MemoryWorkspace::new()
            .with_file("locales/b.json", "{}")
            .with_file("locales/a.json", "{}");

        let files = workspace.find_files("locales/*.json").unwrap();
        assert_eq!(
            files,
            vec![Path::new("locales/a.json"), Path::new("locales/b.json")]
        );
    }

    #[test]
    fn test_read_missing_file() {
        let workspace = MemoryWorkspace::new();
        assert!(workspace.read_to_string(Path::new("nope.json")).is_err());
    }
}
