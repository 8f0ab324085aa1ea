//! Host collaborator seams.
//!
//! The engine never talks to an editor or a filesystem directly. File
//! discovery and reads go through [`Workspace`]; the active buffer and the
//! painted annotation set go through [`EditorHost`]. The bundled
//! implementations cover the CLI ([`fs::FsWorkspace`], [`memory::BufferEditor`])
//! and tests ([`memory::MemoryWorkspace`]); an editor integration supplies
//! its own.

pub mod fs;
pub mod memory;

use std::io;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::sync::Annotation;

/// A snapshot of the active text buffer.
///
/// Scan results and annotation ranges are only meaningful against the exact
/// snapshot they were computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferSnapshot {
    pub text: String,
}

impl BufferSnapshot {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// File discovery and reading capability.
pub trait Workspace {
    /// All files matching `pattern`, in a deterministic order for a fixed
    /// file set. The order decides merge precedence, so implementations
    /// must not shuffle between calls.
    fn find_files(&self, pattern: &str) -> Result<Vec<PathBuf>>;

    /// Raw content of one file.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Whether `path` would be discovered by `pattern`.
    fn matches(&self, pattern: &str, path: &Path) -> bool;
}

/// Active-buffer access and annotation rendering capability.
pub trait EditorHost {
    fn active_buffer(&self) -> Option<BufferSnapshot>;

    /// Replace the previously painted annotation set with `annotations`.
    /// The full set is always repainted; there is no incremental patching.
    fn replace_annotations(&mut self, annotations: Vec<Annotation>);
}
