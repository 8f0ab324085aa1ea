//! The source-local error taxonomy.
//!
//! Every failure while loading one translation source maps onto one of these
//! kinds. All of them are caught at the point of origin, logged, and cause
//! only that source to be skipped; none aborts a table rebuild.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    /// The underlying storage could not produce the source's content.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A data source did not parse as a structured key/value document.
    #[error("invalid translation data in {}: {message}", path.display())]
    Format { path: PathBuf, message: String },

    /// A typed-dialect script failed to compile.
    #[error("failed to compile {}: {message}", path.display())]
    Compile { path: PathBuf, message: String },

    /// A script source could not be evaluated to an export surface.
    #[error("script evaluation failed in {}: {message}", path.display())]
    Execution { path: PathBuf, message: String },

    /// A nested module load could not locate its target.
    #[error("module \"{specifier}\" not found (required from {})", requester.display())]
    ModuleNotFound { specifier: String, requester: PathBuf },
}

impl LoadError {
    pub(crate) fn execution(path: &std::path::Path, message: impl Into<String>) -> Self {
        Self::Execution {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}
