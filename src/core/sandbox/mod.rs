//! Script-source evaluation.
//!
//! Script sources never run on the host. They are parsed with the dialect's
//! own parser, their export convention is detected and lowered structurally
//! (no text rewriting), and a constant evaluator computes the export
//! surface. What a script can reach is the enumerated capability set in
//! [`SandboxCapabilities`]: console-style logging and, at the top level
//! only, resolution of relative module specifiers.

mod eval;
mod exports;
mod parse;
mod resolver;


pub use parse::ScriptDialect;
pub use resolver::ModuleResolver;

use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::sync::oneshot;

use crate::core::error::LoadError;
use crate::core::table::TableMap;
use crate::host::Workspace;

/// Which bucket of the export surface a value lands in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportBucket {
    /// The single default/module export.
    Module,
    /// One named export.
    Named(String),
}

/// An export whose value had not settled when the script was evaluated.
///
/// The build pass that produced it merged without it; awaiting [`settle`]
/// yields the final value for a delayed re-resolution pass.
///
/// [`settle`]: PendingExport::settle
#[derive(Debug)]
pub struct PendingExport {
    pub source: PathBuf,
    pub bucket: ExportBucket,
    receiver: oneshot::Receiver<Value>,
}

impl PendingExport {
    pub(crate) fn new(source: PathBuf, bucket: ExportBucket, receiver: oneshot::Receiver<Value>) -> Self {
        Self {
            source,
            bucket,
            receiver,
        }
    }

    /// Await settlement. `None` means the value can no longer arrive.
    pub async fn settle(self) -> Option<(ExportBucket, Value)> {
        match self.receiver.await {
            Ok(value) => Some((self.bucket, value)),
            Err(_) => None,
        }
    }
}

/// The export surface of one script source: the default/module export plus
/// the named exports, both merged into the table by the builder.
#[derive(Debug, Default)]
pub struct ScriptExports {
    pub module: Option<Value>,
    pub named: TableMap,
    pub pending: Vec<PendingExport>,
}

/// Console-like logging capability. Lines land in the diagnostic log; a
/// script has no other way to produce output.
pub(crate) struct Console {
    source: PathBuf,
}

impl Console {
    fn new(source: &Path) -> Self {
        Self {
            source: source.to_path_buf(),
        }
    }

    pub(crate) fn emit(&self, method: &str, parts: &[String]) {
        log::debug!(
            target: "keylens::sandbox",
            "{}: console.{}({})",
            self.source.display(),
            method,
            parts.join(", ")
        );
    }
}

/// The capability set injected per invocation. `modules` is `None` inside a
/// nested module load: nesting stops at one level.
pub(crate) struct SandboxCapabilities<'w, W> {
    pub(crate) console: Console,
    pub(crate) modules: Option<ModuleResolver<'w, W>>,
}

/// Evaluate a script source and capture its export surface.
///
/// Fails with `CompileError` (typed dialect), `ExecutionError` (syntax or
/// unsupported constructs), or `ModuleNotFoundError` (nested loads); every
/// failure is scoped to this one source.
pub fn execute<W: Workspace>(
    workspace: &W,
    path: &Path,
    source: &str,
) -> Result<ScriptExports, LoadError> {
    let dialect = ScriptDialect::from_path(path);
    let module = parse::parse_script(source, path, dialect)?;
    let ops = exports::lower_module(&module, path)?;
    let caps = SandboxCapabilities {
        console: Console::new(path),
        modules: Some(ModuleResolver::new(workspace, path)),
    };
    exports::run(&ops, path, &caps, true)
}
