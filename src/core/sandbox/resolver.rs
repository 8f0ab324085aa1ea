//! One-level module resolution for script sources.

use std::path::{Path, PathBuf};

use serde_json::Value;

use super::{Console, SandboxCapabilities, ScriptExports, exports, parse};
use crate::core::error::LoadError;
use crate::core::loader;
use crate::host::Workspace;
use crate::host::memory::normalize;

const PROBE_EXTENSIONS: &[&str] = &["json", "js", "ts"];

/// Resolves relative module specifiers for one requesting script.
///
/// The loaded module runs in a fresh context with console capability but no
/// further module resolution: nesting stops at one level.
pub struct ModuleResolver<'w, W> {
    workspace: &'w W,
    base: PathBuf,
}

impl<'w, W: Workspace> ModuleResolver<'w, W> {
    pub fn new(workspace: &'w W, requester: &Path) -> Self {
        let base = requester.parent().map(Path::to_path_buf).unwrap_or_default();
        Self { workspace, base }
    }

    /// Load the module behind `specifier` and return its export surface as
    /// one value: the module export if set, otherwise the named exports as
    /// a mapping.
    pub fn load(&self, specifier: &str, requester: &Path) -> Result<Value, LoadError> {
        if !specifier.starts_with("./") && !specifier.starts_with("../") {
            return Err(LoadError::ModuleNotFound {
                specifier: specifier.to_string(),
                requester: requester.to_path_buf(),
            });
        }

        let target = normalize(&self.base.join(specifier));
        for candidate in candidates(&target) {
            if let Ok(content) = self.workspace.read_to_string(&candidate) {
                return self.load_module(&candidate, &content);
            }
        }

        Err(LoadError::ModuleNotFound {
            specifier: specifier.to_string(),
            requester: requester.to_path_buf(),
        })
    }

    fn load_module(&self, path: &Path, content: &str) -> Result<Value, LoadError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => loader::parse_data(path, content).map(Value::Object),
            _ => {
                let dialect = parse::ScriptDialect::from_path(path);
                let module = parse::parse_script(content, path, dialect)?;
                let ops = exports::lower_module(&module, path)?;
                let caps: SandboxCapabilities<'_, W> = SandboxCapabilities {
                    console: Console::new(path),
                    modules: None,
                };
                let exports = exports::run(&ops, path, &caps, false)?;
                Ok(surface_value(exports))
            }
        }
    }
}

/// The specifier as given, then with each known extension appended.
fn candidates(target: &Path) -> Vec<PathBuf> {
    let mut paths = vec![target.to_path_buf()];
    for ext in PROBE_EXTENSIONS {
        paths.push(PathBuf::from(format!("{}.{}", target.display(), ext)));
    }
    paths
}

fn surface_value(exports: ScriptExports) -> Value {
    match exports.module {
        Some(value) => value,
        None => Value::Object(exports.named),
    }
}
