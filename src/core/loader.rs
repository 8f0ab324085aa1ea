//! Reading and parsing of translation sources.

use std::path::Path;

use serde_json::Value;

use crate::core::error::LoadError;
use crate::core::table::TableMap;
use crate::host::Workspace;

/// Read one source's raw content through the workspace.
pub fn read_source<W: Workspace>(workspace: &W, path: &Path) -> Result<String, LoadError> {
    workspace.read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse a data source into its top-level key/value document.
///
/// The document must be an object; anything else has no keys to merge and
/// is a format error like any parse failure.
pub fn parse_data(path: &Path, content: &str) -> Result<TableMap, LoadError> {
    let value: Value = serde_json::from_str(content).map_err(|err| LoadError::Format {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(LoadError::Format {
            path: path.to_path_buf(),
            message: format!("expected a top-level object, found {}", value_kind(&other)),
        }),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
