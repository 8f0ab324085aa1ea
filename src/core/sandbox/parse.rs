//! Script parsing per dialect.

use std::path::Path;
use std::sync::Arc;

use swc_common::{FileName, GLOBALS, Globals, SourceMap};
use swc_ecma_ast::Module;
use swc_ecma_parser::{EsSyntax, Parser, StringInput, Syntax, TsSyntax};

use crate::core::error::LoadError;

/// The dialect a script source is parsed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptDialect {
    /// Plain ECMAScript (`.js`).
    Es,
    /// The typed superset (`.ts`); parsing doubles as the compile step.
    TypeScript,
}

impl ScriptDialect {
    pub fn from_path(path: &Path) -> ScriptDialect {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("ts") => ScriptDialect::TypeScript,
            _ => ScriptDialect::Es,
        }
    }
}

/// Parse script source into an AST.
///
/// A parse failure in the typed dialect is a `CompileError` (the compile
/// step fails closed); in plain ECMAScript it is an `ExecutionError`, since
/// there is no compile step to blame.
pub fn parse_script(
    source: &str,
    path: &Path,
    dialect: ScriptDialect,
) -> Result<Module, LoadError> {
    GLOBALS.set(&Globals::new(), || {
        let source_map: Arc<SourceMap> = Default::default();
        let file_name = path.to_string_lossy().to_string();
        let source_file =
            source_map.new_source_file(FileName::Real(file_name.into()).into(), source.to_string());

        let syntax = match dialect {
            ScriptDialect::TypeScript => Syntax::Typescript(TsSyntax::default()),
            ScriptDialect::Es => Syntax::Es(EsSyntax::default()),
        };

        let mut parser = Parser::new(syntax, StringInput::from(&*source_file), None);

        parser.parse_module().map_err(|err| match dialect {
            ScriptDialect::TypeScript => LoadError::Compile {
                path: path.to_path_buf(),
                message: format!("{:?}", err),
            },
            ScriptDialect::Es => LoadError::Execution {
                path: path.to_path_buf(),
                message: format!("{:?}", err),
            },
        })
    })
}
