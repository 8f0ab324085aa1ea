//! Export-convention detection, lowering, and execution.
//!
//! Scripts may use declarative import/export syntax or the assignment
//! convention (`module.exports` / `exports.<name>`). Both lower into the
//! same [`ExportOp`] stream, so the evaluator only ever sees one form and
//! string or comment contents can never masquerade as an export.

use std::path::Path;

use swc_ecma_ast::{
    AssignOp, AssignTarget, Callee, Decl, ExportDecl, Expr, ExprOrSpread, ExprStmt,
    ImportSpecifier, Lit, MemberExpr, MemberProp, Module, ModuleDecl, ModuleItem, Pat,
    SimpleAssignTarget, Stmt, VarDecl,
};

use super::eval::{self, Env, Evaluated};
use super::{ExportBucket, PendingExport, SandboxCapabilities, ScriptExports};
use crate::core::error::LoadError;
use crate::host::Workspace;

/// One step of a script's lowered export program.
pub(super) enum ExportOp<'m> {
    /// `const name = <expr>` / `let name = <expr>`
    Bind { name: String, init: &'m Expr },
    /// `import name from "<specifier>"`
    BindImport { name: String, specifier: String },
    /// `export default <expr>` / `module.exports = <expr>`
    SetModule { value: &'m Expr },
    /// `export const name = <expr>` / `exports.name = <expr>` /
    /// `module.exports.name = <expr>`
    SetNamed { name: String, value: &'m Expr },
    /// `console.<method>(...)`
    Console {
        method: String,
        args: &'m [ExprOrSpread],
    },
}

/// Detect each module item's convention and lower it.
pub(super) fn lower_module<'m>(
    module: &'m Module,
    path: &Path,
) -> Result<Vec<ExportOp<'m>>, LoadError> {
    let mut ops = Vec::new();
    for item in &module.body {
        match item {
            ModuleItem::ModuleDecl(decl) => lower_module_decl(decl, path, &mut ops)?,
            ModuleItem::Stmt(stmt) => lower_stmt(stmt, path, &mut ops)?,
        }
    }
    Ok(ops)
}

fn lower_module_decl<'m>(
    decl: &'m ModuleDecl,
    path: &Path,
    ops: &mut Vec<ExportOp<'m>>,
) -> Result<(), LoadError> {
    match decl {
        ModuleDecl::ExportDefaultExpr(export) => {
            ops.push(ExportOp::SetModule {
                value: &export.expr,
            });
            Ok(())
        }
        ModuleDecl::ExportDecl(ExportDecl {
            decl: Decl::Var(var),
            ..
        }) => lower_var_decl(var, path, ops, true),
        ModuleDecl::Import(import) => {
            let Some(specifier) = import.src.value.as_str().map(str::to_string) else {
                return Err(LoadError::execution(path, "import specifier is not valid UTF-8"));
            };
            for spec in &import.specifiers {
                match spec {
                    ImportSpecifier::Default(default) => ops.push(ExportOp::BindImport {
                        name: default.local.sym.to_string(),
                        specifier: specifier.clone(),
                    }),
                    _ => {
                        return Err(LoadError::execution(
                            path,
                            "only default imports are supported",
                        ));
                    }
                }
            }
            Ok(())
        }
        _ => Err(LoadError::execution(path, "unsupported module declaration")),
    }
}

fn lower_var_decl<'m>(
    var: &'m VarDecl,
    path: &Path,
    ops: &mut Vec<ExportOp<'m>>,
    exported: bool,
) -> Result<(), LoadError> {
    for declarator in &var.decls {
        let Pat::Ident(ident) = &declarator.name else {
            return Err(LoadError::execution(
                path,
                "destructuring declarations are not supported",
            ));
        };
        let name = ident.id.sym.to_string();
        let Some(init) = declarator.init.as_deref() else {
            return Err(LoadError::execution(
                path,
                format!("declaration of `{}` has no initializer", name),
            ));
        };
        if exported {
            ops.push(ExportOp::SetNamed { name, value: init });
        } else {
            ops.push(ExportOp::Bind { name, init });
        }
    }
    Ok(())
}

fn lower_stmt<'m>(
    stmt: &'m Stmt,
    path: &Path,
    ops: &mut Vec<ExportOp<'m>>,
) -> Result<(), LoadError> {
    match stmt {
        Stmt::Decl(Decl::Var(var)) => lower_var_decl(var, path, ops, false),
        Stmt::Expr(ExprStmt { expr, .. }) => lower_expr_stmt(expr, path, ops),
        Stmt::Empty(_) => Ok(()),
        _ => Err(LoadError::execution(path, "unsupported statement")),
    }
}

fn lower_expr_stmt<'m>(
    expr: &'m Expr,
    path: &Path,
    ops: &mut Vec<ExportOp<'m>>,
) -> Result<(), LoadError> {
    match expr {
        // Directive prologues like "use strict".
        Expr::Lit(Lit::Str(_)) => Ok(()),
        Expr::Assign(assign) if assign.op == AssignOp::Assign => {
            let AssignTarget::Simple(SimpleAssignTarget::Member(member)) = &assign.left else {
                return Err(LoadError::execution(path, "unsupported assignment target"));
            };
            match member_path(member).as_deref() {
                Some([object, field]) if object == "module" && field == "exports" => {
                    ops.push(ExportOp::SetModule {
                        value: &assign.right,
                    });
                    Ok(())
                }
                Some([object, field, name]) if object == "module" && field == "exports" => {
                    ops.push(ExportOp::SetNamed {
                        name: name.clone(),
                        value: &assign.right,
                    });
                    Ok(())
                }
                Some([object, name]) if object == "exports" => {
                    ops.push(ExportOp::SetNamed {
                        name: name.clone(),
                        value: &assign.right,
                    });
                    Ok(())
                }
                _ => Err(LoadError::execution(path, "unsupported assignment target")),
            }
        }
        Expr::Call(call) => {
            if let Callee::Expr(callee) = &call.callee
                && let Expr::Member(member) = callee.as_ref()
                && let Expr::Ident(object) = member.obj.as_ref()
                && object.sym.as_ref() == "console"
                && let MemberProp::Ident(method) = &member.prop
            {
                ops.push(ExportOp::Console {
                    method: method.sym.to_string(),
                    args: &call.args,
                });
                return Ok(());
            }
            Err(LoadError::execution(path, "unsupported call statement"))
        }
        _ => Err(LoadError::execution(path, "unsupported expression statement")),
    }
}

/// `module.exports.greeting` -> `["module", "exports", "greeting"]`, for
/// pure identifier chains only.
fn member_path(member: &MemberExpr) -> Option<Vec<String>> {
    let mut parts = match member.obj.as_ref() {
        Expr::Ident(ident) => vec![ident.sym.to_string()],
        Expr::Member(inner) => member_path(inner)?,
        _ => return None,
    };
    match &member.prop {
        MemberProp::Ident(ident) => parts.push(ident.sym.to_string()),
        _ => return None,
    }
    Some(parts)
}

/// Execute a lowered export program.
///
/// `defer` controls what a `Promise.resolve(...)` export becomes: a pending
/// export at the top level, or its inner value inside a nested module load,
/// where the requester consumes the surface synchronously.
pub(super) fn run<W: Workspace>(
    ops: &[ExportOp<'_>],
    path: &Path,
    caps: &SandboxCapabilities<'_, W>,
    defer: bool,
) -> Result<ScriptExports, LoadError> {
    let mut env = Env::new();
    let mut exports = ScriptExports::default();

    for op in ops {
        match op {
            ExportOp::Bind { name, init } => {
                let value = eval::eval_value(init, &env, caps, path)?;
                env.bind(name.clone(), value);
            }
            ExportOp::BindImport { name, specifier } => {
                let Some(resolver) = &caps.modules else {
                    return Err(LoadError::execution(
                        path,
                        "module resolution is not available in nested modules",
                    ));
                };
                let value = resolver.load(specifier, path)?;
                env.bind(name.clone(), value);
            }
            ExportOp::SetModule { value } => {
                match eval::eval_export(value, &env, caps, path, defer)? {
                    Evaluated::Value(value) => exports.module = Some(value),
                    Evaluated::Pending(receiver) => exports.pending.push(PendingExport::new(
                        path.to_path_buf(),
                        ExportBucket::Module,
                        receiver,
                    )),
                }
            }
            ExportOp::SetNamed { name, value } => {
                match eval::eval_export(value, &env, caps, path, defer)? {
                    Evaluated::Value(value) => {
                        exports.named.insert(name.clone(), value);
                    }
                    Evaluated::Pending(receiver) => exports.pending.push(PendingExport::new(
                        path.to_path_buf(),
                        ExportBucket::Named(name.clone()),
                        receiver,
                    )),
                }
            }
            ExportOp::Console { method, args } => {
                let parts: Vec<String> = args
                    .iter()
                    .map(|arg| eval::preview(arg, &env, caps, path))
                    .collect();
                caps.console.emit(method, &parts);
            }
        }
    }

    Ok(exports)
}
