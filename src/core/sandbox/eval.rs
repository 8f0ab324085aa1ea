//! Constant evaluation of script expressions.
//!
//! The evaluator computes values for the whitelisted expression forms a
//! translation module legitimately uses. Anything outside the whitelist is
//! an `ExecutionError` for the whole source: the sandbox fails closed
//! rather than approximating.

use std::collections::HashMap;
use std::path::Path;

use serde_json::{Map, Number, Value};
use swc_ecma_ast::{
    Callee, Expr, ExprOrSpread, Lit, MemberProp, Prop, PropName, PropOrSpread, UnaryOp,
};
use tokio::sync::oneshot;

use super::SandboxCapabilities;
use crate::core::error::LoadError;
use crate::host::Workspace;

/// Local bindings visible to the script.
#[derive(Default)]
pub(super) struct Env {
    bindings: HashMap<String, Value>,
}

impl Env {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub(super) fn bind(&mut self, name: String, value: Value) {
        self.bindings.insert(name, value);
    }

    fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }
}

/// An evaluated export: a concrete value, or one that settles later.
pub(super) enum Evaluated {
    Value(Value),
    Pending(oneshot::Receiver<Value>),
}

/// Evaluate an expression at export position.
///
/// With `defer` set, `Promise.resolve(...)` becomes a pending export whose
/// settlement channel fires once the inner value is computed.
pub(super) fn eval_export<W: Workspace>(
    expr: &Expr,
    env: &Env,
    caps: &SandboxCapabilities<'_, W>,
    path: &Path,
    defer: bool,
) -> Result<Evaluated, LoadError> {
    if defer && let Some(inner) = promise_resolve_arg(expr) {
        let value = eval_value(inner, env, caps, path)?;
        let (sender, receiver) = oneshot::channel();
        // The channel is the settlement point; a statically computed value
        // settles immediately.
        let _ = sender.send(value);
        return Ok(Evaluated::Pending(receiver));
    }
    eval_value(expr, env, caps, path).map(Evaluated::Value)
}

fn promise_resolve_arg(expr: &Expr) -> Option<&Expr> {
    let Expr::Call(call) = expr else { return None };
    let Callee::Expr(callee) = &call.callee else {
        return None;
    };
    let Expr::Member(member) = callee.as_ref() else {
        return None;
    };
    let Expr::Ident(object) = member.obj.as_ref() else {
        return None;
    };
    let MemberProp::Ident(prop) = &member.prop else {
        return None;
    };
    if object.sym.as_ref() != "Promise" || prop.sym.as_ref() != "resolve" {
        return None;
    }
    match call.args.as_slice() {
        [ExprOrSpread { spread: None, expr }] => Some(expr.as_ref()),
        _ => None,
    }
}

pub(super) fn eval_value<W: Workspace>(
    expr: &Expr,
    env: &Env,
    caps: &SandboxCapabilities<'_, W>,
    path: &Path,
) -> Result<Value, LoadError> {
    match expr {
        Expr::Lit(lit) => eval_lit(lit, path),
        Expr::Tpl(tpl) => {
            if !tpl.exprs.is_empty() {
                return Err(LoadError::execution(
                    path,
                    "template literals with substitutions are not supported",
                ));
            }
            let text: String = tpl
                .quasis
                .iter()
                .map(|quasi| {
                    quasi
                        .cooked
                        .as_ref()
                        .and_then(|cooked| cooked.as_str())
                        .map(str::to_string)
                        .unwrap_or_else(|| quasi.raw.to_string())
                })
                .collect();
            Ok(Value::String(text))
        }
        Expr::Array(array) => {
            let mut items = Vec::with_capacity(array.elems.len());
            for element in &array.elems {
                match element {
                    None => items.push(Value::Null),
                    Some(ExprOrSpread { spread: Some(_), .. }) => {
                        return Err(LoadError::execution(
                            path,
                            "spread elements in arrays are not supported",
                        ));
                    }
                    Some(ExprOrSpread { expr, .. }) => {
                        items.push(eval_value(expr, env, caps, path)?)
                    }
                }
            }
            Ok(Value::Array(items))
        }
        Expr::Object(object) => {
            let mut map = Map::new();
            for prop in &object.props {
                match prop {
                    PropOrSpread::Spread(spread) => {
                        let Value::Object(entries) = eval_value(&spread.expr, env, caps, path)?
                        else {
                            return Err(LoadError::execution(
                                path,
                                "only mappings can be spread into an object",
                            ));
                        };
                        for (key, value) in entries {
                            map.insert(key, value);
                        }
                    }
                    PropOrSpread::Prop(prop) => match prop.as_ref() {
                        Prop::Shorthand(ident) => {
                            let value = env.get(ident.sym.as_ref()).cloned().ok_or_else(|| {
                                LoadError::execution(
                                    path,
                                    format!("`{}` is not defined", ident.sym),
                                )
                            })?;
                            map.insert(ident.sym.to_string(), value);
                        }
                        Prop::KeyValue(kv) => {
                            let key = prop_name(&kv.key, path)?;
                            let value = eval_value(&kv.value, env, caps, path)?;
                            map.insert(key, value);
                        }
                        _ => {
                            return Err(LoadError::execution(
                                path,
                                "unsupported object property",
                            ));
                        }
                    },
                }
            }
            Ok(Value::Object(map))
        }
        Expr::Ident(ident) => env.get(ident.sym.as_ref()).cloned().ok_or_else(|| {
            LoadError::execution(path, format!("`{}` is not defined", ident.sym))
        }),
        Expr::Member(member) => {
            let object = eval_value(&member.obj, env, caps, path)?;
            let key = match &member.prop {
                MemberProp::Ident(ident) => ident.sym.to_string(),
                MemberProp::Computed(computed) => {
                    match eval_value(&computed.expr, env, caps, path)? {
                        Value::String(text) => text,
                        _ => {
                            return Err(LoadError::execution(
                                path,
                                "computed member access requires a string key",
                            ));
                        }
                    }
                }
                MemberProp::PrivateName(_) => {
                    return Err(LoadError::execution(path, "private members are not supported"));
                }
            };
            let Value::Object(entries) = object else {
                return Err(LoadError::execution(path, "member access on a non-mapping value"));
            };
            entries
                .get(&key)
                .cloned()
                .ok_or_else(|| LoadError::execution(path, format!("unknown property `{}`", key)))
        }
        Expr::Paren(paren) => eval_value(&paren.expr, env, caps, path),
        Expr::Await(awaited) => eval_value(&awaited.arg, env, caps, path),
        Expr::TsAs(wrapped) => eval_value(&wrapped.expr, env, caps, path),
        Expr::TsConstAssertion(wrapped) => eval_value(&wrapped.expr, env, caps, path),
        Expr::TsSatisfies(wrapped) => eval_value(&wrapped.expr, env, caps, path),
        Expr::TsNonNull(wrapped) => eval_value(&wrapped.expr, env, caps, path),
        Expr::TsTypeAssertion(wrapped) => eval_value(&wrapped.expr, env, caps, path),
        Expr::Unary(unary) => {
            let value = eval_value(&unary.arg, env, caps, path)?;
            let Value::Number(number) = value else {
                return Err(LoadError::execution(path, "unary operators apply to numbers only"));
            };
            let Some(float) = number.as_f64() else {
                return Err(LoadError::execution(path, "number is not representable"));
            };
            match unary.op {
                UnaryOp::Minus => number_value(-float, path).map(Value::Number),
                UnaryOp::Plus => Ok(Value::Number(number)),
                _ => Err(LoadError::execution(path, "unsupported unary operator")),
            }
        }
        Expr::Call(call) => {
            if let Some(inner) = promise_resolve_arg(expr) {
                // At non-export positions the promise is consumed
                // synchronously, so it collapses to its inner value.
                return eval_value(inner, env, caps, path);
            }
            if let Callee::Expr(callee) = &call.callee
                && let Expr::Ident(ident) = callee.as_ref()
                && ident.sym.as_ref() == "require"
            {
                let specifier = match call.args.as_slice() {
                    [ExprOrSpread { spread: None, expr }] => {
                        match eval_value(expr, env, caps, path)? {
                            Value::String(text) => text,
                            _ => {
                                return Err(LoadError::execution(
                                    path,
                                    "require() takes a string specifier",
                                ));
                            }
                        }
                    }
                    _ => {
                        return Err(LoadError::execution(
                            path,
                            "require() takes exactly one argument",
                        ));
                    }
                };
                let Some(resolver) = &caps.modules else {
                    return Err(LoadError::execution(
                        path,
                        "module resolution is not available in nested modules",
                    ));
                };
                return resolver.load(&specifier, path);
            }
            Err(LoadError::execution(path, "unsupported call expression"))
        }
        _ => Err(LoadError::execution(path, "unsupported expression")),
    }
}

fn eval_lit(lit: &Lit, path: &Path) -> Result<Value, LoadError> {
    match lit {
        Lit::Str(text) => text
            .value
            .as_str()
            .map(|text| Value::String(text.to_string()))
            .ok_or_else(|| LoadError::execution(path, "string literal is not valid UTF-8")),
        Lit::Num(number) => number_value(number.value, path).map(Value::Number),
        Lit::Bool(flag) => Ok(Value::Bool(flag.value)),
        Lit::Null(_) => Ok(Value::Null),
        _ => Err(LoadError::execution(path, "unsupported literal")),
    }
}

fn number_value(value: f64, path: &Path) -> Result<Number, LoadError> {
    if value.fract() == 0.0 && value >= i64::MIN as f64 && value <= i64::MAX as f64 {
        return Ok(Number::from(value as i64));
    }
    Number::from_f64(value)
        .ok_or_else(|| LoadError::execution(path, "number literal is not finite"))
}

fn prop_name(name: &PropName, path: &Path) -> Result<String, LoadError> {
    match name {
        PropName::Ident(ident) => Ok(ident.sym.to_string()),
        PropName::Str(text) => text
            .value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| LoadError::execution(path, "property key is not valid UTF-8")),
        PropName::Num(number) => number_value(number.value, path).map(|n| n.to_string()),
        _ => Err(LoadError::execution(path, "computed property keys are not supported")),
    }
}

/// Best-effort rendering of a console argument for the diagnostic log.
pub(super) fn preview<W: Workspace>(
    arg: &ExprOrSpread,
    env: &Env,
    caps: &SandboxCapabilities<'_, W>,
    path: &Path,
) -> String {
    if arg.spread.is_some() {
        return "…".to_string();
    }
    match eval_value(&arg.expr, env, caps, path) {
        Ok(Value::String(text)) => text,
        Ok(value) => value.to_string(),
        Err(_) => "…".to_string(),
    }
}
