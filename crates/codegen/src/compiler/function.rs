//! User functions: the pre-pass that records what a body reads, writes and
//! calls, the recursion check over the call graph, and call-site inlining.
//!
//! Aseba subroutines take no arguments and return nothing, so every call is
//! expanded in place. Parameters and locals become globals named
//! `_<function>__<name>`; a scalar result travels through a scratch slot
//! reserved by the caller, an array result through `_<function>__return`.

use super::context::{CompilationContext, ReturnTarget, Scope};
use super::expr::ExprCompiler;
use super::stmt::StmtCompiler;
use super::{Lowered, Sequence};
use crate::adapter::Locator;
use crate::error::{CompileError, CompileResult};
use crate::names::{local_name, return_name};
use aspy_parser::Visitor;
use aspy_parser::ast::*;
use aspy_parser::visitor::walk;
use indexmap::{IndexMap, IndexSet};
use text_size::TextRange;

#[derive(Debug, Clone)]
pub struct Param<'a> {
    pub name: &'a str,
    pub default: Option<&'a Expr<'a>>,
    pub span: TextRange,
}

/// What the pre-pass learned about one function or event handler.
#[derive(Debug, Clone)]
pub struct FunctionInfo<'a> {
    pub name: &'a str,
    pub def: &'a FuncDefStmt<'a>,
    pub params: Vec<Param<'a>>,
    /// Parameters and assigned names not declared global.
    pub locals: IndexSet<&'a str>,
    pub declared_globals: IndexSet<&'a str>,
    /// Names assigned in the body, with their first assignment.
    pub assigned: IndexMap<&'a str, TextRange>,
    /// Simple names called from the body, with their first call.
    pub calls: IndexMap<&'a str, TextRange>,
    pub returns_value: bool,
    /// Some `return` is followed by code that must then be skipped.
    pub needs_ret_flag: bool,
    pub span: TextRange,
}

impl<'a> FunctionInfo<'a> {
    /// Scan `def`, rejecting constructs no function body may contain.
    pub fn scan(def: &'a FuncDefStmt<'a>, locator: &Locator) -> CompileResult<Self> {
        let location = locator.location(def.span);
        if def.is_async {
            return Err(CompileError::unsupported("async function", location));
        }
        if def.args.vararg.is_some() || def.args.kwarg.is_some() || !def.args.kwonlyargs.is_empty() {
            return Err(CompileError::unsupported(
                format!("variadic or keyword-only parameters of {}()", def.name),
                location,
            ));
        }
        let params: Vec<Param<'a>> = def
            .args
            .positional()
            .map(|(arg, default)| Param {
                name: arg.arg,
                default,
                span: arg.span,
            })
            .collect();

        let mut scan = FunctionScan::default();
        for stmt in def.body {
            scan.visit_stmt(stmt);
        }
        if let Some((kind, span)) = scan.error {
            return Err(CompileError::unsupported(kind, locator.location(span)));
        }
        if let (Some(value), Some(_)) = (scan.value_return, scan.bare_return) {
            return Err(CompileError::unsupported(
                format!("{}() returns a value on some paths only", def.name),
                locator.location(value),
            ));
        }
        for param in &params {
            if scan.declared_globals.contains(param.name) {
                return Err(CompileError::unsupported(
                    format!("parameter '{}' declared global", param.name),
                    locator.location(param.span),
                ));
            }
        }

        let mut locals: IndexSet<&'a str> = params.iter().map(|p| p.name).collect();
        locals.extend(
            scan.assigned
                .keys()
                .copied()
                .filter(|name| !scan.declared_globals.contains(name)),
        );

        Ok(FunctionInfo {
            name: def.name,
            def,
            params,
            locals,
            declared_globals: scan.declared_globals,
            assigned: scan.assigned,
            calls: scan.calls,
            returns_value: scan.value_return.is_some(),
            needs_ret_flag: needs_ret_flag(def.body),
            span: def.span,
        })
    }

    pub fn is_param(&self, name: &str) -> bool {
        self.params.iter().any(|p| p.name == name)
    }
}

/// Collects names, calls and returns of one body.
#[derive(Default)]
struct FunctionScan<'a> {
    assigned: IndexMap<&'a str, TextRange>,
    declared_globals: IndexSet<&'a str>,
    calls: IndexMap<&'a str, TextRange>,
    value_return: Option<TextRange>,
    bare_return: Option<TextRange>,
    error: Option<(String, TextRange)>,
}

impl<'a> FunctionScan<'a> {
    fn fail(&mut self, kind: impl Into<String>, span: TextRange) {
        if self.error.is_none() {
            self.error = Some((kind.into(), span));
        }
    }

    fn target(&mut self, target: &Expr<'a>) {
        match target {
            Expr::Name(name) => {
                self.assigned.entry(name.id).or_insert(name.span);
            }
            Expr::Tuple(TupleExpr { elts, .. }) | Expr::List(ListExpr { elts, .. }) => {
                for elt in elts.iter() {
                    self.target(elt);
                }
            }
            _ => {}
        }
    }
}

impl<'a> Visitor<'a> for FunctionScan<'a> {
    fn visit_stmt(&mut self, stmt: &Stmt<'a>) {
        match stmt {
            Stmt::Assign(assign) => {
                for target in assign.targets {
                    self.target(target);
                }
            }
            Stmt::AugAssign(aug) => self.target(&aug.target),
            Stmt::AnnAssign(ann) => self.target(&ann.target),
            Stmt::For(for_stmt) => self.target(&for_stmt.target),
            Stmt::Global(global) => self.declared_globals.extend(global.names.iter().copied()),
            Stmt::Return(ret) => {
                let slot = if ret.value.is_some() {
                    &mut self.value_return
                } else {
                    &mut self.bare_return
                };
                slot.get_or_insert(ret.span);
            }
            Stmt::FuncDef(def) => return self.fail("nested function", def.span),
            Stmt::ClassDef(class) => return self.fail("ClassDef", class.span),
            Stmt::Import(import) => return self.fail("import inside a function", import.span),
            Stmt::From(from) => return self.fail("import inside a function", from.span),
            Stmt::Nonlocal(nonlocal) => return self.fail("Nonlocal", nonlocal.span),
            _ => {}
        }
        walk::walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Expr<'a>) {
        if let Expr::Call(call) = expr
            && let Expr::Name(name) = call.func
        {
            self.calls.entry(name.id).or_insert(call.span);
        }
        walk::walk_expr(self, expr);
    }
}

pub(crate) fn contains_return(stmt: &Stmt<'_>) -> bool {
    match stmt {
        Stmt::Return(_) => true,
        Stmt::If(s) => s.body.iter().chain(s.orelse).any(contains_return),
        Stmt::While(s) => s.body.iter().chain(s.orelse).any(contains_return),
        Stmt::For(s) => s.body.iter().chain(s.orelse).any(contains_return),
        _ => false,
    }
}

/// A `return` needs a flag unless it ends the body, possibly through the
/// branches of a final `if`.
pub fn needs_ret_flag(body: &[Stmt<'_>]) -> bool {
    let Some((last, init)) = body.split_last() else {
        return false;
    };
    if init.iter().any(contains_return) {
        return true;
    }
    match last {
        Stmt::Return(_) => false,
        Stmt::If(s) => needs_ret_flag(s.body) || needs_ret_flag(s.orelse),
        other => contains_return(other),
    }
}

/// Reject cycles in the call graph, reporting the first one found as the
/// chain of names that closes it.
pub fn check_recursion(functions: &IndexMap<&str, FunctionInfo<'_>>, locator: &Locator) -> CompileResult<()> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mark {
        Unvisited,
        Active,
        Done,
    }

    fn visit(
        index: usize,
        functions: &IndexMap<&str, FunctionInfo<'_>>,
        marks: &mut [Mark],
        path: &mut Vec<usize>,
    ) -> Option<(Vec<usize>, TextRange)> {
        marks[index] = Mark::Active;
        path.push(index);
        let (_, info) = functions.get_index(index)?;
        for (callee, span) in &info.calls {
            let Some(next) = functions.get_index_of(callee) else {
                continue;
            };
            match marks[next] {
                Mark::Active => {
                    let start = path.iter().position(|&i| i == next).unwrap_or(0);
                    let mut cycle = path[start..].to_vec();
                    cycle.push(next);
                    return Some((cycle, *span));
                }
                Mark::Unvisited => {
                    if let Some(found) = visit(next, functions, marks, path) {
                        return Some(found);
                    }
                }
                Mark::Done => {}
            }
        }
        path.pop();
        marks[index] = Mark::Done;
        None
    }

    let mut marks = vec![Mark::Unvisited; functions.len()];
    for index in 0..functions.len() {
        if marks[index] != Mark::Unvisited {
            continue;
        }
        let mut path = Vec::new();
        if let Some((cycle, span)) = visit(index, functions, &mut marks, &mut path) {
            let names = cycle
                .into_iter()
                .filter_map(|i| functions.get_index(i).map(|(name, _)| name.to_string()))
                .collect();
            return Err(CompileError::Recursion {
                path: names,
                location: locator.location(span),
            });
        }
    }
    Ok(())
}

pub struct FunctionCompiler;

impl FunctionCompiler {
    /// Expand a call of a user function at the call site.
    pub fn inline_call<'a>(
        cx: &mut CompilationContext<'a>,
        info: &FunctionInfo<'a>,
        call: &CallExpr<'a>,
        tmp: usize,
        need_value: bool,
    ) -> CompileResult<Lowered> {
        let location = cx.location(call.span);
        if cx.inlining.contains(&info.name) {
            let mut path: Vec<String> = cx.inlining.iter().map(|name| name.to_string()).collect();
            path.push(info.name.to_string());
            return Err(CompileError::Recursion { path, location });
        }
        if need_value && !info.returns_value {
            return Err(CompileError::unsupported(
                format!("{}() used as a value but returns nothing", info.name),
                location,
            ));
        }

        let bound = Self::bind(cx, info, call)?;
        let mut seq = Sequence::new(tmp);
        for arg in &bound {
            seq.push(cx, |cx, at| ExprCompiler::lower_value(cx, arg, at))?;
        }
        let Sequence { items, aux, next, .. } = seq;
        let mut code = aux;
        for (param, value) in info.params.iter().zip(items) {
            let target = local_name(info.name, param.name);
            cx.declare(&target, value.shape, param.name, param.span)?;
            code.line(format!("{} = {}", target, value.code));
        }

        let slot = info.returns_value.then_some(next);
        let mut base = slot.map_or(next, |slot| slot + 1);
        let flag = info.needs_ret_flag.then(|| {
            base += 1;
            base - 1
        });
        if let Some(flag) = flag {
            code.line(format!("_tmp[{}] = 0", flag));
        }
        let ret = ReturnTarget {
            slot,
            flag,
            shape: None,
        };

        cx.scopes.push(Scope::function(info, base, ret));
        cx.inlining.push(info.name);
        cx.inlined.insert(info.name);
        let body = StmtCompiler::block(cx, info.def.body);
        cx.inlining.pop();
        let scope = cx.scopes.pop();
        let (body, _) = body?;
        code.append(body.as_str());

        let shape = scope.and_then(|scope| scope.ret.shape);
        let tmp_req = slot.map_or(next, |slot| slot + 1);
        let lowered = match (slot, shape) {
            (Some(_), Some(shape)) if shape.is_array() => Lowered {
                shape,
                ..Lowered::atom(return_name(info.name), tmp_req)
            },
            (Some(slot), _) => Lowered::scratch(slot, tmp_req),
            (None, _) => Lowered::atom("", tmp_req),
        };
        Ok(Lowered {
            aux: code,
            effects: true,
            ..lowered
        })
    }

    /// Match call arguments to parameters. Missing arguments take their
    /// default, lowered in the caller's scope.
    fn bind<'a>(
        cx: &CompilationContext<'a>,
        info: &FunctionInfo<'a>,
        call: &CallExpr<'a>,
    ) -> CompileResult<Vec<&'a Expr<'a>>> {
        let location = cx.location(call.span);
        if call.args.len() > info.params.len() {
            return Err(CompileError::unsupported(
                format!(
                    "{}() takes {} arguments, {} given",
                    info.name,
                    info.params.len(),
                    call.args.len()
                ),
                location,
            ));
        }
        let mut bound: Vec<Option<&'a Expr<'a>>> = vec![None; info.params.len()];
        for (slot, arg) in bound.iter_mut().zip(call.args) {
            if matches!(arg, Expr::Starred(_)) {
                return Err(CompileError::unsupported("starred argument", location));
            }
            *slot = Some(arg);
        }
        for keyword in call.keywords {
            let Some(name) = keyword.arg else {
                return Err(CompileError::unsupported("'**' argument", location));
            };
            let Some(index) = info.params.iter().position(|p| p.name == name) else {
                return Err(CompileError::unsupported(
                    format!("{}() has no parameter '{}'", info.name, name),
                    location,
                ));
            };
            if bound[index].is_some() {
                return Err(CompileError::unsupported(
                    format!("{}() got several values for '{}'", info.name, name),
                    location,
                ));
            }
            bound[index] = Some(&keyword.value);
        }
        bound
            .into_iter()
            .zip(&info.params)
            .map(|(arg, param)| {
                arg.or(param.default).ok_or_else(|| {
                    CompileError::unsupported(
                        format!("{}() missing argument '{}'", info.name, param.name),
                        location,
                    )
                })
            })
            .collect()
    }
}
