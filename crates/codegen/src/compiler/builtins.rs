//! Built-in functions that need no import: `abs`, `len`, `print`, `emit`,
//! `exit` and `range`.

use super::context::{CompilationContext, Resolved};
use super::expr::ExprCompiler;
use super::{Lowered, Sequence};
use crate::adapter::{dotted_name, repeated_list, string_constant};
use crate::error::{CompileError, CompileResult};
use crate::modules::thymio;
use crate::names::is_valid_identifier;
use crate::priority::{ABS, Priority};
use crate::shape::Shape;
use aspy_parser::ast::{CallExpr, Expr};

/// Event carrying `print()` output: the format index, then the values.
pub const PRINT_EVENT: &str = "_print";
pub const EXIT_EVENT: &str = "_exit";

pub struct Builtins;

impl Builtins {
    /// Lower a call to a built-in, or return `None` when `name` is not one.
    pub fn lower<'a>(
        cx: &mut CompilationContext<'a>,
        name: &str,
        call: &CallExpr<'a>,
        tmp: usize,
        need_value: bool,
    ) -> CompileResult<Option<Lowered>> {
        let lowered = match name {
            "abs" => Self::abs(cx, call, tmp)?,
            "len" => Self::len(cx, call, tmp)?,
            "print" => Self::statement(cx, name, need_value, call, |cx| Self::print(cx, call, tmp))?,
            "emit" => Self::statement(cx, name, need_value, call, |cx| Self::emit(cx, call, tmp))?,
            "exit" => Self::statement(cx, name, need_value, call, |cx| Self::exit(cx, call, tmp))?,
            "range" => {
                return Err(CompileError::unsupported(
                    "range() outside a for loop",
                    cx.location(call.span),
                ));
            }
            _ => return Ok(None),
        };
        Ok(Some(lowered))
    }

    fn statement<'a, F>(
        cx: &mut CompilationContext<'a>,
        name: &str,
        need_value: bool,
        call: &CallExpr<'a>,
        lower: F,
    ) -> CompileResult<Lowered>
    where
        F: FnOnce(&mut CompilationContext<'a>) -> CompileResult<Lowered>,
    {
        if need_value {
            return Err(CompileError::unsupported(
                format!("{}() used as a value", name),
                cx.location(call.span),
            ));
        }
        lower(cx)
    }

    fn single_argument<'e, 'a>(
        cx: &CompilationContext<'a>,
        name: &str,
        call: &'e CallExpr<'a>,
    ) -> CompileResult<&'e Expr<'a>> {
        match (call.args, call.keywords) {
            ([arg], []) => Ok(arg),
            _ => Err(CompileError::unsupported(
                format!("{}() takes exactly one positional argument", name),
                cx.location(call.span),
            )),
        }
    }

    fn abs<'a>(cx: &mut CompilationContext<'a>, call: &CallExpr<'a>, tmp: usize) -> CompileResult<Lowered> {
        let arg = Self::single_argument(cx, "abs", call)?;
        let operand = ExprCompiler::lower(cx, arg, ABS.priority, tmp)?;
        Ok(Lowered {
            code: format!("{} {}", ABS.target, operand.code),
            priority: ABS.priority,
            ..operand
        })
    }

    /// Size known at compile time.
    fn len<'a>(cx: &mut CompilationContext<'a>, call: &CallExpr<'a>, tmp: usize) -> CompileResult<Lowered> {
        let arg = Self::single_argument(cx, "len", call)?;
        let cells = if let Some((elts, count)) = repeated_list(arg) {
            elts.len() * count.max(0) as usize
        } else {
            match arg {
                Expr::List(list) => list.elts.len(),
                Expr::Name(_) | Expr::Attribute(_) => {
                    let name = dotted_name(arg).ok_or_else(|| cx.locator.unsupported_expr(arg))?;
                    match cx.resolve_load(&name, arg.span())? {
                        Resolved::Variable { shape, .. } | Resolved::Constant { shape, .. } => shape.cells(),
                    }
                }
                _ => {
                    return Err(CompileError::unsupported(
                        "len() of an expression other than a name or a list",
                        cx.location(arg.span()),
                    ));
                }
            }
        };
        Ok(Lowered::literal(cells as i64, tmp))
    }

    fn print<'a>(cx: &mut CompilationContext<'a>, call: &CallExpr<'a>, tmp: usize) -> CompileResult<Lowered> {
        if !call.keywords.is_empty() {
            return Err(CompileError::unsupported(
                "keyword arguments to print()",
                cx.location(call.span),
            ));
        }
        let mut pieces = Vec::with_capacity(call.args.len());
        let mut seq = Sequence::new(tmp);
        for arg in call.args {
            match string_constant(arg) {
                Some(text) => pieces.push(text.replace('%', "%%")),
                None => {
                    seq.push(cx, |cx, at| ExprCompiler::lower(cx, arg, Priority::Comma, at))?;
                    pieces.push("%d".to_string());
                }
            }
        }
        let arity = seq.items.len();
        let index = cx.print_format(pieces.join(" "), arity);
        let width = cx.print_width.max(arity);
        cx.emit_event(PRINT_EVENT, width + 1, call.span)?;

        let mut values = Vec::with_capacity(width + 1);
        values.push(index.to_string());
        values.extend(seq.items.iter().map(|item| item.code.clone()));
        values.resize(width + 1, "0".to_string());
        let mut aux = seq.aux;
        aux.line(format!("emit {} [{}]", PRINT_EVENT, values.join(", ")));
        Ok(Lowered {
            aux,
            effects: seq.effects,
            ..Lowered::atom("", seq.next)
        })
    }

    fn emit<'a>(cx: &mut CompilationContext<'a>, call: &CallExpr<'a>, tmp: usize) -> CompileResult<Lowered> {
        let location = cx.location(call.span);
        if !call.keywords.is_empty() {
            return Err(CompileError::unsupported("keyword arguments to emit()", location));
        }
        let Some((first, args)) = call.args.split_first() else {
            return Err(CompileError::unsupported("emit() without an event name", location));
        };
        let Some(name) = string_constant(first) else {
            return Err(CompileError::unsupported(
                "emit() with an event name that is not a string literal",
                location,
            ));
        };
        if thymio::is_robot_event(name) || thymio::is_robot_event_family(name) {
            return Err(CompileError::bad_event(name, "robot events cannot be emitted", location));
        }
        if !is_valid_identifier(name) || name.starts_with('_') {
            return Err(CompileError::bad_event(name, "not a valid event name", location));
        }

        let mut seq = Sequence::new(tmp);
        let (line, size) = match args {
            [] => (format!("emit {}", name), 0),
            [arg] if Self::is_array_name(cx, arg) => {
                let array = ExprCompiler::addressable(cx, arg, tmp)?;
                let cells = array.shape.cells();
                (format!("emit {} {}", name, array.code), cells)
            }
            _ => {
                for arg in args {
                    seq.push(cx, |cx, at| ExprCompiler::lower(cx, arg, Priority::Comma, at))?;
                }
                let codes: Vec<String> = seq.items.iter().map(|item| item.code.clone()).collect();
                (format!("emit {} [{}]", name, codes.join(", ")), codes.len())
            }
        };
        cx.emit_event(name, size, call.span)?;
        let mut aux = seq.aux;
        aux.line(line);
        Ok(Lowered {
            aux,
            effects: seq.effects,
            ..Lowered::atom("", seq.next)
        })
    }

    fn is_array_name<'a>(cx: &mut CompilationContext<'a>, arg: &Expr<'a>) -> bool {
        if !matches!(arg, Expr::Name(_) | Expr::Attribute(_)) {
            return false;
        }
        let Some(name) = dotted_name(arg) else {
            return false;
        };
        matches!(
            cx.resolve_load(&name, arg.span()),
            Ok(Resolved::Variable { shape: Shape::Array(_), .. })
        )
    }

    fn exit<'a>(cx: &mut CompilationContext<'a>, call: &CallExpr<'a>, tmp: usize) -> CompileResult<Lowered> {
        let location = cx.location(call.span);
        let code_arg = match (call.args, call.keywords) {
            ([], []) => None,
            ([arg], []) => Some(arg),
            ([], [keyword]) if keyword.arg == Some("code") => Some(&keyword.value),
            _ => {
                return Err(CompileError::unsupported(
                    "exit() takes at most one argument",
                    location,
                ));
            }
        };
        let code = match code_arg {
            Some(arg) => ExprCompiler::lower(cx, arg, Priority::Comma, tmp)?,
            None => Lowered::literal(0, tmp),
        };
        cx.emit_event(EXIT_EVENT, 1, call.span)?;
        cx.metadata.has_exit_event = true;
        let mut aux = code.aux;
        aux.line(format!("emit {} [{}]", EXIT_EVENT, code.code));
        Ok(Lowered {
            aux,
            effects: code.effects,
            ..Lowered::atom("", code.tmp_req)
        })
    }
}
