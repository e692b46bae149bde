//! Expression lowering

use super::builtins::Builtins;
use super::context::{CompilationContext, Resolved};
use super::function::FunctionCompiler;
use super::{Lowered, Sequence};
use crate::adapter::{dotted_name, int_constant, parse_int, repeated_list};
use crate::block::CodeBlock;
use crate::error::{CompileError, CompileResult};
use crate::modules::{ArgKind, EmitScope, Emitter};
use crate::priority::{self, Priority, parenthesize};
use crate::shape::Shape;
use aspy_parser::ast::*;
use text_size::TextRange;

/// Largest magnitude a 16-bit signed word holds.
const WORD_MIN: i64 = i16::MIN as i64;
const WORD_MAX: i64 = i16::MAX as i64;

pub struct ExprCompiler;

impl ExprCompiler {
    /// Lower a scalar expression for a slot of priority `container`, using
    /// scratch slots from `tmp` upward.
    ///
    /// Boolean results are materialized as 0/1 unless the container is a
    /// logical operator or a condition; arithmetic results in such
    /// containers are compared against zero.
    pub fn lower<'a>(
        cx: &mut CompilationContext<'a>,
        expr: &Expr<'a>,
        container: Priority,
        tmp: usize,
    ) -> CompileResult<Lowered> {
        let raw = Self::lower_raw(cx, expr, tmp)?;
        if let Shape::Array(cells) = raw.shape {
            return Err(CompileError::size(
                describe(expr),
                1,
                cells,
                cx.location(expr.span()),
            ));
        }
        Ok(Self::fit(raw, container, tmp, &cx.indent))
    }

    /// Lower the test of an `if` or `while`.
    pub fn condition<'a>(cx: &mut CompilationContext<'a>, expr: &Expr<'a>, tmp: usize) -> CompileResult<Lowered> {
        Self::lower(cx, expr, Priority::LogicalOr, tmp)
    }

    /// Lower a value that may be an array: right-hand sides, call arguments
    /// and returned values.
    pub fn lower_value<'a>(cx: &mut CompilationContext<'a>, expr: &Expr<'a>, tmp: usize) -> CompileResult<Lowered> {
        if let Some((elts, count)) = repeated_list(expr) {
            return Self::lower_repeated(cx, expr, elts, count, tmp);
        }
        if let Expr::List(list) = expr {
            return Self::lower_list(cx, list, tmp);
        }
        let raw = Self::lower_raw(cx, expr, tmp)?;
        if raw.shape.is_array() {
            Ok(raw)
        } else {
            Ok(Self::fit(raw, Priority::Assign, tmp, &cx.indent))
        }
    }

    /// Adapt a lowered expression to its container.
    pub fn fit(raw: Lowered, container: Priority, tmp: usize, indent: &str) -> Lowered {
        let mut lowered = if container.accepts_bool() && !raw.is_bool {
            Lowered {
                code: format!(
                    "{} != 0",
                    parenthesize(raw.code, raw.priority, Priority::NumericBoundary)
                ),
                priority: Priority::Comparison,
                is_bool: true,
                ..raw
            }
        } else if !container.accepts_bool() && raw.is_bool {
            Self::materialize(raw, tmp, indent)
        } else {
            raw
        };
        if lowered.priority < container {
            lowered.code = format!("({})", lowered.code);
            lowered.priority = Priority::Atom;
        }
        lowered.tmp_req = lowered.tmp_req.max(tmp);
        lowered
    }

    /// Store a truth value as 0 or 1 in `_tmp[tmp]`.
    fn materialize(raw: Lowered, tmp: usize, indent: &str) -> Lowered {
        let mut aux = raw.aux;
        flag_if(&mut aux, &raw.code, tmp, indent);
        Lowered {
            code: format!("_tmp[{}]", tmp),
            aux,
            tmp_req: raw.tmp_req.max(tmp + 1),
            is_bool: false,
            priority: Priority::Atom,
            shape: Shape::Scalar,
            effects: raw.effects,
        }
    }

    /// Lower without adapting to a container. Array-valued names come back
    /// with an array shape.
    pub fn lower_raw<'a>(cx: &mut CompilationContext<'a>, expr: &Expr<'a>, tmp: usize) -> CompileResult<Lowered> {
        let mut lowered = match expr {
            Expr::Constant(constant) => Self::lower_constant(cx, constant),
            Expr::Name(name) => Self::lower_name(cx, name.id, name.span, tmp),
            Expr::Attribute(attr) => match dotted_name(expr) {
                Some(dotted) => Self::lower_name(cx, &dotted, attr.span, tmp),
                None => Err(unsupported(cx, expr)),
            },
            Expr::Subscript(subscript) => Self::lower_subscript(cx, subscript, tmp),
            Expr::BinOp(binop) => Self::lower_binop(cx, binop, tmp),
            Expr::UnaryOp(unary) => Self::lower_unary(cx, unary, tmp),
            Expr::BoolOp(boolop) => Self::lower_boolop(cx, boolop, tmp),
            Expr::Compare(compare) => Self::lower_compare(cx, compare, tmp),
            Expr::Call(call) => Self::lower_call(cx, call, tmp, true),
            Expr::List(list) => Err(CompileError::unsupported(
                "list outside an assignment or call argument",
                cx.location(list.span),
            )),
            _ => Err(unsupported(cx, expr)),
        }?;
        lowered.tmp_req = lowered.tmp_req.max(tmp);
        Ok(lowered)
    }

    fn lower_constant(cx: &CompilationContext<'_>, constant: &ConstantExpr<'_>) -> CompileResult<Lowered> {
        let location = cx.location(constant.span);
        match constant.kind {
            ConstantKind::Int => {
                let value = parse_int(constant.value)
                    .ok_or_else(|| CompileError::unsupported("integer literal", location))?;
                check_word(value, constant.value, location)?;
                Ok(Lowered::literal(value, 0))
            }
            ConstantKind::True => Ok(Lowered::literal(1, 0)),
            ConstantKind::False => Ok(Lowered::literal(0, 0)),
            ConstantKind::Float => Err(CompileError::unsupported("floating-point literal", location)),
            ConstantKind::Str => Err(CompileError::unsupported(
                "string outside print() or emit()",
                location,
            )),
            ConstantKind::None => Err(CompileError::unsupported("None", location)),
            ConstantKind::Ellipsis => Err(CompileError::unsupported("Ellipsis", location)),
        }
    }

    fn lower_name<'a>(
        cx: &mut CompilationContext<'a>,
        name: &str,
        span: TextRange,
        tmp: usize,
    ) -> CompileResult<Lowered> {
        if !name.contains('.') && cx.functions.contains_key(name) && !cx.scope().locals.contains(name) {
            return Err(CompileError::unsupported(
                format!("function '{}' used as a value", name),
                cx.location(span),
            ));
        }
        let lowered = match cx.resolve_load(name, span)? {
            Resolved::Variable { target, shape } => {
                let mut lowered = Lowered::atom(target, tmp);
                lowered.shape = shape;
                lowered
            }
            Resolved::Constant { code, shape } => {
                let mut lowered = Lowered::atom(code, tmp);
                if lowered.code.starts_with('-') {
                    lowered.priority = Priority::UnaryMinus;
                }
                lowered.shape = shape;
                lowered
            }
        };
        Ok(lowered)
    }

    /// Element read `a[i]`.
    pub fn lower_subscript<'a>(
        cx: &mut CompilationContext<'a>,
        subscript: &SubscriptExpr<'a>,
        tmp: usize,
    ) -> CompileResult<Lowered> {
        let (array, index) = Self::subscript_parts(cx, subscript, tmp)?;
        Ok(Lowered {
            code: format!("{}[{}]", array, index.code),
            priority: Priority::Atom,
            ..index
        })
    }

    /// Array variable and lowered index of `a[i]`. Constant indices are
    /// checked against the array size; negative ones count from the end.
    pub fn subscript_parts<'a>(
        cx: &mut CompilationContext<'a>,
        subscript: &SubscriptExpr<'a>,
        tmp: usize,
    ) -> CompileResult<(String, Lowered)> {
        let location = cx.location(subscript.span);
        if matches!(subscript.slice, Expr::Slice(_) | Expr::Tuple(_)) {
            return Err(CompileError::unsupported("slice", location));
        }
        let array = Self::variable(cx, subscript.value, tmp)?;
        let Shape::Array(cells) = array.shape else {
            return Err(CompileError::unsupported(
                format!("subscript of scalar '{}'", describe(subscript.value)),
                location,
            ));
        };
        let index = match int_constant(subscript.slice) {
            Some(index) => {
                let cells = cells as i64;
                let index = if index < 0 { index + cells } else { index };
                if index < 0 || index >= cells {
                    return Err(CompileError::size(
                        describe(subscript.value),
                        cells as usize,
                        (index + 1).max(0) as usize,
                        location,
                    ));
                }
                Lowered::literal(index, tmp)
            }
            None => Self::lower(cx, subscript.slice, Priority::Comma, tmp)?,
        };
        Ok((array.code, index))
    }

    /// A variable that natives may read or write in place: a whole variable
    /// or one array element.
    pub fn addressable<'a>(cx: &mut CompilationContext<'a>, expr: &Expr<'a>, tmp: usize) -> CompileResult<Lowered> {
        match expr {
            Expr::Subscript(subscript) => Self::lower_subscript(cx, subscript, tmp),
            _ => Self::variable(cx, expr, tmp),
        }
    }

    fn variable<'a>(cx: &mut CompilationContext<'a>, expr: &Expr<'a>, tmp: usize) -> CompileResult<Lowered> {
        let location = cx.location(expr.span());
        let name = match expr {
            Expr::Name(_) | Expr::Attribute(_) => dotted_name(expr),
            _ => None,
        };
        let Some(name) = name else {
            return Err(CompileError::unsupported(
                format!("{} where a variable is required", expr.kind_name()),
                location,
            ));
        };
        match cx.resolve_load(&name, expr.span())? {
            Resolved::Variable { target, shape } => {
                let mut lowered = Lowered::atom(target, tmp);
                lowered.shape = shape;
                Ok(lowered)
            }
            Resolved::Constant { .. } => Err(CompileError::unsupported(
                format!("constant '{}' where a variable is required", name),
                location,
            )),
        }
    }

    fn lower_binop<'a>(cx: &mut CompilationContext<'a>, binop: &BinOpExpr<'a>, tmp: usize) -> CompileResult<Lowered> {
        let location = cx.location(binop.span);
        if binop.op == "**" {
            return Self::lower_power(cx, binop.left, binop.right, binop.span, tmp);
        }
        let container = match priority::binary(binop.op) {
            Some(operator) => operator.priority,
            None => return Err(binary_unsupported(binop.op, location)),
        };
        let mut seq = Sequence::new(tmp);
        seq.push(cx, |cx, at| Self::lower(cx, binop.left, container, at))?;
        Self::finish_binary(cx, seq, binop.op, binop.right, binop.span)
    }

    /// Combine the single operand already in `seq` with `right` through
    /// `op`. Augmented assignments enter here with the target read as the
    /// left operand.
    pub fn finish_binary<'a>(
        cx: &mut CompilationContext<'a>,
        mut seq: Sequence,
        op: &str,
        right: &Expr<'a>,
        span: TextRange,
    ) -> CompileResult<Lowered> {
        let location = cx.location(span);
        let operator = match op {
            "**" => {
                let left = seq
                    .items
                    .pop()
                    .ok_or_else(|| CompileError::internal("missing left operand", location))?;
                return Self::power_of(cx, left, seq.aux, right, span);
            }
            _ => priority::binary(op).ok_or_else(|| binary_unsupported(op, location))?,
        };
        seq.push(cx, |cx, at| {
            Self::lower(cx, right, operator.priority.right_operand(), at)
        })?;
        let Sequence { items, aux, next, effects } = seq;
        let [left, right] = <[Lowered; 2]>::try_from(items)
            .map_err(|_| CompileError::internal("binary operator without two operands", location))?;
        let left_code = parenthesize(left.code, left.priority, operator.priority);
        let right_code = parenthesize(right.code, right.priority, operator.priority.right_operand());
        Ok(Lowered {
            code: format!("{} {} {}", left_code, operator.target, right_code),
            aux,
            tmp_req: next,
            is_bool: false,
            priority: operator.priority,
            shape: Shape::Scalar,
            effects,
        })
    }

    fn lower_power<'a>(
        cx: &mut CompilationContext<'a>,
        base: &Expr<'a>,
        exponent: &Expr<'a>,
        span: TextRange,
        tmp: usize,
    ) -> CompileResult<Lowered> {
        let location = cx.location(span);
        if let (Some(b), Some(e)) = (int_constant(base), int_constant(exponent))
            && e >= 0
        {
            let value = u32::try_from(e)
                .ok()
                .and_then(|e| b.checked_pow(e))
                .filter(|v| (WORD_MIN..=WORD_MAX).contains(v))
                .ok_or_else(|| CompileError::unsupported("power outside the 16-bit range", location))?;
            return Ok(Lowered::literal(value, tmp));
        }
        let left = Self::lower(cx, base, Priority::Multiplicative, tmp)?;
        Self::power_of(cx, left, CodeBlock::new(), exponent, span)
    }

    /// Expand `left ** exponent` into repeated products.
    fn power_of<'a>(
        cx: &mut CompilationContext<'a>,
        left: Lowered,
        prefix: CodeBlock,
        exponent: &Expr<'a>,
        span: TextRange,
    ) -> CompileResult<Lowered> {
        let location = cx.location(span);
        let exponent = int_constant(exponent)
            .filter(|e| *e >= 0)
            .ok_or_else(|| {
                CompileError::unsupported("'**' with an exponent that is not a non-negative constant", location)
            })?;
        let mut aux = prefix;
        aux.append(left.aux.as_str());
        let tmp_req = left.tmp_req;
        if exponent == 0 {
            let mut one = Lowered::literal(1, tmp_req);
            one.aux = aux;
            one.effects = left.effects;
            return Ok(one);
        }
        let (factor, tmp_req) = if left.priority == Priority::Atom || exponent == 1 {
            (left.code, tmp_req)
        } else {
            aux.line(format!("_tmp[{}] = {}", tmp_req, left.code));
            (format!("_tmp[{}]", tmp_req), tmp_req + 1)
        };
        if exponent == 1 {
            return Ok(Lowered {
                code: factor,
                aux,
                tmp_req,
                is_bool: false,
                priority: left.priority,
                shape: Shape::Scalar,
                effects: left.effects,
            });
        }
        Ok(Lowered {
            code: vec![factor; exponent as usize].join(" * "),
            aux,
            tmp_req,
            is_bool: false,
            priority: Priority::Multiplicative,
            shape: Shape::Scalar,
            effects: left.effects,
        })
    }

    fn lower_unary<'a>(cx: &mut CompilationContext<'a>, unary: &UnaryOpExpr<'a>, tmp: usize) -> CompileResult<Lowered> {
        let location = cx.location(unary.span);
        match unary.op {
            "+" => Self::lower_raw(cx, unary.operand, tmp),
            "-" => {
                if let Some(value) = int_constant(unary.operand) {
                    let value = -value;
                    check_word(value, &value.to_string(), location)?;
                    return Ok(Lowered::literal(value, tmp));
                }
                let operand = Self::lower(cx, unary.operand, Priority::UnaryMinus, tmp)?;
                let code = if operand.code.starts_with('-') {
                    format!("-({})", operand.code)
                } else {
                    format!("-{}", operand.code)
                };
                Ok(Lowered {
                    code,
                    priority: Priority::UnaryMinus,
                    ..operand
                })
            }
            "~" => {
                let operand = Self::lower(cx, unary.operand, Priority::BitwiseNot, tmp)?;
                Ok(Lowered {
                    code: format!("~{}", operand.code),
                    priority: Priority::BitwiseNot,
                    ..operand
                })
            }
            "not" => {
                let operand = Self::lower_raw(cx, unary.operand, tmp)?;
                if let Shape::Array(cells) = operand.shape {
                    return Err(CompileError::size(describe(unary.operand), 1, cells, location));
                }
                if operand.is_bool {
                    Ok(Lowered {
                        code: format!(
                            "not {}",
                            parenthesize(operand.code, operand.priority, Priority::LogicalNot)
                        ),
                        priority: Priority::LogicalNot,
                        ..operand
                    })
                } else {
                    Ok(Lowered {
                        code: format!(
                            "{} == 0",
                            parenthesize(operand.code, operand.priority, Priority::NumericBoundary)
                        ),
                        priority: Priority::Comparison,
                        is_bool: true,
                        ..operand
                    })
                }
            }
            other => Err(CompileError::unsupported(format!("unary operator '{}'", other), location)),
        }
    }

    fn lower_boolop<'a>(cx: &mut CompilationContext<'a>, boolop: &BoolOpExpr<'a>, tmp: usize) -> CompileResult<Lowered> {
        let location = cx.location(boolop.span);
        let operator = priority::boolean(boolop.op)
            .ok_or_else(|| CompileError::unsupported(format!("operator '{}'", boolop.op), location))?;
        let is_and = operator.target == "and";
        let (first, rest) = boolop
            .values
            .split_first()
            .ok_or_else(|| CompileError::internal("empty Boolean operation", location))?;
        let mut acc = Self::lower(cx, first, operator.priority, tmp)?;
        for value in rest {
            let right = Self::lower(cx, value, operator.priority.next(), acc.tmp_req)?;
            if right.aux.is_empty() {
                let mut aux = acc.aux;
                aux.append(right.aux.as_str());
                acc = Lowered {
                    code: format!("{} {} {}", acc.code, operator.target, right.code),
                    aux,
                    tmp_req: right.tmp_req,
                    is_bool: true,
                    priority: operator.priority,
                    shape: Shape::Scalar,
                    effects: acc.effects || right.effects,
                };
                continue;
            }
            // The right operand runs statements of its own, which must only
            // run when the left operand does not decide the result.
            let indent = cx.indent.clone();
            let mut inner = CodeBlock::new();
            inner.append(right.aux.as_str());
            flag_if(&mut inner, &right.code, tmp, &indent);
            let decided = format!("{}_tmp[{}] = {}", indent, tmp, if is_and { 0 } else { 1 });
            let mut aux = acc.aux;
            aux.line(format!("if {} then", acc.code));
            if is_and {
                aux.nest(inner.as_str(), &indent);
                aux.line("else");
                aux.line(decided);
            } else {
                aux.line(decided);
                aux.line("else");
                aux.nest(inner.as_str(), &indent);
            }
            aux.line("end");
            let flag = Lowered {
                aux,
                tmp_req: right.tmp_req.max(tmp + 1),
                effects: acc.effects || right.effects,
                ..Lowered::scratch(tmp, tmp)
            };
            acc = Self::fit(flag, operator.priority, tmp, &indent);
        }
        Ok(acc)
    }

    fn lower_compare<'a>(cx: &mut CompilationContext<'a>, compare: &CompareExpr<'a>, tmp: usize) -> CompileResult<Lowered> {
        let location = cx.location(compare.span);
        let ([op], [right]) = (compare.ops, compare.comparators) else {
            return Err(CompileError::unsupported("chained comparison", location));
        };
        let operator = priority::comparison(op)
            .ok_or_else(|| CompileError::unsupported(format!("comparison '{}'", op), location))?;
        let mut seq = Sequence::new(tmp);
        seq.push(cx, |cx, at| Self::lower(cx, compare.left, Priority::NumericBoundary, at))?;
        seq.push(cx, |cx, at| Self::lower(cx, right, Priority::NumericBoundary, at))?;
        let Sequence { items, aux, next, effects } = seq;
        let [left, right] = <[Lowered; 2]>::try_from(items)
            .map_err(|_| CompileError::internal("comparison without two operands", location))?;
        Ok(Lowered {
            code: format!("{} {} {}", left.code, operator.target, right.code),
            aux,
            tmp_req: next,
            is_bool: true,
            priority: Priority::Comparison,
            shape: Shape::Scalar,
            effects,
        })
    }

    fn lower_list<'a>(cx: &mut CompilationContext<'a>, list: &ListExpr<'a>, tmp: usize) -> CompileResult<Lowered> {
        if list.elts.is_empty() {
            return Err(CompileError::unsupported("empty list", cx.location(list.span)));
        }
        let mut seq = Sequence::new(tmp);
        for elt in list.elts {
            seq.push(cx, |cx, at| Self::lower(cx, elt, Priority::Comma, at))?;
        }
        let codes: Vec<String> = seq.items.iter().map(|item| item.code.clone()).collect();
        Ok(Lowered {
            code: format!("[{}]", codes.join(", ")),
            aux: seq.aux,
            tmp_req: seq.next,
            is_bool: false,
            priority: Priority::Atom,
            shape: Shape::Array(codes.len()),
            effects: seq.effects,
        })
    }

    /// `[a, b] * n`: the elements repeated `n` times.
    fn lower_repeated<'a>(
        cx: &mut CompilationContext<'a>,
        expr: &Expr<'a>,
        elts: &[Expr<'a>],
        count: i64,
        tmp: usize,
    ) -> CompileResult<Lowered> {
        let location = cx.location(expr.span());
        if count <= 0 || elts.is_empty() {
            return Err(CompileError::unsupported("empty list", location));
        }
        let mut codes = Vec::with_capacity(elts.len());
        for elt in elts {
            let lowered = Self::lower(cx, elt, Priority::Comma, tmp)?;
            if !lowered.aux.is_empty() || !lowered.is_stable() {
                return Err(CompileError::unsupported(
                    "repeated list of non-constant elements",
                    location,
                ));
            }
            codes.push(lowered.code);
        }
        let repeated: Vec<String> = std::iter::repeat_n(codes, count as usize).flatten().collect();
        Ok(Lowered {
            shape: Shape::Array(repeated.len()),
            code: format!("[{}]", repeated.join(", ")),
            ..Lowered::atom("", tmp)
        })
    }

    /// Lower a call. With `need_value` false the call may be a procedure
    /// and the result code may be empty.
    pub fn lower_call<'a>(
        cx: &mut CompilationContext<'a>,
        call: &CallExpr<'a>,
        tmp: usize,
        need_value: bool,
    ) -> CompileResult<Lowered> {
        let location = cx.location(call.span);
        let Some(name) = dotted_name(call.func) else {
            return Err(CompileError::unsupported("call of a computed function", location));
        };
        if call.args.iter().any(|arg| matches!(arg, Expr::Starred(_))) {
            return Err(CompileError::unsupported("starred argument", location));
        }

        let shadowed = cx.scope().locals.contains(name.as_str()) || cx.globals.contains(name.as_str());
        if !shadowed && let Some(info) = cx.functions.get(name.as_str()) {
            let info = info.clone();
            return FunctionCompiler::inline_call(cx, &info, call, tmp, need_value);
        }
        if let Some(lowered) = Builtins::lower(cx, &name, call, tmp, need_value)? {
            return Ok(lowered);
        }
        let registry = cx.registry;
        if let Some(emitter) =
            registry.resolve_function(&name, &cx.star_imports, &cx.qualified_imports)
        {
            return Self::lower_native(cx, &name, emitter, call, tmp, need_value);
        }
        Err(CompileError::unknown(name, location))
    }

    fn lower_native<'a>(
        cx: &mut CompilationContext<'a>,
        name: &str,
        emitter: &dyn Emitter,
        call: &CallExpr<'a>,
        tmp: usize,
        need_value: bool,
    ) -> CompileResult<Lowered> {
        let location = cx.location(call.span);
        if !call.keywords.is_empty() {
            return Err(CompileError::unsupported(
                format!("keyword arguments to {}()", name),
                location,
            ));
        }
        let params = emitter.params();
        if params.len() != call.args.len() {
            return Err(CompileError::unsupported(
                format!(
                    "{}() takes {} arguments, {} given",
                    name,
                    params.len(),
                    call.args.len()
                ),
                location,
            ));
        }
        let mut seq = Sequence::new(tmp);
        for (arg, kind) in call.args.iter().zip(params) {
            match kind {
                ArgKind::Value => seq.push(cx, |cx, at| Self::lower(cx, arg, Priority::Comma, at))?,
                ArgKind::Array => seq.push(cx, |cx, at| Self::addressable(cx, arg, at))?,
            }
        }
        let operands: Vec<_> = seq.items.iter().map(Lowered::as_operand).collect();
        let mut scope = EmitScope::new(name, location, seq.next);
        let emission = emitter.emit(&mut scope, &operands)?;
        let writes_arrays = params.contains(&ArgKind::Array);
        let mut aux = seq.aux;
        aux.append(emission.aux.as_str());
        let effects = seq.effects || (!emission.aux.is_empty() && (emission.value.is_none() || writes_arrays));
        match emission.value {
            Some(value) => Ok(Lowered {
                code: value.code,
                aux,
                tmp_req: scope.next_scratch(),
                is_bool: false,
                priority: value.priority,
                shape: Shape::Scalar,
                effects,
            }),
            None if need_value => Err(CompileError::unsupported(
                format!("{}() used as a value but returns nothing", name),
                location,
            )),
            None => Ok(Lowered {
                aux,
                effects,
                ..Lowered::atom("", scope.next_scratch())
            }),
        }
    }
}

/// `_tmp[slot]` set to 1 when `condition` holds and 0 otherwise.
fn flag_if(block: &mut CodeBlock, condition: &str, slot: usize, indent: &str) {
    block.line(format!("if {} then", condition));
    block.line(format!("{}_tmp[{}] = 1", indent, slot));
    block.line("else");
    block.line(format!("{}_tmp[{}] = 0", indent, slot));
    block.line("end");
}

/// Reject values that do not fit a 16-bit word.
fn check_word(value: i64, spelling: &str, location: crate::error::Location) -> CompileResult<()> {
    if (WORD_MIN..=WORD_MAX).contains(&value) {
        Ok(())
    } else {
        Err(CompileError::unsupported(
            format!("integer {} outside the 16-bit range", spelling),
            location,
        ))
    }
}

fn binary_unsupported(op: &str, location: crate::error::Location) -> CompileError {
    match op {
        "/" => CompileError::unsupported("true division '/', use '//' for integer division", location),
        "@" => CompileError::unsupported("matrix multiplication '@'", location),
        other => CompileError::unsupported(format!("operator '{}'", other), location),
    }
}

fn unsupported(cx: &CompilationContext<'_>, expr: &Expr<'_>) -> CompileError {
    cx.locator.unsupported_expr(expr)
}

/// Short source-like description of an expression for messages.
pub fn describe(expr: &Expr<'_>) -> String {
    match dotted_name(expr) {
        Some(name) => name,
        None => expr.kind_name().to_string(),
    }
}
