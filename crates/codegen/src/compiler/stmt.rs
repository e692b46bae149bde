//! Statement compilation
//!
//! Aseba has no `break`, `continue` or early `return`. Each of them sets a
//! flag in a reserved scratch slot; the statements that follow a jump are
//! wrapped in an `if` testing the flags, and loop conditions test them too.

use super::context::{CompilationContext, LoopFlags};
use super::expr::{ExprCompiler, describe};
use super::function::contains_return;
use super::{Flow, Lowered, Sequence};
use crate::adapter::{dotted_name, int_constant, is_inert};
use crate::block::CodeBlock;
use crate::error::{CompileError, CompileResult};
use crate::names::return_name;
use crate::priority::{self, Priority};
use crate::shape::Shape;
use aspy_parser::ast::*;
use text_size::TextRange;

type Compiled = (CodeBlock, Flow);

pub struct StmtCompiler;

impl StmtCompiler {
    /// Compile a statement list, guarding whatever follows a statement that
    /// may jump.
    pub fn block<'a>(cx: &mut CompilationContext<'a>, stmts: &[Stmt<'a>]) -> CompileResult<Compiled> {
        let mut code = CodeBlock::new();
        let mut flow = Flow::default();
        for (index, stmt) in stmts.iter().enumerate() {
            let (stmt_code, stmt_flow) = Self::compile(cx, stmt)?;
            code.append(stmt_code.as_str());
            flow = flow.union(stmt_flow);
            let rest = &stmts[index + 1..];
            if !stmt_flow.any() || rest.is_empty() {
                continue;
            }
            let guard = Self::guard(cx, stmt_flow);
            let (rest_code, rest_flow) = Self::block(cx, rest)?;
            flow = flow.union(rest_flow);
            match guard {
                Some(guard) if !rest_code.is_empty() => {
                    code.line(format!("if {} then", guard));
                    code.nest(rest_code.as_str(), &cx.indent);
                    code.line("end");
                }
                _ => code.append(rest_code.as_str()),
            }
            break;
        }
        Ok((code, flow))
    }

    pub fn compile<'a>(cx: &mut CompilationContext<'a>, stmt: &Stmt<'a>) -> CompileResult<Compiled> {
        let base = cx.scope().base;
        let result = match stmt {
            Stmt::Expr(s) => Self::expr_stmt(cx, &s.value, base),
            Stmt::Assign(s) => Self::assign(cx, s, base),
            Stmt::AugAssign(s) => Self::aug_assign(cx, s, base),
            Stmt::If(s) => Self::if_stmt(cx, s, base),
            Stmt::While(s) => Self::while_stmt(cx, s),
            Stmt::For(s) => Self::for_stmt(cx, s),
            Stmt::Return(s) => Self::return_stmt(cx, s, base),
            Stmt::Break(span) => Self::jump(cx, *span, true),
            Stmt::Continue(span) => Self::jump(cx, *span, false),
            Stmt::Pass(_) | Stmt::Global(_) => Ok((CodeBlock::new(), Flow::default())),
            Stmt::Delete(s) => Self::delete(cx, s),
            Stmt::FuncDef(s) => Err(CompileError::unsupported("nested function", cx.location(s.span))),
            Stmt::Import(_) | Stmt::From(_) => Err(CompileError::unsupported(
                "import inside a block",
                cx.location(stmt.span()),
            )),
            other => Err(cx.locator.unsupported_stmt(other)),
        };
        cx.scope_mut().base = base;
        result
    }

    fn expr_stmt<'a>(cx: &mut CompilationContext<'a>, value: &Expr<'a>, tmp: usize) -> CompileResult<Compiled> {
        if is_inert(value) {
            return Ok((CodeBlock::new(), Flow::default()));
        }
        let lowered = match value {
            Expr::Call(call) => ExprCompiler::lower_call(cx, call, tmp, false)?,
            other => ExprCompiler::lower_raw(cx, other, tmp)?,
        };
        Ok((lowered.aux, Flow::default()))
    }

    // ===== Assignment =====

    fn assign<'a>(cx: &mut CompilationContext<'a>, s: &AssignStmt<'a>, tmp: usize) -> CompileResult<Compiled> {
        let code = match s.targets {
            [target @ (Expr::Tuple(_) | Expr::List(_))] => Self::unpack(cx, target, &s.value, tmp)?,
            [Expr::Subscript(subscript)] => Self::assign_element(cx, subscript, &s.value, tmp)?,
            [target] => {
                let value = ExprCompiler::lower_value(cx, &s.value, tmp)?;
                let line = Self::write_variable(cx, target, &value)?;
                let mut code = value.aux;
                code.line(line);
                code
            }
            targets => Self::assign_chain(cx, targets, &s.value, tmp)?,
        };
        Ok((code, Flow::default()))
    }

    /// `a = b = value`: the value is evaluated once.
    fn assign_chain<'a>(
        cx: &mut CompilationContext<'a>,
        targets: &[Expr<'a>],
        value: &Expr<'a>,
        tmp: usize,
    ) -> CompileResult<CodeBlock> {
        let lowered = ExprCompiler::lower_value(cx, value, tmp)?;
        let mut code = lowered.aux.clone();
        let value = if lowered.shape.is_array() || lowered.is_stable() {
            lowered
        } else {
            let slot = lowered.tmp_req;
            code.line(format!("_tmp[{}] = {}", slot, lowered.code));
            Lowered::scratch(slot, slot + 1)
        };
        for target in targets {
            match target {
                Expr::Subscript(subscript) => {
                    if let Shape::Array(cells) = value.shape {
                        return Err(CompileError::size(describe(target), 1, cells, cx.location(target.span())));
                    }
                    let element = Self::store_element(cx, subscript, &value, value.tmp_req)?;
                    code.append(element.as_str());
                }
                Expr::Name(_) | Expr::Attribute(_) => {
                    let line = Self::write_variable(cx, target, &value)?;
                    code.line(line);
                }
                other => {
                    return Err(CompileError::unsupported(
                        format!("{} target in a chained assignment", other.kind_name()),
                        cx.location(other.span()),
                    ));
                }
            }
        }
        Ok(code)
    }

    /// `a, b = x, y`: every value is read before any target is written.
    fn unpack<'a>(
        cx: &mut CompilationContext<'a>,
        target: &Expr<'a>,
        value: &Expr<'a>,
        tmp: usize,
    ) -> CompileResult<CodeBlock> {
        let location = cx.location(target.span());
        let targets = match target {
            Expr::Tuple(tuple) => tuple.elts,
            Expr::List(list) => list.elts,
            _ => return Err(cx.locator.unsupported_expr(target)),
        };
        let values = match value {
            Expr::Tuple(tuple) => tuple.elts,
            Expr::List(list) => list.elts,
            _ => {
                return Err(CompileError::unsupported(
                    "tuple assignment from a value other than a tuple",
                    location,
                ));
            }
        };
        if targets.len() != values.len() {
            return Err(CompileError::unsupported(
                format!(
                    "tuple assignment of {} values to {} targets",
                    values.len(),
                    targets.len()
                ),
                location,
            ));
        }

        let mut seq = Sequence::new(tmp);
        for value in values {
            seq.push(cx, |cx, at| ExprCompiler::lower(cx, value, Priority::Assign, at))?;
        }
        let Sequence { items, aux, mut next, .. } = seq;
        let mut code = aux;
        let mut staged = Vec::with_capacity(items.len());
        for item in items {
            if item.is_stable() {
                staged.push(item);
            } else {
                code.line(format!("_tmp[{}] = {}", next, item.code));
                staged.push(Lowered::scratch(next, next + 1));
                next += 1;
            }
        }
        for (target, value) in targets.iter().zip(&staged) {
            match target {
                Expr::Subscript(subscript) => {
                    let element = Self::store_element(cx, subscript, value, next)?;
                    code.append(element.as_str());
                }
                Expr::Name(_) | Expr::Attribute(_) => {
                    let line = Self::write_variable(cx, target, value)?;
                    code.line(line);
                }
                other => return Err(cx.locator.unsupported_expr(other)),
            }
        }
        Ok(code)
    }

    /// `a[i] = value`, with the value evaluated before the index.
    fn assign_element<'a>(
        cx: &mut CompilationContext<'a>,
        subscript: &SubscriptExpr<'a>,
        value: &Expr<'a>,
        tmp: usize,
    ) -> CompileResult<CodeBlock> {
        let mut seq = Sequence::new(tmp);
        seq.push(cx, |cx, at| ExprCompiler::lower(cx, value, Priority::Assign, at))?;
        let mut array = String::new();
        seq.push(cx, |cx, at| {
            let (name, index) = ExprCompiler::subscript_parts(cx, subscript, at)?;
            array = name;
            Ok(index)
        })?;
        let Sequence { items, aux, .. } = seq;
        let location = cx.location(subscript.span);
        let [value, index] = <[Lowered; 2]>::try_from(items)
            .map_err(|_| CompileError::internal("element assignment without value and index", location))?;
        let mut code = aux;
        code.line(format!("{}[{}] = {}", array, index.code, value.code));
        Ok(code)
    }

    /// Store a value that no later code can change into `a[i]`.
    fn store_element<'a>(
        cx: &mut CompilationContext<'a>,
        subscript: &SubscriptExpr<'a>,
        value: &Lowered,
        tmp: usize,
    ) -> CompileResult<CodeBlock> {
        let (array, index) = ExprCompiler::subscript_parts(cx, subscript, tmp)?;
        let mut code = index.aux;
        code.line(format!("{}[{}] = {}", array, index.code, value.code));
        Ok(code)
    }

    /// Resolve a name or attribute chain for writing a value of `shape`,
    /// declaring user variables on first assignment.
    fn store_name<'a>(cx: &mut CompilationContext<'a>, target: &Expr<'a>, shape: Shape) -> CompileResult<String> {
        let span = target.span();
        let Some(name) = dotted_name(target) else {
            return Err(cx.locator.unsupported_expr(target));
        };
        let store = cx.resolve_store(&name, span)?;
        match store.fixed {
            Some(fixed) if fixed != shape => {
                return Err(CompileError::size(name, fixed.cells(), shape.cells(), cx.location(span)));
            }
            Some(_) => {}
            None => cx.declare(&store.target, shape, &name, span)?,
        }
        Ok(store.target)
    }

    fn write_variable<'a>(cx: &mut CompilationContext<'a>, target: &Expr<'a>, value: &Lowered) -> CompileResult<String> {
        let name = Self::store_name(cx, target, value.shape)?;
        Ok(format!("{} = {}", name, value.code))
    }

    fn aug_assign<'a>(cx: &mut CompilationContext<'a>, s: &AugAssignStmt<'a>, tmp: usize) -> CompileResult<Compiled> {
        let container = priority::binary(s.op).map_or(Priority::Multiplicative, |op| op.priority);
        let code = match &s.target {
            Expr::Subscript(subscript) => {
                let (array, index) = ExprCompiler::subscript_parts(cx, subscript, tmp)?;
                let mut code = index.aux.clone();
                let (index, next) = if index.is_stable() {
                    (index.code, index.tmp_req)
                } else {
                    let slot = index.tmp_req;
                    code.line(format!("_tmp[{}] = {}", slot, index.code));
                    (format!("_tmp[{}]", slot), slot + 1)
                };
                let element = format!("{}[{}]", array, index);
                let mut seq = Sequence::new(next);
                seq.add(Lowered::atom(element.clone(), next));
                let result = ExprCompiler::finish_binary(cx, seq, s.op, &s.value, s.span)?;
                code.append(result.aux.as_str());
                code.line(format!("{} = {}", element, result.code));
                code
            }
            Expr::Name(_) | Expr::Attribute(_) => {
                let left = ExprCompiler::lower(cx, &s.target, container, tmp)?;
                let mut seq = Sequence::new(tmp);
                seq.add(left);
                let result = ExprCompiler::finish_binary(cx, seq, s.op, &s.value, s.span)?;
                let line = Self::write_variable(cx, &s.target, &result)?;
                let mut code = result.aux;
                code.line(line);
                code
            }
            other => return Err(cx.locator.unsupported_expr(other)),
        };
        Ok((code, Flow::default()))
    }

    // ===== Control flow =====

    fn if_stmt<'a>(cx: &mut CompilationContext<'a>, s: &IfStmt<'a>, tmp: usize) -> CompileResult<Compiled> {
        let indent = cx.indent.clone();
        let cond = ExprCompiler::condition(cx, &s.test, tmp)?;
        let mut code = cond.aux;
        code.line(format!("if {} then", cond.code));
        let (body, mut flow) = Self::block(cx, s.body)?;
        code.nest(body.as_str(), &indent);

        let mut orelse = s.orelse;
        while !orelse.is_empty() {
            if let [Stmt::If(elif)] = orelse {
                let cond = ExprCompiler::condition(cx, &elif.test, tmp)?;
                if cond.aux.is_empty() {
                    code.line(format!("elseif {} then", cond.code));
                    let (body, body_flow) = Self::block(cx, elif.body)?;
                    code.nest(body.as_str(), &indent);
                    flow = flow.union(body_flow);
                    orelse = elif.orelse;
                    continue;
                }
            }
            code.line("else");
            let (body, body_flow) = Self::block(cx, orelse)?;
            code.nest(body.as_str(), &indent);
            flow = flow.union(body_flow);
            break;
        }
        code.line("end");
        Ok((code, flow))
    }

    fn while_stmt<'a>(cx: &mut CompilationContext<'a>, s: &WhileStmt<'a>) -> CompileResult<Compiled> {
        let indent = cx.indent.clone();
        let (flags, stop) = Self::loop_flags(cx, s.body);
        let container = if stop.is_empty() {
            Priority::LogicalOr
        } else {
            Priority::LogicalAnd
        };
        let tmp = cx.scope().base;
        let cond = ExprCompiler::lower(cx, &s.test, container, tmp)?;
        let (body, flow) = Self::loop_body(cx, flags, s.body)?;

        let mut code = CodeBlock::new();
        if let Some(brk) = flags.brk {
            code.line(format!("_tmp[{}] = 0", brk));
        }
        code.append(cond.aux.as_str());
        let mut header = stop.clone();
        header.push(cond.code);
        code.line(format!("while {} do", header.join(" and ")));
        let mut inner = CodeBlock::new();
        if let Some(cont) = flags.cont {
            inner.line(format!("_tmp[{}] = 0", cont));
        }
        inner.append(body.as_str());
        inner.append(Self::guarded(&stop, cond.aux.as_str(), &indent).as_str());
        code.nest(inner.as_str(), &indent);
        code.line("end");

        let (orelse, orelse_flow) = Self::block(cx, s.orelse)?;
        code.append(Self::guarded(&stop, orelse.as_str(), &indent).as_str());
        Ok((
            code,
            Flow {
                ret: flow.ret || orelse_flow.ret,
                ..orelse_flow
            },
        ))
    }

    fn for_stmt<'a>(cx: &mut CompilationContext<'a>, s: &ForStmt<'a>) -> CompileResult<Compiled> {
        let location = cx.location(s.span);
        if s.is_async {
            return Err(CompileError::unsupported("async for", location));
        }
        let range = match &s.iter {
            Expr::Call(call) if dotted_name(call.func).as_deref() == Some("range") => call,
            _ => {
                return Err(CompileError::unsupported(
                    "for loop over something other than range()",
                    location,
                ));
            }
        };
        if !matches!(s.target, Expr::Name(_) | Expr::Attribute(_)) {
            return Err(CompileError::unsupported(
                format!("{} as a loop variable", s.target.kind_name()),
                location,
            ));
        }
        let (start, stop, step) = match (range.args, range.keywords) {
            ([stop], []) => (None, stop, None),
            ([start, stop], []) => (Some(start), stop, None),
            ([start, stop, step], []) => (Some(start), stop, Some(step)),
            _ => return Err(CompileError::unsupported("range() with these arguments", location)),
        };
        let step = match step {
            None => 1,
            Some(step) => int_constant(step)
                .ok_or_else(|| CompileError::unsupported("range() step that is not a constant", location))?,
        };
        if step == 0 {
            return Err(CompileError::unsupported("range() step of zero", location));
        }
        if step.abs() > WORD_MAX {
            return Err(CompileError::unsupported("range() step outside the 16-bit range", location));
        }
        if int_constant(stop).is_some_and(|end| empty_range(end, step)) {
            return Self::block(cx, s.orelse);
        }

        let start_value = start.map_or(Some(0), int_constant);
        let mut last = None;
        if let (Some(first), Some(end)) = (start_value, int_constant(stop)) {
            let count = range_len(first, end, step);
            if count == 0 {
                return Self::block(cx, s.orelse);
            }
            let target_name = dotted_name(&s.target).unwrap_or_default();
            let (has_break, has_continue) = loop_jumps(s.body);
            let plain = !has_break
                && !has_continue
                && !s.body.iter().any(contains_return)
                && !assigns(s.body, &target_name);
            let value = first + (count - 1) * step;
            // Aseba leaves the variable one step past `last`, which must not wrap.
            if plain && fits_word(first) && fits_word(value + step) {
                return Self::counted_for(cx, s, first, value, step);
            }
            last = Some(value);
        }
        Self::general_for(cx, s, start, stop, step, last)
    }

    /// `for v in first:last step s do`, for literal bounds and a body that
    /// neither jumps nor writes the loop variable. The variable is reset to
    /// `last` afterwards, as Python leaves it on the last value yielded.
    fn counted_for<'a>(
        cx: &mut CompilationContext<'a>,
        s: &ForStmt<'a>,
        first: i64,
        last: i64,
        step: i64,
    ) -> CompileResult<Compiled> {
        let variable = Self::store_name(cx, &s.target, Shape::Scalar)?;
        let mut code = CodeBlock::new();
        let step = if step == 1 {
            String::new()
        } else {
            format!(" step {}", step)
        };
        code.line(format!("for {} in {}:{}{} do", variable, first, last, step));
        cx.scope_mut().loops.push(LoopFlags::default());
        let body = Self::block(cx, s.body);
        cx.scope_mut().loops.pop();
        let (body, flow) = body?;
        code.nest(body.as_str(), &cx.indent);
        code.line("end");
        code.line(format!("{} = {}", variable, last));
        let (orelse, orelse_flow) = Self::block(cx, s.orelse)?;
        code.append(orelse.as_str());
        Ok((code, flow.union(orelse_flow)))
    }

    /// Counter in a scratch slot, bounds evaluated once. `last` is the last
    /// value yielded when both bounds are literals.
    ///
    /// When the counter could step past the 16-bit range, the increment is
    /// guarded and sets an end flag instead of wrapping around.
    fn general_for<'a>(
        cx: &mut CompilationContext<'a>,
        s: &ForStmt<'a>,
        start: Option<&Expr<'a>>,
        stop: &Expr<'a>,
        step: i64,
        last: Option<i64>,
    ) -> CompileResult<Compiled> {
        let indent = cx.indent.clone();
        let counter = cx.reserve_slot();
        let mut code = CodeBlock::new();

        let start = match start {
            Some(start) => {
                let tmp = cx.scope().base;
                ExprCompiler::lower(cx, start, Priority::Assign, tmp)?
            }
            None => Lowered::literal(0, 0),
        };
        code.append(start.aux.as_str());
        code.line(format!("_tmp[{}] = {}", counter, start.code));
        let (test, furthest) = match int_constant(stop) {
            Some(value) => literal_bound(value, step),
            None => {
                let slot = cx.reserve_slot();
                let tmp = cx.scope().base;
                let lowered = ExprCompiler::lower(cx, stop, Priority::Assign, tmp)?;
                code.append(lowered.aux.as_str());
                code.line(format!("_tmp[{}] = {}", slot, lowered.code));
                if step > 0 {
                    (Some(format!("< _tmp[{}]", slot)), WORD_MAX - 1)
                } else {
                    (Some(format!("> _tmp[{}]", slot)), WORD_MIN + 1)
                }
            }
        };
        let furthest = last.unwrap_or(furthest);
        let end = (!fits_word(furthest + step)).then(|| cx.reserve_slot());

        let (flags, guards) = Self::loop_flags(cx, s.body);
        let counter_code = format!("_tmp[{}]", counter);
        let assign_target = Self::write_variable(cx, &s.target, &Lowered::atom(counter_code.clone(), 0))?;
        let (body, flow) = Self::loop_body(cx, flags, s.body)?;

        if let Some(brk) = flags.brk {
            code.line(format!("_tmp[{}] = 0", brk));
        }
        if let Some(end) = end {
            code.line(format!("_tmp[{}] = 0", end));
        }
        let mut header = guards.clone();
        header.extend(end.map(zero_test));
        header.extend(test.map(|test| format!("{} {}", counter_code, test)));
        code.line(format!("while {} do", header.join(" and ")));
        let mut inner = CodeBlock::new();
        inner.line(assign_target);
        if let Some(cont) = flags.cont {
            inner.line(format!("_tmp[{}] = 0", cont));
        }
        inner.append(body.as_str());
        let increment = if step > 0 {
            format!("{} + {}", counter_code, step)
        } else {
            format!("{} - {}", counter_code, -step)
        };
        let increment = format!("{} = {}", counter_code, increment);
        match end {
            Some(end) => {
                let (over, limit) = if step > 0 {
                    (">", WORD_MAX - step)
                } else {
                    ("<", WORD_MIN - step)
                };
                inner.line(format!("if {} {} {} then", counter_code, over, limit));
                inner.line(format!("{}_tmp[{}] = 1", indent, end));
                inner.line("else");
                inner.line(format!("{}{}", indent, increment));
                inner.line("end");
            }
            None => inner.line(increment),
        }
        code.nest(inner.as_str(), &indent);
        code.line("end");

        let (orelse, orelse_flow) = Self::block(cx, s.orelse)?;
        code.append(Self::guarded(&guards, orelse.as_str(), &indent).as_str());
        Ok((
            code,
            Flow {
                ret: flow.ret || orelse_flow.ret,
                ..orelse_flow
            },
        ))
    }

    /// Reserve the flags a loop body needs and list the tests that must all
    /// hold for the loop to go on.
    fn loop_flags(cx: &mut CompilationContext<'_>, body: &[Stmt<'_>]) -> (LoopFlags, Vec<String>) {
        let (has_break, has_continue) = loop_jumps(body);
        let flags = LoopFlags {
            brk: has_break.then(|| cx.reserve_slot()),
            cont: has_continue.then(|| cx.reserve_slot()),
        };
        let ret = if body.iter().any(contains_return) {
            cx.scope().ret.flag
        } else {
            None
        };
        let stop = flags.brk.into_iter().chain(ret).map(zero_test).collect();
        (flags, stop)
    }

    fn loop_body<'a>(cx: &mut CompilationContext<'a>, flags: LoopFlags, body: &[Stmt<'a>]) -> CompileResult<Compiled> {
        cx.scope_mut().loops.push(flags);
        let compiled = Self::block(cx, body);
        cx.scope_mut().loops.pop();
        compiled
    }

    /// `code` run only while every test in `tests` holds.
    fn guarded(tests: &[String], code: &str, indent: &str) -> CodeBlock {
        let mut block = CodeBlock::new();
        if code.is_empty() {
            return block;
        }
        if tests.is_empty() {
            block.append(code);
        } else {
            block.line(format!("if {} then", tests.join(" and ")));
            block.nest(code, indent);
            block.line("end");
        }
        block
    }

    fn return_stmt<'a>(cx: &mut CompilationContext<'a>, s: &ReturnStmt<'a>, tmp: usize) -> CompileResult<Compiled> {
        let location = cx.location(s.span);
        let Some(function) = cx.scope().function else {
            return Err(CompileError::unsupported("return outside a function", location));
        };
        let mut code = CodeBlock::new();
        if let Some(value) = &s.value {
            let Some(slot) = cx.scope().ret.slot else {
                return Err(CompileError::unsupported(
                    "return with a value in an event handler",
                    location,
                ));
            };
            let lowered = ExprCompiler::lower_value(cx, value, tmp)?;
            let result = format!("{}()", function);
            if let Some(previous) = cx.scope().ret.shape
                && previous != lowered.shape
            {
                return Err(CompileError::size(result, previous.cells(), lowered.shape.cells(), location));
            }
            cx.scope_mut().ret.shape = Some(lowered.shape);
            code.append(lowered.aux.as_str());
            match lowered.shape {
                Shape::Scalar => code.line(format!("_tmp[{}] = {}", slot, lowered.code)),
                Shape::Array(_) => {
                    let target = return_name(function);
                    cx.declare(&target, lowered.shape, &result, s.span)?;
                    code.line(format!("{} = {}", target, lowered.code));
                }
            }
        }
        if let Some(flag) = cx.scope().ret.flag {
            code.line(format!("_tmp[{}] = 1", flag));
        }
        Ok((
            code,
            Flow {
                ret: true,
                ..Flow::default()
            },
        ))
    }

    fn jump(cx: &mut CompilationContext<'_>, span: TextRange, is_break: bool) -> CompileResult<Compiled> {
        let location = cx.location(span);
        let keyword = if is_break { "break" } else { "continue" };
        let Some(flags) = cx.scope().loops.last().copied() else {
            return Err(CompileError::unsupported(format!("'{}' outside a loop", keyword), location));
        };
        let slot = if is_break { flags.brk } else { flags.cont };
        let slot = slot.ok_or_else(|| CompileError::internal(format!("no flag reserved for '{}'", keyword), location))?;
        let mut code = CodeBlock::new();
        code.line(format!("_tmp[{}] = 1", slot));
        let flow = Flow {
            brk: is_break,
            cont: !is_break,
            ret: false,
        };
        Ok((code, flow))
    }

    /// `del name` only ends the name's use; the variable stays allocated.
    fn delete(cx: &mut CompilationContext<'_>, s: &DeleteStmt<'_>) -> CompileResult<Compiled> {
        for target in s.targets {
            if !matches!(target, Expr::Name(_)) {
                return Err(CompileError::unsupported(
                    format!("del of {}", target.kind_name()),
                    cx.location(target.span()),
                ));
            }
        }
        Ok((CodeBlock::new(), Flow::default()))
    }

    /// Test guarding the code after a statement with flow `flow`.
    fn guard(cx: &CompilationContext<'_>, flow: Flow) -> Option<String> {
        let scope = cx.scope();
        let mut flags = Vec::new();
        if let Some(innermost) = scope.loops.last() {
            if flow.brk {
                flags.extend(innermost.brk);
            }
            if flow.cont {
                flags.extend(innermost.cont);
            }
        }
        if flow.ret {
            flags.extend(scope.ret.flag);
        }
        if flags.is_empty() {
            None
        } else {
            Some(flags.into_iter().map(zero_test).collect::<Vec<_>>().join(" and "))
        }
    }
}

fn zero_test(slot: usize) -> String {
    format!("_tmp[{}] == 0", slot)
}

/// Whether a loop body breaks or continues its own loop. Nested loops own
/// the jumps of their bodies but not of their `else` clauses.
fn loop_jumps(body: &[Stmt<'_>]) -> (bool, bool) {
    body.iter().fold((false, false), |(brk, cont), stmt| {
        let (b, c) = match stmt {
            Stmt::Break(_) => (true, false),
            Stmt::Continue(_) => (false, true),
            Stmt::If(s) => {
                let (b1, c1) = loop_jumps(s.body);
                let (b2, c2) = loop_jumps(s.orelse);
                (b1 || b2, c1 || c2)
            }
            Stmt::While(s) => loop_jumps(s.orelse),
            Stmt::For(s) => loop_jumps(s.orelse),
            _ => (false, false),
        };
        (brk || b, cont || c)
    })
}

/// Whether `stmts` assign `name` anywhere.
fn assigns(stmts: &[Stmt<'_>], name: &str) -> bool {
    fn target_is(target: &Expr<'_>, name: &str) -> bool {
        match target {
            Expr::Tuple(tuple) => tuple.elts.iter().any(|t| target_is(t, name)),
            Expr::List(list) => list.elts.iter().any(|t| target_is(t, name)),
            other => dotted_name(other).as_deref() == Some(name),
        }
    }
    stmts.iter().any(|stmt| match stmt {
        Stmt::Assign(s) => s.targets.iter().any(|t| target_is(t, name)),
        Stmt::AugAssign(s) => target_is(&s.target, name),
        Stmt::If(s) => assigns(s.body, name) || assigns(s.orelse, name),
        Stmt::While(s) => assigns(s.body, name) || assigns(s.orelse, name),
        Stmt::For(s) => target_is(&s.target, name) || assigns(s.body, name) || assigns(s.orelse, name),
        _ => false,
    })
}

/// Number of values `range(start, stop, step)` yields.
fn range_len(start: i64, stop: i64, step: i64) -> i64 {
    if step > 0 && start < stop {
        (stop - start + step - 1) / step
    } else if step < 0 && start > stop {
        (start - stop - step - 1) / -step
    } else {
        0
    }
}

const WORD_MIN: i64 = i16::MIN as i64;
const WORD_MAX: i64 = i16::MAX as i64;

fn fits_word(value: i64) -> bool {
    i16::try_from(value).is_ok()
}

/// Whether no 16-bit counter ever passes the test against a literal `stop`.
fn empty_range(stop: i64, step: i64) -> bool {
    if step > 0 { stop <= WORD_MIN } else { stop >= WORD_MAX }
}

/// Loop test against a literal `stop` of a range that is not empty, and the
/// furthest value the counter reaches inside the loop. There is no test
/// when every 16-bit counter passes it.
fn literal_bound(stop: i64, step: i64) -> (Option<String>, i64) {
    if step > 0 {
        if stop > WORD_MAX {
            (None, WORD_MAX)
        } else {
            (Some(format!("< {}", stop)), stop - 1)
        }
    } else if stop < WORD_MIN {
        (None, WORD_MIN)
    } else if stop == WORD_MIN {
        (Some(format!(">= {}", WORD_MIN + 1)), WORD_MIN + 1)
    } else {
        (Some(format!("> {}", stop)), stop + 1)
    }
}
