//! Default traversal for each node type, called by the `Visitor` defaults.

use super::Visitor;
use crate::ast::*;

/// Walk a module, visiting all statements.
pub fn walk_module<'a, V: Visitor<'a> + ?Sized>(visitor: &mut V, module: &Module<'a>) {
    for stmt in module.body {
        visitor.visit_stmt(stmt);
    }
}

fn walk_body<'a, V: Visitor<'a> + ?Sized>(visitor: &mut V, body: &[Stmt<'a>]) {
    for stmt in body {
        visitor.visit_stmt(stmt);
    }
}

/// Walk a statement, visiting all child nodes.
pub fn walk_stmt<'a, V: Visitor<'a> + ?Sized>(visitor: &mut V, stmt: &Stmt<'a>) {
    match stmt {
        Stmt::Expr(s) => visitor.visit_expr(&s.value),
        Stmt::Assign(a) => {
            for target in a.targets {
                visitor.visit_expr(target);
            }
            visitor.visit_expr(&a.value);
        }
        Stmt::AnnAssign(a) => {
            visitor.visit_expr(&a.target);
            visitor.visit_expr(&a.annotation);
            if let Some(value) = &a.value {
                visitor.visit_expr(value);
            }
        }
        Stmt::AugAssign(a) => {
            visitor.visit_expr(&a.target);
            visitor.visit_expr(&a.value);
        }
        Stmt::Return(r) => {
            if let Some(value) = &r.value {
                visitor.visit_expr(value);
            }
        }
        Stmt::If(s) => {
            visitor.visit_expr(&s.test);
            walk_body(visitor, s.body);
            walk_body(visitor, s.orelse);
        }
        Stmt::While(s) => {
            visitor.visit_expr(&s.test);
            walk_body(visitor, s.body);
            walk_body(visitor, s.orelse);
        }
        Stmt::For(s) => {
            visitor.visit_expr(&s.target);
            visitor.visit_expr(&s.iter);
            walk_body(visitor, s.body);
            walk_body(visitor, s.orelse);
        }
        Stmt::FuncDef(f) => {
            for decorator in f.decorators {
                visitor.visit_expr(decorator);
            }
            visitor.visit_arguments(&f.args);
            if let Some(returns) = f.returns {
                visitor.visit_expr(returns);
            }
            walk_body(visitor, f.body);
        }
        Stmt::ClassDef(c) => {
            for decorator in c.decorators {
                visitor.visit_expr(decorator);
            }
            for base in c.bases {
                visitor.visit_expr(base);
            }
            for keyword in c.keywords {
                visitor.visit_keyword(keyword);
            }
            walk_body(visitor, c.body);
        }
        Stmt::Raise(r) => {
            if let Some(exc) = &r.exc {
                visitor.visit_expr(exc);
            }
            if let Some(cause) = &r.cause {
                visitor.visit_expr(cause);
            }
        }
        Stmt::Try(t) => {
            walk_body(visitor, t.body);
            for handler in t.handlers {
                visitor.visit_excepthandler(handler);
            }
            walk_body(visitor, t.orelse);
            walk_body(visitor, t.finalbody);
        }
        Stmt::With(w) => {
            for item in w.items {
                visitor.visit_expr(&item.context_expr);
                if let Some(vars) = &item.optional_vars {
                    visitor.visit_expr(vars);
                }
            }
            walk_body(visitor, w.body);
        }
        Stmt::Assert(a) => {
            visitor.visit_expr(&a.test);
            if let Some(msg) = &a.msg {
                visitor.visit_expr(msg);
            }
        }
        Stmt::Delete(d) => {
            for target in d.targets {
                visitor.visit_expr(target);
            }
        }
        Stmt::Pass(_)
        | Stmt::Break(_)
        | Stmt::Continue(_)
        | Stmt::Import(_)
        | Stmt::From(_)
        | Stmt::Global(_)
        | Stmt::Nonlocal(_) => {}
    }
}

/// Walk an expression, visiting all child nodes.
pub fn walk_expr<'a, V: Visitor<'a> + ?Sized>(visitor: &mut V, expr: &Expr<'a>) {
    match expr {
        Expr::Constant(_) | Expr::Name(_) | Expr::JoinedStr(_) => {}
        Expr::BinOp(e) => {
            visitor.visit_expr(e.left);
            visitor.visit_expr(e.right);
        }
        Expr::UnaryOp(e) => visitor.visit_expr(e.operand),
        Expr::Compare(e) => {
            visitor.visit_expr(e.left);
            for comparator in e.comparators {
                visitor.visit_expr(comparator);
            }
        }
        Expr::Call(e) => {
            visitor.visit_expr(e.func);
            for arg in e.args {
                visitor.visit_expr(arg);
            }
            for keyword in e.keywords {
                visitor.visit_keyword(keyword);
            }
        }
        Expr::Attribute(e) => visitor.visit_expr(e.value),
        Expr::Subscript(e) => {
            visitor.visit_expr(e.value);
            visitor.visit_expr(e.slice);
        }
        Expr::Slice(e) => {
            for part in [e.lower, e.upper, e.step].into_iter().flatten() {
                visitor.visit_expr(part);
            }
        }
        Expr::List(e) => {
            for elt in e.elts {
                visitor.visit_expr(elt);
            }
        }
        Expr::Tuple(e) => {
            for elt in e.elts {
                visitor.visit_expr(elt);
            }
        }
        Expr::Set(e) => {
            for elt in e.elts {
                visitor.visit_expr(elt);
            }
        }
        Expr::Dict(e) => {
            for key in e.keys.iter().flatten() {
                visitor.visit_expr(key);
            }
            for value in e.values {
                visitor.visit_expr(value);
            }
        }
        Expr::Lambda(e) => {
            visitor.visit_arguments(&e.args);
            visitor.visit_expr(e.body);
        }
        Expr::IfExp(e) => {
            visitor.visit_expr(e.test);
            visitor.visit_expr(e.body);
            visitor.visit_expr(e.orelse);
        }
        Expr::BoolOp(e) => {
            for value in e.values {
                visitor.visit_expr(value);
            }
        }
        Expr::ListComp(e) => {
            for generator in e.generators {
                visitor.visit_comprehension(generator);
            }
            visitor.visit_expr(e.elt);
        }
        Expr::SetComp(e) => {
            for generator in e.generators {
                visitor.visit_comprehension(generator);
            }
            visitor.visit_expr(e.elt);
        }
        Expr::GeneratorExp(e) => {
            for generator in e.generators {
                visitor.visit_comprehension(generator);
            }
            visitor.visit_expr(e.elt);
        }
        Expr::DictComp(e) => {
            for generator in e.generators {
                visitor.visit_comprehension(generator);
            }
            visitor.visit_expr(e.key);
            visitor.visit_expr(e.value);
        }
        Expr::Await(e) => visitor.visit_expr(e.value),
        Expr::Starred(e) => visitor.visit_expr(e.value),
        Expr::Yield(e) => {
            if let Some(value) = e.value {
                visitor.visit_expr(value);
            }
        }
        Expr::YieldFrom(e) => visitor.visit_expr(e.value),
    }
}

pub fn walk_excepthandler<'a, V: Visitor<'a> + ?Sized>(
    visitor: &mut V,
    handler: &ExceptHandler<'a>,
) {
    if let Some(typ) = &handler.typ {
        visitor.visit_expr(typ);
    }
    walk_body(visitor, handler.body);
}

/// Visits parameter defaults and annotations.
pub fn walk_arguments<'a, V: Visitor<'a> + ?Sized>(visitor: &mut V, args: &Arguments<'a>) {
    let params = args
        .posonlyargs
        .iter()
        .chain(args.args)
        .chain(args.vararg)
        .chain(args.kwonlyargs)
        .chain(args.kwarg);
    for param in params {
        if let Some(annotation) = param.annotation {
            visitor.visit_expr(annotation);
        }
    }
    for default in args.defaults {
        visitor.visit_expr(default);
    }
    for default in args.kw_defaults.iter().flatten() {
        visitor.visit_expr(default);
    }
}

pub fn walk_keyword<'a, V: Visitor<'a> + ?Sized>(visitor: &mut V, keyword: &Keyword<'a>) {
    visitor.visit_expr(&keyword.value);
}

pub fn walk_comprehension<'a, V: Visitor<'a> + ?Sized>(visitor: &mut V, comp: &Comprehension<'a>) {
    visitor.visit_expr(&comp.iter);
    visitor.visit_expr(&comp.target);
    for condition in comp.ifs {
        visitor.visit_expr(condition);
    }
}
