//! Read-only AST traversal.
//!
//! Implementors override the `visit_*` hooks they care about and call the
//! matching `walk::walk_*` function to keep descending. The visitor holds
//! `&mut self`, so passes can collect state while they walk.

pub mod walk;

use crate::ast::*;

/// Trait for visiting AST nodes.
pub trait Visitor<'a> {
    fn visit_module(&mut self, module: &Module<'a>) {
        walk::walk_module(self, module);
    }

    fn visit_stmt(&mut self, stmt: &Stmt<'a>) {
        walk::walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Expr<'a>) {
        walk::walk_expr(self, expr);
    }

    fn visit_excepthandler(&mut self, handler: &ExceptHandler<'a>) {
        walk::walk_excepthandler(self, handler);
    }

    fn visit_arguments(&mut self, args: &Arguments<'a>) {
        walk::walk_arguments(self, args);
    }

    fn visit_keyword(&mut self, keyword: &Keyword<'a>) {
        walk::walk_keyword(self, keyword);
    }

    fn visit_comprehension(&mut self, comp: &Comprehension<'a>) {
        walk::walk_comprehension(self, comp);
    }
}
