//! Core AST node definitions (Module and statements).

use super::expr::{Expr, Keyword};
use text_size::TextRange;

/// A module (root AST node).
#[derive(Debug, Clone)]
pub struct Module<'a> {
    pub body: &'a [Stmt<'a>],
    pub span: TextRange,
}

/// Statement types.
#[derive(Debug, Clone)]
pub enum Stmt<'a> {
    Expr(ExprStmt<'a>),
    Assign(AssignStmt<'a>),
    AnnAssign(AnnAssignStmt<'a>),
    AugAssign(AugAssignStmt<'a>),
    Return(ReturnStmt<'a>),
    If(IfStmt<'a>),
    While(WhileStmt<'a>),
    For(ForStmt<'a>),
    FuncDef(FuncDefStmt<'a>),
    ClassDef(ClassDefStmt<'a>),
    Pass(TextRange),
    Break(TextRange),
    Continue(TextRange),
    Import(ImportStmt<'a>),
    From(FromStmt<'a>),
    Raise(RaiseStmt<'a>),
    Try(TryStmt<'a>),
    With(WithStmt<'a>),
    Assert(AssertStmt<'a>),
    Delete(DeleteStmt<'a>),
    Global(GlobalStmt<'a>),
    Nonlocal(NonlocalStmt<'a>),
}

impl<'a> Stmt<'a> {
    pub fn span(&self) -> TextRange {
        match self {
            Stmt::Expr(s) => s.span,
            Stmt::Assign(s) => s.span,
            Stmt::AnnAssign(s) => s.span,
            Stmt::AugAssign(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::If(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::For(s) => s.span,
            Stmt::FuncDef(s) => s.span,
            Stmt::ClassDef(s) => s.span,
            Stmt::Pass(s) | Stmt::Break(s) | Stmt::Continue(s) => *s,
            Stmt::Import(s) => s.span,
            Stmt::From(s) => s.span,
            Stmt::Raise(s) => s.span,
            Stmt::Try(s) => s.span,
            Stmt::With(s) => s.span,
            Stmt::Assert(s) => s.span,
            Stmt::Delete(s) => s.span,
            Stmt::Global(s) => s.span,
            Stmt::Nonlocal(s) => s.span,
        }
    }

    /// Name of the node kind, as used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Stmt::Expr(_) => "Expr",
            Stmt::Assign(_) => "Assign",
            Stmt::AnnAssign(_) => "AnnAssign",
            Stmt::AugAssign(_) => "AugAssign",
            Stmt::Return(_) => "Return",
            Stmt::If(_) => "If",
            Stmt::While(_) => "While",
            Stmt::For(s) if s.is_async => "AsyncFor",
            Stmt::For(_) => "For",
            Stmt::FuncDef(s) if s.is_async => "AsyncFunctionDef",
            Stmt::FuncDef(_) => "FunctionDef",
            Stmt::ClassDef(_) => "ClassDef",
            Stmt::Pass(_) => "Pass",
            Stmt::Break(_) => "Break",
            Stmt::Continue(_) => "Continue",
            Stmt::Import(_) => "Import",
            Stmt::From(_) => "ImportFrom",
            Stmt::Raise(_) => "Raise",
            Stmt::Try(_) => "Try",
            Stmt::With(s) if s.is_async => "AsyncWith",
            Stmt::With(_) => "With",
            Stmt::Assert(_) => "Assert",
            Stmt::Delete(_) => "Delete",
            Stmt::Global(_) => "Global",
            Stmt::Nonlocal(_) => "Nonlocal",
        }
    }
}

/// Statement types with spans.
#[derive(Debug, Clone)]
pub struct ExprStmt<'a> {
    pub value: Expr<'a>,
    pub span: TextRange,
}

/// `a = b = value` keeps every target, leftmost first.
#[derive(Debug, Clone)]
pub struct AssignStmt<'a> {
    pub targets: &'a [Expr<'a>],
    pub value: Expr<'a>,
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct AnnAssignStmt<'a> {
    pub target: Expr<'a>,
    pub annotation: Expr<'a>,
    pub value: Option<Expr<'a>>,
    pub span: TextRange,
}

/// Augmented assignment; `op` is the binary operator (`+` for `+=`).
#[derive(Debug, Clone)]
pub struct AugAssignStmt<'a> {
    pub target: Expr<'a>,
    pub op: &'a str,
    pub value: Expr<'a>,
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct ReturnStmt<'a> {
    pub value: Option<Expr<'a>>,
    pub span: TextRange,
}

/// `elif` chains are nested `If` statements in `orelse`.
#[derive(Debug, Clone)]
pub struct IfStmt<'a> {
    pub test: Expr<'a>,
    pub body: &'a [Stmt<'a>],
    pub orelse: &'a [Stmt<'a>],
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct WhileStmt<'a> {
    pub test: Expr<'a>,
    pub body: &'a [Stmt<'a>],
    pub orelse: &'a [Stmt<'a>],
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct ForStmt<'a> {
    pub target: Expr<'a>,
    pub iter: Expr<'a>,
    pub body: &'a [Stmt<'a>],
    pub orelse: &'a [Stmt<'a>],
    pub is_async: bool,
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct FuncDefStmt<'a> {
    pub name: &'a str,
    pub args: Arguments<'a>,
    pub body: &'a [Stmt<'a>],
    pub decorators: &'a [Expr<'a>],
    pub returns: Option<&'a Expr<'a>>,
    pub is_async: bool,
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct ClassDefStmt<'a> {
    pub name: &'a str,
    pub bases: &'a [Expr<'a>],
    pub keywords: &'a [Keyword<'a>],
    pub body: &'a [Stmt<'a>],
    pub decorators: &'a [Expr<'a>],
    pub span: TextRange,
}

/// Imported name with its optional `as` alias.
pub type Alias<'a> = (&'a str, Option<&'a str>);

#[derive(Debug, Clone)]
pub struct ImportStmt<'a> {
    pub names: &'a [Alias<'a>],
    pub span: TextRange,
}

/// `from module import names`; `*` is stored as the single name `"*"`.
#[derive(Debug, Clone)]
pub struct FromStmt<'a> {
    pub level: u32,
    pub module: Option<&'a str>,
    pub names: &'a [Alias<'a>],
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct RaiseStmt<'a> {
    pub exc: Option<Expr<'a>>,
    pub cause: Option<Expr<'a>>,
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct TryStmt<'a> {
    pub body: &'a [Stmt<'a>],
    pub handlers: &'a [ExceptHandler<'a>],
    pub orelse: &'a [Stmt<'a>],
    pub finalbody: &'a [Stmt<'a>],
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct ExceptHandler<'a> {
    pub typ: Option<Expr<'a>>,
    pub name: Option<&'a str>,
    pub body: &'a [Stmt<'a>],
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct WithStmt<'a> {
    pub items: &'a [WithItem<'a>],
    pub body: &'a [Stmt<'a>],
    pub is_async: bool,
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct WithItem<'a> {
    pub context_expr: Expr<'a>,
    pub optional_vars: Option<Expr<'a>>,
}

#[derive(Debug, Clone)]
pub struct AssertStmt<'a> {
    pub test: Expr<'a>,
    pub msg: Option<Expr<'a>>,
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct DeleteStmt<'a> {
    pub targets: &'a [Expr<'a>],
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct GlobalStmt<'a> {
    pub names: &'a [&'a str],
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct NonlocalStmt<'a> {
    pub names: &'a [&'a str],
    pub span: TextRange,
}

/// Function parameters.
#[derive(Debug, Clone)]
pub struct Arguments<'a> {
    pub posonlyargs: &'a [Arg<'a>],
    pub args: &'a [Arg<'a>],
    pub vararg: Option<&'a Arg<'a>>,
    pub kwonlyargs: &'a [Arg<'a>],
    pub kw_defaults: &'a [Option<Expr<'a>>],
    pub kwarg: Option<&'a Arg<'a>>,
    /// Defaults of the trailing positional parameters, aligned to the right.
    pub defaults: &'a [Expr<'a>],
}

impl<'a> Arguments<'a> {
    pub fn empty() -> Self {
        Arguments {
            posonlyargs: &[],
            args: &[],
            vararg: None,
            kwonlyargs: &[],
            kw_defaults: &[],
            kwarg: None,
            defaults: &[],
        }
    }

    /// Positional parameters paired with their default, in declaration order.
    pub fn positional(&self) -> impl Iterator<Item = (&Arg<'a>, Option<&Expr<'a>>)> {
        let count = self.posonlyargs.len() + self.args.len();
        let first_default = count.saturating_sub(self.defaults.len());
        self.posonlyargs
            .iter()
            .chain(self.args.iter())
            .enumerate()
            .map(move |(idx, arg)| {
                let default = idx
                    .checked_sub(first_default)
                    .and_then(|d| self.defaults.get(d));
                (arg, default)
            })
    }
}

#[derive(Debug, Clone)]
pub struct Arg<'a> {
    pub arg: &'a str,
    pub annotation: Option<&'a Expr<'a>>,
    pub span: TextRange,
}

/// Comprehension clause (for x in iter [if condition])
#[derive(Debug, Clone)]
pub struct Comprehension<'a> {
    pub target: Expr<'a>,
    pub iter: Expr<'a>,
    pub ifs: &'a [Expr<'a>],
    pub is_async: bool,
}
