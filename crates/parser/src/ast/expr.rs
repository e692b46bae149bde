//! Expression AST nodes.

use super::nodes::{Arguments, Comprehension};
use text_size::TextRange;

/// Expression types.
#[derive(Debug, Clone)]
pub enum Expr<'a> {
    Constant(ConstantExpr<'a>),
    Name(NameExpr<'a>),
    BinOp(BinOpExpr<'a>),
    UnaryOp(UnaryOpExpr<'a>),
    Compare(CompareExpr<'a>),
    Call(CallExpr<'a>),
    Attribute(AttributeExpr<'a>),
    Subscript(SubscriptExpr<'a>),
    Slice(SliceExpr<'a>),
    List(ListExpr<'a>),
    Tuple(TupleExpr<'a>),
    Set(SetExpr<'a>),
    Dict(DictExpr<'a>),
    Lambda(LambdaExpr<'a>),
    IfExp(IfExpExpr<'a>),
    BoolOp(BoolOpExpr<'a>),
    ListComp(ListCompExpr<'a>),
    DictComp(DictCompExpr<'a>),
    SetComp(SetCompExpr<'a>),
    GeneratorExp(GeneratorExpExpr<'a>),
    Await(AwaitExpr<'a>),
    JoinedStr(JoinedStrExpr<'a>),
    Starred(StarredExpr<'a>),
    Yield(YieldExpr<'a>),
    YieldFrom(YieldFromExpr<'a>),
}

impl<'a> Expr<'a> {
    pub fn span(&self) -> TextRange {
        match self {
            Expr::Constant(e) => e.span,
            Expr::Name(e) => e.span,
            Expr::BinOp(e) => e.span,
            Expr::UnaryOp(e) => e.span,
            Expr::Compare(e) => e.span,
            Expr::Call(e) => e.span,
            Expr::Attribute(e) => e.span,
            Expr::Subscript(e) => e.span,
            Expr::Slice(e) => e.span,
            Expr::List(e) => e.span,
            Expr::Tuple(e) => e.span,
            Expr::Set(e) => e.span,
            Expr::Dict(e) => e.span,
            Expr::Lambda(e) => e.span,
            Expr::IfExp(e) => e.span,
            Expr::BoolOp(e) => e.span,
            Expr::ListComp(e) => e.span,
            Expr::DictComp(e) => e.span,
            Expr::SetComp(e) => e.span,
            Expr::GeneratorExp(e) => e.span,
            Expr::Await(e) => e.span,
            Expr::JoinedStr(e) => e.span,
            Expr::Starred(e) => e.span,
            Expr::Yield(e) => e.span,
            Expr::YieldFrom(e) => e.span,
        }
    }

    /// Name of the node kind, as used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Constant(_) => "Constant",
            Expr::Name(_) => "Name",
            Expr::BinOp(_) => "BinOp",
            Expr::UnaryOp(_) => "UnaryOp",
            Expr::Compare(_) => "Compare",
            Expr::Call(_) => "Call",
            Expr::Attribute(_) => "Attribute",
            Expr::Subscript(_) => "Subscript",
            Expr::Slice(_) => "Slice",
            Expr::List(_) => "List",
            Expr::Tuple(_) => "Tuple",
            Expr::Set(_) => "Set",
            Expr::Dict(_) => "Dict",
            Expr::Lambda(_) => "Lambda",
            Expr::IfExp(_) => "IfExp",
            Expr::BoolOp(_) => "BoolOp",
            Expr::ListComp(_) => "ListComp",
            Expr::DictComp(_) => "DictComp",
            Expr::SetComp(_) => "SetComp",
            Expr::GeneratorExp(_) => "GeneratorExp",
            Expr::Await(_) => "Await",
            Expr::JoinedStr(_) => "JoinedStr",
            Expr::Starred(_) => "Starred",
            Expr::Yield(_) => "Yield",
            Expr::YieldFrom(_) => "YieldFrom",
        }
    }
}

/// Literal class of a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstantKind {
    Int,
    Float,
    Str,
    True,
    False,
    None,
    Ellipsis,
}

/// A literal. `value` holds the source spelling for numbers and keywords,
/// and the decoded contents (adjacent literals already joined) for strings.
#[derive(Debug, Clone)]
pub struct ConstantExpr<'a> {
    pub value: &'a str,
    pub kind: ConstantKind,
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct NameExpr<'a> {
    pub id: &'a str,
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct ListExpr<'a> {
    pub elts: &'a [Expr<'a>],
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct TupleExpr<'a> {
    pub elts: &'a [Expr<'a>],
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct SetExpr<'a> {
    pub elts: &'a [Expr<'a>],
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct BinOpExpr<'a> {
    pub left: &'a Expr<'a>,
    pub op: &'a str,
    pub right: &'a Expr<'a>,
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct UnaryOpExpr<'a> {
    pub op: &'a str,
    pub operand: &'a Expr<'a>,
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct CompareExpr<'a> {
    pub left: &'a Expr<'a>,
    pub ops: &'a [&'a str],
    pub comparators: &'a [Expr<'a>],
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct CallExpr<'a> {
    pub func: &'a Expr<'a>,
    pub args: &'a [Expr<'a>],
    pub keywords: &'a [Keyword<'a>],
    pub span: TextRange,
}

/// Keyword argument of a call. `arg` is `None` for `**mapping`.
#[derive(Debug, Clone)]
pub struct Keyword<'a> {
    pub arg: Option<&'a str>,
    pub value: Expr<'a>,
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct AttributeExpr<'a> {
    pub value: &'a Expr<'a>,
    pub attr: &'a str,
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct SubscriptExpr<'a> {
    pub value: &'a Expr<'a>,
    pub slice: &'a Expr<'a>,
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct SliceExpr<'a> {
    pub lower: Option<&'a Expr<'a>>,
    pub upper: Option<&'a Expr<'a>>,
    pub step: Option<&'a Expr<'a>>,
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct DictExpr<'a> {
    pub keys: &'a [Option<Expr<'a>>],
    pub values: &'a [Expr<'a>],
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct LambdaExpr<'a> {
    pub args: Arguments<'a>,
    pub body: &'a Expr<'a>,
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct IfExpExpr<'a> {
    pub test: &'a Expr<'a>,
    pub body: &'a Expr<'a>,
    pub orelse: &'a Expr<'a>,
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct BoolOpExpr<'a> {
    pub op: &'a str,
    pub values: &'a [Expr<'a>],
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct ListCompExpr<'a> {
    pub elt: &'a Expr<'a>,
    pub generators: &'a [Comprehension<'a>],
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct DictCompExpr<'a> {
    pub key: &'a Expr<'a>,
    pub value: &'a Expr<'a>,
    pub generators: &'a [Comprehension<'a>],
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct SetCompExpr<'a> {
    pub elt: &'a Expr<'a>,
    pub generators: &'a [Comprehension<'a>],
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct GeneratorExpExpr<'a> {
    pub elt: &'a Expr<'a>,
    pub generators: &'a [Comprehension<'a>],
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct AwaitExpr<'a> {
    pub value: &'a Expr<'a>,
    pub span: TextRange,
}

/// F-string, kept as its raw source text. Nothing downstream interpolates.
#[derive(Debug, Clone)]
pub struct JoinedStrExpr<'a> {
    pub raw: &'a str,
    pub span: TextRange,
}

/// Starred: unpacking expression like *args in function calls
#[derive(Debug, Clone)]
pub struct StarredExpr<'a> {
    pub value: &'a Expr<'a>,
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct YieldExpr<'a> {
    pub value: Option<&'a Expr<'a>>,
    pub span: TextRange,
}

#[derive(Debug, Clone)]
pub struct YieldFromExpr<'a> {
    pub value: &'a Expr<'a>,
    pub span: TextRange,
}
