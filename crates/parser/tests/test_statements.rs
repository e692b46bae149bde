//! Integration tests for statement and expression shapes.

use aspy_parser::ast::*;
use aspy_parser::{Arena, Stmt, parse};

fn body<'a>(source: &str, arena: &'a Arena) -> &'a [Stmt<'a>] {
    match parse(source, arena) {
        Ok(module) => module.body,
        Err(error) => panic!("parse failed: {error}"),
    }
}

fn only_expr<'a>(source: &str, arena: &'a Arena) -> &'a Expr<'a> {
    match body(source, arena) {
        [Stmt::Expr(stmt)] => &stmt.value,
        other => panic!("expected one expression statement, got {other:?}"),
    }
}

#[test]
fn test_elif_chain_nests_in_orelse() {
    let arena = Arena::new();
    let source = "if a:\n    x = 1\nelif b:\n    x = 2\nelse:\n    x = 3\n";
    let Stmt::If(outer) = &body(source, &arena)[0] else {
        panic!("expected if");
    };
    let [Stmt::If(inner)] = outer.orelse else {
        panic!("expected nested if");
    };
    assert_eq!(inner.orelse.len(), 1);
}

#[test]
fn test_chained_assignment_keeps_all_targets() {
    let arena = Arena::new();
    let Stmt::Assign(assign) = &body("a = b = 3\n", &arena)[0] else {
        panic!("expected assignment");
    };
    assert_eq!(assign.targets.len(), 2);
}

#[test]
fn test_augmented_assignment_operator() {
    let arena = Arena::new();
    let Stmt::AugAssign(aug) = &body("a //= 2\n", &arena)[0] else {
        panic!("expected augmented assignment");
    };
    assert_eq!(aug.op, "//");
}

#[test]
fn test_tuple_unpacking_target() {
    let arena = Arena::new();
    let Stmt::Assign(assign) = &body("a, b = b, a\n", &arena)[0] else {
        panic!("expected assignment");
    };
    assert!(matches!(assign.targets[0], Expr::Tuple(_)));
    assert!(matches!(assign.value, Expr::Tuple(_)));
}

#[test]
fn test_loops_with_else() {
    let arena = Arena::new();
    let source = "for i in range(3):\n    pass\nelse:\n    x = 1\nwhile x:\n    break\nelse:\n    pass\n";
    let stmts = body(source, &arena);
    let Stmt::For(for_stmt) = &stmts[0] else {
        panic!("expected for");
    };
    assert_eq!(for_stmt.orelse.len(), 1);
    let Stmt::While(while_stmt) = &stmts[1] else {
        panic!("expected while");
    };
    assert!(matches!(while_stmt.body[0], Stmt::Break(_)));
}

#[test]
fn test_function_parameters_and_defaults() {
    let arena = Arena::new();
    let source = "def f(a, b=2, *, c=3):\n    return a\n";
    let Stmt::FuncDef(func) = &body(source, &arena)[0] else {
        panic!("expected function");
    };
    let params: Vec<_> = func
        .args
        .positional()
        .map(|(arg, default)| (arg.arg, default.is_some()))
        .collect();
    assert_eq!(params, vec![("a", false), ("b", true)]);
    assert_eq!(func.args.kwonlyargs.len(), 1);
}

#[test]
fn test_decorated_function() {
    let arena = Arena::new();
    let source = "@onevent\ndef button_forward():\n    pass\n";
    let Stmt::FuncDef(func) = &body(source, &arena)[0] else {
        panic!("expected function");
    };
    assert_eq!(func.name, "button_forward");
    assert!(matches!(func.decorators, [Expr::Name(NameExpr { id: "onevent", .. })]));
}

#[test]
fn test_imports() {
    let arena = Arena::new();
    let stmts = body("from clock import *\nimport clock\n", &arena);
    let Stmt::From(from) = &stmts[0] else {
        panic!("expected from-import");
    };
    assert_eq!(from.module, Some("clock"));
    assert_eq!(from.names, &[("*", None)]);
    assert_eq!(stmts[1].kind_name(), "Import");
}

#[test]
fn test_semicolons_and_single_line_suites() {
    let arena = Arena::new();
    let stmts = body("a = 1; b = 2\nif a: b = 3\n", &arena);
    assert_eq!(stmts.len(), 3);
    let Stmt::If(if_stmt) = &stmts[2] else {
        panic!("expected if");
    };
    assert_eq!(if_stmt.body.len(), 1);
}

#[test]
fn test_kind_names() {
    let arena = Arena::new();
    let stmts = body(
        "class A:\n    pass\ntry:\n    pass\nfinally:\n    pass\nassert x\n",
        &arena,
    );
    let kinds: Vec<_> = stmts.iter().map(Stmt::kind_name).collect();
    assert_eq!(kinds, vec!["ClassDef", "Try", "Assert"]);
}

#[test]
fn test_multiplication_binds_tighter_than_addition() {
    let arena = Arena::new();
    let Expr::BinOp(add) = only_expr("1 + 2 * 3\n", &arena) else {
        panic!("expected binop");
    };
    assert_eq!(add.op, "+");
    assert!(matches!(add.right, Expr::BinOp(BinOpExpr { op: "*", .. })));
}

#[test]
fn test_subtraction_is_left_associative() {
    let arena = Arena::new();
    let Expr::BinOp(sub) = only_expr("a - b - c\n", &arena) else {
        panic!("expected binop");
    };
    assert!(matches!(sub.left, Expr::BinOp(BinOpExpr { op: "-", .. })));
    assert!(matches!(sub.right, Expr::Name(_)));
}

#[test]
fn test_power_binds_tighter_than_unary_minus() {
    let arena = Arena::new();
    let Expr::UnaryOp(neg) = only_expr("-2 ** 2\n", &arena) else {
        panic!("expected unary");
    };
    assert_eq!(neg.op, "-");
    assert!(matches!(neg.operand, Expr::BinOp(BinOpExpr { op: "**", .. })));
}

#[test]
fn test_comparison_chain_is_one_node() {
    let arena = Arena::new();
    let Expr::Compare(cmp) = only_expr("a < b <= c\n", &arena) else {
        panic!("expected compare");
    };
    assert_eq!(cmp.ops, &["<", "<="]);
}

#[test]
fn test_not_in_and_is_not() {
    let arena = Arena::new();
    let Expr::Compare(cmp) = only_expr("a not in b\n", &arena) else {
        panic!("expected compare");
    };
    assert_eq!(cmp.ops, &["not in"]);
    let Expr::Compare(cmp) = only_expr("a is not None\n", &arena) else {
        panic!("expected compare");
    };
    assert_eq!(cmp.ops, &["is not"]);
}

#[test]
fn test_boolean_operator_precedence() {
    let arena = Arena::new();
    let Expr::BoolOp(or) = only_expr("a and b or not c\n", &arena) else {
        panic!("expected boolop");
    };
    assert_eq!(or.op, "or");
    assert!(matches!(or.values[0], Expr::BoolOp(BoolOpExpr { op: "and", .. })));
    assert!(matches!(or.values[1], Expr::UnaryOp(UnaryOpExpr { op: "not", .. })));
}

#[test]
fn test_call_with_keywords_and_attribute_callee() {
    let arena = Arena::new();
    let Expr::Call(call) = only_expr("robot.leds.top(32, 0, b=10)\n", &arena) else {
        panic!("expected call");
    };
    assert_eq!(call.args.len(), 2);
    assert_eq!(call.keywords[0].arg, Some("b"));
    assert!(matches!(call.func, Expr::Attribute(AttributeExpr { attr: "top", .. })));
}

#[test]
fn test_subscripts_and_slices() {
    let arena = Arena::new();
    let Expr::Subscript(sub) = only_expr("a[i + 1]\n", &arena) else {
        panic!("expected subscript");
    };
    assert!(matches!(sub.slice, Expr::BinOp(_)));

    let Expr::Subscript(sub) = only_expr("a[1:]\n", &arena) else {
        panic!("expected subscript");
    };
    let Expr::Slice(slice) = sub.slice else {
        panic!("expected slice");
    };
    assert!(slice.lower.is_some() && slice.upper.is_none());
}

#[test]
fn test_list_repetition_and_comprehension() {
    let arena = Arena::new();
    assert!(matches!(
        only_expr("[0] * 5\n", &arena),
        Expr::BinOp(BinOpExpr { op: "*", .. })
    ));
    let Expr::ListComp(comp) = only_expr("[x for x in y if x]\n", &arena) else {
        panic!("expected list comprehension");
    };
    assert_eq!(comp.generators[0].ifs.len(), 1);
}

#[test]
fn test_conditional_expression_and_lambda() {
    let arena = Arena::new();
    assert!(matches!(only_expr("a if b else c\n", &arena), Expr::IfExp(_)));
    let Expr::Lambda(lambda) = only_expr("lambda x, y=1: x + y\n", &arena) else {
        panic!("expected lambda");
    };
    assert_eq!(lambda.args.args.len(), 2);
    assert_eq!(lambda.args.defaults.len(), 1);
}

#[test]
fn test_dict_and_set_displays() {
    let arena = Arena::new();
    assert!(matches!(only_expr("{}\n", &arena), Expr::Dict(_)));
    assert!(matches!(only_expr("{1: 2}\n", &arena), Expr::Dict(_)));
    assert!(matches!(only_expr("{1, 2}\n", &arena), Expr::Set(_)));
}
