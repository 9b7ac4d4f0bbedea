//! Integration tests for expression parsing.

use std::sync::Arc;

use hlx_ast::nodes::{
    AsyncKind,
    Decl,
    Expr,
    InstOfOp,
    Stmt,
    TernaryKind,
    Ty,
    UnaryFixity,
    UnaryOp,
};
use hlx_parser::diagnostics::DiagnosticEngine;
use hlx_parser::lexer::Lexer;
use hlx_parser::parser::Parser;
use hlx_source::SourceCache;

fn parse(source: &str) -> (hlx_ast::nodes::Program, DiagnosticEngine) {
    let cache = Arc::new(SourceCache::new());
    cache.add("expr.hlx", source);

    let engine = DiagnosticEngine::buffered(cache).without_color();
    let stream = Lexer::new(source, "expr.hlx").tokenize(&engine).unwrap();

    let program = {
        let mut parser = Parser::new(&stream, &engine);
        parser.parse_program().unwrap()
    };

    (program, engine)
}

/// Parses `let probe = <expr>;` and returns the initializer.
fn expr_of(source_expr: &str) -> Expr {
    let source = format!("let probe = {source_expr};");
    let (program, engine) = parse(&source);

    assert!(engine.is_empty(), "{source_expr}: {:?}", engine.diagnostics());

    let Stmt::Decl(decl) = &program.children[0] else { panic!("expected decl") };
    let Decl::Let(binding) = decl.as_ref() else { panic!("expected let") };

    binding.vars[0].value.clone().expect("initializer")
}

#[test]
fn scope_paths_collapse_to_identifiers_when_single() {
    assert!(matches!(expr_of("x"), Expr::Ident(_)));

    let Expr::Scope(path) = expr_of("std::io::print") else { panic!("expected path") };
    assert_eq!(path.qualified_name(), "std::io::print");
}

#[test]
fn dot_chains_are_left_nested() {
    let Expr::Dot(outer) = expr_of("a.b.c") else { panic!("expected dot") };
    assert!(matches!(outer.lhs.as_ref(), Expr::Dot(_)));
    assert!(matches!(outer.rhs.as_ref(), Expr::Ident(_)));
}

#[test]
fn calls_chain_through_paths_and_indexing() {
    let Expr::Call(call) = expr_of("table[3].lookup(key)") else { panic!("expected call") };
    assert_eq!(call.args.len(), 1);

    let Expr::Dot(path) = call.path.as_ref() else { panic!("expected dot path") };
    assert!(matches!(path.lhs.as_ref(), Expr::Index(_)));
}

#[test]
fn named_arguments_are_recognized_in_calls() {
    let Expr::Call(call) = expr_of("make(width = 3, 4)") else { panic!("expected call") };

    assert!(matches!(call.args[0], Expr::NamedArg(_)));
    assert!(matches!(call.args[1], Expr::Literal(_)));
}

#[test]
fn unary_operators_nest() {
    let Expr::Unary(neg) = expr_of("-~x") else { panic!("expected unary") };
    assert_eq!(neg.op, UnaryOp::Neg);
    assert_eq!(neg.fixity, UnaryFixity::Prefix);

    let Expr::Unary(inner) = neg.operand.as_ref() else { panic!("expected nested unary") };
    assert_eq!(inner.op, UnaryOp::BitNot);
}

#[test]
fn collection_literals_disambiguate() {
    assert!(matches!(expr_of("[1, 2, 3]"), Expr::ArrayLiteral(_)));
    assert!(matches!(expr_of("(1, 2)"), Expr::TupleLiteral(_)));
    assert!(matches!(expr_of("(1)"), Expr::Paren(_)));
    assert!(matches!(expr_of("{1, 2}"), Expr::SetLiteral(_)));
    assert!(matches!(expr_of("{1: 2, 3: 4}"), Expr::MapLiteral(_)));
    assert!(matches!(expr_of("{.x = 1, .y = 2}"), Expr::ObjInit(_)));
}

#[test]
fn object_initializer_records_field_names() {
    let Expr::ObjInit(init) = expr_of("{.x = 1, .y = 2}") else { panic!() };

    let names: Vec<&str> = init.fields.iter().map(|f| f.name.name.as_str()).collect();
    assert_eq!(names, vec!["x", "y"]);
}

#[test]
fn both_ternary_surfaces_parse() {
    let Expr::Ternary(question) = expr_of("c ? 1 : 2") else { panic!() };
    assert_eq!(question.kind, TernaryKind::Question);

    let Expr::Ternary(if_else) = expr_of("1 if c else 2") else { panic!() };
    assert_eq!(if_else.kind, TernaryKind::IfElse);
    assert!(matches!(if_else.condition.as_ref(), Expr::Ident(_)));
    assert!(matches!(if_else.if_true.as_ref(), Expr::Literal(_)));
}

#[test]
fn casts_and_instance_tests_chain_postfix() {
    let Expr::Cast(cast) = expr_of("x as i64") else { panic!() };
    assert!(matches!(cast.ty, Ty::Path(_)));

    let Expr::InstOf(has) = expr_of("x has List<i32>") else { panic!() };
    assert_eq!(has.op, InstOfOp::Has);

    let Ty::Path(path) = &has.ty else { panic!() };
    assert!(path.generics.is_some());
}

#[test]
fn await_binds_tighter_than_binary_operators() {
    let Expr::Binary(add) = expr_of("await f() + 1") else { panic!("expected binary") };

    let Expr::Async(awaited) = add.lhs.as_ref() else { panic!("expected await") };
    assert_eq!(awaited.kind, AsyncKind::Await);
    assert!(matches!(awaited.value.as_ref(), Expr::Call(_)));
}

#[test]
fn lambda_expression_parses_params_and_body() {
    let Expr::Lambda(lambda) = expr_of("fn (a, b) { return a; }") else {
        panic!("expected lambda")
    };

    assert_eq!(lambda.params.len(), 2);
    assert_eq!(lambda.body.body.len(), 1);
}

#[test]
fn range_operators_sit_at_lowest_precedence() {
    let Expr::Binary(range) = expr_of("0 .. n + 1") else { panic!() };

    assert_eq!(range.op.as_str(), "..");
    // `n + 1` bound before the range folds.
    assert!(matches!(range.rhs.as_ref(), Expr::Binary(_)));
}

#[test]
fn comparison_chains_fold_left() {
    let Expr::Binary(outer) = expr_of("a == b == c") else { panic!() };
    assert_eq!(outer.op.as_str(), "==");
    assert!(matches!(outer.lhs.as_ref(), Expr::Binary(_)));
}

#[test]
fn node_locations_cover_their_tokens() {
    let expr = expr_of("first + second");
    let loc = expr.loc();

    // `let probe = ` is 12 columns; the expression spans the rest.
    assert_eq!(loc.column, 13);
    assert_eq!(loc.length as usize, "first + second".len());
}

#[test]
fn global_scope_prefix_is_preserved() {
    let Expr::Scope(path) = expr_of("::core::size") else { panic!() };

    assert_eq!(path.segments[0].name, "");
    assert_eq!(path.qualified_name(), "::core::size");
}
