//! Integration tests for the parser.

use std::sync::Arc;

use hlx_ast::modifiers::ModifierKind;
use hlx_ast::nodes::{Decl, Expr, ForCore, LiteralKind, Stmt};
use hlx_parser::diagnostics::DiagnosticEngine;
use hlx_parser::lexer::Lexer;
use hlx_parser::parser::Parser;
use hlx_source::SourceCache;

fn parse(source: &str) -> (hlx_ast::nodes::Program, DiagnosticEngine) {
    let cache = Arc::new(SourceCache::new());
    cache.add("test.hlx", source);

    let engine = DiagnosticEngine::buffered(cache).without_color();
    let stream = Lexer::new(source, "test.hlx").tokenize(&engine).unwrap();

    let program = {
        let mut parser = Parser::new(&stream, &engine);
        parser.parse_program().unwrap()
    };

    (program, engine)
}

fn first_decl(program: &hlx_ast::nodes::Program) -> &Decl {
    match &program.children[0] {
        Stmt::Decl(decl) => decl,
        other => panic!("expected a declaration, got {other}"),
    }
}

#[test]
fn trivial_function() {
    let (program, engine) = parse("fn main() -> i32 { return 0; }");

    assert!(engine.is_empty(), "{:?}", engine.diagnostics());
    assert_eq!(program.children.len(), 1);

    let Decl::Func(func) = first_decl(&program) else { panic!("expected a function") };
    assert_eq!(func.name.name, "main");
    assert!(func.params.is_empty());
    assert!(func.returns.is_some());

    let body = func.body.as_ref().unwrap();
    assert_eq!(body.body.len(), 1);
    assert!(matches!(body.body[0], Stmt::Return(_)));
}

#[test]
fn missing_semicolon_reports_with_quick_fix() {
    let (_, engine) = parse("let x: i32 = 42\n");

    let diags = engine.diagnostics();
    assert_eq!(diags.len(), 1);

    let diag = &diags[0];
    assert_eq!(diag.code, 3002);
    assert_eq!(diag.line, 1);
    assert_eq!(diag.col, 16);
    assert_eq!(diag.offset, 1);
    assert_eq!(diag.quick_fix.len(), 1);
    assert_eq!(diag.quick_fix[0].fix, ";");
    assert_eq!(diag.quick_fix[0].loc, 16);
}

#[test]
fn self_and_static_conflict() {
    let (_, engine) = parse("class C { static fn f(self) { } }");

    let diags = engine.diagnostics();
    let conflict: Vec<_> = diags.iter().filter(|d| d.code == 3005).collect();
    assert_eq!(conflict.len(), 1);
    assert_eq!(conflict[0].col, 23); // the `self` token
}

#[test]
fn method_without_self_or_static_warns_and_synthesizes_static() {
    let (program, engine) = parse("class C { fn f() { } }");

    let diags = engine.diagnostics();
    assert!(diags.iter().any(|d| d.code == 3004));
    assert!(!engine.has_errored());

    let Decl::Class(class) = first_decl(&program) else { panic!("expected a class") };
    let body = class.body.as_ref().unwrap();
    let Stmt::Decl(member) = &body.body[0] else { panic!("expected a member") };
    let Decl::Func(func) = member.as_ref() else { panic!("expected a function") };

    assert!(func.modifiers.contains(ModifierKind::Static));
}

#[test]
fn self_method_is_accepted_silently() {
    let (_, engine) = parse("class C { fn area(self) -> f64 { return 0.0; } }");
    assert!(engine.is_empty(), "{:?}", engine.diagnostics());
}

#[test]
fn interface_forward_declaration_is_rejected() {
    let (_, engine) = parse("interface I;");

    let diags = engine.diagnostics();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, 3007);
}

#[test]
fn invalid_modifier_for_declaration() {
    let (_, engine) = parse("inline class C { }");

    let diags = engine.diagnostics();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, 3003);
    assert!(diags[0].msg.contains("inline"));
    assert_eq!(diags[0].col, 1); // at the modifier's token
}

#[test]
fn precedence_follows_the_table() {
    let (program, engine) = parse("let x = 1 + 2 * 3;");
    assert!(engine.is_empty());

    let Decl::Let(decl) = first_decl(&program) else { panic!("expected let") };
    let Some(Expr::Binary(add)) = decl.vars[0].value.as_ref() else {
        panic!("expected a binary expression")
    };

    assert_eq!(add.op.as_str(), "+");

    let Expr::Binary(mul) = add.rhs.as_ref() else { panic!("expected nested mul") };
    assert_eq!(mul.op.as_str(), "*");
}

#[test]
fn binary_operators_are_left_associative() {
    let (program, engine) = parse("let x = 1 - 2 - 3;");
    assert!(engine.is_empty());

    let Decl::Let(decl) = first_decl(&program) else { panic!("expected let") };
    let Some(Expr::Binary(outer)) = decl.vars[0].value.as_ref() else {
        panic!("expected a binary expression")
    };

    // (1 - 2) - 3
    assert!(matches!(outer.lhs.as_ref(), Expr::Binary(_)));
    assert!(matches!(outer.rhs.as_ref(), Expr::Literal(_)));
}

#[test]
fn for_loop_duality() {
    let (program, engine) = parse(
        "fn f() {\n  for x in items { }\n  for let i: i32 = 0; i < 10; i += 1 { }\n}",
    );
    assert!(engine.is_empty(), "{:?}", engine.diagnostics());

    let Decl::Func(func) = first_decl(&program) else { panic!("expected fn") };
    let body = &func.body.as_ref().unwrap().body;

    let Stmt::For(python) = &body[0] else { panic!("expected for") };
    assert!(matches!(python.core, ForCore::Python(_)));

    let Stmt::For(c_style) = &body[1] else { panic!("expected for") };
    assert!(matches!(c_style.core, ForCore::C(_)));
}

#[test]
fn generic_call_disambiguates_from_less_than() {
    let (program, engine) = parse("let a = max<i32>(1, 2);\nlet b = x < y;");
    assert!(engine.is_empty(), "{:?}", engine.diagnostics());

    let Decl::Let(with_generics) = first_decl(&program) else { panic!() };
    let Some(Expr::Call(call)) = with_generics.vars[0].value.as_ref() else {
        panic!("expected a call")
    };
    assert!(call.generics.is_some());
    assert_eq!(call.args.len(), 2);

    let Stmt::Decl(second) = &program.children[1] else { panic!() };
    let Decl::Let(comparison) = second.as_ref() else { panic!() };
    let Some(Expr::Binary(cmp)) = comparison.vars[0].value.as_ref() else {
        panic!("expected a comparison")
    };
    assert_eq!(cmp.op.as_str(), "<");
}

#[test]
fn speculative_generics_leave_no_diagnostics() {
    let (_, engine) = parse("let b = x < y;");
    assert!(engine.is_empty(), "{:?}", engine.diagnostics());
}

#[test]
fn literals_carry_their_kind() {
    let (program, engine) = parse("let v = [1, 2.5, \"s\", 'c', true, null];");
    assert!(engine.is_empty());

    let Decl::Let(decl) = first_decl(&program) else { panic!() };
    let Some(Expr::ArrayLiteral(array)) = decl.vars[0].value.as_ref() else { panic!() };

    let kinds: Vec<LiteralKind> = array
        .values
        .iter()
        .map(|value| match value {
            Expr::Literal(lit) => lit.kind,
            other => panic!("expected literal, got {other}"),
        })
        .collect();

    assert_eq!(kinds, vec![
        LiteralKind::Int,
        LiteralKind::Float,
        LiteralKind::Str,
        LiteralKind::Char,
        LiteralKind::Bool,
        LiteralKind::Null,
    ]);
}

#[test]
fn ternary_and_instance_tests() {
    let (program, engine) =
        parse("let a = x ? 1 : 2;\nlet b = v has i32;\nlet c = v derives Base;");
    assert!(engine.is_empty(), "{:?}", engine.diagnostics());

    let Decl::Let(ternary) = first_decl(&program) else { panic!() };
    assert!(matches!(ternary.vars[0].value, Some(Expr::Ternary(_))));

    let Stmt::Decl(second) = &program.children[1] else { panic!() };
    let Decl::Let(has) = second.as_ref() else { panic!() };
    assert!(matches!(has.vars[0].value, Some(Expr::InstOf(_))));
}

#[test]
fn switch_with_case_default_and_fallthrough() {
    let source = "fn f(x: i32) {\n  switch x {\n    case 1: fallthrough;\n    case 2 { return; }\n    default { break; }\n  }\n}";
    let (program, engine) = parse(source);
    assert!(engine.is_empty(), "{:?}", engine.diagnostics());

    let Decl::Func(func) = first_decl(&program) else { panic!() };
    let Stmt::Switch(switch) = &func.body.as_ref().unwrap().body[0] else {
        panic!("expected switch")
    };

    assert_eq!(switch.cases.len(), 3);
}

#[test]
fn error_recovery_continues_at_statement_boundary() {
    let (program, engine) = parse("let = 5;\nlet y: i32 = 1;");

    // The first statement is bad, the second must still parse.
    assert!(engine.has_errored());
    assert!(
        program
            .children
            .iter()
            .any(|stmt| matches!(stmt, Stmt::Decl(d) if matches!(d.as_ref(), Decl::Let(l) if l.vars.first().is_some_and(|v| v.var.name.name == "y"))))
    );
}

#[test]
fn namespace_depth_balances_across_modules() {
    let (_, engine) = parse("module a::b {\n  module c {\n    fn f() { }\n  }\n}\n");
    assert!(engine.is_empty(), "{:?}", engine.diagnostics());
}

#[test]
fn module_and_operator_declarations() {
    let source = "module geo {\n  class Vec {\n    op + fn add(self, other: Vec) -> Vec { return other; }\n  }\n}";
    let (program, engine) = parse(source);
    assert!(engine.is_empty(), "{:?}", engine.diagnostics());

    let Decl::Module(module) = first_decl(&program) else { panic!("expected module") };
    assert_eq!(module.name.as_ref().unwrap().qualified_name(), "geo");
}

#[test]
fn enum_with_underlying_type() {
    let (program, engine) = parse("enum Color : u8 { Red = 1, Green, Blue, }");
    assert!(engine.is_empty(), "{:?}", engine.diagnostics());

    let Decl::Enum(decl) = first_decl(&program) else { panic!("expected enum") };
    assert_eq!(decl.members.len(), 3);
    assert!(decl.derives.is_some());
    assert!(decl.members[0].value.is_some());
    assert!(decl.members[1].value.is_none());
}
