//! Integration tests for statement parsing.

use std::sync::Arc;

use hlx_ast::nodes::{Decl, ElseKind, IfKind, Stmt, SwitchCaseKind};
use hlx_parser::diagnostics::DiagnosticEngine;
use hlx_parser::lexer::Lexer;
use hlx_parser::parser::Parser;
use hlx_source::SourceCache;

fn parse(source: &str) -> (hlx_ast::nodes::Program, DiagnosticEngine) {
    let cache = Arc::new(SourceCache::new());
    cache.add("stmt.hlx", source);

    let engine = DiagnosticEngine::buffered(cache).without_color();
    let stream = Lexer::new(source, "stmt.hlx").tokenize(&engine).unwrap();

    let program = {
        let mut parser = Parser::new(&stream, &engine);
        parser.parse_program().unwrap()
    };

    (program, engine)
}

/// Parses a function wrapping the given body and returns its statements.
fn body_of(body: &str) -> Vec<Stmt> {
    let source = format!("fn probe() {{\n{body}\n}}");
    let (program, engine) = parse(&source);

    assert!(engine.is_empty(), "{body}: {:?}", engine.diagnostics());

    let Stmt::Decl(decl) = &program.children[0] else { panic!("expected decl") };
    let Decl::Func(func) = decl.as_ref() else { panic!("expected fn") };

    func.body.clone().expect("body").body
}

#[test]
fn if_unless_else_chain() {
    let stmts = body_of(
        "if a { return; } else if b { return; } else unless c { return; } else { return; }",
    );

    let Stmt::If(chain) = &stmts[0] else { panic!("expected if") };
    assert_eq!(chain.kind, IfKind::If);
    assert_eq!(chain.else_branches.len(), 3);
    assert_eq!(chain.else_branches[0].kind, ElseKind::ElseIf);
    assert_eq!(chain.else_branches[1].kind, ElseKind::ElseUnless);
    assert_eq!(chain.else_branches[2].kind, ElseKind::Else);
    assert!(chain.else_branches[2].condition.is_none());
}

#[test]
fn unless_statement_keeps_its_kind() {
    let stmts = body_of("unless done { return; }");

    let Stmt::If(stmt) = &stmts[0] else { panic!("expected unless") };
    assert_eq!(stmt.kind, IfKind::Unless);
}

#[test]
fn colon_suite_takes_one_statement() {
    let stmts = body_of("if ready: return;\nwhile busy: continue;");

    let Stmt::If(if_stmt) = &stmts[0] else { panic!("expected if") };
    assert_eq!(if_stmt.body.body.len(), 1);

    let Stmt::While(while_stmt) = &stmts[1] else { panic!("expected while") };
    assert_eq!(while_stmt.body.body.len(), 1);
}

#[test]
fn try_catch_finally_shape() {
    let stmts = body_of(
        "try { risky(); } catch (e: Error) { log(e); } catch { } finally { close(); }",
    );

    let Stmt::Try(try_stmt) = &stmts[0] else { panic!("expected try") };
    assert_eq!(try_stmt.catches.len(), 2);

    let first = &try_stmt.catches[0];
    assert_eq!(first.binding.as_ref().unwrap().name.name, "e");
    assert!(first.binding.as_ref().unwrap().ty.is_some());

    assert!(try_stmt.catches[1].binding.is_none());
    assert!(try_stmt.finally.is_some());
}

#[test]
fn switch_case_kinds_are_classified() {
    let stmts = body_of(
        "switch n {\n  case 1: fallthrough;\n  case 2 { return; }\n  default { }\n}",
    );

    let Stmt::Switch(switch) = &stmts[0] else { panic!("expected switch") };
    let kinds: Vec<SwitchCaseKind> = switch.cases.iter().map(|c| c.kind).collect();

    assert_eq!(kinds, vec![
        SwitchCaseKind::Fallthrough,
        SwitchCaseKind::Case,
        SwitchCaseKind::Default,
    ]);
}

#[test]
fn flow_keywords_produce_their_nodes() {
    let stmts = body_of(
        "yield 1;\nyield;\ndelete handle;\npanic failure();\nbreak;\ncontinue;\nreturn 7;",
    );

    assert!(matches!(&stmts[0], Stmt::Yield(y) if y.value.is_some()));
    assert!(matches!(&stmts[1], Stmt::Yield(y) if y.value.is_none()));
    assert!(matches!(&stmts[2], Stmt::Delete(_)));
    assert!(matches!(&stmts[3], Stmt::Panic(_)));
    assert!(matches!(&stmts[4], Stmt::Break(_)));
    assert!(matches!(&stmts[5], Stmt::Continue(_)));
    assert!(matches!(&stmts[6], Stmt::Return(r) if r.value.is_some()));
}

#[test]
fn alias_statement_binds_name_to_path() {
    let stmts = body_of("alias Short = very::long::path;");

    let Stmt::Alias(alias) = &stmts[0] else { panic!("expected alias") };
    assert_eq!(alias.name.name, "Short");
}

#[test]
fn nested_blocks_parse_as_suites() {
    let stmts = body_of("{ { return; } }");

    let Stmt::Suite(outer) = &stmts[0] else { panic!("expected suite") };
    assert!(matches!(&outer.body[0], Stmt::Suite(_)));
}

#[test]
fn c_style_for_with_empty_init() {
    let stmts = body_of("for ; running; tick() { }");

    let Stmt::For(for_stmt) = &stmts[0] else { panic!("expected for") };
    let hlx_ast::nodes::ForCore::C(core) = &for_stmt.core else { panic!("expected C core") };

    assert!(core.init.is_none());
    assert!(core.condition.is_some());
    assert!(core.update.is_some());
}

#[test]
fn python_for_with_multiple_typed_vars() {
    let stmts = body_of("for k: str, v: i32 in entries { }");

    let Stmt::For(for_stmt) = &stmts[0] else { panic!("expected for") };
    let hlx_ast::nodes::ForCore::Python(core) = &for_stmt.core else {
        panic!("expected python core")
    };

    assert_eq!(core.vars.len(), 2);
    assert!(core.vars.iter().all(|var| var.ty.is_some()));
}

#[test]
fn compiler_directives_become_annotations() {
    let (program, engine) = parse("#[layout(packed)]\nstruct S { }\n");
    assert!(engine.is_empty(), "{:?}", engine.diagnostics());

    assert!(matches!(&program.children[0], Stmt::Annotation(_)));
    assert!(matches!(&program.children[1], Stmt::Decl(_)));
}

#[test]
fn expression_statements_require_semicolons() {
    let (_, engine) = parse("fn f() { g() }");

    let diags = engine.diagnostics();
    assert!(diags.iter().any(|d| d.code == 3002), "{diags:?}");
}
