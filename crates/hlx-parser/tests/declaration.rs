//! Integration tests for declaration parsing.

use std::sync::Arc;

use hlx_ast::modifiers::{AccessSpecifier, ModifierKind};
use hlx_ast::nodes::{Decl, Stmt, Ty};
use hlx_parser::diagnostics::DiagnosticEngine;
use hlx_parser::lexer::Lexer;
use hlx_parser::parser::Parser;
use hlx_source::SourceCache;

fn parse(source: &str) -> (hlx_ast::nodes::Program, DiagnosticEngine) {
    let cache = Arc::new(SourceCache::new());
    cache.add("decl.hlx", source);

    let engine = DiagnosticEngine::buffered(cache).without_color();
    let stream = Lexer::new(source, "decl.hlx").tokenize(&engine).unwrap();

    let program = {
        let mut parser = Parser::new(&stream, &engine);
        parser.parse_program().unwrap()
    };

    (program, engine)
}

fn decl_of(source: &str) -> Decl {
    let (program, engine) = parse(source);
    assert!(engine.is_empty(), "{source}: {:?}", engine.diagnostics());

    match &program.children[0] {
        Stmt::Decl(decl) => decl.as_ref().clone(),
        other => panic!("expected a declaration, got {other}"),
    }
}

#[test]
fn function_with_generics_and_bounds() {
    let Decl::Func(func) = decl_of(
        "fn largest<T>(xs: [T]) -> T requires T derives Comparable { return xs[0]; }",
    ) else {
        panic!("expected fn")
    };

    let generics = func.generics.expect("generics");
    assert_eq!(generics.params.params.len(), 1);
    assert_eq!(generics.params.params[0].var.name.name, "T");
    assert!(generics.params.params[0].var.ty.is_none());

    let bounds = generics.bounds.expect("bounds");
    assert_eq!(bounds.bounds.len(), 1);
}

#[test]
fn const_generic_parameter() {
    let Decl::Func(func) = decl_of("fn zeroed<const N: usize>() -> [i32; N] { }") else {
        panic!("expected fn")
    };

    let generics = func.generics.expect("generics");
    assert!(generics.params.params[0].is_const);
    assert!(generics.params.params[0].var.ty.is_some());

    assert!(matches!(func.returns, Some(Ty::Array(_))));
}

#[test]
fn parameters_accept_defaults() {
    let Decl::Func(func) = decl_of("fn pad(text: str, width: i32 = 80) { }") else {
        panic!("expected fn")
    };

    assert_eq!(func.params.len(), 2);
    assert!(func.params[0].value.is_none());
    assert!(func.params[1].value.is_some());
}

#[test]
fn let_binds_multiple_variables() {
    let Decl::Let(decl) = decl_of("let a: i32 = 1, b = 2, c: f64;") else {
        panic!("expected let")
    };

    assert_eq!(decl.vars.len(), 3);
    assert!(decl.vars[0].var.ty.is_some());
    assert!(decl.vars[1].var.ty.is_none());
    assert!(decl.vars[2].value.is_none());
}

#[test]
fn const_binding_keeps_its_own_declaration_kind() {
    assert!(matches!(decl_of("const LIMIT: i32 = 100;"), Decl::Const(_)));
    // `const fn` is a modifier use, not a const binding.
    assert!(matches!(decl_of("const fn pure() { }"), Decl::Func(_)));
}

#[test]
fn class_with_derive_list_and_access() {
    let Decl::Class(class) =
        decl_of("class Circle derives public Shape, private Counted { }")
    else {
        panic!("expected class")
    };

    let derives = class.derives.expect("derives");
    assert_eq!(derives.derives.len(), 2);
    assert_eq!(derives.derives[0].1, AccessSpecifier::Public);
    assert_eq!(derives.derives[1].1, AccessSpecifier::Private);
}

#[test]
fn struct_members_escape_the_receiver_rules() {
    // The self/static rules bind class members only: a struct method with
    // neither `self` nor `static` is fine and nothing is synthesized.
    let Decl::Struct(decl) = decl_of(
        "struct Point {\n  fn norm(self) -> f64 { }\n  fn origin() -> Point { }\n}",
    ) else {
        panic!("expected struct")
    };

    let body = decl.body.expect("body");

    let Stmt::Decl(first) = &body.body[0] else { panic!("expected member") };
    let Decl::Func(norm) = first.as_ref() else { panic!("expected fn member") };
    assert!(norm.takes_self());

    let Stmt::Decl(second) = &body.body[1] else { panic!("expected member") };
    let Decl::Func(origin) = second.as_ref() else { panic!("expected fn member") };
    assert!(!origin.takes_self());
    assert!(!origin.modifiers.contains(ModifierKind::Static));
}

#[test]
fn type_alias_with_generics() {
    let Decl::TypeAlias(alias) = decl_of("type Pairs<T> = [(str, T)];") else {
        panic!("expected alias")
    };

    assert_eq!(alias.name.name, "Pairs");
    assert!(alias.generics.is_some());
    assert!(matches!(alias.value, Ty::Array(_)));
}

#[test]
fn ffi_block_wraps_imports() {
    let Decl::Ffi(ffi) =
        decl_of("ffi \"c++\" {\n  import \"vector\";\n  import \"string\";\n}")
    else {
        panic!("expected ffi")
    };

    assert_eq!(ffi.abi.value, "\"c++\"");

    let Stmt::Block(block) = ffi.value.as_ref() else { panic!("expected block") };
    assert_eq!(block.body.len(), 2);
    assert!(block.body.iter().all(|stmt| matches!(stmt, Stmt::SingleImport(_))));
}

#[test]
fn operator_declaration_captures_tokens() {
    let Decl::Op(op) = decl_of("op == fn eq(a: i32, b: i32) -> bool { return a == b; }")
    else {
        panic!("expected op")
    };

    assert_eq!(op.op, vec!["=="]);
    assert_eq!(op.func.name.name, "eq");
}

#[test]
fn anonymous_module_has_no_name() {
    let Decl::Module(module) = decl_of("module { let hidden: i32 = 1; }") else {
        panic!("expected module")
    };

    assert!(module.name.is_none());
    assert_eq!(module.body.body.len(), 1);
}

#[test]
fn modifier_bags_validate_per_declaration() {
    // `static` is legal on classes but `eval` is not.
    let (_, engine) = parse("static class S { }\neval enum E { A }\n");

    let diags = engine.diagnostics();
    let invalid: Vec<_> = diags.iter().filter(|d| d.code == 3003).collect();

    assert_eq!(invalid.len(), 1, "{diags:?}");
    assert!(invalid[0].msg.contains("eval"));
}

#[test]
fn access_modifiers_attach_to_members() {
    let Decl::Class(class) = decl_of(
        "class C {\n  public fn a(self) { }\n  protected fn b(self) { }\n}",
    ) else {
        panic!("expected class")
    };

    let body = class.body.expect("body");
    let accesses: Vec<Option<AccessSpecifier>> = body
        .body
        .iter()
        .map(|stmt| match stmt {
            Stmt::Decl(decl) => match decl.as_ref() {
                Decl::Func(func) => func.modifiers.access(),
                _ => None,
            },
            _ => None,
        })
        .collect();

    assert_eq!(accesses, vec![
        Some(AccessSpecifier::Public),
        Some(AccessSpecifier::Protected),
    ]);
}

#[test]
fn inline_async_functions_keep_modifiers() {
    let Decl::Func(func) = decl_of("inline async fn fetch() { }") else {
        panic!("expected fn")
    };

    assert!(func.modifiers.contains(ModifierKind::Inline));
    assert!(func.modifiers.contains(ModifierKind::Async));
}

#[test]
fn enum_members_span_values_and_bare_names() {
    let Decl::Enum(decl) = decl_of("enum Flags { A = 1, B = 2, C }") else {
        panic!("expected enum")
    };

    assert!(decl.derives.is_none());
    assert_eq!(decl.members.len(), 3);
    assert!(decl.members[2].value.is_none());
}
