//! Integration tests for CX-IR emission.

use std::sync::Arc;

use hlx_codegen::CxEmitter;
use hlx_parser::diagnostics::DiagnosticEngine;
use hlx_parser::lexer::Lexer;
use hlx_parser::parser::Parser;
use hlx_source::SourceCache;

struct Emitted {
    engine: DiagnosticEngine,
    tokens: Vec<hlx_codegen::CxToken>,
    source: String,
    readable: String,
}

fn emit(source: &str) -> Emitted {
    let cache = Arc::new(SourceCache::new());
    cache.add("test.hlx", source);

    let engine = DiagnosticEngine::buffered(cache).without_color();
    let stream = Lexer::new(source, "test.hlx").tokenize(&engine).unwrap();

    let program = {
        let mut parser = Parser::new(&stream, &engine);
        parser.parse_program().unwrap()
    };

    let mut emitter = CxEmitter::new(&engine);
    emitter.emit_program(&program).unwrap();

    let ir_source = emitter.to_source();
    let readable = emitter.to_readable();
    let tokens = emitter.finish();

    Emitted { engine, tokens, source: ir_source, readable }
}

/// Whitespace-normalized IR text.
fn normalized(emitted: &Emitted) -> String {
    emitted.source.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[test]
fn trivial_function_lowers_to_cxx() {
    let emitted = emit("fn main() -> i32 { return 0; }");

    assert!(emitted.engine.is_empty(), "{:?}", emitted.engine.diagnostics());
    assert_eq!(normalized(&emitted), "i32 main ( ) { return 0 ; }");
}

#[test]
fn untyped_let_uses_auto() {
    let emitted = emit("fn f() { let x = 1; }");

    assert!(emitted.engine.is_empty());
    assert_eq!(normalized(&emitted), "void f ( ) { auto x = 1 ; }");
}

#[test]
fn typed_let_emits_the_type_first() {
    let emitted = emit("fn f() { let x: i32 = 42; }");
    assert_eq!(normalized(&emitted), "void f ( ) { i32 x = 42 ; }");
}

#[test]
fn self_lowers_to_deref_this() {
    let emitted = emit("class C { fn get(self) -> i32 { return self.v; } }");

    assert!(emitted.engine.is_empty(), "{:?}", emitted.engine.diagnostics());

    let text = normalized(&emitted);
    assert!(text.contains("( * this ) . v"), "{text}");
    // The receiver is stripped from the parameter list.
    assert!(text.contains("get ( )"), "{text}");
}

#[test]
fn class_members_get_access_markers() {
    let emitted = emit(
        "class C {\n  public fn a(self) { }\n  private fn b(self) { }\n  fn c(self) { }\n}",
    );

    let text = normalized(&emitted);
    assert!(text.contains("public : void a"), "{text}");
    assert!(text.contains("private : void b"), "{text}");
    // Default access is public.
    assert!(text.contains("public : void c"), "{text}");
    assert!(text.starts_with("class C {"), "{text}");
    assert!(text.ends_with("} ;"), "{text}");
}

#[test]
fn enum_lowers_to_enum_struct() {
    let emitted = emit("enum Color : u8 { Red = 1, Green }");

    assert_eq!(
        normalized(&emitted),
        "enum struct Color : u8 { Red = 1 , Green } ;"
    );
}

#[test]
fn unless_negates_the_condition() {
    let emitted = emit("fn f(ok: bool) { unless ok { return; } }");

    let text = normalized(&emitted);
    assert!(text.contains("if ( ! ( ok ) )"), "{text}");
}

#[test]
fn panic_lowers_to_throw() {
    let emitted = emit("fn f() { panic 1; }");
    assert!(normalized(&emitted).contains("throw 1 ;"));
}

#[test]
fn yield_and_await_lower_to_coroutines() {
    let emitted = emit("fn f() { yield 1; let x = await g(); }");

    let text = normalized(&emitted);
    assert!(text.contains("co_yield 1 ;"), "{text}");
    assert!(text.contains("co_await g ( )"), "{text}");
}

#[test]
fn cast_lowers_to_static_cast() {
    let emitted = emit("fn f() { let x = 1 as i64; }");
    assert!(normalized(&emitted).contains("static_cast < i64 > ( 1 )"));
}

#[test]
fn derives_test_lowers_to_is_base_of() {
    let emitted = emit("fn f() { let x = v derives Base; }");
    assert!(
        normalized(&emitted).contains("std :: is_base_of < Base , v > :: value"),
        "{}",
        normalized(&emitted)
    );
}

#[test]
fn ffi_cxx_import_becomes_include() {
    let emitted = emit("ffi \"c++\" import \"vector\";");

    assert!(emitted.engine.is_empty(), "{:?}", emitted.engine.diagnostics());
    assert!(emitted.source.contains("#include \"vector\""), "{}", emitted.source);
}

#[test]
fn interface_lowers_to_concept() {
    let emitted = emit("interface Shape {\n  fn area(self) -> f64;\n}");

    assert!(emitted.engine.is_empty(), "{:?}", emitted.engine.diagnostics());

    let text = normalized(&emitted);
    assert!(text.starts_with("template < typename Self > concept Shape ="), "{text}");
    assert!(text.contains("requires ( Self self )"), "{text}");
    assert!(text.contains("std :: same_as < f64 >"), "{text}");
    assert!(text.ends_with("true ;"), "{text}");
}

#[test]
fn interface_member_with_body_is_rejected() {
    let emitted = emit("interface I { fn f() { return; } }");

    // Exactly one Error diagnostic: the interface-member-body rejection.
    // In particular, no receiver warning fires for interface members.
    let diags = emitted.engine.diagnostics();
    assert_eq!(diags.len(), 1, "{diags:?}");
    assert_eq!(diags[0].code, 4002);
    assert!(!diags.iter().any(|d| d.code == 3004), "{diags:?}");

    // No IR is produced for the poisoned interface.
    assert!(emitted.tokens.is_empty(), "{:?}", emitted.tokens);
}

#[test]
fn unsupported_constructs_report_instead_of_emitting() {
    let emitted = emit("fn f() { let m = {1: 2}; }");

    let diags = emitted.engine.diagnostics();
    assert!(diags.iter().any(|d| d.code == 4001));
}

#[test]
fn operator_overload_emits_inline_forwarder() {
    let emitted = emit("op + fn add(a: i32, b: i32) -> i32 { return a + b; }");

    let text = normalized(&emitted);
    assert!(text.contains("inline i32 operator + ( i32 a , i32 b )"), "{text}");
    assert!(text.contains("return add ( a , b ) ;"), "{text}");
}

#[test]
fn module_lowers_to_namespace() {
    let emitted = emit("module a::b { fn f() { } }");

    let text = normalized(&emitted);
    assert!(text.starts_with("namespace a :: b {"), "{text}");
}

#[test]
fn emitted_ir_relexes_cleanly() {
    let sources = [
        "fn main() -> i32 { return 0; }",
        "class C { fn get(self) -> i32 { return self.v; } }",
        "enum E { A, B }",
        "module m { fn f(x: i32) -> i32 { return x * 2; } }",
    ];

    for source in sources {
        let emitted = emit(source);
        assert!(emitted.engine.is_empty(), "input: {source}");

        let cache = Arc::new(SourceCache::new());
        cache.add("ir.cxx", emitted.source.clone());
        let relex_engine = DiagnosticEngine::buffered(cache).without_color();

        let _ = Lexer::new(&emitted.source, "ir.cxx")
            .tokenize(&relex_engine)
            .unwrap();

        assert!(
            relex_engine.is_empty(),
            "re-lexing IR of {source} produced {:?}",
            relex_engine.diagnostics()
        );
    }
}

#[test]
fn readable_rendering_carries_line_hints() {
    let emitted = emit("fn main() -> i32 {\n  return 0;\n}");

    assert!(emitted.readable.contains("test.hlx:1"), "{}", emitted.readable);
    assert!(emitted.readable.contains("test.hlx:2"), "{}", emitted.readable);
}

#[test]
fn provenance_comment_is_optional_and_timestamped() {
    let cache = Arc::new(SourceCache::new());
    cache.add("test.hlx", "fn f() { }");

    let engine = DiagnosticEngine::buffered(cache).without_color();
    let stream = Lexer::new("fn f() { }", "test.hlx").tokenize(&engine).unwrap();
    let program = {
        let mut parser = Parser::new(&stream, &engine);
        parser.parse_program().unwrap()
    };

    let mut emitter = CxEmitter::new(&engine).with_provenance();
    emitter.emit_program(&program).unwrap();

    let text = emitter.to_source();
    assert!(text.contains("unix-timestamp"), "{text}");
}
