//! Integration tests for diagnostic rendering and ordering.

use std::sync::Arc;

use hlx_parser::diagnostics::{CodeError, DiagnosticEngine, EngineError, Level};
use hlx_parser::lexer::Lexer;
use hlx_parser::parser::Parser;
use hlx_source::{Location, SourceCache};

fn engine_for(path: &str, source: &str) -> DiagnosticEngine {
    let cache = Arc::new(SourceCache::new());
    cache.add(path, source);

    DiagnosticEngine::buffered(cache).without_color()
}

fn parse_with(engine: &DiagnosticEngine, path: &str, source: &str) {
    let stream = Lexer::new(source, path).tokenize(engine).unwrap();
    let mut parser = Parser::new(&stream, engine);
    let _ = parser.parse_program().unwrap();
}

#[test]
fn missing_semicolon_renders_caret_and_quick_fix() {
    let source = "let x: i32 = 42\n";
    let engine = engine_for("scene.hlx", source);
    parse_with(&engine, "scene.hlx", source);

    let rendered = engine.render_all().unwrap();

    assert!(rendered.contains("error: missing a semicolon"), "{rendered}");
    assert!(rendered.contains("scene.hlx"), "{rendered}");

    // The failing line with the fix inserted, a caret under column 16 and a
    // `+` under the inserted semicolon.
    assert!(rendered.contains("let x: i32 = 42 ;"), "{rendered}");
    assert!(rendered.contains("^+"), "{rendered}");
    assert!(rendered.contains("fix: insert `;`"), "{rendered}");
}

#[test]
fn context_window_is_centered_and_bounded() {
    let source = "fn a() { }\nfn b() { }\nfn c() { }\nlet bad = ;\nfn d() { }\nfn e() { }\nfn f() { }\n";
    let engine = engine_for("ctx.hlx", source);
    parse_with(&engine, "ctx.hlx", source);

    let rendered = engine.render_all().unwrap();

    // Window of five lines centered on line 4: lines 2 through 6.
    assert!(rendered.contains("fn b"), "{rendered}");
    assert!(rendered.contains("fn e"), "{rendered}");
    assert!(!rendered.contains("fn a"), "{rendered}");
    assert!(!rendered.contains("fn f"), "{rendered}");
}

#[test]
fn diagnostics_are_ordered_left_to_right() {
    // Two malformed bindings on separate lines; each recovers at its `;`.
    let source = "let = 1;\nlet = 2;\n";
    let engine = engine_for("ord.hlx", source);
    parse_with(&engine, "ord.hlx", source);

    let diags = engine.diagnostics();
    assert!(diags.len() >= 2, "{diags:?}");

    let mut lines: Vec<u32> = diags.iter().map(|d| d.line).collect();
    let sorted = {
        let mut copy = lines.clone();
        copy.sort_unstable();
        copy
    };

    assert_eq!(lines, sorted, "diagnostics must keep failure order");
    lines.dedup();
    assert!(lines.len() >= 2);
}

#[test]
fn missing_source_line_is_an_internal_error() {
    let cache = Arc::new(SourceCache::new());
    let engine = DiagnosticEngine::buffered(cache).without_color();

    // A token pointing into a file the cache has never seen.
    let pof = hlx_parser::token::Token::new(
        hlx_parser::token::TokenKind::Identifier,
        "ghost",
        Location::new("/nonexistent/ghost.hlx", 3, 1, 10, 5),
    );

    let _ = engine.report(CodeError::new(&pof, 3001).arg("token", "ghost")).unwrap();

    let err = engine.render_all().unwrap_err();
    assert!(matches!(err, EngineError::MissingLine { line: 3, .. }));
}

#[test]
fn fatal_diagnostics_report_their_level() {
    let source = "let s = \"unterminated\n";
    let engine = engine_for("fatal.hlx", source);

    let _ = Lexer::new(source, "fatal.hlx").tokenize(&engine).unwrap();

    let diags = engine.diagnostics();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].level, Level::Fatal);
    assert_eq!(diags[0].code, 1002);

    let rendered = engine.render_all().unwrap();
    assert!(rendered.contains("fatal"), "{rendered}");
}

#[test]
fn indent_prefixes_every_rendered_line() {
    let source = "let x = 1\n";
    let engine = engine_for("ind.hlx", source);

    let stream = Lexer::new(source, "ind.hlx").tokenize(&engine).unwrap();
    let pof = stream.tokens()[3].clone(); // the literal

    let _ = engine
        .report(CodeError::new(&pof, 3001).arg("token", "1").indent(2))
        .unwrap();

    let rendered = engine.render_all().unwrap();
    for line in rendered.lines().filter(|line| !line.is_empty()) {
        assert!(line.starts_with("        "), "line not indented: {line:?}");
    }
}

#[test]
fn serialized_diagnostics_expose_the_contract_fields() {
    let source = "let x: i32 = 42\n";
    let engine = engine_for("ser.hlx", source);
    parse_with(&engine, "ser.hlx", source);

    let json: serde_json::Value = serde_json::from_str(&engine.to_json()).unwrap();
    let record = &json.as_array().unwrap()[0];

    assert_eq!(record["error_type"], "code");
    assert_eq!(record["level"], "error");
    assert_eq!(record["line"], 1);
    assert_eq!(record["col"], 16);
    assert_eq!(record["quick_fix"][0]["fix"], ";");
    assert_eq!(record["quick_fix"][0]["loc"], 16);
    assert!(record["file"].as_str().unwrap().contains("ser.hlx"));
}
