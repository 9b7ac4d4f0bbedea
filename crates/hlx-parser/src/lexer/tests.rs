//! Unit tests for the scanner.

use std::sync::Arc;

use hlx_source::SourceCache;

use super::*;
use crate::diagnostics::DiagnosticEngine;

fn lex(source: &str) -> (TokenStream, DiagnosticEngine) {
    let cache = Arc::new(SourceCache::new());
    cache.add("test.hlx", source);

    let engine = DiagnosticEngine::buffered(cache).without_color();
    let stream = Lexer::new(source, "test.hlx").tokenize(&engine).unwrap();

    (stream, engine)
}

fn kinds(stream: &TokenStream) -> Vec<TokenKind> {
    stream.tokens().iter().map(|t| t.kind).collect()
}

#[test]
fn simple_declaration() {
    let (stream, engine) = lex("let x: i32 = 42;");

    assert!(engine.is_empty());
    assert_eq!(kinds(&stream), vec![
        TokenKind::Let,
        TokenKind::Identifier,
        TokenKind::Colon,
        TokenKind::Identifier,
        TokenKind::Assign,
        TokenKind::IntLiteral,
        TokenKind::Semicolon,
        TokenKind::EndOfFile,
    ]);
}

#[test]
fn values_are_byte_exact() {
    let source = "fn main() -> i32 { return 0; }\nlet s = \"text\";";
    let (stream, _) = lex(source);

    for token in stream.tokens() {
        if token.kind == TokenKind::EndOfFile {
            continue;
        }

        let range = token.location.byte_range();
        assert_eq!(&source[range], token.value, "token {token}");
    }
}

#[test]
fn positions_are_one_based() {
    let (stream, _) = lex("a\n  b");
    let tokens = stream.tokens();

    assert_eq!((tokens[0].location.line, tokens[0].location.column), (1, 1));
    assert_eq!((tokens[1].location.line, tokens[1].location.column), (2, 3));
}

#[test]
fn nested_block_comment_is_one_token() {
    let (stream, engine) = lex("/* outer /* inner */ still outer */ let x: i32 = 1;");

    assert!(engine.is_empty());

    let tokens = stream.tokens();
    assert_eq!(tokens[0].kind, TokenKind::MultiLineComment);
    assert_eq!(tokens[0].value, "/* outer /* inner */ still outer */");

    assert_eq!(kinds(&stream)[1..], [
        TokenKind::Let,
        TokenKind::Identifier,
        TokenKind::Colon,
        TokenKind::Identifier,
        TokenKind::Assign,
        TokenKind::IntLiteral,
        TokenKind::Semicolon,
        TokenKind::EndOfFile,
    ]);
}

#[test]
fn unterminated_comment_is_fatal() {
    let (_, engine) = lex("/* never closed");

    let diags = engine.diagnostics();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, 1003);
}

#[test]
fn line_comment_spans_to_eol() {
    let (stream, _) = lex("// note\nx");
    let tokens = stream.tokens();

    assert_eq!(tokens[0].kind, TokenKind::SingleLineComment);
    assert_eq!(tokens[0].value, "// note");
    assert_eq!(tokens[1].kind, TokenKind::Identifier);
}

#[test]
fn string_and_char_literals() {
    let (stream, engine) = lex(r#""hello" 'c' "with \" escape""#);

    assert!(engine.is_empty());
    let tokens = stream.tokens();

    assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
    assert_eq!(tokens[0].value, "\"hello\"");
    assert_eq!(tokens[1].kind, TokenKind::CharLiteral);
    assert_eq!(tokens[1].value, "'c'");
    assert_eq!(tokens[2].kind, TokenKind::StringLiteral);
    assert_eq!(tokens[2].value, r#""with \" escape""#);
}

#[test]
fn prefixed_strings_keep_their_prefix() {
    let (stream, _) = lex(r#"f"x = {x}" r"raw" b"bytes""#);
    let tokens = stream.tokens();

    assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
    assert_eq!(tokens[0].value, "f\"x = {x}\"");
    assert!(tokens[0].is_format_string());
    assert_eq!(tokens[1].value, "r\"raw\"");
    assert_eq!(tokens[2].value, "b\"bytes\"");
}

#[test]
fn prefix_letter_without_quote_is_identifier() {
    let (stream, _) = lex("f b r u");

    for token in &stream.tokens()[..4] {
        assert_eq!(token.kind, TokenKind::Identifier);
    }
}

#[test]
fn unterminated_string_is_fatal() {
    let (_, engine) = lex("\"open");

    let diags = engine.diagnostics();
    assert_eq!(diags[0].code, 1002);
}

#[test]
fn numeric_literals() {
    let (stream, _) = lex("42 3.25 0xFF 0b1010 1_000 2e10");
    let tokens = stream.tokens();

    assert_eq!(tokens[0].kind, TokenKind::IntLiteral);
    assert_eq!(tokens[1].kind, TokenKind::FloatLiteral);
    assert_eq!(tokens[1].value, "3.25");
    assert_eq!(tokens[2].kind, TokenKind::IntLiteral);
    assert_eq!(tokens[2].value, "0xFF");
    assert_eq!(tokens[3].value, "0b1010");
    assert_eq!(tokens[4].value, "1_000");
    assert_eq!(tokens[5].value, "2e10");
}

#[test]
fn range_after_int_is_not_a_float() {
    let (stream, _) = lex("0..10");

    assert_eq!(kinds(&stream), vec![
        TokenKind::IntLiteral,
        TokenKind::Range,
        TokenKind::IntLiteral,
        TokenKind::EndOfFile,
    ]);
}

#[test]
fn operators_match_greedily() {
    let (stream, _) = lex("a <<= b == c :: d ..= e ** f");
    let ops: Vec<TokenKind> = stream
        .tokens()
        .iter()
        .filter(|t| t.kind.is_operator())
        .map(|t| t.kind)
        .collect();

    assert_eq!(ops, vec![
        TokenKind::LeftShiftAssign,
        TokenKind::Equal,
        TokenKind::Scope,
        TokenKind::RangeInclusive,
        TokenKind::Power,
    ]);
}

#[test]
fn compiler_directive_is_one_balanced_token() {
    let (stream, _) = lex("#[derive[inner]] fn");
    let tokens = stream.tokens();

    assert_eq!(tokens[0].kind, TokenKind::CompilerDirective);
    assert_eq!(tokens[0].value, "#[derive[inner]]");
    assert_eq!(tokens[1].kind, TokenKind::Fn);
}

#[test]
fn bare_hash_is_punctuation() {
    let (stream, _) = lex("# [x]");
    assert_eq!(stream.tokens()[0].kind, TokenKind::Hash);
}

#[test]
fn keywords_are_classified() {
    let (stream, _) = lex("fn let class interface module true false null self_ish");
    let tokens = stream.tokens();

    assert_eq!(tokens[0].kind, TokenKind::Fn);
    assert_eq!(tokens[1].kind, TokenKind::Let);
    assert_eq!(tokens[2].kind, TokenKind::Class);
    assert_eq!(tokens[3].kind, TokenKind::Interface);
    assert_eq!(tokens[4].kind, TokenKind::Module);
    assert_eq!(tokens[5].kind, TokenKind::True);
    assert_eq!(tokens[6].kind, TokenKind::False);
    assert_eq!(tokens[7].kind, TokenKind::Null);
    assert_eq!(tokens[8].kind, TokenKind::Identifier);
}

#[test]
fn unknown_byte_is_fatal() {
    let (_, engine) = lex("let $ = 1;");

    let diags = engine.diagnostics();
    assert_eq!(diags[0].code, 1001);
    assert!(diags[0].msg.contains('$'));
}

#[test]
fn eof_token_terminates_every_stream() {
    for source in ["", "x", "let a = 1;"] {
        let (stream, _) = lex(source);
        assert_eq!(stream.tokens().last().unwrap().kind, TokenKind::EndOfFile);
    }
}

#[test]
fn relex_override_keeps_positions() {
    let fragment = "x + 1";
    let engine = {
        let cache = Arc::new(SourceCache::new());
        DiagnosticEngine::buffered(cache).without_color()
    };

    let stream = Lexer::with_start(fragment, "test.hlx", 3, 10, 57)
        .tokenize(&engine)
        .unwrap();

    let first = &stream.tokens()[0];
    assert_eq!(first.location.line, 3);
    assert_eq!(first.location.column, 10);
    assert_eq!(first.location.offset, 57);
}

#[test]
fn crlf_is_tolerated() {
    let (stream, engine) = lex("a\r\nb");

    assert!(engine.is_empty());
    let tokens = stream.tokens();
    assert_eq!(tokens[1].location.line, 2);
    assert_eq!(tokens[1].location.column, 1);
}
