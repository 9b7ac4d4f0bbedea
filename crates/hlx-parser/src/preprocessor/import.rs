//! Import parsing, resolution and splicing.
//!
//! An import statement is parsed off the stream, resolved to a file, and
//! replaced by that file's preprocessed token sequence. Resolution follows
//! module rules: a directory `X` containing `X.hlx` is an autonomous module
//! root, so `import X` finds either `X.hlx` or `X/X.hlx` next to the
//! importing file, then under each configured include directory.

use std::path::{Path, PathBuf};

use crate::diagnostics::CodeError;
use crate::lexer::Lexer;
use crate::preprocessor::import_tree::ImportNode;
use crate::stream::TokenStream;
use crate::token::{Token, TokenKind};

use super::{advance, PreprocessResult, Preprocessor};

/// The parsed shape of one import statement.
#[derive(Debug, Default)]
struct ParsedImport {
    /// Path segments (`a::b::c`)
    segments: Vec<Token>,
    /// Explicit feature lists from `::{A, B}`
    features: Vec<Vec<Token>>,
    /// Alias from `as X`
    alias: Option<Token>,
    /// Stream index one past the closing `;`
    end: usize,
    /// Whether parsing failed (already reported)
    failed: bool,
}

impl Preprocessor<'_> {
    /// Handles an `import` statement at the cursor: parse, resolve,
    /// recurse, splice.
    pub(super) fn handle_import(&mut self, stream: &mut TokenStream) -> PreprocessResult<()> {
        let start = stream.position();
        let import_tok = stream.current().clone();

        let parsed = self.parse_import(stream)?;

        if parsed.failed || parsed.segments.is_empty() {
            // Drop the malformed statement so the parser does not trip on it
            // again.
            stream.splice(start, parsed.end.max(start + 1), Vec::new());
            stream.set_position(start);
            return Ok(());
        }

        let names: Vec<&str> =
            parsed.segments.iter().map(|tok| tok.value.as_str()).collect();
        let display_path = names.join("::");

        let Some(resolved) = self.resolve(stream.file_name(), &names) else {
            let _ = self.report(
                CodeError::new(&import_tok, 2001).arg("path", display_path),
            )?;
            stream.splice(start, parsed.end, Vec::new());
            stream.set_position(start);
            return Ok(());
        };

        // Revisiting a file that is still being processed is a cycle.
        if self.active.contains(&resolved) {
            let _ = self.report(
                CodeError::new(&import_tok, 2002)
                    .arg("path", resolved.display().to_string()),
            )?;
            return Ok(());
        }

        let Some(source) = self.engine().cache().read(&resolved) else {
            let _ = self.report(
                CodeError::new(&import_tok, 2001).arg("path", display_path),
            )?;
            stream.splice(start, parsed.end, Vec::new());
            stream.set_position(start);
            return Ok(());
        };

        let resolved_name = resolved.display().to_string();
        log::debug!("import {display_path} -> {resolved_name}");

        let parent = PathBuf::from(stream.file_name());
        let _ = self.tree.insert(&parent, ImportNode::new(&resolved));

        let mut imported =
            Lexer::new(&source, resolved_name.clone()).tokenize(self.engine())?;

        self.active.push(resolved.clone());
        let result = self.process(&mut imported);
        let _ = self.active.pop();
        result?;

        // Splice the imported tokens (minus their EOF) over the import
        // statement; the cursor skips past them since they are already
        // fully preprocessed.
        let replacement: Vec<Token> = imported
            .into_tokens()
            .into_iter()
            .filter(|tok| tok.kind != TokenKind::EndOfFile)
            .collect();

        let len = replacement.len();
        stream.splice(start, parsed.end, replacement);
        stream.set_position(start + len);

        Ok(())
    }

    /// Parses one import statement, reporting malformed shapes.
    fn parse_import(&mut self, stream: &mut TokenStream) -> PreprocessResult<ParsedImport> {
        let mut parsed = ParsedImport::default();
        advance(stream); // 'import'

        while !stream.at_end() {
            match stream.current().kind {
                TokenKind::Identifier => {
                    parsed.segments.push(stream.current().clone());
                    advance(stream);
                }
                TokenKind::Scope => {
                    if stream.peek(1).is_some_and(|tok| tok.kind == TokenKind::OpenBrace) {
                        advance(stream); // '::'
                        advance(stream); // '{'
                        self.parse_import_features(stream, &mut parsed)?;
                    } else {
                        advance(stream);
                    }
                }
                TokenKind::As => {
                    advance(stream);

                    if stream.current().kind == TokenKind::Identifier {
                        if parsed.features.len() > 1 {
                            let pof = stream.current().clone();
                            let _ = self.report(
                                CodeError::new(&pof, 2007)
                                    .arg("detail", "cannot alias explicit imports")
                                    .fix_arg(
                                        "hint",
                                        "only `import ... as ...` is allowed; \
                                         `import ...::{...} as ...` is not",
                                    ),
                            )?;
                            parsed.failed = true;
                        }

                        parsed.alias = Some(stream.current().clone());
                        advance(stream);
                    } else {
                        let pof = stream.current().clone();
                        let _ = self.report(
                            CodeError::new(&pof, 2007)
                                .arg("detail", "expected an alias name after `as`")
                                .fix_arg("hint", "give the import a single identifier alias"),
                        )?;
                        parsed.failed = true;
                    }
                }
                TokenKind::Semicolon => {
                    advance(stream);
                    parsed.end = stream.position();
                    return Ok(parsed);
                }
                _ => {
                    let pof = stream.current().clone();
                    let _ = self.report(
                        CodeError::new(&pof, 2007)
                            .arg(
                                "detail",
                                format!(
                                    "unexpected `{}` in import statement",
                                    pof.display_value()
                                ),
                            )
                            .fix_arg("hint", "perhaps a semicolon is missing"),
                    )?;
                    parsed.failed = true;

                    // Resynchronize past the statement.
                    while !stream.at_end()
                        && stream.current().kind != TokenKind::Semicolon
                    {
                        advance(stream);
                    }
                    if stream.current().kind == TokenKind::Semicolon {
                        advance(stream);
                    }

                    parsed.end = stream.position();
                    return Ok(parsed);
                }
            }
        }

        parsed.end = stream.position();
        parsed.failed = true;
        Ok(parsed)
    }

    /// Parses the `{A, B::C, ...}` feature list; nested braces are
    /// rejected.
    fn parse_import_features(
        &mut self,
        stream: &mut TokenStream,
        parsed: &mut ParsedImport,
    ) -> PreprocessResult<()> {
        let mut current: Vec<Token> = Vec::new();

        while !stream.at_end() {
            match stream.current().kind {
                TokenKind::Identifier | TokenKind::Scope => {
                    current.push(stream.current().clone());
                    advance(stream);
                }
                TokenKind::Comma => {
                    if !current.is_empty() {
                        parsed.features.push(std::mem::take(&mut current));
                    }
                    advance(stream);
                }
                TokenKind::OpenBrace => {
                    let pof = stream.current().clone();
                    let _ = self.report(
                        CodeError::new(&pof, 2007)
                            .arg("detail", "nesting imports is not supported")
                            .fix_arg("hint", "flatten the feature list"),
                    )?;
                    parsed.failed = true;
                    advance(stream);
                }
                TokenKind::CloseBrace => {
                    if !current.is_empty() {
                        parsed.features.push(std::mem::take(&mut current));
                    }
                    advance(stream);
                    return Ok(());
                }
                _ => {
                    let pof = stream.current().clone();
                    let _ = self.report(
                        CodeError::new(&pof, 2007)
                            .arg(
                                "detail",
                                format!(
                                    "unexpected `{}` in import feature list",
                                    pof.display_value()
                                ),
                            )
                            .fix_arg("hint", "perhaps a semicolon is missing"),
                    )?;
                    parsed.failed = true;
                    advance(stream);
                }
            }
        }

        Ok(())
    }

    /// Resolves a segment path against the importing file's directory and
    /// the include directories, applying the module-directory rule.
    fn resolve(&self, importer: &str, names: &[&str]) -> Option<PathBuf> {
        let importer_dir = Path::new(importer)
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

        let mut bases = vec![importer_dir];
        bases.extend(self.include_dirs.iter().cloned());

        for base in bases {
            let mut plain = base.clone();
            for name in &names[..names.len() - 1] {
                plain.push(name);
            }

            let last = names.last()?;

            // a::b -> a/b.hlx
            let file = plain.join(format!("{last}.hlx"));
            if file.is_file() {
                return Some(file.canonicalize().unwrap_or(file));
            }

            // a::b -> a/b/b.hlx (b is an autonomous module directory)
            let module = plain.join(last).join(format!("{last}.hlx"));
            if module.is_file() {
                return Some(module.canonicalize().unwrap_or(module));
            }
        }

        None
    }
}
