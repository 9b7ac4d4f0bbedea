//! Macro definitions and invocation expansion.
//!
//! `define NAME(params): body;` registers a macro under its fully qualified
//! name (the current module prefix plus the declared name). An invocation
//! `NAME!(args)` — possibly qualified, `a::b::NAME!(...)` — is recognized by
//! walking back from the postfix `!`, checked for arity, and replaced by the
//! body with parameters substituted. The cursor rewinds to the start of the
//! splice so nested invocations expand on the same pass.

use crate::diagnostics::CodeError;
use crate::stream::TokenStream;
use crate::token::{Token, TokenKind};

use super::{advance, PreprocessResult, Preprocessor};

/// Hard cap on expansions per pass; a self-recursive macro would otherwise
/// never terminate.
const EXPANSION_LIMIT: usize = 1024;

/// One macro parameter, with an optional default token sequence.
#[derive(Debug, Clone)]
pub struct MacroParam {
    /// Parameter name, substituted in the body
    pub name: String,
    /// Default argument tokens, if declared
    pub default: Option<Vec<Token>>,
}

/// A macro definition.
#[derive(Debug, Clone)]
pub struct MacroDef {
    /// Fully qualified name the macro was registered under
    pub name: String,
    /// Declared parameters, in order
    pub params: Vec<MacroParam>,
    /// Body tokens spliced at each invocation
    pub body: Vec<Token>,
}

impl MacroDef {
    /// Number of arguments that must be supplied (parameters without a
    /// default).
    #[must_use]
    pub fn required_arity(&self) -> usize {
        self.params.iter().filter(|param| param.default.is_none()).count()
    }
}

impl Preprocessor<'_> {
    /// Handles a `define` at the cursor: parse it, register it, and remove
    /// its tokens from the stream.
    pub(super) fn handle_define(&mut self, stream: &mut TokenStream) -> PreprocessResult<()> {
        let start = stream.position();
        advance(stream); // 'define'

        let name_tok = stream.current().clone();
        if name_tok.kind != TokenKind::Identifier {
            let _ = self.report(
                CodeError::new(&name_tok, 3001)
                    .arg("token", name_tok.display_value())
                    .fix_arg("expected", "a macro name"),
            )?;
            self.skip_statement(stream);
            stream.splice(start, stream.position(), Vec::new());
            stream.set_position(start);
            return Ok(());
        }
        advance(stream);

        let mut params = Vec::new();
        if stream.current().kind == TokenKind::OpenParen {
            advance(stream);
            self.parse_macro_params(stream, &mut params)?;
        }

        if stream.current().kind != TokenKind::Colon {
            let pof = stream.current().clone();
            let _ = self.report(
                CodeError::new(&pof, 3002)
                    .arg("what", "a `:` before the macro body")
                    .fix_arg("what", ":"),
            )?;
            self.skip_statement(stream);
            stream.splice(start, stream.position(), Vec::new());
            stream.set_position(start);
            return Ok(());
        }
        advance(stream); // ':'

        // Body: everything up to the terminating `;` at brace depth zero.
        let mut body = Vec::new();
        let mut depth = 0usize;

        while !stream.at_end() {
            match stream.current().kind {
                TokenKind::Semicolon if depth == 0 => break,
                TokenKind::OpenBrace => depth += 1,
                TokenKind::CloseBrace => depth = depth.saturating_sub(1),
                _ => {}
            }

            body.push(stream.current().clone());
            advance(stream);
        }

        if stream.current().kind == TokenKind::Semicolon {
            advance(stream);
        }

        let mut qualified = self.namespace_prefix();
        qualified.push(name_tok.value.clone());
        let qualified = qualified.join("::");

        log::debug!("define {qualified} ({} params)", params.len());

        let _ = self.defines.insert(
            qualified.clone(),
            MacroDef { name: qualified, params, body },
        );

        stream.splice(start, stream.position(), Vec::new());
        stream.set_position(start);
        Ok(())
    }

    /// Parses `name [= default]` parameters up to the closing paren.
    fn parse_macro_params(
        &mut self,
        stream: &mut TokenStream,
        params: &mut Vec<MacroParam>,
    ) -> PreprocessResult<()> {
        while !stream.at_end() && stream.current().kind != TokenKind::CloseParen {
            let name_tok = stream.current().clone();

            if name_tok.kind != TokenKind::Identifier {
                let _ = self.report(
                    CodeError::new(&name_tok, 3001)
                        .arg("token", name_tok.display_value())
                        .fix_arg("expected", "a parameter name"),
                )?;
                advance(stream);
                continue;
            }
            advance(stream);

            let default = if stream.current().kind == TokenKind::Assign {
                advance(stream);
                let mut tokens = Vec::new();
                let mut depth = 0usize;

                while !stream.at_end() {
                    match stream.current().kind {
                        TokenKind::Comma | TokenKind::CloseParen if depth == 0 => break,
                        TokenKind::OpenParen | TokenKind::OpenBracket => depth += 1,
                        TokenKind::CloseParen | TokenKind::CloseBracket => {
                            depth = depth.saturating_sub(1);
                        }
                        _ => {}
                    }

                    tokens.push(stream.current().clone());
                    advance(stream);
                }

                Some(tokens)
            } else {
                None
            };

            params.push(MacroParam { name: name_tok.value, default });

            if stream.current().kind == TokenKind::Comma {
                advance(stream);
            }
        }

        if stream.current().kind == TokenKind::CloseParen {
            advance(stream);
        }

        Ok(())
    }

    /// Handles a postfix `!` at the cursor, expanding the invocation it
    /// closes if the walked-back path names a known macro.
    pub(super) fn handle_invocation(&mut self, stream: &mut TokenStream) -> PreprocessResult<()> {
        let bang_at = stream.position();

        // An invocation is `path ! (args)`: the token before the `!` must
        // be an identifier, the one after an opening paren.
        let prev_is_ident =
            stream.peek(-1).is_some_and(|tok| tok.kind == TokenKind::Identifier);
        let next_is_paren =
            stream.peek(1).is_some_and(|tok| tok.kind == TokenKind::OpenParen);

        if !prev_is_ident || !next_is_paren {
            advance(stream);
            return Ok(());
        }

        // Walk back through `ident (:: ident)*` to the start of the path.
        let mut path_start = bang_at - 1;
        let mut segments =
            vec![stream.get(path_start).map(|tok| tok.value.clone()).unwrap_or_default()];

        while path_start >= 2 {
            let scoped = stream
                .get(path_start - 1)
                .is_some_and(|tok| tok.kind == TokenKind::Scope)
                && stream
                    .get(path_start - 2)
                    .is_some_and(|tok| tok.kind == TokenKind::Identifier);

            if !scoped {
                break;
            }

            path_start -= 2;
            segments.insert(
                0,
                stream.get(path_start).map(|tok| tok.value.clone()).unwrap_or_default(),
            );
        }

        let path = segments.join("::");

        // Collect argument groups, splitting on top-level commas.
        let mut args: Vec<Vec<Token>> = Vec::new();
        let mut current: Vec<Token> = Vec::new();
        let mut depth = 0usize;
        let mut index = bang_at + 2;
        let mut end = None;

        while let Some(token) = stream.get(index) {
            match token.kind {
                TokenKind::OpenParen | TokenKind::OpenBracket | TokenKind::OpenBrace => {
                    depth += 1;
                    current.push(token.clone());
                }
                TokenKind::CloseParen if depth == 0 => {
                    end = Some(index + 1);
                    break;
                }
                TokenKind::CloseParen | TokenKind::CloseBracket | TokenKind::CloseBrace => {
                    depth = depth.saturating_sub(1);
                    current.push(token.clone());
                }
                TokenKind::Comma if depth == 0 => {
                    args.push(std::mem::take(&mut current));
                }
                TokenKind::EndOfFile => break,
                _ => current.push(token.clone()),
            }

            index += 1;
        }

        let Some(end) = end else {
            let pof = stream.current().clone();
            let _ = self.report(CodeError::new(&pof, 2005).arg("which", "a closing paren"))?;
            advance(stream);
            return Ok(());
        };

        if !current.is_empty() {
            args.push(current);
        }

        // Resolve the qualified name against the namespace prefix, innermost
        // first.
        let prefix = self.namespace_prefix();
        let mut resolved = None;

        for cut in (0..=prefix.len()).rev() {
            let mut candidate = prefix[..cut].to_vec();
            candidate.push(path.clone());
            let candidate = candidate.join("::");

            if let Some(def) = self.defines.get(&candidate) {
                resolved = Some(def.clone());
                break;
            }
        }

        let Some(def) = resolved else {
            // Not a known macro; leave the tokens for the parser.
            advance(stream);
            return Ok(());
        };

        self.expansions += 1;
        if self.expansions > EXPANSION_LIMIT {
            let pof = stream.current().clone();
            let _ = self.report(CodeError::new(&pof, 2008).arg("name", def.name.clone()))?;
            return Ok(());
        }

        // Arity: every parameter without a default needs an argument.
        if args.len() < def.required_arity() || args.len() > def.params.len() {
            let pof = stream.current().clone();
            let _ = self.report(
                CodeError::new(&pof, 2006)
                    .arg("name", def.name.clone())
                    .arg("expected", def.required_arity().to_string())
                    .arg("found", args.len().to_string()),
            )?;
            stream.set_position(end);
            return Ok(());
        }

        // Substitute parameters into the body.
        let mut replacement: Vec<Token> = Vec::new();

        for token in &def.body {
            let substituted = (token.kind == TokenKind::Identifier)
                .then(|| {
                    def.params.iter().position(|param| param.name == token.value)
                })
                .flatten();

            match substituted {
                Some(position) => {
                    let supplied = args.get(position).cloned().or_else(|| {
                        def.params[position].default.clone()
                    });

                    if let Some(tokens) = supplied {
                        replacement.extend(tokens);
                    }
                }
                None => replacement.push(token.clone()),
            }
        }

        log::trace!("expanding {}! ({} tokens)", def.name, replacement.len());

        // Replace from the start of the path through the closing paren and
        // rescan from the splice so nested invocations expand.
        stream.splice(path_start, end, replacement);
        stream.set_position(path_start);

        Ok(())
    }

    /// Skips to just past the next `;`.
    fn skip_statement(&mut self, stream: &mut TokenStream) {
        while !stream.at_end() && stream.current().kind != TokenKind::Semicolon {
            advance(stream);
        }

        if stream.current().kind == TokenKind::Semicolon {
            advance(stream);
        }
    }
}
