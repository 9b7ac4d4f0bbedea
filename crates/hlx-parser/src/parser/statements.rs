//! Statement parsing.
//!
//! `parse_statement` collects leading modifiers into a bag and dispatches on
//! the first non-modifier token; declaration keywords hand off to the
//! declaration parsers with the bag attached. `module` and brace tokens
//! participate in namespace bookkeeping here so the stack stays balanced
//! across nested blocks.

use hlx_ast::nodes::{
    AliasStmt,
    Annotation,
    BreakStmt,
    CatchStmt,
    ContinueStmt,
    DeleteStmt,
    DirectiveAnnotation,
    ElseBranch,
    ElseKind,
    Expr,
    ExprStmt,
    FinallyStmt,
    ForCCore,
    ForCore,
    ForPyCore,
    ForStmt,
    IdentExpr,
    IfKind,
    IfStmt,
    MultiImportStmt,
    NamedVarSpecifier,
    PanicStmt,
    ReturnStmt,
    SingleImportStmt,
    Stmt,
    SuiteStmt,
    SwitchCaseKind,
    SwitchCaseStmt,
    SwitchStmt,
    TryStmt,
    WhileStmt,
    YieldStmt,
};

use super::{ParseResult, Parser};
use crate::token::TokenKind;

impl Parser<'_> {
    /// Parses one statement (or declaration in statement position).
    pub(crate) fn parse_statement(&mut self) -> ParseResult<Stmt> {
        match self.current_kind() {
            TokenKind::CompilerDirective => {
                let token = self.bump();
                Ok(Stmt::Annotation(Annotation::Directive(DirectiveAnnotation {
                    text: token.value,
                    loc: token.location,
                })))
            }
            TokenKind::If | TokenKind::Unless => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Switch => self.parse_switch(),
            TokenKind::Try => self.parse_try(),
            TokenKind::Panic => {
                let start = self.bump();
                let value = self.parse_expression()?;
                let semi = self.expect_semicolon()?;

                Ok(Stmt::Panic(PanicStmt {
                    value,
                    loc: start.location.span_to(&semi.location),
                }))
            }
            TokenKind::Yield => {
                let start = self.bump();
                let value = if self.check(TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                let semi = self.expect_semicolon()?;

                Ok(Stmt::Yield(YieldStmt {
                    value,
                    loc: start.location.span_to(&semi.location),
                }))
            }
            TokenKind::Delete => {
                let start = self.bump();
                let value = self.parse_expression()?;
                let semi = self.expect_semicolon()?;

                Ok(Stmt::Delete(DeleteStmt {
                    value,
                    loc: start.location.span_to(&semi.location),
                }))
            }
            TokenKind::Alias => {
                let start = self.bump();
                let name_tok = self.expect(TokenKind::Identifier)?;
                let _ = self.expect(TokenKind::Assign)?;
                let target = self.parse_expression()?;
                let semi = self.expect_semicolon()?;

                Ok(Stmt::Alias(AliasStmt {
                    name: IdentExpr::new(name_tok.value, name_tok.location),
                    target,
                    loc: start.location.span_to(&semi.location),
                }))
            }
            TokenKind::Return => {
                let start = self.bump();
                let value = if self.check(TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                let semi = self.expect_semicolon()?;

                Ok(Stmt::Return(ReturnStmt {
                    value,
                    loc: start.location.span_to(&semi.location),
                }))
            }
            TokenKind::Break => {
                let start = self.bump();
                let semi = self.expect_semicolon()?;

                Ok(Stmt::Break(BreakStmt { loc: start.location.span_to(&semi.location) }))
            }
            TokenKind::Continue => {
                let start = self.bump();
                let semi = self.expect_semicolon()?;

                Ok(Stmt::Continue(ContinueStmt {
                    loc: start.location.span_to(&semi.location),
                }))
            }
            TokenKind::Import => self.parse_import_statement(),
            TokenKind::OpenBrace => {
                let suite = self.parse_suite()?;
                Ok(Stmt::Suite(suite))
            }
            _ if self.starts_declaration() => self.parse_declaration(),
            _ => {
                let value = self.parse_expression()?;
                let semi = self.expect_semicolon()?;
                let loc = value.loc().span_to(&semi.location);

                Ok(Stmt::Expr(ExprStmt { value, loc }))
            }
        }
    }

    /// Parses a suite: a braced statement list, or `:` followed by a single
    /// statement.
    pub(crate) fn parse_suite(&mut self) -> ParseResult<SuiteStmt> {
        if self.check(TokenKind::Colon) {
            let start = self.bump();
            let stmt = self.parse_statement()?;
            let loc = start.location.span_to(stmt.loc());

            return Ok(SuiteStmt { body: vec![stmt], loc });
        }

        let open = self.expect(TokenKind::OpenBrace)?;
        let mut body = Vec::new();

        while !self.check(TokenKind::CloseBrace) && !self.at_end() {
            // Stray semicolons are tolerated between statements.
            if self.eat(TokenKind::Semicolon).is_some() {
                continue;
            }

            match self.parse_statement() {
                Ok(stmt) => body.push(stmt),
                Err(super::ParseError::Syntax) => self.recover(),
                Err(err) => return Err(err),
            }
        }

        let close = self.expect(TokenKind::CloseBrace)?;
        Ok(SuiteStmt { body, loc: open.location.span_to(&close.location) })
    }

    fn parse_if(&mut self) -> ParseResult<Stmt> {
        let start = self.bump();
        let kind = if start.kind == TokenKind::Unless { IfKind::Unless } else { IfKind::If };

        let condition = self.parse_expression()?;
        let body = self.parse_suite()?;
        let mut else_branches = Vec::new();
        let mut end = body.loc.clone();

        while self.check(TokenKind::Else) {
            let else_tok = self.bump();

            let (branch_kind, branch_condition) = match self.current_kind() {
                TokenKind::If => {
                    let _ = self.bump();
                    (ElseKind::ElseIf, Some(self.parse_expression()?))
                }
                TokenKind::Unless => {
                    let _ = self.bump();
                    (ElseKind::ElseUnless, Some(self.parse_expression()?))
                }
                _ => (ElseKind::Else, None),
            };

            let branch_body = self.parse_suite()?;
            end = branch_body.loc.clone();

            else_branches.push(ElseBranch {
                kind: branch_kind,
                condition: branch_condition,
                body: branch_body,
                loc: else_tok.location.span_to(&end),
            });

            if matches!(else_branches.last().map(|b| b.kind), Some(ElseKind::Else)) {
                break;
            }
        }

        Ok(Stmt::If(IfStmt {
            kind,
            condition,
            body,
            else_branches,
            loc: start.location.span_to(&end),
        }))
    }

    fn parse_while(&mut self) -> ParseResult<Stmt> {
        let start = self.bump();
        let condition = self.parse_expression()?;
        let body = self.parse_suite()?;
        let loc = start.location.span_to(&body.loc);

        Ok(Stmt::While(WhileStmt { condition, body, loc }))
    }

    /// `for` is followed by either a Python-style or a C-style core; the
    /// choice is made by scanning for a `;` before the body's opening brace.
    fn parse_for(&mut self) -> ParseResult<Stmt> {
        let start = self.bump();

        let core = if self.semicolon_before_block() {
            self.parse_for_c_core()?
        } else {
            self.parse_for_py_core()?
        };

        let body = self.parse_suite()?;
        let loc = start.location.span_to(&body.loc);

        Ok(Stmt::For(ForStmt { core, body, loc }))
    }

    /// Scans ahead (without consuming) for a `;` at nesting depth zero
    /// before the next `{` at depth zero. A typed loop variable's `:` is
    /// not a terminator; for-loop bodies are always braced.
    fn semicolon_before_block(&self) -> bool {
        let mut depth = 0usize;
        let mut n = 0i64;

        loop {
            let Some(kind) = self.peek_kind(n) else { return false };

            match kind {
                TokenKind::OpenParen | TokenKind::OpenBracket => depth += 1,
                TokenKind::CloseParen | TokenKind::CloseBracket => {
                    depth = depth.saturating_sub(1);
                }
                TokenKind::Semicolon if depth == 0 => return true,
                TokenKind::OpenBrace if depth == 0 => return false,
                TokenKind::EndOfFile => return false,
                _ => {}
            }

            n += 1;
        }
    }

    fn parse_for_py_core(&mut self) -> ParseResult<ForCore> {
        let mut vars = Vec::new();

        loop {
            vars.push(self.parse_named_var_specifier()?);

            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }

        let _ = self.expect(TokenKind::In)?;
        let iterable = self.parse_expression()?;

        Ok(ForCore::Python(ForPyCore { vars, iterable }))
    }

    fn parse_for_c_core(&mut self) -> ParseResult<ForCore> {
        let init = if self.check(TokenKind::Semicolon) {
            let _ = self.bump();
            None
        } else {
            // The init statement consumes its own semicolon.
            Some(Box::new(self.parse_statement()?))
        };

        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        let _ = self.expect_semicolon()?;

        let update = if self.check(TokenKind::OpenBrace) {
            None
        } else {
            Some(self.parse_expression()?)
        };

        Ok(ForCore::C(ForCCore { init, condition, update }))
    }

    /// Parses `name[: type]`, shared by for-loops, parameters and catches.
    pub(crate) fn parse_named_var_specifier(&mut self) -> ParseResult<NamedVarSpecifier> {
        let name_tok = self.expect(TokenKind::Identifier)?;
        let mut loc = name_tok.location.clone();

        let ty = if self.eat(TokenKind::Colon).is_some() {
            let ty = self.parse_type()?;
            loc = loc.span_to(ty.loc());
            Some(ty)
        } else {
            None
        };

        Ok(NamedVarSpecifier {
            name: IdentExpr::new(name_tok.value, name_tok.location),
            ty,
            loc,
        })
    }

    fn parse_switch(&mut self) -> ParseResult<Stmt> {
        let start = self.bump();
        let condition = self.parse_expression()?;
        let _ = self.expect(TokenKind::OpenBrace)?;

        let mut cases = Vec::new();

        while !self.check(TokenKind::CloseBrace) && !self.at_end() {
            match self.current_kind() {
                TokenKind::Case => {
                    let case_tok = self.bump();
                    let cond = self.parse_expression()?;

                    // `case expr: fallthrough;` chains into the next case.
                    if self.check(TokenKind::Colon)
                        && self.peek_kind(1) == Some(TokenKind::Fallthrough)
                    {
                        let _ = self.bump();
                        let _ = self.bump();
                        let semi = self.expect_semicolon()?;

                        cases.push(SwitchCaseStmt {
                            kind: SwitchCaseKind::Fallthrough,
                            condition: Some(cond),
                            body: None,
                            loc: case_tok.location.span_to(&semi.location),
                        });
                        continue;
                    }

                    let body = self.parse_suite()?;
                    let loc = case_tok.location.span_to(&body.loc);

                    cases.push(SwitchCaseStmt {
                        kind: SwitchCaseKind::Case,
                        condition: Some(cond),
                        body: Some(body),
                        loc,
                    });
                }
                TokenKind::Default => {
                    let default_tok = self.bump();
                    let body = self.parse_suite()?;
                    let loc = default_tok.location.span_to(&body.loc);

                    cases.push(SwitchCaseStmt {
                        kind: SwitchCaseKind::Default,
                        condition: None,
                        body: Some(body),
                        loc,
                    });
                }
                _ => return Err(self.unexpected("`case` or `default`")),
            }
        }

        let close = self.expect(TokenKind::CloseBrace)?;

        Ok(Stmt::Switch(SwitchStmt {
            condition,
            cases,
            loc: start.location.span_to(&close.location),
        }))
    }

    fn parse_try(&mut self) -> ParseResult<Stmt> {
        let start = self.bump();
        let body = self.parse_suite()?;
        let mut end = body.loc.clone();

        let mut catches = Vec::new();
        while self.check(TokenKind::Catch) {
            let catch_tok = self.bump();

            let binding = if self.eat(TokenKind::OpenParen).is_some() {
                let spec = self.parse_named_var_specifier()?;
                let _ = self.expect(TokenKind::CloseParen)?;
                Some(spec)
            } else {
                None
            };

            let catch_body = self.parse_suite()?;
            end = catch_body.loc.clone();

            catches.push(CatchStmt {
                binding,
                body: catch_body,
                loc: catch_tok.location.span_to(&end),
            });
        }

        let finally = if self.check(TokenKind::Finally) {
            let finally_tok = self.bump();
            let finally_body = self.parse_suite()?;
            end = finally_body.loc.clone();

            Some(FinallyStmt {
                body: finally_body,
                loc: finally_tok.location.span_to(&end),
            })
        } else {
            None
        };

        Ok(Stmt::Try(TryStmt {
            body,
            catches,
            finally,
            loc: start.location.span_to(&end),
        }))
    }

    /// Parses an import statement.
    ///
    /// Imports are normally resolved away by the preprocessor; the parser
    /// still accepts them so FFI declarations can wrap them and so stray
    /// imports produce a structured node rather than a cascade.
    pub(crate) fn parse_import_statement(&mut self) -> ParseResult<Stmt> {
        let start = self.expect(TokenKind::Import)?;

        if self.check(TokenKind::StringLiteral) {
            // `import "header"` inside FFI blocks.
            let lit = self.bump();
            let semi = self.expect_semicolon()?;

            return Ok(Stmt::SingleImport(SingleImportStmt {
                path: Expr::Literal(hlx_ast::nodes::LiteralExpr {
                    kind: hlx_ast::nodes::LiteralKind::Str,
                    value: lit.value,
                    loc: lit.location,
                }),
                alias: None,
                loc: start.location.span_to(&semi.location),
            }));
        }

        let path = self.parse_scope_path()?;

        // `import a::{b, c}`
        if self.check(TokenKind::Scope) && self.peek_kind(1) == Some(TokenKind::OpenBrace) {
            let _ = self.bump();
            let _ = self.bump();

            let mut features = Vec::new();
            while !self.check(TokenKind::CloseBrace) && !self.at_end() {
                features.push(self.parse_scope_path()?);

                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }

            let _ = self.expect(TokenKind::CloseBrace)?;
            let semi = self.expect_semicolon()?;

            return Ok(Stmt::MultiImport(MultiImportStmt {
                base: path,
                features,
                loc: start.location.span_to(&semi.location),
            }));
        }

        let alias = if self.eat(TokenKind::As).is_some() {
            let token = self.expect(TokenKind::Identifier)?;
            Some(IdentExpr::new(token.value, token.location))
        } else {
            None
        };

        let semi = self.expect_semicolon()?;

        Ok(Stmt::SingleImport(SingleImportStmt {
            path,
            alias,
            loc: start.location.span_to(&semi.location),
        }))
    }
}
