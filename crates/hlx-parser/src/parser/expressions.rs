//! Expression parsing.
//!
//! A primary parser dispatches on the current token; a postfix tail loop
//! forms paths, calls and index accesses; a precedence-climbing loop folds
//! binary operators per the precedence table; and a trailing loop handles
//! the postfix forms (`as`, `has`, `derives`, the two ternary surfaces).

use hlx_ast::nodes::{
    ArrayLiteralExpr,
    ArrayTy,
    AsyncExpr,
    AsyncKind,
    BinaryExpr,
    BinaryOp,
    CallExpr,
    CastExpr,
    DotPathExpr,
    Expr,
    GenericInvokeExpr,
    IdentExpr,
    IndexExpr,
    InstOfExpr,
    InstOfOp,
    LambdaExpr,
    LiteralExpr,
    LiteralKind,
    MapLiteralExpr,
    MapPairExpr,
    NamedArgExpr,
    ObjInitExpr,
    ParenExpr,
    PathTy,
    ScopePathExpr,
    SetLiteralExpr,
    TernaryExpr,
    TernaryKind,
    TupleLiteralExpr,
    TupleTy,
    Ty,
    UnaryExpr,
    UnaryFixity,
    UnaryOp,
};

use super::{ParseResult, Parser};
use crate::token::TokenKind;

/// Maps a token kind to its binary operator, if it is one.
fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Mod,
        TokenKind::Power => BinaryOp::Pow,
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Ampersand => BinaryOp::BitAnd,
        TokenKind::Pipe => BinaryOp::BitOr,
        TokenKind::Caret => BinaryOp::BitXor,
        TokenKind::LeftShift => BinaryOp::Shl,
        TokenKind::RightShift => BinaryOp::Shr,
        TokenKind::Equal => BinaryOp::Eq,
        TokenKind::NotEqual => BinaryOp::Ne,
        TokenKind::GreaterThan => BinaryOp::Gt,
        TokenKind::LessThan => BinaryOp::Lt,
        TokenKind::GreaterEqual => BinaryOp::Ge,
        TokenKind::LessEqual => BinaryOp::Le,
        TokenKind::Assign => BinaryOp::Assign,
        TokenKind::PlusAssign => BinaryOp::AddAssign,
        TokenKind::MinusAssign => BinaryOp::SubAssign,
        TokenKind::StarAssign => BinaryOp::MulAssign,
        TokenKind::SlashAssign => BinaryOp::DivAssign,
        TokenKind::PercentAssign => BinaryOp::ModAssign,
        TokenKind::PowerAssign => BinaryOp::PowAssign,
        TokenKind::AmpersandAssign => BinaryOp::BitAndAssign,
        TokenKind::PipeAssign => BinaryOp::BitOrAssign,
        TokenKind::CaretAssign => BinaryOp::BitXorAssign,
        TokenKind::LeftShiftAssign => BinaryOp::ShlAssign,
        TokenKind::RightShiftAssign => BinaryOp::ShrAssign,
        TokenKind::LogicalAnd => BinaryOp::And,
        TokenKind::LogicalOr => BinaryOp::Or,
        TokenKind::Range => BinaryOp::Range,
        TokenKind::RangeInclusive => BinaryOp::RangeInclusive,
        _ => return None,
    };

    Some(op)
}

/// Maps a literal token kind to its literal subtype.
fn literal_kind(kind: TokenKind) -> Option<LiteralKind> {
    let lit = match kind {
        TokenKind::IntLiteral => LiteralKind::Int,
        TokenKind::FloatLiteral => LiteralKind::Float,
        TokenKind::StringLiteral => LiteralKind::Str,
        TokenKind::CharLiteral => LiteralKind::Char,
        TokenKind::True | TokenKind::False => LiteralKind::Bool,
        TokenKind::Null => LiteralKind::Null,
        _ => return None,
    };

    Some(lit)
}

impl Parser<'_> {
    /// Parses a full expression, including the postfix forms.
    pub(crate) fn parse_expression(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_binary(1)?;

        loop {
            expr = match self.current_kind() {
                TokenKind::As => {
                    let _ = self.bump();
                    let ty = self.parse_type()?;
                    let loc = expr.loc().span_to(ty.loc());

                    Expr::Cast(CastExpr { value: Box::new(expr), ty, loc })
                }
                TokenKind::Has | TokenKind::Derives => {
                    let op = if self.current_kind() == TokenKind::Has {
                        InstOfOp::Has
                    } else {
                        InstOfOp::Derives
                    };
                    let _ = self.bump();

                    let ty = self.parse_type()?;
                    let loc = expr.loc().span_to(ty.loc());

                    Expr::InstOf(InstOfExpr { value: Box::new(expr), op, ty, loc })
                }
                TokenKind::QuestionMark => {
                    let _ = self.bump();
                    let if_true = self.parse_binary(1)?;
                    let _ = self.expect(TokenKind::Colon)?;
                    let if_false = self.parse_binary(1)?;
                    let loc = expr.loc().span_to(if_false.loc());

                    Expr::Ternary(TernaryExpr {
                        kind: TernaryKind::Question,
                        condition: Box::new(expr),
                        if_true: Box::new(if_true),
                        if_false: Box::new(if_false),
                        loc,
                    })
                }
                TokenKind::If => {
                    // value if cond else other
                    let _ = self.bump();
                    let condition = self.parse_binary(1)?;
                    let _ = self.expect(TokenKind::Else)?;
                    let if_false = self.parse_binary(1)?;
                    let loc = expr.loc().span_to(if_false.loc());

                    Expr::Ternary(TernaryExpr {
                        kind: TernaryKind::IfElse,
                        condition: Box::new(condition),
                        if_true: Box::new(expr),
                        if_false: Box::new(if_false),
                        loc,
                    })
                }
                _ => break,
            };
        }

        Ok(expr)
    }

    /// Precedence-climbing loop; all binary operators are left-associative
    /// at their own level.
    fn parse_binary(&mut self, min_prec: u8) -> ParseResult<Expr> {
        let mut lhs = self.parse_unary()?;

        while let Some(op) = binary_op(self.current_kind()) {
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }

            let _ = self.bump();
            let rhs = self.parse_binary(prec + 1)?;
            let loc = lhs.loc().span_to(rhs.loc());

            lhs = Expr::Binary(BinaryExpr {
                lhs: Box::new(lhs),
                op,
                rhs: Box::new(rhs),
                loc,
            });
        }

        Ok(lhs)
    }

    /// Parses prefix unary operators, then a postfix `?` chain.
    fn parse_unary(&mut self) -> ParseResult<Expr> {
        let prefix = match self.current_kind() {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::LogicalNot => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::Ampersand => Some(UnaryOp::Ref),
            TokenKind::Star => Some(UnaryOp::Deref),
            _ => None,
        };

        if let Some(op) = prefix {
            let start = self.bump().location;
            let operand = self.parse_unary()?;
            let loc = start.span_to(operand.loc());

            return Ok(Expr::Unary(UnaryExpr {
                op,
                fixity: UnaryFixity::Prefix,
                operand: Box::new(operand),
                loc,
            }));
        }

        self.parse_postfix()
    }

    /// Parses a primary expression and its postfix tail: `::` paths, `.`
    /// accesses, calls, index accesses and generic invocations.
    fn parse_postfix(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_primary()?;

        loop {
            expr = match self.current_kind() {
                TokenKind::Dot => {
                    let _ = self.bump();
                    let rhs = self.parse_primary()?;
                    let loc = expr.loc().span_to(rhs.loc());

                    Expr::Dot(DotPathExpr { lhs: Box::new(expr), rhs: Box::new(rhs), loc })
                }
                TokenKind::OpenParen => {
                    let (args, end) = self.parse_call_args()?;
                    let loc = expr.loc().span_to(&end);

                    Expr::Call(CallExpr { path: Box::new(expr), generics: None, args, loc })
                }
                TokenKind::OpenBracket => {
                    let _ = self.bump();
                    let index = self.parse_expression()?;
                    let close = self.expect(TokenKind::CloseBracket)?;
                    let loc = expr.loc().span_to(&close.location);

                    Expr::Index(IndexExpr {
                        target: Box::new(expr),
                        index: Box::new(index),
                        loc,
                    })
                }
                TokenKind::LessThan => {
                    // Ambiguous with the comparison operator; speculate and
                    // roll back unless a call follows the closing `>`.
                    match self.try_parse_generic_call(expr)? {
                        Ok(call) => call,
                        Err(original) => return Ok(original),
                    }
                }
                _ => break,
            };
        }

        Ok(expr)
    }

    /// Speculatively parses `<generics> (args)` after a path expression.
    ///
    /// On mismatch the cursor is rolled back and the path is handed back
    /// unchanged (as the `Err` arm of the inner result) so the binary loop
    /// can treat `<` as a comparison.
    fn try_parse_generic_call(&mut self, path: Expr) -> ParseResult<Result<Expr, Expr>> {
        let checkpoint = self.position();

        self.begin_speculation();
        let generics = self.parse_generic_invoke();
        self.end_speculation();

        match generics {
            Ok(generics) if self.check(TokenKind::OpenParen) => {
                let (args, end) = self.parse_call_args()?;
                let loc = path.loc().span_to(&end);

                Ok(Ok(Expr::Call(CallExpr {
                    path: Box::new(path),
                    generics: Some(generics),
                    args,
                    loc,
                })))
            }
            _ => {
                self.rewind_to(checkpoint);
                Ok(Err(path))
            }
        }
    }

    /// Parses `<T, U, ...>`.
    pub(crate) fn parse_generic_invoke(&mut self) -> ParseResult<GenericInvokeExpr> {
        let open = self.expect(TokenKind::LessThan)?;
        let mut args = Vec::new();

        if !self.check(TokenKind::GreaterThan) {
            loop {
                args.push(self.parse_type()?);

                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }

        let close = self.expect(TokenKind::GreaterThan)?;

        Ok(GenericInvokeExpr { args, loc: open.location.span_to(&close.location) })
    }

    /// Parses a parenthesized argument list; `name = value` arguments are
    /// recognized as named.
    fn parse_call_args(&mut self) -> ParseResult<(Vec<Expr>, hlx_source::Location)> {
        let _ = self.expect(TokenKind::OpenParen)?;
        let mut args = Vec::new();

        while !self.check(TokenKind::CloseParen) && !self.at_end() {
            if self.check(TokenKind::Identifier) && self.peek_kind(1) == Some(TokenKind::Assign) {
                let name_tok = self.bump();
                let _ = self.bump(); // '='
                let value = self.parse_expression()?;
                let loc = name_tok.location.span_to(value.loc());

                args.push(Expr::NamedArg(NamedArgExpr {
                    name: IdentExpr::new(name_tok.value, name_tok.location),
                    value: Box::new(value),
                    loc,
                }));
            } else {
                args.push(self.parse_expression()?);
            }

            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }

        let close = self.expect(TokenKind::CloseParen)?;
        Ok((args, close.location))
    }

    /// The primary dispatch.
    fn parse_primary(&mut self) -> ParseResult<Expr> {
        match self.current_kind() {
            kind if literal_kind(kind).is_some() => {
                let token = self.bump();
                let kind = literal_kind(token.kind).unwrap_or(LiteralKind::Null);

                Ok(Expr::Literal(LiteralExpr { kind, value: token.value, loc: token.location }))
            }
            TokenKind::Identifier | TokenKind::Scope => self.parse_scope_path(),
            TokenKind::Await | TokenKind::Spawn | TokenKind::Thread => {
                let token = self.bump();
                let kind = match token.kind {
                    TokenKind::Spawn => AsyncKind::Spawn,
                    TokenKind::Thread => AsyncKind::Thread,
                    _ => AsyncKind::Await,
                };

                let value = self.parse_unary()?;
                let loc = token.location.span_to(value.loc());

                Ok(Expr::Async(AsyncExpr { kind, value: Box::new(value), loc }))
            }
            TokenKind::OpenParen => self.parse_paren_or_tuple(),
            TokenKind::OpenBracket => self.parse_array_literal(),
            TokenKind::OpenBrace => self.parse_brace_literal(),
            TokenKind::Fn => self.parse_lambda(),
            _ => Err(self.unexpected("an expression")),
        }
    }

    /// Parses `a::b::c`, producing an identifier for a single segment.
    ///
    /// A leading `::` roots the path in the global namespace with an empty
    /// first segment.
    pub(crate) fn parse_scope_path(&mut self) -> ParseResult<Expr> {
        let mut segments = Vec::new();
        let start = self.current().location.clone();

        if self.check(TokenKind::Scope) {
            let token = self.bump();
            segments.push(IdentExpr::new("", token.location));
        }

        loop {
            let token = self.expect(TokenKind::Identifier)?;
            segments.push(IdentExpr::new(token.value, token.location));

            if !(self.check(TokenKind::Scope)
                && self.peek_kind(1) == Some(TokenKind::Identifier))
            {
                break;
            }
            let _ = self.bump();
        }

        if segments.len() == 1 {
            let only = segments.pop().unwrap_or_else(|| IdentExpr::new("", start));
            return Ok(Expr::Ident(only));
        }

        let loc = start.span_to(&segments.last().map(|s| s.loc.clone()).unwrap_or(start.clone()));
        Ok(Expr::Scope(ScopePathExpr { segments, loc }))
    }

    /// `(` expression `)` or `(` a `,` b `,` ... `)`.
    fn parse_paren_or_tuple(&mut self) -> ParseResult<Expr> {
        let open = self.bump();

        if self.check(TokenKind::CloseParen) {
            let close = self.bump();
            return Ok(Expr::TupleLiteral(TupleLiteralExpr {
                values: Vec::new(),
                loc: open.location.span_to(&close.location),
            }));
        }

        let first = self.parse_expression()?;

        if self.eat(TokenKind::Comma).is_some() {
            let mut values = vec![first];

            while !self.check(TokenKind::CloseParen) && !self.at_end() {
                values.push(self.parse_expression()?);

                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }

            let close = self.expect(TokenKind::CloseParen)?;
            return Ok(Expr::TupleLiteral(TupleLiteralExpr {
                values,
                loc: open.location.span_to(&close.location),
            }));
        }

        let close = self.expect(TokenKind::CloseParen)?;
        Ok(Expr::Paren(ParenExpr {
            value: Box::new(first),
            loc: open.location.span_to(&close.location),
        }))
    }

    /// `[` a `,` b `,` ... `]`.
    fn parse_array_literal(&mut self) -> ParseResult<Expr> {
        let open = self.bump();
        let mut values = Vec::new();

        while !self.check(TokenKind::CloseBracket) && !self.at_end() {
            values.push(self.parse_expression()?);

            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }

        let close = self.expect(TokenKind::CloseBracket)?;
        Ok(Expr::ArrayLiteral(ArrayLiteralExpr {
            values,
            loc: open.location.span_to(&close.location),
        }))
    }

    /// `{` ... `}`: an object initializer when the first token is `.`, a
    /// map when a `:` follows the first expression, a set otherwise.
    fn parse_brace_literal(&mut self) -> ParseResult<Expr> {
        let open = self.bump();

        if self.check(TokenKind::Dot) {
            return self.parse_obj_init(open.location);
        }

        if self.check(TokenKind::CloseBrace) {
            let close = self.bump();
            return Ok(Expr::MapLiteral(MapLiteralExpr {
                pairs: Vec::new(),
                loc: open.location.span_to(&close.location),
            }));
        }

        let first = self.parse_expression()?;

        if self.eat(TokenKind::Colon).is_some() {
            let value = self.parse_expression()?;
            let pair_loc = first.loc().span_to(value.loc());
            let mut pairs = vec![MapPairExpr {
                key: Box::new(first),
                value: Box::new(value),
                loc: pair_loc,
            }];

            while self.eat(TokenKind::Comma).is_some() {
                if self.check(TokenKind::CloseBrace) {
                    break;
                }

                let key = self.parse_expression()?;
                let _ = self.expect(TokenKind::Colon)?;
                let value = self.parse_expression()?;
                let loc = key.loc().span_to(value.loc());

                pairs.push(MapPairExpr { key: Box::new(key), value: Box::new(value), loc });
            }

            let close = self.expect(TokenKind::CloseBrace)?;
            return Ok(Expr::MapLiteral(MapLiteralExpr {
                pairs,
                loc: open.location.span_to(&close.location),
            }));
        }

        let mut values = vec![first];
        while self.eat(TokenKind::Comma).is_some() {
            if self.check(TokenKind::CloseBrace) {
                break;
            }
            values.push(self.parse_expression()?);
        }

        let close = self.expect(TokenKind::CloseBrace)?;
        Ok(Expr::SetLiteral(SetLiteralExpr {
            values,
            loc: open.location.span_to(&close.location),
        }))
    }

    /// `{ .field = value, ... }` with the opening brace already consumed.
    fn parse_obj_init(&mut self, open: hlx_source::Location) -> ParseResult<Expr> {
        let mut fields = Vec::new();

        while !self.check(TokenKind::CloseBrace) && !self.at_end() {
            let _ = self.expect(TokenKind::Dot)?;
            let name_tok = self.expect(TokenKind::Identifier)?;
            let _ = self.expect(TokenKind::Assign)?;
            let value = self.parse_expression()?;
            let loc = name_tok.location.span_to(value.loc());

            fields.push(NamedArgExpr {
                name: IdentExpr::new(name_tok.value, name_tok.location),
                value: Box::new(value),
                loc,
            });

            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }

        let close = self.expect(TokenKind::CloseBrace)?;
        Ok(Expr::ObjInit(ObjInitExpr {
            path: None,
            fields,
            loc: open.span_to(&close.location),
        }))
    }

    /// `fn (a, b) { ... }` in expression position.
    fn parse_lambda(&mut self) -> ParseResult<Expr> {
        let open = self.bump();
        let _ = self.expect(TokenKind::OpenParen)?;

        let mut params = Vec::new();
        while !self.check(TokenKind::CloseParen) && !self.at_end() {
            let token = self.expect(TokenKind::Identifier)?;
            params.push(IdentExpr::new(token.value, token.location));

            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        let _ = self.expect(TokenKind::CloseParen)?;

        let body = self.parse_suite()?;
        let loc = open.location.span_to(&body.loc);

        Ok(Expr::Lambda(LambdaExpr { params, body: Box::new(body), loc }))
    }

    // ---- types ----------------------------------------------------------

    /// Parses a type.
    pub(crate) fn parse_type(&mut self) -> ParseResult<Ty> {
        let start = self.current().location.clone();
        let is_const = self.eat(TokenKind::Const).is_some();

        match self.current_kind() {
            TokenKind::OpenParen => {
                let _ = self.bump();
                let mut elems = Vec::new();

                while !self.check(TokenKind::CloseParen) && !self.at_end() {
                    elems.push(self.parse_type()?);

                    if self.eat(TokenKind::Comma).is_none() {
                        break;
                    }
                }

                let close = self.expect(TokenKind::CloseParen)?;
                Ok(Ty::Tuple(TupleTy { elems, loc: start.span_to(&close.location) }))
            }
            TokenKind::OpenBracket => {
                let _ = self.bump();
                let elem = self.parse_type()?;

                let size = if self.eat(TokenKind::Semicolon).is_some() {
                    Some(Box::new(self.parse_expression()?))
                } else {
                    None
                };

                let close = self.expect(TokenKind::CloseBracket)?;
                Ok(Ty::Array(ArrayTy {
                    elem: Box::new(elem),
                    size,
                    loc: start.span_to(&close.location),
                }))
            }
            TokenKind::Identifier | TokenKind::Scope => {
                let path = self.parse_scope_path()?;

                // In type position `<` is unambiguous.
                let generics = if self.check(TokenKind::LessThan) {
                    Some(self.parse_generic_invoke()?)
                } else {
                    None
                };

                let end = generics
                    .as_ref()
                    .map_or_else(|| path.loc().clone(), |inv| inv.loc.clone());

                Ok(Ty::Path(PathTy {
                    value: Box::new(path),
                    generics,
                    is_const,
                    loc: start.span_to(&end),
                }))
            }
            _ => Err(self.unexpected("a type")),
        }
    }
}
