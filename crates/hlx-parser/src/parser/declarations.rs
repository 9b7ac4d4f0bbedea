//! Declaration parsing.
//!
//! Leading modifier tokens are accumulated into a bag, the declaration
//! keyword picks the sub-parser, and the bag is validated against the
//! declaration's accepted modifier categories; a rejected modifier is an
//! "invalid modifier" diagnostic at that modifier's token.

use hlx_ast::modifiers::{AccessSpecifier, Modifier, ModifierKind, Modifiers};
use hlx_ast::nodes::{
    ClassDecl,
    ConstDecl,
    Decl,
    EnumDecl,
    EnumMemberDecl,
    Expr,
    FfiDecl,
    FuncDecl,
    IdentExpr,
    InterfaceDecl,
    LetDecl,
    LiteralExpr,
    LiteralKind,
    ModuleDecl,
    OpDecl,
    RequiresDecl,
    RequiresParamDecl,
    RequiresParamListDecl,
    ScopePathExpr,
    Stmt,
    StructDecl,
    SuiteStmt,
    TypeAliasDecl,
    TypeBoundDecl,
    TypeBoundListDecl,
    UdtDeriveDecl,
    VarDecl,
};

use super::{ParseResult, Parser};
use crate::diagnostics::CodeError;
use crate::token::{Token, TokenKind};

/// Maps a modifier token kind to the AST modifier kind.
fn modifier_kind(kind: TokenKind) -> Option<ModifierKind> {
    let mapped = match kind {
        TokenKind::Public => ModifierKind::Public,
        TokenKind::Private => ModifierKind::Private,
        TokenKind::Protected => ModifierKind::Protected,
        TokenKind::Internal => ModifierKind::Internal,
        TokenKind::Inline => ModifierKind::Inline,
        TokenKind::Async => ModifierKind::Async,
        TokenKind::Static => ModifierKind::Static,
        TokenKind::Const => ModifierKind::Const,
        TokenKind::Eval => ModifierKind::Eval,
        TokenKind::Ffi => ModifierKind::Ffi,
        _ => return None,
    };

    Some(mapped)
}

impl Parser<'_> {
    /// Whether the current token opens a declaration (possibly through a
    /// run of modifiers).
    pub(crate) fn starts_declaration(&self) -> bool {
        match self.current_kind() {
            TokenKind::Fn
            | TokenKind::Let
            | TokenKind::Const
            | TokenKind::Class
            | TokenKind::Struct
            | TokenKind::Enum
            | TokenKind::Interface
            | TokenKind::Type
            | TokenKind::Op
            | TokenKind::Module
            | TokenKind::Public
            | TokenKind::Private
            | TokenKind::Protected
            | TokenKind::Internal
            | TokenKind::Static
            | TokenKind::Inline
            | TokenKind::Async
            | TokenKind::Eval => true,
            TokenKind::Ffi => true,
            _ => false,
        }
    }

    /// Parses one declaration with its modifier bag.
    pub(crate) fn parse_declaration(&mut self) -> ParseResult<Stmt> {
        let raw_modifiers = self.collect_modifiers();

        let decl = match self.current_kind() {
            TokenKind::Fn => self.parse_func(raw_modifiers).map(Decl::Func)?,
            TokenKind::Let => self.parse_let(raw_modifiers)?,
            TokenKind::Const => self.parse_const(raw_modifiers)?,
            TokenKind::Class => self.parse_class(raw_modifiers)?,
            TokenKind::Struct => self.parse_struct(raw_modifiers)?,
            TokenKind::Interface => self.parse_interface(raw_modifiers)?,
            TokenKind::Enum => self.parse_enum(raw_modifiers)?,
            TokenKind::Type => self.parse_type_alias(raw_modifiers)?,
            TokenKind::Ffi => self.parse_ffi(raw_modifiers)?,
            TokenKind::Op => self.parse_op(raw_modifiers)?,
            TokenKind::Module => self.parse_module(raw_modifiers)?,
            _ => return Err(self.unexpected("a declaration")),
        };

        Ok(Stmt::Decl(Box::new(decl)))
    }

    /// Accumulates leading modifier tokens.
    ///
    /// `const` and `ffi` double as declaration keywords: `const` is only a
    /// modifier when another modifier or `fn` follows, and `ffi` only when
    /// no ABI string follows.
    fn collect_modifiers(&mut self) -> Vec<Token> {
        let mut raw = Vec::new();

        loop {
            let kind = self.current_kind();

            let is_modifier = match kind {
                TokenKind::Const => match self.peek_kind(1) {
                    Some(TokenKind::Fn) => true,
                    Some(next) => modifier_kind(next).is_some(),
                    None => false,
                },
                TokenKind::Ffi => self.peek_kind(1) != Some(TokenKind::StringLiteral),
                _ => modifier_kind(kind).is_some(),
            };

            if !is_modifier {
                break;
            }

            raw.push(self.bump());
        }

        raw
    }

    /// Validates raw modifier tokens against a bag, reporting rejects.
    fn apply_modifiers(
        &mut self,
        raw: Vec<Token>,
        mut bag: Modifiers,
        decl: &'static str,
    ) -> ParseResult<Modifiers> {
        for token in raw {
            let Some(kind) = modifier_kind(token.kind) else { continue };

            if bag.add(Modifier::new(kind, token.location.clone())).is_err() {
                let _ = self.report_at(
                    CodeError::new(&token, 3003)
                        .arg("modifier", token.value.clone())
                        .arg("decl", decl)
                        .fix_arg("modifier", token.value.clone()),
                )?;
            }
        }

        Ok(bag)
    }

    // ---- functions ------------------------------------------------------

    /// `fn name <generics>? ( params ) -> ret? requires-bounds? body`
    ///
    /// Inside a class body the receiver rules apply: a bare `self` first
    /// parameter marks a method, `self` with a type or default is an error,
    /// `static` combined with `self` is an error, and a member with
    /// neither warns and has `static` synthesized.
    pub(crate) fn parse_func(&mut self, raw_modifiers: Vec<Token>) -> ParseResult<FuncDecl> {
        let start = self.expect(TokenKind::Fn)?;
        let name_tok = self.expect(TokenKind::Identifier)?;
        let name = IdentExpr::new(name_tok.value.clone(), name_tok.location.clone());

        let generics = if self.check(TokenKind::LessThan) {
            Some(self.parse_requires_decl()?)
        } else {
            None
        };

        let params = self.parse_params()?;

        let returns = if self.eat(TokenKind::Arrow).is_some() {
            Some(self.parse_type()?)
        } else {
            None
        };

        let generics = self.parse_requires_bounds(generics)?;

        let mut modifiers =
            self.apply_modifiers(raw_modifiers, Modifiers::for_function(), "a function")?;

        // Receiver rules only apply to class members.
        if self.in_class_body() {
            let self_param = params.first().filter(|p| p.var.name.name == "self").cloned();

            if let Some(param) = &self_param {
                if param.var.ty.is_some() || param.value.is_some() {
                    let pof = Token::new(
                        TokenKind::Identifier,
                        "self",
                        param.var.name.loc.clone(),
                    );
                    let _ = self.report_at(CodeError::new(&pof, 3006))?;
                } else if modifiers.contains(ModifierKind::Static) {
                    let pof = Token::new(
                        TokenKind::Identifier,
                        "self",
                        param.var.name.loc.clone(),
                    );
                    let _ = self.report_at(CodeError::new(&pof, 3005))?;
                }
            } else if !modifiers.contains(ModifierKind::Static) {
                let _ = self.report_at(
                    CodeError::new(&name_tok, 3004).arg("name", name.name.clone()),
                )?;
                let _ = modifiers.add(Modifier::synthesized(ModifierKind::Static));
            }
        }

        let (body, end) = if self.check(TokenKind::OpenBrace) || self.check(TokenKind::Colon) {
            let suite = self.parse_suite()?;
            let loc = suite.loc.clone();
            (Some(suite), loc)
        } else {
            let semi = self.expect_semicolon()?;
            (None, semi.location)
        };

        Ok(FuncDecl {
            name,
            generics,
            params,
            returns,
            body,
            modifiers,
            loc: start.location.span_to(&end),
        })
    }

    /// `( name[: ty][= default], ... )`
    fn parse_params(&mut self) -> ParseResult<Vec<VarDecl>> {
        let _ = self.expect(TokenKind::OpenParen)?;
        let mut params = Vec::new();

        while !self.check(TokenKind::CloseParen) && !self.at_end() {
            let var = self.parse_named_var_specifier()?;

            let value = if self.eat(TokenKind::Assign).is_some() {
                Some(self.parse_expression()?)
            } else {
                None
            };

            let loc = value
                .as_ref()
                .map_or_else(|| var.loc.clone(), |expr| var.loc.span_to(expr.loc()));

            params.push(VarDecl { var, value, modifiers: Modifiers::for_variable(), loc });

            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }

        let _ = self.expect(TokenKind::CloseParen)?;
        Ok(params)
    }

    // ---- generics -------------------------------------------------------

    /// `< [const] name[: ty][= default], ... >`
    pub(crate) fn parse_requires_decl(&mut self) -> ParseResult<RequiresDecl> {
        let open = self.expect(TokenKind::LessThan)?;
        let mut params = Vec::new();

        while !self.check(TokenKind::GreaterThan) && !self.at_end() {
            let param_start = self.current().location.clone();
            let is_const = self.eat(TokenKind::Const).is_some();
            let var = self.parse_named_var_specifier()?;

            let value = if self.eat(TokenKind::Assign).is_some() {
                Some(self.parse_expression()?)
            } else {
                None
            };

            let loc = value
                .as_ref()
                .map_or_else(|| param_start.span_to(&var.loc), |expr| {
                    param_start.span_to(expr.loc())
                });

            params.push(RequiresParamDecl { is_const, var, value, loc });

            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }

        let close = self.expect(TokenKind::GreaterThan)?;
        let loc = open.location.span_to(&close.location);

        Ok(RequiresDecl {
            params: RequiresParamListDecl { params, loc: loc.clone() },
            bounds: None,
            loc,
        })
    }

    /// Optional `requires bound (&& bound)*` clause attached to a generics
    /// declaration.
    fn parse_requires_bounds(
        &mut self,
        generics: Option<RequiresDecl>,
    ) -> ParseResult<Option<RequiresDecl>> {
        if !self.check(TokenKind::Requires) {
            return Ok(generics);
        }

        let requires_tok = self.bump();
        let mut bounds = Vec::new();

        loop {
            let bound = self.parse_expression()?;
            let loc = bound.loc().clone();
            bounds.push(TypeBoundDecl { bound, loc });

            if self.eat(TokenKind::LogicalAnd).is_none() {
                break;
            }
        }

        let end = bounds
            .last()
            .map_or_else(|| requires_tok.location.clone(), |bound| bound.loc.clone());
        let bound_list =
            TypeBoundListDecl { bounds, loc: requires_tok.location.span_to(&end) };

        let mut generics = generics.unwrap_or(RequiresDecl {
            params: RequiresParamListDecl {
                params: Vec::new(),
                loc: requires_tok.location.clone(),
            },
            bounds: None,
            loc: requires_tok.location.clone(),
        });

        generics.loc = generics.loc.span_to(&bound_list.loc);
        generics.bounds = Some(bound_list);

        Ok(Some(generics))
    }

    // ---- bindings -------------------------------------------------------

    /// `let a: T = e, b = f;`
    fn parse_let(&mut self, raw_modifiers: Vec<Token>) -> ParseResult<Decl> {
        let start = self.expect(TokenKind::Let)?;
        let modifiers =
            self.apply_modifiers(raw_modifiers, Modifiers::for_variable(), "a let binding")?;

        let vars = self.parse_var_decls()?;
        let semi = self.expect_semicolon()?;

        Ok(Decl::Let(LetDecl { vars, modifiers, loc: start.location.span_to(&semi.location) }))
    }

    /// `const a: T = e;`
    fn parse_const(&mut self, raw_modifiers: Vec<Token>) -> ParseResult<Decl> {
        let start = self.expect(TokenKind::Const)?;
        let modifiers = self.apply_modifiers(
            raw_modifiers,
            Modifiers::for_variable(),
            "a const binding",
        )?;

        let vars = self.parse_var_decls()?;
        let semi = self.expect_semicolon()?;

        Ok(Decl::Const(ConstDecl {
            vars,
            modifiers,
            loc: start.location.span_to(&semi.location),
        }))
    }

    fn parse_var_decls(&mut self) -> ParseResult<Vec<VarDecl>> {
        let mut vars = Vec::new();

        loop {
            let var = self.parse_named_var_specifier()?;

            let value = if self.eat(TokenKind::Assign).is_some() {
                Some(self.parse_expression()?)
            } else {
                None
            };

            let loc = value
                .as_ref()
                .map_or_else(|| var.loc.clone(), |expr| var.loc.span_to(expr.loc()));

            vars.push(VarDecl { var, value, modifiers: Modifiers::for_variable(), loc });

            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }

        Ok(vars)
    }

    // ---- user-defined types ---------------------------------------------

    /// `derives access? Type (, access? Type)*`; access defaults to public.
    fn parse_derives(&mut self) -> ParseResult<Option<UdtDeriveDecl>> {
        if !self.check(TokenKind::Derives) {
            return Ok(None);
        }

        let start = self.bump();
        let mut derives = Vec::new();

        loop {
            let access = match self.current_kind() {
                TokenKind::Public => {
                    let _ = self.bump();
                    AccessSpecifier::Public
                }
                TokenKind::Private => {
                    let _ = self.bump();
                    AccessSpecifier::Private
                }
                TokenKind::Protected => {
                    let _ = self.bump();
                    AccessSpecifier::Protected
                }
                TokenKind::Internal => {
                    let _ = self.bump();
                    AccessSpecifier::Internal
                }
                _ => AccessSpecifier::Public,
            };

            let ty = self.parse_type()?;
            derives.push((ty, access));

            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }

        let end = derives
            .last()
            .map_or_else(|| start.location.clone(), |(ty, _)| ty.loc().clone());

        Ok(Some(UdtDeriveDecl { derives, loc: start.location.span_to(&end) }))
    }

    fn parse_class(&mut self, raw_modifiers: Vec<Token>) -> ParseResult<Decl> {
        let start = self.expect(TokenKind::Class)?;
        let name_tok = self.expect(TokenKind::Identifier)?;

        let generics = if self.check(TokenKind::LessThan) {
            Some(self.parse_requires_decl()?)
        } else {
            None
        };
        let derives = self.parse_derives()?;
        let generics = self.parse_requires_bounds(generics)?;

        let modifiers =
            self.apply_modifiers(raw_modifiers, Modifiers::for_class(), "a class")?;

        let (body, end) = self.parse_udt_body(true)?;

        Ok(Decl::Class(ClassDecl {
            name: IdentExpr::new(name_tok.value, name_tok.location),
            generics,
            derives,
            body,
            modifiers,
            loc: start.location.span_to(&end),
        }))
    }

    fn parse_struct(&mut self, raw_modifiers: Vec<Token>) -> ParseResult<Decl> {
        let start = self.expect(TokenKind::Struct)?;
        let name_tok = self.expect(TokenKind::Identifier)?;

        let generics = if self.check(TokenKind::LessThan) {
            Some(self.parse_requires_decl()?)
        } else {
            None
        };
        let derives = self.parse_derives()?;
        let generics = self.parse_requires_bounds(generics)?;

        let modifiers =
            self.apply_modifiers(raw_modifiers, Modifiers::for_class(), "a struct")?;

        let (body, end) = self.parse_udt_body(false)?;

        Ok(Decl::Struct(StructDecl {
            name: IdentExpr::new(name_tok.value, name_tok.location),
            generics,
            derives,
            body,
            modifiers,
            loc: start.location.span_to(&end),
        }))
    }

    fn parse_interface(&mut self, raw_modifiers: Vec<Token>) -> ParseResult<Decl> {
        let start = self.expect(TokenKind::Interface)?;
        let name_tok = self.expect(TokenKind::Identifier)?;

        let generics = if self.check(TokenKind::LessThan) {
            Some(self.parse_requires_decl()?)
        } else {
            None
        };
        let derives = self.parse_derives()?;
        let generics = self.parse_requires_bounds(generics)?;

        let modifiers =
            self.apply_modifiers(raw_modifiers, Modifiers::for_class(), "an interface")?;

        // Interfaces cannot be forward declared.
        if self.check(TokenKind::Semicolon) {
            let semi = self.current().clone();
            let _ = self.report_at(CodeError::new(&semi, 3007))?;
            let _ = self.bump();

            return Ok(Decl::Interface(InterfaceDecl {
                name: IdentExpr::new(name_tok.value, name_tok.location),
                generics,
                derives,
                body: None,
                modifiers,
                loc: start.location.span_to(&semi.location),
            }));
        }

        let (body, end) = self.parse_udt_body(false)?;

        Ok(Decl::Interface(InterfaceDecl {
            name: IdentExpr::new(name_tok.value, name_tok.location),
            generics,
            derives,
            body,
            modifiers,
            loc: start.location.span_to(&end),
        }))
    }

    /// Parses a user-defined type body.
    ///
    /// Only `class` bodies enter the class context: the receiver rules
    /// (`self`/`static` validation, synthesized `static`) apply to class
    /// members, not to struct or interface members.
    fn parse_udt_body(
        &mut self,
        is_class: bool,
    ) -> ParseResult<(Option<SuiteStmt>, hlx_source::Location)> {
        if self.check(TokenKind::Semicolon) {
            let semi = self.bump();
            return Ok((None, semi.location));
        }

        if is_class {
            self.enter_class();
        }
        let body = self.parse_suite();
        if is_class {
            self.exit_class();
        }

        let body = body?;
        let end = body.loc.clone();

        Ok((Some(body), end))
    }

    /// `enum Name [: Underlying] { Member [= value], ... }`
    fn parse_enum(&mut self, raw_modifiers: Vec<Token>) -> ParseResult<Decl> {
        let start = self.expect(TokenKind::Enum)?;
        let name_tok = self.expect(TokenKind::Identifier)?;

        let derives = if self.eat(TokenKind::Colon).is_some() {
            Some(self.parse_type()?)
        } else {
            None
        };

        let modifiers =
            self.apply_modifiers(raw_modifiers, Modifiers::for_class(), "an enum")?;

        let _ = self.expect(TokenKind::OpenBrace)?;
        let mut members = Vec::new();

        while !self.check(TokenKind::CloseBrace) && !self.at_end() {
            let member_tok = self.expect(TokenKind::Identifier)?;

            let value = if self.eat(TokenKind::Assign).is_some() {
                Some(self.parse_expression()?)
            } else {
                None
            };

            let loc = value.as_ref().map_or_else(
                || member_tok.location.clone(),
                |expr| member_tok.location.span_to(expr.loc()),
            );

            members.push(EnumMemberDecl {
                name: IdentExpr::new(member_tok.value, member_tok.location),
                value,
                loc,
            });

            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }

        let close = self.expect(TokenKind::CloseBrace)?;

        Ok(Decl::Enum(EnumDecl {
            name: IdentExpr::new(name_tok.value, name_tok.location),
            derives,
            members,
            modifiers,
            loc: start.location.span_to(&close.location),
        }))
    }

    /// `type Name <generics>? = T;`
    fn parse_type_alias(&mut self, raw_modifiers: Vec<Token>) -> ParseResult<Decl> {
        let start = self.expect(TokenKind::Type)?;
        let name_tok = self.expect(TokenKind::Identifier)?;

        let generics = if self.check(TokenKind::LessThan) {
            Some(self.parse_requires_decl()?)
        } else {
            None
        };

        let _ = self.expect(TokenKind::Assign)?;
        let value = self.parse_type()?;
        let semi = self.expect_semicolon()?;

        let modifiers =
            self.apply_modifiers(raw_modifiers, Modifiers::for_type_alias(), "a type alias")?;

        Ok(Decl::TypeAlias(TypeAliasDecl {
            name: IdentExpr::new(name_tok.value, name_tok.location),
            generics,
            value,
            modifiers,
            loc: start.location.span_to(&semi.location),
        }))
    }

    /// `ffi "<abi>" import ...;` or `ffi "<abi>" { import ...; ... }`
    fn parse_ffi(&mut self, raw_modifiers: Vec<Token>) -> ParseResult<Decl> {
        let start = self.expect(TokenKind::Ffi)?;
        let abi_tok = self.expect(TokenKind::StringLiteral)?;
        let abi = LiteralExpr {
            kind: LiteralKind::Str,
            value: abi_tok.value,
            loc: abi_tok.location,
        };

        let modifiers = self.apply_modifiers(
            raw_modifiers,
            Modifiers::for_variable(),
            "an FFI declaration",
        )?;

        let value = if self.check(TokenKind::OpenBrace) {
            let suite = self.parse_suite()?;
            let loc = suite.loc.clone();
            Stmt::Block(hlx_ast::nodes::BlockStmt { body: suite.body, loc })
        } else {
            self.parse_import_statement()?
        };

        let loc = start.location.span_to(value.loc());

        Ok(Decl::Ffi(FfiDecl { abi, value: Box::new(value), modifiers, loc }))
    }

    /// `op <operator tokens> fn name(params) -> ret body`
    fn parse_op(&mut self, raw_modifiers: Vec<Token>) -> ParseResult<Decl> {
        let start = self.expect(TokenKind::Op)?;
        let mut op = Vec::new();

        while !self.check(TokenKind::Fn) && !self.at_end() {
            let token = self.bump();

            if !(token.kind.is_operator()
                || matches!(
                    token.kind,
                    TokenKind::OpenBracket | TokenKind::CloseBracket | TokenKind::Dot
                ))
            {
                return Err(self.unexpected("an operator"));
            }

            op.push(token.value);
        }

        if op.is_empty() {
            return Err(self.unexpected("an operator"));
        }

        let modifiers = self.apply_modifiers(
            raw_modifiers,
            Modifiers::for_function(),
            "an operator overload",
        )?;

        let func = self.parse_func(Vec::new())?;
        let loc = start.location.span_to(&func.loc);

        Ok(Decl::Op(OpDecl { op, func, modifiers, loc }))
    }

    /// `module a::b { ... }` or anonymous `module { ... }`
    fn parse_module(&mut self, raw_modifiers: Vec<Token>) -> ParseResult<Decl> {
        let start = self.expect(TokenKind::Module)?;

        let name = if self.check(TokenKind::Identifier) {
            let path = self.parse_scope_path()?;

            let scope = match path {
                Expr::Scope(scope) => scope,
                Expr::Ident(ident) => {
                    let loc = ident.loc.clone();
                    ScopePathExpr { segments: vec![ident], loc }
                }
                _ => return Err(self.unexpected("a module path")),
            };

            Some(scope)
        } else {
            None
        };

        let modifiers =
            self.apply_modifiers(raw_modifiers, Modifiers::for_module(), "a module")?;

        let segment = name.as_ref().map_or_else(String::new, ScopePathExpr::qualified_name);
        self.push_namespace(segment);
        let body = self.parse_suite();
        self.pop_namespace();

        let body = body?;
        let loc = start.location.span_to(&body.loc);

        Ok(Decl::Module(ModuleDecl {
            name,
            body,
            inline_module: false,
            modifiers,
            loc,
        }))
    }
}
