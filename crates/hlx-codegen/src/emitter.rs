//! The CX-IR emitter: an AST visitor that lowers each node into IR tokens.
//!
//! The emitter appends to an internal buffer as it walks; the buffer is
//! append-only during emission and immutable once [`CxEmitter::finish`] has
//! been called. Constructs the IR cannot express report an
//! unsupported-construct diagnostic instead of producing output.

use hlx_ast::modifiers::{AccessSpecifier, ModifierKind};
use hlx_ast::nodes::{
    AsyncKind,
    Decl,
    Expr,
    FfiDecl,
    ForCore,
    FuncDecl,
    IfKind,
    InstOfOp,
    InterfaceDecl,
    NamedVarSpecifier,
    OpDecl,
    Program,
    RequiresDecl,
    Stmt,
    SuiteStmt,
    SwitchCaseKind,
    Ty,
    UnaryFixity,
};
use hlx_ast::visitor::Visitor;
use hlx_parser::diagnostics::{CodeError, DiagnosticEngine, EngineError};
use hlx_parser::token::{Token, TokenKind};
use hlx_source::Location;
use thiserror::Error;

use crate::tokens::{CxToken, CxTokenKind};

/// Error produced when emission cannot continue.
#[derive(Debug, Error)]
pub enum EmitError {
    /// Internal diagnostic-engine failure.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// The emitter.
///
/// The token buffer is append-only while emission runs; [`CxEmitter::finish`]
/// consumes the emitter, so a finished buffer can no longer change.
#[derive(Debug)]
pub struct CxEmitter<'e> {
    engine: &'e DiagnosticEngine,
    tokens: Vec<CxToken>,
    failure: Option<EngineError>,
    provenance: bool,
}

impl<'e> CxEmitter<'e> {
    /// Creates an emitter reporting through the given engine.
    #[must_use]
    pub fn new(engine: &'e DiagnosticEngine) -> Self {
        Self { engine, tokens: Vec::new(), failure: None, provenance: false }
    }

    /// Enables the provenance comment at the top of the unit.
    #[must_use]
    pub fn with_provenance(mut self) -> Self {
        self.provenance = true;
        self
    }

    /// Lowers a program into the internal buffer.
    ///
    /// ## Errors
    ///
    /// Returns [`EmitError`] only for internal engine failures; unsupported
    /// constructs are diagnostics, not errors of this function.
    pub fn emit_program(&mut self, program: &Program) -> Result<(), EmitError> {
        log::debug!("emitting CX-IR for {}", program.file);

        if self.provenance {
            let stamp = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map_or(0, |d| d.as_secs());

            self.tokens.push(CxToken::with_value(
                CxTokenKind::Annotation,
                format!(
                    "// Generated by the HLX compiler; do not edit.\n\
                     // Generated on: {stamp} [unix-timestamp]\n"
                ),
            ));
        }

        self.visit_program(program);

        match self.failure.take() {
            Some(err) => Err(EmitError::Engine(err)),
            None => Ok(()),
        }
    }

    /// Closes the buffer and returns the token sequence.
    #[must_use]
    pub fn finish(self) -> Vec<CxToken> { self.tokens }

    /// Renders the buffer as a single compilable source string.
    #[must_use]
    pub fn to_source(&self) -> String {
        let mut out = String::new();

        for token in &self.tokens {
            out.push_str(&token.value);

            match token.kind {
                CxTokenKind::Semicolon | CxTokenKind::LBrace | CxTokenKind::RBrace => {
                    out.push('\n');
                }
                CxTokenKind::Annotation => {
                    if !token.value.ends_with('\n') {
                        out.push('\n');
                    }
                }
                _ => out.push(' '),
            }
        }

        out
    }

    /// Renders the buffer with line-column hints from the original tokens,
    /// one output line per distinct source line.
    #[must_use]
    pub fn to_readable(&self) -> String {
        let mut out = String::new();
        let mut current: Option<(std::sync::Arc<str>, u32)> = None;

        for token in &self.tokens {
            let key = (token.file.clone(), token.line);

            if token.line != 0 && current.as_ref() != Some(&key) {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(&format!("/* {}:{} */ ", token.file, token.line));
                current = Some(key);
            }

            out.push_str(&token.value);
            out.push(' ');
        }

        out.push('\n');
        out
    }

    // ---- buffer helpers -------------------------------------------------

    fn push(&mut self, kind: CxTokenKind) { self.tokens.push(CxToken::new(kind)); }

    fn pushv(&mut self, kind: CxTokenKind, value: impl Into<String>) {
        self.tokens.push(CxToken::with_value(kind, value));
    }

    fn pushs(&mut self, kind: CxTokenKind, value: impl Into<String>, loc: &Location) {
        self.tokens.push(CxToken::from_source(kind, value, loc));
    }

    /// Reports an unsupported construct at the given location.
    fn unsupported(&mut self, what: &str, loc: &Location) {
        let pof = Token::new(TokenKind::Unknown, "", loc.clone().with_length(loc.length.max(1)));

        if let Err(err) = self
            .engine
            .report(CodeError::new(&pof, 4001).arg("what", what))
        {
            self.failure.get_or_insert(err);
        }
    }

    fn report(&mut self, error: CodeError) {
        if let Err(err) = self.engine.report(error) {
            self.failure.get_or_insert(err);
        }
    }

    // ---- shared lowerings -----------------------------------------------

    /// `(type | auto) name`
    fn emit_var_specifier(&mut self, var: &NamedVarSpecifier) {
        match &var.ty {
            Some(ty) => self.visit_ty(ty),
            None => self.push(CxTokenKind::Auto),
        }

        self.pushs(CxTokenKind::Identifier, var.name.name.clone(), &var.name.loc);
    }

    /// `template < params > [requires bounds]`
    fn emit_template_clause(&mut self, generics: &RequiresDecl) {
        self.push(CxTokenKind::Template);
        self.push(CxTokenKind::Less);

        for (i, param) in generics.params.params.iter().enumerate() {
            if i > 0 {
                self.push(CxTokenKind::Comma);
            }

            match (&param.var.ty, param.is_const) {
                (Some(ty), _) => self.visit_ty(ty),
                (None, _) => self.push(CxTokenKind::Typename),
            }

            self.pushs(
                CxTokenKind::Identifier,
                param.var.name.name.clone(),
                &param.var.name.loc,
            );

            if let Some(value) = &param.value {
                self.pushv(CxTokenKind::Operator2, "=");
                self.visit_expr(value);
            }
        }

        self.push(CxTokenKind::Greater);

        if let Some(bounds) = &generics.bounds {
            self.push(CxTokenKind::Requires);

            for (i, bound) in bounds.bounds.iter().enumerate() {
                if i > 0 {
                    self.push(CxTokenKind::LogicalAnd);
                }
                self.visit_expr(&bound.bound);
            }
        }
    }

    /// Function lowering; `skip_return` for constructors, `strip_self` for
    /// methods.
    fn emit_func(&mut self, func: &FuncDecl, skip_return: bool, strip_self: bool) {
        if let Some(generics) = &func.generics {
            self.emit_template_clause(generics);
        }

        if func.modifiers.contains(ModifierKind::Static) {
            self.push(CxTokenKind::Static);
        }

        if func.modifiers.contains(ModifierKind::Inline) {
            self.push(CxTokenKind::Inline);
        }

        if !skip_return {
            match &func.returns {
                Some(ty) => self.visit_ty(ty),
                None => self.push(CxTokenKind::Void),
            }
        }

        self.pushs(CxTokenKind::Identifier, func.name.name.clone(), &func.name.loc);
        self.push(CxTokenKind::LParen);

        let params = if strip_self && func.takes_self() { &func.params[1..] } else { &func.params[..] };

        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.push(CxTokenKind::Comma);
            }

            self.emit_var_specifier(&param.var);

            if let Some(value) = &param.value {
                self.pushv(CxTokenKind::Operator2, "=");
                self.visit_expr(value);
            }
        }

        self.push(CxTokenKind::RParen);

        match &func.body {
            Some(body) => self.visit_suite(body),
            None => self.push(CxTokenKind::Semicolon),
        }
    }

    /// Emits the access-section marker for one class member.
    fn emit_access_marker(&mut self, access: Option<AccessSpecifier>) {
        let kind = match access {
            Some(AccessSpecifier::Private) => CxTokenKind::Private,
            Some(AccessSpecifier::Protected) => CxTokenKind::Protected,
            // Internal has no C++ counterpart; public is the closest fit.
            _ => CxTokenKind::Public,
        };

        self.push(kind);
        self.push(CxTokenKind::Colon);
    }

    /// Class / struct body with access markers and receiver stripping.
    fn emit_udt_body(&mut self, body: &SuiteStmt, class_name: &str) {
        self.push(CxTokenKind::LBrace);

        for child in &body.body {
            match child {
                Stmt::Decl(decl) => match decl.as_ref() {
                    Decl::Func(func) => {
                        self.emit_access_marker(func.modifiers.access());

                        let is_ctor = func.name.name == class_name;
                        self.emit_func(func, is_ctor, true);
                    }
                    Decl::Op(op) => {
                        self.emit_access_marker(op.modifiers.access());
                        self.emit_op(op, true);
                    }
                    _ => self.visit_stmt(child),
                },
                _ => self.visit_stmt(child),
            }
        }

        self.push(CxTokenKind::RBrace);
    }

    /// Operator overload: the backing function, then an inline forwarding
    /// `operator` wrapper.
    fn emit_op(&mut self, op: &OpDecl, strip_self: bool) {
        self.emit_func(&op.func, false, strip_self);

        if let Some(generics) = &op.func.generics {
            self.emit_template_clause(generics);
        }

        self.push(CxTokenKind::Inline);

        match &op.func.returns {
            Some(ty) => self.visit_ty(ty),
            None => self.push(CxTokenKind::Void),
        }

        self.push(CxTokenKind::Operator);
        for text in &op.op {
            self.pushv(CxTokenKind::Operator2, text.clone());
        }

        self.push(CxTokenKind::LParen);

        let params = if strip_self && op.func.takes_self() {
            &op.func.params[1..]
        } else {
            &op.func.params[..]
        };

        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.push(CxTokenKind::Comma);
            }
            self.emit_var_specifier(&param.var);
        }

        self.push(CxTokenKind::RParen);

        if op.func.body.is_some() {
            self.push(CxTokenKind::LBrace);
            self.push(CxTokenKind::Return);
            self.pushs(
                CxTokenKind::Identifier,
                op.func.name.name.clone(),
                &op.func.name.loc,
            );
            self.push(CxTokenKind::LParen);

            for (i, param) in params.iter().enumerate() {
                if i > 0 {
                    self.push(CxTokenKind::Comma);
                }
                self.pushs(
                    CxTokenKind::Identifier,
                    param.var.name.name.clone(),
                    &param.var.name.loc,
                );
            }

            self.push(CxTokenKind::RParen);
            self.push(CxTokenKind::Semicolon);
            self.push(CxTokenKind::RBrace);
        } else {
            self.push(CxTokenKind::Semicolon);
        }
    }

    /// Interface lowering: a template concept whose constraint expression
    /// is synthesized from the member signatures. Every member must be
    /// abstract.
    fn emit_interface(&mut self, decl: &InterfaceDecl) {
        let Some(body) = &decl.body else {
            // Forward declarations were already rejected by the parser.
            return;
        };

        // Collect member functions; a member with a body poisons the whole
        // interface and nothing is emitted for it.
        let mut members: Vec<&FuncDecl> = Vec::new();

        for child in &body.body {
            if let Stmt::Decl(inner) = child
                && let Decl::Func(func) = inner.as_ref()
            {
                if let Some(func_body) = &func.body {
                    let pof = Token::new(
                        TokenKind::OpenBrace,
                        "{",
                        func_body.loc.clone().with_length(1),
                    );
                    self.report(
                        CodeError::new(&pof, 4002).arg("name", func.name.name.clone()),
                    );
                    return;
                }

                members.push(func);
            }
        }

        // template <typename Self, ...> concept Name =
        self.push(CxTokenKind::Template);
        self.push(CxTokenKind::Less);
        self.push(CxTokenKind::Typename);
        self.pushv(CxTokenKind::Identifier, "Self");

        if let Some(generics) = &decl.generics {
            for param in &generics.params.params {
                self.push(CxTokenKind::Comma);

                match &param.var.ty {
                    Some(ty) => self.visit_ty(ty),
                    None => self.push(CxTokenKind::Typename),
                }
                self.pushs(
                    CxTokenKind::Identifier,
                    param.var.name.name.clone(),
                    &param.var.name.loc,
                );
            }
        }

        self.push(CxTokenKind::Greater);
        self.push(CxTokenKind::Concept);
        self.pushs(CxTokenKind::Identifier, decl.name.name.clone(), &decl.name.loc);
        self.pushv(CxTokenKind::Operator2, "=");

        // Derived concepts become conjuncts constraining Self.
        if let Some(derives) = &decl.derives {
            for (ty, _) in &derives.derives {
                self.visit_ty(ty);
                self.push(CxTokenKind::Less);
                self.pushv(CxTokenKind::Identifier, "Self");
                self.push(CxTokenKind::Greater);
                self.push(CxTokenKind::LogicalAnd);
            }
        }

        // One requires-expression per member signature.
        for func in members {
            self.push(CxTokenKind::Requires);
            self.push(CxTokenKind::LParen);
            self.pushv(CxTokenKind::Identifier, "Self");
            self.pushv(CxTokenKind::Identifier, "self");

            let params =
                if func.takes_self() { &func.params[1..] } else { &func.params[..] };

            for param in params {
                self.push(CxTokenKind::Comma);
                self.emit_var_specifier(&param.var);
            }

            self.push(CxTokenKind::RParen);
            self.push(CxTokenKind::LBrace);
            self.push(CxTokenKind::LBrace);
            self.pushv(CxTokenKind::Identifier, "self");
            self.push(CxTokenKind::Dot);
            self.pushs(CxTokenKind::Identifier, func.name.name.clone(), &func.name.loc);
            self.push(CxTokenKind::LParen);

            for (i, param) in params.iter().enumerate() {
                if i > 0 {
                    self.push(CxTokenKind::Comma);
                }
                self.pushs(
                    CxTokenKind::Identifier,
                    param.var.name.name.clone(),
                    &param.var.name.loc,
                );
            }

            self.push(CxTokenKind::RParen);
            self.push(CxTokenKind::RBrace);
            self.push(CxTokenKind::PtrAccess);
            self.pushv(CxTokenKind::Identifier, "std");
            self.push(CxTokenKind::ScopeResolution);
            self.pushv(CxTokenKind::Identifier, "same_as");
            self.push(CxTokenKind::Less);

            match &func.returns {
                Some(ty) => self.visit_ty(ty),
                None => self.push(CxTokenKind::Void),
            }

            self.push(CxTokenKind::Greater);
            self.push(CxTokenKind::Semicolon);
            self.push(CxTokenKind::RBrace);
            self.push(CxTokenKind::LogicalAnd);
        }

        // Close the conjunction.
        self.push(CxTokenKind::True);
        self.push(CxTokenKind::Semicolon);
    }

    /// FFI lowering: a `"c++"` import becomes a preprocessor include.
    fn emit_ffi(&mut self, decl: &FfiDecl) {
        if decl.abi.value.trim_matches('"') != "c++" {
            self.unsupported("a non-C++ FFI ABI", &decl.abi.loc);
            return;
        }

        match decl.value.as_ref() {
            Stmt::Block(block) => {
                for stmt in &block.body {
                    self.emit_ffi_import(stmt);
                }
            }
            stmt => self.emit_ffi_import(stmt),
        }
    }

    /// One FFI import: `#include "header"` with the original literal.
    fn emit_ffi_import(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::SingleImport(import) => {
                if let Expr::Literal(lit) = &import.path {
                    self.push(CxTokenKind::PpInclude);
                    self.pushs(CxTokenKind::Literal, lit.value.clone(), &lit.loc);
                    self.tokens.push(CxToken::with_value(CxTokenKind::Annotation, "\n"));
                } else {
                    self.unsupported("a non-literal FFI import", stmt.loc());
                }
            }
            _ => self.unsupported("this FFI form", stmt.loc()),
        }
    }
}

impl Visitor for CxEmitter<'_> {
    fn visit_program(&mut self, program: &Program) {
        for child in &program.children {
            self.visit_stmt(child);
        }
    }

    fn visit_suite(&mut self, suite: &SuiteStmt) {
        self.push(CxTokenKind::LBrace);

        for stmt in &suite.body {
            self.visit_stmt(stmt);
        }

        self.push(CxTokenKind::RBrace);
    }

    fn visit_annotation(&mut self, annotation: &hlx_ast::nodes::Annotation) {
        let hlx_ast::nodes::Annotation::Directive(directive) = annotation;

        self.pushs(
            CxTokenKind::Annotation,
            format!("/* {} */", directive.text),
            &directive.loc,
        );
    }

    #[allow(clippy::too_many_lines)]
    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::For(node) => {
                self.push(CxTokenKind::For);

                match &node.core {
                    ForCore::Python(core) => {
                        self.push(CxTokenKind::LParen);

                        for (i, var) in core.vars.iter().enumerate() {
                            if i > 0 {
                                self.push(CxTokenKind::Comma);
                            }
                            self.emit_var_specifier(var);
                        }

                        self.push(CxTokenKind::Colon);
                        self.visit_expr(&core.iterable);
                        self.push(CxTokenKind::RParen);
                    }
                    ForCore::C(core) => {
                        self.push(CxTokenKind::LParen);

                        match &core.init {
                            // The init statement carries its own semicolon.
                            Some(init) => self.visit_stmt(init),
                            None => self.push(CxTokenKind::Semicolon),
                        }

                        if let Some(condition) = &core.condition {
                            self.visit_expr(condition);
                        }
                        self.push(CxTokenKind::Semicolon);

                        if let Some(update) = &core.update {
                            self.visit_expr(update);
                        }

                        self.push(CxTokenKind::RParen);
                    }
                }

                self.visit_suite(&node.body);
            }
            Stmt::While(node) => {
                self.push(CxTokenKind::While);
                self.push(CxTokenKind::LParen);
                self.visit_expr(&node.condition);
                self.push(CxTokenKind::RParen);
                self.visit_suite(&node.body);
            }
            Stmt::If(node) => {
                self.push(CxTokenKind::If);

                if node.kind == IfKind::Unless {
                    self.push(CxTokenKind::LParen);
                    self.push(CxTokenKind::Exclamation);
                    self.push(CxTokenKind::LParen);
                    self.visit_expr(&node.condition);
                    self.push(CxTokenKind::RParen);
                    self.push(CxTokenKind::RParen);
                } else {
                    self.push(CxTokenKind::LParen);
                    self.visit_expr(&node.condition);
                    self.push(CxTokenKind::RParen);
                }

                self.visit_suite(&node.body);

                for branch in &node.else_branches {
                    self.push(CxTokenKind::Else);

                    if let Some(condition) = &branch.condition {
                        self.push(CxTokenKind::If);
                        self.push(CxTokenKind::LParen);

                        if branch.kind == hlx_ast::nodes::ElseKind::ElseUnless {
                            self.push(CxTokenKind::Exclamation);
                            self.push(CxTokenKind::LParen);
                            self.visit_expr(condition);
                            self.push(CxTokenKind::RParen);
                        } else {
                            self.visit_expr(condition);
                        }

                        self.push(CxTokenKind::RParen);
                    }

                    self.visit_suite(&branch.body);
                }
            }
            Stmt::Switch(node) => {
                self.push(CxTokenKind::Switch);
                self.push(CxTokenKind::LParen);
                self.visit_expr(&node.condition);
                self.push(CxTokenKind::RParen);
                self.push(CxTokenKind::LBrace);

                for case in &node.cases {
                    self.visit_stmt(&Stmt::SwitchCase(case.clone()));
                }

                self.push(CxTokenKind::RBrace);
            }
            Stmt::SwitchCase(node) => match node.kind {
                SwitchCaseKind::Case => {
                    self.push(CxTokenKind::Case);
                    if let Some(condition) = &node.condition {
                        self.visit_expr(condition);
                    }
                    self.push(CxTokenKind::Colon);
                    if let Some(body) = &node.body {
                        self.visit_suite(body);
                    }
                    self.push(CxTokenKind::Break);
                    self.push(CxTokenKind::Semicolon);
                }
                SwitchCaseKind::Fallthrough => {
                    self.push(CxTokenKind::Case);
                    if let Some(condition) = &node.condition {
                        self.visit_expr(condition);
                    }
                    self.push(CxTokenKind::Colon);
                    self.push(CxTokenKind::LBracket);
                    self.push(CxTokenKind::LBracket);
                    self.pushv(CxTokenKind::Identifier, "fallthrough");
                    self.push(CxTokenKind::RBracket);
                    self.push(CxTokenKind::RBracket);
                    self.push(CxTokenKind::Semicolon);
                }
                SwitchCaseKind::Default => {
                    self.push(CxTokenKind::Default);
                    self.push(CxTokenKind::Colon);
                    if let Some(body) = &node.body {
                        self.visit_suite(body);
                    }
                    self.push(CxTokenKind::Break);
                    self.push(CxTokenKind::Semicolon);
                }
            },
            Stmt::Yield(node) => {
                self.push(CxTokenKind::CoYield);
                if let Some(value) = &node.value {
                    self.visit_expr(value);
                }
                self.push(CxTokenKind::Semicolon);
            }
            Stmt::Delete(node) => {
                self.push(CxTokenKind::Delete);
                self.visit_expr(&node.value);
                self.push(CxTokenKind::Semicolon);
            }
            Stmt::Alias(node) => self.unsupported("a module-level alias", &node.loc),
            Stmt::SingleImport(node) => {
                self.unsupported("an unresolved import", &node.loc);
            }
            Stmt::MultiImport(node) => {
                self.unsupported("an unresolved import", &node.loc);
            }
            Stmt::Return(node) => {
                self.push(CxTokenKind::Return);
                if let Some(value) = &node.value {
                    self.visit_expr(value);
                }
                self.push(CxTokenKind::Semicolon);
            }
            Stmt::Break(_) => {
                self.push(CxTokenKind::Break);
                self.push(CxTokenKind::Semicolon);
            }
            Stmt::Continue(_) => {
                self.push(CxTokenKind::Continue);
                self.push(CxTokenKind::Semicolon);
            }
            Stmt::Block(node) => {
                for child in &node.body {
                    self.visit_stmt(child);
                }
            }
            Stmt::Suite(node) => self.visit_suite(node),
            Stmt::Try(node) => {
                if node.finally.is_some() {
                    self.unsupported("a try-finally pattern", &node.loc);
                    return;
                }

                self.push(CxTokenKind::Try);
                self.visit_suite(&node.body);

                for catch in &node.catches {
                    self.push(CxTokenKind::Catch);
                    self.push(CxTokenKind::LParen);

                    match &catch.binding {
                        Some(binding) => self.emit_var_specifier(binding),
                        None => self.pushv(CxTokenKind::Operator2, "..."),
                    }

                    self.push(CxTokenKind::RParen);
                    self.visit_suite(&catch.body);
                }
            }
            Stmt::Panic(node) => {
                self.push(CxTokenKind::Throw);
                self.visit_expr(&node.value);
                self.push(CxTokenKind::Semicolon);
            }
            Stmt::Expr(node) => {
                self.visit_expr(&node.value);
                self.push(CxTokenKind::Semicolon);
            }
            Stmt::Decl(node) => self.visit_decl(node),
            Stmt::Annotation(node) => self.visit_annotation(node),
        }
    }

    #[allow(clippy::too_many_lines)]
    fn visit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(node) => {
                self.pushs(CxTokenKind::Literal, node.value.clone(), &node.loc);
            }
            Expr::Ident(node) => {
                // `self` lowers to the dereferenced receiver.
                if node.name == "self" {
                    self.push(CxTokenKind::LParen);
                    self.push(CxTokenKind::Asterisk);
                    self.push(CxTokenKind::This);
                    self.push(CxTokenKind::RParen);
                    return;
                }

                self.pushs(CxTokenKind::Identifier, node.name.clone(), &node.loc);
            }
            Expr::Unary(node) => {
                if node.fixity == UnaryFixity::Postfix {
                    self.unsupported("a postfix unary operator", &node.loc);
                    return;
                }

                self.push(CxTokenKind::LParen);
                self.pushv(CxTokenKind::Operator2, node.op.as_str());
                self.push(CxTokenKind::LParen);
                self.visit_expr(&node.operand);
                self.push(CxTokenKind::RParen);
                self.push(CxTokenKind::RParen);
            }
            Expr::Binary(node) => {
                self.visit_expr(&node.lhs);
                self.pushv(CxTokenKind::Operator2, node.op.as_str());
                self.visit_expr(&node.rhs);
            }
            Expr::NamedArg(node) => {
                self.pushs(CxTokenKind::Identifier, node.name.name.clone(), &node.name.loc);
                self.pushv(CxTokenKind::Operator2, "=");
                self.visit_expr(&node.value);
            }
            Expr::Scope(node) => {
                for (i, segment) in node.segments.iter().enumerate() {
                    if i > 0 {
                        self.push(CxTokenKind::ScopeResolution);
                    }

                    if !segment.name.is_empty() {
                        self.pushs(
                            CxTokenKind::Identifier,
                            segment.name.clone(),
                            &segment.loc,
                        );
                    }
                }
            }
            Expr::Dot(node) => {
                self.visit_expr(&node.lhs);
                self.push(CxTokenKind::Dot);
                self.visit_expr(&node.rhs);
            }
            Expr::Index(node) => {
                self.visit_expr(&node.target);
                self.push(CxTokenKind::LBracket);
                self.visit_expr(&node.index);
                self.push(CxTokenKind::RBracket);
            }
            Expr::Call(node) => {
                self.visit_expr(&node.path);

                if let Some(generics) = &node.generics {
                    self.push(CxTokenKind::Less);

                    for (i, arg) in generics.args.iter().enumerate() {
                        if i > 0 {
                            self.push(CxTokenKind::Comma);
                        }
                        self.visit_ty(arg);
                    }

                    self.push(CxTokenKind::Greater);
                }

                self.push(CxTokenKind::LParen);

                for (i, arg) in node.args.iter().enumerate() {
                    if i > 0 {
                        self.push(CxTokenKind::Comma);
                    }
                    self.visit_expr(arg);
                }

                self.push(CxTokenKind::RParen);
            }
            Expr::ArrayLiteral(node) => {
                self.push(CxTokenKind::LBrace);
                for (i, value) in node.values.iter().enumerate() {
                    if i > 0 {
                        self.push(CxTokenKind::Comma);
                    }
                    self.visit_expr(value);
                }
                self.push(CxTokenKind::RBrace);
            }
            Expr::TupleLiteral(node) => {
                self.push(CxTokenKind::LBrace);
                for (i, value) in node.values.iter().enumerate() {
                    if i > 0 {
                        self.push(CxTokenKind::Comma);
                    }
                    self.visit_expr(value);
                }
                self.push(CxTokenKind::RBrace);
            }
            Expr::SetLiteral(node) => {
                self.push(CxTokenKind::LBrace);
                for (i, value) in node.values.iter().enumerate() {
                    if i > 0 {
                        self.push(CxTokenKind::Comma);
                    }
                    self.visit_expr(value);
                }
                self.push(CxTokenKind::RBrace);
            }
            Expr::MapLiteral(node) => self.unsupported("a map literal", &node.loc),
            Expr::ObjInit(node) => {
                if let Some(path) = &node.path {
                    self.visit_expr(path);
                }

                self.push(CxTokenKind::LBrace);
                for (i, field) in node.fields.iter().enumerate() {
                    if i > 0 {
                        self.push(CxTokenKind::Comma);
                    }
                    self.visit_expr(&field.value);
                }
                self.push(CxTokenKind::RBrace);
            }
            Expr::Lambda(node) => self.unsupported("a lambda expression", &node.loc),
            Expr::Ternary(node) => {
                // Both surface forms lower to the conditional operator.
                self.push(CxTokenKind::LParen);
                self.visit_expr(&node.condition);
                self.push(CxTokenKind::RParen);
                self.push(CxTokenKind::Question);
                self.visit_expr(&node.if_true);
                self.push(CxTokenKind::Colon);
                self.visit_expr(&node.if_false);
            }
            Expr::Paren(node) => {
                self.push(CxTokenKind::LParen);
                self.visit_expr(&node.value);
                self.push(CxTokenKind::RParen);
            }
            Expr::Cast(node) => {
                self.push(CxTokenKind::StaticCast);
                self.push(CxTokenKind::Less);
                self.visit_ty(&node.ty);
                self.push(CxTokenKind::Greater);
                self.push(CxTokenKind::LParen);
                self.visit_expr(&node.value);
                self.push(CxTokenKind::RParen);
            }
            Expr::InstOf(node) => match node.op {
                InstOfOp::Derives => {
                    self.pushv(CxTokenKind::Identifier, "std");
                    self.push(CxTokenKind::ScopeResolution);
                    self.pushv(CxTokenKind::Identifier, "is_base_of");
                    self.push(CxTokenKind::Less);
                    self.visit_ty(&node.ty);
                    self.push(CxTokenKind::Comma);
                    self.visit_expr(&node.value);
                    self.push(CxTokenKind::Greater);
                    self.push(CxTokenKind::ScopeResolution);
                    self.pushv(CxTokenKind::Identifier, "value");
                }
                InstOfOp::Has => {
                    self.visit_expr(&node.value);
                    self.push(CxTokenKind::Less);
                    self.visit_ty(&node.ty);
                    self.push(CxTokenKind::Greater);
                }
            },
            Expr::Async(node) => match node.kind {
                AsyncKind::Await => {
                    self.push(CxTokenKind::CoAwait);
                    self.visit_expr(&node.value);
                }
                AsyncKind::Spawn | AsyncKind::Thread => {
                    self.unsupported("a spawn/thread expression", &node.loc);
                }
            },
            Expr::Type(node) => self.visit_ty(&node.ty),
        }
    }

    #[allow(clippy::too_many_lines)]
    fn visit_decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Func(node) => self.emit_func(node, false, false),
            Decl::Var(node) => {
                self.emit_var_specifier(&node.var);

                if let Some(value) = &node.value {
                    self.pushv(CxTokenKind::Operator2, "=");
                    self.visit_expr(value);
                }
            }
            Decl::Let(node) => {
                for var in &node.vars {
                    self.visit_decl(&Decl::Var(var.clone()));
                    self.push(CxTokenKind::Semicolon);
                }
            }
            Decl::Const(node) => {
                for var in &node.vars {
                    self.push(CxTokenKind::Const);
                    self.visit_decl(&Decl::Var(var.clone()));
                    self.push(CxTokenKind::Semicolon);
                }
            }
            Decl::Class(node) => {
                if let Some(generics) = &node.generics {
                    self.emit_template_clause(generics);
                }

                self.push(CxTokenKind::Class);
                self.pushs(CxTokenKind::Identifier, node.name.name.clone(), &node.name.loc);

                if let Some(derives) = &node.derives {
                    self.push(CxTokenKind::Colon);
                    self.visit_decl(&Decl::UdtDerive(derives.clone()));
                }

                if let Some(body) = &node.body {
                    self.emit_udt_body(body, &node.name.name);
                }

                self.push(CxTokenKind::Semicolon);
            }
            Decl::Interface(node) => self.emit_interface(node),
            Decl::Struct(node) => {
                if let Some(generics) = &node.generics {
                    self.emit_template_clause(generics);
                }

                self.push(CxTokenKind::Struct);
                self.pushs(CxTokenKind::Identifier, node.name.name.clone(), &node.name.loc);

                if let Some(derives) = &node.derives {
                    self.push(CxTokenKind::Colon);
                    self.visit_decl(&Decl::UdtDerive(derives.clone()));
                }

                if let Some(body) = &node.body {
                    self.emit_udt_body(body, &node.name.name);
                }

                self.push(CxTokenKind::Semicolon);
            }
            Decl::Enum(node) => {
                self.push(CxTokenKind::Enum);
                self.push(CxTokenKind::Struct);
                self.pushs(CxTokenKind::Identifier, node.name.name.clone(), &node.name.loc);

                if let Some(derives) = &node.derives {
                    self.push(CxTokenKind::Colon);
                    self.visit_ty(derives);
                }

                self.push(CxTokenKind::LBrace);

                for (i, member) in node.members.iter().enumerate() {
                    if i > 0 {
                        self.push(CxTokenKind::Comma);
                    }
                    self.visit_decl(&Decl::EnumMember(member.clone()));
                }

                self.push(CxTokenKind::RBrace);
                self.push(CxTokenKind::Semicolon);
            }
            Decl::EnumMember(node) => {
                self.pushs(CxTokenKind::Identifier, node.name.name.clone(), &node.name.loc);

                if let Some(value) = &node.value {
                    self.pushv(CxTokenKind::Operator2, "=");
                    self.visit_expr(value);
                }
            }
            Decl::TypeAlias(node) => {
                if let Some(generics) = &node.generics {
                    self.emit_template_clause(generics);
                }

                self.push(CxTokenKind::Using);
                self.pushs(CxTokenKind::Identifier, node.name.name.clone(), &node.name.loc);
                self.pushv(CxTokenKind::Operator2, "=");
                self.visit_ty(&node.value);
                self.push(CxTokenKind::Semicolon);
            }
            Decl::Ffi(node) => self.emit_ffi(node),
            Decl::Op(node) => self.emit_op(node, false),
            Decl::Module(node) => {
                if node.inline_module {
                    self.push(CxTokenKind::Inline);
                }

                self.push(CxTokenKind::Namespace);

                if let Some(name) = &node.name {
                    for (i, segment) in name.segments.iter().enumerate() {
                        if i > 0 {
                            self.push(CxTokenKind::ScopeResolution);
                        }
                        self.pushs(
                            CxTokenKind::Identifier,
                            segment.name.clone(),
                            &segment.loc,
                        );
                    }
                }

                self.visit_suite(&node.body);
            }
            Decl::Requires(node) => self.emit_template_clause(node),
            Decl::RequiresParam(node) => {
                match (&node.var.ty, node.is_const) {
                    (Some(ty), _) => self.visit_ty(ty),
                    (None, _) => self.push(CxTokenKind::Typename),
                }

                self.pushs(
                    CxTokenKind::Identifier,
                    node.var.name.name.clone(),
                    &node.var.name.loc,
                );

                if let Some(value) = &node.value {
                    self.pushv(CxTokenKind::Operator2, "=");
                    self.visit_expr(value);
                }
            }
            Decl::RequiresParamList(node) => {
                for (i, param) in node.params.iter().enumerate() {
                    if i > 0 {
                        self.push(CxTokenKind::Comma);
                    }
                    self.visit_decl(&Decl::RequiresParam(param.clone()));
                }
            }
            Decl::TypeBound(node) => self.visit_expr(&node.bound),
            Decl::TypeBoundList(node) => {
                for (i, bound) in node.bounds.iter().enumerate() {
                    if i > 0 {
                        self.push(CxTokenKind::LogicalAnd);
                    }
                    self.visit_expr(&bound.bound);
                }
            }
            Decl::UdtDerive(node) => {
                for (i, (ty, access)) in node.derives.iter().enumerate() {
                    if i > 0 {
                        self.push(CxTokenKind::Comma);
                    }

                    match access {
                        AccessSpecifier::Public | AccessSpecifier::Internal => {
                            self.push(CxTokenKind::Public);
                        }
                        AccessSpecifier::Protected => self.push(CxTokenKind::Protected),
                        AccessSpecifier::Private => self.push(CxTokenKind::Private),
                    }

                    self.visit_ty(ty);
                }
            }
        }
    }

    fn visit_ty(&mut self, ty: &Ty) {
        match ty {
            Ty::Path(node) => {
                if node.is_const {
                    self.push(CxTokenKind::Const);
                }

                self.visit_expr(&node.value);

                if let Some(generics) = &node.generics {
                    self.push(CxTokenKind::Less);

                    for (i, arg) in generics.args.iter().enumerate() {
                        if i > 0 {
                            self.push(CxTokenKind::Comma);
                        }
                        self.visit_ty(arg);
                    }

                    self.push(CxTokenKind::Greater);
                }
            }
            Ty::Tuple(node) => {
                self.pushv(CxTokenKind::Identifier, "std");
                self.push(CxTokenKind::ScopeResolution);
                self.pushv(CxTokenKind::Identifier, "tuple");
                self.push(CxTokenKind::Less);

                for (i, elem) in node.elems.iter().enumerate() {
                    if i > 0 {
                        self.push(CxTokenKind::Comma);
                    }
                    self.visit_ty(elem);
                }

                self.push(CxTokenKind::Greater);
            }
            Ty::Array(node) => {
                self.pushv(CxTokenKind::Identifier, "std");
                self.push(CxTokenKind::ScopeResolution);

                match &node.size {
                    Some(size) => {
                        self.pushv(CxTokenKind::Identifier, "array");
                        self.push(CxTokenKind::Less);
                        self.visit_ty(&node.elem);
                        self.push(CxTokenKind::Comma);
                        self.visit_expr(size);
                        self.push(CxTokenKind::Greater);
                    }
                    None => {
                        self.pushv(CxTokenKind::Identifier, "vector");
                        self.push(CxTokenKind::Less);
                        self.visit_ty(&node.elem);
                        self.push(CxTokenKind::Greater);
                    }
                }
            }
        }
    }
}
