//! AST traversal.
//!
//! The [`Visitor`] trait provides one method per node category; the default
//! implementations walk into children via the free `walk_*` functions, whose
//! dispatch is a match over the category's variants. A visitor overrides
//! only the methods it cares about and calls the matching `walk_*` to
//! continue downward.

use crate::nodes::{
    Annotation,
    Decl,
    Expr,
    ForCore,
    Program,
    Stmt,
    SuiteStmt,
    Ty,
};

/// An AST visitor with default depth-first traversal.
pub trait Visitor: Sized {
    fn visit_program(&mut self, program: &Program) { walk_program(self, program); }

    fn visit_stmt(&mut self, stmt: &Stmt) { walk_stmt(self, stmt); }

    fn visit_expr(&mut self, expr: &Expr) { walk_expr(self, expr); }

    fn visit_decl(&mut self, decl: &Decl) { walk_decl(self, decl); }

    fn visit_ty(&mut self, ty: &Ty) { walk_ty(self, ty); }

    fn visit_annotation(&mut self, _annotation: &Annotation) {}

    fn visit_suite(&mut self, suite: &SuiteStmt) { walk_suite(self, suite); }
}

/// Walks every top-level child of a program.
pub fn walk_program<V: Visitor>(visitor: &mut V, program: &Program) {
    for child in &program.children {
        visitor.visit_stmt(child);
    }
}

/// Walks the children of a suite.
pub fn walk_suite<V: Visitor>(visitor: &mut V, suite: &SuiteStmt) {
    for stmt in &suite.body {
        visitor.visit_stmt(stmt);
    }
}

/// Walks the children of a statement.
pub fn walk_stmt<V: Visitor>(visitor: &mut V, stmt: &Stmt) {
    match stmt {
        Stmt::For(node) => {
            match &node.core {
                ForCore::Python(core) => {
                    for var in &core.vars {
                        if let Some(ty) = &var.ty {
                            visitor.visit_ty(ty);
                        }
                    }
                    visitor.visit_expr(&core.iterable);
                }
                ForCore::C(core) => {
                    if let Some(init) = &core.init {
                        visitor.visit_stmt(init);
                    }
                    if let Some(condition) = &core.condition {
                        visitor.visit_expr(condition);
                    }
                    if let Some(update) = &core.update {
                        visitor.visit_expr(update);
                    }
                }
            }
            visitor.visit_suite(&node.body);
        }
        Stmt::While(node) => {
            visitor.visit_expr(&node.condition);
            visitor.visit_suite(&node.body);
        }
        Stmt::If(node) => {
            visitor.visit_expr(&node.condition);
            visitor.visit_suite(&node.body);

            for branch in &node.else_branches {
                if let Some(condition) = &branch.condition {
                    visitor.visit_expr(condition);
                }
                visitor.visit_suite(&branch.body);
            }
        }
        Stmt::Switch(node) => {
            visitor.visit_expr(&node.condition);

            for case in &node.cases {
                if let Some(condition) = &case.condition {
                    visitor.visit_expr(condition);
                }
                if let Some(body) = &case.body {
                    visitor.visit_suite(body);
                }
            }
        }
        Stmt::SwitchCase(node) => {
            if let Some(condition) = &node.condition {
                visitor.visit_expr(condition);
            }
            if let Some(body) = &node.body {
                visitor.visit_suite(body);
            }
        }
        Stmt::Yield(node) => {
            if let Some(value) = &node.value {
                visitor.visit_expr(value);
            }
        }
        Stmt::Delete(node) => visitor.visit_expr(&node.value),
        Stmt::Alias(node) => visitor.visit_expr(&node.target),
        Stmt::SingleImport(node) => visitor.visit_expr(&node.path),
        Stmt::MultiImport(node) => {
            visitor.visit_expr(&node.base);
            for feature in &node.features {
                visitor.visit_expr(feature);
            }
        }
        Stmt::Return(node) => {
            if let Some(value) = &node.value {
                visitor.visit_expr(value);
            }
        }
        Stmt::Break(_) | Stmt::Continue(_) => {}
        Stmt::Block(node) => {
            for child in &node.body {
                visitor.visit_stmt(child);
            }
        }
        Stmt::Suite(node) => visitor.visit_suite(node),
        Stmt::Try(node) => {
            visitor.visit_suite(&node.body);

            for catch in &node.catches {
                if let Some(binding) = &catch.binding
                    && let Some(ty) = &binding.ty
                {
                    visitor.visit_ty(ty);
                }
                visitor.visit_suite(&catch.body);
            }

            if let Some(finally) = &node.finally {
                visitor.visit_suite(&finally.body);
            }
        }
        Stmt::Panic(node) => visitor.visit_expr(&node.value),
        Stmt::Expr(node) => visitor.visit_expr(&node.value),
        Stmt::Decl(node) => visitor.visit_decl(node),
        Stmt::Annotation(node) => visitor.visit_annotation(node),
    }
}

/// Walks the children of an expression.
pub fn walk_expr<V: Visitor>(visitor: &mut V, expr: &Expr) {
    match expr {
        Expr::Literal(_) | Expr::Ident(_) => {}
        Expr::Unary(node) => visitor.visit_expr(&node.operand),
        Expr::Binary(node) => {
            visitor.visit_expr(&node.lhs);
            visitor.visit_expr(&node.rhs);
        }
        Expr::NamedArg(node) => visitor.visit_expr(&node.value),
        Expr::Scope(_) => {}
        Expr::Dot(node) => {
            visitor.visit_expr(&node.lhs);
            visitor.visit_expr(&node.rhs);
        }
        Expr::Index(node) => {
            visitor.visit_expr(&node.target);
            visitor.visit_expr(&node.index);
        }
        Expr::Call(node) => {
            visitor.visit_expr(&node.path);

            if let Some(generics) = &node.generics {
                for arg in &generics.args {
                    visitor.visit_ty(arg);
                }
            }
            for arg in &node.args {
                visitor.visit_expr(arg);
            }
        }
        Expr::ArrayLiteral(node) => {
            for value in &node.values {
                visitor.visit_expr(value);
            }
        }
        Expr::TupleLiteral(node) => {
            for value in &node.values {
                visitor.visit_expr(value);
            }
        }
        Expr::SetLiteral(node) => {
            for value in &node.values {
                visitor.visit_expr(value);
            }
        }
        Expr::MapLiteral(node) => {
            for pair in &node.pairs {
                visitor.visit_expr(&pair.key);
                visitor.visit_expr(&pair.value);
            }
        }
        Expr::ObjInit(node) => {
            if let Some(path) = &node.path {
                visitor.visit_expr(path);
            }
            for field in &node.fields {
                visitor.visit_expr(&field.value);
            }
        }
        Expr::Lambda(node) => visitor.visit_suite(&node.body),
        Expr::Ternary(node) => {
            visitor.visit_expr(&node.condition);
            visitor.visit_expr(&node.if_true);
            visitor.visit_expr(&node.if_false);
        }
        Expr::Paren(node) => visitor.visit_expr(&node.value),
        Expr::Cast(node) => {
            visitor.visit_expr(&node.value);
            visitor.visit_ty(&node.ty);
        }
        Expr::InstOf(node) => {
            visitor.visit_expr(&node.value);
            visitor.visit_ty(&node.ty);
        }
        Expr::Async(node) => visitor.visit_expr(&node.value),
        Expr::Type(node) => visitor.visit_ty(&node.ty),
    }
}

/// Walks the children of a declaration.
pub fn walk_decl<V: Visitor>(visitor: &mut V, decl: &Decl) {
    match decl {
        Decl::Func(node) => {
            if let Some(generics) = &node.generics {
                visitor.visit_decl(&Decl::Requires(generics.clone()));
            }
            for param in &node.params {
                if let Some(ty) = &param.var.ty {
                    visitor.visit_ty(ty);
                }
                if let Some(value) = &param.value {
                    visitor.visit_expr(value);
                }
            }
            if let Some(returns) = &node.returns {
                visitor.visit_ty(returns);
            }
            if let Some(body) = &node.body {
                visitor.visit_suite(body);
            }
        }
        Decl::Var(node) => {
            if let Some(ty) = &node.var.ty {
                visitor.visit_ty(ty);
            }
            if let Some(value) = &node.value {
                visitor.visit_expr(value);
            }
        }
        Decl::Let(node) => {
            for var in &node.vars {
                visitor.visit_decl(&Decl::Var(var.clone()));
            }
        }
        Decl::Const(node) => {
            for var in &node.vars {
                visitor.visit_decl(&Decl::Var(var.clone()));
            }
        }
        Decl::Class(node) => {
            if let Some(body) = &node.body {
                visitor.visit_suite(body);
            }
        }
        Decl::Interface(node) => {
            if let Some(body) = &node.body {
                visitor.visit_suite(body);
            }
        }
        Decl::Struct(node) => {
            if let Some(body) = &node.body {
                visitor.visit_suite(body);
            }
        }
        Decl::Enum(node) => {
            if let Some(derives) = &node.derives {
                visitor.visit_ty(derives);
            }
            for member in &node.members {
                if let Some(value) = &member.value {
                    visitor.visit_expr(value);
                }
            }
        }
        Decl::EnumMember(node) => {
            if let Some(value) = &node.value {
                visitor.visit_expr(value);
            }
        }
        Decl::TypeAlias(node) => visitor.visit_ty(&node.value),
        Decl::Ffi(node) => visitor.visit_stmt(&node.value),
        Decl::Op(node) => visitor.visit_decl(&Decl::Func(node.func.clone())),
        Decl::Module(node) => visitor.visit_suite(&node.body),
        Decl::Requires(node) => {
            for param in &node.params.params {
                if let Some(ty) = &param.var.ty {
                    visitor.visit_ty(ty);
                }
                if let Some(value) = &param.value {
                    visitor.visit_expr(value);
                }
            }
            if let Some(bounds) = &node.bounds {
                for bound in &bounds.bounds {
                    visitor.visit_expr(&bound.bound);
                }
            }
        }
        Decl::RequiresParam(node) => {
            if let Some(ty) = &node.var.ty {
                visitor.visit_ty(ty);
            }
            if let Some(value) = &node.value {
                visitor.visit_expr(value);
            }
        }
        Decl::RequiresParamList(node) => {
            for param in &node.params {
                visitor.visit_decl(&Decl::RequiresParam(param.clone()));
            }
        }
        Decl::TypeBound(node) => visitor.visit_expr(&node.bound),
        Decl::TypeBoundList(node) => {
            for bound in &node.bounds {
                visitor.visit_expr(&bound.bound);
            }
        }
        Decl::UdtDerive(node) => {
            for (ty, _) in &node.derives {
                visitor.visit_ty(ty);
            }
        }
    }
}

/// Walks the children of a type.
pub fn walk_ty<V: Visitor>(visitor: &mut V, ty: &Ty) {
    match ty {
        Ty::Path(node) => {
            visitor.visit_expr(&node.value);

            if let Some(generics) = &node.generics {
                for arg in &generics.args {
                    visitor.visit_ty(arg);
                }
            }
        }
        Ty::Tuple(node) => {
            for elem in &node.elems {
                visitor.visit_ty(elem);
            }
        }
        Ty::Array(node) => {
            visitor.visit_ty(&node.elem);

            if let Some(size) = &node.size {
                visitor.visit_expr(size);
            }
        }
    }
}
