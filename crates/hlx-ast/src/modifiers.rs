//! Declaration modifiers and their legality rules.
//!
//! Modifiers form a small composable set attached to declarations. Each
//! [`Modifiers`] bag declares which categories it accepts; attaching a
//! modifier outside the declared categories is rejected by [`Modifiers::add`]
//! and reported by the parser as an "invalid modifier" diagnostic at the
//! modifier's token.

use std::fmt;

use hlx_source::Location;
use serde::Serialize;

/// Access specifiers attached to declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AccessSpecifier {
    Public,
    Private,
    Protected,
    Internal,
}

impl AccessSpecifier {
    /// Returns the keyword lexeme.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Protected => "protected",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for AccessSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str()) }
}

/// The category a modifier keyword belongs to.
///
/// A keyword may sit in several categories (`static` is a function
/// specifier, a class specifier and a storage specifier); a bag accepts a
/// modifier when the intersection of the keyword's categories with the bag's
/// accepted categories is non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ModifierCategory {
    /// public / private / protected / internal
    Access,
    /// inline / async / static / const / eval
    FunctionSpecifier,
    /// static / const
    ClassSpecifier,
    /// ffi / static
    Storage,
    /// const / yield / async / module / ffi
    TypeSpecifier,
}

/// A modifier keyword, flattened across categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ModifierKind {
    Public,
    Private,
    Protected,
    Internal,
    Inline,
    Async,
    Static,
    Const,
    Eval,
    Ffi,
    Yield,
    Module,
}

impl ModifierKind {
    /// Returns the keyword lexeme.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Protected => "protected",
            Self::Internal => "internal",
            Self::Inline => "inline",
            Self::Async => "async",
            Self::Static => "static",
            Self::Const => "const",
            Self::Eval => "eval",
            Self::Ffi => "ffi",
            Self::Yield => "yield",
            Self::Module => "module",
        }
    }

    /// Returns the categories this keyword may legally appear in.
    #[must_use]
    pub const fn categories(&self) -> &'static [ModifierCategory] {
        use ModifierCategory as C;

        match self {
            Self::Public | Self::Private | Self::Protected | Self::Internal => &[C::Access],
            Self::Inline | Self::Eval => &[C::FunctionSpecifier],
            Self::Async => &[C::FunctionSpecifier, C::TypeSpecifier],
            Self::Static => &[C::FunctionSpecifier, C::ClassSpecifier, C::Storage],
            Self::Const => {
                &[C::FunctionSpecifier, C::ClassSpecifier, C::TypeSpecifier]
            }
            Self::Ffi => &[C::Storage, C::TypeSpecifier],
            Self::Yield | Self::Module => &[C::TypeSpecifier],
        }
    }

    /// Converts to an access specifier, if this is one.
    #[must_use]
    pub const fn as_access(&self) -> Option<AccessSpecifier> {
        match self {
            Self::Public => Some(AccessSpecifier::Public),
            Self::Private => Some(AccessSpecifier::Private),
            Self::Protected => Some(AccessSpecifier::Protected),
            Self::Internal => Some(AccessSpecifier::Internal),
            _ => None,
        }
    }
}

impl fmt::Display for ModifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str()) }
}

/// A modifier occurrence: the keyword plus where it was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Modifier {
    pub kind: ModifierKind,
    pub loc: Location,
}

impl Modifier {
    /// Creates a modifier occurrence.
    #[must_use]
    pub const fn new(kind: ModifierKind, loc: Location) -> Self { Self { kind, loc } }

    /// Creates a synthesized modifier with a zeroed location.
    #[must_use]
    pub fn synthesized(kind: ModifierKind) -> Self {
        Self { kind, loc: Location::synthesized() }
    }
}

/// A modifier bag with per-declaration legality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Modifiers {
    accepted: Vec<ModifierCategory>,
    mods: Vec<Modifier>,
}

impl Modifiers {
    /// Creates a bag accepting the given categories.
    #[must_use]
    pub fn accepting(accepted: &[ModifierCategory]) -> Self {
        Self { accepted: accepted.to_vec(), mods: Vec::new() }
    }

    /// Bag for function declarations: function specifiers + access.
    #[must_use]
    pub fn for_function() -> Self {
        Self::accepting(&[ModifierCategory::Access, ModifierCategory::FunctionSpecifier])
    }

    /// Bag for class / struct / interface / enum declarations.
    #[must_use]
    pub fn for_class() -> Self {
        Self::accepting(&[ModifierCategory::Access, ModifierCategory::ClassSpecifier])
    }

    /// Bag for variable and let/const declarations: storage + access.
    #[must_use]
    pub fn for_variable() -> Self {
        Self::accepting(&[ModifierCategory::Access, ModifierCategory::Storage])
    }

    /// Bag for type aliases: type specifiers + access.
    #[must_use]
    pub fn for_type_alias() -> Self {
        Self::accepting(&[ModifierCategory::Access, ModifierCategory::TypeSpecifier])
    }

    /// Bag for module declarations: access only.
    #[must_use]
    pub fn for_module() -> Self { Self::accepting(&[ModifierCategory::Access]) }

    /// Checks whether a keyword is legal in this bag.
    #[must_use]
    pub fn accepts(&self, kind: ModifierKind) -> bool {
        kind.categories().iter().any(|category| self.accepted.contains(category))
    }

    /// Attaches a modifier.
    ///
    /// ## Errors
    ///
    /// Returns the rejected modifier if its keyword belongs to none of the
    /// bag's accepted categories; the caller reports the diagnostic.
    pub fn add(&mut self, modifier: Modifier) -> Result<(), Modifier> {
        if !self.accepts(modifier.kind) {
            return Err(modifier);
        }

        self.mods.push(modifier);
        Ok(())
    }

    /// Checks whether the bag contains a keyword.
    #[must_use]
    pub fn contains(&self, kind: ModifierKind) -> bool {
        self.mods.iter().any(|modifier| modifier.kind == kind)
    }

    /// Returns the first access specifier in the bag, if any.
    #[must_use]
    pub fn access(&self) -> Option<AccessSpecifier> {
        self.mods.iter().find_map(|modifier| modifier.kind.as_access())
    }

    /// Returns the attached modifiers in attachment order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &Modifier> { self.mods.iter() }

    /// Returns true if no modifiers are attached.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.mods.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_bag_accepts_function_specifiers() {
        let mut bag = Modifiers::for_function();

        assert!(bag.add(Modifier::synthesized(ModifierKind::Inline)).is_ok());
        assert!(bag.add(Modifier::synthesized(ModifierKind::Public)).is_ok());
        assert!(bag.add(Modifier::synthesized(ModifierKind::Static)).is_ok());
        assert!(bag.contains(ModifierKind::Inline));
        assert_eq!(bag.access(), Some(AccessSpecifier::Public));
    }

    #[test]
    fn class_bag_rejects_inline() {
        let mut bag = Modifiers::for_class();

        let rejected = bag.add(Modifier::synthesized(ModifierKind::Inline));
        assert!(rejected.is_err());
        assert!(bag.is_empty());
    }

    #[test]
    fn variable_bag_accepts_storage() {
        let mut bag = Modifiers::for_variable();

        assert!(bag.add(Modifier::synthesized(ModifierKind::Ffi)).is_ok());
        assert!(bag.add(Modifier::synthesized(ModifierKind::Static)).is_ok());
        assert!(bag.add(Modifier::synthesized(ModifierKind::Eval)).is_err());
    }

    #[test]
    fn static_spans_multiple_categories() {
        assert!(Modifiers::for_function().accepts(ModifierKind::Static));
        assert!(Modifiers::for_class().accepts(ModifierKind::Static));
        assert!(Modifiers::for_variable().accepts(ModifierKind::Static));
        assert!(!Modifiers::for_module().accepts(ModifierKind::Static));
    }
}
