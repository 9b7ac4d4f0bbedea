//! The error-code table.
//!
//! The set of error codes is data, not code: each code maps to a message
//! template, a fix template and a default severity. Templates contain named
//! parameters in braces (`{name}`) that are substituted from the arguments
//! supplied at report time. An unknown code is an internal fault.

use std::sync::OnceLock;

use rustc_hash::FxHashMap;

use super::Level;

/// One entry of the error-code table.
#[derive(Debug, Clone, Copy)]
pub struct ErrorTemplate {
    /// Numeric identifier of the error
    pub code: u32,
    /// Default severity; a report may override it
    pub level: Level,
    /// Message template with named `{param}` holes
    pub message: &'static str,
    /// Fix template; empty if the error carries no suggested fix
    pub fix: &'static str,
}

/// The table of every diagnostic the frontend can produce.
///
/// Codes are grouped by stage: 1xxx lexical, 2xxx preprocessor, 3xxx parse,
/// 4xxx emission, 5xxx internal.
pub const ERROR_TABLE: &[ErrorTemplate] = &[
    // Lexical
    ErrorTemplate {
        code: 1001,
        level: Level::Fatal,
        message: "unknown character `{char}`",
        fix: "",
    },
    ErrorTemplate {
        code: 1002,
        level: Level::Fatal,
        message: "unterminated {kind} literal",
        fix: "close the literal with a matching `{quote}`",
    },
    ErrorTemplate {
        code: 1003,
        level: Level::Fatal,
        message: "unterminated multi-line comment",
        fix: "close the comment with `*/`",
    },
    ErrorTemplate {
        code: 1004,
        level: Level::Error,
        message: "malformed numeric literal `{value}`",
        fix: "",
    },
    // Preprocessor
    ErrorTemplate {
        code: 2001,
        level: Level::Error,
        message: "cannot resolve import `{path}`",
        fix: "check the module path and the include directories",
    },
    ErrorTemplate {
        code: 2002,
        level: Level::Fatal,
        message: "cyclic import: `{path}` is already being processed",
        fix: "break the cycle by moving shared declarations into their own module",
    },
    ErrorTemplate {
        code: 2003,
        level: Level::Error,
        message: "disallowed ABI option, the ABI must be a known string",
        fix: "use one of the allowed ABI options [{options}]",
    },
    ErrorTemplate {
        code: 2004,
        level: Level::Error,
        message: "malformed FFI block: {detail}",
        fix: "",
    },
    ErrorTemplate {
        code: 2005,
        level: Level::Error,
        message: "unbalanced braces: missing {which}",
        fix: "",
    },
    ErrorTemplate {
        code: 2006,
        level: Level::Error,
        message: "macro `{name}` expects {expected} argument(s), found {found}",
        fix: "",
    },
    ErrorTemplate {
        code: 2007,
        level: Level::Error,
        message: "invalid import: {detail}",
        fix: "{hint}",
    },
    ErrorTemplate {
        code: 2008,
        level: Level::Fatal,
        message: "macro expansion limit reached while expanding `{name}`",
        fix: "check the macro for unbounded recursion",
    },
    // Parse
    ErrorTemplate {
        code: 3001,
        level: Level::Error,
        message: "unexpected token `{token}`",
        fix: "expected {expected}",
    },
    ErrorTemplate {
        code: 3002,
        level: Level::Error,
        message: "missing {what}",
        fix: "insert `{what}`",
    },
    ErrorTemplate {
        code: 3003,
        level: Level::Error,
        message: "modifier `{modifier}` is not valid on {decl}",
        fix: "remove `{modifier}`",
    },
    ErrorTemplate {
        code: 3004,
        level: Level::Warn,
        message: "method `{name}` takes neither `self` nor is marked `static`",
        fix: "add `static`, or take `self` as the first parameter",
    },
    ErrorTemplate {
        code: 3005,
        level: Level::Error,
        message: "a method cannot combine `static` with a `self` parameter",
        fix: "remove either `static` or the `self` parameter",
    },
    ErrorTemplate {
        code: 3006,
        level: Level::Error,
        message: "`self` cannot carry a type or a default value",
        fix: "declare the receiver as a bare `self`",
    },
    ErrorTemplate {
        code: 3007,
        level: Level::Error,
        message: "interfaces cannot be forward declared",
        fix: "give the interface a body",
    },
    // Emission
    ErrorTemplate {
        code: 4001,
        level: Level::Error,
        message: "{what} is not supported in IR emission",
        fix: "",
    },
    ErrorTemplate {
        code: 4002,
        level: Level::Error,
        message: "interface member `{name}` must not have a body",
        fix: "declare the member without a body",
    },
    // Internal
    ErrorTemplate {
        code: 5001,
        level: Level::Fatal,
        message: "internal: unknown error code {code}",
        fix: "",
    },
    ErrorTemplate {
        code: 5002,
        level: Level::Fatal,
        message: "internal: line {line} of `{file}` is unavailable",
        fix: "",
    },
];

fn table() -> &'static FxHashMap<u32, &'static ErrorTemplate> {
    static MAP: OnceLock<FxHashMap<u32, &'static ErrorTemplate>> = OnceLock::new();
    MAP.get_or_init(|| ERROR_TABLE.iter().map(|tmpl| (tmpl.code, tmpl)).collect())
}

/// Looks up a code in the table.
#[must_use]
pub fn lookup(code: u32) -> Option<&'static ErrorTemplate> { table().get(&code).copied() }

/// Substitutes named `{param}` holes in a template.
///
/// Parameters without a matching argument are left in place; that keeps a
/// mis-reported diagnostic readable instead of hiding the message.
#[must_use]
pub fn expand(template: &str, args: &[(&str, String)]) -> String {
    let mut out = template.to_owned();

    for (name, value) in args {
        out = out.replace(&format!("{{{name}}}"), value);
    }

    out
}
