use std::fmt;

use crate::ast::{Expr, Predicate};

/// Evaluation policy fixed per statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Structural mismatches produce no results
    #[default]
    Lax,
    /// Structural mismatches are errors
    Strict,
}

impl Mode {
    pub fn is_strict(self) -> bool {
        self == Mode::Strict
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Lax => "lax",
            Mode::Strict => "strict",
        })
    }
}

/// A parsed path statement: optional mode prefix plus its body.
///
/// # Examples
/// ```text
/// $.a.b
/// strict $.items[0 to last]
/// $.price > 10
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedStatement {
    pub mode: Mode,
    pub body: Body,
}

/// What a statement evaluates to.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// A path producing a sequence of values
    Expr(Expr),

    /// A predicate producing `true`, `false` or `null` (unknown)
    Predicate(Predicate),
}
