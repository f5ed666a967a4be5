use crate::ast::{CompareOp, Expr};
use crate::runtime::LikePattern;

/// Filter predicate node.
///
/// Predicates have their own precedence ladder, independent from the
/// arithmetic one: `||` binds loosest, then `&&`, then `!`.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `left op right`
    Compare {
        op: CompareOp,
        left: Expr,
        right: Expr,
    },

    /// `exists(expr)`
    Exists(Expr),

    /// `subject starts with "prefix"` or `subject starts with $var`
    StartsWith { subject: Expr, prefix: Expr },

    /// `subject like_regex "pattern" flag "i"`
    LikeRegex { subject: Expr, pattern: LikePattern },

    /// `a && b && c`
    And(Vec<Predicate>),

    /// `a || b || c`
    Or(Vec<Predicate>),

    /// `!p`
    Not(Box<Predicate>),

    /// `(p) is unknown`
    IsUnknown(Box<Predicate>),

    /// A plain expression used as a condition, e.g. `@.active`
    Expr(Expr),
}
