use crate::ast::{BinOp, Predicate, UnaryOp};
use crate::runtime::DateTemplate;

/// Concrete syntax tree node for a value-producing path expression.
///
/// Built once per compile and discarded after the plan is generated.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    // Literals
    /// Literal integer
    ///
    /// # Example
    /// ```text
    /// 42
    /// ```
    Integer(i64),

    /// Literal floating point number
    ///
    /// # Example
    /// ```text
    /// 4.2e1
    /// ```
    Float(f64),

    /// String literal
    ///
    /// # Example
    /// ```text
    /// "hello"
    /// ```
    String(String),

    /// Boolean literal
    Boolean(bool),

    /// Null literal
    Null,

    // References
    /// Root item (`$`)
    Root,

    /// Current filter candidate (`@`)
    ///
    /// Only valid inside a filter predicate.
    Current,

    /// Index of the final element of the array being subscripted (`last`)
    ///
    /// Only valid inside `[...]`.
    Last,

    /// Named variable supplied by the caller
    ///
    /// # Examples
    /// ```text
    /// $limit          // Variable("limit")
    /// $"my var"       // Variable("my var")
    /// ```
    Variable(String),

    // Operations
    /// Prefix `+` or `-`
    Unary { op: UnaryOp, operand: Box<Expr> },

    /// Arithmetic on two singleton numeric operands
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// An accessor applied to the result of `base`
    ///
    /// # Examples
    /// ```text
    /// $.store.book[0].title
    /// $.items[*] ? (@.price > 10)
    /// $.when.datetime()
    /// ```
    Access { base: Box<Expr>, accessor: Accessor },
}

/// One step in an accessor chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Accessor {
    /// `.name` or `."quoted name"`
    Member(String),

    /// `.*`
    MemberWildcard,

    /// `[*]`
    ElementWildcard,

    /// `[0, 2 to 4, last]`
    Subscripts(Vec<Subscript>),

    /// `? (predicate)`
    Filter(Box<Predicate>),

    /// `.type()`, `.size()`, ...
    Method(ItemMethod),

    /// `.datetime()` or `.datetime("YYYY-MM-DD")`
    DateTime(Option<DateTemplate>),
}

/// A single array subscript: an index expression or a `from to to` range.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscript {
    pub from: Expr,
    pub to: Option<Expr>,
}

/// Argument-free item methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemMethod {
    Type,
    Size,
    Double,
    Ceiling,
    Floor,
    Abs,
    KeyValue,
}

impl ItemMethod {
    /// Maps a method name to its method; `datetime` is handled separately
    /// because it takes an argument.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "type" => Some(ItemMethod::Type),
            "size" => Some(ItemMethod::Size),
            "double" => Some(ItemMethod::Double),
            "ceiling" => Some(ItemMethod::Ceiling),
            "floor" => Some(ItemMethod::Floor),
            "abs" => Some(ItemMethod::Abs),
            "keyvalue" => Some(ItemMethod::KeyValue),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ItemMethod::Type => "type",
            ItemMethod::Size => "size",
            ItemMethod::Double => "double",
            ItemMethod::Ceiling => "ceiling",
            ItemMethod::Floor => "floor",
            ItemMethod::Abs => "abs",
            ItemMethod::KeyValue => "keyvalue",
        }
    }
}
