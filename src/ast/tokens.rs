use std::fmt;

/// A location in the path source, counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Zero-based character offset
    pub offset: usize,
    /// One-based line
    pub line: usize,
    /// One-based column
    pub column: usize,
}

impl Position {
    pub fn start() -> Self {
        Position {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Floating-point number
    ///
    /// # Examples
    /// ```text
    /// 3.14
    /// 1e3
    /// 2.5E-2
    /// ```
    Float(f64),

    /// Integer
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 0
    /// ```
    Integer(i64),

    /// String literal with escapes already decoded
    ///
    /// # Examples
    /// ```text
    /// "hello"
    /// 'it\'s'
    /// "été"
    /// ```
    String(String),

    /// Bare word: member names, keywords and item-method names
    ///
    /// Words are never reserved by the lexer. The parser decides from
    /// position whether `last`, `to`, `exists`, `type` and friends are
    /// keywords or member names.
    ///
    /// # Examples
    /// ```text
    /// name
    /// like_regex
    /// straße
    /// ```
    Identifier(String),

    /// Named variable reference
    ///
    /// # Examples
    /// ```text
    /// $min
    /// $name@#1
    /// $"with spaces"
    /// ```
    Variable(String),

    // References
    /// Root item (`$`)
    Dollar,

    /// Current filter candidate (`@`)
    At,

    // Punctuation
    /// Member or method access
    Dot,

    /// Wildcard, also multiplication
    Star,

    /// Left bracket for subscripts
    LBracket,

    /// Right bracket
    RBracket,

    /// Left parenthesis
    LParen,

    /// Right parenthesis
    RParen,

    /// Subscript separator
    Comma,

    /// Filter introducer
    ///
    /// # Examples
    /// ```text
    /// $.items ? (@.price > 10)
    /// ```
    Question,

    // Arithmetic
    /// Addition or unary plus
    Plus,

    /// Subtraction or unary minus
    Minus,

    /// Division
    Slash,

    /// Modulo
    Percent,

    // Comparison
    /// Equality (`==`)
    EqEq,

    /// Inequality (`!=` or `<>`)
    NotEq,

    /// Less than
    Lt,

    /// Less than or equal
    LtEq,

    /// Greater than
    Gt,

    /// Greater than or equal
    GtEq,

    // Logical
    /// Predicate conjunction (`&&`)
    AndAnd,

    /// Predicate disjunction (`||`)
    OrOr,

    /// Predicate negation (`!`)
    Exclamation,

    /// End of input
    Eof,
}

impl Token {
    /// True when this token is the bare word `word`.
    pub fn is_word(&self, word: &str) -> bool {
        matches!(self, Token::Identifier(name) if name == word)
    }
}

/// A token together with the exact source text it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub image: String,
    pub position: Position,
}

impl SpannedToken {
    /// Human-readable rendering used in parse errors.
    pub fn describe(&self) -> String {
        match self.token {
            Token::Eof => "end of input".to_string(),
            _ => format!("`{}`", self.image),
        }
    }
}
