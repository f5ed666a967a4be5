use std::mem;

use thiserror::Error;

use crate::{
    ast::{
        Accessor, BinOp, Body, CompareOp, Expr, ItemMethod, Mode, ParsedStatement, Position,
        Predicate, SpannedToken, Subscript, Token, UnaryOp,
    },
    lexer::{LexError, Lexer},
    runtime::{DateTemplate, LikePattern},
};

/// Failure to build a syntax tree from well-formed tokens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// The next token is not one the grammar allows here
    #[error("expected {expected}, found {found} at {position}")]
    Unexpected {
        expected: String,
        found: String,
        position: Position,
    },

    /// Syntactically fine but not allowed in this context
    #[error("{message} at {position}")]
    Invalid { message: String, position: Position },
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::Unexpected { position, .. } | ParseError::Invalid { position, .. } => {
                *position
            }
        }
    }
}

/// Recursive-descent parser over a fully lexed token list.
///
/// The first error aborts parsing; there is no recovery.
pub struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
    filter_depth: usize,
    subscript_depth: usize,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Result<Self, LexError> {
        Ok(Parser {
            tokens: lexer.tokenize()?,
            pos: 0,
            filter_depth: 0,
            subscript_depth: 0,
        })
    }

    fn spanned(&self, index: usize) -> &SpannedToken {
        // `tokenize` always ends the list with `Eof`
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[index.min(last)]
    }

    fn current(&self) -> &Token {
        &self.spanned(self.pos).token
    }

    fn peek(&self) -> &Token {
        &self.spanned(self.pos + 1).token
    }

    fn position(&self) -> Position {
        self.spanned(self.pos).position
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    /// Takes ownership of the current token's payload and moves on.
    fn take(&mut self) -> Token {
        let taken = match self.tokens.get_mut(self.pos) {
            Some(spanned) => mem::replace(&mut spanned.token, Token::Eof),
            None => Token::Eof,
        };
        self.advance();
        taken
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(self.current()) == mem::discriminant(token)
    }

    fn eat(&mut self, token: &Token) -> bool {
        let found = self.check(token);
        if found {
            self.advance();
        }
        found
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let found = self.spanned(self.pos);
        ParseError::Unexpected {
            expected: expected.to_string(),
            found: found.describe(),
            position: found.position,
        }
    }

    fn invalid(&self, message: impl Into<String>) -> ParseError {
        ParseError::Invalid {
            message: message.into(),
            position: self.position(),
        }
    }

    fn expect(&mut self, token: Token, expected: &str) -> Result<(), ParseError> {
        if self.eat(&token) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_word(&mut self, word: &str) -> Result<(), ParseError> {
        if self.current().is_word(word) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&format!("`{word}`")))
        }
    }

    fn expect_string(&mut self) -> Result<String, ParseError> {
        match self.current() {
            Token::String(_) => match self.take() {
                Token::String(s) => Ok(s),
                _ => Err(self.unexpected("string literal")),
            },
            _ => Err(self.unexpected("string literal")),
        }
    }

    /// Parses a whole statement: optional mode, then a path or predicate,
    /// then end of input.
    pub fn parse(&mut self) -> Result<ParsedStatement, ParseError> {
        let mode = match self.current() {
            Token::Identifier(word) if word == "lax" => Mode::Lax,
            Token::Identifier(word) if word == "strict" => Mode::Strict,
            _ => {
                let body = self.parse_body()?;
                return Ok(ParsedStatement {
                    mode: Mode::Lax,
                    body,
                });
            }
        };
        self.advance(); // consume mode

        let body = self.parse_body()?;
        Ok(ParsedStatement { mode, body })
    }

    fn parse_body(&mut self) -> Result<Body, ParseError> {
        let body = match self.parse_or()? {
            Predicate::Expr(expr) => Body::Expr(expr),
            predicate => Body::Predicate(predicate),
        };
        if !self.check(&Token::Eof) {
            return Err(self.unexpected("end of input"));
        }
        Ok(body)
    }

    // Predicates

    fn parse_or(&mut self) -> Result<Predicate, ParseError> {
        let mut operands = vec![self.parse_and()?];
        while self.eat(&Token::OrOr) {
            operands.push(self.parse_and()?);
        }
        Ok(match operands.len() {
            1 => operands.remove(0),
            _ => Predicate::Or(operands),
        })
    }

    fn parse_and(&mut self) -> Result<Predicate, ParseError> {
        let mut operands = vec![self.parse_neg()?];
        while self.eat(&Token::AndAnd) {
            operands.push(self.parse_neg()?);
        }
        Ok(match operands.len() {
            1 => operands.remove(0),
            _ => Predicate::And(operands),
        })
    }

    fn parse_neg(&mut self) -> Result<Predicate, ParseError> {
        if self.eat(&Token::Exclamation) {
            return Ok(Predicate::Not(Box::new(self.parse_neg()?)));
        }
        if !self.check(&Token::LParen) {
            return self.parse_pred();
        }

        self.advance(); // consume '('
        let inner = self.parse_or()?;
        self.expect(Token::RParen, "`)`")?;

        match inner {
            // A parenthesized arithmetic operand: keep parsing it as one
            Predicate::Expr(expr) => {
                let before = self.pos;
                let expr = self.access_rest(expr)?;
                let expr = self.mul_rest(expr)?;
                let expr = self.add_rest(expr)?;
                if self.pos == before && self.eat_is_unknown()? {
                    return Ok(Predicate::IsUnknown(Box::new(Predicate::Expr(expr))));
                }
                self.finish_pred(expr)
            }
            predicate => {
                if self.eat_is_unknown()? {
                    Ok(Predicate::IsUnknown(Box::new(predicate)))
                } else {
                    Ok(predicate)
                }
            }
        }
    }

    fn eat_is_unknown(&mut self) -> Result<bool, ParseError> {
        if !self.current().is_word("is") {
            return Ok(false);
        }
        self.advance();
        self.expect_word("unknown")?;
        Ok(true)
    }

    fn parse_pred(&mut self) -> Result<Predicate, ParseError> {
        if self.current().is_word("exists") && self.peek() == &Token::LParen {
            self.advance(); // consume 'exists'
            self.advance(); // consume '('
            let operand = self.parse_weak()?;
            self.expect(Token::RParen, "`)`")?;
            return Ok(Predicate::Exists(operand));
        }

        let left = self.parse_weak()?;
        self.finish_pred(left)
    }

    /// Whatever may follow the left operand of a predicate.
    fn finish_pred(&mut self, left: Expr) -> Result<Predicate, ParseError> {
        if let Some(op) = compare_op(self.current()) {
            self.advance();
            let right = self.parse_weak()?;
            return Ok(Predicate::Compare { op, left, right });
        }

        if self.current().is_word("starts") {
            self.advance();
            self.expect_word("with")?;
            if !matches!(self.current(), Token::String(_) | Token::Variable(_)) {
                return Err(self.unexpected("string literal or variable"));
            }
            let prefix = match self.take() {
                Token::Variable(name) => Expr::Variable(name),
                Token::String(s) => Expr::String(s),
                _ => Expr::Null,
            };
            return Ok(Predicate::StartsWith {
                subject: left,
                prefix,
            });
        }

        if self.current().is_word("like_regex") {
            self.advance();
            let position = self.position();
            let pattern = self.expect_string()?;
            let flags = if self.current().is_word("flag") {
                self.advance();
                self.expect_string()?
            } else {
                String::new()
            };
            let pattern = LikePattern::new(&pattern, &flags)
                .map_err(|message| ParseError::Invalid { message, position })?;
            return Ok(Predicate::LikeRegex {
                subject: left,
                pattern,
            });
        }

        Ok(Predicate::Expr(left))
    }

    // Expressions

    fn parse_weak(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_multiplicative()?;
        self.add_rest(left)
    }

    fn add_rest(&mut self, mut left: Expr) -> Result<Expr, ParseError> {
        loop {
            let op = match self.current() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Subtract,
                _ => break,
            };

            self.advance();
            let right = self.parse_multiplicative()?;

            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_unary()?;
        self.mul_rest(left)
    }

    fn mul_rest(&mut self, mut left: Expr) -> Result<Expr, ParseError> {
        loop {
            let op = match self.current() {
                Token::Star => BinOp::Multiply,
                Token::Slash => BinOp::Divide,
                Token::Percent => BinOp::Modulo,
                _ => break,
            };

            self.advance();
            let right = self.parse_unary()?;

            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.current() {
            Token::Plus => UnaryOp::Plus,
            Token::Minus => UnaryOp::Minus,
            _ => return self.parse_access(),
        };
        self.advance();
        let operand = self.parse_unary()?; // Right-associative
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_access(&mut self) -> Result<Expr, ParseError> {
        let primary = self.parse_primary()?;
        self.access_rest(primary)
    }

    fn access_rest(&mut self, mut expr: Expr) -> Result<Expr, ParseError> {
        loop {
            let accessor = match self.current() {
                Token::Dot => {
                    self.advance(); // consume '.'
                    self.parse_dot_accessor()?
                }
                Token::LBracket => {
                    self.advance(); // consume '['
                    self.parse_bracket_accessor()?
                }
                Token::Question => {
                    self.advance(); // consume '?'
                    self.expect(Token::LParen, "`(` after `?`")?;
                    self.filter_depth += 1;
                    let predicate = self.parse_or()?;
                    self.filter_depth -= 1;
                    self.expect(Token::RParen, "`)`")?;
                    Accessor::Filter(Box::new(predicate))
                }
                _ => break,
            };
            expr = Expr::Access {
                base: Box::new(expr),
                accessor,
            };
        }
        Ok(expr)
    }

    fn parse_dot_accessor(&mut self) -> Result<Accessor, ParseError> {
        match self.current() {
            Token::Star => {
                self.advance();
                Ok(Accessor::MemberWildcard)
            }
            Token::String(_) => match self.take() {
                Token::String(name) => Ok(Accessor::Member(name)),
                _ => Err(self.unexpected("member name")),
            },
            // `.name(` is always a method call; `.name` alone is a member
            Token::Identifier(_) if self.peek() == &Token::LParen => self.parse_method(),
            Token::Identifier(_) => match self.take() {
                Token::Identifier(name) => Ok(Accessor::Member(name)),
                _ => Err(self.unexpected("member name")),
            },
            _ => Err(self.unexpected("member name, `*` or item method")),
        }
    }

    fn parse_method(&mut self) -> Result<Accessor, ParseError> {
        let name_position = self.position();
        let name = match self.take() {
            Token::Identifier(name) => name,
            _ => return Err(self.unexpected("item method")),
        };
        self.advance(); // consume '('

        if name == "datetime" {
            let template = match self.current() {
                Token::String(_) => {
                    let position = self.position();
                    let source = self.expect_string()?;
                    let template = DateTemplate::new(&source)
                        .map_err(|message| ParseError::Invalid { message, position })?;
                    Some(template)
                }
                _ => None,
            };
            self.expect(Token::RParen, "`)`")?;
            return Ok(Accessor::DateTime(template));
        }

        let method = ItemMethod::from_name(&name).ok_or_else(|| ParseError::Invalid {
            message: format!("unknown item method `{name}()`"),
            position: name_position,
        })?;
        self.expect(Token::RParen, "`)` (item methods take no arguments)")?;
        Ok(Accessor::Method(method))
    }

    fn parse_bracket_accessor(&mut self) -> Result<Accessor, ParseError> {
        if self.check(&Token::Star) && self.peek() == &Token::RBracket {
            self.advance(); // consume '*'
            self.advance(); // consume ']'
            return Ok(Accessor::ElementWildcard);
        }

        self.subscript_depth += 1;
        let mut subscripts = Vec::new();
        loop {
            let from = self.parse_weak()?;
            let to = if self.current().is_word("to") {
                self.advance();
                Some(self.parse_weak()?)
            } else {
                None
            };
            subscripts.push(Subscript { from, to });

            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.subscript_depth -= 1;

        self.expect(Token::RBracket, "`,`, `to` or `]`")?;
        Ok(Accessor::Subscripts(subscripts))
    }

    /// Literals, `$`, `@`, `last`, variables and parenthesized expressions.
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let expr = match self.current() {
            Token::Integer(n) => Expr::Integer(*n),
            Token::Float(n) => Expr::Float(*n),
            Token::String(_) | Token::Variable(_) => {
                return match self.take() {
                    Token::String(s) => Ok(Expr::String(s)),
                    Token::Variable(name) => Ok(Expr::Variable(name)),
                    _ => Err(self.unexpected("path expression")),
                };
            }
            Token::Dollar => Expr::Root,
            Token::At => {
                if self.filter_depth == 0 {
                    return Err(self.invalid("`@` is only valid inside a filter expression"));
                }
                Expr::Current
            }
            Token::Identifier(word) => match word.as_str() {
                "true" => Expr::Boolean(true),
                "false" => Expr::Boolean(false),
                "null" => Expr::Null,
                "last" => {
                    if self.subscript_depth == 0 {
                        return Err(self.invalid("`last` is only valid inside an array subscript"));
                    }
                    Expr::Last
                }
                _ => return Err(self.unexpected("path expression")),
            },
            Token::LParen => {
                self.advance(); // consume '('
                let expr = self.parse_weak()?;
                self.expect(Token::RParen, "`)`")?;
                return Ok(expr);
            }
            _ => return Err(self.unexpected("path expression")),
        };
        self.advance();
        Ok(expr)
    }
}

fn compare_op(token: &Token) -> Option<CompareOp> {
    match token {
        Token::EqEq => Some(CompareOp::Equal),
        Token::NotEq => Some(CompareOp::NotEqual),
        Token::Lt => Some(CompareOp::LessThan),
        Token::LtEq => Some(CompareOp::LessEqual),
        Token::Gt => Some(CompareOp::GreaterThan),
        Token::GtEq => Some(CompareOp::GreaterEqual),
        _ => None,
    }
}
