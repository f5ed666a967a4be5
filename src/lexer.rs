use thiserror::Error;

pub use crate::ast::{Position, SpannedToken};
use crate::ast::Token;

/// Failure to turn source text into tokens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("unexpected character '{ch}' at {position}{hint}")]
    UnexpectedChar {
        ch: char,
        hint: &'static str,
        position: Position,
    },

    #[error("unterminated string starting at {position}")]
    UnterminatedString { position: Position },

    #[error("invalid escape sequence '\\{sequence}' at {position}")]
    InvalidEscape { sequence: String, position: Position },

    #[error("invalid number literal '{literal}' at {position}")]
    InvalidNumber { literal: String, position: Position },
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            LexError::UnexpectedChar { position, .. }
            | LexError::UnterminatedString { position }
            | LexError::InvalidEscape { position, .. }
            | LexError::InvalidNumber { position, .. } => *position,
        }
    }
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    token_start: Position,
}

fn is_word_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || (!ch.is_ascii() && !ch.is_whitespace())
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || (!ch.is_ascii() && !ch.is_whitespace())
}

fn is_variable_char(ch: char) -> bool {
    is_word_char(ch) || ch == '@' || ch == '#'
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            token_start: Position::start(),
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            self.position += 1;
        }
    }

    fn here(&self) -> Position {
        Position {
            offset: self.position,
            line: self.line,
            column: self.column,
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_while(&mut self, accept: fn(char) -> bool) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if accept(ch) {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_string(&mut self, quote: char) -> Result<String, LexError> {
        let start = self.here();
        let mut result = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    let escape_at = self.here();
                    self.advance();
                    match self.current_char() {
                        Some('n') => result.push('\n'),
                        Some('t') => result.push('\t'),
                        Some('r') => result.push('\r'),
                        Some('b') => result.push('\u{8}'),
                        Some('f') => result.push('\u{c}'),
                        Some(c @ ('"' | '\'' | '\\' | '/')) => result.push(c),
                        Some('u') => {
                            self.advance();
                            result.push(self.read_unicode_escape(escape_at)?);
                            continue;
                        }
                        Some(other) => {
                            return Err(LexError::InvalidEscape {
                                sequence: other.to_string(),
                                position: escape_at,
                            });
                        }
                        None => return Err(LexError::UnterminatedString { position: start }),
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::UnterminatedString { position: start })
    }

    fn read_hex4(&mut self, escape_at: Position) -> Result<u32, LexError> {
        let mut digits = String::new();
        for _ in 0..4 {
            match self.current_char() {
                Some(c) if c.is_ascii_hexdigit() => {
                    digits.push(c);
                    self.advance();
                }
                _ => {
                    return Err(LexError::InvalidEscape {
                        sequence: format!("u{digits}"),
                        position: escape_at,
                    });
                }
            }
        }
        u32::from_str_radix(&digits, 16).map_err(|_| LexError::InvalidEscape {
            sequence: format!("u{digits}"),
            position: escape_at,
        })
    }

    /// Decodes the hex digits after `\u`, joining UTF-16 surrogate pairs.
    fn read_unicode_escape(&mut self, escape_at: Position) -> Result<char, LexError> {
        let high = self.read_hex4(escape_at)?;
        let invalid = |code: u32| LexError::InvalidEscape {
            sequence: format!("u{code:04x}"),
            position: escape_at,
        };

        if (0xD800..0xDC00).contains(&high) {
            if self.current_char() == Some('\\') && self.peek_char(1) == Some('u') {
                self.advance();
                self.advance();
                let low = self.read_hex4(escape_at)?;
                if !(0xDC00..0xE000).contains(&low) {
                    return Err(invalid(low));
                }
                let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                return char::from_u32(code).ok_or_else(|| invalid(code));
            }
            return Err(invalid(high));
        }

        char::from_u32(high).ok_or_else(|| invalid(high))
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
        let start = self.here();
        let mut number = String::new();
        let mut is_float = false;

        number.push_str(&self.read_while(|c| c.is_ascii_digit()));

        if self.current_char() == Some('.') && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
        {
            is_float = true;
            number.push('.');
            self.advance();
            number.push_str(&self.read_while(|c| c.is_ascii_digit()));
        }

        if matches!(self.current_char(), Some('e' | 'E')) {
            is_float = true;
            number.push('e');
            self.advance();
            if let Some(sign @ ('+' | '-')) = self.current_char() {
                number.push(sign);
                self.advance();
            }
            let exponent = self.read_while(|c| c.is_ascii_digit());
            if exponent.is_empty() {
                return Err(LexError::InvalidNumber {
                    literal: number,
                    position: start,
                });
            }
            number.push_str(&exponent);
        }

        let invalid = |literal: &str| LexError::InvalidNumber {
            literal: literal.to_string(),
            position: start,
        };

        if !is_float && let Ok(n) = number.parse::<i64>() {
            return Ok(Token::Integer(n));
        }
        // Integers past i64 degrade to floats rather than failing.
        number
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Token::Float)
            .ok_or_else(|| invalid(&number))
    }

    fn single(&mut self, token: Token) -> Result<Token, LexError> {
        self.advance();
        Ok(token)
    }

    fn pair(&mut self, second: char, matched: Token, alone: Token) -> Result<Token, LexError> {
        if self.peek_char(1) == Some(second) {
            self.advance();
            self.advance();
            Ok(matched)
        } else {
            self.advance();
            Ok(alone)
        }
    }

    fn doubled(&mut self, ch: char, token: Token, hint: &'static str) -> Result<Token, LexError> {
        if self.peek_char(1) == Some(ch) {
            self.advance();
            self.advance();
            Ok(token)
        } else {
            Err(LexError::UnexpectedChar {
                ch,
                hint,
                position: self.here(),
            })
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();
        self.token_start = self.here();

        match self.current_char() {
            None => Ok(Token::Eof),
            Some('$') => match self.peek_char(1) {
                Some('"') => {
                    self.advance();
                    Ok(Token::Variable(self.read_string('"')?))
                }
                Some(c) if is_word_start(c) => {
                    self.advance();
                    Ok(Token::Variable(self.read_while(is_variable_char)))
                }
                _ => self.single(Token::Dollar),
            },
            Some('@') => self.single(Token::At),
            Some('.') => self.single(Token::Dot),
            Some('*') => self.single(Token::Star),
            Some('[') => self.single(Token::LBracket),
            Some(']') => self.single(Token::RBracket),
            Some('(') => self.single(Token::LParen),
            Some(')') => self.single(Token::RParen),
            Some(',') => self.single(Token::Comma),
            Some('?') => self.single(Token::Question),
            Some('+') => self.single(Token::Plus),
            Some('-') => self.single(Token::Minus),
            Some('/') => self.single(Token::Slash),
            Some('%') => self.single(Token::Percent),
            Some('=') => self.doubled('=', Token::EqEq, " (did you mean '=='?)"),
            Some('&') => self.doubled('&', Token::AndAnd, " (did you mean '&&'?)"),
            Some('|') => self.doubled('|', Token::OrOr, " (did you mean '||'?)"),
            Some('!') => self.pair('=', Token::NotEq, Token::Exclamation),
            Some('>') => self.pair('=', Token::GtEq, Token::Gt),
            Some('<') => match self.peek_char(1) {
                Some('=') => self.pair('=', Token::LtEq, Token::Lt),
                Some('>') => self.pair('>', Token::NotEq, Token::Lt),
                _ => self.single(Token::Lt),
            },
            Some(quote @ ('"' | '\'')) => Ok(Token::String(self.read_string(quote)?)),
            Some(ch) if ch.is_ascii_digit() => self.read_number(),
            Some(ch) if is_word_start(ch) => Ok(Token::Identifier(self.read_while(is_word_char))),
            Some(ch) => Err(LexError::UnexpectedChar {
                ch,
                hint: "",
                position: self.here(),
            }),
        }
    }

    /// Lexes the whole input, ending with an `Eof` token.
    pub fn tokenize(mut self) -> Result<Vec<SpannedToken>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let position = self.token_start;
            let image: String = self.input[position.offset..self.position].iter().collect();
            let done = token == Token::Eof;
            tokens.push(SpannedToken {
                token,
                image,
                position,
            });
            if done {
                return Ok(tokens);
            }
        }
    }
}

#[test]
fn test_words_are_not_reserved() {
    let mut lexer = Lexer::new("strict last to exists");
    assert_eq!(lexer.next_token(), Ok(Token::Identifier("strict".into())));
    assert_eq!(lexer.next_token(), Ok(Token::Identifier("last".into())));
    assert_eq!(lexer.next_token(), Ok(Token::Identifier("to".into())));
    assert_eq!(lexer.next_token(), Ok(Token::Identifier("exists".into())));
    assert_eq!(lexer.next_token(), Ok(Token::Eof));
}

#[test]
fn test_filter() {
    let mut lexer = Lexer::new("$ ? (@.x > 5)");
    assert_eq!(lexer.next_token(), Ok(Token::Dollar));
    assert_eq!(lexer.next_token(), Ok(Token::Question));
    assert_eq!(lexer.next_token(), Ok(Token::LParen));
    assert_eq!(lexer.next_token(), Ok(Token::At));
    assert_eq!(lexer.next_token(), Ok(Token::Dot));
    assert_eq!(lexer.next_token(), Ok(Token::Identifier("x".into())));
    assert_eq!(lexer.next_token(), Ok(Token::Gt));
    assert_eq!(lexer.next_token(), Ok(Token::Integer(5)));
    assert_eq!(lexer.next_token(), Ok(Token::RParen));
}
