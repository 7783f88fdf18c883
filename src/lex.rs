use std::fmt::Display;

use tracing::trace;

use crate::EvalError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'de> {
    pub kind: TokenKind,
    pub literal: &'de str,
    /// Byte offset of `literal` in the scanned input.
    pub offset: usize,
}

impl Token<'_> {
    pub fn span(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.literal.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    LeftParen,
    RightParen,
    /// One of `+ - * /`.
    Operator(char),
    Ident,
    Number(f64),
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lit = self.literal;
        match self.kind {
            TokenKind::LeftParen => write!(f, "LEFT_PAREN {lit} null"),
            TokenKind::RightParen => write!(f, "RIGHT_PAREN {lit} null"),
            TokenKind::Operator('+') => write!(f, "PLUS {lit} null"),
            TokenKind::Operator('-') => write!(f, "MINUS {lit} null"),
            TokenKind::Operator('*') => write!(f, "STAR {lit} null"),
            TokenKind::Operator('/') => write!(f, "SLASH {lit} null"),
            TokenKind::Operator(_) => write!(f, "OPERATOR {lit} null"),
            TokenKind::Ident => write!(f, "IDENTIFIER {lit} null"),
            TokenKind::Number(n) => {
                if n.is_finite() && n == n.trunc() {
                    write!(f, "NUMBER {lit} {n}.0")
                } else {
                    write!(f, "NUMBER {lit} {n}")
                }
            }
        }
    }
}

/// Splits an expression into [`Token`]s.
///
/// Whitespace and any character that cannot start a token are dropped
/// without an error. The only failure is a numeric literal that does not
/// parse as an `f64`.
pub struct Lexer<'de> {
    whole: &'de str,
    rest: &'de str,
    byte: usize,
}

impl<'de> Lexer<'de> {
    pub fn new(input: &'de str) -> Self {
        Lexer {
            whole: input,
            rest: input,
            byte: 0,
        }
    }

    pub fn whole(&self) -> &'de str {
        self.whole
    }
}

impl<'de> Iterator for Lexer<'de> {
    type Item = Result<Token<'de>, EvalError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut chars = self.rest.chars();
            let c = chars.next()?;
            let literal = &self.rest[..c.len_utf8()];
            let offset = self.byte;
            let cur = self.rest;
            self.rest = chars.as_str();
            self.byte += c.len_utf8();

            enum Start {
                Ident,
                Number,
            }

            let process = |kind: TokenKind| {
                Some(Ok(Token {
                    kind,
                    literal,
                    offset,
                }))
            };

            let started = match c {
                '(' => return process(TokenKind::LeftParen),
                ')' => return process(TokenKind::RightParen),
                '+' | '-' | '*' | '/' => return process(TokenKind::Operator(c)),
                '0'..='9' => Start::Number,
                c if c.is_alphabetic() => Start::Ident,
                c if c.is_whitespace() => continue,
                c => {
                    trace!(character = %c, offset, "ignoring unrecognized character");
                    continue;
                }
            };

            let end_of = |keep: fn(char) -> bool| cur.find(|c| !keep(c)).unwrap_or(cur.len());

            let literal = match started {
                Start::Ident => &cur[..end_of(char::is_alphabetic)],
                Start::Number => &cur[..end_of(|c| c.is_ascii_digit() || c == '.')],
            };

            let extra_bytes = literal.len() - c.len_utf8();
            self.byte += extra_bytes;
            self.rest = &self.rest[extra_bytes..];

            let kind = match started {
                Start::Ident => TokenKind::Ident,
                Start::Number => match literal.parse() {
                    Ok(n) => TokenKind::Number(n),
                    Err(source) => {
                        return Some(Err(EvalError::MalformedNumber {
                            literal: literal.to_string(),
                            source,
                            span: (offset..self.byte).into(),
                        }));
                    }
                },
            };

            return Some(Ok(Token {
                kind,
                literal,
                offset,
            }));
        }
    }
}
