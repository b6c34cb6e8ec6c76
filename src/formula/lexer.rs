use crate::error::FormulaError;
use std::iter::Peekable;
use std::ops::Range;
use std::str::CharIndices;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Text(String),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    EqEq,
    NotEq,
    Gt,
    Lt,
    Gte,
    Lte,
    AndAnd,
    OrOr,
    Bang,
    LParen,
    RParen,
    Comma,
}

/// A lexed token and the byte range it occupies in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

impl Token {
    pub fn is_ident(&self, name: &str) -> bool {
        matches!(&self.kind, TokenKind::Ident(id) if id.eq_ignore_ascii_case(name))
    }
}

/// Splits an ASCII-normalized formula into tokens.
pub fn tokenize(src: &str) -> Result<Vec<Token>, FormulaError> {
    Lexer::new(src).run()
}

struct Lexer<'a> {
    src: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            chars: src.char_indices().peekable(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>, FormulaError> {
        let mut tokens = Vec::new();
        while let Some(&(start, ch)) = self.chars.peek() {
            if ch.is_whitespace() {
                self.chars.next();
                continue;
            }
            let kind = match ch {
                '0'..='9' | '.' => self.number(start)?,
                '"' | '\'' => self.text(start, ch)?,
                c if c.is_ascii_alphabetic() => self.ident(start),
                _ => self.operator(start, ch)?,
            };
            let end = self.chars.peek().map_or(self.src.len(), |&(i, _)| i);
            tokens.push(Token {
                kind,
                span: start..end,
            });
        }
        Ok(tokens)
    }

    fn bump_while(&mut self, pred: impl Fn(char) -> bool) -> usize {
        while let Some(&(_, c)) = self.chars.peek() {
            if !pred(c) {
                break;
            }
            self.chars.next();
        }
        self.chars.peek().map_or(self.src.len(), |&(i, _)| i)
    }

    fn number(&mut self, start: usize) -> Result<TokenKind, FormulaError> {
        let mut end = self.bump_while(|c| c.is_ascii_digit());
        if self.src[end..].starts_with('.') {
            self.chars.next();
            end = self.bump_while(|c| c.is_ascii_digit());
        }
        // An exponent only counts when digits follow it, so `2e` stays `2` then `e`.
        let rest = &self.src[end..];
        let mut exp = rest.chars();
        if matches!(exp.next(), Some('e' | 'E')) {
            let after_sign = match exp.clone().next() {
                Some('+' | '-') => {
                    exp.next();
                    exp.next()
                }
                other => other,
            };
            if matches!(after_sign, Some(d) if d.is_ascii_digit()) {
                self.chars.next();
                if matches!(self.chars.peek(), Some(&(_, '+' | '-'))) {
                    self.chars.next();
                }
                end = self.bump_while(|c| c.is_ascii_digit());
            }
        }

        let literal = &self.src[start..end];
        literal
            .parse::<f64>()
            .map(TokenKind::Number)
            .map_err(|_| FormulaError::malformed(literal, "invalid number"))
    }

    fn text(&mut self, start: usize, quote: char) -> Result<TokenKind, FormulaError> {
        self.chars.next();
        let mut value = String::new();
        while let Some((_, c)) = self.chars.next() {
            match c {
                '\\' => {
                    if let Some((_, escaped)) = self.chars.next() {
                        value.push(escaped);
                    }
                }
                c if c == quote => return Ok(TokenKind::Text(value)),
                c => value.push(c),
            }
        }
        Err(FormulaError::malformed(
            &self.src[start..],
            "unterminated string literal",
        ))
    }

    fn ident(&mut self, start: usize) -> TokenKind {
        let end = self.bump_while(|c| c.is_ascii_alphanumeric() || c == '_');
        TokenKind::Ident(self.src[start..end].to_string())
    }

    fn operator(&mut self, start: usize, ch: char) -> Result<TokenKind, FormulaError> {
        self.chars.next();
        let next = self.chars.peek().map(|&(_, c)| c);
        let (kind, wide) = match (ch, next) {
            ('=', Some('=')) => (TokenKind::EqEq, true),
            ('!', Some('=')) => (TokenKind::NotEq, true),
            ('>', Some('=')) => (TokenKind::Gte, true),
            ('<', Some('=')) => (TokenKind::Lte, true),
            ('&', Some('&')) => (TokenKind::AndAnd, true),
            ('|', Some('|')) => (TokenKind::OrOr, true),
            ('+', _) => (TokenKind::Plus, false),
            ('-', _) => (TokenKind::Minus, false),
            ('*', _) => (TokenKind::Star, false),
            ('/', _) => (TokenKind::Slash, false),
            ('>', _) => (TokenKind::Gt, false),
            ('<', _) => (TokenKind::Lt, false),
            ('!', _) => (TokenKind::Bang, false),
            ('(', _) => (TokenKind::LParen, false),
            (')', _) => (TokenKind::RParen, false),
            (',', _) => (TokenKind::Comma, false),
            ('=', _) => {
                return Err(FormulaError::malformed(
                    "=",
                    "use '==' to compare values",
                ));
            }
            _ => {
                let len = ch.len_utf8();
                return Err(FormulaError::malformed(
                    &self.src[start..start + len],
                    "unexpected character",
                ));
            }
        };
        if wide {
            self.chars.next();
        }
        Ok(kind)
    }
}
