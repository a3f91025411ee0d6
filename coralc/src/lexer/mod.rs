//!
//! Lexer Module - Zero-Copy Tokenization
//!
//! This module handles tokenization of coral source code. It produces a
//! stream of tokens that the parser consumes to build the AST.
//!
//! Key design decisions:
//! - Zero-copy: Tokens reference the source string, no allocations per token
//! - String interning: Identifiers and strings stored via lasso::Spur
//! - Whitespace/comments filtered out for fast parsing (no trivia in output)
//!
//! Token categories:
//! - Keywords: fn, let, true, false
//! - Identifiers: builtin names, parameters, bindings
//! - Literals: Numbers, strings
//! - Delimiters: (, ), {, }, ',', ';', '='
//!

use crate::source::Span;
use lasso::{Rodeo, Spur};
use memchr::{memchr, memchr2};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub symbol: Option<Spur>,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self {
            kind,
            span,
            symbol: None,
        }
    }

    pub fn with_symbol(kind: TokenKind, span: Span, symbol: Spur) -> Self {
        Self {
            kind,
            span,
            symbol: Some(symbol),
        }
    }

    pub fn is_trivia(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Whitespace | TokenKind::Comment | TokenKind::Newline
        )
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Ident,
    IntLit,
    FloatLit,
    StringLit,

    Keyword(Keyword),

    Minus,
    Eq,

    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Semicolon,

    Whitespace,
    Newline,
    Comment,

    Error,
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Fn,
    Let,
    True,
    False,
}

impl Keyword {
    fn from_ident(text: &str) -> Option<Keyword> {
        match text {
            "fn" => Some(Keyword::Fn),
            "let" => Some(Keyword::Let),
            "true" => Some(Keyword::True),
            "false" => Some(Keyword::False),
            _ => None,
        }
    }
}

pub fn tokenize(source: &str) -> (Vec<Token>, Rodeo) {
    let mut lexer = Lexer::new(source);
    let tokens = lexer.tokenize_all();
    (tokens, lexer.interner)
}

struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    interner: Rodeo,
    file_id: u32,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            interner: Rodeo::default(),
            file_id: 0,
        }
    }

    fn tokenize_all(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        while !self.is_eof() {
            let token = self.next_token();
            // Filter trivia at source - parser never sees whitespace/comments
            if !token.is_trivia() {
                tokens.push(token);
            }
        }

        tokens.push(Token::new(
            TokenKind::Eof,
            Span::new(self.pos as u32, self.pos as u32, self.file_id),
        ));

        tokens
    }

    #[inline(always)]
    fn is_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    #[inline(always)]
    fn peek_byte(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    #[inline(always)]
    fn peek_byte2(&self) -> Option<u8> {
        self.bytes.get(self.pos + 1).copied()
    }

    #[inline(always)]
    fn advance_byte(&mut self) -> Option<u8> {
        let b = self.peek_byte()?;
        self.pos += 1;
        Some(b)
    }

    fn next_token(&mut self) -> Token {
        let start = self.pos as u32;

        let Some(b) = self.advance_byte() else {
            return Token::new(TokenKind::Eof, Span::new(start, start, self.file_id));
        };

        let kind = match b {
            b' ' | b'\t' | b'\r' => {
                while matches!(self.peek_byte(), Some(b' ' | b'\t' | b'\r')) {
                    self.pos += 1;
                }
                TokenKind::Whitespace
            }

            b'\n' => TokenKind::Newline,

            b'/' if self.peek_byte() == Some(b'/') => {
                if let Some(offset) = memchr(b'\n', &self.bytes[self.pos..]) {
                    self.pos += offset;
                } else {
                    self.pos = self.bytes.len();
                }
                TokenKind::Comment
            }

            b'/' if self.peek_byte() == Some(b'*') => {
                self.pos += 1;
                let mut depth = 1;
                while depth > 0 && !self.is_eof() {
                    match (self.peek_byte(), self.peek_byte2()) {
                        (Some(b'/'), Some(b'*')) => {
                            self.pos += 2;
                            depth += 1;
                        }
                        (Some(b'*'), Some(b'/')) => {
                            self.pos += 2;
                            depth -= 1;
                        }
                        _ => {
                            self.pos += 1;
                        }
                    }
                }
                TokenKind::Comment
            }

            b'-' => TokenKind::Minus,
            b'=' => TokenKind::Eq,
            b',' => TokenKind::Comma,
            b';' => TokenKind::Semicolon,

            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,

            b'"' => self.scan_string(),

            b'0'..=b'9' => self.scan_number(),

            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.scan_ident_or_keyword(start),

            _ if b > 127 => {
                // Skip the rest of the UTF-8 sequence so the error span covers one char
                while matches!(self.peek_byte(), Some(0x80..=0xBF)) {
                    self.pos += 1;
                }
                TokenKind::Error
            }

            _ => TokenKind::Error,
        };

        let end = self.pos as u32;
        let span = Span::new(start, end, self.file_id);

        match kind {
            TokenKind::Ident => {
                let text = &self.source[start as usize..end as usize];
                let symbol = self.interner.get_or_intern(text);
                Token::with_symbol(kind, span, symbol)
            }
            TokenKind::StringLit => {
                let raw = &self.source[(start as usize + 1)..(end as usize - 1)];
                let text = unescape(raw);
                let symbol = self.interner.get_or_intern(text.as_ref());
                Token::with_symbol(kind, span, symbol)
            }
            _ => Token::new(kind, span),
        }
    }

    fn scan_string(&mut self) -> TokenKind {
        loop {
            match memchr2(b'"', b'\\', &self.bytes[self.pos..]) {
                Some(offset) => {
                    if let Some(nl_offset) = memchr(b'\n', &self.bytes[self.pos..self.pos + offset]) {
                        self.pos += nl_offset;
                        return TokenKind::Error; // Unterminated string
                    }
                    self.pos += offset;
                    if self.bytes[self.pos] == b'"' {
                        self.pos += 1;
                        return TokenKind::StringLit;
                    }
                    self.pos += 1;
                    if self.pos < self.bytes.len() {
                        self.pos += 1; // Skip escaped char
                    }
                }
                None => {
                    if let Some(nl_offset) = memchr(b'\n', &self.bytes[self.pos..]) {
                        self.pos += nl_offset;
                    } else {
                        self.pos = self.bytes.len();
                    }
                    return TokenKind::Error; // Unterminated string
                }
            }
        }
    }

    fn scan_number(&mut self) -> TokenKind {
        self.skip_digits();

        if self.peek_byte() == Some(b'.') && matches!(self.peek_byte2(), Some(b'0'..=b'9')) {
            self.pos += 1;
            self.skip_digits();
            return TokenKind::FloatLit;
        }

        TokenKind::IntLit
    }

    fn skip_digits(&mut self) {
        while matches!(self.peek_byte(), Some(b'0'..=b'9' | b'_')) {
            self.pos += 1;
        }
    }

    fn scan_ident_or_keyword(&mut self, start: u32) -> TokenKind {
        while matches!(
            self.peek_byte(),
            Some(b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_')
        ) {
            self.pos += 1;
        }

        let text = &self.source[start as usize..self.pos];
        match Keyword::from_ident(text) {
            Some(kw) => TokenKind::Keyword(kw),
            None => TokenKind::Ident,
        }
    }
}

fn unescape(raw: &str) -> std::borrow::Cow<'_, str> {
    if !raw.contains('\\') {
        return std::borrow::Cow::Borrowed(raw);
    }

    let mut result = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('t') => result.push('\t'),
                Some('r') => result.push('\r'),
                Some('\\') => result.push('\\'),
                Some('"') => result.push('"'),
                Some('0') => result.push('\0'),
                Some(other) => {
                    result.push('\\');
                    result.push(other);
                }
                None => result.push('\\'),
            }
        } else {
            result.push(c);
        }
    }
    std::borrow::Cow::Owned(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let (tokens, _) = tokenize(source);
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_tokenize_let_call() {
        assert_eq!(
            kinds("let d = dot(a, b);"),
            vec![
                TokenKind::Keyword(Keyword::Let),
                TokenKind::Ident,
                TokenKind::Eq,
                TokenKind::Ident,
                TokenKind::LParen,
                TokenKind::Ident,
                TokenKind::Comma,
                TokenKind::Ident,
                TokenKind::RParen,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_numbers() {
        assert_eq!(
            kinds("1 3.0 -2 4."),
            vec![
                TokenKind::IntLit,
                TokenKind::FloatLit,
                TokenKind::Minus,
                TokenKind::IntLit,
                TokenKind::IntLit,
                TokenKind::Error,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_are_trivia() {
        assert_eq!(
            kinds("// line\n/* block /* nested */ */ fn"),
            vec![TokenKind::Keyword(Keyword::Fn), TokenKind::Eof]
        );
    }

    #[test]
    fn test_string_escapes_interned() {
        let (tokens, interner) = tokenize(r#""en\tUS""#);
        assert_eq!(tokens[0].kind, TokenKind::StringLit);
        let symbol = tokens[0].symbol.expect("string literal symbol");
        assert_eq!(interner.resolve(&symbol), "en\tUS");
    }

    #[test]
    fn test_unterminated_string() {
        let (tokens, _) = tokenize("\"open\nfn");
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!(tokens[1].kind, TokenKind::Keyword(Keyword::Fn));
    }
}
