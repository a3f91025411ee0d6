//!
//! Base Combinators for Token Parsing
//!
//! Reusable nom combinators for matching tokens, keywords, identifiers
//! and literals.
//!

use nom::error::{ErrorKind, ParseError};
use nom::IResult;

use crate::ast::Ident;
use crate::lexer::{Keyword, Token, TokenKind};
use crate::source::Span;

use super::input::TokenStream;

pub type PResult<'a, O> = IResult<TokenStream<'a>, O, PError<'a>>;

#[derive(Debug, Clone)]
pub struct PError<'a> {
    pub input: TokenStream<'a>,
    pub kind: PErrorKind,
}

#[derive(Debug, Clone)]
pub enum PErrorKind {
    Expected(TokenKind),
    ExpectedKeyword(Keyword),
    ExpectedIdent,
    ExpectedExpr,
    ExpectedItem,
    InvalidNumber,
    Nom(ErrorKind),
}

impl PErrorKind {
    pub fn describe(&self) -> String {
        match self {
            PErrorKind::Expected(kind) => format!("expected {}", token_name(*kind)),
            PErrorKind::ExpectedKeyword(kw) => format!("expected keyword '{}'", keyword_name(*kw)),
            PErrorKind::ExpectedIdent => "expected identifier".to_string(),
            PErrorKind::ExpectedExpr => "expected expression".to_string(),
            PErrorKind::ExpectedItem => "expected 'fn' item".to_string(),
            PErrorKind::InvalidNumber => "number literal out of range".to_string(),
            PErrorKind::Nom(kind) => format!("parse failure ({:?})", kind),
        }
    }
}

fn token_name(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Ident => "identifier",
        TokenKind::IntLit => "integer literal",
        TokenKind::FloatLit => "float literal",
        TokenKind::StringLit => "string literal",
        TokenKind::Keyword(kw) => keyword_name(kw),
        TokenKind::Minus => "'-'",
        TokenKind::Eq => "'='",
        TokenKind::LParen => "'('",
        TokenKind::RParen => "')'",
        TokenKind::LBrace => "'{'",
        TokenKind::RBrace => "'}'",
        TokenKind::Comma => "','",
        TokenKind::Semicolon => "';'",
        TokenKind::Whitespace | TokenKind::Newline | TokenKind::Comment => "trivia",
        TokenKind::Error => "invalid token",
        TokenKind::Eof => "end of file",
    }
}

fn keyword_name(kw: Keyword) -> &'static str {
    match kw {
        Keyword::Fn => "fn",
        Keyword::Let => "let",
        Keyword::True => "true",
        Keyword::False => "false",
    }
}

impl<'a> ParseError<TokenStream<'a>> for PError<'a> {
    fn from_error_kind(input: TokenStream<'a>, kind: ErrorKind) -> Self {
        PError {
            input,
            kind: PErrorKind::Nom(kind),
        }
    }

    fn append(_input: TokenStream<'a>, _kind: ErrorKind, other: Self) -> Self {
        other
    }
}

pub fn fail<O>(input: TokenStream, kind: PErrorKind) -> PResult<O> {
    Err(nom::Err::Error(PError { input, kind }))
}

/// Like `fail`, but no enclosing alternative or list may swallow it.
pub fn cut<O>(input: TokenStream, kind: PErrorKind) -> PResult<O> {
    Err(nom::Err::Failure(PError { input, kind }))
}

pub fn token(kind: TokenKind) -> impl Fn(TokenStream) -> PResult<Token> {
    move |input: TokenStream| match input.eat(kind) {
        Some((rest, tok)) => Ok((rest, *tok)),
        None => fail(input, PErrorKind::Expected(kind)),
    }
}

pub fn keyword(kw: Keyword) -> impl Fn(TokenStream) -> PResult<Token> {
    move |input: TokenStream| match input.eat(TokenKind::Keyword(kw)) {
        Some((rest, tok)) => Ok((rest, *tok)),
        None => fail(input, PErrorKind::ExpectedKeyword(kw)),
    }
}

pub fn ident(input: TokenStream) -> PResult<Ident> {
    match input.eat(TokenKind::Ident) {
        Some((rest, tok)) => match tok.symbol {
            Some(symbol) => Ok((rest, Ident::new(symbol, tok.span))),
            None => fail(input, PErrorKind::ExpectedIdent),
        },
        None => fail(input, PErrorKind::ExpectedIdent),
    }
}

/// Digits of a numeric token with `_` separators removed.
fn number_text(input: TokenStream, kind: TokenKind) -> PResult<(String, Span)> {
    match input.eat(kind) {
        Some((rest, tok)) => Ok((rest, (input.lexeme(tok).replace('_', ""), tok.span))),
        None => fail(input, PErrorKind::Expected(kind)),
    }
}

pub fn int_lit(input: TokenStream) -> PResult<(i64, Span)> {
    let (rest, (digits, span)) = number_text(input, TokenKind::IntLit)?;
    match digits.parse::<i64>() {
        Ok(value) => Ok((rest, (value, span))),
        Err(_) => cut(input, PErrorKind::InvalidNumber),
    }
}

/// A float literal that fits an f64. Overflowing literals are rejected
/// rather than rounded to infinity.
pub fn float_lit(input: TokenStream) -> PResult<(f64, Span)> {
    let (rest, (digits, span)) = number_text(input, TokenKind::FloatLit)?;
    match digits.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok((rest, (value, span))),
        _ => cut(input, PErrorKind::InvalidNumber),
    }
}

pub fn string_lit(input: TokenStream) -> PResult<(lasso::Spur, Span)> {
    match input.eat(TokenKind::StringLit) {
        Some((rest, tok)) => match tok.symbol {
            Some(symbol) => Ok((rest, (symbol, tok.span))),
            None => fail(input, PErrorKind::Expected(TokenKind::StringLit)),
        },
        None => fail(input, PErrorKind::Expected(TokenKind::StringLit)),
    }
}
