///
/// Parser Module - nom-based Token Parsing
///
/// This module provides the parser for coral sources. It uses nom parser
/// combinators to parse a stream of tokens into a Program.
///
/// The parser is structured as follows:
/// - input: TokenStream cursor over the significant tokens
/// - combinators: Reusable token-matching combinators
/// - expressions: Literals, identifiers and builtin calls
/// - items: Functions and statements
///
/// Entry point: parse() takes tokens and the source text and returns a
/// Program plus every error found. After an error the parser skips ahead
/// to the next `fn` so one bad function does not hide the others.
///

mod combinators;
mod expressions;
mod input;
mod items;

pub use combinators::{PError, PErrorKind};
pub use input::TokenStream;

use crate::ast::Program;
use crate::lexer::Token;
use crate::source::{Span, Spanned};

use items::parse_item;

pub struct ParseResult {
    pub ast: Program,
    pub errors: Vec<ParseError>,
}

#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

pub fn parse(tokens: &[Token], source: &str) -> ParseResult {
    let mut items = Vec::with_capacity(8);
    let mut errors = Vec::new();
    let mut input = TokenStream::new(tokens, source);

    let start_span = input.current_span();

    while !input.at_end() {
        match parse_item(input) {
            Ok((rest, item)) => {
                items.push(item);
                input = rest;
            }
            Err(e) => {
                let (err_span, err_msg) = match &e {
                    nom::Err::Error(pe) | nom::Err::Failure(pe) => {
                        (pe.input.current_span(), pe.kind.describe())
                    }
                    nom::Err::Incomplete(_) => (input.current_span(), "incomplete input".to_string()),
                };

                errors.push(ParseError::new(err_msg, err_span));
                input = input.skip_to_next_item();
            }
        }
    }

    let end_span = items.last().map(|i| i.span()).unwrap_or(start_span);

    ParseResult {
        ast: Program::new(items, start_span.merge(end_span)),
        errors,
    }
}
