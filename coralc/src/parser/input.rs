//!
//! Token Cursor
//!
//! The parser's input: the significant tokens of one coral source and the
//! text they were cut from. Combinators ask it about the next token and
//! step past it; `many0` and `separated_list0` only need its length.
//!
//! Recovery also lives here. After a broken item the cursor skips to the
//! next `fn`, always consuming at least one token so parsing cannot stall.
//!

use nom::InputLength;

use crate::lexer::{Keyword, Token, TokenKind};
use crate::source::Span;

#[derive(Debug, Clone, Copy)]
pub struct TokenStream<'a> {
    tokens: &'a [Token],
    source: &'a str,
}

impl<'a> TokenStream<'a> {
    pub fn new(tokens: &'a [Token], source: &'a str) -> Self {
        Self { tokens, source }
    }

    pub fn peek(&self) -> Option<&'a Token> {
        self.tokens.first()
    }

    pub fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    pub fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    pub fn at_keyword(&self, kw: Keyword) -> bool {
        self.at(TokenKind::Keyword(kw))
    }

    /// Nothing but the end-of-file marker is left.
    pub fn at_end(&self) -> bool {
        matches!(self.peek_kind(), None | Some(TokenKind::Eof))
    }

    /// Source text of a token from this stream, numeric separators included.
    pub fn lexeme(&self, token: &Token) -> &'a str {
        &self.source[token.span.start as usize..token.span.end as usize]
    }

    /// Span of the next token, or a dummy span on an empty stream.
    pub fn current_span(&self) -> Span {
        self.peek().map(|t| t.span).unwrap_or(Span::dummy())
    }

    pub fn advance(self) -> Self {
        Self {
            tokens: self.tokens.get(1..).unwrap_or_default(),
            source: self.source,
        }
    }

    /// Consumes the next token when it has the given kind.
    pub fn eat(self, kind: TokenKind) -> Option<(Self, &'a Token)> {
        match self.peek() {
            Some(tok) if tok.kind == kind => Some((self.advance(), tok)),
            _ => None,
        }
    }

    /// Skips the current token, then everything up to the next `fn`.
    pub fn skip_to_next_item(self) -> Self {
        let mut input = self.advance();
        while !input.at_end() && !input.at_keyword(Keyword::Fn) {
            input = input.advance();
        }
        input
    }
}

impl InputLength for TokenStream<'_> {
    fn input_len(&self) -> usize {
        self.tokens.len()
    }
}
