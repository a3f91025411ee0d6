//!
//! Expression Parsing
//!
//! Parses call parameters: literals, identifiers and (possibly nested)
//! builtin calls. A leading '-' is folded into the numeric literal.
//!

use nom::multi::separated_list0;

use crate::ast::{CallExpression, Expression, Ident, IdentExpr, Literal, LiteralExpr};
use crate::lexer::{Keyword, TokenKind};

use super::combinators::{fail, float_lit, ident, int_lit, string_lit, token, PErrorKind, PResult};
use super::input::TokenStream;

pub fn parse_expression(input: TokenStream) -> PResult<Expression> {
    match input.peek_kind() {
        Some(TokenKind::IntLit) | Some(TokenKind::FloatLit) | Some(TokenKind::Minus) => {
            parse_number(input)
        }
        Some(TokenKind::StringLit) => {
            let (input, (symbol, span)) = string_lit(input)?;
            Ok((input, literal(Literal::String(symbol), span)))
        }
        Some(TokenKind::Keyword(kw @ (Keyword::True | Keyword::False))) => {
            let span = input.current_span();
            Ok((input.advance(), literal(Literal::Bool(kw == Keyword::True), span)))
        }
        Some(TokenKind::Ident) => {
            let (rest, name) = ident(input)?;
            if rest.at(TokenKind::LParen) {
                let (rest, call) = parse_call_args(rest, name)?;
                Ok((rest, Expression::Call(call)))
            } else {
                Ok((
                    rest,
                    Expression::Identifier(IdentExpr {
                        ident: name,
                        span: name.span,
                    }),
                ))
            }
        }
        _ => fail(input, PErrorKind::ExpectedExpr),
    }
}

pub fn parse_call(input: TokenStream) -> PResult<CallExpression> {
    let (input, callee) = ident(input)?;
    parse_call_args(input, callee)
}

fn parse_call_args(input: TokenStream, callee: Ident) -> PResult<CallExpression> {
    let (input, _) = token(TokenKind::LParen)(input)?;
    let (input, args) = separated_list0(token(TokenKind::Comma), parse_expression)(input)?;
    let (input, close) = token(TokenKind::RParen)(input)?;

    Ok((input, CallExpression::new(callee, args, callee.span.merge(close.span))))
}

fn parse_number(input: TokenStream) -> PResult<Expression> {
    let (rest, minus) = match token(TokenKind::Minus)(input) {
        Ok((rest, tok)) => (rest, Some(tok.span)),
        Err(_) => (input, None),
    };

    let (rest, value, span) = match rest.peek_kind() {
        Some(TokenKind::FloatLit) => {
            let (rest, (value, span)) = float_lit(rest)?;
            let value = if minus.is_some() { -value } else { value };
            (rest, Literal::Float(value), span)
        }
        Some(TokenKind::IntLit) => {
            let (rest, (value, span)) = int_lit(rest)?;
            let value = if minus.is_some() { -value } else { value };
            (rest, Literal::Int(value), span)
        }
        _ => return fail(rest, PErrorKind::ExpectedExpr),
    };

    let span = minus.map(|m| m.merge(span)).unwrap_or(span);
    Ok((rest, literal(value, span)))
}

fn literal(value: Literal, span: crate::source::Span) -> Expression {
    Expression::Literal(LiteralExpr { value, span })
}
