//!
//! Item and Statement Parsing
//!
//! fn name(param, ...) { let x = call(...); call(...); }
//!

use nom::multi::{many0, separated_list0};

use crate::ast::{ExprStmt, FunctionItem, LetStmt, Statement};
use crate::lexer::{Keyword, TokenKind};

use super::combinators::{fail, ident, keyword, token, PErrorKind, PResult};
use super::expressions::parse_call;
use super::input::TokenStream;

pub fn parse_item(input: TokenStream) -> PResult<FunctionItem> {
    if !input.at_keyword(Keyword::Fn) {
        return fail(input, PErrorKind::ExpectedItem);
    }
    parse_function(input)
}

fn parse_function(input: TokenStream) -> PResult<FunctionItem> {
    let (input, fn_tok) = keyword(Keyword::Fn)(input)?;
    let (input, name) = ident(input)?;
    let (input, _) = token(TokenKind::LParen)(input)?;
    let (input, params) = separated_list0(token(TokenKind::Comma), ident)(input)?;
    let (input, _) = token(TokenKind::RParen)(input)?;
    let (input, _) = token(TokenKind::LBrace)(input)?;
    let (input, body) = many0(parse_statement)(input)?;

    if !input.at(TokenKind::RBrace) {
        // Report why the next statement did not parse rather than a bare '}'
        parse_statement(input)?;
        return fail(input, PErrorKind::Expected(TokenKind::RBrace));
    }
    let (input, close) = token(TokenKind::RBrace)(input)?;

    Ok((
        input,
        FunctionItem {
            name,
            params,
            body,
            span: fn_tok.span.merge(close.span),
        },
    ))
}

pub fn parse_statement(input: TokenStream) -> PResult<Statement> {
    if input.at_keyword(Keyword::Let) {
        let (input, let_tok) = keyword(Keyword::Let)(input)?;
        let (input, name) = ident(input)?;
        let (input, _) = token(TokenKind::Eq)(input)?;
        let (input, value) = parse_call(input)?;
        let (input, semi) = token(TokenKind::Semicolon)(input)?;

        return Ok((
            input,
            Statement::Let(LetStmt {
                name,
                value,
                span: let_tok.span.merge(semi.span),
            }),
        ));
    }

    let (input, call) = parse_call(input)?;
    let (input, semi) = token(TokenKind::Semicolon)(input)?;
    let span = call.span.merge(semi.span);

    Ok((input, Statement::Expression(ExprStmt { call, span })))
}
