//!
//! Function Items and Statements
//!
//! A coral function is a named list of `zval *` parameters and a body of
//! statements, each of which evaluates one builtin call. Let statements
//! bind the call's result so later calls can pass it on.
//!

use super::{CallExpression, Ident};
use crate::source::{Span, Spanned};

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionItem {
    pub name: Ident,
    pub params: Vec<Ident>,
    pub body: Vec<Statement>,
    pub span: Span,
}

impl Spanned for FunctionItem {
    fn span(&self) -> Span {
        self.span
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Let(LetStmt),
    Expression(ExprStmt),
}

impl Statement {
    pub fn call(&self) -> &CallExpression {
        match self {
            Statement::Let(s) => &s.value,
            Statement::Expression(s) => &s.call,
        }
    }
}

impl Spanned for Statement {
    fn span(&self) -> Span {
        match self {
            Statement::Let(s) => s.span,
            Statement::Expression(s) => s.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LetStmt {
    pub name: Ident,
    pub value: CallExpression,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub call: CallExpression,
    pub span: Span,
}
