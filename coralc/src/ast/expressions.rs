//!
//! Expression AST Nodes
//!
//! Expressions are the parameters of builtin calls. They are read by the
//! resolver and never mutated after parsing.
//!
//! Expression categories:
//! - Atoms: literals, identifiers
//! - Calls: builtin calls, which may nest as parameters of other calls
//!

use lasso::Spur;

use super::Ident;
use crate::source::{Span, Spanned};

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(LiteralExpr),
    Identifier(IdentExpr),
    Call(CallExpression),
}

impl Spanned for Expression {
    fn span(&self) -> Span {
        match self {
            Expression::Literal(e) => e.span,
            Expression::Identifier(e) => e.span,
            Expression::Call(e) => e.span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(Spur),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpr {
    pub value: Literal,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdentExpr {
    pub ident: Ident,
    pub span: Span,
}

/// A call naming a builtin, with its parameters in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    pub callee: Ident,
    pub args: Vec<Expression>,
    pub span: Span,
}

impl CallExpression {
    pub fn new(callee: Ident, args: Vec<Expression>, span: Span) -> Self {
        Self { callee, args, span }
    }

    pub fn arg_count(&self) -> usize {
        self.args.len()
    }
}

impl Spanned for CallExpression {
    fn span(&self) -> Span {
        self.span
    }
}
