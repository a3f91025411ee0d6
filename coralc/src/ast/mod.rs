///
/// Abstract Syntax Tree Module
///
/// This module defines the AST for coral sources. The AST is produced by
/// the parser and consumed by the lowering driver, which hands every
/// builtin call expression to the matching optimizer.
///
/// Module structure:
/// - expressions: Identifiers, literals and call expressions
/// - items: Functions and their statements
///
/// The root AST node is Program, representing a complete coral source file.
///

pub mod expressions;
pub mod items;

pub use expressions::*;
pub use items::*;

use lasso::Spur;

use crate::source::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ident {
    pub symbol: Spur,
    pub span: Span,
}

impl Ident {
    pub fn new(symbol: Spur, span: Span) -> Self {
        Self { symbol, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub items: Vec<FunctionItem>,
    pub span: Span,
}

impl Program {
    pub fn new(items: Vec<FunctionItem>, span: Span) -> Self {
        Self { items, span }
    }

    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            span: Span::dummy(),
        }
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionItem> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_empty() {
        let program = Program::empty();
        assert!(program.items.is_empty());
        assert_eq!(program.functions().count(), 0);
    }
}
