///
/// Lowering Error Types
///
/// Errors raised while lowering a builtin call. They carry the span of the
/// offending call so the diagnostic reporter can point at it.
///
/// Error categories:
/// - Arity: wrong parameter count for the builtin (user-facing)
/// - UnsupportedDestinationKind: an optimizer paired a template with a
///   temporary it cannot write (internal)
/// - UnknownBuiltin: no optimizer registered under the called name
/// - UnresolvedName: a parameter names nothing in the function
/// - RawDoubleOperand: a raw double result passed where a zval is expected
///

use thiserror::Error;

use super::context::TempKind;
use super::signature::Arity;
use super::template::Sink;
use crate::source::{Span, Spanned};

#[derive(Debug, Clone, Error)]
pub enum LoweringError {
    #[error("'{builtin}' requires {arity} {shape}, found {found}")]
    Arity {
        builtin: String,
        arity: Arity,
        shape: String,
        found: usize,
        span: Span,
    },

    #[error("internal error: '{builtin}' cannot emit {sink} into a {kind} temporary")]
    UnsupportedDestinationKind {
        builtin: String,
        sink: Sink,
        kind: TempKind,
        span: Span,
    },

    #[error("unknown builtin '{name}'")]
    UnknownBuiltin { name: String, span: Span },

    #[error("cannot resolve '{name}' in this function")]
    UnresolvedName { name: String, span: Span },

    #[error("'{name}' is a raw double and cannot be passed to a builtin")]
    RawDoubleOperand { name: String, span: Span },
}

impl Spanned for LoweringError {
    fn span(&self) -> Span {
        match self {
            LoweringError::Arity { span, .. }
            | LoweringError::UnsupportedDestinationKind { span, .. }
            | LoweringError::UnknownBuiltin { span, .. }
            | LoweringError::UnresolvedName { span, .. }
            | LoweringError::RawDoubleOperand { span, .. } => *span,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("builtin '{name}' is already registered")]
    DuplicateBuiltin { name: String },

    #[error("no builtin named '{name}'")]
    UnknownBuiltin { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = LoweringError::Arity {
            builtin: "vector_distance".to_string(),
            arity: Arity::Between(2, 4),
            shape: "(a, b, [method], [p])".to_string(),
            found: 1,
            span: Span::new(4, 22, 0),
        };
        assert_eq!(
            err.to_string(),
            "'vector_distance' requires between 2 and 4 parameters (a, b, [method], [p]), found 1"
        );
        assert_eq!(err.span(), Span::new(4, 22, 0));

        let err = LoweringError::UnsupportedDestinationKind {
            builtin: "norm".to_string(),
            sink: Sink::WrapDouble,
            kind: TempKind::Double,
            span: Span::dummy(),
        };
        assert!(err.to_string().contains("internal error"));
        assert!(err.to_string().contains("ZVAL_DOUBLE"));
        assert!(err.to_string().contains("double temporary"));

        let err = RegistryError::DuplicateBuiltin {
            name: "dot".to_string(),
        };
        assert!(err.to_string().contains("already registered"));
    }
}
