///
/// Intrinsic Call Lowering
///
/// Builtin calls such as `lowercase(text, locale)` or `matmul(a, b, m, n, k)`
/// bypass the ordinary calling convention and lower straight to a C
/// statement that invokes a bridge library. Each builtin has an Optimizer
/// that runs the same fixed pipeline:
///
/// 1. validate the parameter count against the builtin's signature
/// 2. resolve every parameter, read-only and in declaration order
/// 3. allocate one temporary of the builtin's result kind
/// 4. declare the bridge header, then emit exactly one statement
/// 5. return a CompiledExpression naming the temporary
///
/// Validation is the only step that fails for well-typed input, and it
/// fails before any collaborator has been touched.
///
/// Module structure:
/// - context: collaborator traits and the per-function LoweringContext
/// - scope: the concrete collaborators the driver uses
/// - signature: parameter lists, arity and optional defaults
/// - operands: resolved operands and coercions
/// - template: native call text and result sinks
/// - registry: name -> optimizer dispatch
/// - icu, stemmer, linalg, matrix: the builtin optimizers
///

pub mod context;
pub mod error;
pub mod icu;
pub mod linalg;
pub mod matrix;
pub mod operands;
pub mod registry;
pub mod scope;
pub mod signature;
pub mod stemmer;
pub mod template;

pub use context::{
    Allocator, Bridge, DependencyTracker, Emitter, Lowering, LoweringContext, Resolver, TempKind,
    TempSymbol,
};
pub use error::{LoweringError, RegistryError};
pub use operands::{Coercion, Operands, Optional, ResolvedOperand};
pub use registry::BuiltinRegistry;
pub use scope::{Bindings, CodePrinter, FunctionScope, HeaderSet, TempAllocator};
pub use signature::{Arity, Param, Signature};
pub use template::{NativeCall, Sink};

use std::fmt;

use serde::Serialize;

use crate::ast::CallExpression;
use crate::source::{Span, Spanned};

/// How the surrounding compiler may consume a lowered value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    /// A zval the caller treats as a generic value
    Variable,
    /// A raw C double
    Double,
}

impl ResultKind {
    pub fn for_temp(kind: TempKind) -> Self {
        match kind {
            TempKind::Double => ResultKind::Double,
            TempKind::Variable | TempKind::String => ResultKind::Variable,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResultKind::Variable => "variable",
            ResultKind::Double => "double",
        }
    }
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of a successful lowering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledExpression {
    pub kind: ResultKind,
    pub name: String,
    /// Canonical name of the builtin that produced the value
    pub builtin: &'static str,
    /// Span of the originating call expression
    pub span: Span,
}

impl Spanned for CompiledExpression {
    fn span(&self) -> Span {
        self.span
    }
}

pub trait Optimizer {
    /// Canonical builtin name.
    fn name(&self) -> &'static str;

    /// Other names the builtin answers to, usually the bridge function's.
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    fn signature(&self) -> &'static Signature;

    fn bridge(&self) -> Bridge;

    fn temp_kind(&self) -> TempKind {
        TempKind::Variable
    }

    fn result_kind(&self) -> ResultKind {
        ResultKind::for_temp(self.temp_kind())
    }

    fn optimize(
        &self,
        call: &CallExpression,
        cx: &mut LoweringContext<'_>,
    ) -> Result<CompiledExpression, LoweringError>;
}

/// Every optimizer shipped with the compiler, in listing order.
pub fn default_optimizers() -> Vec<Box<dyn Optimizer>> {
    vec![
        Box::new(icu::Lowercase),
        Box::new(icu::RemoveDiacritics),
        Box::new(icu::WordBreak),
        Box::new(icu::SentenceBreak),
        Box::new(stemmer::Stem),
        Box::new(linalg::Dot),
        Box::new(linalg::Norm),
        Box::new(linalg::VectorDistance),
        Box::new(linalg::VectorNormalize),
        Box::new(matrix::Matmul),
        Box::new(matrix::Svd),
        Box::new(matrix::ScalarOp::DIVIDE_SCALAR),
        Box::new(matrix::ElementWise::ADD),
        Box::new(matrix::ElementWise::SUBTRACT),
        Box::new(matrix::ElementWise::HADAMARD),
        Box::new(matrix::ElementWise::DIVIDE),
        Box::new(matrix::ScalarOp::SCALE),
        Box::new(matrix::ScalarOp::ADD_SCALAR),
        Box::new(matrix::ScalarOp::MULTIPLY_SCALAR),
    ]
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_kind_for_temp() {
        assert_eq!(ResultKind::for_temp(TempKind::Variable), ResultKind::Variable);
        assert_eq!(ResultKind::for_temp(TempKind::String), ResultKind::Variable);
        assert_eq!(ResultKind::for_temp(TempKind::Double), ResultKind::Double);
    }

    #[test]
    fn test_default_signatures_well_formed() {
        for optimizer in default_optimizers() {
            assert!(
                optimizer.signature().is_well_formed(),
                "{} has a required parameter after an optional one",
                optimizer.name()
            );
        }
    }

    #[test]
    fn test_every_builtin_rejects_zero_parameters() {
        for optimizer in default_optimizers() {
            let outcome = testing::lower_with(optimizer.as_ref(), &format!("{}()", optimizer.name()));
            assert!(
                matches!(outcome.result, Err(LoweringError::Arity { found: 0, .. })),
                "{} accepted an empty call",
                optimizer.name()
            );
            outcome.assert_untouched();
        }
    }

    #[test]
    fn test_every_builtin_lowers_minimal_call() {
        for optimizer in default_optimizers() {
            let signature = optimizer.signature();
            let args: Vec<&str> = signature
                .params
                .iter()
                .filter(|p| !p.is_optional())
                .map(|_| "a")
                .collect();
            let call = format!("{}({})", optimizer.name(), args.join(", "));

            let outcome = testing::lower_with(optimizer.as_ref(), &call);
            let compiled = outcome.result.as_ref().expect("minimal call lowers");

            assert_eq!(compiled.kind, optimizer.result_kind());
            assert_eq!(compiled.builtin, optimizer.name());
            assert_eq!(outcome.statements.len(), 1);
            assert_eq!(outcome.temps.len(), 1);
            assert_eq!(outcome.temps[0].name, compiled.name);
            assert_eq!(outcome.headers.iter().collect::<Vec<_>>(), vec![optimizer.bridge()]);
        }
    }

    #[test]
    fn test_every_builtin_rejects_one_too_many() {
        for optimizer in default_optimizers() {
            let max = optimizer.signature().arity().max();
            let args = vec!["a"; max + 1].join(", ");
            let outcome = testing::lower_with(optimizer.as_ref(), &format!("{}({})", optimizer.name(), args));
            assert!(matches!(outcome.result, Err(LoweringError::Arity { .. })));
            outcome.assert_untouched();
        }
    }
}
