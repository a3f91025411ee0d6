//!
//! Lowering Collaborators
//!
//! The four services every optimizer leans on, and the context value that
//! bundles them for the duration of one function:
//!
//! - Resolver: parameter expressions -> read-only native operands
//! - Allocator: fresh, uniquely named temporaries
//! - Emitter: append-only native statement stream
//! - DependencyTracker: set of bridge headers a unit needs
//!
//! A LoweringContext borrows one of each. It is created per function by
//! the driver and is never shared between functions.
//!

use std::fmt;

use serde::Serialize;

use super::error::LoweringError;
use super::operands::Operands;
use super::template::{NativeCall, Sink};
use super::{CompiledExpression, ResultKind};
use crate::ast::{CallExpression, Expression};

/// Semantic kind of a temporary slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TempKind {
    /// Generic zval, used for array and string-like results
    Variable,
    /// Raw C double
    Double,
    /// zval holding a zend_string
    String,
}

impl TempKind {
    pub fn c_type(self) -> &'static str {
        match self {
            TempKind::Variable | TempKind::String => "zval",
            TempKind::Double => "double",
        }
    }

    pub fn is_zval(self) -> bool {
        matches!(self, TempKind::Variable | TempKind::String)
    }
}

impl fmt::Display for TempKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TempKind::Variable => "variable",
            TempKind::Double => "double",
            TempKind::String => "string",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TempSymbol {
    pub name: String,
    pub kind: TempKind,
}

/// External bridge module family. Each maps to one `<header>.h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bridge {
    Icu,
    Snowball,
    Lapack,
    CControl,
}

impl Bridge {
    pub fn header(self) -> &'static str {
        match self {
            Bridge::Icu => "icu_bridge",
            Bridge::Snowball => "snowball_bridge",
            Bridge::Lapack => "lapack_bridge",
            Bridge::CControl => "ccontrol_bridge",
        }
    }
}

impl fmt::Display for Bridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

impl Serialize for Bridge {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.header())
    }
}

pub trait Resolver {
    /// One operand per expression, in the order given. Never mutates.
    fn resolve(&self, args: &[Expression]) -> Result<Operands, LoweringError>;
}

pub trait Allocator {
    /// A temporary whose name aliases no other live symbol of the function.
    fn allocate_temp(&mut self, kind: TempKind) -> TempSymbol;
}

pub trait Emitter {
    fn emit(&mut self, statement: String);
}

pub trait DependencyTracker {
    /// Returns true when the bridge was not required before.
    fn require(&mut self, bridge: Bridge) -> bool;
}

/// Everything one lowering needs, as the optimizer fills in after resolving.
#[derive(Debug, Clone)]
pub struct Lowering {
    pub builtin: &'static str,
    pub bridge: Bridge,
    pub temp: TempKind,
    pub sink: Sink,
    pub native: NativeCall,
}

pub struct LoweringContext<'s> {
    resolver: &'s dyn Resolver,
    allocator: &'s mut dyn Allocator,
    emitter: &'s mut dyn Emitter,
    dependencies: &'s mut dyn DependencyTracker,
}

impl<'s> LoweringContext<'s> {
    pub fn new(
        resolver: &'s dyn Resolver,
        allocator: &'s mut dyn Allocator,
        emitter: &'s mut dyn Emitter,
        dependencies: &'s mut dyn DependencyTracker,
    ) -> Self {
        Self {
            resolver,
            allocator,
            emitter,
            dependencies,
        }
    }

    pub fn resolve(&self, args: &[Expression]) -> Result<Operands, LoweringError> {
        self.resolver.resolve(args)
    }

    /// Allocates the destination, declares the bridge and emits the call.
    ///
    /// The sink is checked against the temp kind first, so an internal
    /// template mismatch fails before any collaborator is touched.
    pub fn complete(
        &mut self,
        call: &CallExpression,
        lowering: Lowering,
    ) -> Result<CompiledExpression, LoweringError> {
        let Lowering {
            builtin,
            bridge,
            temp,
            sink,
            native,
        } = lowering;

        if !sink.accepts(temp) {
            return Err(LoweringError::UnsupportedDestinationKind {
                builtin: builtin.to_string(),
                sink,
                kind: temp,
                span: call.span,
            });
        }

        let symbol = self.allocator.allocate_temp(temp);
        self.dependencies.require(bridge);
        self.emitter.emit(sink.render(&native, &symbol));

        Ok(CompiledExpression {
            kind: ResultKind::for_temp(symbol.kind),
            name: symbol.name,
            builtin,
            span: call.span,
        })
    }
}

#[cfg(test)]
mod tests {
    use lasso::Rodeo;

    use super::*;
    use crate::ast::Ident;
    use crate::lowering::operands::Coercion;
    use crate::lowering::scope::{FunctionScope, HeaderSet};
    use crate::source::{Span, Spanned};

    #[test]
    fn test_incompatible_sink_fails_before_side_effects() {
        let mut interner = Rodeo::default();
        let x = Ident::new(interner.get_or_intern("x"), Span::dummy());
        let callee = Ident::new(interner.get_or_intern("norm"), Span::dummy());
        let call = CallExpression::new(callee, Vec::new(), Span::new(3, 12, 0));

        let mut headers = HeaderSet::new();
        let mut scope = FunctionScope::new(&interner, &[x], "_");
        let result = {
            let mut cx = scope.context(&mut headers);
            cx.complete(
                &call,
                Lowering {
                    builtin: "norm",
                    bridge: Bridge::Lapack,
                    temp: TempKind::Double,
                    sink: Sink::WrapDouble,
                    native: NativeCall::new("linear_algebra_norm_zval").arg(Coercion::Zval, "x"),
                },
            )
        };

        let err = result.unwrap_err();
        assert!(matches!(
            err,
            LoweringError::UnsupportedDestinationKind {
                sink: Sink::WrapDouble,
                kind: TempKind::Double,
                ..
            }
        ));
        assert_eq!(err.span(), Span::new(3, 12, 0));
        assert!(scope.temps.temps().is_empty());
        assert!(scope.printer.lines().is_empty());
        assert!(headers.is_empty());
    }

    #[test]
    fn test_complete_allocates_declares_and_emits() {
        let mut interner = Rodeo::default();
        let a = Ident::new(interner.get_or_intern("a"), Span::dummy());
        let callee = Ident::new(interner.get_or_intern("dot"), Span::dummy());
        let call = CallExpression::new(callee, Vec::new(), Span::dummy());

        let mut headers = HeaderSet::new();
        let mut scope = FunctionScope::new(&interner, &[a], "_");
        let compiled = {
            let mut cx = scope.context(&mut headers);
            cx.complete(
                &call,
                Lowering {
                    builtin: "dot",
                    bridge: Bridge::CControl,
                    temp: TempKind::Variable,
                    sink: Sink::WrapDouble,
                    native: NativeCall::new("linear_algebra_dot")
                        .arg(Coercion::Zval, "a")
                        .arg(Coercion::Zval, "a"),
                },
            )
        }
        .expect("zval temp accepts a wrapped double");

        assert_eq!(compiled.name, "_0");
        assert_eq!(compiled.kind, ResultKind::Variable);
        assert_eq!(scope.printer.lines(), ["ZVAL_DOUBLE(&_0, linear_algebra_dot(a, a));"]);
        assert_eq!(headers.headers(), vec!["ccontrol_bridge"]);
    }

    #[test]
    fn test_temp_kind_c_types() {
        assert_eq!(TempKind::Variable.c_type(), "zval");
        assert_eq!(TempKind::String.c_type(), "zval");
        assert_eq!(TempKind::Double.c_type(), "double");
        assert!(!TempKind::Double.is_zval());
    }

    #[test]
    fn test_bridge_headers() {
        assert_eq!(Bridge::Icu.header(), "icu_bridge");
        assert_eq!(Bridge::Snowball.header(), "snowball_bridge");
        assert_eq!(Bridge::Lapack.header(), "lapack_bridge");
        assert_eq!(Bridge::CControl.to_string(), "ccontrol_bridge");
    }
}
