//!
//! Vector Builtins
//!
//! `dot` goes through the ccontrol bridge and wraps its double into a zval.
//! The rest call the LAPACK bridge's `*_zval` entry points, which take the
//! array zvals directly and coerce their scalar arguments.
//!
//! `vector_distance` is the one builtin recorded as a raw C double. Its
//! bridge entry point still takes `zval *return_value` last like the others;
//! the destination is declared `double` and the result can only be bound
//! with `let`, never passed on to another builtin.
//!

use super::context::{Bridge, Lowering, LoweringContext, TempKind};
use super::operands::Coercion;
use super::signature::{Param, Signature};
use super::template::{NativeCall, Sink};
use super::{CompiledExpression, LoweringError, Optimizer};
use crate::ast::CallExpression;

const DOT: Signature = Signature::new(&[Param::required("a"), Param::required("b")]);

const NORM: Signature = Signature::new(&[Param::required("x"), Param::required("method")]);

const VECTOR_DISTANCE: Signature = Signature::new(&[
    Param::required("a"),
    Param::required("b"),
    Param::optional("method", "1"),
    Param::optional("p", "3.0"),
]);

/// Method 1 is the L2 norm.
const VECTOR_NORMALIZE: Signature =
    Signature::new(&[Param::required("x"), Param::optional("method", "1")]);

pub struct Dot;

impl Optimizer for Dot {
    fn name(&self) -> &'static str {
        "dot"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["ccontrol_dot"]
    }

    fn signature(&self) -> &'static Signature {
        &DOT
    }

    fn bridge(&self) -> Bridge {
        Bridge::CControl
    }

    fn optimize(
        &self,
        call: &CallExpression,
        cx: &mut LoweringContext<'_>,
    ) -> Result<CompiledExpression, LoweringError> {
        DOT.check(self.name(), call)?;
        let params = cx.resolve(&call.args)?;

        let native = NativeCall::new("linear_algebra_dot")
            .arg(Coercion::Zval, params.required(0))
            .arg(Coercion::Zval, params.required(1));

        cx.complete(
            call,
            Lowering {
                builtin: self.name(),
                bridge: Bridge::CControl,
                temp: TempKind::Variable,
                sink: Sink::WrapDouble,
                native,
            },
        )
    }
}

pub struct Norm;

impl Optimizer for Norm {
    fn name(&self) -> &'static str {
        "norm"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["linear_algebra_norm"]
    }

    fn signature(&self) -> &'static Signature {
        &NORM
    }

    fn bridge(&self) -> Bridge {
        Bridge::Lapack
    }

    fn optimize(
        &self,
        call: &CallExpression,
        cx: &mut LoweringContext<'_>,
    ) -> Result<CompiledExpression, LoweringError> {
        NORM.check(self.name(), call)?;
        let params = cx.resolve(&call.args)?;

        let native = NativeCall::new("linear_algebra_norm_zval")
            .arg(Coercion::Zval, params.required(0))
            .arg(Coercion::Int, params.required(1));

        cx.complete(
            call,
            Lowering {
                builtin: self.name(),
                bridge: Bridge::Lapack,
                temp: TempKind::Variable,
                sink: Sink::WrapDouble,
                native,
            },
        )
    }
}

pub struct VectorDistance;

impl Optimizer for VectorDistance {
    fn name(&self) -> &'static str {
        "vector_distance"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["linear_algebra_vector_distance"]
    }

    fn signature(&self) -> &'static Signature {
        &VECTOR_DISTANCE
    }

    fn bridge(&self) -> Bridge {
        Bridge::Lapack
    }

    fn temp_kind(&self) -> TempKind {
        TempKind::Double
    }

    fn optimize(
        &self,
        call: &CallExpression,
        cx: &mut LoweringContext<'_>,
    ) -> Result<CompiledExpression, LoweringError> {
        VECTOR_DISTANCE.check(self.name(), call)?;
        let params = cx.resolve(&call.args)?;
        let method = VECTOR_DISTANCE.optional(&params, 2);
        let p = VECTOR_DISTANCE.optional(&params, 3);

        let native = NativeCall::new("linear_algebra_vector_distance_zval")
            .arg(Coercion::Zval, params.required(0))
            .arg(Coercion::Zval, params.required(1))
            .arg(Coercion::Int, method.value)
            .arg(Coercion::Double, p.value);

        cx.complete(
            call,
            Lowering {
                builtin: self.name(),
                bridge: Bridge::Lapack,
                temp: TempKind::Double,
                sink: Sink::OutParam,
                native,
            },
        )
    }
}

pub struct VectorNormalize;

impl Optimizer for VectorNormalize {
    fn name(&self) -> &'static str {
        "vector_normalize"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["linear_algebra_vector_normalize"]
    }

    fn signature(&self) -> &'static Signature {
        &VECTOR_NORMALIZE
    }

    fn bridge(&self) -> Bridge {
        Bridge::Lapack
    }

    fn optimize(
        &self,
        call: &CallExpression,
        cx: &mut LoweringContext<'_>,
    ) -> Result<CompiledExpression, LoweringError> {
        VECTOR_NORMALIZE.check(self.name(), call)?;
        let params = cx.resolve(&call.args)?;
        let method = VECTOR_NORMALIZE.optional(&params, 1);

        let native = NativeCall::new("linear_algebra_vector_normalize_zval")
            .arg(Coercion::Zval, params.required(0))
            .arg(Coercion::Int, method.value);

        cx.complete(
            call,
            Lowering {
                builtin: self.name(),
                bridge: Bridge::Lapack,
                temp: TempKind::Variable,
                sink: Sink::OutParam,
                native,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lowering::testing::lower_with;
    use crate::lowering::ResultKind;

    #[test]
    fn test_dot_wraps_double() {
        let outcome = lower_with(&Dot, "dot(a, b)");
        assert_eq!(outcome.statement(), "ZVAL_DOUBLE(&_0, linear_algebra_dot(a, b));");

        let compiled = outcome.result.as_ref().expect("lowers");
        assert_eq!(compiled.kind, ResultKind::Variable);
        assert_eq!(compiled.kind.to_string(), "variable");
        assert_eq!(outcome.headers.headers(), vec!["ccontrol_bridge"]);
    }

    #[test]
    fn test_norm_coerces_method() {
        let outcome = lower_with(&Norm, "norm(x, method)");
        assert_eq!(
            outcome.statement(),
            "ZVAL_DOUBLE(&_0, linear_algebra_norm_zval(x, zephir_get_intval(method)));"
        );
        assert!(outcome.headers.contains(Bridge::Lapack));
    }

    #[test]
    fn test_vector_distance_defaults() {
        let outcome = lower_with(&VectorDistance, "vector_distance(a, b)");
        assert_eq!(
            outcome.statement(),
            "linear_algebra_vector_distance_zval(a, b, zephir_get_intval(1), zephir_get_doubleval(3.0), &_0);"
        );

        let compiled = outcome.result.as_ref().expect("lowers");
        assert_eq!(compiled.kind, ResultKind::Double);
        assert_eq!(outcome.temps[0].kind, TempKind::Double);
    }

    #[test]
    fn test_vector_distance_explicit_values() {
        let outcome = lower_with(&VectorDistance, "vector_distance(a, b, method, p)");
        assert_eq!(
            outcome.statement(),
            "linear_algebra_vector_distance_zval(a, b, zephir_get_intval(method), zephir_get_doubleval(p), &_0);"
        );
    }

    #[test]
    fn test_vector_distance_partial_defaults() {
        let outcome = lower_with(&VectorDistance, "vector_distance(a, b, method)");
        assert_eq!(
            outcome.statement(),
            "linear_algebra_vector_distance_zval(a, b, zephir_get_intval(method), zephir_get_doubleval(3.0), &_0);"
        );
    }

    #[test]
    fn test_vector_distance_one_parameter() {
        let outcome = lower_with(&VectorDistance, "vector_distance(a)");
        let err = outcome.result.as_ref().unwrap_err();
        assert_eq!(
            err.to_string(),
            "'vector_distance' requires between 2 and 4 parameters (a, b, [method], [p]), found 1"
        );
        outcome.assert_untouched();
    }

    #[test]
    fn test_vector_normalize_method() {
        let outcome = lower_with(&VectorNormalize, "vector_normalize(x)");
        assert_eq!(
            outcome.statement(),
            "linear_algebra_vector_normalize_zval(x, zephir_get_intval(1), &_0);"
        );

        let outcome = lower_with(&VectorNormalize, "vector_normalize(x, method)");
        assert_eq!(
            outcome.statement(),
            "linear_algebra_vector_normalize_zval(x, zephir_get_intval(method), &_0);"
        );
    }
}
