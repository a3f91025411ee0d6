//!
//! Matrix Builtins
//!
//! Dense row-major matrices are passed to the LAPACK bridge as array zvals
//! together with their dimensions. Dimensions go through `zephir_get_intval`,
//! scalars through `zephir_get_doubleval`, flags through `zephir_get_boolval`.
//!
//! The element-wise and scalar families share one template each, so they
//! are table-driven: one value per builtin rather than one type.
//!

use super::context::{Bridge, Lowering, LoweringContext, TempKind};
use super::operands::Coercion;
use super::signature::{Param, Signature};
use super::template::{NativeCall, Sink};
use super::{CompiledExpression, LoweringError, Optimizer};
use crate::ast::CallExpression;

const MATMUL: Signature = Signature::new(&[
    Param::required("a"),
    Param::required("b"),
    Param::required("m"),
    Param::required("n"),
    Param::required("k"),
    Param::optional("transpose_a", "0"),
    Param::optional("transpose_b", "0"),
]);

const SVD: Signature = Signature::new(&[
    Param::required("x"),
    Param::required("rows"),
    Param::required("cols"),
    Param::required("jobz"),
]);

const MATRIX_PAIR: Signature = Signature::new(&[
    Param::required("a"),
    Param::required("b"),
    Param::required("rows"),
    Param::required("cols"),
]);

const MATRIX_SCALAR: Signature = Signature::new(&[
    Param::required("a"),
    Param::required("scalar"),
    Param::required("rows"),
    Param::required("cols"),
]);

fn lapack_out_param(
    builtin: &'static str,
    call: &CallExpression,
    native: NativeCall,
    cx: &mut LoweringContext<'_>,
) -> Result<CompiledExpression, LoweringError> {
    cx.complete(
        call,
        Lowering {
            builtin,
            bridge: Bridge::Lapack,
            temp: TempKind::Variable,
            sink: Sink::OutParam,
            native,
        },
    )
}

pub struct Matmul;

impl Optimizer for Matmul {
    fn name(&self) -> &'static str {
        "matmul"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["linear_algebra_matmul"]
    }

    fn signature(&self) -> &'static Signature {
        &MATMUL
    }

    fn bridge(&self) -> Bridge {
        Bridge::Lapack
    }

    fn optimize(
        &self,
        call: &CallExpression,
        cx: &mut LoweringContext<'_>,
    ) -> Result<CompiledExpression, LoweringError> {
        MATMUL.check(self.name(), call)?;
        let params = cx.resolve(&call.args)?;
        let transpose_a = MATMUL.optional(&params, 5);
        let transpose_b = MATMUL.optional(&params, 6);

        let native = NativeCall::new("linear_algebra_matmul_zval")
            .arg(Coercion::Zval, params.required(0))
            .arg(Coercion::Zval, params.required(1))
            .arg(Coercion::Int, params.required(2))
            .arg(Coercion::Int, params.required(3))
            .arg(Coercion::Int, params.required(4))
            .arg(Coercion::Bool, transpose_a.value)
            .arg(Coercion::Bool, transpose_b.value);

        lapack_out_param(self.name(), call, native, cx)
    }
}

pub struct Svd;

impl Optimizer for Svd {
    fn name(&self) -> &'static str {
        "svd"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["linear_algebra_svd"]
    }

    fn signature(&self) -> &'static Signature {
        &SVD
    }

    fn bridge(&self) -> Bridge {
        Bridge::Lapack
    }

    fn optimize(
        &self,
        call: &CallExpression,
        cx: &mut LoweringContext<'_>,
    ) -> Result<CompiledExpression, LoweringError> {
        SVD.check(self.name(), call)?;
        let params = cx.resolve(&call.args)?;

        // jobz is read by the bridge as a zval, not coerced
        let native = NativeCall::new("linear_algebra_svd_zval")
            .arg(Coercion::Zval, params.required(0))
            .arg(Coercion::Int, params.required(1))
            .arg(Coercion::Int, params.required(2))
            .arg(Coercion::Zval, params.required(3));

        lapack_out_param(self.name(), call, native, cx)
    }
}

/// `linear_algebra_<op>_zval(a, b, rows, cols, &tmp)`
#[derive(Debug, Clone, Copy)]
pub struct ElementWise {
    name: &'static str,
    function: &'static str,
    aliases: &'static [&'static str],
}

impl ElementWise {
    pub const ADD: ElementWise = ElementWise {
        name: "matrix_add",
        function: "linear_algebra_matrix_add_zval",
        aliases: &["linear_algebra_matrix_add"],
    };

    pub const SUBTRACT: ElementWise = ElementWise {
        name: "matrix_subtract",
        function: "linear_algebra_matrix_subtract_zval",
        aliases: &["linear_algebra_matrix_subtract"],
    };

    pub const HADAMARD: ElementWise = ElementWise {
        name: "matrix_hadamard",
        function: "linear_algebra_matrix_hadamard_zval",
        aliases: &["linear_algebra_matrix_hadamard"],
    };

    pub const DIVIDE: ElementWise = ElementWise {
        name: "matrix_divide",
        function: "linear_algebra_matrix_divide_zval",
        aliases: &["linear_algebra_matrix_divide"],
    };
}

impl Optimizer for ElementWise {
    fn name(&self) -> &'static str {
        self.name
    }

    fn aliases(&self) -> &'static [&'static str] {
        self.aliases
    }

    fn signature(&self) -> &'static Signature {
        &MATRIX_PAIR
    }

    fn bridge(&self) -> Bridge {
        Bridge::Lapack
    }

    fn optimize(
        &self,
        call: &CallExpression,
        cx: &mut LoweringContext<'_>,
    ) -> Result<CompiledExpression, LoweringError> {
        MATRIX_PAIR.check(self.name, call)?;
        let params = cx.resolve(&call.args)?;

        let native = NativeCall::new(self.function)
            .arg(Coercion::Zval, params.required(0))
            .arg(Coercion::Zval, params.required(1))
            .arg(Coercion::Int, params.required(2))
            .arg(Coercion::Int, params.required(3));

        lapack_out_param(self.name, call, native, cx)
    }
}

/// `linear_algebra_<op>_zval(a, (double) scalar, rows, cols, &tmp)`
#[derive(Debug, Clone, Copy)]
pub struct ScalarOp {
    name: &'static str,
    function: &'static str,
    aliases: &'static [&'static str],
}

impl ScalarOp {
    pub const DIVIDE_SCALAR: ScalarOp = ScalarOp {
        name: "matrix_divide_scalar",
        function: "linear_algebra_matrix_divide_scalar_zval",
        aliases: &["linear_algebra_matrix_divide_scalar"],
    };

    pub const SCALE: ScalarOp = ScalarOp {
        name: "matrix_scale",
        function: "linear_algebra_matrix_scale_zval",
        aliases: &["linear_algebra_matrix_scale"],
    };

    pub const ADD_SCALAR: ScalarOp = ScalarOp {
        name: "matrix_add_scalar",
        function: "linear_algebra_matrix_add_scalar_zval",
        aliases: &["linear_algebra_matrix_add_scalar"],
    };

    pub const MULTIPLY_SCALAR: ScalarOp = ScalarOp {
        name: "matrix_multiply_scalar",
        function: "linear_algebra_matrix_multiply_scalar_zval",
        aliases: &["linear_algebra_matrix_multiply_scalar"],
    };
}

impl Optimizer for ScalarOp {
    fn name(&self) -> &'static str {
        self.name
    }

    fn aliases(&self) -> &'static [&'static str] {
        self.aliases
    }

    fn signature(&self) -> &'static Signature {
        &MATRIX_SCALAR
    }

    fn bridge(&self) -> Bridge {
        Bridge::Lapack
    }

    fn optimize(
        &self,
        call: &CallExpression,
        cx: &mut LoweringContext<'_>,
    ) -> Result<CompiledExpression, LoweringError> {
        MATRIX_SCALAR.check(self.name, call)?;
        let params = cx.resolve(&call.args)?;

        let native = NativeCall::new(self.function)
            .arg(Coercion::Zval, params.required(0))
            .arg(Coercion::Double, params.required(1))
            .arg(Coercion::Int, params.required(2))
            .arg(Coercion::Int, params.required(3));

        lapack_out_param(self.name, call, native, cx)
    }
}
