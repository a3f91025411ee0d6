//!
//! Builtin Signatures and Arity Validation
//!
//! A signature is the ordered parameter list of a builtin. Required
//! parameters come first; optional ones trail and carry the literal used
//! when the call leaves them out.
//!

use std::fmt;

use super::error::LoweringError;
use super::operands::{Operands, Optional};
use crate::ast::CallExpression;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    pub name: &'static str,
    pub default: Option<&'static str>,
}

impl Param {
    pub const fn required(name: &'static str) -> Self {
        Self { name, default: None }
    }

    pub const fn optional(name: &'static str, default: &'static str) -> Self {
        Self {
            name,
            default: Some(default),
        }
    }

    pub fn is_optional(&self) -> bool {
        self.default.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    Between(usize, usize),
}

impl Arity {
    pub fn min(self) -> usize {
        match self {
            Arity::Exact(n) | Arity::Between(n, _) => n,
        }
    }

    pub fn max(self) -> usize {
        match self {
            Arity::Exact(n) | Arity::Between(_, n) => n,
        }
    }

    pub fn accepts(self, count: usize) -> bool {
        count >= self.min() && count <= self.max()
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(1) => write!(f, "exactly 1 parameter"),
            Arity::Exact(n) => write!(f, "exactly {} parameters", n),
            Arity::Between(min, max) => write!(f, "between {} and {} parameters", min, max),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub params: &'static [Param],
}

impl Signature {
    pub const fn new(params: &'static [Param]) -> Self {
        Self { params }
    }

    pub fn arity(&self) -> Arity {
        let required = self.params.iter().filter(|p| !p.is_optional()).count();
        if required == self.params.len() {
            Arity::Exact(required)
        } else {
            Arity::Between(required, self.params.len())
        }
    }

    /// `(a, b, m, n, k, [transpose_a], [transpose_b])`
    pub fn shape(&self) -> String {
        let params: Vec<String> = self
            .params
            .iter()
            .map(|p| {
                if p.is_optional() {
                    format!("[{}]", p.name)
                } else {
                    p.name.to_string()
                }
            })
            .collect();
        format!("({})", params.join(", "))
    }

    pub fn check(&self, builtin: &str, call: &CallExpression) -> Result<(), LoweringError> {
        let arity = self.arity();
        if arity.accepts(call.arg_count()) {
            return Ok(());
        }

        Err(LoweringError::Arity {
            builtin: builtin.to_string(),
            arity,
            shape: self.shape(),
            found: call.arg_count(),
            span: call.span,
        })
    }

    /// The operand at `index`, substituting the parameter's declared default.
    pub fn optional<'a>(&self, operands: &'a Operands, index: usize) -> Optional<'a> {
        let default = self.params[index].default.unwrap_or_default();
        operands.optional(index, default)
    }

    pub fn is_well_formed(&self) -> bool {
        let first_optional = self.params.iter().position(Param::is_optional);
        match first_optional {
            Some(i) => self.params[i..].iter().all(Param::is_optional),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lowering::operands::ResolvedOperand;

    const MATMUL_LIKE: Signature = Signature::new(&[
        Param::required("a"),
        Param::required("b"),
        Param::optional("flag", "0"),
    ]);

    #[test]
    fn test_arity_from_params() {
        assert_eq!(MATMUL_LIKE.arity(), Arity::Between(2, 3));
        assert_eq!(
            Signature::new(const { &[Param::required("x")] }).arity(),
            Arity::Exact(1)
        );
        assert!(MATMUL_LIKE.is_well_formed());
        assert!(!Signature::new(const { &[Param::optional("a", "0"), Param::required("b")] }).is_well_formed());
    }

    #[test]
    fn test_shape_and_display() {
        assert_eq!(MATMUL_LIKE.shape(), "(a, b, [flag])");
        assert_eq!(Arity::Exact(1).to_string(), "exactly 1 parameter");
        assert_eq!(Arity::Exact(4).to_string(), "exactly 4 parameters");
        assert_eq!(Arity::Between(2, 4).to_string(), "between 2 and 4 parameters");
    }

    #[test]
    fn test_optional_uses_declared_default() {
        let ops: Operands = ["x", "y"].into_iter().map(ResolvedOperand::new).collect();
        assert_eq!(MATMUL_LIKE.optional(&ops, 2).value, "0");
        assert!(!MATMUL_LIKE.optional(&ops, 2).present);
    }
}
