//!
//! Resolved Operands and Coercions
//!
//! A ResolvedOperand is the C text naming a parameter's value. It is
//! read-only: optimizers can only wrap it in a coercion, never assign to
//! it. Trailing optional parameters come back as Optional pairs so the
//! default substitution lives in one place.
//!

use smallvec::SmallVec;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedOperand(String);

impl ResolvedOperand {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Resolved parameters of one call, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Operands(SmallVec<[ResolvedOperand; 8]>);

impl Operands {
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    pub fn push(&mut self, operand: ResolvedOperand) {
        self.0.push(operand);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Operand at a position the signature guarantees is present.
    ///
    /// Only called after arity validation, so an out-of-range index is a
    /// bug in the optimizer's signature and panics.
    pub fn required(&self, index: usize) -> &str {
        self.0[index].as_str()
    }

    /// Operand at a trailing position, or the default when the call omitted it.
    pub fn optional<'a>(&'a self, index: usize, default: &'a str) -> Optional<'a> {
        match self.0.get(index) {
            Some(operand) => Optional {
                value: operand.as_str(),
                present: true,
            },
            None => Optional {
                value: default,
                present: false,
            },
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedOperand> {
        self.0.iter()
    }
}

impl FromIterator<ResolvedOperand> for Operands {
    fn from_iter<T: IntoIterator<Item = ResolvedOperand>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Optional<'a> {
    pub value: &'a str,
    pub present: bool,
}

/// How a parameter is handed to the bridge function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Pass the `zval *` through untouched
    Zval,
    Int,
    Double,
    Bool,
    /// `zend_string *` of a string zval
    ZendString,
    /// `char *` of a string zval
    CString,
}

impl Coercion {
    pub fn apply(self, operand: &str) -> String {
        match self {
            Coercion::Zval => operand.to_string(),
            Coercion::Int => format!("zephir_get_intval({})", operand),
            Coercion::Double => format!("zephir_get_doubleval({})", operand),
            Coercion::Bool => format!("zephir_get_boolval({})", operand),
            Coercion::ZendString => format!("Z_STR_P({})", operand),
            Coercion::CString => format!("Z_STRVAL_P({})", operand),
        }
    }
}
