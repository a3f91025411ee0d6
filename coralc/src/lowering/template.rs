//!
//! Native Statement Templates
//!
//! A NativeCall is a bridge function name plus its already-coerced
//! arguments. The Sink decides how the result reaches the destination
//! temporary:
//!
//! - OutParam:   `bridge(args..., &dest);`
//! - WrapDouble: `ZVAL_DOUBLE(&dest, bridge(args...));`
//! - WrapString: `ZVAL_STR(&dest, bridge(args...));`
//!

use std::fmt;

use smallvec::SmallVec;

use super::context::{TempKind, TempSymbol};
use super::operands::Coercion;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sink {
    OutParam,
    WrapDouble,
    WrapString,
}

impl Sink {
    /// The ZVAL_* macros only write into zval temporaries.
    pub fn accepts(self, kind: TempKind) -> bool {
        match self {
            Sink::OutParam => true,
            Sink::WrapDouble | Sink::WrapString => kind.is_zval(),
        }
    }

    pub fn render(self, call: &NativeCall, dest: &TempSymbol) -> String {
        match self {
            Sink::OutParam => {
                let mut args = call.args.join(", ");
                if !args.is_empty() {
                    args.push_str(", ");
                }
                format!("{}({}&{});", call.function, args, dest.name)
            }
            Sink::WrapDouble => format!("ZVAL_DOUBLE(&{}, {});", dest.name, call.expression()),
            Sink::WrapString => format!("ZVAL_STR(&{}, {});", dest.name, call.expression()),
        }
    }
}

impl fmt::Display for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Sink::OutParam => "an out-parameter call",
            Sink::WrapDouble => "ZVAL_DOUBLE",
            Sink::WrapString => "ZVAL_STR",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeCall {
    pub function: &'static str,
    pub args: SmallVec<[String; 8]>,
}

impl NativeCall {
    pub fn new(function: &'static str) -> Self {
        Self {
            function,
            args: SmallVec::new(),
        }
    }

    pub fn arg(mut self, coercion: Coercion, operand: &str) -> Self {
        self.args.push(coercion.apply(operand));
        self
    }

    /// `function(args...)` without a trailing semicolon.
    pub fn expression(&self) -> String {
        format!("{}({})", self.function, self.args.join(", "))
    }
}
