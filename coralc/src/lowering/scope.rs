//!
//! Function Scope - Concrete Collaborators
//!
//! The driver builds one FunctionScope per function being compiled. It owns
//! the resolver bindings, the temporary allocator and the code printer for
//! that function; the HeaderSet lives one level up and is shared by every
//! function of a compilation unit.
//!
//! Bindings resolve:
//! - function parameters to their `zval *` name
//! - let-bound zval results to `&tmp`
//! - nested calls, already lowered by the driver, by their span
//! - literals, once the driver copied them into a read-only zval, by span
//!
//! Every operand handed to a bridge is a `zval *`. A raw double result has
//! no zval behind it, so naming one as a parameter is an error rather than
//! a bare `tmp` in a pointer position.
//!

use std::collections::{HashMap, HashSet};

use indexmap::IndexSet;
use lasso::{Rodeo, Spur};

use super::context::{
    Allocator, Bridge, DependencyTracker, Emitter, LoweringContext, Resolver, TempKind, TempSymbol,
};
use super::error::LoweringError;
use super::operands::{Operands, ResolvedOperand};
use super::{CompiledExpression, ResultKind};
use crate::ast::{Expression, Ident, Literal, LiteralExpr};
use crate::source::{Span, Spanned};

#[derive(Debug, Clone)]
enum Bound {
    Zval(ResolvedOperand),
    /// A raw C double; `origin` names it in diagnostics
    RawDouble { origin: String },
}

pub struct Bindings<'a> {
    interner: &'a Rodeo,
    names: HashMap<Spur, Bound>,
    /// Nested call results and materialized literals
    spans: HashMap<Span, Bound>,
}

impl<'a> Bindings<'a> {
    pub fn new(interner: &'a Rodeo) -> Self {
        Self {
            interner,
            names: HashMap::new(),
            spans: HashMap::new(),
        }
    }

    pub fn bind_param(&mut self, param: &Ident) {
        let name = self.interner.resolve(&param.symbol);
        self.names.insert(param.symbol, Bound::Zval(ResolvedOperand::new(name)));
    }

    /// Binds a let name to a lowered result. Rebinding shadows.
    pub fn bind_name(&mut self, name: Spur, compiled: &CompiledExpression) {
        let origin = self.interner.resolve(&name);
        self.names.insert(name, bound_result(compiled, origin));
    }

    /// Makes a nested call's result available to the call that contains it.
    pub fn bind_call(&mut self, span: Span, compiled: &CompiledExpression) {
        self.spans.insert(span, bound_result(compiled, compiled.builtin));
    }

    /// Points a literal at the zval temp holding its value.
    pub fn bind_literal(&mut self, span: Span, temp: &TempSymbol) {
        self.spans
            .insert(span, Bound::Zval(ResolvedOperand::new(format!("&{}", temp.name))));
    }

    fn resolve_one(&self, expr: &Expression) -> Result<ResolvedOperand, LoweringError> {
        let (bound, name) = match expr {
            Expression::Identifier(id) => (
                self.names.get(&id.ident.symbol),
                self.interner.resolve(&id.ident.symbol).to_string(),
            ),
            Expression::Literal(lit) => (
                self.spans.get(&lit.span),
                literal_text(self.interner, lit.value),
            ),
            Expression::Call(call) => (
                self.spans.get(&call.span),
                self.interner.resolve(&call.callee.symbol).to_string(),
            ),
        };

        match bound {
            Some(Bound::Zval(operand)) => Ok(operand.clone()),
            Some(Bound::RawDouble { origin }) => Err(LoweringError::RawDoubleOperand {
                name: origin.clone(),
                span: expr.span(),
            }),
            None => Err(LoweringError::UnresolvedName {
                name,
                span: expr.span(),
            }),
        }
    }
}

impl Resolver for Bindings<'_> {
    fn resolve(&self, args: &[Expression]) -> Result<Operands, LoweringError> {
        args.iter().map(|arg| self.resolve_one(arg)).collect()
    }
}

fn bound_result(compiled: &CompiledExpression, origin: &str) -> Bound {
    match compiled.kind {
        ResultKind::Variable => Bound::Zval(ResolvedOperand::new(format!("&{}", compiled.name))),
        ResultKind::Double => Bound::RawDouble {
            origin: origin.to_string(),
        },
    }
}

/// C text of a literal value: integers and floats verbatim, booleans as
/// `1`/`0`, strings as escaped C string literals.
fn literal_text(interner: &Rodeo, value: Literal) -> String {
    match value {
        Literal::Int(v) => v.to_string(),
        Literal::Float(v) => format!("{:?}", v),
        Literal::Bool(v) => (if v { "1" } else { "0" }).to_string(),
        Literal::String(s) => c_string_literal(interner.resolve(&s)),
    }
}

fn zval_initializer(value: Literal) -> &'static str {
    match value {
        Literal::Int(_) => "ZVAL_LONG",
        Literal::Float(_) => "ZVAL_DOUBLE",
        Literal::Bool(_) => "ZVAL_BOOL",
        Literal::String(_) => "ZVAL_STRING",
    }
}

fn c_string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

pub struct TempAllocator {
    prefix: String,
    next: usize,
    reserved: HashSet<String>,
    temps: Vec<TempSymbol>,
}

impl TempAllocator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
            reserved: HashSet::new(),
            temps: Vec::new(),
        }
    }

    /// Keeps a C name (such as a parameter) out of the temp namespace.
    pub fn reserve(&mut self, name: impl Into<String>) {
        self.reserved.insert(name.into());
    }

    pub fn temps(&self) -> &[TempSymbol] {
        &self.temps
    }

    pub fn into_temps(self) -> Vec<TempSymbol> {
        self.temps
    }
}

impl Allocator for TempAllocator {
    fn allocate_temp(&mut self, kind: TempKind) -> TempSymbol {
        let name = loop {
            let candidate = format!("{}{}", self.prefix, self.next);
            self.next += 1;
            if !self.reserved.contains(&candidate) {
                break candidate;
            }
        };

        let symbol = TempSymbol { name, kind };
        self.temps.push(symbol.clone());
        symbol
    }
}

#[derive(Debug, Default)]
pub struct CodePrinter {
    lines: Vec<String>,
}

impl CodePrinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

impl Emitter for CodePrinter {
    fn emit(&mut self, statement: String) {
        tracing::trace!(%statement, "emit");
        self.lines.push(statement);
    }
}

/// Bridge headers required by a compilation unit, in first-use order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HeaderSet {
    bridges: IndexSet<Bridge>,
}

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bridges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bridges.is_empty()
    }

    pub fn contains(&self, bridge: Bridge) -> bool {
        self.bridges.contains(&bridge)
    }

    pub fn iter(&self) -> impl Iterator<Item = Bridge> + '_ {
        self.bridges.iter().copied()
    }

    pub fn headers(&self) -> Vec<String> {
        self.iter().map(|b| b.header().to_string()).collect()
    }
}

impl DependencyTracker for HeaderSet {
    fn require(&mut self, bridge: Bridge) -> bool {
        let added = self.bridges.insert(bridge);
        if added {
            tracing::debug!(header = bridge.header(), "bridge required");
        }
        added
    }
}

pub struct FunctionScope<'a> {
    pub bindings: Bindings<'a>,
    pub temps: TempAllocator,
    pub printer: CodePrinter,
}

impl<'a> FunctionScope<'a> {
    pub fn new(interner: &'a Rodeo, params: &[Ident], temp_prefix: &str) -> Self {
        let mut bindings = Bindings::new(interner);
        let mut temps = TempAllocator::new(temp_prefix);

        for param in params {
            bindings.bind_param(param);
            temps.reserve(interner.resolve(&param.symbol));
        }

        Self {
            bindings,
            temps,
            printer: CodePrinter::new(),
        }
    }

    /// Copies a literal parameter into a fresh read-only zval and binds the
    /// literal to it, so the bridge receives a `zval *` like any other
    /// operand.
    pub fn materialize_literal(&mut self, literal: &LiteralExpr) {
        let temp = self.temps.allocate_temp(TempKind::Variable);
        let value = literal_text(self.bindings.interner, literal.value);
        self.printer.emit(format!(
            "{}(&{}, {});",
            zval_initializer(literal.value),
            temp.name,
            value
        ));
        self.bindings.bind_literal(literal.span, &temp);
    }

    pub fn context<'s>(&'s mut self, dependencies: &'s mut dyn DependencyTracker) -> LoweringContext<'s> {
        LoweringContext::new(&self.bindings, &mut self.temps, &mut self.printer, dependencies)
    }
}
