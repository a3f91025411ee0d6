//!
//! Diagnostic Module - Rich Error Reporting
//!
//! Reports parse and lowering errors with source context using miette.
//! Each diagnostic shows the line and column, a labeled snippet of the
//! offending call and, where there is one, a hint on how to fix it.
//!
//! Usage:
//!   let reporter = DiagnosticReporter::new(&source_file);
//!   reporter.report_all(&unit.errors);
//!

use miette::{Diagnostic, LabeledSpan, NamedSource, Report, SourceSpan};
use thiserror::Error;

use crate::codegen::CompileError;
use crate::lowering::LoweringError;
use crate::parser::ParseError;
use crate::source::{SourceFile, Span, Spanned};

#[derive(Debug, Error)]
#[error("{message}")]
pub struct CoralDiagnostic {
    message: String,
    src: NamedSource<String>,
    span: SourceSpan,
    label: String,
    help_text: Option<String>,
}

impl Diagnostic for CoralDiagnostic {
    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        Some(Box::new(std::iter::once(LabeledSpan::new_primary_with_span(
            Some(self.label.clone()),
            self.span,
        ))))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.help_text
            .as_ref()
            .map(|h| Box::new(h.clone()) as Box<dyn std::fmt::Display>)
    }
}

impl CoralDiagnostic {
    pub fn from_parse_error(err: &ParseError, source: &SourceFile) -> Self {
        let (line, col) = source.line_col(err.span.start);

        Self {
            message: format!("parse error at {}:{}", line, col),
            src: named_source(source),
            span: source_span(err.span),
            label: err.message.clone(),
            help_text: None,
        }
    }

    pub fn from_lowering_error(err: &LoweringError, function: &str, source: &SourceFile) -> Self {
        let span = err.span();
        let (line, col) = source.line_col(span.start);
        let (label, help) = lowering_error_details(err);

        Self {
            message: format!("{} in '{}' at {}:{}", err, function, line, col),
            src: named_source(source),
            span: source_span(span),
            label,
            help_text: help,
        }
    }

    pub fn from_compile_error(err: &CompileError, source: &SourceFile) -> Self {
        match err {
            CompileError::Parse(err) => Self::from_parse_error(err, source),
            CompileError::Lowering { function, error } => {
                Self::from_lowering_error(error, function, source)
            }
        }
    }
}

fn named_source(source: &SourceFile) -> NamedSource<String> {
    NamedSource::new(&source.name, source.source.clone())
}

fn source_span(span: Span) -> SourceSpan {
    (span.start as usize, span.len() as usize).into()
}

fn lowering_error_details(err: &LoweringError) -> (String, Option<String>) {
    match err {
        LoweringError::Arity { found, shape, .. } => (
            format!("called with {} parameter{}", found, if *found == 1 { "" } else { "s" }),
            Some(format!("expected parameters: {}", shape)),
        ),
        LoweringError::UnsupportedDestinationKind { .. } => (
            "template mismatch".to_string(),
            Some("this is a compiler bug, please report it".to_string()),
        ),
        LoweringError::UnknownBuiltin { .. } => (
            "not a builtin".to_string(),
            Some("run `coralc builtins` to list the available builtins".to_string()),
        ),
        LoweringError::UnresolvedName { .. } => (
            "unknown name".to_string(),
            Some("use a parameter or a name bound earlier with `let`".to_string()),
        ),
        LoweringError::RawDoubleOperand { .. } => (
            "raw double, not a zval".to_string(),
            Some("bind the result with `let` and use it outside builtin calls".to_string()),
        ),
    }
}

pub struct DiagnosticReporter<'a> {
    source: &'a SourceFile,
}

impl<'a> DiagnosticReporter<'a> {
    pub fn new(source: &'a SourceFile) -> Self {
        Self { source }
    }

    pub fn report(&self, err: &CompileError) {
        let diag = CoralDiagnostic::from_compile_error(err, self.source);
        let report = Report::new(diag);
        eprintln!("{:?}", report);
    }

    pub fn report_all(&self, errors: &[CompileError]) {
        for err in errors {
            self.report(err);
        }
    }
}
