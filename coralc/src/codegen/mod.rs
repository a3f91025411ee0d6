///
/// Code Generation Module
///
/// Drives the lowering of a whole coral source into C. Every function gets
/// its own FunctionScope; the bridge headers are collected per unit.
///
/// Pipeline:
/// 1. Tokenize and parse the source, keeping every parse error
/// 2. Lower each function's calls in program order, nested calls first and
///    literal parameters copied into read-only zvals
/// 3. Merge the function's headers into the unit once it compiled cleanly
/// 4. Render the unit as C (see c.rs) or as JSON for build tooling
///
/// A lowering failure aborts only the function it occurred in. Its partial
/// statements, temporaries and headers are dropped and the driver moves on,
/// so one run reports every broken function.
///

pub mod c;

use std::fs;
use std::path::{Path, PathBuf};

use lasso::Rodeo;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;
use walkdir::WalkDir;

use crate::ast::{CallExpression, Expression, FunctionItem, Program, Statement};
use crate::config::CodegenConfig;
use crate::lexer::tokenize;
use crate::lowering::{
    Bridge, BuiltinRegistry, CompiledExpression, DependencyTracker, FunctionScope, HeaderSet,
    LoweringError, TempSymbol,
};
use crate::parser::{parse, ParseError};
use crate::source::{SourceFile, Span, Spanned};

pub const SOURCE_EXTENSION: &str = "coral";

#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Emit {
    #[default]
    C,
    Json,
}

impl Emit {
    pub fn extension(self) -> &'static str {
        match self {
            Emit::C => "c",
            Emit::Json => "json",
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum CompileError {
    #[error("{}", .0.message)]
    Parse(ParseError),

    #[error("{error}")]
    Lowering {
        function: String,
        error: LoweringError,
    },
}

impl CompileError {
    pub fn function(&self) -> Option<&str> {
        match self {
            CompileError::Parse(_) => None,
            CompileError::Lowering { function, .. } => Some(function),
        }
    }
}

impl Spanned for CompileError {
    fn span(&self) -> Span {
        match self {
            CompileError::Parse(err) => err.span,
            CompileError::Lowering { error, .. } => error.span(),
        }
    }
}

impl Serialize for CompileError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let span = self.span();
        let mut state = serializer.serialize_struct("CompileError", 4)?;
        state.serialize_field("function", &self.function())?;
        state.serialize_field("message", &self.to_string())?;
        state.serialize_field("start", &span.start)?;
        state.serialize_field("end", &span.end)?;
        state.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionOutput {
    /// Name as written in the source
    pub name: String,
    /// Prefixed C symbol
    pub symbol: String,
    pub params: Vec<String>,
    pub temps: Vec<TempSymbol>,
    pub statements: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitOutput {
    pub file: String,
    pub headers: Vec<Bridge>,
    pub functions: Vec<FunctionOutput>,
    pub errors: Vec<CompileError>,
}

impl UnitOutput {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn function(&self, name: &str) -> Option<&FunctionOutput> {
        self.functions.iter().find(|f| f.name == name)
    }
}

pub fn compile_file(
    path: &Path,
    registry: &BuiltinRegistry,
    config: &CodegenConfig,
) -> Result<(SourceFile, UnitOutput), CodegenError> {
    let content = fs::read_to_string(path).map_err(|source| CodegenError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let source = SourceFile::new(path.display().to_string(), content);
    let unit = compile_source(&source, registry, config);
    Ok((source, unit))
}

pub fn compile_source(
    source: &SourceFile,
    registry: &BuiltinRegistry,
    config: &CodegenConfig,
) -> UnitOutput {
    let (tokens, interner) = tokenize(&source.source);
    let parsed = parse(&tokens, &source.source);

    let mut unit = compile_program(&parsed.ast, &interner, registry, config);
    unit.file = source.name.clone();

    let mut errors: Vec<CompileError> = parsed.errors.into_iter().map(CompileError::Parse).collect();
    errors.append(&mut unit.errors);
    unit.errors = errors;
    unit
}

pub fn compile_program(
    program: &Program,
    interner: &Rodeo,
    registry: &BuiltinRegistry,
    config: &CodegenConfig,
) -> UnitOutput {
    let mut headers = HeaderSet::new();
    let mut functions = Vec::with_capacity(program.items.len());
    let mut errors = Vec::new();

    tracing::info!(functions = program.items.len(), "lowering unit");

    for func in program.functions() {
        let name = interner.resolve(&func.name.symbol);
        let mut function_headers = HeaderSet::new();

        match compile_function(func, interner, registry, config, &mut function_headers) {
            Ok(output) => {
                for bridge in function_headers.iter() {
                    headers.require(bridge);
                }
                functions.push(output);
            }
            Err(error) => {
                tracing::debug!(function = name, %error, "function aborted");
                errors.push(CompileError::Lowering {
                    function: name.to_string(),
                    error,
                });
            }
        }
    }

    UnitOutput {
        file: String::new(),
        headers: headers.iter().collect(),
        functions,
        errors,
    }
}

fn compile_function(
    func: &FunctionItem,
    interner: &Rodeo,
    registry: &BuiltinRegistry,
    config: &CodegenConfig,
    headers: &mut HeaderSet,
) -> Result<FunctionOutput, LoweringError> {
    let name = interner.resolve(&func.name.symbol);
    let mut scope = FunctionScope::new(interner, &func.params, &config.temp_prefix);

    for stmt in &func.body {
        let compiled = lower_call(stmt.call(), interner, registry, &mut scope, headers)?;
        if let Statement::Let(let_stmt) = stmt {
            scope.bindings.bind_name(let_stmt.name.symbol, &compiled);
        }
    }

    Ok(FunctionOutput {
        name: name.to_string(),
        symbol: format!("{}{}", config.function_prefix, name),
        params: func
            .params
            .iter()
            .map(|p| interner.resolve(&p.symbol).to_string())
            .collect(),
        temps: scope.temps.into_temps(),
        statements: scope.printer.into_lines(),
    })
}

/// Prepares the parameters in order, then lowers the call. Nested calls are
/// lowered and literals materialized, each bound by span for the resolver.
fn lower_call(
    call: &CallExpression,
    interner: &Rodeo,
    registry: &BuiltinRegistry,
    scope: &mut FunctionScope<'_>,
    headers: &mut HeaderSet,
) -> Result<CompiledExpression, LoweringError> {
    for arg in &call.args {
        match arg {
            Expression::Call(inner) => {
                let compiled = lower_call(inner, interner, registry, scope, headers)?;
                scope.bindings.bind_call(inner.span, &compiled);
            }
            Expression::Literal(literal) => scope.materialize_literal(literal),
            Expression::Identifier(_) => {}
        }
    }

    let mut cx = scope.context(headers);
    registry.lower(call, interner, &mut cx)
}

pub fn render(unit: &UnitOutput, emit: Emit, config: &CodegenConfig) -> Result<String, CodegenError> {
    match emit {
        Emit::C => Ok(c::render_unit(unit, config)),
        Emit::Json => Ok(serde_json::to_string_pretty(unit)?),
    }
}

/// `path` itself when it is a file, otherwise every `.coral` file below it,
/// sorted by path.
pub fn collect_sources(path: &Path) -> Result<Vec<PathBuf>, CodegenError> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut sources = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.map_err(|source| CodegenError::Walk {
            path: path.to_path_buf(),
            source,
        })?;
        let is_source = entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == SOURCE_EXTENSION);
        if is_source {
            sources.push(entry.into_path());
        }
    }
    Ok(sources)
}

/// Output file for `input`, a source found below `root`, inside `out_dir`.
/// The directory structure below `root` is mirrored, so sources with the
/// same name in different directories get different outputs.
pub fn output_path(root: &Path, input: &Path, out_dir: &Path, emit: Emit) -> PathBuf {
    let relative = input
        .strip_prefix(root)
        .unwrap_or_else(|_| input.file_name().map(Path::new).unwrap_or(input));
    out_dir.join(relative).with_extension(emit.extension())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(source: &str) -> UnitOutput {
        let file = SourceFile::new("test.coral", source);
        compile_source(&file, &BuiltinRegistry::with_defaults(), &CodegenConfig::default())
    }

    #[test]
    fn test_let_binding_feeds_later_call() {
        let unit = compile(
            "fn f(a, b) {
                let n = vector_normalize(a);
                let d = vector_distance(n, b);
                norm(n, 2);
            }",
        );
        assert!(!unit.has_errors(), "{:?}", unit.errors);

        let f = unit.function("f").expect("compiled");
        assert_eq!(f.symbol, "coral_f");
        assert_eq!(
            f.statements,
            vec![
                "linear_algebra_vector_normalize_zval(a, zephir_get_intval(1), &_0);",
                "linear_algebra_vector_distance_zval(&_0, b, zephir_get_intval(1), zephir_get_doubleval(3.0), &_1);",
                "ZVAL_LONG(&_2, 2);",
                "ZVAL_DOUBLE(&_3, linear_algebra_norm_zval(&_0, zephir_get_intval(&_2)));",
            ]
        );
        assert_eq!(unit.headers, vec![Bridge::Lapack]);
    }

    #[test]
    fn test_literal_parameters_are_passed_as_zvals() {
        let unit = compile(
            "fn f(text) {
                lowercase(text, \"en\");
                dot(1, 2.5);
                matmul(text, text, 2, 2, 2, true);
            }",
        );
        assert!(!unit.has_errors(), "{:?}", unit.errors);

        let f = unit.function("f").expect("compiled");
        assert_eq!(
            f.statements,
            vec![
                "ZVAL_STRING(&_0, \"en\");",
                "icu_lowercase(Z_STR_P(text), Z_STRVAL_P(&_0), &_1);",
                "ZVAL_LONG(&_2, 1);",
                "ZVAL_DOUBLE(&_3, 2.5);",
                "ZVAL_DOUBLE(&_4, linear_algebra_dot(&_2, &_3));",
                "ZVAL_LONG(&_5, 2);",
                "ZVAL_LONG(&_6, 2);",
                "ZVAL_LONG(&_7, 2);",
                "ZVAL_BOOL(&_8, 1);",
                "linear_algebra_matmul_zval(text, text, zephir_get_intval(&_5), zephir_get_intval(&_6), \
                 zephir_get_intval(&_7), zephir_get_boolval(&_8), zephir_get_boolval(0), &_9);",
            ]
        );
    }

    #[test]
    fn test_raw_double_results_are_not_operands() {
        let unit = compile(
            "fn kept(a, b) { let d = vector_distance(a, b); }
             fn named(a, b) { let d = vector_distance(a, b); dot(d, b); }
             fn nested(a, b) { norm(a, vector_distance(a, b)); }",
        );

        assert!(unit.function("kept").is_some());
        assert_eq!(unit.errors.len(), 2);
        assert_eq!(unit.errors[0].function(), Some("named"));
        assert_eq!(
            unit.errors[0].to_string(),
            "'d' is a raw double and cannot be passed to a builtin"
        );
        assert_eq!(unit.errors[1].function(), Some("nested"));
        assert_eq!(
            unit.errors[1].to_string(),
            "'vector_distance' is a raw double and cannot be passed to a builtin"
        );
        assert!(unit.function("named").is_none());
        assert!(unit.function("nested").is_none());
    }

    #[test]
    fn test_nested_calls_lowered_first() {
        let unit = compile("fn f(a, b) { dot(vector_normalize(a), b); }");
        let f = unit.function("f").expect("compiled");
        assert_eq!(
            f.statements,
            vec![
                "linear_algebra_vector_normalize_zval(a, zephir_get_intval(1), &_0);",
                "ZVAL_DOUBLE(&_1, linear_algebra_dot(&_0, b));",
            ]
        );
        assert_eq!(unit.headers, vec![Bridge::Lapack, Bridge::CControl]);
    }

    #[test]
    fn test_failed_function_is_dropped_whole() {
        let unit = compile(
            "fn bad(text) { lowercase(text, \"en\"); stem(text); }
             fn good(a, b) { dot(a, b); }",
        );

        assert_eq!(unit.errors.len(), 1);
        assert_eq!(unit.errors[0].function(), Some("bad"));
        assert!(unit.function("bad").is_none());
        assert!(unit.function("good").is_some());
        // icu_bridge was only needed by the aborted function
        assert_eq!(unit.headers, vec![Bridge::CControl]);
    }

    #[test]
    fn test_unknown_and_unresolved() {
        let unit = compile("fn f(a) { transpose(a); } fn g(a) { dot(a, c); }");
        assert_eq!(unit.errors.len(), 2);
        assert_eq!(unit.errors[0].to_string(), "unknown builtin 'transpose'");
        assert_eq!(unit.errors[1].to_string(), "cannot resolve 'c' in this function");
    }

    #[test]
    fn test_parse_errors_come_first() {
        let unit = compile("fn broken( { } fn f(a) { nope(a); }");
        assert!(matches!(unit.errors[0], CompileError::Parse(_)));
        assert!(matches!(unit.errors.last(), Some(CompileError::Lowering { .. })));
    }

    #[test]
    fn test_temp_names_avoid_params() {
        let unit = compile("fn f(_0, b) { dot(_0, b); }");
        let f = unit.function("f").expect("compiled");
        assert_eq!(f.temps[0].name, "_1");
        assert_eq!(f.statements, vec!["ZVAL_DOUBLE(&_1, linear_algebra_dot(_0, b));"]);
    }

    #[test]
    fn test_json_output() {
        let unit = compile("fn f(word) { stem(word, \"english\"); }");
        let json = render(&unit, Emit::Json, &CodegenConfig::default()).expect("serializes");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");

        assert_eq!(value["headers"][0], "snowball_bridge");
        assert_eq!(value["functions"][0]["symbol"], "coral_f");
        assert_eq!(value["functions"][0]["temps"][0]["kind"], "variable");
        assert_eq!(value["functions"][0]["temps"][1]["kind"], "string");
        assert_eq!(value["errors"].as_array().map(|e| e.len()), Some(0));
    }

    #[test]
    fn test_output_path_mirrors_source_tree() {
        let root = Path::new("src");
        let out = Path::new("out");

        assert_eq!(
            output_path(root, Path::new("src/a/x.coral"), out, Emit::C),
            Path::new("out/a/x.c")
        );
        assert_eq!(
            output_path(root, Path::new("src/b/x.coral"), out, Emit::Json),
            Path::new("out/b/x.json")
        );
        assert_eq!(
            output_path(root, Path::new("src/top.coral"), out, Emit::C),
            Path::new("out/top.c")
        );
    }

    #[test]
    fn test_collect_sources() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir(dir.path().join("nested")).expect("mkdir");
        fs::write(dir.path().join("b.coral"), "").expect("write");
        fs::write(dir.path().join("a.coral"), "").expect("write");
        fs::write(dir.path().join("nested").join("c.coral"), "").expect("write");
        fs::write(dir.path().join("notes.txt"), "").expect("write");

        let sources = collect_sources(dir.path()).expect("walks");
        let names: Vec<_> = sources
            .iter()
            .map(|p| p.file_name().and_then(|n| n.to_str()).unwrap_or_default().to_string())
            .collect();
        assert_eq!(names, vec!["a.coral", "b.coral", "c.coral"]);
    }
}
