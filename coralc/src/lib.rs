///
/// coralc - The coral Builtin Lowering Compiler
///
/// Lowers calls to builtin functions (text processing, stemming, linear
/// algebra) straight into C statements that call native bridge libraries.
///
/// - source: Source files and spans
/// - lexer: Tokenization of coral source code
/// - ast: Abstract syntax tree definitions
/// - parser: Parsing tokens into AST
/// - lowering: Builtin optimizers, their collaborators and the registry
/// - codegen: Per-unit driver and C rendering
/// - config: coralc.toml loading
/// - diagnostic: miette error reporting
///
/// Entry points:
/// - `tokenize`: Convert source text into tokens
/// - `parse`: Parse tokens into AST
/// - `compile_source`: Lower a whole source file
/// - `render_unit`: Render a lowered unit as C
///

pub mod ast;
pub mod codegen;
pub mod config;
pub mod diagnostic;
pub mod lexer;
pub mod lowering;
pub mod parser;
pub mod source;

pub use codegen::c::render_unit;
pub use codegen::{compile_file, compile_program, compile_source, CompileError, Emit, UnitOutput};
pub use config::Config;
pub use diagnostic::DiagnosticReporter;
pub use lexer::tokenize;
pub use lowering::{BuiltinRegistry, CompiledExpression, LoweringError, Optimizer};
pub use parser::parse;
pub use source::SourceFile;
