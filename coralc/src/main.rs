///
/// coralc CLI - The coral builtin lowering command-line interface
///
/// - coralc lower <path>: Lower a file or directory to C (or JSON)
/// - coralc check <path>: Lower and report diagnostics only
/// - coralc builtins: List the builtins the registry knows
///

use std::fs;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use thiserror::Error;
use tracing::Level;

use coralc::codegen::{self, collect_sources, CodegenError};
use coralc::config::ConfigError;
use coralc::{compile_file, BuiltinRegistry, Config, DiagnosticReporter, Emit};

#[derive(Parser)]
#[command(name = "coralc")]
#[command(author, version, about = "Lower coral builtin calls to C", long_about = None)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lower a .coral file, or every .coral file under a directory
    Lower {
        path: PathBuf,

        /// Configuration file (defaults to coralc.toml next to the input)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "c")]
        emit: EmitFormat,

        /// Output file, or output directory when lowering a directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Lower and report diagnostics without writing output
    Check {
        path: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List the available builtins
    Builtins {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum EmitFormat {
    C,
    Json,
}

impl EmitFormat {
    fn emit(self) -> Emit {
        match self {
            EmitFormat::C => Emit::C,
            EmitFormat::Json => Emit::Json,
        }
    }
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Codegen(#[from] CodegenError),

    #[error("{} does not exist", .0.display())]
    Missing(PathBuf),
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let result = match cli.command {
        Commands::Lower {
            path,
            config,
            emit,
            output,
        } => lower(&path, config.as_deref(), emit, output.as_deref()),
        Commands::Check { path, config } => check(&path, config.as_deref()),
        Commands::Builtins { config } => list_builtins(config.as_deref()).map(|()| true),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}

fn load_config(explicit: Option<&Path>, input: &Path) -> Result<Config, ConfigError> {
    match explicit {
        Some(path) => Config::load(path),
        None => Config::discover(input),
    }
}

fn sources(path: &Path) -> Result<Vec<PathBuf>, CliError> {
    if !path.exists() {
        return Err(CliError::Missing(path.to_path_buf()));
    }
    Ok(collect_sources(path)?)
}

/// Returns false when any diagnostic was reported.
fn lower(
    path: &Path,
    config: Option<&Path>,
    format: EmitFormat,
    output: Option<&Path>,
) -> Result<bool, CliError> {
    let config = load_config(config, path)?;
    let registry = config.registry()?;
    let inputs = sources(path)?;
    let to_directory = path.is_dir() && output.is_some();
    let mut clean = true;

    if let (true, Some(dir)) = (to_directory, output) {
        fs::create_dir_all(dir).map_err(|source| CodegenError::Write {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    for input in &inputs {
        let (source, unit) = compile_file(input, &registry, &config.codegen)?;
        if unit.has_errors() {
            DiagnosticReporter::new(&source).report_all(&unit.errors);
            clean = false;
            continue;
        }

        let rendered = codegen::render(&unit, format.emit(), &config.codegen)?;
        let target = match output {
            Some(dir) if to_directory => {
                let target = codegen::output_path(path, input, dir, format.emit());
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent).map_err(|source| CodegenError::Write {
                        path: parent.to_path_buf(),
                        source,
                    })?;
                }
                Some(target)
            }
            other => other.map(Path::to_path_buf),
        };

        match target {
            Some(target) => fs::write(&target, rendered).map_err(|source| CodegenError::Write {
                path: target.clone(),
                source,
            })?,
            None => print!("{}", rendered),
        }
    }

    Ok(clean)
}

fn check(path: &Path, config: Option<&Path>) -> Result<bool, CliError> {
    let config = load_config(config, path)?;
    let registry = config.registry()?;
    let inputs = sources(path)?;
    let mut failed = 0;

    for input in &inputs {
        let (source, unit) = compile_file(input, &registry, &config.codegen)?;
        if unit.has_errors() {
            DiagnosticReporter::new(&source).report_all(&unit.errors);
            failed += 1;
        }
    }

    println!("Checked {} files, {} with errors", inputs.len(), failed);
    Ok(failed == 0)
}

fn list_builtins(config: Option<&Path>) -> Result<(), CliError> {
    let config = match config {
        Some(path) => Config::load(path)?,
        None => Config::discover(Path::new("."))?,
    };
    let registry = config.registry()?;

    for optimizer in registry.iter() {
        let names = registry.names_of(optimizer);
        let aliases = names.get(1..).unwrap_or_default().join(", ");
        let signature = format!("{}{}", optimizer.name(), optimizer.signature().shape());
        println!(
            "{:<56} {:<16} {:<8} {}",
            signature,
            optimizer.bridge().header(),
            optimizer.result_kind().as_str(),
            aliases
        );
    }

    Ok(())
}
