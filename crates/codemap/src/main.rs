//! Codemap CLI - Dependency graphs and change impact from the command line.
//!
//! Codemap turns symbol and call facts into a persisted code map and answers
//! caller, callee, cycle and impact queries against it.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{DiagramFormat, GraphLevel, ImpactFormat};

/// Codemap: symbol dependency graph and change impact analysis.
#[derive(Parser)]
#[command(name = "codemap")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Workspace root directory (defaults to current directory)
    #[arg(short, long, global = true)]
    workspace: Option<PathBuf>,

    /// Configuration file (defaults to .codemap/config.yaml in the workspace)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the code map from a JSON fact file
    Analyze {
        /// Fact file produced by a source analyzer
        facts: PathBuf,

        /// Source root recorded in the code map
        #[arg(long)]
        source_root: Option<String>,

        /// Output path (defaults to <output_dir>/CODE_MAP.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Analyze the impact of changing one or more symbols
    Impact {
        /// Qualified symbol names (e.g., "auth.validate_user")
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Maximum depth for transitive analysis
        #[arg(short, long)]
        depth: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = ImpactFormat::Text)]
        format: ImpactFormat,
    },

    /// Show symbols that call a symbol
    Callers {
        /// Qualified symbol name
        symbol: String,

        /// Maximum traversal depth (unbounded if omitted)
        #[arg(short, long)]
        depth: Option<usize>,
    },

    /// Show symbols called by a symbol
    Callees {
        /// Qualified symbol name
        symbol: String,

        /// Maximum traversal depth (unbounded if omitted)
        #[arg(short, long)]
        depth: Option<usize>,
    },

    /// Detect circular dependencies
    Cycles {
        /// Stop after enumerating this many cycles
        #[arg(long, default_value_t = codemap::graph::MAX_CYCLES)]
        limit: usize,
    },

    /// Search for symbols by glob pattern (e.g., "auth.*")
    Search {
        /// Shell-style pattern over qualified names
        pattern: String,
    },

    /// Render the dependency graph as a diagram
    Graph {
        /// Level of detail
        #[arg(short, long, value_enum, default_value_t = GraphLevel::Module)]
        level: GraphLevel,

        /// Module to focus on (required for function level)
        #[arg(short, long)]
        module: Option<String>,

        /// Diagram format
        #[arg(short, long, value_enum, default_value_t = DiagramFormat::Mermaid)]
        format: DiagramFormat,

        /// Write the diagram to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a code map file
    Validate {
        /// Code map to validate (defaults to the workspace code map)
        file: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Determine workspace root
    let workspace = match cli.workspace {
        Some(w) => w,
        None => match std::env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                eprintln!(
                    "{}: failed to get current directory: {e}",
                    "error".red().bold()
                );
                return ExitCode::FAILURE;
            }
        },
    };

    let workspace = match codemap::Workspace::open(&workspace, cli.config.as_deref()) {
        Ok(workspace) => workspace,
        Err(e) => return report(&e),
    };

    // Run the appropriate command
    let result = match cli.command {
        Commands::Analyze {
            facts,
            source_root,
            output,
        } => cli::analyze::run(&workspace, &facts, source_root.as_deref(), output.as_deref()),
        Commands::Impact {
            symbols,
            depth,
            format,
        } => cli::impact::run(&workspace, &symbols, depth, format),
        Commands::Callers { symbol, depth } => {
            cli::callers::run_callers(&workspace, &symbol, depth)
        }
        Commands::Callees { symbol, depth } => {
            cli::callers::run_callees(&workspace, &symbol, depth)
        }
        Commands::Cycles { limit } => cli::cycles::run(&workspace, limit),
        Commands::Search { pattern } => cli::search::run(&workspace, &pattern),
        Commands::Graph {
            level,
            module,
            format,
            output,
        } => cli::graph::run(&workspace, level, module.as_deref(), format, output.as_deref()),
        Commands::Validate { file } => cli::validate::run(&workspace, file.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e),
    }
}

fn report(e: &codemap::Error) -> ExitCode {
    eprintln!("{}: {e}", "error".red().bold());
    // Show cause chain for nested errors
    let mut source = std::error::Error::source(e);
    while let Some(cause) = source {
        eprintln!("  {}: {cause}", "caused by".dimmed());
        source = std::error::Error::source(cause);
    }
    ExitCode::FAILURE
}
