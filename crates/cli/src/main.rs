mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use platon_core::config::DEFAULT_MAX_INHERITANCE_DEPTH;
use tracing_subscriber::EnvFilter;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// PL exercise file toolchain.
#[derive(Parser)]
#[command(name = "platon", version, about = "PL exercise file toolchain")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Log parser activity to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a file and print the resulting document as JSON
    Parse(ParseArgs),

    /// Parse a file and report whether it is valid
    Check(ParseArgs),

    /// List the registered file extensions
    Extensions,
}

/// Options shared by every command that parses a file.
#[derive(Args, Debug, Clone)]
pub(crate) struct ParseArgs {
    /// Path to the file to parse
    pub file: PathBuf,
    /// Repository id attached to every resolved path
    #[arg(long, default_value_t = 0)]
    pub resource_id: i64,
    /// Namespace (circle) id passed to the resolver
    #[arg(long, default_value_t = 0)]
    pub circle_id: i64,
    /// Longest allowed extends chain, root included
    #[arg(long, default_value_t = DEFAULT_MAX_INHERITANCE_DEPTH)]
    pub max_depth: usize,
    /// Skip the mandatory top-level key check (for files meant to be extended)
    #[arg(long)]
    pub no_mandatory_keys: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Parse(args) => commands::parse::cmd_parse(&args, cli.output, cli.quiet),
        Commands::Check(args) => commands::check::cmd_check(&args, cli.output, cli.quiet),
        Commands::Extensions => commands::extensions::cmd_extensions(cli.output),
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
