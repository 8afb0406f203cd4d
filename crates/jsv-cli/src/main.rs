//! # jsv CLI entry point
//!
//! Parses command-line arguments, installs the tracing subscriber, and
//! dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use jsv_cli::validate::{run_validate, ValidateArgs};

/// Exit code for setup and operational errors.
const EXIT_ERROR: u8 = 2;

/// JSON-Lines validator.
///
/// Checks every line of one or more JSON-Lines files against a JSON Schema
/// and reports each decode failure and constraint violation by line.
#[derive(Parser, Debug)]
#[command(name = "jsv", version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log format written to stderr.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate JSON-Lines files against a JSON Schema.
    Validate(ValidateArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn init_tracing(verbose: u8, format: LogFormat) {
    // RUST_LOG applies only when no -v flag was given.
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_format);

    tracing::debug!("jsv v{} starting", env!("CARGO_PKG_VERSION"));

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args, std::io::stdout().lock()),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsv_cli::output::OutputFormat;

    #[test]
    fn parses_validate_with_several_files() {
        let cli = Cli::try_parse_from([
            "jsv", "-vv", "validate", "--schema", "s.json", "--format", "json", "a.jsonl",
            "b.jsonl",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.log_format, LogFormat::Text);
        let Commands::Validate(args) = cli.command;
        assert_eq!(args.schema.to_str(), Some("s.json"));
        assert_eq!(args.data.len(), 2);
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn data_file_is_required() {
        assert!(Cli::try_parse_from(["jsv", "validate", "--schema", "s.json"]).is_err());
    }

    #[test]
    fn unknown_draft_is_rejected() {
        let result = Cli::try_parse_from([
            "jsv", "validate", "--schema", "s.json", "--draft", "99", "a.jsonl",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
