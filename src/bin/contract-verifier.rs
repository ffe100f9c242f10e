//! Contract Verifier CLI
//!
//! Command-line interface for verifying consumer mocks against a provider schema.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use contract_verifier::{
    read_results, render, summary, to_json, write_results, ReportError, ReportFormat,
    ValidationResult, Validator, VerifyOptions,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "contract-verifier")]
#[command(about = "Verify consumer contract mocks against a provider schema")]
#[command(version)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check every mock of a provider against its schema
    Verify {
        /// Provider schema: file path or URL (http:// or https://)
        #[arg(long)]
        schema: String,

        /// Directory containing consumer mock files (*.json, searched recursively)
        #[arg(long)]
        mocks: PathBuf,

        /// Provider name (default: the schema file's parent directory name)
        #[arg(long)]
        provider: Option<String>,

        /// Provider base URL, recorded for reference only
        #[arg(long)]
        url: Option<String>,

        /// Write the validation result as JSON to this file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print the validation result as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Render a stored validation result
    Report {
        /// Results file written by `verify --output`
        #[arg(long)]
        results: PathBuf,

        /// Output format: text (default) or json
        #[arg(long, default_value = "text")]
        format: String,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Verify {
            schema,
            mocks,
            provider,
            url,
            output,
            json,
        } => {
            let mut options = VerifyOptions::new(schema, mocks);
            if let Some(provider) = provider {
                options = options.provider(provider);
            }
            if let Some(url) = url {
                options = options.provider_url(url);
            }
            run_verify(options, output.as_deref(), json)
        }

        Commands::Report {
            results,
            format,
            output,
        } => run_report(&results, &format, output.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

/// Log to stderr so stdout stays clean for summaries and JSON.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_verify(options: VerifyOptions, output: Option<&Path>, json_output: bool) -> Result<(), u8> {
    let result = Validator::new(options).run().map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    if let Some(path) = output {
        write_results(&result, path).map_err(|e| report_failure(&e))?;
    }

    if json_output {
        let json = to_json(&result).map_err(|e| report_failure(&e))?;
        println!("{}", json);
    } else {
        print!("{}", summary(&result));
    }

    verdict(&result)
}

fn run_report(results: &Path, format: &str, output: Option<&Path>) -> Result<(), u8> {
    let format = ReportFormat::parse(format).ok_or_else(|| {
        report_failure(&ReportError::UnsupportedFormat {
            format: format.to_string(),
        })
    })?;

    let result = read_results(results).map_err(|e| report_failure(&e))?;
    let rendered = render(&result, format).map_err(|e| report_failure(&e))?;

    match output {
        Some(path) => {
            std::fs::write(path, &rendered).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

fn verdict(result: &ValidationResult) -> Result<(), u8> {
    if result.overall_success() {
        Ok(())
    } else {
        Err(1)
    }
}

fn report_failure(err: &ReportError) -> u8 {
    eprintln!("Error: {}", err);
    err.exit_code() as u8
}
