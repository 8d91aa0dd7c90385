mod commands;
mod input;
mod output;
mod store;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::generate::{GenerateFacilitiesArgs, GenerateFinancialsArgs};
use commands::pipeline::RunArgs;
use commands::process::ProcessArgs;
use commands::rate::RateArgs;
use commands::report::ReportArgs;

/// Loan book reconciliation and credit-risk dashboard
#[derive(Parser)]
#[command(
    name = "loanbook",
    version,
    about = "Loan book reconciliation and credit-risk dashboard",
    long_about = "Simulates a corporate loan book, reconciles messy client financial \
                  submissions against known column aliases, computes coverage, leverage, \
                  internal ratings and expected credit loss, and builds the executive \
                  dashboard dataset."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format for the stage summary
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Portfolio configuration file (YAML or JSON)
    #[arg(long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the synthetic facility book
    GenerateFacilities(GenerateFacilitiesArgs),
    /// Generate messy per-client financial submissions
    GenerateFinancials(GenerateFinancialsArgs),
    /// Reconcile submissions and compute credit metrics
    Process(ProcessArgs),
    /// Build the executive dashboard dataset
    Report(ReportArgs),
    /// Run every stage end to end
    Run(RunArgs),
    /// Score a single client
    Rate(RateArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let config = match input::file::read_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::GenerateFacilities(args) => commands::generate::run_generate_facilities(args),
        Commands::GenerateFinancials(args) => {
            commands::generate::run_generate_financials(args, &config)
        }
        Commands::Process(args) => commands::process::run_process(args, &config),
        Commands::Report(args) => commands::report::run_report(args, &config),
        Commands::Run(args) => commands::pipeline::run_pipeline(args, &config),
        Commands::Rate(args) => commands::rate::run_rate(args, &config),
        Commands::Version => {
            println!("loanbook {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
