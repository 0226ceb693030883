mod commands;
mod input;
mod output;
mod report;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::costs::{
    CostOfBankLoanArgs, CostOfEquityArgs, CostOfIrredeemableDebtArgs, CostOfPreferenceArgs,
    CostOfRedeemableDebtArgs,
};
use commands::report::ReportArgs;
use commands::wacc::{ComputeArgs, ForensicArgs, WeightsArgs};

/// Weighted average cost of capital calculations
#[derive(Parser)]
#[command(
    name = "wacc",
    version,
    about = "Weighted average cost of capital calculations",
    long_about = "Computes component costs of capital (equity, preference shares, \
                  redeemable and irredeemable debt, bank loans), book and market \
                  value weights, the blended WACC on each basis, and solves for a \
                  single unknown cost from a target WACC."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: costs, weights, WACC and optional forensic solve
    Compute(ComputeArgs),
    /// Cost of ordinary equity (CAPM or Dividend Growth Model)
    CostOfEquity(CostOfEquityArgs),
    /// Cost of irredeemable preference shares
    CostOfPreference(CostOfPreferenceArgs),
    /// After-tax cost of redeemable debt
    CostOfRedeemableDebt(CostOfRedeemableDebtArgs),
    /// After-tax cost of irredeemable debt
    CostOfIrredeemableDebt(CostOfIrredeemableDebtArgs),
    /// After-tax cost of bank borrowing
    CostOfBankLoan(CostOfBankLoanArgs),
    /// Normalize financing amounts into weights
    Weights(WeightsArgs),
    /// Solve for one unknown cost given a target WACC
    Forensic(ForensicArgs),
    /// Render a LaTeX WACC report (optionally compile to PDF)
    Report(ReportArgs),
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

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Compute(args) => commands::wacc::run_compute(args),
        Commands::CostOfEquity(args) => commands::costs::run_cost_of_equity(args),
        Commands::CostOfPreference(args) => commands::costs::run_cost_of_preference(args),
        Commands::CostOfRedeemableDebt(args) => commands::costs::run_cost_of_redeemable_debt(args),
        Commands::CostOfIrredeemableDebt(args) => {
            commands::costs::run_cost_of_irredeemable_debt(args)
        }
        Commands::CostOfBankLoan(args) => commands::costs::run_cost_of_bank_loan(args),
        Commands::Weights(args) => commands::wacc::run_weights(args),
        Commands::Forensic(args) => commands::wacc::run_forensic(args),
        Commands::Report(args) => commands::report::run_report(args),
        Commands::Version => {
            println!("wacc {}", env!("CARGO_PKG_VERSION"));
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
