use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::time::Instant;
use tracing::warn;

use wacc_core::aggregate::calculate_wacc;
use wacc_core::forensic::{solve_missing_cost, ForensicQuery};
use wacc_core::pipeline::{self, WaccInput};
use wacc_core::weighting::calculate_weights;
use wacc_core::{with_metadata, Basis, Instrument};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BasisArg {
    Book,
    Market,
}

impl From<BasisArg> for Basis {
    fn from(b: BasisArg) -> Self {
        match b {
            BasisArg::Book => Basis::Book,
            BasisArg::Market => Basis::Market,
        }
    }
}

/// Arguments for the full WACC pipeline
#[derive(Args)]
pub struct ComputeArgs {
    /// Path to JSON/YAML input file with the full instrument set
    #[arg(long)]
    pub input: Option<String>,

    /// Company name for display (overrides the input file)
    #[arg(long)]
    pub company_name: Option<String>,

    /// CSV or JSON file with a `Company` field to take the name from
    #[arg(long, conflicts_with = "company_name")]
    pub company_file: Option<String>,

    /// Instrument whose cost is unknown (name or index 0-4)
    #[arg(long)]
    pub missing: Option<String>,

    /// Weighting basis for the forensic solve
    #[arg(long, value_enum)]
    pub basis: Option<BasisArg>,

    /// Target WACC for the forensic solve (e.g. 0.09 for 9%)
    #[arg(long, allow_hyphen_values = true)]
    pub target_wacc: Option<Decimal>,
}

/// Arguments for the weighting function
#[derive(Args)]
pub struct WeightsArgs {
    /// Financing amounts in instrument order, comma-separated
    #[arg(long, value_delimiter = ',', required = true)]
    pub amounts: Vec<Decimal>,
}

/// Arguments for a standalone forensic solve
#[derive(Args)]
pub struct ForensicArgs {
    /// Five costs in instrument order; the missing slot's value is ignored
    #[arg(long, value_delimiter = ',', required = true, allow_hyphen_values = true)]
    pub costs: Vec<Decimal>,

    /// Five weights in instrument order
    #[arg(long, value_delimiter = ',', required = true)]
    pub weights: Vec<Decimal>,

    /// Instrument whose cost is unknown (name or index 0-4)
    #[arg(long)]
    pub missing: String,

    /// Target WACC
    #[arg(long, allow_hyphen_values = true)]
    pub target_wacc: Decimal,

    /// Basis the supplied weights were derived from
    #[arg(long, value_enum, default_value = "market")]
    pub basis: BasisArg,
}

/// Company name from `--company-name`, else from `--company-file`.
pub fn company_name_override(
    company_name: Option<String>,
    company_file: Option<&str>,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    match (company_name, company_file) {
        (Some(name), _) => Ok(Some(name)),
        (None, Some(path)) => {
            let name = input::company::read_company_name(path)?;
            if name.is_none() {
                warn!(path, "no Company field found; keeping the input's company name");
            }
            Ok(name)
        }
        (None, None) => Ok(None),
    }
}

/// Load the pipeline input and apply flag overrides.
pub fn build_wacc_input(
    path: Option<&str>,
    company_name: Option<String>,
    missing: Option<&str>,
    basis: Option<BasisArg>,
    target_wacc: Option<Decimal>,
) -> Result<WaccInput, Box<dyn std::error::Error>> {
    let mut wacc_input: WaccInput = input::load(path)?
        .ok_or("--input <file.json> or stdin required")?;

    if company_name.is_some() {
        wacc_input.company_name = company_name;
    }

    match (missing, target_wacc) {
        (Some(m), Some(target)) => {
            wacc_input.forensic = Some(ForensicQuery {
                missing: m.parse::<Instrument>()?,
                basis: basis.map(Basis::from).unwrap_or_default(),
                target_wacc: target,
            });
        }
        (None, None) => {
            if let (Some(b), Some(query)) = (basis, wacc_input.forensic.as_mut()) {
                query.basis = b.into();
            }
        }
        _ => return Err("--missing and --target-wacc must be given together".into()),
    }

    Ok(wacc_input)
}

pub fn run_compute(args: ComputeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let wacc_input = build_wacc_input(
        args.input.as_deref(),
        company_name_override(args.company_name, args.company_file.as_deref())?,
        args.missing.as_deref(),
        args.basis,
        args.target_wacc,
    )?;
    let result = pipeline::compute_wacc(&wacc_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_weights(args: WeightsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    if let Some(neg) = args.amounts.iter().find(|a| **a < Decimal::ZERO) {
        return Err(format!("Financing amounts cannot be negative, got {neg}").into());
    }
    if args.amounts.len() != Instrument::ALL.len() {
        warnings.push(format!(
            "Expected {} amounts (one per instrument), got {}",
            Instrument::ALL.len(),
            args.amounts.len()
        ));
    }

    let weights = calculate_weights(&args.amounts)?;
    // Summing cannot overflow once the weights have been computed.
    let total: Decimal = args.amounts.iter().sum();
    if total.is_zero() {
        warnings.push("All amounts are zero; weights set to zero".to_string());
    }

    let output = json!({
        "total": total,
        "weights": weights,
    });
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(serde_json::to_value(with_metadata(
        "Proportional financing weights",
        &json!({ "amounts": args.amounts }),
        warnings,
        elapsed,
        output,
    ))?)
}

pub fn run_forensic(args: ForensicArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let missing: Instrument = args.missing.parse()?;

    let basis = Basis::from(args.basis);
    let result = solve_missing_cost(
        &args.costs,
        &args.weights,
        args.target_wacc,
        missing.index(),
        basis,
    )?;

    let mut warnings = Vec::new();
    if result.solved_cost().is_none() {
        warnings.push(format!("Cannot solve for {missing}: zero weight on {basis} basis"));
    }
    // Echo the blended WACC the supplied costs would give, for comparison.
    let implied = calculate_wacc(&args.costs, &args.weights)?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(serde_json::to_value(with_metadata(
        "Forensic single-unknown solve",
        &json!({
            "costs": args.costs,
            "weights": args.weights,
            "missing": missing,
            "basis": basis,
            "target_wacc": args.target_wacc,
            "wacc_from_supplied_costs": implied,
        }),
        warnings,
        elapsed,
        result,
    ))?)
}
