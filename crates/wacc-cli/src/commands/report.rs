use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

use wacc_core::pipeline;
use wacc_core::with_metadata;

use crate::commands::wacc::{build_wacc_input, company_name_override, BasisArg};
use crate::report::{self, ReportOptions};

/// Arguments for report generation
#[derive(Args)]
pub struct ReportArgs {
    /// Path to JSON/YAML input file with the full instrument set
    #[arg(long)]
    pub input: Option<String>,

    /// Company name shown in the report title
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

    /// Target WACC for the forensic solve
    #[arg(long, allow_hyphen_values = true)]
    pub target_wacc: Option<Decimal>,

    /// Output `.tex` path
    #[arg(long, default_value = "wacc_report.tex")]
    pub out: PathBuf,

    /// Bibliography (.bib) to cite; enables biber during compilation
    #[arg(long)]
    pub bibliography: Option<PathBuf>,

    /// Compile to PDF with pdflatex (falls back to .tex on failure)
    #[arg(long)]
    pub compile: bool,
}

pub fn run_report(args: ReportArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();

    let wacc_input = build_wacc_input(
        args.input.as_deref(),
        company_name_override(args.company_name, args.company_file.as_deref())?,
        args.missing.as_deref(),
        args.basis,
        args.target_wacc,
    )?;
    let computed = pipeline::compute_wacc(&wacc_input)?;
    let mut warnings = computed.warnings.clone();

    let bibliography = match args.bibliography {
        Some(ref bib) => Some(
            fs::canonicalize(bib)
                .map_err(|e| format!("Bibliography '{}': {}", bib.display(), e))?,
        ),
        None => None,
    };
    let options = ReportOptions {
        bibliography: bibliography.as_ref().map(|p| p.display().to_string()),
    };

    let tex = report::render(&computed.result, &options)?;
    fs::write(&args.out, tex)
        .map_err(|e| format!("Failed to write '{}': {}", args.out.display(), e))?;
    info!(path = %args.out.display(), "report written");

    let report_path = if args.compile {
        compile_or_fallback(&args.out, bibliography.is_some(), &mut warnings)
    } else {
        args.out.clone()
    };

    let format = match report_path.extension().and_then(|e| e.to_str()) {
        Some("pdf") => "pdf",
        _ => "tex",
    };

    let output = json!({
        "report_path": report_path.display().to_string(),
        "format": format,
        "wacc_book": computed.result.wacc_book,
        "wacc_market": computed.result.wacc_market,
    });

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(serde_json::to_value(with_metadata(
        "LaTeX WACC report",
        &wacc_input,
        warnings,
        elapsed,
        output,
    ))?)
}

fn compile_or_fallback(tex_path: &Path, run_biber: bool, warnings: &mut Vec<String>) -> PathBuf {
    match report::compile_pdf(tex_path, run_biber) {
        Ok(pdf) => pdf,
        Err(e) => {
            warn!(error = %e, "PDF compilation failed; keeping .tex");
            warnings.push(format!("PDF compilation failed: {e}"));
            tex_path.to_path_buf()
        }
    }
}
