use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use std::fmt::{self, Write};

use wacc_core::forensic::ForensicResult;
use wacc_core::pipeline::{CostOutcome, WaccOutput};
use wacc_core::{Basis, Instrument, InstrumentMap, Money, Rate};

const DEFAULT_COMPANY: &str = "Unknown Company";

#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// `.bib` file to cite; enables biblatex in the preamble
    pub bibliography: Option<String>,
}

/// Render the full report document.
pub fn render(output: &WaccOutput, options: &ReportOptions) -> Result<String, fmt::Error> {
    let mut doc = String::new();
    let company = escape_latex(output.company_name.as_deref().unwrap_or(DEFAULT_COMPANY));

    writeln!(doc, r"\documentclass[11pt,a4paper]{{article}}")?;
    writeln!(doc, r"\usepackage[T1]{{fontenc}}")?;
    writeln!(doc, r"\usepackage{{booktabs}}")?;
    if let Some(ref bib) = options.bibliography {
        writeln!(doc, r"\usepackage[style=authoryear,backend=biber]{{biblatex}}")?;
        writeln!(doc, r"\addbibresource{{{bib}}}")?;
    }
    writeln!(doc, r"\title{{Weighted Average Cost of Capital: {company}}}")?;
    writeln!(doc, r"\date{{\today}}")?;
    writeln!(doc, r"\begin{{document}}")?;
    writeln!(doc, r"\maketitle")?;
    writeln!(doc)?;

    writeln!(doc, r"\section{{Component costs}}")?;
    writeln!(
        doc,
        r"Corporate tax rate: {}. The cost of equity is estimated with the {}.",
        pct(output.tax_rate, 0),
        escape_latex(&output.equity_method)
    )?;
    writeln!(doc)?;
    writeln!(doc, r"\begin{{tabular}}{{lr}}")?;
    writeln!(doc, r"\toprule")?;
    writeln!(doc, r"Source & Cost \\")?;
    writeln!(doc, r"\midrule")?;
    for (instrument, outcome) in output.costs.iter() {
        writeln!(doc, r"{} & {} \\", instrument.label(), cost_cell(outcome))?;
    }
    writeln!(doc, r"\bottomrule")?;
    writeln!(doc, r"\end{{tabular}}")?;
    writeln!(doc)?;

    for basis in [Basis::Book, Basis::Market] {
        write_basis_section(&mut doc, output, basis)?;
    }

    if let Some(ref forensic) = output.forensic {
        writeln!(doc, r"\section{{Forensic analysis}}")?;
        let basis = forensic.result.basis();
        let target = pct(forensic.query.target_wacc, 2);
        match &forensic.result {
            ForensicResult::Solved {
                instrument,
                solved_cost,
                ..
            } => writeln!(
                doc,
                r"For a target WACC of {target} on the {basis} value basis, the implied cost of {} is {}.",
                instrument.label().to_lowercase(),
                pct(*solved_cost, 2)
            )?,
            ForensicResult::ZeroWeightUnsolvable { instrument, .. } => writeln!(
                doc,
                r"The cost of {} cannot be solved for a target WACC of {target}: it carries no weight on the {basis} value basis.",
                instrument.label().to_lowercase()
            )?,
            ForensicResult::KnownCostsUnavailable {
                instrument,
                unavailable,
                ..
            } => writeln!(
                doc,
                r"The cost of {} cannot be solved: no cost is available for {}.",
                instrument.label().to_lowercase(),
                unavailable
                    .iter()
                    .map(|i| i.label().to_lowercase())
                    .collect::<Vec<_>>()
                    .join(", ")
            )?,
        }
        writeln!(doc)?;
    }

    if options.bibliography.is_some() {
        writeln!(doc, r"\nocite{{*}}")?;
        writeln!(doc, r"\printbibliography")?;
    }
    writeln!(doc, r"\end{{document}}")?;
    Ok(doc)
}

fn write_basis_section(doc: &mut String, output: &WaccOutput, basis: Basis) -> fmt::Result {
    let (title, weights, amounts, total): (_, &InstrumentMap<Rate>, &InstrumentMap<Money>, Money) =
        match basis {
            Basis::Book => (
                "Book value weighting",
                &output.weights_book,
                &output.book_values,
                output.total_book_value,
            ),
            Basis::Market => (
                "Market value weighting",
                &output.weights_market,
                &output.market_values,
                output.total_market_value,
            ),
        };

    writeln!(doc, r"\section{{{title}}}")?;
    writeln!(doc, r"\begin{{tabular}}{{lrrrr}}")?;
    writeln!(doc, r"\toprule")?;
    writeln!(doc, r"Source & Amount & Weight & Cost & Weighted cost \\")?;
    writeln!(doc, r"\midrule")?;
    for instrument in Instrument::ALL {
        let weight = weights[instrument];
        let weighted = output.costs[instrument]
            .cost()
            .map(|c| pct(c * weight, 2))
            .unwrap_or_else(|| "n/a".into());
        writeln!(
            doc,
            r"{} & {} & {} & {} & {} \\",
            instrument.label(),
            thousands(amounts[instrument]),
            fixed(weight, 4),
            cost_cell(&output.costs[instrument]),
            weighted
        )?;
    }
    writeln!(doc, r"\midrule")?;
    let wacc = output
        .wacc(basis)
        .map(|w| pct(w, 2))
        .unwrap_or_else(|| "n/a".into());
    let weight_total: Rate = weights.iter().map(|(_, w)| *w).sum();
    writeln!(
        doc,
        r"Total & {} & {} & & {wacc} \\",
        thousands(total),
        fixed(weight_total, 4)
    )?;
    writeln!(doc, r"\bottomrule")?;
    writeln!(doc, r"\end{{tabular}}")?;
    writeln!(doc)?;
    writeln!(doc, r"WACC on a {basis} value basis: \textbf{{{wacc}}}.")?;
    writeln!(doc)
}

fn cost_cell(outcome: &CostOutcome) -> String {
    match outcome {
        CostOutcome::Computed { cost } => pct(*cost, 2),
        CostOutcome::Failed { .. } => "n/a".into(),
    }
}

fn fixed(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.prec$}", prec = dp as usize)
}

/// Rate as a LaTeX percentage, e.g. `0.0605` -> `6.05\%`.
pub fn pct(rate: Rate, dp: u32) -> String {
    match rate.checked_mul(dec!(100)) {
        Some(percent) => format!(r"{}\%", fixed(percent, dp)),
        None => "n/a".into(),
    }
}

/// Whole units with thousands separators, e.g. `39010` -> `39,010`.
pub fn thousands(amount: Money) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = rounded.abs().trunc().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < Decimal::ZERO {
        format!("-{grouped}")
    } else {
        grouped
    }
}

pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str(r"\textbackslash{}"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(ch);
            }
            '~' => out.push_str(r"\textasciitilde{}"),
            '^' => out.push_str(r"\textasciicircum{}"),
            _ => out.push(ch),
        }
    }
    out
}
