//! End-to-end WACC computation.
//!
//! One call takes the full input record, prices every instrument
//! independently, derives book and market weights, aggregates a WACC per
//! basis and, if a forensic query is attached, solves for the missing cost.
//! A failed instrument does not stop the others from being reported; the
//! WACCs are only aggregated when all five costs are available.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::aggregate::wacc_for;
use crate::cost_of_capital::InstrumentInput;
use crate::error::WaccError;
use crate::forensic::{solve_forensic, ForensicQuery, ForensicResult};
use crate::instruments::{Instrument, InstrumentMap};
use crate::types::{with_metadata, Basis, ComputationOutput, Money, Rate};
use crate::validation::{self, ValidationIssue};
use crate::weighting::{total_amount, weights_for};
use crate::WaccResult;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Book and market value of one source of finance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapitalStructureEntry {
    pub book_value: Money,
    pub market_value: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapmInput {
    pub risk_free_rate: Rate,
    pub beta: Decimal,
    pub market_risk_premium: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DgmInput {
    /// Dividend just paid (D0)
    pub last_dividend: Decimal,
    pub growth_rate: Rate,
    pub price: Decimal,
}

/// Cost of equity method and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum EquityInput {
    Capm(CapmInput),
    Dgm(DgmInput),
}

impl EquityInput {
    pub fn label(&self) -> &'static str {
        match self {
            EquityInput::Capm(_) => "CAPM",
            EquityInput::Dgm(_) => "Dividend Growth Model",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceInput {
    pub dividend: Decimal,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedeemableDebtInput {
    pub coupon: Decimal,
    pub price: Decimal,
    pub redemption_value: Decimal,
    pub years_to_redemption: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrredeemableDebtInput {
    pub coupon: Decimal,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankLoanInput {
    pub interest_rate: Rate,
}

/// Everything needed for one WACC run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaccInput {
    /// Presentation only; echoed to the output for the report layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    /// Corporate tax rate applied to every debt instrument
    pub tax_rate: Rate,
    pub equity: EquityInput,
    pub preference: PreferenceInput,
    pub redeemable_debt: RedeemableDebtInput,
    pub irredeemable_debt: IrredeemableDebtInput,
    pub bank_loan: BankLoanInput,
    pub capital_structure: InstrumentMap<CapitalStructureEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forensic: Option<ForensicQuery>,
}

impl WaccInput {
    /// Per-instrument formula inputs, with the global tax rate applied to debt.
    pub fn instrument_inputs(&self) -> InstrumentMap<InstrumentInput> {
        let equity = match self.equity {
            EquityInput::Capm(ref capm) => InstrumentInput::EquityCapm {
                risk_free_rate: capm.risk_free_rate,
                beta: capm.beta,
                market_risk_premium: capm.market_risk_premium,
            },
            EquityInput::Dgm(ref dgm) => InstrumentInput::EquityDgm {
                last_dividend: dgm.last_dividend,
                growth_rate: dgm.growth_rate,
                price: dgm.price,
            },
        };
        InstrumentMap {
            equity,
            preference: InstrumentInput::Preference {
                dividend: self.preference.dividend,
                price: self.preference.price,
            },
            redeemable_debt: InstrumentInput::RedeemableDebt {
                coupon: self.redeemable_debt.coupon,
                price: self.redeemable_debt.price,
                redemption_value: self.redeemable_debt.redemption_value,
                years_to_redemption: self.redeemable_debt.years_to_redemption,
                tax_rate: self.tax_rate,
            },
            irredeemable_debt: InstrumentInput::IrredeemableDebt {
                coupon: self.irredeemable_debt.coupon,
                price: self.irredeemable_debt.price,
                tax_rate: self.tax_rate,
            },
            bank_loan: InstrumentInput::BankLoan {
                interest_rate: self.bank_loan.interest_rate,
                tax_rate: self.tax_rate,
            },
        }
    }

    pub fn book_values(&self) -> InstrumentMap<Money> {
        self.capital_structure.map(|_, e| e.book_value)
    }

    pub fn market_values(&self) -> InstrumentMap<Money> {
        self.capital_structure.map(|_, e| e.market_value)
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Per-instrument cost, or the reason it could not be computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CostOutcome {
    Computed { cost: Rate },
    Failed { reason: String },
}

impl CostOutcome {
    pub fn cost(&self) -> Option<Rate> {
        match self {
            CostOutcome::Computed { cost } => Some(*cost),
            CostOutcome::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForensicOutput {
    pub query: ForensicQuery,
    pub result: ForensicResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaccOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    pub tax_rate: Rate,
    pub equity_method: String,
    pub costs: InstrumentMap<CostOutcome>,
    pub book_values: InstrumentMap<Money>,
    pub market_values: InstrumentMap<Money>,
    pub total_book_value: Money,
    pub total_market_value: Money,
    pub weights_book: InstrumentMap<Rate>,
    pub weights_market: InstrumentMap<Rate>,
    /// `None` when any instrument cost failed
    pub wacc_book: Option<Rate>,
    pub wacc_market: Option<Rate>,
    /// `None` when no forensic query was supplied
    pub forensic: Option<ForensicOutput>,
}

impl WaccOutput {
    /// All five costs, if every instrument priced successfully.
    pub fn complete_costs(&self) -> Option<InstrumentMap<Rate>> {
        let mut out = InstrumentMap::<Rate>::default();
        for (instrument, outcome) in self.costs.iter() {
            out[instrument] = outcome.cost()?;
        }
        Some(out)
    }

    pub fn weights(&self, basis: Basis) -> &InstrumentMap<Rate> {
        match basis {
            Basis::Book => &self.weights_book,
            Basis::Market => &self.weights_market,
        }
    }

    pub fn wacc(&self, basis: Basis) -> Option<Rate> {
        match basis {
            Basis::Book => self.wacc_book,
            Basis::Market => self.wacc_market,
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the full WACC pipeline on book and market bases.
///
/// Fails only on hard validation errors (negative financing amounts).
/// Instrument pricing failures are reported per instrument in `costs`.
pub fn compute_wacc(input: &WaccInput) -> WaccResult<ComputationOutput<WaccOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    // --- Validation ---
    let (errors, soft): (Vec<ValidationIssue>, Vec<ValidationIssue>) =
        validation::validate_input(input)
            .into_iter()
            .partition(ValidationIssue::is_error);
    if let Some(first) = errors.into_iter().next() {
        return Err(WaccError::InvalidInput {
            field: first.field,
            reason: first.reason,
        });
    }
    for issue in soft {
        warn!(field = %issue.field, "{}", issue.reason);
        warnings.push(issue.to_string());
    }

    // --- Component costs ---
    let costs = input.instrument_inputs().map(|instrument, inst| match inst.cost() {
        Ok(cost) => {
            debug!(%instrument, %cost, "component cost");
            CostOutcome::Computed { cost }
        }
        Err(e) => {
            warn!(%instrument, error = %e, "component cost failed");
            warnings.push(format!("{instrument}: {e}"));
            CostOutcome::Failed {
                reason: e.to_string(),
            }
        }
    });

    // --- Weights ---
    let book_values = input.book_values();
    let market_values = input.market_values();
    let total_book_value: Money = total_amount(&book_values)?;
    let total_market_value: Money = total_amount(&market_values)?;
    let weights_book = weights_for(&book_values)?;
    let weights_market = weights_for(&market_values)?;

    if total_book_value.is_zero() {
        warnings.push("All book values are zero; book weights set to zero".into());
    }
    if total_market_value.is_zero() {
        warnings.push("All market values are zero; market weights set to zero".into());
    }

    // --- Aggregation ---
    let failed: Vec<Instrument> = costs
        .iter()
        .filter(|(_, outcome)| outcome.cost().is_none())
        .map(|(instrument, _)| instrument)
        .collect();

    let (wacc_book, wacc_market) = if failed.is_empty() {
        let rates = costs.map(|_, outcome| outcome.cost().unwrap_or_default());
        let mut aggregate = |basis: Basis, weights: &InstrumentMap<Rate>| {
            match wacc_for(&rates, weights) {
                Ok(wacc) => Some(wacc),
                Err(e) => {
                    warn!(%basis, error = %e, "WACC aggregation failed");
                    warnings.push(format!("WACC on {basis} basis not aggregated: {e}"));
                    None
                }
            }
        };
        let book = aggregate(Basis::Book, &weights_book);
        let market = aggregate(Basis::Market, &weights_market);
        debug!(wacc_book = ?book, wacc_market = ?market, "aggregated WACC");
        (book, market)
    } else {
        warnings.push(format!(
            "WACC not aggregated: cost unavailable for {}",
            join_labels(&failed)
        ));
        (None, None)
    };

    for (basis, wacc) in [(Basis::Book, wacc_book), (Basis::Market, wacc_market)] {
        if let Some(w) = wacc {
            if w > dec!(0.20) {
                warnings.push(format!(
                    "WACC on {basis} basis of {w} exceeds 20%; verify inputs"
                ));
            }
        }
    }

    // --- Forensic ---
    let forensic = input.forensic.and_then(|query| {
        let result = match run_forensic(&costs, &weights_book, &weights_market, &query) {
            Ok(result) => result,
            Err(e) => {
                warn!(instrument = %query.missing, error = %e, "forensic solve failed");
                warnings.push(format!("Cannot solve for {}: {e}", query.missing));
                return None;
            }
        };
        match &result {
            ForensicResult::Solved { solved_cost, .. } => {
                debug!(instrument = %query.missing, %solved_cost, "forensic solve");
            }
            ForensicResult::ZeroWeightUnsolvable { instrument, basis } => {
                warnings.push(format!(
                    "Cannot solve for {instrument}: zero weight on {basis} basis"
                ));
            }
            ForensicResult::KnownCostsUnavailable { unavailable, .. } => {
                warnings.push(format!(
                    "Cannot solve for {}: cost unavailable for {}",
                    query.missing,
                    join_labels(unavailable)
                ));
            }
        }
        Some(ForensicOutput { query, result })
    });

    let output = WaccOutput {
        company_name: input.company_name.clone(),
        tax_rate: input.tax_rate,
        equity_method: input.equity.label().to_string(),
        costs,
        book_values,
        market_values,
        total_book_value,
        total_market_value,
        weights_book,
        weights_market,
        wacc_book,
        wacc_market,
        forensic,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "WACC on book and market value bases",
        input,
        warnings,
        elapsed,
        output,
    ))
}

fn run_forensic(
    costs: &InstrumentMap<CostOutcome>,
    weights_book: &InstrumentMap<Rate>,
    weights_market: &InstrumentMap<Rate>,
    query: &ForensicQuery,
) -> WaccResult<ForensicResult> {
    let unavailable: Vec<Instrument> = costs
        .iter()
        .filter(|(instrument, outcome)| *instrument != query.missing && outcome.cost().is_none())
        .map(|(instrument, _)| instrument)
        .collect();
    if !unavailable.is_empty() {
        return Ok(ForensicResult::KnownCostsUnavailable {
            instrument: query.missing,
            basis: query.basis,
            unavailable,
        });
    }

    // The missing slot's own cost is ignored by the solver, failed or not.
    let known = costs.map(|_, outcome| outcome.cost().unwrap_or_default());
    let weights = match query.basis {
        Basis::Book => weights_book,
        Basis::Market => weights_market,
    };
    solve_forensic(&known, weights, query)
}

fn join_labels(instruments: &[Instrument]) -> String {
    instruments
        .iter()
        .map(|i| i.label())
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
