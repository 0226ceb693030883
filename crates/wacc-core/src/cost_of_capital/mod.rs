//! Cost-of-capital formulas, one per instrument kind.
//!
//! The formulas are pure: they compute and guard zero denominators, nothing
//! else. Domain checks (tax rate range, negative prices) live in
//! [`crate::validation`] and are reported by the caller.

pub mod debt;
pub mod equity;
pub mod preference;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::instruments::Instrument;
use crate::types::{with_metadata, ComputationOutput, Rate};
use crate::validation;
use crate::WaccResult;

pub use debt::{
    cost_of_bank_loan, cost_of_irredeemable_debt, cost_of_redeemable_debt,
    redeemable_debt_pre_tax,
};
pub use equity::{cost_of_equity_capm, cost_of_equity_dgm};
pub use preference::cost_of_preference_shares;

/// Inputs for a single instrument's cost formula, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InstrumentInput {
    EquityCapm {
        risk_free_rate: Rate,
        beta: Decimal,
        market_risk_premium: Rate,
    },
    EquityDgm {
        /// Dividend just paid (D0)
        last_dividend: Decimal,
        growth_rate: Rate,
        price: Decimal,
    },
    Preference {
        dividend: Decimal,
        price: Decimal,
    },
    RedeemableDebt {
        /// Annual coupon per unit of nominal
        coupon: Decimal,
        price: Decimal,
        redemption_value: Decimal,
        years_to_redemption: u32,
        tax_rate: Rate,
    },
    IrredeemableDebt {
        coupon: Decimal,
        price: Decimal,
        tax_rate: Rate,
    },
    BankLoan {
        interest_rate: Rate,
        tax_rate: Rate,
    },
}

impl InstrumentInput {
    /// The capital-structure slot this input prices.
    pub fn instrument(&self) -> Instrument {
        match self {
            InstrumentInput::EquityCapm { .. } | InstrumentInput::EquityDgm { .. } => {
                Instrument::Equity
            }
            InstrumentInput::Preference { .. } => Instrument::Preference,
            InstrumentInput::RedeemableDebt { .. } => Instrument::RedeemableDebt,
            InstrumentInput::IrredeemableDebt { .. } => Instrument::IrredeemableDebt,
            InstrumentInput::BankLoan { .. } => Instrument::BankLoan,
        }
    }

    pub fn methodology(&self) -> &'static str {
        match self {
            InstrumentInput::EquityCapm { .. } => "Cost of equity via CAPM",
            InstrumentInput::EquityDgm { .. } => "Cost of equity via Dividend Growth Model",
            InstrumentInput::Preference { .. } => "Cost of irredeemable preference shares",
            InstrumentInput::RedeemableDebt { .. } => {
                "After-tax cost of redeemable debt (yield-to-redemption approximation)"
            }
            InstrumentInput::IrredeemableDebt { .. } => "After-tax cost of irredeemable debt",
            InstrumentInput::BankLoan { .. } => "After-tax cost of bank borrowing",
        }
    }

    /// Evaluate the instrument's cost formula.
    pub fn cost(&self) -> WaccResult<Rate> {
        match *self {
            InstrumentInput::EquityCapm {
                risk_free_rate,
                beta,
                market_risk_premium,
            } => cost_of_equity_capm(risk_free_rate, beta, market_risk_premium),
            InstrumentInput::EquityDgm {
                last_dividend,
                growth_rate,
                price,
            } => cost_of_equity_dgm(last_dividend, growth_rate, price),
            InstrumentInput::Preference { dividend, price } => {
                cost_of_preference_shares(dividend, price)
            }
            InstrumentInput::RedeemableDebt {
                coupon,
                price,
                redemption_value,
                years_to_redemption,
                tax_rate,
            } => cost_of_redeemable_debt(
                coupon,
                price,
                redemption_value,
                years_to_redemption,
                tax_rate,
            ),
            InstrumentInput::IrredeemableDebt {
                coupon,
                price,
                tax_rate,
            } => cost_of_irredeemable_debt(coupon, price, tax_rate),
            InstrumentInput::BankLoan {
                interest_rate,
                tax_rate,
            } => cost_of_bank_loan(interest_rate, tax_rate),
        }
    }

    /// Pre-tax cost where the formula applies a tax shield.
    pub fn pre_tax_cost(&self) -> WaccResult<Option<Rate>> {
        match *self {
            InstrumentInput::RedeemableDebt {
                coupon,
                price,
                redemption_value,
                years_to_redemption,
                ..
            } => redeemable_debt_pre_tax(coupon, price, redemption_value, years_to_redemption)
                .map(Some),
            InstrumentInput::IrredeemableDebt { coupon, price, .. } => {
                cost_of_irredeemable_debt(coupon, price, Decimal::ZERO).map(Some)
            }
            InstrumentInput::BankLoan { interest_rate, .. } => Ok(Some(interest_rate)),
            _ => Ok(None),
        }
    }
}

/// Output of a single-instrument cost calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostOfCapitalOutput {
    pub instrument: Instrument,
    pub cost: Rate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_tax_cost: Option<Rate>,
}

/// Price one instrument and wrap the result in the standard envelope.
///
/// Domain warnings (tax outside [0, 1], negative prices, ...) are attached
/// to the envelope; only zero denominators fail.
pub fn calculate_cost(input: &InstrumentInput) -> WaccResult<ComputationOutput<CostOfCapitalOutput>> {
    let start = Instant::now();

    let warnings = validation::validate_instrument(input)
        .into_iter()
        .map(|issue| issue.to_string())
        .collect();

    let output = CostOfCapitalOutput {
        instrument: input.instrument(),
        cost: input.cost()?,
        pre_tax_cost: input.pre_tax_cost()?,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        input.methodology(),
        input,
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WaccError;
    use rust_decimal_macros::dec;

    #[test]
    fn test_dispatch_matches_direct_formulas() {
        let input = InstrumentInput::IrredeemableDebt {
            coupon: dec!(9),
            price: dec!(108),
            tax_rate: dec!(0.30),
        };
        assert_eq!(input.instrument(), Instrument::IrredeemableDebt);
        assert_eq!(
            input.cost().unwrap(),
            cost_of_irredeemable_debt(dec!(9), dec!(108), dec!(0.30)).unwrap()
        );
    }

    #[test]
    fn test_both_equity_methods_price_equity() {
        let capm = InstrumentInput::EquityCapm {
            risk_free_rate: dec!(0.04),
            beta: dec!(1.1),
            market_risk_premium: dec!(0.05),
        };
        let dgm = InstrumentInput::EquityDgm {
            last_dividend: dec!(0.23),
            growth_rate: dec!(0.05),
            price: dec!(4.17),
        };
        assert_eq!(capm.instrument(), Instrument::Equity);
        assert_eq!(dgm.instrument(), Instrument::Equity);
        assert!(capm.pre_tax_cost().unwrap().is_none());
    }

    #[test]
    fn test_deserialize_tagged_input() {
        let json = r#"{"kind":"bank_loan","interest_rate":"0.07","tax_rate":"0.30"}"#;
        let input: InstrumentInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.cost().unwrap(), dec!(0.049));
    }

    #[test]
    fn test_calculate_cost_envelope() {
        let input = InstrumentInput::RedeemableDebt {
            coupon: dec!(5),
            price: dec!(96),
            redemption_value: dec!(100),
            years_to_redemption: 6,
            tax_rate: dec!(0.30),
        };
        let result = calculate_cost(&input).unwrap();
        assert_eq!(result.result.instrument, Instrument::RedeemableDebt);
        assert!(result.result.pre_tax_cost.unwrap() > result.result.cost);
        assert!(result.warnings.is_empty());
        assert!(result.methodology.contains("redeemable"));
    }

    #[test]
    fn test_calculate_cost_warns_on_tax_range() {
        let input = InstrumentInput::BankLoan {
            interest_rate: dec!(0.07),
            tax_rate: dec!(1.2),
        };
        let result = calculate_cost(&input).unwrap();
        assert!(result.warnings.iter().any(|w| w.contains("tax_rate")));
    }

    #[test]
    fn test_calculate_cost_zero_price_fails() {
        let input = InstrumentInput::Preference {
            dividend: dec!(0.08),
            price: Decimal::ZERO,
        };
        assert!(matches!(
            calculate_cost(&input),
            Err(WaccError::DivisionByZero { .. })
        ));
    }
}
