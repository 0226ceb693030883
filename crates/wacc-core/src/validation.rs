//! Input validation for the WACC pipeline.
//!
//! Formulas never validate. Domain problems are collected here as
//! [`ValidationIssue`]s: warnings travel with the result, errors stop the
//! pipeline before any weights are computed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cost_of_capital::InstrumentInput;
use crate::instruments::InstrumentMap;
use crate::pipeline::{CapitalStructureEntry, WaccInput};
use crate::types::Rate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub reason: String,
    pub severity: Severity,
}

impl ValidationIssue {
    fn warning(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationIssue {
            field: field.into(),
            reason: reason.into(),
            severity: Severity::Warning,
        }
    }

    fn error(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationIssue {
            field: field.into(),
            reason: reason.into(),
            severity: Severity::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Warn when a tax rate lies outside [0, 1]. The value is still used as given.
pub fn check_tax_rate(field: &str, tax_rate: Rate) -> Option<ValidationIssue> {
    if tax_rate < Decimal::ZERO || tax_rate > Decimal::ONE {
        Some(ValidationIssue::warning(
            field,
            format!("Tax rate {tax_rate} is outside [0, 1]; used without clamping"),
        ))
    } else {
        None
    }
}

fn check_price(field: &str, price: Decimal) -> Option<ValidationIssue> {
    if price < Decimal::ZERO {
        Some(ValidationIssue::warning(
            field,
            format!("Negative market price {price}"),
        ))
    } else {
        None
    }
}

/// Domain warnings for a single instrument's formula inputs.
pub fn validate_instrument(input: &InstrumentInput) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    match *input {
        InstrumentInput::EquityCapm { .. } => {}
        InstrumentInput::EquityDgm { price, .. } => {
            issues.extend(check_price("equity.price", price));
        }
        InstrumentInput::Preference { price, .. } => {
            issues.extend(check_price("preference.price", price));
        }
        InstrumentInput::RedeemableDebt {
            price,
            years_to_redemption,
            tax_rate,
            ..
        } => {
            issues.extend(check_price("redeemable_debt.price", price));
            if years_to_redemption == 0 {
                issues.push(ValidationIssue::warning(
                    "redeemable_debt.years_to_redemption",
                    "Years to redemption must be positive",
                ));
            }
            issues.extend(check_tax_rate("tax_rate", tax_rate));
        }
        InstrumentInput::IrredeemableDebt {
            price, tax_rate, ..
        } => {
            issues.extend(check_price("irredeemable_debt.price", price));
            issues.extend(check_tax_rate("tax_rate", tax_rate));
        }
        InstrumentInput::BankLoan { tax_rate, .. } => {
            issues.extend(check_tax_rate("tax_rate", tax_rate));
        }
    }
    issues
}

/// Financing amounts feeding the weighting function must be non-negative.
pub fn validate_capital_structure(
    structure: &InstrumentMap<CapitalStructureEntry>,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for (instrument, entry) in structure.iter() {
        let key = instrument.key();
        if entry.book_value < Decimal::ZERO {
            issues.push(ValidationIssue::error(
                format!("capital_structure.{key}.book_value"),
                format!("Book value cannot be negative, got {}", entry.book_value),
            ));
        }
        if entry.market_value < Decimal::ZERO {
            issues.push(ValidationIssue::error(
                format!("capital_structure.{key}.market_value"),
                format!("Market value cannot be negative, got {}", entry.market_value),
            ));
        }
    }
    issues
}

/// Validate the whole pipeline input.
///
/// Tax-rate warnings are reported once for the global rate rather than once
/// per debt instrument.
pub fn validate_input(input: &WaccInput) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    issues.extend(check_tax_rate("tax_rate", input.tax_rate));

    for (_, instrument_input) in input.instrument_inputs().iter() {
        for issue in validate_instrument(instrument_input) {
            if !issues.iter().any(|seen: &ValidationIssue| seen.field == issue.field) {
                issues.push(issue);
            }
        }
    }

    issues.extend(validate_capital_structure(&input.capital_structure));

    if let Some(ref query) = input.forensic {
        if query.target_wacc < Decimal::ZERO {
            issues.push(ValidationIssue::warning(
                "forensic.target_wacc",
                format!("Negative target WACC {}", query.target_wacc),
            ));
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruments::Instrument;
    use rust_decimal_macros::dec;

    #[test]
    fn test_tax_rate_bounds() {
        assert!(check_tax_rate("tax_rate", dec!(0)).is_none());
        assert!(check_tax_rate("tax_rate", dec!(1)).is_none());
        assert!(check_tax_rate("tax_rate", dec!(0.3)).is_none());

        let issue = check_tax_rate("tax_rate", dec!(30)).unwrap();
        assert_eq!(issue.severity, Severity::Warning);
        assert!(check_tax_rate("tax_rate", dec!(-0.1)).is_some());
    }

    #[test]
    fn test_instrument_warnings() {
        let issues = validate_instrument(&InstrumentInput::RedeemableDebt {
            coupon: dec!(5),
            price: dec!(-96),
            redemption_value: dec!(100),
            years_to_redemption: 0,
            tax_rate: dec!(0.3),
        });
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| !i.is_error()));
        assert!(issues.iter().any(|i| i.field.ends_with("years_to_redemption")));
    }

    #[test]
    fn test_negative_amounts_are_errors() {
        let mut structure = InstrumentMap::<CapitalStructureEntry>::default();
        structure[Instrument::BankLoan] = CapitalStructureEntry {
            book_value: dec!(-1),
            market_value: dec!(10),
        };
        let issues = validate_capital_structure(&structure);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].is_error());
        assert_eq!(issues[0].field, "capital_structure.bank_loan.book_value");
    }

    #[test]
    fn test_input_reports_each_field_once() {
        let json = serde_json::json!({
            "tax_rate": "1.5",
            "equity": { "method": "dgm", "last_dividend": "0.2", "growth_rate": "0.05", "price": "-4" },
            "preference": { "dividend": "0.08", "price": "0.89" },
            "redeemable_debt": { "coupon": "5", "price": "96", "redemption_value": "100", "years_to_redemption": 0 },
            "irredeemable_debt": { "coupon": "9", "price": "-108" },
            "bank_loan": { "interest_rate": "0.07" },
            "capital_structure": {
                "equity": { "book_value": "1", "market_value": "1" },
                "preference": { "book_value": "1", "market_value": "1" },
                "redeemable_debt": { "book_value": "1", "market_value": "1" },
                "irredeemable_debt": { "book_value": "1", "market_value": "1" },
                "bank_loan": { "book_value": "1", "market_value": "1" }
            }
        });
        let input: WaccInput = serde_json::from_value(json).unwrap();
        let fields: Vec<String> = validate_input(&input).into_iter().map(|i| i.field).collect();
        assert_eq!(
            fields,
            vec![
                "tax_rate",
                "equity.price",
                "redeemable_debt.years_to_redemption",
                "irredeemable_debt.price",
            ]
        );
    }

    #[test]
    fn test_display() {
        let issue = ValidationIssue::warning("tax_rate", "out of range");
        assert_eq!(issue.to_string(), "tax_rate: out of range");
    }
}
