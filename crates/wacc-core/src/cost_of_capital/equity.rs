//! Cost of ordinary equity.
//!
//! Two methods are supported:
//!   - Dividend Growth (Gordon) Model: Ke = D0(1+g)/P0 + g
//!   - CAPM: Ke = Rf + β·MRP

use rust_decimal::Decimal;

use crate::error::WaccError;
use crate::types::Rate;
use crate::WaccResult;

/// Cost of equity via the Dividend Growth Model.
///
/// `last_dividend` is the dividend just paid (D0), so the next dividend is
/// D1 = D0(1+g).
pub fn cost_of_equity_dgm(last_dividend: Decimal, growth_rate: Rate, price: Decimal) -> WaccResult<Rate> {
    if price.is_zero() {
        return Err(WaccError::DivisionByZero {
            context: "cost of equity (DGM): share price P0 is zero".into(),
        });
    }
    let overflow = || WaccError::overflow("cost of equity (DGM): D0(1+g)/P0");
    Decimal::ONE
        .checked_add(growth_rate)
        .and_then(|factor| factor.checked_mul(last_dividend))
        .and_then(|d1| d1.checked_div(price))
        .and_then(|dividend_yield| dividend_yield.checked_add(growth_rate))
        .ok_or_else(overflow)
}

/// Cost of equity via the Capital Asset Pricing Model.
pub fn cost_of_equity_capm(risk_free_rate: Rate, beta: Decimal, market_risk_premium: Rate) -> WaccResult<Rate> {
    beta.checked_mul(market_risk_premium)
        .and_then(|premium| risk_free_rate.checked_add(premium))
        .ok_or_else(|| WaccError::overflow("cost of equity (CAPM): Rf + beta * MRP"))
}
