//! After-tax cost of debt finance.
//!
//! Redeemable debt uses the yield-to-redemption approximation:
//!   Kd = (I + (RV - P0)/n) / ((RV + P0)/2)
//!   Kd(1-T) = Kd * (1 - T)
//!
//! Irredeemable debt and bank loans apply the tax shield directly to the
//! running yield / interest rate. Tax rates outside [0, 1] are computed as
//! given; flagging them is the caller's job.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::WaccError;
use crate::types::Rate;
use crate::WaccResult;

/// Pre-tax yield to redemption (approximation) of redeemable debt.
pub fn redeemable_debt_pre_tax(
    coupon: Decimal,
    price: Decimal,
    redemption_value: Decimal,
    years_to_redemption: u32,
) -> WaccResult<Rate> {
    if years_to_redemption == 0 {
        return Err(WaccError::DivisionByZero {
            context: "cost of redeemable debt: years to redemption n is zero".into(),
        });
    }
    let overflow = || WaccError::overflow("cost of redeemable debt: (I + (RV-P0)/n) / ((RV+P0)/2)");
    let average_capital = redemption_value
        .checked_add(price)
        .map(|sum| sum / dec!(2))
        .ok_or_else(overflow)?;
    if average_capital.is_zero() {
        return Err(WaccError::DivisionByZero {
            context: "cost of redeemable debt: redemption value + price (RV + P0) is zero".into(),
        });
    }
    let n = Decimal::from(years_to_redemption);
    redemption_value
        .checked_sub(price)
        .map(|gain| gain / n)
        .and_then(|annual_gain| coupon.checked_add(annual_gain))
        .and_then(|income| income.checked_div(average_capital))
        .ok_or_else(overflow)
}

/// After-tax cost of redeemable debt.
pub fn cost_of_redeemable_debt(
    coupon: Decimal,
    price: Decimal,
    redemption_value: Decimal,
    years_to_redemption: u32,
    tax_rate: Rate,
) -> WaccResult<Rate> {
    let pre_tax = redeemable_debt_pre_tax(coupon, price, redemption_value, years_to_redemption)?;
    after_tax(pre_tax, tax_rate, "cost of redeemable debt")
}

/// After-tax cost of irredeemable debt: (I / P0)(1 - T).
pub fn cost_of_irredeemable_debt(coupon: Decimal, price: Decimal, tax_rate: Rate) -> WaccResult<Rate> {
    if price.is_zero() {
        return Err(WaccError::DivisionByZero {
            context: "cost of irredeemable debt: price P0 is zero".into(),
        });
    }
    let running_yield = coupon
        .checked_div(price)
        .ok_or_else(|| WaccError::overflow("cost of irredeemable debt: I/P0"))?;
    after_tax(running_yield, tax_rate, "cost of irredeemable debt")
}

/// After-tax cost of bank borrowing: i(1 - T).
pub fn cost_of_bank_loan(interest_rate: Rate, tax_rate: Rate) -> WaccResult<Rate> {
    after_tax(interest_rate, tax_rate, "cost of bank loan")
}

fn after_tax(rate: Rate, tax_rate: Rate, context: &str) -> WaccResult<Rate> {
    Decimal::ONE
        .checked_sub(tax_rate)
        .and_then(|shield| rate.checked_mul(shield))
        .ok_or_else(|| WaccError::overflow(format!("{context}: tax shield (1 - T)")))
}
