use rust_decimal::Decimal;

use crate::error::WaccError;
use crate::types::Rate;
use crate::WaccResult;

/// Cost of irredeemable preference shares: Kp = Dp / P0.
pub fn cost_of_preference_shares(dividend: Decimal, price: Decimal) -> WaccResult<Rate> {
    if price.is_zero() {
        return Err(WaccError::DivisionByZero {
            context: "cost of preference shares: price P0 is zero".into(),
        });
    }
    dividend
        .checked_div(price)
        .ok_or_else(|| WaccError::overflow("cost of preference shares: Dp/P0"))
}
