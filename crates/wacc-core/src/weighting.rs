//! Financing weights from book or market amounts.
//!
//! Precondition: amounts are non-negative. The pipeline rejects negative
//! amounts before calling in here; these functions do not check.

use rust_decimal::Decimal;

use crate::error::WaccError;
use crate::instruments::InstrumentMap;
use crate::types::{Money, Rate};
use crate::WaccResult;

fn total_of<'a>(mut amounts: impl Iterator<Item = &'a Money>) -> WaccResult<Money> {
    amounts
        .try_fold(Decimal::ZERO, |acc, a| acc.checked_add(*a))
        .ok_or_else(|| WaccError::overflow("financing weights: total of amounts"))
}

/// Normalize financing amounts into proportional weights.
///
/// When the total is zero every weight is zero (not NaN, not an error).
/// Fails only if the amounts sum past `Decimal::MAX`.
pub fn calculate_weights(amounts: &[Money]) -> WaccResult<Vec<Rate>> {
    let total = total_of(amounts.iter())?;
    if total.is_zero() {
        return Ok(vec![Decimal::ZERO; amounts.len()]);
    }
    // amount <= total, so each quotient lies in [0, 1]
    Ok(amounts.iter().map(|a| a / total).collect())
}

/// Total of the five financing amounts.
pub fn total_amount(amounts: &InstrumentMap<Money>) -> WaccResult<Money> {
    total_of(amounts.iter().map(|(_, a)| a))
}

/// Typed counterpart of [`calculate_weights`] over the five instruments.
pub fn weights_for(amounts: &InstrumentMap<Money>) -> WaccResult<InstrumentMap<Rate>> {
    let total = total_amount(amounts)?;
    if total.is_zero() {
        return Ok(InstrumentMap::default());
    }
    Ok(amounts.map(|_, a| a / total))
}
