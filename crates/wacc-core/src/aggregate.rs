use rust_decimal::Decimal;

use crate::error::WaccError;
use crate::instruments::InstrumentMap;
use crate::types::Rate;
use crate::WaccResult;

fn weighted_sum<'a, 'b>(mut pairs: impl Iterator<Item = (&'a Rate, &'b Rate)>) -> WaccResult<Rate> {
    pairs
        .try_fold(Decimal::ZERO, |acc, (c, w)| {
            c.checked_mul(*w).and_then(|term| acc.checked_add(term))
        })
        .ok_or_else(|| WaccError::overflow("WACC: sum of cost x weight"))
}

/// Weighted average of aligned costs and weights: Σ cost_i × weight_i.
///
/// Sequences of unequal length are rejected rather than truncated.
pub fn calculate_wacc(costs: &[Rate], weights: &[Rate]) -> WaccResult<Rate> {
    if costs.len() != weights.len() {
        return Err(WaccError::LengthMismatch {
            costs: costs.len(),
            weights: weights.len(),
        });
    }
    weighted_sum(costs.iter().zip(weights))
}

/// Typed counterpart of [`calculate_wacc`]; alignment is guaranteed by the map.
pub fn wacc_for(costs: &InstrumentMap<Rate>, weights: &InstrumentMap<Rate>) -> WaccResult<Rate> {
    weighted_sum(costs.iter().map(|(instrument, cost)| (cost, &weights[instrument])))
}
