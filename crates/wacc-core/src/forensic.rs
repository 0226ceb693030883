//! Forensic solve: recover one unknown cost from a target WACC.
//!
//! WACC is linear in each cost, so with four costs known
//!   known = Σ_{i≠k} c_i · w_i
//!   c_k   = (target - known) / w_k
//! is exact. A zero weight on the missing instrument makes the solve
//! undefined; that is reported as [`ForensicResult::ZeroWeightUnsolvable`],
//! a normal outcome rather than an error.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::WaccError;
use crate::instruments::{Instrument, InstrumentMap};
use crate::types::{Basis, Rate};
use crate::WaccResult;

/// Which cost is unknown, which weights to use, and the WACC to hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForensicQuery {
    pub missing: Instrument,
    #[serde(default)]
    pub basis: Basis,
    pub target_wacc: Rate,
}

impl ForensicQuery {
    pub fn from_index(missing_index: usize, basis: Basis, target_wacc: Rate) -> WaccResult<Self> {
        Ok(ForensicQuery {
            missing: Instrument::from_index(missing_index)?,
            basis,
            target_wacc,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ForensicResult {
    Solved {
        instrument: Instrument,
        basis: Basis,
        solved_cost: Rate,
        /// Σ c_i · w_i over the four known instruments
        known_contribution: Rate,
    },
    /// The missing instrument carries no weight in the chosen basis.
    ZeroWeightUnsolvable { instrument: Instrument, basis: Basis },
    /// One or more of the other four costs could not be computed.
    KnownCostsUnavailable {
        instrument: Instrument,
        basis: Basis,
        unavailable: Vec<Instrument>,
    },
}

impl ForensicResult {
    pub fn instrument(&self) -> Instrument {
        match self {
            ForensicResult::Solved { instrument, .. }
            | ForensicResult::ZeroWeightUnsolvable { instrument, .. }
            | ForensicResult::KnownCostsUnavailable { instrument, .. } => *instrument,
        }
    }

    pub fn basis(&self) -> Basis {
        match self {
            ForensicResult::Solved { basis, .. }
            | ForensicResult::ZeroWeightUnsolvable { basis, .. }
            | ForensicResult::KnownCostsUnavailable { basis, .. } => *basis,
        }
    }

    pub fn solved_cost(&self) -> Option<Rate> {
        match self {
            ForensicResult::Solved { solved_cost, .. } => Some(*solved_cost),
            _ => None,
        }
    }
}

/// Solve for the cost of `query.missing` given the other four costs and
/// the weights of `query.basis`.
///
/// `costs[query.missing]` is ignored.
pub fn solve_forensic(
    costs: &InstrumentMap<Rate>,
    weights: &InstrumentMap<Rate>,
    query: &ForensicQuery,
) -> WaccResult<ForensicResult> {
    let missing = query.missing;
    let missing_weight = weights[missing];
    if missing_weight.is_zero() {
        return Ok(ForensicResult::ZeroWeightUnsolvable {
            instrument: missing,
            basis: query.basis,
        });
    }

    let overflow = || WaccError::overflow(format!("forensic solve for {missing}"));
    let known_contribution = costs
        .iter()
        .filter(|(instrument, _)| *instrument != missing)
        .try_fold(Decimal::ZERO, |acc, (instrument, cost)| {
            cost.checked_mul(weights[instrument])
                .and_then(|term| acc.checked_add(term))
        })
        .ok_or_else(overflow)?;

    // A tiny non-zero weight can push the quotient past Decimal::MAX.
    let solved_cost = query
        .target_wacc
        .checked_sub(known_contribution)
        .and_then(|residual| residual.checked_div(missing_weight))
        .ok_or_else(overflow)?;

    Ok(ForensicResult::Solved {
        instrument: missing,
        basis: query.basis,
        solved_cost,
        known_contribution,
    })
}

/// Positional form of [`solve_forensic`] for callers holding plain
/// sequences in canonical instrument order. `basis` only labels the result;
/// the caller has already picked the weights.
pub fn solve_missing_cost(
    costs: &[Rate],
    weights: &[Rate],
    target_wacc: Rate,
    missing_index: usize,
    basis: Basis,
) -> WaccResult<ForensicResult> {
    if costs.len() != weights.len() {
        return Err(WaccError::LengthMismatch {
            costs: costs.len(),
            weights: weights.len(),
        });
    }
    let query = ForensicQuery::from_index(missing_index, basis, target_wacc)?;
    let costs = InstrumentMap::try_from_slice(costs)?;
    let weights = InstrumentMap::try_from_slice(weights)?;
    solve_forensic(&costs, &weights, &query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::calculate_wacc;
    use rust_decimal_macros::dec;

    fn sample() -> (Vec<Rate>, Vec<Rate>) {
        (
            vec![dec!(0.1079), dec!(0.0899), dec!(0.0405), dec!(0.0583), dec!(0.049)],
            vec![dec!(0.68), dec!(0.10), dec!(0.057), dec!(0.117), dec!(0.046)],
        )
    }

    #[test]
    fn test_recovers_each_cost() {
        let (costs, weights) = sample();
        let target = calculate_wacc(&costs, &weights).unwrap();
        for k in 0..5 {
            let result = solve_missing_cost(&costs, &weights, target, k, Basis::Market).unwrap();
            let solved = result.solved_cost().unwrap();
            assert!(
                (solved - costs[k]).abs() < dec!(0.000000001),
                "slot {k}: expected {}, got {solved}",
                costs[k]
            );
        }
    }

    #[test]
    fn test_missing_cost_value_is_ignored() {
        let (mut costs, weights) = sample();
        let target = calculate_wacc(&costs, &weights).unwrap();
        costs[2] = dec!(999);
        let result = solve_missing_cost(&costs, &weights, target, 2, Basis::Market).unwrap();
        assert!((result.solved_cost().unwrap() - dec!(0.0405)).abs() < dec!(0.000000001));
    }

    #[test]
    fn test_zero_weight_is_unsolvable() {
        let (costs, mut weights) = sample();
        weights[4] = Decimal::ZERO;
        let result = solve_missing_cost(&costs, &weights, dec!(0.09), 4, Basis::Book).unwrap();
        assert_eq!(
            result,
            ForensicResult::ZeroWeightUnsolvable {
                instrument: Instrument::BankLoan,
                basis: Basis::Book,
            }
        );
        assert!(result.solved_cost().is_none());
    }

    #[test]
    fn test_length_mismatch() {
        let (costs, weights) = sample();
        assert!(matches!(
            solve_missing_cost(&costs[..4], &weights, dec!(0.09), 0, Basis::Market),
            Err(WaccError::LengthMismatch { costs: 4, weights: 5 })
        ));
    }

    #[test]
    fn test_index_out_of_range() {
        let (costs, weights) = sample();
        assert!(matches!(
            solve_missing_cost(&costs, &weights, dec!(0.09), 5, Basis::Market),
            Err(WaccError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_known_contribution_reported() {
        let costs = InstrumentMap::from_array([dec!(0.10), dec!(0.08), dec!(0.05), dec!(0.06), dec!(0.04)]);
        let weights = InstrumentMap::from_array([dec!(0.5), dec!(0.1), dec!(0.1), dec!(0.2), dec!(0.1)]);
        // known = 0.008 + 0.005 + 0.012 + 0.004 = 0.029; equity = (0.09 - 0.029) / 0.5
        let query = ForensicQuery {
            missing: Instrument::Equity,
            basis: Basis::Book,
            target_wacc: dec!(0.09),
        };
        match solve_forensic(&costs, &weights, &query).unwrap() {
            ForensicResult::Solved {
                basis,
                solved_cost,
                known_contribution,
                ..
            } => {
                assert_eq!(basis, Basis::Book);
                assert_eq!(known_contribution, dec!(0.029));
                assert_eq!(solved_cost, dec!(0.122));
            }
            other => panic!("Expected Solved, got {other:?}"),
        }
    }

    #[test]
    fn test_tiny_weight_overflows_cleanly() {
        let costs = [dec!(0.1); 5];
        let weights = [dec!(0.25), dec!(0.25), dec!(0.25), dec!(0.25), Decimal::new(1, 28)];
        match solve_missing_cost(&costs, &weights, dec!(10), 4, Basis::Market) {
            Err(WaccError::Overflow { context }) => assert!(context.contains("forensic")),
            other => panic!("Expected Overflow, got {other:?}"),
        }
    }

    #[test]
    fn test_result_serializes_basis() {
        let result = ForensicResult::ZeroWeightUnsolvable {
            instrument: Instrument::Preference,
            basis: Basis::Market,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "zero_weight_unsolvable");
        assert_eq!(json["basis"], "market");
        assert_eq!(result.basis(), Basis::Market);
    }

    #[test]
    fn test_query_from_index() {
        let q = ForensicQuery::from_index(1, Basis::Book, dec!(0.1)).unwrap();
        assert_eq!(q.missing, Instrument::Preference);
        assert!(ForensicQuery::from_index(9, Basis::Book, dec!(0.1)).is_err());
    }
}
