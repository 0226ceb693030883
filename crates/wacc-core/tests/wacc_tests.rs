use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use wacc_core::aggregate::calculate_wacc;
use wacc_core::cost_of_capital::{self, InstrumentInput};
use wacc_core::forensic::{solve_missing_cost, ForensicQuery, ForensicResult};
use wacc_core::pipeline::{
    compute_wacc, BankLoanInput, CapitalStructureEntry, CapmInput, EquityInput,
    IrredeemableDebtInput, PreferenceInput, RedeemableDebtInput, WaccInput,
};
use wacc_core::weighting::calculate_weights;
use wacc_core::{Basis, Instrument, InstrumentMap, WaccError};

// ===========================================================================
// Cost formulas
// ===========================================================================

#[test]
fn test_dividend_growth_model_reference() {
    // D1 = 0.23 * 1.05 = 0.2415; 0.2415 / 4.17 + 0.05 = 0.10791
    let ke = cost_of_capital::cost_of_equity_dgm(dec!(0.23), dec!(0.05), dec!(4.17)).unwrap();
    assert!(
        (ke - dec!(0.10791)).abs() < dec!(0.00001),
        "Expected Ke ~10.79%, got {ke}"
    );
}

#[test]
fn test_irredeemable_debt_reference() {
    // (9 / 108) * 0.7 = 0.05833
    let kd = cost_of_capital::cost_of_irredeemable_debt(dec!(9.0), dec!(108.0), dec!(0.30)).unwrap();
    assert!(
        (kd - dec!(0.0583)).abs() < dec!(0.0001),
        "Expected Kd ~5.83%, got {kd}"
    );
}

#[test]
fn test_redeemable_debt_reference() {
    // pre-tax = (5 + 0.6667) / 98 = 0.05782; after-tax = 0.04048
    let pre = cost_of_capital::redeemable_debt_pre_tax(dec!(5.0), dec!(96.0), dec!(100.0), 6).unwrap();
    assert!((pre - dec!(0.05782)).abs() < dec!(0.00001), "pre-tax {pre}");

    let kd = cost_of_capital::cost_of_redeemable_debt(dec!(5.0), dec!(96.0), dec!(100.0), 6, dec!(0.30))
        .unwrap();
    assert!(
        (kd - dec!(0.04048)).abs() < dec!(0.0001),
        "Expected Kd ~4.05%, got {kd}"
    );
}

#[test]
fn test_zero_price_identifies_input() {
    let err = cost_of_capital::cost_of_equity_dgm(dec!(0.23), dec!(0.05), Decimal::ZERO).unwrap_err();
    assert!(err.to_string().contains("P0"), "{err}");
}

#[test]
fn test_single_instrument_envelope() {
    let input = InstrumentInput::EquityDgm {
        last_dividend: dec!(0.23),
        growth_rate: dec!(0.05),
        price: dec!(4.17),
    };
    let result = cost_of_capital::calculate_cost(&input).unwrap();
    assert_eq!(result.result.instrument, Instrument::Equity);
    assert_eq!(
        result.methodology,
        "Cost of equity via Dividend Growth Model"
    );
}

// ===========================================================================
// Weights and aggregation
// ===========================================================================

#[test]
fn test_book_value_weights() {
    let weights = calculate_weights(&[dec!(13600), dec!(9000), dec!(4650), dec!(8500), dec!(3260)]).unwrap();
    // Total 39,010
    let expected = [dec!(0.3486), dec!(0.2307), dec!(0.1192), dec!(0.2179), dec!(0.0836)];
    for (w, e) in weights.iter().zip(expected) {
        assert!((w - e).abs() < dec!(0.0001), "Expected ~{e}, got {w}");
    }
    let sum: Decimal = weights.iter().sum();
    assert!((sum - Decimal::ONE).abs() < dec!(0.000000001));
}

#[test]
fn test_aggregator_rejects_length_mismatch() {
    let costs = [dec!(0.10), dec!(0.09), dec!(0.04), dec!(0.06)];
    let weights = [dec!(0.4), dec!(0.2), dec!(0.1), dec!(0.2), dec!(0.1)];
    assert!(matches!(
        calculate_wacc(&costs, &weights),
        Err(WaccError::LengthMismatch { costs: 4, weights: 5 })
    ));
}

// ===========================================================================
// Pipeline
// ===========================================================================

fn entry(book: Decimal, market: Decimal) -> CapitalStructureEntry {
    CapitalStructureEntry {
        book_value: book,
        market_value: market,
    }
}

fn capm_company() -> WaccInput {
    WaccInput {
        company_name: Some("Capm Industrial".into()),
        tax_rate: dec!(0.25),
        equity: EquityInput::Capm(CapmInput {
            risk_free_rate: dec!(0.042),
            beta: dec!(1.10),
            market_risk_premium: dec!(0.055),
        }),
        preference: PreferenceInput {
            dividend: dec!(0.06),
            price: dec!(0.80),
        },
        redeemable_debt: RedeemableDebtInput {
            coupon: dec!(6),
            price: dec!(100),
            redemption_value: dec!(100),
            years_to_redemption: 5,
        },
        irredeemable_debt: IrredeemableDebtInput {
            coupon: dec!(8),
            price: dec!(100),
        },
        bank_loan: BankLoanInput {
            interest_rate: dec!(0.08),
        },
        capital_structure: InstrumentMap {
            equity: entry(dec!(600), dec!(600)),
            preference: entry(dec!(100), dec!(100)),
            redeemable_debt: entry(dec!(100), dec!(100)),
            irredeemable_debt: entry(dec!(100), dec!(100)),
            bank_loan: entry(dec!(100), Decimal::ZERO),
        },
        forensic: None,
    }
}

#[test]
fn test_pipeline_equal_bases_hand_calculation() {
    let result = compute_wacc(&capm_company()).unwrap();
    let out = &result.result;

    // Ke = 0.042 + 1.1 * 0.055 = 0.1025; Kp = 0.075; Krd = 0.045; Kid = 0.06; Kb = 0.06
    // Book: 0.6*0.1025 + 0.1*(0.075 + 0.045 + 0.06 + 0.06) = 0.0615 + 0.024 = 0.0855
    assert_eq!(out.wacc_book, Some(dec!(0.0855)));

    // Market total 900: (600*0.1025 + 100*0.075 + 100*0.045 + 100*0.06) / 900
    let expected_market = (dec!(61.5) + dec!(7.5) + dec!(4.5) + dec!(6)) / dec!(900);
    let market = out.wacc_market.unwrap();
    assert!((market - expected_market).abs() < dec!(0.000000001));
    assert_eq!(out.weights_market.bank_loan, Decimal::ZERO);
}

#[test]
fn test_pipeline_forensic_zero_weight_is_not_an_error() {
    let mut input = capm_company();
    input.forensic = Some(ForensicQuery {
        missing: Instrument::BankLoan,
        basis: Basis::Market,
        target_wacc: dec!(0.09),
    });
    let result = compute_wacc(&input).unwrap();
    let forensic = result.result.forensic.unwrap();
    assert_eq!(
        forensic.result,
        ForensicResult::ZeroWeightUnsolvable {
            instrument: Instrument::BankLoan,
            basis: Basis::Market,
        }
    );
}

#[test]
fn test_pipeline_forensic_book_basis() {
    let mut input = capm_company();
    input.forensic = Some(ForensicQuery {
        missing: Instrument::Equity,
        basis: Basis::Book,
        target_wacc: dec!(0.0855),
    });
    let out = compute_wacc(&input).unwrap().result;
    let forensic = out.forensic.unwrap();
    assert_eq!(forensic.result.solved_cost(), Some(dec!(0.1025)));
    assert_eq!(forensic.result.basis(), Basis::Book);
}

#[test]
fn test_tiny_positive_price_is_an_error_not_a_crash() {
    let input = InstrumentInput::EquityDgm {
        last_dividend: dec!(1000),
        growth_rate: dec!(0.05),
        price: Decimal::new(1, 28),
    };
    assert!(matches!(
        cost_of_capital::calculate_cost(&input),
        Err(WaccError::Overflow { .. })
    ));
}

#[test]
fn test_forensic_tiny_weight_is_an_error_not_a_crash() {
    let costs = [dec!(0.1); 5];
    let weights = [dec!(0.25), dec!(0.25), dec!(0.25), dec!(0.25), Decimal::new(1, 28)];
    assert!(matches!(
        solve_missing_cost(&costs, &weights, dec!(10), 4, Basis::Market),
        Err(WaccError::Overflow { .. })
    ));
}

#[test]
fn test_output_serializes_optional_forensic_as_null() {
    let result = compute_wacc(&capm_company()).unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert!(json["result"]["forensic"].is_null());
    assert_eq!(json["result"]["costs"]["equity"]["status"], "computed");
    assert_eq!(json["metadata"]["precision"], "rust_decimal_128bit");
}

// ===========================================================================
// Properties
// ===========================================================================

fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000).prop_map(|x| Decimal::new(x, 2))
}

fn rate_strategy() -> impl Strategy<Value = Decimal> {
    (-2_000i64..3_000).prop_map(|x| Decimal::new(x, 4))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn test_weights_sum_to_one(amounts in prop::array::uniform5(amount_strategy())) {
        let weights = calculate_weights(&amounts).unwrap();
        let total: Decimal = amounts.iter().sum();
        let sum: Decimal = weights.iter().sum();
        if total.is_zero() {
            prop_assert!(weights.iter().all(|w| w.is_zero()));
        } else {
            prop_assert!((sum - Decimal::ONE).abs() < dec!(0.000000001), "sum = {}", sum);
        }
    }

    #[test]
    fn test_aggregator_is_weighted_sum(
        costs in prop::array::uniform5(rate_strategy()),
        amounts in prop::array::uniform5(amount_strategy()),
    ) {
        let weights = calculate_weights(&amounts).unwrap();
        let wacc = calculate_wacc(&costs, &weights).unwrap();
        let mut expected = Decimal::ZERO;
        for i in 0..5 {
            expected += costs[i] * weights[i];
        }
        prop_assert!((wacc - expected).abs() < dec!(0.000000001));
    }

    #[test]
    fn test_forensic_round_trip(
        costs in prop::array::uniform5(rate_strategy()),
        amounts in prop::array::uniform5(amount_strategy()),
    ) {
        let weights = calculate_weights(&amounts).unwrap();
        let target = calculate_wacc(&costs, &weights).unwrap();
        for k in 0..5 {
            let result = solve_missing_cost(&costs, &weights, target, k, Basis::Book).unwrap();
            if weights[k].is_zero() {
                let unsolvable = matches!(result, ForensicResult::ZeroWeightUnsolvable { .. });
                prop_assert!(unsolvable);
            } else {
                let solved = result.solved_cost().unwrap();
                prop_assert!(
                    (solved - costs[k]).abs() < dec!(0.000000001),
                    "slot {}: expected {}, got {}", k, costs[k], solved
                );
            }
        }
    }
}
