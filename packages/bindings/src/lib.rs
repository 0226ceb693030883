use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use wacc_core::forensic::ForensicResult;
use wacc_core::Basis;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_wacc(input_json: String) -> NapiResult<String> {
    let input: wacc_core::pipeline::WaccInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = wacc_core::pipeline::compute_wacc(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Building blocks
// ---------------------------------------------------------------------------

#[napi]
pub fn cost_of_capital(input_json: String) -> NapiResult<String> {
    let input: wacc_core::cost_of_capital::InstrumentInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = wacc_core::cost_of_capital::calculate_cost(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn calculate_weights(amounts_json: String) -> NapiResult<String> {
    let amounts: Vec<Decimal> = serde_json::from_str(&amounts_json).map_err(to_napi_error)?;
    if amounts.iter().any(|a| *a < Decimal::ZERO) {
        return Err(to_napi_error("Financing amounts cannot be negative"));
    }
    let weights = wacc_core::weighting::calculate_weights(&amounts).map_err(to_napi_error)?;
    serde_json::to_string(&weights).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct ForensicRequest {
    costs: Vec<Decimal>,
    weights: Vec<Decimal>,
    missing_index: usize,
    target_wacc: Decimal,
    #[serde(default)]
    basis: Basis,
}

/// Returns the tagged forensic result; an unsolvable query is a normal
/// `{"status": "zero_weight_unsolvable"}` value, not a thrown error.
#[napi]
pub fn solve_forensic(request_json: String) -> NapiResult<String> {
    let req: ForensicRequest = serde_json::from_str(&request_json).map_err(to_napi_error)?;
    let result: ForensicResult = wacc_core::forensic::solve_missing_cost(
        &req.costs,
        &req.weights,
        req.target_wacc,
        req.missing_index,
        req.basis,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&result).map_err(to_napi_error)
}
