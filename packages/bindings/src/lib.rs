use mortgage_core::types::ComputationOutput;
use mortgage_core::MortgageResult;
use napi::Result as NapiResult;
use napi_derive::napi;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Parse `input_json`, run `compute`, and serialise the envelope back to JSON.
fn run_json<I, O>(
    input_json: &str,
    compute: impl FnOnce(&I) -> MortgageResult<ComputationOutput<O>>,
) -> NapiResult<String>
where
    I: DeserializeOwned,
    O: Serialize,
{
    let input: I = serde_json::from_str(input_json).map_err(to_napi_error)?;
    let output = compute(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Payments and schedules
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_payment(input_json: String) -> NapiResult<String> {
    run_json(&input_json, mortgage_core::payment::compute_payment)
}

#[napi]
pub fn compute_schedule(input_json: String) -> NapiResult<String> {
    run_json(&input_json, mortgage_core::schedule::compute_schedule)
}

// ---------------------------------------------------------------------------
// Affordability
// ---------------------------------------------------------------------------

#[napi]
pub fn estimate_affordability(input_json: String) -> NapiResult<String> {
    run_json(
        &input_json,
        mortgage_core::affordability::estimate_affordability,
    )
}

// ---------------------------------------------------------------------------
// Comparison and rate quotes
// ---------------------------------------------------------------------------

#[napi]
pub fn compare_loans(input_json: String) -> NapiResult<String> {
    run_json(&input_json, mortgage_core::comparison::compute_comparison)
}

#[napi]
pub fn compare_quote(input_json: String) -> NapiResult<String> {
    run_json(&input_json, mortgage_core::rates::compute_quote_comparison)
}
