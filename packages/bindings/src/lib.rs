use napi::Result as NapiResult;
use napi_derive::napi;

use retire_sim_core::simulation::{
    self, SimulationInput, SimulationRequest, DEFAULT_PROJECTION_YEARS, DEFAULT_SIMULATION_COUNT,
};
use retire_sim_core::{Language, ParameterModel};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// `runSimulation(inputs, projectionYears, simulationCount, language)`.
///
/// Takes the planning inputs as a JSON string and returns the
/// `SimulationResult` as a JSON string, without the per-path outcomes.
#[napi]
pub fn run_simulation(
    inputs_json: String,
    projection_years: Option<u32>,
    simulation_count: Option<u32>,
    language: Option<String>,
) -> NapiResult<String> {
    let inputs: SimulationInput = serde_json::from_str(&inputs_json).map_err(to_napi_error)?;
    let request = SimulationRequest {
        inputs,
        projection_years: projection_years.unwrap_or(DEFAULT_PROJECTION_YEARS),
        simulation_count: simulation_count.unwrap_or(DEFAULT_SIMULATION_COUNT),
        language: language.as_deref().map(Language::from_tag).unwrap_or_default(),
        ..SimulationRequest::default()
    };
    let output = simulation::simulate(&request).map_err(to_napi_error)?;
    serde_json::to_string(&output.result).map_err(to_napi_error)
}

/// Full request in, full computation envelope out.
#[napi]
pub fn simulate(request_json: String) -> NapiResult<String> {
    let request: SimulationRequest = serde_json::from_str(&request_json).map_err(to_napi_error)?;
    let output = simulation::simulate(&request).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Built-in asset and regime tables.
#[napi]
pub fn parameter_model() -> NapiResult<String> {
    serde_json::to_string(&ParameterModel::default()).map_err(to_napi_error)
}
