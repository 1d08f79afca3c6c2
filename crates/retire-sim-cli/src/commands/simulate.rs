use clap::Args;
use serde_json::Value;
use tracing::debug;

use retire_sim_core::simulation::{self, SimulationInput, SimulationRequest};
use retire_sim_core::Language;

use crate::input;

/// Arguments for a retirement simulation
#[derive(Args)]
pub struct SimulateArgs {
    /// Path to a JSON or YAML request. Either a full request
    /// (`inputs`, `projectionYears`, ...) or just the planning inputs.
    #[arg(long)]
    pub input: Option<String>,

    /// Projection horizon in years
    #[arg(long)]
    pub years: Option<u32>,

    /// Number of simulated paths
    #[arg(long)]
    pub simulations: Option<u32>,

    /// Recommendation language (en, he)
    #[arg(long)]
    pub language: Option<String>,

    /// Base seed for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,

    /// Keep every simulated path in the output
    #[arg(long)]
    pub include_paths: bool,
}

/// A document with an `inputs` object is a full request; anything else is
/// taken as the planning inputs alone.
fn to_request(data: Value) -> Result<SimulationRequest, Box<dyn std::error::Error>> {
    if data.get("inputs").is_some() {
        Ok(serde_json::from_value(data)?)
    } else {
        let inputs: SimulationInput = serde_json::from_value(data)?;
        Ok(SimulationRequest {
            inputs,
            ..SimulationRequest::default()
        })
    }
}

fn apply_overrides(request: &mut SimulationRequest, args: &SimulateArgs) {
    if let Some(years) = args.years {
        request.projection_years = years;
    }
    if let Some(count) = args.simulations {
        request.simulation_count = count;
    }
    if let Some(ref tag) = args.language {
        request.language = Language::from_tag(tag);
    }
    if args.seed.is_some() {
        request.seed = args.seed;
    }
    if args.include_paths {
        request.include_paths = true;
    }
}

pub fn run_simulate(args: SimulateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let data: Value = if let Some(ref path) = args.input {
        input::file::read_document(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input <request.json|yaml> or stdin required for simulate".into());
    };

    let mut request = to_request(data)?;
    apply_overrides(&mut request, &args);
    debug!(
        projection_years = request.projection_years,
        simulation_count = request.simulation_count,
        seed = ?request.seed,
        include_paths = request.include_paths,
        "resolved simulate request"
    );

    let result = simulation::simulate(&request)?;
    Ok(serde_json::to_value(result)?)
}
