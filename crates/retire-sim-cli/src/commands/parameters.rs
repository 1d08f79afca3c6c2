use clap::Args;
use serde_json::Value;

use retire_sim_core::ParameterModel;

use crate::input;

/// Arguments for printing the parameter model
#[derive(Args)]
pub struct ParametersArgs {
    /// Validate and print a custom model from a JSON or YAML file instead
    /// of the built-in tables
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_parameters(args: ParametersArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let model: ParameterModel = match args.input {
        Some(ref path) => serde_json::from_value(input::file::read_document(path)?)?,
        None => ParameterModel::default(),
    };
    model.validate()?;
    Ok(serde_json::to_value(model)?)
}
