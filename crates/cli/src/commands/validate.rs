//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use super::load_blueprint;
use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Debug, Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Debug, Serialize)]
struct ConfigSummary {
    version: String,
    address: String,
    has_credential: bool,
    sensor_id: String,
    cadence_ms: u64,
    model: String,
    seed: Option<u64>,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{json}");
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    match load_blueprint(&args.config) {
        Ok(blueprint) => {
            let warnings = config_loader::warnings(&blueprint);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    address: blueprint.endpoint.address.clone(),
                    has_credential: blueprint.endpoint.credential.is_some(),
                    sensor_id: blueprint.stream.sensor_id.to_string(),
                    cadence_ms: blueprint.stream.cadence_ms,
                    model: blueprint.model.kind.as_str().to_string(),
                    seed: blueprint.model.seed,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Endpoint: {}", summary.address);
            println!("  Credential: {}", if summary.has_credential { "set" } else { "none" });
            println!("  Sensor id: {}", summary.sensor_id);
            println!("  Cadence: {} ms", summary.cadence_ms);
            println!("  Model: {}", summary.model);
            if let Some(seed) = summary.seed {
                println!("  Seed: {seed}");
            }
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {warning}");
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {error}");
        }
    }
}
