//! Command implementations.

mod preview;
mod run;
mod validate;

pub use preview::run_preview;
pub use run::run_emitter;
pub use validate::run_validate;

use std::path::Path;

use config_loader::ConfigLoader;
use contracts::{EmitterBlueprint, ModelKind};

use crate::error::CliError;

/// Load a blueprint, reporting a missing file distinctly
fn load_blueprint(path: &Path) -> Result<EmitterBlueprint, CliError> {
    if !path.exists() {
        return Err(CliError::config_not_found(path.display().to_string()));
    }
    Ok(ConfigLoader::load_from_path(path)?)
}

/// Apply `--model` / `--seed` overrides
fn override_model(blueprint: &mut EmitterBlueprint, model: Option<ModelKind>, seed: Option<u64>) {
    if let Some(kind) = model {
        tracing::info!(model = kind.as_str(), "Overriding model from CLI");
        blueprint.model.kind = kind;
    }
    if let Some(seed) = seed {
        tracing::info!(seed, "Overriding seed from CLI");
        blueprint.model.seed = Some(seed);
    }
}
