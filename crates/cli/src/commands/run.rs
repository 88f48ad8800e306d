//! `run` command implementation.

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::EmitterBlueprint;
use std::time::Duration;
use tracing::{error, info, warn};

use super::{load_blueprint, override_model};
use crate::cli::RunArgs;
use crate::error::CliError;
use crate::session::EmitterSession;

/// Execute the `run` command
pub async fn run_emitter(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    let mut blueprint = load_blueprint(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    apply_overrides(&mut blueprint, args);
    ConfigLoader::validate(&blueprint)
        .map_err(CliError::from)
        .context("Configuration invalid after CLI overrides")?;

    for warning in config_loader::warnings(&blueprint) {
        warn!(%warning, "Configuration warning");
    }

    info!(
        address = %blueprint.endpoint.address,
        model = blueprint.model.kind.as_str(),
        cadence_ms = blueprint.stream.cadence_ms,
        sensor_id = %blueprint.stream.sensor_id,
        "Configuration loaded"
    );

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
        info!("Metrics endpoint available on port {}", args.metrics_port);
    }

    let duration = (args.duration_secs != 0).then(|| Duration::from_secs(args.duration_secs));

    let stats = EmitterSession::new(blueprint)
        .run(shutdown_signal(), duration)
        .await
        .context("Streaming session failed")?;

    stats.print_summary();
    info!("CTG emitter finished");
    Ok(())
}

/// Apply CLI overrides on top of the loaded blueprint
fn apply_overrides(blueprint: &mut EmitterBlueprint, args: &RunArgs) {
    if let Some(ref address) = args.address {
        info!(address = %address, "Overriding endpoint address from CLI");
        blueprint.endpoint.address = address.clone();
    }
    if let Some(ref credential) = args.credential {
        info!("Overriding endpoint credential from CLI");
        blueprint.endpoint.credential = Some(credential.clone());
    }
    if let Some(cadence_ms) = args.cadence_ms {
        info!(cadence_ms, "Overriding cadence from CLI");
        blueprint.stream.cadence_ms = cadence_ms;
    }
    override_model(blueprint, args.model, args.seed);
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::ModelKind;
    use std::path::PathBuf;

    fn args() -> RunArgs {
        RunArgs {
            config: PathBuf::from("unused.toml"),
            address: Some("ws://override:9/ws".to_string()),
            credential: Some("secret".to_string()),
            cadence_ms: Some(250),
            model: Some(ModelKind::Sinusoidal),
            seed: Some(3),
            duration_secs: 0,
            metrics_port: 0,
        }
    }

    #[test]
    fn test_apply_overrides() {
        let raw = r#"{ "endpoint": { "address": "ws://localhost:8080/ws" } }"#;
        let mut blueprint = ConfigLoader::load_from_str(raw, config_loader::ConfigFormat::Json).unwrap();

        apply_overrides(&mut blueprint, &args());

        assert_eq!(blueprint.endpoint.address, "ws://override:9/ws");
        assert_eq!(blueprint.endpoint.credential.as_deref(), Some("secret"));
        assert_eq!(blueprint.stream.cadence_ms, 250);
        assert_eq!(blueprint.model.kind, ModelKind::Sinusoidal);
        assert_eq!(blueprint.model.seed, Some(3));
        assert!(ConfigLoader::validate(&blueprint).is_ok());
    }

    #[test]
    fn test_invalid_override_caught() {
        let raw = r#"{ "endpoint": { "address": "ws://localhost:8080/ws" } }"#;
        let mut blueprint = ConfigLoader::load_from_str(raw, config_loader::ConfigFormat::Json).unwrap();

        let mut bad = args();
        bad.address = Some("http://wrong".to_string());
        apply_overrides(&mut blueprint, &bad);

        assert!(ConfigLoader::validate(&blueprint).is_err());
    }
}
