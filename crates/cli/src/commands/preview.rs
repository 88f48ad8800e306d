//! `preview` command implementation.

use anyhow::{Context, Result};
use contracts::{Envelope, SensorSample, SignalModel};
use observability::SignalStats;
use signal_models::SignalGenerator;
use tracing::info;

use super::{load_blueprint, override_model};
use crate::cli::PreviewArgs;

/// Execute the `preview` command
pub fn run_preview(args: &PreviewArgs) -> Result<()> {
    let mut blueprint = load_blueprint(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    override_model(&mut blueprint, args.model, args.seed);

    let mut generator = SignalGenerator::from_config(&blueprint.model);
    let cadence = blueprint.stream.cadence().as_secs_f64();

    info!(
        model = generator.name(),
        ticks = args.ticks,
        cadence_secs = cadence,
        "Generating preview"
    );

    let samples = generate(&mut generator, args.ticks, cadence);

    if args.json {
        for (elapsed, sample) in &samples {
            let envelope = Envelope::new(blueprint.stream.sensor_id.clone(), *elapsed, *sample);
            let line = serde_json::to_string(&envelope).context("Failed to encode envelope")?;
            println!("{line}");
        }
        return Ok(());
    }

    println!("{:>8}  {:>9}  {:>9}  {:>9}", "t (s)", "bpm", "uterus", "spasms");
    let mut stats = SignalStats::new();
    for (elapsed, sample) in &samples {
        println!(
            "{:>8.2}  {:>9.2}  {:>9.2}  {:>9.2}",
            elapsed, sample.heart_rate, sample.uterine_tone, sample.spasm_activity
        );
        stats.update(sample);
    }
    println!("\n{}", stats.summary());

    Ok(())
}

/// Generate `ticks` samples spaced one cadence apart, starting at one cadence
fn generate<M: SignalModel>(model: &mut M, ticks: u32, cadence: f64) -> Vec<(f64, SensorSample)> {
    (1..=ticks)
        .map(|tick| {
            let elapsed = f64::from(tick) * cadence;
            (elapsed, model.generate_next(elapsed))
        })
        .collect()
}
