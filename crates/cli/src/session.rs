//! Emitter session - wires model, connection and scheduler for one `run`.

use std::future::Future;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{Connection, EmitterBlueprint, SignalModel};
use signal_models::SignalGenerator;
use streamer::{SchedulerConfig, SessionSnapshot, StreamScheduler, WebSocketConnection};
use tracing::{info, warn};

use crate::error::CliError;

/// One streaming session
#[derive(Debug, Clone)]
pub struct EmitterSession {
    blueprint: EmitterBlueprint,
}

impl EmitterSession {
    pub fn new(blueprint: EmitterBlueprint) -> Self {
        Self { blueprint }
    }

    /// Stream over WebSocket until `shutdown` resolves or `limit` elapses
    pub async fn run<F>(self, shutdown: F, limit: Option<Duration>) -> Result<SessionStats>
    where
        F: Future<Output = ()>,
    {
        self.run_with(WebSocketConnection::new(), shutdown, limit)
            .await
    }

    /// Same as `run` over any connection
    pub async fn run_with<C, F>(
        self,
        connection: C,
        shutdown: F,
        limit: Option<Duration>,
    ) -> Result<SessionStats>
    where
        C: Connection + 'static,
        F: Future<Output = ()>,
    {
        let started = Instant::now();
        let blueprint = self.blueprint;

        let model = SignalGenerator::from_config(&blueprint.model);
        let model_name = model.name();
        let scheduler = StreamScheduler::new(
            connection,
            model,
            SchedulerConfig::from(&blueprint.stream),
        );

        info!(address = %blueprint.endpoint.address, "Connecting...");
        scheduler
            .connect(
                &blueprint.endpoint.address,
                blueprint.endpoint.credential.as_deref(),
            )
            .await
            .map_err(CliError::from)
            .with_context(|| format!("Failed to connect to {}", blueprint.endpoint.address))?;

        scheduler
            .start_emitting()
            .await
            .map_err(CliError::from)
            .context("Failed to start emission")?;

        let deadline = async {
            match limit {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = shutdown => {
                warn!("Received shutdown signal, stopping emitter...");
            }
            _ = deadline => {
                info!(limit_secs = limit.map(|d| d.as_secs_f64()), "Duration reached, stopping emitter...");
            }
        }

        scheduler
            .shutdown()
            .await
            .map_err(CliError::from)
            .context("Failed to stop emitter cleanly")?;

        Ok(SessionStats {
            address: blueprint.endpoint.address,
            model: model_name,
            duration: started.elapsed(),
            metrics: scheduler.metrics(),
        })
    }
}

/// Statistics from a session
#[derive(Debug, Clone)]
pub struct SessionStats {
    pub address: String,
    pub model: &'static str,
    pub duration: Duration,
    pub metrics: SessionSnapshot,
}

impl SessionStats {
    /// Envelopes delivered per second
    pub fn rate(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.metrics.sent as f64 / secs
        } else {
            0.0
        }
    }

    /// Send failure percentage
    pub fn failure_rate(&self) -> f64 {
        let attempts = self.metrics.sent + self.metrics.send_failures;
        if attempts > 0 {
            self.metrics.send_failures as f64 / attempts as f64 * 100.0
        } else {
            0.0
        }
    }

    pub fn print_summary(&self) {
        println!("\n=== Session Statistics ===\n");
        println!("  Endpoint: {}", self.address);
        println!("  Model: {}", self.model);
        println!("  Duration: {:.2}s", self.duration.as_secs_f64());
        println!("  Ticks: {}", self.metrics.ticks);
        println!("  Sent: {} ({:.2}/s)", self.metrics.sent, self.rate());
        println!(
            "  Send failures: {} ({:.2}%)",
            self.metrics.send_failures,
            self.failure_rate()
        );
        if self.metrics.encode_failures > 0 {
            println!("  Encode failures: {}", self.metrics.encode_failures);
        }
        println!();
    }
}
