//! StreamScheduler - connection lifecycle plus one periodic emission task
//!
//! ```text
//! connect ──► start_emitting ──► [tick: generate → encode → send] ──► stop_emitting
//!                                  ▲                               │
//!                                  └────────── every cadence ◄──────┘
//! ```
//!
//! Lifecycle operations are serialized by one async mutex. The connection and
//! model are shared only with the running emission task.

use std::sync::Arc;
use std::time::Duration;

use contracts::{
    Connection, ContractError, Envelope, SensorId, SignalModel, StreamConfig, DEFAULT_CADENCE_MS,
};
use observability::metrics as obs;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, instrument, trace};

use crate::encoding::encode_envelope;
use crate::error::StreamerError;
use crate::metrics::{SessionMetrics, SessionSnapshot};

/// Scheduler settings
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Identifier stamped on every envelope
    pub sensor_id: SensorId,
    /// Tick period
    pub cadence: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            sensor_id: SensorId::default(),
            cadence: Duration::from_millis(DEFAULT_CADENCE_MS),
        }
    }
}

impl From<&StreamConfig> for SchedulerConfig {
    fn from(stream: &StreamConfig) -> Self {
        Self {
            sensor_id: stream.sensor_id.clone(),
            cadence: stream.cadence(),
        }
    }
}

/// Running emission task
struct Session {
    stop_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl Session {
    /// Signal the task and wait for it to exit
    async fn stop(self) -> Result<(), tokio::task::JoinError> {
        // Err means the task already exited and dropped its receiver
        let _ = self.stop_tx.send(());
        self.task.await
    }
}

/// Periodic sample emitter over a persistent connection
pub struct StreamScheduler<C, M> {
    session: Mutex<Option<Session>>,
    connection: Arc<Mutex<C>>,
    model: Arc<Mutex<M>>,
    config: SchedulerConfig,
    metrics: Arc<SessionMetrics>,
}

impl<C, M> StreamScheduler<C, M>
where
    C: Connection + 'static,
    M: SignalModel + 'static,
{
    pub fn new(connection: C, model: M, config: SchedulerConfig) -> Self {
        Self {
            session: Mutex::new(None),
            connection: Arc::new(Mutex::new(connection)),
            model: Arc::new(Mutex::new(model)),
            config,
            metrics: Arc::new(SessionMetrics::new()),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Shared handle to the signal model
    pub fn model(&self) -> &Arc<Mutex<M>> {
        &self.model
    }

    /// Open the connection
    ///
    /// # Errors
    /// - `AlreadyConnected` if a live connection exists
    /// - `Connection` if the dial fails (not retried)
    #[instrument(name = "scheduler_connect", skip(self, credential))]
    pub async fn connect(&self, address: &str, credential: Option<&str>) -> Result<(), StreamerError> {
        let _session = self.session.lock().await;
        let mut connection = self.connection.lock().await;

        if connection.is_connected() {
            return Err(ContractError::AlreadyConnected.into());
        }

        connection.dial(address, credential).await?;
        info!(address, "Connected");
        Ok(())
    }

    /// Close the connection
    ///
    /// A running emission task keeps ticking and logs send failures until
    /// `stop_emitting` is called.
    ///
    /// # Errors
    /// `NotConnected` when no live connection exists
    #[instrument(name = "scheduler_disconnect", skip(self))]
    pub async fn disconnect(&self) -> Result<(), StreamerError> {
        let _session = self.session.lock().await;
        let mut connection = self.connection.lock().await;

        if !connection.is_connected() {
            return Err(ContractError::NotConnected.into());
        }

        connection.close().await?;
        info!("Disconnected");
        Ok(())
    }

    /// Start the emission task, replacing a running one
    ///
    /// # Errors
    /// `NotConnected` when no live connection exists
    #[instrument(name = "scheduler_start", skip(self))]
    pub async fn start_emitting(&self) -> Result<(), StreamerError> {
        let mut session = self.session.lock().await;

        if !self.connection.lock().await.is_connected() {
            return Err(ContractError::NotConnected.into());
        }

        if let Some(previous) = session.take() {
            debug!("Restarting emission, stopping previous task");
            if let Err(e) = previous.stop().await {
                error!(error = %e, "Previous emission task failed");
            }
        }

        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(emission_loop(
            Arc::clone(&self.connection),
            Arc::clone(&self.model),
            self.config.clone(),
            Arc::clone(&self.metrics),
            stop_rx,
        ));
        *session = Some(Session { stop_tx, task });

        self.metrics.inc_sessions();
        let model_name = self.model.lock().await.name();
        obs::record_session_started(model_name);
        info!(
            model = model_name,
            cadence_ms = self.config.cadence.as_millis() as u64,
            sensor_id = %self.config.sensor_id,
            "Emission started"
        );
        Ok(())
    }

    /// Stop the emission task and wait for it to exit; no-op when idle
    ///
    /// # Errors
    /// `Task` if the emission task panicked
    #[instrument(name = "scheduler_stop", skip(self))]
    pub async fn stop_emitting(&self) -> Result<(), StreamerError> {
        let mut session = self.session.lock().await;

        let Some(running) = session.take() else {
            debug!("Stop requested while idle");
            return Ok(());
        };

        running.stop().await?;
        obs::record_session_stopped();
        info!(ticks = self.metrics.ticks(), "Emission stopped");
        Ok(())
    }

    pub async fn is_connected(&self) -> bool {
        self.connection.lock().await.is_connected()
    }

    pub async fn is_emitting(&self) -> bool {
        self.session
            .lock()
            .await
            .as_ref()
            .is_some_and(|s| !s.task.is_finished())
    }

    pub fn metrics(&self) -> SessionSnapshot {
        self.metrics.snapshot()
    }

    /// Stop emitting and close the connection if open
    #[instrument(name = "scheduler_shutdown", skip(self))]
    pub async fn shutdown(&self) -> Result<(), StreamerError> {
        self.stop_emitting().await?;
        if self.is_connected().await {
            self.disconnect().await?;
        }
        Ok(())
    }
}

/// Emission task body
#[instrument(
    name = "emission_loop",
    skip_all,
    fields(sensor_id = %config.sensor_id)
)]
async fn emission_loop<C, M>(
    connection: Arc<Mutex<C>>,
    model: Arc<Mutex<M>>,
    config: SchedulerConfig,
    metrics: Arc<SessionMetrics>,
    mut stop_rx: oneshot::Receiver<()>,
) where
    C: Connection,
    M: SignalModel,
{
    let started = Instant::now();
    let mut ticker = interval_at(started + config.cadence, config.cadence);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    debug!("Emission loop started");

    loop {
        tokio::select! {
            biased;
            // Fires on stop() and on scheduler drop
            _ = &mut stop_rx => break,
            _ = ticker.tick() => {}
        }

        let elapsed = started.elapsed().as_secs_f64();
        emit_tick(&connection, &model, &config, &metrics, elapsed).await;
    }

    debug!("Emission loop stopped");
}

async fn emit_tick<C, M>(
    connection: &Mutex<C>,
    model: &Mutex<M>,
    config: &SchedulerConfig,
    metrics: &SessionMetrics,
    elapsed: f64,
) where
    C: Connection,
    M: SignalModel,
{
    let sample = model.lock().await.generate_next(elapsed);
    metrics.inc_ticks();
    obs::record_tick(&sample, elapsed);

    let envelope = Envelope::new(config.sensor_id.clone(), elapsed, sample);
    let payload = match encode_envelope(&envelope) {
        Ok(payload) => payload,
        Err(e) => {
            metrics.inc_encode_failures();
            obs::record_encode_failure();
            error!(elapsed, error = %e, "Encode failed, tick skipped");
            return;
        }
    };

    let bytes = payload.len();
    match connection.lock().await.send(payload).await {
        Ok(()) => {
            metrics.inc_sent();
            obs::record_send_success(bytes);
            trace!(elapsed, bytes, heart_rate = sample.heart_rate, "Sent");
        }
        Err(e) => {
            metrics.inc_send_failures();
            obs::record_send_failure();
            // Keep ticking; the stream is best-effort
            error!(elapsed, error = %e, "Send failed");
        }
    }
}
