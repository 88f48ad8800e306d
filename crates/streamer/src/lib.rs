//! # Streamer
//!
//! Periodic emission of generated samples over a persistent connection.
//!
//! Responsibilities:
//! - Own the connection lifecycle (connect / disconnect)
//! - Run one cancellable emission task per session
//! - Encode samples into JSON envelopes
//! - Absorb per-tick send failures without stopping the stream

pub mod encoding;
pub mod error;
pub mod metrics;
pub mod scheduler;
pub mod websocket;

pub use contracts::{Connection, Envelope, SignalModel};
pub use encoding::{decode_envelope, encode_envelope};
pub use error::StreamerError;
pub use metrics::{SessionMetrics, SessionSnapshot};
pub use scheduler::{SchedulerConfig, StreamScheduler};
pub use websocket::{WebSocketConnection, SENSOR_TOKEN_HEADER};
