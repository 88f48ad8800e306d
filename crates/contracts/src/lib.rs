//! # Contracts
//!
//! Shared interface contracts for the CTG emitter workspace.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Time Model
//! - `elapsed_seconds` (f64) is measured from the start of a streaming session
//! - Generators that keep a virtual clock advance it per call, not per wall second

mod blueprint;
mod connection;
mod envelope;
mod error;
mod model;
mod sample;
mod sensor_id;

pub use blueprint::*;
pub use connection::{Connection, LocalConnection};
pub use envelope::*;
pub use error::*;
pub use model::SignalModel;
pub use sample::*;
pub use sensor_id::SensorId;
