//! # Signal Models
//!
//! Physiological signal generators behind the `SignalModel` contract.
//!
//! Responsibilities:
//! - Parametric sinusoidal channels with sensor artifacts
//! - Replay of recorded reference patterns (`PatternRepository`)
//! - Clinical CTG state machine (contractions, hypoxia progression)
//! - Closed `SignalGenerator` set selected once from `ModelConfig`
//!
//! All randomness flows through an injected `RandomSource`, so a fixed seed
//! reproduces a run exactly.

pub mod ctg;
pub mod error;
pub mod generator;
pub mod pattern;
pub mod random;
pub mod replay;
pub mod repository;
pub mod sinusoidal;

pub use contracts::{GenerationParameters, SensorSample, SignalModel};
pub use ctg::{Contraction, CtgSimulator, HypoxiaMode, HypoxiaState, SimulatorState};
pub use error::{ModelError, Result};
pub use generator::SignalGenerator;
pub use pattern::{PatternKind, ReferencePattern, Series, SeriesPoint, SeriesStats};
pub use random::RandomSource;
pub use replay::{ReplayConfig, ReplayModel};
pub use repository::{PatternRef, PatternRepository};
pub use sinusoidal::{Channel, SinusoidalModel};
