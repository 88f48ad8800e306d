//! Clinical CTG simulator
//!
//! A stateful tick-based model: uterine contractions drive heart rate
//! decelerations, and an optional hypoxia progression moves the heart rate
//! baseline through tachycardia, a drop, and a depressed plateau.
//!
//! The simulator advances exactly one virtual tick per `generate_next` call.

use std::f64::consts::PI;

use contracts::{GenerationParameters, HypoxiaSetting, SensorSample, SignalModel};
use tracing::{debug, info, trace};

use crate::random::RandomSource;

/// Virtual tick length (seconds)
pub const TICK_SECONDS: f64 = 0.12;

/// Resting uterine tone
pub const UTERINE_BASELINE: f64 = 15.0;
/// Idle tone band
pub const IDLE_BAND: (f64, f64) = (13.5, 16.5);
const IDLE_DRIFT: f64 = 0.3;
const EXIT_JITTER: f64 = 0.3;

/// Tone above which a contraction affects heart rate and spasms
pub const CONTRACTION_THRESHOLD: f64 = 25.0;
const CONTRACTION_START_PROBABILITY: f64 = 0.0008;
const CONTRACTION_DURATION: (f64, f64) = (150.0, 250.0);
const CONTRACTION_INTENSITY: (f64, f64) = (30.0, 36.0);

const HEALTHY_BASELINE: f64 = 140.0;
const HEALTHY_SPREAD: f64 = 4.5;

/// Hypoxia step at which the baseline starts dropping
pub const HYPOXIA_DROP_STEP: u64 = 2500;
/// Hypoxia step at which the depressed plateau begins
pub const HYPOXIA_DEPRESSED_STEP: u64 = 5000;
const HYPOXIA_LOW_VARIABILITY_STEP: u64 = 6000;
const TACHYCARDIA_RANGE: (f64, f64) = (150.0, 165.0);
const DEPRESSED_BASELINE: f64 = 110.0;
const DEPRESSED_FLOOR: f64 = 100.0;
const DEPRESSED_SLOPE: f64 = 0.004;
const HYPOXIA_SPREAD: f64 = 6.0;
const HYPOXIA_LATE_SPREAD: f64 = 1.5;

const MILD_DECELERATION: (f64, f64) = (2.0, 8.0);
const SEVERE_DECELERATION: (f64, f64) = (15.0, 30.0);

/// Heart rate clamp (bpm)
pub const HEART_RATE_RANGE: (f64, f64) = (60.0, 200.0);
/// Tone and spasm clamp
pub const ACTIVITY_RANGE: (f64, f64) = (0.0, 100.0);

const SPASM_BASELINE: f64 = 20.0;
const SPASM_GAIN: f64 = 8.0;
const SPASM_IDLE_JITTER: f64 = 1.0;

/// How hypoxia is decided
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HypoxiaMode {
    /// Rolled once at the first tick
    Random { probability: f64 },
    Enabled,
    Disabled,
}

impl Default for HypoxiaMode {
    fn default() -> Self {
        Self::Random { probability: 0.5 }
    }
}

impl HypoxiaMode {
    pub fn from_setting(setting: HypoxiaSetting, probability: f64) -> Self {
        match setting {
            HypoxiaSetting::Random => Self::Random { probability },
            HypoxiaSetting::Enabled => Self::Enabled,
            HypoxiaSetting::Disabled => Self::Disabled,
        }
    }
}

/// Contraction sub-state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Contraction {
    #[default]
    Idle,
    Active {
        /// Progress in [0, 1]
        phase: f64,
        duration: f64,
        intensity: f64,
        /// Tone at onset
        baseline: f64,
    },
}

impl Contraction {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }
}

/// Hypoxia sub-state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HypoxiaState {
    /// `None` until the first tick
    pub decided: Option<bool>,
    /// Ticks spent hypoxic
    pub step_count: u64,
}

/// Full simulator state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatorState {
    pub elapsed_ticks: u64,
    pub contraction: Contraction,
    pub hypoxia: HypoxiaState,
    pub uterine_tone: f64,
}

impl SimulatorState {
    fn initial(uterine_tone: f64) -> Self {
        Self {
            elapsed_ticks: 0,
            contraction: Contraction::Idle,
            hypoxia: HypoxiaState::default(),
            uterine_tone,
        }
    }
}

/// Clinical CTG simulator
#[derive(Debug, Clone)]
pub struct CtgSimulator {
    mode: HypoxiaMode,
    idle_baseline: f64,
    state: SimulatorState,
    rng: RandomSource,
}

impl CtgSimulator {
    pub fn new(mode: HypoxiaMode, rng: RandomSource) -> Self {
        Self {
            mode,
            idle_baseline: UTERINE_BASELINE,
            state: SimulatorState::initial(UTERINE_BASELINE),
            rng,
        }
    }

    pub fn mode(&self) -> HypoxiaMode {
        self.mode
    }

    pub fn state(&self) -> &SimulatorState {
        &self.state
    }

    /// Hypoxia decision, `None` before the first tick
    pub fn hypoxia_enabled(&self) -> Option<bool> {
        self.state.hypoxia.decided
    }

    fn decide_hypoxia(&mut self) -> bool {
        if let Some(decided) = self.state.hypoxia.decided {
            return decided;
        }

        let decided = match self.mode {
            HypoxiaMode::Enabled => true,
            HypoxiaMode::Disabled => false,
            HypoxiaMode::Random { probability } => self.rng.chance(probability),
        };
        info!(hypoxia = decided, mode = ?self.mode, "hypoxia decided");
        self.state.hypoxia.decided = Some(decided);
        decided
    }

    fn advance_contraction(&mut self) {
        let (band_low, band_high) = IDLE_BAND;

        match self.state.contraction {
            Contraction::Idle => {
                if self.rng.chance(CONTRACTION_START_PROBABILITY) {
                    let duration = self.rng.uniform(CONTRACTION_DURATION.0, CONTRACTION_DURATION.1);
                    let intensity = self.rng.uniform(CONTRACTION_INTENSITY.0, CONTRACTION_INTENSITY.1);
                    debug!(
                        tick = self.state.elapsed_ticks,
                        duration, intensity, "contraction started"
                    );
                    self.state.contraction = Contraction::Active {
                        phase: 0.0,
                        duration,
                        intensity,
                        baseline: self.state.uterine_tone,
                    };
                } else {
                    let drift = self.rng.uniform(-IDLE_DRIFT, IDLE_DRIFT);
                    self.state.uterine_tone =
                        (self.state.uterine_tone + drift).clamp(band_low, band_high);
                }
            }
            Contraction::Active {
                phase,
                duration,
                intensity,
                baseline,
            } => {
                let phase = phase + TICK_SECONDS / duration;
                if phase > 1.0 {
                    let jitter = self.rng.uniform(-EXIT_JITTER, EXIT_JITTER);
                    self.state.uterine_tone = (baseline + jitter).clamp(band_low, band_high);
                    self.state.contraction = Contraction::Idle;
                    debug!(tick = self.state.elapsed_ticks, "contraction ended");
                } else {
                    let shape = (PI * phase.powf(0.6)).sin();
                    self.state.uterine_tone = baseline + shape * (intensity - baseline);
                    self.state.contraction = Contraction::Active {
                        phase,
                        duration,
                        intensity,
                        baseline,
                    };
                }
            }
        }

        self.state.uterine_tone = self
            .state
            .uterine_tone
            .clamp(ACTIVITY_RANGE.0, ACTIVITY_RANGE.1);
    }

    fn heart_rate(&mut self, hypoxic: bool, tone: f64) -> f64 {
        let steps = self.state.hypoxia.step_count;
        let (baseline, spread) = if hypoxic {
            let spread = if steps < HYPOXIA_LOW_VARIABILITY_STEP {
                HYPOXIA_SPREAD
            } else {
                HYPOXIA_LATE_SPREAD
            };
            (hypoxia_baseline(steps), spread)
        } else {
            (HEALTHY_BASELINE, HEALTHY_SPREAD)
        };

        let mut heart_rate = baseline + self.rng.uniform(-spread, spread);

        if tone > CONTRACTION_THRESHOLD {
            let (low, high) = if hypoxic && steps >= HYPOXIA_DROP_STEP {
                SEVERE_DECELERATION
            } else {
                MILD_DECELERATION
            };
            heart_rate -= self.rng.uniform(low, high);
        }

        heart_rate.clamp(HEART_RATE_RANGE.0, HEART_RATE_RANGE.1)
    }

    fn spasm_activity(&mut self, tone: f64) -> f64 {
        let value = if self.state.contraction.is_active() && tone > CONTRACTION_THRESHOLD {
            SPASM_BASELINE + (tone - CONTRACTION_THRESHOLD) * SPASM_GAIN
        } else {
            SPASM_BASELINE + self.rng.signed_unit() * SPASM_IDLE_JITTER
        };
        value.clamp(ACTIVITY_RANGE.0, ACTIVITY_RANGE.1)
    }
}

/// Heart rate baseline after `steps` hypoxic ticks
pub fn hypoxia_baseline(steps: u64) -> f64 {
    let (tachy_start, tachy_peak) = TACHYCARDIA_RANGE;

    if steps < HYPOXIA_DROP_STEP {
        let progress = steps as f64 / HYPOXIA_DROP_STEP as f64;
        tachy_start + (tachy_peak - tachy_start) * progress
    } else if steps < HYPOXIA_DEPRESSED_STEP {
        let progress = (steps - HYPOXIA_DROP_STEP) as f64
            / (HYPOXIA_DEPRESSED_STEP - HYPOXIA_DROP_STEP) as f64;
        tachy_peak - (tachy_peak - DEPRESSED_BASELINE) * progress
    } else {
        let decline = DEPRESSED_SLOPE * (steps - HYPOXIA_DEPRESSED_STEP) as f64;
        (DEPRESSED_BASELINE - decline).max(DEPRESSED_FLOOR)
    }
}

impl SignalModel for CtgSimulator {
    fn name(&self) -> &'static str {
        "ctg"
    }

    fn generate_next(&mut self, elapsed_seconds: f64) -> SensorSample {
        let hypoxic = self.decide_hypoxia();

        self.advance_contraction();
        let tone = self.state.uterine_tone;
        let heart_rate = self.heart_rate(hypoxic, tone);
        let spasm_activity = self.spasm_activity(tone);

        self.state.elapsed_ticks += 1;
        if hypoxic {
            self.state.hypoxia.step_count += 1;
        }

        trace!(
            elapsed_seconds,
            tick = self.state.elapsed_ticks,
            heart_rate,
            tone,
            "ctg tick"
        );

        SensorSample::new(heart_rate, tone, spasm_activity)
    }

    fn reset(&mut self) {
        let decided = match self.mode {
            HypoxiaMode::Random { .. } => None,
            HypoxiaMode::Enabled | HypoxiaMode::Disabled => self.state.hypoxia.decided,
        };
        self.state = SimulatorState::initial(self.idle_baseline);
        self.state.hypoxia.decided = decided;
        self.rng.reroll();
    }

    fn configure(&mut self, parameters: GenerationParameters) {
        let base = parameters.uterine_tone.base;
        if (IDLE_BAND.0..=IDLE_BAND.1).contains(&base) {
            self.idle_baseline = base;
        } else {
            debug!(base, "uterine base outside idle band, keeping clinical baseline");
        }
    }
}
