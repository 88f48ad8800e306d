//! Parametric sinusoidal model
//!
//! Each channel is `base + amplitude * trig(2π * frequency * t)` plus bounded
//! noise and occasional sensor artifacts.

use std::f64::consts::TAU;

use contracts::{ChannelParameters, GenerationParameters, SensorSample, SignalModel};

use crate::random::RandomSource;

/// Output channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    HeartRate,
    UterineTone,
    SpasmActivity,
}

impl Channel {
    fn wave(self, angle: f64) -> f64 {
        match self {
            Self::UterineTone => angle.cos(),
            Self::HeartRate | Self::SpasmActivity => angle.sin(),
        }
    }

    /// Per-tick artifact probability and spike size (fraction of amplitude)
    fn artifact(self) -> (f64, f64) {
        match self {
            Self::HeartRate => (0.02, 0.3),
            Self::UterineTone => (0.01, 0.5),
            Self::SpasmActivity => (0.015, 0.4),
        }
    }

    fn parameters(self, params: &GenerationParameters) -> ChannelParameters {
        match self {
            Self::HeartRate => params.heart_rate,
            Self::UterineTone => params.uterine_tone,
            Self::SpasmActivity => params.spasm_activity,
        }
    }
}

/// Sine/cosine signal model
#[derive(Debug, Clone)]
pub struct SinusoidalModel {
    params: GenerationParameters,
    rng: RandomSource,
}

impl SinusoidalModel {
    pub fn new(params: GenerationParameters, rng: RandomSource) -> Self {
        Self {
            params: params.sanitized(),
            rng,
        }
    }

    pub fn parameters(&self) -> &GenerationParameters {
        &self.params
    }

    /// Noise-free channel value at `t`
    pub fn waveform(params: &ChannelParameters, channel: Channel, t: f64) -> f64 {
        params.base + params.amplitude * channel.wave(TAU * params.frequency * t)
    }

    /// Channel value at `t` including noise and artifacts (not floored)
    pub fn channel_value(&mut self, channel: Channel, t: f64) -> f64 {
        let params = channel.parameters(&self.params);
        let mut value = Self::waveform(&params, channel, t);

        let noise_level = self.params.noise_level;
        if noise_level > 0.0 {
            value += self.rng.signed_unit() * noise_level * params.amplitude;

            let (probability, scale) = channel.artifact();
            if self.rng.chance(probability) {
                value += self.rng.signed_unit() * scale * params.amplitude;
            }
        }

        value
    }
}

impl SignalModel for SinusoidalModel {
    fn name(&self) -> &'static str {
        "sinusoidal"
    }

    fn generate_next(&mut self, elapsed_seconds: f64) -> SensorSample {
        SensorSample::new(
            self.channel_value(Channel::HeartRate, elapsed_seconds),
            self.channel_value(Channel::UterineTone, elapsed_seconds),
            self.channel_value(Channel::SpasmActivity, elapsed_seconds),
        )
        .floored()
    }

    fn reset(&mut self) {
        self.rng.reroll();
    }

    fn configure(&mut self, parameters: GenerationParameters) {
        self.params = parameters.sanitized();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet() -> SinusoidalModel {
        SinusoidalModel::new(
            GenerationParameters::default().without_noise(),
            RandomSource::seeded(3),
        )
    }

    #[test]
    fn test_noise_free_tracks_formula() {
        let mut model = quiet();
        let p = GenerationParameters::default();

        for step in 0..200 {
            let t = step as f64 * 0.12;
            let sample = model.generate_next(t);
            let hr = (80.0 + 20.0 * (TAU * 0.5 * t).sin()).max(0.0);
            let ut = (67.0 + 60.0 * (TAU * 0.3 * t).cos()).max(0.0);
            let sp = (45.0 + 35.0 * (TAU * 0.4 * t).sin()).max(0.0);

            assert_eq!(sample.heart_rate, hr);
            assert_eq!(sample.uterine_tone, ut);
            assert_eq!(sample.spasm_activity, sp);
            assert_eq!(
                sample.heart_rate,
                SinusoidalModel::waveform(&p.heart_rate, Channel::HeartRate, t).max(0.0)
            );
        }
    }

    #[test]
    fn test_noisy_values_stay_bounded() {
        let mut model = SinusoidalModel::new(GenerationParameters::default(), RandomSource::seeded(8));

        for step in 0..5000 {
            let sample = model.generate_next(step as f64 * 0.12);
            assert!(sample.is_well_formed());
            // base 80, amplitude 20, noise 0.05·20, artifact 0.3·20
            assert!(sample.heart_rate <= 80.0 + 20.0 + 1.0 + 6.0);
            assert!(sample.heart_rate >= 80.0 - 20.0 - 1.0 - 6.0);
        }
    }

    #[test]
    fn test_outputs_floored_at_zero() {
        let params = GenerationParameters {
            heart_rate: ChannelParameters::new(0.0, 50.0, 1.0),
            ..GenerationParameters::default()
        };
        let mut model = SinusoidalModel::new(params, RandomSource::seeded(4));

        for step in 0..100 {
            let sample = model.generate_next(step as f64 * 0.12);
            assert!(sample.heart_rate >= 0.0);
            assert!(sample.uterine_tone >= 0.0);
        }
    }

    #[test]
    fn test_reset_keeps_parameters() {
        let mut model = SinusoidalModel::new(GenerationParameters::default(), RandomSource::seeded(6));
        model.configure(GenerationParameters::default().without_noise());
        model.reset();

        assert_eq!(model.parameters().noise_level, 0.0);
        assert_eq!(model.generate_next(0.0).heart_rate, 80.0);
    }

    #[test]
    fn test_seeded_models_agree() {
        let mut a = SinusoidalModel::new(GenerationParameters::default(), RandomSource::seeded(21));
        let mut b = SinusoidalModel::new(GenerationParameters::default(), RandomSource::seeded(21));

        for step in 0..50 {
            let t = step as f64 * 0.12;
            assert_eq!(a.generate_next(t), b.generate_next(t));
        }
    }
}
