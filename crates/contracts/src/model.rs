//! SignalModel trait - generator capability consumed by the scheduler

use crate::{GenerationParameters, SensorSample};

/// Signal generator
///
/// A pure function of elapsed time plus the model's own state. Implementations
/// are chosen once at construction; the scheduler never switches them.
///
/// # Example
///
/// ```ignore
/// let mut model = SignalGenerator::from_config(&config)?;
/// let sample = model.generate_next(0.12);
/// model.reset();
/// ```
pub trait SignalModel: Send {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Produce the next sample for the given session time
    fn generate_next(&mut self, elapsed_seconds: f64) -> SensorSample;

    /// Restore the initial numeric state
    ///
    /// The configured mode is preserved unless it was randomized at construction.
    fn reset(&mut self);

    /// Replace generation parameters
    fn configure(&mut self, parameters: GenerationParameters);
}

impl<M: SignalModel + ?Sized> SignalModel for Box<M> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn generate_next(&mut self, elapsed_seconds: f64) -> SensorSample {
        (**self).generate_next(elapsed_seconds)
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn configure(&mut self, parameters: GenerationParameters) {
        (**self).configure(parameters)
    }
}
