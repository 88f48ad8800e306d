//! SignalGenerator - 根据配置选择的封闭模型集合

use contracts::{GenerationParameters, ModelConfig, ModelKind, SensorSample, SignalModel};
use tracing::info;

use crate::ctg::{CtgSimulator, HypoxiaMode};
use crate::random::RandomSource;
use crate::replay::{ReplayConfig, ReplayModel};
use crate::sinusoidal::SinusoidalModel;

/// 所有支持的信号模型
#[derive(Debug, Clone)]
pub enum SignalGenerator {
    Sinusoidal(SinusoidalModel),
    Replay(ReplayModel),
    Ctg(CtgSimulator),
}

impl SignalGenerator {
    /// 根据 `config` 构建模型
    ///
    /// 不会失败：无法加载模式的 replay 模型
    /// 会退回到正弦波形。
    pub fn from_config(config: &ModelConfig) -> Self {
        let rng = RandomSource::from_seed_option(config.seed);

        let mut generator = match config.kind {
            ModelKind::Sinusoidal => {
                Self::Sinusoidal(SinusoidalModel::new(GenerationParameters::default(), rng))
            }
            ModelKind::Replay => {
                let replay = ReplayConfig {
                    speed: config.replay_speed,
                    ..ReplayConfig::default()
                };
                Self::Replay(ReplayModel::from_dir(
                    config.pattern_dir.as_deref(),
                    config.max_patterns_per_pool,
                    replay,
                    rng,
                ))
            }
            ModelKind::Ctg => Self::Ctg(CtgSimulator::new(
                HypoxiaMode::from_setting(config.hypoxia, config.hypoxia_probability),
                rng,
            )),
        };

        if let Some(parameters) = config.parameters {
            generator.configure(parameters);
        }

        info!(
            model = generator.name(),
            seeded = config.seed.is_some(),
            "signal model ready"
        );
        generator
    }

    fn as_model(&mut self) -> &mut dyn SignalModel {
        match self {
            Self::Sinusoidal(model) => model,
            Self::Replay(model) => model,
            Self::Ctg(model) => model,
        }
    }
}

impl SignalModel for SignalGenerator {
    fn name(&self) -> &'static str {
        match self {
            Self::Sinusoidal(model) => model.name(),
            Self::Replay(model) => model.name(),
            Self::Ctg(model) => model.name(),
        }
    }

    fn generate_next(&mut self, elapsed_seconds: f64) -> SensorSample {
        self.as_model().generate_next(elapsed_seconds)
    }

    fn reset(&mut self) {
        self.as_model().reset()
    }

    fn configure(&mut self, parameters: GenerationParameters) {
        self.as_model().configure(parameters)
    }
}
