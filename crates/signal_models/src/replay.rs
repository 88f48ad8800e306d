//! ReplayModel - 录制参考模式的插值回放
//!
//! 心率和子宫张力来自当前激活的 `ReferencePattern`；宫缩活动
//! 没有录制数据，使用正弦公式。没有模式库时
//! 所有通道都退回到正弦公式。

use std::path::Path;
use std::sync::Arc;

use contracts::{ChannelParameters, GenerationParameters, SensorSample, SignalModel};
use tracing::{debug, warn};

use crate::pattern::{ReferencePattern, Series};
use crate::random::RandomSource;
use crate::repository::{PatternRef, PatternRepository};
use crate::sinusoidal::{Channel, SinusoidalModel};

/// 回放参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplayConfig {
    /// 回放速度倍率 (1.0 = 原速)
    pub speed: f64,
    /// 抖动幅度，相对序列标准差的比例
    pub jitter_scale: f64,
    /// 每个 tick 切换模式的概率
    pub switch_probability: f64,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            jitter_scale: 0.1,
            switch_probability: 0.001,
        }
    }
}

/// 没有参考模式时使用的参数
pub fn fallback_parameters() -> GenerationParameters {
    GenerationParameters {
        heart_rate: ChannelParameters::new(140.0, 20.0, 0.02),
        uterine_tone: ChannelParameters::new(15.0, 10.0, 0.01),
        spasm_activity: ChannelParameters::new(20.0, 15.0, 0.015),
        noise_level: 0.05,
    }
}

/// 回放信号模型
#[derive(Debug, Clone)]
pub struct ReplayModel {
    repository: Option<Arc<PatternRepository>>,
    active: Option<PatternRef>,
    config: ReplayConfig,
    waveform: SinusoidalModel,
    rng: RandomSource,
}

impl ReplayModel {
    pub fn new(
        repository: Option<Arc<PatternRepository>>,
        config: ReplayConfig,
        mut rng: RandomSource,
    ) -> Self {
        let waveform = SinusoidalModel::new(fallback_parameters(), rng.fork());
        let mut model = Self {
            repository,
            active: None,
            config,
            waveform,
            rng,
        };
        model.select_pattern();
        model
    }

    /// 从 `root` 加载模式；任何加载失败都会让模型
    /// 使用正弦波形回退
    pub fn from_dir(
        root: Option<&Path>,
        max_per_pool: usize,
        config: ReplayConfig,
        rng: RandomSource,
    ) -> Self {
        let repository = root.and_then(|root| match PatternRepository::load(root, max_per_pool) {
            Ok(repo) => Some(Arc::new(repo)),
            Err(e) => {
                warn!(root = %root.display(), error = %e, "pattern load failed, using sinusoidal fallback");
                None
            }
        });
        Self::new(repository, config, rng)
    }

    pub fn has_repository(&self) -> bool {
        self.repository.is_some()
    }

    pub fn active_pattern(&self) -> Option<&ReferencePattern> {
        let repository = self.repository.as_deref()?;
        repository.get(self.active?)
    }

    fn select_pattern(&mut self) {
        let Some(repository) = self.repository.as_deref() else {
            return;
        };
        let picked = repository.choose(&mut self.rng);
        if let Some(pattern) = repository.get(picked) {
            debug!(pattern = %pattern.name, kind = %pattern.kind, "replay pattern selected");
        }
        self.active = Some(picked);
    }

    fn replay(&mut self, series_of: fn(&ReferencePattern) -> &Series, elapsed: f64) -> Option<f64> {
        let repository = self.repository.as_deref()?;
        let series = series_of(repository.get(self.active?)?);

        let jitter = series.stats().std_dev * self.config.jitter_scale;
        let value = series.value_at(elapsed, self.config.speed);
        Some(value + self.rng.signed_unit() * jitter)
    }
}

impl SignalModel for ReplayModel {
    fn name(&self) -> &'static str {
        "replay"
    }

    fn generate_next(&mut self, elapsed_seconds: f64) -> SensorSample {
        if self.repository.is_some() && self.rng.chance(self.config.switch_probability) {
            self.select_pattern();
        }

        if self.active.is_none() {
            return self.waveform.generate_next(elapsed_seconds);
        }

        let heart_rate = self
            .replay(|p| &p.heart_rate, elapsed_seconds)
            .unwrap_or_else(|| self.waveform.channel_value(Channel::HeartRate, elapsed_seconds));
        let uterine_tone = self
            .replay(|p| &p.uterine_tone, elapsed_seconds)
            .unwrap_or_else(|| self.waveform.channel_value(Channel::UterineTone, elapsed_seconds));
        let spasm_activity = self
            .waveform
            .channel_value(Channel::SpasmActivity, elapsed_seconds);

        SensorSample::new(heart_rate, uterine_tone, spasm_activity).floored()
    }

    fn reset(&mut self) {
        self.rng.reroll();
        self.waveform.reset();
        self.select_pattern();
    }

    fn configure(&mut self, parameters: GenerationParameters) {
        self.waveform.configure(parameters);
    }
}
