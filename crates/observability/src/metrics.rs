//! Emitter 指标收集模块
//!
//! 每个 tick 记录 Prometheus 指标，并提供会话结束时
//! 汇总用的内存统计。

use contracts::SensorSample;
use metrics::{counter, gauge, histogram};

/// 记录一个生成的样本
///
/// # Example
///
/// ```ignore
/// let sample = model.generate_next(elapsed);
/// observability::metrics::record_tick(&sample, elapsed);
/// ```
pub fn record_tick(sample: &SensorSample, elapsed_seconds: f64) {
    counter!("ctg_emitter_ticks_total").increment(1);
    gauge!("ctg_emitter_session_elapsed_seconds").set(elapsed_seconds);

    gauge!("ctg_emitter_heart_rate_bpm").set(sample.heart_rate);
    gauge!("ctg_emitter_uterine_tone").set(sample.uterine_tone);
    gauge!("ctg_emitter_spasm_activity").set(sample.spasm_activity);

    histogram!("ctg_emitter_heart_rate_bpm_hist").record(sample.heart_rate);
}

/// 记录一次成功发送的 envelope
pub fn record_send_success(bytes: usize) {
    counter!("ctg_emitter_envelopes_sent_total").increment(1);
    histogram!("ctg_emitter_envelope_bytes").record(bytes as f64);
}

/// 记录一次发送失败
pub fn record_send_failure() {
    counter!("ctg_emitter_send_failures_total").increment(1);
}

/// 记录一次因 envelope 编码失败而跳过的 tick
pub fn record_encode_failure() {
    counter!("ctg_emitter_encode_failures_total").increment(1);
}

/// 记录会话开始
pub fn record_session_started(model: &str) {
    counter!("ctg_emitter_sessions_total", "model" => model.to_string()).increment(1);
    gauge!("ctg_emitter_emitting").set(1.0);
}

/// 记录会话结束
pub fn record_session_stopped() {
    gauge!("ctg_emitter_emitting").set(0.0);
}

/// 单次运行的分通道统计
#[derive(Debug, Clone, Default)]
pub struct SignalStats {
    pub heart_rate: RunningStats,
    pub uterine_tone: RunningStats,
    pub spasm_activity: RunningStats,
}

impl SignalStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, sample: &SensorSample) {
        self.heart_rate.push(sample.heart_rate);
        self.uterine_tone.push(sample.uterine_tone);
        self.spasm_activity.push(sample.spasm_activity);
    }

    pub fn summary(&self) -> SignalSummary {
        SignalSummary {
            samples: self.heart_rate.count(),
            heart_rate: StatsSummary::from(&self.heart_rate),
            uterine_tone: StatsSummary::from(&self.uterine_tone),
            spasm_activity: StatsSummary::from(&self.spasm_activity),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 运行统计摘要
#[derive(Debug, Clone, Default)]
pub struct SignalSummary {
    pub samples: u64,
    pub heart_rate: StatsSummary,
    pub uterine_tone: StatsSummary,
    pub spasm_activity: StatsSummary,
}

impl std::fmt::Display for SignalSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Signal Summary ===")?;
        writeln!(f, "Samples: {}", self.samples)?;
        writeln!(f, "Heart rate (bpm): {}", self.heart_rate)?;
        writeln!(f, "Uterine tone: {}", self.uterine_tone)?;
        writeln!(f, "Spasm activity: {}", self.spasm_activity)
    }
}

/// 单通道统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.2}, max={:.2}, mean={:.2}, std={:.2} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线均值/方差 (Welford 算法)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
            return;
        }

        self.min = self.min.min(value);
        self.max = self.max.max(value);

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
