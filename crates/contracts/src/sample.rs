//! SensorSample / GenerationParameters - SignalModel 的输入与输出
//!
//! 每个 tick 一个样本，包含三个生理通道。

use serde::{Deserialize, Serialize};
use validator::Validate;

/// 一次生成的读数
///
/// 所有字段非负；各生成器按自己的范围裁剪。
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorSample {
    /// 胎儿心率 (bpm)
    pub heart_rate: f64,

    /// 子宫张力
    pub uterine_tone: f64,

    /// 宫缩 (痉挛) 活动
    pub spasm_activity: f64,
}

impl SensorSample {
    pub fn new(heart_rate: f64, uterine_tone: f64, spasm_activity: f64) -> Self {
        Self {
            heart_rate,
            uterine_tone,
            spasm_activity,
        }
    }

    /// 所有通道下限截断为 0
    pub fn floored(self) -> Self {
        Self {
            heart_rate: self.heart_rate.max(0.0),
            uterine_tone: self.uterine_tone.max(0.0),
            spasm_activity: self.spasm_activity.max(0.0),
        }
    }

    /// 所有通道均为有限非负值时返回 true
    pub fn is_well_formed(&self) -> bool {
        [self.heart_rate, self.uterine_tone, self.spasm_activity]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }
}

/// 单通道振荡参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct ChannelParameters {
    /// 中心值
    pub base: f64,

    /// 相对 `base` 的最大偏移
    #[validate(range(min = 0.0))]
    pub amplitude: f64,

    /// 振荡频率 (Hz)
    #[validate(range(min = 0.0))]
    pub frequency: f64,
}

impl ChannelParameters {
    pub const fn new(base: f64, amplitude: f64, frequency: f64) -> Self {
        Self {
            base,
            amplitude,
            frequency,
        }
    }
}

/// 生成参数
///
/// 由模型实例持有；可随时通过 `SignalModel::configure` 替换。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct GenerationParameters {
    #[validate(nested)]
    pub heart_rate: ChannelParameters,

    #[validate(nested)]
    pub uterine_tone: ChannelParameters,

    #[validate(nested)]
    pub spasm_activity: ChannelParameters,

    /// 相对噪声水平 (0-1)
    #[validate(range(min = 0.0, max = 1.0))]
    pub noise_level: f64,
}

impl GenerationParameters {
    /// 将 `noise_level` 限制到 [0, 1] 后的参数
    pub fn sanitized(mut self) -> Self {
        self.noise_level = if self.noise_level.is_nan() {
            0.0
        } else {
            self.noise_level.clamp(0.0, 1.0)
        };
        self
    }

    /// 关闭噪声后的参数
    pub fn without_noise(mut self) -> Self {
        self.noise_level = 0.0;
        self
    }
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            heart_rate: ChannelParameters::new(80.0, 20.0, 0.5),
            uterine_tone: ChannelParameters::new(67.0, 60.0, 0.3),
            spasm_activity: ChannelParameters::new(45.0, 35.0, 0.4),
            noise_level: 0.05,
        }
    }
}
