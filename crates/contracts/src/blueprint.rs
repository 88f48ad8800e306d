//! EmitterBlueprint - Config Loader 输出
//!
//! 描述完整的 emitter 配置：远端 endpoint、推流节奏、
//! 以及驱动数据流的信号模型。

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use validator::Validate;

use crate::{GenerationParameters, SensorId};

/// 默认发送周期 (毫秒)
pub const DEFAULT_CADENCE_MS: u64 = 120;

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的 emitter 配置蓝图
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EmitterBlueprint {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// 远端 endpoint
    #[validate(nested)]
    pub endpoint: EndpointConfig,

    /// 推流设置
    #[serde(default)]
    #[validate(nested)]
    pub stream: StreamConfig,

    /// 信号模型选择
    #[serde(default)]
    #[validate(nested)]
    pub model: ModelConfig,
}

/// 远端 endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EndpointConfig {
    /// WebSocket URL (e.g., "ws://localhost:8080/ws")
    #[validate(length(min = 1, message = "endpoint address cannot be empty"))]
    pub address: String,

    /// 交给传输层的 token，不做任何解析
    #[serde(default)]
    pub credential: Option<String>,
}

/// 推流设置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StreamConfig {
    /// 每个 envelope 上携带的标识
    #[serde(default)]
    pub sensor_id: SensorId,

    /// tick 周期，单位：毫秒
    #[serde(default = "default_cadence_ms")]
    #[validate(range(min = 1, max = 60000))]
    pub cadence_ms: u64,
}

fn default_cadence_ms() -> u64 {
    DEFAULT_CADENCE_MS
}

impl StreamConfig {
    pub fn cadence(&self) -> Duration {
        Duration::from_millis(self.cadence_ms)
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            sensor_id: SensorId::default(),
            cadence_ms: DEFAULT_CADENCE_MS,
        }
    }
}

/// 信号模型类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// 参数化正弦/余弦通道
    Sinusoidal,
    /// 回放录制的参考模式
    Replay,
    /// 临床 CTG 状态机
    #[default]
    Ctg,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sinusoidal => "sinusoidal",
            Self::Replay => "replay",
            Self::Ctg => "ctg",
        }
    }
}

impl std::str::FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sinusoidal" => Ok(Self::Sinusoidal),
            "replay" => Ok(Self::Replay),
            "ctg" => Ok(Self::Ctg),
            other => Err(format!("unknown model kind '{other}'")),
        }
    }
}

/// CTG 模拟器的缺氧判定方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HypoxiaSetting {
    /// 在第一个 tick 按 `hypoxia_probability` 随机决定一次
    #[default]
    Random,
    /// 始终缺氧
    Enabled,
    /// 始终健康
    Disabled,
}

/// 信号模型配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ModelConfig {
    /// 模型类型
    #[serde(default)]
    pub kind: ModelKind,

    /// 固定随机种子 (None = 使用系统熵)
    #[serde(default)]
    pub seed: Option<u64>,

    /// CTG 缺氧判定
    #[serde(default)]
    pub hypoxia: HypoxiaSetting,

    /// `HypoxiaSetting::Random` 使用的概率
    #[serde(default = "default_hypoxia_probability")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub hypoxia_probability: f64,

    /// 包含 `regular/` 和 `hypoxia/` 模式池的根目录
    #[serde(default)]
    pub pattern_dir: Option<PathBuf>,

    /// 每个模式池最多加载的病例数
    #[serde(default = "default_max_patterns_per_pool")]
    #[validate(range(min = 1))]
    pub max_patterns_per_pool: usize,

    /// 回放速度倍率 (1.0 = 原速)
    #[serde(default = "default_replay_speed")]
    #[validate(range(exclusive_min = 0.0, max = 1000.0))]
    pub replay_speed: f64,

    /// 参数覆盖 (可选)
    #[serde(default)]
    #[validate(nested)]
    pub parameters: Option<GenerationParameters>,
}

fn default_hypoxia_probability() -> f64 {
    0.5
}

fn default_max_patterns_per_pool() -> usize {
    5
}

fn default_replay_speed() -> f64 {
    1.0
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            kind: ModelKind::default(),
            seed: None,
            hypoxia: HypoxiaSetting::default(),
            hypoxia_probability: default_hypoxia_probability(),
            pattern_dir: None,
            max_patterns_per_pool: default_max_patterns_per_pool(),
            replay_speed: default_replay_speed(),
            parameters: None,
        }
    }
}
