//! # Observability
//!
//! 可观测性模块：Tracing 订阅器 + Prometheus 指标。
//!
//! ## 功能
//!
//! - Tracing 初始化 (JSON / Pretty / Compact 格式)
//! - Prometheus 指标导出
//! - 每个 tick 的信号指标与内存内统计
//!
//! ## 使用示例
//!
//! ```ignore
//! use observability::{init_with_config, metrics, ObservabilityConfig};
//!
//! init_with_config(ObservabilityConfig::default())?;
//!
//! let sample = model.generate_next(elapsed);
//! metrics::record_tick(&sample, elapsed);
//! ```

pub mod metrics;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use crate::metrics::{
    record_encode_failure, record_send_failure, record_send_success, record_session_started,
    record_session_stopped, record_tick, RunningStats, SignalStats, SignalSummary, StatsSummary,
};

/// 使用默认配置初始化 (compact 日志，不启动 exporter)
pub fn init() -> Result<()> {
    init_with_config(ObservabilityConfig::default())
}

/// 可观测性配置
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// 日志输出格式
    pub log_format: LogFormat,
    /// Prometheus 端口 (None = 不启用)
    pub metrics_port: Option<u16>,
    /// `RUST_LOG` 未设置时使用的过滤级别
    pub default_log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Compact,
            metrics_port: None,
            default_log_level: "info".to_string(),
        }
    }
}

/// 日志输出格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// 结构化 JSON 行
    Json,
    /// 多行可读格式
    Pretty,
    /// 单行可读格式
    #[default]
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// 初始化 tracing；设置端口时同时启动 Prometheus exporter
pub fn init_with_config(config: ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_log_level));

    // 可选 layer 中只有一个生效
    let json = (config.log_format == LogFormat::Json).then(|| {
        fmt::layer()
            .json()
            .with_target(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
    });
    let pretty = (config.log_format == LogFormat::Pretty).then(|| fmt::layer().pretty());
    let compact = (config.log_format == LogFormat::Compact).then(|| fmt::layer().compact());

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .with(compact)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    if let Some(port) = config.metrics_port {
        install_exporter(port)?;
    }

    tracing::info!(
        log_format = ?config.log_format,
        metrics_port = ?config.metrics_port,
        "Observability initialized"
    );

    Ok(())
}

/// 仅安装 Prometheus exporter
///
/// 用于 tracing 订阅器已在别处初始化的进程。
pub fn init_metrics_only(port: u16) -> Result<()> {
    install_exporter(port)
}

fn install_exporter(port: u16) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .context("Failed to install Prometheus recorder")?;

    tracing::info!(port, "Prometheus metrics endpoint initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ObservabilityConfig::default();
        assert_eq!(config.metrics_port, None);
        assert_eq!(config.log_format, LogFormat::Compact);
        assert_eq!(config.default_log_level, "info");
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("pretty".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
