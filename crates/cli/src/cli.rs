//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::ModelKind;
use observability::ObservabilityConfig;
use std::path::PathBuf;

/// CTG Emitter - streams simulated cardiotocography signals over WebSocket
#[derive(Parser, Debug)]
#[command(
    name = "ctg-emitter",
    author,
    version,
    about = "Simulated CTG sensor streaming over WebSocket",
    long_about = "Generates fetal heart rate, uterine tone and spasm activity from a \n\
                  configurable signal model and streams them as JSON envelopes to a \n\
                  WebSocket endpoint at a fixed cadence."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "CTG_EMITTER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        global = true,
        env = "CTG_EMITTER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Tracing setup derived from the global flags
    pub fn observability_config(&self) -> ObservabilityConfig {
        let default_log_level = if self.quiet {
            "warn"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        };

        ObservabilityConfig {
            log_format: self.log_format.into(),
            // The exporter is installed by `run` only
            metrics_port: None,
            default_log_level: default_log_level.to_string(),
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Connect and stream samples until interrupted
    Run(RunArgs),

    /// Validate configuration file without connecting
    Validate(ValidateArgs),

    /// Print generated samples without opening a connection
    Preview(PreviewArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "emitter.toml", env = "CTG_EMITTER_CONFIG")]
    pub config: PathBuf,

    /// Override endpoint address (ws://)
    #[arg(long, env = "CTG_EMITTER_ADDRESS")]
    pub address: Option<String>,

    /// Override endpoint credential
    #[arg(long, env = "CTG_EMITTER_TOKEN", hide_env_values = true)]
    pub credential: Option<String>,

    /// Override emission cadence in milliseconds
    #[arg(long, env = "CTG_EMITTER_CADENCE_MS")]
    pub cadence_ms: Option<u64>,

    /// Override signal model
    #[arg(long)]
    pub model: Option<ModelKind>,

    /// Override RNG seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stop after this many seconds (0 = run until interrupted)
    #[arg(long, default_value = "0", env = "CTG_EMITTER_DURATION")]
    pub duration_secs: u64,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "CTG_EMITTER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "emitter.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `preview` command
#[derive(Parser, Debug)]
pub struct PreviewArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "emitter.toml")]
    pub config: PathBuf,

    /// Number of ticks to generate
    #[arg(long, default_value = "25")]
    pub ticks: u32,

    /// Override signal model
    #[arg(long)]
    pub model: Option<ModelKind>,

    /// Override RNG seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print envelopes as JSON lines
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_overrides_parse() {
        let cli = Cli::try_parse_from([
            "ctg-emitter",
            "-v",
            "run",
            "--config",
            "x.toml",
            "--address",
            "ws://h:1/ws",
            "--model",
            "replay",
            "--seed",
            "7",
        ])
        .unwrap();

        let Commands::Run(args) = &cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.config, PathBuf::from("x.toml"));
        assert_eq!(args.address.as_deref(), Some("ws://h:1/ws"));
        assert_eq!(args.model, Some(ModelKind::Replay));
        assert_eq!(args.seed, Some(7));
        assert_eq!(cli.observability_config().default_log_level, "debug");
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["ctg-emitter", "-q", "-v", "validate"]).is_err());

        let cli = Cli::try_parse_from(["ctg-emitter", "-q", "validate"]).unwrap();
        assert_eq!(cli.observability_config().default_log_level, "warn");
    }

    #[test]
    fn test_unknown_model_rejected() {
        assert!(Cli::try_parse_from(["ctg-emitter", "preview", "--model", "fourier"]).is_err());
    }
}
