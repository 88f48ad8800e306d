//! # CTG Emitter CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 配置加载与验证
//! - 推流会话生命周期管理
//! - 离线样本预览

mod cli;
mod commands;
mod error;
mod session;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_emitter, run_preview, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载 .env 文件 (如果存在)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    observability::init_with_config(cli.observability_config())?;

    info!(version = env!("CARGO_PKG_VERSION"), "CTG emitter starting");

    let result = match &cli.command {
        Commands::Run(args) => run_emitter(args).await,
        Commands::Validate(args) => run_validate(args),
        Commands::Preview(args) => run_preview(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}
