pub mod toml_config;

use crate::utils::error::Result;
use clap::Parser;
use serde::{Deserialize, Serialize};
use toml_config::DevstartConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Parser)]
#[command(name = "devstart")]
#[command(about = "Reset the local dev environment and start the bundler dev server")]
pub struct CliConfig {
    /// Path to an optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Development port (default 8081)
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// Project root passed to the bundler (default ./playground)
    #[arg(long)]
    pub root: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Show the execution plan without running anything
    #[arg(long)]
    pub dry_run: bool,

    /// Run only these steps (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,

    /// Skip these steps (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Write a JSON run report to this path when the sequence ends
    #[arg(long)]
    pub report: Option<String>,

    /// Execution ID for this run
    #[arg(long)]
    pub execution_id: Option<String>,
}

impl CliConfig {
    /// 載入設定檔（若有）並套用命令列覆寫
    pub fn load_config(&self) -> Result<DevstartConfig> {
        let config = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                DevstartConfig::from_file(path)?
            }
            None => DevstartConfig::default(),
        };

        Ok(config.with_overrides(self.port, self.root.clone()))
    }

    pub fn execution_id(&self) -> String {
        self.execution_id
            .clone()
            .unwrap_or_else(|| format!("devstart_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S")))
    }
}
