use crate::config::toml_config::DevstartConfig;
use crate::domain::model::{FailureMode, StdioMode, Step};
use crate::utils::error::{DevstartError, Result};
use crate::utils::validation::Validate;

pub const DEFAULT_PORT: u16 = 8081;
pub const DEFAULT_ROOT: &str = "./playground";
pub const DEFAULT_SIGNAL: &str = "KILL";
pub const DEFAULT_BUNDLER_ENTRY: &str = "./node_modules/react-native/local-cli/cli.js";

pub const KILL_PORT: &str = "kill-port";
pub const WATCHER_RESET: &str = "watcher-reset";
pub const BRIDGE_FORWARD: &str = "bridge-forward";
pub const DEV_SERVER: &str = "dev-server";

pub const STEP_NAMES: [&str; 4] = [KILL_PORT, WATCHER_RESET, BRIDGE_FORWARD, DEV_SERVER];

/// 依設定建立固定順序的四個步驟
pub fn build_steps(config: &DevstartConfig) -> Result<Vec<Step>> {
    config.validate()?;

    let project = config.project.clone().unwrap_or_default();
    let port = project.port.unwrap_or(DEFAULT_PORT);
    let root = project.root.unwrap_or_else(|| DEFAULT_ROOT.to_string());

    let kill_cfg = config.kill_port.clone().unwrap_or_default();
    let mut kill_port = Step::kill_port(
        KILL_PORT,
        port,
        kill_cfg.signal.unwrap_or_else(|| DEFAULT_SIGNAL.to_string()),
    )
    .with_enabled(kill_cfg.enabled.unwrap_or(true));
    if let Some(mode) = kill_cfg.failure_mode {
        kill_port.failure_mode = mode;
    }

    let watcher_cfg = config.watcher_reset.clone().unwrap_or_default();
    let watcher_reset = Step::command(
        WATCHER_RESET,
        watcher_cfg.program.unwrap_or_else(|| "watchman".to_string()),
        watcher_cfg
            .args
            .unwrap_or_else(|| vec!["watch-del-all".to_string()]),
        watcher_cfg.failure_mode.unwrap_or(FailureMode::Suppressed),
    )
    .with_enabled(watcher_cfg.enabled.unwrap_or(true));

    let bridge_cfg = config.bridge_forward.clone().unwrap_or_default();
    let bridge_forward = Step::command(
        BRIDGE_FORWARD,
        bridge_cfg.program.unwrap_or_else(|| "adb".to_string()),
        bridge_cfg.args.unwrap_or_else(|| {
            vec![
                "reverse".to_string(),
                format!("tcp:{}", port),
                format!("tcp:{}", port),
            ]
        }),
        bridge_cfg.failure_mode.unwrap_or(FailureMode::Suppressed),
    )
    .with_enabled(bridge_cfg.enabled.unwrap_or(true));

    let server_cfg = config.dev_server.clone().unwrap_or_default();
    let server_args = match server_cfg.args {
        Some(args) => args,
        None => vec![
            server_cfg
                .entry
                .unwrap_or_else(|| DEFAULT_BUNDLER_ENTRY.to_string()),
            "start".to_string(),
            format!("--root={}", root),
        ],
    };
    let dev_server = Step::command(
        DEV_SERVER,
        server_cfg.program.unwrap_or_else(|| "node".to_string()),
        server_args,
        server_cfg.failure_mode.unwrap_or(FailureMode::Surfaced),
    )
    .with_stdio(StdioMode::Inherit)
    .with_enabled(server_cfg.enabled.unwrap_or(true));

    Ok(vec![kill_port, watcher_reset, bridge_forward, dev_server])
}

/// `--only` / `--skip` 篩選
#[derive(Debug, Clone, Default)]
pub struct StepFilter {
    only: Vec<String>,
    skip: Vec<String>,
}

impl StepFilter {
    pub fn new(only: Vec<String>, skip: Vec<String>) -> Self {
        let clean = |names: Vec<String>| -> Vec<String> {
            names
                .into_iter()
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect()
        };
        Self {
            only: clean(only),
            skip: clean(skip),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.only.is_empty() && self.skip.is_empty()
    }

    /// 被篩掉的步驟標記為停用，保留在序列中以便回報
    pub fn apply(&self, steps: &mut [Step]) -> Result<()> {
        for (field, names) in [("only", &self.only), ("skip", &self.skip)] {
            for name in names {
                if !steps.iter().any(|step| &step.name == name) {
                    return Err(DevstartError::InvalidConfigValueError {
                        field: field.to_string(),
                        value: name.clone(),
                        reason: format!("Unknown step. Known steps: {}", STEP_NAMES.join(", ")),
                    });
                }
            }
        }

        for step in steps.iter_mut() {
            if !self.only.is_empty() && !self.only.contains(&step.name) {
                step.enabled = false;
            }
            if self.skip.contains(&step.name) {
                step.enabled = false;
            }
        }

        Ok(())
    }
}
