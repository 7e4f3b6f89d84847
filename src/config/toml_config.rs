use crate::domain::model::FailureMode;
use crate::utils::error::{DevstartError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 設定檔內容。所有欄位皆為選填，缺少時使用預設的四個步驟
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DevstartConfig {
    pub project: Option<ProjectConfig>,
    pub kill_port: Option<KillPortConfig>,
    pub watcher_reset: Option<CommandStepConfig>,
    pub bridge_forward: Option<CommandStepConfig>,
    pub dev_server: Option<DevServerConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub port: Option<u16>,
    pub root: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KillPortConfig {
    pub enabled: Option<bool>,
    pub signal: Option<String>,
    pub failure_mode: Option<FailureMode>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandStepConfig {
    pub enabled: Option<bool>,
    pub program: Option<String>,
    pub args: Option<Vec<String>>,
    pub failure_mode: Option<FailureMode>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DevServerConfig {
    pub enabled: Option<bool>,
    pub program: Option<String>,
    /// bundler CLI 進入點，會成為第一個參數
    pub entry: Option<String>,
    /// 指定時完全取代 `<entry> start --root=<root>`
    pub args: Option<Vec<String>>,
    pub failure_mode: Option<FailureMode>,
}

impl DevstartConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DevstartError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DevstartError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${RCT_METRO_PORT})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DevstartError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    /// 套用命令列參數，命令列優先於設定檔
    pub fn with_overrides(mut self, port: Option<u16>, root: Option<String>) -> Self {
        if port.is_none() && root.is_none() {
            return self;
        }

        let project = self.project.get_or_insert_with(ProjectConfig::default);
        if let Some(port) = port {
            project.port = Some(port);
        }
        if let Some(root) = root {
            project.root = Some(root);
        }
        self
    }
}

impl Validate for DevstartConfig {
    fn validate(&self) -> Result<()> {
        if let Some(project) = &self.project {
            if let Some(port) = project.port {
                validation::validate_port("project.port", port)?;
            }
            if let Some(root) = &project.root {
                validation::validate_path("project.root", root)?;
            }
        }

        if let Some(signal) = self.kill_port.as_ref().and_then(|k| k.signal.as_deref()) {
            validation::validate_signal("kill_port.signal", signal)?;
        }

        let programs = [
            ("watcher_reset.program", self.watcher_reset.as_ref().and_then(|s| s.program.as_deref())),
            ("bridge_forward.program", self.bridge_forward.as_ref().and_then(|s| s.program.as_deref())),
            ("dev_server.program", self.dev_server.as_ref().and_then(|s| s.program.as_deref())),
            ("dev_server.entry", self.dev_server.as_ref().and_then(|s| s.entry.as_deref())),
        ];
        for (field, value) in programs {
            if let Some(value) = value {
                validation::validate_non_empty_string(field, value)?;
            }
        }

        Ok(())
    }
}
