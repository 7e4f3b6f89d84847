use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// 步驟失敗時的處理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    /// 失敗只記錄警告，繼續下一步
    Suppressed,
    /// 失敗中止整個序列
    Surfaced,
}

impl fmt::Display for FailureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureMode::Suppressed => write!(f, "suppressed"),
            FailureMode::Surfaced => write!(f, "surfaced"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdioMode {
    Capture,
    Inherit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepKind {
    KillPort { port: u16, signal: String },
    Command { program: String, args: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub name: String,
    pub kind: StepKind,
    pub failure_mode: FailureMode,
    pub stdio: StdioMode,
    pub enabled: bool,
}

impl Step {
    pub fn command(
        name: impl Into<String>,
        program: impl Into<String>,
        args: Vec<String>,
        failure_mode: FailureMode,
    ) -> Self {
        Self {
            name: name.into(),
            kind: StepKind::Command {
                program: program.into(),
                args,
            },
            failure_mode,
            stdio: StdioMode::Capture,
            enabled: true,
        }
    }

    pub fn kill_port(name: impl Into<String>, port: u16, signal: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: StepKind::KillPort {
                port,
                signal: signal.into(),
            },
            failure_mode: FailureMode::Surfaced,
            stdio: StdioMode::Capture,
            enabled: true,
        }
    }

    pub fn with_stdio(mut self, stdio: StdioMode) -> Self {
        self.stdio = stdio;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// 人類可讀的命令列，用於 dry run 與日誌
    pub fn describe(&self) -> String {
        match &self.kind {
            StepKind::KillPort { port, signal } => {
                format!("kill -{} $(lsof -t -i tcp:{} -sTCP:LISTEN)", signal, port)
            }
            StepKind::Command { program, args } => Invocation::new(program, args.clone()).to_string(),
        }
    }
}

/// 單一子行程呼叫
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub stdio: StdioMode,
}

impl Invocation {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            stdio: StdioMode::Capture,
        }
    }

    pub fn with_stdio(mut self, stdio: StdioMode) -> Self {
        self.stdio = stdio;
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutcome {
    /// `None` 表示行程被訊號終止
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutcome {
    pub fn success() -> Self {
        Self::with_exit_code(0)
    }

    pub fn with_exit_code(code: i32) -> Self {
        Self {
            exit_code: Some(code),
            ..Self::default()
        }
    }

    pub fn with_stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Succeeded,
    Suppressed,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    pub step_name: String,
    pub status: StepStatus,
    pub exit_code: Option<i32>,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
}

fn serialize_millis<S>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(duration.as_millis() as u64)
}
