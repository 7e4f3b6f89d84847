use crate::domain::model::{StepResult, StepStatus};
use crate::utils::error::{DevstartError, Result};
use chrono::{DateTime, Utc};
use std::path::Path;
use std::time::Duration;

/// 一次 bootstrap 的執行結果
#[derive(Debug)]
pub struct BootstrapReport {
    pub execution_id: String,
    pub started_at: DateTime<Utc>,
    pub results: Vec<StepResult>,
    pub failure: Option<DevstartError>,
}

impl BootstrapReport {
    pub fn new(execution_id: String) -> Self {
        Self {
            execution_id,
            started_at: Utc::now(),
            results: Vec::new(),
            failure: None,
        }
    }

    pub fn push(&mut self, result: StepResult) {
        self.results.push(result);
    }

    pub fn fail(&mut self, error: DevstartError) {
        self.failure = Some(error);
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    pub fn exit_code(&self) -> i32 {
        self.failure.as_ref().map_or(0, DevstartError::exit_code)
    }

    pub fn get_result_by_name(&self, name: &str) -> Option<&StepResult> {
        self.results.iter().find(|r| r.step_name == name)
    }

    /// 實際執行（未被略過）的步驟名稱，依執行順序
    pub fn executed_steps(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| r.status != StepStatus::Skipped)
            .map(|r| r.step_name.as_str())
            .collect()
    }

    pub fn total_duration(&self) -> Duration {
        self.results.iter().map(|r| r.duration).sum()
    }

    fn count(&self, status: StepStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    /// 獲取執行摘要
    pub fn get_execution_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "execution_id": self.execution_id,
            "started_at": self.started_at.to_rfc3339(),
            "total_steps": self.results.len(),
            "succeeded": self.count(StepStatus::Succeeded),
            "suppressed": self.count(StepStatus::Suppressed),
            "skipped": self.count(StepStatus::Skipped),
            "failed": self.count(StepStatus::Failed),
            "total_duration_ms": self.total_duration().as_millis() as u64,
            "executed_steps": self.executed_steps(),
            "exit_code": self.exit_code(),
            "error": self.failure.as_ref().map(ToString::to_string),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        let mut document = self.get_execution_summary();
        document["steps"] = serde_json::to_value(&self.results)?;
        Ok(serde_json::to_string_pretty(&document)?)
    }

    pub async fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = self.to_json()?;
        tokio::fs::write(path.as_ref(), json).await?;
        tracing::info!("📊 Run report written to: {}", path.as_ref().display());
        Ok(())
    }

    pub fn log_summary(&self) {
        tracing::info!(
            "📊 {}: {} succeeded, {} suppressed, {} skipped, {} failed in {:?}",
            self.execution_id,
            self.count(StepStatus::Succeeded),
            self.count(StepStatus::Suppressed),
            self.count(StepStatus::Skipped),
            self.count(StepStatus::Failed),
            self.total_duration()
        );
    }
}
