use crate::core::port_killer::PortKiller;
use crate::core::report::BootstrapReport;
use crate::domain::model::{
    CommandOutcome, FailureMode, Invocation, Step, StepKind, StepResult, StepStatus,
};
use crate::domain::ports::CommandRunner;
use crate::utils::error::{DevstartError, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// 依序執行各步驟，前一步結束後才開始下一步
pub struct BootstrapSequence {
    steps: Vec<Step>,
    runner: Arc<dyn CommandRunner>,
    execution_id: String,
}

impl BootstrapSequence {
    pub fn new(execution_id: String, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            steps: Vec::new(),
            runner,
            execution_id,
        }
    }

    pub fn with_steps(mut self, steps: Vec<Step>) -> Self {
        self.steps.extend(steps);
        self
    }

    /// 執行所有步驟。surfaced 步驟失敗時立即停止，錯誤記錄在報告中
    pub async fn execute_all(&self) -> BootstrapReport {
        let mut report = BootstrapReport::new(self.execution_id.clone());

        tracing::info!(
            "🚀 Bootstrap {} started ({} steps)",
            self.execution_id,
            self.steps.len()
        );

        for step in &self.steps {
            if !step.enabled {
                tracing::info!("⏭️ Skipping step: {}", step.name);
                report.push(StepResult {
                    step_name: step.name.clone(),
                    status: StepStatus::Skipped,
                    exit_code: None,
                    duration: Duration::ZERO,
                });
                continue;
            }

            tracing::info!("▶️ {}: {}", step.name, step.describe());
            let start_time = Instant::now();
            let attempt = self.execute_step(step).await;
            let duration = start_time.elapsed();

            match settle(step, attempt) {
                Ok((status, exit_code)) => {
                    if status == StepStatus::Succeeded {
                        tracing::info!("✅ {} finished in {:?}", step.name, duration);
                    }
                    report.push(StepResult {
                        step_name: step.name.clone(),
                        status,
                        exit_code,
                        duration,
                    });
                }
                Err(e) => {
                    tracing::error!("❌ {} failed: {}", step.name, e);
                    let exit_code = match &e {
                        DevstartError::StepFailed { exit_code, .. } => *exit_code,
                        _ => None,
                    };
                    report.push(StepResult {
                        step_name: step.name.clone(),
                        status: StepStatus::Failed,
                        exit_code,
                        duration,
                    });
                    report.fail(e);
                    break;
                }
            }
        }

        report.log_summary();
        report
    }

    /// 與中斷訊號競賽執行。收到中斷後不放棄序列，而是等待目前的子行程
    /// （同一個 process group 也收到訊號）自行結束，結果照常記錄
    pub async fn execute_until_interrupted<F>(&self, interrupt: F) -> BootstrapReport
    where
        F: Future<Output = ()>,
    {
        let execution = self.execute_all();
        tokio::pin!(execution);

        tokio::select! {
            report = &mut execution => report,
            _ = interrupt => {
                tracing::info!("🛑 Interrupt received, waiting for the running step to exit");
                execution.await
            }
        }
    }

    async fn execute_step(&self, step: &Step) -> Result<CommandOutcome> {
        match &step.kind {
            StepKind::KillPort { port, signal } => {
                PortKiller::new(self.runner.as_ref()).kill(*port, signal).await
            }
            StepKind::Command { program, args } => {
                let invocation = Invocation::new(program, args.clone()).with_stdio(step.stdio);
                self.runner.run(&invocation).await
            }
        }
    }
}

/// 依失敗模式判定步驟結果，surfaced 步驟失敗時回傳錯誤
fn settle(step: &Step, attempt: Result<CommandOutcome>) -> Result<(StepStatus, Option<i32>)> {
    match attempt {
        Ok(outcome) if outcome.is_success() => Ok((StepStatus::Succeeded, outcome.exit_code)),
        Ok(outcome) => match step.failure_mode {
            FailureMode::Suppressed => {
                tracing::warn!(
                    "⚠️ {} exited with {:?}, continuing",
                    step.name,
                    outcome.exit_code
                );
                Ok((StepStatus::Suppressed, outcome.exit_code))
            }
            FailureMode::Surfaced => Err(DevstartError::StepFailed {
                step: step.name.clone(),
                exit_code: outcome.exit_code,
            }),
        },
        Err(e) => match step.failure_mode {
            FailureMode::Suppressed => {
                tracing::warn!("⚠️ {} could not run: {}, continuing", step.name, e);
                Ok((StepStatus::Suppressed, None))
            }
            FailureMode::Surfaced => Err(e),
        },
    }
}
