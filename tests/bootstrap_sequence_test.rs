use anyhow::Result;
use async_trait::async_trait;
use devstart::core::{CommandOutcome, CommandRunner, Invocation, StdioMode, StepStatus};
use devstart::{build_steps, BootstrapSequence, DevstartConfig, DevstartError, StepFilter};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// 記錄每一次呼叫，並依程式名稱依序回傳預設結果（最後一個結果重複使用）
#[derive(Default)]
struct RecordingRunner {
    calls: Mutex<Vec<Invocation>>,
    outcomes: Mutex<HashMap<String, VecDeque<CommandOutcome>>>,
    missing: Vec<String>,
}

impl RecordingRunner {
    fn new() -> Self {
        Self::default()
    }

    fn respond(self, program: &str, outcome: CommandOutcome) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .entry(program.to_string())
            .or_default()
            .push_back(outcome);
        self
    }

    fn not_installed(mut self, program: &str) -> Self {
        self.missing.push(program.to_string());
        self
    }

    fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    fn programs(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.program).collect()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, invocation: &Invocation) -> devstart::Result<CommandOutcome> {
        self.calls.lock().unwrap().push(invocation.clone());

        if self.missing.contains(&invocation.program) {
            return Err(DevstartError::SpawnError {
                program: invocation.program.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            });
        }

        let mut outcomes = self.outcomes.lock().unwrap();
        let outcome = match outcomes.get_mut(&invocation.program) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        Ok(outcome.unwrap_or_else(CommandOutcome::success))
    }
}

fn nothing_listening() -> CommandOutcome {
    CommandOutcome::with_exit_code(1)
}

fn default_sequence(runner: Arc<RecordingRunner>) -> Result<BootstrapSequence> {
    let steps = build_steps(&DevstartConfig::default())?;
    Ok(BootstrapSequence::new("test".to_string(), runner).with_steps(steps))
}

fn args(invocation: &Invocation) -> Vec<&str> {
    invocation.args.iter().map(String::as_str).collect()
}

#[tokio::test]
async fn test_end_to_end_records_exact_call_sequence() -> Result<()> {
    let runner = Arc::new(RecordingRunner::new().respond("lsof", nothing_listening()));
    let report = default_sequence(runner.clone())?.execute_all().await;

    assert!(report.is_success());
    assert_eq!(report.exit_code(), 0);

    let calls = runner.calls();
    assert_eq!(calls.len(), 4);

    assert_eq!(calls[0].program, "lsof");
    assert_eq!(args(&calls[0]), vec!["-t", "-i", "tcp:8081", "-sTCP:LISTEN"]);

    assert_eq!(calls[1].program, "watchman");
    assert_eq!(args(&calls[1]), vec!["watch-del-all"]);

    assert_eq!(calls[2].program, "adb");
    assert_eq!(args(&calls[2]), vec!["reverse", "tcp:8081", "tcp:8081"]);

    assert_eq!(calls[3].program, "node");
    assert_eq!(
        args(&calls[3]),
        vec![
            "./node_modules/react-native/local-cli/cli.js",
            "start",
            "--root=./playground"
        ]
    );
    assert_eq!(calls[3].stdio, StdioMode::Inherit);

    assert_eq!(
        report.executed_steps(),
        vec!["kill-port", "watcher-reset", "bridge-forward", "dev-server"]
    );
    Ok(())
}

#[tokio::test]
async fn test_kill_port_terminates_listeners_with_literal_port() -> Result<()> {
    let runner = Arc::new(
        RecordingRunner::new()
            .respond("lsof", CommandOutcome::success().with_stdout("4242\n4343\n")),
    );
    let report = default_sequence(runner.clone())?.execute_all().await;

    assert!(report.is_success());
    let calls = runner.calls();
    assert_eq!(
        runner.programs(),
        vec!["lsof", "kill", "watchman", "adb", "node"]
    );
    assert!(calls[0].args.iter().any(|a| a.contains("8081")));
    assert_eq!(args(&calls[1]), vec!["-KILL", "4242", "4343"]);
    Ok(())
}

#[tokio::test]
async fn test_watcher_reset_failure_is_suppressed() -> Result<()> {
    let runner = Arc::new(
        RecordingRunner::new()
            .respond("lsof", nothing_listening())
            .respond("watchman", CommandOutcome::with_exit_code(1)),
    );
    let report = default_sequence(runner.clone())?.execute_all().await;

    assert!(report.is_success());
    assert_eq!(runner.programs(), vec!["lsof", "watchman", "adb", "node"]);

    let watcher = report.get_result_by_name("watcher-reset").unwrap();
    assert_eq!(watcher.status, StepStatus::Suppressed);
    assert_eq!(watcher.exit_code, Some(1));
    Ok(())
}

#[tokio::test]
async fn test_bridge_forward_failure_is_suppressed() -> Result<()> {
    let runner = Arc::new(
        RecordingRunner::new()
            .respond("lsof", nothing_listening())
            .respond("adb", CommandOutcome::with_exit_code(1)),
    );
    let report = default_sequence(runner.clone())?.execute_all().await;

    assert!(report.is_success());
    assert_eq!(runner.programs().last().map(String::as_str), Some("node"));
    assert_eq!(
        report.get_result_by_name("bridge-forward").unwrap().status,
        StepStatus::Suppressed
    );
    Ok(())
}

#[tokio::test]
async fn test_missing_tools_are_suppressed() -> Result<()> {
    let runner = Arc::new(
        RecordingRunner::new()
            .respond("lsof", nothing_listening())
            .not_installed("watchman")
            .not_installed("adb"),
    );
    let report = default_sequence(runner.clone())?.execute_all().await;

    assert!(report.is_success());
    assert_eq!(runner.programs(), vec!["lsof", "watchman", "adb", "node"]);
    Ok(())
}

#[tokio::test]
async fn test_dev_server_exit_code_propagates() -> Result<()> {
    let runner = Arc::new(
        RecordingRunner::new()
            .respond("lsof", nothing_listening())
            .respond("node", CommandOutcome::with_exit_code(3)),
    );
    let report = default_sequence(runner)?.execute_all().await;

    assert!(!report.is_success());
    assert_eq!(report.exit_code(), 3);
    assert_eq!(
        report.get_result_by_name("dev-server").unwrap().status,
        StepStatus::Failed
    );
    Ok(())
}

#[tokio::test]
async fn test_kill_port_failure_stops_sequence() -> Result<()> {
    let runner = Arc::new(RecordingRunner::new().not_installed("lsof"));
    let report = default_sequence(runner.clone())?.execute_all().await;

    assert!(!report.is_success());
    assert_eq!(report.exit_code(), 1);
    assert_eq!(runner.programs(), vec!["lsof"]);
    assert!(matches!(report.failure, Some(DevstartError::SpawnError { .. })));
    Ok(())
}

#[tokio::test]
async fn test_failed_kill_stops_sequence_when_port_still_taken() -> Result<()> {
    let runner = Arc::new(
        RecordingRunner::new()
            .respond("lsof", CommandOutcome::success().with_stdout("99\n"))
            .respond("kill", CommandOutcome::with_exit_code(1)),
    );
    let report = default_sequence(runner.clone())?.execute_all().await;

    assert!(!report.is_success());
    assert_eq!(runner.programs(), vec!["lsof", "kill", "lsof"]);
    assert_eq!(report.results.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_kill_racing_an_exited_listener_still_succeeds() -> Result<()> {
    // 其中一個 pid 在 kill 之前已結束，kill 回傳 1，但埠已釋放
    let runner = Arc::new(
        RecordingRunner::new()
            .respond("lsof", CommandOutcome::success().with_stdout("99\n100\n"))
            .respond("lsof", nothing_listening())
            .respond("kill", CommandOutcome::with_exit_code(1)),
    );
    let report = default_sequence(runner.clone())?.execute_all().await;

    assert!(report.is_success());
    assert_eq!(
        runner.programs(),
        vec!["lsof", "kill", "lsof", "watchman", "adb", "node"]
    );
    assert_eq!(
        report.get_result_by_name("kill-port").unwrap().status,
        StepStatus::Succeeded
    );
    Ok(())
}

#[tokio::test]
async fn test_skipped_steps_are_reported_not_run() -> Result<()> {
    let runner = Arc::new(RecordingRunner::new().respond("lsof", nothing_listening()));
    let mut steps = build_steps(&DevstartConfig::default())?;
    StepFilter::new(vec![], vec!["watcher-reset".to_string(), "bridge-forward".to_string()])
        .apply(&mut steps)?;

    let report = BootstrapSequence::new("skip".to_string(), runner.clone())
        .with_steps(steps)
        .execute_all()
        .await;

    assert!(report.is_success());
    assert_eq!(runner.programs(), vec!["lsof", "node"]);
    assert_eq!(report.results.len(), 4);
    assert_eq!(
        report.get_result_by_name("watcher-reset").unwrap().status,
        StepStatus::Skipped
    );
    Ok(())
}

#[test]
fn test_sequence_runs_under_blocking_executor() -> Result<()> {
    let runner = Arc::new(RecordingRunner::new().respond("lsof", nothing_listening()));
    let sequence = default_sequence(runner.clone())?;

    let report = tokio_test::block_on(sequence.execute_all());

    assert!(report.is_success());
    assert_eq!(runner.calls().len(), 4);
    Ok(())
}

#[tokio::test]
async fn test_interrupt_still_records_dev_server_exit() -> Result<()> {
    // node 收到 SIGINT 後以 130 結束
    let runner = Arc::new(
        RecordingRunner::new()
            .respond("lsof", nothing_listening())
            .respond("node", CommandOutcome::with_exit_code(130)),
    );
    let report = default_sequence(runner.clone())?
        .execute_until_interrupted(async {})
        .await;

    assert_eq!(runner.programs(), vec!["lsof", "watchman", "adb", "node"]);
    assert_eq!(report.results.len(), 4);
    assert_eq!(report.exit_code(), 130);
    assert_eq!(
        report.get_result_by_name("dev-server").unwrap().exit_code,
        Some(130)
    );
    Ok(())
}

#[tokio::test]
async fn test_no_interrupt_behaves_like_execute_all() -> Result<()> {
    let runner = Arc::new(RecordingRunner::new().respond("lsof", nothing_listening()));
    let report = default_sequence(runner.clone())?
        .execute_until_interrupted(std::future::pending())
        .await;

    assert!(report.is_success());
    assert_eq!(runner.calls().len(), 4);
    Ok(())
}
