use crate::domain::model::{CommandOutcome, Invocation};
use crate::domain::ports::CommandRunner;
use crate::utils::error::{DevstartError, Result};

/// 找出佔用指定 TCP 埠的行程並終止它們
pub struct PortKiller<'a> {
    runner: &'a dyn CommandRunner,
}

/// 查詢結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortLookup {
    Pids(Vec<u32>),
    /// lsof 以非預期的結束碼結束
    Failed(CommandOutcome),
}

impl<'a> PortKiller<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// 只找監聽中的 socket，連線到此埠的 client 不列入
    pub fn lookup_invocation(port: u16) -> Invocation {
        Invocation::new(
            "lsof",
            vec![
                "-t".to_string(),
                "-i".to_string(),
                format!("tcp:{}", port),
                "-sTCP:LISTEN".to_string(),
            ],
        )
    }

    pub fn kill_invocation(signal: &str, pids: &[u32]) -> Invocation {
        let mut args = vec![format!("-{}", signal)];
        args.extend(pids.iter().map(|pid| pid.to_string()));
        Invocation::new("kill", args)
    }

    /// 查詢佔用埠的 pid。lsof 找不到時以結束碼 1 且無輸出表示
    pub async fn find_pids(&self, port: u16) -> Result<PortLookup> {
        let outcome = self.runner.run(&Self::lookup_invocation(port)).await?;

        match outcome.exit_code {
            Some(0) => Ok(PortLookup::Pids(parse_pids(port, &outcome.stdout)?)),
            Some(1) if outcome.stdout.trim().is_empty() => Ok(PortLookup::Pids(Vec::new())),
            _ => Ok(PortLookup::Failed(outcome)),
        }
    }

    /// 終止佔用埠的行程。沒有行程時視為成功
    pub async fn kill(&self, port: u16, signal: &str) -> Result<CommandOutcome> {
        let pids = match self.find_pids(port).await? {
            PortLookup::Pids(pids) => pids,
            PortLookup::Failed(outcome) => {
                tracing::warn!(
                    "⚠️ Port lookup for {} exited with {:?}",
                    port,
                    outcome.exit_code
                );
                return Ok(outcome);
            }
        };

        if pids.is_empty() {
            tracing::info!("🔌 Nothing is listening on port {}", port);
            return Ok(CommandOutcome::success());
        }

        tracing::info!("🔪 Killing {:?} on port {} with SIG{}", pids, port, signal);
        let outcome = self.runner.run(&Self::kill_invocation(signal, &pids)).await?;
        if outcome.is_success() {
            return Ok(outcome);
        }

        // kill 只要有一個 pid 已不存在就回傳 1，以埠是否已釋放為準
        match self.find_pids(port).await? {
            PortLookup::Pids(remaining) if remaining.is_empty() => {
                tracing::info!("🔌 Port {} is free (kill exited with {:?})", port, outcome.exit_code);
                Ok(CommandOutcome::success())
            }
            PortLookup::Pids(remaining) => {
                tracing::warn!("⚠️ {:?} still listening on port {}", remaining, port);
                Ok(outcome)
            }
            PortLookup::Failed(_) => Ok(outcome),
        }
    }
}

/// 每行一個 pid，忽略空行並去除重複
pub fn parse_pids(port: u16, output: &str) -> Result<Vec<u32>> {
    let mut pids = Vec::new();

    for line in output.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let pid = line
            .parse::<u32>()
            .map_err(|_| DevstartError::InvalidPidError {
                port,
                line: line.to_string(),
            })?;
        if !pids.contains(&pid) {
            pids.push(pid);
        }
    }

    Ok(pids)
}
