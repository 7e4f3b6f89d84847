use crate::domain::model::{CommandOutcome, Invocation};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 執行外部命令的介面，測試時可替換為記錄用的實作
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// 執行命令並等待結束。無法啟動行程時回傳 `SpawnError`，
    /// 非零結束碼則放在 `CommandOutcome` 中由呼叫端判斷。
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutcome>;
}
