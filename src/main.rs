use clap::Parser;
use devstart::utils::logger;
use devstart::{build_steps, BootstrapSequence, CliConfig, ProcessRunner, StepFilter};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting devstart");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Failed to load configuration: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    // build_steps 會驗證配置
    let mut steps = match build_steps(&config) {
        Ok(steps) => steps,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let filter = StepFilter::new(cli.only.clone(), cli.skip.clone());
    if !filter.is_empty() {
        if let Err(e) = filter.apply(&mut steps) {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }

    let execution_id = cli.execution_id();

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No commands will be executed");
        println!("📝 Execution plan ({}):", execution_id);
        for (index, step) in steps.iter().enumerate() {
            let status = if step.enabled { "✅" } else { "⏸️" };
            println!(
                "  {}. {} {} [{}] {}",
                index + 1,
                status,
                step.name,
                step.failure_mode,
                step.describe()
            );
        }
        return Ok(());
    }

    let sequence =
        BootstrapSequence::new(execution_id, Arc::new(ProcessRunner::new())).with_steps(steps);

    // Ctrl-C 會送到整個 process group，dev server 自行結束後再寫報告
    let report = sequence
        .execute_until_interrupted(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("⚠️ Could not listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    if let Some(path) = &cli.report {
        if let Err(e) = report.write_to_file(path).await {
            tracing::warn!("⚠️ Could not write report to {}: {}", path, e);
        }
    }

    if let Some(e) = &report.failure {
        eprintln!("❌ {}", e);
        std::process::exit(report.exit_code());
    }

    Ok(())
}
