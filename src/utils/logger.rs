use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const QUIET_DIRECTIVES: &str = "devstart=info";
const VERBOSE_DIRECTIVES: &str = "devstart=debug,info";

/// `RUST_LOG` 優先；未設定或無法解析時依 `--verbose` 決定
pub fn build_filter(verbose: bool, env_directives: Option<&str>) -> EnvFilter {
    let fallback = if verbose {
        VERBOSE_DIRECTIVES
    } else {
        QUIET_DIRECTIVES
    };

    env_directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(fallback))
}

/// 日誌寫到 stderr，stdout 留給 dev server 與 dry-run 計畫
pub fn init_cli_logger(verbose: bool) {
    let env_directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::registry()
        .with(build_filter(verbose, env_directives.as_deref()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}
