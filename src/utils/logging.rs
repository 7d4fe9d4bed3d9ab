use std::{path::Path, sync::LazyLock};

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_appender::{non_blocking::WorkerGuard, rolling::Rotation};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

const LOG_PREFIX: &str = "anky";
const KEPT_LOG_FILES: usize = 5;
const DEFAULT_LEVEL: &str = "debug";

/// Installs the global subscriber writing into a daily rolling file under `data_dir/logs`.
/// Nothing goes to stdout, the terminal ui owns it. Writes happen on a background thread;
/// keep the returned guard alive until exit so buffered lines get flushed.
pub fn enable_logging(data_dir: &Path, log_level: Option<LevelFilter>) -> Result<WorkerGuard> {
    let appender = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(KEPT_LOG_FILES)
        .filename_prefix(LOG_PREFIX)
        .build(data_dir.join("logs"))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let directive = filter_directive(log_level, std::env::var("RUST_LOG").ok());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directive))
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(writer)
        .with_ansi(false)
        .pretty()
        .init();
    Ok(guard)
}

/// Filter scoped to this crate so ratatui and tokio stay quiet. An explicit level wins over
/// `RUST_LOG`.
fn filter_directive(log_level: Option<LevelFilter>, env_level: Option<String>) -> String {
    let level = log_level
        .map(|v| v.to_string())
        .or(env_level)
        .unwrap_or_else(|| DEFAULT_LEVEL.into());
    format!("{}={level}", env!("CARGO_PKG_NAME").replace('-', "_"))
}

pub static TEST_LOGGING: LazyLock<()> = LazyLock::new(|| {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .pretty()
        .init()
});

#[cfg(test)]
mod tests {
    use tracing::level_filters::LevelFilter;

    use super::filter_directive;

    #[test]
    fn test_filter_prefers_explicit_level() {
        assert_eq!(
            filter_directive(Some(LevelFilter::WARN), Some("trace".into())),
            "anky=warn"
        );
        assert_eq!(filter_directive(None, Some("trace".into())), "anky=trace");
        assert_eq!(filter_directive(None, None), "anky=debug");
    }
}
