use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, level_filters::LevelFilter};

use crate::{
    storage::writing_storage::WritingStorageImpl,
    tui::run_tui,
    utils::{
        clock::DefaultClock,
        dir::{create_application_default_path, create_dir},
        logging::enable_logging,
        runtime::multi_thread_runtime,
    },
};

pub const DEFAULT_WRITINGS_DIR: &str = "writings";

#[derive(Parser, Debug)]
#[command(name = "anky", version, long_about = None)]
#[command(about = "Keep typing or the bar runs out and your writing gets saved")]
pub struct Args {
    #[arg(
        long,
        default_value = DEFAULT_WRITINGS_DIR,
        help = "Directory the writings are saved into. Created when missing"
    )]
    pub dir: PathBuf,
    #[arg(
        long = "data-dir",
        help = "Application directory for logs. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    pub data_dir: Option<PathBuf>,
    #[arg(
        long = "log-filter",
        help = "Log level. Falls back to RUST_LOG and then to debug"
    )]
    pub log: Option<LevelFilter>,
}

pub fn run_cli() -> Result<()> {
    run(Args::parse())
}

pub fn run(args: Args) -> Result<()> {
    let app_dir = args
        .data_dir
        .map_or_else(create_application_default_path, create_dir)?;
    let _log_guard = enable_logging(&app_dir, args.log)?;

    let storage = WritingStorageImpl::new(args.dir.clone())
        .inspect_err(|e| error!("Failed to create directory {:?}: {e}", args.dir))?;
    info!("Writings are kept in {:?}", storage.dir());

    multi_thread_runtime()?.block_on(run_tui(Arc::new(storage), Arc::new(DefaultClock)))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::{CommandFactory, Parser};
    use tracing::level_filters::LevelFilter;

    use super::Args;

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["anky"]).unwrap();
        assert_eq!(args.dir, PathBuf::from("writings"));
        assert!(args.data_dir.is_none());
        assert!(args.log.is_none());
    }

    #[test]
    fn test_explicit_values() {
        let args = Args::try_parse_from([
            "anky",
            "--dir",
            "/tmp/journal",
            "--data-dir",
            "/tmp/state",
            "--log-filter",
            "warn",
        ])
        .unwrap();
        assert_eq!(args.dir, PathBuf::from("/tmp/journal"));
        assert_eq!(args.data_dir, Some(PathBuf::from("/tmp/state")));
        assert_eq!(args.log, Some(LevelFilter::WARN));
    }

    #[test]
    fn test_rejects_unknown_level() {
        assert!(Args::try_parse_from(["anky", "--log-filter", "loud"]).is_err());
    }
}
