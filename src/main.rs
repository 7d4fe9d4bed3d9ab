use anky::cli::run_cli;
use anyhow::Result;

fn main() -> Result<()> {
    // Logging may not be up yet, so failures go to stderr through the returned error.
    run_cli()
}
