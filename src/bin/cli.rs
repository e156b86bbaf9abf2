// src/bin/cli.rs
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ztb_crawler::cli::{self, Args};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ztb_crawler=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if args.list_sites {
        cli::list_sites();
        return Ok(());
    }

    let summary = cli::run(&args)?;
    tracing::info!(created = summary.created(), failed = summary.failed(), "run finished");
    Ok(())
}
