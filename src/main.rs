//! Marquee - movie and TV catalog queries from the command line
//!
//! # Usage
//!
//! ```bash
//! marquee trending
//! marquee search "blade runner" --json
//! marquee show 1396
//! RUST_LOG=marquee=debug marquee movie 27205
//! ```

use clap::Parser;
use tracing_subscriber::EnvFilter;

use marquee::cli::{Cli, ExitCode};
use marquee::commands;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit_code: ExitCode = commands::run(cli).await;
    std::process::exit(exit_code.into());
}

/// Logs go to stderr so stdout stays parseable JSON
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("marquee=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
