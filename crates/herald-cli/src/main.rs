mod bootstrap_helpers;
mod cli_args;
mod herald_runtime;

use anyhow::Result;
use clap::Parser;

use crate::bootstrap_helpers::init_tracing;
use crate::cli_args::Cli;
use crate::herald_runtime::run_herald;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    run_herald(cli).await
}
