use anyhow::Result;
use clap::Parser;

use syncline::{app, cli};

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // The core is cooperative and single-threaded; listener delivery order
    // stays deterministic without a work-stealing scheduler.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(app::run(cli))
}
