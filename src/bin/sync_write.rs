use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::Parser;

use dio_loop::{
    config::{self, Iterations, WriteConfig},
    driver, looper,
};

/// Repeatedly write a short message at the start of a file with O_SYNC.
#[derive(Parser)]
#[command(name = "sync-write")]
#[command(version)]
struct Cli {
    /// File to write, created if absent
    #[arg(long, default_value = config::DEFAULT_WRITE_PATH)]
    path: PathBuf,

    /// Message written by every iteration
    #[arg(long)]
    message: Option<String>,

    /// Number of write and rewind cycles (runs until Ctrl-C when omitted)
    #[arg(long)]
    iterations: Option<u64>,

    /// Sleep between iterations, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,
}

impl From<Cli> for WriteConfig {
    fn from(cli: Cli) -> Self {
        WriteConfig {
            path: cli.path,
            message: cli
                .message
                .map_or_else(|| config::DEFAULT_MESSAGE.to_vec(), String::into_bytes),
            iterations: Iterations::from(cli.iterations),
            delay: cli.delay_ms.map(Duration::from_millis),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = WriteConfig::from(Cli::parse());
    driver::init_logging();

    driver::run_cancellable(move |cancel| looper::run_sync_write(&config, cancel)).await?;
    Ok(())
}
