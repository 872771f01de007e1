use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::Parser;

use dio_loop::{
    config::{self, Iterations, ReadConfig},
    driver, looper,
};

/// Repeatedly read the start of a file with direct IO, rewinding after each read.
#[derive(Parser)]
#[command(name = "direct-read")]
#[command(version)]
struct Cli {
    /// File to read
    #[arg(long, default_value = config::DEFAULT_READ_PATH)]
    path: PathBuf,

    /// Bytes requested by each read
    #[arg(long, default_value_t = config::DEFAULT_BUFFER_SIZE)]
    buffer_size: usize,

    /// Buffer address alignment in bytes
    #[arg(long, default_value_t = config::DEFAULT_ALIGNMENT)]
    alignment: usize,

    /// Number of read and rewind cycles
    #[arg(long, default_value_t = config::DEFAULT_READ_ITERATIONS)]
    iterations: u64,

    /// Go through the page cache instead of using O_DIRECT
    #[arg(long)]
    buffered: bool,

    /// Sleep between iterations, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,
}

impl From<Cli> for ReadConfig {
    fn from(cli: Cli) -> Self {
        ReadConfig {
            path: cli.path,
            buffer_size: cli.buffer_size,
            alignment: cli.alignment,
            iterations: Iterations::Count(cli.iterations),
            direct: !cli.buffered,
            delay: cli.delay_ms.map(Duration::from_millis),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = ReadConfig::from(Cli::parse());
    driver::init_logging();

    driver::run_cancellable(move |cancel| looper::run_direct_read(&config, cancel)).await?;
    Ok(())
}
