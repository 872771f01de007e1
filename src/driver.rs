//! Glue shared by the binaries: logging setup and running a blocking loop
//! under a tokio runtime that turns Ctrl-C into cancellation.

use std::{future::Future, io};

use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    error::Result,
    looper::{CancelToken, LoopReport},
};

/// Installs a stderr `fmt` subscriber filtered by `RUST_LOG`, defaulting to
/// `info`.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Exit status used when a second Ctrl-C forces the process down.
pub const FORCED_EXIT_CODE: i32 = 130;

/// Runs `work` on the blocking pool and cancels it on the first Ctrl-C.
///
/// The loop only observes cancellation between iterations (or while it
/// sleeps out a delay), so an in-flight read or write completes first. A
/// second Ctrl-C exits the process immediately with [`FORCED_EXIT_CODE`].
pub async fn run_cancellable<F>(work: F) -> anyhow::Result<LoopReport>
where
    F: FnOnce(&CancelToken) -> Result<LoopReport> + Send + 'static,
{
    run_until_interrupt(work, tokio::signal::ctrl_c()).await
}

async fn run_until_interrupt<F, I>(work: F, interrupt: I) -> anyhow::Result<LoopReport>
where
    F: FnOnce(&CancelToken) -> Result<LoopReport> + Send + 'static,
    I: Future<Output = io::Result<()>>,
{
    let cancel = CancelToken::new();
    let mut task = tokio::task::spawn_blocking({
        let cancel = cancel.clone();
        move || work(&cancel)
    });

    let joined = tokio::select! {
        res = &mut task => res,
        sig = interrupt => match sig {
            Ok(()) => {
                warn!("interrupt received, stopping after the current iteration");
                cancel.cancel();
                tokio::select! {
                    res = &mut task => res,
                    Ok(()) = tokio::signal::ctrl_c() => {
                        error!("received second interrupt, aborting");
                        std::process::exit(FORCED_EXIT_CODE);
                    }
                }
            }
            Err(e) => {
                warn!("unable to listen for interrupt, Ctrl-C will not stop the loop cleanly: {e}");
                task.await
            }
        },
    };

    Ok(joined??)
}
