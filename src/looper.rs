//! The two loop drivers.
//!
//! Both follow the same shape: acquire resources, repeat a two step body
//! (one IO call, then a rewind to offset zero) and release everything on
//! the way out. Resources are owned by RAII guards so that an error in any
//! iteration still frees the buffer and closes the descriptor.

use std::{
    io::{Read, Write},
    sync::{Arc, Condvar, Mutex},
    time::{Duration, Instant},
};

use tracing::{debug, info};

use crate::{
    buffer::AlignedBuffer,
    config::{Iterations, ReadConfig, WriteConfig},
    error::{Error, Result},
    file::RawFile,
};

/// Shared flag used to stop a running loop at the next iteration boundary.
///
/// Cancelling also wakes a loop that is sleeping out its inter-iteration
/// delay.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<(Mutex<bool>, Condvar)>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let (lock, cvar) = &*self.0;
        *lock.lock().unwrap_or_else(|e| e.into_inner()) = true;
        cvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        let (lock, _) = &*self.0;
        *lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Blocks for up to `timeout`, returning early with `true` once the
    /// token is cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &*self.0;
        let deadline = Instant::now() + timeout;
        let mut cancelled = lock.lock().unwrap_or_else(|e| e.into_inner());
        while !*cancelled {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            cancelled = cvar
                .wait_timeout(cancelled, deadline - now)
                .unwrap_or_else(|e| e.into_inner())
                .0;
        }
        *cancelled
    }
}

/// What a finished loop did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopReport {
    pub iterations: u64,
    pub bytes: u64,
    /// Reads that returned fewer bytes than the buffer holds.
    pub short_reads: u64,
    pub cancelled: bool,
}

/// Repeatedly reads `buffer_size` bytes from the start of `config.path`
/// into an aligned buffer, bypassing the page cache unless `direct` is off.
///
/// Short reads are not errors. Any failing call ends the loop and is
/// returned with the iteration it happened in.
pub fn run_direct_read(config: &ReadConfig, cancel: &CancelToken) -> Result<LoopReport> {
    config.validate()?;

    let mut buffer = AlignedBuffer::new(config.buffer_size, config.alignment)?;
    let mut file = RawFile::open_read(&config.path, config.direct).map_err(|source| {
        Error::Open {
            path: config.path.clone(),
            source,
        }
    })?;
    info!(
        path = %config.path.display(),
        fd = file.fd(),
        buffer_size = config.buffer_size,
        alignment = config.alignment,
        direct = config.direct,
        iterations = ?config.iterations,
        "starting read loop"
    );

    let mut report = LoopReport::default();
    let mut iteration = 0;
    while config.iterations.allows(iteration) {
        if cancel.is_cancelled() {
            report.cancelled = true;
            break;
        }

        let n = file
            .read(buffer.as_mut_slice())
            .map_err(|source| Error::Read { iteration, source })?;
        file.rewind()
            .map_err(|source| Error::Seek { iteration, source })?;

        if n < buffer.len() {
            report.short_reads += 1;
        }
        report.bytes += n as u64;
        report.iterations += 1;
        iteration += 1;

        pause(config.delay, config.iterations, iteration, cancel);
    }

    finish("read", &report);
    Ok(report)
}

/// Repeatedly writes `config.message` at the start of `config.path` with
/// synchronous writes, creating the file if needed.
///
/// Open and write failures are both fatal.
pub fn run_sync_write(config: &WriteConfig, cancel: &CancelToken) -> Result<LoopReport> {
    config.validate()?;

    let mut file = RawFile::open_sync_write(&config.path).map_err(|source| Error::Open {
        path: config.path.clone(),
        source,
    })?;
    info!(
        path = %config.path.display(),
        fd = file.fd(),
        message_len = config.message.len(),
        iterations = ?config.iterations,
        "starting write loop"
    );

    let mut report = LoopReport::default();
    let mut iteration = 0;
    while config.iterations.allows(iteration) {
        if cancel.is_cancelled() {
            report.cancelled = true;
            break;
        }

        file.write_all(&config.message)
            .map_err(|source| Error::Write { iteration, source })?;
        file.rewind()
            .map_err(|source| Error::Seek { iteration, source })?;

        report.bytes += config.message.len() as u64;
        report.iterations += 1;
        iteration += 1;

        pause(config.delay, config.iterations, iteration, cancel);
    }

    finish("write", &report);
    Ok(report)
}

fn pause(delay: Option<Duration>, iterations: Iterations, next: u64, cancel: &CancelToken) {
    if let Some(delay) = delay {
        if iterations.allows(next) {
            cancel.wait_timeout(delay);
        }
    }
}

fn finish(what: &str, report: &LoopReport) {
    if report.cancelled {
        info!(iterations = report.iterations, "{what} loop cancelled");
    } else {
        info!(iterations = report.iterations, bytes = report.bytes, "{what} loop finished");
    }
    debug!(short_reads = report.short_reads, "{what} loop report");
}
