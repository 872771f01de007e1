use std::{path::PathBuf, time::Duration};

use crate::error::{Error, Result};

pub const DEFAULT_READ_PATH: &str = "/etc/passwd";
pub const DEFAULT_BUFFER_SIZE: usize = 4096;
/// Typical logical sector size of a block device.
pub const DEFAULT_ALIGNMENT: usize = 512;
pub const DEFAULT_READ_ITERATIONS: u64 = 10_000;

pub const DEFAULT_WRITE_PATH: &str = "test";
pub const DEFAULT_MESSAGE: &[u8] = b"This is my message\n";

/// How many times a looper repeats its body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Iterations {
    Count(u64),
    UntilCancelled,
}

impl Iterations {
    /// Whether iteration `i` (zero based) is within the bound.
    pub fn allows(&self, i: u64) -> bool {
        match *self {
            Iterations::Count(n) => i < n,
            Iterations::UntilCancelled => true,
        }
    }
}

impl From<Option<u64>> for Iterations {
    fn from(count: Option<u64>) -> Self {
        count.map_or(Iterations::UntilCancelled, Iterations::Count)
    }
}

#[derive(Debug, Clone)]
pub struct ReadConfig {
    pub path: PathBuf,
    pub buffer_size: usize,
    pub alignment: usize,
    pub iterations: Iterations,
    /// Bypass the page cache with `O_DIRECT`.
    pub direct: bool,
    pub delay: Option<Duration>,
}

impl Default for ReadConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_READ_PATH),
            buffer_size: DEFAULT_BUFFER_SIZE,
            alignment: DEFAULT_ALIGNMENT,
            iterations: Iterations::Count(DEFAULT_READ_ITERATIONS),
            direct: true,
            delay: None,
        }
    }
}

impl ReadConfig {
    pub fn validate(&self) -> Result<()> {
        if self.alignment == 0 || !self.alignment.is_power_of_two() {
            return Err(Error::InvalidConfig(format!(
                "alignment {} is not a power of two",
                self.alignment
            )));
        }
        if self.buffer_size == 0 {
            return Err(Error::InvalidConfig("buffer size must be non-zero".into()));
        }
        if self.direct && self.buffer_size % self.alignment != 0 {
            return Err(Error::InvalidConfig(format!(
                "buffer size {} is not a multiple of alignment {} required for direct IO",
                self.buffer_size, self.alignment
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct WriteConfig {
    pub path: PathBuf,
    pub message: Vec<u8>,
    pub iterations: Iterations,
    pub delay: Option<Duration>,
}

impl Default for WriteConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_WRITE_PATH),
            message: DEFAULT_MESSAGE.to_vec(),
            iterations: Iterations::UntilCancelled,
            delay: None,
        }
    }
}

impl WriteConfig {
    pub fn validate(&self) -> Result<()> {
        if self.message.is_empty() {
            return Err(Error::InvalidConfig("message must be non-empty".into()));
        }
        Ok(())
    }
}
