//! Two small loopers over the raw file IO path.
//!
//! [`looper::run_direct_read`] reads the start of a file over and over with
//! `O_DIRECT` into an aligned buffer. [`looper::run_sync_write`] overwrites
//! the start of a file over and over with `O_SYNC` writes. Both rewind to
//! offset zero after every call.

pub mod buffer;
pub mod config;
pub mod driver;
pub mod error;
pub mod file;
pub mod looper;

pub use buffer::AlignedBuffer;
pub use config::{Iterations, ReadConfig, WriteConfig};
pub use error::{Error, ErrorKind, Result};
pub use file::RawFile;
pub use looper::{run_direct_read, run_sync_write, CancelToken, LoopReport};
