use std::{io, path::PathBuf};

/// Broad classification of a looper failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    ResourceAcquisition,
    IoOperation,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("alloc {size} bytes aligned to {alignment}: allocation failed")]
    Alloc { size: usize, alignment: usize },

    #[error("open {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("read (iteration {iteration})")]
    Read {
        iteration: u64,
        #[source]
        source: io::Error,
    },

    #[error("write (iteration {iteration})")]
    Write {
        iteration: u64,
        #[source]
        source: io::Error,
    },

    #[error("seek (iteration {iteration})")]
    Seek {
        iteration: u64,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidConfig(_) => ErrorKind::Config,
            Error::Alloc { .. } | Error::Open { .. } => ErrorKind::ResourceAcquisition,
            Error::Read { .. } | Error::Write { .. } | Error::Seek { .. } => ErrorKind::IoOperation,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
