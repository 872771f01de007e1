use std::{
    ffi::CString,
    io::{self, Read, Write},
    os::unix::ffi::OsStrExt,
    path::Path,
};

use libc::c_int;

/// An open file descriptor driven with raw `read`/`write`/`lseek` calls.
///
/// The descriptor is closed on drop, so every exit path of a looper releases
/// it without extra bookkeeping.
pub struct RawFile {
    file_descriptor: c_int,
}

impl Drop for RawFile {
    fn drop(&mut self) {
        let rt = unsafe { libc::close(self.file_descriptor) };
        if rt != 0 {
            tracing::warn!(
                fd = self.file_descriptor,
                "close error: {}",
                io::Error::last_os_error()
            );
        }
    }
}

impl RawFile {
    /// Opens `path` read-only. With `direct` set the page cache is bypassed
    /// (`O_DIRECT`), which puts alignment requirements on every read.
    pub fn open_read(path: &Path, direct: bool) -> io::Result<Self> {
        let mut flags = libc::O_RDONLY | libc::O_CLOEXEC;
        if direct {
            flags |= libc::O_DIRECT;
        }
        Self::open_with(path, flags, 0)
    }

    /// Opens `path` write-only, creating it if absent. Every write blocks
    /// until the data reaches stable storage (`O_SYNC`). Existing content is
    /// not truncated.
    pub fn open_sync_write(path: &Path) -> io::Result<Self> {
        let flags = libc::O_WRONLY | libc::O_CREAT | libc::O_SYNC | libc::O_CLOEXEC;
        Self::open_with(path, flags, 0o644)
    }

    fn open_with(path: &Path, flags: c_int, mode: libc::mode_t) -> io::Result<Self> {
        let path = CString::new(path.as_os_str().as_bytes())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let fd = unsafe { libc::open(path.as_ptr(), flags, mode as libc::c_uint) };
        if fd == -1 {
            Err(io::Error::last_os_error())
        } else {
            Ok(Self { file_descriptor: fd })
        }
    }

    pub fn fd(&self) -> c_int {
        self.file_descriptor
    }

    /// Moves the file offset back to the start of the file.
    pub fn rewind(&self) -> io::Result<()> {
        let rt = unsafe { libc::lseek(self.file_descriptor, 0, libc::SEEK_SET) };
        if rt == -1 {
            Err(io::Error::last_os_error())
        } else {
            Ok(())
        }
    }

    fn read_direct(&self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let rt = unsafe { libc::read(self.file_descriptor, buf.as_mut_ptr().cast(), buf.len()) };
        if rt >= 0 {
            Ok(rt as usize)
        } else {
            Err(io::Error::last_os_error())
        }
    }

    fn write_direct(&self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let rt = unsafe { libc::write(self.file_descriptor, buf.as_ptr().cast(), buf.len()) };
        if rt >= 0 {
            Ok(rt as usize)
        } else {
            Err(io::Error::last_os_error())
        }
    }
}

impl Read for RawFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_direct(buf)
    }
}

impl Write for RawFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_direct(buf)
    }

    // O_SYNC writes are already durable when `write` returns.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
