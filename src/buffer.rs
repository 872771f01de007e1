use std::{
    alloc::{self, Layout},
    ptr::NonNull,
};

use crate::error::{Error, Result};

/// Zeroed heap block whose start address is a multiple of `alignment`.
///
/// Direct IO rejects buffers that are not aligned to the logical block size
/// of the device, so the read looper allocates one of these up front and
/// reuses it for every iteration.
pub struct AlignedBuffer {
    ptr: NonNull<u8>,
    layout: Layout,
}

// Owns its allocation exclusively.
unsafe impl Send for AlignedBuffer {}

impl AlignedBuffer {
    pub fn new(size: usize, alignment: usize) -> Result<Self> {
        let alloc_err = || Error::Alloc { size, alignment };
        if size == 0 {
            return Err(alloc_err());
        }
        let layout = Layout::from_size_align(size, alignment).map_err(|_| alloc_err())?;
        let ptr = unsafe { alloc::alloc_zeroed(layout) };
        let ptr = NonNull::new(ptr).ok_or_else(alloc_err)?;
        Ok(Self { ptr, layout })
    }

    pub fn len(&self) -> usize {
        self.layout.size()
    }

    pub fn alignment(&self) -> usize {
        self.layout.align()
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    pub fn as_slice(&self) -> &[u8] {
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len()) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len()) }
    }
}

impl Drop for AlignedBuffer {
    fn drop(&mut self) {
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_is_multiple_of_alignment() {
        for alignment in [512, 4096] {
            let buf = AlignedBuffer::new(4096, alignment).unwrap();
            assert_eq!(buf.as_ptr() as usize % alignment, 0);
            assert_eq!(buf.len(), 4096);
            assert_eq!(buf.alignment(), alignment);
        }
    }

    #[test]
    fn starts_zeroed_and_is_writable() {
        let mut buf = AlignedBuffer::new(1024, 512).unwrap();
        assert!(buf.as_slice().iter().all(|&b| b == 0));
        buf.as_mut_slice()[1023] = 0xAB;
        assert_eq!(buf.as_slice()[1023], 0xAB);
    }

    #[test]
    fn rejects_bad_layouts() {
        assert!(matches!(
            AlignedBuffer::new(4096, 300),
            Err(Error::Alloc { size: 4096, alignment: 300 })
        ));
        assert!(matches!(AlignedBuffer::new(0, 512), Err(Error::Alloc { .. })));
    }
}
