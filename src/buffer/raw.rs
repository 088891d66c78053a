//! Unchecked raw-memory buffer.
//!
//! Backs stores and maps whose upstream arithmetic already guarantees every
//! offset is in bounds, removing the per-access branch the checked variant
//! pays. Out-of-range offsets are caught by `debug_assert!` in debug builds
//! only; in release builds they are undefined behavior.

use std::alloc::{self, Layout};
use std::ptr::{self, NonNull};

use super::Buffer;

/// Buffer over a raw allocation with debug-only bounds checks.
///
/// # Preconditions
///
/// Every access must satisfy `offset + width <= capacity()`. Release builds
/// do not verify this; violating it reads or writes memory outside the
/// allocation. The buffer owns its allocation exclusively, and shared
/// references only permit reads.
pub struct RawBuffer {
    ptr: NonNull<u8>,
    capacity: usize,
}

impl RawBuffer {
    #[inline]
    fn check(&self, offset: usize, width: usize) {
        debug_assert!(
            offset + width <= self.capacity,
            "buffer access out of bounds: offset {offset} width {width} capacity {}",
            self.capacity
        );
    }

    #[inline]
    fn read<const N: usize>(&self, offset: usize) -> [u8; N] {
        self.check(offset, N);
        // SAFETY: The access contract requires offset + N <= capacity
        // (debug-asserted above), so the read stays inside the allocation
        // made in allocate(). read_unaligned imposes no alignment.
        unsafe { ptr::read_unaligned(self.ptr.as_ptr().add(offset).cast::<[u8; N]>()) }
    }

    #[inline]
    fn write<const N: usize>(&mut self, offset: usize, bytes: [u8; N]) {
        self.check(offset, N);
        // SAFETY: Same bounds argument as read(). &mut self guarantees
        // exclusive access to the allocation.
        unsafe { ptr::write_unaligned(self.ptr.as_ptr().add(offset).cast::<[u8; N]>(), bytes) }
    }
}

impl Buffer for RawBuffer {
    fn allocate(capacity: usize) -> Self {
        if capacity == 0 {
            return Self {
                ptr: NonNull::dangling(),
                capacity: 0,
            };
        }
        let layout =
            Layout::array::<u8>(capacity).expect("buffer capacity overflows a memory layout");
        // SAFETY: capacity > 0, so the layout has non-zero size.
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let Some(ptr) = NonNull::new(raw) else {
            alloc::handle_alloc_error(layout);
        };
        Self { ptr, capacity }
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn get_u8(&self, offset: usize) -> u8 {
        self.read::<1>(offset)[0]
    }

    fn put_u8(&mut self, offset: usize, value: u8) {
        self.write(offset, [value]);
    }

    fn get_u16(&self, offset: usize) -> u16 {
        u16::from_le_bytes(self.read(offset))
    }

    fn put_u16(&mut self, offset: usize, value: u16) {
        self.write(offset, value.to_le_bytes());
    }

    fn get_i32(&self, offset: usize) -> i32 {
        i32::from_le_bytes(self.read(offset))
    }

    fn put_i32(&mut self, offset: usize, value: i32) {
        self.write(offset, value.to_le_bytes());
    }

    fn get_i64(&self, offset: usize) -> i64 {
        i64::from_le_bytes(self.read(offset))
    }

    fn put_i64(&mut self, offset: usize, value: i64) {
        self.write(offset, value.to_le_bytes());
    }

    fn copy_from(&mut self, src: &Self, len: usize) {
        self.check(0, len);
        src.check(0, len);
        // SAFETY: len fits inside both allocations (debug-asserted above).
        // Source and destination are distinct objects because &mut self
        // excludes any other reference to this buffer, and distinct
        // allocations never overlap. A zero-length copy is valid for any
        // pointer, including the dangling pointer of an empty buffer.
        unsafe { ptr::copy_nonoverlapping(src.ptr.as_ptr(), self.ptr.as_ptr(), len) }
    }
}

impl Drop for RawBuffer {
    fn drop(&mut self) {
        if self.capacity > 0 {
            // SAFETY: ptr came from alloc_zeroed in allocate() with exactly
            // this size and align 1, and is released only here.
            unsafe {
                let layout = Layout::from_size_align_unchecked(self.capacity, 1);
                alloc::dealloc(self.ptr.as_ptr(), layout);
            }
        }
    }
}

// The allocation is exclusively owned, mutation requires &mut self, and
// shared references only permit reads.
unsafe impl Send for RawBuffer {}
unsafe impl Sync for RawBuffer {}

impl std::fmt::Debug for RawBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawBuffer")
            .field("capacity", &self.capacity)
            .finish()
    }
}
