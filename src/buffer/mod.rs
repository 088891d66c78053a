//! # Buffer Abstraction
//!
//! This module defines the byte-region abstraction everything else in the
//! crate writes through. A `Buffer` is a fixed-capacity region of memory
//! addressed by absolute byte offsets, with typed accessors for the primitive
//! widths the record and map layouts use.
//!
//! ## Design Overview
//!
//! Record stores and sequence maps lay their data out with explicit offsets
//! rather than Rust struct layouts, so the same bytes mean the same thing
//! regardless of which buffer implementation backs them. Two implementations
//! are provided:
//!
//! - [`HeapBuffer`]: a heap allocation with slice-index bounds checks. An
//!   out-of-range access panics at the access site.
//! - [`RawBuffer`]: a raw allocation accessed through unaligned pointer
//!   reads and writes. Bounds are checked only by `debug_assert!`; release
//!   builds trust the caller.
//!
//! Both behave identically for every in-bounds access. The unchecked variant
//! exists for hot paths where the slot and bucket arithmetic upstream already
//! guarantees bounds.
//!
//! ## Byte Order
//!
//! All multi-byte accessors use little-endian byte order. Floating-point
//! values move as their raw bit pattern, so any NaN payload survives a
//! round-trip bit for bit.
//!
//! ## Thread Safety
//!
//! A buffer is exclusively owned by its store or map. Mutation requires
//! `&mut self`, so the compiler enforces the single-writer model.

mod heap;
mod raw;

pub use heap::HeapBuffer;
pub use raw::RawBuffer;

/// A fixed-capacity byte region with typed little-endian access.
///
/// Every accessor requires `offset + width <= capacity()`. How a violation
/// is reported depends on the implementation: [`HeapBuffer`] panics at the
/// access site, [`RawBuffer`] only checks in debug builds.
pub trait Buffer {
    /// Allocates a zero-filled region of `capacity` bytes.
    fn allocate(capacity: usize) -> Self;

    /// Region size in bytes.
    fn capacity(&self) -> usize;

    fn get_u8(&self, offset: usize) -> u8;
    fn put_u8(&mut self, offset: usize, value: u8);

    fn get_u16(&self, offset: usize) -> u16;
    fn put_u16(&mut self, offset: usize, value: u16);

    fn get_i32(&self, offset: usize) -> i32;
    fn put_i32(&mut self, offset: usize, value: i32);

    fn get_i64(&self, offset: usize) -> i64;
    fn put_i64(&mut self, offset: usize, value: i64);

    /// Reads a float stored as its raw bit pattern.
    fn get_f64(&self, offset: usize) -> f64 {
        f64::from_bits(self.get_i64(offset) as u64)
    }

    /// Writes a float as its raw bit pattern. NaN payloads are preserved.
    fn put_f64(&mut self, offset: usize, value: f64) {
        self.put_i64(offset, value.to_bits() as i64);
    }

    /// Copies the first `len` bytes of `src` into the start of this buffer.
    /// Used when a store grows: slot contents move verbatim, so record
    /// bytes, ids, and slot indices all survive the copy.
    fn copy_from(&mut self, src: &Self, len: usize);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise_round_trips<B: Buffer>() {
        let mut buffer = B::allocate(64);
        assert_eq!(buffer.capacity(), 64);

        buffer.put_u8(0, 0xAB);
        buffer.put_u16(1, 0xBEEF);
        buffer.put_i32(3, -7_654_321);
        buffer.put_i64(7, i64::MIN + 17);
        buffer.put_f64(15, -1234.5678);

        assert_eq!(buffer.get_u8(0), 0xAB);
        assert_eq!(buffer.get_u16(1), 0xBEEF);
        assert_eq!(buffer.get_i32(3), -7_654_321);
        assert_eq!(buffer.get_i64(7), i64::MIN + 17);
        assert_eq!(buffer.get_f64(15), -1234.5678);
    }

    fn exercise_zero_fill<B: Buffer>() {
        let buffer = B::allocate(32);
        for offset in 0..32 {
            assert_eq!(buffer.get_u8(offset), 0);
        }
    }

    fn exercise_nan_bits<B: Buffer>() {
        let mut buffer = B::allocate(8);
        let payload = f64::from_bits(0x7FF8_DEAD_BEEF_0001);
        buffer.put_f64(0, payload);
        let back = buffer.get_f64(0);
        assert!(back.is_nan());
        assert_eq!(back.to_bits(), 0x7FF8_DEAD_BEEF_0001);
    }

    fn exercise_little_endian<B: Buffer>() {
        let mut buffer = B::allocate(8);
        buffer.put_i32(0, 0x0403_0201);
        assert_eq!(buffer.get_u8(0), 0x01);
        assert_eq!(buffer.get_u8(1), 0x02);
        assert_eq!(buffer.get_u8(2), 0x03);
        assert_eq!(buffer.get_u8(3), 0x04);
    }

    fn exercise_unaligned_access<B: Buffer>() {
        let mut buffer = B::allocate(16);
        buffer.put_i64(3, 0x1122_3344_5566_7788);
        assert_eq!(buffer.get_i64(3), 0x1122_3344_5566_7788);
    }

    fn exercise_copy_from<B: Buffer>() {
        let mut src = B::allocate(16);
        for offset in 0..16 {
            src.put_u8(offset, offset as u8 + 1);
        }
        let mut dst = B::allocate(32);
        dst.copy_from(&src, 16);
        for offset in 0..16 {
            assert_eq!(dst.get_u8(offset), offset as u8 + 1);
        }
        for offset in 16..32 {
            assert_eq!(dst.get_u8(offset), 0);
        }
    }

    #[test]
    fn heap_buffer_round_trips_all_widths() {
        exercise_round_trips::<HeapBuffer>();
    }

    #[test]
    fn raw_buffer_round_trips_all_widths() {
        exercise_round_trips::<RawBuffer>();
    }

    #[test]
    fn heap_buffer_allocates_zeroed() {
        exercise_zero_fill::<HeapBuffer>();
    }

    #[test]
    fn raw_buffer_allocates_zeroed() {
        exercise_zero_fill::<RawBuffer>();
    }

    #[test]
    fn heap_buffer_preserves_nan_payload() {
        exercise_nan_bits::<HeapBuffer>();
    }

    #[test]
    fn raw_buffer_preserves_nan_payload() {
        exercise_nan_bits::<RawBuffer>();
    }

    #[test]
    fn heap_buffer_stores_little_endian() {
        exercise_little_endian::<HeapBuffer>();
    }

    #[test]
    fn raw_buffer_stores_little_endian() {
        exercise_little_endian::<RawBuffer>();
    }

    #[test]
    fn heap_buffer_handles_unaligned_offsets() {
        exercise_unaligned_access::<HeapBuffer>();
    }

    #[test]
    fn raw_buffer_handles_unaligned_offsets() {
        exercise_unaligned_access::<RawBuffer>();
    }

    #[test]
    fn heap_buffer_copies_verbatim() {
        exercise_copy_from::<HeapBuffer>();
    }

    #[test]
    fn raw_buffer_copies_verbatim() {
        exercise_copy_from::<RawBuffer>();
    }

    #[test]
    fn zero_capacity_buffers_are_valid() {
        let heap = HeapBuffer::allocate(0);
        assert_eq!(heap.capacity(), 0);
        let raw = RawBuffer::allocate(0);
        assert_eq!(raw.capacity(), 0);
    }

    #[test]
    #[should_panic]
    fn heap_buffer_panics_past_capacity() {
        let buffer = HeapBuffer::allocate(8);
        let _ = buffer.get_i64(1);
    }

    #[test]
    #[should_panic]
    fn heap_buffer_panics_on_straddling_write() {
        let mut buffer = HeapBuffer::allocate(10);
        buffer.put_i64(4, 1);
    }
}
