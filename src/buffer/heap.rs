//! Bounds-checked heap buffer.
//!
//! The default backing for stores and maps. Every access goes through slice
//! indexing, so an offset past capacity panics at the access site rather
//! than corrupting neighbouring memory.

use super::Buffer;

/// Heap-allocated buffer with per-access bounds checks.
pub struct HeapBuffer {
    data: Box<[u8]>,
}

impl HeapBuffer {
    fn read<const N: usize>(&self, offset: usize) -> [u8; N] {
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&self.data[offset..offset + N]);
        bytes
    }

    fn write<const N: usize>(&mut self, offset: usize, bytes: [u8; N]) {
        self.data[offset..offset + N].copy_from_slice(&bytes);
    }
}

impl Buffer for HeapBuffer {
    fn allocate(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity].into_boxed_slice(),
        }
    }

    fn capacity(&self) -> usize {
        self.data.len()
    }

    fn get_u8(&self, offset: usize) -> u8 {
        self.data[offset]
    }

    fn put_u8(&mut self, offset: usize, value: u8) {
        self.data[offset] = value;
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
        self.data[..len].copy_from_slice(&src.data[..len]);
    }
}

impl std::fmt::Debug for HeapBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeapBuffer")
            .field("capacity", &self.data.len())
            .finish()
    }
}
