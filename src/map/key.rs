//! Key unit parameterization for sequence maps.
//!
//! A sequence map stores keys inline as fixed-width units: raw bytes for
//! `[u8]` keys, UTF-16 code units for `str` keys. `SequenceKey` carries the
//! unit width and the per-unit operations the table engine needs, keeping
//! the probe and resize logic identical across both key families.
//!
//! ## Hashing
//!
//! Key hashes must be deterministic across runs and cover every unit of the
//! key, so the table uses xxh3 rather than the std `DefaultHasher` (which
//! guarantees neither). Hashing streams each unit's little-endian bytes,
//! which makes `hash_stored` over a bucket's unit region produce exactly the
//! digest `hash_units` produced for the original key. Table resizes rehash
//! stored units without ever materializing the original keys.

use xxhash_rust::xxh3::{xxh3_64, Xxh3};

use crate::buffer::Buffer;

/// A key type storable inline in a sequence map.
///
/// Implemented for `[u8]` (1-byte units) and `str` (2-byte UTF-16 units).
pub trait SequenceKey {
    /// Bytes per key unit.
    const UNIT_WIDTH: usize;

    /// Number of units in this key.
    fn unit_count(&self) -> usize;

    /// Writes every unit of this key starting at `offset`.
    fn write_units<B: Buffer>(&self, buffer: &mut B, offset: usize);

    /// Compares this key against `unit_count()` stored units at `offset`.
    /// Callers compare unit counts first; this checks content only.
    fn matches_units<B: Buffer>(&self, buffer: &B, offset: usize) -> bool;

    /// Content hash of this key's units.
    fn hash_units(&self) -> u64;

    /// Content hash of `unit_count` stored units at `offset`. Produces the
    /// same digest `hash_units` produced for the key those units came from.
    fn hash_stored<B: Buffer>(buffer: &B, offset: usize, unit_count: usize) -> u64;
}

impl SequenceKey for [u8] {
    const UNIT_WIDTH: usize = 1;

    fn unit_count(&self) -> usize {
        self.len()
    }

    fn write_units<B: Buffer>(&self, buffer: &mut B, offset: usize) {
        for (i, &byte) in self.iter().enumerate() {
            buffer.put_u8(offset + i, byte);
        }
    }

    fn matches_units<B: Buffer>(&self, buffer: &B, offset: usize) -> bool {
        self.iter()
            .enumerate()
            .all(|(i, &byte)| buffer.get_u8(offset + i) == byte)
    }

    fn hash_units(&self) -> u64 {
        xxh3_64(self)
    }

    fn hash_stored<B: Buffer>(buffer: &B, offset: usize, unit_count: usize) -> u64 {
        let mut hasher = Xxh3::new();
        for i in 0..unit_count {
            hasher.update(&[buffer.get_u8(offset + i)]);
        }
        hasher.digest()
    }
}

impl SequenceKey for str {
    const UNIT_WIDTH: usize = 2;

    fn unit_count(&self) -> usize {
        self.encode_utf16().count()
    }

    fn write_units<B: Buffer>(&self, buffer: &mut B, offset: usize) {
        let mut at = offset;
        for unit in self.encode_utf16() {
            buffer.put_u16(at, unit);
            at += 2;
        }
    }

    fn matches_units<B: Buffer>(&self, buffer: &B, offset: usize) -> bool {
        let mut at = offset;
        for unit in self.encode_utf16() {
            if buffer.get_u16(at) != unit {
                return false;
            }
            at += 2;
        }
        true
    }

    fn hash_units(&self) -> u64 {
        let mut hasher = Xxh3::new();
        for unit in self.encode_utf16() {
            hasher.update(&unit.to_le_bytes());
        }
        hasher.digest()
    }

    fn hash_stored<B: Buffer>(buffer: &B, offset: usize, unit_count: usize) -> u64 {
        let mut hasher = Xxh3::new();
        for i in 0..unit_count {
            hasher.update(&buffer.get_u16(offset + i * 2).to_le_bytes());
        }
        hasher.digest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::HeapBuffer;

    #[test]
    fn byte_hash_matches_stored_hash() {
        let key: &[u8] = b"liquidity";
        let mut buffer = HeapBuffer::allocate(32);
        key.write_units(&mut buffer, 3);

        assert!(key.matches_units(&buffer, 3));
        assert_eq!(
            key.hash_units(),
            <[u8]>::hash_stored(&buffer, 3, key.unit_count())
        );
    }

    #[test]
    fn char_hash_matches_stored_hash() {
        let key = "orderbook-€";
        let mut buffer = HeapBuffer::allocate(64);
        key.write_units(&mut buffer, 10);

        assert!(key.matches_units(&buffer, 10));
        assert_eq!(
            key.hash_units(),
            str::hash_stored(&buffer, 10, key.unit_count())
        );
    }

    #[test]
    fn char_units_are_utf16() {
        assert_eq!("abc".unit_count(), 3);
        assert_eq!("€".unit_count(), 1);
        // One astral code point encodes as a surrogate pair.
        assert_eq!("𐍈".unit_count(), 2);
    }

    #[test]
    fn mismatched_content_does_not_match() {
        let mut buffer = HeapBuffer::allocate(16);
        let stored: &[u8] = b"abcd";
        stored.write_units(&mut buffer, 0);

        let probe: &[u8] = b"abcx";
        assert!(!probe.matches_units(&buffer, 0));
    }
}
