//! # Sequence Maps
//!
//! This module implements open-addressing hash maps from bounded-length key
//! sequences to primitive `i64` values. Keys are stored inline in the table
//! buffer, so a map performs no per-entry heap allocation and holds no
//! references to caller memory: the use case is hot-path lookup tables
//! (symbol to instrument id, session token to session id) that must not
//! produce garbage or boxed keys.
//!
//! Two key families share one engine through [`SequenceKey`]:
//!
//! - [`ByteSequenceMap`]: `[u8]` keys, one byte per unit
//! - [`CharSequenceMap`]: `str` keys, one UTF-16 code unit (2 bytes) each
//!
//! ## Bucket Layout
//!
//! The table is an array of fixed-stride buckets living in one buffer:
//!
//! ```text
//! Offset  Size   Description
//! ------  -----  ------------------------------------------------------
//! 0       4      unit_count: 0 = empty, -1 = tombstone, n > 0 = occupied
//! 4       8      value
//! 12      W * L  key units (W = unit width, L = max key length)
//! ```
//!
//! bucket stride = 12 + W * L. A freshly allocated (zeroed) buffer is a
//! table of empty buckets.
//!
//! ## Probing
//!
//! A lookup hashes the key's units, masks the hash into a bucket index
//! (capacity is always a power of two), and probes linearly with wraparound.
//! A bucket matches when its unit count equals the key's and the stored
//! units compare equal. An empty bucket terminates the probe; a tombstone
//! never does, it is skipped. Two keys sharing a prefix but differing in
//! length therefore never collide: their unit counts differ.
//!
//! ## Removal
//!
//! Removing a key marks its bucket as a tombstone rather than empty, which
//! keeps probe chains that pass through the bucket intact. Inserts reuse the
//! first tombstone seen on their probe path once the key is known to be
//! absent.
//!
//! ## Resizing
//!
//! Before an insert would push occupancy (live plus tombstoned buckets) past
//! the configured load fraction, the table rebuilds: doubling when live
//! entries alone justify it, otherwise rebuilding at the same capacity just
//! to shed tombstones. Rebuilds rehash the stored units directly (see
//! [`SequenceKey::hash_stored`]); original keys are never needed again.
//!
//! ## Missing Values
//!
//! The map never wraps values in an option. Construction fixes a caller
//! chosen sentinel, returned by `get`, `put`, and `remove` when no entry
//! matched. Callers pick a value outside their stored domain, commonly
//! `i64::MIN`.
//!
//! ## Thread Safety
//!
//! Maps are single-threaded by contract: mutation takes `&mut self`, and
//! instances may move between threads but not be shared.

mod key;

pub use key::SequenceKey;

use std::marker::PhantomData;

use eyre::{ensure, eyre, Result};

use crate::buffer::{Buffer, HeapBuffer};
use crate::config::{GROWTH_FACTOR, MIN_TABLE_CAPACITY, RESIZE_LOAD_DEN, RESIZE_LOAD_NUM};

const UNIT_COUNT_OFFSET: usize = 0;
const VALUE_OFFSET: usize = 4;
const UNITS_OFFSET: usize = 12;
const BUCKET_HEADER_BYTES: usize = 12;

const EMPTY: i32 = 0;
const TOMBSTONE: i32 = -1;

/// Map from byte sequences to `i64` values.
pub type ByteSequenceMap<B = HeapBuffer> = SequenceMap<[u8], B>;

/// Map from character sequences (any `str`) to `i64` values.
pub type CharSequenceMap<B = HeapBuffer> = SequenceMap<str, B>;

/// Open-addressing table engine behind both sequence map families.
pub struct SequenceMap<K: SequenceKey + ?Sized, B: Buffer = HeapBuffer> {
    buffer: B,
    max_key_length: usize,
    stride: usize,
    capacity: usize,
    mask: usize,
    live: usize,
    tombstones: usize,
    missing_value: i64,
    _key: PhantomData<K>,
}

impl<K: SequenceKey + ?Sized> SequenceMap<K, HeapBuffer> {
    /// Creates a map over a bounds-checked heap buffer.
    ///
    /// `max_key_length` is in key units, `initial_capacity` in entries
    /// (rounded up to a power of two), and `missing_value` is the sentinel
    /// every miss returns. Keys equal to the sentinel's domain are the
    /// caller's concern: pick a value no entry will ever map to.
    pub fn new(max_key_length: usize, initial_capacity: usize, missing_value: i64) -> Result<Self> {
        Self::with_buffer(max_key_length, initial_capacity, missing_value)
    }
}

impl<K: SequenceKey + ?Sized, B: Buffer> SequenceMap<K, B> {
    /// Like [`SequenceMap::new`] over a caller-chosen [`Buffer`]
    /// implementation.
    pub fn with_buffer(
        max_key_length: usize,
        initial_capacity: usize,
        missing_value: i64,
    ) -> Result<Self> {
        ensure!(max_key_length > 0, "maximum key length must be positive");
        ensure!(
            max_key_length <= i32::MAX as usize,
            "maximum key length {max_key_length} exceeds the unit count field"
        );
        let capacity = initial_capacity
            .max(MIN_TABLE_CAPACITY)
            .checked_next_power_of_two()
            .ok_or_else(|| eyre!("table capacity overflow: {initial_capacity} entries"))?;
        let stride = K::UNIT_WIDTH
            .checked_mul(max_key_length)
            .and_then(|units| units.checked_add(BUCKET_HEADER_BYTES))
            .ok_or_else(|| eyre!("bucket stride overflow: key length {max_key_length}"))?;
        let bytes = capacity
            .checked_mul(stride)
            .ok_or_else(|| {
                eyre!("table byte capacity overflow: {capacity} buckets of {stride} bytes")
            })?;
        Ok(Self {
            buffer: B::allocate(bytes),
            max_key_length,
            stride,
            capacity,
            mask: capacity - 1,
            live: 0,
            tombstones: 0,
            missing_value,
            _key: PhantomData,
        })
    }

    /// Associates `key` with `value`, returning the previous value or the
    /// missing-value sentinel for a first insertion.
    ///
    /// Empty keys and keys longer than `max_key_length` units are rejected;
    /// nothing is truncated or partially written.
    pub fn put(&mut self, key: &K, value: i64) -> Result<i64> {
        let units = key.unit_count();
        ensure!(units > 0, "key must not be empty");
        ensure!(
            units <= self.max_key_length,
            "key length {units} exceeds maximum {}",
            self.max_key_length
        );
        if (self.live + self.tombstones + 1) * RESIZE_LOAD_DEN > self.capacity * RESIZE_LOAD_NUM {
            self.rebuild()?;
        }

        let mut idx = (key.hash_units() as usize) & self.mask;
        let mut first_tombstone = None;
        loop {
            let offset = idx * self.stride;
            let stored = self.buffer.get_i32(offset + UNIT_COUNT_OFFSET);
            if stored == EMPTY {
                // Key is absent; land in the earliest reusable bucket.
                let target = match first_tombstone {
                    Some(tombstone_idx) => {
                        self.tombstones -= 1;
                        tombstone_idx * self.stride
                    }
                    None => offset,
                };
                self.buffer.put_i32(target + UNIT_COUNT_OFFSET, units as i32);
                self.buffer.put_i64(target + VALUE_OFFSET, value);
                key.write_units(&mut self.buffer, target + UNITS_OFFSET);
                self.live += 1;
                return Ok(self.missing_value);
            }
            if stored == TOMBSTONE {
                if first_tombstone.is_none() {
                    first_tombstone = Some(idx);
                }
            } else if stored as usize == units
                && key.matches_units(&self.buffer, offset + UNITS_OFFSET)
            {
                let previous = self.buffer.get_i64(offset + VALUE_OFFSET);
                self.buffer.put_i64(offset + VALUE_OFFSET, value);
                return Ok(previous);
            }
            idx = (idx + 1) & self.mask;
        }
    }

    /// Returns the value associated with `key`, or the missing-value
    /// sentinel when absent.
    pub fn get(&self, key: &K) -> i64 {
        let units = key.unit_count();
        if units == 0 || units > self.max_key_length {
            return self.missing_value;
        }
        let mut idx = (key.hash_units() as usize) & self.mask;
        loop {
            let offset = idx * self.stride;
            let stored = self.buffer.get_i32(offset + UNIT_COUNT_OFFSET);
            if stored == EMPTY {
                return self.missing_value;
            }
            if stored != TOMBSTONE
                && stored as usize == units
                && key.matches_units(&self.buffer, offset + UNITS_OFFSET)
            {
                return self.buffer.get_i64(offset + VALUE_OFFSET);
            }
            idx = (idx + 1) & self.mask;
        }
    }

    /// Removes `key`, returning its value or the missing-value sentinel.
    pub fn remove(&mut self, key: &K) -> i64 {
        let units = key.unit_count();
        if units == 0 || units > self.max_key_length {
            return self.missing_value;
        }
        let mut idx = (key.hash_units() as usize) & self.mask;
        loop {
            let offset = idx * self.stride;
            let stored = self.buffer.get_i32(offset + UNIT_COUNT_OFFSET);
            if stored == EMPTY {
                return self.missing_value;
            }
            if stored != TOMBSTONE
                && stored as usize == units
                && key.matches_units(&self.buffer, offset + UNITS_OFFSET)
            {
                let previous = self.buffer.get_i64(offset + VALUE_OFFSET);
                self.buffer.put_i32(offset + UNIT_COUNT_OFFSET, TOMBSTONE);
                self.live -= 1;
                self.tombstones += 1;
                return previous;
            }
            idx = (idx + 1) & self.mask;
        }
    }

    /// Drops every entry. Capacity and backing memory are retained.
    pub fn clear(&mut self) {
        for bucket in 0..self.capacity {
            self.buffer
                .put_i32(bucket * self.stride + UNIT_COUNT_OFFSET, EMPTY);
        }
        self.live = 0;
        self.tombstones = 0;
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Bucket count of the table. Always a power of two.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Maximum key length in units.
    pub fn max_key_length(&self) -> usize {
        self.max_key_length
    }

    /// The sentinel returned for absent keys.
    pub fn missing_value(&self) -> i64 {
        self.missing_value
    }

    /// Rebuilds the table, doubling when live entries need the room and
    /// otherwise keeping the capacity to shed accumulated tombstones.
    /// Buckets are reinserted in stored order, rehashed from their stored
    /// units.
    fn rebuild(&mut self) -> Result<()> {
        let new_capacity =
            if (self.live + 1) * RESIZE_LOAD_DEN > self.capacity * RESIZE_LOAD_NUM {
                self.capacity.checked_mul(GROWTH_FACTOR).ok_or_else(|| {
                    eyre!("table capacity overflow doubling past {} buckets", self.capacity)
                })?
            } else {
                self.capacity
            };
        let new_bytes = new_capacity.checked_mul(self.stride).ok_or_else(|| {
            eyre!(
                "table byte capacity overflow: {new_capacity} buckets of {} bytes",
                self.stride
            )
        })?;
        let mut next = B::allocate(new_bytes);
        let new_mask = new_capacity - 1;

        for bucket in 0..self.capacity {
            let offset = bucket * self.stride;
            let stored = self.buffer.get_i32(offset + UNIT_COUNT_OFFSET);
            if stored <= EMPTY {
                continue;
            }
            let unit_count = stored as usize;
            let hash = K::hash_stored(&self.buffer, offset + UNITS_OFFSET, unit_count);
            // The fresh table has no tombstones, so the first empty bucket
            // on the probe path is the insertion point.
            let mut idx = (hash as usize) & new_mask;
            loop {
                let target = idx * self.stride;
                if next.get_i32(target + UNIT_COUNT_OFFSET) == EMPTY {
                    next.put_i32(target + UNIT_COUNT_OFFSET, stored);
                    next.put_i64(
                        target + VALUE_OFFSET,
                        self.buffer.get_i64(offset + VALUE_OFFSET),
                    );
                    let unit_bytes = unit_count * K::UNIT_WIDTH;
                    for i in 0..unit_bytes {
                        next.put_u8(
                            target + UNITS_OFFSET + i,
                            self.buffer.get_u8(offset + UNITS_OFFSET + i),
                        );
                    }
                    break;
                }
                idx = (idx + 1) & new_mask;
            }
        }

        self.buffer = next;
        self.capacity = new_capacity;
        self.mask = new_mask;
        self.tombstones = 0;
        Ok(())
    }
}

impl<K: SequenceKey + ?Sized, B: Buffer> std::fmt::Debug for SequenceMap<K, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceMap")
            .field("len", &self.live)
            .field("capacity", &self.capacity)
            .field("max_key_length", &self.max_key_length)
            .field("unit_width", &K::UNIT_WIDTH)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::RawBuffer;

    const MISSING: i64 = i64::MIN;

    #[test]
    fn missing_key_returns_sentinel() {
        let map: ByteSequenceMap = ByteSequenceMap::new(8, 16, MISSING).unwrap();
        assert_eq!(map.get(b"absent"), MISSING);
        assert_eq!(map.missing_value(), MISSING);
    }

    #[test]
    fn put_returns_previous_value() {
        let mut map: ByteSequenceMap = ByteSequenceMap::new(8, 16, MISSING).unwrap();
        assert_eq!(map.put(b"EURUSD", 17).unwrap(), MISSING);
        assert_eq!(map.put(b"EURUSD", 18).unwrap(), 17);
        assert_eq!(map.get(b"EURUSD"), 18);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn remove_then_get_misses() {
        let mut map: ByteSequenceMap = ByteSequenceMap::new(8, 16, MISSING).unwrap();
        map.put(b"GBPUSD", 5).unwrap();

        assert_eq!(map.remove(b"GBPUSD"), 5);
        assert_eq!(map.remove(b"GBPUSD"), MISSING);
        assert_eq!(map.get(b"GBPUSD"), MISSING);
        assert!(map.is_empty());
    }

    #[test]
    fn reinsert_after_remove() {
        let mut map: ByteSequenceMap = ByteSequenceMap::new(8, 16, MISSING).unwrap();
        map.put(b"key", 1).unwrap();
        map.remove(b"key");
        assert_eq!(map.put(b"key", 2).unwrap(), MISSING);
        assert_eq!(map.get(b"key"), 2);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn growth_preserves_entries() {
        let mut map: ByteSequenceMap = ByteSequenceMap::new(16, 8, MISSING).unwrap();
        for i in 0..100i64 {
            let key = format!("key-{i:03}");
            assert_eq!(map.put(key.as_bytes(), i).unwrap(), MISSING);
        }

        assert_eq!(map.len(), 100);
        assert!(map.capacity() > 100);
        for i in 0..100i64 {
            let key = format!("key-{i:03}");
            assert_eq!(map.get(key.as_bytes()), i);
        }
    }

    #[test]
    fn tombstone_chains_stay_searchable() {
        let mut map: ByteSequenceMap = ByteSequenceMap::new(16, 8, MISSING).unwrap();
        for i in 0..40i64 {
            map.put(format!("sym-{i}").as_bytes(), i).unwrap();
        }
        for i in (0..40i64).step_by(2) {
            assert_eq!(map.remove(format!("sym-{i}").as_bytes()), i);
        }

        for i in (1..40i64).step_by(2) {
            assert_eq!(map.get(format!("sym-{i}").as_bytes()), i);
        }
        for i in 100..120i64 {
            map.put(format!("sym-{i}").as_bytes(), i).unwrap();
        }
        for i in 100..120i64 {
            assert_eq!(map.get(format!("sym-{i}").as_bytes()), i);
        }
        assert_eq!(map.len(), 40);
    }

    #[test]
    fn churn_rebuilds_in_place_without_growing() {
        let mut map: ByteSequenceMap = ByteSequenceMap::new(16, 8, MISSING).unwrap();
        for i in 0..50i64 {
            let key = format!("churn-{i}");
            map.put(key.as_bytes(), i).unwrap();
            assert_eq!(map.remove(key.as_bytes()), i);
        }

        // Live count never exceeded one, so every rebuild only purged
        // tombstones and the table never grew.
        assert_eq!(map.capacity(), 8);
        map.put(b"final", 7).unwrap();
        assert_eq!(map.get(b"final"), 7);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn prefix_keys_do_not_collide() {
        let mut map: ByteSequenceMap = ByteSequenceMap::new(8, 16, MISSING).unwrap();
        map.put(b"AB", 1).unwrap();
        map.put(b"ABC", 2).unwrap();
        map.put(&[1, 2][..], 3).unwrap();
        map.put(&[1, 2, 0][..], 4).unwrap();

        assert_eq!(map.get(b"AB"), 1);
        assert_eq!(map.get(b"ABC"), 2);
        assert_eq!(map.get(&[1, 2][..]), 3);
        assert_eq!(map.get(&[1, 2, 0][..]), 4);
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn char_map_round_trips() {
        let mut map: CharSequenceMap = CharSequenceMap::new(12, 16, MISSING).unwrap();
        map.put("EURUSD", 980_107).unwrap();
        map.put("USDJPY", 980_108).unwrap();

        assert_eq!(map.get("EURUSD"), 980_107);
        assert_eq!(map.get("USDJPY"), 980_108);
        assert_eq!(map.get("AUDCAD"), MISSING);
    }

    #[test]
    fn char_map_accepts_non_ascii_keys() {
        let mut map: CharSequenceMap = CharSequenceMap::new(8, 16, MISSING).unwrap();
        map.put("héllo", 1).unwrap();
        map.put("日本語", 2).unwrap();
        map.put("𐍈𐍈", 3).unwrap();

        assert_eq!(map.get("héllo"), 1);
        assert_eq!(map.get("日本語"), 2);
        assert_eq!(map.get("𐍈𐍈"), 3);
        assert_eq!(map.get("héllø"), MISSING);
    }

    #[test]
    fn empty_key_is_rejected() {
        let mut map: ByteSequenceMap = ByteSequenceMap::new(8, 16, MISSING).unwrap();
        let err = map.put(b"", 1).unwrap_err();
        assert!(err.to_string().contains("empty"));
        assert_eq!(map.get(b""), MISSING);
        assert_eq!(map.remove(b""), MISSING);
    }

    #[test]
    fn oversized_key_is_rejected() {
        let mut map: ByteSequenceMap = ByteSequenceMap::new(4, 16, MISSING).unwrap();
        let err = map.put(b"toolong", 1).unwrap_err();
        assert!(err.to_string().contains("exceeds maximum"));
        assert_eq!(map.len(), 0);
        assert_eq!(map.get(b"toolong"), MISSING);
        assert_eq!(map.remove(b"toolong"), MISSING);
    }

    #[test]
    fn clear_resets_entries() {
        let mut map: ByteSequenceMap = ByteSequenceMap::new(8, 16, MISSING).unwrap();
        for i in 0..10i64 {
            map.put(format!("k{i}").as_bytes(), i).unwrap();
        }
        map.clear();

        assert!(map.is_empty());
        assert_eq!(map.get(b"k3"), MISSING);
        map.put(b"k3", 33).unwrap();
        assert_eq!(map.get(b"k3"), 33);
    }

    #[test]
    fn capacity_rounds_up_to_power_of_two() {
        let map: ByteSequenceMap = ByteSequenceMap::new(4, 9, MISSING).unwrap();
        assert_eq!(map.capacity(), 16);
        let floor: ByteSequenceMap = ByteSequenceMap::new(4, 0, MISSING).unwrap();
        assert_eq!(floor.capacity(), MIN_TABLE_CAPACITY);
    }

    #[test]
    fn zero_key_length_is_rejected() {
        assert!(ByteSequenceMap::new(0, 16, MISSING).is_err());
    }

    #[test]
    fn raw_buffer_map_round_trips() {
        let mut map: ByteSequenceMap<RawBuffer> =
            ByteSequenceMap::with_buffer(8, 8, MISSING).unwrap();
        for i in 0..30i64 {
            map.put(format!("r{i}").as_bytes(), i).unwrap();
        }
        for i in 0..30i64 {
            assert_eq!(map.get(format!("r{i}").as_bytes()), i);
        }
    }

    #[test]
    fn sentinel_choice_is_callers() {
        let mut map: ByteSequenceMap = ByteSequenceMap::new(4, 8, -1).unwrap();
        assert_eq!(map.get(b"x"), -1);
        map.put(b"x", 0).unwrap();
        assert_eq!(map.get(b"x"), 0);
    }
}
