//! # Record Store
//!
//! This module implements `BufferStore`, a flat-buffer store mapping a
//! primitive 64-bit identifier to one fixed-length binary record. It exists
//! for hot paths that cannot afford per-record heap allocation: all record
//! bytes live in one backing buffer, records are written and read through
//! the codec traits, and a load deserializes into a container the caller
//! reuses across calls.
//!
//! ## Design Overview
//!
//! The buffer is divided into fixed-width slots of `max_record_length`
//! bytes. A slot either holds one encoded record or is free. An index map
//! from id to slot number answers lookups; a free list recycles the slots
//! of removed records before any fresh slot is taken.
//!
//! ## Slot Layout
//!
//! ```text
//! Offset                    Size               Description
//! ------------------------  -----------------  -------------------------
//! slot * max_record_length  max_record_length  Record bytes, as written
//!                                              by the caller's Encoder
//! ```
//!
//! The store never interprets slot contents. Encoders own the field
//! layout; the store only hands them the slot offset.
//!
//! ## Allocation Strategy
//!
//! When storing a record whose id is not yet present:
//!
//! 1. If the free list is non-empty, pop a recycled slot
//! 2. Otherwise take the next never-used slot
//! 3. If all slots are in use, grow (growable stores) or fail (fixed)
//!
//! Storing an id that is already present re-encodes into its existing slot.
//! The id keeps its slot for as long as it lives in the store.
//!
//! ## Growth
//!
//! A growable store doubles its slot count when full: a new buffer is
//! allocated and the old slot bytes are copied verbatim, so every id keeps
//! both its record and its slot number. A fixed store (`StoreBuilder::fixed`)
//! returns a capacity error instead. Index and free-list capacity are
//! reserved up front and widened on growth, keeping steady-state operations
//! allocation-free.
//!
//! ## Thread Safety
//!
//! `BufferStore` is single-threaded by contract. Mutating operations take
//! `&mut self`, so the compiler enforces the single-writer model. The store
//! is `Send` when its buffer is, and can be moved between threads but not
//! shared.

mod builder;

pub use builder::StoreBuilder;

use eyre::{bail, ensure, eyre, Result};
use hashbrown::HashMap;

use crate::buffer::{Buffer, HeapBuffer};
use crate::codec::{Decoder, Encoder, IdAccessor};
use crate::config::GROWTH_FACTOR;

/// Flat-buffer record store keyed by `i64`.
pub struct BufferStore<B: Buffer = HeapBuffer> {
    buffer: B,
    max_record_length: usize,
    record_capacity: usize,
    index: HashMap<i64, u32>,
    free_slots: Vec<u32>,
    next_slot: u32,
    growable: bool,
    growth_count: usize,
}

impl<B: Buffer> BufferStore<B> {
    /// Creates a growable store for records of up to `max_record_length`
    /// bytes, with room for `initial_records` before the first growth.
    pub fn with_capacity(max_record_length: usize, initial_records: usize) -> Result<Self> {
        Self::builder()
            .max_record_length(max_record_length)
            .initial_records(initial_records)
            .build()
    }

    /// Returns a builder for non-default configuration.
    pub fn builder() -> StoreBuilder<B> {
        StoreBuilder::new()
    }

    pub(crate) fn from_builder(builder: &StoreBuilder<B>) -> Result<Self> {
        let max_record_length = builder.record_length();
        let initial_records = builder.records();
        ensure!(max_record_length > 0, "record length must be positive");
        ensure!(initial_records > 0, "record capacity must be positive");
        ensure!(
            initial_records <= u32::MAX as usize,
            "record capacity {initial_records} exceeds the slot index range"
        );
        let bytes = max_record_length
            .checked_mul(initial_records)
            .ok_or_else(|| {
                eyre!(
                    "store byte capacity overflow: {initial_records} records of \
                     {max_record_length} bytes"
                )
            })?;
        Ok(Self {
            buffer: B::allocate(bytes),
            max_record_length,
            record_capacity: initial_records,
            index: HashMap::with_capacity(initial_records),
            free_slots: Vec::with_capacity(initial_records),
            next_slot: 0,
            growable: builder.is_growable(),
            growth_count: 0,
        })
    }

    /// Stores `value` under the id its accessor reports.
    ///
    /// A new id takes a recycled or fresh slot; an existing id is
    /// re-encoded into the slot it already owns. On an encoder error
    /// nothing is committed: the index is untouched and any slot taken
    /// for the attempt returns to the free list.
    pub fn store<T, E, A>(&mut self, encoder: &E, value: &T, id_accessor: &A) -> Result<()>
    where
        E: Encoder<B, T>,
        A: IdAccessor<T>,
    {
        let id = id_accessor.id_of(value);
        if let Some(&slot) = self.index.get(&id) {
            let offset = self.slot_offset(slot);
            return encoder.store(&mut self.buffer, offset, value);
        }
        let slot = self.acquire_slot()?;
        let offset = self.slot_offset(slot);
        if let Err(err) = encoder.store(&mut self.buffer, offset, value) {
            self.free_slots.push(slot);
            return Err(err);
        }
        self.index.insert(id, slot);
        Ok(())
    }

    /// Loads the record stored under `id` into `container`.
    ///
    /// Returns `false` and leaves `container` untouched when the id is
    /// absent. Reusing one container across calls keeps loads free of
    /// allocation.
    pub fn load<T, D>(&self, id: i64, decoder: &D, container: &mut T) -> bool
    where
        D: Decoder<B, T>,
    {
        match self.index.get(&id) {
            Some(&slot) => {
                decoder.load(&self.buffer, self.slot_offset(slot), container);
                true
            }
            None => false,
        }
    }

    /// Removes the record stored under `id`, recycling its slot.
    pub fn remove(&mut self, id: i64) -> bool {
        match self.index.remove(&id) {
            Some(slot) => {
                self.free_slots.push(slot);
                true
            }
            None => false,
        }
    }

    /// Drops every record. Capacity and backing memory are retained.
    pub fn clear(&mut self) {
        self.index.clear();
        self.free_slots.clear();
        self.next_slot = 0;
    }

    /// Number of records currently stored.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Record slots available before the next growth or capacity error.
    pub fn capacity(&self) -> usize {
        self.record_capacity
    }

    pub fn max_record_length(&self) -> usize {
        self.max_record_length
    }

    /// Recycled slots waiting for reuse.
    pub fn free_slots(&self) -> usize {
        self.free_slots.len()
    }

    /// Times the backing buffer has grown since construction.
    pub fn growth_count(&self) -> usize {
        self.growth_count
    }

    fn slot_offset(&self, slot: u32) -> usize {
        slot as usize * self.max_record_length
    }

    fn acquire_slot(&mut self) -> Result<u32> {
        if let Some(slot) = self.free_slots.pop() {
            return Ok(slot);
        }
        if self.next_slot as usize == self.record_capacity {
            if !self.growable {
                bail!(
                    "record store capacity exhausted: {} records of {} bytes",
                    self.record_capacity,
                    self.max_record_length
                );
            }
            self.grow()?;
        }
        let slot = self.next_slot;
        self.next_slot += 1;
        Ok(slot)
    }

    fn grow(&mut self) -> Result<()> {
        let new_capacity = self
            .record_capacity
            .checked_mul(GROWTH_FACTOR)
            .ok_or_else(|| {
                eyre!(
                    "store capacity overflow growing past {} records",
                    self.record_capacity
                )
            })?;
        ensure!(
            new_capacity <= u32::MAX as usize,
            "record capacity {new_capacity} exceeds the slot index range"
        );
        let new_bytes = new_capacity
            .checked_mul(self.max_record_length)
            .ok_or_else(|| {
                eyre!(
                    "store byte capacity overflow: {new_capacity} records of {} bytes",
                    self.max_record_length
                )
            })?;
        let mut grown = B::allocate(new_bytes);
        grown.copy_from(&self.buffer, self.record_capacity * self.max_record_length);
        self.buffer = grown;
        self.record_capacity = new_capacity;
        self.index.reserve(new_capacity - self.index.len());
        self.free_slots.reserve(new_capacity - self.free_slots.len());
        self.growth_count += 1;
        Ok(())
    }
}

impl<B: Buffer> std::fmt::Debug for BufferStore<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferStore")
            .field("len", &self.index.len())
            .field("capacity", &self.record_capacity)
            .field("max_record_length", &self.max_record_length)
            .field("growable", &self.growable)
            .finish()
    }
}
