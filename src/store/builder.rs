//! # Store Builder
//!
//! Fluent configuration for [`BufferStore`]. Settings chain before `build()`:
//!
//! ```ignore
//! let store: BufferStore<RawBuffer> = BufferStore::builder()
//!     .max_record_length(80)
//!     .initial_records(500_000)
//!     .fixed()
//!     .build()?;
//! ```
//!
//! | Option            | Default | Description                              |
//! |-------------------|---------|------------------------------------------|
//! | max_record_length | unset   | Slot width in bytes, must be set         |
//! | initial_records   | 256     | Slots before the first growth            |
//! | fixed             | off     | Error when full instead of growing       |

use std::marker::PhantomData;

use eyre::Result;

use crate::buffer::Buffer;
use crate::config::DEFAULT_RECORD_CAPACITY;

use super::BufferStore;

/// Builder for configuring a [`BufferStore`].
pub struct StoreBuilder<B: Buffer> {
    max_record_length: usize,
    initial_records: usize,
    growable: bool,
    _buffer: PhantomData<B>,
}

impl<B: Buffer> Default for StoreBuilder<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Buffer> StoreBuilder<B> {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            max_record_length: 0,
            initial_records: DEFAULT_RECORD_CAPACITY,
            growable: true,
            _buffer: PhantomData,
        }
    }

    /// Sets the slot width in bytes. Every record must encode within this
    /// length. Required; `build()` fails when left unset.
    pub fn max_record_length(mut self, bytes: usize) -> Self {
        self.max_record_length = bytes;
        self
    }

    /// Sets how many records fit before the first growth (or, for a fixed
    /// store, ever). Defaults to 256.
    pub fn initial_records(mut self, records: usize) -> Self {
        self.initial_records = records;
        self
    }

    /// Disables growth. A full store then fails `store()` with a capacity
    /// error instead of reallocating, which also pins the backing buffer
    /// for the store's lifetime.
    pub fn fixed(mut self) -> Self {
        self.growable = false;
        self
    }

    /// Validates the configuration and allocates the store.
    pub fn build(self) -> Result<BufferStore<B>> {
        BufferStore::from_builder(&self)
    }

    pub(crate) fn record_length(&self) -> usize {
        self.max_record_length
    }

    pub(crate) fn records(&self) -> usize {
        self.initial_records
    }

    pub(crate) fn is_growable(&self) -> bool {
        self.growable
    }
}
