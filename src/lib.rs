//! # flatstore - Allocation-Free Record Persistence
//!
//! flatstore is a low-latency persistence layer for fixed-shape records,
//! built for systems (order gateways, market data caches) that cannot
//! afford per-operation heap allocation or boxed keys. This
//! implementation prioritizes:
//!
//! - **No allocation on the hot path**: records and keys live inline in
//!   pre-allocated buffers; loads fill caller-owned reusable containers
//! - **Explicit binary layouts**: codecs write fields at fixed offsets,
//!   floats travel as raw bit patterns
//! - **Predictable latency**: synchronous, bounded-time operations; the
//!   only O(n) events are explicit growth and table rebuilds
//!
//! ## Quick Start
//!
//! ```ignore
//! use flatstore::{BufferStore, CharSequenceMap, HeapBuffer};
//!
//! let mut store: BufferStore<HeapBuffer> =
//!     BufferStore::with_capacity(ORDER_LENGTH, 500_000)?;
//! store.store(&transcoder, &order, &transcoder)?;
//!
//! let mut container = Order::default();
//! if store.load(order_id, &transcoder, &mut container) {
//!     // container now holds the stored order
//! }
//!
//! let mut symbols = CharSequenceMap::new(12, 100_000, i64::MIN)?;
//! symbols.put("EURUSD", 17)?;
//! assert_eq!(symbols.get("EURUSD"), 17);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │   BufferStore        SequenceMap engine   │
//! │  (id -> record)     (key units -> i64)    │
//! ├───────────────────────────────────────────┤
//! │   Encoder / Decoder / IdAccessor traits   │
//! ├───────────────────────────────────────────┤
//! │   Buffer trait: HeapBuffer | RawBuffer    │
//! └───────────────────────────────────────────┘
//! ```
//!
//! The record store maps `i64` ids to fixed-width slots in one flat buffer,
//! recycling the slots of removed records through a free list. The sequence
//! maps ([`ByteSequenceMap`], [`CharSequenceMap`]) are open-addressing
//! tables whose keys are stored inline, probed linearly under a power-of-two
//! mask. Both sit on the same [`Buffer`] abstraction, which comes in a
//! bounds-checked and an unchecked raw flavor with identical in-bounds
//! behavior.
//!
//! ## Ownership Model
//!
//! Every structure is single-threaded: mutation takes `&mut self`, no
//! internal locks exist, and instances move between threads rather than
//! being shared. Callers never receive references into buffer memory; data
//! is copied in and out through the codec traits.

pub mod buffer;
pub mod codec;
pub mod config;
pub mod map;
pub mod store;

pub use buffer::{Buffer, HeapBuffer, RawBuffer};
pub use codec::{Decoder, Encoder, IdAccessor};
pub use map::{ByteSequenceMap, CharSequenceMap, SequenceKey, SequenceMap};
pub use store::{BufferStore, StoreBuilder};
