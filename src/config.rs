//! # Configuration Constants
//!
//! This module centralizes the tunables shared by the record store and the
//! sequence maps. Constants that depend on each other are co-located so a
//! change to one is checked against the others at compile time.
//!
//! ## Relationships
//!
//! ```text
//! RESIZE_LOAD_NUM / RESIZE_LOAD_DEN (7/10)
//!       │
//!       └─> A sequence map rebuilds its table before an insert would push
//!           (live + tombstoned) buckets past this fraction of capacity.
//!           Must stay strictly below 1/1: linear probing terminates probes
//!           at an empty bucket, so at least one empty bucket must survive
//!           every insert.
//!
//! GROWTH_FACTOR (2)
//!       │
//!       ├─> Record stores double their slot count when growing.
//!       └─> Sequence maps double their bucket count when live entries
//!           (not tombstones) exceed the load threshold. Doubling keeps
//!           table capacity a power of two, which the probe mask requires.
//!
//! MIN_TABLE_CAPACITY (8)
//!       │
//!       └─> Floor for sequence map bucket counts. Must be a power of two
//!           for the same mask reason.
//! ```
//!
//! ## Performance Implications
//!
//! - `RESIZE_LOAD_NUM/DEN`: Higher = denser tables, longer probe chains
//! - `GROWTH_FACTOR`: Larger = fewer rebuilds, bigger capacity jumps
//! - `DEFAULT_RECORD_CAPACITY`: Only a starting point; growable stores
//!   double past it on demand

/// Numerator of the sequence map load threshold.
pub const RESIZE_LOAD_NUM: usize = 7;

/// Denominator of the sequence map load threshold.
/// A table rebuild triggers before occupancy exceeds NUM/DEN of capacity.
pub const RESIZE_LOAD_DEN: usize = 10;

/// Multiplier applied when a record store or sequence map grows.
pub const GROWTH_FACTOR: usize = 2;

/// Minimum bucket count for a sequence map table.
pub const MIN_TABLE_CAPACITY: usize = 8;

/// Default slot count for a record store when the builder leaves it unset.
pub const DEFAULT_RECORD_CAPACITY: usize = 256;

const _: () = assert!(
    RESIZE_LOAD_NUM < RESIZE_LOAD_DEN,
    "load threshold must be below full occupancy or probes cannot terminate"
);

const _: () = assert!(
    MIN_TABLE_CAPACITY.is_power_of_two(),
    "table capacity must be a power of two for mask-based probing"
);

const _: () = assert!(
    GROWTH_FACTOR >= 2 && GROWTH_FACTOR.is_power_of_two(),
    "growth must preserve power-of-two table capacities"
);
