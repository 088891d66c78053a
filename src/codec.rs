//! # Encode/Decode Contract
//!
//! The record store never inspects the records it holds. Callers supply
//! three capabilities and the store threads them through every operation:
//!
//! - [`Encoder`]: serialize a value into a buffer at a slot offset
//! - [`Decoder`]: deserialize a slot back into a caller-owned container
//! - [`IdAccessor`]: extract the primitive identifier a value is keyed by
//!
//! One transcoder type typically implements all three for its record type.
//! Dispatch is static: the store is generic over the implementations, so
//! the hot path carries no vtable indirection.
//!
//! ## Encoding Discipline
//!
//! An encoder owns a fixed binary layout with explicit field offsets and a
//! declared maximum width. It must validate before it writes: a value whose
//! variable-length field exceeds its maximum is rejected with an error
//! before any byte lands in the buffer, so a failed encode never leaves a
//! half-written slot. Variable-length fields are stored as a length prefix
//! followed by fixed-width units. Floats are stored as raw bit patterns
//! through [`Buffer::put_f64`](crate::buffer::Buffer::put_f64), never in a
//! textual or variable-width form.
//!
//! ## Decoding Discipline
//!
//! A decoder reads a slot the paired encoder wrote and overwrites the
//! fields of a caller-supplied container. Reusing one container across
//! loads is the point: after warmup a load allocates nothing. Decoding
//! data the store itself wrote cannot fail, so `load` is infallible.

use eyre::Result;

/// Writes a value's binary representation into a buffer at an offset.
///
/// Implementations must not write past `offset` plus the record length
/// declared to the store, and must reject oversized values before writing
/// anything.
pub trait Encoder<B, T> {
    fn store(&self, buffer: &mut B, offset: usize, value: &T) -> Result<()>;
}

/// Reads a record at an offset into a reusable caller-owned container.
///
/// The container's previous contents are overwritten entirely. Exact
/// inverse of the paired [`Encoder`] for every value it accepted.
pub trait Decoder<B, T> {
    fn load(&self, buffer: &B, offset: usize, container: &mut T);
}

/// Extracts the identifier a record is stored under.
///
/// Must be pure: the same value always yields the same id.
pub trait IdAccessor<T> {
    fn id_of(&self, value: &T) -> i64;
}
