//! Offset-addressed byte storage and fixed-capacity history buffers.
//!
//! This crate provides the container primitives that back `strata`'s
//! serialization code:
//!
//! - **Byte arena**: append-only storage for variable-length byte strings,
//!   addressed by stable [`Offset`] handles
//! - **Interning arena**: a byte arena that stores each terminated string
//!   once (requires the `interning` feature)
//! - **Ring buffer**: the most recent N values, indexed oldest to newest
//!   (requires the `ring-buffer` feature)
//!
//! Nothing in this crate is synchronized; share instances across threads only
//! behind your own lock.

pub mod error;
pub mod offset;
pub mod string_table;

#[cfg(feature = "interning")]
pub mod interner;

#[cfg(feature = "ring-buffer")]
pub mod ring;

pub use error::{Result, RingBufferError};
pub use offset::Offset;
pub use string_table::{ByteArena, TERMINATOR};

#[cfg(feature = "interning")]
pub use interner::{DEFAULT_ARENA_CAPACITY, InterningArena};

#[cfg(feature = "ring-buffer")]
pub use ring::{Iter, IterMut, RingBuffer};
