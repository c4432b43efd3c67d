//! Error types for `strata-mem`.
//!
//! Only the ring buffer reports errors. Arena misuse (reading or writing past
//! the stored bytes) is a programmer error and is caught by assertions instead.

/// Errors returned by [`RingBuffer`](crate::RingBuffer) accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RingBufferError {
    /// A logical index was at or past the number of retained elements.
    #[error("ring buffer index {index} out of bounds (len {len})")]
    IndexOutOfBounds {
        /// The requested logical index.
        index: usize,
        /// The number of retained elements at the time of the call.
        len: usize,
    },

    /// The buffer holds no elements.
    #[error("ring buffer is empty")]
    Empty,
}

/// Result alias for ring buffer accessors.
pub type Result<T> = std::result::Result<T, RingBufferError>;
