//! Offset handles into a byte arena.
//!
//! An [`Offset`] is the byte position at which an append started. Because it
//! is a position and not an address, it stays correct when the arena's
//! storage is reallocated to grow.
//!
//! # Examples
//!
//! ```
//! use strata_mem::{ByteArena, Offset};
//!
//! let mut arena = ByteArena::new();
//! let foo = arena.append(b"foo", true);
//! let bar = arena.append(b"bar", true);
//!
//! assert_eq!(foo, Offset::new(0));
//! assert_eq!(bar.as_usize(), 4);
//! ```

use std::fmt;

/// Position of a previously appended string inside the arena that issued it.
///
/// Offsets are only meaningful to the arena instance that returned them and
/// only until that arena is cleared. They are not a persistence format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Offset(usize);

impl Offset {
    /// Creates an offset from a raw byte position.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_mem::Offset;
    ///
    /// let off = Offset::new(12);
    /// assert_eq!(off.as_usize(), 12);
    /// ```
    #[must_use]
    pub const fn new(pos: usize) -> Self {
        Self(pos)
    }

    /// Returns the raw byte position.
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0
    }

    /// Returns the offset `n` bytes further into the arena.
    ///
    /// Useful for addressing a single byte inside a stored string, e.g. for
    /// [`ByteArena::set_byte`](crate::ByteArena::set_byte).
    ///
    /// ```
    /// use strata_mem::Offset;
    ///
    /// assert_eq!(Offset::new(4).add(2), Offset::new(6));
    /// ```
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub const fn add(self, n: usize) -> Self {
        Self(self.0 + n)
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

impl From<Offset> for usize {
    fn from(off: Offset) -> Self {
        off.0
    }
}
