//! Append-only byte arena addressed by offset.
//!
//! [`ByteArena`] stores many variable-length byte strings back to back in a
//! single growable buffer. Every append returns the [`Offset`] at which its
//! bytes start. New bytes only ever go after existing ones, so an offset
//! keeps naming the same bytes until the arena is cleared, even across the
//! reallocations the buffer performs as it grows.
//!
//! The arena tracks no string boundaries of its own. Appends may write a
//! trailing [`TERMINATOR`]; readers use it to find where a string ends. Two
//! back-to-back unterminated appends therefore read back as one string.
//!
//! # Examples
//!
//! ```
//! use strata_mem::ByteArena;
//!
//! let mut arena = ByteArena::new();
//!
//! let foo = arena.append(b"foo", true);
//! let bar = arena.append(b"bar", true);
//!
//! assert_eq!(foo.as_usize(), 0);
//! assert_eq!(bar.as_usize(), 4);
//! assert_eq!(arena.get_terminated(bar), b"bar");
//! assert_eq!(arena.len(), 8);
//! ```
//!
//! # Misuse
//!
//! Reading or writing at an offset at or beyond [`ByteArena::len`] is a caller
//! bug. Debug builds report it through an assertion; release builds still
//! panic on the slice bounds check and never read out of range.

use std::ffi::CStr;
use std::fmt;

use strata_log::{debug, trace};

use crate::offset::Offset;

/// Byte written after a terminated append.
pub const TERMINATOR: u8 = 0;

/// Contiguous, growable storage for byte strings.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ByteArena {
    /// Every appended byte, in append order.
    bytes: Vec<u8>,
}

impl ByteArena {
    /// Creates an empty arena without allocating.
    #[must_use]
    pub const fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Creates an empty arena with room for `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    /// Discards every stored byte.
    ///
    /// All previously issued offsets become invalid. The allocation is kept
    /// for reuse.
    pub fn clear(&mut self) {
        debug!("clearing byte arena ({} bytes)", self.bytes.len());
        self.bytes.clear();
    }

    /// Reserves room for at least `additional` more bytes.
    pub fn reserve(&mut self, additional: usize) {
        self.bytes.reserve(additional);
    }

    /// Releases capacity that is not holding bytes.
    pub fn shrink_to_fit(&mut self) {
        self.bytes.shrink_to_fit();
    }

    /// Returns the number of stored bytes, terminators included.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if nothing has been appended since creation or the last
    /// [`clear`](Self::clear).
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the number of bytes the arena can hold without reallocating.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    /// Returns every stored byte.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the last stored byte, if any.
    ///
    /// Anything other than [`TERMINATOR`] means the most recent append left
    /// its string open.
    #[inline]
    #[must_use]
    pub fn last_byte(&self) -> Option<u8> {
        self.bytes.last().copied()
    }

    /// Copies `bytes` to the end of the arena and returns where they start.
    ///
    /// When `terminate` is set a [`TERMINATOR`] is written right after the
    /// copy, so the arena grows by `bytes.len() + 1`.
    ///
    /// ```
    /// use strata_mem::ByteArena;
    ///
    /// let mut arena = ByteArena::new();
    /// let open = arena.append(b"key=", false);
    /// arena.append(b"value", true);
    ///
    /// assert_eq!(arena.get_terminated(open), b"key=value");
    /// ```
    pub fn append(&mut self, bytes: &[u8], terminate: bool) -> Offset {
        let start = self.bytes.len();
        let total = bytes.len() + usize::from(terminate);

        self.grow_for(total);
        self.bytes.extend_from_slice(bytes);
        if terminate {
            self.bytes.push(TERMINATOR);
        }

        Offset::new(start)
    }

    /// Appends the bytes of a C string, without its terminator, and returns
    /// where they start.
    ///
    /// The terminator is re-added when `terminate` is set.
    ///
    /// ```
    /// use strata_mem::ByteArena;
    ///
    /// let mut arena = ByteArena::new();
    /// let off = arena.append_cstr(c"symbol", true);
    ///
    /// assert_eq!(arena.get(off), b"symbol\0");
    /// ```
    pub fn append_cstr(&mut self, s: &CStr, terminate: bool) -> Offset {
        self.append(s.to_bytes(), terminate)
    }

    /// Appends a terminated UTF-8 string and returns where it starts.
    pub fn append_str(&mut self, s: &str) -> Offset {
        self.append(s.as_bytes(), true)
    }

    /// Returns the stored bytes from `offset` to the end of the arena.
    ///
    /// The caller decides where its string stops, normally at the first
    /// [`TERMINATOR`]; see [`get_terminated`](Self::get_terminated).
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `offset` is not below [`len`](Self::len),
    /// and in all builds if it is past it.
    #[inline]
    #[must_use]
    pub fn get(&self, offset: Offset) -> &[u8] {
        let pos = offset.as_usize();
        debug_assert!(
            pos < self.bytes.len(),
            "arena offset out of bounds: {} >= {}",
            pos,
            self.bytes.len()
        );
        &self.bytes[pos..]
    }

    /// Returns the bytes from `offset` up to, not including, the next
    /// [`TERMINATOR`].
    ///
    /// If no terminator follows (the last append is still open), the view
    /// runs to the end of the arena.
    #[must_use]
    pub fn get_terminated(&self, offset: Offset) -> &[u8] {
        let tail = self.get(offset);
        let end = tail
            .iter()
            .position(|&b| b == TERMINATOR)
            .unwrap_or(tail.len());
        &tail[..end]
    }

    /// Returns the terminated string at `offset` if it is valid UTF-8.
    ///
    /// ```
    /// use strata_mem::ByteArena;
    ///
    /// let mut arena = ByteArena::new();
    /// let ok = arena.append_str("héllo");
    /// let bad = arena.append(&[0xff, 0xfe], true);
    ///
    /// assert_eq!(arena.get_str(ok), Some("héllo"));
    /// assert_eq!(arena.get_str(bad), None);
    /// ```
    #[must_use]
    pub fn get_str(&self, offset: Offset) -> Option<&str> {
        std::str::from_utf8(self.get_terminated(offset)).ok()
    }

    /// Overwrites the single byte at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is not below [`len`](Self::len).
    #[inline]
    pub fn set_byte(&mut self, offset: Offset, value: u8) {
        let pos = offset.as_usize();
        debug_assert!(
            pos < self.bytes.len(),
            "arena offset out of bounds: {} >= {}",
            pos,
            self.bytes.len()
        );
        self.bytes[pos] = value;
    }

    /// Copies every byte of `other` to the end of this arena.
    ///
    /// Returns where the copied block starts. An offset `o` issued by `other`
    /// names the same string here as `start.add(o.as_usize())`.
    ///
    /// ```
    /// use strata_mem::ByteArena;
    ///
    /// let mut names = ByteArena::new();
    /// names.append(b"alpha", true);
    ///
    /// let mut types = ByteArena::new();
    /// let int = types.append(b"int", true);
    ///
    /// let start = names.append_arena(&types);
    /// assert_eq!(names.get_terminated(start.add(int.as_usize())), b"int");
    /// ```
    pub fn append_arena(&mut self, other: &ByteArena) -> Offset {
        let start = self.bytes.len();
        if !other.bytes.is_empty() {
            self.grow_for(other.bytes.len());
            self.bytes.extend_from_slice(&other.bytes);
            debug!("merged {} bytes at offset {}", other.bytes.len(), start);
        }
        Offset::new(start)
    }

    /// Reserves room for `additional` bytes, tracing when that reallocates.
    #[inline]
    fn grow_for(&mut self, additional: usize) {
        let before = self.bytes.capacity();
        self.bytes.reserve(additional);
        if self.bytes.capacity() != before {
            trace!("byte arena grew from {} to {} bytes", before, self.bytes.capacity());
        }
    }
}

impl fmt::Debug for ByteArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteArena")
            .field("len", &self.bytes.len())
            .field("bytes", &self.bytes.escape_ascii().to_string())
            .finish()
    }
}
