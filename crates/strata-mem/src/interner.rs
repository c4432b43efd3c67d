//! Deduplicating byte arena.
//!
//! [`InterningArena`] wraps a [`ByteArena`] and remembers where each
//! terminated string was stored, so appending the same content again returns
//! the existing offset instead of a second copy.
//!
//! # Design
//!
//! The cache holds spans (start, length) into the arena's own buffer, hashed
//! and compared by the bytes they cover. No key is copied out of the arena,
//! and a span stays meaningful when the buffer reallocates. The cache is
//! cleared together with the arena.
//!
//! Only self-contained strings take part in deduplication. An append bypasses
//! the cache when it is unterminated, or when the arena's last byte is not a
//! terminator (an earlier append left a string open). That lets a caller build
//! one string out of several appends without the cache seeing partial content.
//!
//! # Examples
//!
//! ```
//! use strata_mem::InterningArena;
//!
//! let mut strings = InterningArena::new();
//!
//! let a = strings.append(b"width", true);
//! let b = strings.append(b"height", true);
//! let c = strings.append(b"width", true);
//!
//! assert_eq!(a, c);
//! assert_ne!(a, b);
//! assert_eq!(strings.len(), 13);
//! ```
//!
//! # Performance
//!
//! - **Repeated string**: one hash of the input plus a byte comparison
//! - **New string**: the above, a copy into the arena, and one table insert

use std::ffi::CStr;
use std::hash::BuildHasher;
use std::ops::Range;

use hashbrown::HashTable;
use hashbrown::hash_map::DefaultHashBuilder;
use strata_log::{debug, trace};

use crate::offset::Offset;
use crate::string_table::{ByteArena, TERMINATOR};

/// Initial arena capacity used by [`InterningArena::new`] (8 KiB).
pub const DEFAULT_ARENA_CAPACITY: usize = 8192;

/// A cached string: where its content starts and how long it is, terminator
/// excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: usize,
    len: usize,
}

impl Span {
    #[inline]
    fn range(self) -> Range<usize> {
        self.start..self.start + self.len
    }

    /// True if writing at `pos` would change this string or its terminator.
    #[inline]
    fn covers(self, pos: usize) -> bool {
        (self.start..=self.start + self.len).contains(&pos)
    }
}

/// A [`ByteArena`] that stores each terminated string at most once.
///
/// Every read-side method behaves exactly as on [`ByteArena`].
pub struct InterningArena {
    arena: ByteArena,
    cache: HashTable<Span>,
    hash_builder: DefaultHashBuilder,
}

impl InterningArena {
    /// Creates an empty interning arena with [`DEFAULT_ARENA_CAPACITY`] bytes
    /// reserved.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_ARENA_CAPACITY)
    }

    /// Creates an empty interning arena with room for `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: ByteArena::with_capacity(capacity),
            cache: HashTable::new(),
            hash_builder: DefaultHashBuilder::default(),
        }
    }

    /// Discards every stored byte and every cached string.
    ///
    /// All previously issued offsets become invalid.
    pub fn clear(&mut self) {
        debug!("clearing interning arena ({} cached strings)", self.cache.len());
        self.cache.clear();
        self.arena.clear();
    }

    /// Appends `bytes`, reusing an identical terminated string if one is
    /// already stored.
    ///
    /// The lookup only happens when `terminate` is set and the arena does not
    /// end in an open string. Otherwise this is a plain
    /// [`ByteArena::append`].
    ///
    /// ```
    /// use strata_mem::InterningArena;
    ///
    /// let mut strings = InterningArena::new();
    /// let whole = strings.append(b"foobar", true);
    ///
    /// // Built in two steps, so it is stored again rather than deduplicated.
    /// let built = strings.append(b"foo", false);
    /// strings.append(b"bar", true);
    ///
    /// assert_ne!(whole, built);
    /// assert_eq!(strings.get_terminated(built), b"foobar");
    /// ```
    pub fn append(&mut self, bytes: &[u8], terminate: bool) -> Offset {
        if !terminate || self.arena.last_byte().is_some_and(|b| b != TERMINATOR) {
            return self.arena.append(bytes, terminate);
        }

        let hash = self.hash_builder.hash_one(bytes);
        let stored = self.arena.as_bytes();
        if let Some(span) = self.cache.find(hash, |span| &stored[span.range()] == bytes) {
            trace!("intern hit at offset {} ({} bytes)", span.start, span.len);
            return Offset::new(span.start);
        }

        let off = self.arena.append(bytes, true);
        let span = Span {
            start: off.as_usize(),
            len: bytes.len(),
        };
        trace!("intern miss, stored {} bytes at offset {}", span.len, span.start);

        let stored = self.arena.as_bytes();
        let hash_builder = &self.hash_builder;
        self.cache.insert_unique(hash, span, |span| {
            hash_builder.hash_one(&stored[span.range()])
        });

        off
    }

    /// Appends the bytes of a C string through the same lookup as
    /// [`append`](Self::append).
    pub fn append_cstr(&mut self, s: &CStr, terminate: bool) -> Offset {
        self.append(s.to_bytes(), terminate)
    }

    /// Interns a terminated UTF-8 string.
    pub fn append_str(&mut self, s: &str) -> Offset {
        self.append(s.as_bytes(), true)
    }

    /// Copies every byte of `other` to the end of this arena.
    ///
    /// The copied strings are not added to the cache.
    pub fn append_arena(&mut self, other: &ByteArena) -> Offset {
        self.arena.append_arena(other)
    }

    /// Overwrites the single byte at `offset`.
    ///
    /// Cached strings whose content or terminator sits at `offset` are
    /// forgotten, since they no longer read back as the content they were
    /// cached under.
    pub fn set_byte(&mut self, offset: Offset, value: u8) {
        self.arena.set_byte(offset, value);

        let pos = offset.as_usize();
        let before = self.cache.len();
        self.cache.retain(|span| !span.covers(pos));
        if self.cache.len() != before {
            debug!("byte write at {} evicted {} cached strings", offset, before - self.cache.len());
        }
    }

    /// Reserves room for at least `additional` more bytes.
    pub fn reserve(&mut self, additional: usize) {
        self.arena.reserve(additional);
    }

    /// Releases arena and cache capacity that is not in use.
    pub fn shrink_to_fit(&mut self) {
        self.arena.shrink_to_fit();
        let hash_builder = &self.hash_builder;
        let stored = self.arena.as_bytes();
        self.cache
            .shrink_to_fit(|span| hash_builder.hash_one(&stored[span.range()]));
    }

    /// Returns the number of stored bytes, terminators included.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Returns true if no bytes are stored.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Returns the arena's capacity in bytes.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Returns the number of distinct strings in the cache.
    #[inline]
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Returns every stored byte.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.arena.as_bytes()
    }

    /// See [`ByteArena::get`].
    #[inline]
    #[must_use]
    pub fn get(&self, offset: Offset) -> &[u8] {
        self.arena.get(offset)
    }

    /// See [`ByteArena::get_terminated`].
    #[must_use]
    pub fn get_terminated(&self, offset: Offset) -> &[u8] {
        self.arena.get_terminated(offset)
    }

    /// See [`ByteArena::get_str`].
    #[must_use]
    pub fn get_str(&self, offset: Offset) -> Option<&str> {
        self.arena.get_str(offset)
    }

    /// Returns the underlying arena.
    #[inline]
    #[must_use]
    pub fn arena(&self) -> &ByteArena {
        &self.arena
    }

    /// Drops the cache and returns the underlying arena.
    #[must_use]
    pub fn into_arena(self) -> ByteArena {
        self.arena
    }
}

impl Default for InterningArena {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InterningArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterningArena")
            .field("arena", &self.arena)
            .field("cached", &self.cache.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_strings_share_offset() {
        let mut strings = InterningArena::new();

        let a = strings.append(b"foo", true);
        let size = strings.len();
        let b = strings.append(b"foo", true);

        assert_eq!(a, b);
        assert_eq!(strings.len(), size);
        assert_eq!(strings.cached_len(), 1);
    }

    #[test]
    fn test_distinct_strings() {
        let mut strings = InterningArena::new();

        let foo = strings.append(b"foo", true);
        let bar = strings.append(b"bar", true);

        assert_eq!(foo, Offset::new(0));
        assert_eq!(bar, Offset::new(4));
        assert_eq!(strings.get_str(foo), Some("foo"));
        assert_eq!(strings.get_str(bar), Some("bar"));
    }

    #[test]
    fn test_prefix_is_not_a_match() {
        let mut strings = InterningArena::new();

        let long = strings.append(b"foobar", true);
        let short = strings.append(b"foo", true);

        assert_ne!(long, short);
        assert_eq!(strings.get_terminated(short), b"foo");
    }

    #[test]
    fn test_empty_string_is_interned() {
        let mut strings = InterningArena::new();

        let a = strings.append(b"", true);
        let b = strings.append(b"", true);

        assert_eq!(a, b);
        assert_eq!(strings.len(), 1);
    }

    #[test]
    fn test_unterminated_append_bypasses_cache() {
        let mut strings = InterningArena::new();

        let a = strings.append(b"abc", false);
        assert_eq!(strings.cached_len(), 0);
        assert_eq!(strings.len(), 3);

        // The tail is open, so even a terminated append is not cached.
        let b = strings.append(b"def", true);
        assert_eq!(b, Offset::new(3));
        assert_eq!(strings.cached_len(), 0);
        assert_eq!(strings.get_terminated(a), b"abcdef");

        // Tail is closed again; "def" was never cached, so it is stored anew.
        let c = strings.append(b"def", true);
        assert_eq!(c, Offset::new(7));
        assert_eq!(strings.append(b"def", true), c);
    }

    #[test]
    fn test_open_tail_blocks_lookup_of_cached_string() {
        let mut strings = InterningArena::new();

        let cached = strings.append(b"xyz", true);
        strings.append(b"prefix-", false);

        let again = strings.append(b"xyz", true);
        assert_ne!(cached, again);
        assert_eq!(strings.get_terminated(Offset::new(4)), b"prefix-xyz");
    }

    #[test]
    fn test_cache_survives_growth() {
        let mut strings = InterningArena::with_capacity(1);

        let offsets: Vec<Offset> = (0..500)
            .map(|i| strings.append_str(&format!("identifier_{i}")))
            .collect();
        let size = strings.len();

        for (i, &off) in offsets.iter().enumerate() {
            assert_eq!(strings.append_str(&format!("identifier_{i}")), off);
        }
        assert_eq!(strings.len(), size);
        assert_eq!(strings.cached_len(), 500);
    }

    #[test]
    fn test_clear_resets_cache() {
        let mut strings = InterningArena::new();
        strings.append(b"one", true);
        strings.append(b"two", true);

        strings.clear();
        assert!(strings.is_empty());
        assert_eq!(strings.cached_len(), 0);

        let two = strings.append(b"two", true);
        assert_eq!(two, Offset::new(0));
        assert_eq!(strings.get_str(two), Some("two"));
    }

    #[test]
    fn test_set_byte_evicts_changed_strings() {
        let mut strings = InterningArena::new();
        let cat = strings.append(b"cat", true);
        let dog = strings.append(b"dog", true);

        strings.set_byte(cat, b'b');
        assert_eq!(strings.cached_len(), 1);
        assert_eq!(strings.get_str(cat), Some("bat"));

        // "cat" is no longer stored, so it must not resolve to "bat".
        let cat_again = strings.append(b"cat", true);
        assert_ne!(cat_again, cat);
        assert_eq!(strings.get_str(cat_again), Some("cat"));
        assert_eq!(strings.append(b"dog", true), dog);
    }

    #[test]
    fn test_set_byte_on_terminator_evicts() {
        let mut strings = InterningArena::new();
        let ab = strings.append(b"ab", true);
        strings.append(b"cd", true);

        strings.set_byte(ab.add(2), b'-');
        assert_eq!(strings.get_str(ab), Some("ab-cd"));
        assert_ne!(strings.append(b"ab", true), ab);
    }

    #[test]
    fn test_append_arena_is_not_cached() {
        let mut other = ByteArena::new();
        other.append(b"shared", true);

        let mut strings = InterningArena::new();
        let start = strings.append_arena(&other);
        assert_eq!(start, Offset::new(0));
        assert_eq!(strings.cached_len(), 0);

        let interned = strings.append(b"shared", true);
        assert_eq!(interned, Offset::new(7));
    }

    #[test]
    fn test_cstr_and_str_share_cache() {
        let mut strings = InterningArena::new();

        let a = strings.append_cstr(c"name", true);
        let b = strings.append_str("name");
        let c = strings.append(b"name", true);

        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_into_arena_keeps_bytes() {
        let mut strings = InterningArena::new();
        strings.append_str("kept");
        strings.shrink_to_fit();
        assert_eq!(strings.append_str("kept"), Offset::new(0));

        let arena = strings.into_arena();
        assert_eq!(arena.as_bytes(), b"kept\0");
    }
}
