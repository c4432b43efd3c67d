//! Fixed-capacity ring buffer over the most recent values.
//!
//! A [`RingBuffer`] owns exactly `capacity` slots. Adding to a full buffer
//! overwrites the oldest value, so the buffer always holds the last
//! `min(adds, capacity)` values. Those values are addressed by logical index:
//! `0` is the oldest one still held and `len() - 1` the newest.
//!
//! Logical index `i` lives in physical slot `(head + capacity - len + i) %
//! capacity`, where `head` is the slot the next add writes to. The retained
//! window is therefore at most two contiguous runs of the backing store,
//! which [`RingBuffer::as_slices`] exposes and both iterators walk.
//!
//! # Examples
//!
//! ```
//! use strata_mem::RingBuffer;
//!
//! let mut recent = RingBuffer::new(3);
//! for v in [10, 20, 30, 40] {
//!     recent.add(v);
//! }
//!
//! assert_eq!(recent.len(), 3);
//! assert_eq!(recent.get(0), Ok(&20));
//! assert_eq!(recent.last(), Ok(&40));
//! assert_eq!(recent.iter().copied().collect::<Vec<_>>(), [20, 30, 40]);
//! ```
//!
//! # Errors
//!
//! Indexing outside `[0, len())` is reported as
//! [`RingBufferError::IndexOutOfBounds`] rather than a panic, and asking an
//! empty buffer for its newest or oldest value as [`RingBufferError::Empty`].

use std::fmt;
use std::iter::{Chain, FusedIterator};
use std::slice;

use strata_log::debug;

use crate::error::{Result, RingBufferError};

/// A fixed-capacity circular buffer.
#[derive(Clone)]
pub struct RingBuffer<T> {
    /// Backing store; its length is the capacity and never changes.
    storage: Box<[T]>,
    /// Physical slot the next [`add`](Self::add) writes to.
    head: usize,
    /// Number of retained values, saturating at the capacity.
    len: usize,
}

impl<T: Default> RingBuffer<T> {
    /// Creates an empty buffer whose slots hold `T::default()`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be non-zero");
        Self {
            storage: std::iter::repeat_with(T::default).take(capacity).collect(),
            head: 0,
            len: 0,
        }
    }
}

impl<T: Clone> RingBuffer<T> {
    /// Creates an empty buffer whose slots hold clones of `value`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn from_elem(capacity: usize, value: T) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be non-zero");
        Self {
            storage: vec![value; capacity].into_boxed_slice(),
            head: 0,
            len: 0,
        }
    }

    /// Overwrites every physical slot with `value`.
    ///
    /// The number of retained values does not change: values already added
    /// are overwritten in place, and slots outside the window stay outside it.
    pub fn fill(&mut self, value: T) {
        self.storage.fill(value);
    }
}

impl<T> RingBuffer<T> {
    /// Adds `value` as the newest element.
    ///
    /// When the buffer is already full the oldest element is evicted and
    /// returned; otherwise this returns `None`.
    ///
    /// ```
    /// use strata_mem::RingBuffer;
    ///
    /// let mut buf = RingBuffer::new(2);
    /// assert_eq!(buf.add('a'), None);
    /// assert_eq!(buf.add('b'), None);
    /// assert_eq!(buf.add('c'), Some('a'));
    /// ```
    pub fn add(&mut self, value: T) -> Option<T> {
        let capacity = self.capacity();
        let evicted = std::mem::replace(&mut self.storage[self.head], value);
        self.head = (self.head + 1) % capacity;

        if self.len < capacity {
            self.len += 1;
            None
        } else {
            Some(evicted)
        }
    }

    /// Returns the element at logical index `index`, `0` being the oldest.
    ///
    /// # Errors
    ///
    /// Returns [`RingBufferError::IndexOutOfBounds`] if `index >= len()`.
    pub fn get(&self, index: usize) -> Result<&T> {
        let slot = self.slot(index)?;
        Ok(&self.storage[slot])
    }

    /// Mutable variant of [`get`](Self::get).
    ///
    /// # Errors
    ///
    /// Returns [`RingBufferError::IndexOutOfBounds`] if `index >= len()`.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        let slot = self.slot(index)?;
        Ok(&mut self.storage[slot])
    }

    /// Returns the oldest retained element.
    ///
    /// # Errors
    ///
    /// Returns [`RingBufferError::Empty`] if nothing has been added since
    /// creation or the last [`clear`](Self::clear).
    pub fn first(&self) -> Result<&T> {
        if self.len == 0 {
            return Err(RingBufferError::Empty);
        }
        self.get(0)
    }

    /// Returns the most recently added element.
    ///
    /// # Errors
    ///
    /// Returns [`RingBufferError::Empty`] if the buffer is empty.
    pub fn last(&self) -> Result<&T> {
        if self.len == 0 {
            return Err(RingBufferError::Empty);
        }
        self.get(self.len - 1)
    }

    /// Mutable variant of [`last`](Self::last).
    ///
    /// # Errors
    ///
    /// Returns [`RingBufferError::Empty`] if the buffer is empty.
    pub fn last_mut(&mut self) -> Result<&mut T> {
        if self.len == 0 {
            return Err(RingBufferError::Empty);
        }
        self.get_mut(self.len - 1)
    }

    /// Returns the number of retained elements.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no elements are retained.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true once the next add will evict.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len == self.storage.len()
    }

    /// Returns the fixed number of slots.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Forgets every retained element.
    ///
    /// Slots are not dropped or reset; they are overwritten by later adds.
    pub fn clear(&mut self) {
        debug!("clearing ring buffer ({} of {} retained)", self.len, self.capacity());
        self.len = 0;
        self.head = 0;
    }

    /// Returns the retained window as two runs, oldest first.
    ///
    /// The second run is empty unless the window wraps around the end of the
    /// backing store.
    ///
    /// ```
    /// use strata_mem::RingBuffer;
    ///
    /// let mut buf = RingBuffer::new(3);
    /// buf.extend([1, 2, 3, 4]);
    ///
    /// assert_eq!(buf.as_slices(), (&[2, 3][..], &[4][..]));
    /// ```
    #[must_use]
    pub fn as_slices(&self) -> (&[T], &[T]) {
        let start = self.start();
        let end = start + self.len;
        if end <= self.storage.len() {
            (&self.storage[start..end], &[])
        } else {
            let (wrapped, tail) = self.storage.split_at(start);
            (tail, &wrapped[..end - self.storage.len()])
        }
    }

    /// Mutable variant of [`as_slices`](Self::as_slices).
    #[must_use]
    pub fn as_mut_slices(&mut self) -> (&mut [T], &mut [T]) {
        let start = self.start();
        let end = start + self.len;
        let capacity = self.storage.len();
        if end <= capacity {
            (&mut self.storage[start..end], &mut [])
        } else {
            let (wrapped, tail) = self.storage.split_at_mut(start);
            (tail, &mut wrapped[..end - capacity])
        }
    }

    /// Returns an iterator over the retained elements, oldest first.
    pub fn iter(&self) -> Iter<'_, T> {
        let (front, back) = self.as_slices();
        Iter {
            inner: front.iter().chain(back),
        }
    }

    /// Returns an iterator that allows modifying each retained element,
    /// oldest first.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        let (front, back) = self.as_mut_slices();
        IterMut {
            inner: front.iter_mut().chain(back),
        }
    }

    /// Physical slot of the oldest retained element.
    #[inline]
    fn start(&self) -> usize {
        let capacity = self.storage.len();
        (self.head + capacity - self.len) % capacity
    }

    /// Maps a logical index to its physical slot.
    fn slot(&self, index: usize) -> Result<usize> {
        if index >= self.len {
            debug!("rejected ring buffer index {} (len {})", index, self.len);
            return Err(RingBufferError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        Ok((self.start() + index) % self.storage.len())
    }
}

impl<T: PartialEq> PartialEq for RingBuffer<T> {
    /// Buffers are equal when they have the same capacity, the same number of
    /// retained elements, and pairwise-equal elements in logical order.
    fn eq(&self, other: &Self) -> bool {
        self.capacity() == other.capacity()
            && self.len == other.len
            && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for RingBuffer<T> {}

impl<T: fmt::Debug> fmt::Debug for RingBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Extend<T> for RingBuffer<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl<'a, T> IntoIterator for &'a RingBuffer<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut RingBuffer<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// Iterator over a [`RingBuffer`]'s retained elements, oldest first.
///
/// Clones resume from the current position; call [`RingBuffer::iter`] again
/// for a fresh pass.
pub struct Iter<'a, T> {
    inner: Chain<slice::Iter<'a, T>, slice::Iter<'a, T>>,
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// Mutable iterator over a [`RingBuffer`]'s retained elements, oldest first.
pub struct IterMut<'a, T> {
    inner: Chain<slice::IterMut<'a, T>, slice::IterMut<'a, T>>,
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for IterMut<'_, T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}

impl<T> FusedIterator for IterMut<'_, T> {}
