//! Property-based tests for the arenas and the ring buffer.
//!
//! Each property runs against quickcheck-generated inputs; the unit tests in
//! each module cover the fixed examples and edge cases.

use quickcheck::TestResult;
use quickcheck_macros::quickcheck;
use strata_mem::{ByteArena, InterningArena, Offset, RingBuffer, RingBufferError, TERMINATOR};

fn without_nul(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().copied().filter(|&b| b != TERMINATOR).collect()
}

// ============================================================================
// ByteArena
// ============================================================================

#[quickcheck]
fn append_reads_back_exactly(prefix: Vec<Vec<u8>>, bytes: Vec<u8>, terminate: bool) -> bool {
    let mut arena = ByteArena::new();
    for p in &prefix {
        arena.append(p, true);
    }

    let before = arena.len();
    let off = arena.append(&bytes, terminate);

    let mut expected = bytes.clone();
    if terminate {
        expected.push(TERMINATOR);
    }

    off == Offset::new(before)
        && arena.len() == before + expected.len()
        && arena.as_bytes()[before..] == expected[..]
}

#[quickcheck]
fn offsets_stay_valid_across_appends(strings: Vec<Vec<u8>>) -> bool {
    let strings: Vec<Vec<u8>> = strings.iter().map(|s| without_nul(s)).collect();

    let mut arena = ByteArena::new();
    let offsets: Vec<Offset> = strings.iter().map(|s| arena.append(s, true)).collect();

    strings
        .iter()
        .zip(&offsets)
        .all(|(s, &off)| arena.get_terminated(off) == &s[..])
}

#[quickcheck]
fn append_arena_concatenates(a: Vec<u8>, b: Vec<u8>) -> bool {
    let mut first = ByteArena::new();
    first.append(&a, false);
    let mut second = ByteArena::new();
    second.append(&b, false);

    let before = first.len();
    let start = first.append_arena(&second);

    start == Offset::new(before)
        && first.len() == before + second.len()
        && first.as_bytes()[before..] == *second.as_bytes()
}

// ============================================================================
// InterningArena
// ============================================================================

#[quickcheck]
fn identical_terminated_strings_share_offset(prefix: Vec<Vec<u8>>, s: Vec<u8>) -> bool {
    let s = without_nul(&s);

    let mut strings = InterningArena::new();
    for p in &prefix {
        strings.append(&without_nul(p), true);
    }

    let first = strings.append(&s, true);
    let size = strings.len();
    let second = strings.append(&s, true);

    first == second && strings.len() == size && strings.get_terminated(first) == &s[..]
}

#[quickcheck]
fn distinct_strings_get_distinct_offsets(a: Vec<u8>, b: Vec<u8>) -> TestResult {
    let (a, b) = (without_nul(&a), without_nul(&b));
    if a == b {
        return TestResult::discard();
    }

    let mut strings = InterningArena::new();
    let off_a = strings.append(&a, true);
    let off_b = strings.append(&b, true);

    TestResult::from_bool(
        off_a != off_b
            && strings.get_terminated(off_a) == &a[..]
            && strings.get_terminated(off_b) == &b[..],
    )
}

#[quickcheck]
fn interning_matches_plain_arena_content(strings: Vec<String>) -> bool {
    let strings: Vec<String> = strings.into_iter().map(|s| s.replace('\0', "")).collect();

    let mut interned = InterningArena::new();
    let mut plain = ByteArena::new();
    for s in &strings {
        let off = interned.append_str(s);
        plain.append_str(s);
        if interned.get_str(off) != Some(s.as_str()) {
            return false;
        }
    }

    interned.len() <= plain.len()
}

// ============================================================================
// RingBuffer
// ============================================================================

#[quickcheck]
fn ring_keeps_last_capacity_values(capacity: u8, values: Vec<i32>) -> TestResult {
    if capacity == 0 {
        return TestResult::discard();
    }
    let capacity = usize::from(capacity);

    let mut buf = RingBuffer::new(capacity);
    buf.extend(values.iter().copied());

    let kept = &values[values.len().saturating_sub(capacity)..];
    let indexed: Vec<i32> = (0..buf.len()).map(|i| *buf.get(i).unwrap()).collect();

    TestResult::from_bool(
        buf.len() == kept.len()
            && indexed == kept
            && buf.iter().copied().eq(kept.iter().copied())
            && buf.get(buf.len()) == Err(RingBufferError::IndexOutOfBounds {
                index: buf.len(),
                len: buf.len(),
            }),
    )
}

#[quickcheck]
fn ring_overflow_window(capacity: u8, extra: u8) -> TestResult {
    if capacity == 0 {
        return TestResult::discard();
    }
    let (c, k) = (usize::from(capacity), usize::from(extra));

    let mut buf = RingBuffer::new(c);
    for i in 1..=c + k {
        buf.add(i);
    }

    TestResult::from_bool(
        buf.len() == c && buf.get(0) == Ok(&(k + 1)) && buf.get(c - 1) == Ok(&(c + k)),
    )
}

#[quickcheck]
fn ring_clear_then_add_starts_at_zero(values: Vec<u16>, next: u16) -> bool {
    let mut buf = RingBuffer::new(4);
    buf.extend(values);
    buf.clear();

    let empty = buf.is_empty();
    buf.add(next);

    empty && buf.len() == 1 && buf.get(0) == Ok(&next)
}

#[quickcheck]
fn ring_equality_tracks_content(values: Vec<i8>, pos: usize) -> TestResult {
    if values.is_empty() {
        return TestResult::discard();
    }

    let mut a = RingBuffer::new(8);
    let mut b = RingBuffer::new(8);
    a.extend(values.iter().copied());
    b.extend(values.iter().copied());
    if a != b {
        return TestResult::failed();
    }

    let mut changed = values.clone();
    let idx = values.len().saturating_sub(8) + pos % values.len().min(8);
    changed[idx] = changed[idx].wrapping_add(1);

    let mut c = RingBuffer::new(8);
    c.extend(changed);
    TestResult::from_bool(a != c)
}
