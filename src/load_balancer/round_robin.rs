//! Round-robin load balancing strategy.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Round-robin selector over a fixed number of slots.
///
/// Holds the dispatch cursor: the index of the most recently selected slot.
/// Each selection moves it to `(cursor + 1) % len` with a single
/// compare-and-swap, so concurrent callers never advance from the same value.
#[derive(Debug)]
pub struct RoundRobin {
    cursor: AtomicUsize,
    len: usize,
}

impl RoundRobin {
    /// Create a selector over `len` slots. The first selection returns 0.
    ///
    /// `len` must be non-zero; callers check this when building a pool.
    pub fn new(len: usize) -> Self {
        debug_assert!(len > 0, "round robin over an empty set");
        Self {
            cursor: AtomicUsize::new(len.saturating_sub(1)),
            len,
        }
    }

    /// Advance the cursor and return the newly selected index.
    pub fn next_index(&self) -> usize {
        let len = self.len;
        // The closure always returns Some, so fetch_update cannot fail.
        let previous = match self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| Some((c + 1) % len))
        {
            Ok(prev) | Err(prev) => prev,
        };
        (previous + 1) % len
    }

    /// Index selected by the most recent call (or `len - 1` before any call).
    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
