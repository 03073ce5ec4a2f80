//! Order identifiers and the process-wide sequential allocator.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Identifier of a queued order. Unique within a process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Issues strictly increasing order identifiers starting at 0.
///
/// The counter is independent of the queue lock so an id can be taken before
/// the enqueue decision is known; rejected orders still consume their id.
/// Nothing is persisted, so a restarted process starts again from 0.
#[derive(Debug, Default)]
pub struct SequentialIdAllocator {
    next: AtomicU64,
}

impl SequentialIdAllocator {
    /// Creates an allocator whose first id is 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next id. Concurrent callers never observe the same value.
    pub fn next(&self) -> OrderId {
        OrderId(self.next.fetch_add(1, Ordering::SeqCst))
    }

    /// Returns the id the next call to [`next`](Self::next) would hand out.
    #[must_use]
    pub fn peek(&self) -> OrderId {
        OrderId(self.next.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::{Arc, Barrier, Mutex};
    use std::thread;

    #[test]
    fn test_next_starts_at_zero_and_increments() {
        // Arrange
        let ids = SequentialIdAllocator::new();

        // Act
        let first = ids.next();
        let second = ids.next();
        let third = ids.next();

        // Assert
        assert_eq!(first, OrderId(0));
        assert_eq!(second, OrderId(1));
        assert_eq!(third, OrderId(2));
        assert_eq!(ids.peek(), OrderId(3));
    }

    #[test]
    fn test_concurrent_next_yields_dense_unique_ids() {
        // Arrange
        let ids = Arc::new(SequentialIdAllocator::new());
        let threads = 8;
        let per_thread = 250;
        let barrier = Arc::new(Barrier::new(threads));
        let seen: Arc<Mutex<HashSet<u64>>> = Arc::new(Mutex::new(HashSet::new()));

        // Act
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let ids = Arc::clone(&ids);
                let barrier = Arc::clone(&barrier);
                let seen = Arc::clone(&seen);
                thread::spawn(move || {
                    barrier.wait();
                    for _ in 0..per_thread {
                        let id = ids.next();
                        // Each id may be handed out only once.
                        assert!(seen.lock().unwrap().insert(id.0));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("allocator thread panicked");
        }

        // Assert
        let total = (threads * per_thread) as u64;
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len() as u64, total);
        assert_eq!(*seen, (0..total).collect::<HashSet<_>>());
    }

    #[test]
    fn test_order_id_serializes_as_plain_integer() {
        let json = serde_json::to_value(OrderId(42)).unwrap();
        assert_eq!(json, serde_json::json!(42));
        assert_eq!(OrderId(42).to_string(), "42");
    }
}
