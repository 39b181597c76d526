//! Identifier generation for store-owned entities.
//!
//! Callers never supply identifiers. The store draws them from an
//! [`IdGenerator`] and re-draws on collision within a collection.

use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Source of fresh entity identifiers.
pub trait IdGenerator: Send + Sync {
    /// Returns a new identifier.
    fn next_id(&self) -> String;
}

/// Default generator producing UUID v4 strings.
#[derive(Debug, Clone, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic generator producing `<prefix><n>` with an increasing counter.
///
/// # Example
///
/// ```
/// use opsdeck_core::id::{IdGenerator, SequentialIdGenerator};
///
/// let ids = SequentialIdGenerator::new("n-");
/// assert_eq!(ids.next_id(), "n-1");
/// assert_eq!(ids.next_id(), "n-2");
/// ```
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }

    /// Starts counting after `start`, so the first id is `start + 1`.
    pub fn starting_after(prefix: impl Into<String>, start: u64) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(start),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}{}", self.prefix, n)
    }
}
