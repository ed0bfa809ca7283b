//! # Stask Testing
//!
//! Testing utilities and helpers for Stask reducers and stores.
//!
//! This crate provides:
//! - Mock implementations of Environment traits
//! - In-memory and failing key-value stores
//! - A Given/When/Then harness for reducers
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use stask_testing::{InMemoryStore, SequentialIds};
//! use stask_runtime::Store;
//!
//! #[tokio::test]
//! async fn test_add_flow() {
//!     let storage = InMemoryStore::new();
//!     let env = TodoEnvironment::new(Arc::new(SequentialIds::new()), Arc::new(storage.clone()));
//!     let store = Store::new(TodoState::new(), TodoReducer::new(), env);
//!
//!     store.send(TodoAction::AddTodo { text: "Buy milk".into() }).await?;
//!
//!     assert_eq!(store.state(|s| s.count()).await, 1);
//!     assert_eq!(storage.write_count(), 1);
//! }
//! ```

use stask_core::environment::IdGenerator;


/// In-memory key-value stores for persistence tests
pub mod storage_mocks;

/// Mock implementations of Environment traits
pub mod mocks {
    use super::IdGenerator;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Id generator producing `id-1`, `id-2`, ... for deterministic tests
    ///
    /// # Example
    ///
    /// ```
    /// use stask_testing::mocks::SequentialIds;
    /// use stask_core::environment::IdGenerator;
    ///
    /// let ids = SequentialIds::new();
    /// assert_eq!(ids.next_id(), "id-1");
    /// assert_eq!(ids.next_id(), "id-2");
    /// ```
    #[derive(Debug, Default)]
    pub struct SequentialIds {
        next: AtomicU64,
    }

    impl SequentialIds {
        /// Create a generator whose first id is `id-1`
        #[must_use]
        pub const fn new() -> Self {
            Self {
                next: AtomicU64::new(0),
            }
        }

        /// Create a generator whose first id is `id-{start}`
        ///
        /// Useful when state was seeded with ids the generator must not repeat.
        #[must_use]
        pub const fn starting_at(start: u64) -> Self {
            Self {
                next: AtomicU64::new(start.saturating_sub(1)),
            }
        }
    }

    impl IdGenerator for SequentialIds {
        fn next_id(&self) -> String {
            let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
            format!("id-{n}")
        }
    }
}

// Re-export commonly used items
pub use mocks::SequentialIds;
pub use reducer_test::{assertions, ReducerTest};
pub use storage_mocks::{FailingStore, InMemoryStore};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_ids_count_up() {
        let ids = SequentialIds::new();
        assert_eq!(ids.next_id(), "id-1");
        assert_eq!(ids.next_id(), "id-2");
    }

    #[test]
    fn sequential_ids_can_skip_seeded_values() {
        let ids = SequentialIds::starting_at(10);
        assert_eq!(ids.next_id(), "id-10");
        assert_eq!(ids.next_id(), "id-11");
    }
}
