//! Per-owner mutual exclusion.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use garage_types::OwnerId;

/// Serializes operations on the same owner while letting different owners
/// proceed in parallel. Entries are dropped once nobody holds or waits on
/// them.
#[derive(Debug, Default)]
pub struct OwnerLocks {
    table: Mutex<HashMap<OwnerId, Arc<Mutex<()>>>>,
}

impl OwnerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding `owner`'s lock.
    pub fn with_owner<R>(&self, owner: &OwnerId, f: impl FnOnce() -> R) -> R {
        let slot = {
            let mut table = self.table.lock().expect("lock poisoned");
            Arc::clone(table.entry(owner.clone()).or_default())
        };

        let result = {
            // The guarded value is `()`, so a poisoned slot carries no broken state.
            let _held = slot.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };

        let mut table = self.table.lock().expect("lock poisoned");
        // Table plus this call: no other holder or waiter.
        if Arc::strong_count(&slot) == 2 {
            table.remove(owner);
        }
        result
    }

    /// Number of owners currently tracked.
    pub fn len(&self) -> usize {
        self.table.lock().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    fn owner(s: &str) -> OwnerId {
        OwnerId::new(s).unwrap()
    }

    #[test]
    fn same_owner_is_serialized() {
        let locks = OwnerLocks::new();
        let inside = AtomicUsize::new(0);
        let max_seen = AtomicUsize::new(0);
        let alice = owner("alice");

        thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    locks.with_owner(&alice, || {
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        max_seen.fetch_max(now, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(2));
                        inside.fetch_sub(1, Ordering::SeqCst);
                    });
                });
            }
        });

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
        assert!(locks.is_empty());
    }

    #[test]
    fn returns_closure_value_and_cleans_up() {
        let locks = OwnerLocks::new();
        let v = locks.with_owner(&owner("bob"), || {
            assert_eq!(locks.len(), 1);
            42
        });
        assert_eq!(v, 42);
        assert_eq!(locks.len(), 0);
    }
}
