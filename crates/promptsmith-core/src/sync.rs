//! Poison-tolerant locking for the in-memory stores and test transports.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Locks a `Mutex` whether or not a previous holder panicked.
///
/// Everything guarded this way is replaced wholesale on write, so a poisoned
/// value is still a complete one.
pub trait IgnoreLock<T> {
    /// Acquires the guard, recovering it from a poisoned lock.
    fn lock_ignore_poison(&self) -> MutexGuard<'_, T>;
}

impl<T> IgnoreLock<T> for Mutex<T> {
    fn lock_ignore_poison(&self) -> MutexGuard<'_, T> {
        self.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_recovers_after_panicking_holder() {
        let shared = Arc::new(Mutex::new(vec!["saved"]));
        let handle = Arc::clone(&shared);
        let outcome = thread::spawn(move || {
            let _guard = handle.lock_ignore_poison();
            panic!("holder panicked");
        })
        .join();

        assert!(outcome.is_err());
        assert!(shared.is_poisoned());
        assert_eq!(*shared.lock_ignore_poison(), vec!["saved"]);
    }
}
