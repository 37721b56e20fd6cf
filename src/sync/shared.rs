//! Mutex-backed shared cell for [`SyncMemo`](super::SyncMemo).
//!
//! Under `--cfg loom` the `Arc`/`Mutex` pair comes from loom so the model
//! checker can explore every interleaving of the first reads.

use std::sync::{PoisonError, TryLockError};

#[cfg(loom)]
use loom::sync::{Arc, Mutex, MutexGuard};
#[cfg(not(loom))]
use std::sync::{Arc, Mutex, MutexGuard};

pub(crate) struct SharedCell<T> {
    slot: Arc<Mutex<T>>,
}

impl<T> SharedCell<T> {
    pub(crate) fn new(value: T) -> Self {
        Self {
            slot: Arc::new(Mutex::new(value)),
        }
    }

    /// Locks the slot, blocking until it is free.
    ///
    /// Poisoning is ignored: the state is only written after a rule succeeds,
    /// so a rule that panicked left a valid `Pending` behind.
    #[inline]
    pub(crate) fn lock(&self) -> MutexGuard<'_, T> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Locks the slot if it is free right now.
    #[inline]
    pub(crate) fn try_lock(&self) -> Option<MutexGuard<'_, T>> {
        match self.slot.try_lock() {
            Ok(guard) => Some(guard),
            Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }
}

impl<T> Clone for SharedCell<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}
