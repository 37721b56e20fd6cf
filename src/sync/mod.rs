//! `SyncMemo` — thread-safe lazy value shared by all of its clones.
//!
//! Same contract as [`Memo`](crate::Memo), with the evaluation state behind a
//! mutex. The first reader runs the production rule while holding the lock;
//! concurrent readers wait and then see the cached value, so the rule still runs
//! at most once per construction.
//!
//! Reads are closure-scoped ([`with`](SyncMemo::with)) or cloning
//! ([`value`](SyncMemo::value)) because the value is only reachable while the
//! lock is held.
//!
//! # Re-entrancy
//! A production rule must not read its own memo. Doing so locks the mutex
//! twice on one thread, which may deadlock or panic.
//!
//! ```rust
//! use memo::SyncMemo;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use std::thread;
//!
//! let calls = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&calls);
//! let memo = SyncMemo::new(move || {
//!     counter.fetch_add(1, Ordering::SeqCst);
//!     String::from("shared")
//! });
//!
//! thread::scope(|s| {
//!     for _ in 0..4 {
//!         let memo = memo.clone();
//!         s.spawn(move || assert_eq!(memo.value(), "shared"));
//!     }
//! });
//! assert_eq!(calls.load(Ordering::SeqCst), 1);
//! ```

pub(crate) mod shared;

use core::convert::Infallible;
use core::fmt;

use crate::state::EvaluationState;
use shared::SharedCell;

type Rule<A, E> = Box<dyn FnMut() -> Result<A, E> + Send>;

/// A thread-safe lazily produced, cached value whose clones share one evaluation.
pub struct SyncMemo<A, E = Infallible> {
    cell: SharedCell<EvaluationState<A, Rule<A, E>>>,
}

impl<A> SyncMemo<A> {
    /// Creates a memo that runs `rule` on the first read from any thread.
    pub fn new<F>(mut rule: F) -> Self
    where
        F: FnMut() -> A + Send + 'static,
    {
        Self::try_new(move || Ok(rule()))
    }

    /// Applies `f` to the value, producing it on first read.
    ///
    /// The memo stays locked while `f` runs.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&A) -> R,
    {
        match self.try_with(f) {
            Ok(result) => result,
            Err(never) => match never {},
        }
    }

    /// Returns a clone of the value, producing it on first read.
    #[inline]
    pub fn value(&self) -> A
    where
        A: Clone,
    {
        self.with(A::clone)
    }
}

impl<A, E> SyncMemo<A, E> {
    /// Creates a memo from a fallible rule.
    ///
    /// An `Err` (or a panic) leaves the memo pending and the next read, from
    /// any thread, runs the rule again.
    pub fn try_new<F>(rule: F) -> Self
    where
        F: FnMut() -> Result<A, E> + Send + 'static,
    {
        Self {
            cell: SharedCell::new(EvaluationState::Pending(Box::new(rule))),
        }
    }

    /// Creates a memo that already holds `value`.
    pub fn evaluated(value: A) -> Self {
        Self {
            cell: SharedCell::new(EvaluationState::Done(value)),
        }
    }

    /// Returns `true` if the value has been produced.
    ///
    /// Blocks while another thread is running the rule.
    #[inline]
    pub fn is_evaluated(&self) -> bool {
        self.cell.lock().is_done()
    }

    /// Applies `f` to the value, producing it on first read.
    ///
    /// # Errors
    /// Returns the rule's error unchanged; `f` is not called and the memo
    /// stays pending.
    pub fn try_with<R, F>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&A) -> R,
    {
        let mut state = self.cell.lock();
        let value = state.force()?;
        Ok(f(value))
    }

    /// Returns a clone of the value, producing it on first read.
    ///
    /// # Errors
    /// Returns the rule's error unchanged. The memo stays pending.
    #[inline]
    pub fn try_value(&self) -> Result<A, E>
    where
        A: Clone,
    {
        self.try_with(A::clone)
    }
}

impl<A, E> Clone for SyncMemo<A, E> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<A, E> From<A> for SyncMemo<A, E> {
    fn from(value: A) -> Self {
        Self::evaluated(value)
    }
}

impl<A: Default + 'static> Default for SyncMemo<A> {
    fn default() -> Self {
        Self::new(A::default)
    }
}

impl<A: fmt::Debug, E> fmt::Debug for SyncMemo<A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tuple = f.debug_tuple("SyncMemo");
        match self.cell.try_lock() {
            Some(state) => match state.peek() {
                Some(value) => tuple.field(value),
                None => tuple.field(&format_args!("<pending>")),
            },
            None => tuple.field(&format_args!("<locked>")),
        };
        tuple.finish()
    }
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_sync_memo_is_send_sync() {
        assert_send_sync::<SyncMemo<u64>>();
        assert_send_sync::<SyncMemo<Arc<str>, String>>();
    }

    #[test]
    fn test_panicking_rule_stays_pending() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let memo = SyncMemo::new(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("first production fails");
            }
            17u32
        });

        let first = panic::catch_unwind(AssertUnwindSafe(|| memo.value()));
        assert!(first.is_err());
        assert!(!memo.is_evaluated());

        assert_eq!(memo.value(), 17);
        assert_eq!(memo.value(), 17);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_error_does_not_call_reader() {
        let memo: SyncMemo<u8, &str> = SyncMemo::try_new(|| Err("unavailable"));
        let mut reached = false;
        assert_eq!(memo.try_with(|_| reached = true), Err("unavailable"));
        assert!(!reached);
    }

    #[test]
    fn test_debug_and_default() {
        let memo: SyncMemo<Vec<u8>> = SyncMemo::default();
        assert_eq!(format!("{memo:?}"), "SyncMemo(<pending>)");
        assert!(memo.with(Vec::is_empty));
        assert_eq!(format!("{memo:?}"), "SyncMemo([])");

        let ready: SyncMemo<i64> = SyncMemo::from(3);
        assert_eq!(format!("{ready:?}"), "SyncMemo(3)");
    }
}
