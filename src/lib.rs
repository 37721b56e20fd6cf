//! # `memo` - Shared Lazy Values
//!
//! A memo wraps either a production rule for a value or a value that is already
//! known. The rule runs at most once, on the first read, and every later read
//! returns the cached value. Cloning a memo copies a pointer, not the value or
//! the rule, so reads through any clone observe one shared evaluation.
//!
//! ## Guarantees
//!
//! - **Exactly once on success**: the first successful read through any clone
//!   moves the shared state from *pending* to *done*; nothing moves it back.
//! - **Failures are not cached**: a rule that returns `Err` or panics leaves the
//!   state pending with the rule still installed, so the next read retries.
//!   Errors reach the caller unchanged.
//! - **Value-holding constructors bypass the rule**: `evaluated(value)` starts
//!   in the done state.
//!
//! ## Flavours
//!
//! 1. [`Memo<A, E>`](Memo): `Rc` + `RefCell`. `!Send`, so sharing it across
//!    threads without synchronization is rejected at compile time. Re-entrant
//!    reads from inside the rule panic with a dedicated message.
//! 2. [`SyncMemo<A, E>`](SyncMemo): `Arc` + `Mutex`. The first reader runs the
//!    rule under the lock; concurrent readers wait for the cached value.
//!
//! Both are one pointer wide.
//!
//! ## Features
//!
//! - `tracing`: emit a `trace!` event each time a memo is evaluated.
//!
//! ## Example
//!
//! ```rust
//! use memo::Memo;
//!
//! let greeting = Memo::new(|| format!("hello, {}", "memo"));
//! let shared = greeting.clone();
//!
//! assert!(!shared.is_evaluated());
//! assert_eq!(*greeting.get(), "hello, memo");
//! assert!(shared.is_evaluated());
//!
//! let known: Memo<u32> = Memo::evaluated(7);
//! assert_eq!(known.value(), 7);
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod memo;
pub mod sync;

mod serde_impls;
mod state;

pub use memo::Memo;
pub use sync::SyncMemo;

// Compile-time assertions for the handle layout.
#[cfg(not(loom))]
const _: () = {
    use core::mem;

    // A handle is a single pointer to its shared cell.
    assert!(mem::size_of::<Memo<u64>>() == mem::size_of::<usize>());
    assert!(mem::size_of::<Memo<[u8; 256], String>>() == mem::size_of::<usize>());
    assert!(mem::size_of::<SyncMemo<u64>>() == mem::size_of::<usize>());

    // The niche in the pointer is preserved.
    assert!(mem::size_of::<Option<Memo<u64>>>() == mem::size_of::<usize>());
};
