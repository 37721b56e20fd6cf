//! `Memo` — single-threaded lazy value shared by all of its clones.
//!
//! A `Memo` is one pointer to a [`SharedCell`](shared::SharedCell) holding an
//! evaluation state. Cloning copies the pointer, so every clone observes and
//! contributes to the same evaluation: the production rule runs at most once per
//! construction, no matter which clone reads first.
//!
//! ```rust
//! use memo::Memo;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let calls = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&calls);
//! let memo = Memo::new(move || {
//!     counter.set(counter.get() + 1);
//!     6 * 7
//! });
//!
//! let copy = memo.clone();
//! assert_eq!(memo.value(), 42);
//! assert_eq!(copy.value(), 42);
//! assert_eq!(calls.get(), 1);
//! ```
//!
//! Fallible rules keep their state pending on `Err`, so the next read retries:
//!
//! ```rust
//! use memo::Memo;
//!
//! let mut attempts = 0;
//! let memo = Memo::try_new(move || {
//!     attempts += 1;
//!     if attempts < 2 { Err("not yet") } else { Ok(attempts) }
//! });
//!
//! assert_eq!(memo.try_value(), Err("not yet"));
//! assert_eq!(memo.try_value(), Ok(2));
//! assert_eq!(memo.try_value(), Ok(2));
//! ```

pub(crate) mod shared;

use core::cell::Ref;
use core::convert::Infallible;
use core::fmt;

use crate::state::EvaluationState;
use shared::SharedCell;

type Rule<A, E> = Box<dyn FnMut() -> Result<A, E>>;

/// A lazily produced, cached value whose clones share one evaluation.
///
/// `E` is the error type of the production rule; infallible memos use the
/// default `Infallible` and read through [`value`](Memo::value) / [`get`](Memo::get).
pub struct Memo<A, E = Infallible> {
    cell: SharedCell<EvaluationState<A, Rule<A, E>>>,
}

impl<A> Memo<A> {
    /// Creates a memo that runs `rule` on first read.
    ///
    /// The rule is not invoked here. It is `FnMut` so that an attempt which
    /// unwinds leaves it available for the next read.
    pub fn new<F>(mut rule: F) -> Self
    where
        F: FnMut() -> A + 'static,
    {
        Self::try_new(move || Ok(rule()))
    }

    /// Borrows the value, producing it on first read.
    ///
    /// # Panics
    /// If called from inside this memo's own production rule.
    #[inline]
    pub fn get(&self) -> Ref<'_, A> {
        match self.try_get() {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Returns a clone of the value, producing it on first read.
    #[inline]
    pub fn value(&self) -> A
    where
        A: Clone,
    {
        A::clone(&self.get())
    }
}

impl<A, E> Memo<A, E> {
    /// Creates a memo from a fallible rule.
    ///
    /// A rule that returns `Err` leaves the memo pending; the error is handed
    /// to the reader as is and the next read runs the rule again.
    pub fn try_new<F>(rule: F) -> Self
    where
        F: FnMut() -> Result<A, E> + 'static,
    {
        Self {
            cell: SharedCell::new(EvaluationState::Pending(Box::new(rule))),
        }
    }

    /// Creates a memo that already holds `value`. No rule is ever run.
    pub fn evaluated(value: A) -> Self {
        Self {
            cell: SharedCell::new(EvaluationState::Done(value)),
        }
    }

    /// Returns `true` if the value has been produced, without producing it.
    #[inline]
    pub fn is_evaluated(&self) -> bool {
        self.cell.borrow().is_done()
    }

    /// Borrows the value, producing it on first read.
    ///
    /// # Errors
    /// Returns the rule's error unchanged. The memo stays pending.
    ///
    /// # Panics
    /// If called from inside this memo's own production rule.
    pub fn try_get(&self) -> Result<Ref<'_, A>, E> {
        if !self.cell.borrow().is_done() {
            self.cell.borrow_mut().force()?;
        }
        Ok(Ref::map(self.cell.borrow(), EvaluationState::done))
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
        self.try_get().map(|value| A::clone(&value))
    }
}

impl<A, E> Clone for Memo<A, E> {
    /// Returns a handle to the same evaluation; the state is not copied.
    #[inline]
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<A, E> From<A> for Memo<A, E> {
    fn from(value: A) -> Self {
        Self::evaluated(value)
    }
}

impl<A: Default + 'static> Default for Memo<A> {
    fn default() -> Self {
        Self::new(A::default)
    }
}

impl<A: fmt::Debug, E> fmt::Debug for Memo<A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tuple = f.debug_tuple("Memo");
        match self.cell.try_borrow() {
            Some(state) => match state.peek() {
                Some(value) => tuple.field(value),
                None => tuple.field(&format_args!("<pending>")),
            },
            None => tuple.field(&format_args!("<evaluating>")),
        };
        tuple.finish()
    }
}
