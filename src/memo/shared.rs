//! `SharedCell` — reference semantics for the evaluation state.
//!
//! Every clone of a [`Memo`](super::Memo) holds one of these pointing at the
//! same allocation. The slot is mutated through `RefCell`, so a production rule
//! that reads its own memo is reported instead of aliasing the state.

use core::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

pub(crate) struct SharedCell<T> {
    slot: Rc<RefCell<T>>,
}

impl<T> SharedCell<T> {
    /// Allocates a new cell holding `value`.
    #[inline]
    pub(crate) fn new(value: T) -> Self {
        Self {
            slot: Rc::new(RefCell::new(value)),
        }
    }

    /// Borrows the slot for reading.
    ///
    /// # Panics
    /// If the slot is being evaluated further up the stack.
    #[inline]
    pub(crate) fn borrow(&self) -> Ref<'_, T> {
        match self.slot.try_borrow() {
            Ok(slot) => slot,
            Err(_) => reentrant_read(),
        }
    }

    /// Borrows the slot for the state transition.
    ///
    /// # Panics
    /// If the slot is borrowed elsewhere. Outstanding `Ref`s only exist once the
    /// state is `Done`, so this only fires for a rule reading its own memo.
    #[inline]
    pub(crate) fn borrow_mut(&self) -> RefMut<'_, T> {
        match self.slot.try_borrow_mut() {
            Ok(slot) => slot,
            Err(_) => reentrant_read(),
        }
    }

    /// Borrows the slot only if nothing else holds it.
    #[inline]
    pub(crate) fn try_borrow(&self) -> Option<Ref<'_, T>> {
        self.slot.try_borrow().ok()
    }
}

impl<T> Clone for SharedCell<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

#[cold]
#[track_caller]
fn reentrant_read() -> ! {
    panic!("memo read re-entered while its production rule was running")
}
