//! `EvaluationState` — the two-variant record stored inside every shared cell.
//!
//! A cell starts either `Pending` (holding the production rule) or `Done`
//! (holding the value). `force` performs the only transition, `Pending → Done`,
//! and performs it only after the rule has produced a value. A rule that returns
//! `Err` (or unwinds) leaves the state exactly as it was, rule included.

/// Either the production rule or the value it produced.
pub(crate) enum EvaluationState<A, R> {
    /// Not produced yet; carries the rule.
    Pending(R),
    /// Produced; carries the cached value.
    Done(A),
}

impl<A, R> EvaluationState<A, R> {
    /// Returns `true` once the value has been produced.
    #[inline]
    pub(crate) fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    /// Returns the cached value, if any, without running the rule.
    #[inline]
    pub(crate) fn peek(&self) -> Option<&A> {
        match self {
            Self::Done(value) => Some(value),
            Self::Pending(_) => None,
        }
    }

    /// Returns the cached value.
    ///
    /// # Panics
    /// If the state is still `Pending`. Callers only reach this after a
    /// successful [`force`](Self::force).
    #[inline]
    pub(crate) fn done(&self) -> &A {
        match self {
            Self::Done(value) => value,
            Self::Pending(_) => unreachable!("memo state read before evaluation"),
        }
    }

    /// Produces the value on first use and returns the cached value.
    ///
    /// The rule is dropped only once it has produced a value.
    pub(crate) fn force<E>(&mut self) -> Result<&A, E>
    where
        R: FnMut() -> Result<A, E>,
    {
        if let Self::Pending(rule) = self {
            let value = rule()?;
            *self = Self::Done(value);

            #[cfg(feature = "tracing")]
            tracing::trace!(value_type = core::any::type_name::<A>(), "memo evaluated");
        }
        Ok(self.done())
    }
}
