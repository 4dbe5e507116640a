use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::Error;

/// Polled at recursion/loop boundaries by the recursive algorithms
/// (Histogram, O(NP), Patience, Minimal) and by the merge region
/// iteration. Timeouts are not enforced here: the caller is expected to
/// flip a flag from an external clock.
pub trait Cancel {
    /// Returns `true` once cancellation has been requested.
    fn is_cancelled(&self) -> bool;

    /// Returns [`Error::Cancelled`] if cancellation has been requested,
    /// otherwise `Ok(())`. A small helper so call sites can use `?`.
    #[inline]
    fn check(&self) -> Result<(), Error> {
        if self.is_cancelled() {
            tracing::debug!("cancellation observed; aborting");
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// The default, zero-cost "never cancelled" token. Used when a caller does
/// not need cooperative cancellation.
impl Cancel for () {
    #[inline]
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl<C: Cancel + ?Sized> Cancel for &C {
    #[inline]
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

/// A shared, atomically readable cancellation flag.
///
/// Cloning a [`CancelToken`] shares the same underlying flag, so the same
/// token can be handed to two pairwise diffs running concurrently (for
/// example the O→A and O→B diffs inside [`merge`](crate::merge)) and
/// cancelling one aborts both.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a token that has not been cancelled.
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

impl Cancel for CancelToken {
    #[inline]
    fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
