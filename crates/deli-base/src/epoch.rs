use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

/// A shared epoch counter for pipeline cancellation.
///
/// Everything that produces data for a pipeline stamps it with the epoch that
/// was current at submission. When `advance()` is called, every holder of the
/// same `Epoch` can tell that older stamps are stale and drop them.
#[derive(Clone, Debug)]
pub struct Epoch {
    value: Arc<AtomicU64>,
}

impl Default for Epoch {
    fn default() -> Self {
        Self::new()
    }
}

impl Epoch {
    pub fn new() -> Self {
        Self {
            value: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Get the current epoch value.
    pub fn current(&self) -> u64 {
        self.value.load(Ordering::Acquire)
    }

    /// Advance to the next epoch. Returns the new epoch value.
    pub fn advance(&self) -> u64 {
        self.value.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Check if the given epoch is still current.
    pub fn is_current(&self, epoch: u64) -> bool {
        epoch == self.current()
    }

    /// Wrap `inner` with the current epoch.
    pub fn stamp<T>(&self, inner: T) -> Stamped<T> {
        Stamped {
            epoch: self.current(),
            inner,
        }
    }

    /// Unwrap `stamped` if its epoch is still current.
    pub fn accept<T>(&self, stamped: Stamped<T>) -> Option<T> {
        if self.is_current(stamped.epoch) {
            Some(stamped.inner)
        } else {
            None
        }
    }
}

/// A value stamped with the epoch it was created in.
#[derive(Clone, Debug)]
pub struct Stamped<T> {
    pub epoch: u64,
    pub inner: T,
}
