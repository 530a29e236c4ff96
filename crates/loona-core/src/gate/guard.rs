//! Re-entrancy guard for passphrase submissions.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{LoonaError, Result};

/// Held for the duration of one submission; released on drop.
pub(crate) struct SubmissionGuard<'a> {
    pending: &'a AtomicBool,
}

impl<'a> SubmissionGuard<'a> {
    /// Claim the gate, or fail with `LoonaError::Busy` if a submission is outstanding.
    pub(crate) fn acquire(pending: &'a AtomicBool) -> Result<Self> {
        pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| LoonaError::Busy)?;
        Ok(Self { pending })
    }
}

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        self.pending.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_is_busy_until_release() {
        let pending = AtomicBool::new(false);

        let guard = SubmissionGuard::acquire(&pending).unwrap();
        assert!(matches!(
            SubmissionGuard::acquire(&pending),
            Err(LoonaError::Busy)
        ));

        drop(guard);
        assert!(SubmissionGuard::acquire(&pending).is_ok());
    }
}
