use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{IndexError, IndexResult};

/// Cooperative cancellation flag shared between a scan and its owner.
///
/// Long passes call [`CancelToken::check`] between folders; once cancelled the
/// pass stops with [`IndexError::Cancelled`] and nothing is committed.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> IndexResult<()> {
        if self.is_cancelled() {
            Err(IndexError::Cancelled)
        } else {
            Ok(())
        }
    }
}
