//! Single-fire completion guard.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Wraps a callback so it runs at most once, however many trigger paths
/// race to fire it.
pub struct CompletionLatch<F: FnOnce()> {
    callback: Mutex<Option<F>>,
    fired: AtomicBool,
}

impl<F: FnOnce()> CompletionLatch<F> {
    pub fn new(callback: F) -> Self {
        Self {
            callback: Mutex::new(Some(callback)),
            fired: AtomicBool::new(false),
        }
    }

    /// Run the callback if nobody has yet. Returns `true` for the caller that
    /// actually fired it.
    pub fn fire(&self) -> bool {
        let Some(callback) = self.callback.lock().take() else {
            return false;
        };
        self.fired.store(true, Ordering::Release);
        callback();
        true
    }

    pub fn is_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}

impl<F: FnOnce()> std::fmt::Debug for CompletionLatch<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionLatch")
            .field("fired", &self.is_fired())
            .finish()
    }
}
