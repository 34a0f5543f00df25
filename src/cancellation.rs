//! Cooperative cancellation signal for long-running pipelines.
//!
//! A single-threaded library has no suspension points of its own; long
//! optimization searches poll this flag at loop boundaries between primitive
//! operations instead. Termination is not an error -- a terminated pipeline
//! returns whatever decomposition it has reached, in a valid state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cheaply cloneable handle to a shared termination flag.
#[derive(Debug, Clone, Default)]
pub struct TerminationSignal(Arc<AtomicBool>);

impl TerminationSignal {
    pub fn new() -> Self {
        TerminationSignal(Arc::new(AtomicBool::new(false)))
    }

    /// Requests termination. Takes effect at the next polled loop boundary.
    pub fn terminate(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_terminated(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unterminated() {
        let sig = TerminationSignal::new();
        assert!(!sig.is_terminated());
    }

    #[test]
    fn terminate_is_visible_through_clones() {
        let sig = TerminationSignal::new();
        let clone = sig.clone();
        clone.terminate();
        assert!(sig.is_terminated());
    }
}
