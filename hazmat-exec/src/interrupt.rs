use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cancellation token shared between the ^C handler and the runner.
///
/// Cloning it keeps a reference to the same flag. Once triggered it stays triggered for the rest of
/// the process.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    flag: Arc<AtomicBool>,
}

impl Interrupt {
    /// Make a new, not triggered, token.
    pub fn new() -> Interrupt {
        Interrupt::default()
    }

    /// Ask every holder of this token to stop.
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether `trigger` has been called on any clone of this token.
    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
