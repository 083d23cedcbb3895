use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cooperative-cancellation token backed by an [`AtomicBool`].
///
/// Each engine run owns one; clones share the flag.
#[derive(Clone, Debug)]
pub struct Context {
    done: Arc<AtomicBool>,
}

impl Context {
    /// Create a new, non-cancelled context.
    pub fn new() -> Self {
        Self {
            done: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether cancellation has been requested.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    /// Request cancellation. Returns `true` if this call flipped the flag.
    #[inline]
    pub fn cancel(&self) -> bool {
        !self.done.swap(true, Ordering::AcqRel)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
