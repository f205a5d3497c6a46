use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// One-shot cooperative cancellation flag shared by a controller and an
/// engine loop.
///
/// Clones observe the same flag. Once [`StopSignal::stop`] has been called,
/// [`StopSignal::stop_requested`] returns `true` forever after.
#[derive(Clone, Debug, Default)]
pub struct StopSignal {
    flag: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the signal. Calling it again has no further effect.
    pub fn stop(&self) {
        self.flag.store(true, Ordering::Release);
    }

    #[inline]
    pub fn stop_requested(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
