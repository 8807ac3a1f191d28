use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Liveness flag shared between a wizard and whoever drives it.
///
/// Work that resumes after an await checks the flag before touching the
/// wizard, so a response arriving after the session was disposed is dropped.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    active: Arc<AtomicBool>,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn dispose(&self) {
        self.active.store(false, Ordering::Release);
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}
