//! Cooperative shutdown flag shared by the monitor loop and its waits.

use crate::constants::supervisor::SHUTDOWN_POLL_MS;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::warn;

/// Cloneable handle to a process-wide shutdown request.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    requested: Arc<AtomicBool>,
}

impl ShutdownSignal {
    /// Create a signal that has not been raised.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every holder to stop at its next check.
    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    /// Whether shutdown was requested.
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Sleep for `duration`, waking early on shutdown.
    ///
    /// Returns `false` if the sleep was cut short.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let poll = Duration::from_millis(SHUTDOWN_POLL_MS);
        loop {
            if self.is_requested() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep(poll.min(deadline - now));
        }
    }

    /// Raise this signal on Ctrl+C. A second Ctrl+C exits immediately.
    pub fn install_ctrlc_handler(&self) {
        let signal = self.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            if signal.is_requested() {
                std::process::exit(130); // 128 + SIGINT(2)
            }
            signal.request();
        }) {
            warn!("Failed to install Ctrl+C handler: {e}");
        }
    }
}
