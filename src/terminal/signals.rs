//! Resize notification subscriptions.
//!
//! SIGWINCH delivery is process-global, so the OS handler is installed once
//! and only bumps an atomic generation counter (the only async-signal-safe
//! thing to do). Each region owns a [`ResizeSignal`] handle that observes the
//! counter; polling the handle naturally coalesces a burst of resizes into a
//! single pending notification, and dropping it releases the subscription.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Generation counter bumped by the SIGWINCH handler.
static WINCH_GENERATION: AtomicU64 = AtomicU64::new(0);

/// Whether the OS handler has been installed.
static HANDLER_INSTALLED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
extern "C" fn on_winch(_sig: libc::c_int) {
    // Async-signal-safe: a single atomic increment
    WINCH_GENERATION.fetch_add(1, Ordering::SeqCst);
}

#[cfg(unix)]
fn install_handler() {
    if HANDLER_INSTALLED.swap(true, Ordering::SeqCst) {
        return;
    }
    // SAFETY: installs a handler that performs only an atomic increment.
    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = on_winch as usize;
        action.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&mut action.sa_mask);
        libc::sigaction(libc::SIGWINCH, &action, std::ptr::null_mut());
    }
}

#[cfg(not(unix))]
fn install_handler() {
    // No SIGWINCH here; hosts push sizes via TerminalRegion::handle_resize.
    HANDLER_INSTALLED.store(true, Ordering::SeqCst);
}

/// Subscription handle for terminal resize notifications.
///
/// Held by a region instance and released (dropped) on destroy. Polling is
/// edge-triggered against the generation counter, so any number of resize
/// signals between polls collapse into one pending notification.
#[derive(Debug)]
pub struct ResizeSignal {
    counter: &'static AtomicU64,
    last_seen: u64,
}

impl ResizeSignal {
    /// Subscribe to resize notifications.
    pub fn subscribe() -> Self {
        install_handler();
        Self::watching(&WINCH_GENERATION)
    }

    /// Subscribe to an explicit generation counter.
    fn watching(counter: &'static AtomicU64) -> Self {
        Self {
            counter,
            last_seen: counter.load(Ordering::SeqCst),
        }
    }

    /// Take the pending notification, if any resize happened since the
    /// last poll. Bursts coalesce into a single `true`.
    pub fn take_pending(&mut self) -> bool {
        let current = self.counter.load(Ordering::SeqCst);
        if current == self.last_seen {
            return false;
        }
        self.last_seen = current;
        true
    }
}
