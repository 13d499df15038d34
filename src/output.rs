//! Batched frame output.
//!
//! Escape sequences for one render pass are accumulated and written as a
//! single unit, so a partially drawn frame is never visible and syscalls stay
//! O(1) per frame.

use crate::terminal::TerminalTarget;

/// Accumulates one frame of escape output and flushes it in a single write.
///
/// A failed write marks the buffer broken: rendering degrades to a no-op
/// rather than surfacing IO errors into the host. The failed frame is not
/// retried; the next scheduled render supersedes it.
#[derive(Debug, Default)]
pub struct RenderBuffer {
    buf: String,
    broken: bool,
}

impl RenderBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a sequence or text run for the current frame.
    pub fn push(&mut self, seq: &str) {
        if !self.broken {
            self.buf.push_str(seq);
        }
    }

    /// True once a write has failed; subsequent frames are dropped.
    pub fn is_broken(&self) -> bool {
        self.broken
    }

    /// Bytes queued for the current frame.
    pub fn pending_len(&self) -> usize {
        self.buf.len()
    }

    /// Write the queued frame to `target` as one unit and clear the buffer.
    ///
    /// Errors are absorbed; they mark the buffer broken and the frame is
    /// discarded either way.
    pub fn flush_to<T: TerminalTarget + ?Sized>(&mut self, target: &mut T) {
        if self.broken {
            self.buf.clear();
            return;
        }
        if self.buf.is_empty() {
            return;
        }
        let result = target
            .write_all(self.buf.as_bytes())
            .and_then(|()| target.flush());
        if result.is_err() {
            self.broken = true;
        }
        self.buf.clear();
    }

    /// Drop any queued output without writing it.
    pub fn discard(&mut self) {
        self.buf.clear();
    }
}
