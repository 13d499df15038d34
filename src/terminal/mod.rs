//! Terminal abstraction layer.
//!
//! [`TerminalTarget`] is the narrow seam between the region machinery and the
//! outside world: byte output, size queries, and the cursor-position report
//! round trip. The renderer and façade only ever talk to this trait, so tests
//! run against a capture implementation and never touch a real tty.

pub mod signals;

use std::io::{self, IsTerminal, Stdout, Write};
use std::time::Duration;

/// Output target for a region.
///
/// Implementations must be VT100/ANSI-compatible sinks; the region emits raw
/// escape sequences and assumes the terminal honors them byte-for-byte.
pub trait TerminalTarget {
    /// Terminal size as `(columns, rows)`.
    fn size(&self) -> io::Result<(u16, u16)>;

    /// Whether the target is an interactive terminal. Non-interactive
    /// targets (pipes, CI logs) make rendering a state-only no-op.
    fn is_interactive(&self) -> bool;

    /// Write a full frame of bytes.
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Flush buffered output.
    fn flush(&mut self) -> io::Result<()>;

    /// Ask the terminal for the cursor position (DSR round trip).
    ///
    /// This is a bounded suspension: implementations must give up after
    /// `timeout` and return `Ok(None)` rather than block. `None` means
    /// "no reply"; callers fall back to their last-known anchor.
    fn query_cursor_position(&mut self, timeout: Duration) -> io::Result<Option<(u16, u16)>>;
}

/// Process stdout as a region target.
pub struct StdoutTerminal {
    stdout: Stdout,
    interactive: bool,
}

impl StdoutTerminal {
    /// Create a target over the process stdout, detecting interactivity.
    pub fn new() -> Self {
        let stdout = io::stdout();
        let interactive = stdout.is_terminal();
        Self {
            stdout,
            interactive,
        }
    }
}

impl Default for StdoutTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalTarget for StdoutTerminal {
    fn size(&self) -> io::Result<(u16, u16)> {
        crossterm::terminal::size()
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.stdout.write_all(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush()
    }

    fn query_cursor_position(&mut self, timeout: Duration) -> io::Result<Option<(u16, u16)>> {
        if !self.interactive {
            return Ok(None);
        }
        query_cursor_position_impl(&mut self.stdout, timeout)
    }
}

/// Raw mode guard for the DSR round trip.
///
/// The reply arrives on stdin; raw mode keeps it out of line buffering and
/// off the screen. Restores the previous state on drop, so a query aborted
/// mid-flight (destroy, panic unwind) cannot leave the terminal raw.
#[cfg(unix)]
struct RawModeGuard {
    enabled_here: bool,
}

#[cfg(unix)]
impl RawModeGuard {
    fn enter() -> io::Result<Self> {
        let already_raw = crossterm::terminal::is_raw_mode_enabled()?;
        if !already_raw {
            crossterm::terminal::enable_raw_mode()?;
        }
        Ok(Self {
            enabled_here: !already_raw,
        })
    }
}

#[cfg(unix)]
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if self.enabled_here {
            let _ = crossterm::terminal::disable_raw_mode();
        }
    }
}

#[cfg(unix)]
fn query_cursor_position_impl<W: Write>(
    out: &mut W,
    timeout: Duration,
) -> io::Result<Option<(u16, u16)>> {
    use crate::ansi;
    use std::time::Instant;

    let _raw = RawModeGuard::enter()?;

    out.write_all(ansi::CURSOR_REPORT_QUERY.as_bytes())?;
    out.flush()?;

    let deadline = Instant::now() + timeout;
    let mut reply = Vec::with_capacity(16);
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(None);
        }
        let mut pollfd = libc::pollfd {
            fd: libc::STDIN_FILENO,
            events: libc::POLLIN,
            revents: 0,
        };
        // SAFETY: pollfd points at a single valid struct for the call.
        let ready = unsafe { libc::poll(&mut pollfd, 1, remaining.as_millis() as libc::c_int) };
        if ready < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
        if ready == 0 {
            return Ok(None);
        }
        let mut byte = [0u8; 1];
        // SAFETY: reads one byte into a valid buffer.
        let n = unsafe { libc::read(libc::STDIN_FILENO, byte.as_mut_ptr().cast(), 1) };
        if n <= 0 {
            return Ok(None);
        }
        reply.push(byte[0]);
        if byte[0] == b'R' {
            return Ok(ansi::parse_cursor_report(&reply));
        }
        // Discard unrelated queued input, bounded
        if reply.len() > 64 {
            return Ok(None);
        }
    }
}

#[cfg(not(unix))]
fn query_cursor_position_impl<W: Write>(
    _out: &mut W,
    _timeout: Duration,
) -> io::Result<Option<(u16, u16)>> {
    // No bounded stdin read available here; callers fall back to the
    // saved anchor, which the protocol already tolerates.
    Ok(None)
}
