//! Test targets for deterministic, tty-free rendering.

use crate::terminal::TerminalTarget;
use std::collections::VecDeque;
use std::io;
use std::time::Duration;

/// In-memory terminal target capturing everything a region writes.
///
/// Cursor-position replies are scripted: each query pops the next reply, and
/// an empty script behaves like a timed-out terminal.
#[derive(Debug)]
pub struct TestTerminal {
    size: (u16, u16),
    interactive: bool,
    output: Vec<u8>,
    flushes: usize,
    queries: usize,
    cursor_replies: VecDeque<(u16, u16)>,
}

impl TestTerminal {
    /// Create an interactive test terminal of the given size.
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            size: (cols, rows),
            interactive: true,
            output: Vec::new(),
            flushes: 0,
            queries: 0,
            cursor_replies: VecDeque::new(),
        }
    }

    /// Mark the target non-interactive (pipe/CI behavior).
    pub fn non_interactive(mut self) -> Self {
        self.interactive = false;
        self
    }

    /// Change the reported size (simulates a terminal resize).
    pub fn set_size(&mut self, cols: u16, rows: u16) {
        self.size = (cols, rows);
    }

    /// Script a reply for the next cursor-position query.
    pub fn push_cursor_reply(&mut self, row: u16, col: u16) {
        self.cursor_replies.push_back((row, col));
    }

    /// Everything written so far, as UTF-8.
    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    /// Drain and return the captured output.
    pub fn take_output(&mut self) -> String {
        let out = String::from_utf8_lossy(&self.output).into_owned();
        self.output.clear();
        out
    }

    /// Number of flushes performed.
    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    /// Number of cursor-position queries issued.
    pub fn query_count(&self) -> usize {
        self.queries
    }
}

impl TerminalTarget for TestTerminal {
    fn size(&self) -> io::Result<(u16, u16)> {
        Ok(self.size)
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.output.extend_from_slice(bytes);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes += 1;
        Ok(())
    }

    fn query_cursor_position(&mut self, _timeout: Duration) -> io::Result<Option<(u16, u16)>> {
        self.queries += 1;
        Ok(self.cursor_replies.pop_front())
    }
}
