//! Region renderer: the cursor-anchor protocol.
//!
//! Fixed point: whenever the anchor is valid, the real terminal cursor sits
//! at column 1 of the line immediately after the reserved block, and that
//! position is saved with DECSC. Every render is a closed loop — restore to
//! the anchor, move up over the block, rewrite changed lines top-to-bottom,
//! step back below the block, re-save. Only relative moves are used inside
//! the region; absolute row addressing is unreliable once scrollback is
//! involved.
//!
//! Resize recovery never trusts a pre-resize coordinate: the anchor is
//! re-derived from a cursor-position report when the terminal answers in
//! time, and the next render is always full rather than a diff against
//! positions that scrolling may have moved.

use crate::ansi;
use crate::diff::{diff, DiffOp, DiffOps};
use crate::output::RenderBuffer;
use crate::terminal::TerminalTarget;
use crate::trace_log;
use std::time::Duration;

/// How long to wait for the terminal to answer a cursor-position query.
const CURSOR_QUERY_TIMEOUT: Duration = Duration::from_millis(50);

/// Width configuration for a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidthMode {
    /// Track the terminal width.
    Auto,
    /// Fixed column count, independent of the terminal.
    Fixed(u16),
}

/// Renderer owning the anchor state for one reserved block.
///
/// The façade drives this through a deliberately narrow surface:
/// [`render`](Self::render), [`handle_resize`](Self::handle_resize),
/// [`teardown`](Self::teardown) and the size accessors.
pub(crate) struct RegionRenderer<T: TerminalTarget> {
    target: T,
    out: RenderBuffer,
    width_mode: WidthMode,
    hide_cursor: bool,
    rendering: bool,
    /// Cached terminal size (columns, rows).
    cols: u16,
    rows: u16,
    /// Lines physically reserved on screen right now.
    physical: usize,
    /// The visible window as last rendered (truncated to width).
    previous: Vec<String>,
    /// Block reserved and anchor saved.
    initialized: bool,
    /// Next render must rewrite every line instead of diffing.
    full_redraw: bool,
    /// Next render must not DECRC-restore: the live cursor position is the
    /// recovered ground truth (post-resize, after a DSR reply).
    skip_restore_once: bool,
}

impl<T: TerminalTarget> RegionRenderer<T> {
    pub(crate) fn new(
        target: T,
        width_mode: WidthMode,
        hide_cursor: bool,
        disable_rendering: bool,
    ) -> Self {
        let (cols, rows) = target.size().unwrap_or((80, 24));
        let rendering = !disable_rendering && target.is_interactive();
        Self {
            target,
            out: RenderBuffer::new(),
            width_mode,
            hide_cursor,
            rendering,
            cols,
            rows,
            physical: 0,
            previous: Vec::new(),
            initialized: false,
            full_redraw: false,
            skip_restore_once: false,
        }
    }

    /// Display width in columns.
    pub(crate) fn width(&self) -> u16 {
        match self.width_mode {
            WidthMode::Auto => self.cols,
            WidthMode::Fixed(w) => w,
        }
    }

    /// Largest visible window for a frame of `height` lines. One physical
    /// row below the block is kept for the anchor line.
    fn viewport_height(&self, height: usize) -> usize {
        let usable = usize::from(self.rows.saturating_sub(1)).max(1);
        height.min(usable)
    }

    /// Render `frame`, diffing against the previously rendered window.
    ///
    /// On a disabled or non-interactive target this only updates internal
    /// state, so headless use stays deterministic.
    pub(crate) fn render(&mut self, frame: &[String]) {
        let vh = self.viewport_height(frame.len());
        let offset = frame.len() - vh;
        let width = usize::from(self.width());
        // Diffing operates on the recomputed visible window, never raw
        // frame indices: a shifted window is a redraw, not a transposition.
        let visible: Vec<String> = frame[offset..]
            .iter()
            .map(|line| ansi::truncate_to_width(line, width))
            .collect();

        if !self.rendering {
            self.previous = visible;
            self.physical = vh;
            self.initialized = true;
            return;
        }

        if !self.initialized {
            self.reserve(visible.len());
        }

        // Growing the block: emit newlines below the old anchor so the
        // screen scrolls and the anchor moves down with the block.
        if visible.len() > self.physical {
            let grow = visible.len() - self.physical;
            self.push_anchor_restore();
            for _ in 0..grow {
                self.out.push("\n");
            }
            self.out.push(ansi::SAVE_CURSOR);
            self.previous.resize(visible.len(), String::new());
            self.physical = visible.len();
        }

        let ops: DiffOps = if self.full_redraw {
            (0..self.physical.max(visible.len()))
                .map(|i| match visible.get(i) {
                    Some(line) => DiffOp::Update(line.clone()),
                    None => DiffOp::Delete,
                })
                .collect()
        } else {
            diff(&self.previous, &visible)
        };

        let clean = ops.iter().all(|op| *op == DiffOp::NoChange);
        if clean && !self.full_redraw {
            // No line content changes; flush whatever reservation bytes are
            // queued (first render, growth) and emit nothing else
            self.out.flush_to(&mut self.target);
            self.previous = visible;
            return;
        }

        self.emit_ops(&ops, visible.len());
        self.out.flush_to(&mut self.target);

        self.previous = visible;
        self.physical = self.previous.len();
        self.full_redraw = false;
        trace_log!("rendered region: {} visible lines", self.physical);
    }

    /// Reserve `n` lines by scrolling blanks into place, then save the
    /// anchor at column 1 of the line after the block.
    fn reserve(&mut self, n: usize) {
        self.out.push(ansi::DISABLE_WRAP);
        if self.hide_cursor {
            self.out.push(ansi::HIDE_CURSOR);
        }
        // If the cursor is mid-line (a prompt), drop to a fresh line first
        self.out.push("\r");
        for _ in 0..n {
            self.out.push("\n");
        }
        self.out.push(ansi::SAVE_CURSOR);
        self.previous = vec![String::new(); n];
        self.physical = n;
        self.initialized = true;
    }

    /// Return the cursor to the anchor. After resize recovery with a cursor
    /// report, the live position is the ground truth and DECRC would restore
    /// a stale pre-resize coordinate, so the first restore is skipped.
    fn push_anchor_restore(&mut self) {
        if self.skip_restore_once {
            self.skip_restore_once = false;
        } else {
            self.out.push(ansi::RESTORE_CURSOR);
        }
    }

    /// Walk the edit script, rewriting changed lines with relative moves.
    fn emit_ops(&mut self, ops: &[DiffOp], visible_len: usize) {
        self.push_anchor_restore();
        let block = ops.len();
        self.out.push(&ansi::cursor_up(block));
        self.out.push("\r");

        let mut row = 0usize;
        for (i, op) in ops.iter().enumerate() {
            match op {
                DiffOp::NoChange => {}
                DiffOp::Update(line) | DiffOp::Insert(line) => {
                    if i > row {
                        self.out.push(&ansi::cursor_down(i - row));
                        row = i;
                    }
                    self.out.push("\r");
                    self.out.push(ansi::ERASE_LINE);
                    self.out.push(line);
                }
                DiffOp::Delete => {
                    // Positional deletes are always a trailing run; collapse
                    // it into one DL that shifts the anchor line up.
                    if i > row {
                        self.out.push(&ansi::cursor_down(i - row));
                        row = i;
                    }
                    self.out.push("\r");
                    self.out.push(&ansi::delete_lines(block - i));
                    self.out.push(ansi::SAVE_CURSOR);
                    self.physical = visible_len;
                    return;
                }
            }
        }

        // Step below the block and re-establish the anchor
        self.out.push(&ansi::cursor_down(block - row));
        self.out.push("\r");
        self.out.push(ansi::SAVE_CURSOR);
    }

    /// Handle a resize notification.
    ///
    /// `size` carries the new dimensions when the notification includes
    /// them; otherwise the target is asked. Terminal-level scrolling during
    /// resize can invalidate the saved anchor, so the true cursor row is
    /// re-derived from a bounded cursor-position query; a timeout falls back
    /// to assuming the anchor is unchanged. The next render is always full.
    pub(crate) fn handle_resize(&mut self, size: Option<(u16, u16)>) {
        match size.or_else(|| self.target.size().ok()) {
            Some((cols, rows)) => {
                self.cols = cols;
                self.rows = rows;
            }
            None => return,
        }
        if !self.rendering || !self.initialized {
            return;
        }

        match self.target.query_cursor_position(CURSOR_QUERY_TIMEOUT) {
            Ok(Some((row, _col))) => {
                trace_log!("resize recovery: cursor reported at row {row}");
                // Only the rows above the live cursor are reachable with
                // relative moves; anything the resize scrolled past is lost.
                self.physical = self.physical.min(usize::from(row.saturating_sub(1)));
                self.previous.truncate(self.physical);
                self.skip_restore_once = true;
            }
            Ok(None) | Err(_) => {
                trace_log!("resize recovery: no cursor report, trusting saved anchor");
            }
        }
        // Diffing against pre-resize positions duplicates output; force a
        // full rewrite of the recomputed window.
        self.full_redraw = true;
    }

    /// Restore terminal modes. Non-blocking and safe to call more than once
    /// or from a termination handler; the region's lines stay on screen.
    pub(crate) fn teardown(&mut self) {
        if !self.rendering || !self.initialized {
            return;
        }
        self.out.push(ansi::SGR_RESET);
        self.out.push(ansi::ENABLE_WRAP);
        if self.hide_cursor {
            self.out.push(ansi::SHOW_CURSOR);
        }
        self.out.flush_to(&mut self.target);
    }

    /// Whether writes actually reach the target.
    pub(crate) fn is_rendering(&self) -> bool {
        self.rendering
    }

    pub(crate) fn target(&self) -> &T {
        &self.target
    }

    pub(crate) fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }
}
