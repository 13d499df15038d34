//! Line-oriented region façade.

use crate::error::{RegionError, Result};
use crate::renderer::{RegionRenderer, WidthMode};
use crate::terminal::signals::ResizeSignal;
use crate::terminal::{StdoutTerminal, TerminalTarget};
use crate::throttle::Throttle;
use crate::trace_log;

/// Default render rate in frames per second.
pub const DEFAULT_FPS: u32 = 30;

/// Construction options for a [`TerminalRegion`].
///
/// ```
/// use liveregion::RegionOptions;
///
/// let opts = RegionOptions::new().height(3).fps(15).fixed_width(80);
/// ```
#[derive(Debug, Clone)]
pub struct RegionOptions {
    pub(crate) width: Option<u16>,
    pub(crate) height: usize,
    pub(crate) fps: u32,
    pub(crate) hide_cursor: bool,
    pub(crate) disable_rendering: bool,
}

impl RegionOptions {
    /// Defaults: auto width, one reserved line, 30 fps, cursor hidden.
    pub fn new() -> Self {
        Self {
            width: None,
            height: 1,
            fps: DEFAULT_FPS,
            hide_cursor: true,
            disable_rendering: false,
        }
    }

    /// Fix the display width instead of tracking the terminal.
    pub fn fixed_width(mut self, cols: u16) -> Self {
        self.width = Some(cols);
        self
    }

    /// Initial reserved line count (default 1).
    pub fn height(mut self, lines: usize) -> Self {
        self.height = lines;
        self
    }

    /// Maximum accepted render rate; `0` disables throttling.
    pub fn fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    /// Keep the cursor visible while the region is live.
    pub fn show_cursor(mut self) -> Self {
        self.hide_cursor = false;
        self
    }

    /// Suppress all terminal writes (headless/test use). State updates
    /// still happen, so reads behave identically.
    pub fn disable_rendering(mut self) -> Self {
        self.disable_rendering = true;
        self
    }
}

impl Default for RegionOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// A reserved block of terminal lines under application control.
///
/// Lines are addressed 1-based. Every mutation schedules a render through
/// the throttle gate; dropped frames are never queued, so the next accepted
/// render always shows the latest state.
///
/// # Example
///
/// ```no_run
/// use liveregion::{RegionOptions, TerminalRegion};
///
/// let mut region = TerminalRegion::open(RegionOptions::new().height(2))?;
/// region.set_line(1, "downloading…")?;
/// region.set_line(2, "0 / 100")?;
/// region.flush()?;
/// region.destroy(true)?;
/// # Ok::<(), liveregion::RegionError>(())
/// ```
pub struct TerminalRegion<T: TerminalTarget = StdoutTerminal> {
    renderer: RegionRenderer<T>,
    throttle: Throttle,
    pending: Vec<String>,
    resize: Option<ResizeSignal>,
    destroyed: bool,
}

impl TerminalRegion<StdoutTerminal> {
    /// Open a region on the process stdout.
    pub fn open(options: RegionOptions) -> Result<Self> {
        Ok(Self::with_target(StdoutTerminal::new(), options))
    }
}

impl<T: TerminalTarget> TerminalRegion<T> {
    /// Open a region over an explicit target (custom sinks, tests).
    pub fn with_target(target: T, options: RegionOptions) -> Self {
        let width_mode = match options.width {
            Some(cols) => WidthMode::Fixed(cols),
            None => WidthMode::Auto,
        };
        let renderer = RegionRenderer::new(
            target,
            width_mode,
            options.hide_cursor,
            options.disable_rendering,
        );
        let mut region = Self {
            renderer,
            throttle: Throttle::new(options.fps),
            pending: vec![String::new(); options.height],
            resize: Some(ResizeSignal::subscribe()),
            destroyed: false,
        };
        // Reserve the block immediately so the anchor exists before the
        // first mutation. The creation render counts against the rate.
        region.throttle.force();
        region.render_now();
        region
    }

    /// Display width in columns.
    pub fn width(&self) -> u16 {
        self.renderer.width()
    }

    /// Reserved line count. Always equals the pending frame length.
    pub fn height(&self) -> usize {
        self.pending.len()
    }

    /// Replace the whole region; the height becomes the new line count.
    ///
    /// Setting content of the same height overwrites in place rather than
    /// appending.
    pub fn set(&mut self, content: &str) -> Result<()> {
        self.check_alive()?;
        self.pending = split_lines(content);
        self.schedule_render();
        Ok(())
    }

    /// Set a single 1-based line, expanding the region if `n` exceeds the
    /// current height. Content with embedded newlines writes successive
    /// lines starting at `n`.
    pub fn set_line(&mut self, n: usize, content: &str) -> Result<()> {
        self.check_alive()?;
        if n < 1 {
            return Err(RegionError::LineOutOfRange(n));
        }
        let lines = split_lines(content);
        let end = n - 1 + lines.len();
        if end > self.pending.len() {
            self.pending.resize(end, String::new());
        }
        for (i, line) in lines.into_iter().enumerate() {
            self.pending[n - 1 + i] = line;
        }
        self.schedule_render();
        Ok(())
    }

    /// Append content after the current lines, growing the height.
    pub fn add(&mut self, content: &str) -> Result<()> {
        self.check_alive()?;
        self.pending.extend(split_lines(content));
        self.schedule_render();
        Ok(())
    }

    /// Blank every line; the height is unchanged.
    pub fn clear(&mut self) -> Result<()> {
        self.check_alive()?;
        for line in &mut self.pending {
            line.clear();
        }
        self.schedule_render();
        Ok(())
    }

    /// Blank a single 1-based line.
    pub fn clear_line(&mut self, n: usize) -> Result<()> {
        self.check_alive()?;
        if n < 1 {
            return Err(RegionError::LineOutOfRange(n));
        }
        if let Some(line) = self.pending.get_mut(n - 1) {
            line.clear();
            self.schedule_render();
        }
        Ok(())
    }

    /// Read back a 1-based line of the pending frame.
    pub fn get_line(&self, n: usize) -> Option<&str> {
        if n < 1 {
            return None;
        }
        self.pending.get(n - 1).map(String::as_str)
    }

    /// Force an immediate render, bypassing the throttle.
    pub fn flush(&mut self) -> Result<()> {
        self.check_alive()?;
        self.throttle.force();
        self.render_now();
        Ok(())
    }

    /// Change the maximum render rate; `0` disables throttling.
    pub fn set_throttle(&mut self, fps: u32) {
        self.throttle.set_fps(fps);
    }

    /// Apply a resize notification.
    ///
    /// Invalidates the anchor, runs cursor-report recovery, and forces one
    /// full re-render of the recomputed visible window.
    pub fn handle_resize(&mut self, cols: u16, rows: u16) {
        if self.destroyed {
            return;
        }
        self.renderer.handle_resize(Some((cols, rows)));
        self.throttle.force();
        self.render_now();
    }

    /// Tear the region down.
    ///
    /// Optionally blanks the content first, then restores auto-wrap and the
    /// cursor and releases the resize subscription. Idempotent: further
    /// calls (and any other mutation) are no-ops / faults. Non-blocking, so
    /// it is safe from a process-termination handler.
    pub fn destroy(&mut self, clear_first: bool) -> Result<()> {
        if self.destroyed {
            return Ok(());
        }
        if clear_first {
            for line in &mut self.pending {
                line.clear();
            }
            self.throttle.force();
            self.render_now();
        }
        self.renderer.teardown();
        self.resize = None;
        self.destroyed = true;
        trace_log!("region destroyed");
        Ok(())
    }

    /// Whether the region has been destroyed.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Whether writes actually reach the target. False on non-interactive
    /// streams and with [`RegionOptions::disable_rendering`].
    pub fn is_rendering(&self) -> bool {
        self.renderer.is_rendering()
    }

    /// Access the underlying target (primarily for tests).
    pub fn target(&self) -> &T {
        self.renderer.target()
    }

    /// Mutable access to the underlying target (primarily for tests).
    pub fn target_mut(&mut self) -> &mut T {
        self.renderer.target_mut()
    }

    fn check_alive(&mut self) -> Result<()> {
        if self.destroyed {
            return Err(RegionError::Destroyed);
        }
        self.poll_resize_signal();
        Ok(())
    }

    /// Pick up a coalesced SIGWINCH notification, if any arrived since the
    /// last operation.
    fn poll_resize_signal(&mut self) {
        let pending = self
            .resize
            .as_mut()
            .map(ResizeSignal::take_pending)
            .unwrap_or(false);
        if pending {
            self.renderer.handle_resize(None);
            self.throttle.force();
            self.render_now();
        }
    }

    fn schedule_render(&mut self) {
        if self.throttle.allow() {
            self.render_now();
        }
        // Dropped frames are not queued: `pending` already holds the latest
        // state and the next accepted render picks it up.
    }

    fn render_now(&mut self) {
        self.renderer.render(&self.pending);
    }
}

/// Split user content into frame lines. Empty content is one empty line,
/// mirroring how a newline-free string is one line.
fn split_lines(content: &str) -> Vec<String> {
    content.split('\n').map(str::to_string).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::TestTerminal;

    fn region(height: usize) -> TerminalRegion<TestTerminal> {
        TerminalRegion::with_target(
            TestTerminal::new(80, 24),
            RegionOptions::new().height(height).fps(0),
        )
    }

    #[test]
    fn test_set_replaces_and_keeps_height() {
        let mut r = region(1);
        r.set("a\nb\nc").unwrap();
        assert_eq!(r.height(), 3);
        r.set("x\ny\nz").unwrap();
        assert_eq!(r.height(), 3);
        assert_eq!(r.get_line(1), Some("x"));
        assert_eq!(r.get_line(3), Some("z"));
    }

    #[test]
    fn test_set_shrinks_height() {
        let mut r = region(1);
        r.set("a\nb\nc").unwrap();
        r.set("only").unwrap();
        assert_eq!(r.height(), 1);
    }

    #[test]
    fn test_add_appends() {
        let mut r = region(1);
        r.set("a\nb").unwrap();
        r.add("c\nd").unwrap();
        assert_eq!(r.height(), 4);
        assert_eq!(r.get_line(1), Some("a"));
        assert_eq!(r.get_line(2), Some("b"));
        assert_eq!(r.get_line(3), Some("c"));
        assert_eq!(r.get_line(4), Some("d"));
    }

    #[test]
    fn test_set_line_zero_is_validation_fault() {
        let mut r = region(1);
        let err = r.set_line(0, "x").unwrap_err();
        assert!(matches!(err, RegionError::LineOutOfRange(0)));
        assert!(err.to_string().contains("line numbers start at 1"));
    }

    #[test]
    fn test_set_line_expands_height() {
        let mut r = region(1);
        r.set_line(5, "five").unwrap();
        assert_eq!(r.height(), 5);
        assert_eq!(r.get_line(5), Some("five"));
        assert_eq!(r.get_line(2), Some(""));
    }

    #[test]
    fn test_set_line_multiline_writes_successive_lines() {
        let mut r = region(3);
        r.set_line(2, "two\nthree").unwrap();
        assert_eq!(r.height(), 3);
        assert_eq!(r.get_line(2), Some("two"));
        assert_eq!(r.get_line(3), Some("three"));
    }

    #[test]
    fn test_clear_keeps_height() {
        let mut r = region(1);
        r.set("a\nb\nc").unwrap();
        r.clear().unwrap();
        assert_eq!(r.height(), 3);
        assert_eq!(r.get_line(2), Some(""));
    }

    #[test]
    fn test_clear_line() {
        let mut r = region(1);
        r.set("a\nb").unwrap();
        r.clear_line(1).unwrap();
        assert_eq!(r.get_line(1), Some(""));
        assert_eq!(r.get_line(2), Some("b"));
        assert!(matches!(
            r.clear_line(0),
            Err(RegionError::LineOutOfRange(0))
        ));
    }

    #[test]
    fn test_get_line_out_of_range() {
        let r = region(2);
        assert_eq!(r.get_line(0), None);
        assert_eq!(r.get_line(3), None);
    }

    #[test]
    fn test_double_flush_writes_nothing_new() {
        let mut r = region(2);
        r.set("a\nb").unwrap();
        r.flush().unwrap();
        r.target_mut().take_output();
        r.flush().unwrap();
        assert_eq!(r.target().output(), "");
    }

    #[test]
    fn test_throttle_drops_intermediate_frames() {
        let mut r = TerminalRegion::with_target(
            TestTerminal::new(80, 24),
            RegionOptions::new().height(1).fps(1),
        );
        r.target_mut().take_output();
        // The creation render claimed the 1 fps slot; these are all gated
        r.set("one").unwrap();
        r.set("two").unwrap();
        r.set("three").unwrap();
        assert_eq!(r.target().output(), "");
        // Forced render shows the latest state, not a backlog
        r.flush().unwrap();
        let out = r.target().output();
        assert!(out.contains("three"));
        assert!(!out.contains("one"));
        assert!(!out.contains("two"));
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let mut r = region(2);
        r.set("a\nb").unwrap();
        r.destroy(false).unwrap();
        assert!(r.is_destroyed());
        r.destroy(false).unwrap();
        r.destroy(true).unwrap();
    }

    #[test]
    fn test_mutation_after_destroy_is_state_fault() {
        let mut r = region(1);
        r.destroy(false).unwrap();
        assert!(matches!(r.set("x"), Err(RegionError::Destroyed)));
        assert!(matches!(r.add("x"), Err(RegionError::Destroyed)));
        assert!(matches!(r.flush(), Err(RegionError::Destroyed)));
    }

    #[test]
    fn test_destroy_with_clear_blanks_content() {
        let mut r = region(1);
        r.set("visible").unwrap();
        r.flush().unwrap();
        r.target_mut().take_output();
        r.destroy(true).unwrap();
        let out = r.target().output();
        // The blanking render erases the line; the content is not rewritten
        assert!(out.contains(crate::ansi::ERASE_LINE));
        assert!(!out.contains("visible"));
        assert!(out.contains(crate::ansi::ENABLE_WRAP));
    }

    #[test]
    fn test_resize_triggers_one_full_rerender() {
        let mut r = region(3);
        r.set("a\nb\nc").unwrap();
        r.flush().unwrap();
        r.target_mut().take_output();

        r.target_mut().set_size(60, 20);
        r.handle_resize(60, 20);
        let out = r.target().output();
        assert_eq!(out.matches("a").count(), 1);
        assert_eq!(out.matches("b").count(), 1);
        assert_eq!(out.matches("c").count(), 1);
        // Anchor invariant re-established
        assert!(out.ends_with(crate::ansi::SAVE_CURSOR));
    }

    #[test]
    fn test_headless_region_tracks_state() {
        let mut r = TerminalRegion::with_target(
            TestTerminal::new(80, 24).non_interactive(),
            RegionOptions::new().height(2).fps(0),
        );
        r.set("a\nb").unwrap();
        r.flush().unwrap();
        assert_eq!(r.target().output(), "");
        assert_eq!(r.get_line(1), Some("a"));
        assert_eq!(r.height(), 2);
    }
}
