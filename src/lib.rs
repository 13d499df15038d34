//! Live-updating terminal regions with flicker-free rendering.
//!
//! liveregion reserves a block of lines at the bottom of a terminal stream
//! and keeps it updated in place (progress bars, multi-lane status displays)
//! without corrupting the output scrolling past above it.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────┐   ┌──────────┐   ┌─────────────┐   ┌──────────────┐
//! │ TerminalRegion │ → │ Throttle │ → │ FrameDiffer │ → │RegionRenderer│
//! │    (façade)    │   │  (gate)  │   │ (positional)│   │   (anchor)   │
//! └────────────────┘   └──────────┘   └─────────────┘   └──────────────┘
//!                                                              │
//!                                          ┌──────────┐   ┌────────────┐
//!                                          │ Terminal │ ← │RenderBuffer│
//!                                          │  Target  │   │ (one write)│
//!                                          └──────────┘   └────────────┘
//! ```
//!
//! The renderer owns a *cursor anchor*: a saved position at column 1 of the
//! line just below the reserved block. Every render restores the anchor,
//! walks the positional diff with relative moves only, and re-saves it.
//! Terminal resizes invalidate the anchor; recovery re-derives the true
//! cursor row with a bounded device-status-report query and forces one full
//! re-render.
//!
//! The [`layout`] module resolves flexbox-style column extents
//! (min/max/flex-weight/gap) so multiple producers can compose one region
//! row; [`layout::merge_into`] splices their output into shared line buffers
//! without overwriting each other.
//!
//! # Example
//!
//! ```no_run
//! use liveregion::{RegionOptions, TerminalRegion};
//!
//! let mut region = TerminalRegion::open(RegionOptions::new().height(3))?;
//! region.set_line(1, "build     [====>     ] 42%")?;
//! region.set_line(2, "tests     [==>       ] 18%")?;
//! region.set_line(3, "\x1b[2mpress ctrl-c to cancel\x1b[0m")?;
//! region.flush()?;
//! // ... later
//! region.destroy(true)?;
//! # Ok::<(), liveregion::RegionError>(())
//! ```
//!
//! # Headless use
//!
//! On a non-interactive stream (pipe, CI log) or with
//! [`RegionOptions::disable_rendering`], every operation updates internal
//! state but writes nothing, so the same code runs deterministically in
//! tests and batch jobs.

pub mod ansi;
pub mod diff;
pub mod error;
pub mod layout;
mod output;
pub mod region;
mod renderer;
pub mod terminal;
pub mod testing;
pub mod throttle;

pub use error::{RegionError, Result};
pub use region::{RegionOptions, TerminalRegion, DEFAULT_FPS};
pub use terminal::{StdoutTerminal, TerminalTarget};

#[cfg(feature = "tracing")]
macro_rules! trace_log {
    ($($arg:tt)*) => { tracing::trace!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_log {
    ($($arg:tt)*) => {{}};
}

pub(crate) use trace_log;
