#![allow(clippy::unwrap_used)]
//! Integration tests for the liveregion rendering pipeline.
//!
//! These run the full façade → throttle → diff → anchor-protocol path over
//! the capture terminal, asserting on the exact escape byte stream.

use liveregion::layout::{merge_into, resolve_row, ColumnSpec};
use liveregion::testing::TestTerminal;
use liveregion::{ansi, RegionError, RegionOptions, TerminalRegion};

fn region(height: usize) -> TerminalRegion<TestTerminal> {
    TerminalRegion::with_target(
        TestTerminal::new(80, 24),
        RegionOptions::new().height(height).fps(0),
    )
}

#[test]
fn test_creation_reserves_block_and_saves_anchor() {
    let r = region(3);
    let out = r.target().output();
    assert!(out.starts_with(ansi::DISABLE_WRAP));
    assert!(out.contains(ansi::HIDE_CURSOR));
    assert_eq!(out.matches('\n').count(), 3);
    assert!(out.contains(ansi::SAVE_CURSOR));
}

#[test]
fn test_full_pipeline_progress_updates() {
    let mut r = region(2);
    r.set("download [          ]  0%\nverify    waiting").unwrap();
    r.flush().unwrap();
    r.target_mut().take_output();

    // Only the changed line is rewritten
    r.set("download [=====     ] 50%\nverify    waiting").unwrap();
    let out = r.target_mut().take_output();
    assert!(out.contains("download [=====     ] 50%"));
    assert!(!out.contains("verify"));
    assert_eq!(out.matches(ansi::ERASE_LINE).count(), 1);

    // The render loop is closed: it ends by re-saving the anchor
    assert!(out.ends_with(ansi::SAVE_CURSOR));
}

#[test]
fn test_set_then_set_same_height_overwrites() {
    let mut r = region(1);
    r.set("a\nb\nc").unwrap();
    assert_eq!(r.height(), 3);
    r.set("d\ne\nf").unwrap();
    assert_eq!(r.height(), 3);
    assert_eq!(r.get_line(1), Some("d"));
}

#[test]
fn test_set_then_add_grows_and_preserves() {
    let mut r = region(1);
    r.set("a\nb").unwrap();
    r.add("c\nd\ne").unwrap();
    assert_eq!(r.height(), 5);
    for (n, expected) in [(1, "a"), (2, "b"), (3, "c"), (4, "d"), (5, "e")] {
        assert_eq!(r.get_line(n), Some(expected));
    }
}

#[test]
fn test_set_line_validation_fault() {
    let mut r = region(1);
    match r.set_line(0, "nope") {
        Err(RegionError::LineOutOfRange(0)) => {}
        other => panic!("expected validation fault, got {other:?}"),
    }
    assert!(r
        .set_line(0, "nope")
        .unwrap_err()
        .to_string()
        .contains("line numbers start at 1"));
}

#[test]
fn test_double_flush_is_quiet() {
    let mut r = region(2);
    r.set("x\ny").unwrap();
    r.flush().unwrap();
    r.target_mut().take_output();

    r.flush().unwrap();
    assert_eq!(r.target().output(), "");
}

#[test]
fn test_resize_full_rerender_no_duplicates() {
    let mut r = region(3);
    r.set("lane-1\nlane-2\nlane-3").unwrap();
    r.flush().unwrap();
    r.target_mut().take_output();

    r.target_mut().set_size(100, 30);
    r.handle_resize(100, 30);

    let out = r.target().output();
    // Exactly one full re-render: each line appears exactly once
    assert_eq!(out.matches("lane-1").count(), 1);
    assert_eq!(out.matches("lane-2").count(), 1);
    assert_eq!(out.matches("lane-3").count(), 1);
    assert_eq!(out.matches(ansi::ERASE_LINE).count(), 3);
    // Anchor invariant re-established
    assert!(out.ends_with(ansi::SAVE_CURSOR));
    // Recovery issued exactly one cursor query
    assert_eq!(r.target().query_count(), 1);
}

#[test]
fn test_resize_with_cursor_report_rederives_anchor() {
    let mut r = region(3);
    r.set("a\nb\nc").unwrap();
    r.flush().unwrap();
    r.target_mut().take_output();

    // Terminal answers the DSR query: cursor really is on row 10
    r.target_mut().push_cursor_reply(10, 1);
    r.handle_resize(80, 20);
    let out = r.target().output();
    // The stale saved coordinate is not restored on the recovery render
    assert!(!out.contains(ansi::RESTORE_CURSOR));
    assert!(out.ends_with(ansi::SAVE_CURSOR));
}

#[test]
fn test_width_tracks_terminal_and_truncates() {
    let mut r = TerminalRegion::with_target(
        TestTerminal::new(10, 24),
        RegionOptions::new().height(1).fps(0),
    );
    assert_eq!(r.width(), 10);
    r.set("0123456789ABCDEF").unwrap();
    let out = r.target().output();
    assert!(out.contains("0123456789"));
    assert!(!out.contains("0123456789A"));
}

#[test]
fn test_styled_line_truncation_never_splits_escape() {
    let mut r = TerminalRegion::with_target(
        TestTerminal::new(4, 24),
        RegionOptions::new().height(1).fps(0),
    );
    r.set("ab\x1b[31mcdef\x1b[0m").unwrap();
    let out = r.target().output();
    // The opening SGR survives intact and the cut is sealed with a reset
    assert!(out.contains("ab\x1b[31mcd\x1b[0m"));
}

#[test]
fn test_tall_region_materializes_viewport_only() {
    let mut r = TerminalRegion::with_target(
        TestTerminal::new(40, 5),
        RegionOptions::new().height(1).fps(0),
    );
    let frame: Vec<String> = (1..=8).map(|i| format!("line-{i}")).collect();
    r.set(&frame.join("\n")).unwrap();
    let out = r.target().output();
    // 4 usable rows on a 5-row terminal: only the bottom window is drawn
    assert!(!out.contains("line-4"));
    assert!(out.contains("line-5"));
    assert!(out.contains("line-8"));
    // State still holds the full frame
    assert_eq!(r.height(), 8);
    assert_eq!(r.get_line(1), Some("line-1"));
}

#[test]
fn test_destroy_restores_terminal_and_is_idempotent() {
    let mut r = region(2);
    r.set("a\nb").unwrap();
    r.flush().unwrap();
    r.destroy(false).unwrap();
    let out = r.target().output();
    assert!(out.contains(ansi::ENABLE_WRAP));
    assert!(out.contains(ansi::SHOW_CURSOR));

    r.destroy(false).unwrap();
    r.destroy(true).unwrap();
    assert!(matches!(r.set("x"), Err(RegionError::Destroyed)));
}

#[test]
fn test_headless_pipeline_is_silent_and_deterministic() {
    let mut r = TerminalRegion::with_target(
        TestTerminal::new(80, 24).non_interactive(),
        RegionOptions::new().height(2).fps(0),
    );
    r.set("a\nb").unwrap();
    r.handle_resize(40, 12);
    r.flush().unwrap();
    r.destroy(true).unwrap();
    assert_eq!(r.target().output(), "");
}

#[test]
fn test_columns_compose_one_region_line() {
    // Two producers lay out side by side and merge into the same line
    let specs = [ColumnSpec::fixed(12), ColumnSpec::flex(1)];
    let extents = resolve_row(40, 2, &specs);

    let mut line = String::new();
    merge_into(&mut line, extents[0].x_offset as usize, "worker-1");
    merge_into(&mut line, extents[1].x_offset as usize, "[=====>    ]");

    let mut r = TerminalRegion::with_target(
        TestTerminal::new(40, 24),
        RegionOptions::new().height(1).fps(0),
    );
    r.set_line(1, &line).unwrap();
    let out = r.target().output();
    assert!(out.contains("worker-1"));
    assert!(out.contains("[=====>    ]"));
    // Both columns visible in the stored line, second at its offset
    assert_eq!(r.get_line(1).unwrap().find("[=").unwrap(), 14);
}
