//! ANSI/VT100 escape sequences and SGR-aware text measurement.
//!
//! The sequence builders are pure functions; the region's portability depends
//! on these exact bytes, so they are emitted verbatim rather than through a
//! terminal command layer.
//!
//! # Example
//!
//! ```
//! use liveregion::ansi;
//!
//! assert_eq!(ansi::cursor_up(3), "\x1b[3A");
//! assert_eq!(ansi::visual_width("\x1b[31mhi\x1b[0m"), 2);
//! ```

use unicode_width::UnicodeWidthChar;

/// Escape character.
const ESC: char = '\x1b';

/// Move the cursor up `n` lines. `n == 0` emits nothing.
pub fn cursor_up(n: usize) -> String {
    if n == 0 {
        String::new()
    } else {
        format!("\x1b[{n}A")
    }
}

/// Move the cursor down `n` lines. `n == 0` emits nothing.
pub fn cursor_down(n: usize) -> String {
    if n == 0 {
        String::new()
    } else {
        format!("\x1b[{n}B")
    }
}

/// Move the cursor forward (right) `n` columns. `n == 0` emits nothing.
pub fn cursor_forward(n: usize) -> String {
    if n == 0 {
        String::new()
    } else {
        format!("\x1b[{n}C")
    }
}

/// Move the cursor back (left) `n` columns. `n == 0` emits nothing.
pub fn cursor_back(n: usize) -> String {
    if n == 0 {
        String::new()
    } else {
        format!("\x1b[{n}D")
    }
}

/// Move the cursor to a 1-based column on the current line.
pub fn cursor_to_column(col: u16) -> String {
    format!("\x1b[{col}G")
}

/// Move the cursor to a 1-based row/column position.
pub fn cursor_position(row: u16, col: u16) -> String {
    format!("\x1b[{row};{col}H")
}

/// Erase the entire current line; the cursor does not move.
pub const ERASE_LINE: &str = "\x1b[2K";

/// Hide the cursor.
pub const HIDE_CURSOR: &str = "\x1b[?25l";

/// Show the cursor.
pub const SHOW_CURSOR: &str = "\x1b[?25h";

/// Save the cursor position (DECSC).
pub const SAVE_CURSOR: &str = "\x1b7";

/// Restore the saved cursor position (DECRC).
pub const RESTORE_CURSOR: &str = "\x1b8";

/// Enable line auto-wrap (DECAWM).
pub const ENABLE_WRAP: &str = "\x1b[?7h";

/// Disable line auto-wrap (DECAWM).
pub const DISABLE_WRAP: &str = "\x1b[?7l";

/// Reset all SGR attributes.
pub const SGR_RESET: &str = "\x1b[0m";

/// Device status report: ask the terminal for the cursor position.
/// The terminal replies on the input stream with `ESC [ row ; col R`.
pub const CURSOR_REPORT_QUERY: &str = "\x1b[6n";

/// Delete `n` lines at the cursor, shifting following lines up (DL).
pub fn delete_lines(n: usize) -> String {
    if n == 0 {
        String::new()
    } else {
        format!("\x1b[{n}M")
    }
}

/// Parse a cursor position report (`ESC [ row ; col R`).
///
/// Returns the 1-based `(row, col)` on success. Leading bytes before the
/// escape are ignored, so a reply embedded in queued input still parses.
pub fn parse_cursor_report(bytes: &[u8]) -> Option<(u16, u16)> {
    let start = bytes.windows(2).position(|w| w == b"\x1b[")?;
    let rest = &bytes[start + 2..];
    let end = rest.iter().position(|&b| b == b'R')?;
    let body = std::str::from_utf8(&rest[..end]).ok()?;
    let (row, col) = body.split_once(';')?;
    let row: u16 = row.parse().ok()?;
    let col: u16 = col.parse().ok()?;
    if row == 0 || col == 0 {
        return None;
    }
    Some((row, col))
}

/// Display width of `s` in terminal columns.
///
/// CSI sequences (including SGR color codes) are skipped; other characters
/// are measured with their Unicode display width, so wide CJK glyphs count
/// as two columns.
pub fn visual_width(s: &str) -> usize {
    let mut width = 0;
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ESC && chars.peek() == Some(&'[') {
            chars.next();
            // Skip parameters until the final byte
            for c in chars.by_ref() {
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            width += c.width().unwrap_or(0);
        }
    }
    width
}

/// Split styled text at a visual column boundary.
///
/// Returns `(left, right)` where `left` occupies at most `cols` display
/// columns. Escape sequences carry zero width and are never split; a
/// sequence sitting exactly on the boundary goes to the left half so that
/// styling opened before the cut stays with the text it styles.
pub fn split_at_width(s: &str, cols: usize) -> (&str, &str) {
    let mut width = 0;
    let mut chars = s.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c == ESC && matches!(chars.peek(), Some((_, '['))) {
            chars.next();
            while let Some((_, c)) = chars.next() {
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        let w = c.width().unwrap_or(0);
        if width + w > cols {
            return (&s[..i], &s[i..]);
        }
        width += w;
    }
    (s, "")
}

/// Clip `s` to at most `cols` display columns.
///
/// Escapes are preserved verbatim up to the cut point and never split
/// mid-sequence. When the kept prefix contains escapes an SGR reset is
/// appended so truncated styling cannot bleed into later output.
pub fn truncate_to_width(s: &str, cols: usize) -> String {
    let (left, right) = split_at_width(s, cols);
    if right.is_empty() {
        return left.to_string();
    }
    let mut out = String::with_capacity(left.len() + SGR_RESET.len());
    out.push_str(left);
    if left.contains(ESC) {
        out.push_str(SGR_RESET);
    }
    out
}

/// Pad `s` with trailing spaces up to `cols` display columns.
///
/// Content already at or past `cols` is returned unchanged.
pub fn pad_to_width(s: &str, cols: usize) -> String {
    let width = visual_width(s);
    if width >= cols {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + (cols - width));
    out.push_str(s);
    for _ in width..cols {
        out.push(' ');
    }
    out
}
