//! Message pane: a scrolling grid of already-wrapped rows.
//!
//! The pane behaves like a terminal window with scrolling enabled. Text is
//! painted at the cursor, a newline opens a fresh row at the bottom and the
//! top row falls off when the pane is full. Frames draw [`Pane::rows`] as is.

use std::collections::VecDeque;
use unicode_width::UnicodeWidthChar;

use crate::app::channels::Channel;
use crate::utf8;

#[derive(Debug)]
pub struct Pane {
    width: usize,
    height: usize,
    rows: VecDeque<String>,
    /// True until something has been painted since the last clear.
    fresh: bool,
    paints: u64,
}

impl Pane {
    pub fn new(width: usize, height: usize) -> Self {
        let mut rows = VecDeque::with_capacity(height.max(1));
        rows.push_back(String::new());
        Self {
            width: width.max(1),
            height: height.max(1),
            rows,
            fresh: true,
            paints: 0,
        }
    }

    #[cfg(test)]
    pub fn width(&self) -> usize {
        self.width
    }

    #[cfg(test)]
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.clear();
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.rows.push_back(String::new());
        self.fresh = true;
    }

    pub fn rows(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(String::as_str)
    }

    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    #[cfg(test)]
    /// Number of paint operations since creation. Lets callers observe
    /// whether an update touched the pane.
    pub fn paints(&self) -> u64 {
        self.paints
    }

    fn put(&mut self, c: char) {
        if let Some(row) = self.rows.back_mut() {
            row.push(c);
        }
        self.fresh = false;
    }

    fn trim_row_end(&mut self) {
        if let Some(row) = self.rows.back_mut() {
            let kept = row.trim_end_matches(' ').len();
            row.truncate(kept);
        }
    }

    fn newline(&mut self) {
        self.rows.push_back(String::new());
        while self.rows.len() > self.height {
            self.rows.pop_front();
        }
        self.fresh = false;
    }
}

/// Terminal columns a glyph occupies. `None` for control characters, which
/// are not painted.
fn glyph_width(c: char) -> Option<usize> {
    UnicodeWidthChar::width(c)
}

/// Word-wrapping painter for one logical line.
struct Wrapper<'p> {
    pane: &'p mut Pane,
    indent: usize,
    col: usize,
    /// Column where the current row's content starts (0 or `indent`).
    row_start: usize,
    word: String,
    word_width: usize,
}

impl<'p> Wrapper<'p> {
    fn new(pane: &'p mut Pane, indent: usize) -> Self {
        // Leave room for at least one wide glyph after the indent.
        let indent = indent.min(pane.width.saturating_sub(2));
        Self {
            pane,
            indent,
            col: 0,
            row_start: 0,
            word: String::new(),
            word_width: 0,
        }
    }

    fn flush_word(&mut self) {
        for c in self.word.drain(..) {
            self.pane.put(c);
        }
        self.col += self.word_width;
        self.word_width = 0;
    }

    fn wrap(&mut self) {
        self.pane.trim_row_end();
        self.pane.newline();
        for _ in 0..self.indent {
            self.pane.put(' ');
        }
        self.col = self.indent;
        self.row_start = self.indent;
    }

    fn space(&mut self) {
        self.flush_word();
        if self.col + 1 > self.pane.width {
            // The break replaces the space.
            self.wrap();
        } else if !(self.col == self.row_start && self.row_start > 0) {
            self.pane.put(' ');
            self.col += 1;
        }
    }

    fn glyph(&mut self, c: char, width: usize) {
        let limit = self.pane.width;
        if self.col + self.word_width + width > limit && self.col + self.word_width > self.row_start {
            let fits_fresh_row = self.indent + self.word_width + width <= limit;
            if self.word_width > 0 && fits_fresh_row && self.col > self.row_start {
                // Move the whole word down.
                self.wrap();
            } else {
                // Word is wider than a row: break it here.
                self.flush_word();
                self.wrap();
            }
        }
        self.word.push(c);
        self.word_width += width;
    }

    fn finish(mut self) {
        self.flush_word();
    }
}

/// Paint one logical line (up to its `\n`, or the end of `bytes`) into the
/// pane, wrapping at the pane width.
///
/// Decoding advances one glyph at a time and stops at a torn trailing
/// sequence. Returns the number of bytes consumed, including the newline.
pub fn wrap_and_paint(pane: &mut Pane, bytes: &[u8], indent: usize) -> usize {
    pane.paints += 1;
    let mut wrapper = Wrapper::new(pane, indent);
    let mut pos = 0;
    while pos < bytes.len() {
        let (c, used) = utf8::decode_char(&bytes[pos..]);
        if used == 0 {
            break;
        }
        pos += used;
        match c {
            '\n' => break,
            ' ' => wrapper.space(),
            _ => {
                if let Some(width) = glyph_width(c) {
                    wrapper.glyph(c, width);
                }
            }
        }
    }
    wrapper.finish();
    pos
}

/// Paint a line appended to the active channel below what is already shown.
pub fn paint_appended(pane: &mut Pane, line: &[u8], indent: usize) {
    if !pane.is_fresh() {
        pane.newline();
    }
    wrap_and_paint(pane, line, indent);
}

/// Repaint the pane from the channel's log so that the newest visible line
/// sits on the bottom row, `scroll_offset` lines above the end.
///
/// A scroll offset past the start of the log is clamped.
pub fn redraw_pane(pane: &mut Pane, channel: &mut Channel, indent: usize) {
    pane.clear();
    pane.paints += 1;
    if channel.log.is_empty() {
        channel.scroll_offset = 0;
        return;
    }
    let log = channel.log.as_bytes();

    // Logical lines as (start, end) with `end` at the newline.
    let mut end = log.len();
    if log[end - 1] == b'\n' {
        end -= 1;
    }

    // Skip `scroll_offset` lines from the bottom.
    let mut skipped = 0;
    while skipped < channel.scroll_offset {
        match log[..end].iter().rposition(|&b| b == b'\n') {
            Some(nl) => {
                end = nl;
                skipped += 1;
            }
            None => break,
        }
    }
    channel.scroll_offset = skipped;
    tracing::trace!(paints = pane.paints, offset = skipped, "pane redrawn");

    // Walk further back to fill the pane.
    let mut start = end;
    let mut lines = 0;
    while lines < pane.height {
        lines += 1;
        match log[..start].iter().rposition(|&b| b == b'\n') {
            Some(nl) if lines < pane.height => start = nl,
            Some(nl) => {
                start = nl + 1;
                break;
            }
            None => {
                start = 0;
                break;
            }
        }
    }
    if start < end && log[start] == b'\n' {
        start += 1;
    }

    let mut pos = start;
    let mut first = true;
    while pos < end {
        if !first {
            pane.newline();
        }
        first = false;
        let line_end = log[pos..end]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(end, |i| pos + i);
        wrap_and_paint(pane, &log[pos..line_end], indent);
        pos = line_end + 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::channels::ChannelStore;

    fn paint(width: usize, text: &str, indent: usize) -> Vec<String> {
        let mut pane = Pane::new(width, 50);
        wrap_and_paint(&mut pane, text.as_bytes(), indent);
        pane.rows().map(str::to_string).collect()
    }

    fn display_width(s: &str) -> usize {
        s.chars().filter_map(glyph_width).sum()
    }

    #[test]
    fn test_exact_width_does_not_wrap() {
        assert_eq!(paint(10, "0123456789", 2), vec!["0123456789"]);
        assert_eq!(paint(10, "中文字符串", 2), vec!["中文字符串"]);
    }

    #[test]
    fn test_breaks_at_space_with_indent() {
        let rows = paint(12, "hello there world", 2);
        assert_eq!(rows, vec!["hello there", "  world"]);
    }

    #[test]
    fn test_long_word_breaks_mid_word() {
        let rows = paint(8, "abcdefghijklmnop", 2);
        assert_eq!(rows, vec!["abcdefgh", "  ijklmn", "  op"]);
        for row in &rows {
            assert!(display_width(row) <= 8);
        }
    }

    #[test]
    fn test_wide_glyph_never_straddles_edge() {
        let rows = paint(5, "ab中文字", 0);
        assert_eq!(rows, vec!["ab中", "文字"]);
    }

    #[test]
    fn test_zero_width_does_not_advance() {
        // 'e' + combining acute, five times, is five columns.
        let text = "e\u{301}".repeat(5);
        assert_eq!(paint(5, &text, 0), vec![text.clone()]);
    }

    #[test]
    fn test_stops_at_newline_and_torn_glyph() {
        let mut pane = Pane::new(20, 5);
        assert_eq!(wrap_and_paint(&mut pane, b"one\ntwo", 0), 4);
        assert_eq!(pane.rows().collect::<Vec<_>>(), vec!["one"]);

        let mut pane = Pane::new(20, 5);
        let bytes = "ok中".as_bytes();
        assert_eq!(wrap_and_paint(&mut pane, &bytes[..4], 0), 2);
        assert_eq!(pane.rows().collect::<Vec<_>>(), vec!["ok"]);
    }

    #[test]
    fn test_control_characters_are_skipped() {
        assert_eq!(paint(20, "a\x01b\x02c", 0), vec!["abc"]);
    }

    #[test]
    fn test_rows_never_exceed_width() {
        let text = "the quick brown fox jumps over the lazy dog, 然后 🦀 crabs scuttle sideways";
        for width in 4..40 {
            let mut pane = Pane::new(width, 100);
            wrap_and_paint(&mut pane, text.as_bytes(), 3);
            for row in pane.rows() {
                assert!(display_width(row) <= width, "width {} row {:?}", width, row);
            }
        }
    }

    fn channel_with(lines: usize) -> ChannelStore {
        let mut store = ChannelStore::new("srv");
        for i in 0..lines {
            store.append_line(0, &format!("line {}", i));
        }
        store
    }

    #[test]
    fn test_redraw_anchors_newest_at_bottom() {
        let mut store = channel_with(10);
        let mut pane = Pane::new(40, 3);
        redraw_pane(&mut pane, store.current_mut(), 0);
        assert_eq!(pane.rows().collect::<Vec<_>>(), vec!["line 7", "line 8", "line 9"]);
    }

    #[test]
    fn test_redraw_short_log_starts_at_top() {
        let mut store = channel_with(2);
        let mut pane = Pane::new(40, 5);
        redraw_pane(&mut pane, store.current_mut(), 0);
        assert_eq!(pane.rows().collect::<Vec<_>>(), vec!["line 0", "line 1"]);
    }

    #[test]
    fn test_redraw_honours_scroll_offset() {
        let mut store = channel_with(10);
        store.current_mut().scroll_offset = 4;
        let mut pane = Pane::new(40, 3);
        redraw_pane(&mut pane, store.current_mut(), 0);
        assert_eq!(pane.rows().collect::<Vec<_>>(), vec!["line 3", "line 4", "line 5"]);
    }

    #[test]
    fn test_redraw_clamps_scroll_offset() {
        let mut store = channel_with(4);
        store.current_mut().scroll_offset = 100;
        let mut pane = Pane::new(40, 2);
        redraw_pane(&mut pane, store.current_mut(), 0);
        assert_eq!(store.current().scroll_offset, 3);
        assert_eq!(pane.rows().collect::<Vec<_>>(), vec!["line 0"]);
    }

    #[test]
    fn test_redraw_empty_log() {
        let mut store = ChannelStore::new("srv");
        let mut pane = Pane::new(10, 3);
        redraw_pane(&mut pane, store.current_mut(), 0);
        assert!(pane.is_fresh());
    }

    #[test]
    fn test_appended_lines_scroll_off_the_top() {
        let mut pane = Pane::new(10, 2);
        for line in ["a", "b", "c"] {
            paint_appended(&mut pane, line.as_bytes(), 0);
        }
        assert_eq!(pane.rows().collect::<Vec<_>>(), vec!["b", "c"]);
    }
}
