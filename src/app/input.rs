//! Single-line editor with a horizontally scrolling view.
//!
//! The cursor and the scroll shift index characters, but the view is measured
//! in terminal columns. After each edit the shift moves by half the view width
//! until the glyph under the cursor fits inside the view.

use unicode_width::UnicodeWidthChar;

/// Bytes the edit line can hold, including room for a terminator.
pub const INPUT_CAPACITY: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    MoveStart,
    MoveEnd,
    MoveLeft,
    MoveRight,
    DeleteBack,
    DeleteForward,
    DeleteToEnd,
    DeleteLine,
    DeleteWord,
    Insert(char),
}

fn columns(c: char) -> usize {
    c.width().unwrap_or(0)
}

#[derive(Debug, Default)]
pub struct InputLine {
    chars: Vec<char>,
    bytes: usize,
    cursor: usize,
    shift: usize,
}

impl InputLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    #[cfg(test)]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[cfg(test)]
    pub fn shift(&self) -> usize {
        self.shift
    }

    /// Apply one edit for a view `width` columns wide.
    ///
    /// Returns `false` when neither the text nor the view changed. The row is
    /// redrawn whole; the terminal backend diffs it against the last frame.
    pub fn apply(&mut self, edit: Edit, width: usize) -> bool {
        let len = self.chars.len();
        let before = (self.cursor, self.shift);
        let edited = match edit {
            Edit::MoveStart => {
                self.cursor = 0;
                false
            }
            Edit::MoveEnd => {
                self.cursor = len;
                false
            }
            Edit::MoveLeft => {
                self.cursor = self.cursor.saturating_sub(1);
                false
            }
            Edit::MoveRight => {
                self.cursor = (self.cursor + 1).min(len);
                false
            }
            Edit::DeleteBack => {
                if self.cursor == 0 {
                    return false;
                }
                self.cursor -= 1;
                self.remove(self.cursor..self.cursor + 1)
            }
            Edit::DeleteForward => {
                if self.cursor >= len {
                    return false;
                }
                self.remove(self.cursor..self.cursor + 1)
            }
            Edit::DeleteToEnd => self.remove(self.cursor..len),
            Edit::DeleteLine => {
                self.cursor = 0;
                self.remove(0..len)
            }
            Edit::DeleteWord => {
                let end = self.cursor;
                let mut start = end;
                while start > 0 && self.chars[start - 1] == ' ' {
                    start -= 1;
                }
                while start > 0 && self.chars[start - 1] != ' ' {
                    start -= 1;
                }
                self.cursor = start;
                self.remove(start..end)
            }
            Edit::Insert(c) => {
                if c.is_control() || self.bytes + c.len_utf8() >= INPUT_CAPACITY {
                    return false;
                }
                self.chars.insert(self.cursor, c);
                self.bytes += c.len_utf8();
                self.cursor += 1;
                true
            }
        };
        self.rescroll(width);
        edited || (self.cursor, self.shift) != before
    }

    /// Hand back the finished line and reset the editor.
    pub fn submit(&mut self) -> String {
        let line = self.text();
        self.chars.clear();
        self.bytes = 0;
        self.cursor = 0;
        self.shift = 0;
        line
    }

    /// Re-fit the view after the terminal width changed.
    pub fn resize(&mut self, width: usize) {
        self.rescroll(width);
    }

    /// Visible text for a `width`-column row and the cursor's column in it.
    pub fn visible(&self, width: usize) -> (String, usize) {
        let mut shown = String::new();
        let mut used = 0;
        let mut cursor_col = None;
        for (i, &c) in self.chars.iter().enumerate().skip(self.shift) {
            if i == self.cursor {
                cursor_col = Some(used);
            }
            let w = columns(c);
            if used + w > width {
                break;
            }
            shown.push(c);
            used += w;
        }
        let cursor_col = cursor_col.unwrap_or(used);
        (shown, cursor_col.min(width.saturating_sub(1)))
    }

    /// Returns true if anything was removed.
    fn remove(&mut self, range: std::ops::Range<usize>) -> bool {
        let removed: usize = self.chars.drain(range).map(char::len_utf8).sum();
        self.bytes -= removed;
        removed > 0
    }

    /// Columns from the shift up to and including the glyph under the
    /// cursor. At the end of the line the cursor takes one column.
    fn cursor_end(&self) -> usize {
        let before: usize = self.chars[self.shift..self.cursor].iter().map(|&c| columns(c)).sum();
        before + self.chars.get(self.cursor).map_or(1, |&c| columns(c).max(1))
    }

    /// Move the shift in half-width steps until the cursor's glyph fits in
    /// `width` columns. A glyph wider than the whole view sits at column 0.
    fn rescroll(&mut self, width: usize) {
        let width = width.max(1);
        let step = (width / 2).max(1);
        while self.cursor < self.shift {
            let mut moved = 0;
            while self.shift > 0 && moved < step {
                self.shift -= 1;
                moved += columns(self.chars[self.shift]);
            }
        }
        while self.shift < self.cursor && self.cursor_end() > width {
            let mut moved = 0;
            while self.shift < self.cursor && moved < step {
                moved += columns(self.chars[self.shift]);
                self.shift += 1;
            }
        }
    }
}
