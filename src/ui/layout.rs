use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Status bar, at least one pane row, input line.
pub const MIN_ROWS: u16 = 3;

/// Terminal size in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Screen {
    pub cols: u16,
    pub rows: u16,
}

pub struct AppLayout {
    pub status_bar: Rect,
    pub message_pane: Rect,
    pub input_line: Rect,
}

impl Screen {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }

    pub fn is_usable(&self) -> bool {
        self.rows >= MIN_ROWS && self.cols > 0
    }

    #[cfg(test)]
    pub fn area(&self) -> Rect {
        Rect::new(0, 0, self.cols, self.rows)
    }

    /// Columns and rows of the message pane.
    pub fn pane_size(&self) -> (usize, usize) {
        (
            usize::from(self.cols),
            usize::from(self.rows.saturating_sub(2)),
        )
    }
}

pub fn compute_layout(area: Rect) -> AppLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Status bar
            Constraint::Min(1),    // Messages
            Constraint::Length(1), // Input line
        ])
        .split(area);

    AppLayout {
        status_bar: chunks[0],
        message_pane: chunks[1],
        input_line: chunks[2],
    }
}
