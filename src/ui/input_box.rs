use crate::app::state::AppState;
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let width = usize::from(area.width);
    let (shown, cursor_col) = state.input.visible(width);
    let paragraph = Paragraph::new(shown).style(Theme::input_text());
    frame.render_widget(paragraph, area);

    let cursor_x = area.x + u16::try_from(cursor_col).unwrap_or(area.width.saturating_sub(1));
    frame.set_cursor_position((cursor_x, area.y));
}
