mod input_box;
pub mod layout;
pub mod pane;
pub mod status_bar;
mod theme;

use crate::app::state::AppState;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

pub fn render(frame: &mut Frame, state: &AppState) {
    let area = frame.area();
    let app_layout = layout::compute_layout(area);

    status_bar::render(frame, app_layout.status_bar, state);
    render_pane(frame, app_layout.message_pane, state);
    input_box::render(frame, app_layout.input_line, state);
}

/// The pane rows are already wrapped, so they are drawn one per line.
fn render_pane(frame: &mut Frame, area: Rect, state: &AppState) {
    let lines: Vec<Line> = state.pane.rows().map(Line::raw).collect();
    let paragraph = Paragraph::new(lines).style(theme::Theme::message_text());
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::tests::test_state;
    use ratatui::backend::TestBackend;

    fn row(terminal: &Terminal<TestBackend>, y: u16) -> String {
        let buffer = terminal.backend().buffer();
        (0..buffer.area.width)
            .map(|x| buffer[(x, y)].symbol().to_string())
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    #[test]
    fn test_frame_has_three_regions() {
        let mut state = test_state();
        let t = state.add_channel("#t", true).unwrap();
        state.redraw_pane();
        state.push_line(t, "hello pane");
        for c in "typing".chars() {
            state.input.apply(crate::app::input::Edit::Insert(c), 60);
        }

        let mut terminal = Terminal::new(TestBackend::new(60, 10)).unwrap();
        terminal.draw(|f| render(f, &state)).unwrap();
        assert_eq!(row(&terminal, 0), "  irc.example.net    #t");
        assert_eq!(row(&terminal, 1), "hello pane");
        assert_eq!(row(&terminal, 9), "typing");
    }
}
