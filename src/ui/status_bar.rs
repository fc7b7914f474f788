use crate::app::channels::{Channel, ChannelStore};
use crate::app::state::AppState;
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

/// Columns one channel occupies: the name with two spaces either side.
fn entry_width(channel: &Channel) -> usize {
    channel.name.width() + 4
}

fn entry_style(channel: &Channel, active: bool) -> Style {
    let mut style = Style::default();
    if active {
        style = style.patch(Theme::channel_active());
    }
    if channel.highlighted {
        style = style.patch(Theme::channel_mention());
    } else if channel.unread {
        style = style.patch(Theme::channel_unread());
    }
    style
}

/// Build the channel bar for `width` columns.
///
/// Channels to the left of the active one are included only while they fit
/// in the left half, so the active channel stays near the middle. Entries
/// that would run past the right edge are left out.
pub fn status_line(channels: &ChannelStore, width: usize) -> Line<'static> {
    let current = channels.current_index();
    let entries: Vec<&Channel> = channels.iter().collect();

    let mut budget = width / 2;
    let mut first = current;
    while first > 0 && entry_width(entries[first - 1]) <= budget {
        budget -= entry_width(entries[first - 1]);
        first -= 1;
    }

    let mut used = 0;
    let mut spans = Vec::new();
    for (index, channel) in entries.iter().enumerate().skip(first) {
        let w = entry_width(channel);
        if used + w > width {
            break;
        }
        used += w;
        spans.push(Span::styled(
            format!("  {}  ", channel.name),
            entry_style(channel, index == current),
        ));
    }
    Line::from(spans)
}

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let paragraph = Paragraph::new(state.status.clone()).style(Theme::status_bar());
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(line: &Line) -> Vec<String> {
        line.spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn test_all_channels_when_wide() {
        let mut store = ChannelStore::new("srv");
        store.add("#a", true).unwrap();
        store.add("#b", true).unwrap();
        let line = status_line(&store, 80);
        assert_eq!(texts(&line), vec!["  srv  ", "  #a  ", "  #b  "]);
        assert!(line.spans[2].style.add_modifier.contains(Modifier::REVERSED));
        assert!(!line.spans[0].style.add_modifier.contains(Modifier::REVERSED));
    }

    #[test]
    fn test_active_channel_stays_visible_when_narrow() {
        let mut store = ChannelStore::new("srv");
        store.add("#a", true).unwrap();
        store.add("#b", true).unwrap();
        let line = status_line(&store, 12);
        assert_eq!(texts(&line), vec!["  #a  ", "  #b  "]);
    }

    #[test]
    fn test_overflowing_entries_are_dropped() {
        let mut store = ChannelStore::new("srv");
        store.add("#first", true).unwrap();
        store.add("#second", false).unwrap();
        store.select(0);
        let line = status_line(&store, 20);
        assert_eq!(texts(&line), vec!["  srv  ", "  #first  "]);
        let width: usize = line.spans.iter().map(|s| s.content.width()).sum();
        assert!(width <= 20);
    }

    #[test]
    fn test_flag_colors() {
        let mut store = ChannelStore::new("srv");
        let a = store.add("#a", false).unwrap();
        let b = store.add("#b", false).unwrap();
        store.get_mut(a).unwrap().highlighted = true;
        store.get_mut(b).unwrap().unread = true;
        let line = status_line(&store, 80);
        assert_eq!(line.spans[1].style.fg, Some(Color::Red));
        assert_eq!(line.spans[2].style.fg, Some(Color::Green));
        assert_eq!(line.spans[0].style.fg, None);
    }
}
