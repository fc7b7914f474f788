use ratatui::style::{Color, Modifier, Style};

pub struct Theme;

impl Theme {
    pub fn status_bar() -> Style {
        Style::default().fg(Color::White).bg(Color::DarkGray)
    }

    pub fn channel_active() -> Style {
        Style::default().add_modifier(Modifier::REVERSED)
    }

    pub fn channel_mention() -> Style {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    }

    pub fn channel_unread() -> Style {
        Style::default().fg(Color::Green)
    }

    pub fn message_text() -> Style {
        Style::default()
    }

    pub fn input_text() -> Style {
        Style::default()
    }
}
