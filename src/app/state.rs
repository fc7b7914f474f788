use chrono::{Local, Utc};
use ratatui::text::Line;
use std::fmt::Write as _;

use crate::app::channels::{ChannelError, ChannelStore};
use crate::app::input::InputLine;
use crate::config::AppConfig;
use crate::irc::outbox::OutputQueue;
use crate::logging::ChatLogger;
use crate::ui::layout::Screen;
use crate::ui::pane::{self, Pane};
use crate::ui::status_bar;

/// Everything the event loop mutates, owned in one place.
pub struct AppState {
    pub config: AppConfig,
    pub nick: String,
    pub channels: ChannelStore,
    pub outbox: OutputQueue,
    pub input: InputLine,
    pub screen: Screen,
    pub pane: Pane,
    /// Channel bar as last laid out.
    pub status: Line<'static>,
    pub logger: Option<ChatLogger>,
    pub should_quit: bool,
    /// The frame needs drawing at the end of this tick.
    pub dirty: bool,
    /// Size from the latest resize event, applied at the top of a tick.
    pub pending_resize: Option<(u16, u16)>,
}

impl AppState {
    pub fn new(config: AppConfig, nick: impl Into<String>, server: &str, screen: Screen) -> Self {
        let (width, height) = screen.pane_size();
        let mut state = Self {
            config,
            nick: nick.into(),
            channels: ChannelStore::new(server),
            outbox: OutputQueue::new(),
            input: InputLine::new(),
            screen,
            pane: Pane::new(width, height),
            status: Line::default(),
            logger: None,
            should_quit: false,
            dirty: true,
            pending_resize: None,
        };
        state.redraw_status();
        state
    }

    pub fn with_logger(mut self, logger: ChatLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Apply the configured timestamp prefix, if any.
    fn stamp(&self, text: &str) -> String {
        let Some(format) = &self.config.format.timestamp_format else {
            return text.to_string();
        };
        let mut line = String::new();
        // An invalid format string renders as no prefix.
        if write!(line, "{} ", Local::now().format(format)).is_err() {
            line.clear();
        }
        line.push_str(text);
        line
    }

    /// Store a display line in a channel and hand it to the chat log.
    ///
    /// If the channel is on screen and pinned to the bottom, the line is
    /// painted straight away without a full redraw.
    pub fn push_line(&mut self, index: usize, text: &str) {
        let line = self.stamp(text);
        let range = self.channels.append_line(index, &line);
        let Some(channel) = self.channels.get(index) else {
            return;
        };
        if let Some(logger) = self.logger.as_mut() {
            logger.log_line(&channel.name, Utc::now(), text);
        }
        if self.channels.is_active(index) && channel.scroll_offset == 0 {
            let bytes = &channel.log.as_bytes()[range];
            pane::paint_appended(&mut self.pane, bytes, self.config.ui.indent);
            self.dirty = true;
        }
    }

    pub fn add_channel(&mut self, name: &str, joined: bool) -> Result<usize, ChannelError> {
        let index = self.channels.add(name, joined)?;
        self.redraw_status();
        Ok(index)
    }

    pub fn remove_channel(&mut self, name: &str) -> bool {
        let removed = self.channels.remove(name);
        if removed {
            self.redraw_status();
        }
        removed
    }

    pub fn redraw_status(&mut self) {
        self.status = status_bar::status_line(&self.channels, usize::from(self.screen.cols));
        self.dirty = true;
    }

    pub fn redraw_pane(&mut self) {
        let indent = self.config.ui.indent;
        pane::redraw_pane(&mut self.pane, self.channels.current_mut(), indent);
        self.dirty = true;
    }

    pub fn full_redraw(&mut self) {
        self.redraw_status();
        self.redraw_pane();
    }

    pub fn select_next(&mut self) {
        self.channels.select_next();
        self.full_redraw();
    }

    pub fn select_prev(&mut self) {
        self.channels.select_prev();
        self.full_redraw();
    }

    /// Page back through history. The offset is clamped on redraw.
    pub fn scroll_up(&mut self) {
        let page = self.config.ui.scroll_page;
        let channel = self.channels.current_mut();
        channel.scroll_offset = channel.scroll_offset.saturating_add(page);
        self.redraw_pane();
    }

    pub fn scroll_down(&mut self) {
        let page = self.config.ui.scroll_page;
        let channel = self.channels.current_mut();
        channel.scroll_offset = channel.scroll_offset.saturating_sub(page);
        self.redraw_pane();
    }

    /// Re-lay the screen for a new terminal size. Sizes too small to hold
    /// the three regions are ignored.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        let screen = Screen::new(cols, rows);
        if !screen.is_usable() {
            tracing::warn!(cols, rows, "terminal too small, keeping previous layout");
            return;
        }
        self.screen = screen;
        let (width, height) = screen.pane_size();
        self.pane.resize(width, height);
        self.input.resize(width);
        self.full_redraw();
    }

    pub fn apply_pending_resize(&mut self) {
        if let Some((cols, rows)) = self.pending_resize.take() {
            self.resize(cols, rows);
        }
    }
}
