//! Channel buffers and the ordered channel store.
//!
//! Index 0 is the server/status channel. It is created with the store and can
//! never be removed, so "no channel" never has to be represented.

use thiserror::Error;

pub const MAX_CHANNELS: usize = 16;
/// Names must be strictly shorter than this many bytes.
pub const CHANNEL_NAME_LEN: usize = 64;
pub const LOG_INITIAL_CAPACITY: usize = 4096;
/// Longest display line stored in a log, terminator included.
pub const LINE_LEN: usize = 512;

/// Index of the server/status channel.
pub const SERVER: usize = 0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChannelError {
    #[error("too many channels (limit {0})")]
    Full(usize),
    #[error("channel name too long: {0}")]
    NameTooLong(String),
}

/// Append-only scrollback of newline-terminated display lines.
///
/// The logical capacity doubles whenever an append would overflow it, so a
/// run of appends copies O(total bytes) during growth.
#[derive(Debug)]
pub struct LogBuffer {
    bytes: Vec<u8>,
    capacity: usize,
    copied: usize,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::with_capacity(LOG_INITIAL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            bytes: Vec::with_capacity(capacity),
            capacity,
            copied: 0,
        }
    }

    pub fn append(&mut self, data: &[u8]) {
        let needed = self.bytes.len() + data.len();
        if needed > self.capacity {
            let mut capacity = self.capacity;
            while capacity < needed {
                capacity *= 2;
            }
            self.copied += self.bytes.len();
            self.bytes.reserve_exact(capacity - self.bytes.len());
            self.capacity = capacity;
            tracing::trace!(capacity, copied = self.copied, "log buffer grown");
        }
        self.bytes.extend_from_slice(data);
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Offset of the first free byte.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[cfg(test)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[cfg(test)]
    /// Bytes moved by growth so far.
    pub fn bytes_copied(&self) -> usize {
        self.copied
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct Channel {
    pub name: String,
    pub log: LogBuffer,
    /// Lines hidden below the bottom of the pane; 0 follows the newest line.
    pub scroll_offset: usize,
    pub highlighted: bool,
    pub unread: bool,
    /// Explicitly joined, as opposed to opened by an incoming message.
    pub joined: bool,
}

impl Channel {
    fn new(name: &str, joined: bool) -> Self {
        Self {
            name: name.to_string(),
            log: LogBuffer::new(),
            scroll_offset: 0,
            highlighted: false,
            unread: false,
            joined,
        }
    }
}

/// Ordered set of channels plus the active-channel cursor.
#[derive(Debug)]
pub struct ChannelStore {
    channels: Vec<Channel>,
    current: usize,
    max: usize,
}

impl ChannelStore {
    /// Create a store whose index 0 is named after the server.
    pub fn new(server: &str) -> Self {
        Self::with_limit(server, MAX_CHANNELS)
    }

    pub fn with_limit(server: &str, max: usize) -> Self {
        Self {
            channels: vec![Channel::new(server, false)],
            current: SERVER,
            max: max.max(1),
        }
    }

    /// Look a channel up by exact name. The server channel never matches.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.channels
            .iter()
            .enumerate()
            .skip(1)
            .rev()
            .find(|(_, c)| c.name == name)
            .map(|(i, _)| i)
    }

    /// Add a channel, or return the index of an existing one.
    ///
    /// A newly joined channel becomes the active one. Re-adding an implicitly
    /// opened channel with `joined` set marks it joined.
    pub fn add(&mut self, name: &str, joined: bool) -> Result<usize, ChannelError> {
        if let Some(index) = self.find(name) {
            if joined {
                self.channels[index].joined = true;
            }
            return Ok(index);
        }
        if self.channels.len() >= self.max {
            return Err(ChannelError::Full(self.max));
        }
        if name.len() >= CHANNEL_NAME_LEN {
            return Err(ChannelError::NameTooLong(name.to_string()));
        }
        self.channels.push(Channel::new(name, joined));
        let index = self.channels.len() - 1;
        if joined {
            self.current = index;
        }
        Ok(index)
    }

    /// Remove a channel by name. The server channel cannot be removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let Some(index) = self.find(name) else {
            return false;
        };
        self.remove_at(index);
        true
    }

    fn remove_at(&mut self, index: usize) {
        self.channels.remove(index);
        if self.current > index {
            self.current -= 1;
        }
        self.current = self.current.min(self.channels.len() - 1);
    }

    /// Rename a channel in place, truncating to the name limit.
    ///
    /// If another channel already has the new name the two are merged: the
    /// renamed entry is dropped and the existing one keeps its log, inheriting
    /// the joined flag and the focus.
    pub fn rename(&mut self, index: usize, name: &str) {
        if index == SERVER || index >= self.channels.len() {
            return;
        }
        let mut end = name.len().min(CHANNEL_NAME_LEN - 1);
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        let name = &name[..end];
        match self.find(name) {
            Some(existing) if existing != index => {
                let joined = self.channels[index].joined;
                let focused = self.current == index;
                self.remove_at(index);
                let existing = if existing > index { existing - 1 } else { existing };
                self.channels[existing].joined |= joined;
                if focused {
                    self.current = existing;
                }
            }
            _ => self.channels[index].name = name.to_string(),
        }
    }

    /// Append one display line to a channel's log, adding the newline.
    ///
    /// Lines longer than [`LINE_LEN`] are cut at a character boundary.
    /// Returns the byte range of the stored line without its newline.
    pub fn append_line(&mut self, index: usize, text: &str) -> std::ops::Range<usize> {
        let Some(channel) = self.channels.get_mut(index) else {
            return 0..0;
        };
        let mut end = text.len().min(LINE_LEN - 1);
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        let start = channel.log.len();
        channel.log.append(text[..end].as_bytes());
        channel.log.append(b"\n");
        start..start + end
    }

    pub fn get(&self, index: usize) -> Option<&Channel> {
        self.channels.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Channel> {
        self.channels.get_mut(index)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &Channel {
        &self.channels[self.current]
    }

    pub fn current_mut(&mut self) -> &mut Channel {
        &mut self.channels[self.current]
    }

    /// Make `index` active, clearing its pending highlight and unread state.
    pub fn select(&mut self, index: usize) {
        if index < self.channels.len() {
            self.current = index;
            let channel = &mut self.channels[index];
            channel.highlighted = false;
            channel.unread = false;
        }
    }

    pub fn select_next(&mut self) {
        self.select((self.current + 1) % self.channels.len());
    }

    pub fn select_prev(&mut self) {
        let n = self.channels.len();
        self.select((self.current + n - 1) % n);
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.current == index
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Channel> {
        self.channels.iter()
    }

    /// Names of every explicitly joined channel, in order.
    pub fn joined_names(&self) -> Vec<String> {
        self.channels
            .iter()
            .filter(|c| c.joined)
            .map(|c| c.name.clone())
            .collect()
    }
}
