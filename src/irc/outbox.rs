//! Bounded FIFO of outgoing protocol lines.
//!
//! Producers append whole CRLF-terminated lines; the event loop writes a
//! prefix to the socket and [`OutputQueue::consume`]s however much the kernel
//! accepted.

/// Default queue capacity in bytes.
pub const OUTBOX_CAPACITY: usize = 2048;

#[derive(Debug)]
pub struct OutputQueue {
    buf: Vec<u8>,
    capacity: usize,
}

impl OutputQueue {
    pub fn new() -> Self {
        Self::with_capacity(OUTBOX_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Queue one protocol line, adding the CRLF terminator.
    ///
    /// Embedded CR/LF are stripped so a single call can never emit two
    /// commands. If the line does not fit, it is truncated at a character
    /// boundary and still terminated. Returns `false` only when not even the
    /// terminator fits.
    pub fn push_line(&mut self, line: &str) -> bool {
        let room = self.capacity.saturating_sub(self.buf.len());
        if room < 2 {
            tracing::warn!(line, "output queue full, line rejected");
            return false;
        }
        let budget = room - 2;
        let mut written = 0;
        for c in line.chars().filter(|c| *c != '\r' && *c != '\n') {
            let len = c.len_utf8();
            if written + len > budget {
                tracing::warn!(budget, "output queue nearly full, line truncated");
                break;
            }
            let mut tmp = [0u8; 4];
            self.buf.extend_from_slice(c.encode_utf8(&mut tmp).as_bytes());
            written += len;
        }
        self.buf.extend_from_slice(b"\r\n");
        true
    }

    /// Bytes waiting to be transmitted.
    pub fn pending(&self) -> &[u8] {
        &self.buf
    }

    /// Drop a transmitted prefix.
    pub fn consume(&mut self, n: usize) {
        let n = n.min(self.buf.len());
        self.buf.drain(..n);
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    pub fn send_privmsg(&mut self, target: &str, text: &str) -> bool {
        self.push_line(&format!("PRIVMSG {} :{}", target, text))
    }

    pub fn send_action(&mut self, target: &str, text: &str) -> bool {
        let clean = text.replace('\x01', "");
        self.push_line(&format!("PRIVMSG {} :\x01ACTION {}\x01", target, clean))
    }

    pub fn send_notice(&mut self, target: &str, text: &str) -> bool {
        self.push_line(&format!("NOTICE {} :{}", target, text))
    }

    pub fn send_ctcp_reply(&mut self, target: &str, response: &str) -> bool {
        self.send_notice(target, &format!("\x01{}\x01", response))
    }

    pub fn send_join(&mut self, channel: &str) -> bool {
        self.push_line(&format!("JOIN {}", channel))
    }

    pub fn send_part(&mut self, channel: &str) -> bool {
        self.push_line(&format!("PART {}", channel))
    }

    pub fn send_pong(&mut self, payload: &str) -> bool {
        self.push_line(&format!("PONG :{}", payload))
    }

    pub fn send_raw(&mut self, command: &str) -> bool {
        self.push_line(command)
    }
}

impl Default for OutputQueue {
    fn default() -> Self {
        Self::new()
    }
}
