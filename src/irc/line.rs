//! Line framing and IRC message grammar.
//!
//! [`LineParser`] owns a single receive buffer. Reads land in its free tail
//! ([`LineParser::spare_mut`]); [`LineParser::commit`] then hands every
//! complete line to a callback as a borrowed [`Message`] and shifts the
//! unterminated remainder to the front.

use crate::utf8;

/// Receive buffer size.
pub const RECV_CAPACITY: usize = 2048;

/// One parsed protocol line, borrowing from the receive buffer.
///
/// Grammar: `[:source ]command params[ :trailing]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message<'a> {
    pub source: Option<&'a str>,
    pub command: &'a str,
    /// Space-delimited middle parameters, verbatim.
    pub params: &'a str,
    pub trailing: Option<&'a str>,
}

impl<'a> Message<'a> {
    /// Parse a line with its terminator already removed. Lines with no space
    /// after the command are malformed and yield `None`.
    pub fn parse(line: &'a str) -> Option<Self> {
        let (source, rest) = match line.strip_prefix(':') {
            Some(stripped) => {
                let (source, rest) = stripped.split_once(' ')?;
                (Some(source), rest)
            }
            None => (None, line),
        };
        let (command, rest) = rest.split_once(' ')?;
        let (params, trailing) = if let Some(t) = rest.strip_prefix(':') {
            ("", Some(t))
        } else if let Some((p, t)) = rest.split_once(" :") {
            (p, Some(t))
        } else {
            (rest, None)
        };
        Some(Self {
            source,
            command,
            params: params.trim_end_matches(' '),
            trailing,
        })
    }

    /// Sender nickname, `?` for server-originated lines.
    pub fn nick(&self) -> &'a str {
        match self.source {
            Some(source) => source.split('!').next().unwrap_or(source),
            None => "?",
        }
    }

    pub fn params(&self) -> impl Iterator<Item = &'a str> {
        self.params.split(' ').filter(|p| !p.is_empty())
    }

    pub fn param(&self, index: usize) -> Option<&'a str> {
        self.params().nth(index)
    }
}

/// Splits a byte stream into lines, surviving arbitrary read boundaries.
#[derive(Debug)]
pub struct LineParser {
    buf: Vec<u8>,
    len: usize,
}

impl LineParser {
    pub fn new() -> Self {
        Self::with_capacity(RECV_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity.max(1)],
            len: 0,
        }
    }

    /// Free space for the next read.
    ///
    /// A buffer filled without a single newline is discarded so the stream
    /// can resynchronise; the partial line is lost.
    pub fn spare_mut(&mut self) -> &mut [u8] {
        if self.len >= self.buf.len() {
            tracing::warn!(capacity = self.buf.len(), "receive buffer overflow, dropping partial line");
            self.len = 0;
        }
        &mut self.buf[self.len..]
    }

    /// Account for `n` freshly read bytes and dispatch every complete line.
    pub fn commit<F>(&mut self, n: usize, mut on_message: F)
    where
        F: FnMut(&Message<'_>),
    {
        self.len = (self.len + n).min(self.buf.len());
        let mut start = 0;
        while let Some(pos) = self.buf[start..self.len].iter().position(|&b| b == b'\n') {
            let end = start + pos;
            let mut line = &self.buf[start..end];
            if let Some(stripped) = line.strip_suffix(b"\r") {
                line = stripped;
            }
            let text = utf8::sanitize(line);
            match Message::parse(&text) {
                Some(message) => on_message(&message),
                None => tracing::debug!(line = %text, "skipping malformed line"),
            }
            start = end + 1;
        }
        self.buf.copy_within(start..self.len, 0);
        self.len -= start;
    }

    #[cfg(test)]
    /// Feed a chunk of any size, as if it had been read from the socket.
    pub fn extend<F>(&mut self, mut bytes: &[u8], mut on_message: F)
    where
        F: FnMut(&Message<'_>),
    {
        while !bytes.is_empty() {
            let spare = self.spare_mut();
            let n = spare.len().min(bytes.len());
            spare[..n].copy_from_slice(&bytes[..n]);
            self.commit(n, &mut on_message);
            bytes = &bytes[n..];
        }
    }

    #[cfg(test)]
    /// Bytes of the unterminated line currently buffered.
    pub fn buffered(&self) -> usize {
        self.len
    }

    /// Forget any partial line, e.g. after the link drops.
    pub fn reset(&mut self) {
        self.len = 0;
    }
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Owned {
        source: Option<String>,
        command: String,
        params: String,
        trailing: Option<String>,
    }

    fn collect(parser: &mut LineParser, chunks: &[&[u8]]) -> Vec<Owned> {
        let mut out = Vec::new();
        for chunk in chunks {
            parser.extend(chunk, |m| {
                out.push(Owned {
                    source: m.source.map(str::to_string),
                    command: m.command.to_string(),
                    params: m.params.to_string(),
                    trailing: m.trailing.map(str::to_string),
                })
            });
        }
        out
    }

    #[test]
    fn test_parse_full_grammar() {
        let m = Message::parse(":alice!u@h PRIVMSG #t :hi there").unwrap();
        assert_eq!(m.source, Some("alice!u@h"));
        assert_eq!(m.nick(), "alice");
        assert_eq!(m.command, "PRIVMSG");
        assert_eq!(m.params, "#t");
        assert_eq!(m.trailing, Some("hi there"));
    }

    #[test]
    fn test_parse_without_source_or_trailing() {
        let m = Message::parse("PING :irc.example.net").unwrap();
        assert_eq!(m.nick(), "?");
        assert_eq!(m.params, "");
        assert_eq!(m.trailing, Some("irc.example.net"));

        let m = Message::parse(":srv 470 me #linux ##linux-overflow").unwrap();
        assert_eq!(m.trailing, None);
        assert_eq!(m.param(1), Some("#linux"));
        assert_eq!(m.param(2), Some("##linux-overflow"));
    }

    #[test]
    fn test_parse_keeps_colons_inside_params() {
        let m = Message::parse(":srv 005 me PREFIX=(ov)@+ CHANTYPES=# :are supported").unwrap();
        assert_eq!(m.param(1), Some("PREFIX=(ov)@+"));
        assert_eq!(m.trailing, Some("are supported"));
        let m = Message::parse(":srv 001 me :Welcome: to IRC").unwrap();
        assert_eq!(m.trailing, Some("Welcome: to IRC"));
    }

    #[test]
    fn test_malformed_lines_are_rejected() {
        assert!(Message::parse("PING").is_none());
        assert!(Message::parse(":onlyprefix").is_none());
        assert!(Message::parse(":srv NOTICE").is_none());
    }

    #[test]
    fn test_split_read_dispatches_once() {
        let mut parser = LineParser::new();
        let got = collect(&mut parser, &[b":alice!u@h PRIV", b"MSG #t :hi\r\n"]);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].command, "PRIVMSG");
        assert_eq!(got[0].source.as_deref(), Some("alice!u@h"));
        assert_eq!(got[0].params, "#t");
        assert_eq!(got[0].trailing.as_deref(), Some("hi"));
        assert_eq!(parser.buffered(), 0);
    }

    #[test]
    fn test_chunking_does_not_change_records() {
        let stream: &[u8] = b":a!u@h PRIVMSG #x :one\r\nPING :tok\r\nbad\r\n:s NOTICE me :caf\xc3\xa9\n:s 372 me :- motd -\r\n";
        let whole = collect(&mut LineParser::new(), &[stream]);
        assert_eq!(whole.len(), 4);
        for size in 1..stream.len() {
            let chunks: Vec<&[u8]> = stream.chunks(size).collect();
            let split = collect(&mut LineParser::new(), &chunks);
            assert_eq!(split, whole, "chunk size {}", size);
        }
    }

    #[test]
    fn test_partial_line_waits_for_terminator() {
        let mut parser = LineParser::new();
        assert!(collect(&mut parser, &[b"PING :x"]).is_empty());
        assert_eq!(parser.buffered(), 7);
        let got = collect(&mut parser, &[b"yz\r\n"]);
        assert_eq!(got[0].trailing.as_deref(), Some("xyz"));
    }

    #[test]
    fn test_overflow_resets_buffer() {
        let mut parser = LineParser::with_capacity(16);
        let mut junk = vec![b'x'; 16];
        junk.extend_from_slice(b"\nPING :ok\r\n");
        let got = collect(&mut parser, &[&junk]);
        // The overlong line is lost, the next one survives.
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].trailing.as_deref(), Some("ok"));
    }

    #[test]
    fn test_invalid_utf8_is_replaced_not_dropped() {
        let mut parser = LineParser::new();
        let got = collect(&mut parser, &[b":s NOTICE me :bad \xff byte\r\n"]);
        assert_eq!(got[0].trailing.as_deref(), Some("bad \u{FFFD} byte"));
    }
}
