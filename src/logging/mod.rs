//! Chat transcript logging and diagnostic tracing setup.
//!
//! The transcript is a single append-only file with one tab-separated record
//! per rendered line: channel name, UTC timestamp, text. Diagnostics go
//! through `tracing` to a separate file because the terminal belongs to the
//! UI.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Append-only sink for rendered chat lines.
pub struct ChatLogger {
    out: Box<dyn Write + Send>,
}

impl ChatLogger {
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        Ok(Self::from_writer(Box::new(file)))
    }

    pub fn from_writer(out: Box<dyn Write + Send>) -> Self {
        Self { out }
    }

    /// Write one record. Failures are reported and otherwise ignored.
    pub fn log_line(&mut self, channel: &str, at: DateTime<Utc>, text: &str) {
        let line = format_record(channel, at, text);
        let result = self
            .out
            .write_all(line.as_bytes())
            .and_then(|_| self.out.flush());
        if let Err(e) = result {
            tracing::warn!(error = %e, channel, "chat log write failed");
        }
    }
}

fn format_record(channel: &str, at: DateTime<Utc>, text: &str) -> String {
    format!(
        "{:<12.12}\t{}\t{}\n",
        channel,
        at.format("%Y-%m-%dT%H:%M:%SZ"),
        text
    )
}

/// Send `tracing` output to `path`. Filtering follows `RUST_LOG`, defaulting
/// to `info`.
pub fn init_tracing(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create trace file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Arc;

    /// In-memory sink whose contents stay readable after the logger takes it.
    #[derive(Clone, Default)]
    pub(crate) struct Shared(pub Arc<Mutex<Vec<u8>>>);

    impl Shared {
        pub(crate) fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk full"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_record_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(
            format_record("#rust", at, "alice   hi"),
            "#rust       \t2024-03-09T07:05:01Z\talice   hi\n"
        );
        assert!(format_record("#averyveryverylongchannel", at, "x").starts_with("#averyveryve\t"));
    }

    #[test]
    fn test_logger_appends() {
        let sink = Shared::default();
        let mut logger = ChatLogger::from_writer(Box::new(sink.clone()));
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        logger.log_line("srv", at, "one");
        logger.log_line("srv", at, "two");
        let text = sink.text();
        assert_eq!(text.lines().count(), 2);
        assert!(text.ends_with("\ttwo\n"));
    }

    #[test]
    fn test_write_failure_is_not_fatal() {
        let mut logger = ChatLogger::from_writer(Box::new(Broken));
        logger.log_line("srv", Utc::now(), "lost");
    }
}
