use std::io;
use thiserror::Error;

use crate::irc::session::{LinkLost, SessionError};

/// Conditions that end the client. The terminal is restored before the
/// message is printed.
#[derive(Debug, Error)]
pub enum FatalError {
    #[error("screen too small ({cols}x{rows})")]
    ScreenTooSmall { cols: u16, rows: u16 },
    #[error(transparent)]
    LinkLost(#[from] LinkLost),
    #[error("terminal I/O failed: {0}")]
    Terminal(#[source] io::Error),
    #[error("{0}")]
    Connect(#[from] SessionError),
}
