//! IRC protocol layer: transport, session lifecycle, framing, dispatch and outgoing commands.

pub mod commands;
pub mod connection;
pub mod dispatch;
pub mod line;
pub mod outbox;
pub mod session;
