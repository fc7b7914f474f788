//! Core application logic: channel store, input editing, state, key handling and the event loop.

pub mod channels;
pub mod event;
pub mod handler;
pub mod input;
pub mod state;
