//! The single-threaded event loop.
//!
//! Each tick applies a pending resize, waits for exactly one wake-up, runs
//! reconnect maintenance and then services that wake-up. The wait is
//! `biased` so that socket input beats socket output, which beats terminal
//! input.

use crossterm::event::Event as CrosstermEvent;
use futures::{Stream, StreamExt};
use ratatui::backend::Backend;
use ratatui::Terminal;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::{sleep, Instant};

use crate::app::channels::SERVER;
use crate::app::handler;
use crate::app::state::AppState;
use crate::error::FatalError;
use crate::irc::connection::{Connector, Transport};
use crate::irc::dispatch::dispatch;
use crate::irc::line::LineParser;
use crate::irc::session::{Attempt, LinkState, Session};
use crate::ui;

/// What ended a readiness wait.
#[derive(Debug)]
pub enum Wake {
    Received(io::Result<usize>),
    Sent(io::Result<usize>),
    Terminal(Option<io::Result<CrosstermEvent>>),
    Timeout,
}

/// Run until the quit flag is set or a fatal error occurs. The session is
/// hung up on the way out; unsent output is dropped.
pub async fn run<C, B, E>(
    state: &mut AppState,
    session: &mut Session<C>,
    terminal: &mut Terminal<B>,
    events: &mut E,
) -> Result<(), FatalError>
where
    C: Connector,
    B: Backend,
    E: Stream<Item = io::Result<CrosstermEvent>> + Unpin,
{
    let wait = Duration::from_secs(state.config.reconnect.wait_secs.max(1));
    let mut parser = LineParser::new();
    let mut next_attempt: Option<Instant> = None;

    state.full_redraw();
    draw(terminal, state)?;

    let result = loop {
        state.apply_pending_resize();
        if state.should_quit {
            break Ok(());
        }

        let wake = wait_for_wake(state, session, &mut parser, events, wait).await;

        // Attempts are paced to one per wait interval, however busy the terminal is.
        let due = next_attempt.map_or(true, |t| Instant::now() >= t);
        if session.state() == LinkState::Reconnecting && due {
            next_attempt = Some(Instant::now() + wait);
            if let Err(e) = reconnect(state, session).await {
                break Err(e);
            }
        }

        match wake {
            Wake::Received(Ok(0)) => lose_link(state, session, &mut parser, "connection closed by server").await,
            Wake::Received(Ok(n)) => parser.commit(n, |m| dispatch(state, m)),
            Wake::Received(Err(e)) => lose_link(state, session, &mut parser, &e.to_string()).await,
            Wake::Sent(Ok(0)) => lose_link(state, session, &mut parser, "write returned zero").await,
            Wake::Sent(Ok(n)) => state.outbox.consume(n),
            Wake::Sent(Err(e)) => lose_link(state, session, &mut parser, &e.to_string()).await,
            Wake::Terminal(Some(Ok(event))) => handler::handle_terminal(state, event),
            Wake::Terminal(Some(Err(e))) => break Err(FatalError::Terminal(e)),
            Wake::Terminal(None) => {
                break Err(FatalError::Terminal(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "terminal input closed",
                )))
            }
            Wake::Timeout => {}
        }

        if state.dirty {
            if let Err(e) = draw(terminal, state) {
                break Err(e);
            }
        }
    };

    session.hangup().await;
    result
}

async fn wait_for_wake<C, E>(
    state: &AppState,
    session: &mut Session<C>,
    parser: &mut LineParser,
    events: &mut E,
    wait: Duration,
) -> Wake
where
    C: Connector,
    E: Stream<Item = io::Result<CrosstermEvent>> + Unpin,
{
    let has_output = !state.outbox.is_empty();
    match session.transport_mut() {
        Some(Transport { reader, writer }) => tokio::select! {
            biased;
            n = reader.read(parser.spare_mut()) => Wake::Received(n),
            n = writer.write(state.outbox.pending()), if has_output => Wake::Sent(n),
            ev = events.next() => Wake::Terminal(ev),
            _ = sleep(wait) => Wake::Timeout,
        },
        None => tokio::select! {
            biased;
            ev = events.next() => Wake::Terminal(ev),
            _ = sleep(wait) => Wake::Timeout,
        },
    }
}

async fn lose_link<C: Connector>(
    state: &mut AppState,
    session: &mut Session<C>,
    parser: &mut LineParser,
    reason: &str,
) {
    tracing::warn!(reason, "link lost");
    session.lose_link().await;
    parser.reset();
    state.dirty = true;
}

/// One reconnect attempt. Exceeding the retry bound is fatal.
async fn reconnect<C: Connector>(state: &mut AppState, session: &mut Session<C>) -> Result<(), FatalError> {
    let rejoin = state.channels.joined_names();
    state.push_line(SERVER, "-!- Link lost, attempting reconnection...");
    match session.maintain(&mut state.outbox, rejoin).await? {
        Attempt::Failed(e) => {
            tracing::warn!(attempt = session.attempts(), error = %e, "reconnect failed");
            state.push_line(SERVER, &format!("-!- {}", e));
        }
        Attempt::Reconnected => {
            tracing::info!(host = session.host(), nick = session.nick(), "reconnected");
            state.full_redraw();
        }
        Attempt::Idle => {}
    }
    Ok(())
}

fn draw<B: Backend>(terminal: &mut Terminal<B>, state: &mut AppState) -> Result<(), FatalError> {
    terminal
        .draw(|f| ui::render(f, state))
        .map_err(FatalError::Terminal)?;
    state.dirty = false;
    Ok(())
}
