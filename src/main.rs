mod app;
mod config;
mod error;
mod irc;
mod logging;
mod ui;
mod utf8;

use crate::app::state::AppState;
use crate::error::FatalError;
use crate::irc::connection::NetConnector;
use crate::irc::session::{Credentials, ReconnectPolicy, Session};
use crate::logging::ChatLogger;
use crate::ui::layout::Screen;
use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use crossterm::{
    event::EventStream,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "crabirc")]
#[command(about = "A small single-server IRC client for the terminal")]
#[command(version)]
struct Args {
    /// Nickname (defaults to $IRCNICK, then the user name)
    #[arg(short, long)]
    nick: Option<String>,

    /// User name (defaults to $USER)
    #[arg(short, long)]
    user: Option<String>,

    /// Server host
    #[arg(short, long)]
    server: Option<String>,

    /// Server port
    #[arg(short, long)]
    port: Option<u16>,

    /// Append every displayed line to this file
    #[arg(short, long)]
    log: Option<PathBuf>,

    /// Connect with TLS
    #[arg(short, long)]
    tls: bool,

    /// Write diagnostics to this file (filtered by RUST_LOG)
    #[arg(long)]
    trace_file: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(path) = &args.trace_file {
        logging::init_tracing(path)?;
    }

    let cfg = config::load_config()?;

    let user = config::nickname::resolve_user(args.user, std::env::var("USER").ok());
    let Some(nick) =
        config::nickname::resolve_nick(args.nick, std::env::var("IRCNICK").ok(), &user)
    else {
        Args::command()
            .error(ErrorKind::ValueValidation, "nickname must be 1 to 63 bytes")
            .exit();
    };

    let host = args.server.unwrap_or_else(|| cfg.server.host.clone());
    let port = args.port.unwrap_or(cfg.server.port);
    let tls = args.tls || cfg.server.tls;
    let logger = args.log.as_deref().map(ChatLogger::open).transpose()?;

    let connector = NetConnector::new(Duration::from_secs(cfg.reconnect.connect_timeout_secs));
    let credentials = Credentials {
        nick: nick.clone(),
        user,
        password: std::env::var("IRCPASS").ok(),
    };
    let mut session = Session::new(
        connector,
        host.clone(),
        port.to_string(),
        tls,
        credentials,
        ReconnectPolicy::from_config(cfg.reconnect.max_retries),
    );

    // Dial before taking over the terminal so a failure prints plainly.
    if let Err(e) = session.dial().await {
        eprintln!("Error: {}", FatalError::Connect(e));
        std::process::exit(1);
    }

    // Install panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        original_hook(info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut session, cfg, nick, &host, logger).await;

    restore_terminal()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    session: &mut Session<NetConnector>,
    cfg: config::AppConfig,
    nick: String,
    host: &str,
    logger: Option<ChatLogger>,
) -> Result<(), FatalError> {
    let size = terminal.size().map_err(FatalError::Terminal)?;
    let screen = Screen::new(size.width, size.height);
    if !screen.is_usable() {
        return Err(FatalError::ScreenTooSmall {
            cols: size.width,
            rows: size.height,
        });
    }

    let mut state = AppState::new(cfg, nick, host, screen);
    if let Some(logger) = logger {
        state = state.with_logger(logger);
    }
    session.send_login(&mut state.outbox);

    let mut events = EventStream::new();
    app::event::run(&mut state, session, terminal, &mut events).await
}
