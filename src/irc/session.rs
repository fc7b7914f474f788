//! Connection lifecycle: dial, login, hangup and bounded reconnect.

use std::io;
use std::time::Duration;
use thiserror::Error;

use crate::irc::connection::{Connector, Transport};
use crate::irc::outbox::OutputQueue;

/// Recoverable connection failures. The caller decides whether to retry.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid port: {0}")]
    InvalidPort(String),
    #[error("cannot resolve {0}: {1}")]
    Resolve(String, #[source] io::Error),
    #[error("no address found for {0}")]
    NoAddress(String),
    #[error("cannot connect to {0}: {1}")]
    Connect(String, #[source] io::Error),
    #[error("invalid server name for TLS: {0}")]
    InvalidServerName(String),
    #[error("TLS handshake failed: {0}")]
    Tls(#[source] io::Error),
    #[error("connection timed out after {0:?}")]
    Timeout(Duration),
}

/// Observable connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

/// The transport only exists inside `Connected`.
#[derive(Debug)]
enum Link {
    Disconnected,
    Connecting,
    Connected(Transport),
    Reconnecting,
}

/// Login details sent at the start of every session.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub nick: String,
    pub user: String,
    pub password: Option<String>,
}

/// How many consecutive reconnect attempts are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// `None` retries forever.
    pub max_retries: Option<u32>,
}

impl ReconnectPolicy {
    /// Build from the configured bound, where any negative value is unbounded.
    pub fn from_config(max_retries: i64) -> Self {
        Self {
            max_retries: u32::try_from(max_retries).ok(),
        }
    }

    fn exhausted(&self, attempts: u32) -> bool {
        self.max_retries.is_some_and(|max| attempts >= max)
    }
}

/// Result of one reconnect maintenance step.
#[derive(Debug)]
pub enum Attempt {
    /// The session was not reconnecting.
    Idle,
    Failed(SessionError),
    /// Login and rejoins have been queued.
    Reconnected,
}

/// Reconnect bound exceeded.
#[derive(Debug, Error)]
#[error("link lost after {attempts} reconnect attempts")]
pub struct LinkLost {
    pub attempts: u32,
}

pub struct Session<C: Connector> {
    connector: C,
    host: String,
    service: String,
    tls: bool,
    credentials: Credentials,
    policy: ReconnectPolicy,
    link: Link,
    attempts: u32,
}

impl<C: Connector> Session<C> {
    pub fn new(
        connector: C,
        host: impl Into<String>,
        service: impl Into<String>,
        tls: bool,
        credentials: Credentials,
        policy: ReconnectPolicy,
    ) -> Self {
        Self {
            connector,
            host: host.into(),
            service: service.into(),
            tls,
            credentials,
            policy,
            link: Link::Disconnected,
            attempts: 0,
        }
    }

    pub fn state(&self) -> LinkState {
        match self.link {
            Link::Disconnected => LinkState::Disconnected,
            Link::Connecting => LinkState::Connecting,
            Link::Connected(_) => LinkState::Connected,
            Link::Reconnecting => LinkState::Reconnecting,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn nick(&self) -> &str {
        &self.credentials.nick
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn transport_mut(&mut self) -> Option<&mut Transport> {
        match &mut self.link {
            Link::Connected(transport) => Some(transport),
            _ => None,
        }
    }

    /// Open a fresh transport. On failure the previous non-connected state
    /// is kept so a reconnect cycle survives.
    pub async fn dial(&mut self) -> Result<(), SessionError> {
        self.hangup().await;
        let resume = std::mem::replace(&mut self.link, Link::Connecting);
        tracing::info!(host = %self.host, service = %self.service, tls = self.tls, "dialing");
        match self.connector.connect(&self.host, &self.service, self.tls).await {
            Ok(transport) => {
                self.link = Link::Connected(transport);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "dial failed");
                self.link = resume;
                Err(e)
            }
        }
    }

    /// Close the transport if there is one. Safe to call repeatedly.
    /// A session that is reconnecting stays reconnecting.
    pub async fn hangup(&mut self) {
        if !matches!(self.link, Link::Connected(_)) {
            return;
        }
        if let Link::Connected(transport) = std::mem::replace(&mut self.link, Link::Disconnected) {
            transport.shutdown().await;
        }
    }

    /// Queue PASS (if any), NICK, USER and an invisible-mode request.
    pub fn send_login(&self, outbox: &mut OutputQueue) {
        let creds = &self.credentials;
        if let Some(password) = &creds.password {
            outbox.push_line(&format!("PASS {}", password));
        }
        outbox.push_line(&format!("NICK {}", creds.nick));
        outbox.push_line(&format!("USER {} 8 * :{}", creds.user, creds.user));
        outbox.push_line(&format!("MODE {} +i", creds.nick));
    }

    /// Drop the transport after a failed read or write and start
    /// reconnecting on the next maintenance step.
    pub async fn lose_link(&mut self) {
        self.hangup().await;
        self.link = Link::Reconnecting;
        self.attempts = 0;
    }

    /// One reconnect attempt if the session is reconnecting.
    ///
    /// On success the login and a JOIN for every name in `rejoin` are queued.
    /// Exceeding the retry bound is fatal.
    pub async fn maintain<I, S>(&mut self, outbox: &mut OutputQueue, rejoin: I) -> Result<Attempt, LinkLost>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if !matches!(self.link, Link::Reconnecting) {
            return Ok(Attempt::Idle);
        }
        if self.policy.exhausted(self.attempts) {
            return Err(LinkLost {
                attempts: self.attempts,
            });
        }
        self.attempts += 1;
        tracing::info!(attempt = self.attempts, "reconnecting");
        if let Err(e) = self.dial().await {
            return Ok(Attempt::Failed(e));
        }
        // Anything queued for the dead link is stale.
        outbox.clear();
        self.send_login(outbox);
        for channel in rejoin {
            outbox.send_join(channel.as_ref());
        }
        self.attempts = 0;
        Ok(Attempt::Reconnected)
    }
}
