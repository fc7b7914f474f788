use rustls::RootCertStore;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::net::{lookup_host, TcpStream};
use tokio_rustls::TlsConnector;

use crate::irc::session::SessionError;

/// A byte stream the session can speak IRC over: plain TCP, TLS, or an
/// in-memory pipe in tests.
pub trait Stream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Stream for T {}

/// Live connection, split so the event loop can wait on reading and writing
/// at the same time.
pub struct Transport {
    pub reader: ReadHalf<Box<dyn Stream>>,
    pub writer: WriteHalf<Box<dyn Stream>>,
}

impl Transport {
    pub fn new(stream: Box<dyn Stream>) -> Self {
        let (reader, writer) = tokio::io::split(stream);
        Self { reader, writer }
    }

    /// Best-effort close: sends a TLS close_notify where applicable, then
    /// drops the socket.
    pub async fn shutdown(mut self) {
        if let Err(e) = self.writer.shutdown().await {
            tracing::debug!(error = %e, "transport shutdown failed");
        }
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Transport")
    }
}

/// Opens transports. The network implementation is [`NetConnector`].
pub trait Connector {
    fn connect(
        &self,
        host: &str,
        service: &str,
        tls: bool,
    ) -> impl Future<Output = Result<Transport, SessionError>>;
}

/// Connects over TCP, optionally wrapped in TLS.
pub struct NetConnector {
    timeout: Duration,
}

impl NetConnector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Connector for NetConnector {
    async fn connect(&self, host: &str, service: &str, tls: bool) -> Result<Transport, SessionError> {
        tokio::time::timeout(self.timeout, dial(host, service, tls))
            .await
            .map_err(|_| SessionError::Timeout(self.timeout))?
    }
}

/// Create a TLS connector with webpki root certificates.
pub fn create_tls_connector() -> TlsConnector {
    let mut root_store = RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    TlsConnector::from(Arc::new(config))
}

/// Resolve `host` (IPv4 or IPv6), connect to the first address that accepts,
/// and perform the TLS handshake if requested.
pub async fn dial(host: &str, service: &str, tls: bool) -> Result<Transport, SessionError> {
    let port: u16 = service
        .parse()
        .map_err(|_| SessionError::InvalidPort(service.to_string()))?;

    let addrs: Vec<_> = lookup_host((host, port))
        .await
        .map_err(|e| SessionError::Resolve(host.to_string(), e))?
        .collect();
    if addrs.is_empty() {
        return Err(SessionError::NoAddress(host.to_string()));
    }

    let mut last_err = None;
    let mut stream = None;
    for addr in addrs {
        match TcpStream::connect(addr).await {
            Ok(s) => {
                tracing::info!(%addr, "connected");
                stream = Some(s);
                break;
            }
            Err(e) => {
                tracing::debug!(%addr, error = %e, "connect failed");
                last_err = Some(e);
            }
        }
    }
    let stream = match (stream, last_err) {
        (Some(s), _) => s,
        (None, Some(e)) => return Err(SessionError::Connect(host.to_string(), e)),
        (None, None) => return Err(SessionError::NoAddress(host.to_string())),
    };
    let _ = stream.set_nodelay(true);

    if !tls {
        return Ok(Transport::new(Box::new(stream)));
    }

    let server_name = rustls::pki_types::ServerName::try_from(host.to_string())
        .map_err(|_| SessionError::InvalidServerName(host.to_string()))?;
    let tls_stream = create_tls_connector()
        .connect(server_name, stream)
        .await
        .map_err(SessionError::Tls)?;
    Ok(Transport::new(Box::new(tls_stream)))
}
