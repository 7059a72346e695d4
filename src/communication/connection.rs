// Connection manager: one TCP socket per request, bounded by a deadline
use std::fmt;
use std::future::Future;
use std::io;
use std::time::Duration;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

/// Why a connection failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionErrorKind {
    Timeout,
    Refused,
    Reset,
    Other,
}

impl fmt::Display for ConnectionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Timeout => "timed out",
            Self::Refused => "refused",
            Self::Reset => "reset",
            Self::Other => "failed",
        };
        f.write_str(text)
    }
}

impl From<io::ErrorKind> for ConnectionErrorKind {
    fn from(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::TimedOut => Self::Timeout,
            io::ErrorKind::ConnectionRefused => Self::Refused,
            io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe => Self::Reset,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Error)]
#[error("connection to {endpoint} {kind}")]
pub struct ConnectionError {
    pub kind: ConnectionErrorKind,
    pub endpoint: String,
    #[source]
    pub source: Option<io::Error>,
}

impl ConnectionError {
    pub fn io(endpoint: impl Into<String>, source: io::Error) -> Self {
        Self {
            kind: source.kind().into(),
            endpoint: endpoint.into(),
            source: Some(source),
        }
    }

    pub fn timeout(endpoint: impl Into<String>) -> Self {
        Self {
            kind: ConnectionErrorKind::Timeout,
            endpoint: endpoint.into(),
            source: None,
        }
    }
}

/// Network address of one printer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// An open socket owned by exactly one in-flight request.
///
/// The socket is closed once: gracefully by [`Connection::close`], or by drop
/// when the request fails or its deadline expires.
#[derive(Debug)]
pub struct Connection {
    stream: TcpStream,
    endpoint: Endpoint,
}

impl Connection {
    pub async fn open(endpoint: &Endpoint) -> Result<Self, ConnectionError> {
        tracing::debug!(%endpoint, "connecting");
        let stream = TcpStream::connect((endpoint.host.as_str(), endpoint.port))
            .await
            .map_err(|e| ConnectionError::io(endpoint.to_string(), e))?;
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(%endpoint, "could not disable nagle: {}", e);
        }
        Ok(Self {
            stream,
            endpoint: endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn stream_mut(&mut self) -> &mut TcpStream {
        &mut self.stream
    }

    /// Half-closes the write side and releases the socket.
    pub async fn close(mut self) {
        if let Err(e) = self.stream.shutdown().await {
            tracing::debug!(endpoint = %self.endpoint, "shutdown failed: {}", e);
        }
        tracing::debug!(endpoint = %self.endpoint, "connection closed");
    }
}

/// Runs `operation` under a deadline covering connect, send and receive.
///
/// On expiry the operation future is dropped, which destroys any socket it
/// owns, and the request fails with a [`ConnectionErrorKind::Timeout`].
pub async fn with_deadline<T, E, F>(endpoint: &Endpoint, limit: Duration, operation: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: From<ConnectionError>,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(%endpoint, "no reply within {}ms", limit.as_millis());
            Err(ConnectionError::timeout(endpoint.to_string()).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_kinds_map_to_connection_kinds() {
        let cases = [
            (io::ErrorKind::ConnectionRefused, ConnectionErrorKind::Refused),
            (io::ErrorKind::ConnectionReset, ConnectionErrorKind::Reset),
            (io::ErrorKind::BrokenPipe, ConnectionErrorKind::Reset),
            (io::ErrorKind::TimedOut, ConnectionErrorKind::Timeout),
            (io::ErrorKind::AddrNotAvailable, ConnectionErrorKind::Other),
        ];
        for (io_kind, expected) in cases {
            let err = ConnectionError::io("printer:8899", io::Error::from(io_kind));
            assert_eq!(err.kind, expected, "{io_kind:?}");
            assert!(err.source.is_some());
        }
    }

    #[test]
    fn test_error_message_names_endpoint() {
        let err = ConnectionError::timeout(Endpoint::new("10.0.0.7", 8899).to_string());
        assert_eq!(err.to_string(), "connection to 10.0.0.7:8899 timed out");
    }

    #[tokio::test]
    async fn test_deadline_expiry_is_timeout() {
        let endpoint = Endpoint::new("10.0.0.7", 8899);
        let result: Result<(), ConnectionError> =
            with_deadline(&endpoint, Duration::from_millis(50), std::future::pending()).await;
        assert_eq!(result.unwrap_err().kind, ConnectionErrorKind::Timeout);
    }
}
