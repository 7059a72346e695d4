// src/printer.rs - one status exchange per call against a FlashForge controller
use std::time::Duration;

use async_trait::async_trait;

use crate::communication::connection::{self, Connection, Endpoint};
use crate::communication::exchange;
use crate::config::PrinterConfig;
use crate::error::PrinterError;
use crate::models::{PrinterInfo, PrinterProgress};
use crate::communication::RawPayload;
use crate::parser::ResponseParser;
use crate::protocol::{Command, DEFAULT_PORT};

/// Default deadline for one complete exchange.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(3_000);

/// The two status operations the HTTP layer calls.
#[async_trait]
pub trait Printer: Send + Sync + 'static {
    fn id(&self) -> &str;
    async fn get_info(&self) -> Result<PrinterInfo, PrinterError>;
    async fn get_progress(&self) -> Result<PrinterProgress, PrinterError>;
}

/// Client for one printer. Holds only the address and timeout; every call
/// opens, uses and closes its own connection.
#[derive(Debug, Clone)]
pub struct PrinterClient {
    id: String,
    endpoint: Endpoint,
    timeout: Duration,
}

impl PrinterClient {
    /// A client on the default port, identified by its host.
    pub fn new(host: impl Into<String>) -> Self {
        let host = host.into();
        Self {
            id: host.clone(),
            endpoint: Endpoint::new(host, DEFAULT_PORT),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn from_config(config: &PrinterConfig) -> Self {
        Self {
            id: config.id().to_string(),
            endpoint: Endpoint::new(config.host.clone(), config.port),
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.endpoint.port = port;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn request<T>(
        &self,
        query: Command,
        parse: fn(&RawPayload) -> Result<T, PrinterError>,
    ) -> Result<T, PrinterError> {
        let endpoint = &self.endpoint;
        let peer = endpoint.to_string();
        let outcome = connection::with_deadline(endpoint, self.timeout, async {
            let mut connection = Connection::open(endpoint).await?;
            let result = exchange(connection.stream_mut(), &peer, &query).await;
            connection.close().await;
            parse(&result?)
        })
        .await;

        outcome.map_err(|cause| {
            tracing::error!(printer = %self.id, "{} failed: {}", query, cause);
            PrinterError::request(self.id.clone(), query, cause)
        })
    }
}

#[async_trait]
impl Printer for PrinterClient {
    fn id(&self) -> &str {
        &self.id
    }

    async fn get_info(&self) -> Result<PrinterInfo, PrinterError> {
        let info = self.request(Command::info_query(), ResponseParser::parse_info).await?;
        tracing::info!(printer = %self.id, "info: {} ({})", info.name, info.model);
        Ok(info)
    }

    async fn get_progress(&self) -> Result<PrinterProgress, PrinterError> {
        let progress = self.request(Command::progress_query(), ResponseParser::parse_progress).await?;
        tracing::info!(printer = %self.id, "progress: {}%", progress.bytes.percentage);
        Ok(progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_defaults() {
        let client = PrinterClient::new("192.168.1.50");
        assert_eq!(client.id(), "192.168.1.50");
        assert_eq!(client.endpoint().to_string(), "192.168.1.50:8899");
        assert_eq!(client.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_client_from_config() {
        let config = PrinterConfig {
            id: Some("workshop".to_string()),
            host: "printer.lan".to_string(),
            port: 9000,
            timeout_ms: 500,
        };
        let client = PrinterClient::from_config(&config);
        assert_eq!(client.id(), "workshop");
        assert_eq!(client.endpoint(), &Endpoint::new("printer.lan", 9000));
        assert_eq!(client.timeout(), Duration::from_millis(500));
    }
}
