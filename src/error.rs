//! # Error Types
//!
//! Every failure of a printer request is a [`PrinterError`]. The leaf variants
//! mirror the stage that failed; [`PrinterError::Request`] wraps a leaf with
//! the printer and command it belonged to, keeping the underlying error as its source.

use thiserror::Error;

use crate::communication::connection::{ConnectionError, ConnectionErrorKind};
use crate::communication::framer::FramingError;
use crate::parser::{ParseError, ValidationError};
use crate::protocol::Command;

#[derive(Debug, Error)]
pub enum PrinterError {
    #[error("connection error: {0}")]
    Connection(#[from] ConnectionError),
    #[error("framing error: {0}")]
    Framing(#[from] FramingError),
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("{command} to printer {printer} failed")]
    Request {
        printer: String,
        command: Command,
        #[source]
        cause: Box<PrinterError>,
    },
}

impl PrinterError {
    pub fn request(printer: impl Into<String>, command: Command, cause: PrinterError) -> Self {
        Self::Request {
            printer: printer.into(),
            command,
            cause: Box::new(cause),
        }
    }

    /// The innermost error, with all request context removed.
    pub fn root_cause(&self) -> &PrinterError {
        match self {
            Self::Request { cause, .. } => cause.root_cause(),
            other => other,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self.root_cause(),
            Self::Connection(ConnectionError {
                kind: ConnectionErrorKind::Timeout,
                ..
            })
        )
    }
}
