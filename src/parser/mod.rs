//! Reply payload parsers.
//!
//! Two grammars exist: the generic `Key: value` listing answered by `~M115`
//! and the fixed two-line counters answered by `~M27 C`. Each operation picks
//! its [`ResponseParser`] variant.

pub mod key_value;
pub mod progress;

use thiserror::Error;

use crate::communication::framer::RawPayload;
use crate::error::PrinterError;
use crate::models::{Position, PrinterInfo, PrinterProgress};
use key_value::{FieldSpec, ValidatedFields};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected {expected} payload lines, found {found}")]
    MissingLine { expected: usize, found: usize },
    #[error("missing `/` separator in {line:?}")]
    MissingSeparator { line: String },
    #[error("missing `{label}` label in {line:?}")]
    MissingLabel { label: &'static str, line: String },
    #[error("not an unsigned integer: {value:?}")]
    NotNumeric { value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    Missing,
    NotNumeric(String),
    NotFinite(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("field `{field}` {}", describe(.reason))]
pub struct ValidationError {
    pub field: String,
    pub reason: ValidationFailure,
}

fn describe(reason: &ValidationFailure) -> String {
    match reason {
        ValidationFailure::Missing => "is missing".to_string(),
        ValidationFailure::NotNumeric(value) => format!("is not a number: {value:?}"),
        ValidationFailure::NotFinite(value) => format!("is not finite: {value:?}"),
    }
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: ValidationFailure) -> Self {
        Self {
            field: field.into(),
            reason,
        }
    }
}

/// Fields required in the `~M115` reply, validated in this order.
pub const INFO_SCHEMA: &[FieldSpec] = &[
    FieldSpec::text("Machine Name"),
    FieldSpec::text("Machine Type"),
    FieldSpec::text("Firmware"),
    FieldSpec::text("SN"),
    FieldSpec::text("Mac Address"),
    FieldSpec::number("X"),
    FieldSpec::number("Y"),
    FieldSpec::number("Z"),
    FieldSpec::text("Tool Count"),
];

/// The parser an operation applies to its reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseParser {
    PrinterInfo,
    Progress,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedResponse {
    Info(PrinterInfo),
    Progress(PrinterProgress),
}

impl ResponseParser {
    pub fn parse(self, payload: &RawPayload) -> Result<ParsedResponse, PrinterError> {
        match self {
            Self::PrinterInfo => Self::parse_info(payload).map(ParsedResponse::Info),
            Self::Progress => Self::parse_progress(payload).map(ParsedResponse::Progress),
        }
    }

    /// `~M115` reply into its record.
    pub fn parse_info(payload: &RawPayload) -> Result<PrinterInfo, PrinterError> {
        let fields = key_value::parse(&payload.text(), INFO_SCHEMA)?;
        Ok(printer_info(&fields)?)
    }

    /// `~M27 C` reply into its record.
    pub fn parse_progress(payload: &RawPayload) -> Result<PrinterProgress, PrinterError> {
        Ok(progress::parse(&payload.text())?)
    }
}

fn printer_info(fields: &ValidatedFields) -> Result<PrinterInfo, ValidationError> {
    Ok(PrinterInfo {
        name: fields.require_text("Machine Name")?.to_string(),
        model: fields.require_text("Machine Type")?.to_string(),
        firmware_version: fields.require_text("Firmware")?.to_string(),
        serial_number: fields.require_text("SN")?.to_string(),
        mac_address: fields.require_text("Mac Address")?.to_string(),
        position: Position {
            x: fields.require_number("X")?,
            y: fields.require_number("Y")?,
            z: fields.require_number("Z")?,
        },
    })
}
