//! Contains the data models for API responses that are not printer records.

use serde::{Deserialize, Serialize};

/// One entry of the printer listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrinterSummary {
    pub id: String,
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
