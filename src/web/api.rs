//! Defines the Axum API routes and handlers.
//!
//! The handlers hold no protocol logic: they look the printer up by id, call
//! one status operation and serialize the record.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};

use crate::config::Config;
use crate::error::PrinterError;
use crate::printer::{Printer, PrinterClient};
use crate::web::models::{ErrorResponse, PrinterSummary};

const PRINTERS_PATH: &str = "/api/v1/printers";

/// Printers served by the bridge, keyed by id.
pub struct AppStateInner {
    pub printers: BTreeMap<String, Arc<dyn Printer>>,
}
pub type AppState = Arc<AppStateInner>;

impl AppStateInner {
    pub fn new(printers: impl IntoIterator<Item = Arc<dyn Printer>>) -> AppState {
        let printers = printers
            .into_iter()
            .map(|printer| (printer.id().to_string(), printer))
            .collect();
        Arc::new(Self { printers })
    }

    pub fn from_config(config: &Config) -> AppState {
        Self::new(
            config
                .printers
                .iter()
                .map(|p| Arc::new(PrinterClient::from_config(p)) as Arc<dyn Printer>),
        )
    }
}

/// Creates the Axum router with all the API endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::temporary(PRINTERS_PATH) }))
        .route(PRINTERS_PATH, get(list_printers))
        .route("/api/v1/printers/{id}/info", get(get_info))
        .route("/api/v1/printers/{id}/progress", get(get_progress))
        .with_state(state)
}

/// Helper to create a JSON error response with a message and status code
fn json_error(message: &str, status: StatusCode) -> Response {
    let body = ErrorResponse {
        error: message.to_string(),
    };
    (status, Json(body)).into_response()
}

fn printer_error(err: &PrinterError) -> Response {
    let status = if err.is_timeout() {
        StatusCode::GATEWAY_TIMEOUT
    } else {
        StatusCode::BAD_GATEWAY
    };
    let message = match err {
        PrinterError::Request { .. } => format!("{}: {}", err, err.root_cause()),
        other => other.to_string(),
    };
    json_error(&message, status)
}

fn lookup(state: &AppState, id: &str) -> Result<Arc<dyn Printer>, Response> {
    state
        .printers
        .get(id)
        .cloned()
        .ok_or_else(|| json_error(&format!("Unknown printer: {id}"), StatusCode::NOT_FOUND))
}

/// GET /api/v1/printers
async fn list_printers(State(state): State<AppState>) -> Json<Vec<PrinterSummary>> {
    let printers = state
        .printers
        .keys()
        .map(|id| PrinterSummary { id: id.clone() })
        .collect();
    Json(printers)
}

/// GET /api/v1/printers/{id}/info
async fn get_info(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let printer = match lookup(&state, &id) {
        Ok(printer) => printer,
        Err(response) => return response,
    };
    match printer.get_info().await {
        Ok(info) => (StatusCode::OK, Json(info)).into_response(),
        Err(e) => printer_error(&e),
    }
}

/// GET /api/v1/printers/{id}/progress
async fn get_progress(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let printer = match lookup(&state, &id) {
        Ok(printer) => printer,
        Err(response) => return response,
    };
    match printer.get_progress().await {
        Ok(progress) => (StatusCode::OK, Json(progress)).into_response(),
        Err(e) => printer_error(&e),
    }
}
