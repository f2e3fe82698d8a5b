//! API route definitions.

pub mod cashboxes;
pub mod health;
pub mod ledger;

use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use registra_core::ledger::LedgerError;

use crate::AppState;

/// Merges all route groups.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(cashboxes::routes())
        .merge(ledger::routes())
}

/// Maps a ledger error to its JSON response.
///
/// Business-rule failures carry enough detail to act on; insufficient
/// balance reports both sides of the comparison. Infrastructure errors are
/// logged and returned with a generic message.
pub(crate) fn ledger_error_response(err: &LedgerError) -> Response {
    let status = StatusCode::from_u16(err.http_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if status.is_server_error() {
        error!(error = %err, "ledger operation failed");
        return (
            status,
            Json(json!({
                "error": err.error_code(),
                "message": "An error occurred"
            })),
        )
            .into_response();
    }

    let mut body = json!({
        "error": err.error_code(),
        "message": err.to_string(),
    });
    if let LedgerError::InsufficientBalance {
        available,
        required,
    } = err
    {
        body["available"] = json!(available.to_string());
        body["required"] = json!(required.to_string());
    }
    if err.is_retryable() {
        body["retryable"] = json!(true);
    }

    (status, Json(body)).into_response()
}

/// Builds a 400 response for a malformed request field.
pub(crate) fn bad_request(code: &str, message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": code,
            "message": message
        })),
    )
        .into_response()
}
