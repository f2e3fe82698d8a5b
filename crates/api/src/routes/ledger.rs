//! Ledger write routes: income, expense, and reversal.

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use registra_core::ledger::{
    EntryInput, EntryRef, ReferenceKind, TransactionCategory, TransactionKind,
};
use registra_db::entities::transactions;
use registra_shared::types::ActorId;

use super::{bad_request, ledger_error_response};
use crate::AppState;

/// Creates the ledger write routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cashboxes/{cashbox_id}/income", post(record_income))
        .route("/cashboxes/{cashbox_id}/expense", post(record_expense))
        .route("/transactions/{transaction_id}/reverse", post(reverse_transaction))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for recording an income or expense.
#[derive(Debug, Deserialize)]
pub struct RecordEntryRequest {
    /// Amount moved (decimal string, must be positive).
    pub amount: String,
    /// Category tag from the closed set.
    pub category: String,
    /// Human-readable description.
    pub description: String,
    /// The user performing the operation.
    pub actor: Uuid,
    /// Optional pointer to the originating collaborator record.
    pub reference: Option<ReferenceRequest>,
    /// Optional open key/value bag.
    pub metadata: Option<serde_json::Value>,
}

/// A collaborator reference in a request.
#[derive(Debug, Deserialize)]
pub struct ReferenceRequest {
    /// Reference kind tag.
    pub kind: String,
    /// Referenced record id.
    pub id: Uuid,
}

/// Request body for reversing a transaction.
#[derive(Debug, Deserialize)]
pub struct ReverseRequest {
    /// Why the original is being reversed.
    pub reason: String,
    /// The user performing the reversal.
    pub actor: Uuid,
}

/// Response for a ledger transaction.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: Uuid,
    /// Owning cashbox ID.
    pub cashbox_id: Uuid,
    /// Kind: income, expense, or reversal.
    pub kind: &'static str,
    /// Amount moved.
    pub amount: String,
    /// Cashbox balance immediately after this entry committed.
    pub balance_after: String,
    /// Category tag.
    pub category: &'static str,
    /// Description.
    pub description: String,
    /// Collaborator reference, if any.
    pub reference: Option<ReferenceResponse>,
    /// The reversed transaction, for reversal entries.
    pub reversed_transaction_id: Option<Uuid>,
    /// The user who performed the operation.
    pub created_by: Uuid,
    /// Contextual metadata.
    pub metadata: serde_json::Value,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
}

/// A collaborator reference in a response.
#[derive(Debug, Serialize)]
pub struct ReferenceResponse {
    /// Reference kind tag.
    pub kind: String,
    /// Referenced record id.
    pub id: Uuid,
}

impl From<transactions::Model> for TransactionResponse {
    fn from(t: transactions::Model) -> Self {
        let reference = match (t.reference_kind, t.reference_id) {
            (Some(kind), Some(id)) => Some(ReferenceResponse { kind, id }),
            _ => None,
        };
        Self {
            id: t.id,
            cashbox_id: t.cashbox_id,
            kind: TransactionKind::from(t.kind).as_str(),
            amount: t.amount.to_string(),
            balance_after: t.balance_after.to_string(),
            category: TransactionCategory::from(t.category).as_str(),
            description: t.description,
            reference,
            reversed_transaction_id: t.reversed_transaction_id,
            created_by: t.created_by,
            metadata: t.metadata,
            created_at: t.created_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Request parsing
// ============================================================================

/// Parses a record request into a validated service input.
pub(crate) fn parse_entry_input(
    payload: RecordEntryRequest,
) -> Result<EntryInput, axum::response::Response> {
    let Ok(amount) = Decimal::from_str(&payload.amount) else {
        return Err(bad_request("INVALID_AMOUNT", "Invalid amount format"));
    };

    let Ok(category) = TransactionCategory::from_str(&payload.category) else {
        return Err(bad_request(
            "INVALID_CATEGORY",
            &format!("Unknown category: {}", payload.category),
        ));
    };

    let reference = match payload.reference {
        None => None,
        Some(r) => match ReferenceKind::from_str(&r.kind) {
            Ok(kind) => Some(EntryRef { kind, id: r.id }),
            Err(_) => {
                return Err(bad_request(
                    "INVALID_REFERENCE_KIND",
                    &format!("Unknown reference kind: {}", r.kind),
                ));
            }
        },
    };

    Ok(EntryInput {
        amount,
        category,
        description: payload.description,
        actor: ActorId::from_uuid(payload.actor),
        reference,
        metadata: payload.metadata,
    })
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/cashboxes/{cashbox_id}/income` - Record money flowing in.
async fn record_income(
    State(state): State<AppState>,
    Path(cashbox_id): Path<Uuid>,
    Json(payload): Json<RecordEntryRequest>,
) -> impl IntoResponse {
    let input = match parse_entry_input(payload) {
        Ok(input) => input,
        Err(response) => return response,
    };

    match state.ledger.record_income(cashbox_id, input).await {
        Ok(transaction) => (
            StatusCode::CREATED,
            Json(TransactionResponse::from(transaction)),
        )
            .into_response(),
        Err(e) => ledger_error_response(&e),
    }
}

/// POST `/cashboxes/{cashbox_id}/expense` - Record money flowing out.
async fn record_expense(
    State(state): State<AppState>,
    Path(cashbox_id): Path<Uuid>,
    Json(payload): Json<RecordEntryRequest>,
) -> impl IntoResponse {
    let input = match parse_entry_input(payload) {
        Ok(input) => input,
        Err(response) => return response,
    };

    match state.ledger.record_expense(cashbox_id, input).await {
        Ok(transaction) => (
            StatusCode::CREATED,
            Json(TransactionResponse::from(transaction)),
        )
            .into_response(),
        Err(e) => ledger_error_response(&e),
    }
}

/// POST `/transactions/{transaction_id}/reverse` - Reverse a prior entry.
async fn reverse_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<Uuid>,
    Json(payload): Json<ReverseRequest>,
) -> impl IntoResponse {
    match state
        .ledger
        .reverse_transaction(
            transaction_id,
            &payload.reason,
            ActorId::from_uuid(payload.actor),
        )
        .await
    {
        Ok(transaction) => (
            StatusCode::CREATED,
            Json(TransactionResponse::from(transaction)),
        )
            .into_response(),
        Err(e) => ledger_error_response(&e),
    }
}
