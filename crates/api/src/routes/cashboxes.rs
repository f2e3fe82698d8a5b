//! Cashbox routes: provisioning, reads, and derived reports.

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use registra_core::ledger::{EntryRef, ReferenceKind, TransactionCategory, TransactionKind};
use registra_db::entities::cashboxes;
use registra_db::repositories::cashbox::{CashboxFilter, CreateCashboxInput};
use registra_db::repositories::transaction::TransactionFilter;
use registra_db::{CashboxRepository, TransactionRepository};
use registra_shared::types::PageRequest;

use super::ledger::TransactionResponse;
use super::{bad_request, ledger_error_response};
use crate::AppState;

/// Creates the cashbox routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cashboxes", get(list_cashboxes))
        .route("/cashboxes", post(create_cashbox))
        .route("/cashboxes/{cashbox_id}", get(get_cashbox))
        .route("/cashboxes/{cashbox_id}/activate", post(activate_cashbox))
        .route("/cashboxes/{cashbox_id}/deactivate", post(deactivate_cashbox))
        .route("/cashboxes/{cashbox_id}/balance", get(balance_at_date))
        .route("/cashboxes/{cashbox_id}/summary", get(daily_summary))
        .route("/cashboxes/{cashbox_id}/reconcile", post(reconcile))
        .route("/cashboxes/{cashbox_id}/transactions", get(list_transactions))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for provisioning a cashbox.
#[derive(Debug, Deserialize)]
pub struct CreateCashboxRequest {
    /// Display name of the register.
    pub name: String,
    /// Owning branch, if any.
    pub branch_id: Option<Uuid>,
    /// Opening amount (decimal string, defaults to zero).
    pub initial_balance: Option<String>,
}

/// Query parameters for listing cashboxes.
#[derive(Debug, Deserialize)]
pub struct ListCashboxesQuery {
    /// Filter by owning branch.
    pub branch_id: Option<Uuid>,
    /// Filter by active flag.
    pub active: Option<bool>,
}

/// Query parameters for the balance-at-date read.
#[derive(Debug, Deserialize)]
pub struct BalanceQuery {
    /// Instant to compute the balance at (RFC 3339, defaults to now).
    pub at: Option<DateTime<Utc>>,
}

/// Query parameters for the daily summary.
#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    /// Day to summarize (YYYY-MM-DD, defaults to today).
    pub date: Option<NaiveDate>,
}

/// Query parameters for listing a cashbox's transactions.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// Filter by kind.
    pub kind: Option<String>,
    /// Filter by category.
    pub category: Option<String>,
    /// Filter by reference kind (paired with `reference_id`).
    pub reference_kind: Option<String>,
    /// Filter by reference id (paired with `reference_kind`).
    pub reference_id: Option<Uuid>,
    /// Inclusive lower creation bound (RFC 3339).
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper creation bound (RFC 3339).
    pub to: Option<DateTime<Utc>>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size (default 50, max 100).
    pub per_page: Option<u32>,
}

/// Response for a cashbox.
#[derive(Debug, Serialize)]
pub struct CashboxResponse {
    /// Cashbox ID.
    pub id: Uuid,
    /// Owning branch, if any.
    pub branch_id: Option<Uuid>,
    /// Display name.
    pub name: String,
    /// Opening amount.
    pub initial_balance: String,
    /// Stored balance.
    pub current_balance: String,
    /// Whether the cashbox accepts writes.
    pub is_active: bool,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
    /// Last update timestamp (RFC 3339).
    pub updated_at: String,
}

impl From<cashboxes::Model> for CashboxResponse {
    fn from(c: cashboxes::Model) -> Self {
        Self {
            id: c.id,
            branch_id: c.branch_id,
            name: c.name,
            initial_balance: c.initial_balance.to_string(),
            current_balance: c.current_balance.to_string(),
            is_active: c.is_active,
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/cashboxes` - Provision a new cashbox.
async fn create_cashbox(
    State(state): State<AppState>,
    Json(payload): Json<CreateCashboxRequest>,
) -> impl IntoResponse {
    let initial_balance = match payload.initial_balance.as_deref() {
        None => Decimal::ZERO,
        Some(raw) => match Decimal::from_str(raw) {
            Ok(amount) => amount,
            Err(_) => return bad_request("INVALID_AMOUNT", "Invalid initial balance format"),
        },
    };

    let repo = CashboxRepository::new((*state.db).clone());
    match repo
        .create(CreateCashboxInput {
            branch_id: payload.branch_id,
            name: payload.name,
            initial_balance,
        })
        .await
    {
        Ok(cashbox) => (
            StatusCode::CREATED,
            Json(CashboxResponse::from(cashbox)),
        )
            .into_response(),
        Err(e) => ledger_error_response(&e),
    }
}

/// GET `/cashboxes` - List cashboxes.
async fn list_cashboxes(
    State(state): State<AppState>,
    Query(query): Query<ListCashboxesQuery>,
) -> impl IntoResponse {
    let repo = CashboxRepository::new((*state.db).clone());
    match repo
        .list(CashboxFilter {
            branch_id: query.branch_id,
            is_active: query.active,
        })
        .await
    {
        Ok(cashboxes) => {
            let items: Vec<CashboxResponse> =
                cashboxes.into_iter().map(CashboxResponse::from).collect();
            (StatusCode::OK, Json(json!({ "cashboxes": items }))).into_response()
        }
        Err(e) => ledger_error_response(&e),
    }
}

/// GET `/cashboxes/{cashbox_id}` - Get one cashbox.
async fn get_cashbox(
    State(state): State<AppState>,
    Path(cashbox_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = CashboxRepository::new((*state.db).clone());
    match repo.get(cashbox_id).await {
        Ok(cashbox) => (StatusCode::OK, Json(CashboxResponse::from(cashbox))).into_response(),
        Err(e) => ledger_error_response(&e),
    }
}

/// POST `/cashboxes/{cashbox_id}/activate` - Resume writes.
async fn activate_cashbox(
    State(state): State<AppState>,
    Path(cashbox_id): Path<Uuid>,
) -> impl IntoResponse {
    set_active(&state, cashbox_id, true).await
}

/// POST `/cashboxes/{cashbox_id}/deactivate` - Suspend writes.
async fn deactivate_cashbox(
    State(state): State<AppState>,
    Path(cashbox_id): Path<Uuid>,
) -> impl IntoResponse {
    set_active(&state, cashbox_id, false).await
}

async fn set_active(
    state: &AppState,
    cashbox_id: Uuid,
    active: bool,
) -> axum::response::Response {
    let repo = CashboxRepository::new((*state.db).clone());
    match repo.set_active(cashbox_id, active).await {
        Ok(cashbox) => (StatusCode::OK, Json(CashboxResponse::from(cashbox))).into_response(),
        Err(e) => ledger_error_response(&e),
    }
}

/// GET `/cashboxes/{cashbox_id}/balance` - Balance as of an instant.
async fn balance_at_date(
    State(state): State<AppState>,
    Path(cashbox_id): Path<Uuid>,
    Query(query): Query<BalanceQuery>,
) -> impl IntoResponse {
    let at = query.at.unwrap_or_else(Utc::now);
    match state.ledger.balance_at_date(cashbox_id, at).await {
        Ok(balance) => (
            StatusCode::OK,
            Json(json!({
                "cashbox_id": cashbox_id,
                "at": at.to_rfc3339(),
                "balance": balance.to_string(),
            })),
        )
            .into_response(),
        Err(e) => ledger_error_response(&e),
    }
}

/// GET `/cashboxes/{cashbox_id}/summary` - Daily activity summary.
async fn daily_summary(
    State(state): State<AppState>,
    Path(cashbox_id): Path<Uuid>,
    Query(query): Query<SummaryQuery>,
) -> impl IntoResponse {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    match state.ledger.daily_summary(cashbox_id, date).await {
        Ok(summary) => (
            StatusCode::OK,
            Json(json!({
                "cashbox_id": cashbox_id,
                "date": summary.date.to_string(),
                "opening": summary.opening.to_string(),
                "income": summary.income.to_string(),
                "expense": summary.expense.to_string(),
                "net": summary.net.to_string(),
                "closing": summary.closing.to_string(),
                "txn_count": summary.txn_count,
                "reversal_count": summary.reversal_count,
            })),
        )
            .into_response(),
        Err(e) => ledger_error_response(&e),
    }
}

/// POST `/cashboxes/{cashbox_id}/reconcile` - Recompute and correct drift.
async fn reconcile(
    State(state): State<AppState>,
    Path(cashbox_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.ledger.reconcile(cashbox_id).await {
        Ok(report) => (
            StatusCode::OK,
            Json(json!({
                "cashbox_id": report.cashbox_id,
                "previous_balance": report.previous_balance.to_string(),
                "balance": report.computed_balance.to_string(),
                "drifted": report.drifted,
            })),
        )
            .into_response(),
        Err(e) => ledger_error_response(&e),
    }
}

/// GET `/cashboxes/{cashbox_id}/transactions` - Filtered, paginated history.
async fn list_transactions(
    State(state): State<AppState>,
    Path(cashbox_id): Path<Uuid>,
    Query(query): Query<ListTransactionsQuery>,
) -> impl IntoResponse {
    let kind = match query.kind.as_deref() {
        None => None,
        Some(raw) => match raw {
            "income" => Some(TransactionKind::Income),
            "expense" => Some(TransactionKind::Expense),
            "reversal" => Some(TransactionKind::Reversal),
            _ => return bad_request("INVALID_KIND", &format!("Unknown kind: {raw}")),
        },
    };

    let category = match query.category.as_deref() {
        None => None,
        Some(raw) => match TransactionCategory::from_str(raw) {
            Ok(category) => Some(category),
            Err(_) => {
                return bad_request("INVALID_CATEGORY", &format!("Unknown category: {raw}"));
            }
        },
    };

    let reference = match (query.reference_kind.as_deref(), query.reference_id) {
        (None, None) => None,
        (Some(raw), Some(id)) => match ReferenceKind::from_str(raw) {
            Ok(kind) => Some(EntryRef { kind, id }),
            Err(_) => {
                return bad_request(
                    "INVALID_REFERENCE_KIND",
                    &format!("Unknown reference kind: {raw}"),
                );
            }
        },
        _ => {
            return bad_request(
                "INVALID_REFERENCE",
                "reference_kind and reference_id must be passed together",
            );
        }
    };

    let filter = TransactionFilter {
        kind: kind.map(Into::into),
        category: category.map(Into::into),
        reference,
        from: query.from,
        to: query.to,
    };
    let page = PageRequest {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(50),
    };

    let repo = TransactionRepository::new((*state.db).clone());
    match repo.list(cashbox_id, filter, page).await {
        Ok(response) => {
            let items: Vec<TransactionResponse> = response
                .data
                .into_iter()
                .map(TransactionResponse::from)
                .collect();
            (
                StatusCode::OK,
                Json(json!({
                    "transactions": items,
                    "meta": response.meta,
                })),
            )
                .into_response()
        }
        Err(e) => ledger_error_response(&e),
    }
}
