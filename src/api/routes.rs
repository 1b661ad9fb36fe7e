//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Extension, Path, State,
    },
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use serde_json::value::RawValue;
use uuid::Uuid;

use crate::domain::{parse_exact_decimal, OperationContext, Transaction, TransactionStatus};
use crate::error::{AppError, AppResult};
use crate::handlers::TransferCommand;
use crate::state::AppState;

// =========================================================================
// Request/Response types
// =========================================================================

/// Body of `POST /transactions`. Every field is required; they are optional
/// here so a missing one can be reported by name.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub source_account_id: Option<Uuid>,
    pub target_account_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_exact_amount")]
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
}

impl TransferRequest {
    pub fn new(source: Uuid, target: Uuid, amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            source_account_id: Some(source),
            target_account_id: Some(target),
            amount: Some(amount),
            currency: Some(currency.into()),
        }
    }
}

/// Reads `amount` from its JSON text, as a number or a string, so no digit
/// is lost to a binary float on the way in.
fn deserialize_exact_amount<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<Box<RawValue>>::deserialize(deserializer)? else {
        return Ok(None);
    };

    let text = raw.get().trim();
    let literal = if text.starts_with('"') {
        serde_json::from_str::<String>(text).map_err(D::Error::custom)?
    } else {
        text.to_string()
    };

    parse_exact_decimal(&literal)
        .map(Some)
        .map_err(|_| D::Error::custom(format!("amount ({}) is not an exact decimal", literal)))
}

fn required<T>(value: Option<T>, field: &str) -> AppResult<T> {
    value.ok_or_else(|| AppError::InvalidRequest(format!("{} field is null or missing", field)))
}

impl TryFrom<TransferRequest> for TransferCommand {
    type Error = AppError;

    fn try_from(request: TransferRequest) -> Result<Self, Self::Error> {
        Ok(TransferCommand::new(
            required(request.source_account_id, "sourceAccountId")?,
            required(request.target_account_id, "targetAccountId")?,
            required(request.amount, "amount")?,
            required(request.currency, "currency")?,
        ))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub id: Uuid,
    pub source_account_id: Uuid,
    pub target_account_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionResponse {
    fn from(tx: Transaction) -> Self {
        Self {
            id: tx.id(),
            source_account_id: tx.source_account_id(),
            target_account_id: tx.target_account_id(),
            amount: tx.amount().value(),
            currency: tx.currency().to_string(),
            status: tx.status(),
            created_at: tx.created_at(),
        }
    }
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/transactions", post(transfer).get(list_transactions))
        .route("/transactions/:transaction_id", get(get_transaction))
}

// =========================================================================
// POST /transactions
// =========================================================================

/// Transfer money between two accounts
async fn transfer(
    State(state): State<AppState>,
    context: Option<Extension<OperationContext>>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Json(request) = payload?;
    let command = TransferCommand::try_from(request)?;
    let context = context.map(|Extension(ctx)| ctx).unwrap_or_default();

    state.transfers.execute(command, &context)?;

    Ok(Json(MessageResponse {
        message: "transaction succeeded".to_string(),
    }))
}

// =========================================================================
// GET /transactions
// =========================================================================

/// List every recorded transfer attempt
async fn list_transactions(State(state): State<AppState>) -> Json<Vec<TransactionResponse>> {
    let mut transactions = state.transfers.find_all();
    transactions.sort_by_key(|tx| tx.created_at());

    Json(transactions.into_iter().map(TransactionResponse::from).collect())
}

// =========================================================================
// GET /transactions/:transaction_id
// =========================================================================

async fn get_transaction(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<TransactionResponse>> {
    let Path(transaction_id) = path?;
    let transaction = state
        .transfers
        .find_by_id(transaction_id)
        .ok_or(AppError::TransactionNotFound(transaction_id))?;

    Ok(Json(transaction.into()))
}
