use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{CreateTransactionRequest, ListQuery, RecategorizeRequest, SummaryQuery, SummaryResponse},
    repo_types::{NewTransaction, Transaction},
    services::summarize,
};
use crate::{
    error::AppError,
    extract::{ApiJson, ApiPath, ApiQuery},
    state::AppState,
};

const MAX_PAGE_SIZE: i64 = 100;

pub fn transaction_routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions).post(create_transaction))
        .route("/transactions/summary", get(get_summary))
        .route("/transactions/:id/category", patch(recategorize_transaction))
}

fn require(value: &str, name: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::BadRequest(format!("{name} is required")));
    }
    Ok(value.to_string())
}

#[instrument(skip(state))]
pub async fn list_transactions(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<ListQuery>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    let user_id = require(&q.user_id, "userId")?;
    let limit = q.limit.clamp(1, MAX_PAGE_SIZE);
    let offset = q.offset.max(0);

    let items = state
        .transactions
        .list(&user_id, limit, offset)
        .await
        .map_err(AppError::Database)?;
    Ok(Json(items))
}

#[instrument(skip(state, body))]
pub async fn create_transaction(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<Transaction>), AppError> {
    let user_id = require(&body.user_id, "userId")?;
    let description = require(&body.description, "description")?;
    let category = require(&body.category, "category")?;
    if !body.amount.is_finite() {
        return Err(AppError::BadRequest("amount must be a finite number".into()));
    }

    let tx = state
        .transactions
        .insert(NewTransaction {
            user_id,
            amount: body.amount,
            date: body.date,
            description,
            category,
            transaction_type: body.transaction_type,
        })
        .await
        .map_err(AppError::Database)?;

    info!(id = %tx.id, user_id = %tx.user_id, "transaction created");
    Ok((StatusCode::CREATED, Json(tx)))
}

#[instrument(skip(state, body))]
pub async fn recategorize_transaction(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<RecategorizeRequest>,
) -> Result<Json<Transaction>, AppError> {
    let user_id = require(&body.user_id, "userId")?;
    let category = require(&body.category, "category")?;

    let tx = state
        .transactions
        .recategorize(&user_id, id, &category)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::NotFound("Transaction not found".into()))?;

    info!(%id, category = %tx.category, "transaction recategorized");
    Ok(Json(tx))
}

#[instrument(skip(state))]
pub async fn get_summary(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<SummaryQuery>,
) -> Result<Json<SummaryResponse>, AppError> {
    let user_id = require(&q.user_id, "userId")?;
    let (range, summary) = summarize(
        state.transactions.as_ref(),
        &user_id,
        q.category,
        q.timeframe,
        OffsetDateTime::now_utc(),
    )
    .await
    .map_err(AppError::Database)?;

    Ok(Json(SummaryResponse {
        category: q.category,
        timeframe: q.timeframe,
        range,
        summary,
    }))
}
