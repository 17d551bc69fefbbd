use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{range::DateRange, repo_types::TransactionType, services::SpendingSummary};
use crate::classifier::{Category, Timeframe};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub user_id: String,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
fn default_limit() -> i64 {
    20
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    pub user_id: String,
    pub amount: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub description: String,
    pub category: String,
    pub transaction_type: TransactionType,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecategorizeRequest {
    pub user_id: String,
    pub category: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    pub user_id: String,
    pub category: Category,
    #[serde(default = "default_timeframe")]
    pub timeframe: Timeframe,
}
fn default_timeframe() -> Timeframe {
    Timeframe::Month
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub category: Category,
    pub timeframe: Timeframe,
    #[serde(flatten)]
    pub range: DateRange,
    #[serde(flatten)]
    pub summary: SpendingSummary,
}
