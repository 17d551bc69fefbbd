use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Credit,
    Debit,
}

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Credit => "CREDIT",
            TransactionType::Debit => "DEBIT",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREDIT" => Ok(TransactionType::Credit),
            "DEBIT" => Ok(TransactionType::Debit),
            other => anyhow::bail!("unknown transaction type {other:?}"),
        }
    }
}

/// Row as stored in `transactions`; `amount` is cast to float8 by the query.
#[derive(Debug, FromRow)]
pub struct TransactionRow {
    pub id: Uuid,
    pub user_id: String,
    pub amount: f64,
    pub date: OffsetDateTime,
    pub description: String,
    pub category: String,
    pub transaction_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: String,
    pub amount: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub description: String,
    pub category: String,
    pub transaction_type: TransactionType,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = anyhow::Error;

    fn try_from(r: TransactionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            transaction_type: r.transaction_type.parse()?,
            id: r.id,
            user_id: r.user_id,
            amount: r.amount,
            date: r.date,
            description: r.description,
            category: r.category,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub user_id: String,
    pub amount: f64,
    pub date: OffsetDateTime,
    pub description: String,
    pub category: String,
    pub transaction_type: TransactionType,
}

/// Sum of amounts for one stored category label.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct LabelTotal {
    pub label: String,
    pub total: f64,
    pub count: i64,
}
