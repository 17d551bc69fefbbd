use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    range::DateRange,
    repo_types::{LabelTotal, NewTransaction, Transaction, TransactionRow},
};

#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Per-label sums of the user's transactions dated inside `range`.
    async fn totals_by_label(
        &self,
        user_id: &str,
        labels: &[&str],
        range: DateRange,
    ) -> anyhow::Result<Vec<LabelTotal>>;

    async fn list(&self, user_id: &str, limit: i64, offset: i64) -> anyhow::Result<Vec<Transaction>>;

    async fn insert(&self, new: NewTransaction) -> anyhow::Result<Transaction>;

    /// Returns `None` when the user has no transaction with that id.
    async fn recategorize(
        &self,
        user_id: &str,
        id: Uuid,
        category: &str,
    ) -> anyhow::Result<Option<Transaction>>;
}

#[derive(Clone)]
pub struct PgTransactionStore {
    db: PgPool,
}

impl PgTransactionStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TransactionStore for PgTransactionStore {
    async fn totals_by_label(
        &self,
        user_id: &str,
        labels: &[&str],
        range: DateRange,
    ) -> anyhow::Result<Vec<LabelTotal>> {
        let labels: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
        let rows = sqlx::query_as::<_, LabelTotal>(
            r#"
            SELECT category AS label,
                   SUM(amount)::float8 AS total,
                   COUNT(*) AS count
              FROM transactions
             WHERE user_id = $1
               AND category = ANY($2)
               AND date >= $3
               AND date < $4
             GROUP BY category
             ORDER BY category
            "#,
        )
        .bind(user_id)
        .bind(labels)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.db)
        .await
        .context("sum transactions by category")?;
        Ok(rows)
    }

    async fn list(&self, user_id: &str, limit: i64, offset: i64) -> anyhow::Result<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT id, user_id, amount::float8 AS amount, date, description, category, transaction_type
              FROM transactions
             WHERE user_id = $1
             ORDER BY date DESC, id
             LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await
        .context("list transactions")?;

        rows.into_iter().map(Transaction::try_from).collect()
    }

    async fn insert(&self, new: NewTransaction) -> anyhow::Result<Transaction> {
        let row = sqlx::query_as::<_, TransactionRow>(
            r#"
            INSERT INTO transactions (id, user_id, amount, date, description, category, transaction_type)
            VALUES ($1, $2, $3::float8, $4, $5, $6, $7)
            RETURNING id, user_id, amount::float8 AS amount, date, description, category, transaction_type
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.user_id)
        .bind(new.amount)
        .bind(new.date)
        .bind(&new.description)
        .bind(&new.category)
        .bind(new.transaction_type.as_str())
        .fetch_one(&self.db)
        .await
        .context("insert transaction")?;

        Transaction::try_from(row)
    }

    async fn recategorize(
        &self,
        user_id: &str,
        id: Uuid,
        category: &str,
    ) -> anyhow::Result<Option<Transaction>> {
        let row = sqlx::query_as::<_, TransactionRow>(
            r#"
            UPDATE transactions
               SET category = $3
             WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, amount::float8 AS amount, date, description, category, transaction_type
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(category)
        .fetch_optional(&self.db)
        .await
        .context("recategorize transaction")?;

        row.map(Transaction::try_from).transpose()
    }
}
