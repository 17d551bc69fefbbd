use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, instrument};

use super::{range::DateRange, repo::TransactionStore, repo_types::LabelTotal};
use crate::classifier::{Category, Timeframe};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingSummary {
    pub total: f64,
    pub transaction_count: i64,
    pub by_label: Vec<LabelTotal>,
}

impl SpendingSummary {
    pub fn from_totals(by_label: Vec<LabelTotal>) -> Self {
        let total = by_label.iter().map(|l| l.total).sum::<f64>();
        let transaction_count = by_label.iter().map(|l| l.count).sum();
        Self {
            // Summing floats drifts past the cent.
            total: (total * 100.0).round() / 100.0,
            transaction_count,
            by_label,
        }
    }
}

/// Sums a user's transactions for a coarse category over the current
/// `timeframe`. This is the only store read the assistant makes.
#[instrument(skip(store))]
pub async fn summarize(
    store: &dyn TransactionStore,
    user_id: &str,
    category: Category,
    timeframe: Timeframe,
    now: OffsetDateTime,
) -> anyhow::Result<(DateRange, SpendingSummary)> {
    let range = DateRange::for_timeframe(timeframe, now);
    let totals = store
        .totals_by_label(user_id, category.stored_labels(), range)
        .await?;
    let summary = SpendingSummary::from_totals(totals);
    debug!(
        total = summary.total,
        count = summary.transaction_count,
        "spending summarized"
    );
    Ok((range, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;
    use crate::transactions::repo_types::TransactionType;
    use time::macros::datetime;

    #[test]
    fn summary_adds_up_label_totals() {
        let summary = SpendingSummary::from_totals(vec![
            LabelTotal { label: "Groceries".into(), total: 10.1, count: 2 },
            LabelTotal { label: "Restaurants".into(), total: 20.2, count: 1 },
        ]);
        assert_eq!(summary.total, 30.3);
        assert_eq!(summary.transaction_count, 3);
    }

    #[test]
    fn empty_summary_is_zero() {
        let summary = SpendingSummary::from_totals(vec![]);
        assert_eq!(summary.total, 0.0);
        assert_eq!(summary.transaction_count, 0);
    }

    #[tokio::test]
    async fn etc_queries_travel_shopping_and_miscellaneous() {
        let store = MemoryStore::default();
        let now = datetime!(2024-05-15 12:00 UTC);
        store.seed("u1", -100.0, datetime!(2024-05-02 9:00 UTC), "Travel", TransactionType::Debit);
        store.seed("u1", -40.0, datetime!(2024-05-03 9:00 UTC), "Shopping", TransactionType::Debit);
        store.seed("u1", -5.0, datetime!(2024-05-04 9:00 UTC), "Miscellaneous", TransactionType::Debit);
        store.seed("u1", -60.0, datetime!(2024-05-05 9:00 UTC), "Groceries", TransactionType::Debit);
        // outside the month
        store.seed("u1", -70.0, datetime!(2024-04-30 23:59 UTC), "Travel", TransactionType::Debit);
        // another user
        store.seed("u2", -80.0, datetime!(2024-05-06 9:00 UTC), "Travel", TransactionType::Debit);

        let (range, summary) = summarize(&store, "u1", Category::Etc, Timeframe::Month, now)
            .await
            .unwrap();

        assert_eq!(range.start, datetime!(2024-05-01 0:00 UTC));
        assert_eq!(summary.total, -145.0);
        assert_eq!(summary.transaction_count, 3);
        let labels: Vec<&str> = summary.by_label.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["Miscellaneous", "Shopping", "Travel"]);
        assert_eq!(
            store.last_labels(),
            vec!["Travel".to_string(), "Shopping".into(), "Miscellaneous".into()]
        );
    }
}
