use crate::config::AppConfig;
use crate::db;
use crate::llm::{GeminiClient, LlmClient};
use crate::transactions::repo::{PgTransactionStore, TransactionStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub llm: Arc<dyn LlmClient>,
    pub transactions: Arc<dyn TransactionStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let pool = db::connect(&config).await?;
        db::migrate(&pool).await;

        let llm = Arc::new(GeminiClient::new(&config.llm)?) as Arc<dyn LlmClient>;
        let transactions = Arc::new(PgTransactionStore::new(pool)) as Arc<dyn TransactionStore>;

        Ok(Self::from_parts(config, llm, transactions))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        llm: Arc<dyn LlmClient>,
        transactions: Arc<dyn TransactionStore>,
    ) -> Self {
        Self {
            config,
            llm,
            transactions,
        }
    }

    #[cfg(test)]
    pub fn fake(
        llm: Arc<crate::testing::ScriptedLlm>,
        store: Arc<crate::testing::MemoryStore>,
    ) -> Self {
        Self::from_parts(Arc::new(AppConfig::fake()), llm, store)
    }
}
