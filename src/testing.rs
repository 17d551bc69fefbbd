//! In-memory stand-ins for the model provider and the transaction store.

use std::{
    collections::{BTreeMap, VecDeque},
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request},
    response::Response,
};
use serde_json::Value;
use time::OffsetDateTime;
use tower::ServiceExt;
use uuid::Uuid;

use crate::{
    app::build_app,
    llm::{GenerateRequest, LlmClient},
    state::AppState,
    transactions::{
        range::DateRange,
        repo::TransactionStore,
        repo_types::{LabelTotal, NewTransaction, Transaction, TransactionType},
    },
};

/// Replays canned responses in order and records every request.
pub struct ScriptedLlm {
    responses: Mutex<VecDeque<anyhow::Result<String>>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedLlm {
    pub fn new<'a>(responses: impl IntoIterator<Item = &'a str>) -> Self {
        Self::from_results(responses.into_iter().map(|r| Ok(r.to_string())).collect())
    }

    pub fn from_results(responses: Vec<anyhow::Result<String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow::anyhow!("no scripted response left")))
    }
}

#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<Transaction>>,
    reads: AtomicUsize,
    fail_next: AtomicBool,
    last_labels: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn seed(
        &self,
        user_id: &str,
        amount: f64,
        date: OffsetDateTime,
        category: &str,
        transaction_type: TransactionType,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.rows.lock().unwrap().push(Transaction {
            id,
            user_id: user_id.into(),
            amount,
            date,
            description: format!("{category} purchase"),
            category: category.into(),
            transaction_type,
        });
        id
    }

    /// Makes the next store call fail like a lost connection.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Number of `totals_by_label` calls so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn last_labels(&self) -> Vec<String> {
        self.last_labels.lock().unwrap().clone()
    }

    fn check_failure(&self) -> anyhow::Result<()> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            anyhow::bail!("connection refused");
        }
        Ok(())
    }
}

#[async_trait]
impl TransactionStore for MemoryStore {
    async fn totals_by_label(
        &self,
        user_id: &str,
        labels: &[&str],
        range: DateRange,
    ) -> anyhow::Result<Vec<LabelTotal>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        *self.last_labels.lock().unwrap() = labels.iter().map(|l| l.to_string()).collect();

        let mut totals: BTreeMap<String, (f64, i64)> = BTreeMap::new();
        for tx in self.rows.lock().unwrap().iter() {
            if tx.user_id == user_id
                && labels.contains(&tx.category.as_str())
                && range.contains(tx.date)
            {
                let entry = totals.entry(tx.category.clone()).or_default();
                entry.0 += tx.amount;
                entry.1 += 1;
            }
        }
        Ok(totals
            .into_iter()
            .map(|(label, (total, count))| LabelTotal { label, total, count })
            .collect())
    }

    async fn list(&self, user_id: &str, limit: i64, offset: i64) -> anyhow::Result<Vec<Transaction>> {
        self.check_failure()?;
        let mut rows: Vec<Transaction> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|tx| tx.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(rows
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn insert(&self, new: NewTransaction) -> anyhow::Result<Transaction> {
        self.check_failure()?;
        let tx = Transaction {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            amount: new.amount,
            date: new.date,
            description: new.description,
            category: new.category,
            transaction_type: new.transaction_type,
        };
        self.rows.lock().unwrap().push(tx.clone());
        Ok(tx)
    }

    async fn recategorize(
        &self,
        user_id: &str,
        id: Uuid,
        category: &str,
    ) -> anyhow::Result<Option<Transaction>> {
        self.check_failure()?;
        let mut rows = self.rows.lock().unwrap();
        Ok(rows
            .iter_mut()
            .find(|tx| tx.id == id && tx.user_id == user_id)
            .map(|tx| {
                tx.category = category.to_string();
                tx.clone()
            }))
    }
}

/// Sends one request through the full router.
pub async fn send(state: &AppState, method: &str, uri: &str, body: Option<Value>) -> Response {
    match body {
        Some(json) => send_raw(state, method, uri, Some("application/json"), json.to_string()).await,
        None => send_raw(state, method, uri, None, String::new()).await,
    }
}

/// Like [`send`], with full control over the content type and body bytes.
pub async fn send_raw(
    state: &AppState,
    method: &str,
    uri: &str,
    content_type: Option<&str>,
    body: String,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    let request = builder.body(Body::from(body)).unwrap();

    build_app(state.clone()).oneshot(request).await.unwrap()
}

pub async fn body_json(res: Response) -> Value {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
