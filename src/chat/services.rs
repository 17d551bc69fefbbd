use lazy_static::lazy_static;
use regex::Regex;
use time::OffsetDateTime;
use tracing::{info, instrument};

use crate::{
    classifier::{self, prompt},
    error::AppError,
    llm::GenerateRequest,
    state::AppState,
    transactions::services::summarize,
};

const MAX_SENTENCES: usize = 3;

lazy_static! {
    static ref MARKDOWN_RE: Regex = Regex::new(r"[*_`#>]+").unwrap();
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
    static ref SENTENCE_RE: Regex = Regex::new(r".+?[.!?]+(?:\s|$)").unwrap();
}

/// Strips markdown, collapses whitespace and keeps at most the first
/// three sentences.
pub fn tidy_answer(raw: &str) -> String {
    let plain = MARKDOWN_RE.replace_all(raw, "");
    let plain = WHITESPACE_RE.replace_all(plain.trim(), " ").into_owned();
    let matches: Vec<_> = SENTENCE_RE.find_iter(&plain).collect();
    if matches.is_empty() {
        return plain;
    }

    let sentences: Vec<&str> = matches
        .iter()
        .take(MAX_SENTENCES)
        .map(|m| m.as_str().trim())
        .collect();
    let mut out = sentences.join(" ");

    // Keep a trailing fragment without terminal punctuation.
    if matches.len() < MAX_SENTENCES {
        let consumed = matches.last().map(|m| m.end()).unwrap_or(0);
        let rest = plain[consumed..].trim();
        if !rest.is_empty() {
            out.push(' ');
            out.push_str(rest);
        }
    }
    out
}

/// Answers one finance question for `user_id`.
///
/// Classifies the question (with bounded retries), reads the matching
/// transaction totals once, then asks the model for a short answer.
#[instrument(skip(state, message), fields(chars = message.len()))]
pub async fn answer_question(
    state: &AppState,
    user_id: &str,
    message: &str,
) -> Result<String, AppError> {
    info!(phase = "classifying", "answering question");
    let query = classifier::classify(state.llm.as_ref(), message, &state.config.assistant).await?;
    info!(phase = "resolved", intent = %query.intent, "question resolved");

    let (range, summary) = summarize(
        state.transactions.as_ref(),
        user_id,
        query.category,
        query.timeframe,
        OffsetDateTime::now_utc(),
    )
    .await
    .map_err(AppError::Database)?;

    info!(phase = "answering", total = summary.total, "generating answer");
    let request = GenerateRequest::text(prompt::answer_prompt(message, &query, range, &summary));
    let raw = state
        .llm
        .generate(&request)
        .await
        .map_err(|e| AppError::Processing(e.context("generate answer")))?;

    let text = tidy_answer(&raw);
    if text.is_empty() {
        return Err(AppError::Processing(anyhow::anyhow!("model returned an empty answer")));
    }
    info!(phase = "done", chars = text.len(), "question answered");
    Ok(text)
}
