pub mod prompt;
pub mod retry;
pub mod sanitize;
pub mod schema;

use tracing::{debug, info, instrument};

use crate::{
    config::AssistantConfig,
    llm::{GenerateRequest, LlmClient},
};

use self::retry::{retry_bounded, RetryExhausted};
pub use self::schema::{Category, ClassifiedQuery, Intent, Timeframe};

#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    /// The model output could not be repaired into JSON.
    #[error("malformed model output: {0}")]
    Format(String),

    /// The JSON parsed but is not an object or a field is outside its allowed set.
    #[error("invalid value for `{field}`: {value}")]
    Validation { field: &'static str, value: String },

    /// The call to the model provider itself failed.
    #[error("model request failed: {0}")]
    Upstream(String),

    #[error("classification failed after {attempts} attempt(s): {last}")]
    Exhausted {
        attempts: u32,
        last: Box<ClassifyError>,
    },
}

impl ClassifyError {
    /// True when the model answered but its answer was unusable.
    pub fn is_invalid_output(&self) -> bool {
        match self {
            ClassifyError::Format(_) | ClassifyError::Validation { .. } => true,
            ClassifyError::Upstream(_) => false,
            ClassifyError::Exhausted { last, .. } => last.is_invalid_output(),
        }
    }
}

impl From<RetryExhausted<ClassifyError>> for ClassifyError {
    fn from(e: RetryExhausted<ClassifyError>) -> Self {
        ClassifyError::Exhausted {
            attempts: e.attempts,
            last: Box::new(e.last),
        }
    }
}

/// Turns a free-text question into a validated [`ClassifiedQuery`].
#[instrument(skip(llm, config))]
pub async fn classify(
    llm: &dyn LlmClient,
    question: &str,
    config: &AssistantConfig,
) -> Result<ClassifiedQuery, ClassifyError> {
    let request = GenerateRequest::json(
        prompt::classification_prompt(question),
        config.structured_output.then(schema::response_schema),
    );
    let request = &request;

    let query = retry_bounded(config.max_classify_attempts, move |attempt| async move {
        debug!(attempt, "classifying");
        let raw = llm
            .generate(request)
            .await
            .map_err(|e| ClassifyError::Upstream(format!("{e:#}")))?;
        sanitize::parse_classification(&raw)
    })
    .await?;

    info!(
        intent = %query.intent,
        category = %query.category,
        timeframe = %query.timeframe,
        amount = ?query.amount,
        "question classified"
    );
    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedLlm;

    fn config(max_classify_attempts: u32) -> AssistantConfig {
        AssistantConfig {
            max_classify_attempts,
            structured_output: true,
        }
    }

    #[tokio::test]
    async fn recovers_after_a_malformed_response() {
        let llm = ScriptedLlm::new([
            "I think this is about food?",
            "{intent: 'spendingQuery', category: 'food', timeframe: 'month', amount: null,}",
        ]);

        let query = classify(&llm, "how much on food?", &config(3)).await.unwrap();
        assert_eq!(query.intent, Intent::SpendingQuery);
        assert_eq!(query.category, Category::Food);
        assert_eq!(llm.calls(), 2);
    }

    #[tokio::test]
    async fn gives_up_after_three_attempts_without_a_fourth() {
        let llm = ScriptedLlm::new(["nope", "still nope", "{\"intent\":\"x\"}", "never read"]);

        let err = classify(&llm, "??", &config(3)).await.unwrap_err();
        match &err {
            ClassifyError::Exhausted { attempts, last } => {
                assert_eq!(*attempts, 3);
                assert!(matches!(**last, ClassifyError::Validation { field: "intent", .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.is_invalid_output());
        assert_eq!(llm.calls(), 3);
    }

    #[tokio::test]
    async fn provider_failures_are_retried_and_reported_as_upstream() {
        let llm = ScriptedLlm::from_results(vec![
            Err(anyhow::anyhow!("connection reset")),
            Err(anyhow::anyhow!("timeout")),
        ]);

        let err = classify(&llm, "food?", &config(2)).await.unwrap_err();
        assert!(!err.is_invalid_output());
        assert!(err.to_string().contains("timeout"));
        assert_eq!(llm.calls(), 2);
    }

    #[tokio::test]
    async fn attaches_schema_only_in_structured_mode() {
        let reply = r#"{"intent":"goalTracking","category":"etc","timeframe":"year","amount":1000}"#;

        let llm = ScriptedLlm::new([reply]);
        classify(&llm, "save 1000?", &config(3)).await.unwrap();
        assert!(llm.requests()[0].response_schema.is_some());

        let llm = ScriptedLlm::new([reply]);
        let plain = AssistantConfig {
            max_classify_attempts: 3,
            structured_output: false,
        };
        classify(&llm, "save 1000?", &plain).await.unwrap();
        let requests = llm.requests();
        assert!(requests[0].response_schema.is_none());
        assert!(requests[0].prompt.contains("Question: save 1000?"));
    }
}
