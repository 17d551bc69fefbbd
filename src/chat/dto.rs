use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub text: String,
}
