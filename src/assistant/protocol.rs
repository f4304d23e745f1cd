use serde::{Deserialize, Serialize};

/// Protocol state token every conversation starts from.
pub const INITIAL_STATE: &str = "START";

/// Synthetic first message announcing that the chat was opened.
pub const SESSION_OPENED_MESSAGE: &str = "User has opened the chat.";

/// Body of `POST /api/chatbot`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
pub struct ChatRequest {
    pub message: String,
    pub employee_id: String,
    pub state: String,
}

/// Successful response of `POST /api/chatbot`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    pub next_state: String,
}
