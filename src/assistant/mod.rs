//! The remote assistant endpoint.
//!
//! [`AssistantTransport`] is the seam between a conversation and the network;
//! [`AssistantClient`] is its HTTP implementation.

mod client;
mod protocol;

pub use client::AssistantClient;
pub use protocol::{ChatReply, ChatRequest, INITIAL_STATE, SESSION_OPENED_MESSAGE};

use anyhow::Result;

/// Delivers one request to the assistant and returns its reply.
///
/// Any failure (transport error, non-success status, unparseable body,
/// timeout) is reported as `Err`; callers do not distinguish between them.
pub trait AssistantTransport: Send + Sync + 'static {
    fn send(&self, request: &ChatRequest) -> impl Future<Output = Result<ChatReply>> + Send;
}
