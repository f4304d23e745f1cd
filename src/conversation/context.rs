use anyhow::Result;
use std::fmt;
use tracing::debug;

use super::message::Message;
use crate::assistant::{ChatReply, ChatRequest, INITIAL_STATE, SESSION_OPENED_MESSAGE};

/// Shown when the session is opened without an employee identifier.
pub const UNAVAILABLE_NOTICE: &str = "Chat is unavailable: no employee ID was provided.";

/// Shown when the opening handshake fails.
pub const GREETING_FAILED: &str = "Sorry, I couldn't connect right now.";

/// Shown when a turn exchange fails.
pub const TURN_FAILED: &str = "Sorry, I'm having trouble connecting. Please try again later.";

/// Lifecycle phase of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Created, handshake not yet started.
    Uninitialized,
    /// Opening handshake in flight.
    AwaitingGreeting,
    /// Ready for the next user turn.
    Idle,
    /// User turn in flight.
    AwaitingReply,
    /// Terminal: no employee identifier was supplied.
    Unavailable,
}

impl Phase {
    /// Returns `true` while a request is outstanding.
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::AwaitingGreeting | Self::AwaitingReply)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Uninitialized => "uninitialized",
            Self::AwaitingGreeting => "awaiting greeting",
            Self::Idle => "idle",
            Self::AwaitingReply => "awaiting reply",
            Self::Unavailable => "unavailable",
        };
        f.write_str(label)
    }
}

/// Result of driving one operation through the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Rejected without touching the transcript (blank text, request in flight, ...).
    Ignored,
    /// No employee identifier; the session is closed for good.
    Unavailable,
    /// The assistant replied and the protocol state advanced.
    Replied,
    /// The exchange failed; an apology was appended and the state kept.
    Failed,
    /// The session was dropped before the reply arrived.
    Discarded,
}

/// The mutable heart of a conversation: transcript, protocol token and phase.
///
/// Every transition is a single `&mut self` call, so checking and setting the
/// pending flag can never be split by another caller holding the same lock.
#[derive(Debug, Clone)]
pub struct SessionContext {
    employee_id: String,
    transcript: Vec<Message>,
    state: String,
    phase: Phase,
}

impl SessionContext {
    pub fn new(employee_id: impl Into<String>) -> Self {
        Self {
            employee_id: employee_id.into(),
            transcript: Vec::new(),
            state: INITIAL_STATE.to_string(),
            phase: Phase::Uninitialized,
        }
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    pub const fn is_pending(&self) -> bool {
        self.phase.is_pending()
    }

    /// Starts the opening handshake.
    ///
    /// Returns the request to dispatch, or `None` when the handshake already
    /// ran or the employee identifier is missing. In the latter case the
    /// session moves to [`Phase::Unavailable`] and the notice is appended.
    pub fn begin_greeting(&mut self) -> Option<ChatRequest> {
        if self.phase != Phase::Uninitialized {
            return None;
        }

        if self.employee_id.trim().is_empty() {
            debug!("no employee id; conversation unavailable");
            self.transcript.push(Message::bot(UNAVAILABLE_NOTICE));
            self.phase = Phase::Unavailable;
            return None;
        }

        self.phase = Phase::AwaitingGreeting;
        debug!(employee_id = %self.employee_id, "opening conversation");
        Some(self.request(SESSION_OPENED_MESSAGE))
    }

    /// Starts a user turn.
    ///
    /// The user message is echoed into the transcript immediately. Blank text
    /// and any phase other than [`Phase::Idle`] leave everything untouched.
    pub fn begin_turn(&mut self, text: &str) -> Option<ChatRequest> {
        if self.phase != Phase::Idle || text.trim().is_empty() {
            return None;
        }

        self.transcript.push(Message::user(text));
        self.phase = Phase::AwaitingReply;
        debug!(state = %self.state, "submitting turn");
        Some(self.request(text))
    }

    /// Folds the outcome of the outstanding request into the transcript.
    ///
    /// On failure the protocol state is left as it was, so the next turn
    /// resumes from the last state the assistant acknowledged.
    pub fn settle(&mut self, outcome: Result<ChatReply>) -> TurnOutcome {
        let failure_text = match self.phase {
            Phase::AwaitingGreeting => GREETING_FAILED,
            Phase::AwaitingReply => TURN_FAILED,
            _ => return TurnOutcome::Ignored,
        };
        self.phase = Phase::Idle;

        match outcome {
            Ok(reply) => {
                debug!(from = %self.state, to = %reply.next_state, "state advanced");
                self.transcript.push(Message::bot(reply.reply));
                self.state = reply.next_state;
                TurnOutcome::Replied
            }
            Err(err) => {
                let detail = format!("{err:#}");
                debug!(%detail, state = %self.state, "exchange failed");
                self.transcript.push(Message::bot(failure_text));
                TurnOutcome::Failed
            }
        }
    }

    fn request(&self, message: &str) -> ChatRequest {
        ChatRequest {
            message: message.to_string(),
            employee_id: self.employee_id.clone(),
            state: self.state.clone(),
        }
    }
}

/// Read-only copy of a [`SessionContext`] handed to views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub transcript: Vec<Message>,
    pub state: String,
    pub phase: Phase,
}

impl SessionSnapshot {
    pub const fn is_pending(&self) -> bool {
        self.phase.is_pending()
    }
}

impl From<&SessionContext> for SessionSnapshot {
    fn from(context: &SessionContext) -> Self {
        Self {
            transcript: context.transcript.clone(),
            state: context.state.clone(),
            phase: context.phase,
        }
    }
}
