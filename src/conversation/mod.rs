//! Client side of the turn-based assistant protocol.
//!
//! A [`ConversationSession`] owns one employee's transcript and protocol
//! state token. It allows a single request in flight at a time and folds
//! every reply (or failure) into the transcript before the next request can
//! be issued. Views observe the session through [`SessionSnapshot`]s
//! published on a watch channel.

mod context;
mod message;

pub use context::{
    GREETING_FAILED, Phase, SessionContext, SessionSnapshot, TURN_FAILED, TurnOutcome,
    UNAVAILABLE_NOTICE,
};
pub use message::{Message, Sender};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::watch;
use tracing::debug;

use crate::assistant::{AssistantTransport, ChatReply, ChatRequest};

/// A conversation with the remote assistant for one employee.
///
/// The employee identifier is fixed at construction; talking as someone else
/// means opening a new session.
pub struct ConversationSession<T> {
    context: Arc<Mutex<SessionContext>>,
    transport: Arc<T>,
    updates: watch::Sender<SessionSnapshot>,
}

impl<T: AssistantTransport> ConversationSession<T> {
    pub fn new(employee_id: impl Into<String>, transport: Arc<T>) -> Self {
        let context = SessionContext::new(employee_id);
        let (updates, _) = watch::channel(SessionSnapshot::from(&context));
        Self {
            context: Arc::new(Mutex::new(context)),
            transport,
            updates,
        }
    }

    /// Returns a copy of the current transcript, state and phase.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::from(&*lock(&self.context))
    }

    /// Subscribes to change notifications.
    ///
    /// A new snapshot is published after every transition that changed the
    /// session.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.updates.subscribe()
    }

    /// Runs the opening handshake and waits for it to settle.
    pub async fn initialize(&self) -> TurnOutcome {
        match self.begin_initialize() {
            Some(exchange) => exchange.complete().await,
            None if self.snapshot().phase == Phase::Unavailable => TurnOutcome::Unavailable,
            None => TurnOutcome::Ignored,
        }
    }

    /// Sends one user turn and waits for it to settle.
    pub async fn submit_turn(&self, text: &str) -> TurnOutcome {
        match self.begin_turn(text) {
            Some(exchange) => exchange.complete().await,
            None => TurnOutcome::Ignored,
        }
    }

    /// Starts the opening handshake without waiting for the reply.
    ///
    /// Returns `None` when there is nothing to send: the handshake already
    /// ran, or the employee identifier is missing.
    pub fn begin_initialize(&self) -> Option<PendingExchange<T>> {
        let request = self.transition(SessionContext::begin_greeting)?;
        Some(self.exchange(request))
    }

    /// Starts a user turn without waiting for the reply.
    ///
    /// The user message is visible to subscribers as soon as this returns.
    pub fn begin_turn(&self, text: &str) -> Option<PendingExchange<T>> {
        let request = self.transition(|context| context.begin_turn(text))?;
        Some(self.exchange(request))
    }

    fn transition<R>(&self, apply: impl FnOnce(&mut SessionContext) -> R) -> R {
        let mut context = lock(&self.context);
        let result = apply(&mut context);
        publish(&self.updates, &context);
        result
    }

    fn exchange(&self, request: ChatRequest) -> PendingExchange<T> {
        PendingExchange {
            request,
            context: Arc::downgrade(&self.context),
            transport: Arc::clone(&self.transport),
            updates: self.updates.clone(),
            settled: false,
        }
    }
}

/// A request that has been dispatched but not yet folded.
///
/// The exchange holds only a weak handle to its session: once the session is
/// dropped the reply is discarded instead of being folded. Dropping an
/// exchange before it completes settles it as a failure, so the session never
/// stays pending.
pub struct PendingExchange<T> {
    request: ChatRequest,
    context: Weak<Mutex<SessionContext>>,
    transport: Arc<T>,
    updates: watch::Sender<SessionSnapshot>,
    settled: bool,
}

impl<T: AssistantTransport> PendingExchange<T> {
    pub const fn request(&self) -> &ChatRequest {
        &self.request
    }

    /// Sends the request and folds the outcome into the owning session.
    pub async fn complete(mut self) -> TurnOutcome {
        let outcome = self.transport.send(&self.request).await;
        self.settle(outcome)
    }

    fn settle(&mut self, outcome: anyhow::Result<ChatReply>) -> TurnOutcome {
        self.settled = true;
        let Some(context) = self.context.upgrade() else {
            debug!("session closed before the reply arrived; discarding");
            return TurnOutcome::Discarded;
        };
        let mut context = lock(&context);
        let result = context.settle(outcome);
        publish(&self.updates, &context);
        result
    }
}

impl<T> Drop for PendingExchange<T> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let Some(context) = self.context.upgrade() else {
            return;
        };
        debug!("exchange abandoned before completion");
        let mut context = lock(&context);
        context.settle(Err(anyhow::anyhow!("exchange abandoned")));
        publish(&self.updates, &context);
    }
}

fn lock(context: &Mutex<SessionContext>) -> MutexGuard<'_, SessionContext> {
    context.lock().unwrap_or_else(PoisonError::into_inner)
}

fn publish(updates: &watch::Sender<SessionSnapshot>, context: &SessionContext) {
    let snapshot = SessionSnapshot::from(context);
    updates.send_if_modified(|current| {
        if *current == snapshot {
            false
        } else {
            *current = snapshot;
            true
        }
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::{Result, anyhow, bail};
    use std::collections::VecDeque;

    /// Replays canned outcomes and records every request it receives.
    #[derive(Default)]
    struct ScriptedTransport {
        outcomes: Mutex<VecDeque<Result<ChatReply, String>>>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedTransport {
        fn replying(script: &[(&str, &str)]) -> Arc<Self> {
            let transport = Self::default();
            for (reply, next_state) in script {
                transport.push_reply(reply, next_state);
            }
            Arc::new(transport)
        }

        fn push_reply(&self, reply: &str, next_state: &str) {
            self.outcomes.lock().unwrap().push_back(Ok(ChatReply {
                reply: reply.to_string(),
                next_state: next_state.to_string(),
            }));
        }

        fn push_failure(&self, error: &str) {
            self.outcomes
                .lock()
                .unwrap()
                .push_back(Err(error.to_string()));
        }

        fn requests(&self) -> Vec<ChatRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl AssistantTransport for ScriptedTransport {
        async fn send(&self, request: &ChatRequest) -> Result<ChatReply> {
            self.requests.lock().unwrap().push(request.clone());
            let next = self.outcomes.lock().unwrap().pop_front();
            match next {
                Some(Ok(reply)) => Ok(reply),
                Some(Err(error)) => Err(anyhow!(error)),
                None => bail!("no scripted outcome left"),
            }
        }
    }

    async fn greeted_session(
        transport: &Arc<ScriptedTransport>,
    ) -> ConversationSession<ScriptedTransport> {
        let session = ConversationSession::new("EMP-1", Arc::clone(transport));
        assert_eq!(session.initialize().await, TurnOutcome::Replied);
        session
    }

    #[tokio::test]
    async fn test_end_to_end_greeting_then_turn() {
        let transport = ScriptedTransport::replying(&[
            ("Hi! How can I help?", "MENU"),
            ("Here are your skills...", "SKILLS"),
        ]);
        let session = ConversationSession::new("EMP-1", Arc::clone(&transport));

        assert_eq!(session.initialize().await, TurnOutcome::Replied);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.transcript, vec![Message::bot("Hi! How can I help?")]);
        assert_eq!(snapshot.state, "MENU");

        assert_eq!(
            session.submit_turn("show my skills").await,
            TurnOutcome::Replied
        );
        let snapshot = session.snapshot();
        assert_eq!(
            snapshot.transcript,
            vec![
                Message::bot("Hi! How can I help?"),
                Message::user("show my skills"),
                Message::bot("Here are your skills..."),
            ]
        );
        assert_eq!(snapshot.state, "SKILLS");
        assert_eq!(snapshot.phase, Phase::Idle);

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[0],
            ChatRequest {
                message: "User has opened the chat.".to_string(),
                employee_id: "EMP-1".to_string(),
                state: "START".to_string(),
            }
        );
        assert_eq!(
            requests[1],
            ChatRequest {
                message: "show my skills".to_string(),
                employee_id: "EMP-1".to_string(),
                state: "MENU".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_each_successful_turn_adds_user_then_bot() {
        let transport = ScriptedTransport::replying(&[("Hi!", "MAIN_MENU")]);
        let session = greeted_session(&transport).await;

        for (i, text) in ["one", "two", "three"].iter().enumerate() {
            transport.push_reply(&format!("reply {i}"), "MAIN_MENU");
            let before = session.snapshot().transcript.len();

            assert_eq!(session.submit_turn(text).await, TurnOutcome::Replied);

            let transcript = session.snapshot().transcript;
            assert_eq!(transcript.len(), before + 2);
            assert_eq!(transcript[before], Message::user(*text));
            assert_eq!(transcript[before + 1].sender(), Sender::Bot);
        }
    }

    #[tokio::test]
    async fn test_next_state_is_adopted() {
        let transport = ScriptedTransport::replying(&[("Hi!", "MAIN_MENU")]);
        let session = greeted_session(&transport).await;
        transport.push_reply("Which role are you targeting?", "SKILL_GAP");

        session.submit_turn("what am I missing?").await;

        let snapshot = session.snapshot();
        assert_eq!(snapshot.state, "SKILL_GAP");
        assert_eq!(
            snapshot.transcript.last(),
            Some(&Message::bot("Which role are you targeting?"))
        );
    }

    #[tokio::test]
    async fn test_blank_turns_are_ignored() {
        let transport = ScriptedTransport::replying(&[("Hi!", "MAIN_MENU")]);
        let session = greeted_session(&transport).await;
        let before = session.snapshot();

        assert_eq!(session.submit_turn("").await, TurnOutcome::Ignored);
        assert_eq!(session.submit_turn("   ").await, TurnOutcome::Ignored);

        assert_eq!(session.snapshot(), before);
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_employee_id_is_unavailable() {
        let transport = Arc::new(ScriptedTransport::default());
        let session = ConversationSession::new("", Arc::clone(&transport));

        assert_eq!(session.initialize().await, TurnOutcome::Unavailable);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.transcript, vec![Message::bot(UNAVAILABLE_NOTICE)]);
        assert_eq!(snapshot.phase, Phase::Unavailable);
        assert!(transport.requests().is_empty());

        assert_eq!(session.submit_turn("hello").await, TurnOutcome::Ignored);
        assert_eq!(session.snapshot().transcript.len(), 1);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_failed_greeting_keeps_initial_state() {
        let transport = Arc::new(ScriptedTransport::default());
        transport.push_failure("connection refused");
        let session = ConversationSession::new("EMP-1", Arc::clone(&transport));

        assert_eq!(session.initialize().await, TurnOutcome::Failed);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.state, "START");
        assert_eq!(snapshot.transcript, vec![Message::bot(GREETING_FAILED)]);
        assert_eq!(snapshot.phase, Phase::Idle);
    }

    #[tokio::test]
    async fn test_user_can_type_after_failed_greeting() {
        let transport = Arc::new(ScriptedTransport::default());
        transport.push_failure("timeout");
        transport.push_reply("Welcome back!", "MAIN_MENU");
        let session = ConversationSession::new("EMP-1", Arc::clone(&transport));
        session.initialize().await;

        assert_eq!(session.submit_turn("hello?").await, TurnOutcome::Replied);
        assert_eq!(transport.requests()[1].state, "START");
        assert_eq!(session.snapshot().state, "MAIN_MENU");
    }

    #[tokio::test]
    async fn test_failed_turn_keeps_state_and_apologizes_once() {
        let transport = ScriptedTransport::replying(&[("Hi!", "MAIN_MENU")]);
        let session = greeted_session(&transport).await;
        transport.push_failure("500 Internal Server Error: stack trace here");

        assert_eq!(session.submit_turn("upskill").await, TurnOutcome::Failed);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.state, "MAIN_MENU");
        assert_eq!(snapshot.transcript.len(), 3);
        assert_eq!(snapshot.transcript[1], Message::user("upskill"));
        assert_eq!(snapshot.transcript[2], Message::bot(TURN_FAILED));
        assert!(
            snapshot
                .transcript
                .iter()
                .all(|m| !m.text().contains("stack trace"))
        );

        // A retry resumes from the last acknowledged state.
        transport.push_reply("Sure.", "AWAITING_UPSKILL_TARGET");
        session.submit_turn("upskill").await;
        assert_eq!(transport.requests()[2].state, "MAIN_MENU");
        assert_eq!(session.snapshot().state, "AWAITING_UPSKILL_TARGET");
    }

    #[tokio::test]
    async fn test_pending_spans_dispatch_to_fold() {
        let transport = ScriptedTransport::replying(&[("Hi!", "MAIN_MENU")]);
        let session = greeted_session(&transport).await;
        transport.push_reply("Done.", "MAIN_MENU");
        assert!(!session.snapshot().is_pending());

        let exchange = session.begin_turn("first").unwrap();
        assert!(session.snapshot().is_pending());
        assert_eq!(exchange.request().message, "first");

        let during = session.snapshot();
        assert!(session.begin_turn("second").is_none());
        assert_eq!(session.submit_turn("third").await, TurnOutcome::Ignored);
        assert_eq!(session.snapshot(), during);

        assert_eq!(exchange.complete().await, TurnOutcome::Replied);
        assert!(!session.snapshot().is_pending());
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_initialize_runs_once() {
        let transport = ScriptedTransport::replying(&[("Hi!", "MAIN_MENU")]);
        let session = ConversationSession::new("EMP-1", Arc::clone(&transport));

        let exchange = session.begin_initialize().unwrap();
        assert_eq!(session.snapshot().phase, Phase::AwaitingGreeting);
        assert!(session.begin_initialize().is_none());
        exchange.complete().await;

        assert_eq!(session.initialize().await, TurnOutcome::Ignored);
        assert_eq!(transport.requests().len(), 1);
        assert_eq!(session.snapshot().transcript.len(), 1);
    }

    #[tokio::test]
    async fn test_turn_before_initialize_is_ignored() {
        let transport = Arc::new(ScriptedTransport::default());
        let session = ConversationSession::new("EMP-1", Arc::clone(&transport));

        assert_eq!(session.submit_turn("hello").await, TurnOutcome::Ignored);
        assert!(session.snapshot().transcript.is_empty());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_reply_after_session_drop_is_discarded() {
        let transport = ScriptedTransport::replying(&[("Hi!", "MAIN_MENU")]);
        let session = greeted_session(&transport).await;
        transport.push_reply("Too late.", "MAIN_MENU");

        let exchange = session.begin_turn("are you there?").unwrap();
        drop(session);

        assert_eq!(exchange.complete().await, TurnOutcome::Discarded);
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_abandoned_exchange_releases_pending() {
        let transport = ScriptedTransport::replying(&[("Hi!", "MAIN_MENU")]);
        let session = greeted_session(&transport).await;

        let exchange = session.begin_turn("never sent").unwrap();
        drop(exchange);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, Phase::Idle);
        assert_eq!(snapshot.state, "MAIN_MENU");
        assert_eq!(snapshot.transcript.last(), Some(&Message::bot(TURN_FAILED)));
    }

    #[tokio::test]
    async fn test_subscribers_see_each_transition() {
        let transport = ScriptedTransport::replying(&[("Hi!", "MAIN_MENU")]);
        let session = greeted_session(&transport).await;
        transport.push_reply("Line one\nLine two", "MAIN_MENU");
        let mut updates = session.subscribe();

        let exchange = session.begin_turn("tell me more").unwrap();
        assert!(updates.has_changed().unwrap());
        {
            let seen = updates.borrow_and_update();
            assert!(seen.is_pending());
            assert_eq!(seen.transcript.last(), Some(&Message::user("tell me more")));
        }

        exchange.complete().await;
        assert!(updates.has_changed().unwrap());
        let seen = updates.borrow_and_update();
        assert!(!seen.is_pending());
        let last = seen.transcript.last().unwrap();
        assert_eq!(last.paragraphs().collect::<Vec<_>>(), vec!["Line one", "Line two"]);
    }

    #[tokio::test]
    async fn test_ignored_turn_publishes_nothing() {
        let transport = ScriptedTransport::replying(&[("Hi!", "MAIN_MENU")]);
        let session = greeted_session(&transport).await;
        let mut updates = session.subscribe();
        updates.mark_unchanged();

        session.submit_turn("  ").await;

        assert!(!updates.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_spawned_exchange_folds_into_session() {
        let transport = ScriptedTransport::replying(&[("Hi!", "MAIN_MENU")]);
        let session = greeted_session(&transport).await;
        transport.push_reply("From a task.", "MAIN_MENU");

        let exchange = session.begin_turn("background").unwrap();
        let outcome = tokio::spawn(exchange.complete()).await.unwrap();

        assert_eq!(outcome, TurnOutcome::Replied);
        assert_eq!(
            session.snapshot().transcript.last(),
            Some(&Message::bot("From a task."))
        );
    }
}
