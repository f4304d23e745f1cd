//! One-shot question handler.
//!
//! Opens a conversation, sends a single turn, and prints the reply to stdout.
//! The greeting goes to stderr so the answer can be piped.

use anyhow::Result;
use std::io::{self, Write};
use std::sync::Arc;

use super::load_resolved_config;
use crate::assistant::{AssistantClient, AssistantTransport};
use crate::chat::view::render_message;
use crate::config::ResolveOptions;
use crate::conversation::{ConversationSession, Message, TurnOutcome};
use crate::input::QuestionSource;
use crate::status;
use crate::ui::{Spinner, Style};

pub struct AskOptions {
    pub question: QuestionSource,
    pub connection: ResolveOptions,
}

/// Runs the ask command and returns the process exit code.
pub async fn run_ask(options: AskOptions) -> Result<i32> {
    let question = options.question.read()?;
    let config = load_resolved_config(&options.connection)?;
    let client = AssistantClient::new(&config.endpoint, config.timeout, config.api_key.clone())?;
    let conversation = ConversationSession::new(config.employee_id.clone(), Arc::new(client));

    ask(&conversation, &question, &mut io::stdout()).await
}

/// Greets, asks `question`, and writes the coach's answer to `out`.
async fn ask<T: AssistantTransport>(
    conversation: &ConversationSession<T>,
    question: &str,
    out: &mut impl Write,
) -> Result<i32> {
    let greeting = {
        let _spinner = Spinner::new("Connecting...");
        conversation.initialize().await
    };

    let opening = last_message(conversation);
    let opening = opening.as_ref().map_or("", Message::text);
    match greeting {
        TurnOutcome::Unavailable => {
            eprintln!("{} {opening}", Style::error("Error:"));
            return Ok(exitcode::CONFIG);
        }
        TurnOutcome::Failed => eprintln!("{}", greeting_warning(opening)),
        _ => status!("{}", Style::secondary(opening)),
    }

    let outcome = {
        let _spinner = Spinner::new("Coach is typing...");
        conversation.submit_turn(question).await
    };

    if let Some(answer) = last_message(conversation) {
        render_message(out, &answer)?;
    }

    Ok(match outcome {
        TurnOutcome::Replied => exitcode::OK,
        _ => exitcode::UNAVAILABLE,
    })
}

/// A failed greeting is reported as a warning; the question is still sent.
fn greeting_warning(text: &str) -> String {
    format!("{} {text}", Style::warning("Warning:"))
}

fn last_message<T: AssistantTransport>(conversation: &ConversationSession<T>) -> Option<Message> {
    conversation.snapshot().transcript.last().cloned()
}
