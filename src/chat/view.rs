//! Renders the conversation transcript from session snapshots.

use std::io::{self, Write};
use tokio::sync::watch;

use crate::conversation::{Message, Sender, SessionSnapshot};
use crate::ui::Style;

const BOT_TAG: &str = "coach";
const USER_TAG: &str = "you";

/// Incremental transcript renderer fed by a session's change notifications.
pub struct TranscriptView {
    updates: watch::Receiver<SessionSnapshot>,
    rendered: usize,
    echo_user: bool,
}

impl TranscriptView {
    /// Creates a view over `updates`.
    ///
    /// With `echo_user` off, the user's own entries are skipped when rendering
    /// incrementally, since the prompt already left them on screen.
    pub const fn new(updates: watch::Receiver<SessionSnapshot>, echo_user: bool) -> Self {
        Self {
            updates,
            rendered: 0,
            echo_user,
        }
    }

    /// Returns `true` while the session has a request in flight.
    pub fn is_pending(&self) -> bool {
        self.updates.borrow().is_pending()
    }

    /// Writes every entry appended since the previous call.
    pub fn render_new(&mut self, out: &mut impl Write) -> io::Result<()> {
        let fresh: Vec<Message> = {
            let snapshot = self.updates.borrow_and_update();
            snapshot
                .transcript
                .get(self.rendered..)
                .map(<[Message]>::to_vec)
                .unwrap_or_default()
        };
        self.rendered += fresh.len();

        for message in fresh
            .iter()
            .filter(|m| self.echo_user || m.sender() == Sender::Bot)
        {
            render_message(out, message)?;
        }
        Ok(())
    }

    /// Writes the whole transcript, user entries included.
    pub fn render_all(&self, out: &mut impl Write) -> io::Result<()> {
        let transcript = self.updates.borrow().transcript.clone();
        for message in &transcript {
            render_message(out, message)?;
        }
        Ok(())
    }
}

/// Writes one message as a speaker tag followed by its paragraphs.
pub fn render_message(out: &mut impl Write, message: &Message) -> io::Result<()> {
    let (tag, styled) = match message.sender() {
        Sender::Bot => (BOT_TAG, Style::bot(BOT_TAG)),
        Sender::User => (USER_TAG, Style::user(USER_TAG)),
    };
    let indent = " ".repeat(tag.len());

    let mut paragraphs = message.paragraphs();
    match paragraphs.next() {
        Some(first) => writeln!(out, "{styled} {first}")?,
        None => writeln!(out, "{styled}")?,
    }
    for paragraph in paragraphs {
        writeln!(out, "{indent} {paragraph}")?;
    }
    Ok(())
}
