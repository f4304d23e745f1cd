//! Interactive chat mode.
//!
//! A REPL around a [`ConversationSession`](crate::conversation::ConversationSession)
//! with slash commands for inspecting the session.

/// Slash command parsing and autocomplete.
pub mod command;
mod session;
mod ui;
/// Transcript rendering.
pub mod view;

pub use session::ChatSession;
