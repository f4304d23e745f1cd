//! # coach - Career Coach Chat CLI
//!
//! `coach` talks to the employee-growth assistant backend from the terminal.
//! The heart of the crate is [`conversation::ConversationSession`], the
//! client half of the assistant's turn-based protocol: it keeps the
//! transcript and the protocol state token consistent and never lets two
//! requests overlap.
//!
//! ## Quick Start
//!
//! ```bash
//! # Interactive chat
//! coach --employee EMP-20001
//!
//! # One question, answer on stdout
//! coach ask "Which roles should I aim for next?"
//!
//! # Save defaults
//! coach configure
//! ```
//!
//! ## Configuration
//!
//! Settings are stored in `~/.config/coach/config.toml`:
//!
//! ```toml
//! [coach]
//! endpoint = "http://127.0.0.1:8000"
//! employee_id = "EMP-20001"
//! timeout_secs = 30
//! ```

/// Remote assistant endpoint: wire types, transport seam and HTTP client.
pub mod assistant;

/// Interactive chat mode.
pub mod chat;

/// Command-line interface definitions and handlers.
pub mod cli;

/// Configuration file management and resolution.
pub mod config;

/// Conversation session state machine.
pub mod conversation;

/// Question input from files and stdin.
pub mod input;

/// Global output configuration and diagnostic logging.
pub mod output;

/// XDG-style path utilities.
pub mod paths;

/// Terminal UI components (spinner, colors).
pub mod ui;
