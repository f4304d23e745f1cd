//! Consistent styling for CLI output.
//!
//! Colors come from owo-colors and are dropped entirely when colors are
//! disabled (see [`crate::output`]).

use owo_colors::OwoColorize;
use std::fmt::Display;

use crate::output;

/// Styles for different semantic elements.
pub struct Style;

impl Style {
    /// Section headers (e.g., "Configuration", "Available commands")
    pub fn header<T: Display>(text: T) -> String {
        paint(text, |t| t.bold().to_string())
    }

    /// Labels/keys (e.g., "endpoint", "employee")
    pub fn label<T: Display>(text: T) -> String {
        paint(text, |t| t.dimmed().to_string())
    }

    /// Primary values (e.g., employee id, protocol state)
    pub fn value<T: Display>(text: T) -> String {
        paint(text, |t| t.cyan().to_string())
    }

    /// Secondary/supplementary info (e.g., endpoints, descriptions)
    pub fn secondary<T: Display>(text: T) -> String {
        paint(text, |t| t.dimmed().to_string())
    }

    pub fn success<T: Display>(text: T) -> String {
        paint(text, |t| t.green().to_string())
    }

    pub fn error<T: Display>(text: T) -> String {
        paint(text, |t| t.red().bold().to_string())
    }

    pub fn warning<T: Display>(text: T) -> String {
        paint(text, |t| t.yellow().to_string())
    }

    /// Slash commands (e.g., "/history", "/help")
    pub fn command<T: Display>(text: T) -> String {
        paint(text, |t| t.green().to_string())
    }

    /// Speaker tag for the coach's messages
    pub fn bot<T: Display>(text: T) -> String {
        paint(text, |t| t.magenta().bold().to_string())
    }

    /// Speaker tag for the user's messages
    pub fn user<T: Display>(text: T) -> String {
        paint(text, |t| t.blue().bold().to_string())
    }

    pub fn version<T: Display>(text: T) -> String {
        paint(text, |t| t.dimmed().to_string())
    }
}

fn paint<T: Display>(text: T, styled: impl FnOnce(&T) -> String) -> String {
    if output::is_no_color() {
        text.to_string()
    } else {
        styled(&text)
    }
}
