//! Chat mode UI components.

use crate::config::ResolvedConfig;
use crate::conversation::SessionSnapshot;
use crate::ui::Style;

use super::command::SLASH_COMMANDS;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn print_header(config: &ResolvedConfig) {
    println!(
        "{} {} - Career Coach",
        Style::header("coach"),
        Style::version(format!("v{VERSION}"))
    );
    if !config.employee_id.is_empty() {
        println!(
            "{} {}",
            Style::label("Chatting as"),
            Style::value(&config.employee_id)
        );
    }
    println!();
}

pub fn print_goodbye() {
    println!("{}", Style::success("Goodbye!"));
}

pub fn print_config(config: &ResolvedConfig) {
    println!("{}", Style::header("Configuration"));
    println!(
        "  {}  {}",
        Style::label("employee"),
        Style::value(&config.employee_id)
    );
    println!(
        "  {}  {}",
        Style::label("endpoint"),
        Style::secondary(&config.endpoint)
    );
    println!(
        "  {}   {}",
        Style::label("timeout"),
        Style::value(format!("{}s", config.timeout.as_secs()))
    );
    println!(
        "  {}   {}",
        Style::label("api key"),
        Style::secondary(if config.api_key.is_some() {
            "(set)"
        } else {
            "(not set)"
        })
    );
    println!();
}

pub fn print_state(snapshot: &SessionSnapshot) {
    println!("{}", Style::header("Conversation"));
    println!(
        "  {}     {}",
        Style::label("phase"),
        Style::value(snapshot.phase)
    );
    println!(
        "  {}     {}",
        Style::label("state"),
        Style::value(&snapshot.state)
    );
    println!(
        "  {}  {}",
        Style::label("messages"),
        Style::value(snapshot.transcript.len())
    );
    println!();
}

pub fn print_help() {
    println!("{}", Style::header("Available commands"));
    for (cmd, description) in SLASH_COMMANDS {
        println!(
            "  {}  {}",
            Style::command(format!("{cmd:<8}")),
            Style::secondary(description)
        );
    }
    println!();
}

pub fn print_unavailable_hint() {
    eprintln!(
        "{} Set an employee ID with --employee <ID>, the COACH_EMPLOYEE_ID \
         environment variable, or 'coach configure'.",
        Style::warning("Hint:")
    );
}

pub fn print_error(message: &str) {
    eprintln!("{} {message}", Style::error("Error:"));
    eprintln!();
}
