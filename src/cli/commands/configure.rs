//! Configure command handler for editing default settings.

use anyhow::{Result, bail};
use inquire::validator::Validation;
use inquire::{CustomType, InquireError, Text};

use crate::config::{
    CoachConfig, ConfigFile, ConfigManager, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS,
    parse_endpoint,
};
use crate::ui::{Style, is_prompt_cancelled};

/// Runs the configure command.
///
/// With `show`, prints the current defaults; otherwise prompts for the
/// endpoint, employee ID and timeout and saves them.
pub fn run_configure(show: bool) -> Result<()> {
    if show {
        let manager = ConfigManager::new()?;
        let config = manager.load_or_default()?;
        print_current_defaults(&config);
        println!(
            "{} {}",
            Style::label("file"),
            Style::secondary(manager.config_path().display())
        );
        return Ok(());
    }

    keep_defaults_on_cancel(edit_defaults())
}

/// Leaving a prompt early abandons the edit without saving; it is not an error.
fn keep_defaults_on_cancel(result: Result<()>) -> Result<()> {
    match result {
        Err(err)
            if err
                .downcast_ref::<InquireError>()
                .is_some_and(is_prompt_cancelled) =>
        {
            println!();
            println!("{}", Style::secondary("Configuration unchanged."));
            Ok(())
        }
        other => other,
    }
}

fn edit_defaults() -> Result<()> {
    let manager = ConfigManager::new()?;
    let mut config = manager.load_or_default()?;

    print_current_defaults(&config);

    let endpoint = prompt_endpoint(config.coach.endpoint.as_deref())?;
    let employee_id = prompt_employee_id(config.coach.employee_id.as_deref())?;
    let timeout_secs = prompt_timeout(config.coach.timeout_secs)?;

    config.coach = CoachConfig {
        endpoint: Some(endpoint),
        employee_id: Some(employee_id),
        timeout_secs: Some(timeout_secs),
        ..config.coach
    };

    manager.save(&config)?;

    println!();
    println!(
        "{} Configuration saved to {}",
        Style::success("✓"),
        Style::secondary(manager.config_path().display().to_string())
    );

    Ok(())
}

fn print_current_defaults(config: &ConfigFile) {
    let not_set = || Style::secondary("(not set)");

    println!("{}", Style::header("Current defaults"));
    println!(
        "  {}     {}",
        Style::label("endpoint"),
        config
            .coach
            .endpoint
            .as_deref()
            .map_or_else(not_set, Style::value)
    );
    println!(
        "  {}  {}",
        Style::label("employee_id"),
        config
            .coach
            .employee_id
            .as_deref()
            .map_or_else(not_set, Style::value)
    );
    println!(
        "  {} {}",
        Style::label("timeout_secs"),
        config
            .coach
            .timeout_secs
            .map_or_else(not_set, Style::value)
    );
    println!(
        "  {}  {}",
        Style::label("api_key_env"),
        config
            .coach
            .api_key_env
            .as_deref()
            .map_or_else(not_set, Style::value)
    );
    println!();
}

fn prompt_endpoint(default: Option<&str>) -> Result<String> {
    let endpoint = Text::new("Coach endpoint:")
        .with_default(default.unwrap_or(DEFAULT_ENDPOINT))
        .with_validator(|input: &str| {
            Ok(match parse_endpoint(input) {
                Ok(_) => Validation::Valid,
                Err(_) => Validation::Invalid("Enter an http(s) URL".into()),
            })
        })
        .prompt()?;

    Ok(endpoint.trim().to_string())
}

fn prompt_employee_id(default: Option<&str>) -> Result<String> {
    let mut prompt = Text::new("Employee ID:").with_help_message("e.g., EMP-20001");

    if let Some(d) = default {
        prompt = prompt.with_default(d);
    }

    let employee_id = prompt.prompt()?;

    if employee_id.trim().is_empty() {
        bail!("Employee ID cannot be empty");
    }

    Ok(employee_id.trim().to_string())
}

fn prompt_timeout(default: Option<u64>) -> Result<u64> {
    let timeout = CustomType::<u64>::new("Request timeout (seconds):")
        .with_default(default.unwrap_or(DEFAULT_TIMEOUT_SECS))
        .with_error_message("Enter a whole number of seconds")
        .with_validator(|secs: &u64| {
            Ok(if *secs == 0 {
                Validation::Invalid("Timeout must be greater than zero".into())
            } else {
                Validation::Valid
            })
        })
        .prompt()?;

    Ok(timeout)
}
