use anyhow::Result;
use inquire::Text;
use inquire::ui::{Attributes, Color, RenderConfig, StyleSheet, Styled};
use std::io;
use std::sync::Arc;

use super::command::{Input, SlashCommand, SlashCommandCompleter, parse_input};
use super::ui;
use super::view::TranscriptView;
use crate::assistant::AssistantClient;
use crate::config::ResolvedConfig;
use crate::conversation::{ConversationSession, PendingExchange, Phase};
use crate::ui::{Spinner, is_prompt_cancelled};

/// Interactive terminal chat with the career coach.
///
/// Hosts one [`ConversationSession`] for the configured employee and renders
/// its transcript as it changes.
pub struct ChatSession {
    config: ResolvedConfig,
    conversation: ConversationSession<AssistantClient>,
    view: TranscriptView,
}

impl ChatSession {
    pub fn new(config: ResolvedConfig) -> Result<Self> {
        let client = AssistantClient::new(&config.endpoint, config.timeout, config.api_key.clone())?;
        let conversation = ConversationSession::new(config.employee_id.clone(), Arc::new(client));
        let view = TranscriptView::new(conversation.subscribe(), false);

        Ok(Self {
            config,
            conversation,
            view,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        ui::print_header(&self.config);

        let greeting = self.conversation.begin_initialize();
        self.drive(greeting).await?;

        if self.conversation.snapshot().phase == Phase::Unavailable {
            ui::print_unavailable_hint();
            return Ok(());
        }

        let prompt_style = Styled::new("❯")
            .with_fg(Color::LightBlue)
            .with_attr(Attributes::BOLD);
        let mut render_config = RenderConfig::default()
            .with_prompt_prefix(prompt_style)
            .with_answered_prompt_prefix(prompt_style);
        render_config.option = StyleSheet::new().with_fg(Color::Grey);
        render_config.selected_option = Some(StyleSheet::new().with_fg(Color::DarkMagenta));

        loop {
            let input = Text::new("")
                .with_render_config(render_config)
                .with_autocomplete(SlashCommandCompleter)
                .with_placeholder("Ask about skills or roles...")
                .with_help_message("/help for commands, Ctrl+C to quit")
                .prompt();

            match input {
                Ok(line) => match parse_input(&line) {
                    Input::Empty => {}
                    Input::Command(cmd) => {
                        if !self.handle_command(cmd)? {
                            break;
                        }
                    }
                    Input::Text(text) => {
                        let turn = self.conversation.begin_turn(&text);
                        self.drive(turn).await?;
                    }
                },
                Err(e) if is_prompt_cancelled(&e) => {
                    println!();
                    break;
                }
                Err(e) => return Err(e.into()),
            }
        }

        ui::print_goodbye();
        Ok(())
    }

    /// Waits for an exchange (if one was dispatched) and renders what changed.
    async fn drive(&mut self, exchange: Option<PendingExchange<AssistantClient>>) -> Result<()> {
        if let Some(exchange) = exchange {
            let spinner = self
                .view
                .is_pending()
                .then(|| Spinner::new("Coach is typing..."));
            exchange.complete().await;
            if let Some(spinner) = spinner {
                spinner.stop();
            }
        }

        self.view.render_new(&mut io::stdout().lock())?;
        println!();
        Ok(())
    }

    fn handle_command(&self, cmd: SlashCommand) -> Result<bool> {
        match cmd {
            SlashCommand::Config => ui::print_config(&self.config),
            SlashCommand::Help => ui::print_help(),
            SlashCommand::History => {
                self.view.render_all(&mut io::stdout().lock())?;
                println!();
            }
            SlashCommand::State => ui::print_state(&self.conversation.snapshot()),
            SlashCommand::Quit => return Ok(false),
            SlashCommand::Unknown(cmd) => ui::print_error(&format!("Unknown command: /{cmd}")),
        }
        Ok(true)
    }
}
