use anyhow::Result;
use clap::Parser;

use coach_cli::cli::commands::{ask, chat, configure};
use coach_cli::cli::{Args, Command};
use coach_cli::config::ResolveOptions;
use coach_cli::input::QuestionSource;
use coach_cli::output::{self, OutputConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let defaults = OutputConfig::default();
    output::init(OutputConfig {
        quiet: args.quiet,
        no_color: args.no_color || defaults.no_color,
        verbose: args.verbose,
    });

    let connection = ResolveOptions::from(args.connection);

    match args.command {
        Some(Command::Configure { show }) => {
            configure::run_configure(show)?;
        }
        Some(Command::Ask { text, file }) => {
            let options = ask::AskOptions {
                question: QuestionSource::from_args(text, file),
                connection,
            };
            let code = ask::run_ask(options).await?;
            if code != exitcode::OK {
                std::process::exit(code);
            }
        }
        Some(Command::Chat) | None => {
            chat::run_chat(connection).await?;
        }
    }

    Ok(())
}
