use clap::{Parser, Subcommand};

use crate::config::ResolveOptions;

#[derive(Parser, Debug)]
#[command(name = "coach")]
#[command(about = "Chat with your career coach from the terminal")]
#[command(version)]
pub struct Args {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Suppress status messages and the typing indicator
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log debug diagnostics to stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Where to reach the coach and who is talking.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Employee ID to chat as (e.g., EMP-20001)
    #[arg(short = 'e', long = "employee", global = true)]
    pub employee: Option<String>,

    /// Assistant backend URL
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    #[arg(long = "timeout", global = true)]
    pub timeout: Option<u64>,
}

impl From<ConnectionArgs> for ResolveOptions {
    fn from(args: ConnectionArgs) -> Self {
        Self {
            endpoint: args.endpoint,
            employee_id: args.employee,
            timeout_secs: args.timeout,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Interactive chat with the coach (default)
    Chat,
    /// Ask a single question and print the coach's reply
    Ask {
        /// The question (reads from --file or stdin if omitted)
        text: Option<String>,

        /// Read the question from a file
        #[arg(short = 'f', long)]
        file: Option<String>,
    },
    /// Configure coach defaults
    Configure {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}
