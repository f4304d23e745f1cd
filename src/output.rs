//! Global output configuration and diagnostic logging.
//!
//! - The transcript goes to stdout
//! - Status messages, spinners and logs go to stderr
//! - Quiet mode suppresses status messages
//! - Colors can be disabled via flag or the `NO_COLOR` environment variable
//! - Diagnostics use `tracing`, filtered by `RUST_LOG` or `--verbose`

use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

static OUTPUT_CONFIG: OnceLock<OutputConfig> = OnceLock::new();

/// Output configuration settings.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Suppress non-essential output.
    pub quiet: bool,
    /// Disable colored output.
    pub no_color: bool,
    /// Emit debug-level diagnostics.
    pub verbose: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            quiet: false,
            // https://no-color.org/
            no_color: std::env::var_os("NO_COLOR").is_some(),
            verbose: false,
        }
    }
}

/// Initializes output settings and the diagnostic logger.
///
/// Only the first call takes effect.
pub fn init(config: OutputConfig) {
    init_logging(config.verbose);
    let _ = OUTPUT_CONFIG.set(config);
}

/// Get the current output configuration.
pub fn config() -> &'static OutputConfig {
    OUTPUT_CONFIG.get_or_init(OutputConfig::default)
}

pub fn is_quiet() -> bool {
    config().quiet
}

pub fn is_no_color() -> bool {
    config().no_color
}

/// Builds the log filter: `RUST_LOG` wins, then `--verbose`, then warnings only.
fn log_filter(verbose: bool) -> EnvFilter {
    let fallback = if verbose { "coach_cli=debug" } else { "warn" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

fn init_logging(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Print a status message to stderr (respects quiet mode).
#[macro_export]
macro_rules! status {
    ($($arg:tt)*) => {
        if !$crate::output::is_quiet() {
            eprintln!($($arg)*);
        }
    };
}
