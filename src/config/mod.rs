//! Configuration file management and resolution.

mod manager;

pub use manager::{
    CoachConfig, ConfigFile, ConfigManager, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS,
    EMPLOYEE_ID_ENV, ENDPOINT_ENV, ResolveOptions, ResolvedConfig, parse_endpoint,
    resolve_config,
};
