//! Environment configuration for rendering and logging.

use std::env;

pub const WRITE_LOG_ENV_VAR: &str = "MILLION_CHAT_LOG";
pub const NO_COLOR_ENV_VAR: &str = "MILLION_CHAT_NO_COLOR";
pub const COLUMNS_ENV_VAR: &str = "COLUMNS";
pub const ROWS_ENV_VAR: &str = "LINES";

const DEFAULT_COLUMNS: usize = 80;
const DEFAULT_ROWS: usize = 24;

#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub write_log: Option<String>,
    pub no_color: bool,
    pub columns: usize,
    pub rows: usize,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            write_log: env_string_opt(WRITE_LOG_ENV_VAR),
            no_color: env_flag(NO_COLOR_ENV_VAR),
            columns: env_dimension(COLUMNS_ENV_VAR).unwrap_or(DEFAULT_COLUMNS),
            rows: env_dimension(ROWS_ENV_VAR).unwrap_or(DEFAULT_ROWS),
        }
    }
}

fn env_dimension(key: &str) -> Option<usize> {
    env_string_opt(key)
        .and_then(|value| value.trim().parse().ok())
        .filter(|value| *value > 0)
}

pub fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

pub fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}
