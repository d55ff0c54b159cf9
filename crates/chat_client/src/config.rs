//! Client settings read from the environment.

use std::env;
use std::path::PathBuf;

use million_chat::config::env_string_opt;

use crate::persona::Persona;
use crate::providers::DEFAULT_PROVIDER_ID;

pub const HOME_ENV_VAR: &str = "MILLION_CHAT_HOME";
pub const PERSONA_ENV_VAR: &str = "MILLION_CHAT_PERSONA";
pub const ACCESS_SECRET_ENV_VAR: &str = "MILLION_CHAT_ACCESS_SECRET";
pub const PROVIDER_ENV_VAR: &str = "MILLION_CHAT_PROVIDER";

const HOME_DIR_NAME: &str = ".million_chat";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub home: PathBuf,
    pub persona: Persona,
    pub access_secret: Option<String>,
    pub provider_id: String,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let persona = match env_string_opt(PERSONA_ENV_VAR) {
            Some(value) => Persona::from_id(&value).unwrap_or_else(|| {
                tracing::warn!(persona = %value, "unknown persona; using default");
                Persona::default()
            }),
            None => Persona::default(),
        };

        Self {
            home: env_string_opt(HOME_ENV_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(default_home),
            persona,
            access_secret: env_string_opt(ACCESS_SECRET_ENV_VAR),
            provider_id: env_string_opt(PROVIDER_ENV_VAR)
                .map(|value| value.trim().to_string())
                .unwrap_or_else(|| DEFAULT_PROVIDER_ID.to_string()),
        }
    }
}

fn default_home() -> PathBuf {
    env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(|home| PathBuf::from(home).join(HOME_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(HOME_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, OnceLock};

    use super::*;

    struct EnvGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(value) = &self.previous {
                env::set_var(self.key, value);
            } else {
                env::remove_var(self.key);
            }
        }
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
            .lock()
            .expect("env lock poisoned")
    }

    fn set_env_guard(key: &'static str, value: Option<&str>) -> EnvGuard {
        let previous = env::var(key).ok();
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
        EnvGuard { key, previous }
    }

    #[test]
    fn env_defaults() {
        let _lock = env_lock();
        let _g1 = set_env_guard(HOME_ENV_VAR, None);
        let _g2 = set_env_guard(PERSONA_ENV_VAR, None);
        let _g3 = set_env_guard(ACCESS_SECRET_ENV_VAR, None);
        let _g4 = set_env_guard(PROVIDER_ENV_VAR, None);
        let _g5 = set_env_guard("HOME", Some("/home/tester"));

        let config = ClientConfig::from_env();
        assert_eq!(config.home, PathBuf::from("/home/tester/.million_chat"));
        assert_eq!(config.persona, Persona::Hacker);
        assert_eq!(config.access_secret, None);
        assert_eq!(config.provider_id, DEFAULT_PROVIDER_ID);
    }

    #[test]
    fn env_values_are_applied() {
        let _lock = env_lock();
        let _g1 = set_env_guard(HOME_ENV_VAR, Some("/data/chat"));
        let _g2 = set_env_guard(PERSONA_ENV_VAR, Some("modern"));
        let _g3 = set_env_guard(ACCESS_SECRET_ENV_VAR, Some("s3cret"));
        let _g4 = set_env_guard(PROVIDER_ENV_VAR, Some(" mock "));

        let config = ClientConfig::from_env();
        assert_eq!(config.home, PathBuf::from("/data/chat"));
        assert_eq!(config.persona, Persona::Modern);
        assert_eq!(config.access_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.provider_id, "mock");
    }

    #[test]
    fn unknown_persona_falls_back_to_default() {
        let _lock = env_lock();
        let _g1 = set_env_guard(PERSONA_ENV_VAR, Some("pirate"));
        assert_eq!(ClientConfig::from_env().persona, Persona::Hacker);
    }
}
