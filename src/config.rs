//! Environment configuration.

use std::env;

use crate::session::SessionOptions;

pub const KEEP_OTHER_TITLES_ENV: &str = "ACP_TRANSCRIPT_KEEP_OTHER_TITLES";
pub const LOG_FILTER_ENV: &str = "ACP_TRANSCRIPT_LOG";

#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub keep_other_titles: bool,
    pub log_filter: Option<String>,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            keep_other_titles: env_flag(KEEP_OTHER_TITLES_ENV),
            log_filter: env_string_opt(LOG_FILTER_ENV),
        }
    }

    #[must_use]
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            derive_other_titles: !self.keep_other_titles,
        }
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::{EnvConfig, KEEP_OTHER_TITLES_ENV, LOG_FILTER_ENV};
    use std::env;
    use std::sync::{Mutex, OnceLock};

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
    fn defaults_derive_other_titles_without_log_filter() {
        let _lock = env_lock();
        let _g1 = set_env_guard(KEEP_OTHER_TITLES_ENV, None);
        let _g2 = set_env_guard(LOG_FILTER_ENV, None);

        let config = EnvConfig::from_env();
        assert!(!config.keep_other_titles);
        assert!(config.log_filter.is_none());
        assert!(config.session_options().derive_other_titles);
    }

    #[test]
    fn flag_set_to_one_keeps_host_titles() {
        let _lock = env_lock();
        let _g1 = set_env_guard(KEEP_OTHER_TITLES_ENV, Some("1"));
        let _g2 = set_env_guard(LOG_FILTER_ENV, Some("acp_transcript=debug"));

        let config = EnvConfig::from_env();
        assert!(config.keep_other_titles);
        assert_eq!(config.log_filter.as_deref(), Some("acp_transcript=debug"));
        assert!(!config.session_options().derive_other_titles);
    }

    #[test]
    fn other_flag_values_and_blank_filter_are_ignored() {
        let _lock = env_lock();
        let _g1 = set_env_guard(KEEP_OTHER_TITLES_ENV, Some("true"));
        let _g2 = set_env_guard(LOG_FILTER_ENV, Some("   "));

        let config = EnvConfig::from_env();
        assert!(!config.keep_other_titles);
        assert!(config.log_filter.is_none());
    }
}
