use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};

use crate::error::GradebookError;

/// Prefix of every environment variable read by [`Config::load`].
pub const ENV_PREFIX: &str = "GRADEBOOK_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// sqlx SQLite URL, e.g. `sqlite:students.db`.
    pub database_url: String,
    pub listen_addr: String,
    pub loglevel: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:students.db".to_string(),
            listen_addr: "0.0.0.0:5000".to_string(),
            loglevel: "info".to_string(),
        }
    }
}

impl Config {
    /// Defaults overlaid with `GRADEBOOK_*` environment variables.
    pub fn load() -> Result<Self, GradebookError> {
        Self::figment(Figment::new().merge(Env::prefixed(ENV_PREFIX)))
    }

    /// Defaults overlaid with whatever `overrides` provides.
    pub fn figment(overrides: Figment) -> Result<Self, GradebookError> {
        let cfg = Figment::from(Serialized::defaults(Config::default()))
            .merge(overrides)
            .extract()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_overrides() {
        let cfg = Config::figment(Figment::new()).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn overrides_win_over_defaults() {
        let overrides = Figment::new()
            .merge(Serialized::default("database_url", "sqlite::memory:"))
            .merge(Serialized::default("loglevel", "debug"));
        let cfg = Config::figment(overrides).unwrap();
        assert_eq!(cfg.database_url, "sqlite::memory:");
        assert_eq!(cfg.loglevel, "debug");
        assert_eq!(cfg.listen_addr, "0.0.0.0:5000");
    }
}
