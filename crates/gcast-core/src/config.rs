use std::time::Duration;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{BroadcastError, Result};

pub const DEFAULT_BATCH_SIZE: usize = 20;
pub const DEFAULT_INTER_BATCH_DELAY_MS: u64 = 1_000;
pub const DEFAULT_MAX_RATE_LIMIT_RETRIES: u32 = 5;
pub const DEFAULT_CONCURRENCY: usize = 1;

/// Top-level config (gcast.toml + GCAST_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GcastConfig {
    #[serde(default)]
    pub dispatch: DispatchConfig,
    pub telegram: Option<TelegramConfig>,
}

/// Tuning knobs for the dispatch engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Recipients per batch (default: 20).
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause between consecutive batches in milliseconds (default: 1000).
    #[serde(default = "default_inter_batch_delay_ms")]
    pub inter_batch_delay_ms: u64,

    /// Rate-limit retries allowed per recipient before it is counted as failed.
    #[serde(default = "default_max_rate_limit_retries")]
    pub max_rate_limit_retries: u32,

    /// When true, `max_rate_limit_retries` is ignored and the transport's
    /// reported wait is trusted indefinitely.
    #[serde(default)]
    pub unbounded_retries: bool,

    /// Recipients of the same batch that may be in flight at once (default: 1).
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Also pause after the last batch. Off by default, so N batches incur N-1 pauses.
    #[serde(default)]
    pub pause_after_final_batch: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            inter_batch_delay_ms: DEFAULT_INTER_BATCH_DELAY_MS,
            max_rate_limit_retries: DEFAULT_MAX_RATE_LIMIT_RETRIES,
            unbounded_retries: false,
            concurrency: DEFAULT_CONCURRENCY,
            pause_after_final_batch: false,
        }
    }
}

impl DispatchConfig {
    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(BroadcastError::InvalidArgument(
                "dispatch.batch_size must be at least 1".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(BroadcastError::InvalidArgument(
                "dispatch.concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn inter_batch_delay(&self) -> Duration {
        Duration::from_millis(self.inter_batch_delay_ms)
    }

    /// Maximum rate-limit retries per recipient, `None` when unbounded.
    pub fn retry_cap(&self) -> Option<u32> {
        if self.unbounded_retries {
            None
        } else {
            Some(self.max_rate_limit_retries)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}
fn default_inter_batch_delay_ms() -> u64 {
    DEFAULT_INTER_BATCH_DELAY_MS
}
fn default_max_rate_limit_retries() -> u32 {
    DEFAULT_MAX_RATE_LIMIT_RETRIES
}
fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

impl GcastConfig {
    /// Load config from a TOML file with GCAST_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. `GCAST_CONFIG` env var
    ///   3. ~/.gcast/gcast.toml
    ///
    /// Nested keys use a double underscore: `GCAST_DISPATCH__BATCH_SIZE=50`.
    /// A missing file is not an error; defaults apply.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let path = config_path
            .map(String::from)
            .or_else(|| std::env::var("GCAST_CONFIG").ok())
            .unwrap_or_else(default_config_path);
        tracing::debug!(path = %path, "loading gcast config");

        let config: GcastConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("GCAST_").ignore(&["CONFIG"]).split("__"))
            .extract()
            .map_err(|e| BroadcastError::Config(e.to_string()))?;

        config.dispatch.validate()?;
        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.gcast/gcast.toml", home)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = DispatchConfig::default();
        assert_eq!(cfg.batch_size, 20);
        assert_eq!(cfg.inter_batch_delay(), Duration::from_secs(1));
        assert_eq!(cfg.retry_cap(), Some(5));
        assert_eq!(cfg.concurrency, 1);
        assert!(!cfg.pause_after_final_batch);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn unbounded_retries_removes_cap() {
        let cfg = DispatchConfig {
            unbounded_retries: true,
            ..DispatchConfig::default()
        };
        assert_eq!(cfg.retry_cap(), None);
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let cfg = DispatchConfig {
            batch_size: 0,
            ..DispatchConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.code(), "INVALID_ARGUMENT");
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let cfg = DispatchConfig {
            concurrency: 0,
            ..DispatchConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn load_reads_toml_and_env_overrides() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "gcast.toml",
                r#"
                [dispatch]
                batch_size = 50
                inter_batch_delay_ms = 250

                [telegram]
                bot_token = "123:abc"
                "#,
            )?;
            jail.set_env("GCAST_DISPATCH__CONCURRENCY", "4");

            let cfg = GcastConfig::load(Some("gcast.toml")).expect("config loads");
            assert_eq!(cfg.dispatch.batch_size, 50);
            assert_eq!(cfg.dispatch.inter_batch_delay_ms, 250);
            assert_eq!(cfg.dispatch.concurrency, 4);
            assert_eq!(cfg.dispatch.max_rate_limit_retries, 5);
            assert_eq!(cfg.telegram.map(|t| t.bot_token).as_deref(), Some("123:abc"));
            Ok(())
        });
    }

    #[test]
    fn load_without_file_uses_defaults() {
        Jail::expect_with(|_jail| {
            let cfg = GcastConfig::load(Some("missing.toml")).expect("defaults apply");
            assert_eq!(cfg.dispatch, DispatchConfig::default());
            assert!(cfg.telegram.is_none());
            Ok(())
        });
    }

    #[test]
    fn load_rejects_invalid_dispatch_values() {
        Jail::expect_with(|jail| {
            jail.create_file("gcast.toml", "[dispatch]\nbatch_size = 0\n")?;
            let err = GcastConfig::load(Some("gcast.toml")).unwrap_err();
            assert_eq!(err.code(), "INVALID_ARGUMENT");
            Ok(())
        });
    }
}
