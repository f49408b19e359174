use serde::{Deserialize, Serialize};

pub const DEFAULT_HISTORY_CAPACITY: usize = 20;
pub const DEFAULT_METRICS_WINDOW: usize = 10;
pub const ENV_HISTORY_CAPACITY: &str = "CADENCE_HISTORY_CAPACITY";
pub const ENV_METRICS_WINDOW: &str = "CADENCE_METRICS_WINDOW";

/// Bounds for the rhythm tracker's rolling utterance history.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Utterances retained; older ones are evicted first.
    pub history_capacity: usize,
    /// Most recent utterances considered when computing metrics.
    pub metrics_window: usize,
}

impl TrackerConfig {
    pub fn new(history_capacity: usize, metrics_window: usize) -> Result<Self, ConfigError> {
        if history_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if metrics_window == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        if metrics_window > history_capacity {
            return Err(ConfigError::WindowExceedsCapacity {
                window: metrics_window,
                capacity: history_capacity,
            });
        }
        Ok(Self {
            history_capacity,
            metrics_window,
        })
    }

    /// CLI values win over the environment, which wins over the defaults.
    pub fn resolve(
        cli_capacity: Option<usize>,
        cli_window: Option<usize>,
        env: &impl Env,
    ) -> Result<Self, ConfigError> {
        let capacity = resolve_usize_with_default(
            cli_capacity,
            ENV_HISTORY_CAPACITY,
            env,
            DEFAULT_HISTORY_CAPACITY,
        )?;
        let window = resolve_usize_with_default(
            cli_window,
            ENV_METRICS_WINDOW,
            env,
            DEFAULT_METRICS_WINDOW,
        )?;
        Self::new(capacity, window)
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            metrics_window: DEFAULT_METRICS_WINDOW,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("history capacity must be > 0")]
    ZeroCapacity,
    #[error("metrics window must be > 0")]
    ZeroWindow,
    #[error("metrics window ({window}) must not exceed history capacity ({capacity})")]
    WindowExceedsCapacity { window: usize, capacity: usize },
    #[error("{key} must be a non-negative integer, got {value:?}")]
    InvalidNumber { key: String, value: String },
}

pub trait Env {
    fn var(&self, key: &str) -> Option<String>;
}

#[derive(Clone, Debug, Default)]
pub struct StdEnv;

impl Env for StdEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Clone, Debug, Default)]
pub struct MapEnv {
    vars: std::collections::BTreeMap<String, String>,
}

impl MapEnv {
    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_owned(), value.to_owned());
        self
    }
}

impl Env for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

pub fn resolve_usize_with_default(
    cli_value: Option<usize>,
    env_key: &str,
    env: &impl Env,
    default: usize,
) -> Result<usize, ConfigError> {
    match cli_value {
        Some(v) => Ok(v),
        None => match env.var(env_key) {
            Some(raw) => {
                let parsed = raw.trim().parse::<usize>();
                parsed.map_err(|_| ConfigError::InvalidNumber {
                    key: env_key.to_owned(),
                    value: raw,
                })
            }
            None => Ok(default),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_bounds() {
        let cfg = TrackerConfig::default();
        assert_eq!(cfg.history_capacity, 20);
        assert_eq!(cfg.metrics_window, 10);
        assert_eq!(TrackerConfig::new(20, 10), Ok(cfg));
    }

    #[test]
    fn new_rejects_invalid_bounds() {
        assert_eq!(TrackerConfig::new(0, 1), Err(ConfigError::ZeroCapacity));
        assert_eq!(TrackerConfig::new(5, 0), Err(ConfigError::ZeroWindow));
        assert_eq!(
            TrackerConfig::new(5, 6),
            Err(ConfigError::WindowExceedsCapacity {
                window: 6,
                capacity: 5
            })
        );
    }

    #[test]
    fn cli_takes_precedence_over_env() {
        let env = MapEnv::default().with_var(ENV_HISTORY_CAPACITY, "40");
        let v = resolve_usize_with_default(Some(30), ENV_HISTORY_CAPACITY, &env, 20)
            .expect("valid");
        assert_eq!(v, 30);
    }

    #[test]
    fn env_used_when_cli_missing() {
        let env = MapEnv::default().with_var(ENV_METRICS_WINDOW, " 8 ");
        let v = resolve_usize_with_default(None, ENV_METRICS_WINDOW, &env, 10).expect("valid");
        assert_eq!(v, 8);
    }

    #[test]
    fn default_used_when_both_missing() {
        let cfg = TrackerConfig::resolve(None, None, &MapEnv::default()).expect("valid");
        assert_eq!(cfg, TrackerConfig::default());
    }

    #[test]
    fn unparsable_env_value_is_an_error() {
        let env = MapEnv::default().with_var(ENV_HISTORY_CAPACITY, "lots");
        let err = TrackerConfig::resolve(None, None, &env).expect_err("invalid");
        assert_eq!(
            err,
            ConfigError::InvalidNumber {
                key: ENV_HISTORY_CAPACITY.to_owned(),
                value: "lots".to_owned(),
            }
        );
    }
}
