//! Server configuration.
//!
//! Everything has a working default, so `ServerConfig::default()` runs a
//! local game on `127.0.0.1:8080`. [`ServerConfig::from_env`] layers
//! `IMPOSTOR_*` environment variables on top:
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `IMPOSTOR_BIND` | listen address | `127.0.0.1:8080` |
//! | `IMPOSTOR_LINK_BASE` | prefix for shareable links | unset |
//! | `IMPOSTOR_IDLE_TIMEOUT_SECS` | drop silent connections after | `300` |
//! | `IMPOSTOR_MIN_PLAYERS` | minimum players per game, at least 4 | `4` |
//! | `IMPOSTOR_MAX_PLAYERS` | maximum players per game | `100` |
//! | `IMPOSTOR_CREW_POOL` | comma-separated crew identities | football pool |

use std::str::FromStr;
use std::time::Duration;

use impostor_roles::{DEFAULT_MIN_PLAYERS, GameConfig};
use impostor_session::RoleMessages;

use crate::ConfigError;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// Everything needed to start a server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,

    /// When set, `GameCreated` responses carry full links of the form
    /// `{link_base}/role/{token}`.
    pub link_base: Option<String>,

    /// How long a connection may stay silent before it is closed.
    pub idle_timeout: Duration,

    pub game: GameConfig,

    pub messages: RoleMessages,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            link_base: None,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            game: GameConfig::default(),
            messages: RoleMessages::default(),
        }
    }
}

impl ServerConfig {
    /// Reads `IMPOSTOR_*` variables from the process environment.
    ///
    /// # Errors
    /// [`ConfigError`] if a variable is set but can't be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = non_empty(lookup("IMPOSTOR_BIND")) {
            config.bind_addr = addr;
        }
        if let Some(base) = non_empty(lookup("IMPOSTOR_LINK_BASE")) {
            config.link_base = Some(base.trim_end_matches('/').to_string());
        }
        if let Some(secs) = parse::<u64>("IMPOSTOR_IDLE_TIMEOUT_SECS", &lookup)? {
            config.idle_timeout = Duration::from_secs(secs);
        }
        if let Some(min) = parse::<usize>("IMPOSTOR_MIN_PLAYERS", &lookup)? {
            if min < DEFAULT_MIN_PLAYERS {
                return Err(ConfigError::InvalidValue {
                    key: "IMPOSTOR_MIN_PLAYERS",
                    value: min.to_string(),
                });
            }
            config.game.min_players = min;
        }
        if let Some(max) = parse::<usize>("IMPOSTOR_MAX_PLAYERS", &lookup)? {
            config.game.max_players = Some(max);
        }
        if let Some(raw) = non_empty(lookup("IMPOSTOR_CREW_POOL")) {
            let pool: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if pool.is_empty() {
                return Err(ConfigError::EmptyCrewPool);
            }
            config.game.crew_pool = pool;
        }

        Ok(config)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse<T: FromStr>(
    key: &'static str,
    lookup: &impl Fn(&'static str) -> Option<String>,
) -> Result<Option<T>, ConfigError> {
    match non_empty(lookup(key)) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}
