//! Configuration for the adapters, read once from the process environment.
//!
//! Everything goes through a lookup function so tests can feed a map instead
//! of mutating the real environment.

use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_USER_AGENT: &str = "tweether";
pub const DEFAULT_REDDIT_AUTH_URL: &str = "https://www.reddit.com";
pub const DEFAULT_REDDIT_API_URL: &str = "https://oauth.reddit.com";
pub const DEFAULT_TWITTER_API_URL: &str = "https://api.twitter.com";
pub const DEFAULT_MAX_ATTEMPTS: u32 = 1;
pub const DEFAULT_RETRY_BASE_MS: u64 = 2_000;
pub const DEFAULT_VENDOR_TIMEOUT_MS: u64 = 10_000;

const REDDIT_VARS: [&str; 4] = [
    "REDDIT_USER",
    "REDDIT_PASSWORD",
    "REDDIT_API_KEY",
    "REDDIT_API_SECRET",
];
const TWITTER_VARS: [&str; 4] = [
    "TWITTER_CONSUMER_KEY",
    "TWITTER_CONSUMER_SECRET",
    "TWITTER_ACCESS_TOKEN_KEY",
    "TWITTER_ACCESS_TOKEN_SECRET",
];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{adapter}: missing environment variables: {missing:?}")]
    Missing {
        adapter: &'static str,
        missing: Vec<&'static str>,
    },

    #[error("{var}: invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Credentials and endpoints for the Reddit script-app client.
#[derive(Clone, PartialEq, Eq)]
pub struct RedditConfig {
    pub username: String,
    pub password: String,
    pub app_id: String,
    pub app_secret: String,
    pub user_agent: String,
    pub auth_url: String,
    pub api_url: String,
}

/// Credentials and endpoint for the Twitter OAuth 1.0a client.
#[derive(Clone, PartialEq, Eq)]
pub struct TwitterConfig {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token_key: String,
    pub access_token_secret: String,
    pub api_url: String,
}

// Secrets stay out of logs.
impl std::fmt::Debug for RedditConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedditConfig")
            .field("username", &self.username)
            .field("user_agent", &self.user_agent)
            .field("auth_url", &self.auth_url)
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for TwitterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterConfig")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GateConfig {
    pub bind: SocketAddr,
    /// Adapter served on `POST /`; `None` lets the gate pick the only enabled one.
    pub default_adapter: Option<String>,
    pub max_attempts: u32,
    pub retry_base: Duration,
    pub vendor_timeout: Duration,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            default_adapter: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_base: Duration::from_millis(DEFAULT_RETRY_BASE_MS),
            vendor_timeout: Duration::from_millis(DEFAULT_VENDOR_TIMEOUT_MS),
        }
    }
}

/// Full adapter configuration. An adapter is enabled when all four of its
/// credentials are set; a partial set is an error.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub reddit: Option<RedditConfig>,
    pub twitter: Option<TwitterConfig>,
    pub gate: GateConfig,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // empty values count as unset
        let get = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());

        let reddit = match credentials("reddit", &REDDIT_VARS, &get)? {
            Some([username, password, app_id, app_secret]) => Some(RedditConfig {
                username,
                password,
                app_id,
                app_secret,
                user_agent: get("REDDIT_USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.into()),
                auth_url: get("REDDIT_AUTH_URL").unwrap_or_else(|| DEFAULT_REDDIT_AUTH_URL.into()),
                api_url: get("REDDIT_API_URL").unwrap_or_else(|| DEFAULT_REDDIT_API_URL.into()),
            }),
            None => None,
        };

        let twitter = match credentials("twitter", &TWITTER_VARS, &get)? {
            Some([consumer_key, consumer_secret, access_token_key, access_token_secret]) => {
                Some(TwitterConfig {
                    consumer_key,
                    consumer_secret,
                    access_token_key,
                    access_token_secret,
                    api_url: get("TWITTER_API_URL")
                        .unwrap_or_else(|| DEFAULT_TWITTER_API_URL.into()),
                })
            }
            None => None,
        };

        let mut gate = GateConfig::default();
        if let Some(bind) = get("ADAPTER_BIND") {
            gate.bind = bind.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                var: "ADAPTER_BIND",
                value: bind.clone(),
                reason: e.to_string(),
            })?;
        }
        gate.default_adapter = get("ADAPTER");
        if let Some(n) = parse_u64("ADAPTER_MAX_ATTEMPTS", &get)? {
            if n == 0 || n > u32::MAX as u64 {
                return Err(ConfigError::Invalid {
                    var: "ADAPTER_MAX_ATTEMPTS",
                    value: n.to_string(),
                    reason: "must be at least 1".into(),
                });
            }
            gate.max_attempts = n as u32;
        }
        if let Some(ms) = parse_u64("ADAPTER_RETRY_BASE_MS", &get)? {
            gate.retry_base = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_u64("ADAPTER_VENDOR_TIMEOUT_MS", &get)? {
            gate.vendor_timeout = Duration::from_millis(ms);
        }

        Ok(Self {
            reddit,
            twitter,
            gate,
        })
    }
}

fn credentials<G>(
    adapter: &'static str,
    vars: &[&'static str; 4],
    get: &G,
) -> Result<Option<[String; 4]>>
where
    G: Fn(&str) -> Option<String>,
{
    let values: Vec<Option<String>> = vars.iter().map(|v| get(v)).collect();
    let missing: Vec<&'static str> = vars
        .iter()
        .zip(&values)
        .filter(|(_, v)| v.is_none())
        .map(|(k, _)| *k)
        .collect();

    if missing.len() == vars.len() {
        return Ok(None);
    }
    if !missing.is_empty() {
        return Err(ConfigError::Missing { adapter, missing });
    }
    let mut it = values.into_iter().flatten();
    let mut next = || it.next().unwrap_or_default();
    Ok(Some([next(), next(), next(), next()]))
}

fn parse_u64<G>(var: &'static str, get: &G) -> Result<Option<u64>>
where
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| ConfigError::Invalid {
                var,
                value: raw.clone(),
                reason: e.to_string(),
            }),
    }
}
