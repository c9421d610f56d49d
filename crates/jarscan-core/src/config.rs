//! Scan configuration.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// User Agent string for remote fetches
pub const USER_AGENT: &str = concat!("jarscan-core/", env!("CARGO_PKG_VERSION"));

/// How nested archives reached from a random-access layer are traversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NestedMode {
    /// Copy the nested archive to memory or a temp file and traverse it with
    /// random access. Matched members get lazily opened content.
    #[default]
    Materialize,
    /// Traverse the nested archive forward-only out of its enclosing member.
    Stream,
}

impl FromStr for NestedMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "materialize" => Ok(Self::Materialize),
            "stream" => Ok(Self::Stream),
            other => Err(format!("unknown nested mode '{other}'")),
        }
    }
}

/// What a scan does when a remote location cannot be connected to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RemotePolicy {
    /// Report a storage-access failure.
    #[default]
    Fail,
    /// Treat the unit as empty: every result set is returned empty.
    BestEffort,
}

impl FromStr for RemotePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail" => Ok(Self::Fail),
            "best-effort" | "best_effort" => Ok(Self::BestEffort),
            other => Err(format!("unknown remote policy '{other}'")),
        }
    }
}

/// Knobs for a scan. Every scan owns its own copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ScanConfig {
    /// Traversal mode for nested archives inside random-access layers.
    pub nested_mode: NestedMode,
    /// Nested archives up to this uncompressed size are materialized in
    /// memory; larger ones are spooled to a temporary file.
    pub max_in_memory_bytes: u64,
    /// Behavior when a remote location is unreachable.
    pub remote_policy: RemotePolicy,
    /// Connect timeout for remote locations, in seconds.
    pub connect_timeout_secs: u64,
    /// User agent sent with remote requests.
    pub user_agent: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            nested_mode: NestedMode::default(),
            max_in_memory_bytes: 8 * 1024 * 1024,
            remote_policy: RemotePolicy::default(),
            connect_timeout_secs: 10,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl ScanConfig {
    /// Load configuration from environment variables, falling back to defaults.
    ///
    /// Recognized: `JARSCAN_NESTED_MODE`, `JARSCAN_MAX_IN_MEMORY_BYTES`,
    /// `JARSCAN_REMOTE_POLICY`, `JARSCAN_CONNECT_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup("JARSCAN_NESTED_MODE") {
            match v.parse() {
                Ok(mode) => config.nested_mode = mode,
                Err(e) => tracing::warn!("Ignoring JARSCAN_NESTED_MODE: {e}"),
            }
        }
        if let Some(v) = lookup("JARSCAN_MAX_IN_MEMORY_BYTES") {
            match v.trim().parse() {
                Ok(bytes) => config.max_in_memory_bytes = bytes,
                Err(e) => tracing::warn!("Ignoring JARSCAN_MAX_IN_MEMORY_BYTES: {e}"),
            }
        }
        if let Some(v) = lookup("JARSCAN_REMOTE_POLICY") {
            match v.parse() {
                Ok(policy) => config.remote_policy = policy,
                Err(e) => tracing::warn!("Ignoring JARSCAN_REMOTE_POLICY: {e}"),
            }
        }
        if let Some(v) = lookup("JARSCAN_CONNECT_TIMEOUT_SECS") {
            match v.trim().parse() {
                Ok(secs) => config.connect_timeout_secs = secs,
                Err(e) => tracing::warn!("Ignoring JARSCAN_CONNECT_TIMEOUT_SECS: {e}"),
            }
        }

        config
    }

    /// Connect timeout as a [`Duration`].
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
