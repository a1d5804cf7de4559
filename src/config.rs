//! Store configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `QUILL_API_URL` - Base URL of the blog API (e.g. `https://blog.example.com/api`)
//!
//! ## Optional
//! - `QUILL_API_TIMEOUT_SECS` - Request timeout in seconds (default: 30)
//! - `QUILL_FETCH_POLICY` - `replace` or `merge` (default: `replace`)
//! - `QUILL_SEED_POSTS` - Start from the mock posts (default: `true`)

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// How a full post fetch is applied to the local collection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FetchPolicy {
    /// Replace the collection with exactly what the server returned.
    /// Posts created locally but missing from the response are dropped.
    #[default]
    Replace,
    /// Upsert the returned posts by id and keep everything else.
    MergeById,
}

impl FromStr for FetchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace" => Ok(Self::Replace),
            "merge" | "merge-by-id" => Ok(Self::MergeById),
            other => Err(format!("unknown fetch policy `{other}`")),
        }
    }
}

/// Where and how to reach the blog API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteConfig {
    base_url: Url,
    timeout: Duration,
}

impl RemoteConfig {
    /// Endpoints are resolved relative to `base_url`; a missing trailing
    /// slash is added so `https://host/api` resolves `posts` to `/api/posts`.
    pub fn new(mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Full store configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    pub remote: RemoteConfig,
    pub fetch_policy: FetchPolicy,
    pub seed_posts: bool,
}

impl StoreConfig {
    pub fn new(remote: RemoteConfig) -> Self {
        Self {
            remote,
            fetch_policy: FetchPolicy::default(),
            seed_posts: true,
        }
    }

    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns error if `QUILL_API_URL` is missing or any variable is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns error if `QUILL_API_URL` is missing or any variable is malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup("QUILL_API_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("QUILL_API_URL".to_string()))?;
        let base_url = Url::parse(&raw_url)
            .map_err(|e| ConfigError::InvalidEnvVar("QUILL_API_URL".to_string(), e.to_string()))?;

        let mut remote = RemoteConfig::new(base_url);
        if let Some(secs) = parse_var::<u64, _>(&lookup, "QUILL_API_TIMEOUT_SECS")? {
            remote = remote.with_timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            remote,
            fetch_policy: parse_var(&lookup, "QUILL_FETCH_POLICY")?.unwrap_or_default(),
            seed_posts: parse_var(&lookup, "QUILL_SEED_POSTS")?.unwrap_or(true),
        })
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(name.to_string(), e.to_string()))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_only_url_is_set() {
        let config =
            StoreConfig::from_lookup(lookup(&[("QUILL_API_URL", "http://localhost:8080")]))
                .unwrap();

        assert_eq!(config.remote.base_url().as_str(), "http://localhost:8080/");
        assert_eq!(config.remote.timeout(), Duration::from_secs(30));
        assert_eq!(config.fetch_policy, FetchPolicy::Replace);
        assert!(config.seed_posts);
    }

    #[test]
    fn reads_every_variable() {
        let config = StoreConfig::from_lookup(lookup(&[
            ("QUILL_API_URL", "https://blog.example.com/api"),
            ("QUILL_API_TIMEOUT_SECS", "5"),
            ("QUILL_FETCH_POLICY", "Merge"),
            ("QUILL_SEED_POSTS", "false"),
        ]))
        .unwrap();

        assert_eq!(config.remote.base_url().as_str(), "https://blog.example.com/api/");
        assert_eq!(config.remote.timeout(), Duration::from_secs(5));
        assert_eq!(config.fetch_policy, FetchPolicy::MergeById);
        assert!(!config.seed_posts);
    }

    #[test]
    fn missing_url_is_an_error() {
        let err = StoreConfig::from_lookup(lookup(&[])).unwrap_err();

        assert!(matches!(err, ConfigError::MissingEnvVar(ref name) if name == "QUILL_API_URL"));
    }

    #[test]
    fn malformed_values_are_rejected() {
        let err = StoreConfig::from_lookup(lookup(&[
            ("QUILL_API_URL", "http://localhost"),
            ("QUILL_FETCH_POLICY", "sometimes"),
        ]))
        .unwrap_err();

        assert!(matches!(err, ConfigError::InvalidEnvVar(ref name, _) if name == "QUILL_FETCH_POLICY"));

        let err = StoreConfig::from_lookup(lookup(&[("QUILL_API_URL", "not a url")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(..)));
    }
}
