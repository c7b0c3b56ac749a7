//! Client configuration.

/// Environment variable read by [`Config::from_env`].
pub const DEFAULT_URL_ENV: &str = "RESTMODEL_DEFAULT_URL";

/// Settings shared by every adapter of a registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the shared default connection.
    pub default_url: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL of the shared default connection.
    pub fn default_url(mut self, url: impl Into<String>) -> Self {
        self.default_url = Some(url.into());
        self
    }

    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            default_url: lookup(DEFAULT_URL_ENV)
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty()),
        }
    }
}
