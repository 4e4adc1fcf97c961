//! HTTP client settings.

use std::time::Duration;

/// Where the backend lives and how long to wait for it.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Scheme, host and optional port, e.g. `https://api.example.com`.
    /// A trailing slash is tolerated.
    pub base_url: String,

    /// Upper bound for a whole request, connect through body.
    ///
    /// Default: 10 seconds.
    pub request_timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Joins `path` onto the base URL without doubling the slash.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let config = ApiConfig::new("https://api.example.com/");
        assert_eq!(
            config.endpoint("/api/auth/login"),
            "https://api.example.com/api/auth/login"
        );
    }

    #[test]
    fn test_api_config_default() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }
}
