use std::fmt;
use std::time::Duration;

use super::AuthorityError;
use crate::core::Environment;

/// Fixed request/response timeout of the transport.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable holding the test gateway base URL.
pub const TEST_BASE_URL_VAR: &str = "DTE_TEST_BASE_URL";

/// Environment variable holding the production gateway base URL.
pub const PRODUCTION_BASE_URL_VAR: &str = "DTE_PROD_BASE_URL";

/// Transport configuration. Read-only once the client is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub test_base_url: String,
    pub production_base_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(test_base_url: impl Into<String>, production_base_url: impl Into<String>) -> Self {
        Self {
            test_base_url: test_base_url.into(),
            production_base_url: production_base_url.into(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read both base URLs from `DTE_TEST_BASE_URL` and `DTE_PROD_BASE_URL`.
    pub fn from_env() -> Result<Self, AuthorityError> {
        let read = |var: &str| {
            std::env::var(var)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AuthorityError::Config(format!("{var} is not set")))
        };
        Ok(Self::new(read(TEST_BASE_URL_VAR)?, read(PRODUCTION_BASE_URL_VAR)?))
    }

    /// Base URL for `environment`, without a trailing slash.
    pub fn base_url(&self, environment: Environment) -> &str {
        let url = if environment.is_production() {
            &self.production_base_url
        } else {
            &self.test_base_url
        };
        url.trim_end_matches('/')
    }
}

/// Per-call authentication header values.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// `apiKey` header.
    pub api_key: String,
    /// `key` header: password of the signing certificate.
    pub certificate_key: String,
    /// `MH_USER` header.
    pub mh_user: String,
    /// `MH_KEY` header.
    pub mh_key: String,
}

impl Credentials {
    pub fn new(
        api_key: impl Into<String>,
        certificate_key: impl Into<String>,
        mh_user: impl Into<String>,
        mh_key: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            certificate_key: certificate_key.into(),
            mh_user: mh_user.into(),
            mh_key: mh_key.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"***")
            .field("certificate_key", &"***")
            .field("mh_user", &self.mh_user)
            .field("mh_key", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeout_is_thirty_seconds() {
        let config = ClientConfig::new("http://test", "http://prod");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn base_url_follows_environment() {
        let config = ClientConfig::new("http://test/", "http://prod");
        assert_eq!(config.base_url(Environment::Test), "http://test");
        assert_eq!(config.base_url(Environment::Production), "http://prod");
    }

    #[test]
    fn debug_hides_secrets() {
        let creds = Credentials::new("secret-api", "cert-pass", "06141234567890", "mh-pass");
        let shown = format!("{creds:?}");
        assert!(!shown.contains("secret-api"));
        assert!(!shown.contains("cert-pass"));
        assert!(!shown.contains("mh-pass"));
        assert!(shown.contains("06141234567890"));
    }
}
