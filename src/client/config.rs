//! Client configuration and credentials.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::{AccountNumber, Environment, Error, Result};

/// How GET parameters are put on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamEncoding {
    /// Standard `key=value&...` query encoding.
    #[default]
    Query,
    /// The JSON text of the parameter map as the raw query string, as
    /// older IG clients sent it.
    JsonText,
}

/// Configuration for the IG client.
///
/// # Example
///
/// ```
/// use ig_rest::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .with_timeout(Duration::from_secs(60))
///     .with_strict_auth(true);
/// assert!(config.strict_auth);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout
    pub timeout: Duration,
    /// User-Agent header value
    pub user_agent: String,
    /// Replaces the environment's gateway URL when set
    pub base_url: Option<String>,
    /// Fail authentication when a security header is missing
    pub strict_auth: bool,
    /// Encoding of GET parameters
    pub param_encoding: ParamEncoding,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("ig-rest/{} (Rust)", env!("CARGO_PKG_VERSION")),
            base_url: None,
            strict_auth: false,
            param_encoding: ParamEncoding::Query,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Send requests to this base URL instead of the IG gateway.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Fail login when `CST` or `X-SECURITY-TOKEN` is missing.
    pub fn with_strict_auth(mut self, strict: bool) -> Self {
        self.strict_auth = strict;
        self
    }

    /// Choose how GET parameters are encoded.
    pub fn with_param_encoding(mut self, encoding: ParamEncoding) -> Self {
        self.param_encoding = encoding;
        self
    }
}

/// Login credentials and account selection.
///
/// Secrets are redacted from `Debug` output.
#[derive(Clone)]
pub struct Credentials {
    identifier: String,
    password: SecretString,
    api_key: SecretString,
    environment: Environment,
    account_number: Option<AccountNumber>,
}

impl Credentials {
    /// Create credentials.
    ///
    /// `account_type` selects the gateway: `"live"` for the live gateway,
    /// anything else for demo.
    pub fn new(
        identifier: impl Into<String>,
        password: impl Into<String>,
        api_key: impl Into<String>,
        account_type: &str,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            password: SecretString::from(password.into()),
            api_key: SecretString::from(api_key.into()),
            environment: Environment::from_account_type(account_type),
            account_number: None,
        }
    }

    /// Read credentials from `IG_IDENTIFIER`, `IG_PASSWORD`, `IG_API_KEY`,
    /// `IG_ACC_TYPE` and, optionally, `IG_ACC_NUMBER`.
    pub fn from_env() -> Result<Self> {
        fn var(name: &str) -> Result<String> {
            std::env::var(name).map_err(|_| Error::Config(format!("{name} is not set")))
        }

        let credentials = Self::new(
            var("IG_IDENTIFIER")?,
            var("IG_PASSWORD")?,
            var("IG_API_KEY")?,
            &var("IG_ACC_TYPE")?,
        );

        Ok(match std::env::var("IG_ACC_NUMBER") {
            Ok(number) if !number.is_empty() => credentials.with_account_number(number),
            _ => credentials,
        })
    }

    /// Attach the account number to use. [`IgClient::login`] switches to
    /// it when IG logs into a different account.
    ///
    /// [`IgClient::login`]: crate::IgClient::login
    pub fn with_account_number(mut self, account_number: impl Into<AccountNumber>) -> Self {
        self.account_number = Some(account_number.into());
        self
    }

    /// Login identifier.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Selected gateway.
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Configured account number.
    pub fn account_number(&self) -> Option<&AccountNumber> {
        self.account_number.as_ref()
    }

    pub(crate) fn password(&self) -> &str {
        self.password.expose_secret()
    }

    pub(crate) fn api_key(&self) -> &SecretString {
        &self.api_key
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("password", &"[REDACTED]")
            .field("api_key", &"[REDACTED]")
            .field("environment", &self.environment)
            .field("account_number", &self.account_number)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(!config.strict_auth);
        assert_eq!(config.param_encoding, ParamEncoding::Query);
        assert!(config.base_url.is_none());
        assert!(config.user_agent.starts_with("ig-rest/"));
    }

    #[test]
    fn test_config_builders() {
        let config = ClientConfig::new()
            .with_base_url("http://localhost:8080")
            .with_param_encoding(ParamEncoding::JsonText)
            .with_user_agent("bot/1.0");
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(config.param_encoding, ParamEncoding::JsonText);
        assert_eq!(config.user_agent, "bot/1.0");
    }

    #[test]
    fn test_credentials_environment() {
        let live = Credentials::new("user", "pass", "key", "LIVE");
        assert_eq!(live.environment(), Environment::Live);

        let demo = Credentials::new("user", "pass", "key", "demo").with_account_number("ABC12");
        assert_eq!(demo.environment(), Environment::Demo);
        assert_eq!(demo.account_number().map(AccountNumber::as_str), Some("ABC12"));
    }

    #[test]
    fn test_credentials_debug_redacts_secrets() {
        let credentials = Credentials::new("user", "hunter2", "api-key-123", "demo");
        let debug = format!("{:?}", credentials);
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("api-key-123"));
        assert!(debug.contains("REDACTED"));
    }
}
