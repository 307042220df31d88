//! # Credentials
//!
//! Integrations never hold secrets themselves. They ask a
//! [`CredentialsResolver`] for the default credentials of a provider and an
//! authentication strategy, then read typed fields from the returned
//! [`Credentials`].
//!
//! Resolvers are shared between concurrently running integrations, so the
//! trait requires `Send + Sync` and only exposes read access.

use crate::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Payload key holding an API key
pub const API_KEY_FIELD: &str = "api_key";

/// Authentication mechanism a set of credentials is stored under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthStrategy {
    /// Single static API key
    ApiKey,
}

impl AuthStrategy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ApiKey => "api_key",
        }
    }
}

impl fmt::Display for AuthStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored credentials for one provider/strategy pair
#[derive(Clone)]
pub struct Credentials {
    provider: String,
    strategy: AuthStrategy,
    payload: HashMap<String, String>,
}

impl Credentials {
    pub fn new(
        provider: impl Into<String>,
        strategy: AuthStrategy,
        payload: HashMap<String, String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            strategy,
            payload,
        }
    }

    /// Credentials with a single `api_key` payload entry
    pub fn api_key(provider: impl Into<String>, key: impl Into<String>) -> Self {
        let mut payload = HashMap::new();
        payload.insert(API_KEY_FIELD.to_string(), key.into());
        Self::new(provider, AuthStrategy::ApiKey, payload)
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub const fn strategy(&self) -> AuthStrategy {
        self.strategy
    }

    /// Raw payload value; `None` only when the key is absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.payload.get(key).map(String::as_str)
    }

    /// Payload value that is present and not blank.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|value| !value.trim().is_empty())
    }

    /// The `api_key` field, if usable
    pub fn api_key_value(&self) -> Option<&str> {
        self.get_non_empty(API_KEY_FIELD)
    }

    /// Like [`Self::get_non_empty`] but reports a missing value as an error.
    pub fn require(&self, key: &str, provider_label: &str) -> Result<&str> {
        self.get_non_empty(key)
            .ok_or_else(|| Error::MissingCredentialField {
                provider: provider_label.to_string(),
                field: key.to_string(),
            })
    }
}

// Payload values are secrets
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.payload.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("Credentials")
            .field("provider", &self.provider)
            .field("strategy", &self.strategy)
            .field("payload_keys", &keys)
            .finish()
    }
}

/// Looks up stored credentials by provider name and strategy
pub trait CredentialsResolver: Send + Sync {
    /// Default credentials for `provider` stored under `strategy`.
    ///
    /// Returns [`Error::CredentialsMissing`] when nothing matches.
    fn get_default_for(&self, provider: &str, strategy: AuthStrategy) -> Result<Credentials>;
}

/// Fixed set of credentials held in memory
#[derive(Debug, Default, Clone)]
pub struct InMemoryCredentialsResolver {
    entries: HashMap<(String, AuthStrategy), Credentials>,
}

impl InMemoryCredentialsResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add credentials, replacing any previous entry for the same pair
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.insert(credentials);
        self
    }

    pub fn insert(&mut self, credentials: Credentials) {
        let key = (credentials.provider.clone(), credentials.strategy);
        self.entries.insert(key, credentials);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CredentialsResolver for InMemoryCredentialsResolver {
    fn get_default_for(&self, provider: &str, strategy: AuthStrategy) -> Result<Credentials> {
        self.entries
            .get(&(provider.to_string(), strategy))
            .cloned()
            .ok_or_else(|| Error::CredentialsMissing {
                provider: provider.to_string(),
                strategy: strategy.to_string(),
            })
    }
}

/// Reads credentials from environment variables.
///
/// `newsapi` + `api_key` resolves `{prefix}NEWSAPI_API_KEY`. An unset
/// variable is reported as missing credentials; an empty one is returned as
/// is so the integration can reject it.
#[derive(Debug, Default, Clone)]
pub struct EnvCredentialsResolver {
    prefix: String,
}

impl EnvCredentialsResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Environment variable consulted for a provider/strategy pair
    pub fn variable_name(&self, provider: &str, strategy: AuthStrategy) -> String {
        let provider: String = provider
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!(
            "{}{}_{}",
            self.prefix,
            provider,
            strategy.as_str().to_ascii_uppercase()
        )
    }
}

impl CredentialsResolver for EnvCredentialsResolver {
    fn get_default_for(&self, provider: &str, strategy: AuthStrategy) -> Result<Credentials> {
        let variable = self.variable_name(provider, strategy);
        debug!("Resolving {} credentials from ${}", provider, variable);

        match std::env::var(&variable) {
            Ok(value) => match strategy {
                AuthStrategy::ApiKey => Ok(Credentials::api_key(provider, value)),
            },
            Err(_) => Err(Error::CredentialsMissing {
                provider: provider.to_string(),
                strategy: strategy.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_and_empty_fields() {
        let mut payload = HashMap::new();
        payload.insert("api_key".to_string(), "   ".to_string());
        let creds = Credentials::new("newsapi", AuthStrategy::ApiKey, payload);

        assert_eq!(creds.get("api_key"), Some("   "));
        assert_eq!(creds.get_non_empty("api_key"), None);
        assert_eq!(creds.get("missing"), None);
        assert!(creds.api_key_value().is_none());

        let err = creds.require("api_key", "NewsAPI").unwrap_err();
        assert_eq!(err.to_string(), "NewsAPI api_key not provided");
    }

    #[test]
    fn test_debug_redacts_payload() {
        let creds = Credentials::api_key("newsapi", "super-secret");
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("api_key"));
    }

    #[test]
    fn test_in_memory_lookup() {
        let resolver = InMemoryCredentialsResolver::new()
            .with_credentials(Credentials::api_key("newsapi", "abc123"));

        let creds = resolver
            .get_default_for("newsapi", AuthStrategy::ApiKey)
            .unwrap();
        assert_eq!(creds.api_key_value(), Some("abc123"));
        assert_eq!(creds.provider(), "newsapi");

        let err = resolver
            .get_default_for("guardian", AuthStrategy::ApiKey)
            .unwrap_err();
        assert!(matches!(err, Error::CredentialsMissing { .. }));
        assert_eq!(
            err.to_string(),
            "No credentials found for provider 'guardian' with strategy 'api_key'"
        );
    }

    #[test]
    fn test_in_memory_insert_replaces() {
        let mut resolver = InMemoryCredentialsResolver::new();
        resolver.insert(Credentials::api_key("newsapi", "old"));
        resolver.insert(Credentials::api_key("newsapi", "new"));
        assert_eq!(resolver.len(), 1);

        let creds = resolver
            .get_default_for("newsapi", AuthStrategy::ApiKey)
            .unwrap();
        assert_eq!(creds.api_key_value(), Some("new"));
    }

    #[test]
    fn test_env_variable_name() {
        let resolver = EnvCredentialsResolver::new();
        assert_eq!(
            resolver.variable_name("newsapi", AuthStrategy::ApiKey),
            "NEWSAPI_API_KEY"
        );

        let prefixed = EnvCredentialsResolver::with_prefix("NI_");
        assert_eq!(
            prefixed.variable_name("news-api", AuthStrategy::ApiKey),
            "NI_NEWS_API_API_KEY"
        );
    }

    #[test]
    fn test_env_lookup() {
        let resolver = EnvCredentialsResolver::with_prefix("NI_CREDENTIALS_TEST_");
        std::env::set_var("NI_CREDENTIALS_TEST_NEWSAPI_API_KEY", "from-env");

        let creds = resolver
            .get_default_for("newsapi", AuthStrategy::ApiKey)
            .unwrap();
        assert_eq!(creds.api_key_value(), Some("from-env"));

        let err = resolver
            .get_default_for("unset-provider", AuthStrategy::ApiKey)
            .unwrap_err();
        assert!(matches!(err, Error::CredentialsMissing { .. }));
    }
}
