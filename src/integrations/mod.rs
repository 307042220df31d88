//! # Integrations
//!
//! An integration translates a generic invocation (a JSON configuration plus a
//! credentials resolver) into one call against a specific provider API and
//! reports the outcome as an [`IntegrationResult`].
//!
//! Integrations implement the typed [`Integration`] trait. Every
//! implementation also gets [`DynIntegration`], the object-safe JSON-in /
//! JSON-out form used by [`crate::IntegrationRegistry`].

pub mod newsapi;

use crate::credentials::CredentialsResolver;
use crate::Error;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// Static description of an integration, read by discovery surfaces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationMetadata {
    /// Stable identifier, e.g. `newsapi_get_sources`
    pub id: String,
    pub name: String,
    pub description: String,
    /// Grouping used for listings, e.g. `news`
    pub category: String,
    pub version: String,
    /// Credentials provider name
    pub provider: String,
    pub icon_s3_key: Option<String>,
    /// JSON Schema of the accepted configuration
    pub config_schema: Value,
}

/// Outcome of one integration run.
///
/// Serializes as `{"status": "success", ...payload fields}` or
/// `{"status": "error", "message": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum IntegrationResult<T> {
    Success(T),
    Error { message: String },
}

impl<T> IntegrationResult<T> {
    pub fn from_error(err: &Error) -> Self {
        Self::Error {
            message: err.to_string(),
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Error message, if this is an error result
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Error { message } => Some(message),
        }
    }

    pub fn into_result(self) -> Result<T, String> {
        match self {
            Self::Success(payload) => Ok(payload),
            Self::Error { message } => Err(message),
        }
    }
}

impl<T: Serialize> IntegrationResult<T> {
    /// Wire form of this result.
    ///
    /// A payload that cannot be serialized is reported as an error result.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            let err = Error::from(e);
            warn!("Failed to serialize integration result: {}", err);
            IntegrationResult::<()>::from_error(&err).to_value()
        })
    }
}

/// A provider integration with typed configuration and output
#[async_trait]
pub trait Integration: Send + Sync {
    /// Accepted configuration; unknown keys should be ignored
    type Config: DeserializeOwned + Send + Sync;
    /// Success payload
    type Output: Serialize + Send;

    fn metadata(&self) -> &IntegrationMetadata;

    /// Run the integration once.
    ///
    /// Implementations must not panic or return early with an error: every
    /// failure is reported as [`IntegrationResult::Error`].
    async fn execute(
        &self,
        config: &Self::Config,
        resolver: &dyn CredentialsResolver,
    ) -> IntegrationResult<Self::Output>;
}

/// Object-safe, JSON-based view of an [`Integration`]
#[async_trait]
pub trait DynIntegration: Send + Sync {
    /// Same as [`Integration::metadata`]
    fn descriptor(&self) -> &IntegrationMetadata;

    /// Deserialize `config`, run the integration and return the wire result.
    ///
    /// `null` is treated as an empty configuration.
    async fn execute_json(&self, config: Value, resolver: &dyn CredentialsResolver) -> Value;
}

#[async_trait]
impl<T> DynIntegration for T
where
    T: Integration,
{
    fn descriptor(&self) -> &IntegrationMetadata {
        self.metadata()
    }

    async fn execute_json(&self, config: Value, resolver: &dyn CredentialsResolver) -> Value {
        let config = if config.is_null() {
            Value::Object(Map::new())
        } else {
            config
        };

        match serde_json::from_value::<T::Config>(config) {
            Ok(config) => self.execute(&config, resolver).await.to_value(),
            Err(e) => {
                let err = Error::InvalidInput {
                    field: "config".to_string(),
                    reason: e.to_string(),
                };
                warn!(
                    integration = %self.metadata().id,
                    "Rejected integration config: {}", err
                );
                IntegrationResult::<()>::from_error(&err).to_value()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Payload {
        items: Vec<u32>,
    }

    #[test]
    fn test_success_wire_shape() {
        let result = IntegrationResult::Success(Payload { items: vec![1, 2] });
        assert_eq!(
            result.to_value(),
            json!({"status": "success", "items": [1, 2]})
        );
        assert!(result.is_success());
        assert_eq!(result.message(), None);
    }

    #[test]
    fn test_error_wire_shape() {
        let result: IntegrationResult<Payload> =
            IntegrationResult::from_error(&Error::Cancelled);
        assert_eq!(
            result.to_value(),
            json!({"status": "error", "message": "Operation cancelled"})
        );
        assert!(result.is_error());
        assert_eq!(result.clone().into_result(), Err("Operation cancelled".to_string()));
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("payload refused"))
        }
    }

    #[test]
    fn test_unserializable_payload_becomes_error() {
        let result = IntegrationResult::Success(Unserializable);
        assert_eq!(
            result.to_value(),
            json!({"status": "error", "message": "Serialization error: payload refused"})
        );
    }

    #[test]
    fn test_result_deserializes_from_wire() {
        let parsed: IntegrationResult<Payload> =
            serde_json::from_value(json!({"status": "success", "items": [7]})).unwrap();
        assert_eq!(parsed, IntegrationResult::Success(Payload { items: vec![7] }));

        let parsed: IntegrationResult<Payload> =
            serde_json::from_value(json!({"status": "error", "message": "boom"})).unwrap();
        assert_eq!(parsed.message(), Some("boom"));
    }
}
