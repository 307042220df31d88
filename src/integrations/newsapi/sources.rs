use super::client::NewsApiClient;
use super::{PROVIDER, PROVIDER_LABEL};
use crate::config::NewsApiConfig;
use crate::credentials::{AuthStrategy, CredentialsResolver, API_KEY_FIELD};
use crate::integrations::{Integration, IntegrationMetadata, IntegrationResult};
use crate::{Error, Result};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Filters accepted by [`NewsApiGetSources`].
///
/// Unknown keys are ignored. `null`, `false`, empty and blank strings all
/// mean "no filter" and are never sent upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SourcesConfig {
    /// Filter sources by language (e.g. en, ru)
    #[serde(deserialize_with = "optional_filter", skip_serializing_if = "Option::is_none")]
    #[schemars(with = "String")]
    pub language: Option<String>,

    /// Filter sources by country (e.g. us, gb)
    #[serde(deserialize_with = "optional_filter", skip_serializing_if = "Option::is_none")]
    #[schemars(with = "String")]
    pub country: Option<String>,

    /// Filter sources by category (e.g. business, technology)
    #[serde(deserialize_with = "optional_filter", skip_serializing_if = "Option::is_none")]
    #[schemars(with = "String")]
    pub category: Option<String>,
}

impl SourcesConfig {
    /// Build from raw values, applying the same normalization as deserialization
    pub fn new(
        language: Option<&str>,
        country: Option<&str>,
        category: Option<&str>,
    ) -> Self {
        Self {
            language: language.and_then(normalize_filter),
            country: country.and_then(normalize_filter),
            category: category.and_then(normalize_filter),
        }
    }

    /// Filters in upstream parameter order, present ones only
    pub fn filters(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("language", self.language.as_deref()),
            ("country", self.country.as_deref()),
            ("category", self.category.as_deref()),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|value| (name, value)))
    }

    /// Schema advertised in the integration metadata.
    ///
    /// Every filter is an optional string described by its field docs.
    pub fn config_schema() -> Value {
        let generated = schemars::schema_for!(Self).to_value();
        let properties: Map<String, Value> = generated
            .get("properties")
            .and_then(Value::as_object)
            .into_iter()
            .flatten()
            .map(|(name, property)| {
                let description = property.get("description").cloned().unwrap_or_default();
                (
                    name.clone(),
                    json!({"type": "string", "description": description}),
                )
            })
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": [],
        })
    }
}

fn normalize_filter(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn optional_filter<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null | Value::Bool(false)) => Ok(None),
        Some(Value::String(s)) => Ok(normalize_filter(&s)),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string filter, got {other}"
        ))),
    }
}

/// Success payload: the provider's `sources` value, untouched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcesPayload {
    pub sources: Value,
}

impl SourcesPayload {
    /// Number of source records; zero unless `sources` is an array
    pub fn len(&self) -> usize {
        self.sources.as_array().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Lists the news sources NewsAPI offers, optionally filtered.
#[derive(Debug, Clone)]
pub struct NewsApiGetSources {
    client: NewsApiClient,
    metadata: IntegrationMetadata,
}

impl NewsApiGetSources {
    pub const ID: &'static str = "newsapi_get_sources";

    pub fn new(config: &NewsApiConfig) -> Result<Self> {
        Ok(Self::with_client(NewsApiClient::new(config)?))
    }

    pub fn with_client(client: NewsApiClient) -> Self {
        Self {
            client,
            metadata: Self::build_metadata(),
        }
    }

    fn build_metadata() -> IntegrationMetadata {
        IntegrationMetadata {
            id: Self::ID.to_string(),
            name: "NewsAPI Get Sources".to_string(),
            description: "Get list of available news sources from NewsAPI".to_string(),
            category: "news".to_string(),
            version: "1.0.0".to_string(),
            provider: PROVIDER.to_string(),
            icon_s3_key: None,
            config_schema: SourcesConfig::config_schema(),
        }
    }

    pub const fn client(&self) -> &NewsApiClient {
        &self.client
    }

    /// Like [`Integration::execute`], but gives up as soon as `cancel` fires.
    pub async fn execute_with_cancellation(
        &self,
        config: &SourcesConfig,
        resolver: &dyn CredentialsResolver,
        cancel: &CancellationToken,
    ) -> IntegrationResult<SourcesPayload> {
        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(Error::Cancelled),
            outcome = self.fetch_sources(config, resolver) => outcome,
        };
        Self::finish(outcome)
    }

    async fn fetch_sources(
        &self,
        config: &SourcesConfig,
        resolver: &dyn CredentialsResolver,
    ) -> Result<SourcesPayload> {
        let credentials = resolver.get_default_for(PROVIDER, AuthStrategy::ApiKey)?;
        let api_key = credentials.require(API_KEY_FIELD, PROVIDER_LABEL)?;

        debug!(
            language = config.language.as_deref(),
            country = config.country.as_deref(),
            category = config.category.as_deref(),
            "Fetching NewsAPI sources"
        );

        let start_time = Instant::now();
        let payload = SourcesPayload {
            sources: self.client.list_sources(api_key, config).await?,
        };
        info!(
            "NewsAPI sources fetched: {} sources in {:?}",
            payload.len(),
            start_time.elapsed()
        );
        Ok(payload)
    }

    fn finish(outcome: Result<SourcesPayload>) -> IntegrationResult<SourcesPayload> {
        match outcome {
            Ok(payload) => IntegrationResult::Success(payload),
            Err(err) => {
                error!(
                    integration = Self::ID,
                    kind = ?err.kind(),
                    error = %err.chain(),
                    details = ?err,
                    "Failed to get NewsAPI sources"
                );
                IntegrationResult::from_error(&err)
            }
        }
    }
}

#[async_trait]
impl Integration for NewsApiGetSources {
    type Config = SourcesConfig;
    type Output = SourcesPayload;

    fn metadata(&self) -> &IntegrationMetadata {
        &self.metadata
    }

    async fn execute(
        &self,
        config: &SourcesConfig,
        resolver: &dyn CredentialsResolver,
    ) -> IntegrationResult<SourcesPayload> {
        Self::finish(self.fetch_sources(config, resolver).await)
    }
}
