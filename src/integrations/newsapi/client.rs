use super::sources::SourcesConfig;
use crate::config::NewsApiConfig;
use crate::{Error, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// NewsAPI error body, e.g. `{"status":"error","code":"apiKeyInvalid","message":"..."}`
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: Option<String>,
    message: Option<String>,
}

impl ApiErrorBody {
    fn describe(self) -> Option<String> {
        match (self.code, self.message) {
            (Some(code), Some(message)) => Some(format!("{code}: {message}")),
            (Some(detail), None) | (None, Some(detail)) => Some(detail),
            (None, None) => None,
        }
    }
}

/// Extract `sources` from a `GET /sources` body.
///
/// The body must be a JSON object. The `sources` value is handed back as
/// NewsAPI sent it; a missing or `null` field is an empty list.
fn parse_sources(body: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| Error::MalformedResponse(format!("Failed to parse sources JSON: {e}")))?;

    let Value::Object(mut fields) = value else {
        return Err(Error::MalformedResponse(
            "Expected a JSON object in sources response".to_string(),
        ));
    };

    match fields.remove("sources") {
        None | Some(Value::Null) => Ok(Value::Array(Vec::new())),
        Some(sources) => Ok(sources),
    }
}

/// Thin client for the NewsAPI v2 REST API
#[derive(Debug, Clone)]
pub struct NewsApiClient {
    client: Client,
    sources_url: Url,
    timeout: Duration,
}

impl NewsApiClient {
    pub fn new(config: &NewsApiConfig) -> Result<Self> {
        let timeout = config.timeout();
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(Error::http)?;

        Ok(Self {
            client,
            sources_url: Self::build_sources_url(&config.base_url)?,
            timeout,
        })
    }

    /// `{base_url}/sources`, tolerating a trailing slash on the base
    fn build_sources_url(base_url: &str) -> Result<Url> {
        let raw = format!("{}/sources", base_url.trim_end_matches('/'));
        Url::parse(&raw).map_err(|e| Error::InvalidInput {
            field: "newsapi.base_url".to_string(),
            reason: e.to_string(),
        })
    }

    pub const fn sources_url(&self) -> &Url {
        &self.sources_url
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Query parameters for a sources request, in the order they are sent
    pub fn sources_query<'a>(
        api_key: &'a str,
        config: &'a SourcesConfig,
    ) -> Vec<(&'static str, &'a str)> {
        let mut params = vec![("apiKey", api_key)];
        params.extend(config.filters());
        params
    }

    /// List the sources matching `config`.
    pub async fn list_sources(
        &self,
        api_key: &str,
        config: &SourcesConfig,
    ) -> Result<Value> {
        let params = Self::sources_query(api_key, config);
        debug!(
            "Requesting {} with filters: {:?}",
            self.sources_url,
            params.iter().skip(1).collect::<Vec<_>>()
        );

        let response = self
            .client
            .get(self.sources_url.clone())
            .query(&params)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(ApiErrorBody::describe);
            warn!(
                "NewsAPI request failed with status {}: {}",
                status,
                detail.as_deref().unwrap_or("no error body")
            );
            return Err(Error::Upstream {
                status: status.as_u16(),
                endpoint: self.sources_url.to_string(),
                detail,
            });
        }

        parse_sources(&body).inspect_err(|_| {
            warn!("Unexpected NewsAPI sources response ({} bytes)", body.len());
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::NetworkTimeout {
                timeout: self.timeout,
                message: format!("GET {}", self.sources_url),
            }
        } else {
            Error::http(err)
        }
    }
}
