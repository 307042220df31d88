//! # Integration Registry
//!
//! Keeps every available integration by id so hosts can list what exists
//! and run an integration from a JSON configuration without knowing its
//! concrete type.

use crate::config::Config;
use crate::credentials::CredentialsResolver;
use crate::integrations::newsapi::NewsApiGetSources;
use crate::integrations::{DynIntegration, IntegrationMetadata, IntegrationResult};
use crate::{Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Integrations keyed by metadata id
#[derive(Default, Clone)]
pub struct IntegrationRegistry {
    integrations: BTreeMap<String, Arc<dyn DynIntegration>>,
}

impl fmt::Debug for IntegrationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntegrationRegistry")
            .field("ids", &self.integrations.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl IntegrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in integration
    pub fn with_defaults(config: &Config) -> Result<Self> {
        let mut registry = Self::new();
        registry.register(Arc::new(NewsApiGetSources::new(&config.newsapi)?))?;
        info!("Registered {} integrations", registry.len());
        Ok(registry)
    }

    pub fn register(&mut self, integration: Arc<dyn DynIntegration>) -> Result<()> {
        let id = integration.descriptor().id.clone();
        if self.integrations.contains_key(&id) {
            return Err(Error::DuplicateIntegration(id));
        }
        self.integrations.insert(id, integration);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn DynIntegration>> {
        self.integrations.get(id).cloned()
    }

    /// Metadata of all integrations, ordered by id
    pub fn list_metadata(&self) -> Vec<&IntegrationMetadata> {
        self.integrations
            .values()
            .map(|integration| integration.descriptor())
            .collect()
    }

    pub fn by_category(&self, category: &str) -> Vec<&IntegrationMetadata> {
        self.list_metadata()
            .into_iter()
            .filter(|metadata| metadata.category == category)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.integrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.integrations.is_empty()
    }

    /// Run integration `id` with a JSON configuration.
    ///
    /// Unknown ids produce an error result rather than an `Err`.
    pub async fn execute(
        &self,
        id: &str,
        config: Value,
        resolver: &dyn CredentialsResolver,
    ) -> Value {
        match self.integrations.get(id) {
            Some(integration) => integration.execute_json(config, resolver).await,
            None => {
                let err = Error::UnknownIntegration(id.to_string());
                warn!("{}", err);
                IntegrationResult::<()>::from_error(&err).to_value()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_register_newsapi() {
        let registry = IntegrationRegistry::with_defaults(&Config::default()).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.get("newsapi_get_sources").is_some());
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.by_category("news").len(), 1);
        assert!(registry.by_category("weather").is_empty());
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let config = Config::default();
        let mut registry = IntegrationRegistry::with_defaults(&config).unwrap();
        let duplicate = Arc::new(NewsApiGetSources::new(&config.newsapi).unwrap());

        let err = registry.register(duplicate).unwrap_err();
        assert!(matches!(err, Error::DuplicateIntegration(id) if id == "newsapi_get_sources"));
        assert_eq!(registry.len(), 1);
    }
}
