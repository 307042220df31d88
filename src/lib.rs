pub mod config;
pub mod credentials;
pub mod error;
pub mod integrations;
pub mod logging;
pub mod registry;

pub use config::{Config, ConfigOverrides, LogFormat};
pub use credentials::{
    AuthStrategy, Credentials, CredentialsResolver, EnvCredentialsResolver,
    InMemoryCredentialsResolver,
};
pub use error::{Error, ErrorKind, Result};
pub use integrations::newsapi::{
    NewsApiClient, NewsApiGetSources, SourcesConfig, SourcesPayload,
};
pub use integrations::{DynIntegration, Integration, IntegrationMetadata, IntegrationResult};
pub use registry::IntegrationRegistry;
