//! NewsAPI (<https://newsapi.org>) integrations.

pub mod client;
pub mod sources;

pub use client::NewsApiClient;
pub use sources::{NewsApiGetSources, SourcesConfig, SourcesPayload};

/// Credentials provider name
pub const PROVIDER: &str = "newsapi";

/// Label used in user-facing messages
pub const PROVIDER_LABEL: &str = "NewsAPI";
