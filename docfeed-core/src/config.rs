//! Typed connector configuration.
//!
//! One explicit struct per concern, validated up front: a run never starts with a
//! missing credential field or index id. Secrets are injected by the caller (the
//! CLI crate reads them from the environment); this module only validates.

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::document::ContentType;
use crate::sync::JobTarget;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {}", problems.join("; "))]
    Invalid { problems: Vec<String> },
}

/// Everything one sync run needs, assembled before the orchestrator starts.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConnectorConfig {
    pub index: IndexServiceSettings,
    pub oauth: OAuthSettings,
    pub source: SourceSettings,
    #[serde(default)]
    pub limits: RunLimits,
}

/// Where batches go: the indexing service endpoint and the sync-job identity.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IndexServiceSettings {
    pub endpoint: String,
    pub api_key: String,
    pub application_id: String,
    pub data_source_id: String,
    pub index_id: String,
}

impl IndexServiceSettings {
    pub fn job_target(&self) -> JobTarget {
        JobTarget {
            application_id: self.application_id.clone(),
            data_source_id: self.data_source_id.clone(),
            index_id: self.index_id.clone(),
        }
    }
}

/// OAuth2 client-credentials settings for the source's token endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OAuthSettings {
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scope: Option<String>,
}

/// The remote source's API surface and how its entries are classified.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourceSettings {
    /// Listing endpoint, returns `{ "documents": [ { "name": .. } ] }`.
    pub list_url: String,
    /// Per-document endpoint; the document name is appended as `?name=<name>`.
    pub document_url: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub content_type: ContentType,
    #[serde(default)]
    pub extra_headers: HashMap<String, String>,
}

fn default_category() -> String {
    "Documents".to_string()
}

/// Pacing and deadline knobs for a run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunLimits {
    /// Source-API request rate; 1.0 matches the one-fetch-per-second cadence.
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: f64,
    /// Overall deadline for the run. The stop call is attempted even on expiry.
    #[serde(default)]
    pub run_timeout_seconds: Option<u64>,
}

fn default_requests_per_second() -> f64 {
    1.0
}

impl Default for RunLimits {
    fn default() -> Self {
        Self {
            requests_per_second: default_requests_per_second(),
            run_timeout_seconds: None,
        }
    }
}

impl ConnectorConfig {
    /// Check every required field at once and report all problems together.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        let required = [
            ("index.endpoint", &self.index.endpoint),
            ("index.api_key", &self.index.api_key),
            ("index.application_id", &self.index.application_id),
            ("index.data_source_id", &self.index.data_source_id),
            ("index.index_id", &self.index.index_id),
            ("oauth.token_url", &self.oauth.token_url),
            ("oauth.client_id", &self.oauth.client_id),
            ("oauth.client_secret", &self.oauth.client_secret),
            ("source.list_url", &self.source.list_url),
            ("source.document_url", &self.source.document_url),
            ("source.category", &self.source.category),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                problems.push(format!("{key} must be non-empty"));
            }
        }

        if !self.limits.requests_per_second.is_finite() || self.limits.requests_per_second <= 0.0 {
            problems.push("limits.requests_per_second must be positive".to_string());
        }
        if self.limits.run_timeout_seconds == Some(0) {
            problems.push("limits.run_timeout_seconds must be positive when set".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid { problems })
        }
    }

    pub fn trace_loaded(&self) {
        info!(
            index_endpoint = %self.index.endpoint,
            application_id = %self.index.application_id,
            data_source_id = %self.index.data_source_id,
            index_id = %self.index.index_id,
            list_url = %self.source.list_url,
            "Loaded connector configuration"
        );
        debug!(limits = ?self.limits, "Run limits");
    }
}
