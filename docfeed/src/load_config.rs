/// `load_config` module: loads and adapts a static YAML config—including
/// environment secret injection—into the internal [`ConnectorConfig`].
///
/// This module is the only place where untrusted YAML is parsed and mapped to
/// rich, strongly-typed internal structs.
///
/// # Responsibilities
/// - Parse user-supplied YAML configuration files into type-safe Rust structs
/// - Inject environment variables for secret fields (the OAuth client secret
///   and the indexing-service api key) so they never live in the file
/// - Fail fast with clear diagnostics: parse errors, missing env vars and
///   missing required fields are all surfaced before any network call
///
/// # Errors
/// All errors in this module use `anyhow::Error` for context-rich diagnostics,
/// and are surfaced at the CLI boundary.
///
/// For the accepted YAML schema, see the README.
///
use anyhow::{Context, Result};
use docfeed_core::config::{
    ConnectorConfig, IndexServiceSettings, OAuthSettings, RunLimits, SourceSettings,
};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{error, info};

/// Env var holding the OAuth2 client secret for the source's token endpoint.
pub const CLIENT_SECRET_ENV: &str = "OAUTH2_CLIENT_SECRET";
/// Env var holding the indexing service's api key.
pub const INDEX_API_KEY_ENV: &str = "INDEX_API_KEY";

#[derive(Debug, Deserialize)]
struct RawConfig {
    index: IndexSection,
    oauth: OAuthSection,
    source: SourceSettings,
    #[serde(default)]
    limits: RunLimits,
}

#[derive(Debug, Deserialize)]
struct IndexSection {
    endpoint: String,
    application_id: String,
    data_source_id: String,
    index_id: String,
}

#[derive(Debug, Deserialize)]
struct OAuthSection {
    token_url: String,
    client_id: String,
    #[serde(default)]
    scope: Option<String>,
}

/// Loads a static YAML config file (no secrets) and injects required env vars
/// for secrets. Returns a validated config ready for the sync pipeline.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ConnectorConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let raw: RawConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    let client_secret = std::env::var(CLIENT_SECRET_ENV)
        .with_context(|| format!("{CLIENT_SECRET_ENV} env var must be set"))?;
    let api_key = std::env::var(INDEX_API_KEY_ENV)
        .with_context(|| format!("{INDEX_API_KEY_ENV} env var must be set"))?;

    let config = ConnectorConfig {
        index: IndexServiceSettings {
            endpoint: raw.index.endpoint,
            api_key,
            application_id: raw.index.application_id,
            data_source_id: raw.index.data_source_id,
            index_id: raw.index.index_id,
        },
        oauth: OAuthSettings {
            token_url: raw.oauth.token_url,
            client_id: raw.oauth.client_id,
            client_secret,
            scope: raw.oauth.scope,
        },
        source: raw.source,
        limits: raw.limits,
    };

    config.validate()?;
    config.trace_loaded();
    Ok(config)
}
