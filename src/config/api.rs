//! Content API credentials from the process environment

use thiserror::Error;

/// Environment variable holding the repository endpoint (or bare repository name)
pub const ENDPOINT_VAR: &str = "PRISMIC_ENDPOINT";

/// Environment variable holding the access token
pub const ACCESS_TOKEN_VAR: &str = "PRISMIC_ACCESS_TOKEN";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Endpoint and token for the content API, read once at startup
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub endpoint: String,
    pub access_token: String,
}

impl ApiConfig {
    /// Read the configuration from the environment, honoring a `.env` file
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = lookup(ENDPOINT_VAR)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing(ENDPOINT_VAR))?;

        let access_token = lookup(ACCESS_TOKEN_VAR)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing(ACCESS_TOKEN_VAR))?;

        let endpoint = normalize_endpoint(&endpoint)?;

        Ok(Self {
            endpoint,
            access_token,
        })
    }
}

/// Expand a bare repository name into its CDN endpoint
fn normalize_endpoint(endpoint: &str) -> Result<String, ConfigError> {
    if endpoint.contains("://") {
        url::Url::parse(endpoint).map_err(|_| ConfigError::Invalid(ENDPOINT_VAR))?;
        return Ok(endpoint.trim_end_matches('/').to_string());
    }

    let valid_name = endpoint
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-');
    if !valid_name {
        return Err(ConfigError::Invalid(ENDPOINT_VAR));
    }

    Ok(format!("https://{}.cdn.prismic.io/api/v2", endpoint))
}
