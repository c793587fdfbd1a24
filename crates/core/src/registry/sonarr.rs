//! Sonarr API client.
//!
//! Every request authenticates with the `apikey` query parameter. The key is
//! attached after the URL is logged so it never reaches the logs.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::types::{CommandAck, EpisodeFile, EpisodeRecord, SeriesRecord};
use super::{RegistryClient, RegistryError};

/// Sonarr connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SonarrConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub ssl: bool,
    /// URL base when Sonarr runs behind a reverse proxy path (e.g. "sonarr").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basedir: Option<String>,
    /// "v4" selects the `api/v3` routes; anything else uses the legacy `api` root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(alias = "apikey")]
    pub api_key: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_port() -> u16 {
    8989
}

fn default_timeout() -> u64 {
    30
}

impl SonarrConfig {
    /// API root, e.g. `https://host:8989/sonarr/api/v3`.
    pub fn base_url(&self) -> String {
        let scheme = if self.ssl { "https" } else { "http" };
        let basedir = self
            .basedir
            .as_deref()
            .map(|dir| dir.trim_matches('/'))
            .filter(|dir| !dir.is_empty())
            .map(|dir| format!("/{}", dir))
            .unwrap_or_default();
        format!(
            "{}://{}:{}{}/{}",
            scheme,
            self.host,
            self.port,
            basedir,
            self.api_segment()
        )
    }

    fn api_segment(&self) -> &'static str {
        match self.version.as_deref() {
            Some(v) if v.eq_ignore_ascii_case("v4") => "api/v3",
            _ => "api",
        }
    }
}

/// Sonarr API client.
pub struct SonarrClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SonarrClient {
    /// Create a new Sonarr client.
    pub fn new(config: SonarrConfig) -> Result<Self, RegistryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url(),
            api_key: config.api_key,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authenticated(&self, request: RequestBuilder) -> RequestBuilder {
        request.query(&[("apikey", &self.api_key)])
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, RegistryError> {
        let url = self.endpoint(path);
        debug!("Begin GET with url: {} params: {:?}", url, params);

        let response = self
            .authenticated(self.client.get(&url))
            .query(params)
            .send()
            .await?;

        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| RegistryError::ParseError(format!("GET {}: {}", path, e)))
    }
}

async fn check_status(response: Response) -> Result<Response, RegistryError> {
    let status = response.status();
    if status == 401 {
        return Err(RegistryError::Unauthorized);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(RegistryError::ApiError {
            status: status.as_u16(),
            message: body.chars().take(200).collect(),
        });
    }
    Ok(response)
}

#[async_trait]
impl RegistryClient for SonarrClient {
    async fn list_series(&self) -> Result<Vec<SeriesRecord>, RegistryError> {
        debug!("Begin call Sonarr for all available series");
        self.get_json("series", &[]).await
    }

    async fn list_episodes(&self, series_id: u64) -> Result<Vec<EpisodeRecord>, RegistryError> {
        debug!("Begin call Sonarr for all episodes for series_id: {}", series_id);
        self.get_json("episode", &[("seriesId", series_id.to_string())])
            .await
    }

    async fn list_episode_files(
        &self,
        series_id: u64,
    ) -> Result<Vec<EpisodeFile>, RegistryError> {
        self.get_json("episodefile", &[("seriesId", series_id.to_string())])
            .await
    }

    async fn trigger_rescan(&self, series_id: u64) -> Result<CommandAck, RegistryError> {
        debug!("Begin call Sonarr to rescan for series_id: {}", series_id);
        let url = self.endpoint("command");
        let body = json!({
            "name": "RescanSeries",
            "seriesId": series_id,
        });

        let response = self
            .authenticated(self.client.post(&url))
            .json(&body)
            .send()
            .await?;

        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| RegistryError::ParseError(format!("POST command: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SonarrConfig {
        SonarrConfig {
            host: "localhost".to_string(),
            port: 8989,
            ssl: false,
            basedir: None,
            version: None,
            api_key: "key".to_string(),
            timeout_secs: 30,
        }
    }

    #[test]
    fn test_base_url_legacy_api() {
        assert_eq!(config().base_url(), "http://localhost:8989/api");
    }

    #[test]
    fn test_base_url_v4_with_ssl_and_basedir() {
        let config = SonarrConfig {
            ssl: true,
            basedir: Some("/sonarr/".to_string()),
            version: Some("V4".to_string()),
            ..config()
        };
        assert_eq!(config.base_url(), "https://localhost:8989/sonarr/api/v3");
    }

    #[test]
    fn test_base_url_ignores_empty_basedir() {
        let config = SonarrConfig {
            basedir: Some(String::new()),
            version: Some("v3".to_string()),
            ..config()
        };
        assert_eq!(config.base_url(), "http://localhost:8989/api");
    }

    #[test]
    fn test_endpoint_does_not_embed_key() {
        let client = SonarrClient::new(config()).unwrap();
        let url = client.endpoint("series");
        assert_eq!(url, "http://localhost:8989/api/series");
        assert!(!url.contains("key"));
    }

    #[test]
    fn test_deserialize_config_accepts_apikey_alias() {
        let toml = r#"
host = "sonarr"
apikey = "abc"
version = "v4"
"#;
        let config: SonarrConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.api_key, "abc");
        assert_eq!(config.port, 8989);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.base_url(), "http://sonarr:8989/api/v3");
    }
}
