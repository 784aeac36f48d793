//! Splunk management REST client.
//!
//! Only the small surface the sink needs:
//!
//! - `POST /services/auth/login` for a session key
//! - `GET /services/data/indexes/{name}` / `POST /services/data/indexes`
//!   to attach to an index, creating it when missing
//! - `POST /services/receivers/simple` to append one event

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::{EventMetadata, EventWriter, SplunkOpts};

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(rename = "sessionKey")]
    session_key: String,
}

/// Reject index names Splunk would refuse or that would need escaping.
pub fn validate_index_name(name: &str) -> Result<()> {
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
    let valid_start = name
        .chars()
        .next()
        .map(|c| c != '_' && c != '-')
        .unwrap_or(false);
    if !(valid_chars && valid_start) {
        anyhow::bail!(
            "Invalid index name '{name}': use lowercase letters, digits, '_' and '-', \
             not starting with '_' or '-'"
        );
    }
    Ok(())
}

/// Authenticated session against the Splunk management endpoint
#[derive(Clone)]
pub struct SplunkClient {
    http: Client,
    base_url: String,
    session_key: String,
}

impl std::fmt::Debug for SplunkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SplunkClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl SplunkClient {
    /// Log in and keep the session key for later requests.
    pub async fn login(opts: &SplunkOpts) -> Result<Self> {
        let http = Client::builder()
            .timeout(opts.timeout)
            .danger_accept_invalid_certs(opts.insecure)
            .build()?;
        let base_url = opts.url.trim_end_matches('/').to_string();
        let login_url = format!("{base_url}/services/auth/login");

        tracing::debug!("Logging in to Splunk at {login_url}");

        let response = http
            .post(&login_url)
            .form(&[
                ("username", opts.username.as_str()),
                ("password", opts.password.as_str()),
                ("output_mode", "json"),
            ])
            .send()
            .await
            .with_context(|| format!("Failed to reach Splunk at {login_url}"))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Splunk login returned status {status}: {login_url}");
        }

        let login: LoginResponse = response
            .json()
            .await
            .context("Failed to parse Splunk login response")?;

        Ok(Self {
            http,
            base_url,
            session_key: login.session_key,
        })
    }

    fn auth_header(&self) -> String {
        format!("Splunk {}", self.session_key)
    }

    /// Check whether `index` exists.
    pub async fn index_exists(&self, index: &str) -> Result<bool> {
        validate_index_name(index)?;
        let url = format!("{}/services/data/indexes/{index}", self.base_url);

        let response = self
            .http
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .query(&[("output_mode", "json")])
            .send()
            .await
            .with_context(|| format!("Failed to look up index '{index}'"))?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => anyhow::bail!("Index lookup for '{index}' returned status {status}"),
        }
    }

    /// Create `index`. An index created concurrently by someone else counts as success.
    pub async fn create_index(&self, index: &str) -> Result<()> {
        validate_index_name(index)?;
        let url = format!("{}/services/data/indexes", self.base_url);

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .form(&[("name", index), ("output_mode", "json")])
            .send()
            .await
            .with_context(|| format!("Failed to create index '{index}'"))?;

        match response.status() {
            status if status.is_success() => {
                tracing::info!("Created Splunk index: {index}");
                Ok(())
            }
            StatusCode::CONFLICT => {
                tracing::info!("Splunk index already exists: {index}");
                Ok(())
            }
            status => anyhow::bail!("Creating index '{index}' returned status {status}"),
        }
    }

    /// Make sure `index` exists, creating it if needed.
    pub async fn ensure_index(&self, index: &str) -> Result<()> {
        if !self.index_exists(index).await? {
            self.create_index(index).await?;
        }
        Ok(())
    }

    /// Open a writer that appends events to `index`.
    pub fn attach(&self, index: &str, metadata: &EventMetadata) -> SimpleReceiver {
        SimpleReceiver {
            client: self.clone(),
            url: format!("{}/services/receivers/simple", self.base_url),
            params: vec![
                ("index", index.to_string()),
                ("host", metadata.host.clone()),
                ("source", metadata.source.clone()),
                ("sourcetype", metadata.sourcetype.clone()),
            ],
        }
    }
}

/// Event writer posting each line to the simple receiver endpoint
#[derive(Debug)]
pub struct SimpleReceiver {
    client: SplunkClient,
    url: String,
    params: Vec<(&'static str, String)>,
}

#[async_trait]
impl EventWriter for SimpleReceiver {
    async fn append_line(&mut self, line: &str) -> Result<()> {
        let response = self
            .client
            .http
            .post(&self.url)
            .header(reqwest::header::AUTHORIZATION, self.client.auth_header())
            .query(&self.params)
            .body(format!("{line}\r\n"))
            .send()
            .await
            .context("Failed to send event to Splunk")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Splunk receiver returned status {status}: {body}");
        }
        Ok(())
    }

    async fn close(self) -> Result<()> {
        tracing::debug!("Detached from Splunk receiver {}", self.url);
        Ok(())
    }
}
