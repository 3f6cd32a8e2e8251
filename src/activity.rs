//! Tautulli `get_activity` client.

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::config::Credentials;
use crate::error::CheckError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlaybackSession {
    pub video_resolution: String,
    pub transcode_decision: String,
}

/// Active sessions as seen by a single API call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SessionSnapshot {
    pub sessions: Vec<PlaybackSession>,
}

#[derive(Debug, Deserialize)]
struct ActivityEnvelope {
    response: ActivityResponse,
}

#[derive(Debug, Deserialize)]
struct ActivityResponse {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

#[async_trait]
pub trait ActivitySource: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<SessionSnapshot, CheckError>;
}

pub struct TautulliClient {
    endpoint: Url,
    api_key: String,
    client: reqwest::Client,
}

impl TautulliClient {
    pub fn new(credentials: &Credentials, api_path: &str) -> Result<Self, CheckError> {
        let raw = format!(
            "{}/{}",
            credentials.base_url.trim_end_matches('/'),
            api_path.trim_start_matches('/')
        );
        let endpoint = Url::parse(&raw)
            .map_err(|e| CheckError::Configuration(format!("invalid Tautulli URL '{}': {}", raw, e)))?;

        Ok(Self {
            endpoint,
            api_key: credentials.api_key.clone(),
            client: reqwest::Client::new(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ActivitySource for TautulliClient {
    async fn fetch_snapshot(&self) -> Result<SessionSnapshot, CheckError> {
        debug!("GET {}?cmd=get_activity", self.endpoint());

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("cmd", "get_activity"), ("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| CheckError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CheckError::Transport(format!("HTTP status {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| CheckError::Transport(e.without_url().to_string()))?;

        let snapshot = parse_activity(&body)?;
        debug!("Tautulli reports {} active session(s)", snapshot.sessions.len());
        Ok(snapshot)
    }
}

/// Decode a `get_activity` body into the session list under `response.data.sessions`.
pub fn parse_activity(body: &str) -> Result<SessionSnapshot, CheckError> {
    let envelope: ActivityEnvelope = serde_json::from_str(body)
        .map_err(|e| CheckError::ResponseFormat(e.to_string()))?;
    let response = envelope.response;

    if response.result.as_deref() == Some("error") {
        let message = response.message.unwrap_or_else(|| "no message".to_string());
        return Err(CheckError::ResponseFormat(format!("API returned an error: {}", message)));
    }

    let data = response
        .data
        .ok_or_else(|| CheckError::ResponseFormat("missing field `response.data`".to_string()))?;
    serde_json::from_value(data).map_err(|e| CheckError::ResponseFormat(format!("response.data: {}", e)))
}
