//! Upstream provider client
//!
//! The third-party publishing API is an opaque boundary: one POST carrying
//! the video URL and caption, one JSON reply carrying a media id or an
//! error message. Credentials come from the process environment; nothing in
//! the core ever persists them.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{PublishPayload, PublishReceipt, PublishTarget};
use crate::error::{ConfigError, PublishError, Result};

const DEFAULT_BASE_URL: &str = "https://graph.facebook.com";
const DEFAULT_API_VERSION: &str = "v21.0";

#[derive(Debug, Clone)]
pub struct InstagramConfig {
    pub account_id: String,
    pub access_token: String,
    pub api_version: String,
    pub base_url: String,
}

impl InstagramConfig {
    /// Read credentials from the environment: `INSTAGRAM_ACCOUNT_ID`,
    /// `INSTAGRAM_ACCESS_TOKEN`, and optionally `INSTAGRAM_API_VERSION`.
    pub fn from_env() -> Result<Self> {
        let account_id = std::env::var("INSTAGRAM_ACCOUNT_ID")
            .map_err(|_| ConfigError::MissingField("INSTAGRAM_ACCOUNT_ID".to_string()))?;
        let access_token = std::env::var("INSTAGRAM_ACCESS_TOKEN")
            .map_err(|_| ConfigError::MissingField("INSTAGRAM_ACCESS_TOKEN".to_string()))?;
        let api_version = std::env::var("INSTAGRAM_API_VERSION")
            .unwrap_or_else(|_| DEFAULT_API_VERSION.to_string());

        Ok(Self {
            account_id,
            access_token,
            api_version,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn new(account_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            access_token: access_token.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different host (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Reply shapes the provider is known to send. Anything else is treated as
/// malformed.
#[derive(Debug, Deserialize)]
struct UpstreamReply {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    error: Option<UpstreamErrorBody>,
}

#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    #[serde(default)]
    message: String,
}

pub struct InstagramUpstream {
    client: reqwest::Client,
    config: InstagramConfig,
}

impl InstagramUpstream {
    pub fn new(config: InstagramConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn publish_url(&self) -> String {
        format!(
            "{}/{}/{}/media_publish",
            self.config.base_url, self.config.api_version, self.config.account_id
        )
    }
}

#[async_trait]
impl PublishTarget for InstagramUpstream {
    async fn publish(&self, payload: &PublishPayload) -> Result<PublishReceipt> {
        let body = json!({
            "video_url": payload.video_url,
            "caption": payload.caption,
            "access_token": self.config.access_token,
        });

        let response = self
            .client
            .post(self.publish_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| PublishError::Network(e.to_string()))?;

        let http_status = response.status();
        let reply: UpstreamReply = response
            .json()
            .await
            .map_err(|e| PublishError::Network(format!("malformed upstream response: {}", e)))?;

        if let Some(error) = reply.error {
            let message = if error.message.is_empty() {
                format!("upstream returned {}", http_status)
            } else {
                error.message
            };
            return Err(PublishError::Upstream(message).into());
        }
        if !http_status.is_success() {
            return Err(
                PublishError::Upstream(format!("upstream returned {}", http_status)).into(),
            );
        }

        match reply.id {
            Some(id) => Ok(PublishReceipt {
                message: format!("Published media {}", id),
                media_id: Some(id),
            }),
            None => Ok(PublishReceipt {
                media_id: None,
                message: "Published".to_string(),
            }),
        }
    }

    fn name(&self) -> &str {
        "instagram"
    }
}
