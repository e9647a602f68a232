//! Publish route client
//!
//! Sends `{videoUrl, caption}` to the dashboard's own publish route (the one
//! `drop-serve` exposes, or a cron-fronted deployment of it) and interprets
//! its `{status, message, instagramMediaId?}` envelope.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{PublishPayload, PublishReceipt, PublishTarget};
use crate::error::{PublishError, Result};

/// Wire envelope returned by the publish route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishEnvelope {
    /// `"success"` or `"error"`.
    pub status: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram_media_id: Option<String>,
}

impl PublishEnvelope {
    pub fn success(message: impl Into<String>, media_id: Option<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            instagram_media_id: media_id,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            instagram_media_id: None,
        }
    }
}

pub struct EndpointTarget {
    client: reqwest::Client,
    url: String,
}

impl EndpointTarget {
    /// `url` is the full route, e.g.
    /// `http://127.0.0.1:8787/api/instagram/publish`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl PublishTarget for EndpointTarget {
    async fn publish(&self, payload: &PublishPayload) -> Result<PublishReceipt> {
        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| PublishError::Network(e.to_string()))?;

        let http_status = response.status();
        let envelope: PublishEnvelope = response
            .json()
            .await
            .map_err(|e| PublishError::Network(format!("malformed publish response: {}", e)))?;

        // Non-2xx counts as failure even when the body parses cleanly.
        if !http_status.is_success() || envelope.status != "success" {
            let message = if envelope.message.trim().is_empty() {
                format!("publish endpoint returned {}", http_status)
            } else {
                envelope.message
            };
            // 400 means the route refused the payload before forwarding it.
            if http_status == reqwest::StatusCode::BAD_REQUEST {
                return Err(PublishError::Validation(message).into());
            }
            return Err(PublishError::Upstream(message).into());
        }

        Ok(PublishReceipt {
            media_id: envelope.instagram_media_id,
            message: envelope.message,
        })
    }

    fn name(&self) -> &str {
        "publish-endpoint"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_success_shape() {
        let envelope = PublishEnvelope::success("Published", Some("m123".to_string()));
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["instagramMediaId"], "m123");
    }

    #[test]
    fn test_envelope_error_omits_media_id() {
        let envelope = PublishEnvelope::error("rate limited");
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "rate limited");
        assert!(json.get("instagramMediaId").is_none());
    }

    #[test]
    fn test_envelope_deserializes_without_media_id() {
        let envelope: PublishEnvelope =
            serde_json::from_str(r#"{"status":"error","message":"nope"}"#).unwrap();
        assert_eq!(envelope.instagram_media_id, None);
    }
}
