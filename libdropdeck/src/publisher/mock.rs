//! Mock publish target
//!
//! Configurable stand-in for the publish boundary. Available for all builds
//! (not just `cfg(test)`) so the integration tests can exercise the
//! dispatcher without credentials or network access.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use super::{PublishPayload, PublishReceipt, PublishTarget};
use crate::error::{PublishError, Result};

/// Behavior knobs for [`MockTarget`].
#[derive(Debug, Clone)]
pub struct MockBehavior {
    pub name: String,
    /// Media id returned on success.
    pub media_id: Option<String>,
    /// When set, every publish fails with this error.
    pub failure: Option<PublishError>,
    /// Simulated network latency.
    pub delay: Duration,
}

impl Default for MockBehavior {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            media_id: Some("mock-media".to_string()),
            failure: None,
            delay: Duration::ZERO,
        }
    }
}

pub struct MockTarget {
    behavior: MockBehavior,
    calls: Arc<Mutex<Vec<PublishPayload>>>,
}

impl MockTarget {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Always succeeds with the given media id.
    pub fn success(media_id: &str) -> Self {
        Self::new(MockBehavior {
            media_id: Some(media_id.to_string()),
            ..Default::default()
        })
    }

    /// Succeeds but reports no media identifier.
    pub fn success_without_media_id() -> Self {
        Self::new(MockBehavior {
            media_id: None,
            ..Default::default()
        })
    }

    /// Fails every publish with an upstream error (what a non-success
    /// response from the boundary maps to).
    pub fn upstream_failure(message: &str) -> Self {
        Self::new(MockBehavior {
            failure: Some(PublishError::Upstream(message.to_string())),
            ..Default::default()
        })
    }

    /// Fails every publish with a transport error.
    pub fn network_failure(message: &str) -> Self {
        Self::new(MockBehavior {
            failure: Some(PublishError::Network(message.to_string())),
            ..Default::default()
        })
    }

    /// Succeeds after holding the request for `delay`.
    pub fn with_delay(media_id: &str, delay: Duration) -> Self {
        Self::new(MockBehavior {
            media_id: Some(media_id.to_string()),
            delay,
            ..Default::default()
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Every payload this target has been asked to publish, in order.
    pub fn payloads(&self) -> Vec<PublishPayload> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PublishTarget for MockTarget {
    async fn publish(&self, payload: &PublishPayload) -> Result<PublishReceipt> {
        self.calls.lock().unwrap().push(payload.clone());

        if !self.behavior.delay.is_zero() {
            sleep(self.behavior.delay).await;
        }

        if let Some(failure) = &self.behavior.failure {
            return Err(failure.clone().into());
        }

        Ok(PublishReceipt {
            media_id: self.behavior.media_id.clone(),
            message: "mock publish accepted".to_string(),
        })
    }

    fn name(&self) -> &str {
        &self.behavior.name
    }
}
