use crate::types::{RealtimeError, Result};
use serde::Deserialize;
use url::Url;

/// Signature returned by the auth endpoint for a private or presence channel
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ChannelAuth {
    pub auth: String,
    #[serde(default)]
    pub channel_data: Option<String>,
}

/// Authorizes private/presence channel subscriptions over HTTP
#[derive(Clone)]
pub struct ChannelAuthorizer {
    endpoint: Url,
    http: reqwest::Client,
}

impl ChannelAuthorizer {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            http: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// POSTs `socket_id` and `channel_name` and returns the signature
    pub async fn authorize(&self, socket_id: &str, channel: &str) -> Result<ChannelAuth> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .form(&[("socket_id", socket_id), ("channel_name", channel)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RealtimeError::Auth(format!(
                "authorization for channel '{}' failed with status: {}",
                channel,
                response.status()
            )));
        }

        let auth = response.json::<ChannelAuth>().await?;
        tracing::debug!("Authorized channel {}", channel);
        Ok(auth)
    }
}
