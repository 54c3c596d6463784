//! LINE Messaging API push adapter.

use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;

use crate::domain::error::EtfBalanceError;
use crate::ports::push_port::PushPort;

/// Blocking HTTP client for bearer-authenticated JSON pushes.
pub struct LinePushAdapter {
    client: Client,
}

impl LinePushAdapter {
    pub fn new(timeout: Duration) -> Result<Self, EtfBalanceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EtfBalanceError::Transport {
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }
}

impl PushPort for LinePushAdapter {
    fn post_json(
        &self,
        url: &str,
        token: &str,
        body: &serde_json::Value,
    ) -> Result<(u16, String), EtfBalanceError> {
        debug!("POST {url}");

        let resp = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .map_err(|e| EtfBalanceError::Transport {
                reason: format!("push request failed: {e}"),
            })?;

        let status = resp.status().as_u16();
        let text = resp.text().unwrap_or_default();
        Ok((status, text))
    }
}
