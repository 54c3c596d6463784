//! Push notification delivery.
//!
//! [`Notifier::send`] never fails: missing credentials, transport errors and
//! non-200 responses are logged and returned as a [`Delivery`].

use log::{error, info};
use serde_json::json;

use crate::domain::error::EtfBalanceError;
use crate::ports::push_port::PushPort;

pub const TOKEN_VAR: &str = "LINE_CHANNEL_TOKEN";
pub const RECIPIENT_VAR: &str = "LINE_USER_ID";

/// Status reported when a precondition fails before any request is made.
pub const MISSING_CONFIG_STATUS: u16 = 400;
/// Status reported when no HTTP response was received.
pub const TRANSPORT_FAILURE_STATUS: u16 = 0;

#[derive(Debug, Clone, PartialEq)]
pub struct NotifierConfig {
    pub endpoint: String,
    pub access_token: Option<String>,
    pub default_recipient: Option<String>,
}

impl NotifierConfig {
    /// Read credentials from the process environment. Blank values count as
    /// missing.
    pub fn from_env(endpoint: &str) -> Self {
        let read = |name: &str| {
            std::env::var(name)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        NotifierConfig {
            endpoint: endpoint.to_string(),
            access_token: read(TOKEN_VAR),
            default_recipient: read(RECIPIENT_VAR),
        }
    }

    /// Check that a token and a default recipient are present.
    pub fn validate(&self) -> Result<(), EtfBalanceError> {
        if self.access_token.is_none() {
            return Err(EtfBalanceError::MissingCredential {
                name: TOKEN_VAR.to_string(),
            });
        }
        if self.default_recipient.is_none() {
            return Err(EtfBalanceError::MissingCredential {
                name: RECIPIENT_VAR.to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub status: u16,
    pub body: String,
}

impl Delivery {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// JSON body for a single text push message.
pub fn push_payload(to: &str, message: &str) -> serde_json::Value {
    json!({
        "to": to,
        "messages": [{ "type": "text", "text": message }],
    })
}

pub struct Notifier<'a> {
    config: &'a NotifierConfig,
    transport: &'a dyn PushPort,
}

impl<'a> Notifier<'a> {
    pub fn new(config: &'a NotifierConfig, transport: &'a dyn PushPort) -> Self {
        Self { config, transport }
    }

    pub fn send(&self, message: &str, to: Option<&str>) -> Delivery {
        let Some(token) = self.config.access_token.as_deref() else {
            return self.precondition_failed(TOKEN_VAR);
        };
        let recipient = to
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .or(self.config.default_recipient.as_deref());
        let Some(recipient) = recipient else {
            return self.precondition_failed(RECIPIENT_VAR);
        };

        let body = push_payload(recipient, message);
        match self.transport.post_json(&self.config.endpoint, token, &body) {
            Ok((200, text)) => {
                info!("push message delivered to {}", recipient);
                Delivery {
                    status: 200,
                    body: text,
                }
            }
            Ok((status, text)) => {
                error!("push message rejected with status {}: {}", status, text);
                Delivery { status, body: text }
            }
            Err(e) => {
                error!("push message failed: {}", e);
                Delivery {
                    status: TRANSPORT_FAILURE_STATUS,
                    body: e.to_string(),
                }
            }
        }
    }

    fn precondition_failed(&self, name: &str) -> Delivery {
        let err = EtfBalanceError::MissingCredential {
            name: name.to_string(),
        };
        error!("push message not sent: {}", err);
        Delivery {
            status: MISSING_CONFIG_STATUS,
            body: err.to_string(),
        }
    }
}
